use std::path::Path;

use anyhow::Result;

use crate::io::RatesReader;
use crate::rates::RatesStore;

/// This is the processor that refreshes the rates store from a feed file
/// - reads rates from a [`RatesReader`]
/// - saves them all at once into a [`RatesStore`]
///
/// Malformed rows are already dropped by the reader, so any error here is fatal:
/// an unreadable feed is never mistaken for a feed without rates, and a failed save leaves the store untouched.
///
/// Returns the number of rates saved.
pub async fn run<R, S>(rates_reader: &R, feed_path: &Path, rates_store: &mut S) -> Result<usize>
where
  R: RatesReader,
  S: RatesStore,
{
  let rates = rates_reader.read(feed_path).await?;

  if rates.is_empty() {
    log::warn!("The feed {} contains no valid rates", feed_path.display());
  }

  rates_store.save(&rates)?;

  log::info!(
    "Refreshed the store with {} rates from {}",
    rates.len(),
    feed_path.display()
  );
  Ok(rates.len())
}

#[cfg(test)]
mod test {

  use async_trait::async_trait;
  use chrono::NaiveDate;
  use rust_decimal::Decimal;
  use rust_decimal_macros::dec;

  use super::*;
  use crate::io::ReadRatesError;
  use crate::rates::{ExchangeRate, StoreError, StoreResult};

  fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
  }

  mockall::mock! {
    TestRatesReader {}
    #[async_trait(?Send)]
    impl RatesReader for TestRatesReader {
      async fn read(&self, path: &Path) -> core::result::Result<Vec<ExchangeRate>, ReadRatesError>;
    }
  }

  mockall::mock! {
    TestRatesStore {}
    impl RatesStore for TestRatesStore {
      fn save(&mut self, rates: &[ExchangeRate]) -> StoreResult<()>;
      fn retrieve(&self, date: NaiveDate) -> StoreResult<Decimal>;
    }
  }

  fn create_rates_reader_mock(rates: Vec<ExchangeRate>) -> MockTestRatesReader {
    let mut rates_reader = MockTestRatesReader::new();
    rates_reader
      .expect_read()
      .withf(|path| path == Path::new("feed.csv"))
      .returning(move |_| Ok(rates.clone()));
    rates_reader
  }

  #[tokio::test]
  async fn run_successfully() {
    let rates = vec![
      ExchangeRate::new(date(2017, 1, 19), dec!(1.0668)),
      ExchangeRate::new(date(2017, 1, 11), dec!(1.0503)),
    ];
    let rates_reader = create_rates_reader_mock(rates.clone());

    let mut rates_store = MockTestRatesStore::new();
    rates_store
      .expect_save()
      .withf(move |saved| saved == rates.as_slice())
      .times(1)
      .returning(|_| Ok(()));

    let result = run(&rates_reader, Path::new("feed.csv"), &mut rates_store).await;

    assert_eq!(result.unwrap(), 2);
  }

  #[tokio::test]
  async fn run_with_unreadable_feed() {
    let mut rates_reader = MockTestRatesReader::new();
    rates_reader.expect_read().returning(|path| {
      Err(ReadRatesError::Open {
        path: path.to_path_buf(),
        source: std::io::Error::from(std::io::ErrorKind::NotFound),
      })
    });

    let mut rates_store = MockTestRatesStore::new();
    rates_store.expect_save().never();

    let result = run(&rates_reader, Path::new("feed.csv"), &mut rates_store).await;

    assert!(result.is_err());
  }

  #[tokio::test]
  async fn run_with_failing_store() {
    let rates_reader =
      create_rates_reader_mock(vec![ExchangeRate::new(date(2017, 1, 19), dec!(1.0668))]);

    let mut rates_store = MockTestRatesStore::new();
    rates_store
      .expect_save()
      .returning(|_| Err(StoreError::Database(rusqlite::Error::InvalidQuery)));

    let result = run(&rates_reader, Path::new("feed.csv"), &mut rates_store).await;

    assert!(result.is_err());
  }

  #[tokio::test]
  async fn run_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let feed_path = dir.path().join("feed.csv");
    std::fs::write(
      &feed_path,
      "Time Period,RXI$US_N.B.EU\n2017-01-19,1.0668\n2017-01-16,-\n2017-01-11,1.0503\n",
    )
    .unwrap();
    let mut rates_store = crate::rates::SqliteRatesStore::open(dir.path().join("rates.db")).unwrap();

    let saved = run(&crate::io::CsvRatesReader::new(), &feed_path, &mut rates_store)
      .await
      .unwrap();

    assert_eq!(saved, 2);
    assert_eq!(rates_store.retrieve(date(2017, 1, 16)).unwrap(), dec!(1.0503));
  }
}
