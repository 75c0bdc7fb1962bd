use std::path::{Path, PathBuf};

use async_trait::async_trait;
use thiserror::Error;
use tokio::io::AsyncRead;
use tokio_stream::StreamExt;

use super::row::Row;
use crate::rates::ExchangeRate;

pub type Result<T> = core::result::Result<T, ReadRatesError>;

/// Errors that prevent reading the feed as a whole.
/// Problems with single rows are not errors, those rows are just skipped.
#[derive(Debug, Error)]
pub enum ReadRatesError {
  #[error("Unable to open the rates feed {}: {source}", .path.display())]
  Open {
    path: PathBuf,
    source: std::io::Error,
  },

  #[error("Unable to read the rates feed: {0}")]
  Read(#[source] csv_async::Error),
}

/// Interface to read exchange rates from an external source
#[async_trait(?Send)]
pub trait RatesReader {
  /// Read all the valid rates found in the feed at `path`, in the same order as they appear.
  /// Malformed rows are skipped, but failing to open or read the feed is an error.
  async fn read(&self, path: &Path) -> Result<Vec<ExchangeRate>>;
}

/// Implementation of [`RatesReader`] for the CSV format.
pub struct CsvRatesReader {
  delimiter: u8,
}

impl CsvRatesReader {
  pub fn new() -> Self {
    Self { delimiter: b',' }
  }

  pub fn with_delimiter(delimiter: u8) -> Self {
    Self { delimiter }
  }

  async fn read_from<R>(&self, reader: R) -> Result<Vec<ExchangeRate>>
  where
    R: AsyncRead + Unpin + Send,
  {
    let mut records = csv_async::AsyncReaderBuilder::new()
      .has_headers(false)
      .flexible(true)
      .delimiter(self.delimiter)
      .create_reader(reader)
      .into_records();

    let mut rates = Vec::new();
    let mut dropped = 0usize;

    while let Some(maybe_record) = records.next().await {
      let mut record = match maybe_record {
        Ok(record) => record,
        Err(err) if matches!(err.kind(), csv_async::ErrorKind::Io(_)) => {
          return Err(ReadRatesError::Read(err))
        }
        Err(err) => {
          log::debug!("Skipping unreadable row: {}", err);
          dropped += 1;
          continue;
        }
      };

      record.trim();
      match Row::from(&record) {
        Row::Rate(rate) => rates.push(rate),
        Row::Header => {}
        Row::InvalidDate(date) => {
          log::debug!("Skipping row with invalid date: {}", date);
          dropped += 1;
        }
        Row::InvalidValue(value) => {
          log::debug!("Skipping row with invalid value: {:?}", value);
          dropped += 1;
        }
      }
    }

    log::info!("Read {} exchange rates, skipped {} rows", rates.len(), dropped);
    Ok(rates)
  }
}

impl Default for CsvRatesReader {
  fn default() -> Self {
    Self::new()
  }
}

#[async_trait(?Send)]
impl RatesReader for CsvRatesReader {
  async fn read(&self, path: &Path) -> Result<Vec<ExchangeRate>> {
    let file = tokio::fs::File::open(path)
      .await
      .map_err(|source| ReadRatesError::Open {
        path: path.to_path_buf(),
        source,
      })?;

    self.read_from(file).await
  }
}
