use std::path::Path;
use std::time::Duration;

use chrono::{Days, NaiveDate};
use rusqlite::{params, Connection, OptionalExtension, Transaction, TransactionBehavior};
use rust_decimal::Decimal;
use thiserror::Error;

use super::exchange_rate::{epoch, ExchangeRate};

/// How long a writer waits for another writer to release the database before giving up.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

pub type Result<T> = core::result::Result<T, StoreError>;

/// Possible errors when saving or retrieving rates.
#[derive(Debug, Error)]
pub enum StoreError {
  /// The query date is before the epoch, or no rate exists between the epoch and the query date.
  #[error("No exchange rate available for {0}")]
  OutOfRange(NaiveDate),

  #[error("Stored rate for {date} is not a valid positive decimal: {value}")]
  CorruptValue { date: NaiveDate, value: String },

  #[error("Database error: {0}")]
  Database(#[from] rusqlite::Error),
}

/// Interface for a date-indexed store of exchange rates
pub trait RatesStore {
  /// Persist all the rates in a single transaction, overwriting any previous value for the same date.
  /// When the same date appears more than once, the last one wins.
  fn save(&mut self, rates: &[ExchangeRate]) -> Result<()>;

  /// Return the rate effective on `date`, which is the one stored for the nearest date
  /// on or before it, but never before the epoch.
  fn retrieve(&self, date: NaiveDate) -> Result<Decimal>;
}

/// Implementation of [`RatesStore`] backed by an SQLite database.
///
/// The database runs in WAL mode so that a [`ReadTransaction`] keeps observing the same snapshot
/// even if a writer from another handle commits while the fallback scan is in progress.
/// Every handle owns its connection; open one handle per concurrent reader.
pub struct SqliteRatesStore {
  conn: Connection,
}

impl SqliteRatesStore {
  /// Open (or create) the store at `path`.
  pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
    let conn = Connection::open(path)?;
    conn.busy_timeout(BUSY_TIMEOUT)?;
    conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get::<_, String>(0))?;
    Self::with_connection(conn)
  }

  /// Create a store living in memory, mostly useful for testing.
  pub fn open_in_memory() -> Result<Self> {
    Self::with_connection(Connection::open_in_memory()?)
  }

  fn with_connection(conn: Connection) -> Result<Self> {
    conn.execute(
      "CREATE TABLE IF NOT EXISTS rates (
        date TEXT PRIMARY KEY NOT NULL,
        value TEXT NOT NULL
      )",
      [],
    )?;
    Ok(Self { conn })
  }

  /// Start a read-only transaction. All the reads done through it observe the same snapshot.
  /// The transaction is closed when the value is dropped.
  fn read_transaction(&self) -> Result<ReadTransaction<'_>> {
    let tx = self.conn.unchecked_transaction()?;
    Ok(ReadTransaction { tx })
  }

  fn write_transaction(&mut self) -> Result<Transaction<'_>> {
    self
      .conn
      .transaction_with_behavior(TransactionBehavior::Immediate)
      .map_err(StoreError::from)
  }
}

impl RatesStore for SqliteRatesStore {
  fn save(&mut self, rates: &[ExchangeRate]) -> Result<()> {
    let tx = self.write_transaction()?;
    {
      let mut insert = tx.prepare_cached(
        "INSERT INTO rates (date, value) VALUES (?1, ?2)
         ON CONFLICT(date) DO UPDATE SET value = excluded.value",
      )?;
      for rate in rates {
        log::trace!("Saving {}", rate);
        insert.execute(params![rate.date, rate.value.to_string()])?;
      }
    }
    tx.commit()?;

    log::info!("Saved {} exchange rates", rates.len());
    Ok(())
  }

  fn retrieve(&self, date: NaiveDate) -> Result<Decimal> {
    let epoch = epoch();
    if date < epoch {
      return Err(StoreError::OutOfRange(date));
    }

    let tx = self.read_transaction()?;

    // One probe per day from `date` back to the epoch, both included.
    let span = (date - epoch).num_days() as u64;
    for offset in 0..=span {
      let probe = date
        .checked_sub_days(Days::new(offset))
        .ok_or(StoreError::OutOfRange(date))?;

      if let Some(value) = tx.get(probe)? {
        if offset > 0 {
          log::debug!("No rate for {}, falling back to {}", date, probe);
        }
        return Ok(value);
      }
    }

    Err(StoreError::OutOfRange(date))
  }
}

/// A scoped read-only transaction over the rates table.
pub struct ReadTransaction<'conn> {
  tx: Transaction<'conn>,
}

impl<'conn> ReadTransaction<'conn> {
  /// Exact lookup, without any fallback.
  pub fn get(&self, date: NaiveDate) -> Result<Option<Decimal>> {
    let value = self
      .tx
      .prepare_cached("SELECT value FROM rates WHERE date = ?1")?
      .query_row(params![date], |row| row.get::<_, String>(0))
      .optional()?;

    value
      .map(|value| match Decimal::from_str_exact(&value) {
        Ok(rate) if rate > Decimal::ZERO => Ok(rate),
        _ => Err(StoreError::CorruptValue { date, value }),
      })
      .transpose()
  }
}
