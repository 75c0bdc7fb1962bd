mod io;
mod processors;
mod rates;

use std::path::PathBuf;

use anyhow::Result;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use rust_decimal::Decimal;

use crate::io::CsvRatesReader;
use crate::rates::{Converter, RatesStore, SqliteRatesStore};

/// Convert USD amounts into EUR using historical daily exchange rates.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
  /// Path to the rates store, created when it does not exist.
  #[arg(long, env = "RATES_STORE", default_value = "rates.db", global = true)]
  store: PathBuf,

  #[command(subcommand)]
  command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
  /// Load the rates from a feed file into the store
  Load {
    /// Path to the feed file
    feed: PathBuf,

    /// Field delimiter used by the feed
    #[arg(long, default_value_t = ',')]
    delimiter: char,
  },
  /// Convert an amount of USD into EUR at the rate effective on a date
  Convert {
    amount: Decimal,
    /// Date in YYYY-MM-DD format
    date: NaiveDate,
  },
  /// Show the rate effective on a date
  Rate {
    /// Date in YYYY-MM-DD format
    date: NaiveDate,
  },
}

/// The CSV reader splits on bytes, so only ASCII delimiters keep UTF-8 rows intact.
fn ascii_delimiter(delimiter: char) -> Result<u8> {
  if delimiter.is_ascii() {
    Ok(delimiter as u8)
  } else {
    Err(anyhow::anyhow!(
      "The delimiter must be an ASCII character: {}",
      delimiter
    ))
  }
}

#[tokio::main]
async fn main() -> Result<()> {
  env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

  let cli = Cli::parse();

  match cli.command {
    Command::Load { feed, delimiter } => {
      let rates_reader = CsvRatesReader::with_delimiter(ascii_delimiter(delimiter)?);
      let mut rates_store = SqliteRatesStore::open(&cli.store)?;
      processors::refresh::run(&rates_reader, &feed, &mut rates_store).await?;
    }
    Command::Convert { amount, date } => {
      let converter = Converter::new(SqliteRatesStore::open(&cli.store)?);
      println!("{}", converter.convert(amount, date)?);
    }
    Command::Rate { date } => {
      let rates_store = SqliteRatesStore::open(&cli.store)?;
      println!("{}", rates_store.retrieve(date)?);
    }
  }

  Ok(())
}

#[cfg(test)]
mod tests {

  use super::*;

  #[test]
  fn ascii_delimiter_cases() {
    assert_eq!(ascii_delimiter(',').unwrap(), b',');
    assert_eq!(ascii_delimiter(';').unwrap(), b';');
    assert_eq!(ascii_delimiter('\t').unwrap(), b'\t');
    assert!(ascii_delimiter('é').is_err());
    assert!(ascii_delimiter('€').is_err());
  }
}
