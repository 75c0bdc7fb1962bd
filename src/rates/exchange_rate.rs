use std::fmt;

use chrono::NaiveDate;
use rust_decimal::Decimal;

/// Currencies known to the converter.
/// Only the USD to EUR direction is supported, but keeping them explicit makes the records self-describing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Currency {
  Usd,
  Eur,
}

impl fmt::Display for Currency {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Currency::Usd => write!(f, "USD"),
      Currency::Eur => write!(f, "EUR"),
    }
  }
}

/// The earliest date the feed publishes rates for. Queries before it are always out of range.
pub fn epoch() -> NaiveDate {
  NaiveDate::from_ymd_opt(2000, 1, 1).unwrap_or(NaiveDate::MIN)
}

/// A daily snapshot of the USD to EUR exchange rate as published by the feed.
#[derive(Debug, Clone, PartialEq)]
pub struct ExchangeRate {
  pub from: Currency,
  pub to: Currency,
  pub date: NaiveDate,
  /// Units quoted by the feed per 1 USD. Always positive.
  pub value: Decimal,
}

impl ExchangeRate {
  pub fn new(date: NaiveDate, value: Decimal) -> Self {
    Self {
      from: Currency::Usd,
      to: Currency::Eur,
      date,
      value,
    }
  }
}

impl fmt::Display for ExchangeRate {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}/{} {} {}", self.from, self.to, self.date, self.value)
  }
}
