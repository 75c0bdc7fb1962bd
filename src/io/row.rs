use std::sync::OnceLock;

use chrono::NaiveDate;
use csv_async::StringRecord;
use regex::Regex;
use rust_decimal::Decimal;

use crate::rates::ExchangeRate;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Classification of a single line of the rates feed
#[derive(Debug, PartialEq)]
pub enum Row {
  Rate(ExchangeRate),
  /// Anything not starting with a `YYYY-MM-DD` date, like headers or metadata.
  Header,
  InvalidDate(String),
  InvalidValue(String),
}

impl From<&StringRecord> for Row {
  fn from(record: &StringRecord) -> Self {
    let date_field = record.get(0).unwrap_or_default();
    if !date_pattern().is_match(date_field) {
      return Row::Header;
    }

    let value_field = record.get(1).unwrap_or_default();
    match (parse_date(date_field), parse_value(value_field)) {
      (Some(date), Some(value)) => Row::Rate(ExchangeRate::new(date, value)),
      (None, _) => Row::InvalidDate(date_field.to_string()),
      (_, None) => Row::InvalidValue(value_field.to_string()),
    }
  }
}

fn date_pattern() -> &'static Regex {
  static DATE_PATTERN: OnceLock<Regex> = OnceLock::new();
  DATE_PATTERN.get_or_init(|| Regex::new(r"^\d{4}-\d{2}-\d{2}").unwrap())
}

/// Parse a calendar date, returning `None` when it is malformed or does not exist.
pub fn parse_date(field: &str) -> Option<NaiveDate> {
  NaiveDate::parse_from_str(field, DATE_FORMAT).ok()
}

/// Parse a rate value. Placeholders like `-`, non positive values and values that
/// cannot be represented without rounding are rejected.
pub fn parse_value(field: &str) -> Option<Decimal> {
  Decimal::from_str_exact(field)
    .ok()
    .filter(|value| *value > Decimal::ZERO)
}
