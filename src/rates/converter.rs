use chrono::NaiveDate;
use rust_decimal::Decimal;
use thiserror::Error;

use super::store::{RatesStore, StoreError};

pub type Result<T> = core::result::Result<T, ConverterError>;

#[derive(Debug, Error)]
pub enum ConverterError {
  #[error(transparent)]
  Store(#[from] StoreError),

  #[error("Converting {amount} USD at a rate of {rate} overflows")]
  Overflow { amount: Decimal, rate: Decimal },
}

/// Converts USD amounts into EUR using the rates available in a [`RatesStore`].
///
/// The result is never rounded: scaling it to the precision of a currency is left to whoever presents it.
pub struct Converter<S> {
  store: S,
}

impl<S> Converter<S>
where
  S: RatesStore,
{
  pub fn new(store: S) -> Self {
    Self { store }
  }

  pub fn convert(&self, amount_usd: Decimal, date: NaiveDate) -> Result<Decimal> {
    let rate = self.store.retrieve(date)?;
    amount_usd
      .checked_div(rate)
      .ok_or(ConverterError::Overflow {
        amount: amount_usd,
        rate,
      })
  }
}
