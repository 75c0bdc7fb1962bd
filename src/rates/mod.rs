//! This module contains the domain logic to store exchange rates and convert amounts with them
//!
//! The [`SqliteRatesStore`] is an implementation of a [`RatesStore`] persisted in an SQLite database,
//! and the [`Converter`] uses any [`RatesStore`] to convert USD amounts into EUR.
//

mod converter;
mod exchange_rate;
mod store;

#[cfg(test)]
pub(crate) use store::Result as StoreResult;

pub use converter::Converter;
pub use exchange_rate::ExchangeRate;
pub use store::{RatesStore, SqliteRatesStore, StoreError};
