//! This module contains all the components needed to read exchange rates from the feed (specifically CSV)
//!
//! The [`reader`] module contains a reader of rates from CSV files.
//! It would be possible to add new feed formats by implementing the trait [`RatesReader`].
//!
//! The [`row`] module classifies every line of the feed, so that headers and malformed rows
//! can be dropped without interrupting the reading.
//!

mod reader;
mod row;

pub use reader::{CsvRatesReader, RatesReader, ReadRatesError};
