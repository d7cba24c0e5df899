//! Domain model and shared utilities for the grocery sales report.
//!
//! Holds the normalized [`models::SalesTable`], the error taxonomy, product
//! label cleanup, number formatting and CLI settings used by the data and
//! binary crates.

pub mod error;
pub mod formatting;
pub mod labels;
pub mod models;
pub mod settings;

pub use error::{Result, SalesError};
pub use models::{SalesRow, SalesTable};
