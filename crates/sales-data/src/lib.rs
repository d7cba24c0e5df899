//! Data layer for the grocery sales report.
//!
//! Loads the distributor's two-row-header export into a normalized
//! [`sales_core::SalesTable`], answers sales metrics queries over it, and
//! prepares the narrative report and chart series built from those metrics.

pub mod charts;
pub mod loader;
pub mod metrics;
pub mod report;

pub use sales_core as core;
