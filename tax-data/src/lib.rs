//! External data for the tax engine.
//!
//! Parses IRS rate-schedule CSV files into validated bracket schedules and
//! reads or writes federal tax-year snapshots as JSON, ready to register
//! with a [`TaxYearConfigStore`](tax_core::TaxYearConfigStore).

mod error;
pub mod loader;
pub mod logging;
pub mod snapshot;

pub use error::SnapshotLoaderError;
pub use loader::{TaxBracketLoader, TaxBracketRecord};
pub use snapshot::SnapshotLoader;
