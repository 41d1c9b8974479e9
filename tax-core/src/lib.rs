//! Federal and state individual income tax liability.
//!
//! Start with [`TaxEngine::builtin`], build a [`TaxReturn`], and call
//! [`TaxEngine::calculate`]. Everything here is pure and synchronous: no I/O,
//! no clock, no global state.

pub mod calculations;
pub mod config;
pub mod engine;
pub mod error;
pub mod models;
pub mod states;

pub use config::TaxYearConfigStore;
pub use engine::TaxEngine;
pub use error::{CalculationError, ConfigError, RegistryError};
pub use models::*;
pub use states::{StateCalculator, StateRegistry, StateTaxConfig};
