//! State income tax.
//!
//! Each jurisdiction is a [`StateTaxConfig`] run through the shared
//! [`StateCalculator`] template; a handful of states with unique rules use the
//! calculators in [`overrides`]. Calculators are looked up through a
//! [`StateRegistry`] populated once at startup.

pub mod calculator;
pub mod config;
mod data;
pub mod overrides;
pub mod registry;

pub use calculator::{StandardStateCalculator, StateCalculator, StateContext};
pub use config::{
    ExemptionKind, LocalJurisdiction, LocalTaxBase, PhaseOut, PhaseOutReduction, StartingIncome,
    StateTaxConfig, StateTaxSchedule,
};
pub use overrides::{DelawareCalculator, FederalTaxDeductionCalculator, FederalTaxDeductionLimit};
pub use registry::StateRegistry;
