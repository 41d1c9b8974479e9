//! Tax calculation modules.
//!
//! The federal engine lives in [`federal`]; [`wash_sale`] and
//! [`capital_gains`] turn the security ledger into realized gains; [`common`]
//! holds the rounding helpers every line item goes through.

pub mod capital_gains;
pub mod common;
pub mod federal;
pub mod wash_sale;

pub use capital_gains::{CapitalGainsRollup, RealizedLot};
pub use federal::{FederalCalculator, SeWorksheet, SeWorksheetResult};
pub use wash_sale::{WashSaleDetector, WashSaleWindow};
