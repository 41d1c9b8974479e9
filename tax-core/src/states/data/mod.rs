//! Compiled-in state rule sets.

mod y2025;

use std::sync::Arc;

use crate::error::ConfigError;
use crate::states::calculator::StateCalculator;

/// Every built-in calculator, all years.
pub(crate) fn builtin_calculators() -> Result<Vec<Arc<dyn StateCalculator>>, ConfigError> {
    y2025::calculators()
}
