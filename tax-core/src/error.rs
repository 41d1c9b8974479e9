use thiserror::Error;

/// Errors raised while loading or validating tax-year and state configuration.
///
/// These are fatal: a missing or malformed snapshot is never replaced by a
/// default or by an adjacent year's data.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// No configuration snapshot is registered for the requested tax year.
    #[error("no tax-year configuration found for {0}")]
    NotFound(i32),

    /// A configuration snapshot failed validation.
    #[error("configuration integrity error in {context}: {reason}")]
    Integrity { context: String, reason: String },

    /// A snapshot for the same tax year was registered twice.
    #[error("tax-year configuration for {0} is already registered")]
    DuplicateYear(i32),
}

impl ConfigError {
    pub fn integrity(
        context: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::Integrity {
            context: context.into(),
            reason: reason.into(),
        }
    }
}

/// Errors raised while populating the state calculator registry at startup.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("a state calculator for {state_code}/{tax_year} is already registered")]
    DuplicateRegistration { state_code: String, tax_year: i32 },

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Errors that abort a single `calculate` call.
///
/// No partial breakdown is ever returned alongside one of these.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CalculationError {
    /// An input amount or field is invalid (negative money, unknown filing
    /// status code, mismatched tax year). Checked before any arithmetic.
    #[error("invalid input for {field}: {reason}")]
    InvalidInput { field: String, reason: String },

    /// No calculator is registered for the requested state and tax year.
    #[error("no state calculator registered for {state_code} in tax year {tax_year}")]
    StateNotSupported { state_code: String, tax_year: i32 },

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl CalculationError {
    pub(crate) fn invalid_input(
        field: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidInput {
            field: field.into(),
            reason: reason.into(),
        }
    }
}
