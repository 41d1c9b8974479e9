use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// One marginal-rate bracket: income strictly above `floor` (up to the next
/// bracket's floor) is taxed at `rate`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxBracket {
    pub floor: Decimal,
    pub rate: Decimal,
}

impl TaxBracket {
    pub fn new(
        floor: Decimal,
        rate: Decimal,
    ) -> Self {
        Self { floor, rate }
    }
}

/// An ordered, validated progressive bracket table.
///
/// Invariants, checked by [`BracketSchedule::new`]:
/// - at least one bracket;
/// - the first floor is exactly zero;
/// - floors are strictly increasing;
/// - rates are within `[0, 1]` and non-decreasing.
///
/// The last bracket is unbounded above.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<TaxBracket>", into = "Vec<TaxBracket>")]
pub struct BracketSchedule {
    brackets: Vec<TaxBracket>,
}

impl BracketSchedule {
    pub fn new(brackets: Vec<TaxBracket>) -> Result<Self, ConfigError> {
        let context = "bracket schedule";

        let first = brackets
            .first()
            .ok_or_else(|| ConfigError::integrity(context, "no brackets provided"))?;
        if first.floor != Decimal::ZERO {
            return Err(ConfigError::integrity(
                context,
                format!("first floor must be 0, got {}", first.floor),
            ));
        }

        for bracket in &brackets {
            if bracket.rate < Decimal::ZERO || bracket.rate > Decimal::ONE {
                return Err(ConfigError::integrity(
                    context,
                    format!("rate {} at floor {} is outside [0, 1]", bracket.rate, bracket.floor),
                ));
            }
        }

        for pair in brackets.windows(2) {
            let (lower, upper) = (&pair[0], &pair[1]);
            if upper.floor <= lower.floor {
                return Err(ConfigError::integrity(
                    context,
                    format!(
                        "floors must be strictly increasing: {} follows {}",
                        upper.floor, lower.floor
                    ),
                ));
            }
            if upper.rate < lower.rate {
                return Err(ConfigError::integrity(
                    context,
                    format!(
                        "rates must be non-decreasing: {} at floor {} follows {}",
                        upper.rate, upper.floor, lower.rate
                    ),
                ));
            }
        }

        Ok(Self { brackets })
    }

    /// Builds a schedule from `(floor, rate)` pairs.
    pub fn from_pairs(pairs: &[(Decimal, Decimal)]) -> Result<Self, ConfigError> {
        Self::new(
            pairs
                .iter()
                .map(|&(floor, rate)| TaxBracket::new(floor, rate))
                .collect(),
        )
    }

    /// A single bracket taxing all income at `rate`.
    pub fn flat(rate: Decimal) -> Result<Self, ConfigError> {
        Self::new(vec![TaxBracket::new(Decimal::ZERO, rate)])
    }

    /// Returns a copy with every floor multiplied by `factor`.
    ///
    /// Many states build their joint schedule by doubling the single one.
    pub fn scaled(
        &self,
        factor: Decimal,
    ) -> Result<Self, ConfigError> {
        Self::new(
            self.brackets
                .iter()
                .map(|b| TaxBracket::new(b.floor * factor, b.rate))
                .collect(),
        )
    }

    pub fn brackets(&self) -> &[TaxBracket] {
        &self.brackets
    }

    pub fn top_rate(&self) -> Decimal {
        self.brackets.last().map(|b| b.rate).unwrap_or(Decimal::ZERO)
    }

    /// Applies the progressive schedule to `income` without rounding.
    ///
    /// `tax = Σ clamp(min(I, next_floor) − floor, ≥ 0) × rate`, with the last
    /// bracket unbounded. An income exactly equal to a floor is the top of the
    /// previous bracket, so nothing is taxed at the new rate until the income
    /// moves strictly above it. Non-positive income yields zero.
    pub fn tax_on(
        &self,
        income: Decimal,
    ) -> Decimal {
        if income <= Decimal::ZERO {
            return Decimal::ZERO;
        }

        let mut tax = Decimal::ZERO;
        for (i, bracket) in self.brackets.iter().enumerate() {
            if income <= bracket.floor {
                break;
            }
            let ceiling = self
                .brackets
                .get(i + 1)
                .map(|next| next.floor.min(income))
                .unwrap_or(income);
            tax += (ceiling - bracket.floor) * bracket.rate;
        }
        tax
    }

    /// Cumulative tax owed on income up to each bracket's floor.
    ///
    /// This is the `base_tax` column of IRS rate schedules.
    pub fn base_tax_at_floors(&self) -> Vec<Decimal> {
        self.brackets.iter().map(|b| self.tax_on(b.floor)).collect()
    }

    /// Marginal rate applied to the next dollar above `income`.
    pub fn marginal_rate(
        &self,
        income: Decimal,
    ) -> Decimal {
        self.brackets
            .iter()
            .rev()
            .find(|b| income >= b.floor)
            .map(|b| b.rate)
            .unwrap_or(Decimal::ZERO)
    }
}

impl TryFrom<Vec<TaxBracket>> for BracketSchedule {
    type Error = ConfigError;

    fn try_from(brackets: Vec<TaxBracket>) -> Result<Self, Self::Error> {
        Self::new(brackets)
    }
}

impl From<BracketSchedule> for Vec<TaxBracket> {
    fn from(schedule: BracketSchedule) -> Self {
        schedule.brackets
    }
}
