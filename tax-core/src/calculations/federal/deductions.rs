//! Standard vs itemized deduction election.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::calculations::common::{non_negative, round_to_cents};
use crate::models::{Deductions, ItemizedDeductions, TaxYearConfig, TaxpayerInfo};

/// Outcome of the election, every amount in cents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeductionElection {
    pub standard: Decimal,
    /// Allowed itemized total when itemized amounts were supplied.
    pub itemized: Option<Decimal>,
    pub used: Decimal,
    pub used_itemized: bool,
    /// SALT actually deducted; zero unless itemizing.
    pub salt_deduction: Decimal,
}

/// Base standard deduction plus the additional amount for each filer who is
/// 65 or older and for each who is blind.
pub fn standard_deduction(
    config: &TaxYearConfig,
    taxpayer: &TaxpayerInfo,
) -> Decimal {
    let status = taxpayer.filing_status;
    let extra = &config.additional_standard_deduction;
    let per_condition = if status.is_married() {
        extra.married
    } else {
        extra.unmarried
    };

    let is_senior = |age: Option<u32>| age.is_some_and(|a| a >= extra.age_threshold);
    let mut conditions = u32::from(is_senior(taxpayer.age)) + u32::from(taxpayer.is_blind);
    if status.is_joint() {
        conditions += u32::from(is_senior(taxpayer.spouse_age)) + u32::from(taxpayer.spouse_is_blind);
    }

    *config.standard_deduction.get(status) + per_condition * Decimal::from(conditions)
}

/// Allowed itemized deductions: medical above the AGI floor, capped state and
/// local taxes, and everything else at face value.
///
/// Returns `(total, salt_deduction)`.
pub fn itemized_deduction(
    config: &TaxYearConfig,
    taxpayer: &TaxpayerInfo,
    itemized: &ItemizedDeductions,
    agi: Decimal,
) -> (Decimal, Decimal) {
    let medical = round_to_cents(non_negative(
        itemized.medical_expenses - agi * config.itemized.medical_agi_floor,
    ));
    let salt = itemized
        .total_taxes_paid()
        .min(*config.itemized.salt_cap.get(taxpayer.filing_status));
    let total = medical
        + salt
        + itemized.mortgage_interest
        + itemized.charitable()
        + itemized.casualty_losses
        + itemized.other;
    (round_to_cents(total), round_to_cents(salt))
}

/// Chooses the larger deduction. Equal amounts select the standard
/// deduction, and `force_standard` always does.
pub fn elect(
    config: &TaxYearConfig,
    taxpayer: &TaxpayerInfo,
    deductions: &Deductions,
    agi: Decimal,
) -> DeductionElection {
    let standard = round_to_cents(standard_deduction(config, taxpayer));
    let itemized = deductions
        .itemized
        .as_ref()
        .map(|items| itemized_deduction(config, taxpayer, items, agi));

    let election = match itemized {
        Some((total, salt)) if !deductions.force_standard && total > standard => {
            DeductionElection {
                standard,
                itemized: Some(total),
                used: total,
                used_itemized: true,
                salt_deduction: salt,
            }
        }
        _ => DeductionElection {
            standard,
            itemized: itemized.map(|(total, _)| total),
            used: standard,
            used_itemized: false,
            salt_deduction: Decimal::ZERO,
        },
    };

    debug!(
        standard = %election.standard,
        itemized = ?election.itemized,
        used_itemized = election.used_itemized,
        "deduction election"
    );
    election
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::config::TaxYearConfigStore;
    use crate::models::FilingStatus;

    fn config_2025() -> std::sync::Arc<TaxYearConfig> {
        TaxYearConfigStore::builtin()
            .expect("builtin configs are valid")
            .load(2025)
            .expect("2025 registered")
    }

    // =========================================================================
    // Standard deduction
    // =========================================================================

    #[test]
    fn single_under_65_gets_base_amount() {
        let config = config_2025();
        let taxpayer = TaxpayerInfo::new(FilingStatus::Single, "CA");

        assert_eq!(standard_deduction(&config, &taxpayer), dec!(15750));
    }

    #[test]
    fn single_senior_and_blind_gets_two_unmarried_additions() {
        let config = config_2025();
        let mut taxpayer = TaxpayerInfo::new(FilingStatus::Single, "CA");
        taxpayer.age = Some(67);
        taxpayer.is_blind = true;

        assert_eq!(standard_deduction(&config, &taxpayer), dec!(19750));
    }

    #[test]
    fn joint_filers_count_both_spouses() {
        let config = config_2025();
        let mut taxpayer = TaxpayerInfo::new(FilingStatus::MarriedFilingJointly, "CA");
        taxpayer.age = Some(66);
        taxpayer.spouse_age = Some(65);

        assert_eq!(standard_deduction(&config, &taxpayer), dec!(34700));
    }

    #[test]
    fn unknown_age_adds_nothing() {
        let config = config_2025();
        let taxpayer = TaxpayerInfo::new(FilingStatus::HeadOfHousehold, "TX");

        assert_eq!(standard_deduction(&config, &taxpayer), dec!(23625));
    }

    // =========================================================================
    // Election
    // =========================================================================

    #[test]
    fn tie_selects_standard() {
        let config = config_2025();
        let taxpayer = TaxpayerInfo::new(FilingStatus::Single, "CA");
        let deductions = Deductions {
            itemized: Some(ItemizedDeductions {
                mortgage_interest: dec!(15750),
                ..Default::default()
            }),
            ..Default::default()
        };

        let election = elect(&config, &taxpayer, &deductions, dec!(100000));

        assert!(!election.used_itemized);
        assert_eq!(election.used, dec!(15750));
        assert_eq!(election.itemized, Some(dec!(15750.00)));
    }

    #[test]
    fn larger_itemized_wins() {
        let config = config_2025();
        let taxpayer = TaxpayerInfo::new(FilingStatus::Single, "CA");
        let deductions = Deductions {
            itemized: Some(ItemizedDeductions {
                mortgage_interest: dec!(12000),
                state_and_local_income_taxes: dec!(9000),
                charitable_cash: dec!(1000),
                ..Default::default()
            }),
            ..Default::default()
        };

        let election = elect(&config, &taxpayer, &deductions, dec!(150000));

        assert!(election.used_itemized);
        assert_eq!(election.used, dec!(22000.00));
        assert_eq!(election.salt_deduction, dec!(9000.00));
    }

    #[test]
    fn force_standard_overrides_larger_itemized() {
        let config = config_2025();
        let taxpayer = TaxpayerInfo::new(FilingStatus::Single, "CA");
        let deductions = Deductions {
            itemized: Some(ItemizedDeductions {
                mortgage_interest: dec!(30000),
                ..Default::default()
            }),
            force_standard: true,
            ..Default::default()
        };

        let election = elect(&config, &taxpayer, &deductions, dec!(150000));

        assert!(!election.used_itemized);
        assert_eq!(election.used, dec!(15750));
    }

    #[test]
    fn medical_floor_and_salt_cap_apply() {
        let config = config_2025();
        let taxpayer = TaxpayerInfo::new(FilingStatus::MarriedFilingSeparately, "NY");
        let items = ItemizedDeductions {
            medical_expenses: dec!(10000),
            state_and_local_income_taxes: dec!(18000),
            real_estate_taxes: dec!(7000),
            ..Default::default()
        };

        let (total, salt) = itemized_deduction(&config, &taxpayer, &items, dec!(100000));

        // medical: 10,000 - 7,500 = 2,500; SALT capped at 20,000 for MFS
        assert_eq!(salt, dec!(20000.00));
        assert_eq!(total, dec!(22500.00));
    }
}
