use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// The kind of account a lot is held in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AccountType {
    Taxable,
    Ira,
    RothIra,
    /// 401(k), 403(b), HSA brokerage and similar.
    OtherTaxAdvantaged,
    Other,
}

impl AccountType {
    /// True for accounts whose lots cannot carry a wash-sale basis adjustment.
    pub fn is_tax_advantaged(&self) -> bool {
        matches!(self, Self::Ira | Self::RothIra | Self::OtherTaxAdvantaged)
    }
}

/// A lot in the capital-transactions ledger.
///
/// A lot with `date_sold` set is a sale; every lot is also an acquisition
/// on `date_acquired`, which is what the wash-sale detector matches
/// replacements against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecurityTransaction {
    pub id: String,
    pub ticker: String,
    #[serde(default)]
    pub description: String,
    pub date_acquired: NaiveDate,
    #[serde(default)]
    pub date_sold: Option<NaiveDate>,
    #[serde(default)]
    pub proceeds: Decimal,
    pub cost_basis: Decimal,
    pub shares: Decimal,
    pub account_type: AccountType,
}

impl SecurityTransaction {
    pub fn is_sale(&self) -> bool {
        self.date_sold.is_some()
    }

    /// Realized loss for a sold lot (`cost_basis − proceeds`), if any.
    pub fn realized_loss(&self) -> Option<Decimal> {
        match self.date_sold {
            Some(_) if self.proceeds < self.cost_basis => Some(self.cost_basis - self.proceeds),
            _ => None,
        }
    }

    /// Days between acquisition and sale, or `None` for an open lot.
    pub fn days_held(&self) -> Option<i64> {
        self.date_sold
            .map(|sold| (sold - self.date_acquired).num_days())
    }

    /// Securities are "substantially identical" when their tickers match,
    /// ignoring case and surrounding whitespace.
    pub fn is_same_security(
        &self,
        other: &SecurityTransaction,
    ) -> bool {
        self.ticker.trim().eq_ignore_ascii_case(other.ticker.trim())
    }
}

/// Outcome of wash-sale detection for one loss sale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WashSaleInfo {
    pub is_wash_sale: bool,
    /// The full loss on the sale (`cost_basis − proceeds`).
    pub disallowed_loss: Decimal,
    /// Days the sold lot was held; added to the replacement's holding period.
    pub holding_period_adjustment_days: i64,
    /// True when the replacement sits in a tax-advantaged account, so the loss
    /// can never be recovered through a basis adjustment.
    pub is_permanent_disallowance: bool,
    pub replacement_account_type: AccountType,
    pub replacement_id: String,
    pub replacement_date: NaiveDate,
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    fn lot(sold: Option<NaiveDate>) -> SecurityTransaction {
        SecurityTransaction {
            id: "lot-1".to_string(),
            ticker: "VTI".to_string(),
            description: String::new(),
            date_acquired: NaiveDate::from_ymd_opt(2025, 1, 2).unwrap(),
            date_sold: sold,
            proceeds: dec!(900),
            cost_basis: dec!(1000),
            shares: dec!(10),
            account_type: AccountType::Taxable,
        }
    }

    #[test]
    fn realized_loss_only_for_sold_lots() {
        assert_eq!(lot(None).realized_loss(), None);
        assert_eq!(
            lot(NaiveDate::from_ymd_opt(2025, 3, 1)).realized_loss(),
            Some(dec!(100))
        );
    }

    #[test]
    fn days_held_counts_calendar_days() {
        let sale = lot(NaiveDate::from_ymd_opt(2025, 2, 1));

        assert_eq!(sale.days_held(), Some(30));
    }

    #[test]
    fn same_security_ignores_ticker_case() {
        let mut other = lot(None);
        other.ticker = " vti".to_string();

        assert!(lot(None).is_same_security(&other));
    }

    #[test]
    fn tax_advantaged_accounts() {
        assert!(AccountType::Ira.is_tax_advantaged());
        assert!(AccountType::RothIra.is_tax_advantaged());
        assert!(!AccountType::Taxable.is_tax_advantaged());
        assert!(!AccountType::Other.is_tax_advantaged());
    }
}
