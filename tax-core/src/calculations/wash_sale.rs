//! Wash-sale detection over a capital-transactions ledger.
//!
//! A loss sale in a taxable account is a wash sale when a substantially
//! identical security is acquired within 30 calendar days before or after
//! the sale date. The whole loss is disallowed. When the replacement sits in
//! a taxable account the loss moves into its basis and the sold lot's holding
//! period is tacked on; when it sits in a tax-advantaged account the loss is
//! gone for good.

use chrono::{NaiveDate, TimeDelta};
use tracing::debug;

use crate::calculations::common::round_to_cents;
use crate::models::{AccountType, SecurityTransaction, WashSaleInfo};

/// Calendar days on either side of the sale date.
pub const WASH_SALE_WINDOW_DAYS: i64 = 30;

/// The ±30 day window around one sale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WashSaleWindow {
    pub sale_date: NaiveDate,
    pub window_start: NaiveDate,
    pub window_end: NaiveDate,
}

impl WashSaleWindow {
    pub fn around(sale_date: NaiveDate) -> Self {
        let span = TimeDelta::days(WASH_SALE_WINDOW_DAYS);
        Self {
            sale_date,
            window_start: sale_date - span,
            window_end: sale_date + span,
        }
    }

    /// Both ends are inclusive.
    pub fn contains(
        &self,
        date: NaiveDate,
    ) -> bool {
        date >= self.window_start && date <= self.window_end
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct WashSaleDetector;

impl WashSaleDetector {
    pub fn new() -> Self {
        Self
    }

    /// One entry per ledger row: `Some` for a loss sale with a replacement,
    /// `None` for every other row.
    pub fn detect(
        &self,
        ledger: &[SecurityTransaction],
    ) -> Vec<Option<WashSaleInfo>> {
        ledger
            .iter()
            .enumerate()
            .map(|(index, sale)| self.check_sale(ledger, index, sale))
            .collect()
    }

    /// `(sale id, info)` for every detected wash sale, in ledger order.
    pub fn detect_sales(
        &self,
        ledger: &[SecurityTransaction],
    ) -> Vec<(String, WashSaleInfo)> {
        ledger
            .iter()
            .zip(self.detect(ledger))
            .filter_map(|(sale, info)| info.map(|info| (sale.id.clone(), info)))
            .collect()
    }

    fn check_sale(
        &self,
        ledger: &[SecurityTransaction],
        index: usize,
        sale: &SecurityTransaction,
    ) -> Option<WashSaleInfo> {
        if sale.account_type != AccountType::Taxable {
            return None;
        }
        let sale_date = sale.date_sold?;
        let loss = sale.realized_loss()?;

        let window = WashSaleWindow::around(sale_date);
        let replacement = Self::find_replacement(ledger, index, sale, &window)?;

        let info = WashSaleInfo {
            is_wash_sale: true,
            disallowed_loss: round_to_cents(loss),
            holding_period_adjustment_days: sale.days_held().unwrap_or(0),
            is_permanent_disallowance: replacement.account_type.is_tax_advantaged(),
            replacement_account_type: replacement.account_type,
            replacement_id: replacement.id.clone(),
            replacement_date: replacement.date_acquired,
        };
        debug!(
            sale_id = %sale.id,
            replacement_id = %info.replacement_id,
            disallowed_loss = %info.disallowed_loss,
            permanent = info.is_permanent_disallowance,
            "wash sale detected"
        );
        Some(info)
    }

    /// The first acquisition on or after the sale date; failing that, the
    /// closest one before it. Earlier ledger rows win ties.
    fn find_replacement<'a>(
        ledger: &'a [SecurityTransaction],
        index: usize,
        sale: &SecurityTransaction,
        window: &WashSaleWindow,
    ) -> Option<&'a SecurityTransaction> {
        let candidates = ledger
            .iter()
            .enumerate()
            .filter(|&(i, other)| {
                i != index && other.is_same_security(sale) && window.contains(other.date_acquired)
            })
            .map(|(_, other)| other);

        let mut after: Option<&SecurityTransaction> = None;
        let mut before: Option<&SecurityTransaction> = None;
        for candidate in candidates {
            if candidate.date_acquired >= window.sale_date {
                if after.is_none_or(|best| candidate.date_acquired < best.date_acquired) {
                    after = Some(candidate);
                }
            } else if before.is_none_or(|best| candidate.date_acquired > best.date_acquired) {
                before = Some(candidate);
            }
        }
        after.or(before)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    use super::*;

    fn date(
        month: u32,
        day: u32,
    ) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, month, day).expect("valid date")
    }

    fn buy(
        id: &str,
        acquired: NaiveDate,
        account_type: AccountType,
    ) -> SecurityTransaction {
        SecurityTransaction {
            id: id.to_string(),
            ticker: "VTI".to_string(),
            description: String::new(),
            date_acquired: acquired,
            date_sold: None,
            proceeds: Decimal::ZERO,
            cost_basis: dec!(1000),
            shares: dec!(10),
            account_type,
        }
    }

    fn loss_sale(
        acquired: NaiveDate,
        sold: NaiveDate,
    ) -> SecurityTransaction {
        SecurityTransaction {
            date_sold: Some(sold),
            proceeds: dec!(700),
            ..buy("sale", acquired, AccountType::Taxable)
        }
    }

    // =========================================================================
    // Window
    // =========================================================================

    #[test]
    fn purchase_ten_days_after_is_wash_sale() {
        let ledger = vec![
            loss_sale(date(1, 2), date(3, 1)),
            buy("rebuy", date(3, 11), AccountType::Taxable),
        ];

        let results = WashSaleDetector::new().detect(&ledger);

        let info = results[0].clone().expect("wash sale");
        assert!(info.is_wash_sale);
        assert_eq!(info.disallowed_loss, dec!(300));
        assert_eq!(info.replacement_id, "rebuy");
        assert_eq!(info.holding_period_adjustment_days, 58);
        assert!(!info.is_permanent_disallowance);
        assert_eq!(results[1], None);
    }

    #[test]
    fn purchase_forty_five_days_after_is_not() {
        let ledger = vec![
            loss_sale(date(1, 2), date(3, 1)),
            buy("rebuy", date(4, 15), AccountType::Taxable),
        ];

        let results = WashSaleDetector::new().detect(&ledger);

        assert!(results.iter().all(Option::is_none));
    }

    #[test]
    fn window_edges_are_inclusive() {
        let window = WashSaleWindow::around(date(3, 1));

        assert!(window.contains(date(1, 30)));
        assert!(window.contains(date(3, 31)));
        assert!(!window.contains(date(1, 29)));
        assert!(!window.contains(date(4, 1)));
    }

    #[test]
    fn purchase_before_sale_counts() {
        let ledger = vec![
            buy("early", date(2, 20), AccountType::Taxable),
            loss_sale(date(1, 2), date(3, 1)),
        ];

        let results = WashSaleDetector::new().detect(&ledger);

        assert_eq!(results[1].as_ref().map(|i| i.replacement_id.as_str()), Some("early"));
    }

    // =========================================================================
    // Replacement choice
    // =========================================================================

    #[test]
    fn prefers_first_purchase_on_or_after_sale() {
        let ledger = vec![
            loss_sale(date(1, 2), date(3, 1)),
            buy("before", date(2, 28), AccountType::Taxable),
            buy("later", date(3, 20), AccountType::Taxable),
            buy("sooner", date(3, 5), AccountType::Taxable),
        ];

        let sales = WashSaleDetector::new().detect_sales(&ledger);

        assert_eq!(sales.len(), 1);
        assert_eq!(sales[0].0, "sale");
        assert_eq!(sales[0].1.replacement_id, "sooner");
    }

    #[test]
    fn ledger_order_breaks_ties() {
        let ledger = vec![
            loss_sale(date(1, 2), date(3, 1)),
            buy("first", date(3, 5), AccountType::Taxable),
            buy("second", date(3, 5), AccountType::Ira),
        ];

        let sales = WashSaleDetector::new().detect_sales(&ledger);

        assert_eq!(sales[0].1.replacement_id, "first");
    }

    #[test]
    fn ira_replacement_is_permanent() {
        let ledger = vec![
            loss_sale(date(1, 2), date(3, 1)),
            buy("ira", date(3, 11), AccountType::Ira),
        ];

        let sales = WashSaleDetector::new().detect_sales(&ledger);

        assert!(sales[0].1.is_permanent_disallowance);
        assert_eq!(sales[0].1.replacement_account_type, AccountType::Ira);
    }

    // =========================================================================
    // Non-qualifying sales
    // =========================================================================

    #[test]
    fn gains_are_never_wash_sales() {
        let mut sale = loss_sale(date(1, 2), date(3, 1));
        sale.proceeds = dec!(1200);
        let ledger = vec![sale, buy("rebuy", date(3, 11), AccountType::Taxable)];

        assert!(WashSaleDetector::new().detect(&ledger).iter().all(Option::is_none));
    }

    #[test]
    fn sales_inside_an_ira_are_ignored() {
        let mut sale = loss_sale(date(1, 2), date(3, 1));
        sale.account_type = AccountType::Ira;
        let ledger = vec![sale, buy("rebuy", date(3, 11), AccountType::Taxable)];

        assert!(WashSaleDetector::new().detect(&ledger).iter().all(Option::is_none));
    }

    #[test]
    fn different_ticker_is_not_replacement() {
        let mut rebuy = buy("rebuy", date(3, 11), AccountType::Taxable);
        rebuy.ticker = "VOO".to_string();
        let ledger = vec![loss_sale(date(1, 2), date(3, 1)), rebuy];

        assert!(WashSaleDetector::new().detect(&ledger).iter().all(Option::is_none));
    }

    #[test]
    fn disallowed_loss_is_reported_in_cents() {
        let mut sale = loss_sale(date(1, 2), date(3, 1));
        sale.proceeds = dec!(700.004);
        sale.cost_basis = dec!(1000.0055);
        let ledger = vec![sale, buy("rebuy", date(3, 11), AccountType::Taxable)];

        let results = WashSaleDetector::new().detect(&ledger);

        // 300.0015 rounds to 300.00
        assert_eq!(results[0].as_ref().map(|i| i.disallowed_loss), Some(dec!(300.00)));
    }
}
