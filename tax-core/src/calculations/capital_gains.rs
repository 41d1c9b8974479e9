//! Realized gains for the year, after wash-sale adjustments.

use std::collections::HashMap;

use chrono::{Datelike, Months, NaiveDate, TimeDelta};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::calculations::common::{non_negative, round_to_cents};
use crate::models::{CapitalGainsSummary, SecurityTransaction, WashSaleInfo};

/// One sold lot after basis and holding-period adjustments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RealizedLot {
    pub id: String,
    pub proceeds: Decimal,
    /// Cost basis plus any loss carried in from a wash sale.
    pub adjusted_basis: Decimal,
    /// Recognized gain (loss negative); zero for a wash sale.
    pub gain: Decimal,
    pub disallowed_loss: Decimal,
    pub long_term: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapitalGainsRollup {
    pub lots: Vec<RealizedLot>,
    pub short_term_gain: Decimal,
    pub long_term_gain: Decimal,
    pub disallowed_wash_sale_loss: Decimal,
}

#[derive(Debug, Clone, Copy, Default)]
struct CarriedIn {
    basis: Decimal,
    days: i64,
}

/// Long-term when sold more than one year after the (possibly tacked)
/// acquisition date.
fn is_long_term(
    acquired: NaiveDate,
    sold: NaiveDate,
) -> bool {
    acquired
        .checked_add_months(Months::new(12))
        .is_some_and(|anniversary| sold > anniversary)
}

/// Where a sale processed earlier in the pass ended up.
#[derive(Debug, Clone, Copy)]
struct Processed {
    /// Index into `lots`, or `None` for a sale outside the tax year.
    position: Option<usize>,
    acquired: NaiveDate,
    sold: NaiveDate,
}

impl CapitalGainsRollup {
    /// Rolls up the lots sold during `tax_year` outside tax-advantaged
    /// accounts.
    ///
    /// `wash_sales` is parallel to `ledger`, as returned by
    /// [`WashSaleDetector::detect`](crate::calculations::WashSaleDetector::detect).
    /// Sales are processed in sale-date order so a replacement lot sees the
    /// basis carried in from earlier wash sales. Sales from other years are
    /// not recognized but still pass disallowed losses on to their
    /// replacements. When the replacement was itself sold earlier in the year,
    /// the disallowed loss is recognized on that sale instead.
    pub fn from_ledger(
        ledger: &[SecurityTransaction],
        wash_sales: &[Option<WashSaleInfo>],
        tax_year: i32,
    ) -> Self {
        let index_by_id: HashMap<&str, usize> = ledger
            .iter()
            .enumerate()
            .map(|(i, lot)| (lot.id.as_str(), i))
            .collect();

        let mut order: Vec<usize> = (0..ledger.len())
            .filter(|&i| ledger[i].is_sale() && !ledger[i].account_type.is_tax_advantaged())
            .collect();
        order.sort_by_key(|&i| (ledger[i].date_sold, i));

        let mut carried: HashMap<usize, CarriedIn> = HashMap::new();
        let mut processed: HashMap<usize, Processed> = HashMap::new();
        let mut rollup = Self::default();

        for i in order {
            let lot = &ledger[i];
            let Some(sold) = lot.date_sold else { continue };
            let extra = carried.remove(&i).unwrap_or_default();
            let adjusted_basis = lot.cost_basis + extra.basis;
            let acquired = lot.date_acquired - TimeDelta::days(extra.days);
            let long_term = is_long_term(acquired, sold);
            let raw_gain = lot.proceeds - adjusted_basis;

            let wash = wash_sales.get(i).and_then(Option::as_ref);
            let (gain, disallowed_loss) = match wash {
                Some(info) if raw_gain < Decimal::ZERO => {
                    let disallowed = -raw_gain;
                    let days = (sold - acquired).num_days();
                    let target = index_by_id.get(info.replacement_id.as_str()).copied();
                    if let Some(target) = target.filter(|_| !info.is_permanent_disallowance) {
                        match processed.get(&target).copied() {
                            Some(earlier) => rollup.recredit(earlier, disallowed, days),
                            None => {
                                let entry = carried.entry(target).or_default();
                                entry.basis += disallowed;
                                entry.days += days;
                            }
                        }
                    }
                    (Decimal::ZERO, round_to_cents(disallowed))
                }
                _ => (round_to_cents(raw_gain), Decimal::ZERO),
            };

            let position = if sold.year() == tax_year {
                rollup.add(long_term, gain);
                rollup.disallowed_wash_sale_loss += disallowed_loss;
                rollup.lots.push(RealizedLot {
                    id: lot.id.clone(),
                    proceeds: lot.proceeds,
                    adjusted_basis,
                    gain,
                    disallowed_loss,
                    long_term,
                });
                Some(rollup.lots.len() - 1)
            } else {
                debug!(lot_id = %lot.id, %sold, tax_year, "sale outside the tax year");
                None
            };
            processed.insert(i, Processed { position, acquired, sold });
        }

        debug!(
            short_term = %rollup.short_term_gain,
            long_term = %rollup.long_term_gain,
            disallowed = %rollup.disallowed_wash_sale_loss,
            "capital gains rollup"
        );
        rollup
    }

    fn add(
        &mut self,
        long_term: bool,
        gain: Decimal,
    ) {
        if long_term {
            self.long_term_gain += gain;
        } else {
            self.short_term_gain += gain;
        }
    }

    /// Moves a disallowed loss into a replacement lot that was already sold,
    /// tacking `days` onto its holding period.
    fn recredit(
        &mut self,
        replacement: Processed,
        disallowed: Decimal,
        days: i64,
    ) {
        let Some(lot) = replacement.position.and_then(|p| self.lots.get_mut(p)) else {
            debug!(%disallowed, "replacement sold outside the tax year; loss not recognized");
            return;
        };
        let (old_term, old_gain) = (lot.long_term, lot.gain);

        lot.adjusted_basis += disallowed;
        lot.gain = old_gain - round_to_cents(disallowed);
        lot.long_term = is_long_term(replacement.acquired - TimeDelta::days(days), replacement.sold);
        let (new_term, new_gain) = (lot.long_term, lot.gain);

        self.add(old_term, -old_gain);
        self.add(new_term, new_gain);
    }

    /// Applies the annual capital-loss limit.
    ///
    /// `distributions` are capital-gain distributions, treated as long-term.
    pub fn summarize(
        &self,
        distributions: Decimal,
        loss_limit: Decimal,
    ) -> CapitalGainsSummary {
        let short_term_gain = self.short_term_gain;
        let long_term_gain = self.long_term_gain + round_to_cents(distributions);
        let net_gain = short_term_gain + long_term_gain;

        let (included_in_income, loss_carryover) = if net_gain >= Decimal::ZERO {
            (net_gain, Decimal::ZERO)
        } else {
            let loss = -net_gain;
            (-loss.min(loss_limit), non_negative(loss - loss_limit))
        };

        CapitalGainsSummary {
            short_term_gain,
            long_term_gain,
            disallowed_wash_sale_loss: self.disallowed_wash_sale_loss,
            net_gain,
            included_in_income,
            loss_carryover,
        }
    }
}
