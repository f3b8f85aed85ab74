//! Derived totals for an estimate.

use crate::error::{EditorError, Result};
use crate::models::LineItem;
use rust_decimal::Decimal;
use serde::Serialize;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Totals {
    pub cost: Decimal,
    pub retail: Decimal,
    pub profit: Decimal,
    pub markup_pct: Decimal,
    pub margin_pct: Decimal,
}

/// Aggregate the top-level rows. Bundle children are line details of their
/// bundle and never count on their own.
///
/// Markup and margin are 0 when their denominator is 0. Sums too large for
/// a `Decimal` are an `OutOfRange` error.
pub fn compute_totals(items: &[LineItem]) -> Result<Totals> {
    let mut cost = Decimal::ZERO;
    let mut retail = Decimal::ZERO;
    for item in items.iter().filter(|i| i.is_top_level()) {
        let line_retail = item.quantity.checked_mul(item.unit_retail);
        cost = item
            .line_total()
            .and_then(|line| cost.checked_add(line))
            .ok_or_else(|| overflow("cost", item))?;
        retail = line_retail
            .and_then(|line| retail.checked_add(line))
            .ok_or_else(|| overflow("retail", item))?;
    }

    let profit = retail
        .checked_sub(cost)
        .ok_or_else(|| EditorError::OutOfRange("profit overflows".to_string()))?;
    let markup_pct = percent_of(profit, cost);
    let margin_pct = percent_of(profit, retail);

    Ok(Totals {
        cost,
        retail,
        profit,
        markup_pct,
        margin_pct,
    })
}

fn percent_of(part: Decimal, whole: Decimal) -> Decimal {
    if whole <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    part.checked_div(whole)
        .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
        .map(|pct| pct.round_dp(2))
        .unwrap_or(Decimal::ZERO)
}

fn overflow(field: &str, item: &LineItem) -> EditorError {
    EditorError::OutOfRange(format!("{} total overflows at item {}", field, item.id))
}
