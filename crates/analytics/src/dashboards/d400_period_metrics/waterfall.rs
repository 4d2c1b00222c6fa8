use contracts::dashboards::d400_period_metrics::{WaterfallKind, WaterfallStep};
use contracts::projections::p901_enriched_orders::EnrichedOrderRow;
use rust_decimal::Decimal;
use tracing::warn;

use super::totals::Totals;

/// Revenue walked down to net profit. The relative steps sum to the closing
/// total. Empty when the totals do not fit in a `Decimal`.
pub fn profit_waterfall(rows: &[EnrichedOrderRow]) -> Vec<WaterfallStep> {
    let t = Totals::from_rows(rows);
    if !t.is_exact() {
        warn!(rows = rows.len(), "Profit waterfall skipped: totals overflow");
        return Vec::new();
    }
    vec![
        step("Revenue", WaterfallKind::Relative, t.revenue),
        step("Refunds", WaterfallKind::Relative, -t.refunds),
        step("Tax", WaterfallKind::Relative, -t.tax),
        step("Discounts", WaterfallKind::Relative, -t.discounts),
        step("COGS", WaterfallKind::Relative, -t.cogs),
        step("Shipping", WaterfallKind::Relative, -t.shipping),
        step("Fees", WaterfallKind::Relative, -t.platform_fees),
        step("Net Profit", WaterfallKind::Total, t.net_profit),
    ]
}

fn step(label: &str, kind: WaterfallKind, amount: Decimal) -> WaterfallStep {
    WaterfallStep {
        label: label.to_string(),
        kind,
        amount,
    }
}
