use contracts::projections::p900_canonical_orders::CanonicalOrderRow;
use contracts::projections::p901_enriched_orders::EnrichedOrderRow;
use rust_decimal::Decimal;

use super::fee_model::FeeModel;

/// Attach the cost model to every row. Rows are independent of each other;
/// output order equals input order.
pub fn enrich(rows: Vec<CanonicalOrderRow>, cogs_rate: Decimal) -> Vec<EnrichedOrderRow> {
    rows.into_iter()
        .map(|row| enrich_row(row, cogs_rate))
        .collect()
}

pub fn enrich_row(order: CanonicalOrderRow, cogs_rate: Decimal) -> EnrichedOrderRow {
    let cogs = order.revenue * cogs_rate;
    let platform_fee = FeeModel::for_channel(order.channel).fee(order.revenue);
    let refund_amount = if order.status.is_refunded() {
        order.revenue
    } else {
        Decimal::ZERO
    };
    let net_revenue = order.revenue - refund_amount - order.tax - order.discount;
    let gross_profit = net_revenue - cogs;
    let net_profit = gross_profit - order.shipping_cost - platform_fee;

    EnrichedOrderRow {
        order,
        cogs,
        platform_fee,
        refund_amount,
        net_revenue,
        gross_profit,
        net_profit,
    }
}
