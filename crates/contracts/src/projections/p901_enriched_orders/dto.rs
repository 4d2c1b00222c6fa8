use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::projections::p900_canonical_orders::CanonicalOrderRow;

/// Canonical row plus the cost-model fields derived from it.
///
/// Field relations (hold for every row built by the calculator):
/// - `cogs = revenue * cogs_rate`
/// - `refund_amount` is `revenue` for refunded orders, otherwise `0`
/// - `net_revenue = revenue - refund_amount - tax - discount`
/// - `gross_profit = net_revenue - cogs`
/// - `net_profit = gross_profit - shipping_cost - platform_fee`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedOrderRow {
    #[serde(flatten)]
    pub order: CanonicalOrderRow,

    pub cogs: Decimal,
    pub platform_fee: Decimal,
    pub refund_amount: Decimal,
    pub net_revenue: Decimal,
    pub gross_profit: Decimal,
    pub net_profit: Decimal,
}
