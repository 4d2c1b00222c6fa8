use chrono::NaiveDate;
use contracts::dashboards::d400_period_metrics::{Bucket, Dimension, PeriodMetric};
use contracts::enums::channel::Channel;
use contracts::projections::p901_enriched_orders::EnrichedOrderRow;
use rust_decimal::Decimal;
use std::collections::BTreeMap;

const HUNDRED: Decimal = Decimal::ONE_HUNDRED;

/// Running sums over a set of enriched rows.
///
/// Every sum is checked. Once one of them overflows the totals are marked
/// inexact and every accessor that depends on a sum returns `None`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Totals {
    pub revenue: Decimal,
    pub net_revenue: Decimal,
    pub gross_profit: Decimal,
    pub net_profit: Decimal,
    pub cogs: Decimal,
    pub platform_fees: Decimal,
    pub shipping: Decimal,
    pub refunds: Decimal,
    pub tax: Decimal,
    pub discounts: Decimal,
    pub order_count: u64,
    /// Sum of per-order gross margin %, for the mean
    gross_margin_sum: Decimal,
    /// Sum of per-order net margin %, for the mean
    net_margin_sum: Decimal,
    overflowed: bool,
}

impl Totals {
    pub fn from_rows<'a>(rows: impl IntoIterator<Item = &'a EnrichedOrderRow>) -> Self {
        let mut totals = Self::default();
        for row in rows {
            totals.add(row);
        }
        totals
    }

    pub fn add(&mut self, row: &EnrichedOrderRow) {
        // canonical rows always carry positive revenue
        let (gross_margin, net_margin) = if row.order.revenue > Decimal::ZERO {
            (
                percent_of(row.gross_profit, row.order.revenue),
                percent_of(row.net_profit, row.order.revenue),
            )
        } else {
            (Some(Decimal::ZERO), Some(Decimal::ZERO))
        };

        let fits = self.accumulate([
            Some(row.order.revenue),
            Some(row.net_revenue),
            Some(row.gross_profit),
            Some(row.net_profit),
            Some(row.cogs),
            Some(row.platform_fee),
            Some(row.order.shipping_cost),
            Some(row.refund_amount),
            Some(row.order.tax),
            Some(row.order.discount),
            gross_margin,
            net_margin,
        ]);
        self.order_count += 1;
        self.overflowed |= !fits;
    }

    pub fn merge(&mut self, other: &Totals) {
        let fits = self.accumulate([
            Some(other.revenue),
            Some(other.net_revenue),
            Some(other.gross_profit),
            Some(other.net_profit),
            Some(other.cogs),
            Some(other.platform_fees),
            Some(other.shipping),
            Some(other.refunds),
            Some(other.tax),
            Some(other.discounts),
            Some(other.gross_margin_sum),
            Some(other.net_margin_sum),
        ]);
        self.order_count += other.order_count;
        self.overflowed |= other.overflowed || !fits;
    }

    /// Adds the values in field order; `false` when any of them is missing
    /// or its sum overflows. Such sums keep their previous value.
    fn accumulate(&mut self, values: [Option<Decimal>; 12]) -> bool {
        let sums = [
            &mut self.revenue,
            &mut self.net_revenue,
            &mut self.gross_profit,
            &mut self.net_profit,
            &mut self.cogs,
            &mut self.platform_fees,
            &mut self.shipping,
            &mut self.refunds,
            &mut self.tax,
            &mut self.discounts,
            &mut self.gross_margin_sum,
            &mut self.net_margin_sum,
        ];
        let mut fits = true;
        for (sum, value) in sums.into_iter().zip(values) {
            match value.and_then(|v| sum.checked_add(v)) {
                Some(next) => *sum = next,
                None => fits = false,
            }
        }
        fits
    }

    /// `false` once any sum has overflowed
    pub fn is_exact(&self) -> bool {
        !self.overflowed
    }

    /// `value` when every sum is exact
    pub fn exact(&self, value: Decimal) -> Option<Decimal> {
        self.is_exact().then_some(value)
    }

    pub fn metric(&self, metric: PeriodMetric) -> Option<Decimal> {
        match metric {
            PeriodMetric::Revenue => self.exact(self.revenue),
            PeriodMetric::NetRevenue => self.exact(self.net_revenue),
            PeriodMetric::GrossProfit => self.exact(self.gross_profit),
            PeriodMetric::NetProfit => self.exact(self.net_profit),
            PeriodMetric::OrderCount => Some(Decimal::from(self.order_count)),
        }
    }

    pub fn avg_gross_margin(&self) -> Option<Decimal> {
        self.mean(self.gross_margin_sum)
    }

    pub fn avg_net_margin(&self) -> Option<Decimal> {
        self.mean(self.net_margin_sum)
    }

    /// `part / whole * 100` over two exact sums
    pub fn share(&self, part: Decimal, whole: Decimal) -> Option<Decimal> {
        percent_of(self.exact(part)?, self.exact(whole)?)
    }

    /// Net revenue per order; `None` without orders
    pub fn average_order_value(&self) -> Option<Decimal> {
        if self.order_count == 0 {
            return None;
        }
        self.exact(self.net_revenue)?
            .checked_div(Decimal::from(self.order_count))
    }

    fn mean(&self, sum: Decimal) -> Option<Decimal> {
        if self.order_count == 0 {
            self.exact(Decimal::ZERO)
        } else {
            self.exact(sum)?.checked_div(Decimal::from(self.order_count))
        }
    }
}

/// `part / whole * 100`, undefined for a non-positive whole or a result
/// outside the `Decimal` range
pub fn percent_of(part: Decimal, whole: Decimal) -> Option<Decimal> {
    if whole > Decimal::ZERO {
        part.checked_div(whole)?.checked_mul(HUNDRED)
    } else {
        None
    }
}

/// Calendar date of an order (UTC)
pub fn order_date(row: &EnrichedOrderRow) -> NaiveDate {
    row.order.timestamp.date_naive()
}

/// Grouping value of a row for a dimension
pub fn dimension_value(row: &EnrichedOrderRow, dimension: Dimension) -> Option<String> {
    match dimension {
        Dimension::Channel => Some(channel_label(row.order.channel)),
        Dimension::State => row.order.state.clone(),
        Dimension::Product => row.order.product.clone(),
        Dimension::None => None,
    }
}

fn channel_label(channel: Channel) -> String {
    channel.display_name().to_string()
}

/// Totals per bucket start, ascending
pub fn totals_by_period(rows: &[EnrichedOrderRow], bucket: Bucket) -> BTreeMap<NaiveDate, Totals> {
    let mut periods: BTreeMap<NaiveDate, Totals> = BTreeMap::new();
    for row in rows {
        periods
            .entry(bucket.truncate(order_date(row)))
            .or_default()
            .add(row);
    }
    periods
}

/// Totals per (bucket start, dimension value), ascending
pub fn totals_by_period_and_dimension(
    rows: &[EnrichedOrderRow],
    bucket: Bucket,
    dimension: Dimension,
) -> BTreeMap<(NaiveDate, Option<String>), Totals> {
    let mut groups: BTreeMap<(NaiveDate, Option<String>), Totals> = BTreeMap::new();
    for row in rows {
        let key = (bucket.truncate(order_date(row)), dimension_value(row, dimension));
        groups.entry(key).or_default().add(row);
    }
    groups
}

/// Every bucket start from `first` through `last`
pub fn bucket_range(bucket: Bucket, first: NaiveDate, last: NaiveDate) -> Vec<NaiveDate> {
    let mut starts = Vec::new();
    let mut cursor = Some(bucket.truncate(first));
    while let Some(start) = cursor {
        if start > last {
            break;
        }
        starts.push(start);
        cursor = bucket.next(start);
    }
    starts
}

#[cfg(test)]
pub(crate) mod test_rows {
    use chrono::{TimeZone, Utc};
    use contracts::enums::channel::Channel;
    use contracts::enums::order_status::OrderStatus;
    use contracts::projections::p900_canonical_orders::CanonicalOrderRow;
    use contracts::projections::p901_enriched_orders::EnrichedOrderRow;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    use crate::projections::p901_enriched_orders::enrich_row;

    /// Paid order without shipping, tax or discount
    pub fn order(channel: Channel, y: i32, m: u32, d: u32, revenue: Decimal) -> EnrichedOrderRow {
        enrich_row(
            CanonicalOrderRow {
                order_id: format!("{}-{}{:02}{:02}", channel.code(), y, m, d),
                timestamp: Utc.with_ymd_and_hms(y, m, d, 10, 0, 0).unwrap(),
                channel,
                revenue,
                shipping_cost: Decimal::ZERO,
                tax: Decimal::ZERO,
                discount: Decimal::ZERO,
                state: None,
                product: None,
                status: OrderStatus::Paid,
                source_status: None,
                fulfillment_status: None,
                shipping_terms: None,
            },
            dec!(0.40),
        )
    }

    pub fn with_state(mut row: EnrichedOrderRow, state: &str) -> EnrichedOrderRow {
        row.order.state = Some(state.to_string());
        row
    }
}

#[cfg(test)]
mod tests {
    use super::test_rows::order;
    use super::*;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_totals_and_mean_margins() {
        let rows = vec![
            order(Channel::Shopify, 2024, 3, 1, dec!(100)),
            order(Channel::Walmart, 2024, 3, 2, dec!(100)),
        ];
        let totals = Totals::from_rows(&rows);
        assert_eq!(totals.revenue, dec!(200));
        assert_eq!(totals.order_count, 2);
        // Shopify 53.8 %, Walmart 45 % of revenue
        assert_eq!(totals.avg_net_margin(), Some(dec!(49.4)));
        assert_eq!(totals.avg_gross_margin(), Some(dec!(60)));
        assert_eq!(totals.average_order_value(), Some(dec!(100)));
    }

    #[test]
    fn test_merge_equals_single_pass() {
        let rows = vec![
            order(Channel::Shopify, 2024, 1, 5, dec!(80)),
            order(Channel::Amazon, 2024, 2, 7, dec!(45.50)),
            order(Channel::Walmart, 2024, 2, 9, dec!(19.99)),
        ];
        let mut merged = Totals::from_rows(&rows[..1]);
        merged.merge(&Totals::from_rows(&rows[1..]));
        assert_eq!(merged, Totals::from_rows(&rows));
    }

    #[test]
    fn test_empty_totals() {
        let totals = Totals::default();
        assert_eq!(totals.average_order_value(), None);
        assert_eq!(totals.avg_gross_margin(), Some(Decimal::ZERO));
        assert_eq!(percent_of(dec!(5), Decimal::ZERO), None);
        assert_eq!(percent_of(dec!(5), dec!(20)), Some(dec!(25)));
    }

    #[test]
    fn test_overflowing_sums_are_undefined() {
        let huge = Decimal::MAX / Decimal::TWO;
        let rows = vec![
            order(Channel::Shopify, 2024, 3, 1, huge),
            order(Channel::Shopify, 2024, 3, 2, huge),
            order(Channel::Shopify, 2024, 3, 3, huge),
        ];
        let totals = Totals::from_rows(&rows);
        assert!(!totals.is_exact());
        assert_eq!(totals.order_count, 3);
        assert_eq!(totals.metric(PeriodMetric::Revenue), None);
        assert_eq!(totals.metric(PeriodMetric::OrderCount), Some(dec!(3)));
        assert_eq!(totals.average_order_value(), None);
        assert_eq!(totals.avg_net_margin(), None);
        assert_eq!(totals.share(totals.cogs, totals.revenue), None);

        let mut merged = Totals::from_rows(&rows[..1]);
        assert!(merged.is_exact());
        merged.merge(&totals);
        assert!(!merged.is_exact());
    }

    #[test]
    fn test_percent_of_out_of_range_is_undefined() {
        assert_eq!(percent_of(Decimal::MAX, Decimal::new(1, 4)), None);
    }

    #[test]
    fn test_bucket_range_is_contiguous() {
        let months = bucket_range(Bucket::Month, date(2023, 11, 20), date(2024, 2, 1));
        assert_eq!(
            months,
            vec![date(2023, 11, 1), date(2023, 12, 1), date(2024, 1, 1), date(2024, 2, 1)]
        );
        assert_eq!(bucket_range(Bucket::Day, date(2024, 1, 2), date(2024, 1, 1)), vec![]);
    }
}
