use chrono::NaiveDate;
use contracts::dashboards::d400_period_metrics::{
    AggregatedPeriodMetric, Bucket, Dimension, DimensionTotal, PeriodMetric,
};
use contracts::projections::p901_enriched_orders::EnrichedOrderRow;
use contracts::shared::indicators::Growth;
use rust_decimal::Decimal;
use std::collections::{BTreeMap, HashMap};

use super::growth::growth_between;
use super::totals::{dimension_value, totals_by_period_and_dimension, Totals};

/// Bucket rows by calendar period and, optionally, by a dimension.
///
/// Output is ordered by period, then dimension value. Growth compares each
/// group with the same dimension value in the bucket right before it, and
/// year-over-year growth with the bucket one year earlier. A comparison
/// bucket before the first bucket of a dimension value has no history; one
/// inside the history without orders is a zero baseline.
pub fn aggregate(
    rows: &[EnrichedOrderRow],
    bucket: Bucket,
    dimension: Dimension,
) -> Vec<AggregatedPeriodMetric> {
    let groups = totals_by_period_and_dimension(rows, bucket, dimension);

    // keys are ordered by period, so the first hit is the earliest bucket
    let mut first_bucket: HashMap<&Option<String>, NaiveDate> = HashMap::new();
    for (start, value) in groups.keys() {
        first_bucket.entry(value).or_insert(*start);
    }

    let mut result = Vec::with_capacity(groups.len());
    for ((start, value), totals) in &groups {
        let first = first_bucket.get(value).copied().unwrap_or(*start);
        let growth_against = |baseline_start: Option<NaiveDate>, metric: PeriodMetric| {
            let Some(baseline_start) = baseline_start.filter(|b| *b >= first) else {
                return Growth::InsufficientHistory;
            };
            let baseline = groups
                .get(&(baseline_start, value.clone()))
                .map_or(Some(Decimal::ZERO), |p| p.metric(metric));
            growth_between(totals.metric(metric), baseline)
        };
        let previous = bucket.previous(*start);
        let year_earlier = bucket.year_earlier(*start);

        result.push(AggregatedPeriodMetric {
            bucket,
            period_start: *start,
            period: bucket.label(*start),
            dimension_value: value.clone(),
            revenue: totals.metric(PeriodMetric::Revenue),
            net_revenue: totals.metric(PeriodMetric::NetRevenue),
            gross_profit: totals.metric(PeriodMetric::GrossProfit),
            net_profit: totals.metric(PeriodMetric::NetProfit),
            order_count: totals.order_count,
            avg_gross_margin: totals.avg_gross_margin(),
            avg_net_margin: totals.avg_net_margin(),
            revenue_growth: growth_against(previous, PeriodMetric::Revenue),
            net_profit_growth: growth_against(previous, PeriodMetric::NetProfit),
            revenue_growth_yoy: growth_against(year_earlier, PeriodMetric::Revenue),
            net_profit_growth_yoy: growth_against(year_earlier, PeriodMetric::NetProfit),
        });
    }

    tracing::debug!(
        "Aggregated {} rows into {} groups ({:?} x {:?})",
        rows.len(),
        result.len(),
        bucket,
        dimension
    );
    result
}

/// Totals per dimension value over the whole slice, largest revenue first.
/// Groups whose sums overflowed come last.
pub fn breakdown(rows: &[EnrichedOrderRow], dimension: Dimension) -> Vec<DimensionTotal> {
    let mut groups: BTreeMap<Option<String>, Totals> = BTreeMap::new();
    for row in rows {
        groups
            .entry(dimension_value(row, dimension))
            .or_default()
            .add(row);
    }

    let mut result: Vec<DimensionTotal> = groups
        .into_iter()
        .map(|(dimension_value, t)| DimensionTotal {
            dimension_value,
            revenue: t.metric(PeriodMetric::Revenue),
            gross_profit: t.metric(PeriodMetric::GrossProfit),
            net_profit: t.metric(PeriodMetric::NetProfit),
            order_count: t.order_count,
        })
        .collect();
    // stable sort keeps key order among equal revenues
    result.sort_by(|a, b| b.revenue.cmp(&a.revenue));
    result
}
