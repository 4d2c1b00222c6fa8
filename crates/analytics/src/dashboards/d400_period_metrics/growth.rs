use chrono::NaiveDate;
use contracts::dashboards::d400_period_metrics::{Bucket, GrowthPoint, PeriodMetric};
use contracts::projections::p901_enriched_orders::EnrichedOrderRow;
use contracts::shared::indicators::Growth;
use rust_decimal::Decimal;
use std::collections::BTreeMap;

use super::totals::{bucket_range, totals_by_period, Totals};

const MONTHS_PER_YEAR: Decimal = Decimal::from_parts(12, 0, 0, false, 0);

/// `(current - previous) / previous * 100`; a zero baseline has no growth
pub fn growth_percent(current: Decimal, previous: Decimal) -> Growth {
    if previous.is_zero() {
        return Growth::NoPriorData;
    }
    current
        .checked_sub(previous)
        .and_then(|delta| delta.checked_div(previous))
        .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
        .map_or(Growth::OutOfRange, |percent| Growth::Actual { percent })
}

/// [`growth_percent`] over values that may have overflowed upstream
pub fn growth_between(current: Option<Decimal>, previous: Option<Decimal>) -> Growth {
    match (current, previous) {
        (Some(current), Some(previous)) => growth_percent(current, previous),
        _ => Growth::OutOfRange,
    }
}

/// Growth of the latest bucket against the bucket right before it on the
/// calendar. A calendar gap reads as a zero baseline.
pub fn latest_growth(
    periods: &BTreeMap<NaiveDate, Totals>,
    bucket: Bucket,
    metric: PeriodMetric,
) -> Growth {
    if periods.len() < 2 {
        return Growth::InsufficientHistory;
    }
    let Some((&latest, current)) = periods.iter().next_back() else {
        return Growth::InsufficientHistory;
    };
    let previous = bucket
        .previous(latest)
        .and_then(|start| periods.get(&start))
        .map_or(Some(Decimal::ZERO), |totals| totals.metric(metric));
    growth_between(current.metric(metric), previous)
}

/// Month-over-month growth of the latest month
pub fn mom_growth(rows: &[EnrichedOrderRow], metric: PeriodMetric) -> Growth {
    latest_growth(&totals_by_period(rows, Bucket::Month), Bucket::Month, metric)
}

/// Year-over-year growth of the latest year.
///
/// With fewer than two calendar years of data the result is MoM × 12,
/// tagged as extrapolated. An undefined MoM stays undefined.
pub fn yoy_growth(rows: &[EnrichedOrderRow], metric: PeriodMetric) -> Growth {
    let years = totals_by_period(rows, Bucket::Year);
    if years.len() >= 2 {
        return latest_growth(&years, Bucket::Year, metric);
    }
    match mom_growth(rows, metric) {
        Growth::Actual { percent } => percent
            .checked_mul(MONTHS_PER_YEAR)
            .map_or(Growth::OutOfRange, |percent| Growth::Extrapolated { percent }),
        undefined => undefined,
    }
}

/// Monthly values with growth over the previous month, months without
/// orders included as zero
pub fn growth_series(rows: &[EnrichedOrderRow], metric: PeriodMetric) -> Vec<GrowthPoint> {
    let months = totals_by_period(rows, Bucket::Month);
    let (Some(&first), Some(&last)) = (months.keys().next(), months.keys().next_back()) else {
        return Vec::new();
    };

    let mut points = Vec::new();
    let mut previous: Option<Option<Decimal>> = None;
    for start in bucket_range(Bucket::Month, first, last) {
        let value = months
            .get(&start)
            .map_or(Some(Decimal::ZERO), |totals| totals.metric(metric));
        let growth = match previous {
            Some(prev) => growth_between(value, prev),
            None => Growth::InsufficientHistory,
        };
        points.push(GrowthPoint {
            period_start: start,
            period: Bucket::Month.label(start),
            value,
            growth,
        });
        previous = Some(value);
    }
    points
}

/// Latest month's revenue × 12; `None` without rows or when it does not
/// fit in a `Decimal`
pub fn annual_run_rate(rows: &[EnrichedOrderRow]) -> Option<Decimal> {
    totals_by_period(rows, Bucket::Month)
        .values()
        .next_back()
        .and_then(|latest| latest.metric(PeriodMetric::Revenue))
        .and_then(|revenue| revenue.checked_mul(MONTHS_PER_YEAR))
}

#[cfg(test)]
mod tests {
    use super::super::totals::test_rows::order;
    use super::*;
    use contracts::enums::channel::Channel;
    use rust_decimal_macros::dec;

    #[test]
    fn test_growth_percent() {
        assert_eq!(
            growth_percent(dec!(150), dec!(100)),
            Growth::Actual { percent: dec!(50) }
        );
        assert_eq!(
            growth_percent(dec!(75), dec!(100)),
            Growth::Actual { percent: dec!(-25) }
        );
    }

    #[test]
    fn test_zero_baseline_is_no_prior_data() {
        assert_eq!(growth_percent(dec!(250), Decimal::ZERO), Growth::NoPriorData);
        assert_eq!(growth_percent(Decimal::ZERO, Decimal::ZERO), Growth::NoPriorData);
    }

    #[test]
    fn test_growth_outside_decimal_range_is_undefined() {
        assert_eq!(
            growth_percent(dec!(1000000000), Decimal::new(1, 25)),
            Growth::OutOfRange
        );
        assert_eq!(growth_percent(Decimal::MAX, Decimal::MIN), Growth::OutOfRange);
        assert_eq!(growth_between(None, Some(dec!(10))), Growth::OutOfRange);
    }

    #[test]
    fn test_mom_against_tiny_baseline_is_undefined() {
        let mut february = order(Channel::Unknown, 2024, 2, 10, dec!(1));
        february.net_profit = Decimal::new(1, 25);
        let march = order(Channel::Unknown, 2024, 3, 10, dec!(1000000000));
        let rows = vec![february, march];

        assert_eq!(mom_growth(&rows, PeriodMetric::NetProfit), Growth::OutOfRange);
        assert_eq!(yoy_growth(&rows, PeriodMetric::NetProfit), Growth::OutOfRange);
        assert!(mom_growth(&rows, PeriodMetric::Revenue).is_defined());
    }

    #[test]
    fn test_mom_compares_contiguous_months() {
        // March has the largest revenue, but May is compared with April
        let rows = vec![
            order(Channel::Shopify, 2024, 3, 10, dec!(900)),
            order(Channel::Shopify, 2024, 4, 10, dec!(200)),
            order(Channel::Shopify, 2024, 5, 10, dec!(300)),
        ];
        assert_eq!(
            mom_growth(&rows, PeriodMetric::Revenue),
            Growth::Actual { percent: dec!(50) }
        );
        assert_eq!(
            mom_growth(&rows, PeriodMetric::OrderCount),
            Growth::Actual { percent: dec!(0) }
        );
    }

    #[test]
    fn test_mom_with_empty_previous_month() {
        let rows = vec![
            order(Channel::Walmart, 2024, 1, 10, dec!(100)),
            order(Channel::Walmart, 2024, 3, 10, dec!(100)),
        ];
        assert_eq!(mom_growth(&rows, PeriodMetric::Revenue), Growth::NoPriorData);
    }

    #[test]
    fn test_single_month_is_insufficient_history() {
        let rows = vec![order(Channel::Amazon, 2024, 6, 1, dec!(40))];
        assert_eq!(mom_growth(&rows, PeriodMetric::Revenue), Growth::InsufficientHistory);
        assert_eq!(yoy_growth(&rows, PeriodMetric::Revenue), Growth::InsufficientHistory);
        assert_eq!(mom_growth(&[], PeriodMetric::Revenue), Growth::InsufficientHistory);
    }

    #[test]
    fn test_yoy_falls_back_to_extrapolated_mom() {
        let rows = vec![
            order(Channel::Shopify, 2024, 4, 10, dec!(200)),
            order(Channel::Shopify, 2024, 5, 10, dec!(220)),
        ];
        assert_eq!(
            yoy_growth(&rows, PeriodMetric::Revenue),
            Growth::Extrapolated { percent: dec!(120) }
        );
    }

    #[test]
    fn test_yoy_with_two_years_is_actual() {
        let rows = vec![
            order(Channel::Shopify, 2023, 6, 10, dec!(400)),
            order(Channel::Shopify, 2024, 1, 10, dec!(250)),
            order(Channel::Shopify, 2024, 2, 10, dec!(250)),
        ];
        assert_eq!(
            yoy_growth(&rows, PeriodMetric::Revenue),
            Growth::Actual { percent: dec!(25) }
        );
    }

    #[test]
    fn test_growth_series_fills_gaps() {
        let rows = vec![
            order(Channel::Shopify, 2024, 1, 10, dec!(100)),
            order(Channel::Shopify, 2024, 3, 10, dec!(120)),
        ];
        let series = growth_series(&rows, PeriodMetric::Revenue);
        let periods: Vec<&str> = series.iter().map(|p| p.period.as_str()).collect();
        assert_eq!(periods, vec!["2024-01", "2024-02", "2024-03"]);
        assert_eq!(series[0].growth, Growth::InsufficientHistory);
        assert_eq!(series[1].growth, Growth::Actual { percent: dec!(-100) });
        assert_eq!(series[2].growth, Growth::NoPriorData);
    }

    #[test]
    fn test_annual_run_rate() {
        let rows = vec![
            order(Channel::Shopify, 2024, 4, 10, dec!(200)),
            order(Channel::Amazon, 2024, 5, 2, dec!(150)),
            order(Channel::Walmart, 2024, 5, 20, dec!(50)),
        ];
        assert_eq!(annual_run_rate(&rows), Some(dec!(2400)));
        assert_eq!(annual_run_rate(&[]), None);
    }

    #[test]
    fn test_annual_run_rate_out_of_range() {
        let rows = vec![order(Channel::Shopify, 2024, 5, 2, Decimal::MAX / dec!(4))];
        assert_eq!(annual_run_rate(&rows), None);
    }
}
