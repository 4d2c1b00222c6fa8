use chrono::NaiveDate;
use contracts::dashboards::d400_period_metrics::{
    Bucket, Dimension, MarginPoint, PeriodMetric, Smoothed, TrendPoint,
};
use contracts::projections::p901_enriched_orders::EnrichedOrderRow;
use rust_decimal::Decimal;
use std::collections::{BTreeMap, BTreeSet, VecDeque};

use super::totals::{bucket_range, totals_by_period, totals_by_period_and_dimension};

/// Fixed-capacity trailing window over a series with optional points
#[derive(Debug, Clone)]
pub struct RollingWindow {
    inner: VecDeque<Option<Decimal>>,
    capacity: usize,
}

impl RollingWindow {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            inner: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Push a point, evicting the oldest at capacity. Returns the evicted point.
    pub fn push(&mut self, value: Option<Decimal>) -> Option<Option<Decimal>> {
        let evicted = if self.inner.len() >= self.capacity {
            self.inner.pop_front()
        } else {
            None
        };
        self.inner.push_back(value);
        evicted
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.inner.len() >= self.capacity
    }

    /// Mean of the defined points in the window. A window whose sum leaves
    /// the `Decimal` range has no mean.
    pub fn mean(&self) -> Smoothed {
        let Some((sum, observed)) = self
            .inner
            .iter()
            .flatten()
            .try_fold((Decimal::ZERO, 0usize), |(sum, n), v| {
                Some((sum.checked_add(*v)?, n + 1))
            })
        else {
            return Smoothed::Undefined;
        };

        if observed == 0 {
            return Smoothed::Undefined;
        }
        let Some(mean) = sum.checked_div(Decimal::from(observed)) else {
            return Smoothed::Undefined;
        };
        if self.is_full() && observed == self.capacity {
            Smoothed::Full { mean }
        } else {
            Smoothed::Partial { mean, observed }
        }
    }
}

/// Trailing mean over `window` points for each point of `values`
pub fn rolling_mean(values: &[Option<Decimal>], window: usize) -> Vec<Smoothed> {
    let mut rolling = RollingWindow::new(window);
    values
        .iter()
        .map(|value| {
            rolling.push(*value);
            rolling.mean()
        })
        .collect()
}

/// Gap-filled series of a summable metric with its trailing mean.
///
/// Every dimension value gets a point for every bucket between the first and
/// the last order of the slice; buckets without orders hold zero. Buckets
/// whose sum overflowed hold `None`.
pub fn trend_series(
    rows: &[EnrichedOrderRow],
    bucket: Bucket,
    dimension: Dimension,
    metric: PeriodMetric,
    window: usize,
) -> Vec<TrendPoint> {
    let groups = totals_by_period_and_dimension(rows, bucket, dimension);
    let Some(starts) = calendar(groups.keys().map(|(start, _)| *start), bucket) else {
        return Vec::new();
    };
    let values: BTreeSet<Option<String>> = groups.keys().map(|(_, value)| value.clone()).collect();

    let mut points = Vec::with_capacity(values.len() * starts.len());
    for dimension_value in values {
        let series: Vec<Option<Decimal>> = starts
            .iter()
            .map(|start| {
                groups
                    .get(&(*start, dimension_value.clone()))
                    .map_or(Some(Decimal::ZERO), |totals| totals.metric(metric))
            })
            .collect();
        let smoothed = rolling_mean(&series, window);

        for ((start, value), smoothed) in starts.iter().zip(series).zip(smoothed)
        {
            points.push(TrendPoint {
                period_start: *start,
                period: bucket.label(*start),
                dimension_value: dimension_value.clone(),
                value,
                smoothed,
            });
        }
    }
    points
}

/// Daily gross and net margin (% of revenue) with trailing means. Days
/// without revenue have no margin and do not count towards the mean.
pub fn margin_trend(rows: &[EnrichedOrderRow], window: usize) -> Vec<MarginPoint> {
    let days = totals_by_period(rows, Bucket::Day);
    let Some(starts) = calendar(days.keys().copied(), Bucket::Day) else {
        return Vec::new();
    };

    let margins: BTreeMap<NaiveDate, (Option<Decimal>, Option<Decimal>)> = starts
        .iter()
        .map(|day| {
            let margins = days
                .get(day)
                .map(|t| (t.share(t.gross_profit, t.revenue), t.share(t.net_profit, t.revenue)))
                .unwrap_or((None, None));
            (*day, margins)
        })
        .collect();

    let gross: Vec<Option<Decimal>> = margins.values().map(|(g, _)| *g).collect();
    let net: Vec<Option<Decimal>> = margins.values().map(|(_, n)| *n).collect();
    let gross_smoothed = rolling_mean(&gross, window);
    let net_smoothed = rolling_mean(&net, window);

    margins
        .into_iter()
        .zip(gross_smoothed.into_iter().zip(net_smoothed))
        .map(|((day, (gross_margin, net_margin)), (gross_s, net_s))| MarginPoint {
            period_start: day,
            period: Bucket::Day.label(day),
            gross_margin,
            net_margin,
            gross_margin_smoothed: gross_s,
            net_margin_smoothed: net_s,
        })
        .collect()
}

/// Contiguous bucket starts spanning the given dates
fn calendar(dates: impl Iterator<Item = NaiveDate>, bucket: Bucket) -> Option<Vec<NaiveDate>> {
    let (first, last) = dates.fold(None, |range: Option<(NaiveDate, NaiveDate)>, d| match range {
        None => Some((d, d)),
        Some((lo, hi)) => Some((lo.min(d), hi.max(d))),
    })?;
    Some(bucket_range(bucket, first, last))
}
