use chrono::NaiveDate;
use contracts::dashboards::d400_period_metrics::{PeriodMetric, WindowDelta};
use contracts::projections::p901_enriched_orders::EnrichedOrderRow;
use contracts::shared::indicators::Growth;
use rust_decimal::Decimal;

use super::growth::{growth_between, growth_percent};
use super::totals::{order_date, Totals};

/// Last `window_days` days up to and including `reference_date`, against the
/// `window_days` days before them. Orders after the reference date are ignored.
pub fn window_delta(
    rows: &[EnrichedOrderRow],
    reference_date: NaiveDate,
    window_days: u32,
) -> WindowDelta {
    let window = i64::from(window_days.max(1));
    let mut current = Totals::default();
    let mut prior = Totals::default();

    for row in rows {
        let age = (reference_date - order_date(row)).num_days();
        if (0..window).contains(&age) {
            current.add(row);
        } else if (window..window * 2).contains(&age) {
            prior.add(row);
        }
    }

    let average_order_value = if prior.order_count == 0 {
        Growth::NoPriorData
    } else {
        let current_aov = match current.order_count {
            0 => Some(Decimal::ZERO),
            _ => current.average_order_value(),
        };
        growth_between(current_aov, prior.average_order_value())
    };

    WindowDelta {
        window_days,
        revenue: growth_between(
            current.metric(PeriodMetric::Revenue),
            prior.metric(PeriodMetric::Revenue),
        ),
        net_profit: growth_between(
            current.metric(PeriodMetric::NetProfit),
            prior.metric(PeriodMetric::NetProfit),
        ),
        order_count: growth_percent(
            Decimal::from(current.order_count),
            Decimal::from(prior.order_count),
        ),
        average_order_value,
    }
}

#[cfg(test)]
mod tests {
    use super::super::totals::test_rows::order;
    use super::*;
    use contracts::enums::channel::Channel;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_window_boundaries() {
        let rows = vec![
            // current window: Mar 2 ..= Mar 31
            order(Channel::Walmart, 2024, 3, 31, dec!(100)),
            order(Channel::Walmart, 2024, 3, 2, dec!(100)),
            // prior window: Feb 1 ..= Mar 1
            order(Channel::Walmart, 2024, 3, 1, dec!(80)),
            order(Channel::Walmart, 2024, 2, 1, dec!(80)),
            // outside both
            order(Channel::Walmart, 2024, 1, 31, dec!(5000)),
            order(Channel::Walmart, 2024, 4, 1, dec!(5000)),
        ];
        let delta = window_delta(&rows, date(2024, 3, 31), 30);
        assert_eq!(delta.window_days, 30);
        assert_eq!(delta.revenue, Growth::Actual { percent: dec!(25) });
        assert_eq!(delta.order_count, Growth::Actual { percent: dec!(0) });
        assert_eq!(delta.average_order_value, Growth::Actual { percent: dec!(25) });
    }

    #[test]
    fn test_empty_prior_window() {
        let rows = vec![order(Channel::Shopify, 2024, 3, 31, dec!(100))];
        let delta = window_delta(&rows, date(2024, 3, 31), 30);
        assert_eq!(delta.revenue, Growth::NoPriorData);
        assert_eq!(delta.order_count, Growth::NoPriorData);
        assert_eq!(delta.average_order_value, Growth::NoPriorData);
    }

    #[test]
    fn test_empty_current_window() {
        let rows = vec![order(Channel::Shopify, 2024, 3, 1, dec!(100))];
        let delta = window_delta(&rows, date(2024, 3, 31), 7);
        // Mar 1 is 30 days old: outside a 7-day comparison
        assert_eq!(delta.revenue, Growth::NoPriorData);

        let delta = window_delta(&rows, date(2024, 3, 31), 20);
        assert_eq!(delta.revenue, Growth::Actual { percent: dec!(-100) });
        assert_eq!(delta.average_order_value, Growth::Actual { percent: dec!(-100) });
    }
}
