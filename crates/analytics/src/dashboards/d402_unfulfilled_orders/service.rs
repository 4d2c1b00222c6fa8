use chrono::NaiveDate;
use contracts::dashboards::d402_unfulfilled_orders::{
    ChannelBacklog, StateBacklog, UnfulfilledSummary,
};
use contracts::enums::channel::Channel;
use contracts::enums::order_status::OrderStatus;
use contracts::projections::p900_canonical_orders::CanonicalOrderRow;
use contracts::projections::p901_enriched_orders::EnrichedOrderRow;
use rust_decimal::Decimal;
use std::collections::BTreeMap;

/// Walmart fulfillment states that close an order
const WALMART_CLOSED: &[&str] = &["Delivered", "Shipped", "Cancelled"];

/// Whether an order still waits to be shipped.
///
/// - Shopify: paid, sold with shipping terms, fulfillment `unfulfilled`
/// - Amazon: source status `Pending`
/// - Walmart: a fulfillment status other than delivered, shipped or cancelled
/// - other channels: fulfillment `unfulfilled`
///
/// An order without the columns a rule needs is not counted.
pub fn is_unfulfilled(order: &CanonicalOrderRow) -> bool {
    match order.channel {
        Channel::Shopify => {
            order.shipping_terms.is_some()
                && order.status == OrderStatus::Paid
                && fulfillment_is(order, "unfulfilled")
        }
        Channel::Amazon => order
            .source_status
            .as_deref()
            .is_some_and(|status| status.eq_ignore_ascii_case("pending")),
        Channel::Walmart => order.fulfillment_status.as_deref().is_some_and(|status| {
            !WALMART_CLOSED
                .iter()
                .any(|closed| status.eq_ignore_ascii_case(closed))
        }),
        Channel::Unknown => fulfillment_is(order, "unfulfilled"),
    }
}

fn fulfillment_is(order: &CanonicalOrderRow, expected: &str) -> bool {
    order
        .fulfillment_status
        .as_deref()
        .is_some_and(|status| status.eq_ignore_ascii_case(expected))
}

/// Open orders, in input order
pub fn unfulfilled(rows: &[EnrichedOrderRow]) -> Vec<&EnrichedOrderRow> {
    rows.iter().filter(|row| is_unfulfilled(&row.order)).collect()
}

/// Backlog of open orders as of `reference_date`
pub fn summarize_unfulfilled(
    rows: &[EnrichedOrderRow],
    reference_date: NaiveDate,
) -> UnfulfilledSummary {
    let open = unfulfilled(rows);
    if open.is_empty() {
        return UnfulfilledSummary::default();
    }

    let order_count = open.len() as u64;
    let total_value = revenue_of(&open);
    let average_value = total_value.and_then(|total| total.checked_div(Decimal::from(order_count)));
    let oldest_order = open.iter().map(|row| row.order.timestamp).min();
    let oldest_age_days =
        oldest_order.map(|ts| (reference_date - ts.date_naive()).num_days().max(0));

    let mut channels: BTreeMap<Channel, Vec<&EnrichedOrderRow>> = BTreeMap::new();
    let mut states: BTreeMap<&str, u64> = BTreeMap::new();
    for row in &open {
        channels.entry(row.order.channel).or_default().push(row);
        if let Some(state) = row.order.state.as_deref() {
            *states.entry(state).or_default() += 1;
        }
    }

    let by_channel = channels
        .into_iter()
        .map(|(channel, rows)| ChannelBacklog {
            channel,
            order_count: rows.len() as u64,
            revenue: revenue_of(&rows),
        })
        .collect();

    let mut by_state: Vec<StateBacklog> = states
        .into_iter()
        .map(|(state, order_count)| StateBacklog {
            state: state.to_string(),
            order_count,
        })
        .collect();
    // stable: ties stay alphabetical
    by_state.sort_by(|a, b| b.order_count.cmp(&a.order_count));
    by_state.truncate(UnfulfilledSummary::TOP_STATES);

    tracing::debug!(
        "{} unfulfilled orders, oldest {} days",
        order_count,
        oldest_age_days.unwrap_or_default()
    );

    UnfulfilledSummary {
        order_count,
        total_value,
        average_value,
        oldest_order,
        oldest_age_days,
        by_channel,
        by_state,
    }
}

fn revenue_of(rows: &[&EnrichedOrderRow]) -> Option<Decimal> {
    rows.iter()
        .try_fold(Decimal::ZERO, |sum, row| sum.checked_add(row.order.revenue))
}
