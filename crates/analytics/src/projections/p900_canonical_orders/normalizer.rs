use contracts::enums::channel::Channel;
use contracts::projections::p900_canonical_orders::{
    CanonicalOrderRow, DropReason, DropStats, NormalizedBatch, RawOrderRecord,
};
use rust_decimal::Decimal;
use serde_json::Value;

use super::field_map::{field_map, map_status, shipping_for_weight, OrderIdRule, ShippingRule};
use super::parse::{parse_amount, parse_text, parse_timestamp};

/// Placeholders exported by the sources when no value was recorded
const MISSING_MARKERS: &[&str] = &["NAN", "NONE", "NULL"];

/// Map one channel's raw records onto canonical rows.
///
/// Never fails on a single record: records without a usable timestamp or with
/// non-positive revenue are counted in `dropped` and skipped. Survivors keep
/// their input order.
pub fn normalize(channel: Channel, raw_rows: &[RawOrderRecord]) -> NormalizedBatch {
    let mut rows = Vec::with_capacity(raw_rows.len());
    let mut dropped = DropStats::default();

    for (idx, record) in raw_rows.iter().enumerate() {
        match normalize_record(channel, record) {
            Ok(row) => rows.push(row),
            Err(reason) => {
                tracing::debug!(channel = %channel, row = idx, ?reason, "dropping raw order record");
                dropped.record(reason);
            }
        }
    }

    if !raw_rows.is_empty() && rows.is_empty() {
        tracing::warn!(
            "No valid rows for {}: {} records, {} without timestamp, {} without revenue",
            channel,
            raw_rows.len(),
            dropped.invalid_timestamp,
            dropped.non_positive_revenue
        );
    } else {
        tracing::info!(
            "Normalized {} records: {} kept, {} dropped",
            channel,
            rows.len(),
            dropped.total()
        );
    }

    NormalizedBatch {
        channel,
        rows,
        dropped,
    }
}

/// Map a single raw record
pub fn normalize_record(
    channel: Channel,
    record: &RawOrderRecord,
) -> Result<CanonicalOrderRow, DropReason> {
    let map = field_map(channel);

    let timestamp = present(record, map.timestamp)
        .and_then(parse_timestamp)
        .ok_or(DropReason::InvalidTimestamp)?;

    let revenue = amount(record, map.revenue);
    if revenue <= Decimal::ZERO {
        return Err(DropReason::NonPositiveRevenue);
    }

    let tax: Decimal = map.tax.iter().map(|key| amount(record, key)).sum();
    let discount: Decimal = map.discount.iter().map(|key| amount(record, key).abs()).sum();
    let source_status = text(record, map.status);

    Ok(CanonicalOrderRow {
        order_id: order_id(record, map.order_id),
        timestamp,
        channel,
        revenue,
        shipping_cost: shipping(record, map.shipping).max(Decimal::ZERO),
        tax: tax.max(Decimal::ZERO),
        discount,
        state: state(record, map.state),
        product: text(record, map.product),
        status: map_status(channel, source_status.as_deref()),
        source_status,
        fulfillment_status: map.fulfillment_status.and_then(|key| text(record, key)),
        shipping_terms: map.shipping_terms.and_then(|key| recorded(record, key)),
    })
}

/// Value of a column that is present and not blank
fn present<'a>(record: &'a RawOrderRecord, key: &str) -> Option<&'a Value> {
    record.get(key).filter(|value| match value {
        Value::Null => false,
        Value::String(s) => !s.trim().is_empty(),
        _ => true,
    })
}

/// Numeric column; missing or unparsable reads as zero
fn amount(record: &RawOrderRecord, key: &str) -> Decimal {
    present(record, key)
        .and_then(parse_amount)
        .unwrap_or(Decimal::ZERO)
}

fn text(record: &RawOrderRecord, key: &str) -> Option<String> {
    present(record, key).and_then(parse_text)
}

fn order_id(record: &RawOrderRecord, rule: OrderIdRule) -> String {
    match rule {
        OrderIdRule::Column(key) => text(record, key).unwrap_or_default(),
        OrderIdRule::Prefixed {
            preferred,
            prefix,
            fallback,
        } => match text(record, preferred) {
            Some(number) => format!("{}{}", prefix, number),
            None => text(record, fallback).unwrap_or_default(),
        },
    }
}

fn shipping(record: &RawOrderRecord, rule: ShippingRule) -> Decimal {
    match rule {
        ShippingRule::FirstOf(keys) => keys
            .iter()
            .find(|key| present(record, key).is_some())
            .map(|key| amount(record, key))
            .unwrap_or(Decimal::ZERO),
        ShippingRule::WeightTiers { weight, fallback } => match present(record, weight) {
            Some(value) => parse_amount(value)
                .map(shipping_for_weight)
                .unwrap_or(Decimal::ZERO),
            None => amount(record, fallback),
        },
        ShippingRule::SettlementAdjustment {
            amount: amount_key,
            transaction_type,
            adjustment_type,
            fallback,
        } => match (
            present(record, amount_key),
            text(record, transaction_type),
        ) {
            (Some(_), Some(kind)) => {
                if kind.eq_ignore_ascii_case(adjustment_type) {
                    amount(record, amount_key)
                } else {
                    Decimal::ZERO
                }
            }
            _ => amount(record, fallback),
        },
    }
}

fn state(record: &RawOrderRecord, key: &str) -> Option<String> {
    text(record, key)
        .map(|s| s.to_uppercase())
        .filter(|s| !is_missing_marker(s))
}

/// Text column with missing-value placeholders read as absent
fn recorded(record: &RawOrderRecord, key: &str) -> Option<String> {
    text(record, key).filter(|s| !is_missing_marker(s))
}

fn is_missing_marker(value: &str) -> bool {
    MISSING_MARKERS
        .iter()
        .any(|marker| value.eq_ignore_ascii_case(marker))
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::enums::order_status::OrderStatus;
    use rust_decimal_macros::dec;
    use serde_json::json;

    fn record(value: Value) -> RawOrderRecord {
        match value {
            Value::Object(map) => map,
            _ => panic!("test records must be JSON objects"),
        }
    }

    fn shopify_row(order: u32, created_at: &str, line_total: Value) -> RawOrderRecord {
        record(json!({
            "order_id": format!("gid-{}", order),
            "created_at": created_at,
            "line_total": line_total,
            "line_tax": "0",
            "line_shipping": "0",
            "state": "ca",
            "product_name": "ZeoFill 5lb",
            "financial_status": "paid",
        }))
    }

    #[test]
    fn test_amazon_currency_strings_and_status() {
        let raw = vec![record(json!({
            "amazon-order-id": "113-0000001-0000001",
            "purchase-date": "2024-05-02T14:11:00+00:00",
            "item-price": "$50.00",
            "item-tax": "$3.10",
            "shipping-tax": "$0.40",
            "shipping-price": "$4.99",
            "item-promotion-discount": "-$5.00",
            "ship-state": " tx ",
            "product-name": "ZeoFill 10lb",
            "order-status": "Canceled",
        }))];

        let batch = normalize(Channel::Amazon, &raw);
        assert_eq!(batch.dropped.total(), 0);
        let row = &batch.rows[0];
        assert_eq!(row.revenue, dec!(50.00));
        assert_eq!(row.status, OrderStatus::Refunded);
        assert_eq!(row.tax, dec!(3.50));
        assert_eq!(row.shipping_cost, dec!(4.99));
        assert_eq!(row.discount, dec!(5.00));
        assert_eq!(row.state.as_deref(), Some("TX"));
        assert_eq!(row.order_id, "113-0000001-0000001");
        assert_eq!(row.channel, Channel::Amazon);
    }

    #[test]
    fn test_amazon_label_cost_wins_over_shipping_price() {
        let raw = record(json!({
            "purchase-date": "2024-05-02",
            "item-price": "20",
            "shipping-price": "4.99",
            "shipping_label_cost": "$6.25",
        }));
        let row = normalize_record(Channel::Amazon, &raw).unwrap();
        assert_eq!(row.shipping_cost, dec!(6.25));
    }

    #[test]
    fn test_shopify_order_number_and_weight_tiers() {
        let mut raw = shopify_row(1, "2024-01-05 09:00:00", json!("100"));
        raw.insert("order_number".into(), json!(1042));
        raw.insert("weight".into(), json!("3.2"));
        raw.insert("line_shipping".into(), json!("99"));

        let row = normalize_record(Channel::Shopify, &raw).unwrap();
        assert_eq!(row.order_id, "Order #1042");
        assert_eq!(row.shipping_cost, dec!(12.00));

        raw.insert("weight".into(), json!("heavy"));
        let row = normalize_record(Channel::Shopify, &raw).unwrap();
        assert_eq!(row.shipping_cost, Decimal::ZERO);

        raw.remove("weight");
        raw.insert("line_shipping".into(), json!("8.5"));
        let row = normalize_record(Channel::Shopify, &raw).unwrap();
        assert_eq!(row.shipping_cost, dec!(8.5));
    }

    #[test]
    fn test_walmart_settlement_adjustment_shipping() {
        let base = json!({
            "order_id": "W-1",
            "created_at": "2024-02-01T00:00:00Z",
            "line_total": 200,
            "line_shipping": 9,
            "commission_from_sale": "14.75",
            "transaction_type": "adjmnt",
        });
        let row = normalize_record(Channel::Walmart, &record(base.clone())).unwrap();
        assert_eq!(row.shipping_cost, dec!(14.75));

        let mut sale = record(base.clone());
        sale.insert("transaction_type".into(), json!("SALE"));
        let row = normalize_record(Channel::Walmart, &sale).unwrap();
        assert_eq!(row.shipping_cost, Decimal::ZERO);

        let mut plain = record(base);
        plain.remove("transaction_type");
        let row = normalize_record(Channel::Walmart, &plain).unwrap();
        assert_eq!(row.shipping_cost, dec!(9));
    }

    #[test]
    fn test_drops_are_counted_not_raised() {
        let raw = vec![
            shopify_row(1, "2024-01-05", json!("100")),
            shopify_row(2, "yesterday", json!("100")),
            shopify_row(3, "2024-01-06", json!("0")),
            shopify_row(4, "2024-01-06", json!("-15")),
            shopify_row(5, "2024-01-06", json!("free")),
            shopify_row(6, "2024-01-07", json!(25.5)),
        ];
        let batch = normalize(Channel::Shopify, &raw);
        assert_eq!(batch.rows.len(), 2);
        assert_eq!(batch.dropped.invalid_timestamp, 1);
        assert_eq!(batch.dropped.non_positive_revenue, 3);
    }

    #[test]
    fn test_input_order_is_preserved() {
        let raw = vec![
            shopify_row(3, "2024-03-01", json!("30")),
            shopify_row(1, "2024-01-01", json!("10")),
            shopify_row(2, "2024-02-01", json!("20")),
        ];
        let batch = normalize(Channel::Shopify, &raw);
        let ids: Vec<&str> = batch.rows.iter().map(|r| r.order_id.as_str()).collect();
        assert_eq!(ids, vec!["gid-3", "gid-1", "gid-2"]);
    }

    #[test]
    fn test_normalize_has_no_hidden_state() {
        let raw = vec![
            shopify_row(1, "2024-01-05", json!("100")),
            shopify_row(2, "bad", json!("100")),
        ];
        let first = normalize(Channel::Shopify, &raw);
        let second = normalize(Channel::Shopify, &raw);
        assert_eq!(first, second);
    }

    #[test]
    fn test_unparsable_optional_amounts_read_as_zero() {
        let mut raw = shopify_row(1, "2024-01-05", json!("100"));
        raw.insert("line_tax".into(), json!("n/a"));
        raw.insert("discount".into(), Value::Null);
        let row = normalize_record(Channel::Shopify, &raw).unwrap();
        assert_eq!(row.tax, Decimal::ZERO);
        assert_eq!(row.discount, Decimal::ZERO);
    }

    #[test]
    fn test_missing_state_placeholders() {
        let mut raw = shopify_row(1, "2024-01-05", json!("100"));
        for placeholder in ["", "nan", "None", "  "] {
            raw.insert("state".into(), json!(placeholder));
            let row = normalize_record(Channel::Shopify, &raw).unwrap();
            assert_eq!(row.state, None);
        }
        raw.remove("product_name");
        let row = normalize_record(Channel::Shopify, &raw).unwrap();
        assert_eq!(row.product, None);
    }

    #[test]
    fn test_unknown_channel_reads_canonical_names() {
        let raw = record(json!({
            "order_id": "X-9",
            "timestamp": "2024-04-01T12:00:00Z",
            "revenue": "75.00",
            "shipping_cost": "5",
            "tax": "6",
            "discount": "2",
            "state": "ny",
            "product": "Sample",
            "status": "refunded",
        }));
        let row = normalize_record(Channel::Unknown, &raw).unwrap();
        assert_eq!(row.revenue, dec!(75));
        assert_eq!(row.shipping_cost, dec!(5));
        assert_eq!(row.status, OrderStatus::Refunded);
        assert_eq!(row.state.as_deref(), Some("NY"));
    }

    #[test]
    fn test_fulfillment_columns_are_carried() {
        let mut raw = shopify_row(1, "2024-01-05", json!("100"));
        raw.insert("fulfillment_status".into(), json!(" unfulfilled "));
        raw.insert("shipping_terms".into(), json!("Ground"));
        let row = normalize_record(Channel::Shopify, &raw).unwrap();
        assert_eq!(row.source_status.as_deref(), Some("paid"));
        assert_eq!(row.fulfillment_status.as_deref(), Some("unfulfilled"));
        assert_eq!(row.shipping_terms.as_deref(), Some("Ground"));

        raw.insert("shipping_terms".into(), json!("None"));
        let row = normalize_record(Channel::Shopify, &raw).unwrap();
        assert_eq!(row.shipping_terms, None);

        let amazon = record(json!({
            "purchase-date": "2024-05-02",
            "item-price": "20",
            "order-status": "Pending",
            "fulfillment_status": "unfulfilled",
        }));
        let row = normalize_record(Channel::Amazon, &amazon).unwrap();
        assert_eq!(row.source_status.as_deref(), Some("Pending"));
        assert_eq!(row.fulfillment_status, None);
    }

    #[test]
    fn test_oversized_revenue_is_dropped() {
        let raw = vec![
            shopify_row(1, "2024-01-05", json!("10000000000000000000000000000")),
            shopify_row(2, "2024-01-05", json!("100")),
        ];
        let batch = normalize(Channel::Shopify, &raw);
        assert_eq!(batch.rows.len(), 1);
        assert_eq!(batch.dropped.non_positive_revenue, 1);
    }
}
