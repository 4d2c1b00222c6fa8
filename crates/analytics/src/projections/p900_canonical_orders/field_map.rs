use contracts::enums::channel::Channel;
use contracts::enums::order_status::OrderStatus;
use once_cell::sync::Lazy;
use rust_decimal::Decimal;
use std::collections::HashMap;

/// How the order identifier is read
#[derive(Debug, Clone, Copy)]
pub enum OrderIdRule {
    Column(&'static str),
    /// `prefix + preferred` when the preferred column is present, else `fallback`
    Prefixed {
        preferred: &'static str,
        prefix: &'static str,
        fallback: &'static str,
    },
}

/// How the shipping cost is read
#[derive(Debug, Clone, Copy)]
pub enum ShippingRule {
    /// First present column wins
    FirstOf(&'static [&'static str]),
    /// Flat label price by parcel weight (lb), else the fallback column
    WeightTiers {
        weight: &'static str,
        fallback: &'static str,
    },
    /// Settlement adjustment rows carry the shipping charge; other
    /// transaction types ship for free. Used only when both columns exist.
    SettlementAdjustment {
        amount: &'static str,
        transaction_type: &'static str,
        adjustment_type: &'static str,
        fallback: &'static str,
    },
}

/// Native column names of one channel
#[derive(Debug, Clone, Copy)]
pub struct FieldMap {
    pub order_id: OrderIdRule,
    pub timestamp: &'static str,
    pub revenue: &'static str,
    pub shipping: ShippingRule,
    /// Summed
    pub tax: &'static [&'static str],
    /// Summed
    pub discount: &'static [&'static str],
    pub state: &'static str,
    pub product: &'static str,
    pub status: &'static str,
    pub fulfillment_status: Option<&'static str>,
    pub shipping_terms: Option<&'static str>,
}

const SHOPIFY: FieldMap = FieldMap {
    order_id: OrderIdRule::Prefixed {
        preferred: "order_number",
        prefix: "Order #",
        fallback: "order_id",
    },
    timestamp: "created_at",
    revenue: "line_total",
    shipping: ShippingRule::WeightTiers {
        weight: "weight",
        fallback: "line_shipping",
    },
    tax: &["line_tax"],
    discount: &["discount"],
    state: "state",
    product: "product_name",
    status: "financial_status",
    fulfillment_status: Some("fulfillment_status"),
    shipping_terms: Some("shipping_terms"),
};

const WALMART: FieldMap = FieldMap {
    order_id: OrderIdRule::Column("order_id"),
    timestamp: "created_at",
    revenue: "line_total",
    shipping: ShippingRule::SettlementAdjustment {
        amount: "commission_from_sale",
        transaction_type: "transaction_type",
        adjustment_type: "ADJMNT",
        fallback: "line_shipping",
    },
    tax: &["line_tax"],
    discount: &["discount"],
    state: "state",
    product: "product_name",
    status: "financial_status",
    fulfillment_status: Some("fulfillment_status"),
    shipping_terms: Some("shipping_terms"),
};

const AMAZON: FieldMap = FieldMap {
    order_id: OrderIdRule::Column("amazon-order-id"),
    timestamp: "purchase-date",
    revenue: "item-price",
    shipping: ShippingRule::FirstOf(&["shipping_label_cost", "shipping-price"]),
    tax: &["item-tax", "shipping-tax"],
    discount: &["item-promotion-discount", "ship-promotion-discount"],
    state: "ship-state",
    product: "product-name",
    status: "order-status",
    fulfillment_status: None,
    shipping_terms: None,
};

/// Canonical names, for channels without a native table
const CANONICAL: FieldMap = FieldMap {
    order_id: OrderIdRule::Column("order_id"),
    timestamp: "timestamp",
    revenue: "revenue",
    shipping: ShippingRule::FirstOf(&["shipping_cost"]),
    tax: &["tax"],
    discount: &["discount"],
    state: "state",
    product: "product",
    status: "status",
    fulfillment_status: Some("fulfillment_status"),
    shipping_terms: Some("shipping_terms"),
};

pub fn field_map(channel: Channel) -> &'static FieldMap {
    match channel {
        Channel::Shopify => &SHOPIFY,
        Channel::Walmart => &WALMART,
        Channel::Amazon => &AMAZON,
        Channel::Unknown => &CANONICAL,
    }
}

/// Shopify label price for a parcel weight
pub fn shipping_for_weight(weight: Decimal) -> Decimal {
    if weight < Decimal::ONE {
        Decimal::new(700, 2)
    } else if weight <= Decimal::new(5, 0) {
        Decimal::new(1200, 2)
    } else {
        Decimal::new(1950, 2)
    }
}

// ---------------------------------------------------------------------------
// Status vocabularies (keys are lowercase)
// ---------------------------------------------------------------------------

static STOREFRONT_STATUSES: Lazy<HashMap<&'static str, OrderStatus>> = Lazy::new(|| {
    HashMap::from([
        ("paid", OrderStatus::Paid),
        ("refunded", OrderStatus::Refunded),
        ("partially_refunded", OrderStatus::Refunded),
        ("pending", OrderStatus::Pending),
        ("authorized", OrderStatus::Pending),
        ("voided", OrderStatus::Cancelled),
        ("cancelled", OrderStatus::Cancelled),
        ("canceled", OrderStatus::Cancelled),
    ])
});

static AMAZON_STATUSES: Lazy<HashMap<&'static str, OrderStatus>> = Lazy::new(|| {
    HashMap::from([
        ("shipped", OrderStatus::Paid),
        ("delivered", OrderStatus::Paid),
        ("canceled", OrderStatus::Refunded),
        ("cancelled", OrderStatus::Refunded),
        ("pending", OrderStatus::Pending),
        ("unshipped", OrderStatus::Pending),
    ])
});

static CANONICAL_STATUSES: Lazy<HashMap<&'static str, OrderStatus>> = Lazy::new(|| {
    HashMap::from([
        ("paid", OrderStatus::Paid),
        ("refunded", OrderStatus::Refunded),
        ("pending", OrderStatus::Pending),
        ("cancelled", OrderStatus::Cancelled),
    ])
});

fn status_vocabulary(channel: Channel) -> &'static HashMap<&'static str, OrderStatus> {
    match channel {
        Channel::Shopify | Channel::Walmart => &STOREFRONT_STATUSES,
        Channel::Amazon => &AMAZON_STATUSES,
        Channel::Unknown => &CANONICAL_STATUSES,
    }
}

/// Map a native status string. A record without a status is a paid order;
/// a status outside the vocabulary is `Other`.
pub fn map_status(channel: Channel, raw: Option<&str>) -> OrderStatus {
    match raw {
        None => OrderStatus::Paid,
        Some(raw) => status_vocabulary(channel)
            .get(raw.trim().to_lowercase().as_str())
            .copied()
            .unwrap_or(OrderStatus::Other),
    }
}
