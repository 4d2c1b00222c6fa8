use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::enums::channel::Channel;
use crate::enums::order_status::OrderStatus;

/// One order line as the channel's source system delivers it: native field
/// names, values either numbers or strings (currency-formatted or not).
pub type RawOrderRecord = serde_json::Map<String, serde_json::Value>;

/// Channel-agnostic order row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalOrderRow {
    /// May be empty when the source does not carry an identifier
    pub order_id: String,
    pub timestamp: DateTime<Utc>,
    pub channel: Channel,

    // Money, all non-negative; revenue strictly positive
    pub revenue: Decimal,
    pub shipping_cost: Decimal,
    pub tax: Decimal,
    pub discount: Decimal,

    /// Uppercased region code
    pub state: Option<String>,
    pub product: Option<String>,
    pub status: OrderStatus,

    /// Status text as the source wrote it
    #[serde(default)]
    pub source_status: Option<String>,
    /// Fulfillment progress as the source wrote it
    #[serde(default)]
    pub fulfillment_status: Option<String>,
    /// Present when the order was sold with shipping terms
    #[serde(default)]
    pub shipping_terms: Option<String>,
}

/// Why a raw record did not make it into the canonical set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DropReason {
    InvalidTimestamp,
    NonPositiveRevenue,
}

/// Per-reason drop counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DropStats {
    pub invalid_timestamp: usize,
    pub non_positive_revenue: usize,
}

impl DropStats {
    pub fn record(&mut self, reason: DropReason) {
        match reason {
            DropReason::InvalidTimestamp => self.invalid_timestamp += 1,
            DropReason::NonPositiveRevenue => self.non_positive_revenue += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.invalid_timestamp + self.non_positive_revenue
    }

    pub fn merge(&mut self, other: &DropStats) {
        self.invalid_timestamp += other.invalid_timestamp;
        self.non_positive_revenue += other.non_positive_revenue;
    }
}

/// Output of normalizing one channel's raw records
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedBatch {
    pub channel: Channel,
    /// Surviving rows, in input order
    pub rows: Vec<CanonicalOrderRow>,
    pub dropped: DropStats,
}
