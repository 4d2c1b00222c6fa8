use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::enums::channel::Channel;

/// Open orders of one channel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelBacklog {
    pub channel: Channel,
    pub order_count: u64,
    /// `None` when the sum does not fit in a `Decimal`
    pub revenue: Option<Decimal>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateBacklog {
    pub state: String,
    pub order_count: u64,
}

/// Orders that were paid for but have not shipped yet
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UnfulfilledSummary {
    pub order_count: u64,
    /// Revenue of the open orders
    pub total_value: Option<Decimal>,
    pub average_value: Option<Decimal>,
    pub oldest_order: Option<DateTime<Utc>>,
    /// Whole days between the oldest open order and the reference date
    pub oldest_age_days: Option<i64>,
    /// In channel order; channels without open orders are left out
    pub by_channel: Vec<ChannelBacklog>,
    /// Busiest states first, at most [`UnfulfilledSummary::TOP_STATES`]
    pub by_state: Vec<StateBacklog>,
}

impl UnfulfilledSummary {
    pub const TOP_STATES: usize = 10;

    pub fn is_empty(&self) -> bool {
        self.order_count == 0
    }
}
