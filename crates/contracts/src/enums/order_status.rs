use serde::{Deserialize, Serialize};

/// Normalized order status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Paid,
    Refunded,
    Pending,
    Cancelled,
    Other,
}

impl OrderStatus {
    pub fn code(&self) -> &'static str {
        match self {
            OrderStatus::Paid => "paid",
            OrderStatus::Refunded => "refunded",
            OrderStatus::Pending => "pending",
            OrderStatus::Cancelled => "cancelled",
            OrderStatus::Other => "other",
        }
    }

    /// Refunds are all-or-nothing: a refunded order gives back its full revenue.
    pub fn is_refunded(&self) -> bool {
        matches!(self, OrderStatus::Refunded)
    }
}
