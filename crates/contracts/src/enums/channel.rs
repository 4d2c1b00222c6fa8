use serde::{Deserialize, Serialize};
use std::fmt;

/// Sales channels an order can originate from
///
/// Declaration order is the reporting order (Shopify, Walmart, Amazon), so
/// ordered maps keyed by `Channel` iterate channels the way the dashboard
/// lists them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Channel {
    Shopify,
    Walmart,
    Amazon,
    /// A channel tag without a native field table. Records are read with the
    /// canonical field names and carry no platform fee.
    Unknown,
}

impl Channel {
    /// Stable lowercase code, used in config files and logs
    pub fn code(&self) -> &'static str {
        match self {
            Channel::Shopify => "shopify",
            Channel::Walmart => "walmart",
            Channel::Amazon => "amazon",
            Channel::Unknown => "unknown",
        }
    }

    /// Human readable name
    pub fn display_name(&self) -> &'static str {
        match self {
            Channel::Shopify => "Shopify",
            Channel::Walmart => "Walmart",
            Channel::Amazon => "Amazon",
            Channel::Unknown => "Unknown",
        }
    }

    /// Channels with a native field table
    pub fn all() -> Vec<Channel> {
        vec![Channel::Shopify, Channel::Walmart, Channel::Amazon]
    }

    /// Parse a channel code or display name (case-insensitive)
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim().to_lowercase().as_str() {
            "shopify" => Some(Channel::Shopify),
            "walmart" => Some(Channel::Walmart),
            "amazon" => Some(Channel::Amazon),
            "unknown" => Some(Channel::Unknown),
            _ => None,
        }
    }

    /// Like [`Channel::from_code`], but maps unrecognized tags to `Unknown`
    pub fn from_tag(tag: &str) -> Self {
        Self::from_code(tag).unwrap_or(Channel::Unknown)
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}
