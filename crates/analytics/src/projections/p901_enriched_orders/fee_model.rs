use contracts::enums::channel::Channel;
use rust_decimal::Decimal;

/// Platform fee schedule of a sales channel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeeModel {
    /// `revenue * rate + fixed` per order
    PercentPlusFixed { rate: Decimal, fixed: Decimal },
    /// `revenue * rate`
    Percent { rate: Decimal },
    /// No platform fee
    Waived,
}

impl FeeModel {
    pub fn for_channel(channel: Channel) -> Self {
        match channel {
            // 5.9% + $0.30
            Channel::Shopify => FeeModel::PercentPlusFixed {
                rate: Decimal::new(59, 3),
                fixed: Decimal::new(30, 2),
            },
            // 15% referral
            Channel::Walmart => FeeModel::Percent {
                rate: Decimal::new(15, 2),
            },
            // 15% referral + $0.99 per item
            Channel::Amazon => FeeModel::PercentPlusFixed {
                rate: Decimal::new(15, 2),
                fixed: Decimal::new(99, 2),
            },
            Channel::Unknown => FeeModel::Waived,
        }
    }

    pub fn fee(&self, revenue: Decimal) -> Decimal {
        match *self {
            FeeModel::PercentPlusFixed { rate, fixed } => revenue * rate + fixed,
            FeeModel::Percent { rate } => revenue * rate,
            FeeModel::Waived => Decimal::ZERO,
        }
    }
}
