use chrono::{Datelike, Months, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::shared::indicators::Growth;

// ---------------------------------------------------------------------------
// Grouping keys
// ---------------------------------------------------------------------------

/// Calendar granularity used to bucket orders
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Bucket {
    Day,
    Month,
    Year,
}

impl Bucket {
    /// First day of the bucket containing `date`
    pub fn truncate(&self, date: NaiveDate) -> NaiveDate {
        match self {
            Bucket::Day => date,
            Bucket::Month => date.with_day(1).unwrap_or(date),
            Bucket::Year => date.with_ordinal(1).unwrap_or(date),
        }
    }

    /// Start of the bucket right after the one starting at `start`
    pub fn next(&self, start: NaiveDate) -> Option<NaiveDate> {
        match self {
            Bucket::Day => start.succ_opt(),
            Bucket::Month => start.checked_add_months(Months::new(1)),
            Bucket::Year => start.checked_add_months(Months::new(12)),
        }
    }

    /// Start of the same bucket one year before `start`
    pub fn year_earlier(&self, start: NaiveDate) -> Option<NaiveDate> {
        start.checked_sub_months(Months::new(12))
    }

    /// Start of the bucket right before the one starting at `start`
    pub fn previous(&self, start: NaiveDate) -> Option<NaiveDate> {
        match self {
            Bucket::Day => start.pred_opt(),
            Bucket::Month => start.checked_sub_months(Months::new(1)),
            Bucket::Year => start.checked_sub_months(Months::new(12)),
        }
    }

    /// Display label: "2024-03-15", "2024-03" or "2024"
    pub fn label(&self, start: NaiveDate) -> String {
        match self {
            Bucket::Day => start.format("%Y-%m-%d").to_string(),
            Bucket::Month => start.format("%Y-%m").to_string(),
            Bucket::Year => start.format("%Y").to_string(),
        }
    }
}

/// Optional second grouping key next to the period
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dimension {
    Channel,
    State,
    Product,
    None,
}

/// Summable metric selector for series and growth
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PeriodMetric {
    Revenue,
    NetRevenue,
    GrossProfit,
    NetProfit,
    OrderCount,
}

// ---------------------------------------------------------------------------
// Aggregation results
// ---------------------------------------------------------------------------

/// Totals for one (period, dimension value) pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregatedPeriodMetric {
    pub bucket: Bucket,
    pub period_start: NaiveDate,
    /// Formatted period, e.g. "2024-03"
    pub period: String,
    /// `None` when aggregating without a dimension, or when the row had no
    /// value for it (missing state/product)
    pub dimension_value: Option<String>,

    /// Sums are `None` when they do not fit in a `Decimal`
    pub revenue: Option<Decimal>,
    pub net_revenue: Option<Decimal>,
    pub gross_profit: Option<Decimal>,
    pub net_profit: Option<Decimal>,
    pub order_count: u64,

    /// Mean of per-order gross margin (% of revenue)
    pub avg_gross_margin: Option<Decimal>,
    /// Mean of per-order net margin (% of revenue)
    pub avg_net_margin: Option<Decimal>,

    /// Change against the immediately preceding bucket of the same dimension
    /// value (MoM for months, YoY for years)
    pub revenue_growth: Growth,
    pub net_profit_growth: Growth,
    /// Change against the same bucket one year earlier (same month last
    /// year for months, same day for days)
    pub revenue_growth_yoy: Growth,
    pub net_profit_growth_yoy: Growth,
}

/// Trailing-mean value of a series point
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Smoothed {
    /// Mean over a full window
    Full { mean: Decimal },
    /// Window not full yet (series start) or some points undefined
    Partial { mean: Decimal, observed: usize },
    /// No defined value in the window
    Undefined,
}

impl Smoothed {
    pub fn mean(&self) -> Option<Decimal> {
        match self {
            Smoothed::Full { mean } | Smoothed::Partial { mean, .. } => Some(*mean),
            Smoothed::Undefined => None,
        }
    }

    pub fn is_full(&self) -> bool {
        matches!(self, Smoothed::Full { .. })
    }
}

/// Point of a gap-filled trend series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendPoint {
    pub period_start: NaiveDate,
    pub period: String,
    pub dimension_value: Option<String>,
    /// `None` when the bucket sum overflowed
    pub value: Option<Decimal>,
    pub smoothed: Smoothed,
}

/// Daily margin point; margins are undefined on days without revenue
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarginPoint {
    pub period_start: NaiveDate,
    pub period: String,
    pub gross_margin: Option<Decimal>,
    pub net_margin: Option<Decimal>,
    pub gross_margin_smoothed: Smoothed,
    pub net_margin_smoothed: Smoothed,
}

/// Monthly value with growth over the previous contiguous month
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GrowthPoint {
    pub period_start: NaiveDate,
    pub period: String,
    pub value: Option<Decimal>,
    pub growth: Growth,
}

/// Last W days against the W days before them
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowDelta {
    pub window_days: u32,
    pub revenue: Growth,
    pub net_profit: Growth,
    pub order_count: Growth,
    pub average_order_value: Growth,
}

impl WindowDelta {
    /// Delta block for an empty dataset
    pub fn undefined(window_days: u32) -> Self {
        Self {
            window_days,
            revenue: Growth::InsufficientHistory,
            net_profit: Growth::InsufficientHistory,
            order_count: Growth::InsufficientHistory,
            average_order_value: Growth::InsufficientHistory,
        }
    }
}

/// Whether a waterfall bar moves the running total or shows it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WaterfallKind {
    Relative,
    Total,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaterfallStep {
    pub label: String,
    pub kind: WaterfallKind,
    /// Signed contribution (costs are negative)
    pub amount: Decimal,
}

/// Totals for one dimension value across the whole slice
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DimensionTotal {
    pub dimension_value: Option<String>,
    pub revenue: Option<Decimal>,
    pub gross_profit: Option<Decimal>,
    pub net_profit: Option<Decimal>,
    pub order_count: u64,
}
