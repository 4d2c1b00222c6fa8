use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::dashboards::d400_period_metrics::{MarginPoint, TrendPoint, WindowDelta};
use crate::dashboards::d402_unfulfilled_orders::UnfulfilledSummary;
use crate::enums::channel::Channel;
use crate::projections::p900_canonical_orders::DropStats;
use crate::projections::p901_enriched_orders::EnrichedOrderRow;
use crate::shared::indicators::Growth;

/// Whether the summary was computed from real rows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DatasetStatus {
    Populated,
    /// No canonical rows at all; every optional figure is `None` and every
    /// growth figure is undefined
    NoData,
}

/// Top-level KPIs for the dashboard header and growth cards
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KpiSummary {
    pub status: DatasetStatus,
    /// Date the window deltas are anchored to
    pub reference_date: Option<NaiveDate>,
    pub order_count: u64,

    // Totals
    pub total_revenue: Option<Decimal>,
    pub net_revenue: Option<Decimal>,
    pub gross_profit: Option<Decimal>,
    pub net_profit: Option<Decimal>,
    pub total_cogs: Option<Decimal>,
    pub total_fees: Option<Decimal>,
    pub total_shipping: Option<Decimal>,
    pub total_refunds: Option<Decimal>,
    pub total_tax: Option<Decimal>,
    /// Tax collected through Shopify, which the merchant remits itself
    pub total_tax_owed: Option<Decimal>,
    pub total_discounts: Option<Decimal>,

    // Ratios, in percent
    /// Net revenue per order
    pub average_order_value: Option<Decimal>,
    pub refund_rate: Option<Decimal>,
    /// Gross profit / net revenue; undefined when net revenue is not positive
    pub gross_margin: Option<Decimal>,
    pub net_margin: Option<Decimal>,
    pub cogs_share: Option<Decimal>,
    pub fee_share: Option<Decimal>,
    pub shipping_share: Option<Decimal>,

    // Growth
    pub mom_revenue_growth: Growth,
    pub mom_net_profit_growth: Growth,
    pub yoy_revenue_growth: Growth,
    pub yoy_net_profit_growth: Growth,
    pub deltas: WindowDelta,
    /// Latest month revenue × 12
    pub annual_run_rate: Option<Decimal>,

    /// Passed through for the presentation layer
    pub aov_goal: Option<Decimal>,
}

impl KpiSummary {
    /// Sentinel summary for an empty dataset
    pub fn no_data(delta_window_days: u32, aov_goal: Option<Decimal>) -> Self {
        Self {
            status: DatasetStatus::NoData,
            reference_date: None,
            order_count: 0,
            total_revenue: None,
            net_revenue: None,
            gross_profit: None,
            net_profit: None,
            total_cogs: None,
            total_fees: None,
            total_shipping: None,
            total_refunds: None,
            total_tax: None,
            total_tax_owed: None,
            total_discounts: None,
            average_order_value: None,
            refund_rate: None,
            gross_margin: None,
            net_margin: None,
            cogs_share: None,
            fee_share: None,
            shipping_share: None,
            mom_revenue_growth: Growth::InsufficientHistory,
            mom_net_profit_growth: Growth::InsufficientHistory,
            yoy_revenue_growth: Growth::InsufficientHistory,
            yoy_net_profit_growth: Growth::InsufficientHistory,
            deltas: WindowDelta::undefined(delta_window_days),
            annual_run_rate: None,
            aov_goal,
        }
    }

    pub fn has_data(&self) -> bool {
        self.status == DatasetStatus::Populated
    }
}

/// Everything one pipeline run hands to the presentation layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineOutput {
    pub rows: Vec<EnrichedOrderRow>,
    pub summary: KpiSummary,
    /// Daily revenue per channel with its rolling mean
    pub revenue_trend: Vec<TrendPoint>,
    /// Daily margins with their rolling means
    pub margin_trend: Vec<MarginPoint>,
    pub unfulfilled: UnfulfilledSummary,
    /// Dropped raw records per channel (diagnostics)
    pub dropped: BTreeMap<Channel, DropStats>,
}

impl PipelineOutput {
    pub fn total_dropped(&self) -> usize {
        self.dropped.values().map(DropStats::total).sum()
    }
}
