use chrono::NaiveDate;
use contracts::dashboards::d400_period_metrics::{Bucket, Dimension, PeriodMetric};
use contracts::dashboards::d401_kpi_summary::{DatasetStatus, KpiSummary, PipelineOutput};
use contracts::enums::channel::Channel;
use contracts::projections::p900_canonical_orders::{DropStats, RawOrderRecord};
use contracts::projections::p901_enriched_orders::EnrichedOrderRow;
use rust_decimal::Decimal;
use std::collections::BTreeMap;

use crate::dashboards::d400_period_metrics::totals::order_date;
use crate::dashboards::d400_period_metrics::{
    annual_run_rate, margin_trend, mom_growth, trend_series, window_delta, yoy_growth, Totals,
};
use crate::dashboards::d402_unfulfilled_orders::summarize_unfulfilled;
use crate::projections::p900_canonical_orders::normalize;
use crate::projections::p901_enriched_orders::enrich;
use crate::shared::config::{ConfigError, PipelineConfig};

/// Raw records per channel, as handed over by the data-access layer
pub type ChannelData = BTreeMap<Channel, Vec<RawOrderRecord>>;

/// Entry point of the metrics pipeline.
///
/// Holds only a validated configuration; every call is independent and
/// deterministic for the same input.
#[derive(Debug, Clone)]
pub struct MetricsFacade {
    config: PipelineConfig,
}

impl MetricsFacade {
    pub fn new(config: PipelineConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Run the pipeline with deltas anchored at the latest order date
    pub fn compute(&self, data: &ChannelData) -> PipelineOutput {
        self.compute_as_of(data, None)
    }

    /// Normalize each channel, enrich the concatenated rows once, summarize.
    ///
    /// Rows keep channel order (Shopify, Walmart, Amazon, Unknown) and input
    /// order within a channel.
    pub fn compute_as_of(
        &self,
        data: &ChannelData,
        reference_date: Option<NaiveDate>,
    ) -> PipelineOutput {
        let mut canonical = Vec::new();
        let mut dropped: BTreeMap<Channel, DropStats> = BTreeMap::new();

        for (channel, raw_rows) in data {
            let batch = normalize(*channel, raw_rows);
            dropped.insert(*channel, batch.dropped);
            canonical.extend(batch.rows);
        }

        if canonical.is_empty() {
            let total_dropped: usize = dropped.values().map(DropStats::total).sum();
            tracing::warn!(
                "No order data to analyze ({} raw records dropped)",
                total_dropped
            );
            return PipelineOutput {
                rows: Vec::new(),
                summary: KpiSummary::no_data(self.config.delta_window_days, self.config.aov_goal),
                revenue_trend: Vec::new(),
                margin_trend: Vec::new(),
                unfulfilled: Default::default(),
                dropped,
            };
        }

        let rows = enrich(canonical, self.config.cogs_rate);
        let summary = summarize(&rows, &self.config, reference_date);

        let window = self.config.rolling_window_days as usize;
        let revenue_trend = trend_series(
            &rows,
            Bucket::Day,
            Dimension::Channel,
            PeriodMetric::Revenue,
            window,
        );
        let margin_trend = margin_trend(&rows, window);
        let unfulfilled = summary
            .reference_date
            .map(|date| summarize_unfulfilled(&rows, date))
            .unwrap_or_default();

        tracing::info!(
            "Pipeline run: {} orders, revenue {}, net profit {}",
            summary.order_count,
            summary.total_revenue.unwrap_or_default(),
            summary.net_profit.unwrap_or_default()
        );

        PipelineOutput {
            rows,
            summary,
            revenue_trend,
            margin_trend,
            unfulfilled,
            dropped,
        }
    }
}

/// One-shot variant of [`MetricsFacade::compute`]
pub fn compute(data: &ChannelData, config: &PipelineConfig) -> Result<PipelineOutput, ConfigError> {
    Ok(MetricsFacade::new(config.clone())?.compute(data))
}

/// Headline KPIs of an enriched row set. An empty set yields the no-data
/// summary.
pub fn summarize(
    rows: &[EnrichedOrderRow],
    config: &PipelineConfig,
    reference_date: Option<NaiveDate>,
) -> KpiSummary {
    let Some(latest) = rows.iter().map(order_date).max() else {
        return KpiSummary::no_data(config.delta_window_days, config.aov_goal);
    };
    let reference = reference_date.unwrap_or(latest);

    let t = Totals::from_rows(rows);
    if !t.is_exact() {
        tracing::warn!("Totals over {} orders overflow; sums are reported as undefined", rows.len());
    }
    let tax_owed = rows
        .iter()
        .filter(|r| r.order.channel == Channel::Shopify)
        .try_fold(Decimal::ZERO, |sum, r| sum.checked_add(r.order.tax));

    KpiSummary {
        status: DatasetStatus::Populated,
        reference_date: Some(reference),
        order_count: t.order_count,

        total_revenue: t.exact(t.revenue),
        net_revenue: t.exact(t.net_revenue),
        gross_profit: t.exact(t.gross_profit),
        net_profit: t.exact(t.net_profit),
        total_cogs: t.exact(t.cogs),
        total_fees: t.exact(t.platform_fees),
        total_shipping: t.exact(t.shipping),
        total_refunds: t.exact(t.refunds),
        total_tax: t.exact(t.tax),
        total_tax_owed: tax_owed,
        total_discounts: t.exact(t.discounts),

        average_order_value: t.average_order_value(),
        refund_rate: t.share(t.refunds, t.revenue),
        gross_margin: t.share(t.gross_profit, t.net_revenue),
        net_margin: t.share(t.net_profit, t.net_revenue),
        cogs_share: t.share(t.cogs, t.revenue),
        fee_share: t.share(t.platform_fees, t.revenue),
        shipping_share: t.share(t.shipping, t.revenue),

        mom_revenue_growth: mom_growth(rows, PeriodMetric::Revenue),
        mom_net_profit_growth: mom_growth(rows, PeriodMetric::NetProfit),
        yoy_revenue_growth: yoy_growth(rows, PeriodMetric::Revenue),
        yoy_net_profit_growth: yoy_growth(rows, PeriodMetric::NetProfit),
        deltas: window_delta(rows, reference, config.delta_window_days),
        annual_run_rate: annual_run_rate(rows),

        aov_goal: config.aov_goal,
    }
}
