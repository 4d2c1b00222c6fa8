//! Multi-channel order analytics: normalization, cost model, period metrics
//! and the KPI summary.

pub mod dashboards;
pub mod projections;
pub mod shared;

pub use dashboards::d401_kpi_summary::{compute, ChannelData, MetricsFacade};
pub use shared::config::{ConfigError, PipelineConfig};
