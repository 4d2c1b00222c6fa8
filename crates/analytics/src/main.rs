use analytics::dashboards::d400_period_metrics::{
    aggregate, breakdown, growth_series, profit_waterfall,
};
use analytics::shared::config::load_config;
use analytics::shared::data::csv_source;
use analytics::shared::data::fetch_cache::{FetchCache, QueryWindow};
use analytics::{ChannelData, MetricsFacade};
use contracts::dashboards::d400_period_metrics::{Bucket, Dimension, PeriodMetric};
use std::path::PathBuf;

fn main() -> anyhow::Result<()> {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let log_dir = std::path::Path::new("target").join("logs");
    std::fs::create_dir_all(&log_dir)?;

    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_dir.join("analytics.log"))?;

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::sync::Arc::new(log_file))
                .with_ansi(false),
        )
        .init();

    let config_path = std::env::args().nth(1).map(PathBuf::from);
    let config = load_config(config_path.as_deref())?;
    let facade = MetricsFacade::new(config.pipeline.clone())?;

    let sources = config.sources.paths();
    if sources.is_empty() {
        tracing::warn!("No [sources] configured, nothing to load");
    }

    let mut cache = FetchCache::from_config(&config.cache);
    let now = chrono::Utc::now();
    let mut data = ChannelData::new();
    for (channel, path) in sources {
        let rows = cache.get_or_load((channel, QueryWindow::all()), now, || {
            csv_source::load_file(path).map(|load| load.records)
        })?;
        data.insert(channel, rows.as_ref().clone());
    }

    let output = facade.compute(&data);
    if output.total_dropped() > 0 {
        tracing::warn!("{} raw records dropped during normalization", output.total_dropped());
    }
    if !output.unfulfilled.is_empty() {
        tracing::info!(
            "{} orders awaiting fulfillment, oldest {} days",
            output.unfulfilled.order_count,
            output.unfulfilled.oldest_age_days.unwrap_or_default()
        );
    }

    let report = serde_json::json!({
        "summary": output.summary,
        "dropped": output.dropped,
        "channels": breakdown(&output.rows, Dimension::Channel),
        "revenue_velocity": growth_series(&output.rows, PeriodMetric::Revenue),
        "revenue_trend": output.revenue_trend,
        "margin_trend": output.margin_trend,
        "monthly": aggregate(&output.rows, Bucket::Month, Dimension::None),
        "unfulfilled": output.unfulfilled,
        "waterfall": profit_waterfall(&output.rows),
    });
    println!("{}", serde_json::to_string_pretty(&report)?);

    Ok(())
}
