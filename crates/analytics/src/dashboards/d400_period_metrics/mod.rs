pub mod growth;
pub mod service;
pub mod smoothing;
pub mod totals;
pub mod waterfall;
pub mod window_delta;

pub use growth::{
    annual_run_rate, growth_between, growth_percent, growth_series, mom_growth, yoy_growth,
};
pub use service::{aggregate, breakdown};
pub use smoothing::{margin_trend, rolling_mean, trend_series, RollingWindow};
pub use totals::Totals;
pub use waterfall::profit_waterfall;
pub use window_delta::window_delta;
