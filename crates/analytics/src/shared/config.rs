use contracts::enums::channel::Channel;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Invalid configuration values. Raised before any row is processed.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("cogs_rate must be within 0..=1, got {0}")]
    CogsRateOutOfRange(Decimal),

    #[error("rolling_window_days must be at least 1")]
    EmptyRollingWindow,

    #[error("delta_window_days must be at least 1")]
    EmptyDeltaWindow,

    #[error("aov_goal must not be negative, got {0}")]
    NegativeAovGoal(Decimal),

    #[error("cache ttl_seconds must be positive, got {0}")]
    NonPositiveCacheTtl(i64),

    #[error("cache ttl_seconds must be at most 604800 (one week), got {0}")]
    CacheTtlTooLong(i64),
}

/// One week
pub const MAX_CACHE_TTL_SECONDS: i64 = 7 * 24 * 60 * 60;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    #[serde(default)]
    pub pipeline: PipelineConfig,
    #[serde(default)]
    pub sources: SourcesConfig,
    #[serde(default)]
    pub cache: CacheConfig,
}

/// Knobs consumed by the metrics pipeline
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct PipelineConfig {
    /// Share of revenue booked as cost of goods sold
    pub cogs_rate: Decimal,
    /// Trailing window of trend smoothing, in buckets
    pub rolling_window_days: u32,
    /// Length of the "last N days vs previous N days" comparison
    pub delta_window_days: u32,
    /// Presentation-only target, passed through untouched
    pub aov_goal: Option<Decimal>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            cogs_rate: Decimal::new(40, 2),
            rolling_window_days: 7,
            delta_window_days: 30,
            aov_goal: None,
        }
    }
}

impl PipelineConfig {
    /// Build a validated config
    pub fn new(
        cogs_rate: Decimal,
        rolling_window_days: u32,
        delta_window_days: u32,
        aov_goal: Option<Decimal>,
    ) -> Result<Self, ConfigError> {
        let config = Self {
            cogs_rate,
            rolling_window_days,
            delta_window_days,
            aov_goal,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cogs_rate < Decimal::ZERO || self.cogs_rate > Decimal::ONE {
            return Err(ConfigError::CogsRateOutOfRange(self.cogs_rate));
        }
        if self.rolling_window_days == 0 {
            return Err(ConfigError::EmptyRollingWindow);
        }
        if self.delta_window_days == 0 {
            return Err(ConfigError::EmptyDeltaWindow);
        }
        if let Some(goal) = self.aov_goal {
            if goal < Decimal::ZERO {
                return Err(ConfigError::NegativeAovGoal(goal));
            }
        }
        Ok(())
    }
}

/// CSV exports per channel, all optional
#[derive(Debug, Deserialize, Clone, Default)]
pub struct SourcesConfig {
    pub shopify: Option<PathBuf>,
    pub walmart: Option<PathBuf>,
    pub amazon: Option<PathBuf>,
}

impl SourcesConfig {
    /// Configured sources in reporting order
    pub fn paths(&self) -> Vec<(Channel, &Path)> {
        [
            (Channel::Shopify, &self.shopify),
            (Channel::Walmart, &self.walmart),
            (Channel::Amazon, &self.amazon),
        ]
        .into_iter()
        .filter_map(|(channel, path)| path.as_deref().map(|p| (channel, p)))
        .collect()
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct CacheConfig {
    pub ttl_seconds: i64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self { ttl_seconds: 300 }
    }
}

impl CacheConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.ttl_seconds <= 0 {
            return Err(ConfigError::NonPositiveCacheTtl(self.ttl_seconds));
        }
        if self.ttl_seconds > MAX_CACHE_TTL_SECONDS {
            return Err(ConfigError::CacheTtlTooLong(self.ttl_seconds));
        }
        Ok(())
    }
}

/// Default configuration embedded in the binary
const DEFAULT_CONFIG: &str = r#"
[pipeline]
cogs_rate = "0.40"
rolling_window_days = 7
delta_window_days = 30

[cache]
ttl_seconds = 300
"#;

/// Load configuration from a config.toml file
///
/// Search order:
/// 1. Explicit path (command line)
/// 2. Next to the executable
/// 3. Falls back to embedded default config
pub fn load_config(explicit: Option<&Path>) -> anyhow::Result<Config> {
    let config = match find_config_file(explicit) {
        Some(path) => {
            tracing::info!("Loading config from: {}", path.display());
            let contents = std::fs::read_to_string(&path)?;
            parse_config(&contents)?
        }
        None => {
            tracing::info!("Using default embedded configuration");
            parse_config(DEFAULT_CONFIG)?
        }
    };
    Ok(config)
}

/// Parse and validate a TOML document
pub fn parse_config(contents: &str) -> anyhow::Result<Config> {
    let config: Config = toml::from_str(contents)?;
    config.pipeline.validate()?;
    config.cache.validate()?;
    Ok(config)
}

fn find_config_file(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }

    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            let config_path = exe_dir.join("config.toml");
            if config_path.exists() {
                return Some(config_path);
            }
            tracing::warn!("config.toml not found at: {}", config_path.display());
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_default_config_loads() {
        let config = parse_config(DEFAULT_CONFIG).unwrap();
        assert_eq!(config.pipeline, PipelineConfig::default());
        assert_eq!(config.pipeline.cogs_rate, dec!(0.40));
        assert_eq!(config.cache.ttl_seconds, 300);
        assert!(config.sources.paths().is_empty());
    }

    #[test]
    fn test_negative_cogs_rate_is_rejected() {
        let err = PipelineConfig::new(dec!(-0.1), 7, 30, None).unwrap_err();
        assert_eq!(err, ConfigError::CogsRateOutOfRange(dec!(-0.1)));

        let toml = "[pipeline]\ncogs_rate = \"-0.25\"\n";
        assert!(parse_config(toml).is_err());
    }

    #[test]
    fn test_zero_windows_are_rejected() {
        assert_eq!(
            PipelineConfig::new(dec!(0.4), 0, 30, None).unwrap_err(),
            ConfigError::EmptyRollingWindow
        );
        assert_eq!(
            PipelineConfig::new(dec!(0.4), 7, 0, None).unwrap_err(),
            ConfigError::EmptyDeltaWindow
        );
        assert_eq!(
            PipelineConfig::new(dec!(0.4), 7, 30, Some(dec!(-1))).unwrap_err(),
            ConfigError::NegativeAovGoal(dec!(-1))
        );
    }

    #[test]
    fn test_cache_ttl_bounds() {
        let err = parse_config("[cache]\nttl_seconds = 0\n").unwrap_err();
        assert_eq!(
            err.downcast_ref::<ConfigError>(),
            Some(&ConfigError::NonPositiveCacheTtl(0))
        );

        let err = parse_config("[cache]\nttl_seconds = 9223372036854775807\n").unwrap_err();
        assert_eq!(
            err.downcast_ref::<ConfigError>(),
            Some(&ConfigError::CacheTtlTooLong(i64::MAX))
        );

        let week = format!("[cache]\nttl_seconds = {}\n", MAX_CACHE_TTL_SECONDS);
        assert!(parse_config(&week).is_ok());
    }

    #[test]
    fn test_partial_document_uses_defaults() {
        let toml = r#"
[pipeline]
cogs_rate = "0.35"
aov_goal = "50"

[sources]
amazon = "exports/amazon.csv"
shopify = "exports/shopify.csv"
"#;
        let config = parse_config(toml).unwrap();
        assert_eq!(config.pipeline.cogs_rate, dec!(0.35));
        assert_eq!(config.pipeline.rolling_window_days, 7);
        assert_eq!(config.pipeline.aov_goal, Some(dec!(50)));

        let channels: Vec<Channel> = config.sources.paths().into_iter().map(|(c, _)| c).collect();
        assert_eq!(channels, vec![Channel::Shopify, Channel::Amazon]);
    }
}
