use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{anyhow, Context};

use crate::models::SplitStrategy;
use crate::services::random_forest::ForestConfig;

/// Upper bound on forecast horizon accepted from callers
pub const MAX_FORECAST_PERIODS: usize = 365;

/// Knobs of the trend forecasting pipeline
#[derive(Debug, Clone)]
pub struct ForecastConfig {
    pub num_periods: usize,
    pub min_data_points: usize,
    pub split: SplitStrategy,
    pub test_ratio: f64,
    pub n_trees: usize,
    pub seed: u64,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            num_periods: 7,
            min_data_points: 10,
            split: SplitStrategy::Chronological,
            test_ratio: 0.2,
            n_trees: 100,
            seed: 42,
        }
    }
}

impl ForecastConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let defaults = Self::default();

        let seed = env_or("TREND_SEED", defaults.seed)?;
        let split = match std::env::var("TREND_SPLIT") {
            Ok(mode) => match mode.trim().to_lowercase().as_str() {
                "chronological" => SplitStrategy::Chronological,
                "random" => SplitStrategy::Random { seed },
                other => {
                    return Err(anyhow!(
                        "Invalid TREND_SPLIT: {}. Must be 'chronological' or 'random'",
                        other
                    ))
                }
            },
            Err(_) => defaults.split,
        };

        let config = Self {
            num_periods: env_or("TREND_NUM_PERIODS", defaults.num_periods)?,
            min_data_points: env_or("TREND_MIN_DATA_POINTS", defaults.min_data_points)?,
            split,
            test_ratio: env_or("TREND_TEST_RATIO", defaults.test_ratio)?,
            n_trees: env_or("TREND_N_TREES", defaults.n_trees)?,
            seed,
        };
        config.validate().map_err(|e| anyhow!(e))?;

        Ok(config)
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.min_data_points < 3 {
            return Err(format!(
                "min_data_points must be at least 3, got {}",
                self.min_data_points
            ));
        }
        if !(self.test_ratio > 0.0 && self.test_ratio < 1.0) {
            return Err(format!(
                "test_ratio must be between 0 and 1 (exclusive), got {}",
                self.test_ratio
            ));
        }
        if self.n_trees == 0 {
            return Err("n_trees must be at least 1".to_string());
        }
        if self.num_periods > MAX_FORECAST_PERIODS {
            return Err(format!(
                "num_periods must be at most {}, got {}",
                MAX_FORECAST_PERIODS, self.num_periods
            ));
        }
        Ok(())
    }

    /// Same settings with a different horizon
    pub fn with_periods(&self, num_periods: usize) -> Self {
        Self {
            num_periods,
            ..self.clone()
        }
    }

    pub fn forest(&self) -> ForestConfig {
        ForestConfig {
            n_trees: self.n_trees,
            seed: self.seed,
            ..Default::default()
        }
    }
}

/// Process-wide settings read once at startup
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub forecast: ForecastConfig,
    pub forecast_timeout: Duration,
    pub openai_model: String,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let bind_addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string());
        let bind_addr = bind_addr
            .parse()
            .with_context(|| format!("Invalid BIND_ADDR: {}", bind_addr))?;

        Ok(Self {
            bind_addr,
            forecast: ForecastConfig::from_env()?,
            forecast_timeout: Duration::from_secs(env_or("TREND_TIMEOUT_SECS", 30u64)?),
            openai_model: std::env::var("OPENAI_MODEL").unwrap_or_else(|_| "gpt-4o".to_string()),
        })
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 3000)),
            forecast: ForecastConfig::default(),
            forecast_timeout: Duration::from_secs(30),
            openai_model: "gpt-4o".to_string(),
        }
    }
}

/// Parse `key` from the environment, falling back to `default` when unset
fn env_or<T>(key: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|e| anyhow!("Invalid {}: {} ({})", key, raw, e)),
        Err(_) => Ok(default),
    }
}
