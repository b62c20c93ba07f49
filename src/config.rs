//! Engine configuration: every tunable threshold the components use.
//!
//! All thresholds have documented defaults and can be overridden from a
//! `config/analytics.toml` file plus `LADLE_ANALYTICS__*` environment
//! variables, or constructed directly for embedded use.

use config::{Config, Environment, File};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Deserialize;
use tracing::info;

use crate::errors::AnalyticsError;

const CONFIG_FILE: &str = "config/analytics";
const ENV_PREFIX: &str = "LADLE_ANALYTICS";

const DEFAULT_FORECAST_WINDOW_PERIODS: usize = 7;

fn default_increase_threshold() -> Decimal {
    dec!(0.02)
}

fn default_decrease_threshold() -> Decimal {
    dec!(-0.02)
}

fn default_window_periods() -> usize {
    DEFAULT_FORECAST_WINDOW_PERIODS
}

fn default_increase_adjustment() -> Decimal {
    dec!(1.10)
}

fn default_decrease_adjustment() -> Decimal {
    dec!(0.90)
}

fn default_peak_factor() -> Decimal {
    dec!(1.2)
}

fn default_low_factor() -> Decimal {
    dec!(0.8)
}

fn default_coverage_factor() -> Decimal {
    dec!(2)
}

/// Trend classification thresholds, applied to the mean-normalized OLS
/// slope. Raw slope thresholds would misclassify series depending purely on
/// the unit scale of the values, so normalization is part of the contract.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct TrendConfig {
    #[serde(default = "default_increase_threshold")]
    pub increase_threshold: Decimal,
    #[serde(default = "default_decrease_threshold")]
    pub decrease_threshold: Decimal,
}

impl Default for TrendConfig {
    fn default() -> Self {
        Self {
            increase_threshold: default_increase_threshold(),
            decrease_threshold: default_decrease_threshold(),
        }
    }
}

/// Forecast heuristic parameters: trailing window length and the fixed
/// directional adjustments applied to its mean.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ForecastConfig {
    #[serde(default = "default_window_periods")]
    pub window_periods: usize,
    #[serde(default = "default_increase_adjustment")]
    pub increase_adjustment: Decimal,
    #[serde(default = "default_decrease_adjustment")]
    pub decrease_adjustment: Decimal,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            window_periods: default_window_periods(),
            increase_adjustment: default_increase_adjustment(),
            decrease_adjustment: default_decrease_adjustment(),
        }
    }
}

/// Peak/low classification factors relative to the 12-month mean.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct SeasonalityConfig {
    #[serde(default = "default_peak_factor")]
    pub peak_factor: Decimal,
    #[serde(default = "default_low_factor")]
    pub low_factor: Decimal,
}

impl Default for SeasonalityConfig {
    fn default() -> Self {
        Self {
            peak_factor: default_peak_factor(),
            low_factor: default_low_factor(),
        }
    }
}

/// Reorder sizing parameters. The usage-derived suggestion covers
/// `coverage_factor` times the horizon at the observed daily rate.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ReorderConfig {
    #[serde(default = "default_coverage_factor")]
    pub coverage_factor: Decimal,
}

impl Default for ReorderConfig {
    fn default() -> Self {
        Self {
            coverage_factor: default_coverage_factor(),
        }
    }
}

/// Complete engine configuration.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct AnalyticsConfig {
    #[serde(default)]
    pub trend: TrendConfig,
    #[serde(default)]
    pub forecast: ForecastConfig,
    #[serde(default)]
    pub seasonality: SeasonalityConfig,
    #[serde(default)]
    pub reorder: ReorderConfig,
}

impl AnalyticsConfig {
    /// Load configuration from the optional `config/analytics` file with an
    /// environment-variable overlay, then sanity-check the thresholds.
    pub fn load() -> Result<Self, AnalyticsError> {
        let settings = Config::builder()
            .add_source(File::with_name(CONFIG_FILE).required(false))
            .add_source(Environment::with_prefix(ENV_PREFIX).separator("__"))
            .build()?;

        let config: Self = settings.try_deserialize()?;
        config.validate()?;
        info!(?config, "Loaded analytics configuration");
        Ok(config)
    }

    /// Reject threshold combinations that would make classification
    /// nonsensical (e.g. a negative increase threshold).
    pub fn validate(&self) -> Result<(), AnalyticsError> {
        if self.trend.increase_threshold <= Decimal::ZERO {
            return Err(AnalyticsError::Validation(
                "trend.increase_threshold must be positive".into(),
            ));
        }
        if self.trend.decrease_threshold >= Decimal::ZERO {
            return Err(AnalyticsError::Validation(
                "trend.decrease_threshold must be negative".into(),
            ));
        }
        if self.forecast.window_periods == 0 {
            return Err(AnalyticsError::Validation(
                "forecast.window_periods must be at least 1".into(),
            ));
        }
        if self.forecast.increase_adjustment <= Decimal::ZERO
            || self.forecast.decrease_adjustment <= Decimal::ZERO
        {
            return Err(AnalyticsError::Validation(
                "forecast adjustments must be positive factors".into(),
            ));
        }
        if self.seasonality.peak_factor <= self.seasonality.low_factor {
            return Err(AnalyticsError::Validation(
                "seasonality.peak_factor must exceed seasonality.low_factor".into(),
            ));
        }
        if self.reorder.coverage_factor <= Decimal::ZERO {
            return Err(AnalyticsError::Validation(
                "reorder.coverage_factor must be positive".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = AnalyticsConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.forecast.window_periods, 7);
        assert_eq!(config.trend.increase_threshold, dec!(0.02));
        assert_eq!(config.seasonality.peak_factor, dec!(1.2));
    }

    #[test]
    fn rejects_non_positive_increase_threshold() {
        let mut config = AnalyticsConfig::default();
        config.trend.increase_threshold = Decimal::ZERO;
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_inverted_seasonality_factors() {
        let mut config = AnalyticsConfig::default();
        config.seasonality.peak_factor = dec!(0.5);
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_zero_forecast_window() {
        let mut config = AnalyticsConfig::default();
        config.forecast.window_periods = 0;
        assert!(config.validate().is_err());
    }
}
