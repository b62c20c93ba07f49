//! Next-period projection.
//!
//! Deliberately simple: the mean of a trailing window of period totals,
//! nudged by a fixed factor in the direction the trend analyzer reported.
//! It is a heuristic, documented as such, not a disguised statistical
//! model; the contract (inputs, outputs, insufficient-data behavior) is
//! what downstream consumers depend on.

use rust_decimal::Decimal;

use crate::config::ForecastConfig;
use crate::models::{ForecastPoint, TrendDirection};

/// Project the next period's value from the trailing window of the series.
///
/// The window covers up to `config.window_periods` trailing values, or the
/// whole series when shorter. An empty series forecasts zero over a zero
/// window rather than failing.
pub fn forecast_next_period(
    values: &[Decimal],
    direction: TrendDirection,
    config: &ForecastConfig,
) -> ForecastPoint {
    if values.is_empty() {
        return ForecastPoint {
            forecasted_value: Decimal::ZERO,
            window_size: 0,
            direction,
        };
    }

    let window_size = values.len().min(config.window_periods);
    let window = &values[values.len() - window_size..];
    let window_mean = window.iter().copied().sum::<Decimal>() / Decimal::from(window_size as u64);

    let adjustment = match direction {
        TrendDirection::Increasing => config.increase_adjustment,
        TrendDirection::Decreasing => config.decrease_adjustment,
        TrendDirection::Stable => Decimal::ONE,
    };

    ForecastPoint {
        forecasted_value: window_mean * adjustment,
        window_size,
        direction,
    }
}
