//! Trend classification over an ordered aggregate series.
//!
//! Two measures are computed side by side because they can disagree on
//! noisy series: an endpoint-to-endpoint growth rate, and a fit-based
//! direction from the ordinary least-squares slope of `(index, value)`
//! pairs. The slope is normalized by the series mean before thresholding so
//! classification does not depend on the unit scale of the values.

use rust_decimal::{Decimal, MathematicalOps};
use rust_decimal_macros::dec;

use crate::config::TrendConfig;
use crate::models::{TrendDirection, TrendSignal};

const HUNDRED: Decimal = dec!(100);

/// Classify an ordered series of period totals.
///
/// Fewer than two points yields the neutral signal: `stable`, zero growth,
/// zero confidence (variance is trivially zero, but there is not enough
/// information to be confident in anything).
pub fn analyze_trend(values: &[Decimal], config: &TrendConfig) -> TrendSignal {
    if values.len() < 2 {
        return TrendSignal::insufficient_data();
    }

    let n = Decimal::from(values.len() as u64);
    let sum: Decimal = values.iter().copied().sum();
    let mean = sum / n;

    let first = values[0];
    let last = values[values.len() - 1];
    let growth_rate_percent = if first > Decimal::ZERO {
        (last - first) / first * HUNDRED
    } else {
        Decimal::ZERO
    };

    let direction = classify_direction(values, mean, config);
    let confidence_percent = confidence(values, mean, n);

    TrendSignal {
        direction,
        growth_rate_percent,
        confidence_percent,
    }
}

/// OLS slope of `(index, value)` pairs, normalized by the series mean, then
/// thresholded. A zero mean leaves nothing to normalize against, so the
/// series is reported stable.
fn classify_direction(values: &[Decimal], mean: Decimal, config: &TrendConfig) -> TrendDirection {
    if mean == Decimal::ZERO {
        return TrendDirection::Stable;
    }

    let n = Decimal::from(values.len() as u64);
    let mut sum_x = Decimal::ZERO;
    let mut sum_y = Decimal::ZERO;
    let mut sum_xy = Decimal::ZERO;
    let mut sum_x2 = Decimal::ZERO;

    for (index, value) in values.iter().enumerate() {
        let x = Decimal::from(index as u64);
        sum_x += x;
        sum_y += *value;
        sum_xy += x * *value;
        sum_x2 += x * x;
    }

    // Denominator is strictly positive for two or more distinct indices.
    let slope = (n * sum_xy - sum_x * sum_y) / (n * sum_x2 - sum_x * sum_x);
    let normalized = slope / mean;

    if normalized > config.increase_threshold {
        TrendDirection::Increasing
    } else if normalized < config.decrease_threshold {
        TrendDirection::Decreasing
    } else {
        TrendDirection::Stable
    }
}

/// Inverse coefficient of variation, clamped to `[0, 100]`.
///
/// A zero mean defines the coefficient as zero (confidence 100): a series
/// that nets out to nothing has no meaningful relative dispersion.
fn confidence(values: &[Decimal], mean: Decimal, n: Decimal) -> Decimal {
    if mean == Decimal::ZERO {
        return HUNDRED;
    }

    let variance: Decimal = values
        .iter()
        .map(|v| {
            let delta = *v - mean;
            delta * delta
        })
        .sum::<Decimal>()
        / n;
    let stddev = variance.sqrt().unwrap_or(Decimal::ZERO);
    let coefficient_of_variation = stddev / mean;

    (HUNDRED - coefficient_of_variation * HUNDRED).clamp(Decimal::ZERO, HUNDRED)
}
