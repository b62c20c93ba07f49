//! Core data model shared by every analytics component.
//!
//! Records enter the engine as [`RawRecord`]s straight from the Record
//! Source, get screened for data-quality problems, and only then become
//! [`Record`]s, the type the aggregation pipeline consumes. The split keeps
//! "might be dirty" and "known good" data apart at the type level.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use uuid::Uuid;

use crate::errors::AnalyticsError;

/// A transactional record as supplied by the Record Source.
///
/// Already tenant-scoped and authorized by the surrounding platform. The
/// timestamp is optional and the quantity signed because upstream data can
/// be dirty; screening rejects both defects before aggregation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawRecord {
    pub entity_id: Uuid,
    pub occurred_at: Option<DateTime<Utc>>,
    pub amount: Decimal,
    pub quantity: i64,
}

/// A screened record: timestamp present, quantity non-negative.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub entity_id: Uuid,
    pub occurred_at: DateTime<Utc>,
    pub amount: Decimal,
    pub quantity: u64,
}

/// Granularity of period bucketing.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum PeriodType {
    Daily,
    Weekly,
    Monthly,
}

impl PeriodType {
    /// Parse a period type from its wire form, failing fast with a
    /// descriptive error for anything outside the three known values.
    pub fn parse(value: &str) -> Result<Self, AnalyticsError> {
        value
            .parse()
            .map_err(|_| AnalyticsError::InvalidPeriodType(value.to_string()))
    }
}

/// Records sharing one canonical period key. Ephemeral: rebuilt per call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodBucket {
    pub period_key: String,
    pub period_type: PeriodType,
    pub records: Vec<Record>,
}

/// Exact-precision reduction of one period bucket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateResult {
    pub period_key: String,
    pub total_amount: Decimal,
    pub total_quantity: u64,
    pub average_unit_value: Decimal,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display, strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum TrendDirection {
    Increasing,
    Decreasing,
    Stable,
}

/// Direction, endpoint growth rate, and a confidence proxy for an ordered
/// series. Growth rate and direction can disagree on noisy series; both are
/// exposed so the caller can decide which to trust.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendSignal {
    pub direction: TrendDirection,
    pub growth_rate_percent: Decimal,
    /// Inverse coefficient of variation, clamped to `[0, 100]`.
    pub confidence_percent: Decimal,
}

impl TrendSignal {
    /// The neutral signal for series too short to classify.
    pub fn insufficient_data() -> Self {
        Self {
            direction: TrendDirection::Stable,
            growth_rate_percent: Decimal::ZERO,
            confidence_percent: Decimal::ZERO,
        }
    }
}

/// Next-period projection from a trailing window of aggregates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastPoint {
    pub forecasted_value: Decimal,
    /// Number of trailing periods the projection averaged over.
    pub window_size: usize,
    pub direction: TrendDirection,
}

/// One calendar month's aggregate across all years present in the input.
///
/// `average_value` is the multi-year total for the month, not a per-year
/// average; divide by the report's `years_observed` for the latter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeasonalIndex {
    /// Calendar month, 1–12.
    pub month: u32,
    pub average_value: Decimal,
    pub deviation_percent: Decimal,
    pub is_peak: bool,
    pub is_low: bool,
}

/// Days until a stock position runs out at the observed usage rate.
///
/// `Unbounded` means no measurable consumption in the window, so no horizon
/// exists. It is a distinct variant rather than a large sentinel number so
/// horizon comparisons cannot be fooled by a real value colliding with it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "days", rename_all = "snake_case")]
pub enum DepletionHorizon {
    Days(Decimal),
    Unbounded,
}

impl DepletionHorizon {
    /// True when the horizon is a concrete day count strictly below `limit`.
    /// `Unbounded` is never within any limit.
    pub fn is_within(&self, limit: Decimal) -> bool {
        match self {
            Self::Days(days) => *days < limit,
            Self::Unbounded => false,
        }
    }
}

impl Ord for DepletionHorizon {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Days(a), Self::Days(b)) => a.cmp(b),
            (Self::Days(_), Self::Unbounded) => Ordering::Less,
            (Self::Unbounded, Self::Days(_)) => Ordering::Greater,
            (Self::Unbounded, Self::Unbounded) => Ordering::Equal,
        }
    }
}

impl PartialOrd for DepletionHorizon {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Externally supplied stock snapshot for one entity (ingredient, SKU).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockLevel {
    pub entity_id: Uuid,
    pub current_stock: Decimal,
    /// Configured threshold below which replenishment should trigger.
    pub reorder_point: Option<Decimal>,
    /// Configured replenishment quantity; overrides the usage-derived one.
    pub reorder_quantity: Option<Decimal>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReorderSuggestion {
    pub entity_id: Uuid,
    pub current_stock: Decimal,
    pub daily_usage_rate: Decimal,
    pub days_until_depletion: DepletionHorizon,
    pub suggested_reorder_quantity: Decimal,
    pub urgent: bool,
}

/// Which metric a year-over-year comparison is computed for. The Record
/// Source supplies the matching record stream; the engine carries the label
/// through for the Consumer.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display, strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum MetricKind {
    Revenue,
    Production,
    Costs,
}

/// Countable data-quality warnings produced while screening raw records.
///
/// Rejected records are excluded from aggregation but never silently: each
/// rejection increments exactly one counter here.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataQualityReport {
    pub missing_timestamp: u64,
    pub negative_quantity: u64,
}

impl DataQualityReport {
    pub fn skipped_record_count(&self) -> u64 {
        self.missing_timestamp + self.negative_quantity
    }

    pub fn is_clean(&self) -> bool {
        self.skipped_record_count() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use rust_decimal_macros::dec;

    #[test]
    fn period_type_parses_known_values() {
        assert_eq!(PeriodType::parse("daily").unwrap(), PeriodType::Daily);
        assert_eq!(PeriodType::parse("weekly").unwrap(), PeriodType::Weekly);
        assert_eq!(PeriodType::parse("monthly").unwrap(), PeriodType::Monthly);
    }

    #[test]
    fn period_type_rejects_unknown_values() {
        let err = PeriodType::parse("quarterly").unwrap_err();
        assert_matches!(err, AnalyticsError::InvalidPeriodType(v) if v == "quarterly");
    }

    #[test]
    fn depletion_horizon_orders_unbounded_last() {
        let mut horizons = vec![
            DepletionHorizon::Unbounded,
            DepletionHorizon::Days(dec!(3.5)),
            DepletionHorizon::Days(dec!(0.5)),
        ];
        horizons.sort();
        assert_eq!(
            horizons,
            vec![
                DepletionHorizon::Days(dec!(0.5)),
                DepletionHorizon::Days(dec!(3.5)),
                DepletionHorizon::Unbounded,
            ]
        );
    }

    #[test]
    fn unbounded_is_never_within_a_limit() {
        assert!(!DepletionHorizon::Unbounded.is_within(dec!(1000000)));
        assert!(DepletionHorizon::Days(dec!(9.99)).is_within(dec!(10)));
        assert!(!DepletionHorizon::Days(dec!(10)).is_within(dec!(10)));
    }

    #[test]
    fn data_quality_report_counts_total() {
        let report = DataQualityReport {
            missing_timestamp: 2,
            negative_quantity: 3,
        };
        assert_eq!(report.skipped_record_count(), 5);
        assert!(!report.is_clean());
        assert!(DataQualityReport::default().is_clean());
    }
}
