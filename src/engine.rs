//! The analytics facade: validated entry points over the pure components.
//!
//! Every method takes an explicit record set from the Record Source and a
//! query describing the tenant scope, window, and options, and returns a
//! fully populated report. Empty input produces zero-valued reports, never
//! omitted fields. Raw records are screened first; rejects are counted into
//! the report's [`DataQualityReport`] and logged, never silently dropped.

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, instrument, warn};
use uuid::Uuid;
use validator::Validate;

use crate::aggregation::aggregate_buckets;
use crate::bucketing::bucket_records;
use crate::comparisons::{self, YearOverYear};
use crate::config::AnalyticsConfig;
use crate::errors::AnalyticsError;
use crate::forecasting::forecast_next_period;
use crate::models::{
    AggregateResult, DataQualityReport, ForecastPoint, MetricKind, PeriodType, RawRecord, Record,
    ReorderSuggestion, SeasonalIndex, StockLevel, TrendSignal,
};
use crate::reorder::reorder_suggestions;
use crate::seasonality::{distinct_years, seasonal_indices};
use crate::trends::analyze_trend;

/// Query for the aggregate-shaped entry points: a tenant scope, an
/// inclusive-exclusive window `[start, end)`, a bucketing granularity, and
/// an optional entity filter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AggregateQuery {
    pub scope_id: Uuid,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub period_type: PeriodType,
    #[serde(default)]
    pub entity_ids: Option<Vec<Uuid>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeasonalityQuery {
    pub scope_id: Uuid,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    #[serde(default)]
    pub entity_ids: Option<Vec<Uuid>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct YoYQuery {
    pub scope_id: Uuid,
    #[validate(range(min = 1000, max = 9999))]
    pub year: i32,
    pub metric: MetricKind,
}

/// Reorder advice runs over a trailing usage window ending at `as_of`; the
/// engine never consults a wall clock, so the caller pins the reference
/// point explicitly.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ReorderQuery {
    pub scope_id: Uuid,
    pub as_of: DateTime<Utc>,
    #[validate(range(min = 1, max = 3650))]
    pub window_days: u32,
    #[validate(range(min = 1, max = 3650))]
    pub max_days: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct TopEntitiesQuery {
    pub scope_id: Uuid,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    #[validate(range(min = 1, max = 100))]
    pub limit: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PeriodAggregateReport {
    pub scope_id: Uuid,
    pub period_type: PeriodType,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub aggregates: Vec<AggregateResult>,
    pub data_quality: DataQualityReport,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrendReport {
    pub scope_id: Uuid,
    pub period_type: PeriodType,
    pub signal: TrendSignal,
    pub aggregates: Vec<AggregateResult>,
    pub data_quality: DataQualityReport,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastReport {
    pub scope_id: Uuid,
    pub period_type: PeriodType,
    pub point: ForecastPoint,
    pub signal: TrendSignal,
    pub data_quality: DataQualityReport,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeasonalityReport {
    pub scope_id: Uuid,
    pub indices: Vec<SeasonalIndex>,
    /// Distinct calendar years present in the screened input; divide the
    /// monthly totals by this for a per-year average.
    pub years_observed: usize,
    pub data_quality: DataQualityReport,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct YoYReport {
    pub scope_id: Uuid,
    pub metric: MetricKind,
    pub year: i32,
    pub comparison: YearOverYear,
    pub data_quality: DataQualityReport,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReorderReport {
    pub scope_id: Uuid,
    pub as_of: DateTime<Utc>,
    pub window_days: u32,
    pub max_days: u32,
    pub suggestions: Vec<ReorderSuggestion>,
    pub data_quality: DataQualityReport,
}

/// One-call dashboard summary of a window.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RangeSummary {
    pub scope_id: Uuid,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub total_amount: Decimal,
    pub total_quantity: u64,
    pub record_count: usize,
    pub average_unit_value: Decimal,
    pub data_quality: DataQualityReport,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopEntity {
    pub entity_id: Uuid,
    pub total_amount: Decimal,
    pub total_quantity: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopEntitiesReport {
    pub scope_id: Uuid,
    pub entries: Vec<TopEntity>,
    pub data_quality: DataQualityReport,
}

/// The engine itself: configuration plus pure methods. Cheap to clone and
/// safe to share across threads; concurrent calls never interact.
#[derive(Debug, Clone, Default)]
pub struct AnalyticsEngine {
    config: AnalyticsConfig,
}

impl AnalyticsEngine {
    pub fn new(config: AnalyticsConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AnalyticsConfig {
        &self.config
    }

    /// Bucket and aggregate a window of records at the requested
    /// granularity.
    #[instrument(skip(self, records), fields(scope_id = %query.scope_id))]
    pub fn period_aggregates(
        &self,
        query: &AggregateQuery,
        records: &[RawRecord],
    ) -> Result<PeriodAggregateReport, AnalyticsError> {
        let (aggregates, data_quality) = self.windowed_aggregates(query, records)?;
        Ok(PeriodAggregateReport {
            scope_id: query.scope_id,
            period_type: query.period_type,
            start: query.start,
            end: query.end,
            aggregates,
            data_quality,
        })
    }

    /// Classify the trend of the period totals in a window.
    #[instrument(skip(self, records), fields(scope_id = %query.scope_id))]
    pub fn trend_report(
        &self,
        query: &AggregateQuery,
        records: &[RawRecord],
    ) -> Result<TrendReport, AnalyticsError> {
        let (aggregates, data_quality) = self.windowed_aggregates(query, records)?;
        let values: Vec<Decimal> = aggregates.iter().map(|a| a.total_amount).collect();
        let signal = analyze_trend(&values, &self.config.trend);

        Ok(TrendReport {
            scope_id: query.scope_id,
            period_type: query.period_type,
            signal,
            aggregates,
            data_quality,
        })
    }

    /// Project the next period's total from the trailing window of the
    /// aggregate series, steered by the trend direction.
    #[instrument(skip(self, records), fields(scope_id = %query.scope_id))]
    pub fn forecast(
        &self,
        query: &AggregateQuery,
        records: &[RawRecord],
    ) -> Result<ForecastReport, AnalyticsError> {
        let (aggregates, data_quality) = self.windowed_aggregates(query, records)?;
        let values: Vec<Decimal> = aggregates.iter().map(|a| a.total_amount).collect();
        let signal = analyze_trend(&values, &self.config.trend);
        let point = forecast_next_period(&values, signal.direction, &self.config.forecast);

        Ok(ForecastReport {
            scope_id: query.scope_id,
            period_type: query.period_type,
            point,
            signal,
            data_quality,
        })
    }

    /// Per-calendar-month seasonal indices over all years in the window.
    #[instrument(skip(self, records), fields(scope_id = %query.scope_id))]
    pub fn seasonality(
        &self,
        query: &SeasonalityQuery,
        records: &[RawRecord],
    ) -> Result<SeasonalityReport, AnalyticsError> {
        ensure_window(query.start, query.end)?;
        let (screened, data_quality) = screen_records(records);
        let windowed = window_filter(
            screened,
            query.start,
            query.end,
            query.entity_ids.as_deref(),
        );

        Ok(SeasonalityReport {
            scope_id: query.scope_id,
            indices: seasonal_indices(&windowed, &self.config.seasonality),
            years_observed: distinct_years(&windowed),
            data_quality,
        })
    }

    /// Compare a calendar year against the previous one for the selected
    /// metric. The record set is the already-fetched history for that
    /// metric; both year windows go through identical bucketing logic.
    #[instrument(skip(self, records), fields(scope_id = %query.scope_id, metric = %query.metric))]
    pub fn year_over_year(
        &self,
        query: &YoYQuery,
        records: &[RawRecord],
    ) -> Result<YoYReport, AnalyticsError> {
        query.validate().map_err(AnalyticsError::validation)?;
        let (screened, data_quality) = screen_records(records);
        let comparison = comparisons::year_over_year(&screened, query.year)?;

        Ok(YoYReport {
            scope_id: query.scope_id,
            metric: query.metric,
            year: query.year,
            comparison,
            data_quality,
        })
    }

    /// Reorder advice from a trailing usage window and an external stock
    /// snapshot, most urgent first.
    #[instrument(skip(self, stock_levels, usage_records), fields(scope_id = %query.scope_id))]
    pub fn reorder_advice(
        &self,
        query: &ReorderQuery,
        stock_levels: &[StockLevel],
        usage_records: &[RawRecord],
    ) -> Result<ReorderReport, AnalyticsError> {
        query.validate().map_err(AnalyticsError::validation)?;
        let window_start = query.as_of - Duration::days(i64::from(query.window_days));

        let (screened, data_quality) = screen_records(usage_records);
        let windowed = window_filter(screened, window_start, query.as_of, None);

        let mut usage_totals: HashMap<Uuid, Decimal> = HashMap::new();
        for record in &windowed {
            *usage_totals.entry(record.entity_id).or_default() += Decimal::from(record.quantity);
        }

        let suggestions = reorder_suggestions(
            stock_levels,
            &usage_totals,
            query.window_days,
            query.max_days,
            &self.config.reorder,
        );
        debug!(
            suggestions = suggestions.len(),
            entities = stock_levels.len(),
            "Scored reorder candidates"
        );

        Ok(ReorderReport {
            scope_id: query.scope_id,
            as_of: query.as_of,
            window_days: query.window_days,
            max_days: query.max_days,
            suggestions,
            data_quality,
        })
    }

    /// Dashboard-style totals for a window in one call.
    #[instrument(skip(self, records), fields(scope_id = %query.scope_id))]
    pub fn range_summary(
        &self,
        query: &AggregateQuery,
        records: &[RawRecord],
    ) -> Result<RangeSummary, AnalyticsError> {
        ensure_window(query.start, query.end)?;
        let (screened, data_quality) = screen_records(records);
        let windowed = window_filter(
            screened,
            query.start,
            query.end,
            query.entity_ids.as_deref(),
        );

        let total: Decimal = windowed.iter().map(|r| r.amount).sum();
        let total_quantity: u64 = windowed.iter().map(|r| r.quantity).sum();
        let record_count = windowed.len();

        let average_unit_value = if total_quantity > 0 {
            total / Decimal::from(total_quantity)
        } else {
            Decimal::ZERO
        };

        Ok(RangeSummary {
            scope_id: query.scope_id,
            start: query.start,
            end: query.end,
            total_amount: total,
            total_quantity,
            record_count,
            average_unit_value,
            data_quality,
        })
    }

    /// Rank entities by total amount within a window, largest first.
    #[instrument(skip(self, records), fields(scope_id = %query.scope_id))]
    pub fn top_entities(
        &self,
        query: &TopEntitiesQuery,
        records: &[RawRecord],
    ) -> Result<TopEntitiesReport, AnalyticsError> {
        query.validate().map_err(AnalyticsError::validation)?;
        ensure_window(query.start, query.end)?;

        let (screened, data_quality) = screen_records(records);
        let windowed = window_filter(screened, query.start, query.end, None);

        let mut by_entity: HashMap<Uuid, (Decimal, u64)> = HashMap::new();
        for record in &windowed {
            let entry = by_entity.entry(record.entity_id).or_default();
            entry.0 += record.amount;
            entry.1 += record.quantity;
        }

        let mut entries: Vec<TopEntity> = by_entity
            .into_iter()
            .map(|(entity_id, (amount, quantity))| TopEntity {
                entity_id,
                total_amount: amount,
                total_quantity: quantity,
            })
            .collect();
        entries.sort_by(|a, b| {
            b.total_amount
                .cmp(&a.total_amount)
                .then_with(|| a.entity_id.cmp(&b.entity_id))
        });
        entries.truncate(query.limit as usize);

        Ok(TopEntitiesReport {
            scope_id: query.scope_id,
            entries,
            data_quality,
        })
    }

    /// Shared front half of the aggregate-shaped entry points: validate the
    /// window, screen, filter, bucket, aggregate.
    fn windowed_aggregates(
        &self,
        query: &AggregateQuery,
        records: &[RawRecord],
    ) -> Result<(Vec<AggregateResult>, DataQualityReport), AnalyticsError> {
        ensure_window(query.start, query.end)?;
        let (screened, data_quality) = screen_records(records);
        let windowed = window_filter(
            screened,
            query.start,
            query.end,
            query.entity_ids.as_deref(),
        );
        let buckets = bucket_records(&windowed, query.period_type);
        Ok((aggregate_buckets(&buckets), data_quality))
    }
}

fn ensure_window(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<(), AnalyticsError> {
    if start >= end {
        return Err(AnalyticsError::InvalidDateRange { start, end });
    }
    Ok(())
}

/// Screen raw records into the aggregation-ready form.
///
/// A record missing its timestamp or carrying a negative quantity is a
/// data-quality defect: it is excluded from every computation and counted,
/// never summed as if valid.
pub fn screen_records(records: &[RawRecord]) -> (Vec<Record>, DataQualityReport) {
    let mut report = DataQualityReport::default();
    let mut screened = Vec::with_capacity(records.len());

    for record in records {
        let Some(occurred_at) = record.occurred_at else {
            debug!(entity_id = %record.entity_id, "Skipping record without timestamp");
            report.missing_timestamp += 1;
            continue;
        };
        let Ok(quantity) = u64::try_from(record.quantity) else {
            debug!(
                entity_id = %record.entity_id,
                quantity = record.quantity,
                "Skipping record with negative quantity"
            );
            report.negative_quantity += 1;
            continue;
        };

        screened.push(Record {
            entity_id: record.entity_id,
            occurred_at,
            amount: record.amount,
            quantity,
        });
    }

    if !report.is_clean() {
        warn!(
            missing_timestamp = report.missing_timestamp,
            negative_quantity = report.negative_quantity,
            "Excluded records with data-quality defects"
        );
    }

    (screened, report)
}

/// Restrict records to `[start, end)` and, when given, to the entity list.
fn window_filter(
    records: Vec<Record>,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    entity_ids: Option<&[Uuid]>,
) -> Vec<Record> {
    records
        .into_iter()
        .filter(|r| r.occurred_at >= start && r.occurred_at < end)
        .filter(|r| entity_ids.map_or(true, |ids| ids.contains(&r.entity_id)))
        .collect()
}
