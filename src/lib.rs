//! Ladle Analytics
//!
//! The time-series analytics and forecasting engine of the Ladle operations
//! platform. It turns append-only transactional records (sales, production
//! runs, ingredient price history, stock movements) into period-bucketed
//! aggregates, trend classifications, seasonal indices, year-over-year
//! comparisons, and reorder recommendations.
//!
//! The engine is pure: every entry point takes an explicit, immutable record
//! set and returns a value. It performs no I/O, holds no state across calls,
//! and does no authorization: records arrive already tenant-scoped from the
//! surrounding platform, and results are handed back to it for rendering.
//!
//! Monetary aggregation runs on [`rust_decimal::Decimal`] end to end, so
//! totals are bit-for-bit reconstructable from their inputs.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![allow(elided_lifetimes_in_paths)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

pub mod aggregation;
pub mod bucketing;
pub mod comparisons;
pub mod config;
pub mod engine;
pub mod errors;
pub mod forecasting;
pub mod models;
pub mod reorder;
pub mod seasonality;
pub mod trends;

pub use config::AnalyticsConfig;
pub use engine::AnalyticsEngine;
pub use errors::AnalyticsError;
pub use models::{
    AggregateResult, DataQualityReport, DepletionHorizon, ForecastPoint, MetricKind, PeriodBucket,
    PeriodType, RawRecord, Record, ReorderSuggestion, SeasonalIndex, StockLevel, TrendDirection,
    TrendSignal,
};
