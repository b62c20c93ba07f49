//! Period bucketing: groups screened records under canonical period keys.
//!
//! Keys are derived from the record's UTC timestamp; the engine never
//! consults a local clock, so the same record set always buckets the same
//! way regardless of where the computation runs.
//!
//! Weekly keys use the ISO-8601 week definition (`YYYY-Www`, Monday-based).
//! The ISO year can differ from the calendar year at year boundaries: the
//! last days of December can belong to week 1 of the next ISO year, and the
//! first days of January to week 52/53 of the previous one.

use chrono::{DateTime, Datelike, Utc};
use std::collections::BTreeMap;

use crate::models::{PeriodBucket, PeriodType, Record};

/// The canonical period key for a timestamp at the given granularity.
///
/// Total and deterministic: every timestamp maps to exactly one key per
/// period type, and no two distinct periods share a key.
pub fn period_key(timestamp: DateTime<Utc>, period_type: PeriodType) -> String {
    match period_type {
        PeriodType::Daily => timestamp.format("%Y-%m-%d").to_string(),
        PeriodType::Weekly => {
            let week = timestamp.iso_week();
            format!("{:04}-W{:02}", week.year(), week.week())
        }
        PeriodType::Monthly => timestamp.format("%Y-%m").to_string(),
    }
}

/// Group records into period buckets, preserving input order within each
/// bucket. Empty input yields an empty map.
pub fn bucket_records(
    records: &[Record],
    period_type: PeriodType,
) -> BTreeMap<String, PeriodBucket> {
    let mut buckets: BTreeMap<String, PeriodBucket> = BTreeMap::new();

    for record in records {
        let key = period_key(record.occurred_at, period_type);
        buckets
            .entry(key.clone())
            .or_insert_with(|| PeriodBucket {
                period_key: key,
                period_type,
                records: Vec::new(),
            })
            .records
            .push(record.clone());
    }

    buckets
}
