//! Exact-precision reduction of period buckets.
//!
//! All monetary sums run on `Decimal`; the total over a range is therefore
//! bit-for-bit equal to the sum of the underlying record amounts, with no
//! binary-float drift. Buckets are independent pure reductions, so the fan
//! out across them is done with rayon and fanned back in under a
//! deterministic key order.

use rayon::prelude::*;
use rust_decimal::Decimal;
use std::collections::BTreeMap;

use crate::models::{AggregateResult, PeriodBucket};

/// Reduce one bucket to its totals and average unit value.
///
/// A bucket with monetary movement but zero recorded units is valid (a flat
/// fee, for example); its average unit value is zero rather than an error.
pub fn aggregate_bucket(bucket: &PeriodBucket) -> AggregateResult {
    let total_amount: Decimal = bucket.records.iter().map(|r| r.amount).sum();
    let total_quantity: u64 = bucket.records.iter().map(|r| r.quantity).sum();

    let average_unit_value = if total_quantity > 0 {
        total_amount / Decimal::from(total_quantity)
    } else {
        Decimal::ZERO
    };

    AggregateResult {
        period_key: bucket.period_key.clone(),
        total_amount,
        total_quantity,
        average_unit_value,
    }
}

/// Reduce every bucket in a range, returning aggregates ordered by period
/// key. Parallel per bucket, deterministic in output.
pub fn aggregate_buckets(buckets: &BTreeMap<String, PeriodBucket>) -> Vec<AggregateResult> {
    let mut aggregates: Vec<AggregateResult> = buckets
        .par_iter()
        .map(|(_, bucket)| aggregate_bucket(bucket))
        .collect();
    aggregates.sort_by(|a, b| a.period_key.cmp(&b.period_key));
    aggregates
}

/// Exact sum of `total_amount` across aggregates.
pub fn total_amount(aggregates: &[AggregateResult]) -> Decimal {
    aggregates.iter().map(|a| a.total_amount).sum()
}
