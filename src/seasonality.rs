//! Seasonal indices: per-calendar-month aggregates across all years present.
//!
//! Each month's figure is the multi-year total, matching how the platform
//! has historically reported seasonality; consumers wanting a per-year
//! average divide by [`distinct_years`]. Stability improves with two or
//! more years of history, but any input produces a fully populated
//! twelve-entry result.

use chrono::Datelike;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::BTreeSet;

use crate::config::SeasonalityConfig;
use crate::models::{Record, SeasonalIndex};

const MONTHS: usize = 12;
const HUNDRED: Decimal = dec!(100);

/// Compute the twelve seasonal indices for a record set.
///
/// Deviation is relative to the mean of the twelve monthly totals. Peak and
/// low flags compare each month against that mean scaled by the configured
/// factors; both are false when the mean is zero.
pub fn seasonal_indices(records: &[Record], config: &SeasonalityConfig) -> Vec<SeasonalIndex> {
    let mut monthly_totals = [Decimal::ZERO; MONTHS];
    for record in records {
        let month_index = (record.occurred_at.month() - 1) as usize;
        monthly_totals[month_index] += record.amount;
    }

    let overall_average: Decimal =
        monthly_totals.iter().copied().sum::<Decimal>() / Decimal::from(MONTHS as u64);

    monthly_totals
        .iter()
        .enumerate()
        .map(|(index, &month_total)| {
            let deviation_percent = if overall_average == Decimal::ZERO {
                Decimal::ZERO
            } else {
                (month_total - overall_average) / overall_average * HUNDRED
            };

            let (is_peak, is_low) = if overall_average == Decimal::ZERO {
                (false, false)
            } else {
                (
                    month_total > overall_average * config.peak_factor,
                    month_total < overall_average * config.low_factor,
                )
            };

            SeasonalIndex {
                month: index as u32 + 1,
                average_value: month_total,
                deviation_percent,
                is_peak,
                is_low,
            }
        })
        .collect()
}

/// Number of distinct calendar years observed in the record set.
pub fn distinct_years(records: &[Record]) -> usize {
    records
        .iter()
        .map(|r| r.occurred_at.year())
        .collect::<BTreeSet<_>>()
        .len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeZone, Utc};
    use uuid::Uuid;

    fn record(year: i32, month: u32, amount: Decimal) -> Record {
        Record {
            entity_id: Uuid::nil(),
            occurred_at: ts(year, month),
            amount,
            quantity: 1,
        }
    }

    fn ts(year: i32, month: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(year, month, 15, 8, 0, 0).unwrap()
    }

    #[test]
    fn empty_input_yields_twelve_zero_entries() {
        let indices = seasonal_indices(&[], &SeasonalityConfig::default());
        assert_eq!(indices.len(), 12);
        for (offset, index) in indices.iter().enumerate() {
            assert_eq!(index.month, offset as u32 + 1);
            assert_eq!(index.average_value, Decimal::ZERO);
            assert_eq!(index.deviation_percent, Decimal::ZERO);
            assert!(!index.is_peak);
            assert!(!index.is_low);
        }
    }

    #[test]
    fn one_month_at_three_times_average_is_the_only_peak() {
        // Eleven months at 90 and December at 330 give a twelve-month mean
        // of 110, putting December at exactly three times the mean: +200%
        // deviation and the only peak.
        let mut records: Vec<Record> = (1..=11).map(|m| record(2024, m, dec!(90))).collect();
        records.push(record(2024, 12, dec!(330)));

        let indices = seasonal_indices(&records, &SeasonalityConfig::default());
        let december = &indices[11];
        assert!(december.is_peak);
        assert!(!december.is_low);
        assert_eq!(december.deviation_percent, dec!(200));

        for index in &indices[..11] {
            assert!(!index.is_peak, "month {} wrongly flagged", index.month);
            assert!(!index.is_low, "month {} wrongly flagged", index.month);
        }
    }

    #[test]
    fn months_sum_across_years() {
        let records = vec![
            record(2023, 6, dec!(40)),
            record(2024, 6, dec!(60)),
            record(2024, 7, dec!(10)),
        ];
        let indices = seasonal_indices(&records, &SeasonalityConfig::default());
        assert_eq!(indices[5].average_value, dec!(100));
        assert_eq!(indices[6].average_value, dec!(10));
        assert_eq!(distinct_years(&records), 2);
    }

    #[test]
    fn quiet_months_flag_as_low() {
        // One busy month; the other eleven sit at zero, far below the mean.
        let records = vec![record(2024, 1, dec!(1200))];
        let indices = seasonal_indices(&records, &SeasonalityConfig::default());
        assert!(indices[0].is_peak);
        for index in &indices[1..] {
            assert!(index.is_low, "month {} should be low", index.month);
        }
    }

    #[test]
    fn zero_average_never_divides() {
        // Offsetting amounts: every monthly total is zero, the mean is
        // zero, and nothing blows up.
        let records = vec![record(2024, 3, dec!(75)), record(2024, 3, dec!(-75))];
        let indices = seasonal_indices(&records, &SeasonalityConfig::default());
        assert_eq!(indices[2].deviation_percent, Decimal::ZERO);
        assert!(!indices[2].is_peak);
        assert!(!indices[2].is_low);
    }
}
