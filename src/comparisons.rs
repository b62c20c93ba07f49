//! Year-over-year comparison.
//!
//! Runs the bucketing and aggregation pipeline independently over the two
//! aligned calendar-year windows so both totals go through identical period
//! logic. Standard calendar date arithmetic handles leap years; there is no
//! special casing.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::aggregation::{aggregate_buckets, total_amount};
use crate::bucketing::bucket_records;
use crate::errors::AnalyticsError;
use crate::models::{PeriodType, Record};

/// The result of comparing one calendar year against the previous one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YearOverYear {
    pub current_total: Decimal,
    pub previous_total: Decimal,
    pub percent_change: Decimal,
    pub is_increase: bool,
}

/// Compare `year` against `year - 1` over full January-to-December windows.
///
/// Percent change is zero when the previous year had no positive total, so
/// a cold-start year never divides by zero.
pub fn year_over_year(records: &[Record], year: i32) -> Result<YearOverYear, AnalyticsError> {
    let current_total = calendar_year_total(records, year)?;
    let previous_total = calendar_year_total(records, year - 1)?;

    let percent_change = if previous_total > Decimal::ZERO {
        (current_total - previous_total) / previous_total * dec!(100)
    } else {
        Decimal::ZERO
    };

    Ok(YearOverYear {
        current_total,
        previous_total,
        percent_change,
        is_increase: current_total > previous_total,
    })
}

/// Sum a calendar year through the full pipeline: window, bucket monthly,
/// aggregate, total.
fn calendar_year_total(records: &[Record], year: i32) -> Result<Decimal, AnalyticsError> {
    let start = year_start(year)?;
    let end = year_start(year + 1)?;

    let windowed: Vec<Record> = records
        .iter()
        .filter(|r| r.occurred_at >= start && r.occurred_at < end)
        .cloned()
        .collect();

    let buckets = bucket_records(&windowed, PeriodType::Monthly);
    let aggregates = aggregate_buckets(&buckets);
    Ok(total_amount(&aggregates))
}

fn year_start(year: i32) -> Result<DateTime<Utc>, AnalyticsError> {
    NaiveDate::from_ymd_opt(year, 1, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
        .ok_or(AnalyticsError::InvalidYear(year))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use uuid::Uuid;

    fn record(year: i32, month: u32, day: u32, amount: Decimal) -> Record {
        Record {
            entity_id: Uuid::nil(),
            occurred_at: Utc.with_ymd_and_hms(year, month, day, 18, 30, 0).unwrap(),
            amount,
            quantity: 1,
        }
    }

    #[test]
    fn growth_year_reports_percent_change() {
        let records = vec![
            record(2023, 2, 10, dec!(400)),
            record(2023, 11, 5, dec!(600)),
            record(2024, 3, 1, dec!(750)),
            record(2024, 8, 20, dec!(750)),
        ];

        let result = year_over_year(&records, 2024).unwrap();
        assert_eq!(result.current_total, dec!(1500));
        assert_eq!(result.previous_total, dec!(1000));
        assert_eq!(result.percent_change, dec!(50));
        assert!(result.is_increase);
    }

    #[test]
    fn cold_start_year_has_zero_percent_change() {
        let records = vec![record(2024, 5, 5, dec!(900))];
        let result = year_over_year(&records, 2024).unwrap();
        assert_eq!(result.previous_total, Decimal::ZERO);
        assert_eq!(result.percent_change, Decimal::ZERO);
        assert!(result.is_increase);
    }

    #[test]
    fn decline_is_not_an_increase() {
        let records = vec![
            record(2023, 6, 1, dec!(500)),
            record(2024, 6, 1, dec!(300)),
        ];
        let result = year_over_year(&records, 2024).unwrap();
        assert_eq!(result.percent_change, dec!(-40));
        assert!(!result.is_increase);
    }

    #[test]
    fn records_outside_both_windows_are_ignored() {
        let records = vec![
            record(2021, 12, 31, dec!(999)),
            record(2023, 1, 1, dec!(100)),
            record(2025, 1, 1, dec!(999)),
        ];
        let result = year_over_year(&records, 2024).unwrap();
        assert_eq!(result.current_total, Decimal::ZERO);
        assert_eq!(result.previous_total, dec!(100));
    }

    #[test]
    fn new_years_eve_belongs_to_its_own_year() {
        // Dec 31 23:59 counts toward the closing year even though its ISO
        // week may belong to the next one; the window is calendar-based.
        let records = vec![Record {
            entity_id: Uuid::nil(),
            occurred_at: Utc.with_ymd_and_hms(2024, 12, 31, 23, 59, 59).unwrap(),
            amount: dec!(25),
            quantity: 1,
        }];
        let result = year_over_year(&records, 2024).unwrap();
        assert_eq!(result.current_total, dec!(25));
    }

    #[test]
    fn out_of_range_year_fails_fast() {
        assert!(year_over_year(&[], 262144).is_err());
    }
}
