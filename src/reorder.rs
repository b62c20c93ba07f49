//! Reorder advice: depletion horizons and suggested order quantities.
//!
//! Usage rates come from the aggregation pipeline (units consumed over a
//! trailing window); stock positions are an external snapshot. An entity
//! with no measurable consumption gets an `Unbounded` horizon and is only
//! suggested when its stock already sits at or below a configured reorder
//! point.

use rayon::prelude::*;
use rust_decimal::Decimal;
use std::collections::HashMap;
use uuid::Uuid;

use crate::config::ReorderConfig;
use crate::models::{DepletionHorizon, ReorderSuggestion, StockLevel};

const URGENCY_DIVISOR: Decimal = rust_decimal_macros::dec!(2);

/// Score every stocked entity and return the ones worth reordering, most
/// urgent first (`Unbounded` horizons sort last).
///
/// `usage_totals` maps entity to total units consumed inside the trailing
/// window of `window_days`; entities absent from the map consumed nothing.
pub fn reorder_suggestions(
    stock_levels: &[StockLevel],
    usage_totals: &HashMap<Uuid, Decimal>,
    window_days: u32,
    max_days: u32,
    config: &ReorderConfig,
) -> Vec<ReorderSuggestion> {
    let window_length = Decimal::from(window_days);
    let horizon_limit = Decimal::from(max_days);
    let urgency_limit = horizon_limit / URGENCY_DIVISOR;

    let mut suggestions: Vec<ReorderSuggestion> = stock_levels
        .par_iter()
        .filter_map(|stock| {
            let total_usage = usage_totals
                .get(&stock.entity_id)
                .copied()
                .unwrap_or(Decimal::ZERO);
            score_entity(
                stock,
                total_usage,
                window_length,
                horizon_limit,
                urgency_limit,
                config,
            )
        })
        .collect();

    suggestions.sort_by(|a, b| {
        a.days_until_depletion
            .cmp(&b.days_until_depletion)
            .then_with(|| a.entity_id.cmp(&b.entity_id))
    });
    suggestions
}

fn score_entity(
    stock: &StockLevel,
    total_usage: Decimal,
    window_length: Decimal,
    horizon_limit: Decimal,
    urgency_limit: Decimal,
    config: &ReorderConfig,
) -> Option<ReorderSuggestion> {
    let daily_usage_rate = total_usage / window_length;

    let days_until_depletion = if daily_usage_rate > Decimal::ZERO {
        DepletionHorizon::Days(stock.current_stock / daily_usage_rate)
    } else {
        DepletionHorizon::Unbounded
    };

    let below_reorder_point = stock
        .reorder_point
        .is_some_and(|point| stock.current_stock <= point);

    if !days_until_depletion.is_within(horizon_limit) && !below_reorder_point {
        return None;
    }

    let suggested_reorder_quantity = stock.reorder_quantity.unwrap_or_else(|| {
        let coverage = daily_usage_rate * horizon_limit * config.coverage_factor;
        coverage.max(stock.current_stock)
    });

    Some(ReorderSuggestion {
        entity_id: stock.entity_id,
        current_stock: stock.current_stock,
        daily_usage_rate,
        days_until_depletion,
        suggested_reorder_quantity,
        urgent: days_until_depletion.is_within(urgency_limit),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use rust_decimal_macros::dec;

    fn stock(entity_id: Uuid, current: Decimal) -> StockLevel {
        StockLevel {
            entity_id,
            current_stock: current,
            reorder_point: None,
            reorder_quantity: None,
        }
    }

    fn entity(n: u128) -> Uuid {
        Uuid::from_u128(n)
    }

    fn advise(
        stock_levels: &[StockLevel],
        usage: &[(Uuid, Decimal)],
        window_days: u32,
        max_days: u32,
    ) -> Vec<ReorderSuggestion> {
        let usage_totals: HashMap<Uuid, Decimal> = usage.iter().copied().collect();
        reorder_suggestions(
            stock_levels,
            &usage_totals,
            window_days,
            max_days,
            &ReorderConfig::default(),
        )
    }

    #[test]
    fn depleting_entity_gets_a_sized_suggestion() {
        // 150 units over 30 days = 5/day; 50 in stock = 10 days left.
        let id = entity(1);
        let suggestions = advise(&[stock(id, dec!(50))], &[(id, dec!(150))], 30, 14);

        assert_eq!(suggestions.len(), 1);
        let suggestion = &suggestions[0];
        assert_eq!(suggestion.daily_usage_rate, dec!(5));
        assert_matches!(suggestion.days_until_depletion, DepletionHorizon::Days(d) if d == dec!(10));
        // max(5 * 14 * 2, 50) = 140
        assert_eq!(suggestion.suggested_reorder_quantity, dec!(140));
        // 10 days is not under the 7-day urgency line.
        assert!(!suggestion.urgent);
    }

    #[test]
    fn imminent_depletion_is_urgent() {
        let id = entity(2);
        let suggestions = advise(&[stock(id, dec!(10))], &[(id, dec!(60))], 30, 14);
        assert_matches!(
            suggestions[0].days_until_depletion,
            DepletionHorizon::Days(d) if d == dec!(5)
        );
        assert!(suggestions[0].urgent);
    }

    #[test]
    fn zero_usage_is_unbounded_and_excluded() {
        let id = entity(3);
        let suggestions = advise(&[stock(id, dec!(50))], &[], 30, 14);
        assert!(suggestions.is_empty());
    }

    #[test]
    fn zero_usage_below_reorder_point_is_still_suggested() {
        let id = entity(4);
        let level = StockLevel {
            entity_id: id,
            current_stock: dec!(5),
            reorder_point: Some(dec!(10)),
            reorder_quantity: Some(dec!(25)),
        };
        let suggestions = advise(&[level], &[], 30, 14);

        assert_eq!(suggestions.len(), 1);
        let suggestion = &suggestions[0];
        assert_eq!(suggestion.days_until_depletion, DepletionHorizon::Unbounded);
        assert_eq!(suggestion.suggested_reorder_quantity, dec!(25));
        assert!(!suggestion.urgent);
    }

    #[test]
    fn configured_quantity_overrides_the_usage_derived_one() {
        let id = entity(5);
        let level = StockLevel {
            entity_id: id,
            current_stock: dec!(50),
            reorder_point: None,
            reorder_quantity: Some(dec!(500)),
        };
        let suggestions = advise(&[level], &[(id, dec!(150))], 30, 14);
        assert_eq!(suggestions[0].suggested_reorder_quantity, dec!(500));
    }

    #[test]
    fn large_stock_falls_back_to_current_stock_sizing() {
        // Rate 1/day over a 14-day horizon doubles to 28, but 200 units of
        // stock below a 250 reorder point dominates the suggestion.
        let id = entity(6);
        let level = StockLevel {
            entity_id: id,
            current_stock: dec!(200),
            reorder_point: Some(dec!(250)),
            reorder_quantity: None,
        };
        let suggestions = advise(&[level], &[(id, dec!(30))], 30, 14);
        assert_eq!(suggestions[0].suggested_reorder_quantity, dec!(200));
    }

    #[test]
    fn output_is_sorted_most_urgent_first_with_unbounded_last() {
        let slow = entity(10);
        let fast = entity(11);
        let idle = entity(12);

        let levels = vec![
            StockLevel {
                entity_id: idle,
                current_stock: dec!(1),
                reorder_point: Some(dec!(5)),
                reorder_quantity: None,
            },
            stock(slow, dec!(100)),
            stock(fast, dec!(10)),
        ];
        let usage = vec![(slow, dec!(300)), (fast, dec!(300))];
        let suggestions = advise(&levels, &usage, 30, 14);

        let order: Vec<Uuid> = suggestions.iter().map(|s| s.entity_id).collect();
        assert_eq!(order, vec![fast, slow, idle]);
        assert_eq!(
            suggestions.last().unwrap().days_until_depletion,
            DepletionHorizon::Unbounded
        );
    }
}
