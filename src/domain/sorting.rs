use crate::domain::card::Card;
use serde::{Deserialize, Serialize};

/// Distance left between neighbours when appending or prepending
pub const DEFAULT_GAP: f64 = 1000.0;

/// Sort value given to the first card of an empty column
pub const DEFAULT_EMPTY_COLUMN_BASE: f64 = 10_000.0;

/// Parameters of the fractional ordering scheme
///
/// Cards carry a floating-point rank. Inserting between two cards takes the
/// midpoint of their ranks, so a move rewrites one card instead of
/// renumbering the whole column. Repeated inserts into the same slot halve
/// the available space each time and will eventually run out of precision.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrderingConfig {
    pub gap: f64,
    pub empty_column_base: f64,
}

impl Default for OrderingConfig {
    fn default() -> Self {
        Self {
            gap: DEFAULT_GAP,
            empty_column_base: DEFAULT_EMPTY_COLUMN_BASE,
        }
    }
}

impl OrderingConfig {
    /// Computes a sort value for a card placed between `previous` and `next`
    ///
    /// # Examples
    /// ```
    /// use kanban_board_core::domain::sorting::OrderingConfig;
    ///
    /// let ordering = OrderingConfig::default();
    /// assert_eq!(ordering.order_between(Some(1000.0), Some(2000.0)), 1500.0);
    /// assert_eq!(ordering.order_between(Some(1000.0), None), 2000.0);
    /// assert_eq!(ordering.order_between(None, Some(1000.0)), 0.0);
    /// assert_eq!(ordering.order_between(None, None), 10_000.0);
    /// ```
    pub fn order_between(&self, previous: Option<f64>, next: Option<f64>) -> f64 {
        match (previous, next) {
            (Some(previous), Some(next)) => (previous + next) / 2.0,
            (Some(previous), None) => previous + self.gap,
            (None, Some(next)) => next - self.gap,
            (None, None) => self.empty_column_base,
        }
    }

    /// Sort value for a card appended after every card in `cards`
    pub fn order_after_last(&self, cards: &[Card]) -> f64 {
        cards
            .iter()
            .map(|card| card.sort_order)
            .reduce(f64::max)
            .map(|max| max + self.gap)
            .unwrap_or(self.empty_column_base)
    }
}

/// Shorthand for [`OrderingConfig::order_between`] with the default gap and base
pub fn order_between(previous: Option<f64>, next: Option<f64>) -> f64 {
    OrderingConfig::default().order_between(previous, next)
}

/// Sorts cards by ascending sort value. Equal values keep their relative order.
pub fn sort_cards(cards: &mut [Card]) {
    cards.sort_by(|a, b| a.sort_order.total_cmp(&b.sort_order));
}

/// Checks that sort values strictly increase along the slice
pub fn is_strictly_ascending(cards: &[Card]) -> bool {
    cards
        .windows(2)
        .all(|pair| pair[0].sort_order < pair[1].sort_order)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::card::CardId;

    fn card(id: &str, sort_order: f64) -> Card {
        Card::new(CardId::new(id), id, sort_order)
    }

    #[test]
    fn test_order_between_neighbours_is_midpoint() {
        assert_eq!(order_between(Some(1000.0), Some(3000.0)), 2000.0);
        assert_eq!(order_between(Some(-1.0), Some(0.0)), -0.5);
    }

    #[test]
    fn test_order_between_edges() {
        assert_eq!(order_between(Some(5000.0), None), 6000.0);
        assert_eq!(order_between(None, Some(5000.0)), 4000.0);
        assert_eq!(order_between(None, None), DEFAULT_EMPTY_COLUMN_BASE);
    }

    #[test]
    fn test_order_between_is_strictly_inside() {
        let pairs = [(0.0, 1.0), (1000.0, 1000.5), (-300.0, 12.25), (10_000.0, 11_000.0)];
        for (a, b) in pairs {
            let mid = order_between(Some(a), Some(b));
            assert!(a < mid && mid < b, "{} not strictly between {} and {}", mid, a, b);
        }
    }

    #[test]
    fn test_custom_gap() {
        let ordering = OrderingConfig {
            gap: 10.0,
            empty_column_base: 0.0,
        };
        assert_eq!(ordering.order_between(Some(5.0), None), 15.0);
        assert_eq!(ordering.order_between(None, None), 0.0);
    }

    #[test]
    fn test_order_after_last_uses_maximum() {
        let ordering = OrderingConfig::default();
        assert_eq!(ordering.order_after_last(&[]), DEFAULT_EMPTY_COLUMN_BASE);

        let cards = vec![card("a", 500.0), card("b", 2500.0), card("c", 1500.0)];
        assert_eq!(ordering.order_after_last(&cards), 3500.0);
    }

    #[test]
    fn test_sequential_appends_are_distinct_and_ascending() {
        let ordering = OrderingConfig::default();
        let mut cards = Vec::new();

        for i in 0..50 {
            let sort_order = ordering.order_after_last(&cards);
            cards.push(card(&format!("c{}", i), sort_order));
        }

        assert!(is_strictly_ascending(&cards));
        assert_eq!(cards[0].sort_order, DEFAULT_EMPTY_COLUMN_BASE);
    }

    #[test]
    fn test_sort_cards_ascending_and_stable() {
        let mut cards = vec![
            card("c", 3000.0),
            card("a", 1000.0),
            card("b1", 2000.0),
            card("b2", 2000.0),
        ];

        sort_cards(&mut cards);

        let ids: Vec<&str> = cards.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b1", "b2", "c"]);
        assert!(!is_strictly_ascending(&cards));
    }
}
