//! Default estimation deck

use super::estimate::{Estimate, EstimateUnit};

/// A card to be inserted into a task's deck
#[derive(Debug, Clone, PartialEq)]
pub struct CardTemplate {
    pub complexity_symbol: &'static str,
    pub unit_value: f64,
}

const FIBONACCI: [CardTemplate; 13] = [
    CardTemplate { complexity_symbol: "0", unit_value: 0.0 },
    CardTemplate { complexity_symbol: "1/2", unit_value: 0.5 },
    CardTemplate { complexity_symbol: "1", unit_value: 1.0 },
    CardTemplate { complexity_symbol: "2", unit_value: 2.0 },
    CardTemplate { complexity_symbol: "3", unit_value: 3.0 },
    CardTemplate { complexity_symbol: "5", unit_value: 5.0 },
    CardTemplate { complexity_symbol: "8", unit_value: 8.0 },
    CardTemplate { complexity_symbol: "13", unit_value: 13.0 },
    CardTemplate { complexity_symbol: "20", unit_value: 20.0 },
    CardTemplate { complexity_symbol: "40", unit_value: 40.0 },
    CardTemplate { complexity_symbol: "100", unit_value: 100.0 },
    CardTemplate { complexity_symbol: "?", unit_value: Estimate::NON_NUMERIC },
    CardTemplate { complexity_symbol: "coffee", unit_value: Estimate::NON_NUMERIC },
];

/// The deck every new task starts with, in display order.
#[derive(Debug, Clone)]
pub struct Deck {
    pub unit: EstimateUnit,
    pub cards: Vec<CardTemplate>,
}

impl Deck {
    /// Fibonacci-like deck: 0, 1/2, 1, 2, 3, 5, 8, 13, 20, 40, 100, ?, coffee
    pub fn fibonacci(unit: EstimateUnit) -> Self {
        Self {
            unit,
            cards: FIBONACCI.to_vec(),
        }
    }
}

impl Default for Deck {
    fn default() -> Self {
        Self::fibonacci(EstimateUnit::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fibonacci_deck_shape() {
        let deck = Deck::default();
        assert_eq!(deck.unit, EstimateUnit::PersonDays);
        assert_eq!(deck.cards.len(), 13);
        assert_eq!(deck.cards[1].complexity_symbol, "1/2");
        assert_eq!(deck.cards[1].unit_value, 0.5);
    }

    #[test]
    fn test_only_special_cards_are_non_numeric() {
        let specials: Vec<_> = Deck::default()
            .cards
            .into_iter()
            .filter(|c| c.unit_value < 0.0)
            .map(|c| c.complexity_symbol)
            .collect();
        assert_eq!(specials, vec!["?", "coffee"]);
    }
}
