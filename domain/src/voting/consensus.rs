//! Consensus value of a story
//!
//! Consensus is picked by a facilitator, never computed from the votes. This
//! module only interprets a chosen (or missing) consensus for reporting.

use crate::estimation::{Estimate, EstimateUnit};
use serde::{Deserialize, Serialize};

/// Reporting view of a story's consensus
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ConsensusValue {
    /// No consensus recorded yet
    Unresolved,
    /// Consensus is a card without numeric meaning ("?", "coffee")
    NonNumeric { symbol: String },
    /// Consensus with a numeric value in the deck's unit
    Numeric {
        symbol: String,
        value: f64,
        unit: EstimateUnit,
    },
}

impl ConsensusValue {
    /// Interpret the estimate a story's consensus points to
    pub fn from_estimate(estimate: Option<&Estimate>) -> Self {
        match estimate {
            None => ConsensusValue::Unresolved,
            Some(e) => match e.numeric_value() {
                Some(value) => ConsensusValue::Numeric {
                    symbol: e.complexity_symbol.clone(),
                    value,
                    unit: e.unit,
                },
                None => ConsensusValue::NonNumeric {
                    symbol: e.complexity_symbol.clone(),
                },
            },
        }
    }

    pub fn is_resolved(&self) -> bool {
        !matches!(self, ConsensusValue::Unresolved)
    }

    /// Numeric value, or `None` for unresolved and non-numeric consensus
    pub fn numeric(&self) -> Option<f64> {
        match self {
            ConsensusValue::Numeric { value, .. } => Some(*value),
            _ => None,
        }
    }

    /// Value used in task summaries: unresolved and non-numeric count as 0.
    pub fn summary_value(&self) -> f64 {
        self.numeric().unwrap_or(0.0)
    }
}

impl std::fmt::Display for ConsensusValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConsensusValue::Unresolved => write!(f, "unresolved"),
            ConsensusValue::NonNumeric { symbol } => write!(f, "{}", symbol),
            ConsensusValue::Numeric {
                symbol,
                value,
                unit,
            } => write!(f, "{} ({} {})", symbol, value, unit),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::estimation::{EstimateId, TaskId};

    fn card(symbol: &str, value: f64) -> Estimate {
        Estimate {
            id: EstimateId::new(1),
            task_id: TaskId::new(1),
            complexity_symbol: symbol.to_string(),
            unit: EstimateUnit::PersonDays,
            unit_value: value,
        }
    }

    #[test]
    fn test_unresolved() {
        let value = ConsensusValue::from_estimate(None);
        assert!(!value.is_resolved());
        assert_eq!(value.summary_value(), 0.0);
        assert_eq!(value.to_string(), "unresolved");
    }

    #[test]
    fn test_non_numeric_counts_as_zero() {
        let value = ConsensusValue::from_estimate(Some(&card("coffee", -1.0)));
        assert!(value.is_resolved());
        assert_eq!(value.numeric(), None);
        assert_eq!(value.summary_value(), 0.0);
    }

    #[test]
    fn test_numeric() {
        let value = ConsensusValue::from_estimate(Some(&card("1/2", 0.5)));
        assert_eq!(value.numeric(), Some(0.5));
        assert_eq!(value.to_string(), "1/2 (0.5 person days)");
    }
}
