//! Spread of the cards played in one round
//!
//! Used by facilitators to see how far apart the team is before they pick a
//! consensus. Sentinel cards ("?", "coffee") are counted but never enter the
//! numeric statistics.

use super::vote::UserEstimate;
use crate::estimation::{EstimateId, Iteration, numeric_average};
use serde::{Deserialize, Serialize};

/// Aggregated view of a round's votes
///
/// # Example
///
/// ```
/// use poker_domain::estimation::{Estimate, EstimateId, EstimateUnit, Iteration, TaskId, User, UserId};
/// use poker_domain::voting::{RoundDistribution, UserEstimate};
///
/// let card = |id: u64, value: f64| Estimate {
///     id: EstimateId::new(id),
///     task_id: TaskId::new(1),
///     complexity_symbol: value.to_string(),
///     unit: EstimateUnit::PersonDays,
///     unit_value: value,
/// };
/// let user = |id: u64| User { id: UserId::new(id), name: format!("u{id}") };
///
/// let votes = vec![
///     UserEstimate { user: user(1), estimate: card(5, 3.0) },
///     UserEstimate { user: user(2), estimate: card(6, 5.0) },
/// ];
/// let dist = RoundDistribution::from_votes(Iteration::FIRST, &votes);
/// assert_eq!(dist.min, Some(3.0));
/// assert_eq!(dist.max, Some(5.0));
/// assert!(!dist.is_unanimous());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundDistribution {
    pub iteration: Iteration,
    pub total_votes: usize,
    /// Votes on cards without a numeric value
    pub non_numeric_votes: usize,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub average: Option<f64>,
    /// The card every vote picked, if they all picked the same one
    pub unanimous_estimate: Option<EstimateId>,
}

impl RoundDistribution {
    pub fn from_votes(iteration: Iteration, votes: &[UserEstimate]) -> Self {
        let numeric: Vec<f64> = votes
            .iter()
            .filter_map(|v| v.estimate.numeric_value())
            .collect();

        let min = numeric.iter().copied().reduce(f64::min);
        let max = numeric.iter().copied().reduce(f64::max);
        let average = numeric_average(votes.iter().map(|v| &v.estimate));

        let unanimous_estimate = match votes.split_first() {
            Some((first, rest)) if rest.iter().all(|v| v.estimate.id == first.estimate.id) => {
                Some(first.estimate.id)
            }
            _ => None,
        };

        Self {
            iteration,
            total_votes: votes.len(),
            non_numeric_votes: votes.len() - numeric.len(),
            min,
            max,
            average,
            unanimous_estimate,
        }
    }

    pub fn is_unanimous(&self) -> bool {
        self.unanimous_estimate.is_some()
    }

    /// Distance between the highest and lowest numeric card
    pub fn spread(&self) -> Option<f64> {
        Some(self.max? - self.min?)
    }
}
