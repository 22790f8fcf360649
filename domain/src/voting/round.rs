//! Derived round status
//!
//! The status of a round is never stored. It is recomputed on read from the
//! number of distinct voters in that round and the size of the team.

use crate::estimation::Iteration;
use serde::{Deserialize, Serialize};

/// Status of one voting round of a story
///
/// # Example
///
/// ```
/// use poker_domain::estimation::Iteration;
/// use poker_domain::voting::RoundStatus;
///
/// let status = RoundStatus::derive(Iteration::FIRST, 2, 3);
/// assert!(status.is_voting());
/// assert_eq!(status.missing_votes(), 1);
///
/// let done = RoundStatus::derive(Iteration::FIRST, 3, 3);
/// assert!(done.is_complete());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum RoundStatus {
    /// Votes are still being collected
    Voting {
        iteration: Iteration,
        voters: usize,
        team_size: usize,
    },
    /// Every team member has voted in this round
    RoundComplete { iteration: Iteration },
}

impl RoundStatus {
    /// Derive the status of `iteration` from its distinct voter count.
    ///
    /// A round of a task without members never completes.
    pub fn derive(iteration: Iteration, voters: usize, team_size: usize) -> Self {
        if team_size > 0 && voters >= team_size {
            RoundStatus::RoundComplete { iteration }
        } else {
            RoundStatus::Voting {
                iteration,
                voters,
                team_size,
            }
        }
    }

    pub fn iteration(&self) -> Iteration {
        match self {
            RoundStatus::Voting { iteration, .. } | RoundStatus::RoundComplete { iteration } => {
                *iteration
            }
        }
    }

    pub fn is_voting(&self) -> bool {
        matches!(self, RoundStatus::Voting { .. })
    }

    pub fn is_complete(&self) -> bool {
        matches!(self, RoundStatus::RoundComplete { .. })
    }

    /// Votes still needed before the round is complete
    pub fn missing_votes(&self) -> usize {
        match self {
            RoundStatus::Voting {
                voters, team_size, ..
            } => team_size.saturating_sub(*voters),
            RoundStatus::RoundComplete { .. } => 0,
        }
    }
}

impl std::fmt::Display for RoundStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RoundStatus::Voting {
                iteration,
                voters,
                team_size,
            } => write!(f, "Round {}: voting ({}/{})", iteration, voters, team_size),
            RoundStatus::RoundComplete { iteration } => write!(f, "Round {}: complete", iteration),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_without_votes_is_voting() {
        let status = RoundStatus::derive(Iteration::new(2), 0, 4);
        assert_eq!(
            status,
            RoundStatus::Voting {
                iteration: Iteration::new(2),
                voters: 0,
                team_size: 4
            }
        );
        assert_eq!(status.missing_votes(), 4);
    }

    #[test]
    fn test_empty_team_never_completes() {
        let status = RoundStatus::derive(Iteration::FIRST, 0, 0);
        assert!(status.is_voting());
        let status = RoundStatus::derive(Iteration::FIRST, 3, 0);
        assert!(status.is_voting());
    }

    #[test]
    fn test_more_voters_than_team_is_complete() {
        // Members removed after voting still leave the round complete
        let status = RoundStatus::derive(Iteration::new(1), 4, 3);
        assert!(status.is_complete());
        assert_eq!(status.iteration(), Iteration::new(1));
        assert_eq!(status.missing_votes(), 0);
    }

    #[test]
    fn test_display() {
        assert_eq!(
            RoundStatus::derive(Iteration::FIRST, 1, 3).to_string(),
            "Round 0: voting (1/3)"
        );
        assert_eq!(
            RoundStatus::derive(Iteration::FIRST, 3, 3).to_string(),
            "Round 0: complete"
        );
    }
}
