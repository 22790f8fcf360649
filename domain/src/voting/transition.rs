//! Round transition rule
//!
//! Decides, before a vote is written, whether that vote closes the round.
//!
//! The check runs against the number of ledger rows already in the round,
//! before the new vote is inserted: the vote closes the round exactly when
//! one row was missing. A round that already holds `team_size` rows (a
//! repeated or late vote) is not advanced again by further votes.

use crate::core::error::DomainError;
use crate::estimation::TaskId;

/// What to do with an incoming vote
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoteTransition {
    /// Append the vote, the round stays open
    Record,
    /// Append the vote, then move the story to the next round
    RecordAndAdvance,
}

impl VoteTransition {
    /// Plan the transition for a vote on a story of `task`.
    ///
    /// `prior_votes` counts the ledger rows of the story's current round
    /// before this vote, repeats included.
    pub fn plan(task: TaskId, prior_votes: usize, team_size: usize) -> Result<Self, DomainError> {
        if team_size == 0 {
            return Err(DomainError::EmptyTeam(task));
        }

        if prior_votes == team_size - 1 {
            Ok(VoteTransition::RecordAndAdvance)
        } else {
            Ok(VoteTransition::Record)
        }
    }

    pub fn advances(&self) -> bool {
        matches!(self, VoteTransition::RecordAndAdvance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TASK: TaskId = TaskId::new(1);

    #[test]
    fn test_last_missing_vote_advances() {
        assert_eq!(
            VoteTransition::plan(TASK, 2, 3).unwrap(),
            VoteTransition::RecordAndAdvance
        );
    }

    #[test]
    fn test_earlier_votes_only_record() {
        assert_eq!(VoteTransition::plan(TASK, 0, 3).unwrap(), VoteTransition::Record);
        assert_eq!(VoteTransition::plan(TASK, 1, 3).unwrap(), VoteTransition::Record);
    }

    #[test]
    fn test_full_round_does_not_advance_again() {
        assert_eq!(VoteTransition::plan(TASK, 3, 3).unwrap(), VoteTransition::Record);
        assert_eq!(VoteTransition::plan(TASK, 4, 3).unwrap(), VoteTransition::Record);
    }

    #[test]
    fn test_single_member_team_advances_immediately() {
        assert!(VoteTransition::plan(TASK, 0, 1).unwrap().advances());
    }

    #[test]
    fn test_empty_team_is_invalid_state() {
        assert_eq!(
            VoteTransition::plan(TASK, 0, 0),
            Err(DomainError::EmptyTeam(TASK))
        );
    }
}
