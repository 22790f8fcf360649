//! Errors shared by the voting use cases

use crate::ports::estimation_store::StoreError;
use poker_domain::{DomainError, EstimateId, Iteration, StoryId, TaskId, UserId};
use thiserror::Error;

/// Errors that can occur while voting on or querying a story
#[derive(Error, Debug)]
pub enum VotingError {
    #[error("Task {0} not found")]
    TaskNotFound(TaskId),

    #[error("Story {0} not found")]
    StoryNotFound(StoryId),

    #[error("User {0} not found")]
    UserNotFound(UserId),

    #[error("Estimate {0} not found")]
    EstimateNotFound(EstimateId),

    #[error("Estimate {estimate} is not part of the deck of task {task}")]
    EstimateNotInDeck { estimate: EstimateId, task: TaskId },

    #[error("User {user} is not on the team of task {task}")]
    NotOnTeam { user: UserId, task: TaskId },

    #[error("Invalid state: {0}")]
    InvalidState(#[from] DomainError),

    #[error("Story {story} left round {expected} while the vote was being recorded")]
    ConcurrentAdvance { story: StoryId, expected: Iteration },

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

impl VotingError {
    /// Whether the error is caused by a reference to a missing row
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            VotingError::TaskNotFound(_)
                | VotingError::StoryNotFound(_)
                | VotingError::UserNotFound(_)
                | VotingError::EstimateNotFound(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_classification() {
        assert!(VotingError::StoryNotFound(StoryId::new(1)).is_not_found());
        assert!(VotingError::EstimateNotFound(EstimateId::new(1)).is_not_found());
        assert!(!VotingError::InvalidState(DomainError::EmptyTeam(TaskId::new(1))).is_not_found());
    }

    #[test]
    fn test_empty_team_message() {
        let err: VotingError = DomainError::EmptyTeam(TaskId::new(3)).into();
        assert_eq!(
            err.to_string(),
            "Invalid state: Task 3 has no team members; rounds cannot complete"
        );
    }
}
