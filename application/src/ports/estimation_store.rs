//! Estimation store port
//!
//! Defines the data-access capabilities the voting engine consumes. The
//! store is the source of truth for a story's current round; the vote
//! ledger only carries historical round tags.

use async_trait::async_trait;
use poker_domain::{
    Estimate, EstimateId, Iteration, Story, StoryId, Task, TaskId, User, UserId, Vote,
};
use thiserror::Error;

/// Errors that can occur during store operations
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("{kind} {id} does not exist")]
    Missing { kind: &'static str, id: u64 },

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("I/O error: {0}")]
    Io(String),

    #[error("Corrupt store data: {0}")]
    Corrupt(String),
}

impl StoreError {
    pub fn missing(kind: &'static str, id: u64) -> Self {
        StoreError::Missing { kind, id }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, StoreError::Missing { .. })
    }
}

/// Read/append access used by the voting engine.
///
/// Implementations live in the infrastructure layer. Every method is
/// independently consistent; callers that need a multi-step transaction
/// serialize it themselves (see `StoryLocks`).
#[async_trait]
pub trait EstimationStore: Send + Sync {
    async fn task(&self, id: TaskId) -> Result<Option<Task>, StoreError>;

    async fn story(&self, id: StoryId) -> Result<Option<Story>, StoreError>;

    /// Stories of a task, ordered by id
    async fn stories_for_task(&self, task: TaskId) -> Result<Vec<Story>, StoreError>;

    /// Team of a task, ordered by user id
    async fn team_members(&self, task: TaskId) -> Result<Vec<User>, StoreError>;

    async fn user_by_id(&self, id: UserId) -> Result<Option<User>, StoreError>;

    async fn estimate_by_id(&self, id: EstimateId) -> Result<Option<Estimate>, StoreError>;

    /// Deck of a task, in insertion order
    async fn estimates_for_task(&self, task: TaskId) -> Result<Vec<Estimate>, StoreError>;

    /// Append a ledger row. Fails with `Missing` if a referenced row is gone.
    async fn insert_vote(&self, vote: Vote) -> Result<(), StoreError>;

    /// Votes of one round, ordered by user id ascending (insertion order on ties)
    async fn votes_for_story(
        &self,
        story: StoryId,
        iteration: Iteration,
    ) -> Result<Vec<Vote>, StoreError>;

    /// Every vote of a story, ordered by round then user id
    async fn votes_for_story_all(&self, story: StoryId) -> Result<Vec<Vote>, StoreError>;

    /// Move a story to the next round if it is still at `expected`.
    ///
    /// Returns the new round. Fails with `Conflict` when the stored round
    /// differs from `expected`, so a round can never be advanced twice.
    async fn advance_story_iteration(
        &self,
        story: StoryId,
        expected: Iteration,
    ) -> Result<Iteration, StoreError>;

    async fn set_story_consensus(
        &self,
        story: StoryId,
        consensus: Option<EstimateId>,
    ) -> Result<(), StoreError>;

    /// Number of users on a task's team
    async fn team_size(&self, task: TaskId) -> Result<usize, StoreError> {
        Ok(self.team_members(task).await?.len())
    }

    /// Stored round of a story, `None` if the story does not exist
    async fn story_iteration(&self, story: StoryId) -> Result<Option<Iteration>, StoreError> {
        Ok(self.story(story).await?.map(|s| s.iteration))
    }
}
