//! Estimation entities: tasks, stories and users.
//!
//! These are plain data holders. The only rules they carry are the ones that
//! hold for every copy of the data: a story's task never changes, and its
//! iteration only moves forward through the voting engine.

use super::ids::{EstimateId, StoryId, TaskId, UserId};
use super::iteration::Iteration;
use crate::core::error::DomainError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A top-level estimation exercise with its own team and deck.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub name: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
    /// `None` while the task is a draft
    pub published_at: Option<DateTime<Utc>>,
}

impl Task {
    pub fn is_published(&self) -> bool {
        self.published_at.is_some()
    }
}

/// Fields for creating a task; the store assigns id and `created_at`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTask {
    pub name: String,
    pub description: String,
}

impl NewTask {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Result<Self, DomainError> {
        Ok(Self {
            name: validated_name(name.into())?,
            description: description.into(),
        })
    }
}

/// A work item being estimated within a task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Story {
    pub id: StoryId,
    pub task_id: TaskId,
    pub name: String,
    pub description: String,
    /// The estimate chosen as this story's accepted value
    pub consensus: Option<EstimateId>,
    /// Current voting round
    pub iteration: Iteration,
}

impl Story {
    pub fn has_consensus(&self) -> bool {
        self.consensus.is_some()
    }
}

/// Fields for creating a story; new stories start at iteration 0 without consensus.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewStory {
    pub task_id: TaskId,
    pub name: String,
    pub description: String,
}

impl NewStory {
    pub fn new(
        task_id: TaskId,
        name: impl Into<String>,
        description: impl Into<String>,
    ) -> Result<Self, DomainError> {
        Ok(Self {
            task_id,
            name: validated_name(name.into())?,
            description: description.into(),
        })
    }
}

/// A team member who casts votes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
}

/// Decode a consensus column that uses `-1` (or any negative) for "unresolved".
pub fn consensus_from_raw(raw: i64) -> Option<EstimateId> {
    u64::try_from(raw).ok().map(EstimateId::new)
}

/// Encode a consensus back into the `-1` sentinel form.
pub fn consensus_to_raw(consensus: Option<EstimateId>) -> i64 {
    consensus
        .and_then(|id| i64::try_from(id.get()).ok())
        .unwrap_or(-1)
}

pub(crate) fn validated_name(name: String) -> Result<String, DomainError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(DomainError::InvalidName(name));
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_consensus_sentinel_is_unresolved() {
        assert_eq!(consensus_from_raw(-1), None);
        assert_eq!(consensus_from_raw(12), Some(EstimateId::new(12)));
        assert_eq!(consensus_to_raw(None), -1);
        assert_eq!(consensus_to_raw(Some(EstimateId::new(3))), 3);
    }

    #[test]
    fn test_new_task_trims_and_rejects_blank_names() {
        let task = NewTask::new("  Planning Poker ", "Implement it").unwrap();
        assert_eq!(task.name, "Planning Poker");
        assert!(matches!(
            NewTask::new("   ", ""),
            Err(DomainError::InvalidName(_))
        ));
    }

    #[test]
    fn test_new_story_keeps_task() {
        let story = NewStory::new(TaskId::new(2), "Write templates", "").unwrap();
        assert_eq!(story.task_id, TaskId::new(2));
    }
}
