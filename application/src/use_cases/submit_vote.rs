//! Submit Vote use case
//!
//! Records one user's card for a story and, when that vote fills the last
//! open seat of the round, moves the story to its next round.
//!
//! # Flow
//!
//! ```text
//! lock(story)
//!   ├─ load story, user, estimate          (NotFound → reject, nothing written)
//!   ├─ load team                           (empty → InvalidState, nothing written)
//!   ├─ count rows in the current round     (before inserting)
//!   ├─ plan transition                     (rows == team - 1 → advance)
//!   ├─ append vote stamped with the round read above
//!   └─ advance round (compare-and-set on the stored round)
//! unlock(story), then drop idle lock entries
//! ```

use super::error::VotingError;
use super::shared::{require_estimate, require_story, require_user};
use super::story_locks::StoryLocks;
use crate::ports::estimation_store::{EstimationStore, StoreError};
use crate::ports::vote_audit::{AuditEvent, NoAuditLog, VoteAuditLog};
use poker_domain::voting::has_vote_from;
use poker_domain::{DomainError, EstimateId, Iteration, StoryId, UserId, Vote, VoteTransition};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Input for the SubmitVote use case
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubmitVoteInput {
    pub story: StoryId,
    pub user: UserId,
    pub estimate: EstimateId,
}

impl SubmitVoteInput {
    pub fn new(story: StoryId, user: UserId, estimate: EstimateId) -> Self {
        Self {
            story,
            user,
            estimate,
        }
    }
}

/// What happened to a submitted vote
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VoteReceipt {
    /// The ledger row that was written
    pub vote: Vote,
    /// The round the story moved to, if this vote completed its round
    pub advanced_to: Option<Iteration>,
    /// The user had already voted in this round.
    ///
    /// Repeated votes are accepted and kept in the ledger; whether they
    /// should replace the earlier vote is left to the caller.
    pub duplicate: bool,
}

impl VoteReceipt {
    pub fn completed_round(&self) -> bool {
        self.advanced_to.is_some()
    }
}

/// Use case for submitting a vote
pub struct SubmitVoteUseCase<S: EstimationStore + 'static> {
    store: Arc<S>,
    locks: Arc<StoryLocks>,
    audit: Arc<dyn VoteAuditLog>,
}

impl<S: EstimationStore + 'static> SubmitVoteUseCase<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self {
            store,
            locks: Arc::new(StoryLocks::new()),
            audit: Arc::new(NoAuditLog),
        }
    }

    /// Share locks with other writers of the same store
    pub fn with_locks(mut self, locks: Arc<StoryLocks>) -> Self {
        self.locks = locks;
        self
    }

    pub fn with_audit(mut self, audit: Arc<dyn VoteAuditLog>) -> Self {
        self.audit = audit;
        self
    }

    /// Execute the use case
    pub async fn execute(&self, input: SubmitVoteInput) -> Result<VoteReceipt, VotingError> {
        let guard = self.locks.lock(input.story).await;
        let result = self.submit(input).await;
        drop(guard);
        self.locks.prune();
        result
    }

    /// Validate, record and maybe advance. Callers hold the story lock.
    async fn submit(&self, input: SubmitVoteInput) -> Result<VoteReceipt, VotingError> {
        let story = require_story(self.store.as_ref(), input.story).await?;
        let user = require_user(self.store.as_ref(), input.user).await?;
        let estimate = require_estimate(self.store.as_ref(), input.estimate).await?;

        if estimate.task_id != story.task_id {
            return Err(VotingError::EstimateNotInDeck {
                estimate: estimate.id,
                task: story.task_id,
            });
        }

        let team = self.store.team_members(story.task_id).await?;
        if team.is_empty() {
            return Err(DomainError::EmptyTeam(story.task_id).into());
        }
        if !team.iter().any(|member| member.id == user.id) {
            return Err(VotingError::NotOnTeam {
                user: user.id,
                task: story.task_id,
            });
        }

        let round = story.iteration;
        let prior = self.store.votes_for_story(story.id, round).await?;
        let duplicate = has_vote_from(&prior, user.id);
        let transition = VoteTransition::plan(story.task_id, prior.len(), team.len())?;

        debug!(
            "Story {} round {}: {} of {} votes before this one",
            story.id,
            round,
            prior.len(),
            team.len()
        );

        let vote = Vote::new(story.id, user.id, estimate.id, round);
        self.store.insert_vote(vote).await?;

        info!(
            "{} voted {} on story {} (round {})",
            user.name, estimate.complexity_symbol, story.id, round
        );
        self.audit.log(AuditEvent::new(
            "vote_recorded",
            serde_json::json!({
                "story_id": story.id,
                "user_id": user.id,
                "estimate_id": estimate.id,
                "iteration": round,
            }),
        ));

        if duplicate {
            warn!(
                "{} voted more than once on story {} in round {}",
                user.name, story.id, round
            );
            self.audit.log(AuditEvent::new(
                "duplicate_vote",
                serde_json::json!({
                    "story_id": story.id,
                    "user_id": user.id,
                    "iteration": round,
                }),
            ));
        }

        let advanced_to = if transition.advances() {
            let next = self
                .store
                .advance_story_iteration(story.id, round)
                .await
                .map_err(|e| match e {
                    StoreError::Conflict(_) => VotingError::ConcurrentAdvance {
                        story: story.id,
                        expected: round,
                    },
                    other => VotingError::Store(other),
                })?;

            info!("Story {} completed round {}, now in round {}", story.id, round, next);
            self.audit.log(AuditEvent::new(
                "iteration_advanced",
                serde_json::json!({
                    "story_id": story.id,
                    "from": round,
                    "to": next,
                }),
            ));
            Some(next)
        } else {
            None
        };

        Ok(VoteReceipt {
            vote,
            advanced_to,
            duplicate,
        })
    }
}
