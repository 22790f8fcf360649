//! Consensus use case
//!
//! The engine never decides a story's value. It hands the facilitator the
//! cards each member played in a round and records the one they pick.

use super::error::VotingError;
use super::shared::{require_estimate, require_story};
use crate::ports::estimation_store::EstimationStore;
use crate::ports::vote_audit::{AuditEvent, NoAuditLog, VoteAuditLog};
use poker_domain::voting::estimates_by_user;
use poker_domain::{ConsensusValue, Estimate, EstimateId, Iteration, Story, StoryId, UserId};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::info;

/// Use case for reading and recording a story's consensus
pub struct ConsensusUseCase<S: EstimationStore + 'static> {
    store: Arc<S>,
    audit: Arc<dyn VoteAuditLog>,
}

impl<S: EstimationStore + 'static> ConsensusUseCase<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self {
            store,
            audit: Arc::new(NoAuditLog),
        }
    }

    pub fn with_audit(mut self, audit: Arc<dyn VoteAuditLog>) -> Self {
        self.audit = audit;
        self
    }

    /// Cards played in `iteration`, grouped by member.
    ///
    /// A member who voted twice in the round has both cards listed in the
    /// order they were cast.
    pub async fn breakdown(
        &self,
        story: StoryId,
        iteration: Iteration,
    ) -> Result<BTreeMap<UserId, Vec<Estimate>>, VotingError> {
        require_story(self.store.as_ref(), story).await?;
        let votes = self.store.votes_for_story(story, iteration).await?;

        let mut cards: BTreeMap<EstimateId, Estimate> = BTreeMap::new();
        let mut grouped = BTreeMap::new();
        for (user, ids) in estimates_by_user(&votes) {
            let mut played = Vec::with_capacity(ids.len());
            for id in ids {
                if !cards.contains_key(&id) {
                    let estimate = require_estimate(self.store.as_ref(), id).await?;
                    cards.insert(id, estimate);
                }
                played.push(cards[&id].clone());
            }
            grouped.insert(user, played);
        }

        Ok(grouped)
    }

    /// Record `estimate` as the story's accepted value
    pub async fn set_consensus(
        &self,
        story: StoryId,
        estimate: EstimateId,
    ) -> Result<Story, VotingError> {
        let mut story = require_story(self.store.as_ref(), story).await?;
        let estimate = require_estimate(self.store.as_ref(), estimate).await?;
        if estimate.task_id != story.task_id {
            return Err(VotingError::EstimateNotInDeck {
                estimate: estimate.id,
                task: story.task_id,
            });
        }

        self.store
            .set_story_consensus(story.id, Some(estimate.id))
            .await?;
        story.consensus = Some(estimate.id);

        info!(
            "Consensus for story {} set to {} ({})",
            story.id, estimate.id, estimate.complexity_symbol
        );
        self.audit.log(AuditEvent::new(
            "consensus_set",
            serde_json::json!({
                "story": story.id,
                "estimate": estimate.id,
                "symbol": estimate.complexity_symbol,
                "iteration": story.iteration,
            }),
        ));

        Ok(story)
    }

    pub async fn clear_consensus(&self, story: StoryId) -> Result<Story, VotingError> {
        let mut story = require_story(self.store.as_ref(), story).await?;
        self.store.set_story_consensus(story.id, None).await?;
        let previous = story.consensus.take();

        info!("Consensus for story {} cleared", story.id);
        self.audit.log(AuditEvent::new(
            "consensus_cleared",
            serde_json::json!({
                "story": story.id,
                "previous": previous,
            }),
        ));

        Ok(story)
    }

    /// Interpret the story's consensus for reporting
    pub async fn consensus_value(&self, story: StoryId) -> Result<ConsensusValue, VotingError> {
        let story = require_story(self.store.as_ref(), story).await?;
        match story.consensus {
            None => Ok(ConsensusValue::Unresolved),
            Some(id) => {
                let estimate = require_estimate(self.store.as_ref(), id).await?;
                Ok(ConsensusValue::from_estimate(Some(&estimate)))
            }
        }
    }
}
