//! Round queries
//!
//! Read-side projections over the vote ledger and the stored round of a
//! story. Nothing here takes the story lock: each query is consistent on
//! its own, two consecutive queries may observe different vote counts.

use super::error::VotingError;
use super::shared::{require_story, resolve_votes};
use crate::ports::estimation_store::EstimationStore;
use poker_domain::voting::{distinct_voters, has_vote_from, sort_by_user};
use poker_domain::{
    Iteration, RoundDistribution, RoundStatus, Story, StoryId, UserEstimate, UserId,
};
use serde::Serialize;
use std::sync::Arc;
use tracing::debug;

/// Everything a voter's screen needs about a story's rounds
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoundStatusView {
    pub story: Story,
    pub status: RoundStatus,
    /// The user has not voted in the current round yet
    pub can_vote: bool,
    /// Votes of the current round, by user id
    pub current_votes: Vec<UserEstimate>,
    /// Votes of the round before, empty while the story is in round 0
    pub previous_votes: Vec<UserEstimate>,
}

/// One round of a story's history
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoundRecord {
    pub status: RoundStatus,
    pub votes: Vec<UserEstimate>,
    pub distribution: RoundDistribution,
}

/// A story with all of its rounds, oldest first
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoryHistory {
    pub story: Story,
    pub rounds: Vec<RoundRecord>,
}

/// Use case for reading rounds
pub struct RoundQueryUseCase<S: EstimationStore + 'static> {
    store: Arc<S>,
}

impl<S: EstimationStore + 'static> RoundQueryUseCase<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// The story's stored round
    pub async fn latest_iteration(&self, story: StoryId) -> Result<Iteration, VotingError> {
        self.store
            .story_iteration(story)
            .await?
            .ok_or(VotingError::StoryNotFound(story))
    }

    /// Votes of one round, by user id. Empty if nobody voted in that round.
    pub async fn votes_for_iteration(
        &self,
        story: StoryId,
        iteration: Iteration,
    ) -> Result<Vec<UserEstimate>, VotingError> {
        require_story(self.store.as_ref(), story).await?;
        self.resolved_round(story, iteration).await
    }

    pub async fn latest_votes(&self, story: StoryId) -> Result<Vec<UserEstimate>, VotingError> {
        let iteration = self.latest_iteration(story).await?;
        self.resolved_round(story, iteration).await
    }

    /// Votes of the round before the current one.
    ///
    /// A story still in round 0 has no previous round; the result is empty.
    pub async fn previous_votes(&self, story: StoryId) -> Result<Vec<UserEstimate>, VotingError> {
        let iteration = self.latest_iteration(story).await?;
        if iteration.is_first() {
            return Ok(Vec::new());
        }
        self.resolved_round(story, iteration.previous()).await
    }

    pub async fn has_voted(&self, story: StoryId, user: UserId) -> Result<bool, VotingError> {
        let iteration = self.latest_iteration(story).await?;
        let votes = self.store.votes_for_story(story, iteration).await?;
        Ok(has_vote_from(&votes, user))
    }

    /// Current and previous round as seen by `user`
    pub async fn round_status(
        &self,
        story: StoryId,
        user: UserId,
    ) -> Result<RoundStatusView, VotingError> {
        let story = require_story(self.store.as_ref(), story).await?;
        let team_size = self.store.team_size(story.task_id).await?;

        let current = self.store.votes_for_story(story.id, story.iteration).await?;
        let status = RoundStatus::derive(story.iteration, distinct_voters(&current), team_size);
        let can_vote = !has_vote_from(&current, user);
        let current_votes = resolve_votes(self.store.as_ref(), &current).await?;

        let previous_votes = if story.iteration.is_first() {
            Vec::new()
        } else {
            self.resolved_round(story.id, story.iteration.previous())
                .await?
        };

        debug!(
            "Round status for story {} / user {}: {}",
            story.id, user, status
        );

        Ok(RoundStatusView {
            story,
            status,
            can_vote,
            current_votes,
            previous_votes,
        })
    }

    /// Every round of the story from 0 to the current one
    pub async fn history(&self, story: StoryId) -> Result<StoryHistory, VotingError> {
        let story = require_story(self.store.as_ref(), story).await?;
        let team_size = self.store.team_size(story.task_id).await?;
        let all = self.store.votes_for_story_all(story.id).await?;

        let mut rounds = Vec::with_capacity(story.iteration.get() as usize + 1);
        for n in 0..=story.iteration.get() {
            let iteration = Iteration::new(n);
            let mut rows: Vec<_> = all
                .iter()
                .filter(|v| v.iteration == iteration)
                .copied()
                .collect();
            sort_by_user(&mut rows);

            // Rounds behind the story's counter were closed by the engine,
            // even if the team has grown since.
            let status = if iteration < story.iteration {
                RoundStatus::RoundComplete { iteration }
            } else {
                RoundStatus::derive(iteration, distinct_voters(&rows), team_size)
            };

            let votes = resolve_votes(self.store.as_ref(), &rows).await?;
            let distribution = RoundDistribution::from_votes(iteration, &votes);
            rounds.push(RoundRecord {
                status,
                votes,
                distribution,
            });
        }

        Ok(StoryHistory { story, rounds })
    }

    async fn resolved_round(
        &self,
        story: StoryId,
        iteration: Iteration,
    ) -> Result<Vec<UserEstimate>, VotingError> {
        let votes = self.store.votes_for_story(story, iteration).await?;
        resolve_votes(self.store.as_ref(), &votes).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::use_cases::submit_vote::{SubmitVoteInput, SubmitVoteUseCase};
    use crate::use_cases::test_support::{FakeStore, STORY};
    use poker_domain::EstimateId;

    const A: UserId = UserId::new(1);
    const B: UserId = UserId::new(2);
    const C: UserId = UserId::new(3);

    fn card(id: u64) -> EstimateId {
        EstimateId::new(id)
    }

    async fn cast(store: &Arc<FakeStore>, user: UserId, estimate: u64) {
        SubmitVoteUseCase::new(Arc::clone(store))
            .execute(SubmitVoteInput::new(STORY, user, card(estimate)))
            .await
            .unwrap();
    }

    fn names(votes: &[UserEstimate]) -> Vec<&str> {
        votes.iter().map(|v| v.user.name.as_str()).collect()
    }

    #[tokio::test]
    async fn test_votes_ordered_by_user_regardless_of_insertion() {
        let store = Arc::new(FakeStore::poker(&["A", "B", "C", "D"]));
        cast(&store, C, 7).await;
        cast(&store, A, 5).await;
        cast(&store, B, 6).await;

        let queries = RoundQueryUseCase::new(store);
        let latest = queries.latest_votes(STORY).await.unwrap();
        assert_eq!(names(&latest), vec!["A", "B", "C"]);
        assert_eq!(latest[0].estimate.complexity_symbol, "3");
    }

    #[tokio::test]
    async fn test_previous_votes_empty_in_first_round() {
        let store = Arc::new(FakeStore::poker(&["A", "B"]));
        cast(&store, A, 5).await;

        let queries = RoundQueryUseCase::new(store);
        assert!(queries.previous_votes(STORY).await.unwrap().is_empty());
        assert_eq!(queries.latest_votes(STORY).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_round_status_after_advance() {
        let store = Arc::new(FakeStore::poker(&["A", "B", "C"]));
        cast(&store, A, 5).await;
        cast(&store, B, 6).await;
        cast(&store, C, 7).await;

        let queries = RoundQueryUseCase::new(store);
        let view = queries.round_status(STORY, A).await.unwrap();

        assert_eq!(view.story.iteration, Iteration::new(1));
        assert!(view.can_vote);
        assert!(view.current_votes.is_empty());
        assert_eq!(names(&view.previous_votes), vec!["A", "B", "C"]);
        assert_eq!(
            view.status,
            RoundStatus::Voting {
                iteration: Iteration::new(1),
                voters: 0,
                team_size: 3
            }
        );
    }

    #[tokio::test]
    async fn test_has_voted_and_can_vote() {
        let store = Arc::new(FakeStore::poker(&["A", "B"]));
        cast(&store, B, 6).await;

        let queries = RoundQueryUseCase::new(store);
        assert!(queries.has_voted(STORY, B).await.unwrap());
        assert!(!queries.has_voted(STORY, A).await.unwrap());

        let view = queries.round_status(STORY, B).await.unwrap();
        assert!(!view.can_vote);
        assert_eq!(view.status.missing_votes(), 1);
    }

    #[tokio::test]
    async fn test_latest_votes_is_idempotent() {
        let store = Arc::new(FakeStore::poker(&["A", "B", "C"]));
        cast(&store, B, 6).await;
        cast(&store, A, 12).await;

        let queries = RoundQueryUseCase::new(store);
        let first = queries.latest_votes(STORY).await.unwrap();
        let second = queries.latest_votes(STORY).await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_history_lists_every_round() {
        let store = Arc::new(FakeStore::poker(&["A", "B"]));
        cast(&store, A, 5).await;
        cast(&store, B, 7).await;
        cast(&store, A, 6).await;

        let history = RoundQueryUseCase::new(store).history(STORY).await.unwrap();
        assert_eq!(history.story.iteration, Iteration::new(1));
        let history = history.rounds;
        assert_eq!(history.len(), 2);
        assert!(history[0].status.is_complete());
        assert_eq!(history[0].distribution.min, Some(3.0));
        assert_eq!(history[0].distribution.max, Some(8.0));
        assert!(history[1].status.is_voting());
        assert_eq!(names(&history[1].votes), vec!["A"]);
    }

    #[tokio::test]
    async fn test_unknown_story_is_not_found() {
        let queries = RoundQueryUseCase::new(Arc::new(FakeStore::poker(&["A"])));
        let err = queries.latest_votes(StoryId::new(77)).await.unwrap_err();
        assert!(matches!(err, VotingError::StoryNotFound(_)));
        let err = queries
            .votes_for_iteration(StoryId::new(77), Iteration::FIRST)
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_votes_for_unvoted_round_are_empty() {
        let queries = RoundQueryUseCase::new(Arc::new(FakeStore::poker(&["A"])));
        let votes = queries
            .votes_for_iteration(STORY, Iteration::new(5))
            .await
            .unwrap();
        assert!(votes.is_empty());
    }
}
