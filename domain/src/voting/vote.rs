//! Vote ledger rows
//!
//! A [`Vote`] is one row of the append-only ledger: who picked which card for
//! which story, tagged with the round it was cast in.

use crate::estimation::{Estimate, EstimateId, Iteration, StoryId, User, UserId};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// A single vote as stored in the ledger.
///
/// `iteration` is the story's round at the moment the vote was cast, not the
/// story's current round.
///
/// # Example
///
/// ```
/// use poker_domain::estimation::{EstimateId, Iteration, StoryId, UserId};
/// use poker_domain::voting::Vote;
///
/// let vote = Vote::new(StoryId::new(1), UserId::new(3), EstimateId::new(5), Iteration::FIRST);
/// assert_eq!(vote.iteration, Iteration::new(0));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Vote {
    pub story_id: StoryId,
    pub user_id: UserId,
    pub estimate_id: EstimateId,
    pub iteration: Iteration,
}

impl Vote {
    pub fn new(
        story_id: StoryId,
        user_id: UserId,
        estimate_id: EstimateId,
        iteration: Iteration,
    ) -> Self {
        Self {
            story_id,
            user_id,
            estimate_id,
            iteration,
        }
    }
}

/// A vote resolved to the user who cast it and the card they picked.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserEstimate {
    pub user: User,
    pub estimate: Estimate,
}

/// Order votes by user id ascending.
///
/// The sort is stable, so repeated votes by one user keep the order they
/// were cast in.
pub fn sort_by_user(votes: &mut [Vote]) {
    votes.sort_by_key(|v| v.user_id);
}

/// Number of different users among `votes`
pub fn distinct_voters(votes: &[Vote]) -> usize {
    votes.iter().map(|v| v.user_id).collect::<BTreeSet<_>>().len()
}

/// Whether `user` already has a vote among `votes`
pub fn has_vote_from(votes: &[Vote], user: UserId) -> bool {
    votes.iter().any(|v| v.user_id == user)
}

/// Group the cards picked per user, keyed by user id.
pub fn estimates_by_user(votes: &[Vote]) -> BTreeMap<UserId, Vec<EstimateId>> {
    let mut grouped: BTreeMap<UserId, Vec<EstimateId>> = BTreeMap::new();
    for vote in votes {
        grouped.entry(vote.user_id).or_default().push(vote.estimate_id);
    }
    grouped
}
