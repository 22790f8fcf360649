//! Lookups shared by the voting use cases

use super::error::VotingError;
use crate::ports::estimation_store::EstimationStore;
use poker_domain::{Estimate, EstimateId, Story, StoryId, Task, TaskId, User, UserEstimate, UserId, Vote};
use std::collections::HashMap;

pub(crate) async fn require_story<S: EstimationStore + ?Sized>(
    store: &S,
    id: StoryId,
) -> Result<Story, VotingError> {
    store.story(id).await?.ok_or(VotingError::StoryNotFound(id))
}

pub(crate) async fn require_task<S: EstimationStore + ?Sized>(
    store: &S,
    id: TaskId,
) -> Result<Task, VotingError> {
    store.task(id).await?.ok_or(VotingError::TaskNotFound(id))
}

pub(crate) async fn require_user<S: EstimationStore + ?Sized>(
    store: &S,
    id: UserId,
) -> Result<User, VotingError> {
    store.user_by_id(id).await?.ok_or(VotingError::UserNotFound(id))
}

pub(crate) async fn require_estimate<S: EstimationStore + ?Sized>(
    store: &S,
    id: EstimateId,
) -> Result<Estimate, VotingError> {
    store
        .estimate_by_id(id)
        .await?
        .ok_or(VotingError::EstimateNotFound(id))
}

/// Resolve ledger rows into (user, card) pairs, keeping the row order.
///
/// A row that points at a missing user or card is an error; it would
/// otherwise silently shrink the round.
pub(crate) async fn resolve_votes<S: EstimationStore + ?Sized>(
    store: &S,
    votes: &[Vote],
) -> Result<Vec<UserEstimate>, VotingError> {
    let mut users: HashMap<UserId, User> = HashMap::new();
    let mut estimates: HashMap<EstimateId, Estimate> = HashMap::new();
    let mut resolved = Vec::with_capacity(votes.len());

    for vote in votes {
        if !users.contains_key(&vote.user_id) {
            let user = require_user(store, vote.user_id).await?;
            users.insert(vote.user_id, user);
        }
        if !estimates.contains_key(&vote.estimate_id) {
            let estimate = require_estimate(store, vote.estimate_id).await?;
            estimates.insert(vote.estimate_id, estimate);
        }

        resolved.push(UserEstimate {
            user: users[&vote.user_id].clone(),
            estimate: estimates[&vote.estimate_id].clone(),
        });
    }

    Ok(resolved)
}
