//! Serializable contents of the estimation store
//!
//! Rows are kept close to a relational layout: every table is keyed by its
//! id, team membership is a join table, and the story's consensus column
//! uses `-1` for "no consensus".

use poker_application::StoreError;
use poker_domain::estimation::{consensus_from_raw, consensus_to_raw};
use poker_domain::{Estimate, EstimateId, Iteration, Story, StoryId, Task, TaskId, User, UserId, Vote};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Current snapshot layout version
pub const STATE_VERSION: u32 = 1;

/// A story row as stored
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoryRow {
    pub id: StoryId,
    pub task_id: TaskId,
    pub name: String,
    pub description: String,
    /// Estimate id, or `-1` while unresolved
    pub consensus: i64,
    pub iteration: Iteration,
}

impl From<&Story> for StoryRow {
    fn from(story: &Story) -> Self {
        Self {
            id: story.id,
            task_id: story.task_id,
            name: story.name.clone(),
            description: story.description.clone(),
            consensus: consensus_to_raw(story.consensus),
            iteration: story.iteration,
        }
    }
}

impl From<&StoryRow> for Story {
    fn from(row: &StoryRow) -> Self {
        Self {
            id: row.id,
            task_id: row.task_id,
            name: row.name.clone(),
            description: row.description.clone(),
            consensus: consensus_from_raw(row.consensus),
            iteration: row.iteration,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Membership {
    pub task_id: TaskId,
    pub user_id: UserId,
}

/// Last id handed out per table. Ids are never reused, even after deletes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdCounters {
    pub task: u64,
    pub story: u64,
    pub user: u64,
    pub estimate: u64,
}

/// Everything the store holds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreState {
    pub version: u32,
    pub last_ids: IdCounters,
    pub tasks: BTreeMap<TaskId, Task>,
    pub stories: BTreeMap<StoryId, StoryRow>,
    pub users: BTreeMap<UserId, User>,
    pub estimates: BTreeMap<EstimateId, Estimate>,
    pub team: Vec<Membership>,
    /// Append-only vote ledger, in insertion order
    pub votes: Vec<Vote>,
}

impl Default for StoreState {
    fn default() -> Self {
        Self {
            version: STATE_VERSION,
            last_ids: IdCounters::default(),
            tasks: BTreeMap::new(),
            stories: BTreeMap::new(),
            users: BTreeMap::new(),
            estimates: BTreeMap::new(),
            team: Vec::new(),
            votes: Vec::new(),
        }
    }
}

impl StoreState {
    /// Check that every reference points at an existing row and that the id
    /// counters are ahead of every stored id.
    pub fn check(&self) -> Result<(), StoreError> {
        if self.version != STATE_VERSION {
            return Err(StoreError::Corrupt(format!(
                "unsupported snapshot version {} (expected {})",
                self.version, STATE_VERSION
            )));
        }

        for story in self.stories.values() {
            if !self.tasks.contains_key(&story.task_id) {
                return Err(corrupt("story", story.id.get(), "task", story.task_id.get()));
            }
            if let Some(consensus) = consensus_from_raw(story.consensus)
                && !self.estimates.contains_key(&consensus)
            {
                return Err(corrupt("story", story.id.get(), "estimate", consensus.get()));
            }
        }
        for estimate in self.estimates.values() {
            if !self.tasks.contains_key(&estimate.task_id) {
                return Err(corrupt(
                    "estimate",
                    estimate.id.get(),
                    "task",
                    estimate.task_id.get(),
                ));
            }
        }
        for member in &self.team {
            if !self.tasks.contains_key(&member.task_id) || !self.users.contains_key(&member.user_id)
            {
                return Err(StoreError::Corrupt(format!(
                    "team row ({}, {}) points at a missing task or user",
                    member.task_id, member.user_id
                )));
            }
        }
        for vote in &self.votes {
            if !self.stories.contains_key(&vote.story_id)
                || !self.users.contains_key(&vote.user_id)
                || !self.estimates.contains_key(&vote.estimate_id)
            {
                return Err(StoreError::Corrupt(format!(
                    "vote on story {} by user {} points at a missing row",
                    vote.story_id, vote.user_id
                )));
            }
        }

        let behind = |last: u64, max: Option<u64>| max.is_some_and(|m| m > last);
        if behind(self.last_ids.task, self.tasks.keys().last().map(|k| k.get()))
            || behind(self.last_ids.story, self.stories.keys().last().map(|k| k.get()))
            || behind(self.last_ids.user, self.users.keys().last().map(|k| k.get()))
            || behind(
                self.last_ids.estimate,
                self.estimates.keys().last().map(|k| k.get()),
            )
        {
            return Err(StoreError::Corrupt(
                "id counters are behind the stored rows".to_string(),
            ));
        }

        Ok(())
    }

    pub fn is_member(&self, task: TaskId, user: UserId) -> bool {
        self.team.contains(&Membership {
            task_id: task,
            user_id: user,
        })
    }
}

fn corrupt(kind: &str, id: u64, target: &str, target_id: u64) -> StoreError {
    StoreError::Corrupt(format!("{kind} {id} points at missing {target} {target_id}"))
}
