//! In-memory estimation store
//!
//! Implements both store ports over a [`StoreState`] behind a
//! `tokio::sync::RwLock`. Each method holds the lock for its whole body, so
//! every call is atomic on its own. The state can be exported for a
//! snapshot and loaded back.

use super::state::{Membership, StoreState, StoryRow};
use async_trait::async_trait;
use chrono::Utc;
use poker_application::{CatalogStore, EstimationStore, StoreError};
use poker_domain::estimation::consensus_to_raw;
use poker_domain::voting::sort_by_user;
use poker_domain::{
    CardTemplate, Estimate, EstimateId, EstimateUnit, Iteration, NewStory, NewTask, Story,
    StoryId, Task, TaskId, User, UserId, Vote,
};
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::RwLock;
use tracing::{debug, trace};

/// Estimation store kept in process memory
#[derive(Default)]
pub struct InMemoryEstimationStore {
    state: RwLock<StoreState>,
    dirty: AtomicBool,
}

impl InMemoryEstimationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from previously saved contents
    pub fn from_state(state: StoreState) -> Self {
        Self {
            state: RwLock::new(state),
            dirty: AtomicBool::new(false),
        }
    }

    /// Copy of the current contents, for saving
    pub async fn snapshot(&self) -> StoreState {
        self.state.read().await.clone()
    }

    /// Whether anything was written since the store was created or last
    /// marked clean
    pub fn is_dirty(&self) -> bool {
        self.dirty.load(Ordering::SeqCst)
    }

    pub fn mark_clean(&self) {
        self.dirty.store(false, Ordering::SeqCst);
    }

    fn touched(&self) {
        self.dirty.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl EstimationStore for InMemoryEstimationStore {
    async fn task(&self, id: TaskId) -> Result<Option<Task>, StoreError> {
        Ok(self.state.read().await.tasks.get(&id).cloned())
    }

    async fn story(&self, id: StoryId) -> Result<Option<Story>, StoreError> {
        Ok(self.state.read().await.stories.get(&id).map(Story::from))
    }

    async fn stories_for_task(&self, task: TaskId) -> Result<Vec<Story>, StoreError> {
        let state = self.state.read().await;
        Ok(state
            .stories
            .values()
            .filter(|row| row.task_id == task)
            .map(Story::from)
            .collect())
    }

    async fn team_members(&self, task: TaskId) -> Result<Vec<User>, StoreError> {
        let state = self.state.read().await;
        let mut members: Vec<User> = state
            .team
            .iter()
            .filter(|m| m.task_id == task)
            .filter_map(|m| state.users.get(&m.user_id).cloned())
            .collect();
        members.sort_by_key(|u| u.id);
        Ok(members)
    }

    async fn user_by_id(&self, id: UserId) -> Result<Option<User>, StoreError> {
        Ok(self.state.read().await.users.get(&id).cloned())
    }

    async fn estimate_by_id(&self, id: EstimateId) -> Result<Option<Estimate>, StoreError> {
        Ok(self.state.read().await.estimates.get(&id).cloned())
    }

    async fn estimates_for_task(&self, task: TaskId) -> Result<Vec<Estimate>, StoreError> {
        let state = self.state.read().await;
        Ok(state
            .estimates
            .values()
            .filter(|e| e.task_id == task)
            .cloned()
            .collect())
    }

    async fn insert_vote(&self, vote: Vote) -> Result<(), StoreError> {
        let mut state = self.state.write().await;
        if !state.stories.contains_key(&vote.story_id) {
            return Err(StoreError::missing("story", vote.story_id.get()));
        }
        if !state.users.contains_key(&vote.user_id) {
            return Err(StoreError::missing("user", vote.user_id.get()));
        }
        if !state.estimates.contains_key(&vote.estimate_id) {
            return Err(StoreError::missing("estimate", vote.estimate_id.get()));
        }
        state.votes.push(vote);
        self.touched();
        trace!(
            "Stored vote of user {} on story {} in round {}",
            vote.user_id, vote.story_id, vote.iteration
        );
        Ok(())
    }

    async fn votes_for_story(
        &self,
        story: StoryId,
        iteration: Iteration,
    ) -> Result<Vec<Vote>, StoreError> {
        let state = self.state.read().await;
        let mut votes: Vec<Vote> = state
            .votes
            .iter()
            .filter(|v| v.story_id == story && v.iteration == iteration)
            .copied()
            .collect();
        sort_by_user(&mut votes);
        Ok(votes)
    }

    async fn votes_for_story_all(&self, story: StoryId) -> Result<Vec<Vote>, StoreError> {
        let state = self.state.read().await;
        let mut votes: Vec<Vote> = state
            .votes
            .iter()
            .filter(|v| v.story_id == story)
            .copied()
            .collect();
        votes.sort_by_key(|v| (v.iteration, v.user_id));
        Ok(votes)
    }

    async fn advance_story_iteration(
        &self,
        story: StoryId,
        expected: Iteration,
    ) -> Result<Iteration, StoreError> {
        let mut state = self.state.write().await;
        let row = state
            .stories
            .get_mut(&story)
            .ok_or_else(|| StoreError::missing("story", story.get()))?;
        if row.iteration != expected {
            return Err(StoreError::Conflict(format!(
                "story {} is at round {}, expected {}",
                story, row.iteration, expected
            )));
        }
        row.iteration = row.iteration.next();
        let advanced = row.iteration;
        self.touched();
        Ok(advanced)
    }

    async fn set_story_consensus(
        &self,
        story: StoryId,
        consensus: Option<EstimateId>,
    ) -> Result<(), StoreError> {
        let mut state = self.state.write().await;
        if let Some(id) = consensus
            && !state.estimates.contains_key(&id)
        {
            return Err(StoreError::missing("estimate", id.get()));
        }
        let row = state
            .stories
            .get_mut(&story)
            .ok_or_else(|| StoreError::missing("story", story.get()))?;
        row.consensus = consensus_to_raw(consensus);
        self.touched();
        Ok(())
    }
}

#[async_trait]
impl CatalogStore for InMemoryEstimationStore {
    async fn insert_task(&self, task: NewTask) -> Result<Task, StoreError> {
        let mut state = self.state.write().await;
        state.last_ids.task += 1;
        let task = Task {
            id: TaskId::new(state.last_ids.task),
            name: task.name,
            description: task.description,
            created_at: Utc::now(),
            published_at: None,
        };
        state.tasks.insert(task.id, task.clone());
        self.touched();
        Ok(task)
    }

    async fn list_tasks(&self) -> Result<Vec<Task>, StoreError> {
        Ok(self.state.read().await.tasks.values().cloned().collect())
    }

    async fn update_task(&self, task: &Task) -> Result<(), StoreError> {
        let mut state = self.state.write().await;
        let stored = state
            .tasks
            .get_mut(&task.id)
            .ok_or_else(|| StoreError::missing("task", task.id.get()))?;
        stored.name = task.name.clone();
        stored.description = task.description.clone();
        stored.published_at = task.published_at;
        self.touched();
        Ok(())
    }

    async fn delete_task(&self, id: TaskId) -> Result<(), StoreError> {
        let mut state = self.state.write().await;
        if state.tasks.remove(&id).is_none() {
            return Err(StoreError::missing("task", id.get()));
        }

        let stories: Vec<StoryId> = state
            .stories
            .values()
            .filter(|row| row.task_id == id)
            .map(|row| row.id)
            .collect();
        state.stories.retain(|_, row| row.task_id != id);
        state.votes.retain(|v| !stories.contains(&v.story_id));
        state.estimates.retain(|_, e| e.task_id != id);
        state.team.retain(|m| m.task_id != id);
        self.touched();

        debug!("Task {} removed with {} stories", id, stories.len());
        Ok(())
    }

    async fn insert_story(&self, story: NewStory) -> Result<Story, StoreError> {
        let mut state = self.state.write().await;
        if !state.tasks.contains_key(&story.task_id) {
            return Err(StoreError::missing("task", story.task_id.get()));
        }
        state.last_ids.story += 1;
        let story = Story {
            id: StoryId::new(state.last_ids.story),
            task_id: story.task_id,
            name: story.name,
            description: story.description,
            consensus: None,
            iteration: Iteration::FIRST,
        };
        state.stories.insert(story.id, StoryRow::from(&story));
        self.touched();
        Ok(story)
    }

    async fn delete_story(&self, id: StoryId) -> Result<(), StoreError> {
        let mut state = self.state.write().await;
        if state.stories.remove(&id).is_none() {
            return Err(StoreError::missing("story", id.get()));
        }
        state.votes.retain(|v| v.story_id != id);
        self.touched();
        Ok(())
    }

    async fn insert_user(&self, name: &str) -> Result<User, StoreError> {
        let mut state = self.state.write().await;
        state.last_ids.user += 1;
        let user = User {
            id: UserId::new(state.last_ids.user),
            name: name.to_string(),
        };
        state.users.insert(user.id, user.clone());
        self.touched();
        Ok(user)
    }

    async fn list_users(&self) -> Result<Vec<User>, StoreError> {
        Ok(self.state.read().await.users.values().cloned().collect())
    }

    async fn rename_user(&self, id: UserId, name: &str) -> Result<(), StoreError> {
        let mut state = self.state.write().await;
        let user = state
            .users
            .get_mut(&id)
            .ok_or_else(|| StoreError::missing("user", id.get()))?;
        user.name = name.to_string();
        self.touched();
        Ok(())
    }

    async fn delete_user(&self, id: UserId) -> Result<(), StoreError> {
        let mut state = self.state.write().await;
        if state.users.remove(&id).is_none() {
            return Err(StoreError::missing("user", id.get()));
        }
        state.team.retain(|m| m.user_id != id);
        state.votes.retain(|v| v.user_id != id);
        self.touched();
        Ok(())
    }

    async fn add_team_member(&self, task: TaskId, user: UserId) -> Result<(), StoreError> {
        let mut state = self.state.write().await;
        if !state.tasks.contains_key(&task) {
            return Err(StoreError::missing("task", task.get()));
        }
        if !state.users.contains_key(&user) {
            return Err(StoreError::missing("user", user.get()));
        }
        if !state.is_member(task, user) {
            state.team.push(Membership {
                task_id: task,
                user_id: user,
            });
            self.touched();
        }
        Ok(())
    }

    async fn remove_team_member(&self, task: TaskId, user: UserId) -> Result<(), StoreError> {
        let mut state = self.state.write().await;
        let before = state.team.len();
        state
            .team
            .retain(|m| !(m.task_id == task && m.user_id == user));
        if state.team.len() != before {
            self.touched();
        }
        Ok(())
    }

    async fn insert_estimate(
        &self,
        task: TaskId,
        card: &CardTemplate,
        unit: EstimateUnit,
    ) -> Result<Estimate, StoreError> {
        let mut state = self.state.write().await;
        if !state.tasks.contains_key(&task) {
            return Err(StoreError::missing("task", task.get()));
        }
        state.last_ids.estimate += 1;
        let estimate = Estimate {
            id: EstimateId::new(state.last_ids.estimate),
            task_id: task,
            complexity_symbol: card.complexity_symbol.to_string(),
            unit,
            unit_value: card.unit_value,
        };
        state.estimates.insert(estimate.id, estimate.clone());
        self.touched();
        Ok(estimate)
    }

    async fn update_estimate(&self, estimate: &Estimate) -> Result<(), StoreError> {
        let mut state = self.state.write().await;
        let stored = state
            .estimates
            .get_mut(&estimate.id)
            .ok_or_else(|| StoreError::missing("estimate", estimate.id.get()))?;
        stored.unit = estimate.unit;
        stored.unit_value = estimate.unit_value;
        self.touched();
        Ok(())
    }
}
