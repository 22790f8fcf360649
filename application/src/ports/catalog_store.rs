//! Catalog store port
//!
//! Create/update/delete operations for tasks, stories, users, team
//! membership and decks. Deletes cascade the way the estimation data needs:
//! a task takes its stories, deck and memberships with it, a story takes its
//! votes, a user takes its memberships and votes.

use super::estimation_store::{EstimationStore, StoreError};
use async_trait::async_trait;
use poker_domain::{
    CardTemplate, Estimate, EstimateUnit, NewStory, NewTask, Story, StoryId, Task, TaskId, User,
    UserId,
};

#[async_trait]
pub trait CatalogStore: EstimationStore {
    async fn insert_task(&self, task: NewTask) -> Result<Task, StoreError>;

    /// All tasks, ordered by id
    async fn list_tasks(&self) -> Result<Vec<Task>, StoreError>;

    /// Overwrite name, description and publication of an existing task
    async fn update_task(&self, task: &Task) -> Result<(), StoreError>;

    async fn delete_task(&self, id: TaskId) -> Result<(), StoreError>;

    async fn insert_story(&self, story: NewStory) -> Result<Story, StoreError>;

    async fn delete_story(&self, id: StoryId) -> Result<(), StoreError>;

    async fn insert_user(&self, name: &str) -> Result<User, StoreError>;

    /// All users, ordered by id
    async fn list_users(&self) -> Result<Vec<User>, StoreError>;

    async fn rename_user(&self, id: UserId, name: &str) -> Result<(), StoreError>;

    async fn delete_user(&self, id: UserId) -> Result<(), StoreError>;

    /// Add a user to a task's team. Adding an existing member is a no-op.
    async fn add_team_member(&self, task: TaskId, user: UserId) -> Result<(), StoreError>;

    async fn remove_team_member(&self, task: TaskId, user: UserId) -> Result<(), StoreError>;

    async fn insert_estimate(
        &self,
        task: TaskId,
        card: &CardTemplate,
        unit: EstimateUnit,
    ) -> Result<Estimate, StoreError>;

    /// Overwrite unit and value of an existing estimate; the symbol is kept
    async fn update_estimate(&self, estimate: &Estimate) -> Result<(), StoreError>;
}
