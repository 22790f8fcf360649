//! Catalog use case
//!
//! Everything around the voting engine that a facilitator manages by hand:
//! tasks and their decks, stories, users and team membership. Creating a
//! task deals it the default deck in the configured unit.

use crate::ports::catalog_store::CatalogStore;
use crate::ports::estimation_store::{EstimationStore, StoreError};
use chrono::Utc;
use poker_domain::{
    Deck, DomainError, Estimate, EstimateId, EstimateUnit, NewStory, NewTask, Story, StoryId,
    Task, TaskId, User, UserId,
};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Errors from catalog operations
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Task {0} not found")]
    TaskNotFound(TaskId),

    #[error("Story {0} not found")]
    StoryNotFound(StoryId),

    #[error("User {0} not found")]
    UserNotFound(UserId),

    #[error("Invalid input: {0}")]
    Invalid(#[from] DomainError),

    #[error("Store already holds {0} task(s); seeding needs an empty store")]
    NotEmpty(usize),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

/// A task with everything attached to it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaskOverview {
    pub task: Task,
    pub stories: Vec<Story>,
    pub team: Vec<User>,
    pub deck: Vec<Estimate>,
}

/// What [`CatalogUseCase::seed_demo`] created
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeedReport {
    pub users: Vec<User>,
    pub tasks: Vec<TaskOverview>,
}

const DEMO_USERS: [&str; 5] = ["Bengt", "Soheil", "Alexander", "Anders", "Daniel"];

struct DemoTask {
    name: &'static str,
    description: &'static str,
    stories: &'static [(&'static str, &'static str)],
    /// Indexes into `DEMO_USERS`
    team: &'static [usize],
}

const DEMO_TASKS: [DemoTask; 2] = [
    DemoTask {
        name: "Planning Poker",
        description: "Build a planning poker web application",
        stories: &[
            ("Database Operations", "Tables for tasks, stories, votes and users"),
            ("Write templates", "Pages for voting and for the results"),
            ("Set up the routes", "Map the pages to their handlers"),
        ],
        team: &[0, 1, 2],
    },
    DemoTask {
        name: "Write manual",
        description: "User manual for the application",
        stories: &[("Create LaTeX document", "Skeleton of the manual")],
        team: &[3, 4],
    },
];

/// Use case for managing tasks, stories, users and decks
pub struct CatalogUseCase<S: CatalogStore + 'static> {
    store: Arc<S>,
    deck_unit: EstimateUnit,
}

impl<S: CatalogStore + 'static> CatalogUseCase<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self {
            store,
            deck_unit: EstimateUnit::default(),
        }
    }

    /// Unit new decks are created in
    pub fn with_deck_unit(mut self, unit: EstimateUnit) -> Self {
        self.deck_unit = unit;
        self
    }

    pub fn deck_unit(&self) -> EstimateUnit {
        self.deck_unit
    }

    // ==================== Tasks ====================

    /// Create a task and deal it the default deck
    pub async fn create_task(&self, name: &str, description: &str) -> Result<Task, CatalogError> {
        let task = self.store.insert_task(NewTask::new(name, description)?).await?;

        let deck = Deck::fibonacci(self.deck_unit);
        for card in &deck.cards {
            self.store.insert_estimate(task.id, card, deck.unit).await?;
        }

        info!(
            "Created task {} '{}' with {} cards in {}",
            task.id,
            task.name,
            deck.cards.len(),
            deck.unit
        );
        Ok(task)
    }

    pub async fn list_tasks(&self) -> Result<Vec<Task>, CatalogError> {
        Ok(self.store.list_tasks().await?)
    }

    pub async fn task_overview(&self, task: TaskId) -> Result<TaskOverview, CatalogError> {
        let task = self.require_task(task).await?;
        Ok(TaskOverview {
            stories: self.store.stories_for_task(task.id).await?,
            team: self.store.team_members(task.id).await?,
            deck: self.store.estimates_for_task(task.id).await?,
            task,
        })
    }

    /// Mark the task as published. Publishing twice keeps the first date.
    pub async fn publish(&self, task: TaskId) -> Result<Task, CatalogError> {
        let mut task = self.require_task(task).await?;
        if task.published_at.is_none() {
            task.published_at = Some(Utc::now());
            self.store.update_task(&task).await?;
            info!("Published task {}", task.id);
        }
        Ok(task)
    }

    pub async fn unpublish(&self, task: TaskId) -> Result<Task, CatalogError> {
        let mut task = self.require_task(task).await?;
        if task.published_at.take().is_some() {
            self.store.update_task(&task).await?;
            info!("Unpublished task {}", task.id);
        }
        Ok(task)
    }

    /// Delete a task with its stories, votes, deck and team
    pub async fn delete_task(&self, task: TaskId) -> Result<(), CatalogError> {
        self.require_task(task).await?;
        self.store.delete_task(task).await?;
        info!("Deleted task {}", task);
        Ok(())
    }

    /// Switch the deck of a task to another unit.
    ///
    /// `values` optionally gives cards a new numeric value, as typed by the
    /// facilitator. Values that do not parse as a number are skipped and the
    /// card keeps its old value; so are ids outside the task's deck.
    pub async fn rescale_deck(
        &self,
        task: TaskId,
        unit: &str,
        values: &BTreeMap<EstimateId, String>,
    ) -> Result<Vec<Estimate>, CatalogError> {
        let unit: EstimateUnit = unit.parse()?;
        let task = self.require_task(task).await?;
        let mut deck = self.store.estimates_for_task(task.id).await?;

        for id in values.keys() {
            if !deck.iter().any(|e| e.id == *id) {
                warn!("Estimate {} is not in the deck of task {}, skipped", id, task.id);
            }
        }

        for estimate in &mut deck {
            estimate.unit = unit;
            if let Some(raw) = values.get(&estimate.id) {
                match raw.trim().parse::<f64>() {
                    Ok(value) if value.is_finite() => estimate.unit_value = value,
                    _ => debug!(
                        "Skipping value '{}' for estimate {}: not a number",
                        raw, estimate.id
                    ),
                }
            }
            self.store.update_estimate(estimate).await?;
        }

        info!("Rescaled deck of task {} to {}", task.id, unit);
        Ok(deck)
    }

    // ==================== Stories ====================

    pub async fn add_story(
        &self,
        task: TaskId,
        name: &str,
        description: &str,
    ) -> Result<Story, CatalogError> {
        let task = self.require_task(task).await?;
        let story = self
            .store
            .insert_story(NewStory::new(task.id, name, description)?)
            .await?;
        debug!("Added story {} to task {}", story.id, task.id);
        Ok(story)
    }

    pub async fn list_stories(&self, task: TaskId) -> Result<Vec<Story>, CatalogError> {
        let task = self.require_task(task).await?;
        Ok(self.store.stories_for_task(task.id).await?)
    }

    /// Delete a story with all of its votes
    pub async fn delete_story(&self, story: StoryId) -> Result<(), CatalogError> {
        if self.store.story(story).await?.is_none() {
            return Err(CatalogError::StoryNotFound(story));
        }
        self.store.delete_story(story).await?;
        info!("Deleted story {}", story);
        Ok(())
    }

    // ==================== Users & teams ====================

    pub async fn create_user(&self, name: &str) -> Result<User, CatalogError> {
        let name = checked_user_name(name)?;
        let user = self.store.insert_user(&name).await?;
        debug!("Created user {} '{}'", user.id, user.name);
        Ok(user)
    }

    pub async fn list_users(&self) -> Result<Vec<User>, CatalogError> {
        Ok(self.store.list_users().await?)
    }

    pub async fn rename_user(&self, user: UserId, name: &str) -> Result<User, CatalogError> {
        let mut user = self.require_user(user).await?;
        let name = checked_user_name(name)?;
        self.store.rename_user(user.id, &name).await?;
        user.name = name;
        Ok(user)
    }

    /// Delete a user with their memberships and votes
    pub async fn delete_user(&self, user: UserId) -> Result<(), CatalogError> {
        self.require_user(user).await?;
        self.store.delete_user(user).await?;
        info!("Deleted user {}", user);
        Ok(())
    }

    /// Add a user to a task's team and return the new team
    pub async fn add_member(&self, task: TaskId, user: UserId) -> Result<Vec<User>, CatalogError> {
        let task = self.require_task(task).await?;
        let user = self.require_user(user).await?;
        self.store.add_team_member(task.id, user.id).await?;
        Ok(self.store.team_members(task.id).await?)
    }

    pub async fn remove_member(
        &self,
        task: TaskId,
        user: UserId,
    ) -> Result<Vec<User>, CatalogError> {
        let task = self.require_task(task).await?;
        let user = self.require_user(user).await?;
        self.store.remove_team_member(task.id, user.id).await?;
        Ok(self.store.team_members(task.id).await?)
    }

    // ==================== Demo data ====================

    /// Fill an empty store with two demo tasks and five users
    pub async fn seed_demo(&self) -> Result<SeedReport, CatalogError> {
        let existing = self.store.list_tasks().await?;
        if !existing.is_empty() {
            return Err(CatalogError::NotEmpty(existing.len()));
        }

        let mut users = Vec::with_capacity(DEMO_USERS.len());
        for name in DEMO_USERS {
            users.push(self.create_user(name).await?);
        }

        let mut tasks = Vec::with_capacity(DEMO_TASKS.len());
        for demo in &DEMO_TASKS {
            let task = self.create_task(demo.name, demo.description).await?;
            for (name, description) in demo.stories {
                self.add_story(task.id, name, description).await?;
            }
            for &member in demo.team {
                self.store.add_team_member(task.id, users[member].id).await?;
            }
            tasks.push(self.task_overview(task.id).await?);
        }

        info!(
            "Seeded {} users and {} tasks",
            users.len(),
            tasks.len()
        );
        Ok(SeedReport { users, tasks })
    }

    async fn require_task(&self, task: TaskId) -> Result<Task, CatalogError> {
        self.store
            .task(task)
            .await?
            .ok_or(CatalogError::TaskNotFound(task))
    }

    async fn require_user(&self, user: UserId) -> Result<User, CatalogError> {
        self.store
            .user_by_id(user)
            .await?
            .ok_or(CatalogError::UserNotFound(user))
    }
}

fn checked_user_name(name: &str) -> Result<String, DomainError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(DomainError::InvalidName(name.to_string()));
    }
    Ok(trimmed.to_string())
}
