//! In-memory fake of the store ports for use case tests.
//!
//! Every read yields to the scheduler once so that concurrent submissions
//! really interleave between their read and write steps.

use crate::ports::catalog_store::CatalogStore;
use crate::ports::estimation_store::{EstimationStore, StoreError};
use async_trait::async_trait;
use chrono::Utc;
use poker_domain::{
    CardTemplate, Deck, Estimate, EstimateId, EstimateUnit, Iteration, NewStory, NewTask, Story,
    StoryId, Task, TaskId, User, UserId, Vote,
};
use std::collections::BTreeMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

pub(crate) const TASK: TaskId = TaskId::new(1);
pub(crate) const STORY: StoryId = StoryId::new(1);

#[derive(Default)]
struct State {
    tasks: BTreeMap<TaskId, Task>,
    stories: BTreeMap<StoryId, Story>,
    users: BTreeMap<UserId, User>,
    estimates: BTreeMap<EstimateId, Estimate>,
    team: Vec<(TaskId, UserId)>,
    votes: Vec<Vote>,
}

#[derive(Default)]
pub(crate) struct FakeStore {
    state: Mutex<State>,
    /// Make the next advance fail as if another writer got there first
    pub(crate) conflict_on_advance: AtomicBool,
}

impl FakeStore {
    /// Task 1 with story 1, users 1..=n named after `team` (all members)
    /// and the default deck as estimates 1..=13.
    pub(crate) fn poker(team: &[&str]) -> Self {
        let store = FakeStore::default();
        store.add_task(TASK);
        store.add_story(STORY, TASK);
        for (i, name) in team.iter().enumerate() {
            let id = UserId::new(i as u64 + 1);
            store.add_user(id, name);
            store.add_member(TASK, id);
        }
        for (i, card) in Deck::default().cards.iter().enumerate() {
            store.add_estimate(
                EstimateId::new(i as u64 + 1),
                TASK,
                card.complexity_symbol,
                card.unit_value,
            );
        }
        store
    }

    fn with_state<R>(&self, f: impl FnOnce(&mut State) -> R) -> R {
        let mut state = self.state.lock().unwrap();
        f(&mut state)
    }

    pub(crate) fn add_task(&self, id: TaskId) {
        self.with_state(|s| {
            s.tasks.insert(
                id,
                Task {
                    id,
                    name: format!("task-{id}"),
                    description: String::new(),
                    created_at: Utc::now(),
                    published_at: None,
                },
            );
        });
    }

    pub(crate) fn add_story(&self, id: StoryId, task: TaskId) {
        self.with_state(|s| {
            s.stories.insert(
                id,
                Story {
                    id,
                    task_id: task,
                    name: format!("story-{id}"),
                    description: String::new(),
                    consensus: None,
                    iteration: Iteration::FIRST,
                },
            );
        });
    }

    pub(crate) fn add_user(&self, id: UserId, name: &str) {
        self.with_state(|s| {
            s.users.insert(
                id,
                User {
                    id,
                    name: name.to_string(),
                },
            );
        });
    }

    pub(crate) fn add_member(&self, task: TaskId, user: UserId) {
        self.with_state(|s| s.team.push((task, user)));
    }

    pub(crate) fn remove_member(&self, task: TaskId, user: UserId) {
        self.with_state(|s| s.team.retain(|m| *m != (task, user)));
    }

    pub(crate) fn add_estimate(&self, id: EstimateId, task: TaskId, symbol: &str, value: f64) {
        self.with_state(|s| {
            s.estimates.insert(
                id,
                Estimate {
                    id,
                    task_id: task,
                    complexity_symbol: symbol.to_string(),
                    unit: Default::default(),
                    unit_value: value,
                },
            );
        });
    }

    pub(crate) fn vote_rows(&self) -> usize {
        self.with_state(|s| s.votes.len())
    }

    pub(crate) fn iteration_of(&self, story: StoryId) -> Iteration {
        self.with_state(|s| s.stories[&story].iteration)
    }
}

#[async_trait]
impl EstimationStore for FakeStore {
    async fn task(&self, id: TaskId) -> Result<Option<Task>, StoreError> {
        tokio::task::yield_now().await;
        Ok(self.with_state(|s| s.tasks.get(&id).cloned()))
    }

    async fn story(&self, id: StoryId) -> Result<Option<Story>, StoreError> {
        tokio::task::yield_now().await;
        Ok(self.with_state(|s| s.stories.get(&id).cloned()))
    }

    async fn stories_for_task(&self, task: TaskId) -> Result<Vec<Story>, StoreError> {
        Ok(self.with_state(|s| {
            s.stories
                .values()
                .filter(|st| st.task_id == task)
                .cloned()
                .collect()
        }))
    }

    async fn team_members(&self, task: TaskId) -> Result<Vec<User>, StoreError> {
        tokio::task::yield_now().await;
        Ok(self.with_state(|s| {
            let mut members: Vec<User> = s
                .team
                .iter()
                .filter(|(t, _)| *t == task)
                .filter_map(|(_, u)| s.users.get(u).cloned())
                .collect();
            members.sort_by_key(|u| u.id);
            members
        }))
    }

    async fn user_by_id(&self, id: UserId) -> Result<Option<User>, StoreError> {
        Ok(self.with_state(|s| s.users.get(&id).cloned()))
    }

    async fn estimate_by_id(&self, id: EstimateId) -> Result<Option<Estimate>, StoreError> {
        Ok(self.with_state(|s| s.estimates.get(&id).cloned()))
    }

    async fn estimates_for_task(&self, task: TaskId) -> Result<Vec<Estimate>, StoreError> {
        Ok(self.with_state(|s| {
            s.estimates
                .values()
                .filter(|e| e.task_id == task)
                .cloned()
                .collect()
        }))
    }

    async fn insert_vote(&self, vote: Vote) -> Result<(), StoreError> {
        self.with_state(|s| {
            if !s.stories.contains_key(&vote.story_id) {
                return Err(StoreError::missing("story", vote.story_id.get()));
            }
            s.votes.push(vote);
            Ok(())
        })
    }

    async fn votes_for_story(
        &self,
        story: StoryId,
        iteration: Iteration,
    ) -> Result<Vec<Vote>, StoreError> {
        tokio::task::yield_now().await;
        Ok(self.with_state(|s| {
            let mut votes: Vec<Vote> = s
                .votes
                .iter()
                .filter(|v| v.story_id == story && v.iteration == iteration)
                .copied()
                .collect();
            poker_domain::voting::sort_by_user(&mut votes);
            votes
        }))
    }

    async fn votes_for_story_all(&self, story: StoryId) -> Result<Vec<Vote>, StoreError> {
        Ok(self.with_state(|s| {
            let mut votes: Vec<Vote> = s
                .votes
                .iter()
                .filter(|v| v.story_id == story)
                .copied()
                .collect();
            votes.sort_by_key(|v| (v.iteration, v.user_id));
            votes
        }))
    }

    async fn advance_story_iteration(
        &self,
        story: StoryId,
        expected: Iteration,
    ) -> Result<Iteration, StoreError> {
        if self.conflict_on_advance.swap(false, Ordering::SeqCst) {
            return Err(StoreError::Conflict("simulated".to_string()));
        }
        self.with_state(|s| {
            let st = s
                .stories
                .get_mut(&story)
                .ok_or_else(|| StoreError::missing("story", story.get()))?;
            if st.iteration != expected {
                return Err(StoreError::Conflict(format!(
                    "story {} is at round {}, expected {}",
                    story, st.iteration, expected
                )));
            }
            st.iteration = st.iteration.next();
            Ok(st.iteration)
        })
    }

    async fn set_story_consensus(
        &self,
        story: StoryId,
        consensus: Option<EstimateId>,
    ) -> Result<(), StoreError> {
        self.with_state(|s| {
            let st = s
                .stories
                .get_mut(&story)
                .ok_or_else(|| StoreError::missing("story", story.get()))?;
            st.consensus = consensus;
            Ok(())
        })
    }
}

fn next_key<K: Copy + Ord, V>(map: &BTreeMap<K, V>, id: impl Fn(K) -> u64) -> u64 {
    map.keys().next_back().map_or(1, |k| id(*k) + 1)
}

#[async_trait]
impl CatalogStore for FakeStore {
    async fn insert_task(&self, task: NewTask) -> Result<Task, StoreError> {
        Ok(self.with_state(|s| {
            let id = TaskId::new(next_key(&s.tasks, TaskId::get));
            let task = Task {
                id,
                name: task.name,
                description: task.description,
                created_at: Utc::now(),
                published_at: None,
            };
            s.tasks.insert(id, task.clone());
            task
        }))
    }

    async fn list_tasks(&self) -> Result<Vec<Task>, StoreError> {
        Ok(self.with_state(|s| s.tasks.values().cloned().collect()))
    }

    async fn update_task(&self, task: &Task) -> Result<(), StoreError> {
        self.with_state(|s| match s.tasks.get_mut(&task.id) {
            Some(stored) => {
                *stored = task.clone();
                Ok(())
            }
            None => Err(StoreError::missing("task", task.id.get())),
        })
    }

    async fn delete_task(&self, id: TaskId) -> Result<(), StoreError> {
        self.with_state(|s| {
            s.tasks
                .remove(&id)
                .ok_or_else(|| StoreError::missing("task", id.get()))?;
            let stories: Vec<StoryId> = s
                .stories
                .values()
                .filter(|st| st.task_id == id)
                .map(|st| st.id)
                .collect();
            s.stories.retain(|_, st| st.task_id != id);
            s.votes.retain(|v| !stories.contains(&v.story_id));
            s.estimates.retain(|_, e| e.task_id != id);
            s.team.retain(|(t, _)| *t != id);
            Ok(())
        })
    }

    async fn insert_story(&self, story: NewStory) -> Result<Story, StoreError> {
        self.with_state(|s| {
            if !s.tasks.contains_key(&story.task_id) {
                return Err(StoreError::missing("task", story.task_id.get()));
            }
            let id = StoryId::new(next_key(&s.stories, StoryId::get));
            let story = Story {
                id,
                task_id: story.task_id,
                name: story.name,
                description: story.description,
                consensus: None,
                iteration: Iteration::FIRST,
            };
            s.stories.insert(id, story.clone());
            Ok(story)
        })
    }

    async fn delete_story(&self, id: StoryId) -> Result<(), StoreError> {
        self.with_state(|s| {
            s.stories
                .remove(&id)
                .ok_or_else(|| StoreError::missing("story", id.get()))?;
            s.votes.retain(|v| v.story_id != id);
            Ok(())
        })
    }

    async fn insert_user(&self, name: &str) -> Result<User, StoreError> {
        Ok(self.with_state(|s| {
            let id = UserId::new(next_key(&s.users, UserId::get));
            let user = User {
                id,
                name: name.to_string(),
            };
            s.users.insert(id, user.clone());
            user
        }))
    }

    async fn list_users(&self) -> Result<Vec<User>, StoreError> {
        Ok(self.with_state(|s| s.users.values().cloned().collect()))
    }

    async fn rename_user(&self, id: UserId, name: &str) -> Result<(), StoreError> {
        self.with_state(|s| match s.users.get_mut(&id) {
            Some(user) => {
                user.name = name.to_string();
                Ok(())
            }
            None => Err(StoreError::missing("user", id.get())),
        })
    }

    async fn delete_user(&self, id: UserId) -> Result<(), StoreError> {
        self.with_state(|s| {
            s.users
                .remove(&id)
                .ok_or_else(|| StoreError::missing("user", id.get()))?;
            s.team.retain(|(_, u)| *u != id);
            s.votes.retain(|v| v.user_id != id);
            Ok(())
        })
    }

    async fn add_team_member(&self, task: TaskId, user: UserId) -> Result<(), StoreError> {
        self.with_state(|s| {
            if !s.team.contains(&(task, user)) {
                s.team.push((task, user));
            }
        });
        Ok(())
    }

    async fn remove_team_member(&self, task: TaskId, user: UserId) -> Result<(), StoreError> {
        self.remove_member(task, user);
        Ok(())
    }

    async fn insert_estimate(
        &self,
        task: TaskId,
        card: &CardTemplate,
        unit: EstimateUnit,
    ) -> Result<Estimate, StoreError> {
        Ok(self.with_state(|s| {
            let id = EstimateId::new(next_key(&s.estimates, EstimateId::get));
            let estimate = Estimate {
                id,
                task_id: task,
                complexity_symbol: card.complexity_symbol.to_string(),
                unit,
                unit_value: card.unit_value,
            };
            s.estimates.insert(id, estimate.clone());
            estimate
        }))
    }

    async fn update_estimate(&self, estimate: &Estimate) -> Result<(), StoreError> {
        self.with_state(|s| match s.estimates.get_mut(&estimate.id) {
            Some(stored) => {
                stored.unit = estimate.unit;
                stored.unit_value = estimate.unit_value;
                Ok(())
            }
            None => Err(StoreError::missing("estimate", estimate.id.get())),
        })
    }
}
