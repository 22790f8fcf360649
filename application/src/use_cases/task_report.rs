//! Task reports: consensus summary and vote roster.

use super::error::VotingError;
use super::shared::{require_estimate, require_task};
use crate::ports::estimation_store::EstimationStore;
use poker_domain::{ConsensusValue, Estimate, EstimateId, Iteration, Story, Task, TaskId, User};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;

/// One story's line in a task summary
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StorySummary {
    pub story: Story,
    pub consensus: ConsensusValue,
    /// Value added to the total; 0 when unresolved or non-numeric
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaskSummary {
    pub task: Task,
    pub stories: Vec<StorySummary>,
    pub total: f64,
    /// Stories without a consensus yet
    pub unresolved: usize,
}

/// A card played by a member, with the round it was played in
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayedCard {
    pub iteration: Iteration,
    pub estimate: Estimate,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MemberVotes {
    pub user: User,
    /// Every card the member played on the story, oldest round first
    pub cards: Vec<PlayedCard>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoryRoster {
    pub story: Story,
    /// One entry per current team member, by user id
    pub members: Vec<MemberVotes>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaskRoster {
    pub task: Task,
    pub team: Vec<User>,
    pub stories: Vec<StoryRoster>,
}

/// Use case for task-wide reports
pub struct TaskReportUseCase<S: EstimationStore + 'static> {
    store: Arc<S>,
}

impl<S: EstimationStore + 'static> TaskReportUseCase<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Consensus of every story of the task and their sum
    pub async fn summary(&self, task: TaskId) -> Result<TaskSummary, VotingError> {
        let task = require_task(self.store.as_ref(), task).await?;
        let stories = self.store.stories_for_task(task.id).await?;

        let mut lines = Vec::with_capacity(stories.len());
        for story in stories {
            let consensus = match story.consensus {
                None => ConsensusValue::Unresolved,
                Some(id) => {
                    let estimate = require_estimate(self.store.as_ref(), id).await?;
                    ConsensusValue::from_estimate(Some(&estimate))
                }
            };
            let value = consensus.summary_value();
            lines.push(StorySummary {
                story,
                consensus,
                value,
            });
        }

        let total = lines.iter().map(|l| l.value).sum();
        let unresolved = lines.iter().filter(|l| !l.consensus.is_resolved()).count();

        Ok(TaskSummary {
            task,
            stories: lines,
            total,
            unresolved,
        })
    }

    /// Every team member's votes on every story of the task.
    ///
    /// Votes by users who have since left the team are not listed.
    pub async fn roster(&self, task: TaskId) -> Result<TaskRoster, VotingError> {
        let task = require_task(self.store.as_ref(), task).await?;
        let team = self.store.team_members(task.id).await?;
        let stories = self.store.stories_for_task(task.id).await?;
        let deck: HashMap<EstimateId, Estimate> = self
            .store
            .estimates_for_task(task.id)
            .await?
            .into_iter()
            .map(|e| (e.id, e))
            .collect();

        let mut rosters = Vec::with_capacity(stories.len());
        for story in stories {
            let votes = self.store.votes_for_story_all(story.id).await?;

            let mut members = Vec::with_capacity(team.len());
            for user in &team {
                let mut cards = Vec::new();
                for vote in votes.iter().filter(|v| v.user_id == user.id) {
                    let estimate = match deck.get(&vote.estimate_id) {
                        Some(e) => e.clone(),
                        None => require_estimate(self.store.as_ref(), vote.estimate_id).await?,
                    };
                    cards.push(PlayedCard {
                        iteration: vote.iteration,
                        estimate,
                    });
                }
                members.push(MemberVotes {
                    user: user.clone(),
                    cards,
                });
            }

            rosters.push(StoryRoster { story, members });
        }

        Ok(TaskRoster {
            task,
            team,
            stories: rosters,
        })
    }
}
