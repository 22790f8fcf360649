//! Runs one parsed command against the use cases and renders the result

use anyhow::{Context, Result};
use poker_application::{
    CatalogUseCase, ConsensusUseCase, EstimationStore, RoundQueryUseCase, StoryLocks,
    SubmitVoteInput, SubmitVoteUseCase, TaskReportUseCase, VoteAuditLog,
};
use poker_domain::{EstimateUnit, Iteration, OutputFormat, StoryId};
use poker_infrastructure::InMemoryEstimationStore;
use poker_presentation::{
    Command, ConsensusCommand, ConsoleFormatter, StoryCommand, TaskCommand, TeamCommand,
    UserCommand,
};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Everything a command needs, wired once in `main`
pub struct App {
    pub store: Arc<InMemoryEstimationStore>,
    pub locks: Arc<StoryLocks>,
    pub audit: Arc<dyn VoteAuditLog>,
    pub deck_unit: EstimateUnit,
    pub format: OutputFormat,
}

impl App {
    fn catalog(&self) -> CatalogUseCase<InMemoryEstimationStore> {
        CatalogUseCase::new(Arc::clone(&self.store)).with_deck_unit(self.deck_unit)
    }

    fn queries(&self) -> RoundQueryUseCase<InMemoryEstimationStore> {
        RoundQueryUseCase::new(Arc::clone(&self.store))
    }

    fn consensus(&self) -> ConsensusUseCase<InMemoryEstimationStore> {
        ConsensusUseCase::new(Arc::clone(&self.store)).with_audit(Arc::clone(&self.audit))
    }

    fn reports(&self) -> TaskReportUseCase<InMemoryEstimationStore> {
        TaskReportUseCase::new(Arc::clone(&self.store))
    }

    fn render<T: Serialize + ?Sized>(&self, value: &T, text: impl FnOnce(&T) -> String) -> String {
        match self.format {
            OutputFormat::Json => format!("{}\n", ConsoleFormatter::format_json(value)),
            OutputFormat::Text => text(value),
        }
    }

    fn done(&self, message: String, value: serde_json::Value) -> String {
        self.render(&value, |_| ConsoleFormatter::format_done(&message))
    }

    /// Execute `command` and return what should be printed
    pub async fn run(&self, command: &Command) -> Result<String> {
        match command {
            Command::Task(cmd) => self.task(cmd).await,
            Command::Story(cmd) => self.story(cmd).await,
            Command::User(cmd) => self.user(cmd).await,
            Command::Team(cmd) => {
                let team = match cmd {
                    TeamCommand::Add { task, user } => self.catalog().add_member(*task, *user).await?,
                    TeamCommand::Remove { task, user } => {
                        self.catalog().remove_member(*task, *user).await?
                    }
                };
                Ok(self.render(&team, |t| ConsoleFormatter::format_users(t)))
            }
            Command::Vote(args) => {
                let receipt = SubmitVoteUseCase::new(Arc::clone(&self.store))
                    .with_locks(Arc::clone(&self.locks))
                    .with_audit(Arc::clone(&self.audit))
                    .execute(SubmitVoteInput::new(args.story, args.user, args.estimate))
                    .await?;
                Ok(self.render(&receipt, ConsoleFormatter::format_receipt))
            }
            Command::Status { story, user } => {
                let view = self.queries().round_status(*story, *user).await?;
                Ok(self.render(&view, ConsoleFormatter::format_status))
            }
            Command::History { story } => {
                let history = self.queries().history(*story).await?;
                Ok(self.render(&history, ConsoleFormatter::format_history))
            }
            Command::Roster { task } => {
                let roster = self.reports().roster(*task).await?;
                Ok(self.render(&roster, ConsoleFormatter::format_roster))
            }
            Command::Summary { task } => {
                let summary = self.reports().summary(*task).await?;
                Ok(self.render(&summary, ConsoleFormatter::format_summary))
            }
            Command::Consensus(cmd) => self.consensus_command(cmd).await,
            Command::Seed => {
                let report = self.catalog().seed_demo().await?;
                Ok(self.render(&report, ConsoleFormatter::format_seed))
            }
            // Handled in main before the store is opened
            Command::ShowConfig => Ok(String::new()),
        }
    }

    async fn task(&self, cmd: &TaskCommand) -> Result<String> {
        let catalog = self.catalog();
        match cmd {
            TaskCommand::Create { name, description } => {
                let task = catalog.create_task(name, description).await?;
                Ok(self.render(&task, ConsoleFormatter::format_task))
            }
            TaskCommand::List => {
                let tasks = catalog.list_tasks().await?;
                Ok(self.render(&tasks, |t| ConsoleFormatter::format_tasks(t)))
            }
            TaskCommand::Show { task } => {
                let overview = catalog.task_overview(*task).await?;
                Ok(self.render(&overview, ConsoleFormatter::format_overview))
            }
            TaskCommand::Publish { task } => {
                let task = catalog.publish(*task).await?;
                Ok(self.render(&task, ConsoleFormatter::format_task))
            }
            TaskCommand::Unpublish { task } => {
                let task = catalog.unpublish(*task).await?;
                Ok(self.render(&task, ConsoleFormatter::format_task))
            }
            TaskCommand::Delete { task } => {
                catalog.delete_task(*task).await?;
                Ok(self.done(
                    format!("task {} deleted", task),
                    serde_json::json!({ "deleted": { "task": task } }),
                ))
            }
            TaskCommand::Rescale { task, unit, values } => {
                let values: BTreeMap<_, _> = values.iter().cloned().collect();
                let deck = catalog.rescale_deck(*task, unit, &values).await?;
                Ok(self.render(&deck, |d| ConsoleFormatter::format_deck(d)))
            }
        }
    }

    async fn story(&self, cmd: &StoryCommand) -> Result<String> {
        let catalog = self.catalog();
        match cmd {
            StoryCommand::Add {
                task,
                name,
                description,
            } => {
                let story = catalog.add_story(*task, name, description).await?;
                Ok(self.render(&story, |s| {
                    ConsoleFormatter::format_stories(std::slice::from_ref(s))
                }))
            }
            StoryCommand::List { task } => {
                let stories = catalog.list_stories(*task).await?;
                Ok(self.render(&stories, |s| ConsoleFormatter::format_stories(s)))
            }
            StoryCommand::Delete { story } => {
                catalog.delete_story(*story).await?;
                Ok(self.done(
                    format!("story {} deleted", story),
                    serde_json::json!({ "deleted": { "story": story } }),
                ))
            }
        }
    }

    async fn user(&self, cmd: &UserCommand) -> Result<String> {
        let catalog = self.catalog();
        let users = match cmd {
            UserCommand::Create { name } => vec![catalog.create_user(name).await?],
            UserCommand::List => catalog.list_users().await?,
            UserCommand::Rename { user, name } => vec![catalog.rename_user(*user, name).await?],
            UserCommand::Delete { user } => {
                catalog.delete_user(*user).await?;
                return Ok(self.done(
                    format!("user {} deleted", user),
                    serde_json::json!({ "deleted": { "user": user } }),
                ));
            }
        };
        Ok(self.render(&users, |u| ConsoleFormatter::format_users(u)))
    }

    async fn consensus_command(&self, cmd: &ConsensusCommand) -> Result<String> {
        let consensus = self.consensus();
        let story = match cmd {
            ConsensusCommand::Show { story, iteration } => {
                return self.consensus_breakdown(*story, *iteration).await;
            }
            ConsensusCommand::Set { story, estimate } => {
                consensus.set_consensus(*story, *estimate).await?
            }
            ConsensusCommand::Clear { story } => consensus.clear_consensus(*story).await?,
        };

        let value = consensus.consensus_value(story.id).await?;
        let output = serde_json::json!({ "story": story, "consensus": value });
        Ok(self.render(&output, |_| ConsoleFormatter::format_consensus(&story, &value)))
    }

    /// Cards of one round next to the current consensus. Without an explicit
    /// round this is the round that completed last.
    async fn consensus_breakdown(&self, story: StoryId, iteration: Option<u32>) -> Result<String> {
        let story = self
            .store
            .story(story)
            .await?
            .with_context(|| format!("Story {} not found", story))?;
        let iteration = iteration
            .map(Iteration::new)
            .unwrap_or_else(|| story.iteration.previous());

        let consensus = self.consensus();
        let cards = consensus.breakdown(story.id, iteration).await?;
        let value = consensus.consensus_value(story.id).await?;
        let team = self.store.team_members(story.task_id).await?;

        let output = serde_json::json!({
            "story": story,
            "iteration": iteration,
            "consensus": value,
            "cards": cards,
        });
        Ok(self.render(&output, |_| {
            let mut text = ConsoleFormatter::format_consensus(&story, &value);
            text.push_str(&ConsoleFormatter::format_breakdown(iteration, &cards, &team));
            text
        }))
    }
}
