//! CLI command definitions

use clap::{Args, Parser, Subcommand, ValueEnum};
use poker_domain::{EstimateId, StoryId, TaskId, UserId};
use std::path::PathBuf;

/// Output format selected on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable tables
    Text,
    /// JSON output
    Json,
}

impl From<OutputFormat> for poker_domain::OutputFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Text => poker_domain::OutputFormat::Text,
            OutputFormat::Json => poker_domain::OutputFormat::Json,
        }
    }
}

/// CLI arguments for planning-poker
#[derive(Parser, Debug)]
#[command(name = "planning-poker")]
#[command(author, version, about = "Planning poker: estimate stories in voting rounds")]
#[command(long_about = r#"
Planning poker keeps tasks, their stories, a team of users and a deck of
estimate cards. Team members vote on a story; once every member has voted,
the story moves on to its next round. A facilitator records the consensus.

Configuration files are loaded from (in priority order):
1. --config <path>     Explicit config file
2. ./poker.toml        Project-level config
3. ~/.config/planning-poker/config.toml   Global config

Example:
  planning-poker seed
  planning-poker task show 1
  planning-poker vote 1 --user 2 --estimate 6
  planning-poker status 1 --user 2
  planning-poker consensus set 1 6
"#)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Output format (overrides [output] format)
    #[arg(short, long, value_enum, global = true)]
    pub output: Option<OutputFormat>,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Snapshot file to use instead of [store] path
    #[arg(long, value_name = "PATH", global = true)]
    pub state: Option<PathBuf>,

    /// Path to configuration file
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long, global = true)]
    pub no_config: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Manage tasks and their decks
    #[command(subcommand)]
    Task(TaskCommand),

    /// Manage the stories of a task
    #[command(subcommand)]
    Story(StoryCommand),

    /// Manage users
    #[command(subcommand)]
    User(UserCommand),

    /// Manage the team of a task
    #[command(subcommand)]
    Team(TeamCommand),

    /// Cast a vote on a story
    Vote(VoteArgs),

    /// Show the current and previous round of a story for a user
    Status {
        story: StoryId,
        #[arg(short, long)]
        user: UserId,
    },

    /// Show every round of a story
    History { story: StoryId },

    /// Show every member's votes on every story of a task
    Roster { task: TaskId },

    /// Inspect or record a story's consensus
    #[command(subcommand)]
    Consensus(ConsensusCommand),

    /// Sum the consensus values of a task
    Summary { task: TaskId },

    /// Fill an empty store with demo data
    Seed,

    /// Show configuration file locations and the merged configuration
    ShowConfig,
}

#[derive(Subcommand, Debug)]
pub enum TaskCommand {
    /// Create a task with the default deck
    Create {
        name: String,
        #[arg(short, long, default_value = "")]
        description: String,
    },
    /// List all tasks
    List,
    /// Show a task with its stories, team and deck
    Show { task: TaskId },
    Publish { task: TaskId },
    Unpublish { task: TaskId },
    /// Delete a task with its stories, votes and deck
    Delete { task: TaskId },
    /// Switch the deck to another unit, optionally with new card values
    Rescale {
        task: TaskId,
        /// "story points", "person days", "person months" or "person years"
        unit: String,
        /// New value for one card, as ESTIMATE=VALUE (repeatable)
        #[arg(long = "value", value_name = "ESTIMATE=VALUE", value_parser = parse_card_value)]
        values: Vec<(EstimateId, String)>,
    },
}

#[derive(Subcommand, Debug)]
pub enum StoryCommand {
    Add {
        task: TaskId,
        name: String,
        #[arg(short, long, default_value = "")]
        description: String,
    },
    List { task: TaskId },
    /// Delete a story with its votes
    Delete { story: StoryId },
}

#[derive(Subcommand, Debug)]
pub enum UserCommand {
    Create { name: String },
    List,
    Rename { user: UserId, name: String },
    /// Delete a user with their votes and memberships
    Delete { user: UserId },
}

#[derive(Subcommand, Debug)]
pub enum TeamCommand {
    Add { task: TaskId, user: UserId },
    Remove { task: TaskId, user: UserId },
}

#[derive(Args, Debug)]
pub struct VoteArgs {
    pub story: StoryId,
    #[arg(short, long)]
    pub user: UserId,
    /// Id of the card from the task's deck
    #[arg(short, long)]
    pub estimate: EstimateId,
}

#[derive(Subcommand, Debug)]
pub enum ConsensusCommand {
    /// Show the cards each member played in a round
    Show {
        story: StoryId,
        /// Round to show (defaults to the previous round)
        #[arg(long)]
        iteration: Option<u32>,
    },
    /// Record a card as the story's consensus
    Set { story: StoryId, estimate: EstimateId },
    /// Forget the story's consensus
    Clear { story: StoryId },
}

fn parse_card_value(s: &str) -> Result<(EstimateId, String), String> {
    let (id, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected ESTIMATE=VALUE, got '{}'", s))?;
    let id = id
        .parse::<EstimateId>()
        .map_err(|e| format!("invalid estimate id '{}': {}", id, e))?;
    Ok((id, value.to_string()))
}

impl Cli {
    /// Whether the command can change the store
    pub fn mutates(&self) -> bool {
        match &self.command {
            Command::Task(cmd) => !matches!(cmd, TaskCommand::List | TaskCommand::Show { .. }),
            Command::Story(cmd) => !matches!(cmd, StoryCommand::List { .. }),
            Command::User(cmd) => !matches!(cmd, UserCommand::List),
            Command::Consensus(cmd) => !matches!(cmd, ConsensusCommand::Show { .. }),
            Command::Team(_) | Command::Vote(_) | Command::Seed => true,
            Command::Status { .. }
            | Command::History { .. }
            | Command::Roster { .. }
            | Command::Summary { .. }
            | Command::ShowConfig => false,
        }
    }
}
