//! Presentation layer for planning-poker
//!
//! This crate contains the CLI definitions and the console output
//! formatter.

pub mod cli;
pub mod output;

// Re-export commonly used types
pub use cli::commands::{
    Cli, Command, ConsensusCommand, OutputFormat, StoryCommand, TaskCommand, TeamCommand,
    UserCommand, VoteArgs,
};
pub use output::console::ConsoleFormatter;
