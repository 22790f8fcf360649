//! Domain layer for planning-poker
//!
//! This crate contains the entities, value objects and voting rules.
//! It has no dependencies on infrastructure or presentation concerns.
//!
//! # Core Concepts
//!
//! ## Estimation
//!
//! A **task** owns a team of users, a deck of estimate cards and a set of
//! **stories**. Each story is estimated in numbered **iterations** (rounds).
//!
//! ## Voting
//!
//! - **Vote**: one ledger row, tagged with the round it was cast in
//! - **Round status**: derived from distinct voters versus team size
//! - **Transition**: the vote that fills the last open seat moves the story
//!   to the next round
//! - **Consensus**: picked by a facilitator, reported as a [`ConsensusValue`]

pub mod config;
pub mod core;
pub mod estimation;
pub mod voting;

// Re-export commonly used types
pub use config::{ConfigIssue, ConfigIssueCode, OutputFormat, Severity};
pub use core::error::DomainError;
pub use estimation::{
    CardTemplate, Deck, Estimate, EstimateId, EstimateUnit, Iteration, NewStory, NewTask, Story,
    StoryId, Task, TaskId, User, UserId,
};
pub use voting::{
    ConsensusValue, RoundDistribution, RoundStatus, UserEstimate, Vote, VoteTransition,
};
