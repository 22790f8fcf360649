//! Application layer for planning-poker
//!
//! This crate contains the use cases and the port definitions they consume.
//! It depends only on the domain layer.

pub mod ports;
pub mod use_cases;

// Re-export commonly used types
pub use ports::{
    catalog_store::CatalogStore,
    estimation_store::{EstimationStore, StoreError},
    vote_audit::{AuditEvent, NoAuditLog, VoteAuditLog},
};
pub use use_cases::catalog::{CatalogError, CatalogUseCase, SeedReport, TaskOverview};
pub use use_cases::consensus::ConsensusUseCase;
pub use use_cases::error::VotingError;
pub use use_cases::round_queries::{
    RoundQueryUseCase, RoundRecord, RoundStatusView, StoryHistory,
};
pub use use_cases::story_locks::StoryLocks;
pub use use_cases::submit_vote::{SubmitVoteInput, SubmitVoteUseCase, VoteReceipt};
pub use use_cases::task_report::{
    MemberVotes, PlayedCard, StoryRoster, StorySummary, TaskReportUseCase, TaskRoster, TaskSummary,
};
