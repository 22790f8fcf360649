//! Logging infrastructure: structured vote audit trail.
//!
//! Provides [`JsonlVoteAuditLog`], a JSONL file writer that implements
//! the [`VoteAuditLog`](poker_application::VoteAuditLog) port.

mod jsonl_audit;

pub use jsonl_audit::JsonlVoteAuditLog;
