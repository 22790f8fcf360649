//! Port for the vote audit trail.
//!
//! Defines the [`VoteAuditLog`] trait for recording what happened to a
//! story's rounds (votes, advances, consensus changes) in a structured log.
//!
//! This is separate from `tracing`-based operation logs: tracing handles
//! human-readable diagnostics, while this port keeps a machine-readable
//! record of every state change of the voting engine.

use serde_json::Value;

/// A structured audit event.
pub struct AuditEvent {
    /// Event type identifier (e.g., "vote_recorded", "iteration_advanced").
    pub event_type: &'static str,
    /// JSON payload with event-specific data.
    pub payload: Value,
}

impl AuditEvent {
    pub fn new(event_type: &'static str, payload: Value) -> Self {
        Self {
            event_type,
            payload,
        }
    }
}

/// Port for logging audit events.
///
/// The `log` method is synchronous and non-fallible: a failing audit sink
/// must not fail a vote that was already written.
pub trait VoteAuditLog: Send + Sync {
    fn log(&self, event: AuditEvent);
}

/// No-op implementation for tests and when auditing is disabled.
pub struct NoAuditLog;

impl VoteAuditLog for NoAuditLog {
    fn log(&self, _event: AuditEvent) {}
}
