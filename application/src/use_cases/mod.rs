//! Use cases
//!
//! Application-level operations that orchestrate domain logic.

pub mod catalog;
pub mod consensus;
pub mod error;
pub mod round_queries;
pub(crate) mod shared;
pub mod story_locks;
pub mod submit_vote;
pub mod task_report;

#[cfg(test)]
pub(crate) mod test_support;
