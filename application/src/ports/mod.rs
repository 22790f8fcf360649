//! Ports (interfaces) for external dependencies
//!
//! Adapters in the infrastructure layer implement these traits.

pub mod catalog_store;
pub mod estimation_store;
pub mod vote_audit;
