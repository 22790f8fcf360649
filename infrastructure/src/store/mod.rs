//! Estimation store adapters
//!
//! [`InMemoryEstimationStore`] serves both store ports; [`JsonSnapshot`]
//! persists its contents between runs.

mod memory;
mod snapshot;
mod state;

pub use memory::InMemoryEstimationStore;
pub use snapshot::{JsonSnapshot, SnapshotLock};
pub use state::{IdCounters, Membership, STATE_VERSION, StoreState, StoryRow};
