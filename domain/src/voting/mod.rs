//! Voting domain
//!
//! Pure rules of the planning poker rounds. Nothing here touches storage.
//!
//! # Round lifecycle
//!
//! ```text
//!   story created
//!        │
//!        ▼
//!  ┌────────────────┐  vote (not last)   ┌────────────────┐
//!  │ Voting(n)      │ ─────────────────▶ │ Voting(n)      │
//!  └────────────────┘                    └────────────────┘
//!        │ vote closing the round
//!        ▼
//!  ┌────────────────┐
//!  │ RoundComplete  │  round n stays queryable,
//!  │ (n)            │  story moves on to Voting(n + 1)
//!  └────────────────┘
//! ```

pub mod consensus;
pub mod distribution;
pub mod round;
pub mod transition;
pub mod vote;

pub use consensus::ConsensusValue;
pub use distribution::RoundDistribution;
pub use round::RoundStatus;
pub use transition::VoteTransition;
pub use vote::{UserEstimate, Vote, distinct_voters, estimates_by_user, has_vote_from, sort_by_user};
