//! Voting round counter

use serde::{Deserialize, Serialize};

/// A story's voting round number.
///
/// Starts at 0 for a new story and only ever moves forward.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Iteration(u32);

impl Iteration {
    /// The first round of every story
    pub const FIRST: Iteration = Iteration(0);

    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    pub const fn get(self) -> u32 {
        self.0
    }

    /// The round that follows this one
    pub fn next(self) -> Self {
        Self(self.0.saturating_add(1))
    }

    /// The round before this one, or this round itself when it is the first.
    ///
    /// Round 0 has no predecessor; callers asking for the previous round of a
    /// fresh story get round 0 back.
    pub fn previous(self) -> Self {
        Self(self.0.saturating_sub(1))
    }

    pub fn is_first(self) -> bool {
        self.0 == 0
    }
}

impl From<u32> for Iteration {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

impl std::fmt::Display for Iteration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
