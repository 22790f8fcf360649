//! Identifiers for estimation entities.
//!
//! Every entity is addressed by a stable numeric id assigned by the store.
//! Groupings (votes per user, stories per task) are keyed by these ids and
//! never by entity values, so re-fetched entities always land on the same key.

use serde::{Deserialize, Serialize};

macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(u64);

        impl $name {
            pub const fn new(id: u64) -> Self {
                Self(id)
            }

            pub const fn get(self) -> u64 {
                self.0
            }
        }

        impl From<u64> for $name {
            fn from(id: u64) -> Self {
                Self(id)
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl std::str::FromStr for $name {
            type Err = std::num::ParseIntError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.trim().parse().map(Self)
            }
        }
    };
}

entity_id!(
    /// Identifier of a [`Task`](super::entities::Task).
    TaskId
);
entity_id!(
    /// Identifier of a [`Story`](super::entities::Story).
    StoryId
);
entity_id!(
    /// Identifier of a [`User`](super::entities::User).
    UserId
);
entity_id!(
    /// Identifier of an [`Estimate`](super::estimate::Estimate) card.
    EstimateId
);
