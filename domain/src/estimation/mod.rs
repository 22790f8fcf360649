//! Estimation entities
//!
//! Tasks own stories, a team of users and a deck of estimate cards. Stories
//! carry the round counter that the voting engine advances.

pub mod deck;
pub mod entities;
pub mod estimate;
pub mod ids;
pub mod iteration;

pub use deck::{CardTemplate, Deck};
pub use entities::{NewStory, NewTask, Story, Task, User, consensus_from_raw, consensus_to_raw};
pub use estimate::{Estimate, EstimateUnit, numeric_average};
pub use ids::{EstimateId, StoryId, TaskId, UserId};
pub use iteration::Iteration;
