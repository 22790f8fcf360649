//! Estimate cards and their units

use super::ids::{EstimateId, TaskId};
use crate::core::error::DomainError;
use serde::{Deserialize, Serialize};

/// Unit an estimate's numeric value is expressed in.
///
/// The integer codes (1..=4) are stable and used when importing rows that
/// carry the unit as a number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EstimateUnit {
    StoryPoints,
    #[default]
    PersonDays,
    PersonMonths,
    PersonYears,
}

impl EstimateUnit {
    pub const ALL: [EstimateUnit; 4] = [
        EstimateUnit::StoryPoints,
        EstimateUnit::PersonDays,
        EstimateUnit::PersonMonths,
        EstimateUnit::PersonYears,
    ];

    pub fn code(&self) -> u8 {
        match self {
            EstimateUnit::StoryPoints => 1,
            EstimateUnit::PersonDays => 2,
            EstimateUnit::PersonMonths => 3,
            EstimateUnit::PersonYears => 4,
        }
    }

    pub fn from_code(code: u8) -> Result<Self, DomainError> {
        match code {
            1 => Ok(EstimateUnit::StoryPoints),
            2 => Ok(EstimateUnit::PersonDays),
            3 => Ok(EstimateUnit::PersonMonths),
            4 => Ok(EstimateUnit::PersonYears),
            other => Err(DomainError::InvalidUnitCode(other)),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            EstimateUnit::StoryPoints => "story points",
            EstimateUnit::PersonDays => "person days",
            EstimateUnit::PersonMonths => "person months",
            EstimateUnit::PersonYears => "person years",
        }
    }
}

impl std::fmt::Display for EstimateUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl std::str::FromStr for EstimateUnit {
    type Err = DomainError;

    /// Accepts "person days", "person_days", "person-days" in any case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace(['_', '-'], " ");
        Self::ALL
            .into_iter()
            .find(|unit| unit.label() == normalized)
            .ok_or_else(|| DomainError::InvalidUnit(s.to_string()))
    }
}

/// A single card in a task's deck.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Estimate {
    pub id: EstimateId,
    pub task_id: TaskId,
    /// What is printed on the card ("5", "1/2", "?", "coffee")
    pub complexity_symbol: String,
    pub unit: EstimateUnit,
    /// Magnitude in `unit`. Negative means the card has no numeric meaning.
    pub unit_value: f64,
}

impl Estimate {
    /// Sentinel stored in `unit_value` for cards like "?" and "coffee"
    pub const NON_NUMERIC: f64 = -1.0;

    /// Numeric value of this card, or `None` for sentinel cards.
    ///
    /// Aggregations (sums, averages) must only use values returned here.
    pub fn numeric_value(&self) -> Option<f64> {
        (self.unit_value >= 0.0).then_some(self.unit_value)
    }

    pub fn is_numeric(&self) -> bool {
        self.numeric_value().is_some()
    }
}

/// Average of the numeric cards, `None` when there are none
pub fn numeric_average<'a>(estimates: impl IntoIterator<Item = &'a Estimate>) -> Option<f64> {
    let values: Vec<f64> = estimates
        .into_iter()
        .filter_map(Estimate::numeric_value)
        .collect();
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}
