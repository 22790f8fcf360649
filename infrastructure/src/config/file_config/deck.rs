//! Deck configuration from TOML (`[deck]` section)

use poker_domain::{ConfigIssue, ConfigIssueCode, EstimateUnit, Severity};
use serde::{Deserialize, Serialize};

/// Raw deck configuration from TOML
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileDeckConfig {
    /// Unit new decks are dealt in, e.g. "person days" or "story points"
    pub unit: String,
}

impl Default for FileDeckConfig {
    fn default() -> Self {
        Self {
            unit: EstimateUnit::default().label().to_string(),
        }
    }
}

impl FileDeckConfig {
    /// Parse the unit, falling back to the default unit with a warning
    pub fn parse_unit(&self) -> (EstimateUnit, Vec<ConfigIssue>) {
        match self.unit.parse::<EstimateUnit>() {
            Ok(unit) => (unit, Vec::new()),
            Err(_) => {
                let fallback = EstimateUnit::default();
                let issue = ConfigIssue {
                    severity: Severity::Warning,
                    code: ConfigIssueCode::InvalidEnumValue {
                        field: "deck.unit".to_string(),
                        value: self.unit.clone(),
                        valid_values: EstimateUnit::ALL
                            .iter()
                            .map(|u| u.label().to_string())
                            .collect(),
                    },
                    message: format!(
                        "deck.unit: unknown unit '{}', falling back to '{}'",
                        self.unit, fallback
                    ),
                };
                (fallback, vec![issue])
            }
        }
    }
}
