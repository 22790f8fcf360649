//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! They are deserialized directly and use domain types where appropriate.

mod audit;
mod deck;
mod logging;
mod output;
mod store;

pub use audit::FileAuditConfig;
pub use deck::FileDeckConfig;
pub use logging::FileLoggingConfig;
pub use output::FileOutputConfig;
pub use store::FileStoreConfig;

use poker_domain::{ConfigIssue, ConfigIssueCode, Severity};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Where the estimation data lives
    pub store: FileStoreConfig,
    /// Deck dealt to new tasks
    pub deck: FileDeckConfig,
    /// Vote audit trail
    pub audit: FileAuditConfig,
    /// Output settings
    pub output: FileOutputConfig,
    /// Log file settings
    pub logging: FileLoggingConfig,
}

impl FileConfig {
    /// Validate the entire configuration, returning all detected issues.
    ///
    /// Checks the deck unit and every configured path.
    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();

        issues.extend(self.deck.parse_unit().1);

        let paths = [
            ("store.path", self.store.path.as_deref()),
            ("audit.path", self.audit.path.as_deref()),
            ("logging.dir", self.logging.dir.as_deref()),
        ];
        for (field, path) in paths {
            if path.is_some_and(|p| p.as_os_str().is_empty()) {
                issues.push(ConfigIssue {
                    severity: Severity::Error,
                    code: ConfigIssueCode::EmptyPath {
                        field: field.to_string(),
                    },
                    message: format!("{}: path is set but empty", field),
                });
            }
        }

        issues
    }
}

/// `planning-poker/<name>` under the user data dir, or the working dir
fn data_file(name: &str) -> PathBuf {
    dirs::data_dir()
        .map(|d| d.join("planning-poker"))
        .unwrap_or_else(|| Path::new(".").to_path_buf())
        .join(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use poker_domain::{EstimateUnit, OutputFormat};

    #[test]
    fn test_deserialize_full_config() {
        let toml_str = r#"
[store]
path = "data/poker.json"

[deck]
unit = "person-months"

[audit]
enabled = true
path = "data/audit.jsonl"

[output]
format = "json"
color = false

[logging]
dir = "logs"
"#;

        let config: FileConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.store.path, Some(PathBuf::from("data/poker.json")));
        assert_eq!(config.deck.parse_unit().0, EstimateUnit::PersonMonths);
        assert!(config.audit.enabled);
        assert_eq!(config.output.format, Some(OutputFormat::Json));
        assert!(!config.output.color);
        assert_eq!(config.logging.dir, Some(PathBuf::from("logs")));
        assert!(config.validate().is_empty());
    }

    #[test]
    fn test_deserialize_partial_config() {
        let toml_str = r#"
[audit]
enabled = true
"#;

        let config: FileConfig = toml::from_str(toml_str).unwrap();
        assert!(config.audit.enabled);
        // Defaults should apply
        assert!(config.store.path.is_none());
        assert!(config.output.color);
        assert_eq!(config.deck.unit, "person days");
    }

    #[test]
    fn test_validate_valid_config() {
        let config = FileConfig::default();
        assert!(config.validate().is_empty());
    }

    #[test]
    fn test_validate_reports_empty_paths_and_bad_unit() {
        let toml_str = r#"
[store]
path = ""

[deck]
unit = "weeks"
"#;
        let config: FileConfig = toml::from_str(toml_str).unwrap();
        let issues = config.validate();
        assert_eq!(issues.len(), 2);
        assert!(issues.iter().any(|i| i.is_error()
            && i.code
                == ConfigIssueCode::EmptyPath {
                    field: "store.path".to_string()
                }));
        assert!(issues.iter().any(|i| matches!(
            &i.code,
            ConfigIssueCode::InvalidEnumValue { field, .. } if field == "deck.unit"
        )));
    }
}
