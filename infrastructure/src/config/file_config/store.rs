//! Store configuration from TOML (`[store]` section)

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Raw store configuration from TOML
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileStoreConfig {
    /// Snapshot file holding tasks, stories, users and votes
    pub path: Option<PathBuf>,
}

impl FileStoreConfig {
    /// Configured path, or `planning-poker/state.json` under the user data dir
    pub fn resolved_path(&self) -> PathBuf {
        match &self.path {
            Some(path) => path.clone(),
            None => super::data_file("state.json"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_path_deserialize() {
        let toml_str = r#"
[store]
path = "/tmp/poker.json"
"#;
        let config: super::super::FileConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.store.resolved_path(), PathBuf::from("/tmp/poker.json"));
    }

    #[test]
    fn test_default_store_path() {
        let path = FileStoreConfig::default().resolved_path();
        assert!(path.ends_with("state.json"));
    }
}
