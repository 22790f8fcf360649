//! `[output]` section: how command results are printed
//!
//! Both settings are defaults that the global `--output` and `--no-color`
//! flags override for a single invocation.

use poker_domain::OutputFormat;
use serde::{Deserialize, Serialize};

/// Printing preferences for status, history, roster and summary output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileOutputConfig {
    /// `text` tables or `json` documents. Unset means text.
    pub format: Option<OutputFormat>,
    /// ANSI colors in text tables (round status, unresolved consensus)
    pub color: bool,
}

impl Default for FileOutputConfig {
    fn default() -> Self {
        Self {
            format: None,
            color: true,
        }
    }
}

impl FileOutputConfig {
    /// Format for this run: the `--output` flag wins over the file
    pub fn resolve_format(&self, flag: Option<OutputFormat>) -> OutputFormat {
        flag.or(self.format).unwrap_or_default()
    }

    /// Value handed to `ConsoleFormatter::set_color`; `--no-color` always
    /// turns colors off
    pub fn resolve_color(&self, no_color_flag: bool) -> bool {
        self.color && !no_color_flag
    }
}
