use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::{Result, YteError};
use crate::path::MissingKey;

pub const CONFIG_FILENAME: &str = "yte.json";
const DEFAULT_PREVIEW_CHARS: usize = 100;

/// Settings shared by the CLI and GUI, stored as JSON.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    /// File extensions picked up by a folder scan, without the dot.
    pub extensions: Vec<String>,
    /// Characters of each value shown in a list row before it is cut with `...`.
    pub preview_chars: usize,
    /// Initial state of the case-sensitivity toggle.
    pub case_sensitive: bool,
    pub missing_key: MissingKey,
    /// Zip the scanned files next to the folder before Replace All writes anything.
    pub backup_before_replace_all: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            extensions: vec!["yaml".to_string(), "yml".to_string()],
            preview_chars: DEFAULT_PREVIEW_CHARS,
            case_sensitive: false,
            missing_key: MissingKey::Reject,
            backup_before_replace_all: false,
        }
    }
}

impl Config {
    /// Loads config from `path`, or returns defaults if the file does not exist.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path).map_err(|e| YteError::io(path, e))?;
        serde_json::from_str(&content)
            .map_err(|e| YteError::Config(format!("{}: {}", path.display(), e)))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let content =
            serde_json::to_string_pretty(self).map_err(|e| YteError::Config(e.to_string()))?;
        fs::write(path, content).map_err(|e| YteError::io(path, e))
    }

    pub fn matches_extension(&self, p: &Path) -> bool {
        let Some(ext) = p.extension().and_then(|s| s.to_str()) else {
            return false;
        };
        self.extensions
            .iter()
            .any(|want| want.trim_start_matches('.').eq_ignore_ascii_case(ext))
    }
}
