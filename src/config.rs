// config.rs - Editor config loading and layer merging

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_MANIFEST: &str = "default.xml";
pub const DEFAULT_ACCENT: &str = "#25A065";
const CONFIG_DIR_NAME: &str = "manifest-edit";

/// Editor config with Option fields for layered merge.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EditorConfig {
    pub manifest: Option<PathBuf>,
    pub log_file: Option<PathBuf>,
    pub log_level: Option<String>,
    pub accent: Option<String>,
}

/// Resolved config with concrete values (no Options).
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedConfig {
    pub manifest: PathBuf,
    pub log_file: Option<PathBuf>,
    pub log_level: log::LevelFilter,
    pub accent: String,
}

impl EditorConfig {
    /// Merge another config on top of self (other wins for present fields).
    pub fn merge(self, other: EditorConfig) -> EditorConfig {
        EditorConfig {
            manifest: other.manifest.or(self.manifest),
            log_file: other.log_file.or(self.log_file),
            log_level: other.log_level.or(self.log_level),
            accent: other.accent.or(self.accent),
        }
    }

    /// Resolve to concrete values with defaults.
    pub fn resolve(self) -> ResolvedConfig {
        let log_level = self
            .log_level
            .as_deref()
            .and_then(|level| level.parse().ok())
            .unwrap_or(log::LevelFilter::Info);
        ResolvedConfig {
            manifest: self
                .manifest
                .unwrap_or_else(|| PathBuf::from(DEFAULT_MANIFEST)),
            log_file: self.log_file.or_else(default_log_file),
            log_level,
            accent: self.accent.unwrap_or_else(|| DEFAULT_ACCENT.to_string()),
        }
    }
}

/// Load a JSON file as EditorConfig, returning default on any error.
pub fn load_config_file(path: &Path) -> EditorConfig {
    match std::fs::read_to_string(path) {
        Ok(content) => serde_json::from_str(&content).unwrap_or_default(),
        Err(_) => EditorConfig::default(),
    }
}

/// User-level config file under the platform config directory.
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join(CONFIG_DIR_NAME).join("config.json"))
}

fn default_log_file() -> Option<PathBuf> {
    dirs::cache_dir().map(|d| d.join(CONFIG_DIR_NAME).join("manifest-edit.log"))
}

/// Resolve editor config by merging layers.
///
/// Layers (lowest -> highest priority):
///   1. Hardcoded defaults
///   2. User config (`<config dir>/manifest-edit/config.json`), or the
///      explicit `--config` file when given
///   3. `.manifest-edit.json` in the working directory
///   4. `.manifest-edit.local.json` in the working directory
///   5. Command-line overrides
pub fn resolve_config(
    work_dir: &Path,
    explicit: Option<&Path>,
    overrides: EditorConfig,
) -> ResolvedConfig {
    let defaults = EditorConfig {
        manifest: Some(PathBuf::from(DEFAULT_MANIFEST)),
        accent: Some(DEFAULT_ACCENT.to_string()),
        ..Default::default()
    };

    let base = match explicit {
        Some(path) => load_config_file(path),
        None => user_config_path()
            .map(|p| load_config_file(&p))
            .unwrap_or_default(),
    };

    let layers = [
        base,
        load_config_file(&work_dir.join(".manifest-edit.json")),
        load_config_file(&work_dir.join(".manifest-edit.local.json")),
        overrides,
    ];

    let mut config = defaults;
    for layer in layers {
        config = config.merge(layer);
    }
    config.resolve()
}
