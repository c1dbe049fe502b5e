//! Project-level configuration support
//!
//! Loads per-project configuration from `archrisk.toml`, `.archriskrc.json`,
//! or `.archrisk.yaml` files in the directory holding the model.
//!
//! # Configuration Format
//!
//! ```toml
//! # archrisk.toml
//!
//! [rules]
//! skip = ["missing-waf"]
//! segmentation_raa_limit = 40.0
//!
//! [tracking]
//! ignore_orphans = false
//!
//! [defaults]
//! format = "text"
//! workers = 8
//! fail_on = "high"
//! ```

use serde::Deserialize;
use std::path::Path;
use tracing::{debug, warn};

/// File names searched for, in order of preference
pub const CONFIG_FILE_NAMES: &[&str] = &[
    "archrisk.toml",
    ".archriskrc.json",
    ".archrisk.yaml",
    ".archrisk.yml",
];

/// Written by `archrisk init`
pub const EXAMPLE_CONFIG: &str = r#"# archrisk.toml

[rules]
# Rule IDs to leave out (see `archrisk rules`)
skip = []
# Minimum RAA for missing-network-segmentation to consider an asset
# segmentation_raa_limit = 50.0

[tracking]
# Report risk tracking entries that match no generated risk as warnings
# instead of failing the run
ignore_orphans = false

[defaults]
format = "text"
# workers = 8
# fail_on = "high"
"#;

/// Project configuration
#[derive(Debug, Clone, Deserialize, Default)]
pub struct ProjectConfig {
    #[serde(default)]
    pub rules: RulesConfig,

    #[serde(default)]
    pub tracking: TrackingConfig,

    #[serde(default)]
    pub defaults: CliDefaults,
}

/// Rule selection and thresholds
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RulesConfig {
    /// Rule IDs to skip
    #[serde(default)]
    pub skip: Vec<String>,

    /// RAA threshold of the network segmentation rule
    #[serde(default)]
    pub segmentation_raa_limit: Option<f64>,
}

/// Risk tracking reconciliation behaviour
#[derive(Debug, Clone, Deserialize, Default)]
pub struct TrackingConfig {
    /// Treat orphaned tracking entries as warnings
    #[serde(default)]
    pub ignore_orphans: bool,
}

/// Default CLI flags that can be set in project config
#[derive(Debug, Clone, Deserialize, Default)]
pub struct CliDefaults {
    /// Default output format (text, json)
    #[serde(default)]
    pub format: Option<String>,

    /// Default number of workers
    #[serde(default)]
    pub workers: Option<usize>,

    /// Fail-on severity threshold for CI
    #[serde(default)]
    pub fail_on: Option<String>,
}

/// Load project configuration from a directory.
///
/// Searches for configuration files in this order:
/// 1. `archrisk.toml`
/// 2. `.archriskrc.json`
/// 3. `.archrisk.yaml` / `.archrisk.yml`
///
/// A file that fails to parse is logged and skipped. Returns default
/// configuration if no usable config file is found.
pub fn load_project_config(dir: &Path) -> ProjectConfig {
    for name in CONFIG_FILE_NAMES {
        let path = dir.join(name);
        if !path.exists() {
            continue;
        }
        match load_config_file(&path) {
            Ok(config) => {
                debug!("Loaded project config from {}", path.display());
                return config;
            }
            Err(e) => {
                warn!("Failed to load {}: {}", path.display(), e);
            }
        }
    }

    debug!("No project config found, using defaults");
    ProjectConfig::default()
}

fn load_config_file(path: &Path) -> anyhow::Result<ProjectConfig> {
    let content = std::fs::read_to_string(path)?;
    let config = match path.extension().and_then(|e| e.to_str()) {
        Some("toml") => toml::from_str(&content)?,
        Some("json") => serde_json::from_str(&content)?,
        _ => serde_yaml::from_str(&content)?,
    };
    Ok(config)
}
