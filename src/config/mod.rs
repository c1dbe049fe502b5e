//! Configuration module for archrisk
//!
//! This module handles:
//! - Project-level configuration (archrisk.toml)
//! - Rule skip list and thresholds
//! - CLI defaults

mod project_config;

pub use project_config::{
    load_project_config, CliDefaults, ProjectConfig, RulesConfig, TrackingConfig,
    CONFIG_FILE_NAMES, EXAMPLE_CONFIG,
};
