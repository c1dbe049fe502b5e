//! Init command - write an example project config

use anyhow::{Context, Result};
use console::style;
use std::path::{Path, PathBuf};

use archrisk::config::{CONFIG_FILE_NAMES, EXAMPLE_CONFIG};

#[derive(Debug, PartialEq, Eq)]
enum InitOutcome {
    Created(PathBuf),
    /// A config file was already present and left untouched
    Existing(PathBuf),
}

/// Write `archrisk.toml` into `dir` unless a config file already exists
fn write_config(dir: &Path) -> Result<InitOutcome> {
    if let Some(existing) = CONFIG_FILE_NAMES
        .iter()
        .map(|name| dir.join(name))
        .find(|path| path.exists())
    {
        return Ok(InitOutcome::Existing(existing));
    }

    let config_path = dir.join(CONFIG_FILE_NAMES[0]);
    std::fs::write(&config_path, EXAMPLE_CONFIG)
        .with_context(|| format!("Failed to create {}", config_path.display()))?;
    Ok(InitOutcome::Created(config_path))
}

/// Run the init command
pub(super) fn run(path: &Path) -> Result<()> {
    let dir = path
        .canonicalize()
        .with_context(|| format!("Path does not exist: {}", path.display()))?;

    if !dir.is_dir() {
        anyhow::bail!("Path is not a directory: {}", dir.display());
    }

    match write_config(&dir)? {
        InitOutcome::Created(created) => println!(
            "{} Created {}",
            style("✓").green(),
            style(created.display()).cyan()
        ),
        InitOutcome::Existing(existing) => println!(
            "{} Already configured at {}",
            style("✓").green(),
            style(existing.display()).cyan()
        ),
    }

    println!("\nNext steps:");
    println!("  {} Analyze a model", style("archrisk analyze model.yaml").cyan());
    println!("  {} List rule IDs to skip", style("archrisk rules").cyan());
    Ok(())
}
