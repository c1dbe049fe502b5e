//! Analyze command - load a model, run the pipeline, write the report

use anyhow::{Context, Result};
use console::style;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::debug;

use archrisk::config::{load_project_config, ProjectConfig};
use archrisk::loader::load_model;
use archrisk::models::Severity;
use archrisk::pipeline::{AnalysisReport, Pipeline};
use archrisk::reporters::{self, OutputFormat};

/// Flags of `archrisk analyze`, before merging with project config
#[derive(Debug, Default)]
pub(super) struct AnalyzeOptions {
    pub model: PathBuf,
    pub format: Option<String>,
    pub output: Option<PathBuf>,
    pub skip_rules: Vec<String>,
    pub ignore_orphans: bool,
    pub fail_on: Option<String>,
    pub workers: Option<usize>,
}

/// Settings after CLI flags were layered over the project config
#[derive(Debug)]
struct Resolved {
    config: ProjectConfig,
    format: OutputFormat,
    fail_on: Option<Severity>,
}

/// Directory searched for the project config: the one holding the model
fn config_dir(model: &Path) -> &Path {
    match model.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    }
}

fn resolve(options: &AnalyzeOptions, mut config: ProjectConfig) -> Result<Resolved> {
    config.rules.skip.extend(options.skip_rules.iter().cloned());
    config.tracking.ignore_orphans |= options.ignore_orphans;
    if let Some(workers) = options.workers {
        config.defaults.workers = Some(workers);
    }

    let format = match options.format.as_deref().or(config.defaults.format.as_deref()) {
        Some(name) => OutputFormat::from_str(name)?,
        None => OutputFormat::default(),
    };
    let fail_on = options
        .fail_on
        .as_deref()
        .or(config.defaults.fail_on.as_deref())
        .map(Severity::from_str)
        .transpose()
        .context("Invalid fail_on threshold")?;

    Ok(Resolved {
        config,
        format,
        fail_on,
    })
}

/// Whether the report breaches the `--fail-on` threshold
fn breaches_threshold(report: &AnalysisReport, fail_on: Option<Severity>) -> bool {
    fail_on.is_some_and(|threshold| report.has_open_risk_at_or_above(threshold))
}

/// Run the analyze command
pub(super) fn run(options: AnalyzeOptions) -> Result<()> {
    let config = load_project_config(config_dir(&options.model));
    let resolved = resolve(&options, config)?;
    debug!("Resolved analyze settings: {:?}", resolved);

    let model = load_model(&options.model)
        .with_context(|| format!("Failed to load model {}", options.model.display()))?;

    let report = Pipeline::new(resolved.config).run(model)?;
    let rendered = reporters::report_with_format(&report, resolved.format)?;

    match &options.output {
        Some(path) => {
            std::fs::write(path, &rendered)
                .with_context(|| format!("Failed to write report to {}", path.display()))?;
            eprintln!(
                "{} Report written to {} ({} risks, {} still at risk)",
                style("✓").green(),
                style(path.display()).cyan(),
                report.summary.total,
                report.summary.still_at_risk
            );
        }
        None => print!("{}", rendered),
    }

    if breaches_threshold(&report, resolved.fail_on) {
        if let Some(threshold) = resolved.fail_on {
            eprintln!("Failing due to --fail-on={} threshold", threshold);
        }
        std::process::exit(1);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_dir_of_bare_file_name_is_cwd() {
        assert_eq!(config_dir(Path::new("model.yaml")), Path::new("."));
        assert_eq!(
            config_dir(Path::new("models/shop.yaml")),
            Path::new("models")
        );
    }

    #[test]
    fn test_cli_flags_override_config() {
        let mut config = ProjectConfig::default();
        config.rules.skip.push("missing-waf".to_string());
        config.defaults.format = Some("json".to_string());
        config.defaults.fail_on = Some("critical".to_string());

        let options = AnalyzeOptions {
            model: PathBuf::from("m.yaml"),
            format: Some("text".to_string()),
            skip_rules: vec!["unencrypted-communication".to_string()],
            ignore_orphans: true,
            fail_on: Some("medium".to_string()),
            workers: Some(3),
            ..Default::default()
        };

        let resolved = resolve(&options, config).expect("resolve");
        assert_eq!(resolved.format, OutputFormat::Text);
        assert_eq!(resolved.fail_on, Some(Severity::Medium));
        assert_eq!(
            resolved.config.rules.skip,
            vec!["missing-waf".to_string(), "unencrypted-communication".to_string()]
        );
        assert!(resolved.config.tracking.ignore_orphans);
        assert_eq!(resolved.config.defaults.workers, Some(3));
    }

    #[test]
    fn test_config_defaults_apply_without_flags() {
        let mut config = ProjectConfig::default();
        config.defaults.format = Some("json".to_string());
        config.defaults.fail_on = Some("high".to_string());
        config.tracking.ignore_orphans = true;

        let resolved = resolve(&AnalyzeOptions::default(), config).expect("resolve");
        assert_eq!(resolved.format, OutputFormat::Json);
        assert_eq!(resolved.fail_on, Some(Severity::High));
        assert!(resolved.config.tracking.ignore_orphans);
    }

    #[test]
    fn test_unknown_format_is_rejected() {
        let options = AnalyzeOptions {
            format: Some("sarif".to_string()),
            ..Default::default()
        };
        assert!(resolve(&options, ProjectConfig::default()).is_err());
    }
}
