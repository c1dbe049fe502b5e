//! Output reporters for archrisk analysis results
//!
//! Supports multiple output formats:
//! - `text` - Terminal output with colors
//! - `json` - Machine-readable JSON

mod json;
mod text;

use crate::pipeline::AnalysisReport;
use anyhow::{anyhow, Result};
use std::str::FromStr;

/// Supported output formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl FromStr for OutputFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" | "txt" | "terminal" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            _ => Err(anyhow!("Unknown format '{}'. Valid formats: text, json", s)),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

/// Render an analysis report in the specified format
pub fn report(report: &AnalysisReport, format: &str) -> Result<String> {
    let fmt = OutputFormat::from_str(format)?;
    report_with_format(report, fmt)
}

/// Render an analysis report using an OutputFormat enum
pub fn report_with_format(report: &AnalysisReport, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Text => text::render(report),
        OutputFormat::Json => json::render(report),
    }
}

/// Get the recommended file extension for a format
pub fn file_extension(format: OutputFormat) -> &'static str {
    match format {
        OutputFormat::Text => "txt",
        OutputFormat::Json => "json",
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::models::{
        ExploitationImpact, ExploitationLikelihood, FindingsSummary, Risk, RiskStatus,
    };
    use crate::rules::{RuleResult, RuleSummary};
    use chrono::Utc;
    use std::collections::BTreeMap;

    /// Create a minimal AnalysisReport for testing
    pub(crate) fn test_report() -> AnalysisReport {
        let mut tracked = Risk::new(
            "missing-waf",
            "Missing Web Application Firewall (WAF) risk at Shop",
            "missing-waf@shop".to_string(),
            ExploitationLikelihood::Unlikely,
            ExploitationImpact::Low,
        );
        tracked.risk_status = RiskStatus::Mitigated;
        let risks = vec![
            Risk::new(
                "unencrypted-communication",
                "Unencrypted Communication named Order between Browser and Shop",
                "unencrypted-communication@browser>order@browser@shop".to_string(),
                ExploitationLikelihood::Likely,
                ExploitationImpact::High,
            ),
            tracked,
        ];
        let rules = vec![
            RuleResult::success("missing-waf".to_string(), vec![], 1),
            RuleResult::failure("unencrypted-communication".to_string(), "broken".to_string(), 2),
        ];
        AnalysisReport {
            title: "Shop".into(),
            generated_at: Utc::now(),
            summary: FindingsSummary::from_risks(&risks),
            rule_summary: RuleSummary::from_results(&rules),
            risks,
            rules,
            orphaned_tracking: vec!["missing-waf@gone".into()],
            duplicate_tracking: vec![],
            tracked_risks: 1,
            raa: BTreeMap::from([("shop".to_string(), 100.0), ("browser".to_string(), 1.0)]),
            duration_ms: 3,
        }
    }

    #[test]
    fn test_format_parsing() {
        assert_eq!(OutputFormat::from_str("text").unwrap(), OutputFormat::Text);
        assert_eq!(OutputFormat::from_str("JSON").unwrap(), OutputFormat::Json);
        assert!(OutputFormat::from_str("sarif").is_err());
        assert_eq!(OutputFormat::Json.to_string(), "json");
        assert_eq!(file_extension(OutputFormat::Text), "txt");
    }

    #[test]
    fn test_report_dispatch() {
        let report = test_report();
        assert!(super::report(&report, "json")
            .expect("render")
            .trim_start()
            .starts_with('{'));
        assert!(super::report(&report, "text").expect("render").contains("Shop"));
    }
}
