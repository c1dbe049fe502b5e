//! JSON reporter
//!
//! Serializes the whole [`AnalysisReport`]: risks in report order, rule
//! outcomes, tracking reconciliation (orphans and shadowed duplicates) and
//! the RAA score per technical asset.

use crate::pipeline::AnalysisReport;
use anyhow::Result;

/// Render report as JSON
pub fn render(report: &AnalysisReport) -> Result<String> {
    Ok(serde_json::to_string_pretty(report)?)
}
