//! Text (terminal) reporter with colors and formatting

use crate::models::{RiskStatus, Severity};
use crate::pipeline::AnalysisReport;
use anyhow::Result;

/// Severity colors
fn severity_color(severity: Severity) -> &'static str {
    match severity {
        Severity::Critical => "\x1b[31m", // Red
        Severity::High => "\x1b[91m",     // Light red
        Severity::Elevated => "\x1b[35m", // Magenta
        Severity::Medium => "\x1b[33m",   // Yellow
        Severity::Low => "\x1b[34m",      // Blue
    }
}

/// Reset ANSI color
const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";

/// Number of risks listed before truncating
const MAX_LISTED: usize = 25;

/// Severity tag
fn severity_tag(severity: Severity) -> &'static str {
    match severity {
        Severity::Critical => "[C]",
        Severity::High => "[H]",
        Severity::Elevated => "[E]",
        Severity::Medium => "[M]",
        Severity::Low => "[L]",
    }
}

fn status_label(status: RiskStatus) -> String {
    if status == RiskStatus::Unchecked {
        String::new()
    } else {
        format!("{DIM}({}){RESET}", status)
    }
}

/// Render report as formatted terminal output
pub fn render(report: &AnalysisReport) -> Result<String> {
    let mut out = String::new();

    // Header
    out.push_str(&format!("\n{BOLD}archrisk: {}{RESET}\n", report.title));
    out.push_str(&format!(
        "{DIM}──────────────────────────────────────{RESET}\n"
    ));
    out.push_str(&format!(
        "Assets: {}  Rules: {}/{} ok  Tracked: {}  Time: {}ms\n\n",
        report.raa.len(),
        report.rule_summary.rules_succeeded,
        report.rule_summary.rules_run,
        report.tracked_risks,
        report.duration_ms
    ));

    // Risk summary
    let fs = &report.summary;
    out.push_str(&format!(
        "{BOLD}RISKS{RESET} ({} total, {} still at risk)\n",
        fs.total, fs.still_at_risk
    ));

    let counts = [
        (Severity::Critical, fs.critical),
        (Severity::High, fs.high),
        (Severity::Elevated, fs.elevated),
        (Severity::Medium, fs.medium),
        (Severity::Low, fs.low),
    ];
    let summary_parts: Vec<String> = counts
        .iter()
        .filter(|(_, n)| *n > 0)
        .map(|(sev, n)| format!("{}{} {}{RESET}", severity_color(*sev), n, sev))
        .collect();
    if !summary_parts.is_empty() {
        out.push_str(&format!("  {}\n\n", summary_parts.join(" | ")));
    }

    if !report.risks.is_empty() {
        out.push_str(&format!(
            "{DIM}  #   SEV  TITLE / SYNTHETIC ID{RESET}\n"
        ));
        out.push_str(&format!(
            "{DIM}  ─────────────────────────────────────────────────────────────────{RESET}\n"
        ));

        for (i, risk) in report.risks.iter().take(MAX_LISTED).enumerate() {
            out.push_str(&format!(
                "  {DIM}{:>3}{RESET}  {}{}{RESET}  {} {}\n",
                i + 1,
                severity_color(risk.severity),
                severity_tag(risk.severity),
                risk.title,
                status_label(risk.risk_status)
            ));
            out.push_str(&format!("            {DIM}{}{RESET}\n", risk.synthetic_id));
        }

        let remaining = report.risks.len().saturating_sub(MAX_LISTED);
        if remaining > 0 {
            out.push_str(&format!(
                "\n  {DIM}...and {} more (use --format json for the full list){RESET}\n",
                remaining
            ));
        }
        out.push('\n');
    }

    // Rule failures
    if !report.rule_summary.failures.is_empty() {
        out.push_str(&format!("{BOLD}RULE FAILURES{RESET}\n"));
        for (rule, error) in &report.rule_summary.failures {
            out.push_str(&format!("  \x1b[31m{}{RESET}: {}\n", rule, error));
        }
        out.push('\n');
    }

    // Tracking problems
    if !report.orphaned_tracking.is_empty() || !report.duplicate_tracking.is_empty() {
        out.push_str(&format!("{BOLD}RISK TRACKING{RESET}\n"));
        for orphan in &report.orphaned_tracking {
            out.push_str(&format!("  \x1b[33morphaned{RESET}  {}\n", orphan));
        }
        for (pattern, id) in &report.duplicate_tracking {
            out.push_str(&format!(
                "  {DIM}duplicate{RESET} {} {DIM}(already tracked: {}){RESET}\n",
                pattern, id
            ));
        }
        out.push('\n');
    }

    if fs.still_at_risk == 0 {
        out.push_str(&format!("{DIM}No open risks.{RESET}\n"));
    }

    Ok(out)
}
