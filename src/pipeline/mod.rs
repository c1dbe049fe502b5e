//! Analysis pipeline
//!
//! Orchestrates one analysis run over a loaded model:
//! 1. Build the topology index
//! 2. Score relative attacker attractiveness (RAA)
//! 3. Run the risk rules
//! 4. Store generated risks on the model
//! 5. Reconcile risk tracking and apply statuses
//! 6. Assemble the report

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use std::time::Instant;
use tracing::{debug, info};

use crate::config::ProjectConfig;
use crate::graph::ThreatModel;
use crate::models::{sort_risks, FindingsSummary, Risk, Severity};
use crate::rules::{self, RuleResult, RuleSummary};
use crate::scoring::score_model;
use crate::tracking::{self, ReconcileReport};

/// Everything one analysis run produced
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    pub title: String,
    pub generated_at: DateTime<Utc>,
    /// Risks in report order
    pub risks: Vec<Risk>,
    pub summary: FindingsSummary,
    pub rules: Vec<RuleResult>,
    pub rule_summary: RuleSummary,
    /// Tracking patterns that matched no generated risk
    pub orphaned_tracking: Vec<String>,
    /// (pattern, risk ID) pairs left out because another record applied
    pub duplicate_tracking: Vec<(String, String)>,
    /// Number of risks with an applied tracking record
    pub tracked_risks: usize,
    /// Asset ID -> RAA score
    pub raa: BTreeMap<String, f64>,
    pub duration_ms: u64,
}

impl AnalysisReport {
    /// Whether any risk still at risk is at or above `threshold`.
    pub fn has_open_risk_at_or_above(&self, threshold: Severity) -> bool {
        self.risks
            .iter()
            .any(|r| r.risk_status.is_still_at_risk() && r.severity >= threshold)
    }
}

/// Full analysis pipeline.
pub struct Pipeline {
    config: ProjectConfig,
    /// Rule engine worker threads (0 = auto)
    workers: usize,
}

impl Pipeline {
    pub fn new(config: ProjectConfig) -> Self {
        let workers = config.defaults.workers.unwrap_or(0);
        Self { config, workers }
    }

    /// Override the worker count from config.
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    pub fn config(&self) -> &ProjectConfig {
        &self.config
    }

    /// Run every stage on `model` and return the report.
    ///
    /// Rule failures are recorded in the report. Orphaned risk tracking is
    /// an error unless `tracking.ignore_orphans` is set.
    pub fn run(&self, mut model: ThreatModel) -> Result<AnalysisReport> {
        let start = Instant::now();
        info!("Analyzing model '{}'", model.title);

        model.rebuild_index();
        let raa = score_model(&mut model);
        debug!("Scored {} assets", raa.len());

        let engine = rules::create_engine(self.workers, &self.config.rules);
        let mut results = engine.run_detailed(&model)?;
        let rule_summary = RuleSummary::from_results(&results);
        let generated: Vec<Risk> = results
            .iter_mut()
            .flat_map(|r| std::mem::take(&mut r.risks))
            .collect();
        model.set_generated_risks(generated);

        let reconciled: ReconcileReport =
            tracking::reconcile_model(&mut model, self.config.tracking.ignore_orphans)?;
        info!(
            "Applied risk tracking to {} risks ({} orphaned)",
            reconciled.applied.len(),
            reconciled.orphans.len()
        );

        let mut risks = model.all_risks();
        sort_risks(&mut risks);
        let summary = FindingsSummary::from_risks(&risks);
        let duration_ms = start.elapsed().as_millis() as u64;
        info!(
            "Analysis finished: {} risks, {} still at risk, in {}ms",
            summary.total, summary.still_at_risk, duration_ms
        );

        Ok(AnalysisReport {
            title: model.title.clone(),
            generated_at: Utc::now(),
            risks,
            summary,
            rules: results,
            rule_summary,
            orphaned_tracking: reconciled.orphans,
            duplicate_tracking: reconciled.duplicates,
            tracked_risks: reconciled.applied.len(),
            raa,
            duration_ms,
        })
    }
}

/// Run the pipeline with the given project configuration.
pub fn analyze(model: ThreatModel, config: &ProjectConfig) -> Result<AnalysisReport> {
    Pipeline::new(config.clone()).run(model)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{RulesConfig, TrackingConfig};
    use crate::graph::{
        CommunicationLink, Confidentiality, Criticality, DataAsset, Protocol, TechnicalAsset,
        Technology, TrustBoundary, TrustBoundaryType,
    };
    use crate::models::RiskStatus;
    use crate::tracking::RiskTracking;

    fn shop() -> ThreatModel {
        ThreatModel::new("shop")
            .with_data(DataAsset::new("orders").with_cia(
                Confidentiality::StrictlyConfidential,
                Criticality::Critical,
                Criticality::Operational,
            ))
            .with_asset(
                TechnicalAsset::new("browser", Technology::Browser).with_link(
                    CommunicationLink::new("browser", "Order", "web", Protocol::Http)
                        .with_data_sent(&["orders"]),
                ),
            )
            .with_asset(TechnicalAsset::new("web", Technology::WebApplication).with_processed(&["orders"]))
            .with_boundary(TrustBoundary::new("internet", TrustBoundaryType::NetworkOnPrem).with_assets(&["browser"]))
            .with_boundary(TrustBoundary::new("dmz", TrustBoundaryType::NetworkOnPrem).with_assets(&["web"]))
    }

    fn config(ignore_orphans: bool) -> ProjectConfig {
        ProjectConfig {
            tracking: TrackingConfig { ignore_orphans },
            ..Default::default()
        }
    }

    #[test]
    fn test_pipeline_produces_sorted_risks() {
        let report = Pipeline::new(config(false))
            .with_workers(2)
            .run(shop())
            .expect("analysis");

        let ids: Vec<&str> = report.risks.iter().map(|r| r.synthetic_id.as_str()).collect();
        assert!(ids.contains(&"missing-waf@web"));
        assert!(ids.contains(&"unencrypted-communication@browser>order@browser@web"));
        // Most severe first
        assert_eq!(report.risks[0].category_id, "unencrypted-communication");
        assert_eq!(report.summary.total, report.risks.len());
        assert_eq!(report.rule_summary.total_risks, report.risks.len());
        assert_eq!(report.rule_summary.rules_run, 6);
        assert!(report.raa.contains_key("web"));
    }

    #[test]
    fn test_tracking_changes_status_and_counts() {
        let model = shop().with_tracking(RiskTracking::new("missing-waf@*", RiskStatus::Mitigated));
        let report = analyze(model, &config(false)).expect("analysis");

        let waf = report
            .risks
            .iter()
            .find(|r| r.category_id == "missing-waf")
            .expect("waf risk");
        assert_eq!(waf.risk_status, RiskStatus::Mitigated);
        assert_eq!(report.tracked_risks, 1);
        assert_eq!(report.summary.still_at_risk, report.summary.total - 1);
    }

    #[test]
    fn test_orphaned_tracking_is_fatal_unless_ignored() {
        let tracked =
            || shop().with_tracking(RiskTracking::new("missing-waf@nothing", RiskStatus::Accepted));
        assert!(analyze(tracked(), &config(false)).is_err());

        let report = analyze(tracked(), &config(true)).expect("analysis");
        assert_eq!(report.orphaned_tracking, vec!["missing-waf@nothing".to_string()]);
    }

    #[test]
    fn test_skipped_rules_do_not_run() {
        let config = ProjectConfig {
            rules: RulesConfig {
                skip: vec!["missing-waf".to_string()],
                ..Default::default()
            },
            ..Default::default()
        };
        let report = analyze(shop(), &config).expect("analysis");
        assert!(report.risks.iter().all(|r| r.category_id != "missing-waf"));
        assert_eq!(report.rule_summary.rules_run, 5);
    }

    #[test]
    fn test_fail_on_threshold() {
        let report = analyze(shop(), &config(false)).expect("analysis");
        assert!(report.has_open_risk_at_or_above(Severity::Low));
        assert!(!report.has_open_risk_at_or_above(Severity::Critical));
    }
}
