//! Base rule trait and types
//!
//! This module defines the contract every risk rule implements:
//! - `RiskRule` trait: category metadata, supported tags, risk generation
//! - `RuleResult` for capturing one rule's execution outcome
//! - `RuleSummary` for aggregating outcomes across a run

use crate::graph::ThreatModel;
use crate::models::{Risk, RiskCategory, Severity};
use anyhow::Result;
use serde::Serialize;
use std::collections::BTreeMap;

/// Result from running a single rule
#[derive(Debug, Clone, Serialize)]
pub struct RuleResult {
    /// Category ID of the rule that produced these results
    pub rule_id: String,
    /// Risks produced by the rule
    #[serde(skip)]
    pub risks: Vec<Risk>,
    /// Execution time in milliseconds
    pub duration_ms: u64,
    /// Whether the rule completed successfully
    pub success: bool,
    /// Error message if the rule failed
    pub error: Option<String>,
}

impl RuleResult {
    pub fn success(rule_id: String, risks: Vec<Risk>, duration_ms: u64) -> Self {
        Self {
            rule_id,
            risks,
            duration_ms,
            success: true,
            error: None,
        }
    }

    pub fn failure(rule_id: String, error: String, duration_ms: u64) -> Self {
        Self {
            rule_id,
            risks: Vec::new(),
            duration_ms,
            success: false,
            error: Some(error),
        }
    }
}

/// Trait for risk rules
///
/// A rule is a pure function of a fully prepared model: the topology index
/// is built and RAA scores are written before any rule runs. Rules must not
/// rely on map iteration order other than the sorted-ID traversal the model
/// provides.
///
/// # Example
///
/// ```ignore
/// pub struct MyRule;
///
/// impl RiskRule for MyRule {
///     fn category(&self) -> RiskCategory {
///         RiskCategory { id: "my-rule".into(), title: "My Rule".into(), ..Default::default() }
///     }
///
///     fn generate(&self, model: &ThreatModel) -> Result<Vec<Risk>> {
///         Ok(vec![])
///     }
/// }
/// ```
pub trait RiskRule: Send + Sync {
    /// Static category metadata
    fn category(&self) -> RiskCategory;

    /// Model tags this rule reacts to
    fn supported_tags(&self) -> Vec<String> {
        Vec::new()
    }

    /// Produce the ordered list of risks for the model.
    fn generate(&self, model: &ThreatModel) -> Result<Vec<Risk>>;

    /// Category ID, used for skipping and ordering
    fn id(&self) -> String {
        self.category().id
    }
}

/// Summary statistics from running all rules
#[derive(Debug, Clone, Default, Serialize)]
pub struct RuleSummary {
    pub rules_run: usize,
    pub rules_succeeded: usize,
    pub rules_failed: usize,
    pub total_risks: usize,
    pub by_severity: BTreeMap<Severity, usize>,
    pub total_duration_ms: u64,
    /// Rule ID -> error message of every failed rule
    pub failures: BTreeMap<String, String>,
}

impl RuleSummary {
    pub fn add_result(&mut self, result: &RuleResult) {
        self.rules_run += 1;
        self.total_duration_ms += result.duration_ms;

        if result.success {
            self.rules_succeeded += 1;
            self.total_risks += result.risks.len();
            for risk in &result.risks {
                *self.by_severity.entry(risk.severity).or_insert(0) += 1;
            }
        } else {
            self.rules_failed += 1;
            self.failures.insert(
                result.rule_id.clone(),
                result.error.clone().unwrap_or_default(),
            );
        }
    }

    pub fn from_results(results: &[RuleResult]) -> Self {
        let mut summary = Self::default();
        for result in results {
            summary.add_result(result);
        }
        summary
    }
}
