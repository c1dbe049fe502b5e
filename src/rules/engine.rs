//! Rule execution engine with parallel support
//!
//! The RuleEngine runs every registered rule against one prepared model:
//! - Drops rules named in the skip list (unknown names are warned about)
//! - Runs the remaining rules in parallel using rayon
//! - Isolates each rule so an error or panic only fails that rule
//! - Returns per-rule results ordered by rule ID
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │                      RuleEngine                         │
//! ├─────────────────────────────────────────────────────────┤
//! │  1. Register rules                                      │
//! │  2. Apply skip list                                     │
//! │  3. Run all rules in parallel (rayon, read-only model)  │
//! │  4. Sort results by rule ID                             │
//! │  5. Collect risks                                       │
//! └─────────────────────────────────────────────────────────┘
//! ```

use crate::graph::ThreatModel;
use crate::models::Risk;
use crate::rules::base::{RiskRule, RuleResult, RuleSummary};
use anyhow::Result;
use rayon::prelude::*;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn};

/// Orchestrates risk generation across all registered rules
pub struct RuleEngine {
    rules: Vec<Arc<dyn RiskRule>>,
    /// Number of worker threads for parallel execution
    workers: usize,
    /// Rule IDs to leave out
    skip: Vec<String>,
}

impl RuleEngine {
    /// Create a new rule engine
    ///
    /// # Arguments
    /// * `workers` - Number of worker threads (0 = auto-detect)
    pub fn new(workers: usize) -> Self {
        let actual_workers = if workers == 0 {
            std::thread::available_parallelism()
                .map(|p| p.get())
                .unwrap_or(4)
                .min(16)
        } else {
            workers
        };

        Self {
            rules: Vec::new(),
            workers: actual_workers,
            skip: Vec::new(),
        }
    }

    pub fn register(&mut self, rule: Arc<dyn RiskRule>) {
        self.rules.push(rule);
    }

    pub fn register_all(&mut self, rules: impl IntoIterator<Item = Arc<dyn RiskRule>>) {
        self.rules.extend(rules);
    }

    pub fn with_skip(mut self, skip: impl IntoIterator<Item = String>) -> Self {
        self.skip.extend(skip);
        self
    }

    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }

    pub fn rule_ids(&self) -> Vec<String> {
        self.rules.iter().map(|r| r.id()).collect()
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Rules left after applying the skip list.
    fn active_rules(&self) -> Vec<Arc<dyn RiskRule>> {
        let known: HashSet<String> = self.rule_ids().into_iter().collect();
        for id in &self.skip {
            if !known.contains(id) {
                warn!("Unknown rule '{}' in skip list, ignoring", id);
            }
        }
        let skip: HashSet<&str> = self.skip.iter().map(String::as_str).collect();
        self.rules
            .iter()
            .filter(|r| {
                let id = r.id();
                let skipped = skip.contains(id.as_str());
                if skipped {
                    debug!("Skipping rule: {}", id);
                }
                !skipped
            })
            .cloned()
            .collect()
    }

    /// Run all active rules and return per-rule results ordered by rule ID.
    pub fn run_detailed(&self, model: &ThreatModel) -> Result<Vec<RuleResult>> {
        let rules = self.active_rules();
        info!(
            "Running {} rules on {} workers",
            rules.len(),
            self.workers
        );

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.workers)
            .build()?;

        let mut results: Vec<RuleResult> = pool.install(|| {
            rules
                .par_iter()
                .map(|rule| self.run_single_rule(rule, model))
                .collect()
        });
        results.sort_by(|a, b| a.rule_id.cmp(&b.rule_id));

        let summary = RuleSummary::from_results(&results);
        info!(
            "Rules finished: {} succeeded, {} failed, {} risks in {}ms",
            summary.rules_succeeded,
            summary.rules_failed,
            summary.total_risks,
            summary.total_duration_ms
        );
        Ok(results)
    }

    /// Run all active rules and return their risks in rule ID order.
    pub fn run(&self, model: &ThreatModel) -> Result<Vec<Risk>> {
        Ok(self
            .run_detailed(model)?
            .into_iter()
            .flat_map(|r| r.risks)
            .collect())
    }

    fn run_single_rule(&self, rule: &Arc<dyn RiskRule>, model: &ThreatModel) -> RuleResult {
        let id = rule.id();
        let start = Instant::now();

        debug!("Running rule: {}", id);

        let generated = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            rule.generate(model)
        }));

        let duration = start.elapsed().as_millis() as u64;
        match generated {
            Ok(Ok(risks)) => {
                debug!("Rule {} found {} risks in {}ms", id, risks.len(), duration);
                RuleResult::success(id, risks, duration)
            }
            Ok(Err(e)) => {
                warn!("Rule {} failed: {}", id, e);
                RuleResult::failure(id, e.to_string(), duration)
            }
            Err(panic_info) => {
                let panic_msg = if let Some(s) = panic_info.downcast_ref::<&str>() {
                    s.to_string()
                } else if let Some(s) = panic_info.downcast_ref::<String>() {
                    s.clone()
                } else {
                    "Unknown panic".to_string()
                };
                error!("Rule {} panicked: {}", id, panic_msg);
                RuleResult::failure(id, format!("Panic: {}", panic_msg), duration)
            }
        }
    }
}

impl Default for RuleEngine {
    fn default() -> Self {
        Self::new(0)
    }
}

/// Builder for RuleEngine
pub struct RuleEngineBuilder {
    workers: usize,
    skip: Vec<String>,
    rules: Vec<Arc<dyn RiskRule>>,
}

impl RuleEngineBuilder {
    pub fn new() -> Self {
        Self {
            workers: 0,
            skip: Vec::new(),
            rules: Vec::new(),
        }
    }

    pub fn workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    pub fn skip(mut self, skip: impl IntoIterator<Item = String>) -> Self {
        self.skip.extend(skip);
        self
    }

    pub fn rule(mut self, rule: Arc<dyn RiskRule>) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn rules(mut self, rules: impl IntoIterator<Item = Arc<dyn RiskRule>>) -> Self {
        self.rules.extend(rules);
        self
    }

    pub fn build(self) -> RuleEngine {
        let mut engine = RuleEngine::new(self.workers).with_skip(self.skip);
        engine.register_all(self.rules);
        engine
    }
}

impl Default for RuleEngineBuilder {
    fn default() -> Self {
        Self::new()
    }
}
