//! Risk rules
//!
//! This module provides the rule framework and the built-in rules that turn
//! a prepared threat model into risks.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        RuleEngine                           │
//! │  - Registers rules                                          │
//! │  - Applies the skip list                                    │
//! │  - Runs rules in parallel (rayon) over a read-only model    │
//! │  - Isolates failures per rule                               │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      RiskRule Trait                         │
//! │  - category(): Static metadata (ID, STRIDE, CWE, ...)       │
//! │  - supported_tags(): Tags the rule reacts to                │
//! │  - generate(model): Produce risks with synthetic IDs        │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Built-in rules
//!
//! - `DosRiskyAccessRule` - Critical assets reachable across network boundaries
//! - `MissingNetworkSegmentationRule` - Valuable assets next to weaker ones
//! - `MissingVaultIsolationRule` - Vaults sharing their segment
//! - `MissingWafRule` - Web endpoints without a WAF
//! - `UnencryptedCommunicationRule` - Sensitive data over plain links
//! - `UnguardedDatastoreAccessRule` - Datastores reached directly
//!
//! # Usage
//!
//! ```ignore
//! use archrisk::rules::{builtin_rules, RuleEngineBuilder};
//!
//! let engine = RuleEngineBuilder::new().workers(4).rules(builtin_rules()).build();
//! let risks = engine.run(&model)?;
//! ```

mod base;
mod dos_risky_access;
mod engine;
mod missing_network_segmentation;
mod missing_vault_isolation;
mod missing_waf;
mod unencrypted_communication;
mod unguarded_datastore_access;

pub use base::{RiskRule, RuleResult, RuleSummary};
pub use dos_risky_access::DosRiskyAccessRule;
pub use engine::{RuleEngine, RuleEngineBuilder};
pub use missing_network_segmentation::{MissingNetworkSegmentationRule, DEFAULT_RAA_LIMIT};
pub use missing_vault_isolation::MissingVaultIsolationRule;
pub use missing_waf::MissingWafRule;
pub use unencrypted_communication::UnencryptedCommunicationRule;
pub use unguarded_datastore_access::UnguardedDatastoreAccessRule;

use crate::config::RulesConfig;
use std::sync::Arc;

/// Every built-in rule, in category ID order
pub fn builtin_rules() -> Vec<Arc<dyn RiskRule>> {
    builtin_rules_with_raa_limit(DEFAULT_RAA_LIMIT)
}

/// Built-in rules with a custom RAA threshold for network segmentation
pub fn builtin_rules_with_raa_limit(raa_limit: f64) -> Vec<Arc<dyn RiskRule>> {
    vec![
        Arc::new(DosRiskyAccessRule::new()),
        Arc::new(MissingNetworkSegmentationRule::with_raa_limit(raa_limit)),
        Arc::new(MissingVaultIsolationRule::new()),
        Arc::new(MissingWafRule::new()),
        Arc::new(UnencryptedCommunicationRule::new()),
        Arc::new(UnguardedDatastoreAccessRule::new()),
    ]
}

/// Create a rule engine with the built-in rules configured from the project config
pub fn create_engine(workers: usize, config: &RulesConfig) -> RuleEngine {
    let raa_limit = config.segmentation_raa_limit.unwrap_or(DEFAULT_RAA_LIMIT);
    RuleEngineBuilder::new()
        .workers(workers)
        .skip(config.skip.iter().cloned())
        .rules(builtin_rules_with_raa_limit(raa_limit))
        .build()
}
