//! Risk tracking
//!
//! Humans record dispositions (accepted, mitigated, false-positive, ...)
//! against synthetic risk IDs. A record either names one risk exactly or
//! uses `*` as a wildcard for one ID segment. Reconciliation maps these
//! records back onto the risks generated in the current run.
//!
//! ```text
//! tracking records ──► exact pass ──► wildcard pass ──► ReconcileReport
//!                                                         ├─ applied
//!                                                         ├─ orphans
//!                                                         └─ duplicates
//! ```

mod reconciler;

pub use reconciler::{reconcile, ReconcileReport, WILDCARD_MARKER};

use crate::graph::ThreatModel;
use crate::models::RiskStatus;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

/// A human disposition for one risk, or a family of risks via wildcard.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskTracking {
    /// Exact synthetic ID or a pattern containing `*`
    pub synthetic_risk_id: String,
    pub justification: String,
    pub ticket: String,
    pub checked_by: String,
    pub status: RiskStatus,
    pub date: Option<NaiveDate>,
}

impl RiskTracking {
    pub fn new(synthetic_risk_id: &str, status: RiskStatus) -> Self {
        Self {
            synthetic_risk_id: synthetic_risk_id.to_string(),
            status,
            ..Default::default()
        }
    }

    pub fn with_justification(mut self, justification: &str) -> Self {
        self.justification = justification.to_string();
        self
    }
}

/// Errors raised by tracking reconciliation
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TrackingError {
    #[error(
        "risk tracking references {} risk(s) not generated by this model: {}",
        .patterns.len(),
        .patterns.join(", ")
    )]
    Orphaned { patterns: Vec<String> },
}

/// Reconcile the model's tracking records against its generated risks and
/// write the resulting statuses onto those risks.
///
/// With `ignore_orphans` set, orphaned records are logged and otherwise
/// ignored.
pub fn reconcile_model(
    model: &mut ThreatModel,
    ignore_orphans: bool,
) -> Result<ReconcileReport, TrackingError> {
    let report = reconcile(
        &model.risk_tracking,
        model.generated_risks_by_synthetic_id().keys(),
    );
    if !report.orphans.is_empty() {
        if !ignore_orphans {
            return Err(TrackingError::Orphaned {
                patterns: report.orphans.clone(),
            });
        }
        for orphan in &report.orphans {
            warn!("Risk tracking for '{}' matches no generated risk", orphan);
        }
    }
    model.apply_tracking(&report.applied);
    Ok(report)
}
