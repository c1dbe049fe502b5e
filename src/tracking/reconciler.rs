use super::RiskTracking;
use crate::models::SYNTHETIC_ID_DELIMITER;
use regex::Regex;
use serde::Serialize;
use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, warn};

/// Marks one or more non-delimiter characters in a tracking pattern.
pub const WILDCARD_MARKER: &str = "*";

/// Outcome of one reconciliation pass
#[derive(Debug, Clone, Default, Serialize)]
pub struct ReconcileReport {
    /// Lowercased finding ID -> tracking record applied to it
    pub applied: BTreeMap<String, RiskTracking>,
    /// Patterns that matched no generated risk
    pub orphans: Vec<String>,
    /// (pattern, finding ID) pairs skipped because an earlier record of the
    /// same kind already claimed the finding
    pub duplicates: Vec<(String, String)>,
}

/// Matcher for one wildcard pattern, alive for a single pass.
struct WildcardMatcher {
    regex: Regex,
}

impl WildcardMatcher {
    fn compile(pattern: &str) -> Result<Self, regex::Error> {
        let segment = format!("[^{}]+", regex::escape(SYNTHETIC_ID_DELIMITER));
        let body = regex::escape(&pattern.to_lowercase()).replace(r"\*", &segment);
        Ok(Self {
            regex: Regex::new(&format!("^{}$", body))?,
        })
    }

    fn is_match(&self, id: &str) -> bool {
        self.regex.is_match(id)
    }
}

fn applied_record(record: &RiskTracking, finding_id: &str) -> RiskTracking {
    RiskTracking {
        synthetic_risk_id: finding_id.to_string(),
        ..record.clone()
    }
}

/// Map tracking records onto generated synthetic IDs.
///
/// Exact records are applied first. Wildcard records then apply to every
/// matching ID that has no exact record; among wildcards the pattern that
/// sorts first wins. A record that matches no generated ID at all is
/// reported as an orphan.
pub fn reconcile<I, S>(tracking: &BTreeMap<String, RiskTracking>, generated_ids: I) -> ReconcileReport
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let generated: BTreeSet<String> = generated_ids
        .into_iter()
        .map(|id| id.as_ref().to_lowercase())
        .collect();
    let mut report = ReconcileReport::default();

    let (wildcards, exact): (Vec<_>, Vec<_>) = tracking
        .iter()
        .partition(|(pattern, _)| pattern.contains(WILDCARD_MARKER));

    for (pattern, record) in exact {
        let id = pattern.to_lowercase();
        if !generated.contains(&id) {
            report.orphans.push(pattern.clone());
            continue;
        }
        match report.applied.entry(id) {
            Entry::Vacant(slot) => {
                let record = applied_record(record, slot.key());
                slot.insert(record);
            }
            Entry::Occupied(slot) => {
                report.duplicates.push((pattern.clone(), slot.key().clone()));
            }
        }
    }

    let exactly_tracked: BTreeSet<String> = report.applied.keys().cloned().collect();

    for (pattern, record) in wildcards {
        let matcher = match WildcardMatcher::compile(pattern) {
            Ok(m) => m,
            Err(e) => {
                warn!("Unusable risk tracking pattern '{}': {}", pattern, e);
                report.orphans.push(pattern.clone());
                continue;
            }
        };
        let mut matched = 0usize;
        for id in generated.iter().filter(|id| matcher.is_match(id)) {
            matched += 1;
            if exactly_tracked.contains(id) {
                debug!("Exact tracking of '{}' takes precedence over '{}'", id, pattern);
                continue;
            }
            match report.applied.entry(id.clone()) {
                Entry::Vacant(slot) => {
                    slot.insert(applied_record(record, id));
                }
                Entry::Occupied(_) => {
                    report.duplicates.push((pattern.clone(), id.clone()));
                }
            }
        }
        debug!("Wildcard tracking '{}' matched {} risks", pattern, matched);
        if matched == 0 {
            report.orphans.push(pattern.clone());
        }
    }

    report.orphans.sort();
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RiskStatus;

    fn tracking(records: &[(&str, RiskStatus)]) -> BTreeMap<String, RiskTracking> {
        records
            .iter()
            .map(|(pattern, status)| (pattern.to_string(), RiskTracking::new(pattern, *status)))
            .collect()
    }

    #[test]
    fn test_wildcard_covers_one_segment() {
        let records = tracking(&[
            ("rule-x@*@assetA", RiskStatus::Accepted),
            ("rule-x@assetD@*", RiskStatus::Mitigated),
        ]);
        let report = reconcile(
            &records,
            ["rule-x@assetB@assetA", "rule-x@assetC@assetA", "rule-y@assetB@assetA"],
        );

        assert_eq!(report.applied.len(), 2);
        assert_eq!(report.applied["rule-x@assetb@asseta"].status, RiskStatus::Accepted);
        assert_eq!(report.applied["rule-x@assetc@asseta"].status, RiskStatus::Accepted);
        assert_eq!(
            report.applied["rule-x@assetc@asseta"].synthetic_risk_id,
            "rule-x@assetc@asseta"
        );
        assert_eq!(report.orphans, vec!["rule-x@assetD@*".to_string()]);
        assert!(report.duplicates.is_empty());
    }

    #[test]
    fn test_wildcard_does_not_cross_delimiter() {
        let records = tracking(&[("rule-x@*", RiskStatus::Mitigated)]);
        let report = reconcile(&records, ["rule-x@a@b"]);
        assert!(report.applied.is_empty());
        assert_eq!(report.orphans, vec!["rule-x@*".to_string()]);
    }

    #[test]
    fn test_exact_record_takes_precedence() {
        let records = tracking(&[
            ("rule-x@*@a", RiskStatus::Accepted),
            ("rule-x@b@a", RiskStatus::FalsePositive),
        ]);
        let report = reconcile(&records, ["rule-x@b@a", "rule-x@c@a"]);

        assert_eq!(report.applied["rule-x@b@a"].status, RiskStatus::FalsePositive);
        assert_eq!(report.applied["rule-x@c@a"].status, RiskStatus::Accepted);
        assert!(report.duplicates.is_empty());
        assert!(report.orphans.is_empty());
    }

    #[test]
    fn test_first_sorted_wildcard_wins() {
        let records = tracking(&[
            ("rule-x@b@*", RiskStatus::Mitigated),
            ("rule-x@*@a", RiskStatus::Accepted),
        ]);
        let report = reconcile(&records, ["rule-x@b@a"]);

        // "rule-x@*@a" sorts before "rule-x@b@*"
        assert_eq!(report.applied["rule-x@b@a"].status, RiskStatus::Accepted);
        assert_eq!(
            report.duplicates,
            vec![("rule-x@b@*".to_string(), "rule-x@b@a".to_string())]
        );
    }

    #[test]
    fn test_matching_is_case_insensitive() {
        let records = tracking(&[("Rule-X@AssetB", RiskStatus::InProgress)]);
        let report = reconcile(&records, ["rule-x@assetb"]);
        assert_eq!(report.applied["rule-x@assetb"].status, RiskStatus::InProgress);
    }

    #[test]
    fn test_regex_metacharacters_are_literal() {
        let records = tracking(&[("rule.x@*", RiskStatus::Mitigated)]);
        let report = reconcile(&records, ["rule-x@a"]);
        assert!(report.applied.is_empty());
        assert_eq!(report.orphans.len(), 1);
    }
}
