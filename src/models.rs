//! Core risk models for archrisk
//!
//! These types are shared by every rule, the tracking reconciler and the
//! reporters: severity computation, synthetic risk identities, risk
//! categories and the generated risks themselves.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Delimiter between the parts of a synthetic risk ID.
pub const SYNTHETIC_ID_DELIMITER: &str = "@";

/// Build the deterministic synthetic ID of a risk.
///
/// The category ID comes first, followed by the IDs of the model elements
/// that caused the risk in the order the rule documents. Identical inputs
/// always produce the identical string, which makes the ID usable as the
/// tracking handle across runs.
pub fn synthetic_id(category_id: &str, parts: &[&str]) -> String {
    let mut id = String::with_capacity(
        category_id.len() + parts.iter().map(|p| p.len() + 1).sum::<usize>(),
    );
    id.push_str(category_id);
    for part in parts {
        id.push_str(SYNTHETIC_ID_DELIMITER);
        id.push_str(part);
    }
    id
}

/// How likely an attacker can exploit a risk
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "kebab-case")]
pub enum ExploitationLikelihood {
    #[default]
    Unlikely,
    Likely,
    VeryLikely,
    Frequent,
}

impl ExploitationLikelihood {
    pub fn weight(self) -> u32 {
        match self {
            ExploitationLikelihood::Unlikely => 1,
            ExploitationLikelihood::Likely => 2,
            ExploitationLikelihood::VeryLikely => 3,
            ExploitationLikelihood::Frequent => 4,
        }
    }

    pub fn all() -> [ExploitationLikelihood; 4] {
        [
            ExploitationLikelihood::Unlikely,
            ExploitationLikelihood::Likely,
            ExploitationLikelihood::VeryLikely,
            ExploitationLikelihood::Frequent,
        ]
    }
}

impl std::fmt::Display for ExploitationLikelihood {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExploitationLikelihood::Unlikely => write!(f, "unlikely"),
            ExploitationLikelihood::Likely => write!(f, "likely"),
            ExploitationLikelihood::VeryLikely => write!(f, "very-likely"),
            ExploitationLikelihood::Frequent => write!(f, "frequent"),
        }
    }
}

/// Damage caused when a risk is exploited
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "kebab-case")]
pub enum ExploitationImpact {
    #[default]
    Low,
    Medium,
    High,
    VeryHigh,
}

impl ExploitationImpact {
    pub fn weight(self) -> u32 {
        match self {
            ExploitationImpact::Low => 1,
            ExploitationImpact::Medium => 2,
            ExploitationImpact::High => 3,
            ExploitationImpact::VeryHigh => 4,
        }
    }

    pub fn all() -> [ExploitationImpact; 4] {
        [
            ExploitationImpact::Low,
            ExploitationImpact::Medium,
            ExploitationImpact::High,
            ExploitationImpact::VeryHigh,
        ]
    }
}

impl std::fmt::Display for ExploitationImpact {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExploitationImpact::Low => write!(f, "low"),
            ExploitationImpact::Medium => write!(f, "medium"),
            ExploitationImpact::High => write!(f, "high"),
            ExploitationImpact::VeryHigh => write!(f, "very-high"),
        }
    }
}

/// Severity levels for risks
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    #[default]
    Low,
    Medium,
    Elevated,
    High,
    Critical,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Low => write!(f, "low"),
            Severity::Medium => write!(f, "medium"),
            Severity::Elevated => write!(f, "elevated"),
            Severity::High => write!(f, "high"),
            Severity::Critical => write!(f, "critical"),
        }
    }
}

impl std::str::FromStr for Severity {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "low" => Ok(Severity::Low),
            "medium" => Ok(Severity::Medium),
            "elevated" => Ok(Severity::Elevated),
            "high" => Ok(Severity::High),
            "critical" => Ok(Severity::Critical),
            _ => Err(anyhow::anyhow!(
                "Unknown severity '{}'. Valid values: low, medium, elevated, high, critical",
                s
            )),
        }
    }
}

/// Severity from the likelihood x impact matrix.
///
/// | product | severity |
/// |---------|----------|
/// | <= 1    | low      |
/// | <= 3    | medium   |
/// | <= 8    | elevated |
/// | <= 12   | high     |
/// | > 12    | critical |
pub fn calculate_severity(
    likelihood: ExploitationLikelihood,
    impact: ExploitationImpact,
) -> Severity {
    match likelihood.weight() * impact.weight() {
        0..=1 => Severity::Low,
        2..=3 => Severity::Medium,
        4..=8 => Severity::Elevated,
        9..=12 => Severity::High,
        _ => Severity::Critical,
    }
}

/// Probability that exploiting a risk leaks data
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "lowercase")]
pub enum DataBreachProbability {
    #[default]
    Improbable,
    Possible,
    Probable,
}

/// Human disposition of a risk
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "kebab-case")]
pub enum RiskStatus {
    #[default]
    Unchecked,
    InDiscussion,
    Accepted,
    InProgress,
    Mitigated,
    FalsePositive,
}

impl RiskStatus {
    /// Whether the risk still needs attention.
    pub fn is_still_at_risk(self) -> bool {
        matches!(
            self,
            RiskStatus::Unchecked
                | RiskStatus::InDiscussion
                | RiskStatus::Accepted
                | RiskStatus::InProgress
        )
    }
}

impl std::fmt::Display for RiskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RiskStatus::Unchecked => write!(f, "unchecked"),
            RiskStatus::InDiscussion => write!(f, "in-discussion"),
            RiskStatus::Accepted => write!(f, "accepted"),
            RiskStatus::InProgress => write!(f, "in-progress"),
            RiskStatus::Mitigated => write!(f, "mitigated"),
            RiskStatus::FalsePositive => write!(f, "false-positive"),
        }
    }
}

/// Which team function owns mitigation of a risk category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum RiskFunction {
    #[default]
    BusinessSide,
    Architecture,
    Development,
    Operations,
}

/// STRIDE classification of a risk category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum Stride {
    #[default]
    Spoofing,
    Tampering,
    Repudiation,
    InformationDisclosure,
    DenialOfService,
    ElevationOfPrivilege,
}

/// Static metadata of a rule. Narrative fields are only used for reporting.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct RiskCategory {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub impact: String,
    #[serde(default)]
    pub asvs: String,
    #[serde(default)]
    pub cheat_sheet: String,
    #[serde(default)]
    pub action: String,
    #[serde(default)]
    pub mitigation: String,
    #[serde(default)]
    pub check: String,
    #[serde(default)]
    pub detection_logic: String,
    #[serde(default)]
    pub risk_assessment: String,
    #[serde(default)]
    pub false_positives: String,
    #[serde(default)]
    pub function: RiskFunction,
    #[serde(default)]
    pub stride: Stride,
    #[serde(default)]
    pub model_failure_possible_reason: bool,
    #[serde(default)]
    pub cwe: u32,
}

/// A generated risk finding
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Risk {
    pub category_id: String,
    #[serde(default)]
    pub risk_status: RiskStatus,
    pub severity: Severity,
    pub exploitation_likelihood: ExploitationLikelihood,
    pub exploitation_impact: ExploitationImpact,
    pub title: String,
    pub synthetic_id: String,
    #[serde(default)]
    pub most_relevant_data_asset: Option<String>,
    #[serde(default)]
    pub most_relevant_technical_asset: Option<String>,
    #[serde(default)]
    pub most_relevant_trust_boundary: Option<String>,
    #[serde(default)]
    pub most_relevant_shared_runtime: Option<String>,
    #[serde(default)]
    pub most_relevant_communication_link: Option<String>,
    #[serde(default)]
    pub data_breach_probability: DataBreachProbability,
    #[serde(default)]
    pub data_breach_technical_asset_ids: Vec<String>,
}

impl Risk {
    /// Start a risk with severity derived from likelihood and impact.
    pub fn new(
        category_id: &str,
        title: impl Into<String>,
        synthetic_id: String,
        likelihood: ExploitationLikelihood,
        impact: ExploitationImpact,
    ) -> Self {
        Self {
            category_id: category_id.to_string(),
            severity: calculate_severity(likelihood, impact),
            exploitation_likelihood: likelihood,
            exploitation_impact: impact,
            title: title.into(),
            synthetic_id,
            ..Default::default()
        }
    }
}

/// Report ordering: most severe first, then status, impact, likelihood and title.
pub fn compare_risks(a: &Risk, b: &Risk) -> Ordering {
    b.severity
        .cmp(&a.severity)
        .then_with(|| a.risk_status.cmp(&b.risk_status))
        .then_with(|| b.exploitation_impact.cmp(&a.exploitation_impact))
        .then_with(|| b.exploitation_likelihood.cmp(&a.exploitation_likelihood))
        .then_with(|| a.title.cmp(&b.title))
        .then_with(|| a.synthetic_id.cmp(&b.synthetic_id))
}

pub fn sort_risks(risks: &mut [Risk]) {
    risks.sort_by(compare_risks);
}

/// Summary of risks by severity
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FindingsSummary {
    pub critical: usize,
    pub high: usize,
    pub elevated: usize,
    pub medium: usize,
    pub low: usize,
    pub total: usize,
    /// Risks whose status is still at risk
    pub still_at_risk: usize,
}

impl FindingsSummary {
    pub fn from_risks(risks: &[Risk]) -> Self {
        let mut summary = Self::default();
        for r in risks {
            match r.severity {
                Severity::Critical => summary.critical += 1,
                Severity::High => summary.high += 1,
                Severity::Elevated => summary.elevated += 1,
                Severity::Medium => summary.medium += 1,
                Severity::Low => summary.low += 1,
            }
            if r.risk_status.is_still_at_risk() {
                summary.still_at_risk += 1;
            }
            summary.total += 1;
        }
        summary
    }
}
