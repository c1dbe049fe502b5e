//! Unencrypted communication
//!
//! Links without transport encryption that carry sensitive data or
//! authentication material. Process-local protocols and links touching
//! monitoring/IDS/IPS assets are exempt.
//!
//! Synthetic ID: `category@link@source@target`

use crate::graph::{
    Authentication, Capability, CommunicationLink, Confidentiality, Criticality, DataAsset,
    TechnicalAsset, ThreatModel,
};
use crate::models::{
    synthetic_id, DataBreachProbability, ExploitationImpact, ExploitationLikelihood, Risk,
    RiskCategory, RiskFunction, Stride,
};
use crate::rules::base::RiskRule;
use anyhow::Result;

pub const CATEGORY_ID: &str = "unencrypted-communication";

fn is_high_sensitivity(data: &DataAsset) -> bool {
    data.confidentiality == Confidentiality::StrictlyConfidential
        || data.integrity == Criticality::MissionCritical
}

fn is_medium_sensitivity(data: &DataAsset) -> bool {
    data.confidentiality == Confidentiality::Confidential || data.integrity == Criticality::Critical
}

pub struct UnencryptedCommunicationRule;

impl UnencryptedCommunicationRule {
    pub fn new() -> Self {
        Self
    }

    /// Severity class of the link: `Some(true)` high, `Some(false)` medium.
    /// Sent data is inspected before received data; the first hit decides.
    fn classify(model: &ThreatModel, link: &CommunicationLink, carries_auth: bool) -> Option<bool> {
        let classify_list = |ids: &[String]| {
            ids.iter()
                .filter_map(|id| model.data_asset(id))
                .find_map(|data| {
                    if is_high_sensitivity(data) || carries_auth {
                        Some(true)
                    } else if !link.vpn && is_medium_sensitivity(data) {
                        Some(false)
                    } else {
                        None
                    }
                })
        };
        classify_list(&link.data_assets_sent).or_else(|| classify_list(&link.data_assets_received))
    }

    fn create_risk(
        model: &ThreatModel,
        source: &TechnicalAsset,
        target: &TechnicalAsset,
        link: &CommunicationLink,
        high: bool,
        carries_auth: bool,
    ) -> Risk {
        let impact = if high {
            ExploitationImpact::High
        } else {
            ExploitationImpact::Medium
        };
        let likelihood = if model.is_across_network_trust_boundary(link) {
            ExploitationLikelihood::Likely
        } else {
            ExploitationLikelihood::Unlikely
        };
        let mut title = format!(
            "Unencrypted Communication named {} between {} and {}",
            link.title, source.title, target.title
        );
        if carries_auth {
            title.push_str(" transferring authentication data");
        }
        if link.vpn {
            title.push_str(" (even VPN-protected links must encrypt highly sensitive data in transit)");
        }
        let mut risk = Risk::new(
            CATEGORY_ID,
            title,
            synthetic_id(CATEGORY_ID, &[&link.id, &source.id, &target.id]),
            likelihood,
            impact,
        );
        risk.most_relevant_technical_asset = Some(source.id.clone());
        risk.most_relevant_communication_link = Some(link.id.clone());
        risk.data_breach_probability = DataBreachProbability::Possible;
        risk.data_breach_technical_asset_ids = vec![target.id.clone()];
        risk
    }
}

impl Default for UnencryptedCommunicationRule {
    fn default() -> Self {
        Self::new()
    }
}

impl RiskRule for UnencryptedCommunicationRule {
    fn category(&self) -> RiskCategory {
        RiskCategory {
            id: CATEGORY_ID.to_string(),
            title: "Unencrypted Communication".to_string(),
            description: "Links transferring data with a high confidentiality or integrity rating \
                          must be encrypted."
                .to_string(),
            impact: "Network attackers might eavesdrop on sensitive data sent between components."
                .to_string(),
            asvs: "V9 - Communication Verification Requirements".to_string(),
            cheat_sheet:
                "https://cheatsheetseries.owasp.org/cheatsheets/Transport_Layer_Protection_Cheat_Sheet.html"
                    .to_string(),
            action: "Encryption of Communication Links".to_string(),
            mitigation: "Apply transport layer encryption to the link.".to_string(),
            check: "Is transport encryption applied to the link?".to_string(),
            detection_logic: "Unencrypted, non-process-local links of in-scope assets transferring \
                              sensitive data, excluding monitoring traffic."
                .to_string(),
            risk_assessment: "Medium or high impact depending on the sensitivity of the \
                              transferred data."
                .to_string(),
            false_positives: "All sensitive data on the link is already encrypted at document or \
                              data level."
                .to_string(),
            function: RiskFunction::Operations,
            stride: Stride::InformationDisclosure,
            model_failure_possible_reason: false,
            cwe: 319,
        }
    }

    fn generate(&self, model: &ThreatModel) -> Result<Vec<Risk>> {
        let mut risks = Vec::new();
        for source in model.technical_assets_sorted() {
            for link in &source.communication_links {
                let Some(target) = model.technical_asset(&link.target_id) else {
                    continue;
                };
                if source.out_of_scope && target.out_of_scope {
                    continue;
                }
                if link.protocol.is_encrypted()
                    || link.protocol.is_process_local()
                    || source
                        .technology
                        .has_capability(Capability::UnprotectedCommsTolerated)
                    || target
                        .technology
                        .has_capability(Capability::UnprotectedCommsTolerated)
                {
                    continue;
                }
                let carries_auth = link.authentication != Authentication::None;
                if let Some(high) = Self::classify(model, link, carries_auth) {
                    risks.push(Self::create_risk(model, source, target, link, high, carries_auth));
                }
            }
        }
        Ok(risks)
    }
}
