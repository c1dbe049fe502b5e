//! Missing web application firewall
//!
//! Web applications and services reached over a web protocol across a
//! network boundary should have a WAF in front of them.
//!
//! Synthetic ID: `category@asset`

use crate::graph::{Capability, Confidentiality, Criticality, Technology, ThreatModel};
use crate::models::{
    synthetic_id, ExploitationImpact, ExploitationLikelihood, Risk, RiskCategory, RiskFunction,
    Stride,
};
use crate::rules::base::RiskRule;
use anyhow::Result;

pub const CATEGORY_ID: &str = "missing-waf";

pub struct MissingWafRule;

impl MissingWafRule {
    pub fn new() -> Self {
        Self
    }
}

impl Default for MissingWafRule {
    fn default() -> Self {
        Self::new()
    }
}

impl RiskRule for MissingWafRule {
    fn category(&self) -> RiskCategory {
        RiskCategory {
            id: CATEGORY_ID.to_string(),
            title: "Missing Web Application Firewall (WAF)".to_string(),
            description: "Web applications and services accessed across a network trust boundary \
                          should be protected by a web application firewall."
                .to_string(),
            impact: "Attackers might be able to apply standard attack payloads against the \
                     unfiltered web endpoints."
                .to_string(),
            asvs: "V1 - Architecture, Design and Threat Modeling Requirements".to_string(),
            cheat_sheet:
                "https://cheatsheetseries.owasp.org/cheatsheets/Virtual_Patching_Cheat_Sheet.html"
                    .to_string(),
            action: "Web Application Firewall (WAF)".to_string(),
            mitigation: "Place a WAF in front of the web endpoints and keep its rules up to date."
                .to_string(),
            check: "Is a WAF in place in front of the web endpoints?".to_string(),
            detection_logic: "In-scope web applications or services reached via a web protocol \
                              across a network trust boundary without a WAF in between."
                .to_string(),
            risk_assessment: "Low impact by default, medium when the processed data is strictly \
                              confidential or mission-critical."
                .to_string(),
            false_positives: "Targets only accessible by trusted internal clients.".to_string(),
            function: RiskFunction::Operations,
            stride: Stride::Tampering,
            model_failure_possible_reason: false,
            cwe: 1008,
        }
    }

    fn generate(&self, model: &ThreatModel) -> Result<Vec<Risk>> {
        let mut risks = Vec::new();
        for asset in model.technical_assets_sorted() {
            if asset.out_of_scope
                || !(asset.technology.has_capability(Capability::WebApplication)
                    || asset.technology.has_capability(Capability::WebService))
            {
                continue;
            }
            let unfiltered = model.incoming_links(&asset.id).iter().any(|link| {
                model.is_across_network_trust_boundary(link)
                    && link.protocol.is_potential_web_access_protocol()
                    && model
                        .technical_asset(&link.source_id)
                        .is_some_and(|source| source.technology != Technology::Waf)
            });
            if !unfiltered {
                continue;
            }

            let more_risky = model.highest_confidentiality(asset)
                == Confidentiality::StrictlyConfidential
                || model.highest_integrity(asset) == Criticality::MissionCritical
                || model.highest_availability(asset) == Criticality::MissionCritical;
            let impact = if more_risky {
                ExploitationImpact::Medium
            } else {
                ExploitationImpact::Low
            };
            let mut risk = Risk::new(
                CATEGORY_ID,
                format!("Missing Web Application Firewall (WAF) risk at {}", asset.title),
                synthetic_id(CATEGORY_ID, &[&asset.id]),
                ExploitationLikelihood::Unlikely,
                impact,
            );
            risk.most_relevant_technical_asset = Some(asset.id.clone());
            risk.data_breach_technical_asset_ids = vec![asset.id.clone()];
            risks.push(risk);
        }
        Ok(risks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{CommunicationLink, Protocol, TechnicalAsset, TrustBoundary, TrustBoundaryType};

    fn model(entry: Technology) -> ThreatModel {
        ThreatModel::new("t")
            .with_asset(
                TechnicalAsset::new("entry", entry)
                    .with_link(CommunicationLink::new("entry", "Web", "shop", Protocol::Https)),
            )
            .with_asset(TechnicalAsset::new("shop", Technology::WebApplication))
            .with_boundary(TrustBoundary::new("internet", TrustBoundaryType::NetworkOnPrem).with_assets(&["entry"]))
            .with_boundary(TrustBoundary::new("dmz", TrustBoundaryType::NetworkOnPrem).with_assets(&["shop"]))
            .indexed()
    }

    #[test]
    fn test_unfiltered_web_access() {
        let risks = MissingWafRule::new()
            .generate(&model(Technology::Browser))
            .expect("generate");
        assert_eq!(risks.len(), 1);
        assert_eq!(risks[0].synthetic_id, "missing-waf@shop");
        assert_eq!(risks[0].exploitation_impact, ExploitationImpact::Low);
    }

    #[test]
    fn test_waf_in_front_is_fine() {
        assert!(MissingWafRule::new()
            .generate(&model(Technology::Waf))
            .expect("generate")
            .is_empty());
    }
}
