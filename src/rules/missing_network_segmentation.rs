//! Missing network segmentation
//!
//! Sensitive, attacker-attractive assets should not share a network
//! segment with less protected assets they never talk to.
//!
//! Synthetic ID: `category@asset`

use crate::graph::{Capability, Confidentiality, Criticality, TechnicalAsset, Technology, ThreatModel};
use crate::models::{
    synthetic_id, ExploitationImpact, ExploitationLikelihood, Risk, RiskCategory, RiskFunction,
    Stride,
};
use crate::rules::base::RiskRule;
use anyhow::Result;

pub const CATEGORY_ID: &str = "missing-network-segmentation";

/// Minimum RAA for an asset to be considered
pub const DEFAULT_RAA_LIMIT: f64 = 50.0;

pub struct MissingNetworkSegmentationRule {
    raa_limit: f64,
}

impl MissingNetworkSegmentationRule {
    pub fn new() -> Self {
        Self {
            raa_limit: DEFAULT_RAA_LIMIT,
        }
    }

    pub fn with_raa_limit(raa_limit: f64) -> Self {
        Self { raa_limit }
    }

    fn is_candidate(&self, asset: &TechnicalAsset) -> bool {
        let excluded_technology = matches!(
            asset.technology,
            Technology::ReverseProxy
                | Technology::Waf
                | Technology::Ids
                | Technology::Ips
                | Technology::ServiceRegistry
        );
        !asset.out_of_scope
            && !excluded_technology
            && asset.raa >= self.raa_limit
            && (asset.is_datastore()
                || asset.confidentiality >= Confidentiality::Confidential
                || asset.integrity >= Criticality::Critical
                || asset.availability >= Criticality::Critical)
    }
}

impl Default for MissingNetworkSegmentationRule {
    fn default() -> Self {
        Self::new()
    }
}

impl RiskRule for MissingNetworkSegmentationRule {
    fn category(&self) -> RiskCategory {
        RiskCategory {
            id: CATEGORY_ID.to_string(),
            title: "Missing Network Segmentation".to_string(),
            description: "Highly sensitive assets and datastores sharing a network segment with \
                          lower protected assets should get their own segmentation boundary."
                .to_string(),
            impact: "Attackers compromising a weaker neighbour get an easy path to more valuable \
                     targets."
                .to_string(),
            asvs: "V1 - Architecture, Design and Threat Modeling Requirements".to_string(),
            cheat_sheet:
                "https://cheatsheetseries.owasp.org/cheatsheets/Attack_Surface_Analysis_Cheat_Sheet.html"
                    .to_string(),
            action: "Network Segmentation".to_string(),
            mitigation: "Put the sensitive assets behind a network segmentation trust boundary."
                .to_string(),
            check: "Are sensitive assets network-segmented from unrelated weaker assets?"
                .to_string(),
            detection_logic: "In-scope sensitive assets or datastores with high RAA sharing a \
                              network segment with less protected asset types they have no direct \
                              connection to."
                .to_string(),
            risk_assessment: "Low impact by default, medium when the asset is strictly \
                              confidential or mission-critical."
                .to_string(),
            false_positives: "Every asset in the segment is hardened to the level of the most \
                              sensitive one."
                .to_string(),
            function: RiskFunction::Operations,
            stride: Stride::ElevationOfPrivilege,
            model_failure_possible_reason: false,
            cwe: 1008,
        }
    }

    fn generate(&self, model: &ThreatModel) -> Result<Vec<Risk>> {
        let mut risks = Vec::new();
        for asset in model.technical_assets_sorted() {
            if !self.is_candidate(asset) {
                continue;
            }
            let has_weak_neighbour = model.technical_assets_sorted().any(|other| {
                other.id != asset.id
                    && other.technology.has_capability(Capability::LessProtectedType)
                    && !other
                        .technology
                        .has_capability(Capability::CloseToHighValueTargetsTolerated)
                    && model.is_same_trust_boundary_network_only(&asset.id, &other.id)
                    && !model.has_direct_connection(&asset.id, &other.id)
            });
            if !has_weak_neighbour {
                continue;
            }

            let more_risky = asset.confidentiality == Confidentiality::StrictlyConfidential
                || asset.integrity == Criticality::MissionCritical
                || asset.availability == Criticality::MissionCritical;
            let impact = if more_risky {
                ExploitationImpact::Medium
            } else {
                ExploitationImpact::Low
            };
            let mut risk = Risk::new(
                CATEGORY_ID,
                format!(
                    "Missing Network Segmentation of {} against unrelated lower protected assets \
                     in the same network segment",
                    asset.title
                ),
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
