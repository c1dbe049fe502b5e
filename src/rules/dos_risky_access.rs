//! DoS-risky access across a network trust boundary
//!
//! Flags in-scope assets (other than load balancers) rated critical or
//! higher for availability that are reached over a network boundary.
//! When the direct caller only forwards traffic (load balancer, reverse
//! proxy, WAF), the caller's own callers are checked instead, one hop up.
//!
//! Synthetic ID: `category@asset@client@link`

use crate::graph::{Capability, CommunicationLink, Criticality, TechnicalAsset, Technology, ThreatModel, Usage};
use crate::models::{
    synthetic_id, ExploitationImpact, ExploitationLikelihood, Risk, RiskCategory, RiskFunction,
    Stride,
};
use crate::rules::base::RiskRule;
use anyhow::Result;

pub const CATEGORY_ID: &str = "dos-risky-access-across-trust-boundary";

pub struct DosRiskyAccessRule;

impl DosRiskyAccessRule {
    pub fn new() -> Self {
        Self
    }

    fn check(
        &self,
        model: &ThreatModel,
        asset: &TechnicalAsset,
        access: &CommunicationLink,
        hop_between: Option<&str>,
        risks: &mut Vec<Risk>,
    ) {
        if !model.is_across_network_trust_boundary(access)
            || access.protocol.is_process_local()
            || access.usage == Usage::Devops
        {
            return;
        }
        let Some(client) = model.technical_asset(&access.source_id) else {
            return;
        };
        let more_risky = asset.availability == Criticality::MissionCritical
            && !access.vpn
            && !access.ip_filtered
            && !asset.redundant;
        let impact = if more_risky {
            ExploitationImpact::Medium
        } else {
            ExploitationImpact::Low
        };
        let mut title = format!(
            "Denial-of-Service risky access of {} by {} via {}",
            asset.title, client.title, access.title
        );
        if let Some(hop) = hop_between {
            title.push_str(&format!(" forwarded via {}", hop));
        }
        let mut risk = Risk::new(
            CATEGORY_ID,
            title,
            synthetic_id(CATEGORY_ID, &[&asset.id, &client.id, &access.id]),
            ExploitationLikelihood::Unlikely,
            impact,
        );
        risk.most_relevant_technical_asset = Some(asset.id.clone());
        risk.most_relevant_communication_link = Some(access.id.clone());
        risks.push(risk);
    }
}

impl Default for DosRiskyAccessRule {
    fn default() -> Self {
        Self::new()
    }
}

impl RiskRule for DosRiskyAccessRule {
    fn category(&self) -> RiskCategory {
        RiskCategory {
            id: CATEGORY_ID.to_string(),
            title: "DoS-risky Access Across Trust-Boundary".to_string(),
            description: "Assets with critical or mission-critical availability that are reached \
                          across network trust boundaries are more exposed to denial-of-service."
                .to_string(),
            impact: "Attackers might disturb the availability of important parts of the system."
                .to_string(),
            asvs: "V1 - Architecture, Design and Threat Modeling Requirements".to_string(),
            cheat_sheet:
                "https://cheatsheetseries.owasp.org/cheatsheets/Denial_of_Service_Cheat_Sheet.html"
                    .to_string(),
            action: "Anti-DoS Measures".to_string(),
            mitigation: "Throttle clients and enforce per-client quotas. Put maintenance access \
                         behind a VPN. Run the target redundantly."
                .to_string(),
            check: "Are the anti-DoS measures of the linked cheat sheet applied?".to_string(),
            detection_logic: "In-scope assets (except load balancers) with availability of \
                              critical or higher and incoming non-devops links across a network \
                              trust boundary."
                .to_string(),
            risk_assessment: "Low impact by default. Medium when availability is mission-critical \
                              and neither VPN, IP filter nor redundancy is in place."
                .to_string(),
            false_positives: "Accessed operations that are neither time- nor resource-consuming."
                .to_string(),
            function: RiskFunction::Operations,
            stride: Stride::DenialOfService,
            model_failure_possible_reason: false,
            cwe: 400,
        }
    }

    fn generate(&self, model: &ThreatModel) -> Result<Vec<Risk>> {
        let mut risks = Vec::new();
        for asset in model.technical_assets_sorted() {
            if asset.out_of_scope
                || asset.technology == Technology::LoadBalancer
                || asset.availability < Criticality::Critical
            {
                continue;
            }
            for access in model.incoming_links(&asset.id) {
                let Some(source) = model.technical_asset(&access.source_id) else {
                    continue;
                };
                if source.technology.has_capability(Capability::TrafficForwarding) {
                    for callers_access in model.incoming_links(&source.id) {
                        self.check(model, asset, callers_access, Some(&source.title), &mut risks);
                    }
                } else {
                    self.check(model, asset, access, None, &mut risks);
                }
            }
        }
        Ok(risks)
    }
}
