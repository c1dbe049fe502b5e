//! Unguarded direct datastore access
//!
//! Sensitive datastores reached directly across a network boundary by
//! assets that do not share a parent boundary with them.
//!
//! Synthetic ID: `category@link@source@datastore`

use crate::graph::{
    CommunicationLink, Confidentiality, Criticality, Protocol, TechnicalAsset, Technology,
    ThreatModel, Usage,
};
use crate::models::{
    synthetic_id, DataBreachProbability, ExploitationImpact, ExploitationLikelihood, Risk,
    RiskCategory, RiskFunction, Stride,
};
use crate::rules::base::RiskRule;
use anyhow::Result;

pub const CATEGORY_ID: &str = "unguarded-direct-datastore-access";

/// Datastores above this RAA get medium impact regardless of their ratings
const RAA_MEDIUM_IMPACT_THRESHOLD: f64 = 40.0;

pub struct UnguardedDatastoreAccessRule;

impl UnguardedDatastoreAccessRule {
    pub fn new() -> Self {
        Self
    }

    fn is_identity_store_lookup(datastore: &TechnicalAsset, source: &TechnicalAsset) -> bool {
        matches!(
            datastore.technology,
            Technology::IdentityStoreLdap | Technology::IdentityStoreDatabase
        ) && source.technology == Technology::IdentityProvider
    }

    fn is_file_transfer(datastore: &TechnicalAsset, link: &CommunicationLink) -> bool {
        datastore.technology == Technology::FileServer
            && matches!(link.protocol, Protocol::Ftp | Protocol::Ftps | Protocol::Sftp)
    }
}

impl Default for UnguardedDatastoreAccessRule {
    fn default() -> Self {
        Self::new()
    }
}

impl RiskRule for UnguardedDatastoreAccessRule {
    fn category(&self) -> RiskCategory {
        RiskCategory {
            id: CATEGORY_ID.to_string(),
            title: "Unguarded Direct Datastore Access".to_string(),
            description: "Datastores accessed across trust boundaries must be guarded by a \
                          protecting service or application."
                .to_string(),
            impact: "Attackers might directly attack sensitive datastores without passing any \
                     protecting component."
                .to_string(),
            asvs: "V1 - Architecture, Design and Threat Modeling Requirements".to_string(),
            cheat_sheet:
                "https://cheatsheetseries.owasp.org/cheatsheets/Attack_Surface_Analysis_Cheat_Sheet.html"
                    .to_string(),
            action: "Encapsulation of Datastore".to_string(),
            mitigation: "Encapsulate the datastore access behind a guarding service or \
                         application."
                .to_string(),
            check: "Are the datastores only reachable through a guarding component?".to_string(),
            detection_logic: "In-scope sensitive datastores accessed directly across a network \
                              trust boundary by assets outside their parent boundary."
                .to_string(),
            risk_assessment: "Low impact by default, medium for strictly confidential or \
                              mission-critical datastores or datastores with a high RAA."
                .to_string(),
            false_positives: "Accesses by vendor products or identity providers that legitimately \
                              connect to their own stores."
                .to_string(),
            function: RiskFunction::Architecture,
            stride: Stride::ElevationOfPrivilege,
            model_failure_possible_reason: false,
            cwe: 501,
        }
    }

    fn generate(&self, model: &ThreatModel) -> Result<Vec<Risk>> {
        let mut risks = Vec::new();
        for datastore in model.technical_assets_sorted() {
            if datastore.out_of_scope || !datastore.is_datastore() {
                continue;
            }
            for link in model.incoming_links(&datastore.id) {
                let Some(source) = model.technical_asset(&link.source_id) else {
                    continue;
                };
                if Self::is_identity_store_lookup(datastore, source) {
                    continue;
                }
                if datastore.confidentiality < Confidentiality::Confidential
                    && datastore.integrity < Criticality::Critical
                {
                    continue;
                }
                if !model.is_across_network_trust_boundary(link)
                    || Self::is_file_transfer(datastore, link)
                    || link.usage == Usage::Devops
                    || model.is_sharing_same_parent_trust_boundary(&source.id, &datastore.id)
                {
                    continue;
                }

                let more_risky = datastore.confidentiality == Confidentiality::StrictlyConfidential
                    || datastore.integrity == Criticality::MissionCritical
                    || datastore.raa > RAA_MEDIUM_IMPACT_THRESHOLD;
                let impact = if more_risky {
                    ExploitationImpact::Medium
                } else {
                    ExploitationImpact::Low
                };
                let mut risk = Risk::new(
                    CATEGORY_ID,
                    format!(
                        "Unguarded Direct Datastore Access of {} by {} via {}",
                        datastore.title, source.title, link.title
                    ),
                    synthetic_id(CATEGORY_ID, &[&link.id, &source.id, &datastore.id]),
                    ExploitationLikelihood::Likely,
                    impact,
                );
                risk.most_relevant_technical_asset = Some(datastore.id.clone());
                risk.most_relevant_communication_link = Some(link.id.clone());
                risk.data_breach_probability = DataBreachProbability::Improbable;
                risk.data_breach_technical_asset_ids = vec![datastore.id.clone()];
                risks.push(risk);
            }
        }
        Ok(risks)
    }
}
