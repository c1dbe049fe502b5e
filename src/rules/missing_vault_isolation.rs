//! Missing vault isolation
//!
//! A vault should sit in its own network segment. Any non-vault asset that
//! is not the vault's own storage and shares the vault's execution
//! environment (likely) or network segment (unlikely) triggers one risk per
//! vault.
//!
//! Synthetic ID: `category@vault`

use crate::graph::{Confidentiality, Criticality, TechnicalAsset, Technology, ThreatModel};
use crate::models::{
    synthetic_id, ExploitationImpact, ExploitationLikelihood, Risk, RiskCategory, RiskFunction,
    Stride,
};
use crate::rules::base::RiskRule;
use anyhow::Result;

pub const CATEGORY_ID: &str = "missing-vault-isolation";

pub struct MissingVaultIsolationRule;

impl MissingVaultIsolationRule {
    pub fn new() -> Self {
        Self
    }

    fn is_vault_storage(model: &ThreatModel, vault: &TechnicalAsset, candidate: &TechnicalAsset) -> bool {
        candidate.is_datastore() && model.has_direct_connection(&vault.id, &candidate.id)
    }
}

impl Default for MissingVaultIsolationRule {
    fn default() -> Self {
        Self::new()
    }
}

impl RiskRule for MissingVaultIsolationRule {
    fn category(&self) -> RiskCategory {
        RiskCategory {
            id: CATEGORY_ID.to_string(),
            title: "Missing Vault Isolation".to_string(),
            description: "Vaults and their datastores should be isolated from other assets by a \
                          dedicated network trust boundary. Execution-environment boundaries do \
                          not count as network isolation."
                .to_string(),
            impact: "Attackers compromising a neighbouring component get an easy path to the \
                     vault."
                .to_string(),
            asvs: "V1 - Architecture, Design and Threat Modeling Requirements".to_string(),
            cheat_sheet:
                "https://cheatsheetseries.owasp.org/cheatsheets/Attack_Surface_Analysis_Cheat_Sheet.html"
                    .to_string(),
            action: "Network Segmentation".to_string(),
            mitigation: "Put the vault and its datastores behind their own network segmentation \
                         trust boundary."
                .to_string(),
            check: "Is the vault network-segmented from unrelated assets?".to_string(),
            detection_logic: "In-scope vaults sharing a network segment or execution environment \
                              with assets that are neither vaults nor the vault's storage."
                .to_string(),
            risk_assessment: "Medium impact by default, high when the vault is strictly \
                              confidential or mission-critical."
                .to_string(),
            false_positives: "Every neighbour is hardened as if it were a vault itself.".to_string(),
            function: RiskFunction::Operations,
            stride: Stride::ElevationOfPrivilege,
            model_failure_possible_reason: false,
            cwe: 1008,
        }
    }

    fn generate(&self, model: &ThreatModel) -> Result<Vec<Risk>> {
        let mut risks = Vec::new();
        for vault in model.technical_assets_sorted() {
            if vault.out_of_scope || vault.technology != Technology::Vault {
                continue;
            }
            let mut same_execution_env = false;
            let mut exposed = false;
            for candidate in model.technical_assets_sorted() {
                if candidate.id == vault.id
                    || candidate.technology == Technology::Vault
                    || Self::is_vault_storage(model, vault, candidate)
                {
                    continue;
                }
                if model.is_same_execution_environment(&vault.id, &candidate.id) {
                    exposed = true;
                    same_execution_env = true;
                } else if model.is_same_trust_boundary_network_only(&vault.id, &candidate.id) {
                    exposed = true;
                }
            }
            if !exposed {
                continue;
            }

            let more_impact = vault.confidentiality == Confidentiality::StrictlyConfidential
                || vault.integrity == Criticality::MissionCritical
                || vault.availability == Criticality::MissionCritical;
            let impact = if more_impact {
                ExploitationImpact::High
            } else {
                ExploitationImpact::Medium
            };
            let (likelihood, neighbours) = if same_execution_env {
                (ExploitationLikelihood::Likely, "in the same execution environment")
            } else {
                (ExploitationLikelihood::Unlikely, "in the same network segment")
            };
            let mut risk = Risk::new(
                CATEGORY_ID,
                format!(
                    "Missing Vault Isolation of {} against unrelated lower protected assets {}",
                    vault.title, neighbours
                ),
                synthetic_id(CATEGORY_ID, &[&vault.id]),
                likelihood,
                impact,
            );
            risk.most_relevant_technical_asset = Some(vault.id.clone());
            risk.data_breach_technical_asset_ids = vec![vault.id.clone()];
            risks.push(risk);
        }
        Ok(risks)
    }
}
