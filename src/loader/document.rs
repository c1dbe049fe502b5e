//! Serde shape of a model document
//!
//! Entities are keyed by title and carry their ID as a field, links are
//! nested under their source asset and keyed by link title.

use crate::graph::{
    Authentication, Authorization, CommunicationLink, Confidentiality, Criticality, DataAsset,
    DataFormat, EncryptionStyle, Machine, Protocol, Quantity, SharedRuntime, Size, TechnicalAsset,
    TechnicalAssetType, Technology, TrustBoundary, TrustBoundaryType, Usage,
};
use crate::tracking::RiskTracking;
use serde::Deserialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ModelDocument {
    pub title: String,
    pub tags_available: Vec<String>,
    pub data_assets: BTreeMap<String, DataAssetDocument>,
    pub technical_assets: BTreeMap<String, TechnicalAssetDocument>,
    pub trust_boundaries: BTreeMap<String, TrustBoundaryDocument>,
    pub shared_runtimes: BTreeMap<String, SharedRuntimeDocument>,
    /// Synthetic ID pattern -> tracking record
    pub risk_tracking: BTreeMap<String, RiskTracking>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DataAssetDocument {
    pub id: String,
    pub description: String,
    pub usage: Usage,
    pub tags: Vec<String>,
    pub origin: String,
    pub owner: String,
    pub quantity: Quantity,
    pub confidentiality: Confidentiality,
    pub integrity: Criticality,
    pub availability: Criticality,
    pub justification_cia_rating: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TechnicalAssetDocument {
    pub id: String,
    pub description: String,
    #[serde(rename = "type")]
    pub asset_type: TechnicalAssetType,
    pub usage: Usage,
    pub out_of_scope: bool,
    pub justification_out_of_scope: String,
    pub size: Size,
    pub technology: Technology,
    pub tags: Vec<String>,
    pub internet: bool,
    pub machine: Machine,
    pub encryption: EncryptionStyle,
    pub owner: String,
    pub confidentiality: Confidentiality,
    pub integrity: Criticality,
    pub availability: Criticality,
    pub justification_cia_rating: String,
    pub multi_tenant: bool,
    pub redundant: bool,
    pub custom_developed_parts: bool,
    pub data_assets_processed: Vec<String>,
    pub data_assets_stored: Vec<String>,
    pub data_formats_accepted: Vec<DataFormat>,
    pub communication_links: BTreeMap<String, CommunicationLinkDocument>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CommunicationLinkDocument {
    pub target: String,
    pub description: String,
    pub protocol: Protocol,
    pub authentication: Authentication,
    pub authorization: Authorization,
    pub tags: Vec<String>,
    pub vpn: bool,
    pub ip_filtered: bool,
    pub readonly: bool,
    pub usage: Usage,
    pub data_assets_sent: Vec<String>,
    pub data_assets_received: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TrustBoundaryDocument {
    pub id: String,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "type")]
    pub boundary_type: TrustBoundaryType,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub technical_assets_inside: Vec<String>,
    #[serde(default)]
    pub trust_boundaries_nested: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SharedRuntimeDocument {
    pub id: String,
    pub description: String,
    pub tags: Vec<String>,
    pub technical_assets_running: Vec<String>,
}

impl DataAssetDocument {
    pub(super) fn into_entity(self, title: String) -> DataAsset {
        DataAsset {
            id: self.id,
            title,
            description: self.description,
            usage: self.usage,
            tags: self.tags,
            origin: self.origin,
            owner: self.owner,
            quantity: self.quantity,
            confidentiality: self.confidentiality,
            integrity: self.integrity,
            availability: self.availability,
            justification_cia_rating: self.justification_cia_rating,
        }
    }
}

impl CommunicationLinkDocument {
    pub(super) fn into_entity(self, source_id: &str, title: String) -> CommunicationLink {
        CommunicationLink {
            id: CommunicationLink::link_id(source_id, &title),
            source_id: source_id.to_string(),
            target_id: self.target,
            title,
            description: self.description,
            protocol: self.protocol,
            tags: self.tags,
            vpn: self.vpn,
            ip_filtered: self.ip_filtered,
            readonly: self.readonly,
            authentication: self.authentication,
            authorization: self.authorization,
            usage: self.usage,
            data_assets_sent: self.data_assets_sent,
            data_assets_received: self.data_assets_received,
        }
    }
}

impl TechnicalAssetDocument {
    pub(super) fn into_entity(self, title: String) -> TechnicalAsset {
        let id = self.id;
        let communication_links = self
            .communication_links
            .into_iter()
            .map(|(link_title, link)| link.into_entity(&id, link_title))
            .collect();
        TechnicalAsset {
            id,
            title,
            description: self.description,
            usage: self.usage,
            asset_type: self.asset_type,
            size: self.size,
            technology: self.technology,
            machine: self.machine,
            internet: self.internet,
            multi_tenant: self.multi_tenant,
            redundant: self.redundant,
            custom_developed_parts: self.custom_developed_parts,
            out_of_scope: self.out_of_scope,
            justification_out_of_scope: self.justification_out_of_scope,
            owner: self.owner,
            confidentiality: self.confidentiality,
            integrity: self.integrity,
            availability: self.availability,
            justification_cia_rating: self.justification_cia_rating,
            encryption: self.encryption,
            data_formats_accepted: self.data_formats_accepted,
            tags: self.tags,
            data_assets_processed: self.data_assets_processed,
            data_assets_stored: self.data_assets_stored,
            communication_links,
            raa: 0.0,
        }
    }
}

impl TrustBoundaryDocument {
    pub(super) fn into_entity(self, title: String) -> TrustBoundary {
        TrustBoundary {
            id: self.id,
            title,
            description: self.description,
            boundary_type: self.boundary_type,
            tags: self.tags,
            technical_assets_inside: self.technical_assets_inside,
            trust_boundaries_nested: self.trust_boundaries_nested,
        }
    }
}

impl SharedRuntimeDocument {
    pub(super) fn into_entity(self, title: String) -> SharedRuntime {
        SharedRuntime {
            id: self.id,
            title,
            description: self.description,
            tags: self.tags,
            technical_assets_running: self.technical_assets_running,
        }
    }
}
