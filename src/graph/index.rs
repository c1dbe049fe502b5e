//! Derived lookup structures, built once per model load

use std::collections::HashMap;
use tracing::debug;

use super::store::ThreatModel;
use super::store_models::CommunicationLink;

/// Fast lookups derived from the raw entity maps.
///
/// Rebuilt from scratch by [`ThreatModel::rebuild_index`]. A model without
/// boundaries simply yields empty maps.
#[derive(Debug, Clone, Default)]
pub struct TopologyIndex {
    /// Target asset ID -> links pointing at it, in source order
    incoming_links: HashMap<String, Vec<CommunicationLink>>,
    /// Asset ID -> ID of the boundary listing it in `technical_assets_inside`
    direct_boundary: HashMap<String, String>,
    /// Boundary ID -> ID of the boundary listing it in `trust_boundaries_nested`
    boundary_parent: HashMap<String, String>,
    /// Link ID -> link
    links_by_id: HashMap<String, CommunicationLink>,
}

impl TopologyIndex {
    pub fn build(model: &ThreatModel) -> Self {
        let mut index = TopologyIndex::default();

        // Sorted source traversal keeps each incoming list deterministic.
        for asset in model.technical_assets.values() {
            for link in &asset.communication_links {
                index
                    .incoming_links
                    .entry(link.target_id.clone())
                    .or_default()
                    .push(link.clone());
                index.links_by_id.insert(link.id.clone(), link.clone());
            }
        }

        for boundary in model.trust_boundaries.values() {
            for asset_id in &boundary.technical_assets_inside {
                index
                    .direct_boundary
                    .entry(asset_id.clone())
                    .or_insert_with(|| boundary.id.clone());
            }
            for nested_id in &boundary.trust_boundaries_nested {
                index
                    .boundary_parent
                    .entry(nested_id.clone())
                    .or_insert_with(|| boundary.id.clone());
            }
        }

        debug!(
            "Built topology index: {} link targets, {} bounded assets, {} nested boundaries",
            index.incoming_links.len(),
            index.direct_boundary.len(),
            index.boundary_parent.len()
        );
        index
    }

    /// Links whose target is `asset_id`.
    pub fn incoming_links(&self, asset_id: &str) -> &[CommunicationLink] {
        self.incoming_links
            .get(asset_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn direct_boundary_id(&self, asset_id: &str) -> Option<&str> {
        self.direct_boundary.get(asset_id).map(String::as_str)
    }

    pub fn parent_boundary_id(&self, boundary_id: &str) -> Option<&str> {
        self.boundary_parent.get(boundary_id).map(String::as_str)
    }

    pub fn link(&self, link_id: &str) -> Option<&CommunicationLink> {
        self.links_by_id.get(link_id)
    }
}
