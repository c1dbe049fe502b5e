//! Topology predicates shared by every boundary-sensitive rule
//!
//! All queries are total: a missing index entry means "no boundary" and is
//! answered permissively instead of failing. Parent walks are bounded by
//! the number of boundaries, so a malformed nesting cycle cannot hang them.

use std::collections::HashSet;

use super::store::ThreatModel;
use super::store_models::{CommunicationLink, TrustBoundary, TrustBoundaryType};

impl ThreatModel {
    /// Boundary directly listing the asset.
    pub fn direct_trust_boundary(&self, asset_id: &str) -> Option<&TrustBoundary> {
        self.index()
            .direct_boundary_id(asset_id)
            .and_then(|id| self.trust_boundary(id))
    }

    pub fn parent_trust_boundary(&self, boundary_id: &str) -> Option<&TrustBoundary> {
        self.index()
            .parent_boundary_id(boundary_id)
            .and_then(|id| self.trust_boundary(id))
    }

    /// The boundary itself if it is a network boundary, otherwise its
    /// closest network-kind ancestor.
    pub fn nearest_network_boundary<'a>(
        &'a self,
        boundary: &'a TrustBoundary,
    ) -> Option<&'a TrustBoundary> {
        let mut current = Some(boundary);
        let mut steps = 0;
        while let Some(b) = current {
            if b.boundary_type.is_network_boundary() {
                return Some(b);
            }
            steps += 1;
            if steps > self.trust_boundaries.len() {
                return None;
            }
            current = self.parent_trust_boundary(&b.id);
        }
        None
    }

    fn network_boundary_of(&self, asset_id: &str) -> Option<&TrustBoundary> {
        self.direct_trust_boundary(asset_id)
            .and_then(|b| self.nearest_network_boundary(b))
    }

    /// True only when both ends resolve to a network boundary and those
    /// boundaries differ.
    pub fn is_across_network_trust_boundary(&self, link: &CommunicationLink) -> bool {
        match (
            self.network_boundary_of(&link.source_id),
            self.network_boundary_of(&link.target_id),
        ) {
            (Some(source), Some(target)) => source.id != target.id,
            _ => false,
        }
    }

    pub fn is_same_execution_environment(&self, left_id: &str, right_id: &str) -> bool {
        match (
            self.direct_trust_boundary(left_id),
            self.direct_trust_boundary(right_id),
        ) {
            (None, None) => true,
            (Some(left), Some(right)) => {
                left.boundary_type == TrustBoundaryType::ExecutionEnvironment
                    && right.boundary_type == TrustBoundaryType::ExecutionEnvironment
                    && left.id == right.id
            }
            _ => false,
        }
    }

    pub fn is_same_trust_boundary_network_only(&self, left_id: &str, right_id: &str) -> bool {
        match (
            self.network_boundary_of(left_id),
            self.network_boundary_of(right_id),
        ) {
            (None, None) => true,
            (Some(left), Some(right)) => left.id == right.id,
            _ => false,
        }
    }

    /// The boundary itself followed by each ancestor, innermost first.
    pub fn all_parent_trust_boundary_ids(&self, boundary_id: &str) -> Vec<String> {
        let mut ids = Vec::new();
        let mut current = self.trust_boundary(boundary_id).map(|b| b.id.as_str());
        while let Some(id) = current {
            if ids.iter().any(|seen: &String| seen == id) {
                break;
            }
            ids.push(id.to_string());
            current = self.index().parent_boundary_id(id);
        }
        ids
    }

    /// Both unbounded, or the two boundary chains share at least one boundary.
    pub fn is_sharing_same_parent_trust_boundary(&self, left_id: &str, right_id: &str) -> bool {
        let index = self.index();
        match (
            index.direct_boundary_id(left_id),
            index.direct_boundary_id(right_id),
        ) {
            (None, None) => true,
            (Some(left), Some(right)) if left == right => true,
            (Some(left), Some(right)) => {
                let left_chain: HashSet<String> =
                    self.all_parent_trust_boundary_ids(left).into_iter().collect();
                self.all_parent_trust_boundary_ids(right)
                    .iter()
                    .any(|id| left_chain.contains(id))
            }
            _ => false,
        }
    }

    /// A link exists between the two assets in either direction.
    pub fn has_direct_connection(&self, left_id: &str, right_id: &str) -> bool {
        self.incoming_links(left_id)
            .iter()
            .any(|l| l.source_id == right_id)
            || self
                .incoming_links(right_id)
                .iter()
                .any(|l| l.source_id == left_id)
    }
}
