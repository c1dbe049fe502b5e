//! The aggregate model of one analysis run

use std::collections::BTreeMap;

use super::index::TopologyIndex;
use super::store_models::{
    CommunicationLink, Confidentiality, Criticality, DataAsset, SharedRuntime, TechnicalAsset,
    TrustBoundary,
};
use crate::models::Risk;
use crate::tracking::RiskTracking;

/// Owns every entity of a model plus the indices and generated risks
/// derived from it.
///
/// Maps are keyed by ID and ordered, so plain iteration is the sorted-ID
/// traversal rules rely on for deterministic synthetic IDs.
#[derive(Debug, Clone, Default)]
pub struct ThreatModel {
    pub title: String,
    pub technical_assets: BTreeMap<String, TechnicalAsset>,
    pub data_assets: BTreeMap<String, DataAsset>,
    pub trust_boundaries: BTreeMap<String, TrustBoundary>,
    pub shared_runtimes: BTreeMap<String, SharedRuntime>,
    pub tags_available: Vec<String>,
    /// Tracking records keyed by synthetic ID pattern
    pub risk_tracking: BTreeMap<String, RiskTracking>,
    index: TopologyIndex,
    generated_risks_by_category: BTreeMap<String, Vec<Risk>>,
    /// Keyed by lowercased synthetic ID
    generated_risks_by_synthetic_id: BTreeMap<String, Risk>,
}

impl ThreatModel {
    pub fn new(title: &str) -> Self {
        Self {
            title: title.to_string(),
            ..Default::default()
        }
    }

    pub fn with_asset(mut self, asset: TechnicalAsset) -> Self {
        self.technical_assets.insert(asset.id.clone(), asset);
        self
    }

    pub fn with_data(mut self, data: DataAsset) -> Self {
        self.data_assets.insert(data.id.clone(), data);
        self
    }

    pub fn with_boundary(mut self, boundary: TrustBoundary) -> Self {
        self.trust_boundaries.insert(boundary.id.clone(), boundary);
        self
    }

    pub fn with_runtime(mut self, runtime: SharedRuntime) -> Self {
        self.shared_runtimes.insert(runtime.id.clone(), runtime);
        self
    }

    pub fn with_tracking(mut self, tracking: RiskTracking) -> Self {
        self.risk_tracking
            .insert(tracking.synthetic_risk_id.clone(), tracking);
        self
    }

    /// Finish construction by building the topology index.
    pub fn indexed(mut self) -> Self {
        self.rebuild_index();
        self
    }

    pub fn rebuild_index(&mut self) {
        self.index = TopologyIndex::build(self);
    }

    pub fn index(&self) -> &TopologyIndex {
        &self.index
    }

    pub fn technical_asset(&self, id: &str) -> Option<&TechnicalAsset> {
        self.technical_assets.get(id)
    }

    pub fn data_asset(&self, id: &str) -> Option<&DataAsset> {
        self.data_assets.get(id)
    }

    pub fn trust_boundary(&self, id: &str) -> Option<&TrustBoundary> {
        self.trust_boundaries.get(id)
    }

    pub fn shared_runtime(&self, id: &str) -> Option<&SharedRuntime> {
        self.shared_runtimes.get(id)
    }

    pub fn communication_link(&self, id: &str) -> Option<&CommunicationLink> {
        self.index.link(id)
    }

    /// Technical assets in ascending ID order.
    pub fn technical_assets_sorted(&self) -> impl Iterator<Item = &TechnicalAsset> {
        self.technical_assets.values()
    }

    pub fn incoming_links(&self, asset_id: &str) -> &[CommunicationLink] {
        self.index.incoming_links(asset_id)
    }

    fn processed_and_stored<'a>(
        &'a self,
        asset: &'a TechnicalAsset,
    ) -> impl Iterator<Item = &'a DataAsset> + 'a {
        asset
            .data_assets_processed
            .iter()
            .chain(asset.data_assets_stored.iter())
            .filter_map(move |id| self.data_asset(id))
    }

    /// Highest of the asset's own rating and its processed or stored data.
    pub fn highest_confidentiality(&self, asset: &TechnicalAsset) -> Confidentiality {
        self.processed_and_stored(asset)
            .map(|d| d.confidentiality)
            .fold(asset.confidentiality, std::cmp::max)
    }

    pub fn highest_integrity(&self, asset: &TechnicalAsset) -> Criticality {
        self.processed_and_stored(asset)
            .map(|d| d.integrity)
            .fold(asset.integrity, std::cmp::max)
    }

    pub fn highest_availability(&self, asset: &TechnicalAsset) -> Criticality {
        self.processed_and_stored(asset)
            .map(|d| d.availability)
            .fold(asset.availability, std::cmp::max)
    }

    /// Write the RAA scores back onto the assets.
    pub fn apply_raa(&mut self, scores: &BTreeMap<String, f64>) {
        for (id, asset) in self.technical_assets.iter_mut() {
            if let Some(score) = scores.get(id) {
                asset.raa = *score;
            }
        }
    }

    /// Store the risks produced by rule evaluation.
    pub fn set_generated_risks(&mut self, risks: Vec<Risk>) {
        self.generated_risks_by_category.clear();
        self.generated_risks_by_synthetic_id.clear();
        for risk in risks {
            self.generated_risks_by_synthetic_id
                .insert(risk.synthetic_id.to_lowercase(), risk.clone());
            self.generated_risks_by_category
                .entry(risk.category_id.clone())
                .or_default()
                .push(risk);
        }
    }

    pub fn generated_risks_by_category(&self) -> &BTreeMap<String, Vec<Risk>> {
        &self.generated_risks_by_category
    }

    pub fn generated_risks_by_synthetic_id(&self) -> &BTreeMap<String, Risk> {
        &self.generated_risks_by_synthetic_id
    }

    /// Set the status of every tracked risk. Keys are lowercased synthetic IDs.
    pub fn apply_tracking(&mut self, applied: &BTreeMap<String, RiskTracking>) {
        for (id, risk) in self.generated_risks_by_synthetic_id.iter_mut() {
            if let Some(tracking) = applied.get(id) {
                risk.risk_status = tracking.status;
            }
        }
        for risk in self.generated_risks_by_category.values_mut().flatten() {
            if let Some(tracking) = applied.get(&risk.synthetic_id.to_lowercase()) {
                risk.risk_status = tracking.status;
            }
        }
    }

    /// All generated risks in synthetic ID order.
    pub fn all_risks(&self) -> Vec<Risk> {
        self.generated_risks_by_synthetic_id.values().cloned().collect()
    }
}
