use std::cell::OnceCell;
use std::collections::BTreeMap;
use tracing::debug;

use crate::graph::{
    Confidentiality, Criticality, DataAsset, Quantity, TechnicalAsset, TechnicalAssetType,
    Technology, ThreatModel,
};

const CONFIDENTIALITY_ASSET: [f64; 5] = [8.0, 13.0, 21.0, 34.0, 55.0];
const CONFIDENTIALITY_STORED: [f64; 5] = [5.0, 8.0, 13.0, 21.0, 34.0];
const CONFIDENTIALITY_TRANSFERRED: [f64; 5] = [2.0, 3.0, 5.0, 8.0, 13.0];

const CRITICALITY_ASSET: [f64; 5] = [5.0, 8.0, 13.0, 21.0, 34.0];
const CRITICALITY_STORED: [f64; 5] = [3.0, 5.0, 8.0, 13.0, 21.0];
const CRITICALITY_TRANSFERRED: [f64; 5] = [2.0, 3.0, 5.0, 8.0, 13.0];

fn confidentiality_rank(c: Confidentiality) -> usize {
    match c {
        Confidentiality::Public => 0,
        Confidentiality::Internal => 1,
        Confidentiality::Restricted => 2,
        Confidentiality::Confidential => 3,
        Confidentiality::StrictlyConfidential => 4,
    }
}

fn criticality_rank(c: Criticality) -> usize {
    match c {
        Criticality::Archive => 0,
        Criticality::Operational => 1,
        Criticality::Important => 2,
        Criticality::Critical => 3,
        Criticality::MissionCritical => 4,
    }
}

fn quantity_factor(q: Quantity) -> f64 {
    match q {
        Quantity::VeryFew => 1.0,
        Quantity::Few => 2.0,
        Quantity::Many => 3.0,
        Quantity::VeryMany => 5.0,
    }
}

/// Confidentiality and integrity scale with quantity, availability does not.
fn data_weight(
    data: &DataAsset,
    confidentiality: &[f64; 5],
    criticality: &[f64; 5],
) -> f64 {
    let q = quantity_factor(data.quantity);
    confidentiality[confidentiality_rank(data.confidentiality)] * q
        + criticality[criticality_rank(data.integrity)] * q
        + criticality[criticality_rank(data.availability)]
}

fn technology_modifier(asset: &TechnicalAsset) -> f64 {
    let mut factor = match asset.technology {
        Technology::LoadBalancer | Technology::ReverseProxy => 1.0 / 5.5,
        Technology::Monitoring => 1.0 / 5.0,
        Technology::ContainerPlatform => 5.0,
        Technology::Vault => 2.0,
        Technology::BuildPipeline
        | Technology::SourcecodeRepository
        | Technology::ArtifactRegistry => 2.0,
        _ => 1.0,
    };
    // Identity technology takes precedence over the datastore multiplier.
    if matches!(
        asset.technology,
        Technology::IdentityProvider
            | Technology::IdentityStoreDatabase
            | Technology::IdentityStoreLdap
    ) {
        factor *= 2.5;
    } else if asset.asset_type == TechnicalAssetType::Datastore {
        factor *= 2.0;
    }
    if asset.multi_tenant {
        factor *= 1.5;
    }
    factor
}

/// Global normalization parameters, computed once per scorer
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RaaBounds {
    pub min: f64,
    pub max: f64,
}

impl RaaBounds {
    fn from_raw<'a>(values: impl Iterator<Item = &'a f64>) -> Self {
        let (min, max) = values.fold((f64::MAX, f64::MIN), |(lo, hi), v| {
            (lo.min(*v), hi.max(*v))
        });
        let (min, max) = if min > max { (0.0, 0.0) } else { (min, max) };
        if min < max {
            RaaBounds { min, max }
        } else {
            RaaBounds { min, max: min + 1.0 }
        }
    }

    pub fn spread(&self) -> f64 {
        self.max - self.min
    }

    /// Map a raw value onto 1..=100.
    pub fn normalize(&self, raw: f64) -> f64 {
        let percent = (raw - self.min) / self.spread() * 100.0;
        if percent <= 0.0 {
            1.0
        } else {
            percent
        }
    }
}

/// Scores every asset of one model.
///
/// Raw scores are computed on construction. The normalization bounds are
/// memoized on first use, so the scale never shifts while the pivoting
/// adjustment reads neighbour scores. A scorer holds no state beyond its
/// model, so separate runs never share bounds.
pub struct RaaScorer<'m> {
    model: &'m ThreatModel,
    raw: BTreeMap<String, f64>,
    bounds: OnceCell<RaaBounds>,
}

impl<'m> RaaScorer<'m> {
    pub fn new(model: &'m ThreatModel) -> Self {
        let raw = model
            .technical_assets_sorted()
            .map(|a| (a.id.clone(), Self::raw_attractiveness_of(model, a)))
            .collect();
        Self {
            model,
            raw,
            bounds: OnceCell::new(),
        }
    }

    fn raw_attractiveness_of(model: &ThreatModel, asset: &TechnicalAsset) -> f64 {
        if asset.out_of_scope {
            return 0.0;
        }
        let mut score = CONFIDENTIALITY_ASSET[confidentiality_rank(asset.confidentiality)]
            + CRITICALITY_ASSET[criticality_rank(asset.integrity)]
            + CRITICALITY_ASSET[criticality_rank(asset.availability)];

        for id in asset
            .data_assets_processed
            .iter()
            .chain(asset.data_assets_stored.iter())
        {
            if let Some(data) = model.data_asset(id) {
                score += data_weight(data, &CONFIDENTIALITY_STORED, &CRITICALITY_STORED);
            }
        }
        for link in &asset.communication_links {
            for id in link
                .data_assets_sent
                .iter()
                .chain(link.data_assets_received.iter())
            {
                if let Some(data) = model.data_asset(id) {
                    score +=
                        data_weight(data, &CONFIDENTIALITY_TRANSFERRED, &CRITICALITY_TRANSFERRED);
                }
            }
        }
        score * technology_modifier(asset)
    }

    /// Unnormalized attractiveness; 0 for unknown or out-of-scope assets.
    pub fn raw_attractiveness(&self, asset_id: &str) -> f64 {
        self.raw.get(asset_id).copied().unwrap_or(0.0)
    }

    pub fn bounds(&self) -> RaaBounds {
        *self
            .bounds
            .get_or_init(|| RaaBounds::from_raw(self.raw.values()))
    }

    /// Raw attractiveness mapped onto 1..=100, before pivoting.
    pub fn normalized(&self, asset_id: &str) -> f64 {
        self.bounds().normalize(self.raw_attractiveness(asset_id))
    }

    /// One third of the largest positive gap to an outgoing neighbour.
    pub fn pivot_adjustment(&self, asset: &TechnicalAsset) -> f64 {
        if asset.out_of_scope {
            return 0.0;
        }
        let own = self.normalized(&asset.id);
        asset
            .communication_links
            .iter()
            .filter(|link| self.model.technical_asset(&link.target_id).is_some())
            .map(|link| (self.normalized(&link.target_id) - own) / 3.0)
            .fold(0.0, f64::max)
    }

    /// Final RAA of one asset.
    pub fn score(&self, asset_id: &str) -> f64 {
        match self.model.technical_asset(asset_id) {
            Some(asset) if !asset.out_of_scope => {
                self.normalized(asset_id) + self.pivot_adjustment(asset)
            }
            _ => 0.0,
        }
    }

    pub fn score_all(&self) -> BTreeMap<String, f64> {
        let bounds = self.bounds();
        debug!(
            "RAA bounds: min={:.2} max={:.2} over {} assets",
            bounds.min,
            bounds.max,
            self.raw.len()
        );
        self.raw.keys().map(|id| (id.clone(), self.score(id))).collect()
    }
}

/// Score every asset and write the result back onto the model.
pub fn score_model(model: &mut ThreatModel) -> BTreeMap<String, f64> {
    let scores = RaaScorer::new(model).score_all();
    model.apply_raa(&scores);
    scores
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{CommunicationLink, Protocol};
    use proptest::prelude::*;

    fn asset(id: &str, c: Confidentiality, i: Criticality, a: Criticality) -> TechnicalAsset {
        TechnicalAsset::new(id, Technology::WebApplication).with_cia(c, i, a)
    }

    #[test]
    fn test_raw_weights_for_plain_asset() {
        let model = ThreatModel::new("t")
            .with_asset(asset(
                "a",
                Confidentiality::Public,
                Criticality::Archive,
                Criticality::Archive,
            ))
            .indexed();
        let scorer = RaaScorer::new(&model);
        assert_eq!(scorer.raw_attractiveness("a"), 8.0 + 5.0 + 5.0);
    }

    #[test]
    fn test_data_weights_scale_with_quantity_except_availability() {
        let model = ThreatModel::new("t")
            .with_data(
                DataAsset::new("d")
                    .with_cia(
                        Confidentiality::Internal,
                        Criticality::Operational,
                        Criticality::Important,
                    )
                    .with_quantity(Quantity::Many),
            )
            .with_asset(
                asset(
                    "a",
                    Confidentiality::Public,
                    Criticality::Archive,
                    Criticality::Archive,
                )
                .with_processed(&["d"])
                .with_link(
                    CommunicationLink::new("a", "out", "a", Protocol::Https).with_data_sent(&["d"]),
                ),
            )
            .indexed();
        let scorer = RaaScorer::new(&model);
        let own = 18.0;
        let stored = 8.0 * 3.0 + 5.0 * 3.0 + 8.0;
        let transferred = 3.0 * 3.0 + 3.0 * 3.0 + 5.0;
        assert_eq!(scorer.raw_attractiveness("a"), own + stored + transferred);
    }

    #[test]
    fn test_identity_multiplier_takes_precedence_over_datastore() {
        let idp = TechnicalAsset::new("idp", Technology::IdentityStoreDatabase)
            .with_type(TechnicalAssetType::Datastore);
        let db = TechnicalAsset::new("db", Technology::Database)
            .with_type(TechnicalAssetType::Datastore);
        let mut tenant = TechnicalAsset::new("lb", Technology::LoadBalancer);
        tenant.multi_tenant = true;
        let model = ThreatModel::new("t")
            .with_asset(idp)
            .with_asset(db)
            .with_asset(tenant)
            .indexed();
        let scorer = RaaScorer::new(&model);
        assert_eq!(scorer.raw_attractiveness("idp"), 18.0 * 2.5);
        assert_eq!(scorer.raw_attractiveness("db"), 18.0 * 2.0);
        let lb = scorer.raw_attractiveness("lb");
        assert!((lb - 18.0 / 5.5 * 1.5).abs() < 1e-9);
    }

    #[test]
    fn test_normalization_maps_min_to_one_and_max_to_hundred() {
        let bounds = RaaBounds::from_raw([10.0, 50.0, 90.0].iter());
        assert_eq!(bounds.normalize(10.0), 1.0);
        assert_eq!(bounds.normalize(90.0), 100.0);
        let mid = bounds.normalize(50.0);
        assert!(mid > 1.0 && mid < 100.0);
        assert_eq!(mid, 50.0);
    }

    #[test]
    fn test_identical_raw_scores_do_not_divide_by_zero() {
        let bounds = RaaBounds::from_raw([7.0, 7.0].iter());
        assert_eq!(bounds.spread(), 1.0);
        assert_eq!(bounds.normalize(7.0), 1.0);
    }

    #[test]
    fn test_pivot_adds_third_of_largest_gap() {
        let model = ThreatModel::new("t")
            .with_asset(
                asset(
                    "low",
                    Confidentiality::Public,
                    Criticality::Archive,
                    Criticality::Archive,
                )
                .with_link(CommunicationLink::new("low", "to high", "high", Protocol::Https))
                .with_link(CommunicationLink::new("low", "to mid", "mid", Protocol::Https)),
            )
            .with_asset(asset(
                "mid",
                Confidentiality::Restricted,
                Criticality::Important,
                Criticality::Important,
            ))
            .with_asset(asset(
                "high",
                Confidentiality::StrictlyConfidential,
                Criticality::MissionCritical,
                Criticality::MissionCritical,
            ))
            .indexed();
        let scorer = RaaScorer::new(&model);
        assert_eq!(scorer.normalized("low"), 1.0);
        assert_eq!(scorer.normalized("high"), 100.0);
        assert_eq!(scorer.score("low"), 1.0 + 99.0 / 3.0);
        assert_eq!(scorer.score("high"), 100.0);
    }

    #[test]
    fn test_out_of_scope_scores_zero_and_scoring_is_idempotent() {
        let mut model = ThreatModel::new("t")
            .with_asset(asset(
                "in",
                Confidentiality::Confidential,
                Criticality::Critical,
                Criticality::Critical,
            ))
            .with_asset(
                asset(
                    "out",
                    Confidentiality::StrictlyConfidential,
                    Criticality::MissionCritical,
                    Criticality::MissionCritical,
                )
                .out_of_scope(),
            )
            .indexed();
        let first = score_model(&mut model);
        let second = score_model(&mut model);
        assert_eq!(first, second);
        assert_eq!(first["out"], 0.0);
        assert_eq!(model.technical_asset("in").expect("asset").raa, 100.0);
    }

    proptest! {
        #[test]
        fn test_in_scope_scores_stay_in_range(
            ratings in proptest::collection::vec((0usize..5, 0usize..5, 0usize..5, any::<bool>()), 1..8)
        ) {
            let mut model = ThreatModel::new("prop");
            let count = ratings.len();
            for (n, (c, i, a, linked)) in ratings.into_iter().enumerate() {
                let id = format!("asset-{n}");
                let mut ta = asset(
                    &id,
                    Confidentiality::ALL[c],
                    Criticality::ALL[i],
                    Criticality::ALL[a],
                );
                if linked {
                    let target = format!("asset-{}", (n + 1) % count);
                    ta = ta.with_link(CommunicationLink::new(&id, "next", &target, Protocol::Https));
                }
                model = model.with_asset(ta);
            }
            let model = model.indexed();
            let scores = RaaScorer::new(&model).score_all();
            for score in scores.values() {
                prop_assert!(*score >= 1.0 && *score <= 100.0, "score {} out of range", score);
            }
        }
    }
}
