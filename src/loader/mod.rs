//! Model document loading
//!
//! Reads a YAML or JSON model document, checks its cross references and
//! converts it into an indexed [`ThreatModel`].
//!
//! ```text
//! file ──► ModelDocument (serde) ──► entities ──► integrity checks ──► ThreatModel
//! ```

mod document;

pub use document::{
    CommunicationLinkDocument, DataAssetDocument, ModelDocument, SharedRuntimeDocument,
    TechnicalAssetDocument, TrustBoundaryDocument,
};

use crate::graph::ThreatModel;
use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};
use regex::Regex;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use thiserror::Error;
use tracing::{debug, info};

/// Errors that can occur while loading a model
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Unsupported model format '{0}' (expected .yaml, .yml or .json)")]
    UnsupportedFormat(String),

    #[error("Invalid YAML model: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid JSON model: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid {kind} ID '{id}' (only letters, digits and '-' are allowed)")]
    InvalidId { kind: &'static str, id: String },

    #[error("Duplicate {kind} ID '{id}'")]
    DuplicateId { kind: &'static str, id: String },

    #[error("{kind} '{owner}' references unknown {referenced_kind} '{id}'")]
    UnknownReference {
        kind: &'static str,
        owner: String,
        referenced_kind: &'static str,
        id: String,
    },

    #[error("{kind} '{owner}' uses tag '{tag}' which is not listed in tags_available")]
    UnknownTag {
        kind: &'static str,
        owner: String,
        tag: String,
    },

    #[error("Technical asset '{asset}' is inside both trust boundary '{first}' and '{second}'")]
    AssetInMultipleBoundaries {
        asset: String,
        first: String,
        second: String,
    },

    #[error("Trust boundary '{boundary}' is nested in both '{first}' and '{second}'")]
    BoundaryNestedTwice {
        boundary: String,
        first: String,
        second: String,
    },

    #[error("Trust boundary nesting forms a cycle: {}", .boundaries.join(" -> "))]
    NestingCycle { boundaries: Vec<String> },
}

/// Document formats understood by the loader
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Yaml,
    Json,
}

impl DocumentFormat {
    pub fn from_path(path: &Path) -> Result<Self, LoadError> {
        match path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .as_deref()
        {
            Some("yaml") | Some("yml") => Ok(DocumentFormat::Yaml),
            Some("json") => Ok(DocumentFormat::Json),
            other => Err(LoadError::UnsupportedFormat(other.unwrap_or("").to_string())),
        }
    }
}

/// Load and validate a model file.
pub fn load_model(path: &Path) -> Result<ThreatModel, LoadError> {
    let format = DocumentFormat::from_path(path)?;
    let content = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let model = parse_model(&content, format)?;
    info!(
        "Loaded model '{}' from {}: {} technical assets, {} trust boundaries",
        model.title,
        path.display(),
        model.technical_assets.len(),
        model.trust_boundaries.len()
    );
    Ok(model)
}

/// Parse and validate a model document held in memory.
pub fn parse_model(content: &str, format: DocumentFormat) -> Result<ThreatModel, LoadError> {
    let document: ModelDocument = match format {
        DocumentFormat::Yaml => serde_yaml::from_str(content)?,
        DocumentFormat::Json => serde_json::from_str(content)?,
    };
    build_model(document)
}

/// Convert a parsed document into an indexed model.
pub fn build_model(document: ModelDocument) -> Result<ThreatModel, LoadError> {
    let mut model = ThreatModel::new(&document.title);
    model.tags_available = document.tags_available;

    for (title, data) in document.data_assets {
        let data = data.into_entity(title);
        check_id_syntax("data asset", &data.id)?;
        if model.data_assets.contains_key(&data.id) {
            return Err(duplicate("data asset", &data.id));
        }
        model.data_assets.insert(data.id.clone(), data);
    }
    for (title, asset) in document.technical_assets {
        let asset = asset.into_entity(title);
        check_id_syntax("technical asset", &asset.id)?;
        if model.technical_assets.contains_key(&asset.id) {
            return Err(duplicate("technical asset", &asset.id));
        }
        model.technical_assets.insert(asset.id.clone(), asset);
    }
    for (title, boundary) in document.trust_boundaries {
        let boundary = boundary.into_entity(title);
        check_id_syntax("trust boundary", &boundary.id)?;
        if model.trust_boundaries.contains_key(&boundary.id) {
            return Err(duplicate("trust boundary", &boundary.id));
        }
        model.trust_boundaries.insert(boundary.id.clone(), boundary);
    }
    for (title, runtime) in document.shared_runtimes {
        let runtime = runtime.into_entity(title);
        check_id_syntax("shared runtime", &runtime.id)?;
        if model.shared_runtimes.contains_key(&runtime.id) {
            return Err(duplicate("shared runtime", &runtime.id));
        }
        model.shared_runtimes.insert(runtime.id.clone(), runtime);
    }
    for (pattern, mut tracking) in document.risk_tracking {
        tracking.synthetic_risk_id = pattern.clone();
        model.risk_tracking.insert(pattern, tracking);
    }

    check_references(&model)?;
    check_tags(&model)?;
    check_boundary_containment(&model)?;
    check_nesting_cycles(&model)?;

    Ok(model.indexed())
}

fn valid_id() -> &'static Regex {
    static VALID_ID: OnceLock<Regex> = OnceLock::new();
    VALID_ID.get_or_init(|| Regex::new(r"^[a-zA-Z0-9\-]+$").expect("valid regex"))
}

/// Entity IDs end up inside synthetic risk IDs, where `@` and `>` are
/// separators and `*` is the tracking wildcard.
fn check_id_syntax(kind: &'static str, id: &str) -> Result<(), LoadError> {
    if valid_id().is_match(id) {
        Ok(())
    } else {
        Err(LoadError::InvalidId {
            kind,
            id: id.to_string(),
        })
    }
}

fn duplicate(kind: &'static str, id: &str) -> LoadError {
    LoadError::DuplicateId {
        kind,
        id: id.to_string(),
    }
}

fn unknown(kind: &'static str, owner: &str, referenced_kind: &'static str, id: &str) -> LoadError {
    LoadError::UnknownReference {
        kind,
        owner: owner.to_string(),
        referenced_kind,
        id: id.to_string(),
    }
}

fn check_references(model: &ThreatModel) -> Result<(), LoadError> {
    let has_data = |id: &String| model.data_assets.contains_key(id);
    let has_asset = |id: &String| model.technical_assets.contains_key(id);

    let mut link_ids: HashMap<&str, &str> = HashMap::new();
    for asset in model.technical_assets.values() {
        for id in asset
            .data_assets_processed
            .iter()
            .chain(asset.data_assets_stored.iter())
        {
            if !has_data(id) {
                return Err(unknown("Technical asset", &asset.id, "data asset", id));
            }
        }
        for link in &asset.communication_links {
            if !has_asset(&link.target_id) {
                return Err(unknown("Communication link", &link.id, "technical asset", &link.target_id));
            }
            for id in link.data_assets_sent.iter().chain(link.data_assets_received.iter()) {
                if !has_data(id) {
                    return Err(unknown("Communication link", &link.id, "data asset", id));
                }
            }
            if link_ids.insert(&link.id, &asset.id).is_some() {
                return Err(duplicate("communication link", &link.id));
            }
        }
    }

    for boundary in model.trust_boundaries.values() {
        for id in &boundary.technical_assets_inside {
            if !has_asset(id) {
                return Err(unknown("Trust boundary", &boundary.id, "technical asset", id));
            }
        }
        for id in &boundary.trust_boundaries_nested {
            if !model.trust_boundaries.contains_key(id) {
                return Err(unknown("Trust boundary", &boundary.id, "trust boundary", id));
            }
        }
    }

    for runtime in model.shared_runtimes.values() {
        for id in &runtime.technical_assets_running {
            if !has_asset(id) {
                return Err(unknown("Shared runtime", &runtime.id, "technical asset", id));
            }
        }
    }
    Ok(())
}

/// Every tag used by an entity must be declared in `tags_available`.
/// Comparison ignores case and surrounding whitespace.
fn check_tags(model: &ThreatModel) -> Result<(), LoadError> {
    let available: HashSet<String> = model
        .tags_available
        .iter()
        .map(|t| t.trim().to_lowercase())
        .collect();

    for data in model.data_assets.values() {
        check_declared(&available, "Data asset", &data.id, &data.tags)?;
    }
    for asset in model.technical_assets.values() {
        check_declared(&available, "Technical asset", &asset.id, &asset.tags)?;
        for link in &asset.communication_links {
            check_declared(&available, "Communication link", &link.id, &link.tags)?;
        }
    }
    for boundary in model.trust_boundaries.values() {
        check_declared(&available, "Trust boundary", &boundary.id, &boundary.tags)?;
    }
    for runtime in model.shared_runtimes.values() {
        check_declared(&available, "Shared runtime", &runtime.id, &runtime.tags)?;
    }
    Ok(())
}

fn check_declared(
    available: &HashSet<String>,
    kind: &'static str,
    owner: &str,
    tags: &[String],
) -> Result<(), LoadError> {
    match tags.iter().find(|t| !available.contains(&t.trim().to_lowercase())) {
        Some(tag) => Err(LoadError::UnknownTag {
            kind,
            owner: owner.to_string(),
            tag: tag.clone(),
        }),
        None => Ok(()),
    }
}

/// Every asset sits in at most one boundary and every boundary has at most
/// one parent.
fn check_boundary_containment(model: &ThreatModel) -> Result<(), LoadError> {
    let mut asset_owner: BTreeMap<&str, &str> = BTreeMap::new();
    let mut boundary_parent: BTreeMap<&str, &str> = BTreeMap::new();
    for boundary in model.trust_boundaries.values() {
        for asset in &boundary.technical_assets_inside {
            if let Some(first) = asset_owner.insert(asset, &boundary.id) {
                return Err(LoadError::AssetInMultipleBoundaries {
                    asset: asset.clone(),
                    first: first.to_string(),
                    second: boundary.id.clone(),
                });
            }
        }
        for nested in &boundary.trust_boundaries_nested {
            if let Some(first) = boundary_parent.insert(nested, &boundary.id) {
                return Err(LoadError::BoundaryNestedTwice {
                    boundary: nested.clone(),
                    first: first.to_string(),
                    second: boundary.id.clone(),
                });
            }
        }
    }
    Ok(())
}

fn check_nesting_cycles(model: &ThreatModel) -> Result<(), LoadError> {
    let mut graph: DiGraph<&str, ()> = DiGraph::new();
    let nodes: HashMap<&str, NodeIndex> = model
        .trust_boundaries
        .keys()
        .map(|id| (id.as_str(), graph.add_node(id.as_str())))
        .collect();

    for boundary in model.trust_boundaries.values() {
        for nested in &boundary.trust_boundaries_nested {
            if nested == &boundary.id {
                return Err(LoadError::NestingCycle {
                    boundaries: vec![boundary.id.clone(), boundary.id.clone()],
                });
            }
            if let (Some(&parent), Some(&child)) =
                (nodes.get(boundary.id.as_str()), nodes.get(nested.as_str()))
            {
                graph.add_edge(parent, child, ());
            }
        }
    }

    let mut cycles: Vec<Vec<String>> = tarjan_scc(&graph)
        .into_iter()
        .filter(|scc| scc.len() > 1)
        .map(|scc| {
            let mut ids: Vec<String> = scc.iter().map(|&n| graph[n].to_string()).collect();
            ids.sort();
            ids
        })
        .collect();
    cycles.sort();

    match cycles.into_iter().next() {
        Some(boundaries) => Err(LoadError::NestingCycle { boundaries }),
        None => {
            debug!("Trust boundary nesting is acyclic");
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{Protocol, Technology, TrustBoundaryType};
    use crate::models::RiskStatus;

    const MODEL: &str = r#"
title: Shop
tags_available: [aws]
data_assets:
  Customer Data:
    id: customer-data
    confidentiality: strictly-confidential
    integrity: critical
    availability: operational
technical_assets:
  Web Shop:
    id: shop
    type: process
    technology: web-application
    data_assets_processed: [customer-data]
    communication_links:
      Database Access:
        target: db
        protocol: jdbc-encrypted
        data_assets_sent: [customer-data]
  Database:
    id: db
    type: datastore
    technology: database
    data_assets_stored: [customer-data]
trust_boundaries:
  DMZ:
    id: dmz
    type: network-on-prem
    technical_assets_inside: [shop]
  Backend:
    id: backend
    type: network-on-prem
    technical_assets_inside: [db]
  Datacenter:
    id: dc
    type: network-on-prem
    trust_boundaries_nested: [dmz, backend]
risk_tracking:
  "missing-waf@shop":
    status: accepted
    justification: internal only
    date: 2024-01-15
"#;

    fn parse(yaml: &str) -> Result<ThreatModel, LoadError> {
        parse_model(yaml, DocumentFormat::Yaml)
    }

    #[test]
    fn test_parse_yaml_model() {
        let model = parse(MODEL).expect("valid model");
        assert_eq!(model.title, "Shop");
        let shop = model.technical_asset("shop").expect("shop");
        assert_eq!(shop.title, "Web Shop");
        assert_eq!(shop.technology, Technology::WebApplication);

        let link = model
            .communication_link("shop>database-access")
            .expect("link");
        assert_eq!(link.protocol, Protocol::JdbcEncrypted);
        assert_eq!(model.incoming_links("db").len(), 1);

        assert_eq!(
            model.trust_boundary("dc").map(|b| b.boundary_type),
            Some(TrustBoundaryType::NetworkOnPrem)
        );
        assert_eq!(model.parent_trust_boundary("dmz").map(|b| b.id.as_str()), Some("dc"));

        let tracking = &model.risk_tracking["missing-waf@shop"];
        assert_eq!(tracking.synthetic_risk_id, "missing-waf@shop");
        assert_eq!(tracking.status, RiskStatus::Accepted);
    }

    #[test]
    fn test_parse_json_model() {
        let json = r#"{
            "title": "Tiny",
            "technical_assets": {
                "Api": {"id": "api", "technology": "web-service-rest"}
            }
        }"#;
        let model = parse_model(json, DocumentFormat::Json).expect("valid model");
        assert!(model.technical_asset("api").is_some());
    }

    #[test]
    fn test_unknown_link_target() {
        let yaml = MODEL.replace("target: db", "target: nowhere");
        let err = parse(&yaml).unwrap_err();
        assert!(matches!(
            err,
            LoadError::UnknownReference { ref id, .. } if id == "nowhere"
        ));
    }

    #[test]
    fn test_unknown_data_asset() {
        let yaml = MODEL.replace("data_assets_stored: [customer-data]", "data_assets_stored: [ghost]");
        assert!(matches!(parse(&yaml), Err(LoadError::UnknownReference { .. })));
    }

    #[test]
    fn test_unknown_enum_value_is_a_parse_error() {
        let yaml = MODEL.replace("technology: database", "technology: quantum-db");
        assert!(matches!(parse(&yaml), Err(LoadError::Yaml(_))));
    }

    #[test]
    fn test_asset_in_two_boundaries() {
        let yaml = MODEL.replace("technical_assets_inside: [db]", "technical_assets_inside: [db, shop]");
        assert!(matches!(
            parse(&yaml),
            Err(LoadError::AssetInMultipleBoundaries { .. })
        ));
    }

    #[test]
    fn test_nesting_cycle_is_rejected() {
        let yaml = MODEL.replace(
            "    technical_assets_inside: [db]\n",
            "    technical_assets_inside: [db]\n    trust_boundaries_nested: [dc]\n",
        );
        let err = parse(&yaml).unwrap_err();
        match err {
            LoadError::NestingCycle { boundaries } => {
                assert_eq!(boundaries, vec!["backend".to_string(), "dc".to_string()]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_duplicate_ids() {
        let yaml = MODEL.replace("    id: db\n", "    id: shop\n");
        assert!(matches!(
            parse(&yaml),
            Err(LoadError::DuplicateId { kind: "technical asset", .. })
        ));
    }

    #[test]
    fn test_id_with_separator_is_rejected() {
        let yaml = MODEL
            .replace("    id: shop\n", "    id: \"web@edge\"\n")
            .replace("[shop]", "[\"web@edge\"]");
        let err = parse(&yaml).unwrap_err();
        assert!(matches!(
            err,
            LoadError::InvalidId { kind: "technical asset", ref id } if id == "web@edge"
        ));
        assert!(err.to_string().contains("web@edge"));

        let yaml = MODEL.replace("    id: dmz\n", "    id: \"dmz*\"\n");
        assert!(matches!(parse(&yaml), Err(LoadError::InvalidId { kind: "trust boundary", .. })));
    }

    #[test]
    fn test_undeclared_tag_is_rejected() {
        let yaml = MODEL.replace(
            "    technology: database\n",
            "    technology: database\n    tags: [azure]\n",
        );
        let err = parse(&yaml).unwrap_err();
        assert!(matches!(
            err,
            LoadError::UnknownTag { ref owner, ref tag, .. } if owner == "db" && tag == "azure"
        ));

        let yaml = MODEL.replace(
            "        protocol: jdbc-encrypted\n",
            "        protocol: jdbc-encrypted\n        tags: [on-prem]\n",
        );
        assert!(matches!(
            parse(&yaml),
            Err(LoadError::UnknownTag { kind: "Communication link", .. })
        ));
    }

    #[test]
    fn test_declared_tags_match_ignoring_case() {
        let yaml = MODEL
            .replace(
                "    technology: database\n",
                "    technology: database\n    tags: [\" AWS \"]\n",
            )
            .replace(
                "    type: network-on-prem\n    technical_assets_inside: [shop]\n",
                "    type: network-on-prem\n    technical_assets_inside: [shop]\n    tags: [aws]\n",
            );
        let model = parse(&yaml).expect("declared tags load");
        assert_eq!(model.technical_asset("db").map(|a| a.tags.len()), Some(1));
    }

    #[test]
    fn test_format_from_path() {
        assert_eq!(
            DocumentFormat::from_path(Path::new("model.YAML")).expect("yaml"),
            DocumentFormat::Yaml
        );
        assert!(matches!(
            DocumentFormat::from_path(Path::new("model.txt")),
            Err(LoadError::UnsupportedFormat(ext)) if ext == "txt"
        ));
    }
}
