//! archrisk - threat-model risk analysis
//!
//! Reads a declarative architecture model, scores every technical asset
//! for relative attacker attractiveness, runs the built-in risk rules and
//! reconciles the generated risks with the model's risk tracking.
//!
//! ```ignore
//! use archrisk::{config::ProjectConfig, loader::load_model, pipeline::analyze};
//!
//! let model = load_model(Path::new("model.yaml"))?;
//! let report = analyze(model, &ProjectConfig::default())?;
//! println!("{} risks", report.summary.total);
//! ```

pub mod config;
pub mod graph;
pub mod loader;
pub mod models;
pub mod pipeline;
pub mod reporters;
pub mod rules;
pub mod scoring;
pub mod tracking;
