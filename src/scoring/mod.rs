//! Relative Attacker Attractiveness (RAA) scoring
//!
//! Ranks every technical asset by how attractive it is to an attacker,
//! relative to all other assets of the same model.
//!
//! # Scoring Formula
//!
//! ```text
//! raw(asset)   = Σ asset CIA weights
//!              + Σ processed/stored data (C·q + I·q + A)     processed/stored scale
//!              + Σ data sent/received on outgoing links      transferred scale
//!              × technology modifier × multi-tenant modifier
//!
//! norm(asset)  = (raw - min) / (max - min) × 100, clamped up to 1
//! raa(asset)   = norm(asset) + max(0, max over targets (norm(target) - norm(asset)) / 3)
//! ```
//!
//! Min and max are taken over the raw scores of all assets exactly once per
//! scorer. Out-of-scope assets always score 0.
//!
//! # Weights (Fibonacci-like)
//!
//! | rating level | asset | processed/stored | transferred |
//! |--------------|-------|------------------|-------------|
//! | 1st (public / archive) | 8 / 5 | 5 / 3 | 2 / 2 |
//! | 5th (strictly-confidential / mission-critical) | 55 / 34 | 34 / 21 | 13 / 13 |

mod raa;

pub use raa::{score_model, RaaBounds, RaaScorer};
