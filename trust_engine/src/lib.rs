//! # Trust Engine
//!
//! The adaptive side of the narrative: per-player sessions driven by
//! `bleed_rules`. Every player decision is scored against the active
//! character's vulnerability profile, flips the persona between Guardian and
//! Deceiver, escalates the Deceiver's tactics, and drives the corruption
//! level the presentation layer renders.
//!
//! ## Core Components
//!
//! - **scoring**: Context-weighted trust score deltas
//! - **persona**: Guardian/Deceiver hysteresis
//! - **tactics**: Escalation ladder and tactic selection
//! - **corruption**: Score-to-corruption mapping
//! - **session**: Per-player state and the concurrent session store
//! - **orchestrator**: The all-or-nothing decision pipeline

pub mod branch;
pub mod corruption;
pub mod error;
pub mod orchestrator;
pub mod persona;
pub mod scoring;
pub mod session;
pub mod tactics;

pub use branch::*;
pub use corruption::*;
pub use error::*;
pub use orchestrator::*;
pub use persona::*;
pub use scoring::{score, vulnerability_curve, ActionContext, ScoreUpdate, SCORE_MAX, SCORE_MIN};
pub use session::*;
pub use tactics::*;
