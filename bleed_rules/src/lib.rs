//! # Bleed Rules
//!
//! The rule book of the trust/deception engine: the closed action, context
//! and tactic vocabularies, character vulnerability profiles, and the
//! threshold configuration the engine is tuned by.
//! This crate holds only immutable content and carries no session state.

pub mod entities;
pub mod error;
pub mod mechanics;
pub mod ruleset;

pub use entities::*;
pub use error::*;
pub use mechanics::*;
pub use ruleset::*;
