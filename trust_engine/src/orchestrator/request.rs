//! Wire shapes for the orchestrator.

use bleed_rules::{CorruptionDirectives, CorruptionLevel, Persona, SophisticationLevel, Tactic};
use serde::{de, Deserialize, Deserializer, Serialize};

use crate::branch::NarrativeBranch;

/// A player decision as it arrives from the presentation layer.
///
/// An empty `contextTag` reads as `neutral`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionRequest {
    pub session_id: String,
    pub character: String,
    pub action: String,
    #[serde(default)]
    pub context_tag: String,
    #[serde(default, deserialize_with = "elapsed_millis")]
    pub elapsed_time_ms: u64,
}

/// A free-text player message, classified into an action before scoring.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageRequest {
    pub session_id: String,
    pub character: String,
    pub message: String,
    #[serde(default)]
    pub context_tag: String,
    #[serde(default, deserialize_with = "elapsed_millis")]
    pub elapsed_time_ms: u64,
}

/// Accept any finite non-negative number of milliseconds; browser timers
/// report fractions, which are rounded to the nearest millisecond.
fn elapsed_millis<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let millis = f64::deserialize(deserializer)?;
    if !millis.is_finite() || millis < 0.0 {
        return Err(de::Error::custom(format!(
            "elapsedTimeMs must be a finite non-negative number, got {millis}"
        )));
    }
    Ok(millis.round() as u64)
}

/// Everything the presentation layer needs after one decision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseBundle {
    pub session_id: String,
    pub character: String,
    pub trust_score: i32,
    pub active_persona: Persona,
    /// Tactic the Deceiver plays next; `null` while Guardian.
    pub tactic: Option<Tactic>,
    pub corruption_level: CorruptionLevel,
    pub sophistication_level: SophisticationLevel,
    /// Committed change to the trust score.
    pub score_delta: i32,
    pub branch: NarrativeBranch,
    pub directives: CorruptionDirectives,
}

/// A playable storyline, as listed to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CharacterSummary {
    pub id: String,
    pub display_name: String,
    pub baseline_trust: i32,
}
