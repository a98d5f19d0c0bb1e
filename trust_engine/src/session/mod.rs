//! Per-player session state.
//!
//! A [`Session`] is one playthrough of one character's storyline. Its fields
//! are only writable inside this crate: the orchestrator is the single
//! writer, everything else reads through the accessors.

mod store;

pub use store::*;

use bleed_rules::{
    Action, CharacterId, ContextTag, CorruptionLevel, Disposition, Persona, SophisticationLevel,
    Tactic,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::EngineError;

const MAX_SESSION_ID_LEN: usize = 100;

/// Opaque, caller-supplied session identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    /// Validate a caller-supplied id: non-blank, at most 100 characters.
    pub fn new(id: impl Into<String>) -> Result<Self, EngineError> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(EngineError::invalid_request("sessionId", "must not be empty"));
        }
        if id.chars().count() > MAX_SESSION_ID_LEN {
            return Err(EngineError::invalid_request(
                "sessionId",
                format!("must be at most {MAX_SESSION_ID_LEN} characters"),
            ));
        }
        Ok(Self(id))
    }

    /// Create a fresh random id for callers that do not bring their own.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// How the player answered a tactic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EncounterOutcome {
    Resisted,
    Succeeded,
    /// The decision neither resisted nor gave in.
    Ignored,
}

impl From<Disposition> for EncounterOutcome {
    fn from(disposition: Disposition) -> Self {
        match disposition {
            Disposition::Safe => EncounterOutcome::Resisted,
            Disposition::Risky => EncounterOutcome::Succeeded,
            Disposition::Neutral => EncounterOutcome::Ignored,
        }
    }
}

/// A tactic offered in a response, waiting for the player's next decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingTactic {
    pub tactic: Tactic,
    /// Tier the tactic was drawn from (lower than `level` on fallback).
    pub tier: SophisticationLevel,
    /// Session sophistication level when the tactic was offered.
    pub level: SophisticationLevel,
}

impl PendingTactic {
    /// Close the tactic out against the decision that answered it.
    pub fn resolve(self, action: Action) -> TacticEncounter {
        TacticEncounter {
            tactic: self.tactic,
            tier: self.tier,
            level: self.level,
            outcome: action.disposition().into(),
        }
    }
}

/// A tactic together with how the player answered it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TacticEncounter {
    pub tactic: Tactic,
    pub tier: SophisticationLevel,
    pub level: SophisticationLevel,
    pub outcome: EncounterOutcome,
}

impl TacticEncounter {
    pub fn is_resisted(&self) -> bool {
        self.outcome == EncounterOutcome::Resisted
    }
}

/// One entry of the append-only decision history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionRecord {
    pub action: Action,
    pub context_tag: ContextTag,
    /// Committed change to the trust score.
    pub score_delta: i32,
    /// Weighted delta before rounding and clamping.
    pub raw_delta: f64,
    pub elapsed_time_ms: u64,
    pub timestamp: DateTime<Utc>,
    /// The tactic this decision answered, if one was pending.
    pub encounter: Option<TacticEncounter>,
}

/// The complete mutable state of one playthrough.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub(crate) id: SessionId,
    pub(crate) character: CharacterId,
    pub(crate) trust_score: i32,
    pub(crate) active_persona: Persona,
    pub(crate) sophistication_level: SophisticationLevel,
    pub(crate) corruption_level: CorruptionLevel,
    /// Consecutive resisted tactics at the current level.
    pub(crate) resist_streak: u32,
    /// Risky decisions not yet offset by safe ones.
    pub(crate) misstep_count: u32,
    pub(crate) pending_tactic: Option<PendingTactic>,
    pub(crate) history: Vec<DecisionRecord>,
    pub(crate) created_at: DateTime<Utc>,
    pub(crate) last_active: DateTime<Utc>,
}

impl Session {
    pub(crate) fn new(
        id: SessionId,
        character: CharacterId,
        trust_score: i32,
        active_persona: Persona,
        corruption_level: CorruptionLevel,
    ) -> Self {
        let now = Utc::now();
        Self {
            id,
            character,
            trust_score,
            active_persona,
            sophistication_level: SophisticationLevel::MIN,
            corruption_level,
            resist_streak: 0,
            misstep_count: 0,
            pending_tactic: None,
            history: Vec::new(),
            created_at: now,
            last_active: now,
        }
    }

    pub fn id(&self) -> &SessionId {
        &self.id
    }

    pub fn character(&self) -> &CharacterId {
        &self.character
    }

    pub fn trust_score(&self) -> i32 {
        self.trust_score
    }

    pub fn active_persona(&self) -> Persona {
        self.active_persona
    }

    pub fn sophistication_level(&self) -> SophisticationLevel {
        self.sophistication_level
    }

    pub fn corruption_level(&self) -> CorruptionLevel {
        self.corruption_level
    }

    pub fn resist_streak(&self) -> u32 {
        self.resist_streak
    }

    pub fn misstep_count(&self) -> u32 {
        self.misstep_count
    }

    /// The tactic offered in the last response, if any.
    pub fn pending_tactic(&self) -> Option<PendingTactic> {
        self.pending_tactic
    }

    /// Decisions in the order they were made.
    pub fn history(&self) -> &[DecisionRecord] {
        &self.history
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn last_active(&self) -> DateTime<Utc> {
        self.last_active
    }
}
