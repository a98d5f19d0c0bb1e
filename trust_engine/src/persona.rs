//! Persona selection with a hysteresis band.

use bleed_rules::{Persona, PersonaThresholds};

/// Two-state machine over the trust score.
///
/// Guardian flips to Deceiver only when the score drops below `t_low`;
/// Deceiver flips back only when it rises above `t_high`. Scores inside the
/// band keep whichever persona is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PersonaSelector {
    thresholds: PersonaThresholds,
}

impl PersonaSelector {
    pub fn new(thresholds: PersonaThresholds) -> Self {
        Self { thresholds }
    }

    /// Persona for a freshly created session.
    pub fn initial(&self, score: i32) -> Persona {
        if score < self.thresholds.t_low {
            Persona::Deceiver
        } else {
            Persona::Guardian
        }
    }

    /// Persona after the score moved to `score`.
    pub fn next(&self, current: Persona, score: i32) -> Persona {
        match current {
            Persona::Guardian if score < self.thresholds.t_low => Persona::Deceiver,
            Persona::Deceiver if score > self.thresholds.t_high => Persona::Guardian,
            unchanged => unchanged,
        }
    }
}
