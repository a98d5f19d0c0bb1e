//! Tactic escalation policy.
//!
//! Two responsibilities, both driven by the decision history:
//!
//! - **Escalation**: resisting `resist_streak` tactics in a row at the
//!   current level moves the session one rung up the ladder (capped at 5).
//!   Levels never go down within a session.
//! - **Selection**: pick a tactic from the current tier, skipping any tactic
//!   that was resisted within the last `exclusion_window` decisions. An
//!   exhausted tier falls back to the tiers below it; when every tier is
//!   exhausted the Deceiver withholds a tactic for the turn.

use bleed_rules::{CharacterId, EscalationConfig, SophisticationLevel, Tactic, TacticTable};
use std::cmp::Reverse;
use std::collections::HashSet;
use tracing::debug;

use crate::session::{DecisionRecord, EncounterOutcome, PendingTactic, TacticEncounter};
use crate::EngineError;

/// Sophistication state after an encounter was resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Escalation {
    pub level: SophisticationLevel,
    pub resist_streak: u32,
}

impl Escalation {
    pub fn escalated_from(&self, previous: SophisticationLevel) -> bool {
        self.level > previous
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TacticPolicy {
    config: EscalationConfig,
}

impl TacticPolicy {
    pub fn new(config: EscalationConfig) -> Self {
        Self { config }
    }

    /// Apply the two-in-a-row rule for the encounter the current decision
    /// resolved, if any.
    pub fn escalate(
        &self,
        level: SophisticationLevel,
        resist_streak: u32,
        encounter: Option<&TacticEncounter>,
    ) -> Escalation {
        let unchanged = Escalation {
            level,
            resist_streak,
        };

        let Some(encounter) = encounter else {
            return unchanged;
        };
        if encounter.level != level {
            return unchanged;
        }

        match encounter.outcome {
            EncounterOutcome::Resisted => {
                let streak = resist_streak + 1;
                if streak >= self.config.resist_streak {
                    Escalation {
                        level: level.escalated(),
                        resist_streak: 0,
                    }
                } else {
                    Escalation {
                        level,
                        resist_streak: streak,
                    }
                }
            }
            EncounterOutcome::Succeeded => Escalation {
                level,
                resist_streak: 0,
            },
            EncounterOutcome::Ignored => unchanged,
        }
    }

    /// Tactics resisted within the exclusion window. `current` is the
    /// encounter resolved by the decision being processed and counts as the
    /// most recent decision.
    pub fn excluded(
        &self,
        history: &[DecisionRecord],
        current: Option<&TacticEncounter>,
    ) -> HashSet<Tactic> {
        let earlier = self.config.exclusion_window.saturating_sub(1);
        current
            .into_iter()
            .chain(
                history
                    .iter()
                    .rev()
                    .take(earlier)
                    .filter_map(|record| record.encounter.as_ref()),
            )
            .filter(|encounter| encounter.is_resisted())
            .map(|encounter| encounter.tactic)
            .collect()
    }

    /// Choose the next tactic at `level`.
    pub fn select(
        &self,
        character: &CharacterId,
        table: &TacticTable,
        history: &[DecisionRecord],
        current: Option<&TacticEncounter>,
        level: SophisticationLevel,
    ) -> Result<Option<PendingTactic>, EngineError> {
        let excluded = self.excluded(history, current);
        let mut tier = Some(level);

        while let Some(rung) = tier {
            let candidates = table.tier(rung);
            if candidates.is_empty() {
                return Err(EngineError::NoTacticsAvailable {
                    character: character.to_string(),
                    level: rung.get(),
                });
            }

            let choice = candidates
                .iter()
                .copied()
                .filter(|tactic| !excluded.contains(tactic))
                .min_by_key(|tactic| Reverse(turns_since_used(*tactic, history, current)));

            if let Some(tactic) = choice {
                return Ok(Some(PendingTactic {
                    tactic,
                    tier: rung,
                    level,
                }));
            }

            debug!(
                %character,
                tier = rung.get(),
                "tier exhausted by resisted tactics, falling back"
            );
            tier = rung.lower();
        }

        debug!(
            %character,
            level = level.get(),
            "every tier exhausted, withholding tactic"
        );
        Ok(None)
    }
}

/// How many decisions ago a tactic was last faced; `usize::MAX` if never.
fn turns_since_used(
    tactic: Tactic,
    history: &[DecisionRecord],
    current: Option<&TacticEncounter>,
) -> usize {
    if current.is_some_and(|e| e.tactic == tactic) {
        return 0;
    }
    history
        .iter()
        .rev()
        .position(|record| record.encounter.is_some_and(|e| e.tactic == tactic))
        .map(|turns| turns + 1)
        .unwrap_or(usize::MAX)
}
