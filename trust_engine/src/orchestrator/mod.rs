//! Session Orchestrator - the single entry point for player decisions.
//!
//! Each decision runs a fixed pipeline against one session:
//! 1. **Load**: fetch the session and take its lock
//! 2. **Score**: compute the new trust score
//! 3. **Persona**: re-derive Guardian/Deceiver from the new score
//! 4. **Tactic**: resolve the pending tactic, escalate, pick the next one
//! 5. **Corruption**: map the new score to a corruption level
//! 6. **Record**: append the decision to the history
//! 7. **Commit**: write everything back at once
//!
//! Steps 2-5 only compute; nothing is written until all of them succeeded,
//! so a failed decision leaves the session exactly as it was.

mod request;

pub use request::*;

use bleed_rules::{
    Action, CharacterId, ContextTag, CorruptionLevel, Persona, Ruleset, RulesError,
    SophisticationLevel, VulnerabilityProfile,
};
use chrono::{Duration, Utc};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::branch::{select_branch, NarrativeBranch};
use crate::corruption::corruption_level;
use crate::persona::PersonaSelector;
use crate::scoring::{self, ActionContext, ScoreUpdate, SCORE_MAX, SCORE_MIN};
use crate::session::{
    DecisionRecord, InMemorySessionStore, PendingTactic, Session, SessionId, SessionStore,
};
use crate::tactics::{Escalation, TacticPolicy};
use crate::EngineError;

const MAX_MESSAGE_LEN: usize = 1000;

/// Everything one decision changes, computed before anything is written.
struct Transition {
    update: ScoreUpdate,
    persona: Persona,
    escalation: Escalation,
    pending: Option<PendingTactic>,
    corruption: CorruptionLevel,
    branch: NarrativeBranch,
    missteps: u32,
    record: DecisionRecord,
}

/// The trust/deception engine.
pub struct TrustEngine<S = InMemorySessionStore> {
    rules: Arc<Ruleset>,
    store: S,
    policy: TacticPolicy,
}

impl TrustEngine<InMemorySessionStore> {
    /// Create an engine with an in-memory session store.
    pub fn new(rules: Ruleset) -> Result<Self, RulesError> {
        Self::with_store(rules, InMemorySessionStore::new())
    }
}

impl<S: SessionStore> TrustEngine<S> {
    /// Create an engine over a caller-provided store. The ruleset is
    /// validated here; an invalid ruleset never serves a request.
    pub fn with_store(rules: Ruleset, store: S) -> Result<Self, RulesError> {
        rules.validate()?;
        info!(
            version = %rules.version,
            characters = rules.characters.len(),
            "ruleset loaded"
        );
        let policy = TacticPolicy::new(rules.escalation);
        Ok(Self {
            rules: Arc::new(rules),
            store,
            policy,
        })
    }

    /// The immutable ruleset this engine runs on.
    pub fn rules(&self) -> &Ruleset {
        &self.rules
    }

    /// Handle a decision in its wire form.
    pub fn handle_request(&self, request: &ActionRequest) -> Result<ResponseBundle, EngineError> {
        let session_id = SessionId::new(request.session_id.as_str())?;
        let action: Action = request.action.parse()?;
        let context = ActionContext::new(
            CharacterId::new(&request.character),
            parse_context_tag(&request.context_tag)?,
        )
        .with_elapsed(request.elapsed_time_ms);
        self.handle_action(&session_id, action, &context)
    }

    /// Classify a free-text message with the character's intent rules, then
    /// handle it as that action.
    pub fn handle_message(&self, request: &MessageRequest) -> Result<ResponseBundle, EngineError> {
        let session_id = SessionId::new(request.session_id.as_str())?;
        let message = request.message.trim();
        if message.is_empty() {
            return Err(EngineError::invalid_request("message", "must not be empty"));
        }
        if message.chars().count() > MAX_MESSAGE_LEN {
            return Err(EngineError::invalid_request(
                "message",
                format!("must be at most {MAX_MESSAGE_LEN} characters"),
            ));
        }

        let character = CharacterId::new(&request.character);
        let profile = self.profile(&character)?;
        let action = profile.intent_rules.classify(message).ok_or_else(|| {
            debug!(session_id = %session_id, %character, "message matched no intent rule");
            EngineError::InvalidAction {
                action: "<unclassified message>".to_string(),
            }
        })?;

        let context = ActionContext::new(character, parse_context_tag(&request.context_tag)?)
            .with_elapsed(request.elapsed_time_ms);
        self.handle_action(&session_id, action, &context)
    }

    /// Run one decision through the pipeline.
    ///
    /// `Action::Create` opens (or restarts) the storyline; every other
    /// action requires an existing session and never creates one.
    pub fn handle_action(
        &self,
        session_id: &SessionId,
        action: Action,
        context: &ActionContext,
    ) -> Result<ResponseBundle, EngineError> {
        if action.is_create() {
            return self.create_session(session_id.clone(), &context.character);
        }

        let profile = self.profile(&context.character)?;
        let handle = self.store.get(session_id).ok_or_else(|| {
            warn!(session_id = %session_id, %action, "action for unknown session");
            EngineError::SessionNotFound {
                session_id: session_id.to_string(),
            }
        })?;
        let mut session = handle.lock().map_err(|_| EngineError::SessionPoisoned {
            session_id: session_id.to_string(),
        })?;

        if session.character != context.character {
            warn!(
                session_id = %session_id,
                expected = %session.character,
                actual = %context.character,
                "action for another character's storyline"
            );
            return Err(EngineError::CharacterMismatch {
                session_id: session_id.to_string(),
                expected: session.character.to_string(),
                actual: context.character.to_string(),
            });
        }

        let transition = self.advance(&session, profile, action, context)?;
        Ok(self.commit(&mut session, transition))
    }

    /// Open a storyline, replacing any session already using `session_id`.
    pub fn create_session(
        &self,
        session_id: SessionId,
        character: &CharacterId,
    ) -> Result<ResponseBundle, EngineError> {
        let profile = self.profile(character)?;
        let selector = PersonaSelector::new(self.rules.thresholds_for(character));

        let score = profile.baseline_trust.clamp(SCORE_MIN, SCORE_MAX);
        let persona = selector.initial(score);
        let corruption = corruption_level(score, &self.rules.corruption);
        let mut session = Session::new(session_id, character.clone(), score, persona, corruption);

        if persona == Persona::Deceiver {
            session.pending_tactic = self.policy.select(
                character,
                &profile.tactics,
                &[],
                None,
                SophisticationLevel::MIN,
            )?;
        }

        let response = respond(&session, NarrativeBranch::Hold, 0);
        self.store.insert(session);

        info!(
            session_id = %response.session_id,
            %character,
            score,
            %persona,
            "storyline opened"
        );
        Ok(response)
    }

    /// Open a storyline under a freshly generated session id.
    pub fn open_session(&self, character: &CharacterId) -> Result<ResponseBundle, EngineError> {
        self.create_session(SessionId::generate(), character)
    }

    /// Discard a session. Returns whether it existed.
    pub fn reset(&self, session_id: &SessionId) -> bool {
        let existed = self.store.evict(session_id);
        info!(session_id = %session_id, existed, "session reset");
        existed
    }

    /// A copy of the last committed state of a session.
    pub fn snapshot(&self, session_id: &SessionId) -> Result<Session, EngineError> {
        let handle = self
            .store
            .get(session_id)
            .ok_or_else(|| EngineError::SessionNotFound {
                session_id: session_id.to_string(),
            })?;
        let session = handle.lock().map_err(|_| EngineError::SessionPoisoned {
            session_id: session_id.to_string(),
        })?;
        Ok(session.clone())
    }

    /// Configured storylines, sorted by id.
    pub fn characters(&self) -> Vec<CharacterSummary> {
        self.rules
            .characters
            .iter()
            .map(|(id, profile)| CharacterSummary {
                id: id.to_string(),
                display_name: profile.display_name.clone(),
                baseline_trust: profile.baseline_trust,
            })
            .collect()
    }

    pub fn session_count(&self) -> usize {
        self.store.len()
    }

    /// Evict sessions idle for at least `max_idle`.
    pub fn evict_idle(&self, max_idle: Duration) -> usize {
        let evicted = self.store.evict_idle(Utc::now() - max_idle);
        if evicted > 0 {
            info!(evicted, "idle sessions evicted");
        }
        evicted
    }

    fn profile(&self, character: &CharacterId) -> Result<&VulnerabilityProfile, EngineError> {
        self.rules
            .profile(character)
            .ok_or_else(|| EngineError::UnknownCharacter {
                character: character.to_string(),
            })
    }

    /// Steps 2-6: compute the transition without touching the session.
    fn advance(
        &self,
        session: &Session,
        profile: &VulnerabilityProfile,
        action: Action,
        context: &ActionContext,
    ) -> Result<Transition, EngineError> {
        let update = scoring::score(&self.rules, session.trust_score, action, context)?;

        let selector = PersonaSelector::new(self.rules.thresholds_for(&session.character));
        let persona = selector.next(session.active_persona, update.score);

        let encounter = session.pending_tactic.map(|pending| pending.resolve(action));
        let escalation = self.policy.escalate(
            session.sophistication_level,
            session.resist_streak,
            encounter.as_ref(),
        );
        let pending = match persona {
            Persona::Deceiver => self.policy.select(
                &session.character,
                &profile.tactics,
                &session.history,
                encounter.as_ref(),
                escalation.level,
            )?,
            Persona::Guardian => None,
        };

        let corruption = corruption_level(update.score, &self.rules.corruption);
        let (branch, missteps) =
            select_branch(session.misstep_count, action.disposition(), &self.rules.branch);

        debug!(
            session_id = %session.id,
            %action,
            previous = update.previous,
            score = update.score,
            raw_delta = update.raw_delta,
            "decision scored"
        );

        Ok(Transition {
            update,
            persona,
            escalation,
            pending,
            corruption,
            branch,
            missteps,
            record: DecisionRecord {
                action,
                context_tag: context.context_tag,
                score_delta: update.applied_delta,
                raw_delta: update.raw_delta,
                elapsed_time_ms: context.elapsed_time_ms,
                timestamp: Utc::now(),
                encounter,
            },
        })
    }

    /// Step 7: write a computed transition back. Infallible.
    fn commit(&self, session: &mut Session, transition: Transition) -> ResponseBundle {
        if transition.persona != session.active_persona {
            info!(
                session_id = %session.id,
                from = %session.active_persona,
                to = %transition.persona,
                score = transition.update.score,
                "persona switched"
            );
        }
        if transition
            .escalation
            .escalated_from(session.sophistication_level)
        {
            info!(
                session_id = %session.id,
                level = transition.escalation.level.get(),
                "tactic sophistication escalated"
            );
        }

        session.trust_score = transition.update.score;
        session.active_persona = transition.persona;
        session.sophistication_level = transition.escalation.level;
        session.resist_streak = transition.escalation.resist_streak;
        session.pending_tactic = transition.pending;
        session.corruption_level = transition.corruption;
        session.misstep_count = transition.missteps;
        session.last_active = transition.record.timestamp;
        session.history.push(transition.record);

        respond(session, transition.branch, transition.update.applied_delta)
    }
}

fn parse_context_tag(tag: &str) -> Result<ContextTag, EngineError> {
    if tag.trim().is_empty() {
        return Ok(ContextTag::default());
    }
    tag.parse::<ContextTag>().map_err(EngineError::from)
}

fn respond(session: &Session, branch: NarrativeBranch, score_delta: i32) -> ResponseBundle {
    ResponseBundle {
        session_id: session.id.to_string(),
        character: session.character.to_string(),
        trust_score: session.trust_score,
        active_persona: session.active_persona,
        tactic: session.pending_tactic.map(|pending| pending.tactic),
        corruption_level: session.corruption_level,
        sophistication_level: session.sophistication_level,
        score_delta,
        branch,
        directives: session.corruption_level.directives(),
    }
}

#[cfg(test)]
mod tests;
