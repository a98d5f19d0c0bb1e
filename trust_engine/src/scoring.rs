//! Trust scoring: `(current score, action, context) -> new score`.
//!
//! The delta for one decision is
//!
//! ```text
//! delta = base_impact(action)
//!       * context_multiplier(character, tag)
//!       * (delta < 0 ? vulnerability_curve(score) : recovery_rate(character))
//! ```
//!
//! rounded half away from zero, capped at `±max_step` and applied with the
//! result clamped to `[-100, 100]`.

use bleed_rules::{Action, CharacterId, ContextTag, Ruleset, ScoringConfig};
use serde::{Deserialize, Serialize};

use crate::EngineError;

pub const SCORE_MIN: i32 = -100;
pub const SCORE_MAX: i32 = 100;

/// The context bundle a decision is scored in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionContext {
    pub character: CharacterId,
    #[serde(default)]
    pub context_tag: ContextTag,
    #[serde(default)]
    pub elapsed_time_ms: u64,
}

impl ActionContext {
    pub fn new(character: impl Into<CharacterId>, context_tag: ContextTag) -> Self {
        Self {
            character: character.into(),
            context_tag,
            elapsed_time_ms: 0,
        }
    }

    pub fn with_elapsed(mut self, elapsed_time_ms: u64) -> Self {
        self.elapsed_time_ms = elapsed_time_ms;
        self
    }
}

/// Result of scoring one decision.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreUpdate {
    pub previous: i32,
    pub score: i32,
    /// Weighted delta before rounding, step cap and clamping.
    pub raw_delta: f64,
    /// `score - previous`.
    pub applied_delta: i32,
}

/// Amplification of negative deltas at a given score.
///
/// `1 + max(0, (pivot - score) / span)`: 1.0 at or above the pivot, growing
/// linearly as the score falls. Monotonically non-increasing in `score`.
pub fn vulnerability_curve(score: i32, config: &ScoringConfig) -> f64 {
    let span = f64::from(config.curve_span.max(1));
    1.0 + (f64::from(config.curve_pivot - score) / span).max(0.0)
}

/// Score one decision.
pub fn score(
    rules: &Ruleset,
    current: i32,
    action: Action,
    context: &ActionContext,
) -> Result<ScoreUpdate, EngineError> {
    let profile = rules
        .profile(&context.character)
        .ok_or_else(|| EngineError::UnknownCharacter {
            character: context.character.to_string(),
        })?;
    let base = rules
        .impact(action)
        .ok_or_else(|| EngineError::InvalidAction {
            action: action.to_string(),
        })?;

    let previous = current.clamp(SCORE_MIN, SCORE_MAX);
    let weighted = f64::from(base) * profile.multiplier(context.context_tag);
    let raw_delta = if weighted < 0.0 {
        weighted * vulnerability_curve(previous, &rules.scoring)
    } else {
        weighted * profile.recovery_rate
    };

    let max_step = rules.scoring.max_step;
    let step = (raw_delta.round() as i32).clamp(-max_step, max_step);
    let score = (previous + step).clamp(SCORE_MIN, SCORE_MAX);

    Ok(ScoreUpdate {
        previous,
        score,
        raw_delta,
        applied_delta: score - previous,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use bleed_rules::VulnerabilityProfile;

    fn rules() -> Ruleset {
        Ruleset::new()
            .with_character(
                "maya",
                VulnerabilityProfile::new("Maya", 50)
                    .with_multiplier(ContextTag::Romantic, 1.5)
                    .with_recovery_rate(0.5),
            )
            .with_character(
                "heavy",
                VulnerabilityProfile::new("Heavy", 0).with_multiplier(ContextTag::Financial, 3.0),
            )
    }

    #[test]
    fn test_romantic_disclosure_lowers_score() {
        let ctx = ActionContext::new("maya", ContextTag::Romantic);
        let update = score(&rules(), 50, Action::SharedPersonalInfo, &ctx).unwrap();

        assert!(update.score < 50);
        assert_eq!(update.raw_delta, -22.5);
        assert_eq!(update.score, 27);
        assert_eq!(update.applied_delta, -23);
    }

    #[test]
    fn test_recovery_rate_dampens_positive_deltas() {
        let ctx = ActionContext::new("maya", ContextTag::Neutral);
        let update = score(&rules(), 0, Action::ReportedSuspicious, &ctx).unwrap();

        assert_eq!(update.raw_delta, 7.5);
        assert_eq!(update.score, 8);
    }

    #[test]
    fn test_lower_scores_fall_faster() {
        let ctx = ActionContext::new("maya", ContextTag::Neutral);
        let rules = rules();

        let high = score(&rules, 50, Action::IgnoredWarning, &ctx).unwrap();
        let low = score(&rules, -20, Action::IgnoredWarning, &ctx).unwrap();

        assert!(low.applied_delta < high.applied_delta);
        assert_eq!(high.applied_delta, -10);
        assert_eq!(low.applied_delta, -24);
    }

    #[test]
    fn test_curve_is_monotonic() {
        let config = ScoringConfig::default();
        let mut last = vulnerability_curve(SCORE_MAX, &config);
        for s in (SCORE_MIN..SCORE_MAX).rev() {
            let curve = vulnerability_curve(s, &config);
            assert!(curve >= last);
            last = curve;
        }
        assert_eq!(vulnerability_curve(50, &config), 1.0);
        assert_eq!(vulnerability_curve(0, &config), 2.0);
    }

    #[test]
    fn test_single_step_capped() {
        let ctx = ActionContext::new("heavy", ContextTag::Financial);
        let update = score(&rules(), -50, Action::SharedCredentials, &ctx).unwrap();

        assert_eq!(update.applied_delta, -40);
        assert!(update.raw_delta < -40.0);
    }

    #[test]
    fn test_score_clamped_at_bounds() {
        let ctx = ActionContext::new("heavy", ContextTag::Financial);
        let rules = rules();

        let floor = score(&rules, -95, Action::SentMoney, &ctx).unwrap();
        assert_eq!(floor.score, SCORE_MIN);

        let ctx = ActionContext::new("heavy", ContextTag::Neutral);
        let ceiling = score(&rules, 95, Action::ReportedSuspicious, &ctx).unwrap();
        assert_eq!(ceiling.score, SCORE_MAX);
        assert_eq!(ceiling.applied_delta, 5);
    }

    #[test]
    fn test_unknown_character_rejected() {
        let ctx = ActionContext::new("nobody", ContextTag::Neutral);
        let err = score(&rules(), 0, Action::VerifiedSource, &ctx).unwrap_err();
        assert_eq!(
            err,
            EngineError::UnknownCharacter {
                character: "nobody".into()
            }
        );
    }

    #[test]
    fn test_unscored_action_rejected() {
        let ctx = ActionContext::new("maya", ContextTag::Neutral);
        let err = score(&rules(), 0, Action::Create, &ctx).unwrap_err();
        assert!(matches!(err, EngineError::InvalidAction { .. }));
    }
}
