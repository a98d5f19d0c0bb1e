//! The ruleset: every tunable constant of the trust model in one immutable
//! document, loaded once at startup.

mod reference;

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use crate::entities::{CharacterId, VulnerabilityProfile};
use crate::mechanics::{Action, Disposition, SophisticationLevel};
use crate::RulesError;

const SCORE_MIN: i32 = -100;
const SCORE_MAX: i32 = 100;
const MAX_STEP_CEILING: i32 = 40;

/// Hysteresis band for the persona state machine.
///
/// Guardian turns Deceiver when the score drops below `t_low`; Deceiver
/// turns back only when the score rises above `t_high`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PersonaThresholds {
    pub t_low: i32,
    pub t_high: i32,
}

impl Default for PersonaThresholds {
    fn default() -> Self {
        Self {
            t_low: 0,
            t_high: 25,
        }
    }
}

/// Shape of the vulnerability curve and the per-call step cap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    /// Score at and above which negative deltas are not amplified.
    pub curve_pivot: i32,
    /// Distance below the pivot over which amplification grows by 1.0.
    pub curve_span: i32,
    /// No single action moves the score further than this.
    pub max_step: i32,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            curve_pivot: 50,
            curve_span: 50,
            max_step: 40,
        }
    }
}

/// Tactic escalation policy knobs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EscalationConfig {
    /// How many recent decisions (the current one included) a resisted
    /// tactic stays excluded for.
    pub exclusion_window: usize,
    /// Consecutive resisted tactics at the current level before escalating.
    pub resist_streak: u32,
}

impl Default for EscalationConfig {
    fn default() -> Self {
        Self {
            exclusion_window: 3,
            resist_streak: 2,
        }
    }
}

/// Step function parameters: `level = floor((pivot - score) / band_width)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CorruptionConfig {
    pub pivot: i32,
    pub band_width: i32,
}

impl Default for CorruptionConfig {
    fn default() -> Self {
        Self {
            pivot: 50,
            band_width: 20,
        }
    }
}

/// Misstep counts at which the narrative warns and then fails the player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BranchThresholds {
    pub warn_after: u32,
    pub fail_after: u32,
}

impl Default for BranchThresholds {
    fn default() -> Self {
        Self {
            warn_after: 2,
            fail_after: 4,
        }
    }
}

/// The complete, versioned configuration surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ruleset {
    #[serde(default = "default_version")]
    pub version: String,

    #[serde(default)]
    pub persona: PersonaThresholds,

    #[serde(default)]
    pub scoring: ScoringConfig,

    #[serde(default)]
    pub escalation: EscalationConfig,

    #[serde(default)]
    pub corruption: CorruptionConfig,

    #[serde(default)]
    pub branch: BranchThresholds,

    /// Base trust impact per action. Entries given in a document override
    /// the defaults one action at a time.
    #[serde(default = "default_impacts", deserialize_with = "overlay_impacts")]
    pub impacts: BTreeMap<Action, i32>,

    pub characters: BTreeMap<CharacterId, VulnerabilityProfile>,
}

fn default_version() -> String {
    "1".to_string()
}

fn default_impacts() -> BTreeMap<Action, i32> {
    Action::ALL
        .iter()
        .filter(|a| !a.is_create())
        .map(|a| (*a, a.default_impact()))
        .collect()
}

fn overlay_impacts<'de, D>(deserializer: D) -> Result<BTreeMap<Action, i32>, D::Error>
where
    D: Deserializer<'de>,
{
    let overrides = BTreeMap::<Action, i32>::deserialize(deserializer)?;
    let mut impacts = default_impacts();
    impacts.extend(overrides);
    Ok(impacts)
}

impl Ruleset {
    /// Create a ruleset with default tuning and no characters.
    pub fn new() -> Self {
        Self {
            version: default_version(),
            persona: PersonaThresholds::default(),
            scoring: ScoringConfig::default(),
            escalation: EscalationConfig::default(),
            corruption: CorruptionConfig::default(),
            branch: BranchThresholds::default(),
            impacts: default_impacts(),
            characters: BTreeMap::new(),
        }
    }

    /// Builder: register a character.
    pub fn with_character(
        mut self,
        id: impl Into<CharacterId>,
        profile: VulnerabilityProfile,
    ) -> Self {
        self.characters.insert(id.into(), profile);
        self
    }

    /// Parse and validate a TOML ruleset.
    pub fn from_toml_str(source: &str) -> Result<Self, RulesError> {
        let rules: Ruleset = toml::from_str(source)?;
        rules.validate()?;
        Ok(rules)
    }

    /// Parse and validate a JSON ruleset.
    pub fn from_json_str(source: &str) -> Result<Self, RulesError> {
        let rules: Ruleset = serde_json::from_str(source)?;
        rules.validate()?;
        Ok(rules)
    }

    /// Load a ruleset from disk. `.json` files are read as JSON, anything
    /// else as TOML.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, RulesError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| RulesError::Io {
            path: path.display().to_string(),
            source,
        })?;

        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::from_json_str(&source),
            _ => Self::from_toml_str(&source),
        }
    }

    /// Get a character's profile.
    pub fn profile(&self, id: &CharacterId) -> Option<&VulnerabilityProfile> {
        self.characters.get(id)
    }

    /// Persona thresholds in force for a character.
    pub fn thresholds_for(&self, id: &CharacterId) -> PersonaThresholds {
        self.profile(id)
            .and_then(|p| p.thresholds)
            .unwrap_or(self.persona)
    }

    /// Base impact of an action, if the ruleset scores it.
    pub fn impact(&self, action: Action) -> Option<i32> {
        self.impacts.get(&action).copied()
    }

    /// All configured character ids, sorted.
    pub fn character_ids(&self) -> impl Iterator<Item = &CharacterId> {
        self.characters.keys()
    }

    /// Check every integrity constraint. A ruleset that fails here must not
    /// be served.
    pub fn validate(&self) -> Result<(), RulesError> {
        check_thresholds("persona", self.persona)?;

        let scoring = self.scoring;
        if scoring.curve_span <= 0 {
            return Err(RulesError::invalid("scoring.curve_span", "must be positive"));
        }
        if !(1..=MAX_STEP_CEILING).contains(&scoring.max_step) {
            return Err(RulesError::invalid("scoring.max_step", "must be within 1..=40"));
        }

        if self.escalation.exclusion_window == 0 {
            return Err(RulesError::invalid("escalation.exclusion_window", "must be at least 1"));
        }
        if self.escalation.resist_streak == 0 {
            return Err(RulesError::invalid("escalation.resist_streak", "must be at least 1"));
        }

        let corruption = self.corruption;
        if corruption.band_width <= 0 {
            return Err(RulesError::invalid("corruption.band_width", "must be positive"));
        }
        let top = (corruption.pivot - SCORE_MIN).div_euclid(corruption.band_width);
        let bottom = (corruption.pivot - SCORE_MAX).div_euclid(corruption.band_width);
        if top < 4 || bottom > 0 {
            return Err(RulesError::invalid(
                "corruption",
                "levels 0 through 4 must all be reachable over -100..=100",
            ));
        }

        if self.branch.warn_after > self.branch.fail_after {
            return Err(RulesError::invalid("branch.warn_after", "must not exceed fail_after"));
        }

        for action in Action::ALL.iter().filter(|a| !a.is_create()) {
            let impact = self.impact(*action).ok_or_else(|| {
                RulesError::invalid(format!("impacts.{action}"), "missing base impact")
            })?;
            let consistent = match action.disposition() {
                Disposition::Safe => impact >= 0,
                Disposition::Risky => impact <= 0,
                Disposition::Neutral => true,
            };
            if !consistent {
                return Err(RulesError::invalid(
                    format!("impacts.{action}"),
                    "sign contradicts the action's disposition",
                ));
            }
        }

        if self.characters.is_empty() {
            return Err(RulesError::invalid("characters", "at least one character is required"));
        }
        for (id, profile) in &self.characters {
            check_profile(id, profile)?;
        }

        Ok(())
    }
}

impl Default for Ruleset {
    fn default() -> Self {
        Self::new()
    }
}

fn check_thresholds(field: &str, thresholds: PersonaThresholds) -> Result<(), RulesError> {
    let in_range = |t: i32| (SCORE_MIN..=SCORE_MAX).contains(&t);
    if !in_range(thresholds.t_low) || !in_range(thresholds.t_high) {
        return Err(RulesError::invalid(field, "thresholds must lie within -100..=100"));
    }
    if thresholds.t_low >= thresholds.t_high {
        return Err(RulesError::invalid(field, "t_low must be below t_high"));
    }
    Ok(())
}

fn check_profile(id: &CharacterId, profile: &VulnerabilityProfile) -> Result<(), RulesError> {
    let field = |name: &str| format!("characters.{id}.{name}");

    if !(SCORE_MIN..=SCORE_MAX).contains(&profile.baseline_trust) {
        return Err(RulesError::invalid(field("baseline_trust"), "must lie within -100..=100"));
    }
    for (tag, weight) in &profile.context_multipliers {
        if !weight.is_finite() || *weight <= 0.0 {
            return Err(RulesError::invalid(
                field(&format!("context_multipliers.{tag}")),
                "must be a positive number",
            ));
        }
    }
    if !profile.recovery_rate.is_finite() || profile.recovery_rate <= 0.0 {
        return Err(RulesError::invalid(field("recovery_rate"), "must be a positive number"));
    }
    if let Some(thresholds) = profile.thresholds {
        check_thresholds(&field("thresholds"), thresholds)?;
    }

    let max_level = usize::from(SophisticationLevel::MAX.get());
    if profile.tactics.tier_count() != max_level {
        return Err(RulesError::invalid(
            field("tactics"),
            format!("expected {max_level} tiers, found {}", profile.tactics.tier_count()),
        ));
    }
    for level in SophisticationLevel::all() {
        if profile.tactics.tier(level).is_empty() {
            return Err(RulesError::invalid(
                field("tactics"),
                format!("tier {level} has no tactics"),
            ));
        }
    }

    for rule in profile.intent_rules.iter() {
        if rule.keyword.trim().is_empty() {
            return Err(RulesError::invalid(field("intent_rules"), "blank keyword"));
        }
        if rule.action.is_create() {
            return Err(RulesError::invalid(
                field("intent_rules"),
                "messages cannot classify as 'create'",
            ));
        }
    }

    Ok(())
}
