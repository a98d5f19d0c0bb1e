//! Character vulnerability profiles.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::mechanics::{Action, ContextTag, TacticTable};
use crate::ruleset::PersonaThresholds;

/// Static, per-character tuning of the trust model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VulnerabilityProfile {
    pub display_name: String,

    /// Starting trust score. May be negative (innate vulnerability).
    pub baseline_trust: i32,

    /// Weight applied to raw deltas per context. Missing tags weigh 1.0.
    #[serde(default)]
    pub context_multipliers: BTreeMap<ContextTag, f64>,

    /// Multiplier on positive deltas; below 1.0 means trust rebuilds slowly.
    #[serde(default = "default_recovery_rate")]
    pub recovery_rate: f64,

    /// Tactic tiers, level 1 first.
    #[serde(default = "TacticTable::reference")]
    pub tactics: TacticTable,

    /// Overrides the ruleset-wide persona thresholds for this character.
    #[serde(default)]
    pub thresholds: Option<PersonaThresholds>,

    #[serde(default)]
    pub intent_rules: IntentRules,
}

fn default_recovery_rate() -> f64 {
    1.0
}

impl VulnerabilityProfile {
    /// Create a profile with neutral weights and the reference tactic ladder.
    pub fn new(display_name: impl Into<String>, baseline_trust: i32) -> Self {
        Self {
            display_name: display_name.into(),
            baseline_trust,
            context_multipliers: BTreeMap::new(),
            recovery_rate: default_recovery_rate(),
            tactics: TacticTable::reference(),
            thresholds: None,
            intent_rules: IntentRules::default(),
        }
    }

    /// Builder: set the weight for one context.
    pub fn with_multiplier(mut self, tag: ContextTag, weight: f64) -> Self {
        self.context_multipliers.insert(tag, weight);
        self
    }

    /// Builder: set the recovery rate.
    pub fn with_recovery_rate(mut self, rate: f64) -> Self {
        self.recovery_rate = rate;
        self
    }

    /// Builder: replace the tactic table.
    pub fn with_tactics(mut self, tactics: TacticTable) -> Self {
        self.tactics = tactics;
        self
    }

    /// Builder: override persona thresholds.
    pub fn with_thresholds(mut self, thresholds: PersonaThresholds) -> Self {
        self.thresholds = Some(thresholds);
        self
    }

    /// Builder: append a keyword rule.
    pub fn with_intent(mut self, keyword: impl Into<String>, action: Action) -> Self {
        self.intent_rules.push(keyword, action);
        self
    }

    /// Weight applied to deltas in `tag`.
    pub fn multiplier(&self, tag: ContextTag) -> f64 {
        self.context_multipliers.get(&tag).copied().unwrap_or(1.0)
    }
}

/// One keyword-to-action mapping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntentRule {
    pub keyword: String,
    pub action: Action,
}

/// Ordered keyword table used to classify free-text player messages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct IntentRules(Vec<IntentRule>);

impl IntentRules {
    pub fn push(&mut self, keyword: impl Into<String>, action: Action) {
        self.0.push(IntentRule {
            keyword: keyword.into(),
            action,
        });
    }

    /// First rule whose keyword occurs in the message, case-insensitively.
    pub fn classify(&self, message: &str) -> Option<Action> {
        let message = message.to_lowercase();
        self.0
            .iter()
            .filter(|rule| !rule.keyword.trim().is_empty())
            .find(|rule| message.contains(&rule.keyword.to_lowercase()))
            .map(|rule| rule.action)
    }

    pub fn iter(&self) -> impl Iterator<Item = &IntentRule> {
        self.0.iter()
    }
}
