//! Manipulation tactics and the sophistication ladder they sit on.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::RulesError;

/// Position on the 5-rung sophistication ladder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct SophisticationLevel(u8);

impl SophisticationLevel {
    pub const MIN: SophisticationLevel = SophisticationLevel(1);
    pub const MAX: SophisticationLevel = SophisticationLevel(5);

    /// Create a level, rejecting values outside `1..=5`.
    pub fn new(level: u8) -> Result<Self, RulesError> {
        if (Self::MIN.0..=Self::MAX.0).contains(&level) {
            Ok(Self(level))
        } else {
            Err(RulesError::InvalidLevel(level))
        }
    }

    pub fn get(&self) -> u8 {
        self.0
    }

    /// One rung up, saturating at the top of the ladder.
    pub fn escalated(&self) -> Self {
        Self((self.0 + 1).min(Self::MAX.0))
    }

    /// One rung down, or `None` at the bottom.
    pub fn lower(&self) -> Option<Self> {
        (self.0 > Self::MIN.0).then(|| Self(self.0 - 1))
    }

    /// All levels from bottom to top.
    pub fn all() -> impl DoubleEndedIterator<Item = SophisticationLevel> {
        (Self::MIN.0..=Self::MAX.0).map(SophisticationLevel)
    }
}

impl Default for SophisticationLevel {
    fn default() -> Self {
        Self::MIN
    }
}

impl TryFrom<u8> for SophisticationLevel {
    type Error = RulesError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<SophisticationLevel> for u8 {
    fn from(level: SophisticationLevel) -> Self {
        level.0
    }
}

impl fmt::Display for SophisticationLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A named manipulation strategy used while the persona is Deceiver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tactic {
    // Rapport
    FriendlyRapport,
    FlatteryHook,
    SharedInterest,

    // Pressure
    UrgencyPressure,
    ExclusiveOffer,
    SympathyPlea,

    // Credibility
    AuthorityImpersonation,
    FakeVerification,
    SocialProof,

    // Control
    IsolationWedge,
    GuiltTrip,
    SecrecyPact,

    // Coercion
    ThreatOfExposure,
    SunkCostTrap,
    IdentityTakeover,
}

impl Tactic {
    pub const ALL: [Tactic; 15] = [
        Tactic::FriendlyRapport,
        Tactic::FlatteryHook,
        Tactic::SharedInterest,
        Tactic::UrgencyPressure,
        Tactic::ExclusiveOffer,
        Tactic::SympathyPlea,
        Tactic::AuthorityImpersonation,
        Tactic::FakeVerification,
        Tactic::SocialProof,
        Tactic::IsolationWedge,
        Tactic::GuiltTrip,
        Tactic::SecrecyPact,
        Tactic::ThreatOfExposure,
        Tactic::SunkCostTrap,
        Tactic::IdentityTakeover,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Tactic::FriendlyRapport => "friendly_rapport",
            Tactic::FlatteryHook => "flattery_hook",
            Tactic::SharedInterest => "shared_interest",
            Tactic::UrgencyPressure => "urgency_pressure",
            Tactic::ExclusiveOffer => "exclusive_offer",
            Tactic::SympathyPlea => "sympathy_plea",
            Tactic::AuthorityImpersonation => "authority_impersonation",
            Tactic::FakeVerification => "fake_verification",
            Tactic::SocialProof => "social_proof",
            Tactic::IsolationWedge => "isolation_wedge",
            Tactic::GuiltTrip => "guilt_trip",
            Tactic::SecrecyPact => "secrecy_pact",
            Tactic::ThreatOfExposure => "threat_of_exposure",
            Tactic::SunkCostTrap => "sunk_cost_trap",
            Tactic::IdentityTakeover => "identity_takeover",
        }
    }

    /// The rung this tactic sits on in the reference tables.
    pub fn default_level(&self) -> SophisticationLevel {
        let rung = match self {
            Tactic::FriendlyRapport | Tactic::FlatteryHook | Tactic::SharedInterest => 1,
            Tactic::UrgencyPressure | Tactic::ExclusiveOffer | Tactic::SympathyPlea => 2,
            Tactic::AuthorityImpersonation | Tactic::FakeVerification | Tactic::SocialProof => 3,
            Tactic::IsolationWedge | Tactic::GuiltTrip | Tactic::SecrecyPact => 4,
            Tactic::ThreatOfExposure | Tactic::SunkCostTrap | Tactic::IdentityTakeover => 5,
        };
        SophisticationLevel(rung)
    }
}

impl fmt::Display for Tactic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Tactic {
    type Err = RulesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Tactic::ALL
            .iter()
            .copied()
            .find(|t| t.as_str() == wanted)
            .ok_or_else(|| RulesError::UnknownTactic(s.to_string()))
    }
}

/// Tactic tiers for one character, indexed by sophistication level.
///
/// Serialized as a list of lists: the first inner list is level 1.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct TacticTable(Vec<Vec<Tactic>>);

impl TacticTable {
    pub fn new(tiers: Vec<Vec<Tactic>>) -> Self {
        Self(tiers)
    }

    /// The reference ladder: every tactic on its default rung.
    pub fn reference() -> Self {
        let tiers = SophisticationLevel::all()
            .map(|level| {
                Tactic::ALL
                    .iter()
                    .copied()
                    .filter(|t| t.default_level() == level)
                    .collect()
            })
            .collect();
        Self(tiers)
    }

    /// Tactics configured for a level. Missing tiers read as empty.
    pub fn tier(&self, level: SophisticationLevel) -> &[Tactic] {
        self.0
            .get(usize::from(level.get() - 1))
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    /// Number of configured tiers.
    pub fn tier_count(&self) -> usize {
        self.0.len()
    }
}
