//! Game mechanics: the closed vocabularies the engine reasons about.
//!
//! Every string that crosses the wire (`action`, `contextTag`, `tactic`,
//! `activePersona`) parses into one of the enums here, so unknown vocabulary
//! is rejected at the boundary instead of falling through a string match.

mod corruption;
mod tactics;

pub use corruption::*;
pub use tactics::*;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::RulesError;

/// A symbolic player decision.
///
/// The vocabulary is versioned together with the ruleset; adding a variant
/// requires a base impact in every shipped ruleset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    /// Opens (or restarts) a storyline session. Never scored.
    Create,

    // Safe decisions
    VerifiedSource,
    ReportedSuspicious,
    BlockedContact,
    AskedForProof,
    DeclinedRequest,
    ToldTrustedPerson,
    HeededWarning,

    // Risky decisions
    SharedPersonalInfo,
    IgnoredWarning,
    ClickedUnknownLink,
    AcceptedStrangerRequest,
    AgreedToSecrecy,
    SentMoney,
    SharedCredentials,

    // Neither
    ContinuedConversation,
}

impl Action {
    /// Every action in declaration order.
    pub const ALL: [Action; 16] = [
        Action::Create,
        Action::VerifiedSource,
        Action::ReportedSuspicious,
        Action::BlockedContact,
        Action::AskedForProof,
        Action::DeclinedRequest,
        Action::ToldTrustedPerson,
        Action::HeededWarning,
        Action::SharedPersonalInfo,
        Action::IgnoredWarning,
        Action::ClickedUnknownLink,
        Action::AcceptedStrangerRequest,
        Action::AgreedToSecrecy,
        Action::SentMoney,
        Action::SharedCredentials,
        Action::ContinuedConversation,
    ];

    /// Wire name of the action.
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Create => "create",
            Action::VerifiedSource => "verified_source",
            Action::ReportedSuspicious => "reported_suspicious",
            Action::BlockedContact => "blocked_contact",
            Action::AskedForProof => "asked_for_proof",
            Action::DeclinedRequest => "declined_request",
            Action::ToldTrustedPerson => "told_trusted_person",
            Action::HeededWarning => "heeded_warning",
            Action::SharedPersonalInfo => "shared_personal_info",
            Action::IgnoredWarning => "ignored_warning",
            Action::ClickedUnknownLink => "clicked_unknown_link",
            Action::AcceptedStrangerRequest => "accepted_stranger_request",
            Action::AgreedToSecrecy => "agreed_to_secrecy",
            Action::SentMoney => "sent_money",
            Action::SharedCredentials => "shared_credentials",
            Action::ContinuedConversation => "continued_conversation",
        }
    }

    /// Whether the decision resists manipulation, gives in to it, or neither.
    pub fn disposition(&self) -> Disposition {
        match self {
            Action::VerifiedSource
            | Action::ReportedSuspicious
            | Action::BlockedContact
            | Action::AskedForProof
            | Action::DeclinedRequest
            | Action::ToldTrustedPerson
            | Action::HeededWarning => Disposition::Safe,

            Action::SharedPersonalInfo
            | Action::IgnoredWarning
            | Action::ClickedUnknownLink
            | Action::AcceptedStrangerRequest
            | Action::AgreedToSecrecy
            | Action::SentMoney
            | Action::SharedCredentials => Disposition::Risky,

            Action::Create | Action::ContinuedConversation => Disposition::Neutral,
        }
    }

    /// Base trust impact used by the reference ruleset.
    pub fn default_impact(&self) -> i32 {
        match self {
            Action::Create => 0,
            Action::VerifiedSource => 12,
            Action::ReportedSuspicious => 15,
            Action::BlockedContact => 10,
            Action::AskedForProof => 8,
            Action::DeclinedRequest => 6,
            Action::ToldTrustedPerson => 14,
            Action::HeededWarning => 8,
            Action::SharedPersonalInfo => -15,
            Action::IgnoredWarning => -10,
            Action::ClickedUnknownLink => -12,
            Action::AcceptedStrangerRequest => -8,
            Action::AgreedToSecrecy => -10,
            Action::SentMoney => -25,
            Action::SharedCredentials => -30,
            Action::ContinuedConversation => 0,
        }
    }

    /// Whether this action opens a session rather than acting inside one.
    pub fn is_create(&self) -> bool {
        matches!(self, Action::Create)
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Action {
    type Err = RulesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Action::ALL
            .iter()
            .copied()
            .find(|a| a.as_str() == wanted)
            .ok_or_else(|| RulesError::UnknownAction(s.to_string()))
    }
}

/// How a decision relates to the antagonist's manipulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Disposition {
    /// A good/safe decision; counts as resisting the active tactic.
    Safe,
    /// Giving in to the manipulation.
    Risky,
    Neutral,
}

/// The emotional framing a decision happened in.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "snake_case")]
pub enum ContextTag {
    Romantic,
    Competitive,
    Authority,
    Social,
    Financial,
    #[default]
    Neutral,
}

impl ContextTag {
    pub const ALL: [ContextTag; 6] = [
        ContextTag::Romantic,
        ContextTag::Competitive,
        ContextTag::Authority,
        ContextTag::Social,
        ContextTag::Financial,
        ContextTag::Neutral,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ContextTag::Romantic => "romantic",
            ContextTag::Competitive => "competitive",
            ContextTag::Authority => "authority",
            ContextTag::Social => "social",
            ContextTag::Financial => "financial",
            ContextTag::Neutral => "neutral",
        }
    }
}

impl fmt::Display for ContextTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContextTag {
    type Err = RulesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        ContextTag::ALL
            .iter()
            .copied()
            .find(|t| t.as_str() == wanted)
            .ok_or_else(|| RulesError::UnknownContextTag(s.to_string()))
    }
}

/// The antagonist's behavioral mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Persona {
    /// Cooperative: helps the player spot red flags.
    Guardian,
    /// Adversarial: runs manipulation tactics against the player.
    Deceiver,
}

impl Persona {
    pub fn as_str(&self) -> &'static str {
        match self {
            Persona::Guardian => "Guardian",
            Persona::Deceiver => "Deceiver",
        }
    }
}

impl fmt::Display for Persona {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
