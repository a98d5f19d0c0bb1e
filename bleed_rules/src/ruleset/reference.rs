//! Built-in reference content: the three shipped storylines.

use super::Ruleset;
use crate::entities::VulnerabilityProfile;
use crate::mechanics::{Action, ContextTag};

impl Ruleset {
    /// The reference ruleset shipped with the game.
    pub fn reference() -> Self {
        Ruleset::new()
            .with_character("maya", maya())
            .with_character("eli", eli())
            .with_character("stanley", stanley())
    }
}

fn maya() -> VulnerabilityProfile {
    with_common_intents(
        VulnerabilityProfile::new("Maya", 50)
            .with_multiplier(ContextTag::Romantic, 1.5)
            .with_multiplier(ContextTag::Social, 1.2)
            .with_recovery_rate(0.7)
            .with_intent("reverse image", Action::VerifiedSource)
            .with_intent("video call", Action::AskedForProof),
    )
    .with_intent("send a photo", Action::SharedPersonalInfo)
    .with_intent("meet up", Action::AcceptedStrangerRequest)
}

fn eli() -> VulnerabilityProfile {
    with_common_intents(
        VulnerabilityProfile::new("Eli", 20)
            .with_multiplier(ContextTag::Competitive, 1.5)
            .with_multiplier(ContextTag::Financial, 1.3)
            .with_recovery_rate(0.9)
            .with_intent("official site", Action::VerifiedSource),
    )
    .with_intent("skin", Action::ClickedUnknownLink)
    .with_intent("login", Action::SharedCredentials)
}

fn stanley() -> VulnerabilityProfile {
    with_common_intents(
        VulnerabilityProfile::new("Stanley", -10)
            .with_multiplier(ContextTag::Authority, 1.5)
            .with_multiplier(ContextTag::Financial, 1.4)
            .with_recovery_rate(0.8)
            .with_intent("call the bank", Action::VerifiedSource)
            .with_intent("my daughter", Action::ToldTrustedPerson),
    )
    .with_intent("gift card", Action::SentMoney)
    .with_intent("wire", Action::SentMoney)
}

/// Keyword rules every storyline shares. Safe phrasings come first so a
/// message mentioning both wins on the safe side, except for negated
/// disclosure ("won't tell") which must outrank "tell".
fn with_common_intents(profile: VulnerabilityProfile) -> VulnerabilityProfile {
    profile
        .with_intent("won't tell", Action::AgreedToSecrecy)
        .with_intent("our secret", Action::AgreedToSecrecy)
        .with_intent("verify", Action::VerifiedSource)
        .with_intent("report", Action::ReportedSuspicious)
        .with_intent("block", Action::BlockedContact)
        .with_intent("prove", Action::AskedForProof)
        .with_intent("proof", Action::AskedForProof)
        .with_intent("no thanks", Action::DeclinedRequest)
        .with_intent("not interested", Action::DeclinedRequest)
        .with_intent("tell my", Action::ToldTrustedPerson)
        .with_intent("suspicious", Action::HeededWarning)
        .with_intent("password", Action::SharedCredentials)
        .with_intent("send money", Action::SentMoney)
        .with_intent("transfer", Action::SentMoney)
        .with_intent("my address", Action::SharedPersonalInfo)
        .with_intent("my number", Action::SharedPersonalInfo)
        .with_intent("click", Action::ClickedUnknownLink)
        .with_intent("whatever", Action::IgnoredWarning)
        .with_intent("sure, add me", Action::AcceptedStrangerRequest)
}
