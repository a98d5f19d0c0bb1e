//! Narrative branch selection from the running misstep count.

use bleed_rules::{BranchThresholds, Disposition};
use serde::{Deserialize, Serialize};

/// Which way the scene should go after a decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NarrativeBranch {
    /// The player made a safe call; move the story forward.
    Advance,
    Hold,
    /// Enough missteps to show the player a warning beat.
    Warn,
    /// The storyline's failure path.
    Fail,
}

/// Update the misstep count for a decision and pick the branch.
///
/// Safe decisions pay one misstep back (never below zero); risky ones add
/// one; neutral ones leave the count alone.
pub fn select_branch(
    missteps: u32,
    disposition: Disposition,
    thresholds: &BranchThresholds,
) -> (NarrativeBranch, u32) {
    match disposition {
        Disposition::Safe => (NarrativeBranch::Advance, missteps.saturating_sub(1)),
        Disposition::Neutral => (NarrativeBranch::Hold, missteps),
        Disposition::Risky => {
            let missteps = missteps + 1;
            let branch = if missteps >= thresholds.fail_after {
                NarrativeBranch::Fail
            } else if missteps >= thresholds.warn_after {
                NarrativeBranch::Warn
            } else {
                NarrativeBranch::Hold
            };
            (branch, missteps)
        }
    }
}
