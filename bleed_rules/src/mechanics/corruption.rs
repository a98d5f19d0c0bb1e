//! Environmental corruption tiers and the presentation directives they imply.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Discrete visual/audio severity tier, `0..=4`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct CorruptionLevel(u8);

impl CorruptionLevel {
    pub const CLEAN: CorruptionLevel = CorruptionLevel(0);
    pub const MAX: CorruptionLevel = CorruptionLevel(4);

    /// Build a level, saturating anything above the top tier.
    pub fn saturating(level: u8) -> Self {
        Self(level.min(Self::MAX.0))
    }

    pub fn get(&self) -> u8 {
        self.0
    }

    /// Presentation directives for this tier.
    pub fn directives(&self) -> CorruptionDirectives {
        let (visual, audio) = match self.0 {
            0 => (VisualEffect::Clean, AudioCue::Ambient),
            1 => (VisualEffect::Flicker, AudioCue::LowHum),
            2 => (VisualEffect::Scanlines, AudioCue::Static),
            3 => (VisualEffect::ChromaticSplit, AudioCue::Distortion),
            _ => (VisualEffect::Breach, AudioCue::Feedback),
        };
        CorruptionDirectives {
            visual,
            audio,
            glitch_intensity: f32::from(self.0) / f32::from(Self::MAX.0),
            logo_stage: self.0 + 1,
        }
    }
}

impl fmt::Display for CorruptionLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Screen treatment requested from the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VisualEffect {
    Clean,
    Flicker,
    Scanlines,
    ChromaticSplit,
    /// Full-screen takeover.
    Breach,
}

/// Sound bed requested from the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AudioCue {
    Ambient,
    LowHum,
    Static,
    Distortion,
    Feedback,
}

/// What the presentation layer should render for a corruption tier.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CorruptionDirectives {
    pub visual: VisualEffect,
    pub audio: AudioCue,
    /// 0.0 at a clean screen, 1.0 at full breach.
    pub glitch_intensity: f32,
    /// Logo degradation stage, `1..=5`.
    pub logo_stage: u8,
}
