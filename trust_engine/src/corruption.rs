//! Maps a trust score onto a discrete corruption level.

use bleed_rules::{CorruptionConfig, CorruptionLevel};

/// `clamp(floor((pivot - score) / band_width), 0, 4)`.
///
/// Pure and monotonic: a lower score never yields a lower level.
pub fn corruption_level(score: i32, config: &CorruptionConfig) -> CorruptionLevel {
    let band = config.band_width.max(1);
    let raw = (config.pivot - score).div_euclid(band);
    CorruptionLevel::saturating(raw.clamp(0, i32::from(CorruptionLevel::MAX.get())) as u8)
}
