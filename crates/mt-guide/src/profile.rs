//! Guide skills.

use mt_core::{SimRng, Theme};

/// What a guide is good at.  Skills are in `[0, 1]` and fixed for the run.
#[derive(Clone, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GuideProfile {
    pub specialization: Theme,
    /// Shortens presentations.
    pub efficiency:     f64,
    /// Raises answer quality.
    pub knowledge:      f64,
    /// Tighter narration, better answers.
    pub communication:  f64,
    /// Adds extra commentary when off-specialization.
    pub adaptability:   f64,
}

impl GuideProfile {
    /// A competent all-rounder specialising in `specialization`.
    pub fn new(specialization: Theme) -> Self {
        Self {
            specialization,
            efficiency:    0.7,
            knowledge:     0.7,
            communication: 0.7,
            adaptability:  0.7,
        }
    }

    pub fn random(rng: &mut SimRng) -> Self {
        let specialization = Theme::ALL[rng.gen_range(0..Theme::ALL.len())];
        Self {
            specialization,
            efficiency:    rng.gen_range(0.4..1.0),
            knowledge:     rng.gen_range(0.4..1.0),
            communication: rng.gen_range(0.4..1.0),
            adaptability:  rng.gen_range(0.4..1.0),
        }
    }

    /// Ticks spent presenting a stop whose nominal length is `base`.
    pub fn presentation_ticks(&self, base: u64) -> u64 {
        let scale = 1.25 - 0.5 * self.efficiency;
        ((base as f64) * scale).round().max(1.0) as u64
    }
}
