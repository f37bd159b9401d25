//! Static visitor traits.

use std::fmt;

use mt_core::{SimRng, Theme};

/// Where a visitor comes from.  Only used for reporting.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Origin {
    Local,
    Domestic,
    International,
}

impl Origin {
    pub const ALL: [Origin; 3] = [Origin::Local, Origin::Domestic, Origin::International];
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Origin::Local         => "local",
            Origin::Domestic      => "domestic",
            Origin::International => "international",
        })
    }
}

/// Personality traits, each in `[0, 1]`.
///
/// Everything except `experience` is fixed for the visitor's lifetime;
/// experience grows by a step after every tour.
#[derive(Copy, Clone, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Personality {
    pub curiosity:   f64,
    pub sociability: f64,
    pub patience:    f64,
    pub energy:      f64,
    pub experience:  f64,
}

impl Default for Personality {
    fn default() -> Self {
        Self {
            curiosity:   0.5,
            sociability: 0.5,
            patience:    0.5,
            energy:      0.5,
            experience:  0.0,
        }
    }
}

impl Personality {
    /// Draw a fresh personality.  First-time visitors start with little
    /// experience.
    pub fn random(rng: &mut SimRng) -> Self {
        Self {
            curiosity:   rng.gen_range(0.0..1.0),
            sociability: rng.gen_range(0.0..1.0),
            patience:    rng.gen_range(0.0..1.0),
            energy:      rng.gen_range(0.2..1.0),
            experience:  rng.gen_range(0.0..0.3),
        }
    }
}

/// Everything fixed about a visitor at arrival.
#[derive(Clone, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VisitorProfile {
    pub personality: Personality,
    pub origin:      Origin,
    /// Themes this visitor enjoys.  Never empty for generated profiles.
    pub preferences: Vec<Theme>,
}

impl Default for VisitorProfile {
    fn default() -> Self {
        Self {
            personality: Personality::default(),
            origin:      Origin::Local,
            preferences: vec![Theme::Art],
        }
    }
}

impl VisitorProfile {
    pub fn prefers(&self, theme: Theme) -> bool {
        self.preferences.contains(&theme)
    }
}
