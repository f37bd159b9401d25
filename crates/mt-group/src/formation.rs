//! Group formations.

use std::fmt;

/// How tightly a group walks and stands around its guide.
///
/// Ordered from strictest to loosest: `Line < Cluster < Circle`.  A stricter
/// formation raises cohesion but leaves less room for questions.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Formation {
    Line,
    #[default]
    Cluster,
    Circle,
}

impl Formation {
    /// One step stricter, saturating at `Line`.
    pub fn tighten(self) -> Formation {
        match self {
            Formation::Circle  => Formation::Cluster,
            Formation::Cluster | Formation::Line => Formation::Line,
        }
    }

    /// One step looser, saturating at `Circle`.
    pub fn loosen(self) -> Formation {
        match self {
            Formation::Line    => Formation::Cluster,
            Formation::Cluster | Formation::Circle => Formation::Circle,
        }
    }

    pub fn is_strictest(self) -> bool {
        self == Formation::Line
    }

    /// Additive cohesion a visitor perceives while walking in this formation.
    pub fn cohesion_bonus(self) -> f64 {
        match self {
            Formation::Line    => 0.25,
            Formation::Cluster => 0.15,
            Formation::Circle  => 0.05,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Formation::Line    => "line",
            Formation::Cluster => "cluster",
            Formation::Circle  => "circle",
        }
    }
}

impl fmt::Display for Formation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
