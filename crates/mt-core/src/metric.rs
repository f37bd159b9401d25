//! Mood metrics shared by visitors, guides and the group aggregator.

use std::fmt;

/// One of the per-visitor metrics tracked by the group aggregator.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Metric {
    Satisfaction,
    Fatigue,
    Cohesion,
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Metric::Satisfaction => "satisfaction",
            Metric::Fatigue      => "fatigue",
            Metric::Cohesion     => "cohesion",
        })
    }
}

/// Clamp `x` into `[0, 1]`.  NaN maps to 0.
#[inline]
pub fn unit(x: f64) -> f64 {
    if x.is_nan() { 0.0 } else { x.clamp(0.0, 1.0) }
}

/// Exponential moving average: `keep * old + (1 - keep) * sample`, clamped.
#[inline]
pub fn ema(old: f64, sample: f64, keep: f64) -> f64 {
    unit(keep * old + (1.0 - keep) * sample)
}
