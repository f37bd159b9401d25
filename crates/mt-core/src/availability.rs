//! Guide availability as the dispatcher sees it.

use std::fmt;

/// `Available → Busy → CoolingDown → Available`.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Availability {
    Available,
    Busy,
    CoolingDown,
}

impl Availability {
    pub fn as_str(self) -> &'static str {
        match self {
            Availability::Available   => "available",
            Availability::Busy        => "busy",
            Availability::CoolingDown => "cooling_down",
        }
    }
}

impl fmt::Display for Availability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
