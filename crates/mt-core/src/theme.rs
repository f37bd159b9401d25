//! Exhibit themes.
//!
//! The same closed set describes what a location is about, what a visitor
//! prefers, and what a guide specializes in, so matching is a plain equality.

use std::fmt;
use std::str::FromStr;

use crate::MtError;

#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Theme {
    Art,
    History,
    Science,
    Nature,
    Culture,
}

impl Theme {
    pub const ALL: [Theme; 5] = [
        Theme::Art,
        Theme::History,
        Theme::Science,
        Theme::Nature,
        Theme::Culture,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Art     => "art",
            Theme::History => "history",
            Theme::Science => "science",
            Theme::Nature  => "nature",
            Theme::Culture => "culture",
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Theme {
    type Err = MtError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "art"     => Ok(Theme::Art),
            "history" => Ok(Theme::History),
            "science" => Ok(Theme::Science),
            "nature"  => Ok(Theme::Nature),
            "culture" => Ok(Theme::Culture),
            other     => Err(MtError::Parse(format!("unknown theme {other:?}"))),
        }
    }
}
