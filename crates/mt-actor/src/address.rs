//! Actor addresses and registry capabilities.

use std::fmt;

use mt_core::{GuideId, VisitorId};

/// Where a message can be delivered.
///
/// `External` is the outside world (test harness, operator console).  Mail
/// sent to it is dropped by the event loop; mail from it is how emergencies
/// are injected.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Address {
    Dispatcher,
    Guide(GuideId),
    Visitor(VisitorId),
    External,
}

impl Address {
    /// Stable RNG stream number for this address.
    ///
    /// The kind occupies the high 32 bits so guide and visitor ids never
    /// collide.
    pub fn stream(self) -> u64 {
        match self {
            Address::Dispatcher   => 0,
            Address::Guide(g)     => (1 << 32) | u64::from(g.0),
            Address::Visitor(v)   => (2 << 32) | u64::from(v.0),
            Address::External     => 3 << 32,
        }
    }

    pub fn as_guide(self) -> Option<GuideId> {
        match self {
            Address::Guide(g) => Some(g),
            _ => None,
        }
    }

    pub fn as_visitor(self) -> Option<VisitorId> {
        match self {
            Address::Visitor(v) => Some(v),
            _ => None,
        }
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Address::Dispatcher => f.write_str("Dispatcher"),
            Address::Guide(g)   => write!(f, "{g}"),
            Address::Visitor(v) => write!(f, "{v}"),
            Address::External   => f.write_str("External"),
        }
    }
}

/// What an actor registers itself as, and what others look up.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Capability {
    Dispatcher,
    Guide,
    Visitor,
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Capability::Dispatcher => "dispatcher",
            Capability::Guide      => "guide",
            Capability::Visitor    => "visitor",
        })
    }
}
