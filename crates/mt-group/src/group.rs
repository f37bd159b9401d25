//! The roster of a tour in progress.

use mt_core::{GroupId, GuideId, LocationId, Tick, VisitorId};

use crate::Formation;

/// An ephemeral association of one guide and the visitors it is leading.
///
/// Created when the guide accepts an assignment and dropped when the tour
/// completes.  Member order is the order the dispatcher dequeued them in.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TourGroup {
    id:        GroupId,
    guide:     GuideId,
    members:   Vec<VisitorId>,
    location:  LocationId,
    formation: Formation,
    visited:   usize,
    formed_at: Tick,
}

impl TourGroup {
    pub fn new(
        id:        GroupId,
        guide:     GuideId,
        members:   Vec<VisitorId>,
        location:  LocationId,
        formed_at: Tick,
    ) -> Self {
        Self {
            id,
            guide,
            members,
            location,
            formation: Formation::default(),
            visited: 0,
            formed_at,
        }
    }

    pub fn id(&self) -> GroupId {
        self.id
    }

    pub fn guide(&self) -> GuideId {
        self.guide
    }

    pub fn members(&self) -> &[VisitorId] {
        &self.members
    }

    pub fn size(&self) -> usize {
        self.members.len()
    }

    pub fn contains(&self, visitor: VisitorId) -> bool {
        self.members.contains(&visitor)
    }

    /// Drop a member from the roster.  Returns `false` if it was not a member.
    pub fn remove_member(&mut self, visitor: VisitorId) -> bool {
        let before = self.members.len();
        self.members.retain(|&v| v != visitor);
        self.members.len() != before
    }

    pub fn location(&self) -> LocationId {
        self.location
    }

    pub fn set_location(&mut self, location: LocationId) {
        self.location = location;
    }

    pub fn formation(&self) -> Formation {
        self.formation
    }

    pub fn set_formation(&mut self, formation: Formation) {
        self.formation = formation;
    }

    /// Stops presented so far.
    pub fn visited(&self) -> usize {
        self.visited
    }

    pub fn record_visit(&mut self) {
        self.visited += 1;
    }

    pub fn formed_at(&self) -> Tick {
        self.formed_at
    }
}
