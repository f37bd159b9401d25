//! Museum layout: the fixed set of locations a tour can visit.
//!
//! Locations are stored densely, indexed by `LocationId`, so lookups are a
//! bounds-checked `Vec` index.  A valid layout has exactly one entrance, one
//! exit and at least one exhibit; the default tour is the exhibits in
//! declaration order.

use mt_core::{LocationId, Theme};

use crate::{Itinerary, ScheduleError, ScheduleResult};

/// What role a location plays in a tour.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum LocationKind {
    Entrance,
    Exhibit,
    Exit,
}

/// One room or exhibit.
///
/// Occupancy and availability are *not* stored here: they are owned by the
/// dispatcher, the single writer of shared museum state.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Location {
    pub id:              LocationId,
    /// Short stable name, e.g. `"Exhibit3"`.
    pub name:            String,
    /// Human-facing title used in narration.
    pub title:           String,
    pub theme:           Theme,
    /// Visitors the room holds comfortably.
    pub capacity:        usize,
    /// How long a guide presents here, in ticks.
    pub narration_ticks: u64,
    pub kind:            LocationKind,
}

#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MuseumLayout {
    locations: Vec<Location>,
    entrance:  LocationId,
    exit:      LocationId,
    tour:      Vec<LocationId>,
}

impl MuseumLayout {
    /// Validate and index `locations`.
    ///
    /// Ids must be dense (`0..n`) in any order; every capacity must be
    /// positive.
    pub fn new(mut locations: Vec<Location>) -> ScheduleResult<Self> {
        locations.sort_by_key(|l| l.id);
        for (i, loc) in locations.iter().enumerate() {
            if loc.id.index() != i {
                return Err(ScheduleError::Layout(format!(
                    "location ids must be dense from 0; found {} at position {i}",
                    loc.id
                )));
            }
            if loc.capacity == 0 {
                return Err(ScheduleError::Layout(format!("{} has zero capacity", loc.name)));
            }
        }

        let of_kind = |kind: LocationKind| -> Vec<LocationId> {
            locations.iter().filter(|l| l.kind == kind).map(|l| l.id).collect()
        };
        let entrances = of_kind(LocationKind::Entrance);
        let exits = of_kind(LocationKind::Exit);
        let tour = of_kind(LocationKind::Exhibit);

        let &[entrance] = entrances.as_slice() else {
            return Err(ScheduleError::Layout(format!(
                "expected exactly one entrance, found {}",
                entrances.len()
            )));
        };
        let &[exit] = exits.as_slice() else {
            return Err(ScheduleError::Layout(format!(
                "expected exactly one exit, found {}",
                exits.len()
            )));
        };
        if tour.is_empty() {
            return Err(ScheduleError::Layout("layout has no exhibits".into()));
        }

        Ok(Self { locations, entrance, exit, tour })
    }

    /// Built-in eight-room layout: entrance, six exhibits, exit.
    pub fn standard() -> Self {
        let table: [(&str, &str, Theme, usize, u64, LocationKind); 8] = [
            ("Entrance", "the Great Hall",        Theme::History, 40, 5,  LocationKind::Entrance),
            ("Exhibit1", "Ancient Sculpture",     Theme::Art,     12, 20, LocationKind::Exhibit),
            ("Exhibit2", "the Fossil Hall",       Theme::Nature,  10, 25, LocationKind::Exhibit),
            ("Exhibit3", "the Printing Press",    Theme::History, 10, 20, LocationKind::Exhibit),
            ("Exhibit4", "the Planetarium",       Theme::Science, 8,  30, LocationKind::Exhibit),
            ("Exhibit5", "the Textile Gallery",   Theme::Culture, 10, 20, LocationKind::Exhibit),
            ("Exhibit6", "the Impressionist Wing", Theme::Art,    12, 25, LocationKind::Exhibit),
            ("Exit",     "the Museum Shop",       Theme::Culture, 40, 5,  LocationKind::Exit),
        ];
        let locations: Vec<Location> = table
            .into_iter()
            .enumerate()
            .map(|(i, (name, title, theme, capacity, narration_ticks, kind))| Location {
                id: LocationId(i as u16),
                name: name.to_owned(),
                title: title.to_owned(),
                theme,
                capacity,
                narration_ticks,
                kind,
            })
            .collect();
        let tour = locations
            .iter()
            .filter(|l| l.kind == LocationKind::Exhibit)
            .map(|l| l.id)
            .collect();
        Self {
            locations,
            entrance: LocationId(0),
            exit:     LocationId(7),
            tour,
        }
    }

    // ── Lookups ───────────────────────────────────────────────────────────

    pub fn get(&self, id: LocationId) -> Option<&Location> {
        self.locations.get(id.index())
    }

    /// Like [`get`][Self::get] but reports a missing id as an error.
    pub fn location(&self, id: LocationId) -> ScheduleResult<&Location> {
        self.get(id)
            .ok_or_else(|| ScheduleError::Layout(format!("unknown location {id}")))
    }

    pub fn by_name(&self, name: &str) -> Option<&Location> {
        self.locations.iter().find(|l| l.name == name)
    }

    pub fn locations(&self) -> &[Location] {
        &self.locations
    }

    pub fn entrance(&self) -> LocationId {
        self.entrance
    }

    pub fn exit(&self) -> LocationId {
        self.exit
    }

    /// The default tour: every exhibit in declaration order.
    pub fn tour(&self) -> &[LocationId] {
        &self.tour
    }

    pub fn len(&self) -> usize {
        self.locations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }

    /// A fresh itinerary over the default tour.
    pub fn itinerary(&self) -> Itinerary {
        Itinerary::new(self.tour.clone())
    }
}
