//! Plain data row types written by output backends.

/// One completed tour.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TourRow {
    pub tick:             u64,
    pub guide:            u32,
    pub group:            u32,
    pub group_size:       u32,
    pub stops_visited:    u32,
    pub avg_satisfaction: f64,
    pub avg_cohesion:     f64,
    pub avg_fatigue:      f64,
    /// The group shrank below the minimum before the tour ended.
    pub degraded:         bool,
}

/// Summary statistics for one simulation tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickSummaryRow {
    pub tick:             u64,
    pub unix_time_secs:   i64,
    pub arrivals:         u64,
    pub delivered:        u64,
    pub bounced:          u64,
    pub waiting:          u64,
    pub guides_available: u64,
    pub guides_busy:      u64,
    pub guides_cooling:   u64,
    pub visitors_present: u64,
}

/// Where one guide stood at a snapshot tick.
#[derive(Debug, Clone, PartialEq)]
pub struct GuideSnapshotRow {
    pub guide:            u32,
    pub tick:             u64,
    pub availability:     &'static str,
    /// `u32::MAX` when the guide holds no group.
    pub group:            u32,
    pub members:          u32,
    /// `u16::MAX` when the guide is not at a location.
    pub location:         u16,
    pub avg_satisfaction: f64,
    pub completed_tours:  u32,
}
