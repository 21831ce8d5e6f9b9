use time::OffsetDateTime;

/// One recorded track point. Angles are radians, distances meters, times
/// seconds. The cumulative fields are filled in by
/// [`Track::calculate`](crate::models::Track::calculate) and are monotone
/// non-decreasing over the point sequence.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackPoint {
    pub lat: f64,
    pub lon: f64,
    /// Elevation above the reference ellipsoid (m).
    pub elevation: f64,
    pub time: Option<OffsetDateTime>,
    /// Seconds since the previous point.
    pub elapsed: f64,
    /// Seconds since the first point.
    pub elapsed_total: f64,
    /// Surface distance to the previous point (m).
    pub dist_planar: f64,
    /// Cumulative surface distance (m).
    pub dist_planar_total: f64,
    /// Elevation-aware distance to the previous point (m).
    pub dist_full: f64,
    /// Cumulative elevation-aware distance (m).
    pub dist_full_total: f64,
}

impl TrackPoint {
    pub fn new(lat: f64, lon: f64, elevation: f64, time: Option<OffsetDateTime>) -> Self {
        TrackPoint {
            lat,
            lon,
            elevation,
            time,
            elapsed: 0.0,
            elapsed_total: 0.0,
            dist_planar: 0.0,
            dist_planar_total: 0.0,
            dist_full: 0.0,
            dist_full_total: 0.0,
        }
    }
}
