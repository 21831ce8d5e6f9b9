use time::OffsetDateTime;

use crate::config::TrackConfig;
use crate::constants::{DEFAULT_ASCENT_EPSILON_M, DEFAULT_SMOOTH_RADIUS};
use crate::geodesy::DistanceFunc;
use crate::models::{BoundingBox, TrackPoint};

/// An ordered sequence of track points with cached aggregates.
///
/// Aggregates agree with a recomputation from the point sequence after
/// [`calculate`](Track::calculate); the hash is a deterministic function of
/// the `(lat, lon, elevation, time)` sequence. An empty track has all
/// aggregates zeroed and no start or end time.
#[derive(Debug, Clone, PartialEq)]
pub struct Track {
    pub(crate) points: Vec<TrackPoint>,
    pub(crate) file_name: String,
    pub(crate) version: String,
    pub(crate) creator: String,
    pub(crate) comment: String,

    pub(crate) total_time: f64,
    pub(crate) total_dist_planar: f64,
    pub(crate) total_dist_full: f64,
    pub(crate) min_lat: f64,
    pub(crate) max_lat: f64,
    pub(crate) min_lon: f64,
    pub(crate) max_lon: f64,
    pub(crate) min_elev: f64,
    pub(crate) max_elev: f64,
    pub(crate) ascent: f64,
    pub(crate) descent: f64,
    pub(crate) hash: u64,

    pub(crate) dist_func: DistanceFunc,
    pub(crate) asc_eps: f64,
    pub(crate) smooth_rad: usize,
}

impl Default for Track {
    fn default() -> Self {
        Track {
            points: Vec::new(),
            file_name: String::new(),
            version: String::new(),
            creator: String::new(),
            comment: String::new(),
            total_time: 0.0,
            total_dist_planar: 0.0,
            total_dist_full: 0.0,
            min_lat: 0.0,
            max_lat: 0.0,
            min_lon: 0.0,
            max_lon: 0.0,
            min_elev: 0.0,
            max_elev: 0.0,
            ascent: 0.0,
            descent: 0.0,
            hash: 0,
            dist_func: DistanceFunc::default(),
            asc_eps: DEFAULT_ASCENT_EPSILON_M,
            smooth_rad: DEFAULT_SMOOTH_RADIUS,
        }
    }
}

impl Track {
    pub fn new() -> Self {
        Track::default()
    }

    /// Applies the per-track knobs from a config. Takes effect on the next
    /// [`calculate`](Track::calculate).
    pub fn apply_config(&mut self, cfg: &TrackConfig) {
        self.dist_func = cfg.dist_func;
        self.asc_eps = cfg.asc_eps;
        self.smooth_rad = cfg.smooth_rad;
    }

    pub fn push(&mut self, point: TrackPoint) {
        self.points.push(point);
    }

    pub fn points(&self) -> &[TrackPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn set_file_name(&mut self, name: impl Into<String>) {
        self.file_name = name.into();
    }

    pub fn comment(&self) -> &str {
        &self.comment
    }

    pub fn set_comment(&mut self, comment: impl Into<String>) {
        self.comment = comment.into();
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn creator(&self) -> &str {
        &self.creator
    }

    pub fn dist_func(&self) -> DistanceFunc {
        self.dist_func
    }

    pub fn set_dist_func(&mut self, func: DistanceFunc) {
        self.dist_func = func;
    }

    pub fn set_asc_eps(&mut self, eps: f64) {
        self.asc_eps = eps;
    }

    pub fn set_smooth_rad(&mut self, rad: usize) {
        self.smooth_rad = rad;
    }

    pub fn total_time(&self) -> f64 {
        self.total_time
    }

    pub fn total_dist_planar(&self) -> f64 {
        self.total_dist_planar
    }

    pub fn total_dist_full(&self) -> f64 {
        self.total_dist_full
    }

    pub fn ascent(&self) -> f64 {
        self.ascent
    }

    pub fn descent(&self) -> f64 {
        self.descent
    }

    pub fn hash(&self) -> u64 {
        self.hash
    }

    pub fn elevation_range(&self) -> (f64, f64) {
        (self.min_elev, self.max_elev)
    }

    /// Lat/lon extent of the track, radians.
    pub fn bounding_box(&self) -> BoundingBox {
        BoundingBox::new(self.min_lon, self.max_lon, self.min_lat, self.max_lat)
    }

    pub fn start_time(&self) -> Option<OffsetDateTime> {
        self.points.first().and_then(|p| p.time)
    }

    pub fn end_time(&self) -> Option<OffsetDateTime> {
        self.points.last().and_then(|p| p.time)
    }

    /// Average speed over the whole track (km/h), planar distance. Zero
    /// for tracks without elapsed time.
    pub fn average_speed_kmh(&self) -> f64 {
        if self.total_time > 0.0 {
            super::units::mps_to_kmh(self.total_dist_planar / self.total_time)
        } else {
            0.0
        }
    }

    /// The track polyline as `(lon, lat)` radian pairs, for map rendering.
    pub fn polyline(&self) -> Vec<(f64, f64)> {
        self.points.iter().map(|p| (p.lon, p.lat)).collect()
    }

    /// Recomputes every derived per-point quantity and every aggregate.
    ///
    /// One pass fills elapsed times, distances, and coordinate ranges; a
    /// second pass derives ascent/descent from the smoothed elevation
    /// sequence; finally the content hash is refreshed.
    pub fn calculate(&mut self) {
        let mut elapsed_total = 0.0;
        let mut planar_total = 0.0;
        let mut full_total = 0.0;

        let mut min_lat = f64::INFINITY;
        let mut max_lat = f64::NEG_INFINITY;
        let mut min_lon = f64::INFINITY;
        let mut max_lon = f64::NEG_INFINITY;
        let mut min_elev = f64::INFINITY;
        let mut max_elev = f64::NEG_INFINITY;

        for i in 0..self.points.len() {
            let (elapsed, dist_planar, dist_full) = if i == 0 {
                (0.0, 0.0, 0.0)
            } else {
                let prev = &self.points[i - 1];
                let cur = &self.points[i];
                let elapsed = match (prev.time, cur.time) {
                    (Some(a), Some(b)) => (b - a).as_seconds_f64(),
                    _ => 0.0,
                };
                let d = self.dist_func.distance(
                    prev.lat,
                    cur.lat,
                    prev.lon,
                    cur.lon,
                    prev.elevation,
                    cur.elevation,
                );
                (elapsed, d.planar, d.full)
            };

            elapsed_total += elapsed;
            planar_total += dist_planar;
            full_total += dist_full;

            let pt = &mut self.points[i];
            pt.elapsed = elapsed;
            pt.elapsed_total = elapsed_total;
            pt.dist_planar = dist_planar;
            pt.dist_planar_total = planar_total;
            pt.dist_full = dist_full;
            pt.dist_full_total = full_total;

            min_lat = min_lat.min(pt.lat);
            max_lat = max_lat.max(pt.lat);
            min_lon = min_lon.min(pt.lon);
            max_lon = max_lon.max(pt.lon);
            min_elev = min_elev.min(pt.elevation);
            max_elev = max_elev.max(pt.elevation);
        }

        if self.points.is_empty() {
            self.min_lat = 0.0;
            self.max_lat = 0.0;
            self.min_lon = 0.0;
            self.max_lon = 0.0;
            self.min_elev = 0.0;
            self.max_elev = 0.0;
        } else {
            self.min_lat = min_lat;
            self.max_lat = max_lat;
            self.min_lon = min_lon;
            self.max_lon = max_lon;
            self.min_elev = min_elev;
            self.max_elev = max_elev;
        }

        self.total_time = elapsed_total;
        self.total_dist_planar = planar_total;
        self.total_dist_full = full_total;

        let elevations: Vec<f64> = self.points.iter().map(|p| p.elevation).collect();
        let smoothed = smooth_elevations(&elevations, self.smooth_rad);
        let (ascent, descent) = ascent_descent(&smoothed, self.asc_eps);
        self.ascent = ascent;
        self.descent = descent;

        self.hash = compute_hash(&self.points);
    }

    /// Bins elapsed time into fixed distance buckets of `dist_bin` meters.
    ///
    /// Returns `(distances, times)` of equal length; the i-th distance is
    /// `dist_bin * (i + 1)`. Whenever the running distance reaches a bin
    /// boundary, the proportional share of the running time is emitted and
    /// both accumulators are reduced; a nonzero residual yields one tail
    /// bin. `planar` selects the distance mode.
    pub fn time_per_distance(&self, dist_bin: f64, planar: bool) -> (Vec<f64>, Vec<f64>) {
        let mut dists = Vec::new();
        let mut times = Vec::new();
        if dist_bin <= 0.0 {
            return (dists, times);
        }

        let mut time = 0.0;
        let mut dist = 0.0;
        let mut idx: usize = 0;

        for p in &self.points {
            time += p.elapsed;
            dist += if planar { p.dist_planar } else { p.dist_full };

            while dist >= dist_bin {
                let time_part = time * dist_bin / dist;
                dists.push(dist_bin * (idx as f64 + 1.0));
                times.push(time_part);
                dist -= dist_bin;
                time -= time_part;
                idx += 1;
            }
        }

        if dist > 0.0 || time > 0.0 {
            dists.push(dist_bin * (idx as f64 + 1.0));
            times.push(time);
        }

        (dists, times)
    }
}

/// Laplacian smoothing: each value becomes the mean of the window
/// `[i - rad, i + rad]` clipped to valid indices.
pub(crate) fn smooth_elevations(values: &[f64], rad: usize) -> Vec<f64> {
    if rad == 0 || values.len() < 2 {
        return values.to_vec();
    }
    (0..values.len())
        .map(|i| {
            let lo = i.saturating_sub(rad);
            let hi = (i + rad).min(values.len() - 1);
            values[lo..=hi].iter().sum::<f64>() / (hi - lo + 1) as f64
        })
        .collect()
}

/// Sums positive and negative elevation deltas exceeding `eps`, anchored to
/// the last accepted elevation so noise below the threshold never
/// accumulates.
pub(crate) fn ascent_descent(elevations: &[f64], eps: f64) -> (f64, f64) {
    let Some(&first) = elevations.first() else {
        return (0.0, 0.0);
    };

    let mut last = first;
    let mut ascent = 0.0;
    let mut descent = 0.0;
    for &h in elevations {
        let d = h - last;
        if d > eps {
            ascent += d;
            last = h;
        } else if d < -eps {
            descent += -d;
            last = h;
        }
    }
    (ascent, descent)
}

fn hash_combine(seed: &mut u64, value: u64) {
    let s = *seed;
    *seed = s
        ^ value
            .wrapping_add(0x9e37_79b9_7f4a_7c15)
            .wrapping_add(s << 6)
            .wrapping_add(s >> 2);
}

/// Order-sensitive 64-bit hash over `(lat, lon, elevation, unix seconds)`.
pub(crate) fn compute_hash(points: &[TrackPoint]) -> u64 {
    let mut h: u64 = 0xcbf2_9ce4_8422_2325;
    for p in points {
        hash_combine(&mut h, p.lat.to_bits());
        hash_combine(&mut h, p.lon.to_bits());
        hash_combine(&mut h, p.elevation.to_bits());
        let secs = p.time.map(|t| t.unix_timestamp()).unwrap_or(0);
        hash_combine(&mut h, secs as u64);
    }
    h
}
