//! Stable engine-wide constants.
//!
//! Values here are structural invariants, geodesic reference figures, and
//! default fallbacks for the per-call configuration structs. They should
//! rarely change. For per-track and per-render tuning knobs, see
//! [`TrackConfig`](crate::config::TrackConfig) and
//! [`RenderOptions`](crate::config::RenderOptions) instead.

// --- WGS-84 reference ellipsoid ---

/// Equatorial radius (m).
pub const EARTH_RADIUS_EQUATOR_M: f64 = 6_378_137.0;
/// Polar radius (m).
pub const EARTH_RADIUS_POLE_M: f64 = 6_356_752.3;
/// Flattening derived from the two radii above.
pub const EARTH_FLATTENING: f64 = 1.0 - EARTH_RADIUS_POLE_M / EARTH_RADIUS_EQUATOR_M;

// --- Track computation defaults ---

/// Default ascent/descent threshold (m). Elevation deltas below this are
/// treated as GPS noise and contribute to neither ascent nor descent.
pub const DEFAULT_ASCENT_EPSILON_M: f64 = 5.0;
/// Default elevation-smoothing half-window (points).
pub const DEFAULT_SMOOTH_RADIUS: usize = 10;
/// Default synthesized per-point spacing (s) when a GPX file carries no
/// timestamps.
pub const DEFAULT_ASSUME_DT_SECS: f64 = 1.0;
/// Default distance-bin width (m) for time-per-distance aggregation.
pub const DEFAULT_DISTANCE_BIN_M: f64 = 1000.0;

// --- Rendering ---

/// Canvas edge length (px) at scale 1. The canvas is always square,
/// independent of the data aspect.
pub const SVG_CANVAS_BASE_PX: f64 = 5000.0;
/// Default extra margin fraction applied around data bounds when rendering
/// or cropping a map for a track.
pub const DEFAULT_MAP_OVERDRAW: f64 = 0.2;
/// Stroke width (px, at scale 1) for drawable segments with no entry in the
/// road-width table, e.g. `waterway=river`.
pub const DEFAULT_ROAD_WIDTH_PX: f64 = 10.0;

// --- Binary formats ---

/// Track database signature, including the terminating NUL.
pub const TRACKDB_MAGIC: &[u8] = b"TRACKDB\0";
/// Map file signature, including the terminating NUL.
pub const TRACKMAP_MAGIC: &[u8] = b"TRACKMAP\0";
/// Format revision byte written directly after each magic. Revision 1 is
/// little-endian with `u64` lengths/ids and IEEE-754 `f64` reals.
pub const FORMAT_REVISION: u8 = 1;
