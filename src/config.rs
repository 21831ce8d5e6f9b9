//! Per-call configuration structs.
//!
//! The engine keeps no process-global state: everything tunable is passed
//! into constructors or operations through the structs below.

use crate::constants::*;
use crate::geodesy::DistanceFunc;
use crate::models::BoundingBox;

/// Knobs applied when importing a GPX file and recomputing a track.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackConfig {
    /// Geodesic distance strategy used between consecutive points.
    pub dist_func: DistanceFunc,
    /// Ascent/descent threshold (m).
    pub asc_eps: f64,
    /// Elevation-smoothing half-window (points).
    pub smooth_rad: usize,
    /// Synthesized per-point spacing (s) when no timestamps are present.
    pub assume_dt: f64,
}

impl Default for TrackConfig {
    fn default() -> Self {
        TrackConfig {
            dist_func: DistanceFunc::default(),
            asc_eps: DEFAULT_ASCENT_EPSILON_M,
            smooth_rad: DEFAULT_SMOOTH_RADIUS,
            assume_dt: DEFAULT_ASSUME_DT_SECS,
        }
    }
}

/// Mode flags applied while importing OSM data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MapOptions {
    /// Drop buildings and swimming pools at import time.
    pub skip_buildings: bool,
    /// Drop label vertices; labels are then never rendered.
    pub skip_labels: bool,
    /// Drop tags that match no styling rule. Keeps the map binary compact.
    pub skip_unnecessary_tags: bool,
}

impl Default for MapOptions {
    fn default() -> Self {
        MapOptions {
            skip_buildings: false,
            skip_labels: false,
            skip_unnecessary_tags: true,
        }
    }
}

/// Options for one SVG render.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderOptions {
    /// Canvas scale; the canvas is `5000 * scale` px square.
    pub scale: f64,
    /// Extra margin fraction applied around the map bounds when no explicit
    /// bounds are given.
    pub overdraw: f64,
    /// Override bounds (radians). `None` renders the map's own bounds.
    pub bounds: Option<BoundingBox>,
}

impl Default for RenderOptions {
    fn default() -> Self {
        RenderOptions {
            scale: 1.0,
            overdraw: DEFAULT_MAP_OVERDRAW,
            bounds: None,
        }
    }
}
