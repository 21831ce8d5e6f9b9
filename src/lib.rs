// Library exports for the track & map engine.

pub mod config;
pub mod constants;
pub mod error;
pub mod geodesy;
pub mod gpx;
pub mod io;
pub mod models;
pub mod osm;
pub mod progress;
pub mod render;
pub mod timeutil;

// Re-export commonly used types
pub use config::{MapOptions, RenderOptions, TrackConfig};
pub use error::{Error, Result};
pub use geodesy::DistanceFunc;
pub use models::{BoundingBox, Map, MapCache, Track, TrackDb, TrackPoint};
