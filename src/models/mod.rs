pub mod geo;
pub mod map;
pub mod map_cache;
pub mod point;
pub mod track;
pub mod track_db;
pub mod units;

pub use geo::BoundingBox;
pub use map::{Map, MapMultiSegment, MapSegment, MapVertex, TagMap};
pub use map_cache::MapCache;
pub use point::TrackPoint;
pub use track::Track;
pub use track_db::TrackDb;
