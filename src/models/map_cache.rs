use std::path::{Path, PathBuf};

use crate::config::MapOptions;
use crate::error::Result;
use crate::models::{Map, Track};
use crate::progress::ProgressFn;

/// Per-track cropped map store.
///
/// Maps are keyed by the track's content hash, so a recomputed but
/// unchanged track hits the same cache entry while any edit to the point
/// sequence misses it.
#[derive(Debug, Clone)]
pub struct MapCache {
    dir: PathBuf,
}

impl MapCache {
    /// Opens (and creates, if needed) a cache directory.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        Ok(MapCache { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Cache file path for a track.
    pub fn path_for(&self, track: &Track) -> PathBuf {
        self.dir.join(format!("{:016x}.trackmap", track.hash()))
    }

    /// Loads the cached map for a track, if one exists.
    pub fn load(&self, track: &Track) -> Result<Option<Map>> {
        let path = self.path_for(track);
        if !path.exists() {
            return Ok(None);
        }
        Map::load(&path).map(Some)
    }

    /// Stores a map under the track's key.
    pub fn store(&self, track: &Track, map: &Map) -> Result<()> {
        map.save(&self.path_for(track))
    }

    /// Returns the cached map for a track, importing and caching it from
    /// `osm_source` (a file, or a directory swept for a covering extract)
    /// on a miss. The crop window is the track's bounding box expanded by
    /// the `overdraw` fraction. `Ok(None)` means no source covered the
    /// requested area.
    pub fn get_or_import(
        &self,
        track: &Track,
        osm_source: &Path,
        opts: &MapOptions,
        overdraw: f64,
        progress: Option<ProgressFn<'_>>,
    ) -> Result<Option<Map>> {
        if let Some(map) = self.load(track)? {
            tracing::debug!("map cache hit for {:016x}", track.hash());
            return Ok(Some(map));
        }

        let bbox = track.bounding_box().expanded(overdraw);
        let mut map = Map::new();
        let accepted = map.import_dir(osm_source, &bbox, opts, progress)?;
        if !accepted {
            tracing::warn!(
                "no OSM source under {} covers the track area",
                osm_source.display()
            );
            return Ok(None);
        }

        self.store(track, &map)?;
        Ok(Some(map))
    }
}
