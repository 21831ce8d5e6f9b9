use std::collections::BTreeMap;
use std::path::Path;

use time::OffsetDateTime;

use crate::config::TrackConfig;
use crate::error::Result;
use crate::geodesy::DistanceFunc;
use crate::models::Track;
use crate::progress::{ProgressFn, ProgressReporter};
use crate::timeutil::round_to_month;

/// Ordered, stable collection of tracks.
#[derive(Debug, Clone, Default)]
pub struct TrackDb {
    tracks: Vec<Track>,
    dist_func: DistanceFunc,
}

impl TrackDb {
    pub fn new() -> Self {
        TrackDb::default()
    }

    /// Appends a track, keeping insertion order.
    pub fn add(&mut self, track: Track) {
        self.tracks.push(track);
    }

    /// Removes the track at `index`. Out-of-range indices return `None`.
    pub fn delete(&mut self, index: usize) -> Option<Track> {
        if index < self.tracks.len() {
            Some(self.tracks.remove(index))
        } else {
            None
        }
    }

    pub fn clear(&mut self) {
        self.tracks.clear();
    }

    pub fn count(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn track(&self, index: usize) -> Option<&Track> {
        self.tracks.get(index)
    }

    pub fn track_mut(&mut self, index: usize) -> Option<&mut Track> {
        self.tracks.get_mut(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Track> {
        self.tracks.iter()
    }

    pub fn dist_func(&self) -> DistanceFunc {
        self.dist_func
    }

    /// Stores the selector and propagates it to every contained track.
    pub fn set_distance_function(&mut self, func: DistanceFunc) {
        self.dist_func = func;
        for t in &mut self.tracks {
            t.set_dist_func(func);
        }
    }

    /// Recomputes every track.
    pub fn calculate_all(&mut self) {
        for t in &mut self.tracks {
            t.calculate();
        }
    }

    /// Stable sort by start time, most recent first. Tracks without a
    /// start time sort after all dated tracks and keep insertion order.
    pub fn sort_tracks(&mut self) {
        self.tracks
            .sort_by(|a, b| b.start_time().cmp(&a.start_time()));
    }

    /// Sums the selected total distance per month of track start, ordered
    /// by month. Tracks without a start time are skipped.
    pub fn distance_per_month(&self, planar: bool) -> Vec<(OffsetDateTime, f64)> {
        let mut months: BTreeMap<OffsetDateTime, f64> = BTreeMap::new();
        for t in &self.tracks {
            let Some(start) = t.start_time() else {
                continue;
            };
            let dist = if planar {
                t.total_dist_planar()
            } else {
                t.total_dist_full()
            };
            *months.entry(round_to_month(start)).or_default() += dist;
        }
        months.into_iter().collect()
    }

    /// Imports every `*.gpx` file under `dir` (case-insensitive, sorted by
    /// name). Per-file failures are logged and skipped so the sweep can
    /// continue; cancellation aborts the sweep. Returns the number of
    /// tracks imported.
    pub fn import_gpx_dir(
        &mut self,
        dir: &Path,
        cfg: &TrackConfig,
        progress: Option<ProgressFn<'_>>,
    ) -> Result<usize> {
        let mut paths: Vec<_> = std::fs::read_dir(dir)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| {
                p.extension()
                    .and_then(|e| e.to_str())
                    .is_some_and(|e| e.eq_ignore_ascii_case("gpx"))
            })
            .collect();
        paths.sort();

        let mut reporter = ProgressReporter::new(progress);
        let total = paths.len() as u64;
        let mut imported = 0;

        for (i, path) in paths.iter().enumerate() {
            reporter.report(i as u64, total)?;
            match crate::gpx::import_file(path, cfg) {
                Ok(track) if !track.is_empty() => {
                    self.tracks.push(track);
                    imported += 1;
                }
                Ok(_) => {
                    tracing::warn!("no track points in {}, skipping", path.display());
                }
                Err(e) => {
                    tracing::warn!("failed to import {}: {e}", path.display());
                }
            }
        }
        reporter.report(total, total)?;

        tracing::info!("imported {imported} of {} GPX files", paths.len());
        Ok(imported)
    }

    /// Saves the collection in the TRACKDB binary format.
    pub fn save(&self, path: &Path) -> Result<()> {
        crate::io::track_codec::save(self, path)
    }

    /// Loads a TRACKDB file and sorts the tracks, most recent first.
    pub fn load(path: &Path) -> Result<TrackDb> {
        crate::io::track_codec::load(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TrackPoint;
    use time::macros::datetime;

    fn track_starting(name: &str, start: Option<OffsetDateTime>) -> Track {
        let mut t = Track::new();
        t.set_file_name(name);
        t.push(TrackPoint::new(0.1, 0.2, 0.0, start));
        t
    }

    #[test]
    fn sort_is_descending_and_stable() {
        let mut db = TrackDb::new();
        db.add(track_starting("b", Some(datetime!(2021-01-02 00:00:00 UTC))));
        db.add(track_starting("undated-1", None));
        db.add(track_starting("a", Some(datetime!(2021-01-01 00:00:00 UTC))));
        db.add(track_starting("c", Some(datetime!(2021-01-03 00:00:00 UTC))));
        db.add(track_starting("undated-2", None));

        db.sort_tracks();

        let names: Vec<_> = db.iter().map(|t| t.file_name()).collect();
        assert_eq!(names, vec!["c", "b", "a", "undated-1", "undated-2"]);
    }

    #[test]
    fn sort_preserves_tie_order() {
        let when = Some(datetime!(2021-06-01 12:00:00 UTC));
        let mut db = TrackDb::new();
        db.add(track_starting("first", when));
        db.add(track_starting("second", when));
        db.add(track_starting("third", when));
        db.sort_tracks();

        let names: Vec<_> = db.iter().map(|t| t.file_name()).collect();
        assert_eq!(names, vec!["first", "second", "third"]);
    }

    #[test]
    fn delete_and_count() {
        let mut db = TrackDb::new();
        db.add(track_starting("a", None));
        db.add(track_starting("b", None));
        assert_eq!(db.count(), 2);

        let removed = db.delete(0).unwrap();
        assert_eq!(removed.file_name(), "a");
        assert_eq!(db.count(), 1);
        assert!(db.delete(5).is_none());

        db.clear();
        assert!(db.is_empty());
    }

    #[test]
    fn distance_function_propagates() {
        let mut db = TrackDb::new();
        db.add(track_starting("a", None));
        db.add(track_starting("b", None));

        db.set_distance_function(DistanceFunc::Vincenty);
        assert_eq!(db.dist_func(), DistanceFunc::Vincenty);
        for t in db.iter() {
            assert_eq!(t.dist_func(), DistanceFunc::Vincenty);
        }
    }

    #[test]
    fn monthly_distances_group_and_skip_undated() {
        let mut june_a = track_starting("a", Some(datetime!(2021-06-05 08:00:00 UTC)));
        june_a.total_dist_planar = 1000.0;
        let mut june_b = track_starting("b", Some(datetime!(2021-06-20 08:00:00 UTC)));
        june_b.total_dist_planar = 500.0;
        let mut july = track_starting("c", Some(datetime!(2021-07-01 08:00:00 UTC)));
        july.total_dist_planar = 2000.0;
        let undated = track_starting("d", None);

        let mut db = TrackDb::new();
        db.add(june_a);
        db.add(june_b);
        db.add(july);
        db.add(undated);

        let by_month = db.distance_per_month(true);
        assert_eq!(by_month.len(), 2);
        assert_eq!(by_month[0].0, datetime!(2021-06-01 00:00:00 UTC));
        assert!((by_month[0].1 - 1500.0).abs() < 1e-9);
        assert_eq!(by_month[1].0, datetime!(2021-07-01 00:00:00 UTC));
        assert!((by_month[1].1 - 2000.0).abs() < 1e-9);
    }
}
