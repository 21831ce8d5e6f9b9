use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use crate::config::MapOptions;
use crate::error::{Error, Result};
use crate::models::BoundingBox;
use crate::osm::style;
use crate::progress::ProgressFn;

/// Key -> value tag map. Keys are unique; insertion order is irrelevant.
pub type TagMap = BTreeMap<String, String>;

/// An OSM node, re-keyed to a dense local id.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MapVertex {
    pub lon: f64,
    pub lat: f64,
    pub tags: TagMap,
    /// Set while importing when a way references this vertex. Only
    /// meaningful during import.
    pub referenced: bool,
}

/// An OSM way: an ordered list of local vertex ids.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MapSegment {
    pub vertex_ids: Vec<u64>,
    pub is_area: bool,
    pub tags: TagMap,
    /// Set while importing when a relation references this segment.
    pub referenced: bool,
}

/// An OSM relation: member vertices plus inner and outer member segments.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MapMultiSegment {
    pub vertex_ids: Vec<u64>,
    pub segment_inner_ids: Vec<u64>,
    pub segment_ids: Vec<u64>,
    pub tags: TagMap,
}

/// A cropped map: vertices and segments partitioned at import time into
/// render buckets, all keyed by dense 0-based local ids.
#[derive(Debug, Clone, Default)]
pub struct Map {
    pub vertices: BTreeMap<u64, MapVertex>,
    pub label_vertices: BTreeMap<u64, MapVertex>,
    pub segments: BTreeMap<u64, MapSegment>,
    pub segments_background: BTreeMap<u64, MapSegment>,
    pub segments_foreground: BTreeMap<u64, MapSegment>,
    pub multisegments: BTreeMap<u64, MapMultiSegment>,

    /// Crop window, radians.
    pub bounds: BoundingBox,
    pub filename: String,
    pub version: String,
    pub creator: String,

    pub skip_buildings: bool,
    pub skip_labels: bool,
    pub skip_unnecessary_tags: bool,

    /// Optional track polyline, `(lon, lat)` radian pairs, drawn above the
    /// road layer. Not persisted.
    pub track: Vec<(f64, f64)>,
}

/// OSM id -> local id translation state for a single import. Discarded
/// when the import finishes.
#[derive(Debug, Default)]
pub(crate) struct ImportContext {
    pub vertex_ids: HashMap<i64, u64>,
    pub segment_ids: HashMap<i64, u64>,
    next_vertex: u64,
    next_segment: u64,
    next_multi: u64,
}

impl ImportContext {
    fn alloc_vertex(&mut self, osm_id: i64) -> u64 {
        let id = self.next_vertex;
        self.next_vertex += 1;
        self.vertex_ids.insert(osm_id, id);
        id
    }

    fn alloc_segment(&mut self, osm_id: i64) -> u64 {
        let id = self.next_segment;
        self.next_segment += 1;
        self.segment_ids.insert(osm_id, id);
        id
    }

    fn alloc_multi(&mut self) -> u64 {
        let id = self.next_multi;
        self.next_multi += 1;
        id
    }
}

impl Map {
    pub fn new() -> Self {
        Map::default()
    }

    pub fn clear(&mut self) {
        *self = Map {
            skip_buildings: self.skip_buildings,
            skip_labels: self.skip_labels,
            skip_unnecessary_tags: self.skip_unnecessary_tags,
            ..Map::default()
        };
    }

    pub fn set_track_polyline(&mut self, polyline: Vec<(f64, f64)>) {
        self.track = polyline;
    }

    /// Looks up a vertex in both vertex buckets.
    pub fn vertex(&self, id: u64) -> Option<&MapVertex> {
        self.vertices.get(&id).or_else(|| self.label_vertices.get(&id))
    }

    /// Looks up a segment across all three segment buckets.
    pub fn segment(&self, id: u64) -> Option<&MapSegment> {
        self.segments
            .get(&id)
            .or_else(|| self.segments_background.get(&id))
            .or_else(|| self.segments_foreground.get(&id))
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len() + self.label_vertices.len()
    }

    pub fn segment_count(&self) -> usize {
        self.segments.len() + self.segments_background.len() + self.segments_foreground.len()
    }

    fn mark_vertex_referenced(&mut self, id: u64) {
        if let Some(v) = self.vertices.get_mut(&id) {
            v.referenced = true;
        } else if let Some(v) = self.label_vertices.get_mut(&id) {
            v.referenced = true;
        }
    }

    fn mark_segment_referenced(&mut self, id: u64) {
        for bucket in [
            &mut self.segments,
            &mut self.segments_background,
            &mut self.segments_foreground,
        ] {
            if let Some(s) = bucket.get_mut(&id) {
                s.referenced = true;
                return;
            }
        }
    }

    /// Records a node. The caller has already applied the bbox filter and
    /// the tag-dropping policy. Nodes tagged with both `place` and `name`
    /// become label vertices unless labels are skipped.
    pub(crate) fn insert_node(
        &mut self,
        ctx: &mut ImportContext,
        osm_id: i64,
        lon: f64,
        lat: f64,
        tags: TagMap,
    ) {
        let id = ctx.alloc_vertex(osm_id);
        let is_label = tags.contains_key("place") && tags.contains_key("name");
        let vertex = MapVertex {
            lon,
            lat,
            tags,
            referenced: false,
        };
        if is_label && !self.skip_labels {
            self.label_vertices.insert(id, vertex);
        } else {
            self.vertices.insert(id, vertex);
        }
    }

    /// Records a way. References to nodes outside the crop are skipped; a
    /// way with no surviving reference is dropped. Ways tagged as
    /// buildings or swimming pools are dropped when buildings are skipped.
    pub(crate) fn insert_way(
        &mut self,
        ctx: &mut ImportContext,
        osm_id: i64,
        refs: &[i64],
        tags: TagMap,
    ) {
        if self.skip_buildings
            && (tags.contains_key("building")
                || tags.get("leisure").is_some_and(|v| v == "swimming_pool"))
        {
            return;
        }

        let vertex_ids: Vec<u64> = refs
            .iter()
            .filter_map(|r| ctx.vertex_ids.get(r).copied())
            .collect();
        if vertex_ids.is_empty() {
            return;
        }
        for &vid in &vertex_ids {
            self.mark_vertex_referenced(vid);
        }

        let closed = vertex_ids.len() >= 2 && vertex_ids.first() == vertex_ids.last();
        let is_area = closed && !style::has_road_tag(&tags);

        let foreground = tags.get("natural").is_some_and(|v| v == "water");
        let background =
            !foreground && (tags.contains_key("landuse") || tags.contains_key("natural"));

        let id = ctx.alloc_segment(osm_id);
        let segment = MapSegment {
            vertex_ids,
            is_area,
            tags,
            referenced: false,
        };
        if foreground {
            self.segments_foreground.insert(id, segment);
        } else if background {
            self.segments_background.insert(id, segment);
        } else {
            self.segments.insert(id, segment);
        }
    }

    /// Records a relation. Node members join `vertex_ids`, way members
    /// with role `inner` join `segment_inner_ids`, other way members join
    /// `segment_ids`. Missing references are dropped; a fully unresolved
    /// relation is dropped.
    pub(crate) fn insert_relation(
        &mut self,
        ctx: &mut ImportContext,
        node_refs: &[i64],
        way_refs: &[(i64, bool)],
        tags: TagMap,
    ) {
        let vertex_ids: Vec<u64> = node_refs
            .iter()
            .filter_map(|r| ctx.vertex_ids.get(r).copied())
            .collect();

        let mut segment_ids = Vec::new();
        let mut segment_inner_ids = Vec::new();
        for &(osm_ref, inner) in way_refs {
            let Some(&local) = ctx.segment_ids.get(&osm_ref) else {
                continue;
            };
            if inner {
                segment_inner_ids.push(local);
            } else {
                segment_ids.push(local);
            }
        }

        if vertex_ids.is_empty() && segment_ids.is_empty() && segment_inner_ids.is_empty() {
            return;
        }

        for &vid in &vertex_ids {
            self.mark_vertex_referenced(vid);
        }
        for &sid in segment_ids.iter().chain(&segment_inner_ids) {
            self.mark_segment_referenced(sid);
        }

        let id = ctx.alloc_multi();
        self.multisegments.insert(
            id,
            MapMultiSegment {
                vertex_ids,
                segment_inner_ids,
                segment_ids,
                tags,
            },
        );
    }

    /// Drops unreferenced plain vertices and segments that are neither
    /// referenced by a relation nor tagged, then renumbers the surviving
    /// local ids densely and remaps every foreign key.
    pub(crate) fn prune(&mut self) {
        let dropped_vertices = self.vertices.iter().filter(|(_, v)| !v.referenced).count();
        let mut vertex_map: HashMap<u64, u64> = HashMap::new();
        let mut next = 0u64;

        let mut vertices = BTreeMap::new();
        for (old, mut v) in std::mem::take(&mut self.vertices) {
            if !v.referenced {
                continue;
            }
            v.referenced = false;
            vertex_map.insert(old, next);
            vertices.insert(next, v);
            next += 1;
        }
        let mut label_vertices = BTreeMap::new();
        for (old, mut v) in std::mem::take(&mut self.label_vertices) {
            v.referenced = false;
            vertex_map.insert(old, next);
            label_vertices.insert(next, v);
            next += 1;
        }
        self.vertices = vertices;
        self.label_vertices = label_vertices;

        let mut segment_map: HashMap<u64, u64> = HashMap::new();
        let mut next_seg = 0u64;
        let mut dropped_segments = 0usize;
        for bucket in [
            &mut self.segments,
            &mut self.segments_background,
            &mut self.segments_foreground,
        ] {
            let mut rebuilt = BTreeMap::new();
            for (old, mut seg) in std::mem::take(bucket) {
                if !seg.referenced && seg.tags.is_empty() {
                    dropped_segments += 1;
                    continue;
                }
                seg.referenced = false;
                seg.vertex_ids = seg
                    .vertex_ids
                    .iter()
                    .filter_map(|id| vertex_map.get(id).copied())
                    .collect();
                segment_map.insert(old, next_seg);
                rebuilt.insert(next_seg, seg);
                next_seg += 1;
            }
            *bucket = rebuilt;
        }

        let mut multis = BTreeMap::new();
        let mut next_multi = 0u64;
        for (_, mut ms) in std::mem::take(&mut self.multisegments) {
            ms.vertex_ids = ms
                .vertex_ids
                .iter()
                .filter_map(|id| vertex_map.get(id).copied())
                .collect();
            ms.segment_ids = ms
                .segment_ids
                .iter()
                .filter_map(|id| segment_map.get(id).copied())
                .collect();
            ms.segment_inner_ids = ms
                .segment_inner_ids
                .iter()
                .filter_map(|id| segment_map.get(id).copied())
                .collect();
            multis.insert(next_multi, ms);
            next_multi += 1;
        }
        self.multisegments = multis;

        tracing::debug!(
            "pruned {dropped_vertices} vertices and {dropped_segments} segments, \
             {} vertices / {} segments remain",
            self.vertex_count(),
            self.segment_count()
        );
    }

    /// Imports an OSM XML file cropped to `bbox` (radians). With
    /// `check_bounds`, the file's declared bounds must contain `bbox`;
    /// a mismatch returns `Ok(false)` without touching the map.
    pub fn import_xml(
        &mut self,
        path: &Path,
        bbox: &BoundingBox,
        opts: &MapOptions,
        check_bounds: bool,
        progress: Option<ProgressFn<'_>>,
    ) -> Result<bool> {
        crate::osm::xml::import_into(self, path, bbox, opts, check_bounds, progress)
    }

    /// Imports an OSM extract, dispatching on the file extension: `.pbf`
    /// streams protocol-buffer blobs, anything else is parsed as OSM XML.
    pub fn import(
        &mut self,
        path: &Path,
        bbox: &BoundingBox,
        opts: &MapOptions,
        check_bounds: bool,
        progress: Option<ProgressFn<'_>>,
    ) -> Result<bool> {
        let is_pbf = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("pbf"));
        if is_pbf {
            crate::osm::pbf::import_into(self, path, bbox, opts, check_bounds, progress)
        } else {
            self.import_xml(path, bbox, opts, check_bounds, progress)
        }
    }

    /// Sweeps `dir` for `*.osm` / `*.pbf` files (case-insensitive, sorted
    /// by name) and imports the first one whose declared bounds contain
    /// `bbox`. Per-file failures are logged and the sweep continues; only
    /// cancellation aborts it. If `dir` is a regular file it is imported
    /// directly without a bounds check.
    pub fn import_dir(
        &mut self,
        dir: &Path,
        bbox: &BoundingBox,
        opts: &MapOptions,
        mut progress: Option<ProgressFn<'_>>,
    ) -> Result<bool> {
        if dir.is_file() {
            return self.import(dir, bbox, opts, false, progress);
        }

        let mut paths: Vec<_> = std::fs::read_dir(dir)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| {
                p.extension()
                    .and_then(|e| e.to_str())
                    .is_some_and(|e| {
                        e.eq_ignore_ascii_case("osm") || e.eq_ignore_ascii_case("pbf")
                    })
            })
            .collect();
        paths.sort();

        for path in paths {
            let mut candidate = Map::new();
            let reborrowed: Option<ProgressFn<'_>> = match progress {
                Some(ref mut f) => Some(&mut **f),
                None => None,
            };
            match candidate.import(&path, bbox, opts, true, reborrowed) {
                Ok(true) => {
                    tracing::info!("accepted {}", path.display());
                    *self = candidate;
                    return Ok(true);
                }
                Ok(false) => {
                    tracing::debug!("bounds of {} do not cover the request", path.display());
                }
                Err(Error::Cancelled) => return Err(Error::Cancelled),
                Err(e) => {
                    tracing::warn!("failed to import {}: {e}", path.display());
                }
            }
        }
        Ok(false)
    }

    /// Saves the map in the TRACKMAP binary format. The attached track
    /// polyline is not persisted.
    pub fn save(&self, path: &Path) -> Result<()> {
        crate::io::map_codec::save(self, path)
    }

    /// Loads a TRACKMAP file.
    pub fn load(path: &Path) -> Result<Map> {
        crate::io::map_codec::load(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tags(pairs: &[(&str, &str)]) -> TagMap {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn node(map: &mut Map, ctx: &mut ImportContext, osm_id: i64, t: TagMap) {
        map.insert_node(ctx, osm_id, 0.01, 0.01, t);
    }

    #[test]
    fn place_name_nodes_become_labels() {
        let mut map = Map::new();
        let mut ctx = ImportContext::default();
        node(&mut map, &mut ctx, 1, tags(&[("place", "town"), ("name", "X")]));
        node(&mut map, &mut ctx, 2, tags(&[("name", "lonely")]));
        node(&mut map, &mut ctx, 3, TagMap::new());

        assert_eq!(map.label_vertices.len(), 1);
        assert_eq!(map.vertices.len(), 2);
    }

    #[test]
    fn skip_labels_disables_label_bucket() {
        let mut map = Map::new();
        map.skip_labels = true;
        let mut ctx = ImportContext::default();
        node(&mut map, &mut ctx, 1, tags(&[("place", "town"), ("name", "X")]));

        assert!(map.label_vertices.is_empty());
        assert_eq!(map.vertices.len(), 1);
    }

    #[test]
    fn way_classification() {
        let mut map = Map::new();
        let mut ctx = ImportContext::default();
        for id in 1..=4 {
            node(&mut map, &mut ctx, id, TagMap::new());
        }

        map.insert_way(&mut ctx, 10, &[1, 2, 3, 1], tags(&[("natural", "water")]));
        map.insert_way(&mut ctx, 11, &[1, 2, 3, 1], tags(&[("landuse", "forest")]));
        map.insert_way(&mut ctx, 12, &[1, 2], tags(&[("highway", "residential")]));

        assert_eq!(map.segments_foreground.len(), 1);
        assert_eq!(map.segments_background.len(), 1);
        assert_eq!(map.segments.len(), 1);
    }

    #[test]
    fn closed_road_stays_polyline() {
        let mut map = Map::new();
        let mut ctx = ImportContext::default();
        for id in 1..=3 {
            node(&mut map, &mut ctx, id, TagMap::new());
        }
        map.insert_way(&mut ctx, 10, &[1, 2, 3, 1], tags(&[("highway", "primary")]));

        let seg = map.segments.values().next().unwrap();
        assert!(!seg.is_area);

        map.insert_way(&mut ctx, 11, &[1, 2, 3, 1], tags(&[("building", "yes")]));
        let area = map
            .segments
            .values()
            .find(|s| s.tags.contains_key("building"))
            .unwrap();
        assert!(area.is_area);
    }

    #[test]
    fn skip_buildings_drops_pools_too() {
        let mut map = Map::new();
        map.skip_buildings = true;
        let mut ctx = ImportContext::default();
        for id in 1..=3 {
            node(&mut map, &mut ctx, id, TagMap::new());
        }
        map.insert_way(&mut ctx, 10, &[1, 2, 3, 1], tags(&[("building", "yes")]));
        map.insert_way(
            &mut ctx,
            11,
            &[1, 2, 3, 1],
            tags(&[("leisure", "swimming_pool")]),
        );
        map.insert_way(&mut ctx, 12, &[1, 2], tags(&[("highway", "track")]));

        assert_eq!(map.segment_count(), 1);
    }

    #[test]
    fn way_with_only_unknown_refs_is_dropped() {
        let mut map = Map::new();
        let mut ctx = ImportContext::default();
        node(&mut map, &mut ctx, 1, TagMap::new());

        map.insert_way(&mut ctx, 10, &[77, 88], tags(&[("highway", "track")]));
        assert_eq!(map.segment_count(), 0);

        // Partially resolvable references survive.
        map.insert_way(&mut ctx, 11, &[1, 77], tags(&[("highway", "track")]));
        assert_eq!(map.segment_count(), 1);
        assert_eq!(map.segments.values().next().unwrap().vertex_ids.len(), 1);
    }

    #[test]
    fn relation_member_roles() {
        let mut map = Map::new();
        let mut ctx = ImportContext::default();
        for id in 1..=6 {
            node(&mut map, &mut ctx, id, TagMap::new());
        }
        map.insert_way(&mut ctx, 10, &[1, 2, 3, 1], tags(&[("natural", "wood")]));
        map.insert_way(&mut ctx, 11, &[4, 5, 6, 4], TagMap::new());

        map.insert_relation(
            &mut ctx,
            &[1],
            &[(10, false), (11, true), (99, false)],
            tags(&[("type", "multipolygon")]),
        );

        let ms = map.multisegments.values().next().unwrap();
        assert_eq!(ms.vertex_ids.len(), 1);
        assert_eq!(ms.segment_ids.len(), 1);
        assert_eq!(ms.segment_inner_ids.len(), 1);

        // Member segments are marked.
        assert!(map.segment(ms.segment_ids[0]).unwrap().referenced);
        assert!(map.segment(ms.segment_inner_ids[0]).unwrap().referenced);
    }

    #[test]
    fn prune_drops_and_renumbers() {
        let mut map = Map::new();
        let mut ctx = ImportContext::default();
        // 1..=3 become way members; 4 stays unreferenced; 5 is a label.
        for id in 1..=4 {
            node(&mut map, &mut ctx, id, TagMap::new());
        }
        node(&mut map, &mut ctx, 5, tags(&[("place", "city"), ("name", "N")]));

        map.insert_way(&mut ctx, 10, &[1, 2, 3], tags(&[("highway", "track")]));
        // Untagged and unreferenced: pruned.
        map.insert_way(&mut ctx, 11, &[1, 2], TagMap::new());

        map.prune();

        assert_eq!(map.vertices.len(), 3);
        assert_eq!(map.label_vertices.len(), 1);
        assert_eq!(map.segment_count(), 1);

        // Ids are dense 0-based and every foreign key resolves.
        let all_vertex_ids: Vec<u64> = map
            .vertices
            .keys()
            .chain(map.label_vertices.keys())
            .copied()
            .collect();
        assert_eq!(all_vertex_ids, vec![0, 1, 2, 3]);
        let seg = map.segments.values().next().unwrap();
        assert_eq!(seg.vertex_ids.len(), 3);
        for vid in &seg.vertex_ids {
            assert!(map.vertex(*vid).is_some());
        }
    }

    #[test]
    fn prune_keeps_relation_referenced_untagged_segments() {
        let mut map = Map::new();
        let mut ctx = ImportContext::default();
        for id in 1..=3 {
            node(&mut map, &mut ctx, id, TagMap::new());
        }
        map.insert_way(&mut ctx, 10, &[1, 2, 3, 1], TagMap::new());
        map.insert_relation(&mut ctx, &[], &[(10, false)], tags(&[("natural", "water")]));

        map.prune();

        assert_eq!(map.segment_count(), 1);
        let ms = map.multisegments.values().next().unwrap();
        assert_eq!(ms.segment_ids.len(), 1);
        assert!(map.segment(ms.segment_ids[0]).is_some());
    }
}
