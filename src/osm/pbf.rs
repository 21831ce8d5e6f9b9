//! Streaming OSM PBF importer.
//!
//! Streams blob by blob so the header bounding box can gate the import and
//! byte offsets are observable for progress reporting. Element semantics
//! match the XML importer.

use std::io::{BufReader, Read};
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use osmpbf::{BlobDecode, BlobReader, RelMemberType};

use crate::config::MapOptions;
use crate::error::Result;
use crate::io::open_file;
use crate::models::map::ImportContext;
use crate::models::{BoundingBox, Map};
use crate::osm::collect_tags;
use crate::progress::{ProgressFn, ProgressReporter};

/// Counts bytes handed to the decoder, so progress can report real file
/// offsets while streaming.
struct CountingReader<R> {
    inner: R,
    consumed: Arc<AtomicU64>,
}

impl<R: Read> Read for CountingReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        let n = self.inner.read(buf)?;
        self.consumed.fetch_add(n as u64, Ordering::Relaxed);
        Ok(n)
    }
}

fn handle_node<'a>(
    map: &mut Map,
    ctx: &mut ImportContext,
    bbox: &BoundingBox,
    opts: &MapOptions,
    osm_id: i64,
    lat_deg: f64,
    lon_deg: f64,
    tags: impl Iterator<Item = (&'a str, &'a str)>,
) {
    let lon = lon_deg.to_radians();
    let lat = lat_deg.to_radians();
    if !bbox.contains(lon, lat) {
        return;
    }
    map.insert_node(
        ctx,
        osm_id,
        lon,
        lat,
        collect_tags(tags, opts.skip_unnecessary_tags),
    );
}

pub(crate) fn import_into(
    map: &mut Map,
    path: &Path,
    bbox: &BoundingBox,
    opts: &MapOptions,
    check_bounds: bool,
    progress: Option<ProgressFn<'_>>,
) -> Result<bool> {
    let file = open_file(path)?;
    let size = file.metadata()?.len();
    let consumed = Arc::new(AtomicU64::new(0));
    let reader = BlobReader::new(BufReader::new(CountingReader {
        inner: file,
        consumed: Arc::clone(&consumed),
    }));
    let mut reporter = ProgressReporter::new(progress);

    let mut ctx = ImportContext::default();
    let mut bounds_ok = !check_bounds;
    let mut touched = false;

    for blob in reader {
        let blob = blob?;
        match blob.decode()? {
            BlobDecode::OsmHeader(header) => {
                if check_bounds {
                    let Some(declared) = header.bbox() else {
                        return Ok(false);
                    };
                    let declared = BoundingBox::from_degrees(
                        declared.left,
                        declared.right,
                        declared.bottom,
                        declared.top,
                    );
                    if !declared.contains_box(bbox) {
                        return Ok(false);
                    }
                    bounds_ok = true;
                }
            }
            BlobDecode::OsmData(block) => {
                // A data blob before the header cannot be bounds-checked.
                if !bounds_ok {
                    return Ok(false);
                }
                if !touched {
                    touched = true;
                    map.skip_buildings = opts.skip_buildings;
                    map.skip_labels = opts.skip_labels;
                    map.skip_unnecessary_tags = opts.skip_unnecessary_tags;
                    map.bounds = *bbox;
                }

                for group in block.groups() {
                    for node in group.nodes() {
                        handle_node(
                            map,
                            &mut ctx,
                            bbox,
                            opts,
                            node.id(),
                            node.lat(),
                            node.lon(),
                            node.tags(),
                        );
                    }
                    for node in group.dense_nodes() {
                        handle_node(
                            map,
                            &mut ctx,
                            bbox,
                            opts,
                            node.id(),
                            node.lat(),
                            node.lon(),
                            node.tags(),
                        );
                    }
                    for way in group.ways() {
                        let refs: Vec<i64> = way.refs().collect();
                        let tags = collect_tags(way.tags(), opts.skip_unnecessary_tags);
                        map.insert_way(&mut ctx, way.id(), &refs, tags);
                    }
                    for relation in group.relations() {
                        let mut node_refs = Vec::new();
                        let mut way_refs = Vec::new();
                        for member in relation.members() {
                            match member.member_type {
                                RelMemberType::Node => node_refs.push(member.member_id),
                                RelMemberType::Way => {
                                    let inner =
                                        member.role().map(|r| r == "inner").unwrap_or(false);
                                    way_refs.push((member.member_id, inner));
                                }
                                RelMemberType::Relation => {}
                            }
                        }
                        let tags = collect_tags(relation.tags(), opts.skip_unnecessary_tags);
                        map.insert_relation(&mut ctx, &node_refs, &way_refs, tags);
                    }
                }
            }
            BlobDecode::Unknown(_) => {}
        }
        reporter.report(consumed.load(Ordering::Relaxed), size)?;
    }

    if !bounds_ok {
        return Ok(false);
    }
    if !touched {
        map.skip_buildings = opts.skip_buildings;
        map.skip_labels = opts.skip_labels;
        map.skip_unnecessary_tags = opts.skip_unnecessary_tags;
        map.bounds = *bbox;
    }

    map.filename = path.display().to_string();
    map.prune();

    tracing::info!(
        "imported {}: {} vertices, {} segments, {} relations",
        path.display(),
        map.vertex_count(),
        map.segment_count(),
        map.multisegments.len()
    );
    Ok(true)
}
