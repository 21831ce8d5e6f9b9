//! Streaming OSM XML importer.
//!
//! Elements arrive in file order (nodes, then ways, then relations). A
//! malformed element is recovered locally by skipping it; only malformed
//! XML itself, I/O failures, and cancellation surface as errors.

use std::io::BufReader;
use std::path::Path;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::config::MapOptions;
use crate::error::{Error, Result};
use crate::io::open_file;
use crate::models::map::ImportContext;
use crate::models::{BoundingBox, Map, TagMap};
use crate::osm::style;
use crate::progress::{ProgressFn, ProgressReporter};

enum Pending {
    Node {
        osm_id: i64,
        lon: f64,
        lat: f64,
        tags: TagMap,
    },
    Way {
        osm_id: i64,
        refs: Vec<i64>,
        tags: TagMap,
    },
    Relation {
        node_refs: Vec<i64>,
        way_refs: Vec<(i64, bool)>,
        tags: TagMap,
    },
}

fn attr(e: &BytesStart<'_>, name: &[u8]) -> Option<String> {
    e.attributes().flatten().find_map(|a| {
        if a.key.local_name().as_ref() == name {
            a.unescape_value().ok().map(|v| v.into_owned())
        } else {
            None
        }
    })
}

fn attr_f64(e: &BytesStart<'_>, name: &[u8]) -> Option<f64> {
    attr(e, name).and_then(|v| v.parse().ok())
}

fn attr_i64(e: &BytesStart<'_>, name: &[u8]) -> Option<i64> {
    attr(e, name).and_then(|v| v.parse().ok())
}

fn finalize(map: &mut Map, ctx: &mut ImportContext, pending: Option<Pending>) {
    match pending {
        Some(Pending::Node {
            osm_id,
            lon,
            lat,
            tags,
        }) => map.insert_node(ctx, osm_id, lon, lat, tags),
        Some(Pending::Way { osm_id, refs, tags }) => map.insert_way(ctx, osm_id, &refs, tags),
        Some(Pending::Relation {
            node_refs,
            way_refs,
            tags,
        }) => map.insert_relation(ctx, &node_refs, &way_refs, tags),
        None => {}
    }
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
    let mut reader = Reader::from_reader(BufReader::new(file));
    let mut reporter = ProgressReporter::new(progress);

    let mut ctx = ImportContext::default();
    let mut pending: Option<Pending> = None;
    let mut root_found = false;
    let mut bounds_ok = !check_bounds;
    // Nothing is written to the map before the first accepted element, so
    // a bounds rejection leaves it untouched.
    let mut accepted = false;

    let mut buf = Vec::new();
    loop {
        buf.clear();
        let event = reader
            .read_event_into(&mut buf)
            .map_err(|e| Error::Parse(format!("{}: {e}", path.display())))?;

        let (start, self_closing) = match &event {
            Event::Start(e) => (Some(e), false),
            Event::Empty(e) => (Some(e), true),
            Event::End(e) => {
                if matches!(e.local_name().as_ref(), b"node" | b"way" | b"relation") {
                    finalize(map, &mut ctx, pending.take());
                }
                continue;
            }
            Event::Eof => break,
            _ => continue,
        };
        let Some(e) = start else { continue };

        match e.local_name().as_ref() {
            b"osm" => {
                root_found = true;
                map.version = attr(e, b"version").unwrap_or_default();
                map.creator = attr(e, b"generator").unwrap_or_default();
            }
            b"bounds" => {
                if check_bounds {
                    let declared = (
                        attr_f64(e, b"minlon"),
                        attr_f64(e, b"maxlon"),
                        attr_f64(e, b"minlat"),
                        attr_f64(e, b"maxlat"),
                    );
                    let (Some(min_lon), Some(max_lon), Some(min_lat), Some(max_lat)) = declared
                    else {
                        return Ok(false);
                    };
                    let declared =
                        BoundingBox::from_degrees(min_lon, max_lon, min_lat, max_lat);
                    if !declared.contains_box(bbox) {
                        return Ok(false);
                    }
                    bounds_ok = true;
                }
            }
            name @ (b"node" | b"way" | b"relation") => {
                // Declared bounds must precede the elements when checking.
                if !bounds_ok {
                    return Ok(false);
                }
                if !accepted {
                    accepted = true;
                    map.skip_buildings = opts.skip_buildings;
                    map.skip_labels = opts.skip_labels;
                    map.skip_unnecessary_tags = opts.skip_unnecessary_tags;
                    map.bounds = *bbox;
                }
                reporter.report(reader.buffer_position() as u64, size)?;

                let visible = attr(e, b"visible").map(|v| v != "false").unwrap_or(true);
                pending = if !visible {
                    None
                } else {
                    match name {
                        b"node" => {
                            let parsed = (attr_i64(e, b"id"), attr_f64(e, b"lat"), attr_f64(e, b"lon"));
                            match parsed {
                                (Some(osm_id), Some(lat_deg), Some(lon_deg)) => {
                                    let lon = lon_deg.to_radians();
                                    let lat = lat_deg.to_radians();
                                    bbox.contains(lon, lat).then_some(Pending::Node {
                                        osm_id,
                                        lon,
                                        lat,
                                        tags: TagMap::new(),
                                    })
                                }
                                _ => None,
                            }
                        }
                        b"way" => attr_i64(e, b"id").map(|osm_id| Pending::Way {
                            osm_id,
                            refs: Vec::new(),
                            tags: TagMap::new(),
                        }),
                        _ => Some(Pending::Relation {
                            node_refs: Vec::new(),
                            way_refs: Vec::new(),
                            tags: TagMap::new(),
                        }),
                    }
                };
                if self_closing {
                    finalize(map, &mut ctx, pending.take());
                }
            }
            b"tag" => {
                if let Some(p) = pending.as_mut() {
                    if let (Some(k), Some(v)) = (attr(e, b"k"), attr(e, b"v")) {
                        if !opts.skip_unnecessary_tags || style::keep_tag(&k, &v) {
                            let tags = match p {
                                Pending::Node { tags, .. }
                                | Pending::Way { tags, .. }
                                | Pending::Relation { tags, .. } => tags,
                            };
                            tags.insert(k, v);
                        }
                    }
                }
            }
            b"nd" => {
                if let Some(Pending::Way { refs, .. }) = pending.as_mut() {
                    if let Some(r) = attr_i64(e, b"ref") {
                        refs.push(r);
                    }
                }
            }
            b"member" => {
                if let Some(Pending::Relation {
                    node_refs,
                    way_refs,
                    ..
                }) = pending.as_mut()
                {
                    let member = (attr(e, b"type"), attr_i64(e, b"ref"));
                    if let (Some(kind), Some(r)) = member {
                        match kind.as_str() {
                            "node" => node_refs.push(r),
                            "way" => {
                                let inner =
                                    attr(e, b"role").is_some_and(|role| role == "inner");
                                way_refs.push((r, inner));
                            }
                            _ => {}
                        }
                    }
                }
            }
            _ => {}
        }
    }

    if !root_found {
        tracing::warn!("{} has no osm root element", path.display());
        return Ok(false);
    }
    if !accepted {
        // Element-free document: accept it now if its bounds allow.
        if !bounds_ok {
            return Ok(false);
        }
        map.skip_buildings = opts.skip_buildings;
        map.skip_labels = opts.skip_labels;
        map.skip_unnecessary_tags = opts.skip_unnecessary_tags;
        map.bounds = *bbox;
    }

    reporter.report(size, size)?;
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
