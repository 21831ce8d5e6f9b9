//! TRACKMAP binary codec.
//!
//! Layout: magic, revision byte, bounds (four `f64`), one flag byte
//! (bit0 = skip_buildings, bit1 = skip_labels), then the six collections
//! in bucket order. Every collection is a count followed by
//! `(local id, fields, tags)` items.

use std::collections::BTreeMap;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use crate::constants::{FORMAT_REVISION, TRACKMAP_MAGIC};
use crate::error::{Error, Result};
use crate::io::{open_file, BinReader, BinWriter};
use crate::models::{Map, MapMultiSegment, MapSegment, MapVertex, TagMap};

const FLAG_SKIP_BUILDINGS: u8 = 1 << 0;
const FLAG_SKIP_LABELS: u8 = 1 << 1;
const FLAG_IS_AREA: u8 = 1 << 0;

pub fn save(map: &Map, path: &Path) -> Result<()> {
    let file = std::fs::File::create(path)?;
    let mut w = BinWriter::new(BufWriter::new(file));

    w.write_bytes(TRACKMAP_MAGIC)?;
    w.write_u8(FORMAT_REVISION)?;

    w.write_f64(map.bounds.min_lat)?;
    w.write_f64(map.bounds.max_lat)?;
    w.write_f64(map.bounds.min_lon)?;
    w.write_f64(map.bounds.max_lon)?;

    let mut flags = 0u8;
    if map.skip_buildings {
        flags |= FLAG_SKIP_BUILDINGS;
    }
    if map.skip_labels {
        flags |= FLAG_SKIP_LABELS;
    }
    w.write_u8(flags)?;

    write_vertices(&mut w, &map.vertices)?;
    write_vertices(&mut w, &map.label_vertices)?;
    write_segments(&mut w, &map.segments)?;
    write_segments(&mut w, &map.segments_background)?;
    write_segments(&mut w, &map.segments_foreground)?;
    write_multisegments(&mut w, &map.multisegments)?;

    w.flush()?;
    tracing::debug!(
        "saved map with {} vertices / {} segments to {}",
        map.vertex_count(),
        map.segment_count(),
        path.display()
    );
    Ok(())
}

pub fn load(path: &Path) -> Result<Map> {
    let file = open_file(path)?;
    let mut r = BinReader::new(BufReader::new(file));

    r.expect_magic(TRACKMAP_MAGIC, "map file")?;
    let revision = r.read_u8("map revision")?;
    if revision != FORMAT_REVISION {
        return Err(Error::Parse(format!("unsupported map revision {revision}")));
    }

    let mut map = Map::new();
    map.bounds.min_lat = r.read_f64("map bounds")?;
    map.bounds.max_lat = r.read_f64("map bounds")?;
    map.bounds.min_lon = r.read_f64("map bounds")?;
    map.bounds.max_lon = r.read_f64("map bounds")?;

    let flags = r.read_u8("map flags")?;
    map.skip_buildings = flags & FLAG_SKIP_BUILDINGS != 0;
    map.skip_labels = flags & FLAG_SKIP_LABELS != 0;

    map.vertices = read_vertices(&mut r)?;
    map.label_vertices = read_vertices(&mut r)?;
    map.segments = read_segments(&mut r)?;
    map.segments_background = read_segments(&mut r)?;
    map.segments_foreground = read_segments(&mut r)?;
    map.multisegments = read_multisegments(&mut r)?;

    map.filename = path.display().to_string();
    Ok(map)
}

fn write_tags<W: Write>(w: &mut BinWriter<W>, tags: &TagMap) -> Result<()> {
    w.write_u64(tags.len() as u64)?;
    for (k, v) in tags {
        w.write_str(k)?;
        w.write_str(v)?;
    }
    Ok(())
}

fn read_tags<R: Read>(r: &mut BinReader<R>) -> Result<TagMap> {
    let count = r.read_u64("tag count")?;
    let mut tags = TagMap::new();
    for _ in 0..count {
        let k = r.read_str("tag key")?;
        let v = r.read_str("tag value")?;
        tags.insert(k, v);
    }
    Ok(tags)
}

fn write_vertices<W: Write>(
    w: &mut BinWriter<W>,
    vertices: &BTreeMap<u64, MapVertex>,
) -> Result<()> {
    w.write_u64(vertices.len() as u64)?;
    for (&id, v) in vertices {
        w.write_u64(id)?;
        w.write_f64(v.lat)?;
        w.write_f64(v.lon)?;
        write_tags(w, &v.tags)?;
    }
    Ok(())
}

fn read_vertices<R: Read>(r: &mut BinReader<R>) -> Result<BTreeMap<u64, MapVertex>> {
    let count = r.read_u64("vertex count")?;
    let mut vertices = BTreeMap::new();
    for _ in 0..count {
        let id = r.read_u64("vertex id")?;
        let lat = r.read_f64("vertex")?;
        let lon = r.read_f64("vertex")?;
        let tags = read_tags(r)?;
        vertices.insert(
            id,
            MapVertex {
                lon,
                lat,
                tags,
                referenced: false,
            },
        );
    }
    Ok(vertices)
}

fn write_segments<W: Write>(
    w: &mut BinWriter<W>,
    segments: &BTreeMap<u64, MapSegment>,
) -> Result<()> {
    w.write_u64(segments.len() as u64)?;
    for (&id, s) in segments {
        w.write_u64(id)?;
        w.write_u8(if s.is_area { FLAG_IS_AREA } else { 0 })?;
        w.write_ids(&s.vertex_ids)?;
        write_tags(w, &s.tags)?;
    }
    Ok(())
}

fn read_segments<R: Read>(r: &mut BinReader<R>) -> Result<BTreeMap<u64, MapSegment>> {
    let count = r.read_u64("segment count")?;
    let mut segments = BTreeMap::new();
    for _ in 0..count {
        let id = r.read_u64("segment id")?;
        let flags = r.read_u8("segment flags")?;
        let vertex_ids = r.read_ids("segment vertices")?;
        let tags = read_tags(r)?;
        segments.insert(
            id,
            MapSegment {
                vertex_ids,
                is_area: flags & FLAG_IS_AREA != 0,
                tags,
                referenced: false,
            },
        );
    }
    Ok(segments)
}

fn write_multisegments<W: Write>(
    w: &mut BinWriter<W>,
    multis: &BTreeMap<u64, MapMultiSegment>,
) -> Result<()> {
    w.write_u64(multis.len() as u64)?;
    for (&id, m) in multis {
        w.write_u64(id)?;
        w.write_ids(&m.vertex_ids)?;
        w.write_ids(&m.segment_inner_ids)?;
        w.write_ids(&m.segment_ids)?;
        write_tags(w, &m.tags)?;
    }
    Ok(())
}

fn read_multisegments<R: Read>(r: &mut BinReader<R>) -> Result<BTreeMap<u64, MapMultiSegment>> {
    let count = r.read_u64("relation count")?;
    let mut multis = BTreeMap::new();
    for _ in 0..count {
        let id = r.read_u64("relation id")?;
        let vertex_ids = r.read_ids("relation vertices")?;
        let segment_inner_ids = r.read_ids("relation inner segments")?;
        let segment_ids = r.read_ids("relation outer segments")?;
        let tags = read_tags(r)?;
        multis.insert(
            id,
            MapMultiSegment {
                vertex_ids,
                segment_inner_ids,
                segment_ids,
                tags,
            },
        );
    }
    Ok(multis)
}
