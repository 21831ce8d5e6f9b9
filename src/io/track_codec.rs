//! TRACKDB binary codec.
//!
//! Layout: magic, revision byte, `num_tracks: u64`, a table of absolute
//! file offsets (`u64` each), then each track's payload at its tabled
//! offset. The offset table makes single-track loads a seek away.

use std::io::{BufReader, BufWriter, Read, Seek, SeekFrom};
use std::path::Path;

use crate::constants::{FORMAT_REVISION, TRACKDB_MAGIC};
use crate::error::{Error, Result};
use crate::io::{open_file, BinReader, BinWriter};
use crate::models::{Track, TrackDb, TrackPoint};
use crate::timeutil;

pub fn save(db: &TrackDb, path: &Path) -> Result<()> {
    let file = std::fs::File::create(path)?;
    let mut w = BinWriter::new(BufWriter::new(file));

    w.write_bytes(TRACKDB_MAGIC)?;
    w.write_u8(FORMAT_REVISION)?;
    w.write_u64(db.count() as u64)?;

    let payloads: Vec<Vec<u8>> = db.iter().map(encode_track).collect::<Result<_>>()?;

    // Header + offset table precede the payloads.
    let mut offset = (TRACKDB_MAGIC.len() + 1 + 8 + 8 * payloads.len()) as u64;
    for payload in &payloads {
        w.write_u64(offset)?;
        offset += payload.len() as u64;
    }
    for payload in &payloads {
        w.write_bytes(payload)?;
    }
    w.flush()?;

    tracing::debug!("saved {} tracks to {}", db.count(), path.display());
    Ok(())
}

pub fn load(path: &Path) -> Result<TrackDb> {
    let file = open_file(path)?;
    let mut buf = BufReader::new(file);

    let offsets = {
        let mut r = BinReader::new(&mut buf);
        r.expect_magic(TRACKDB_MAGIC, "track database")?;
        let revision = r.read_u8("track database revision")?;
        if revision != FORMAT_REVISION {
            return Err(Error::Parse(format!(
                "unsupported track database revision {revision}"
            )));
        }
        let count = r.read_u64("track count")?;
        let mut offsets = Vec::with_capacity(count as usize);
        for _ in 0..count {
            offsets.push(r.read_u64("track offset")?);
        }
        offsets
    };

    let mut db = TrackDb::new();
    for offset in offsets {
        buf.seek(SeekFrom::Start(offset))?;
        let mut r = BinReader::new(&mut buf);
        db.add(decode_track(&mut r)?);
    }
    db.sort_tracks();

    tracing::debug!("loaded {} tracks from {}", db.count(), path.display());
    Ok(db)
}

fn encode_track(track: &Track) -> Result<Vec<u8>> {
    let mut w = BinWriter::new(Vec::new());

    w.write_u64(track.hash)?;
    w.write_u64(track.points.len() as u64)?;
    for p in &track.points {
        w.write_f64(p.lat)?;
        w.write_f64(p.lon)?;
        w.write_f64(p.elevation)?;
        w.write_f64(p.elapsed)?;
        w.write_f64(p.elapsed_total)?;
        w.write_f64(p.dist_planar)?;
        w.write_f64(p.dist_planar_total)?;
        w.write_f64(p.dist_full)?;
        w.write_f64(p.dist_full_total)?;
        w.write_f64(p.time.map(timeutil::to_unix_seconds).unwrap_or(0.0))?;
    }

    w.write_f64(track.total_time)?;
    w.write_f64(track.total_dist_planar)?;
    w.write_f64(track.total_dist_full)?;
    w.write_f64(track.min_lat)?;
    w.write_f64(track.max_lat)?;
    w.write_f64(track.min_lon)?;
    w.write_f64(track.max_lon)?;
    w.write_f64(track.min_elev)?;
    w.write_f64(track.max_elev)?;
    w.write_f64(track.ascent)?;
    w.write_f64(track.descent)?;

    w.write_str(&track.file_name)?;
    w.write_str(&track.comment)?;

    Ok(w.into_inner())
}

fn decode_track<R: Read>(r: &mut BinReader<R>) -> Result<Track> {
    let mut track = Track::new();

    track.hash = r.read_u64("track hash")?;
    let num_points = r.read_u64("point count")?;
    track.points.reserve(num_points.min(1 << 20) as usize);
    for _ in 0..num_points {
        let lat = r.read_f64("point")?;
        let lon = r.read_f64("point")?;
        let elevation = r.read_f64("point")?;
        let mut p = TrackPoint::new(lat, lon, elevation, None);
        p.elapsed = r.read_f64("point")?;
        p.elapsed_total = r.read_f64("point")?;
        p.dist_planar = r.read_f64("point")?;
        p.dist_planar_total = r.read_f64("point")?;
        p.dist_full = r.read_f64("point")?;
        p.dist_full_total = r.read_f64("point")?;
        p.time = Some(timeutil::from_unix_seconds(r.read_f64("point")?));
        track.points.push(p);
    }

    track.total_time = r.read_f64("track totals")?;
    track.total_dist_planar = r.read_f64("track totals")?;
    track.total_dist_full = r.read_f64("track totals")?;
    track.min_lat = r.read_f64("track ranges")?;
    track.max_lat = r.read_f64("track ranges")?;
    track.min_lon = r.read_f64("track ranges")?;
    track.max_lon = r.read_f64("track ranges")?;
    track.min_elev = r.read_f64("track ranges")?;
    track.max_elev = r.read_f64("track ranges")?;
    track.ascent = r.read_f64("track ranges")?;
    track.descent = r.read_f64("track ranges")?;

    track.file_name = r.read_str("track file name")?;
    track.comment = r.read_str("track comment")?;

    Ok(track)
}
