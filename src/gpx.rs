//! GPX 1.1 reader.
//!
//! Parses `gpx → trk+ → trkseg+ → trkpt*` into a single [`Track`],
//! converting degree coordinates to radians at the boundary. Points
//! without a `time` child get synthesized timestamps spaced `assume_dt`
//! seconds from the epoch origin, so elapsed times stay well-defined.

use std::path::Path;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::config::TrackConfig;
use crate::error::{Error, Result};
use crate::models::{Track, TrackPoint};
use crate::timeutil;

/// Imports a GPX file and computes the track. A document without a `gpx`
/// root yields an empty track; malformed XML and missing required
/// attributes are hard failures.
pub fn import_file(path: impl AsRef<Path>, cfg: &TrackConfig) -> Result<Track> {
    let path = path.as_ref();
    let xml = std::fs::read_to_string(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => Error::NotFound(path.display().to_string()),
        _ => Error::Io(e),
    })?;

    let (mut track, found_root) = parse(&xml, cfg)?;
    if !found_root {
        tracing::warn!("{} has no gpx root element", path.display());
    }
    track.set_file_name(path.display().to_string());
    Ok(track)
}

/// Parses a GPX document from a string. Returns the track and whether a
/// `gpx` root element was present.
pub fn parse(xml: &str, cfg: &TrackConfig) -> Result<(Track, bool)> {
    let mut reader = Reader::from_str(xml);
    let mut track = Track::new();
    track.apply_config(cfg);
    let mut found_root = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => match e.local_name().as_ref() {
                b"gpx" => {
                    found_root = true;
                    track.version = attr(&e, b"version").unwrap_or_default();
                    track.creator = attr(&e, b"creator").unwrap_or_default();
                }
                b"trkpt" => {
                    let point = parse_trkpt(&e, &mut reader, cfg, track.len())?;
                    track.push(point);
                }
                _ => {}
            },
            Ok(Event::Empty(e)) => {
                if e.local_name().as_ref() == b"trkpt" {
                    let (lat, lon) = required_lat_lon(&e)?;
                    let time = synthesized_time(cfg, track.len());
                    track.push(TrackPoint::new(lat, lon, 0.0, Some(time)));
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(Error::Parse(e.to_string())),
            _ => {}
        }
    }

    if !found_root {
        return Ok((Track::new(), false));
    }
    track.calculate();
    Ok((track, true))
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

/// Lat/lon attributes, converted to radians. Both are required.
fn required_lat_lon(e: &BytesStart<'_>) -> Result<(f64, f64)> {
    let lat: f64 = attr(e, b"lat")
        .and_then(|v| v.parse().ok())
        .ok_or_else(|| Error::Parse("trkpt without a valid lat attribute".into()))?;
    let lon: f64 = attr(e, b"lon")
        .and_then(|v| v.parse().ok())
        .ok_or_else(|| Error::Parse("trkpt without a valid lon attribute".into()))?;
    Ok((lat.to_radians(), lon.to_radians()))
}

fn synthesized_time(cfg: &TrackConfig, index: usize) -> time::OffsetDateTime {
    timeutil::from_unix_seconds(index as f64 * cfg.assume_dt)
}

fn parse_trkpt(
    start: &BytesStart<'_>,
    reader: &mut Reader<&[u8]>,
    cfg: &TrackConfig,
    index: usize,
) -> Result<TrackPoint> {
    let (lat, lon) = required_lat_lon(start)?;
    let mut elevation = 0.0;
    let mut time = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => match e.local_name().as_ref() {
                b"ele" => {
                    let text = reader.read_text(e.name())?;
                    elevation = text.trim().parse().unwrap_or(0.0);
                }
                b"time" => {
                    let text = reader.read_text(e.name())?;
                    time = Some(timeutil::parse_timestamp(&text)?);
                }
                _ => {
                    reader.read_to_end(e.name())?;
                }
            },
            Ok(Event::End(e)) if e.local_name().as_ref() == b"trkpt" => break,
            Ok(Event::Eof) => break,
            Err(e) => return Err(Error::Parse(e.to_string())),
            _ => {}
        }
    }

    let time = time.unwrap_or_else(|| synthesized_time(cfg, index));
    Ok(TrackPoint::new(lat, lon, elevation, Some(time)))
}
