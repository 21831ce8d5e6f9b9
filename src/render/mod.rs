//! Layered SVG rendering of a map and its attached track.
//!
//! Painting order, back to front: background areas, multi-segment areas
//! (outer then inner members), regular areas, foreground areas, roads,
//! the track polyline, place labels. Within a layer the bucket iteration
//! order is unspecified; the per-render dedup set keeps every area drawn
//! at most once.

use std::collections::HashSet;
use std::fmt::Write as _;
use std::path::Path;

use crate::config::RenderOptions;
use crate::constants::{DEFAULT_ROAD_WIDTH_PX, SVG_CANVAS_BASE_PX};
use crate::error::Result;
use crate::models::{BoundingBox, Map, MapSegment, TagMap};
use crate::osm::style;

/// Equirectangular degree-space frame mapping radian coordinates onto the
/// square canvas. Y grows downward.
struct Frame {
    min_lon_deg: f64,
    max_lat_deg: f64,
    px_per_lon: f64,
    px_per_lat: f64,
}

impl Frame {
    fn new(bounds: &BoundingBox, canvas: f64) -> Frame {
        let min_lon_deg = bounds.min_lon.to_degrees();
        let max_lon_deg = bounds.max_lon.to_degrees();
        let min_lat_deg = bounds.min_lat.to_degrees();
        let max_lat_deg = bounds.max_lat.to_degrees();

        let span_lon = (max_lon_deg - min_lon_deg).max(1e-9);
        let span_lat = (max_lat_deg - min_lat_deg).max(1e-9);
        Frame {
            min_lon_deg,
            max_lat_deg,
            px_per_lon: canvas / span_lon,
            px_per_lat: canvas / span_lat,
        }
    }

    fn x(&self, lon: f64) -> f64 {
        (lon.to_degrees() - self.min_lon_deg) * self.px_per_lon
    }

    fn y(&self, lat: f64) -> f64 {
        (self.max_lat_deg - lat.to_degrees()) * self.px_per_lat
    }
}

fn xml_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// `points` attribute for a segment's vertex chain. `None` when fewer than
/// two vertices resolve.
fn points_attr(map: &Map, frame: &Frame, vertex_ids: &[u64]) -> Option<String> {
    let mut out = String::new();
    let mut count = 0;
    for id in vertex_ids {
        let Some(v) = map.vertex(*id) else {
            continue;
        };
        if count > 0 {
            out.push(' ');
        }
        let _ = write!(out, "{:.2},{:.2}", frame.x(v.lon), frame.y(v.lat));
        count += 1;
    }
    (count >= 2).then_some(out)
}

#[allow(clippy::too_many_arguments)]
fn draw_area(
    out: &mut String,
    map: &Map,
    frame: &Frame,
    id: u64,
    segment: &MapSegment,
    primary_tags: Option<&TagMap>,
    drawn: &mut HashSet<u64>,
) {
    if drawn.contains(&id) {
        return;
    }
    let fill = primary_tags
        .and_then(style::fill_color_of)
        .or_else(|| style::fill_color_of(&segment.tags));
    let Some(fill) = fill else {
        return;
    };
    let Some(points) = points_attr(map, frame, &segment.vertex_ids) else {
        return;
    };
    let _ = writeln!(out, r#"  <polygon points="{points}" fill="{fill}"/>"#);
    drawn.insert(id);
}

fn draw_road(out: &mut String, map: &Map, frame: &Frame, segment: &MapSegment, scale: f64) {
    let Some(points) = points_attr(map, frame, &segment.vertex_ids) else {
        return;
    };
    let stroke = style::road_stroke_of(&segment.tags);
    let width = style::road_width_of(&segment.tags).unwrap_or(DEFAULT_ROAD_WIDTH_PX) * scale;
    let _ = writeln!(
        out,
        r#"  <polyline points="{points}" fill="none" stroke="{stroke}" stroke-width="{width:.1}"/>"#
    );
}

fn draw_track(out: &mut String, map: &Map, frame: &Frame, scale: f64) {
    if map.track.len() < 2 {
        return;
    }
    let mut points = String::new();
    for (i, (lon, lat)) in map.track.iter().enumerate() {
        if i > 0 {
            points.push(' ');
        }
        let _ = write!(points, "{:.2},{:.2}", frame.x(*lon), frame.y(*lat));
    }

    // Black outline below a yellow core.
    let _ = writeln!(
        out,
        r##"  <polyline points="{points}" fill="none" stroke="#000000" stroke-width="{:.1}"/>"##,
        48.0 * scale
    );
    let _ = writeln!(
        out,
        r##"  <polyline points="{points}" fill="none" stroke="#ffff00" stroke-width="{:.1}"/>"##,
        24.0 * scale
    );

    let marker = |out: &mut String, lon: f64, lat: f64, fill: &str| {
        let _ = writeln!(
            out,
            r##"  <circle cx="{:.2}" cy="{:.2}" r="{:.1}" fill="{fill}" stroke="#000000" stroke-width="{:.1}"/>"##,
            frame.x(lon),
            frame.y(lat),
            42.0 * scale,
            16.0 * scale
        );
    };
    let (start_lon, start_lat) = map.track[0];
    let (end_lon, end_lat) = map.track[map.track.len() - 1];
    marker(out, start_lon, start_lat, "#ff0000");
    marker(out, end_lon, end_lat, "#00ff00");
}

/// Renders the map to an SVG document string.
pub fn render(map: &Map, opts: &RenderOptions) -> String {
    let canvas = SVG_CANVAS_BASE_PX * opts.scale;
    let bounds = opts
        .bounds
        .unwrap_or_else(|| map.bounds.expanded(opts.overdraw));
    let frame = Frame::new(&bounds, canvas);

    let mut out = String::new();
    let _ = writeln!(out, r#"<?xml version="1.0" encoding="UTF-8"?>"#);
    let _ = writeln!(
        out,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{canvas:.0}" height="{canvas:.0}" viewBox="0 0 {canvas:.0} {canvas:.0}">"#
    );

    let mut drawn: HashSet<u64> = HashSet::new();

    for (&id, segment) in &map.segments_background {
        if segment.is_area {
            draw_area(&mut out, map, &frame, id, segment, None, &mut drawn);
        }
    }

    for multi in map.multisegments.values() {
        for &sid in multi.segment_ids.iter().chain(&multi.segment_inner_ids) {
            if let Some(segment) = map.segment(sid) {
                draw_area(
                    &mut out,
                    map,
                    &frame,
                    sid,
                    segment,
                    Some(&multi.tags),
                    &mut drawn,
                );
            }
        }
    }

    for (&id, segment) in &map.segments {
        if segment.is_area {
            draw_area(&mut out, map, &frame, id, segment, None, &mut drawn);
        }
    }

    for (&id, segment) in &map.segments_foreground {
        if segment.is_area {
            draw_area(&mut out, map, &frame, id, segment, None, &mut drawn);
        }
    }

    for segment in map.segments.values() {
        if !segment.is_area {
            draw_road(&mut out, map, &frame, segment, opts.scale);
        }
    }

    draw_track(&mut out, map, &frame, opts.scale);

    if !map.skip_labels {
        for vertex in map.label_vertices.values() {
            let Some(name) = vertex.tags.get("name") else {
                continue;
            };
            let _ = writeln!(
                out,
                r##"  <text x="{:.2}" y="{:.2}" font-family="sans-serif" font-size="{:.0}" font-weight="bold" stroke="#000000" fill="#cccc44">{}</text>"##,
                frame.x(vertex.lon),
                frame.y(vertex.lat),
                180.0 * opts.scale,
                xml_escape(name)
            );
        }
    }

    let _ = writeln!(out, "</svg>");
    tracing::debug!(
        "rendered {} px canvas, {} areas drawn",
        canvas,
        drawn.len()
    );
    out
}

/// Renders the map and writes the SVG to `path`.
pub fn render_to_file(map: &Map, opts: &RenderOptions, path: &Path) -> Result<()> {
    std::fs::write(path, render(map, opts))?;
    Ok(())
}
