use trackmap::models::{BoundingBox, Map, MapMultiSegment, MapSegment, MapVertex, TagMap};
use trackmap::{render, RenderOptions};

mod common;

fn tags(pairs: &[(&str, &str)]) -> TagMap {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

fn vertex(lon_deg: f64, lat_deg: f64) -> MapVertex {
    MapVertex {
        lon: lon_deg.to_radians(),
        lat: lat_deg.to_radians(),
        tags: TagMap::new(),
        referenced: false,
    }
}

fn segment(vertex_ids: &[u64], is_area: bool, t: TagMap) -> MapSegment {
    MapSegment {
        vertex_ids: vertex_ids.to_vec(),
        is_area,
        tags: t,
        referenced: false,
    }
}

/// A hand-built map on [0, 1] x [0, 1] degrees: a forest square, a water
/// square, a road, a labelled place, and a relation over an untagged ring.
fn sample_map() -> Map {
    let mut map = Map::new();
    map.bounds = BoundingBox::from_degrees(0.0, 1.0, 0.0, 1.0);

    for (id, (lon, lat)) in [
        (0u64, (0.2, 0.2)),
        (1, (0.4, 0.2)),
        (2, (0.4, 0.4)),
        (3, (0.2, 0.4)),
        (4, (0.6, 0.6)),
        (5, (0.8, 0.6)),
        (6, (0.8, 0.8)),
        (7, (0.1, 0.9)),
        (8, (0.9, 0.9)),
    ] {
        map.vertices.insert(id, vertex(lon, lat));
    }
    let mut place = vertex(0.5, 0.5);
    place.tags = tags(&[("place", "town"), ("name", "Fontana & Co")]);
    map.label_vertices.insert(100, place);

    map.segments_background
        .insert(0, segment(&[0, 1, 2, 3, 0], true, tags(&[("landuse", "forest")])));
    map.segments_foreground
        .insert(1, segment(&[4, 5, 6, 4], true, tags(&[("natural", "water")])));
    map.segments
        .insert(2, segment(&[7, 8], false, tags(&[("highway", "residential")])));
    // Untagged ring, styled only through the relation below.
    map.segments
        .insert(3, segment(&[0, 2, 4, 0], true, TagMap::new()));
    map.multisegments.insert(
        0,
        MapMultiSegment {
            vertex_ids: vec![],
            segment_inner_ids: vec![],
            segment_ids: vec![3],
            tags: tags(&[("leisure", "park")]),
        },
    );

    map
}

#[test]
fn layers_appear_in_painting_order() {
    let mut map = sample_map();
    map.set_track_polyline(vec![
        (0.3f64.to_radians(), 0.3f64.to_radians()),
        (0.7f64.to_radians(), 0.7f64.to_radians()),
    ]);
    let svg = render::render(&map, &RenderOptions::default());

    let forest = svg.find("#009900").expect("forest fill missing");
    let park = svg.find("#55ff55").expect("park fill missing");
    let water = svg.find("#4444ff").expect("water fill missing");
    let road = svg.find("stroke=\"#222222\"").expect("road stroke missing");
    let track = svg.find("#ffff00").expect("track core missing");
    let label = svg.find("#cccc44").expect("label fill missing");

    assert!(forest < park, "background before multi-segment areas");
    assert!(park < water, "multi-segment areas before foreground");
    assert!(water < road, "areas before roads");
    assert!(road < track, "roads before the track");
    assert!(track < label, "track before labels");
}

#[test]
fn road_styling_follows_the_tables() {
    let svg = render::render(&sample_map(), &RenderOptions::default());
    // highway=residential: width 20, no fill rule -> dark grey stroke.
    assert!(svg.contains(r##"stroke="#222222" stroke-width="20.0""##));
}

#[test]
fn multi_segment_tags_style_untagged_members() {
    let svg = render::render(&sample_map(), &RenderOptions::default());
    // The untagged ring takes the relation's park fill.
    assert!(svg.contains(r##"fill="#55ff55""##));
}

#[test]
fn areas_are_drawn_at_most_once() {
    let mut map = sample_map();
    // Reference the forest square from a second relation as well.
    map.multisegments.insert(
        1,
        MapMultiSegment {
            vertex_ids: vec![],
            segment_inner_ids: vec![],
            segment_ids: vec![0],
            tags: tags(&[("natural", "water")]),
        },
    );
    let svg = render::render(&map, &RenderOptions::default());

    let forest_polygons = svg.matches("#009900").count();
    assert_eq!(forest_polygons, 1, "area drawn more than once");
}

#[test]
fn track_is_outlined_with_markers() {
    let mut map = sample_map();
    map.set_track_polyline(vec![
        (0.3f64.to_radians(), 0.3f64.to_radians()),
        (0.5f64.to_radians(), 0.5f64.to_radians()),
        (0.7f64.to_radians(), 0.7f64.to_radians()),
    ]);
    let svg = render::render(&map, &RenderOptions::default());

    assert!(svg.contains(r##"stroke="#000000" stroke-width="48.0""##));
    assert!(svg.contains(r##"stroke="#ffff00" stroke-width="24.0""##));
    // Start and end markers: 42 px radius, 16 px black border.
    assert!(svg.contains(r##"fill="#ff0000" stroke="#000000" stroke-width="16.0""##));
    assert!(svg.contains(r##"fill="#00ff00" stroke="#000000" stroke-width="16.0""##));
    assert_eq!(svg.matches(r#"r="42.0""#).count(), 2);
}

#[test]
fn labels_render_bold_and_escaped() {
    let svg = render::render(&sample_map(), &RenderOptions::default());
    assert!(svg.contains("font-family=\"sans-serif\""));
    assert!(svg.contains("font-size=\"180\""));
    assert!(svg.contains("font-weight=\"bold\""));
    assert!(svg.contains("Fontana &amp; Co"));
}

#[test]
fn skip_labels_suppresses_text() {
    let mut map = sample_map();
    map.skip_labels = true;
    let svg = render::render(&map, &RenderOptions::default());
    assert!(!svg.contains("<text"));
}

#[test]
fn scale_grows_canvas_and_strokes() {
    let opts = RenderOptions {
        scale: 2.0,
        ..RenderOptions::default()
    };
    let svg = render::render(&sample_map(), &opts);
    assert!(svg.contains(r#"width="10000" height="10000""#));
    assert!(svg.contains(r#"stroke-width="40.0""#)); // residential at scale 2
    assert!(svg.contains("font-size=\"360\""));
}

#[test]
fn override_bounds_reframe_the_canvas() {
    let map = sample_map();
    let opts = RenderOptions {
        bounds: Some(BoundingBox::from_degrees(0.0, 2.0, 0.0, 2.0)),
        overdraw: 0.0,
        ..RenderOptions::default()
    };
    let svg = render::render(&map, &opts);
    // The label at (0.5, 0.5) deg lands at a quarter of the 5000 px
    // canvas horizontally and three quarters vertically.
    assert!(svg.contains(r#"<text x="1250.00" y="3750.00""#));
}

#[test]
fn render_to_file_writes_svg() {
    let path = common::temp_path("out.svg");
    render::render_to_file(&sample_map(), &RenderOptions::default(), &path).unwrap();
    let contents = std::fs::read_to_string(&path).unwrap();
    std::fs::remove_file(&path).unwrap();
    assert!(contents.starts_with("<?xml"));
    assert!(contents.trim_end().ends_with("</svg>"));
}
