use super::style::*;
use super::*;

fn tag_map(pairs: &[(&str, &str)]) -> TagMap {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

// -- road_width --

#[test]
fn highway_widths_are_graded() {
    assert_eq!(road_width("highway", "motorway"), Some(70.0));
    assert_eq!(road_width("highway", "motorway_link"), Some(65.0));
    assert_eq!(road_width("highway", "trunk"), Some(60.0));
    assert_eq!(road_width("highway", "primary"), Some(50.0));
    assert_eq!(road_width("highway", "secondary"), Some(40.0));
    assert_eq!(road_width("highway", "tertiary"), Some(30.0));
    assert_eq!(road_width("highway", "residential"), Some(20.0));
    assert_eq!(road_width("highway", "track"), Some(10.0));
    assert_eq!(road_width("highway", "service"), Some(10.0));
    assert_eq!(road_width("highway", "pedestrian"), Some(10.0));
}

#[test]
fn rail_and_cycle_widths() {
    assert_eq!(road_width("railway", "rail"), Some(50.0));
    assert_eq!(road_width("railway", "tram"), Some(40.0));
    assert_eq!(road_width("cycleway", "track"), Some(10.0));
}

#[test]
fn unknown_roads_have_no_width() {
    assert_eq!(road_width("highway", "footway"), None);
    assert_eq!(road_width("waterway", "river"), None);
}

// -- fill_color --

#[test]
fn any_building_value_fills_grey() {
    assert_eq!(fill_color("building", "yes"), Some("#dddddd"));
    assert_eq!(fill_color("building", "apartments"), Some("#dddddd"));
}

#[test]
fn landuse_and_natural_fills() {
    assert_eq!(fill_color("landuse", "forest"), Some("#009900"));
    assert_eq!(fill_color("landuse", "meadow"), Some("#44ff44"));
    assert_eq!(fill_color("landuse", "farmyard"), Some("#883322"));
    assert_eq!(fill_color("natural", "water"), Some("#4444ff"));
    assert_eq!(fill_color("natural", "bare_rock"), Some("#7d7d80"));
    assert_eq!(fill_color("waterway", "river"), Some("#5555ff"));
    assert_eq!(fill_color("quarter", "suburb"), Some("#995555"));
    assert_eq!(fill_color("landuse", "military"), None);
}

// -- tag retention --

#[test]
fn place_and_name_always_survive() {
    assert!(keep_tag("place", "village"));
    assert!(keep_tag("name", "Anywhere"));
    assert!(keep_tag("highway", "primary"));
    assert!(!keep_tag("source", "survey"));
    assert!(!keep_tag("wikipedia", "de:Irgendwo"));
}

#[test]
fn collect_tags_applies_policy() {
    let raw = [
        ("highway", "primary"),
        ("maxspeed", "50"),
        ("name", "Hauptstrasse"),
    ];
    let filtered = collect_tags(raw.iter().copied(), true);
    assert_eq!(filtered.len(), 2);
    assert!(!filtered.contains_key("maxspeed"));

    let kept = collect_tags(raw.iter().copied(), false);
    assert_eq!(kept.len(), 3);
}

// -- tag-map lookups --

#[test]
fn road_tag_detection() {
    assert!(has_road_tag(&tag_map(&[("highway", "residential")])));
    assert!(!has_road_tag(&tag_map(&[("highway", "footway")])));
    assert!(!has_road_tag(&tag_map(&[("landuse", "forest")])));
}

#[test]
fn road_stroke_prefers_fill_rule() {
    assert_eq!(
        road_stroke_of(&tag_map(&[("waterway", "river")])),
        "#5555ff"
    );
    assert_eq!(
        road_stroke_of(&tag_map(&[("highway", "primary")])),
        "#222222"
    );
}
