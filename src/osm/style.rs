//! Tag-driven styling tables.
//!
//! These tables are consulted twice: by the importer, to decide which tags
//! survive `skip_unnecessary_tags`, and by the SVG renderer, to pick road
//! widths, stroke colours, and area fills.

use crate::models::TagMap;

/// Road stroke width in px at scale 1 for a `(key, value)` tag pair.
pub fn road_width(key: &str, value: &str) -> Option<f64> {
    let width = match (key, value) {
        ("highway", "motorway") => 70.0,
        ("highway", "motorway_link") => 65.0,
        ("highway", "trunk") => 60.0,
        ("highway", "primary") => 50.0,
        ("highway", "secondary") => 40.0,
        ("highway", "tertiary") => 30.0,
        ("highway", "residential") => 20.0,
        ("highway", "track" | "service" | "pedestrian") => 10.0,
        ("railway", "rail") => 50.0,
        ("railway", "tram") => 40.0,
        ("cycleway", "track") => 10.0,
        _ => return None,
    };
    Some(width)
}

/// Fill colour for a `(key, value)` tag pair.
pub fn fill_color(key: &str, value: &str) -> Option<&'static str> {
    let color = match (key, value) {
        ("building", _) => "#dddddd",
        ("surface", "asphalt") => "#222",
        ("surface", "concrete") => "#333",
        ("surface", "wood") => "#009900",
        ("surface", "grass") => "#44ff44",
        ("landuse", "residential") => "#bbbbcc",
        ("landuse", "retail" | "commercial") => "#ff4444",
        ("landuse", "industrial") => "#aaaa44",
        ("landuse", "forest") => "#009900",
        ("landuse", "grass" | "greenery" | "orchard" | "meadow") => "#44ff44",
        ("landuse", "scrub") => "#44ee44",
        ("landuse", "vineyard") => "#55ff55",
        ("landuse", "farmland" | "farmyard") => "#883322",
        ("landuse", "brownfield") => "#773322",
        ("natural", "water") => "#4444ff",
        ("natural", "wood") => "#009900",
        ("natural", "scrub") => "#22aa22",
        ("natural", "bare_rock") => "#7d7d80",
        ("natural", "grassland") => "#44ff44",
        ("natural", "shingle") => "#5555ff",
        ("waterway", "river") => "#5555ff",
        ("leisure", "park" | "garden") => "#55ff55",
        ("leisure", "pitch") => "#55bb55",
        ("amenity", "research_institute" | "university") => "#999",
        ("amenity", "school" | "college") => "#888",
        ("quarter", "suburb") => "#995555",
        _ => return None,
    };
    Some(color)
}

/// Whether a tag pair matches any styling rule.
pub fn is_styled(key: &str, value: &str) -> bool {
    road_width(key, value).is_some() || fill_color(key, value).is_some()
}

/// Whether a tag pair survives `skip_unnecessary_tags`. `place` and `name`
/// are always kept: label classification and rendering depend on them.
pub fn keep_tag(key: &str, value: &str) -> bool {
    matches!(key, "place" | "name") || is_styled(key, value)
}

/// Whether any tag of the map marks the way as a road. Closed ways with a
/// road tag are forced to polylines instead of areas.
pub fn has_road_tag(tags: &TagMap) -> bool {
    tags.iter().any(|(k, v)| road_width(k, v).is_some())
}

/// First road-width match over a tag map.
pub fn road_width_of(tags: &TagMap) -> Option<f64> {
    tags.iter().find_map(|(k, v)| road_width(k, v))
}

/// First fill-colour match over a tag map.
pub fn fill_color_of(tags: &TagMap) -> Option<&'static str> {
    tags.iter().find_map(|(k, v)| fill_color(k, v))
}

/// Road stroke colour: the first fill-colour rule wins, else dark grey.
pub fn road_stroke_of(tags: &TagMap) -> &'static str {
    fill_color_of(tags).unwrap_or("#222222")
}
