//! OSM ingestion: tag styling tables and the XML/PBF streaming importers.

pub mod style;
pub(crate) mod pbf;
pub(crate) mod xml;

use crate::models::TagMap;

/// Collects raw `(key, value)` tag pairs into an owned [`TagMap`],
/// applying the tag-dropping policy: with `skip_unnecessary` set, only
/// tags that match a styling rule (or are needed for labels) are kept.
pub(crate) fn collect_tags<'a>(
    iter: impl Iterator<Item = (&'a str, &'a str)>,
    skip_unnecessary: bool,
) -> TagMap {
    iter.filter(|(k, v)| !skip_unnecessary || style::keep_tag(k, v))
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

#[cfg(test)]
mod tests;
