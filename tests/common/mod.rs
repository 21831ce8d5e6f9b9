#![allow(dead_code)]

use std::fmt::Write as _;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};

static COUNTER: AtomicU64 = AtomicU64::new(0);

/// Process-unique path under the system temp directory.
pub fn temp_path(name: &str) -> PathBuf {
    let n = COUNTER.fetch_add(1, Ordering::Relaxed);
    std::env::temp_dir().join(format!("trackmap-test-{}-{n}-{name}", std::process::id()))
}

/// Creates a process-unique empty directory under the system temp dir.
pub fn temp_dir(name: &str) -> PathBuf {
    let dir = temp_path(name);
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

/// Builds a single-track GPX document from `(lat_deg, lon_deg, ele, time)`
/// tuples. A `None` time omits the `<time>` element.
pub fn gpx_doc(points: &[(f64, f64, f64, Option<&str>)]) -> String {
    let mut out = String::from(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
         <gpx version=\"1.1\" creator=\"trackmap-test\" \
         xmlns=\"http://www.topografix.com/GPX/1/1\">\n <trk><trkseg>\n",
    );
    for (lat, lon, ele, time) in points {
        let _ = write!(out, "  <trkpt lat=\"{lat}\" lon=\"{lon}\"><ele>{ele}</ele>");
        if let Some(t) = time {
            let _ = write!(out, "<time>{t}</time>");
        }
        let _ = writeln!(out, "</trkpt>");
    }
    out.push_str(" </trkseg></trk>\n</gpx>\n");
    out
}

/// Builds an OSM XML document. `bounds` is `(minlon, minlat, maxlon,
/// maxlat)` in degrees; `body` holds raw node/way/relation elements.
pub fn osm_doc(bounds: Option<(f64, f64, f64, f64)>, body: &str) -> String {
    let mut out = String::from(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
         <osm version=\"0.6\" generator=\"trackmap-test\">\n",
    );
    if let Some((min_lon, min_lat, max_lon, max_lat)) = bounds {
        let _ = writeln!(
            out,
            " <bounds minlat=\"{min_lat}\" minlon=\"{min_lon}\" \
             maxlat=\"{max_lat}\" maxlon=\"{max_lon}\"/>"
        );
    }
    out.push_str(body);
    out.push_str("</osm>\n");
    out
}

/// A small OSM body: four nodes forming a forest square, a water square
/// over the same nodes, a residential road, a labelled place node, and an
/// untagged stray node. All coordinates sit inside `[0, 1]` degrees.
pub fn osm_sample_body() -> String {
    r#" <node id="1" lat="0.40" lon="0.40"/>
 <node id="2" lat="0.40" lon="0.60"/>
 <node id="3" lat="0.60" lon="0.60"/>
 <node id="4" lat="0.60" lon="0.40"/>
 <node id="5" lat="0.50" lon="0.50">
  <tag k="place" v="village"/>
  <tag k="name" v="Middleton"/>
 </node>
 <node id="6" lat="0.45" lon="0.45"/>
 <way id="10">
  <nd ref="1"/><nd ref="2"/><nd ref="3"/><nd ref="4"/><nd ref="1"/>
  <tag k="landuse" v="forest"/>
 </way>
 <way id="11">
  <nd ref="1"/><nd ref="2"/><nd ref="3"/><nd ref="1"/>
  <tag k="natural" v="water"/>
 </way>
 <way id="12">
  <nd ref="1"/><nd ref="3"/>
  <tag k="highway" v="residential"/>
 </way>
"#
    .to_string()
}
