//! CLI tool that crops an OSM extract (XML or PBF) to a bounding box and
//! writes a TRACKMAP binary.
//!
//! ```text
//! cargo run --bin build_map -- \
//!     --input=osm/region.osm.pbf \
//!     --output=maps/city.trackmap \
//!     --bbox=8.5,47.3,8.6,47.4
//! ```

use std::path::PathBuf;
use std::time::Instant;
use std::{env, io::Write};

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use trackmap::models::BoundingBox;
use trackmap::{Map, MapOptions};

fn print_help() {
    eprintln!(
        "\
Usage: build_map [OPTIONS]

Crop an OSM extract to a bounding box and write a TRACKMAP binary.

Options:
  --input=PATH     OSM file or directory of *.osm / *.pbf files (required)
  --output=PATH    Path to the .trackmap output file (required)
  --bbox=W,S,E,N   Bounding box in degrees: min lon, min lat, max lon, max lat (required)
  --skip-buildings Drop buildings and swimming pools
  --skip-labels    Drop place labels
  --keep-all-tags  Keep tags that match no styling rule
  --help           Show this help message"
    );
}

fn parse_bbox(s: &str) -> Option<BoundingBox> {
    let parts: Vec<f64> = s.split(',').map(|p| p.trim().parse().ok()).collect::<Option<_>>()?;
    if parts.len() != 4 {
        return None;
    }
    Some(BoundingBox::from_degrees(parts[0], parts[2], parts[1], parts[3]))
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "trackmap=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args: Vec<String> = env::args().collect();
    if args.iter().any(|a| a == "--help") {
        print_help();
        return Ok(());
    }

    let input = args
        .iter()
        .find_map(|a| a.strip_prefix("--input="))
        .map(PathBuf::from)
        .ok_or("Missing --input=PATH argument")?;
    let output = args
        .iter()
        .find_map(|a| a.strip_prefix("--output="))
        .map(PathBuf::from)
        .ok_or("Missing --output=PATH argument")?;
    let bbox = args
        .iter()
        .find_map(|a| a.strip_prefix("--bbox="))
        .and_then(parse_bbox)
        .ok_or("Missing or malformed --bbox=W,S,E,N argument")?;

    let opts = MapOptions {
        skip_buildings: args.iter().any(|a| a == "--skip-buildings"),
        skip_labels: args.iter().any(|a| a == "--skip-labels"),
        skip_unnecessary_tags: !args.iter().any(|a| a == "--keep-all-tags"),
    };

    if let Some(parent) = output.parent() {
        std::fs::create_dir_all(parent)?;
    }

    eprintln!("Reading OSM: {}", input.display());
    let t_total = Instant::now();

    let mut last_pct = u64::MAX;
    let mut progress = |offset: u64, size: u64| {
        let pct = if size > 0 { offset * 100 / size } else { 100 };
        if pct != last_pct {
            last_pct = pct;
            eprint!("\r      {pct}% read...");
            let _ = std::io::stderr().flush();
        }
        true
    };

    let mut map = Map::new();
    let accepted = map.import_dir(&input, &bbox, &opts, Some(&mut progress))?;
    eprintln!();
    if !accepted {
        return Err(trackmap::Error::OutOfBounds(format!(
            "no file under {} covers the requested bounding box",
            input.display()
        ))
        .into());
    }

    map.save(&output)?;

    eprintln!(
        "Done in {:.1}s! {} vertices, {} segments, {} relations written to {}",
        t_total.elapsed().as_secs_f64(),
        map.vertex_count(),
        map.segment_count(),
        map.multisegments.len(),
        output.display(),
    );
    Ok(())
}
