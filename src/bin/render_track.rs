//! CLI tool that imports a GPX recording, fetches (or builds) the cached
//! cropped map for it, and renders the track over the map as SVG.
//!
//! ```text
//! cargo run --bin render_track -- \
//!     --gpx=runs/sunday.gpx \
//!     --osm=osm/ \
//!     --cache=cache/ \
//!     --output=sunday.svg
//! ```

use std::env;
use std::path::PathBuf;
use std::time::Instant;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use trackmap::models::units;
use trackmap::{gpx, render, timeutil, Map, MapCache, MapOptions, RenderOptions, TrackConfig};

fn print_help() {
    eprintln!(
        "\
Usage: render_track [OPTIONS]

Import a GPX recording and render it over a styled map as SVG.

Options:
  --gpx=PATH       GPX input file (required)
  --osm=PATH       OSM file or directory of *.osm / *.pbf files (required)
  --output=PATH    SVG output file (required)
  --cache=DIR      Per-track map cache directory (optional)
  --scale=N        Canvas scale factor (default 1)
  --overdraw=F     Margin fraction around the track (default 0.2)
  --skip-buildings Drop buildings and swimming pools
  --skip-labels    Drop place labels
  --help           Show this help message"
    );
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

    let gpx_path = args
        .iter()
        .find_map(|a| a.strip_prefix("--gpx="))
        .map(PathBuf::from)
        .ok_or("Missing --gpx=PATH argument")?;
    let osm_path = args
        .iter()
        .find_map(|a| a.strip_prefix("--osm="))
        .map(PathBuf::from)
        .ok_or("Missing --osm=PATH argument")?;
    let output = args
        .iter()
        .find_map(|a| a.strip_prefix("--output="))
        .map(PathBuf::from)
        .ok_or("Missing --output=PATH argument")?;
    let cache_dir = args
        .iter()
        .find_map(|a| a.strip_prefix("--cache="))
        .map(PathBuf::from);
    let scale: f64 = args
        .iter()
        .find_map(|a| a.strip_prefix("--scale="))
        .map(|v| v.parse())
        .transpose()?
        .unwrap_or(1.0);
    let overdraw: f64 = args
        .iter()
        .find_map(|a| a.strip_prefix("--overdraw="))
        .map(|v| v.parse())
        .transpose()?
        .unwrap_or(trackmap::constants::DEFAULT_MAP_OVERDRAW);

    let opts = MapOptions {
        skip_buildings: args.iter().any(|a| a == "--skip-buildings"),
        skip_labels: args.iter().any(|a| a == "--skip-labels"),
        ..MapOptions::default()
    };

    let t_total = Instant::now();

    let track = gpx::import_file(&gpx_path, &TrackConfig::default())?;
    if track.is_empty() {
        return Err(format!("{} contains no track points", gpx_path.display()).into());
    }
    let speed = track.average_speed_kmh();
    if speed > 0.0 {
        eprintln!(
            "Track: {:.1} km in {}, avg pace {}",
            track.total_dist_planar() / 1000.0,
            timeutil::format_duration(track.total_time()),
            units::pace_str(units::speed_to_pace(speed)),
        );
    } else {
        eprintln!("Track: {:.1} km", track.total_dist_planar() / 1000.0);
    }

    let not_covered = || {
        trackmap::Error::OutOfBounds(format!(
            "no OSM source under {} covers the track area",
            osm_path.display()
        ))
    };
    let mut map = match cache_dir {
        Some(dir) => MapCache::new(dir)?
            .get_or_import(&track, &osm_path, &opts, overdraw, None)?
            .ok_or_else(not_covered)?,
        None => {
            let bbox = track.bounding_box().expanded(overdraw);
            let mut map = Map::new();
            if !map.import_dir(&osm_path, &bbox, &opts, None)? {
                return Err(not_covered().into());
            }
            map
        }
    };

    map.set_track_polyline(track.polyline());
    let render_opts = RenderOptions {
        scale,
        overdraw,
        bounds: Some(track.bounding_box().expanded(overdraw)),
    };
    render::render_to_file(&map, &render_opts, &output)?;

    eprintln!(
        "Done in {:.1}s! Wrote {}",
        t_total.elapsed().as_secs_f64(),
        output.display(),
    );
    Ok(())
}
