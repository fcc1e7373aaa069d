//! Drive simulator.
//!
//! Replays a route of GPS points through one drive session at a fixed dwell,
//! reporting whenever the resolved road or limit changes. Routes come from a
//! CSV file of `lat,lon` rows, or from a built-in demo route.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use serde::Deserialize;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use skilt::config::Config;
use skilt::features::FeatureShaper;
use skilt::{DriveSession, GeoPoint, NvdbClient, Resolution, Resolver};

/// Demo route: a stretch of Tømmerdalsveien, a jump onto the E6, and a jump
/// to Gamle Drammensvei
const DEMO_ROUTE: &[(f64, f64)] = &[
    (63.435512, 10.275317),
    (63.435800, 10.276000),
    (63.333542, 10.356348),
    (63.334000, 10.357000),
    (59.833322, 10.410803),
];

#[derive(Parser, Debug)]
#[command(name = "simulate")]
#[command(about = "Replay a GPS route through the speed-limit resolver")]
struct Args {
    /// CSV route file with lat,lon rows; omit to drive the demo route
    #[arg(short, long)]
    route: Option<PathBuf>,

    /// Seconds to wait between points
    #[arg(long, default_value = "2")]
    dwell_secs: u64,

    /// TOML config file (network + resolver sections)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print the shaped ML feature vector for each resolved point
    #[arg(long)]
    features: bool,
}

#[derive(Debug, Deserialize)]
struct RouteRow {
    lat: f64,
    lon: f64,
}

fn load_route(path: &Path) -> Result<Vec<GeoPoint>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .trim(csv::Trim::All)
        .from_path(path)
        .with_context(|| format!("failed to open route file {}", path.display()))?;

    let mut points = Vec::new();
    for row in reader.deserialize() {
        let row: RouteRow = row.context("bad route row, expected lat,lon")?;
        points.push(GeoPoint::new(row.lat, row.lon));
    }
    anyhow::ensure!(!points.is_empty(), "route file contains no points");
    Ok(points)
}

#[tokio::main]
async fn main() -> Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let args = Args::parse();

    let config = match &args.config {
        Some(path) => Config::load_from_file(path)?,
        None => Config::default(),
    };

    let route = match &args.route {
        Some(path) => load_route(path)?,
        None => DEMO_ROUTE
            .iter()
            .map(|&(lat, lon)| GeoPoint::new(lat, lon))
            .collect(),
    };

    let client = NvdbClient::new(&config.network)?;
    let resolver = Resolver::with_config(client, config.resolver);
    let mut session = DriveSession::new();
    let mut shaper = FeatureShaper::new();

    info!(
        "starting simulation: {} points, {:?} mode, dwell {}s",
        route.len(),
        resolver.config().mode,
        args.dwell_secs
    );

    let mut current_road: Option<String> = None;
    let mut current_limit: Option<u16> = None;

    for (index, point) in route.iter().enumerate() {
        info!(
            "position {}/{}: ({}, {})",
            index + 1,
            route.len(),
            point.lat,
            point.lon
        );

        let resolution = match resolver.resolve(&mut session, point).await {
            Ok(r) => r,
            // Keep driving through transport trouble; continuity state is
            // untouched by failures. A malformed route point is fatal.
            Err(e) if e.is_transport() => {
                warn!("lookup failed: {e}");
                continue;
            }
            Err(e) => return Err(e.into()),
        };

        match &resolution {
            Resolution::Found(resolved) => {
                let road_changed = current_road.as_deref() != Some(resolved.road_label.as_str());
                let limit_changed = current_limit != Some(resolved.limit_kmh);
                if road_changed || limit_changed {
                    info!(
                        "change: {} km/h on {} ({:.1} m, {:?})",
                        resolved.limit_kmh,
                        resolved.road_label,
                        resolved.distance_m,
                        resolved.confidence
                    );
                    current_road = Some(resolved.road_label.clone());
                    current_limit = Some(resolved.limit_kmh);
                } else {
                    info!(
                        "continuing on {} ({} km/h)",
                        resolved.road_label, resolved.limit_kmh
                    );
                }
            }
            Resolution::NotFound { nearest_label, .. } => match nearest_label {
                Some(label) => info!("no signed limit near {label}"),
                None => info!("off the mapped network"),
            },
        }

        if args.features {
            if let Some(features) = shaper.shape(&resolution) {
                info!("features: {}", serde_json::to_string(&features)?);
            }
        }

        if index + 1 < route.len() {
            tokio::time::sleep(Duration::from_secs(args.dwell_secs)).await;
        }
    }

    info!("simulation finished");
    Ok(())
}
