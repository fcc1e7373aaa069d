//! One-shot speed-limit lookup.
//!
//! Resolves a single GPS position against NVDB, or runs the reference-location
//! verification table used while calibrating the matcher.

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use skilt::config::Config;
use skilt::pipeline::SnapshotCollector;
use skilt::weather::WeatherFetcher;
use skilt::{DriveSession, GeoPoint, NvdbClient, Resolution, Resolver, ResolverConfig};

/// Reference locations with their signed limits, for quick verification of
/// the matching logic after changes
const REFERENCE_CASES: &[(&str, f64, f64, u16)] = &[
    ("E6 Sluppen", 63.333542, 10.356348, 80),
    ("Asker Kirkeveien", 59.834185, 10.428984, 50),
    ("E18 Asker", 59.8336673, 10.4411366, 90),
    ("Gamle Drammensvei", 59.833322, 10.410803, 40),
    ("Tømmerdalsveien", 63.435512, 10.275317, 50),
    ("E6", 63.326244, 10.334259, 100),
    ("Gamle Drammensvei (kryss)", 59.835707, 10.422574, 40),
    ("Øvre Askerhagen", 59.835592, 10.422452, 50),
];

#[derive(Parser, Debug)]
#[command(name = "lookup")]
#[command(about = "One-shot speed-limit lookup against NVDB")]
struct Args {
    /// Latitude in decimal degrees
    #[arg(long, allow_negative_numbers = true)]
    lat: Option<f64>,

    /// Longitude in decimal degrees
    #[arg(long, allow_negative_numbers = true)]
    lon: Option<f64>,

    /// TOML config file (network + resolver sections)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Run the reference-location table instead of a single lookup
    #[arg(long)]
    suite: bool,

    /// Also fetch weather and print the full pipeline snapshot as JSON
    #[arg(long)]
    snapshot: bool,
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

    let client = NvdbClient::new(&config.network)?;

    if args.suite {
        let resolver = Resolver::with_config(client, config.resolver);
        return run_suite(&resolver).await;
    }

    let (lat, lon) = match (args.lat, args.lon) {
        (Some(lat), Some(lon)) => (lat, lon),
        _ => anyhow::bail!("either --suite or both --lat and --lon are required"),
    };
    let point = GeoPoint::new(lat, lon);

    // A single fix has no continuity to exploit; go wide and take the
    // nearest road unless a config file says otherwise
    let resolver_config = match args.config {
        Some(_) => config.resolver,
        None => ResolverConfig::one_shot(),
    };
    let resolver = Resolver::with_config(client, resolver_config);
    let mut session = DriveSession::new();

    if args.snapshot {
        let weather = WeatherFetcher::new(config.network.timeout_secs)?;
        let collector = SnapshotCollector::new(resolver, weather);
        let snapshot = collector.collect(&mut session, &point).await?;
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
        return Ok(());
    }

    match resolver.resolve(&mut session, &point).await? {
        Resolution::Found(resolved) => {
            info!(
                "{} km/h on {} ({:.1} m away, {:?})",
                resolved.limit_kmh, resolved.road_label, resolved.distance_m, resolved.confidence
            );
        }
        Resolution::NotFound {
            nearest_label: Some(label),
            ..
        } => {
            info!("no signed limit found near {label}");
        }
        Resolution::NotFound { .. } => {
            info!("no road found within search radius");
        }
    }

    Ok(())
}

/// Resolve every reference location with a fresh session and print a
/// pass/fail table
async fn run_suite(resolver: &Resolver<NvdbClient>) -> Result<()> {
    let name_width = REFERENCE_CASES
        .iter()
        .map(|(name, ..)| name.chars().count())
        .max()
        .unwrap_or(8)
        .max(8)
        + 2;

    println!(
        "{:<name_width$} | {:<6} | {:<8} | expected",
        "location", "status", "found"
    );
    println!("{}", "-".repeat(name_width + 32));

    let mut passed = 0;
    for &(name, lat, lon, expected) in REFERENCE_CASES {
        let mut session = DriveSession::new();
        let point = GeoPoint::new(lat, lon);

        let found = match resolver.resolve(&mut session, &point).await {
            Ok(resolution) => resolution.limit_kmh(),
            Err(e) => {
                tracing::warn!("{name}: {e}");
                None
            }
        };

        let ok = found == Some(expected);
        if ok {
            passed += 1;
        }
        let display = found
            .map(|v| v.to_string())
            .unwrap_or_else(|| "none".to_string());
        println!(
            "{:<name_width$} | {:<6} | {:<8} | {}",
            name,
            if ok { "ok" } else { "FAIL" },
            display,
            expected
        );
    }

    println!("{}/{} locations matched", passed, REFERENCE_CASES.len());
    Ok(())
}
