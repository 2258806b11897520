//! shelter_finder: route from an address to the nearest shelter.
//!
//! ```text
//! shelter_finder --address "Городоцька 5" --shelters shelters.csv \
//!     --extracts extracts --cache-dir cache [--config route.toml]
//! ```
//!
//! The street graph for the configured area is read from
//! `<extracts>/<area-slug>.osm.pbf` on first use and cached under
//! `--cache-dir`.  The route is printed to stdout as JSON; failures print a
//! user-facing message and exit with status 1.  Set `RUST_LOG=info` for
//! progress output.

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::{Duration, Instant};

use anyhow::Context;
use clap::Parser;

use sf_catalog::CsvDestinationSource;
use sf_core::{NetworkType, RouteConfig};
use sf_geocode::nominatim::{DEFAULT_BASE_URL, NominatimConfig};
use sf_geocode::NominatimGeocoder;
use sf_route::RoutePlanner;
use sf_spatial::osm::PbfGraphSource;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Street address to route from (city is appended automatically).
    #[arg(short, long)]
    address: String,

    /// CSV file of shelters (street, building_number, latitude, longitude).
    #[arg(short, long)]
    shelters: PathBuf,

    /// TOML route configuration; defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory for cached street graphs.
    #[arg(long, default_value = "cache")]
    cache_dir: PathBuf,

    /// Directory holding `<area-slug>.osm.pbf` extracts.
    #[arg(long, default_value = "extracts")]
    extracts: PathBuf,

    /// Nominatim base URL.
    #[arg(long, default_value = DEFAULT_BASE_URL)]
    nominatim_url: String,

    /// Override the configured network type (`walk` or `drive`).
    #[arg(long)]
    network: Option<NetworkType>,

    /// Overall deadline for the address lookup, in seconds.
    #[arg(long)]
    deadline_secs: Option<u64>,
}

fn main() -> ExitCode {
    env_logger::init();
    let args = Args::parse();

    match run(&args) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> anyhow::Result<ExitCode> {
    let mut config = match &args.config {
        Some(path) => RouteConfig::from_path(path)
            .with_context(|| format!("loading route config {}", path.display()))?,
        None => RouteConfig::default(),
    };
    if let Some(network) = args.network {
        config = config.with_network_type(network);
    }

    let geocoder = NominatimGeocoder::with_config(
        NominatimConfig::new(&args.nominatim_url).with_timeout(config.geocode_timeout()),
    )
    .context("building Nominatim client")?;
    let planner = RoutePlanner::new(geocoder, PbfGraphSource::new(&args.extracts), config)
        .context("invalid route configuration")?
        .with_cache_dir(&args.cache_dir);
    let shelters = CsvDestinationSource::from_path(&args.shelters);

    let started = Instant::now();
    let outcome = planner.compute_route_with_deadline(
        &args.address,
        &shelters,
        args.deadline_secs.map(Duration::from_secs),
    );
    log::info!("request finished in {:.2?}", started.elapsed());

    match outcome {
        Ok(route) => {
            println!("{}", serde_json::to_string_pretty(&route)?);
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            log::error!("{e}");
            let body = serde_json::json!({ "error": e.kind().message() });
            println!("{}", serde_json::to_string_pretty(&body)?);
            Ok(ExitCode::FAILURE)
        }
    }
}
