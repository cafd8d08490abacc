#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! CLI for the arrest map toolchain.
//!
//! ```text
//! arrest_map_cli map [--data FILE] [--precision 2] [--threshold 10]
//! arrest_map_cli summary [--data FILE] [--cache FILE] [--limit 10] [--offline]
//! arrest_map_cli serve
//! ```
//!
//! Defaults come from the same environment variables the server reads.
//! Output is JSON on stdout; logs go to stderr.

use std::path::PathBuf;
use std::sync::Arc;

use arrest_map_aggregate::AggregateOptions;
use arrest_map_geocoder::{
    GeocodeCache, NoDelay, OfflineGeocoder, RateLimiter, ReverseGeocoder, build_geocoder,
    build_rate_limiter,
};
use arrest_map_server::{ServerConfig, pipeline, run_server};
use arrest_map_server_models::{
    ApiDatasetStats, ApiLegend, ApiMapResponse, ApiMarker, ApiSummaryResponse, ApiTopLocation,
    DEFAULT_CENTER,
};
use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "arrest_map_cli", about = "Arrest density maps and hot spot summaries")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print map markers as JSON
    Map {
        #[command(flatten)]
        aggregate: AggregateArgs,
    },
    /// Print dataset statistics and the busiest named locations as JSON
    Summary {
        #[command(flatten)]
        aggregate: AggregateArgs,
        /// Geocode cache file
        #[arg(long)]
        cache: Option<PathBuf>,
        /// Number of locations to list
        #[arg(long)]
        limit: Option<usize>,
        /// Skip the geocoder; uncached locations are named "Unknown"
        #[arg(long)]
        offline: bool,
    },
    /// Run the API server
    Serve,
}

#[derive(Args)]
struct AggregateArgs {
    /// Arrest dataset (CSV)
    #[arg(long)]
    data: Option<PathBuf>,
    /// Decimal places to round coordinates to (0-6)
    #[arg(long)]
    precision: Option<u8>,
    /// Minimum arrests for a location to be shown
    #[arg(long)]
    threshold: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init_custom_env("RUST_LOG");
    let cli = Cli::parse();
    let mut config = ServerConfig::from_env()?;

    match cli.command {
        Commands::Map { aggregate } => {
            let options = aggregate.apply(&mut config);
            let analysis = pipeline::analyze(&config.data_path, options)?;

            let response = ApiMapResponse {
                center: DEFAULT_CENTER,
                legend: ApiLegend::default(),
                markers: analysis.markers().into_iter().map(ApiMarker::from).collect(),
            };
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        Commands::Summary {
            aggregate,
            cache,
            limit,
            offline,
        } => {
            let options = aggregate.apply(&mut config);
            if let Some(cache) = cache {
                config.cache_path = cache;
            }
            let limit = limit.unwrap_or(config.top_locations);

            let analysis = pipeline::analyze(&config.data_path, options)?;
            let mut cache = GeocodeCache::load(&config.cache_path)?;

            let geocoder: Arc<dyn ReverseGeocoder>;
            let limiter: Arc<dyn RateLimiter>;
            if offline {
                log::info!("Offline mode: geocoder disabled");
                geocoder = Arc::new(OfflineGeocoder);
                limiter = Arc::new(NoDelay);
            } else {
                geocoder = build_geocoder(&config.geocoder)?;
                limiter = build_rate_limiter(&config.geocoder);
            }

            let locations = pipeline::summarize(
                &analysis,
                limit,
                &mut cache,
                geocoder.as_ref(),
                limiter.as_ref(),
            )
            .await?;

            let response = ApiSummaryResponse {
                stats: ApiDatasetStats::from(analysis.stats),
                locations: locations
                    .into_iter()
                    .enumerate()
                    .map(|(i, loc)| ApiTopLocation::from_resolved(i, loc))
                    .collect(),
            };
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        Commands::Serve => {
            // The server uses actix-web's runtime, so run it on a blocking
            // thread to avoid nesting tokio runtimes.
            tokio::task::spawn_blocking(move || {
                actix_web::rt::System::new().block_on(run_server(config))
            })
            .await??;
        }
    }

    Ok(())
}

impl AggregateArgs {
    /// Applies the command-line overrides to `config` and returns the
    /// resulting aggregation options.
    fn apply(self, config: &mut ServerConfig) -> AggregateOptions {
        if let Some(data) = self.data {
            config.data_path = data;
        }
        config.aggregate_options(self.precision, self.threshold)
    }
}
