mod analytics;
mod collector;
mod feed;
mod store;
mod telemetry;
mod web;

use clap::{Parser, Subcommand};
use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::analytics::Analytics;
use crate::collector::Collector;
use crate::feed::HttpFeedClient;
use crate::store::Store;
use crate::web::{AppState, Config};

const DEFAULT_CONFIG: &str = "config.yaml";

#[derive(Parser)]
#[command(name = "iss-o-mat")]
#[command(about = "ISS telemetry collector and analytics server")]
struct Cli {
    /// Configuration file (defaults to ./config.yaml when present)
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the collector and serve the API
    Serve,
    /// Print summary, stats and largest altitude jumps
    Summary {
        #[arg(long)]
        top: Option<usize>,
    },
    /// Delete every stored sample
    Clear {
        #[arg(long)]
        yes: bool,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let config = match load_config(cli.config.as_deref()) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Config error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match cli.command {
        Commands::Serve => serve(config).await,
        Commands::Summary { top } => summary(&config, top),
        Commands::Clear { yes } => clear(&config, yes),
    }
}

fn load_config(path: Option<&str>) -> Result<Config, web::config::ConfigError> {
    match path {
        Some(path) => Config::from_file(path),
        None if Path::new(DEFAULT_CONFIG).exists() => Config::from_file(DEFAULT_CONFIG),
        None => {
            log::info!("No {} found, using defaults", DEFAULT_CONFIG);
            Ok(Config::default())
        }
    }
}

fn open_store(config: &Config) -> Option<Store> {
    match Store::open(&config.store) {
        Ok(store) => Some(store),
        Err(e) => {
            eprintln!(
                "Error opening store {}: {}",
                config.store.path.display(),
                e
            );
            None
        }
    }
}

async fn serve(config: Config) -> ExitCode {
    let Some(store) = open_store(&config) else {
        return ExitCode::FAILURE;
    };
    let store = Arc::new(store);

    let feed = match HttpFeedClient::new(config.feed.url.clone(), config.feed.timeout) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("Error building feed client: {}", e);
            return ExitCode::FAILURE;
        }
    };
    log::info!("Polling {} every {:?}", feed.url(), config.collector.interval);

    let mut collector = Collector::new(Arc::new(feed), store.clone(), config.collector_settings());
    if let Err(e) = collector.start() {
        eprintln!("Error starting collector: {}", e);
        return ExitCode::FAILURE;
    }
    let collector = Arc::new(Mutex::new(collector));

    let state = AppState {
        config: Arc::new(config),
        analytics: Analytics::new(store),
        collector: collector.clone(),
    };

    let result = web::run_server(state, shutdown_signal()).await;
    collector.lock().await.stop().await;

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Server error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    log::info!("Shutdown requested");
}

fn summary(config: &Config, top: Option<usize>) -> ExitCode {
    let Some(store) = open_store(config) else {
        return ExitCode::FAILURE;
    };
    let analytics = Analytics::new(Arc::new(store));
    let k = top.unwrap_or(config.analytics.top_jumps);

    let (summary, jumps) = match analytics.overview(k) {
        Ok(overview) => overview,
        Err(e) => {
            eprintln!("Error reading store: {}", e);
            return ExitCode::FAILURE;
        }
    };
    let stats = match analytics.stats() {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error reading store: {}", e);
            return ExitCode::FAILURE;
        }
    };

    println!("{} samples", summary.count);
    if summary.count == 0 {
        return ExitCode::SUCCESS;
    }
    println!(
        "  span:      {} .. {} ({}s)",
        stats.first_timestamp, stats.last_timestamp, stats.duration_seconds
    );
    println!(
        "  longitude: {:.4} .. {:.4}",
        summary.min_longitude, summary.max_longitude
    );
    println!(
        "  altitude:  {:.2} .. {:.2} km (avg {:.2})",
        summary.min_altitude, summary.max_altitude, stats.altitude_avg
    );
    println!("Top {} altitude jumps:", jumps.len());
    for (i, jump) in jumps.iter().enumerate() {
        println!(
            "  {}: #{} -> #{} {:.3} km ({} -> {})",
            i + 1,
            jump.from_record_id,
            jump.to_record_id,
            jump.delta,
            jump.from_ts_utc,
            jump.to_ts_utc
        );
    }
    ExitCode::SUCCESS
}

fn clear(config: &Config, yes: bool) -> ExitCode {
    if !yes {
        eprintln!("Refusing to clear {} without --yes", config.store.path.display());
        return ExitCode::FAILURE;
    }

    let Some(store) = open_store(config) else {
        return ExitCode::FAILURE;
    };
    match store.clear() {
        Ok(removed) => {
            println!("Removed {} samples from {}", removed, store.table());
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error clearing store: {}", e);
            ExitCode::FAILURE
        }
    }
}
