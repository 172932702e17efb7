//! CLI entry point for the beatfetch tool.

use anyhow::Result;
use clap::Parser;
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{debug, info};

use beatfetch::{
    AuthClient, Credentials, DownloadEngine, DownloadRegistry, HttpClient, Orchestrator,
    RecommendationSearcher, SearchBand, default_songs_dir,
};

mod cli;

use cli::Args;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let args = Args::parse();

    // Credentials may live in a .env next to the registry file
    dotenvy::dotenv().ok();

    // Determine log level based on verbose/quiet flags
    // Priority: RUST_LOG env var > quiet flag > verbose flag > default (info)
    let default_level = if args.quiet {
        "error"
    } else {
        match args.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    tracing_subscriber::fmt().with_env_filter(filter).init();

    debug!(?args, "CLI arguments parsed");
    info!("beatfetch starting");

    let credentials = Credentials::from_env()?;

    let songs_dir = match args.songs_dir {
        Some(dir) => dir,
        None => default_songs_dir()?,
    };
    debug!(songs_dir = %songs_dir.display(), registry = %args.registry.display(), "resolved paths");

    let mut registry = DownloadRegistry::load(&args.registry).await?;
    info!(known = registry.len(), "registry loaded");

    let orchestrator = Orchestrator::new(
        AuthClient::new(),
        RecommendationSearcher::new(),
        DownloadEngine::new(HttpClient::new(), songs_dir),
        credentials,
        SearchBand {
            star_min: args.min_stars,
            star_max: args.max_stars,
            limit: usize::from(args.limit),
        },
    );

    let mut rng = StdRng::from_entropy();
    let stats = orchestrator.run(&mut registry, &mut rng).await?;

    info!(
        downloaded = stats.downloaded,
        failed = stats.failed,
        "beatfetch finished"
    );

    Ok(())
}
