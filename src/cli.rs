//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use clap::Parser;

/// Recommend and download osu! beatmaps with automatic mirror fallback.
///
/// Beatfetch queries the osu! catalog for beatmapsets inside a star-rating
/// band, skips anything already downloaded, and fetches each archive from
/// mirror sources, falling back when one fails or stalls.
#[derive(Parser, Debug)]
#[command(name = "beatfetch")]
#[command(author, version, about)]
pub struct Args {
    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long)]
    pub quiet: bool,

    /// Lower bound of the star-rating band
    #[arg(long, default_value_t = 4.0)]
    pub min_stars: f64,

    /// Upper bound of the star-rating band
    #[arg(long, default_value_t = 5.0)]
    pub max_stars: f64,

    /// Maximum number of beatmapsets to download (1-50)
    #[arg(short = 'n', long, default_value_t = 5, value_parser = clap::value_parser!(u8).range(1..=50))]
    pub limit: u8,

    /// Directory archives are written to (defaults to the osu! Songs folder)
    #[arg(long)]
    pub songs_dir: Option<PathBuf>,

    /// Path of the downloaded-ids registry file
    #[arg(long, default_value = "downloaded_maps.json")]
    pub registry: PathBuf,
}
