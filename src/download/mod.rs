//! Streaming beatmap archive downloads with mirror fallback.
//!
//! This module fetches `.osz` archives over HTTP, writing the byte stream to
//! the content root as it arrives. Two cooperating pieces:
//!
//! - [`HttpClient`] streams a single URL to disk, bounded by an inactivity
//!   watchdog (not a wall-clock timeout): the attempt aborts only when no
//!   chunk has arrived for longer than the stall threshold.
//! - [`DownloadEngine`] tries an ordered mirror list per beatmapset,
//!   reusing the same sanitized destination filename across attempts.
//!
//! Downloads are strictly sequential; mirrors are never raced concurrently
//! for the same item.

mod client;
mod engine;
mod error;
mod filename;

pub use client::{HttpClient, STALL_CHECK_INTERVAL, STALL_THRESHOLD};
pub use engine::{DownloadEngine, MirrorSource, default_mirrors};
pub use error::DownloadError;
pub use filename::{ARCHIVE_EXTENSION, osz_filename, sanitize_title};
