//! Beatfetch Core Library
//!
//! This library provides the core functionality for the beatfetch tool,
//! which recommends beatmapsets from the osu! catalog, skips anything already
//! downloaded, and fetches each `.osz` archive from mirror sources with
//! automatic fallback.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//! - [`auth`] - OAuth2 client-credentials token acquisition
//! - [`config`] - Credentials and on-disk path resolution
//! - [`download`] - Streaming mirror downloads with a stall watchdog
//! - [`orchestrator`] - Search → download → registry sequencing
//! - [`registry`] - Persisted set of already-downloaded beatmapset ids
//! - [`search`] - Difficulty-banded, deduplicated catalog search

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod auth;
pub mod config;
pub mod download;
pub mod orchestrator;
pub mod registry;
pub mod search;

// Re-export commonly used types
pub use auth::{AuthClient, AuthError};
pub use config::{ConfigError, Credentials, default_registry_path, default_songs_dir};
pub use download::{DownloadEngine, DownloadError, HttpClient, MirrorSource, osz_filename};
pub use orchestrator::{Orchestrator, RunError, RunStats, SearchBand};
pub use registry::{DownloadRegistry, RegistryError};
pub use search::{
    Beatmap, BeatmapSet, MAX_SEARCH_PASSES, RecommendationSearcher, SearchError, SearchWindow,
};
