//! Error types for the download module.
//!
//! Per-mirror failures (`Network`, `HttpStatus`, `Stalled`, `Stream`, `Io`)
//! are recoverable: the engine falls back to the next mirror. Only
//! `AllMirrorsExhausted` is terminal for an item, and even that is non-fatal
//! for the batch.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while downloading a beatmap archive.
#[derive(Debug, Error)]
pub enum DownloadError {
    /// Network-level error sending the request (DNS, connection refused, TLS).
    #[error("network error downloading {url}: {source}")]
    Network {
        /// The URL that failed to download.
        url: String,
        /// The underlying network error.
        #[source]
        source: reqwest::Error,
    },

    /// HTTP error response (4xx client errors, 5xx server errors).
    #[error("HTTP {status} downloading {url}")]
    HttpStatus {
        /// The URL that returned an error status.
        url: String,
        /// The HTTP status code.
        status: u16,
    },

    /// The inactivity watchdog fired: no data arrived within the threshold.
    ///
    /// Measured from the last observed chunk, not from attempt start, so a
    /// slow-but-steady transfer of any total duration is never classified
    /// as stalled.
    #[error("transfer stalled downloading {url}: no data for {threshold_secs}s")]
    Stalled {
        /// The URL whose transfer stalled.
        url: String,
        /// The inactivity threshold that was exceeded, in seconds.
        threshold_secs: u64,
    },

    /// The response body stream yielded an error mid-transfer.
    #[error("stream error downloading {url}: {source}")]
    Stream {
        /// The URL whose body stream failed.
        url: String,
        /// The underlying stream error.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// File system error during download (create file, write, flush).
    #[error("IO error writing to {path}: {source}")]
    Io {
        /// The file path where the error occurred.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The mirror URL is malformed.
    #[error("invalid URL: {url}")]
    InvalidUrl {
        /// The invalid URL string.
        url: String,
    },

    /// The engine was configured with an empty mirror list.
    #[error("no mirrors configured for beatmapset {set_id}")]
    NoMirrors {
        /// The beatmapset a download was requested for.
        set_id: u64,
    },

    /// Every configured mirror failed for this beatmapset.
    ///
    /// Carries the error from the last mirror attempted. Callers treat this
    /// as non-fatal for the batch: the item is skipped and the run continues.
    #[error("all mirrors exhausted for beatmapset {set_id}: {source}")]
    AllMirrorsExhausted {
        /// The beatmapset that could not be fetched from any mirror.
        set_id: u64,
        /// The failure from the last mirror tried.
        #[source]
        source: Box<DownloadError>,
    },
}

impl DownloadError {
    /// Creates a network error from a reqwest error.
    pub fn network(url: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Network {
            url: url.into(),
            source,
        }
    }

    /// Creates an HTTP status error.
    pub fn http_status(url: impl Into<String>, status: u16) -> Self {
        Self::HttpStatus {
            url: url.into(),
            status,
        }
    }

    /// Creates a stall-timeout error.
    pub fn stalled(url: impl Into<String>, threshold: std::time::Duration) -> Self {
        Self::Stalled {
            url: url.into(),
            threshold_secs: threshold.as_secs(),
        }
    }

    /// Creates a body-stream error.
    pub fn stream(
        url: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Stream {
            url: url.into(),
            source: Box::new(source),
        }
    }

    /// Creates an IO error.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Creates an invalid URL error.
    pub fn invalid_url(url: impl Into<String>) -> Self {
        Self::InvalidUrl { url: url.into() }
    }

    /// Creates an all-mirrors-exhausted error from the last attempt's failure.
    pub fn all_mirrors_exhausted(set_id: u64, last: DownloadError) -> Self {
        Self::AllMirrorsExhausted {
            set_id,
            source: Box::new(last),
        }
    }
}

// Note on From trait implementations:
// We intentionally do NOT implement `From<reqwest::Error>` or
// `From<std::io::Error>` because the variants require context (url, path)
// that the source errors don't carry. The helper constructors are the
// pattern used throughout this crate.
