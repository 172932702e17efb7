//! Mirror fallback engine for beatmap archive downloads.
//!
//! The engine tries an ordered list of mirror sources in sequence; the first
//! to succeed ends the attempt. Mirrors are never raced concurrently for the
//! same item. A failed attempt (HTTP error, network error, or stall) falls
//! through to the next mirror with the same destination path.

use std::path::{Path, PathBuf};

use tracing::{info, instrument, warn};

use super::client::HttpClient;
use super::error::DownloadError;
use super::filename::osz_filename;

/// One endpoint capable of serving a beatmapset archive by id.
#[derive(Debug, Clone)]
pub struct MirrorSource {
    /// Human-readable mirror name for log output.
    pub name: String,
    /// URL prefix the beatmapset id is appended to.
    pub base_url: String,
}

impl MirrorSource {
    /// Creates a mirror source.
    pub fn new(name: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            base_url: base_url.into(),
        }
    }

    /// Builds the download URL for a beatmapset id.
    #[must_use]
    pub fn download_url(&self, set_id: u64) -> String {
        format!("{}/{set_id}", self.base_url.trim_end_matches('/'))
    }
}

/// Returns the default mirror list: osu.direct first, Nerinyan as fallback.
#[must_use]
pub fn default_mirrors() -> Vec<MirrorSource> {
    vec![
        MirrorSource::new("osu.direct", "https://osu.direct/api/d"),
        MirrorSource::new("nerinyan", "https://api.nerinyan.moe/d"),
    ]
}

/// Download engine that fetches one beatmapset archive at a time, falling
/// back through the configured mirror list on failure.
///
/// The engine knows nothing about the dedup registry; it only reports
/// success or failure per item. Registry write-back is the orchestrator's
/// responsibility.
#[derive(Debug, Clone)]
pub struct DownloadEngine {
    client: HttpClient,
    mirrors: Vec<MirrorSource>,
    songs_dir: PathBuf,
}

impl DownloadEngine {
    /// Creates an engine writing into `songs_dir` with the default mirrors.
    pub fn new(client: HttpClient, songs_dir: impl Into<PathBuf>) -> Self {
        Self::with_mirrors(client, songs_dir, default_mirrors())
    }

    /// Creates an engine with an explicit mirror list (ordered by priority).
    pub fn with_mirrors(
        client: HttpClient,
        songs_dir: impl Into<PathBuf>,
        mirrors: Vec<MirrorSource>,
    ) -> Self {
        Self {
            client,
            mirrors,
            songs_dir: songs_dir.into(),
        }
    }

    /// Returns the content root this engine writes archives into.
    #[must_use]
    pub fn songs_dir(&self) -> &Path {
        &self.songs_dir
    }

    /// Downloads the archive for `set_id`, trying each mirror in order.
    ///
    /// The destination filename is derived from the sanitized `title` and is
    /// identical across mirror attempts. The content root is created
    /// (including parents) if absent. Each failed attempt leaves no partial
    /// file behind: the streaming client removes it before the next mirror
    /// is tried.
    ///
    /// # Errors
    ///
    /// Returns [`DownloadError::Io`] if the content root cannot be created,
    /// [`DownloadError::NoMirrors`] if the mirror list is empty, or
    /// [`DownloadError::AllMirrorsExhausted`] (wrapping the last mirror's
    /// failure) when every mirror failed. Callers should treat the latter as
    /// non-fatal for a batch and continue with the next item.
    #[instrument(skip(self))]
    pub async fn download(&self, set_id: u64, title: &str) -> Result<PathBuf, DownloadError> {
        tokio::fs::create_dir_all(&self.songs_dir)
            .await
            .map_err(|e| DownloadError::io(self.songs_dir.clone(), e))?;

        let dest = self.songs_dir.join(osz_filename(title));
        let mut last_error: Option<DownloadError> = None;

        for mirror in &self.mirrors {
            let url = mirror.download_url(set_id);
            info!(mirror = %mirror.name, url = %url, "attempting mirror");

            match self.client.download_to_file(&url, &dest).await {
                Ok(bytes) => {
                    info!(
                        mirror = %mirror.name,
                        bytes,
                        path = %dest.display(),
                        "download complete"
                    );
                    return Ok(dest);
                }
                Err(e) => {
                    warn!(mirror = %mirror.name, error = %e, "mirror attempt failed");
                    last_error = Some(e);
                }
            }
        }

        match last_error {
            Some(last) => Err(DownloadError::all_mirrors_exhausted(set_id, last)),
            None => Err(DownloadError::NoMirrors { set_id }),
        }
    }
}
