//! Run sequencing: registry → token → search → sequential downloads.
//!
//! The orchestrator is the only component that touches every other part and
//! the only writer of the dedup registry. Downloads are strictly sequential;
//! each success is persisted immediately so an interrupted run retains its
//! progress.

use rand::Rng;
use thiserror::Error;
use tracing::{info, instrument, warn};

use crate::auth::{AuthClient, AuthError};
use crate::config::Credentials;
use crate::download::DownloadEngine;
use crate::registry::{DownloadRegistry, RegistryError};
use crate::search::{RecommendationSearcher, SearchError};

/// Fatal errors that abort a whole run.
///
/// Per-item download failures are not represented here: they are isolated,
/// counted in [`RunStats`], and the run continues.
#[derive(Debug, Error)]
pub enum RunError {
    /// Token acquisition failed.
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// The catalog search failed.
    #[error(transparent)]
    Search(#[from] SearchError),

    /// Registry persistence failed.
    #[error(transparent)]
    Registry(#[from] RegistryError),
}

/// Outcome counters for one run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunStats {
    /// Beatmapsets downloaded and recorded in the registry.
    pub downloaded: usize,
    /// Beatmapsets that failed on every mirror and were skipped.
    pub failed: usize,
}

/// Star band and result limit for a run.
#[derive(Debug, Clone, Copy)]
pub struct SearchBand {
    /// Lower star bound.
    pub star_min: f64,
    /// Upper star bound.
    pub star_max: f64,
    /// Maximum number of beatmapsets to download.
    pub limit: usize,
}

/// Sequences one recommendation-and-download run.
#[derive(Debug)]
pub struct Orchestrator {
    auth: AuthClient,
    searcher: RecommendationSearcher,
    engine: DownloadEngine,
    credentials: Credentials,
    band: SearchBand,
}

impl Orchestrator {
    /// Wires the orchestrator from its collaborators.
    pub fn new(
        auth: AuthClient,
        searcher: RecommendationSearcher,
        engine: DownloadEngine,
        credentials: Credentials,
        band: SearchBand,
    ) -> Self {
        Self {
            auth,
            searcher,
            engine,
            credentials,
            band,
        }
    }

    /// Runs search → per-item download → registry update.
    ///
    /// The registry is passed in mutably: this method is its only writer,
    /// and it persists after every successful download. An empty search
    /// result terminates the run successfully with zero downloads.
    ///
    /// # Errors
    ///
    /// Returns [`RunError`] for token, search, or registry-persistence
    /// failures. A beatmapset failing on all mirrors is reported in the
    /// stats instead, and the run continues with the next item.
    #[instrument(skip_all, fields(star_min = self.band.star_min, star_max = self.band.star_max, limit = self.band.limit))]
    pub async fn run<R: Rng>(
        &self,
        registry: &mut DownloadRegistry,
        rng: &mut R,
    ) -> Result<RunStats, RunError> {
        let token = self.auth.fetch_token(&self.credentials).await?;

        let candidates = self
            .searcher
            .search(
                &token,
                rng,
                self.band.star_min,
                self.band.star_max,
                self.band.limit,
                registry.seen_ids(),
            )
            .await?;

        if candidates.is_empty() {
            info!("no new beatmapsets to download");
            return Ok(RunStats::default());
        }

        let mut stats = RunStats::default();

        for set in &candidates {
            info!(
                id = set.id,
                title = %set.title,
                stars = set.display_rating(),
                "recommended beatmapset"
            );

            match self.engine.download(set.id, &set.title).await {
                Ok(path) => {
                    registry.insert(set.id);
                    // Persist before moving on so an interrupted run never
                    // re-downloads what already landed on disk.
                    registry.save().await?;
                    info!(id = set.id, path = %path.display(), "downloaded and recorded");
                    stats.downloaded += 1;
                }
                Err(e) => {
                    // AllMirrorsExhausted and engine setup failures alike are
                    // isolated to the item; the batch keeps going.
                    warn!(id = set.id, title = %set.title, error = %e, "skipping beatmapset");
                    stats.failed += 1;
                }
            }
        }

        info!(
            downloaded = stats.downloaded,
            failed = stats.failed,
            "run complete"
        );
        Ok(stats)
    }
}
