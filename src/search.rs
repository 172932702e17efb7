//! Difficulty-banded, deduplicated beatmapset recommendation search.
//!
//! The searcher samples the catalog inside randomized star-rating
//! sub-windows of the caller's overall range. Popularity-sorted queries are
//! heavily biased towards the same top results, so re-rolling the window per
//! pass is what gives the recommendations variety. Ids already downloaded
//! (and ids already accumulated this run) are filtered out, and the final
//! sequence is shuffled with an unbiased Fisher-Yates permutation before
//! truncating to the requested limit.

use std::collections::HashSet;

use rand::Rng;
use rand::seq::SliceRandom;
use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info, instrument};

/// Default osu! v2 API base URL.
const DEFAULT_BASE_URL: &str = "https://osu.ppy.sh/api/v2";

/// Upper bound on catalog query passes per search.
///
/// A circuit breaker against pathological remote responses, not a
/// correctness requirement: most searches reach their limit in one or two
/// passes.
pub const MAX_SEARCH_PASSES: usize = 10;

/// Errors from the recommendation search. All variants are fatal for a run.
#[derive(Debug, Error)]
pub enum SearchError {
    /// The requested star band is empty or inverted.
    #[error("invalid star range: min {min} must be strictly below max {max}")]
    InvalidStarRange {
        /// Lower bound supplied by the caller.
        min: f64,
        /// Upper bound supplied by the caller.
        max: f64,
    },

    /// A zero result limit was requested.
    #[error("invalid limit: must be at least 1")]
    InvalidLimit,

    /// The catalog query failed at the network level.
    #[error("catalog query failed: {source}")]
    Request {
        /// The underlying network error.
        #[source]
        source: reqwest::Error,
    },

    /// The catalog returned an error status.
    #[error("catalog query rejected with HTTP {status}")]
    HttpStatus {
        /// The HTTP status code.
        status: u16,
    },

    /// The catalog response body could not be decoded.
    #[error("malformed catalog response: {source}")]
    Decode {
        /// The underlying decode error.
        #[source]
        source: reqwest::Error,
    },
}

/// One difficulty variant of a beatmapset.
#[derive(Debug, Clone, Deserialize)]
pub struct Beatmap {
    /// Star rating of this variant.
    pub difficulty_rating: f64,
}

/// A beatmapset as returned by the catalog search endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct BeatmapSet {
    /// Catalog identifier, stable across queries.
    pub id: u64,
    /// Display title; sanitized later for the destination filename.
    pub title: String,
    /// Difficulty variants. May be empty in degenerate responses.
    #[serde(default)]
    pub beatmaps: Vec<Beatmap>,
}

impl BeatmapSet {
    /// Star rating of the first difficulty variant, for display.
    #[must_use]
    pub fn display_rating(&self) -> f64 {
        self.beatmaps.first().map_or(0.0, |b| b.difficulty_rating)
    }
}

/// Top-level catalog search response.
#[derive(Debug, Deserialize)]
struct SearchResponse {
    beatmapsets: Vec<BeatmapSet>,
}

/// A randomized star-rating sub-window inside the caller's overall range.
///
/// Ephemeral: re-derived per query pass, never persisted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchWindow {
    /// Lower star bound of this pass.
    pub min_stars: f64,
    /// Upper star bound of this pass.
    pub max_stars: f64,
}

impl SearchWindow {
    /// Draws a window `[w_min, w_max]` with
    /// `star_min <= w_min <= w_max <= star_max`. The upper bound is itself
    /// randomized between the drawn lower bound and `star_max`.
    pub fn sample<R: Rng>(rng: &mut R, star_min: f64, star_max: f64) -> Self {
        let min_stars = rng.gen_range(star_min..=star_max);
        let max_stars = rng.gen_range(min_stars..=star_max);
        Self {
            min_stars,
            max_stars,
        }
    }

    /// Textual filter expression understood by the search endpoint.
    ///
    /// Bounds are formatted with two decimals, matching what the endpoint
    /// indexes on.
    #[must_use]
    pub fn filter_expression(&self) -> String {
        format!(
            "stars>={:.2} stars<={:.2} mode=osu",
            self.min_stars, self.max_stars
        )
    }
}

/// Client for the authenticated beatmapset search endpoint.
#[derive(Debug, Clone)]
pub struct RecommendationSearcher {
    client: Client,
    base_url: String,
}

impl Default for RecommendationSearcher {
    fn default() -> Self {
        Self::new()
    }
}

impl RecommendationSearcher {
    /// Creates a searcher against the production API.
    #[must_use]
    pub fn new() -> Self {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    /// Creates a searcher with a custom base URL (for testing with wiremock).
    #[must_use]
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
        }
    }

    /// Searches the catalog for up to `limit` beatmapsets in
    /// `[star_min, star_max]`, excluding `exclude` ids.
    ///
    /// Runs up to [`MAX_SEARCH_PASSES`] query passes, each against a freshly
    /// sampled [`SearchWindow`], stopping early once `limit` candidates have
    /// accumulated. Sets seen in an earlier pass of the same run are
    /// deduplicated by id, so the returned ids are pairwise distinct. The
    /// result is shuffled (every permutation equally likely) and truncated
    /// to `limit`.
    ///
    /// An empty result is not an error: it means no new beatmapsets exist in
    /// the requested band, and an empty vec is returned.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError`] for invalid arguments (`star_min >= star_max`
    /// or `limit == 0`) and for query failures.
    #[instrument(skip(self, token, rng, exclude))]
    pub async fn search<R: Rng>(
        &self,
        token: &str,
        rng: &mut R,
        star_min: f64,
        star_max: f64,
        limit: usize,
        exclude: &HashSet<u64>,
    ) -> Result<Vec<BeatmapSet>, SearchError> {
        if !star_min.is_finite() || !star_max.is_finite() || star_min >= star_max {
            return Err(SearchError::InvalidStarRange {
                min: star_min,
                max: star_max,
            });
        }
        if limit == 0 {
            return Err(SearchError::InvalidLimit);
        }

        let mut picked_ids: HashSet<u64> = HashSet::new();
        let mut accumulator: Vec<BeatmapSet> = Vec::new();

        for pass in 0..MAX_SEARCH_PASSES {
            let window = SearchWindow::sample(rng, star_min, star_max);
            debug!(
                pass,
                w_min = window.min_stars,
                w_max = window.max_stars,
                "querying catalog window"
            );

            let sets = self.query(token, &window).await?;
            for set in sets {
                if exclude.contains(&set.id) || !picked_ids.insert(set.id) {
                    continue;
                }
                accumulator.push(set);
            }

            if accumulator.len() >= limit {
                break;
            }
        }

        if accumulator.is_empty() {
            info!("no new beatmapsets found in the requested difficulty band");
            return Ok(Vec::new());
        }

        accumulator.shuffle(rng);
        accumulator.truncate(limit);
        Ok(accumulator)
    }

    /// Runs one popularity-sorted query for a star window.
    async fn query(
        &self,
        token: &str,
        window: &SearchWindow,
    ) -> Result<Vec<BeatmapSet>, SearchError> {
        let response = self
            .client
            .get(format!("{}/beatmapsets/search", self.base_url))
            .bearer_auth(token)
            .query(&[
                ("q", window.filter_expression().as_str()),
                ("sort", "plays_desc"),
            ])
            .send()
            .await
            .map_err(|source| SearchError::Request { source })?;

        let status = response.status();
        if !status.is_success() {
            return Err(SearchError::HttpStatus {
                status: status.as_u16(),
            });
        }

        let body: SearchResponse = response
            .json()
            .await
            .map_err(|source| SearchError::Decode { source })?;

        Ok(body.beatmapsets)
    }
}
