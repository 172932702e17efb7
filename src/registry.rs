//! Persisted set of already-downloaded beatmapset ids.
//!
//! The registry is the single source of truth for "already downloaded". It
//! is persisted as a JSON array of integer ids and rewritten in full after
//! every successful download, so a crash mid-run never reports a false
//! positive: an id is only present once its archive was durably written.
//!
//! Single-threaded cooperative use only; the orchestrator is the sole
//! writer.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, instrument, warn};

/// Errors from registry persistence.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// Reading or writing the registry file failed.
    #[error("IO error accessing registry {path}: {source}")]
    Io {
        /// The registry file path.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// Serializing the id set failed. Should never happen for a `Vec<u64>`.
    #[error("failed to serialize registry {path}: {source}")]
    Serialize {
        /// The registry file path.
        path: PathBuf,
        /// The underlying serialization error.
        #[source]
        source: serde_json::Error,
    },
}

/// Persisted dedup registry of downloaded beatmapset ids.
#[derive(Debug)]
pub struct DownloadRegistry {
    path: PathBuf,
    seen: HashSet<u64>,
}

impl DownloadRegistry {
    /// Loads the registry from `path`.
    ///
    /// A missing or unparsable file resets tracking to the empty set and
    /// (re)persists it immediately: corruption must never crash the run,
    /// only silently reset what is considered already downloaded.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Io`] only for IO failures other than
    /// file-not-found (e.g. permission denied), and for failures persisting
    /// the reset state.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, RegistryError> {
        let path = path.as_ref().to_path_buf();

        let seen = match tokio::fs::read_to_string(&path).await {
            Ok(data) => match serde_json::from_str::<Vec<u64>>(&data) {
                Ok(ids) => {
                    let seen: HashSet<u64> = ids.into_iter().collect();
                    debug!(count = seen.len(), "loaded registry");
                    Some(seen)
                }
                Err(e) => {
                    warn!(error = %e, "registry file unparsable, resetting tracking");
                    None
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("no registry file, starting empty");
                None
            }
            Err(e) => return Err(RegistryError::Io { path, source: e }),
        };

        match seen {
            Some(seen) => Ok(Self { path, seen }),
            None => {
                let registry = Self {
                    path,
                    seen: HashSet::new(),
                };
                registry.save().await?;
                Ok(registry)
            }
        }
    }

    /// Overwrites the persisted state with the current id set.
    ///
    /// The file is rewritten in full (no append semantics); ids are written
    /// sorted so consecutive rewrites of the same set are byte-identical.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError`] if serialization or the write fails.
    pub async fn save(&self) -> Result<(), RegistryError> {
        let mut ids: Vec<u64> = self.seen.iter().copied().collect();
        ids.sort_unstable();

        let json = serde_json::to_string_pretty(&ids).map_err(|e| RegistryError::Serialize {
            path: self.path.clone(),
            source: e,
        })?;

        tokio::fs::write(&self.path, json)
            .await
            .map_err(|e| RegistryError::Io {
                path: self.path.clone(),
                source: e,
            })
    }

    /// Returns true if `set_id` was already downloaded.
    #[must_use]
    pub fn contains(&self, set_id: u64) -> bool {
        self.seen.contains(&set_id)
    }

    /// Records `set_id` as downloaded. Returns false if it was already known.
    pub fn insert(&mut self, set_id: u64) -> bool {
        self.seen.insert(set_id)
    }

    /// The set of downloaded ids, for search-time filtering.
    #[must_use]
    pub fn seen_ids(&self) -> &HashSet<u64> {
        &self.seen
    }

    /// Number of recorded downloads.
    #[must_use]
    pub fn len(&self) -> usize {
        self.seen.len()
    }

    /// Returns true when nothing has been downloaded yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    use tempfile::TempDir;

    #[tokio::test]
    async fn test_load_missing_file_creates_empty_registry() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("downloaded_maps.json");

        let registry = DownloadRegistry::load(&path).await.unwrap();

        assert!(registry.is_empty());
        assert!(path.exists(), "empty registry must be persisted on load");
        assert_eq!(std::fs::read_to_string(&path).unwrap().trim(), "[]");
    }

    #[tokio::test]
    async fn test_load_corrupt_file_resets_tracking() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("downloaded_maps.json");
        std::fs::write(&path, "{not json at all").unwrap();

        let registry = DownloadRegistry::load(&path).await.unwrap();

        assert!(registry.is_empty(), "corruption resets, never crashes");
        // The reset state was re-persisted.
        let reloaded = DownloadRegistry::load(&path).await.unwrap();
        assert!(reloaded.is_empty());
    }

    #[tokio::test]
    async fn test_save_and_reload_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("downloaded_maps.json");

        let mut registry = DownloadRegistry::load(&path).await.unwrap();
        assert!(registry.insert(303));
        assert!(registry.insert(101));
        assert!(!registry.insert(101), "duplicate insert reports false");
        registry.save().await.unwrap();

        let reloaded = DownloadRegistry::load(&path).await.unwrap();
        assert_eq!(reloaded.len(), 2);
        assert!(reloaded.contains(101));
        assert!(reloaded.contains(303));
        assert!(!reloaded.contains(202));
    }

    #[tokio::test]
    async fn test_save_writes_sorted_ids() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("downloaded_maps.json");

        let mut registry = DownloadRegistry::load(&path).await.unwrap();
        registry.insert(500);
        registry.insert(3);
        registry.insert(42);
        registry.save().await.unwrap();

        let data = std::fs::read_to_string(&path).unwrap();
        let ids: Vec<u64> = serde_json::from_str(&data).unwrap();
        assert_eq!(ids, vec![3, 42, 500]);
    }

    #[tokio::test]
    async fn test_full_rewrite_replaces_previous_contents() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("downloaded_maps.json");
        std::fs::write(&path, "[1, 2, 3, 4, 5]").unwrap();

        let registry = DownloadRegistry::load(&path).await.unwrap();
        assert_eq!(registry.len(), 5);

        let mut fresh = DownloadRegistry {
            path: path.clone(),
            seen: HashSet::new(),
        };
        fresh.insert(9);
        fresh.save().await.unwrap();

        let ids: Vec<u64> =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(ids, vec![9], "save is a wholesale rewrite");
    }
}
