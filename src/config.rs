//! Credentials and on-disk path resolution.
//!
//! API credentials come from the environment (`OSU_CLIENT_ID` /
//! `OSU_CLIENT_SECRET`, `.env` honored by the binary). The content root
//! defaults to the osu! Songs directory under the platform's local
//! application-data area; the dedup registry defaults to a JSON file in the
//! working directory.

use std::path::PathBuf;

use thiserror::Error;

/// Environment variable holding the OAuth client id.
pub const CLIENT_ID_VAR: &str = "OSU_CLIENT_ID";

/// Environment variable holding the OAuth client secret.
pub const CLIENT_SECRET_VAR: &str = "OSU_CLIENT_SECRET";

/// Default filename of the persisted dedup registry.
pub const REGISTRY_FILE: &str = "downloaded_maps.json";

/// Configuration errors, all fatal at startup before any network call.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required credential variable is unset or empty.
    #[error("missing credential: set the {name} environment variable (or put it in .env)")]
    MissingCredential {
        /// The variable that was not set.
        name: &'static str,
    },

    /// The platform's local application-data directory could not be resolved.
    #[error("could not determine the local application-data directory; pass --songs-dir")]
    NoDataDir,
}

/// OAuth client credentials for the osu! API.
#[derive(Debug, Clone)]
pub struct Credentials {
    /// OAuth client id.
    pub client_id: String,
    /// OAuth client secret.
    pub client_secret: String,
}

impl Credentials {
    /// Reads credentials from the environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingCredential`] when either variable is
    /// unset or empty.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            client_id: require_var(CLIENT_ID_VAR)?,
            client_secret: require_var(CLIENT_SECRET_VAR)?,
        })
    }
}

fn require_var(name: &'static str) -> Result<String, ConfigError> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or(ConfigError::MissingCredential { name })
}

/// Default content root: `<local app data>/osu!/Songs`.
///
/// # Errors
///
/// Returns [`ConfigError::NoDataDir`] when the platform provides no local
/// application-data directory.
pub fn default_songs_dir() -> Result<PathBuf, ConfigError> {
    dirs::data_local_dir()
        .map(|dir| dir.join("osu!").join("Songs"))
        .ok_or(ConfigError::NoDataDir)
}

/// Default registry location: `downloaded_maps.json` in the working directory.
#[must_use]
pub fn default_registry_path() -> PathBuf {
    PathBuf::from(REGISTRY_FILE)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    // Env mutation is process-global; serialize these tests.
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    struct EnvVarRestore {
        name: &'static str,
        previous: Option<String>,
    }

    impl EnvVarRestore {
        fn set(name: &'static str, value: Option<&str>) -> Self {
            let previous = std::env::var(name).ok();
            // SAFETY: tests hold ENV_LOCK to avoid concurrent env mutation.
            unsafe {
                match value {
                    Some(value) => std::env::set_var(name, value),
                    None => std::env::remove_var(name),
                }
            }
            Self { name, previous }
        }
    }

    impl Drop for EnvVarRestore {
        fn drop(&mut self) {
            // SAFETY: paired restoration under the same lock.
            unsafe {
                match &self.previous {
                    Some(previous) => std::env::set_var(self.name, previous),
                    None => std::env::remove_var(self.name),
                }
            }
        }
    }

    #[test]
    fn test_credentials_from_env_success() {
        let _lock = ENV_LOCK.lock().unwrap();
        let _id = EnvVarRestore::set(CLIENT_ID_VAR, Some("42"));
        let _secret = EnvVarRestore::set(CLIENT_SECRET_VAR, Some("hunter2"));

        let credentials = Credentials::from_env().unwrap();
        assert_eq!(credentials.client_id, "42");
        assert_eq!(credentials.client_secret, "hunter2");
    }

    #[test]
    fn test_credentials_missing_id() {
        let _lock = ENV_LOCK.lock().unwrap();
        let _id = EnvVarRestore::set(CLIENT_ID_VAR, None);
        let _secret = EnvVarRestore::set(CLIENT_SECRET_VAR, Some("hunter2"));

        let result = Credentials::from_env();
        match result {
            Err(ConfigError::MissingCredential { name }) => assert_eq!(name, CLIENT_ID_VAR),
            other => panic!("Expected MissingCredential, got: {other:?}"),
        }
    }

    #[test]
    fn test_credentials_empty_secret_rejected() {
        let _lock = ENV_LOCK.lock().unwrap();
        let _id = EnvVarRestore::set(CLIENT_ID_VAR, Some("42"));
        let _secret = EnvVarRestore::set(CLIENT_SECRET_VAR, Some("   "));

        assert!(matches!(
            Credentials::from_env(),
            Err(ConfigError::MissingCredential {
                name: CLIENT_SECRET_VAR
            })
        ));
    }

    #[test]
    fn test_default_registry_path() {
        assert_eq!(default_registry_path(), PathBuf::from("downloaded_maps.json"));
    }

    #[test]
    fn test_default_songs_dir_suffix() {
        // data_local_dir is present on all CI platforms we run on.
        let dir = default_songs_dir().unwrap();
        assert!(dir.ends_with(PathBuf::from("osu!").join("Songs")));
    }
}
