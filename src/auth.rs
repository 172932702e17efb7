//! OAuth2 token acquisition for the osu! API.
//!
//! The catalog search endpoint requires a bearer token obtained via the
//! `client_credentials` grant with the `public` scope. Token failure is
//! fatal for a run; there is no fallback identity.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, instrument};

use crate::config::Credentials;

/// Default osu! auth endpoint base URL.
const DEFAULT_BASE_URL: &str = "https://osu.ppy.sh";

/// Errors acquiring an access token. All variants are fatal for the run.
#[derive(Debug, Error)]
pub enum AuthError {
    /// The token request failed at the network level.
    #[error("token request failed: {source}")]
    Request {
        /// The underlying network error.
        #[source]
        source: reqwest::Error,
    },

    /// The auth endpoint returned an error status.
    #[error("token request rejected with HTTP {status}")]
    HttpStatus {
        /// The HTTP status code.
        status: u16,
    },

    /// The token response body could not be decoded.
    #[error("malformed token response: {source}")]
    Decode {
        /// The underlying decode error.
        #[source]
        source: reqwest::Error,
    },
}

/// JSON body of the token request.
#[derive(Debug, Serialize)]
struct TokenRequest<'a> {
    client_id: &'a str,
    client_secret: &'a str,
    grant_type: &'a str,
    scope: &'a str,
}

/// JSON body of a successful token response.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// Client for the osu! OAuth token endpoint.
#[derive(Debug, Clone)]
pub struct AuthClient {
    client: Client,
    base_url: String,
}

impl Default for AuthClient {
    fn default() -> Self {
        Self::new()
    }
}

impl AuthClient {
    /// Creates an auth client against the production endpoint.
    #[must_use]
    pub fn new() -> Self {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    /// Creates an auth client with a custom base URL (for testing with wiremock).
    #[must_use]
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
        }
    }

    /// Requests a bearer token using the client-credentials grant.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError`] if the request fails, the endpoint rejects the
    /// credentials, or the response body is malformed.
    #[instrument(skip(self, credentials))]
    pub async fn fetch_token(&self, credentials: &Credentials) -> Result<String, AuthError> {
        let body = TokenRequest {
            client_id: &credentials.client_id,
            client_secret: &credentials.client_secret,
            grant_type: "client_credentials",
            scope: "public",
        };

        let response = self
            .client
            .post(format!("{}/oauth/token", self.base_url))
            .json(&body)
            .send()
            .await
            .map_err(|source| AuthError::Request { source })?;

        let status = response.status();
        if !status.is_success() {
            return Err(AuthError::HttpStatus {
                status: status.as_u16(),
            });
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|source| AuthError::Decode { source })?;

        debug!("access token acquired");
        Ok(token.access_token)
    }
}
