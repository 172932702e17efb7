//! HTTP client wrapper for streaming archive downloads.
//!
//! This module provides the `HttpClient` struct which streams a response
//! body to disk while an inactivity watchdog races the stream: every
//! received chunk postpones the deadline, and the attempt is aborted only
//! when no data has arrived for longer than the stall threshold.

use std::path::Path;
use std::time::Duration;

use futures_util::{Stream, StreamExt};
use reqwest::Client;
use tokio::fs::File;
use tokio::io::{AsyncWrite, AsyncWriteExt, BufWriter};
use tokio::time::{Instant, MissedTickBehavior, interval};
use tracing::{debug, info, instrument, warn};
use url::Url;

use super::error::DownloadError;

/// Default HTTP connect timeout (30 seconds).
pub const CONNECT_TIMEOUT_SECS: u64 = 30;

/// Default cadence of the stall watchdog check (1 second).
pub const STALL_CHECK_INTERVAL: Duration = Duration::from_secs(1);

/// Default inactivity threshold after which a transfer counts as stalled
/// (3 seconds since the last received chunk).
pub const STALL_THRESHOLD: Duration = Duration::from_secs(3);

/// HTTP client for streaming archive downloads with stall detection.
///
/// Designed to be created once and reused across mirror attempts, taking
/// advantage of connection pooling.
///
/// There is deliberately no total-duration request timeout: a
/// slow-but-steady transfer of any length must complete. The only time
/// bound is the inactivity watchdog, measured from the last received chunk.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    check_interval: Duration,
    stall_threshold: Duration,
}

impl Default for HttpClient {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpClient {
    /// Creates a new HTTP client with the default watchdog configuration.
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client builder fails to build with the static
    /// configuration. This should never happen in practice.
    #[must_use]
    pub fn new() -> Self {
        Self::with_watchdog(STALL_CHECK_INTERVAL, STALL_THRESHOLD)
    }

    /// Creates a new HTTP client with an explicit watchdog configuration.
    ///
    /// `check_interval` is how often the watchdog inspects the last-progress
    /// timestamp; `stall_threshold` is the inactivity span that aborts the
    /// attempt. A stalled transfer fails within
    /// `stall_threshold + check_interval`.
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client builder fails to build with the static
    /// configuration. This should never happen in practice.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn with_watchdog(check_interval: Duration, stall_threshold: Duration) -> Self {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .gzip(true)
            .build()
            .expect("failed to build HTTP client with static configuration");
        Self {
            client,
            check_interval,
            stall_threshold,
        }
    }

    /// Downloads `url` to exactly `dest`, streaming chunks as they arrive.
    ///
    /// Returns the number of bytes written. On any failure after the
    /// destination file was created, the partial file is removed and the
    /// file handle is released before this method returns, so a retry
    /// against another mirror starts from a clean slate.
    ///
    /// # Errors
    ///
    /// Returns `DownloadError` if:
    /// - The URL is invalid
    /// - The request fails (network error, connect timeout)
    /// - The server returns an error status (4xx, 5xx)
    /// - The body stream errors or stalls past the inactivity threshold
    /// - Writing to disk fails
    #[instrument(skip(self), fields(url = %url, dest = %dest.display()))]
    pub async fn download_to_file(&self, url: &str, dest: &Path) -> Result<u64, DownloadError> {
        Url::parse(url).map_err(|_| DownloadError::invalid_url(url))?;

        debug!("starting download attempt");
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| DownloadError::network(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(DownloadError::http_status(url, status.as_u16()));
        }

        let file = File::create(dest)
            .await
            .map_err(|e| DownloadError::io(dest, e))?;
        let mut writer = BufWriter::new(file);

        let result = copy_with_watchdog(
            response.bytes_stream(),
            &mut writer,
            url,
            dest,
            self.check_interval,
            self.stall_threshold,
        )
        .await;

        match result {
            Ok(bytes_written) => {
                info!(bytes = bytes_written, "download attempt complete");
                Ok(bytes_written)
            }
            Err(e) => {
                // Release the output handle before removing the partial file.
                drop(writer);
                if let Err(rm) = tokio::fs::remove_file(dest).await {
                    warn!(path = %dest.display(), error = %rm, "failed to remove partial file");
                } else {
                    debug!(path = %dest.display(), "removed partial file after failed attempt");
                }
                Err(e)
            }
        }
    }
}

/// Streams body chunks into `writer`, racing an inactivity watchdog.
///
/// The watchdog is a periodic check against a mutable last-progress
/// timestamp, not a one-shot timer: every chunk that arrives postpones the
/// deadline, so total transfer time is unbounded as long as data keeps
/// flowing.
async fn copy_with_watchdog<S, B, E, W>(
    mut stream: S,
    writer: &mut W,
    url: &str,
    dest: &Path,
    check_interval: Duration,
    stall_threshold: Duration,
) -> Result<u64, DownloadError>
where
    S: Stream<Item = Result<B, E>> + Unpin,
    B: AsRef<[u8]>,
    E: std::error::Error + Send + Sync + 'static,
    W: AsyncWrite + Unpin,
{
    let mut ticker = interval(check_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut last_progress = Instant::now();
    let mut bytes_written: u64 = 0;

    loop {
        tokio::select! {
            chunk = stream.next() => match chunk {
                Some(Ok(chunk)) => {
                    writer
                        .write_all(chunk.as_ref())
                        .await
                        .map_err(|e| DownloadError::io(dest, e))?;
                    bytes_written += chunk.as_ref().len() as u64;
                    last_progress = Instant::now();
                }
                Some(Err(e)) => return Err(DownloadError::stream(url, e)),
                None => break,
            },
            _ = ticker.tick() => {
                if last_progress.elapsed() > stall_threshold {
                    return Err(DownloadError::stalled(url, stall_threshold));
                }
            }
        }
    }

    writer
        .flush()
        .await
        .map_err(|e| DownloadError::io(dest, e))?;

    Ok(bytes_written)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    use std::convert::Infallible;
    use std::io;

    use tempfile::TempDir;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_download_to_file_success() {
        let mock_server = MockServer::start().await;
        let temp_dir = TempDir::new().unwrap();

        Mock::given(method("GET"))
            .and(path("/api/d/42"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"osz archive bytes"))
            .mount(&mock_server)
            .await;

        let client = HttpClient::new();
        let url = format!("{}/api/d/42", mock_server.uri());
        let dest = temp_dir.path().join("song.osz");

        let bytes = client.download_to_file(&url, &dest).await.unwrap();

        assert_eq!(bytes, 17);
        assert_eq!(std::fs::read(&dest).unwrap(), b"osz archive bytes");
    }

    #[tokio::test]
    async fn test_download_to_file_http_500() {
        let mock_server = MockServer::start().await;
        let temp_dir = TempDir::new().unwrap();

        Mock::given(method("GET"))
            .and(path("/api/d/42"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&mock_server)
            .await;

        let client = HttpClient::new();
        let url = format!("{}/api/d/42", mock_server.uri());
        let dest = temp_dir.path().join("song.osz");

        let result = client.download_to_file(&url, &dest).await;

        match result {
            Err(DownloadError::HttpStatus { status: 500, .. }) => {}
            other => panic!("Expected HttpStatus 500, got: {other:?}"),
        }
        assert!(!dest.exists(), "no file should be created on HTTP error");
    }

    #[tokio::test]
    async fn test_download_to_file_invalid_url() {
        let temp_dir = TempDir::new().unwrap();
        let client = HttpClient::new();

        let result = client
            .download_to_file("not-a-valid-url", &temp_dir.path().join("x.osz"))
            .await;

        assert!(matches!(result, Err(DownloadError::InvalidUrl { .. })));
    }

    #[tokio::test]
    async fn test_download_to_file_large_body_streams() {
        let mock_server = MockServer::start().await;
        let temp_dir = TempDir::new().unwrap();

        let large_content = vec![7u8; 1024 * 1024];
        Mock::given(method("GET"))
            .and(path("/d/9"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(large_content.clone()))
            .mount(&mock_server)
            .await;

        let client = HttpClient::new();
        let url = format!("{}/d/9", mock_server.uri());
        let dest = temp_dir.path().join("big.osz");

        let bytes = client.download_to_file(&url, &dest).await.unwrap();

        assert_eq!(bytes, 1024 * 1024);
        assert_eq!(std::fs::metadata(&dest).unwrap().len(), 1024 * 1024);
    }

    /// Builds a stream that yields `chunks` byte chunks spaced `gap` apart.
    fn paced_stream(
        chunks: usize,
        gap: Duration,
    ) -> impl Stream<Item = Result<Vec<u8>, Infallible>> + Unpin {
        Box::pin(futures_util::stream::unfold(0usize, move |n| async move {
            if n >= chunks {
                return None;
            }
            tokio::time::sleep(gap).await;
            Some((Ok(vec![0u8; 64]), n + 1))
        }))
    }

    #[tokio::test(start_paused = true)]
    async fn test_watchdog_steady_slow_transfer_completes() {
        // 20 chunks, 2s apart: 40s total, far beyond the 3s threshold, but
        // every gap is below it, so the transfer must complete.
        let stream = paced_stream(20, Duration::from_secs(2));
        let mut sink = io::Cursor::new(Vec::new());

        let result = copy_with_watchdog(
            stream,
            &mut sink,
            "http://mirror.test/d/1",
            Path::new("unused.osz"),
            Duration::from_secs(1),
            Duration::from_secs(3),
        )
        .await;

        assert_eq!(result.unwrap(), 20 * 64);
    }

    #[tokio::test(start_paused = true)]
    async fn test_watchdog_aborts_stalled_transfer() {
        // One chunk, then silence: the watchdog must fire within
        // threshold + one check interval of the last progress event.
        let stream = Box::pin(futures_util::stream::unfold(0usize, |n| async move {
            match n {
                0 => Some((Ok::<_, Infallible>(vec![0u8; 64]), 1)),
                _ => {
                    tokio::time::sleep(Duration::from_secs(600)).await;
                    None
                }
            }
        }));
        let mut sink = io::Cursor::new(Vec::new());

        let started = Instant::now();
        let result = copy_with_watchdog(
            stream,
            &mut sink,
            "http://mirror.test/d/1",
            Path::new("unused.osz"),
            Duration::from_secs(1),
            Duration::from_secs(3),
        )
        .await;

        match result {
            Err(DownloadError::Stalled {
                threshold_secs: 3, ..
            }) => {}
            other => panic!("Expected Stalled, got: {other:?}"),
        }
        assert!(
            started.elapsed() <= Duration::from_secs(4) + Duration::from_millis(100),
            "watchdog must fire within threshold + one check interval, took {:?}",
            started.elapsed()
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_watchdog_stream_error_propagates() {
        let stream = Box::pin(futures_util::stream::iter(vec![
            Ok::<Vec<u8>, io::Error>(vec![1, 2, 3]),
            Err(io::Error::new(io::ErrorKind::ConnectionReset, "reset")),
        ]));
        let mut sink = io::Cursor::new(Vec::new());

        let result = copy_with_watchdog(
            stream,
            &mut sink,
            "http://mirror.test/d/1",
            Path::new("unused.osz"),
            Duration::from_secs(1),
            Duration::from_secs(3),
        )
        .await;

        assert!(matches!(result, Err(DownloadError::Stream { .. })));
    }
}
