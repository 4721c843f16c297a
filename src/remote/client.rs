//! HTTP client for the global notes service.
//!
//! This module provides `HttpNoteSource` for making synchronous HTTP requests to the
//! global notes API, along with error types and builder patterns for configuration.

use std::time::Duration;

use log::{debug, info};
use reqwest::Url;
use thiserror::Error;

use crate::config::{remote_timeout_from_env, remote_url_from_env};
use crate::models::GlobalNote;

/// Errors that can occur when fetching global notes.
///
/// Every variant renders a human-readable message. No variant is retried.
#[derive(Debug, Error)]
pub enum RemoteError {
    /// Network-related errors (connection failures, DNS resolution, etc.)
    #[error("Network error: {0}")]
    Network(#[source] reqwest::Error),

    /// Request or response timeout errors
    #[error("Request timed out")]
    Timeout(#[source] reqwest::Error),

    /// The service answered with a non-success status
    #[error("HTTP error: status {status}")]
    Http { status: u16 },

    /// The response body was not the expected JSON
    #[error("Unexpected response body: {0}")]
    Decode(#[source] serde_json::Error),

    /// Invalid URL configuration error
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

impl RemoteError {
    fn from_reqwest(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            Self::Timeout(error)
        } else {
            Self::Network(error)
        }
    }
}

/// Source of global notes.
///
/// This trait enables mocking in unit tests and keeps callers independent
/// of the transport.
pub trait RemoteNoteSource {
    /// Fetches every global note.
    fn fetch_list(&self) -> Result<Vec<GlobalNote>, RemoteError>;

    /// Fetches a single global note by its `_id`.
    fn fetch_one(&self, id: &str) -> Result<GlobalNote, RemoteError>;
}

/// Builder for constructing `HttpNoteSource` instances.
///
/// # Examples
///
/// ```
/// use hlar::HttpNoteSourceBuilder;
///
/// let source = HttpNoteSourceBuilder::new()
///     .base_url("http://localhost:5000")
///     .build()
///     .expect("Failed to create client");
/// assert_eq!(source.base_url(), "http://localhost:5000/");
/// ```
#[derive(Debug, Default)]
pub struct HttpNoteSourceBuilder {
    base_url: Option<String>,
    timeout: Option<Duration>,
}

impl HttpNoteSourceBuilder {
    /// Creates a new `HttpNoteSourceBuilder` with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the base URL of the service (e.g., "http://localhost:5000").
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Sets the overall request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Builds the `HttpNoteSource` with the configured settings.
    ///
    /// # Environment Variables
    ///
    /// If `base_url()` was not called, `HLAR_REMOTE_URL` is used, then
    /// `http://localhost:5000`. If `timeout()` was not called,
    /// `HLAR_REMOTE_TIMEOUT_SECS` is used, then 30 seconds.
    pub fn build(self) -> Result<HttpNoteSource, RemoteError> {
        let raw_url = self.base_url.unwrap_or_else(remote_url_from_env);
        let timeout = self.timeout.unwrap_or_else(remote_timeout_from_env);

        let mut base_url = Url::parse(&raw_url)
            .map_err(|e| RemoteError::InvalidUrl(format!("{}: {}", raw_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(RemoteError::InvalidUrl(format!("{raw_url}: not a base URL")));
        }
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(5))
            .build()
            .map_err(RemoteError::Network)?;

        Ok(HttpNoteSource { client, base_url })
    }
}

/// Blocking HTTP client for the global notes API.
///
/// Issues `GET {base}/api/notes` and `GET {base}/api/notes/{id}`. Each call
/// is a single attempt.
pub struct HttpNoteSource {
    client: reqwest::blocking::Client,
    base_url: Url,
}

impl HttpNoteSource {
    /// Returns the base URL configured for this client.
    pub fn base_url(&self) -> &str {
        self.base_url.as_str()
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        // Checked in build(): the base URL can carry path segments.
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn get_json<T: serde::de::DeserializeOwned>(&self, url: Url) -> Result<T, RemoteError> {
        debug!("GET {url}");
        let response = self
            .client
            .get(url)
            .send()
            .map_err(RemoteError::from_reqwest)?;

        let status = response.status();
        if !status.is_success() {
            return Err(RemoteError::Http {
                status: status.as_u16(),
            });
        }

        let body = response.text().map_err(RemoteError::from_reqwest)?;
        serde_json::from_str(&body).map_err(RemoteError::Decode)
    }
}

impl RemoteNoteSource for HttpNoteSource {
    fn fetch_list(&self) -> Result<Vec<GlobalNote>, RemoteError> {
        let notes: Vec<GlobalNote> = self.get_json(self.endpoint(&["api", "notes"]))?;
        info!("fetched {} global notes", notes.len());
        Ok(notes)
    }

    fn fetch_one(&self, id: &str) -> Result<GlobalNote, RemoteError> {
        let note: GlobalNote = self.get_json(self.endpoint(&["api", "notes", id]))?;
        info!("fetched global note {}", note.id);
        Ok(note)
    }
}

#[cfg(test)]
mod tests {
    use std::error::Error;
    use std::io::{Read, Write};
    use std::net::TcpListener;
    use std::thread::{self, JoinHandle};

    use super::*;

    /// Serves one HTTP response on loopback and returns the request line it saw.
    fn serve_once(status_line: &'static str, body: &'static str) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind loopback");
        let addr = listener.local_addr().expect("local addr");

        let handle = thread::spawn(move || {
            let (mut stream, _) = listener.accept().expect("accept");
            let mut buf = [0u8; 4096];
            let n = stream.read(&mut buf).expect("read request");
            let request = String::from_utf8_lossy(&buf[..n]).to_string();

            let response = format!(
                "HTTP/1.1 {status_line}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            stream.write_all(response.as_bytes()).expect("write response");
            request.lines().next().unwrap_or_default().to_string()
        });

        (format!("http://{addr}"), handle)
    }

    fn source_for(base_url: &str) -> HttpNoteSource {
        HttpNoteSourceBuilder::new()
            .base_url(base_url)
            .timeout(Duration::from_secs(5))
            .build()
            .expect("client builds")
    }

    #[test]
    fn fetch_list_decodes_notes() {
        let (url, server) = serve_once(
            "200 OK",
            r#"[{"_id":"1","title":"Soup","markdown":"hot","tags":["food"]},{"_id":"2","title":"Bare"}]"#,
        );

        let notes = source_for(&url).fetch_list().expect("fetch succeeds");

        assert_eq!(server.join().unwrap(), "GET /api/notes HTTP/1.1");
        assert_eq!(notes.len(), 2);
        assert_eq!(notes[0].tags, vec!["food"]);
        assert!(notes[1].tags.is_empty());
    }

    #[test]
    fn fetch_one_requests_note_path() {
        let (url, server) = serve_once(
            "200 OK",
            r#"{"_id":"abc","title":"One","markdown":"","tags":[]}"#,
        );

        let note = source_for(&url).fetch_one("abc").expect("fetch succeeds");

        assert_eq!(server.join().unwrap(), "GET /api/notes/abc HTTP/1.1");
        assert_eq!(note.id, "abc");
    }

    #[test]
    fn fetch_one_escapes_id() {
        let (url, server) = serve_once("200 OK", r#"{"_id":"a/b","title":"x"}"#);

        source_for(&url).fetch_one("a/b").expect("fetch succeeds");

        assert_eq!(server.join().unwrap(), "GET /api/notes/a%2Fb HTTP/1.1");
    }

    #[test]
    fn base_url_with_path_prefix_is_kept() {
        let (url, server) = serve_once("200 OK", "[]");

        source_for(&format!("{url}/prefix"))
            .fetch_list()
            .expect("fetch succeeds");

        assert_eq!(server.join().unwrap(), "GET /prefix/api/notes HTTP/1.1");
    }

    #[test]
    fn non_success_status_is_http_error() {
        let (url, server) = serve_once("500 Internal Server Error", "{}");

        let err = source_for(&url).fetch_list().unwrap_err();
        server.join().unwrap();

        assert!(matches!(err, RemoteError::Http { status: 500 }));
        assert!(err.to_string().contains("500"));
    }

    #[test]
    fn malformed_body_is_decode_error() {
        let (url, server) = serve_once("200 OK", r#"{"not":"a list"}"#);

        let err = source_for(&url).fetch_list().unwrap_err();
        server.join().unwrap();

        assert!(matches!(err, RemoteError::Decode(_)));
        assert!(err.source().is_some());
    }

    #[test]
    fn refused_connection_is_network_error() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let err = source_for(&format!("http://{addr}"))
            .fetch_list()
            .unwrap_err();

        assert!(matches!(err, RemoteError::Network(_)));
        assert!(err.to_string().starts_with("Network error"));
    }

    #[test]
    fn invalid_url_is_rejected_at_build() {
        let err = HttpNoteSourceBuilder::new()
            .base_url("not a url")
            .build()
            .err()
            .expect("build fails");
        assert!(matches!(err, RemoteError::InvalidUrl(_)));

        let err = HttpNoteSourceBuilder::new()
            .base_url("mailto:someone@example.com")
            .build()
            .err()
            .expect("build fails");
        assert!(matches!(err, RemoteError::InvalidUrl(_)));
    }

    #[test]
    fn http_error_message_is_readable() {
        let err = RemoteError::Http { status: 404 };
        assert_eq!(err.to_string(), "HTTP error: status 404");
    }
}
