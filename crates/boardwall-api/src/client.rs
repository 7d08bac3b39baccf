// Backend HTTP client
//
// Wraps `reqwest::Client` with base-URL joining and uniform response
// handling. The endpoint groups (boards, system, health) are implemented
// as inherent methods in separate files to keep this module focused on
// transport mechanics.

use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::error::Error;
use crate::transport::TransportConfig;

/// Raw HTTP client for the chess game backend.
///
/// Cheap to clone: the underlying `reqwest::Client` is reference counted,
/// so every board poller can hold its own copy.
#[derive(Debug, Clone)]
pub struct BackendClient {
    http: reqwest::Client,
    base_url: Url,
}

impl BackendClient {
    /// Create a new client from a base URL and a `TransportConfig`.
    pub fn new(base_url: &str, transport: &TransportConfig) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Self::from_reqwest(base_url, http)
    }

    /// Wrap an existing `reqwest::Client`.
    pub fn from_reqwest(base_url: &str, http: reqwest::Client) -> Result<Self, Error> {
        let base_url = Self::normalize_base_url(base_url)?;
        Ok(Self { http, base_url })
    }

    /// Ensure the base URL ends with a slash so relative joins keep any
    /// path prefix the backend is mounted under.
    fn normalize_base_url(raw: &str) -> Result<Url, Error> {
        let mut url = Url::parse(raw)?;
        let path = url.path().trim_end_matches('/').to_owned();
        url.set_path(&format!("{path}/"));
        Ok(url)
    }

    /// The backend base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // ── URL builder ──────────────────────────────────────────────────

    /// Join a path onto the base URL. Leading slashes are stripped so
    /// `/get_boards` and `get_boards` resolve identically.
    pub(crate) fn url(&self, path: &str) -> Result<Url, Error> {
        Ok(self.base_url.join(path.trim_start_matches('/'))?)
    }

    // ── HTTP verbs ───────────────────────────────────────────────────

    pub(crate) async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, Error> {
        let url = self.url(path)?;
        debug!("GET {url}");

        let resp = self.http.get(url).send().await?;
        Self::handle_response(resp).await
    }

    pub(crate) async fn get_bytes(&self, path: &str) -> Result<bytes::Bytes, Error> {
        let url = self.url(path)?;
        debug!("GET {url}");

        let resp = self.http.get(url).send().await?;
        let status = resp.status();
        if status.is_success() {
            Ok(resp.bytes().await?)
        } else {
            Err(Self::parse_error(status, resp).await)
        }
    }

    pub(crate) async fn post_empty(&self, path: &str) -> Result<(), Error> {
        let url = self.url(path)?;
        debug!("POST {url}");

        let resp = self.http.post(url).send().await?;
        Self::handle_empty(resp).await
    }

    /// Bare status request used by the health check.
    pub(crate) async fn status_of(&self, path: &str) -> Result<reqwest::StatusCode, Error> {
        let url = self.url(path)?;
        let resp = self.http.get(url).send().await?;
        Ok(resp.status())
    }

    // ── Response handling ────────────────────────────────────────────

    async fn handle_response<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, Error> {
        let status = resp.status();
        if status.is_success() {
            let body = resp.text().await?;
            serde_json::from_str(&body).map_err(|e| {
                let preview: String = body.chars().take(200).collect();
                Error::Deserialization {
                    message: format!("{e} (body preview: {preview:?})"),
                    body,
                }
            })
        } else {
            Err(Self::parse_error(status, resp).await)
        }
    }

    async fn handle_empty(resp: reqwest::Response) -> Result<(), Error> {
        let status = resp.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(Self::parse_error(status, resp).await)
        }
    }

    /// The backend reports failures as `{"error": "..."}`; anything else is
    /// passed through verbatim.
    async fn parse_error(status: reqwest::StatusCode, resp: reqwest::Response) -> Error {
        #[derive(serde::Deserialize)]
        struct ErrorResponse {
            error: String,
        }

        let raw = resp.text().await.unwrap_or_default();
        let message = match serde_json::from_str::<ErrorResponse>(&raw) {
            Ok(err) => err.error,
            Err(_) if raw.is_empty() => status.to_string(),
            Err(_) => raw,
        };

        Error::Http {
            status: status.as_u16(),
            message,
        }
    }
}
