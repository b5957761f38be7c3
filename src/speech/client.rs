//! Shared HTTP client handle for the speech endpoints.

use reqwest::Client;
use std::time::Duration;

use crate::config::ApiConfig;
use crate::error::{Result, SpeechError};
use crate::speech::types::ApiCredential;

const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// One remote client handle shared by both request/response flows.
///
/// Holds the transport, the API base URL, and the per-call timeout. The
/// credential is NOT held here; it is passed explicitly into each adapter
/// call so the adapters stay independently testable.
#[derive(Clone)]
pub struct SpeechClient {
    pub(crate) client: Client,
    base_url: String,
    timeout: Duration,
}

impl SpeechClient {
    /// Create a client against a specific base URL with a per-call timeout.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(DEFAULT_CONNECT_TIMEOUT)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into(),
            timeout,
        })
    }

    /// Create a client from the loaded configuration.
    pub fn from_config(api: &ApiConfig) -> Result<Self> {
        Self::new(api.base_url.clone(), api.timeout())
    }

    /// Per-call timeout passed straight through to the transport layer.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub(crate) fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), path)
    }

    /// Reject empty credentials before any network call is attempted.
    pub(crate) fn require_credential<'a>(
        &self,
        credential: &'a ApiCredential,
    ) -> Result<&'a str> {
        if credential.is_empty() {
            return Err(SpeechError::MissingCredential);
        }
        Ok(credential.as_str())
    }

    /// Read a non-success response body and surface it verbatim.
    pub(crate) async fn api_error(response: reqwest::Response) -> SpeechError {
        let status = response.status().as_u16();
        let message = response.text().await.unwrap_or_default();
        SpeechError::Api { status, message }
    }
}
