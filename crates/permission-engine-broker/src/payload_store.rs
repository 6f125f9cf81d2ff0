// crates/permission-engine-broker/src/payload_store.rs
// ============================================================================
// Module: HTTP Payload Store
// Description: Client for the encrypted private-payload store.
// Purpose: Store raw payloads and return their content hash.
// Dependencies: permission-engine-core, base64, reqwest, serde, url
// ============================================================================

//! ## Overview
//! [`HttpPayloadStore`] posts `{payload, from}` to `<endpoint>/storeraw`,
//! with the payload base64-encoded, and decodes the base64 `key` field of
//! the answer into a [`PayloadHash`].
//! Invariants:
//! - Only HTTP 200 is success; every other status is a hard error.
//! - Requests are never retried and redirects are never followed.
//! - Response bodies are capped at [`MAX_RESPONSE_BYTES`].
//!
//! Security posture: the store is an external process; its responses are
//! untrusted input.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Read;
use std::time::Duration;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use permission_engine_core::PayloadHash;
use permission_engine_core::PayloadStore;
use permission_engine_core::PayloadStoreError;
use reqwest::StatusCode;
use reqwest::blocking::Client;
use reqwest::header::CONTENT_TYPE;
use reqwest::redirect::Policy;
use serde::Deserialize;
use serde::Serialize;
use url::Url;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default request timeout.
pub const DEFAULT_PAYLOAD_TIMEOUT: Duration = Duration::from_secs(30);
/// Maximum response body accepted from the store.
pub const MAX_RESPONSE_BYTES: usize = 64 * 1024;
/// Maximum response body echoed into errors.
const MAX_ERROR_BODY_CHARS: usize = 256;
/// Path of the store-raw operation, relative to the endpoint.
const STORE_RAW_PATH: &str = "storeraw";

// ============================================================================
// SECTION: Wire Types
// ============================================================================

/// Store-raw request body.
#[derive(Serialize)]
struct StoreRawRequest<'a> {
    /// Base64 payload.
    payload: String,
    /// Sender hint; omitted when empty.
    #[serde(skip_serializing_if = "Option::is_none")]
    from: Option<&'a str>,
}

/// Store-raw response body.
#[derive(Deserialize)]
struct StoreRawResponse {
    /// Base64 content hash.
    key: String,
}

// ============================================================================
// SECTION: Client
// ============================================================================

/// Blocking HTTP client for the payload store.
///
/// # Invariants
/// - `store_raw_url` is an absolute `http` or `https` URL.
#[derive(Debug, Clone)]
pub struct HttpPayloadStore {
    /// HTTP client with redirects disabled.
    client: Client,
    /// Fully resolved store-raw URL.
    store_raw_url: Url,
}

impl HttpPayloadStore {
    /// Builds a client for `endpoint` with [`DEFAULT_PAYLOAD_TIMEOUT`].
    ///
    /// # Errors
    ///
    /// Returns [`PayloadStoreError::Transport`] when the endpoint is invalid
    /// or the HTTP client cannot be constructed.
    pub fn new(endpoint: &str) -> Result<Self, PayloadStoreError> {
        Self::with_timeout(endpoint, DEFAULT_PAYLOAD_TIMEOUT)
    }

    /// Builds a client for `endpoint` with a request timeout.
    ///
    /// # Errors
    ///
    /// Returns [`PayloadStoreError::Transport`] when the endpoint is invalid
    /// or the HTTP client cannot be constructed.
    pub fn with_timeout(endpoint: &str, timeout: Duration) -> Result<Self, PayloadStoreError> {
        let store_raw_url = store_raw_url(endpoint)?;
        let client = Client::builder()
            .redirect(Policy::none())
            .timeout(timeout)
            .build()
            .map_err(|err| PayloadStoreError::Transport(err.to_string()))?;
        Ok(Self {
            client,
            store_raw_url,
        })
    }

    /// Returns the URL store-raw requests are sent to.
    #[must_use]
    pub const fn store_raw_url(&self) -> &Url {
        &self.store_raw_url
    }
}

impl PayloadStore for HttpPayloadStore {
    fn store_raw(
        &self,
        payload: &[u8],
        sender_hint: &str,
    ) -> Result<PayloadHash, PayloadStoreError> {
        let request = StoreRawRequest {
            payload: STANDARD.encode(payload),
            from: (!sender_hint.is_empty()).then_some(sender_hint),
        };
        let body = serde_json::to_vec(&request)
            .map_err(|err| PayloadStoreError::Transport(err.to_string()))?;
        let response = self
            .client
            .post(self.store_raw_url.as_str())
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .map_err(|err| PayloadStoreError::Transport(err.to_string()))?;
        let status = response.status();
        let bytes = read_limited(response)?;
        if status != StatusCode::OK {
            return Err(PayloadStoreError::Status {
                status: status.as_u16(),
                body: truncate_body(&bytes),
            });
        }
        let parsed: StoreRawResponse = serde_json::from_slice(&bytes)
            .map_err(|err| PayloadStoreError::InvalidResponse(err.to_string()))?;
        let key = STANDARD
            .decode(parsed.key.as_bytes())
            .map_err(|err| PayloadStoreError::InvalidResponse(format!("key is not base64: {err}")))?;
        if key.is_empty() {
            return Err(PayloadStoreError::InvalidResponse("key is empty".to_string()));
        }
        Ok(PayloadHash::new(key))
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Resolves `<endpoint>/storeraw`, rejecting non-HTTP endpoints.
fn store_raw_url(endpoint: &str) -> Result<Url, PayloadStoreError> {
    let mut base = Url::parse(endpoint.trim())
        .map_err(|err| PayloadStoreError::Transport(format!("invalid endpoint: {err}")))?;
    match base.scheme() {
        "http" | "https" => {}
        scheme => {
            return Err(PayloadStoreError::Transport(format!(
                "unsupported endpoint scheme: {scheme}"
            )));
        }
    }
    if base.host().is_none() {
        return Err(PayloadStoreError::Transport("endpoint missing host".to_string()));
    }
    if base.query().is_some() || base.fragment().is_some() {
        return Err(PayloadStoreError::Transport(
            "endpoint must not carry a query or fragment".to_string(),
        ));
    }
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    base.join(STORE_RAW_PATH)
        .map_err(|err| PayloadStoreError::Transport(format!("invalid endpoint: {err}")))
}

/// Reads a response body up to [`MAX_RESPONSE_BYTES`].
fn read_limited(response: reqwest::blocking::Response) -> Result<Vec<u8>, PayloadStoreError> {
    let limit = u64::try_from(MAX_RESPONSE_BYTES)
        .map_err(|_| PayloadStoreError::Transport("response limit overflow".to_string()))?;
    let mut bytes = Vec::new();
    response
        .take(limit.saturating_add(1))
        .read_to_end(&mut bytes)
        .map_err(|err| PayloadStoreError::Transport(err.to_string()))?;
    if bytes.len() > MAX_RESPONSE_BYTES {
        return Err(PayloadStoreError::InvalidResponse(format!(
            "response exceeds {MAX_RESPONSE_BYTES} bytes"
        )));
    }
    Ok(bytes)
}

/// Renders a response body for error messages.
fn truncate_body(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).chars().take(MAX_ERROR_BODY_CHARS).collect()
}
