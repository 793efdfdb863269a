//! Shareable analysis links.
//!
//! A digest payload is JSON-serialized, base64url-encoded without padding and
//! carried in the `digest` query parameter of the app URL:
//! `https://<app-host>/?digest=<encoded>`.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;
use url::Url;

pub const DIGEST_PARAM: &str = "digest";

#[derive(Debug, Error)]
pub enum DigestError {
    #[error("digest serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("digest is not valid base64url: {0}")]
    Encoding(#[from] base64::DecodeError),

    #[error("url has no `digest` parameter")]
    MissingParameter,
}

/// Engine-produced digest, either an opaque string or a JSON object.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum DigestPayload {
    Text(String),
    Structured(Map<String, Value>),
}

impl From<String> for DigestPayload {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

pub fn encode_digest(payload: &DigestPayload) -> Result<String, DigestError> {
    let json = serde_json::to_vec(payload)?;
    Ok(URL_SAFE_NO_PAD.encode(json))
}

pub fn decode_digest(encoded: &str) -> Result<DigestPayload, DigestError> {
    let json = URL_SAFE_NO_PAD.decode(encoded)?;
    Ok(serde_json::from_slice(&json)?)
}

/// Builds the canonical share URL for `payload` under `app_host`.
///
/// Any query string already present on `app_host` is dropped.
pub fn share_url(app_host: &Url, payload: &DigestPayload) -> Result<Url, DigestError> {
    let encoded = encode_digest(payload)?;
    let mut url = app_host.clone();
    url.set_query(None);
    url.set_fragment(None);
    url.query_pairs_mut().append_pair(DIGEST_PARAM, &encoded);
    Ok(url)
}

pub fn digest_from_url(url: &Url) -> Result<DigestPayload, DigestError> {
    let encoded = url
        .query_pairs()
        .find(|(key, _)| key == DIGEST_PARAM)
        .map(|(_, value)| value.into_owned())
        .ok_or(DigestError::MissingParameter)?;
    decode_digest(&encoded)
}
