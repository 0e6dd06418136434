//! Time-bound request signing for the state API
//!
//! The upstream API authenticates calls with a per-request digest rather
//! than a static credential: a SHA-256 over the shared token, the request
//! path, and the request timestamp. The signature embeds the timestamp, so
//! it must be recomputed for every call.

use crate::error::{GridwatchError, Result};
use sha2::{Digest, Sha256};
use std::fmt;

/// Source of the shared signing token.
///
/// Injected into the carbon fetcher so tokens can be rotated or faked in
/// tests without code changes.
pub trait SecretProvider: Send + Sync {
    fn signing_token(&self) -> Result<String>;
}

/// Provider backed by a fixed configured token
pub struct StaticSecretProvider {
    token: String,
}

impl StaticSecretProvider {
    pub fn new<S: Into<String>>(token: S) -> Self {
        Self {
            token: token.into(),
        }
    }
}

impl SecretProvider for StaticSecretProvider {
    fn signing_token(&self) -> Result<String> {
        Ok(self.token.clone())
    }
}

/// One outbound signed call: path, millisecond timestamp, and hex digest.
///
/// Ephemeral; the digest must never be cached across calls or written to
/// logs, which is why `Debug` redacts it.
pub struct SignedRequest {
    path: String,
    timestamp_ms: i64,
    signature: String,
}

impl SignedRequest {
    /// Sign `path` at `timestamp_ms` with the shared token.
    ///
    /// The digest input is the byte concatenation of token, path, and the
    /// timestamp rendered as a decimal string, in that order. Fails with a
    /// signature error when the token or path is empty.
    pub fn new(token: &str, path: &str, timestamp_ms: i64) -> Result<Self> {
        if token.is_empty() {
            return Err(GridwatchError::signature("signing token is empty"));
        }
        if path.is_empty() {
            return Err(GridwatchError::signature("request path is empty"));
        }

        let mut hasher = Sha256::new();
        hasher.update(token.as_bytes());
        hasher.update(path.as_bytes());
        hasher.update(timestamp_ms.to_string().as_bytes());
        let signature = hex::encode(hasher.finalize());

        Ok(Self {
            path: path.to_string(),
            timestamp_ms,
            signature,
        })
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn timestamp_ms(&self) -> i64 {
        self.timestamp_ms
    }

    /// Decimal timestamp string as sent in the `x-request-timestamp` header
    pub fn timestamp_header(&self) -> String {
        self.timestamp_ms.to_string()
    }

    /// Lowercase hex digest as sent in the `x-signature` header
    pub fn signature(&self) -> &str {
        &self.signature
    }
}

impl fmt::Debug for SignedRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignedRequest")
            .field("path", &self.path)
            .field("timestamp_ms", &self.timestamp_ms)
            .field("signature", &"<redacted>")
            .finish()
    }
}
