//! Signed, client-held session tokens.
//!
//! Token format: `<base64url(json claims)>.<hex(hmac-sha256)>`. The MAC covers
//! the encoded payload, so any modification of either part fails
//! verification.

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use hmac::{Hmac, Mac};
use serde_json::json;
use sha2::Sha256;

use crate::domain::entities::SessionClaims;
use crate::error::AppError;

type HmacSha256 = Hmac<Sha256>;

/// Issues and verifies session tokens with a server-side key.
#[derive(Clone)]
pub struct SessionSigner {
    key: Vec<u8>,
}

impl std::fmt::Debug for SessionSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionSigner").finish_non_exhaustive()
    }
}

impl SessionSigner {
    pub fn new(secret: impl AsRef<[u8]>) -> Self {
        Self {
            key: secret.as_ref().to_vec(),
        }
    }

    fn mac(&self) -> Option<HmacSha256> {
        HmacSha256::new_from_slice(&self.key).ok()
    }

    /// Serializes and signs claims into a token string.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] if the claims cannot be serialized.
    pub fn sign(&self, claims: &SessionClaims) -> Result<String, AppError> {
        let payload = serde_json::to_vec(claims).map_err(|e| {
            AppError::internal(
                "Failed to encode session",
                json!({ "reason": e.to_string() }),
            )
        })?;
        let encoded = URL_SAFE_NO_PAD.encode(payload);

        let mut mac = self
            .mac()
            .ok_or_else(|| AppError::internal("Invalid session signing key", json!({})))?;
        mac.update(encoded.as_bytes());
        let signature = hex::encode(mac.finalize().into_bytes());

        Ok(format!("{encoded}.{signature}"))
    }

    /// Verifies a token and returns its claims.
    ///
    /// Expiry is not checked here. Returns `None` for any malformed or
    /// tampered token.
    pub fn verify(&self, token: &str) -> Option<SessionClaims> {
        let (encoded, signature) = token.split_once('.')?;
        let signature = hex::decode(signature).ok()?;

        let mut mac = self.mac()?;
        mac.update(encoded.as_bytes());
        mac.verify_slice(&signature).ok()?;

        let payload = URL_SAFE_NO_PAD.decode(encoded).ok()?;
        serde_json::from_slice(&payload).ok()
    }
}
