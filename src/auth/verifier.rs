//! Credential verification.
//!
//! Verifies a bearer token offline: parse the header, find the signing key
//! by kid in the process-wide key-set cache, check the RS256 signature and
//! expiry, and extract the subject. Produces the decoded [`Claims`] or one
//! of the closed set of [`AuthError`] kinds.

use std::sync::Arc;

use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, Validation, decode, decode_header};
use tracing::{debug, warn};

use crate::auth::claims::Claims;
use crate::auth::error::AuthError;
use crate::auth::jwks::KeySetCache;

/// Verifies bearer tokens against the provider's published signing keys.
pub struct TokenVerifier {
    key_set: Arc<KeySetCache>,
}

impl TokenVerifier {
    /// Create a verifier backed by the given key-set cache.
    pub fn new(key_set: Arc<KeySetCache>) -> Self {
        Self { key_set }
    }

    /// Verify a token and return its decoded claims.
    ///
    /// May fetch the key set if the token references an unknown key id;
    /// that fetch is the only network activity on this path.
    pub async fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        let header = decode_header(token)
            .map_err(|e| AuthError::MalformedToken(format!("Invalid JWT header: {}", e)))?;

        let decoding_key = self
            .key_set
            .get_key(header.kid.as_deref())
            .await
            .map_err(|e| {
                // Without a usable key the signature cannot be verified;
                // callers see this as a signature failure.
                warn!(error = %e, "Signing key unavailable for token verification");
                AuthError::InvalidSignature
            })?;

        let validation = Validation::new(Algorithm::RS256);

        let token_data = decode::<serde_json::Map<String, serde_json::Value>>(
            token,
            &decoding_key,
            &validation,
        )
        .map_err(|e| match e.kind() {
            ErrorKind::InvalidSignature => AuthError::InvalidSignature,
            ErrorKind::ExpiredSignature => AuthError::MalformedToken("token expired".to_string()),
            _ => AuthError::MalformedToken(e.to_string()),
        })?;

        let claims = Claims::new(token_data.claims);

        let subject = claims.subject().ok_or(AuthError::MissingSubject)?;
        debug!(subject = %subject, "Token verified");

        Ok(claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::Engine;

    fn test_verifier() -> TokenVerifier {
        // Endpoint is never reached by tokens that fail before key lookup.
        TokenVerifier::new(Arc::new(KeySetCache::new(
            "http://127.0.0.1:9/sso/jwks/client_abc".to_string(),
        )))
    }

    /// Build a structurally valid but unsigned token with the given header.
    fn fake_token(header: serde_json::Value, payload: serde_json::Value) -> String {
        let b64 = |v: &serde_json::Value| {
            base64::engine::general_purpose::URL_SAFE_NO_PAD
                .encode(serde_json::to_vec(v).unwrap())
        };
        format!("{}.{}.c2ln", b64(&header), b64(&payload))
    }

    #[tokio::test]
    async fn test_garbage_token_is_malformed() {
        let verifier = test_verifier();
        let err = verifier.verify("not-a-jwt").await.unwrap_err();
        assert!(matches!(err, AuthError::MalformedToken(_)));
    }

    #[tokio::test]
    async fn test_empty_token_is_malformed() {
        let verifier = test_verifier();
        let err = verifier.verify("").await.unwrap_err();
        assert!(matches!(err, AuthError::MalformedToken(_)));
    }

    #[tokio::test]
    async fn test_unknown_kid_with_unreachable_jwks_is_signature_failure() {
        let verifier = test_verifier();
        let token = fake_token(
            serde_json::json!({"alg": "RS256", "typ": "JWT", "kid": "nope"}),
            serde_json::json!({"sub": "user_123", "exp": 4102444800u64}),
        );

        // Header parses fine; the key lookup (and the refresh fetch behind
        // it) cannot produce a key, so verification fails on the signature.
        let err = verifier.verify(&token).await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidSignature));
    }

    #[tokio::test]
    async fn test_header_with_bad_base64_is_malformed() {
        let verifier = test_verifier();
        let err = verifier.verify("!!!.payload.sig").await.unwrap_err();
        assert!(matches!(err, AuthError::MalformedToken(_)));
    }
}
