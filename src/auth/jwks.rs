//! JWKS (JSON Web Key Set) fetching and caching.
//!
//! Signing keys are fetched from the identity provider's JWKS endpoint and
//! cached by key id for the lifetime of the process. The cache is populated
//! on first use and refreshed when a token references an unknown key id;
//! there is no timer-based invalidation. Provider key rotation publishes a
//! new key id before retiring the old one, so a cache miss is the only
//! refresh signal needed.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use base64::Engine;
use jsonwebtoken::DecodingKey;
use serde::Deserialize;
use tokio::sync::RwLock;
use tracing::{debug, warn};

/// A single JSON Web Key from a JWKS document.
#[derive(Debug, Clone, Deserialize)]
pub struct Jwk {
    /// Key type (e.g., "RSA")
    pub kty: String,
    /// Key ID (optional, used to match JWT header kid)
    pub kid: Option<String>,
    /// Algorithm (e.g., "RS256")
    pub alg: Option<String>,
    /// Key use (e.g., "sig" for signature)
    #[serde(rename = "use")]
    pub key_use: Option<String>,
    /// RSA modulus (base64url encoded)
    pub n: Option<String>,
    /// RSA exponent (base64url encoded)
    pub e: Option<String>,
    /// X.509 certificate chain
    pub x5c: Option<Vec<String>>,
}

/// A JWKS document containing multiple keys.
#[derive(Debug, Clone, Deserialize)]
pub struct JwksDocument {
    pub keys: Vec<Jwk>,
}

/// Process-wide cache of signing keys indexed by key id.
///
/// Concurrent misses on the same kid may each trigger a fetch; the merge is
/// idempotent and keys are only ever added, so the redundant fetch is
/// preferable to serializing all verification behind a single lock.
pub struct KeySetCache {
    /// The JWKS endpoint URL.
    jwks_url: String,
    /// Cached keys by kid. Grows on refresh, never shrinks.
    keys: Arc<RwLock<HashMap<String, DecodingKey>>>,
    /// HTTP client for fetching the key set.
    client: reqwest::Client,
}

impl KeySetCache {
    /// Create a cache for the given JWKS endpoint.
    pub fn new(jwks_url: String) -> Self {
        Self {
            jwks_url,
            keys: Arc::new(RwLock::new(HashMap::new())),
            client: reqwest::Client::builder()
                .timeout(Duration::from_secs(10))
                .build()
                .unwrap_or_default(),
        }
    }

    /// Get a decoding key by key ID.
    ///
    /// If `kid` is None, returns any available key. On a miss, fetches the
    /// key set once and retries the lookup.
    pub async fn get_key(&self, kid: Option<&str>) -> Result<DecodingKey, KeySetError> {
        if let Some(key) = self.get_from_cache(kid).await {
            return Ok(key);
        }

        self.fetch_keys().await?;

        self.get_from_cache(kid).await.ok_or_else(|| {
            if let Some(k) = kid {
                KeySetError::KeyNotFound(k.to_string())
            } else {
                KeySetError::NoKeysAvailable
            }
        })
    }

    /// Get a key from the cache without fetching.
    async fn get_from_cache(&self, kid: Option<&str>) -> Option<DecodingKey> {
        let keys = self.keys.read().await;

        match kid {
            Some(k) => keys.get(k).cloned(),
            None => keys.values().next().cloned(),
        }
    }

    /// Fetch the key set from the JWKS endpoint and merge it into the cache.
    ///
    /// The fetch runs without holding the lock; the write lock is taken only
    /// for the merge.
    pub async fn fetch_keys(&self) -> Result<(), KeySetError> {
        debug!("Fetching JWKS from {}", self.jwks_url);

        let response = self
            .client
            .get(&self.jwks_url)
            .send()
            .await
            .map_err(|e| KeySetError::FetchError(e.to_string()))?;

        if !response.status().is_success() {
            return Err(KeySetError::FetchError(format!(
                "HTTP {} from JWKS endpoint",
                response.status()
            )));
        }

        let jwks: JwksDocument = response
            .json()
            .await
            .map_err(|e| KeySetError::ParseError(e.to_string()))?;

        let mut fetched = HashMap::new();
        for jwk in jwks.keys {
            // Only RSA signature keys are usable for verification
            if jwk.kty != "RSA" {
                debug!("Skipping non-RSA key: {:?}", jwk.kty);
                continue;
            }
            if jwk.key_use.as_deref() == Some("enc") {
                debug!("Skipping encryption key");
                continue;
            }

            match Self::jwk_to_decoding_key(&jwk) {
                Ok(decoding_key) => {
                    let kid = jwk.kid.clone().unwrap_or_else(|| "default".to_string());
                    debug!("Cached key with kid: {}", kid);
                    fetched.insert(kid, decoding_key);
                }
                Err(e) => {
                    warn!("Failed to parse JWK: {}", e);
                }
            }
        }

        if fetched.is_empty() {
            return Err(KeySetError::NoValidKeys);
        }

        let count = fetched.len();
        {
            let mut keys = self.keys.write().await;
            keys.extend(fetched);
        }

        debug!("Merged {} keys into the key-set cache", count);
        Ok(())
    }

    /// Convert a JWK to a jsonwebtoken DecodingKey.
    fn jwk_to_decoding_key(jwk: &Jwk) -> Result<DecodingKey, KeySetError> {
        // Prefer n/e components (the common case in provider JWKS documents)
        if let (Some(n), Some(e)) = (&jwk.n, &jwk.e) {
            return DecodingKey::from_rsa_components(n, e)
                .map_err(|e| KeySetError::ParseError(format!("Invalid RSA components: {}", e)));
        }

        // Fall back to the leaf certificate of the x5c chain
        if let Some(cert) = jwk.x5c.as_ref().and_then(|chain| chain.first()) {
            // x5c entries are standard (not URL-safe) base64 DER certificates
            let cert_der = base64::engine::general_purpose::STANDARD
                .decode(cert)
                .map_err(|e| KeySetError::ParseError(format!("Invalid x5c: {}", e)))?;
            return Ok(DecodingKey::from_rsa_der(&cert_der));
        }

        Err(KeySetError::ParseError(
            "RSA key carries neither n/e components nor x5c".to_string(),
        ))
    }

    /// Check if the cache has any keys.
    pub async fn has_keys(&self) -> bool {
        !self.keys.read().await.is_empty()
    }

    /// Get the number of cached keys.
    pub async fn key_count(&self) -> usize {
        self.keys.read().await.len()
    }
}

/// Errors that can occur when working with the key-set cache.
#[derive(Debug, Clone)]
pub enum KeySetError {
    /// Failed to fetch the key set from the endpoint.
    FetchError(String),
    /// Failed to parse the JWKS response.
    ParseError(String),
    /// The JWKS document contained no usable keys.
    NoValidKeys,
    /// Key with the requested kid not found, even after refresh.
    KeyNotFound(String),
    /// No keys available in the cache or the document.
    NoKeysAvailable,
}

impl std::fmt::Display for KeySetError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::FetchError(msg) => write!(f, "Failed to fetch JWKS: {}", msg),
            Self::ParseError(msg) => write!(f, "Failed to parse JWKS: {}", msg),
            Self::NoValidKeys => write!(f, "No valid keys found in JWKS"),
            Self::KeyNotFound(kid) => write!(f, "Key not found: {}", kid),
            Self::NoKeysAvailable => write!(f, "No keys available in cache"),
        }
    }
}

impl std::error::Error for KeySetError {}

#[cfg(test)]
mod tests {
    use super::*;

    // A real 2048-bit RSA modulus, base64url encoded.
    const TEST_MODULUS: &str = "0vx7agoebGcQSuuPiLJXZptN9nndrQmbXEps2aiAFbWhM78LhWx4cbbfAAtVT86zwu1RK7aPFFxuhDR1L6tSoc_BJECPebWKRXjBZCiFV4n3oknjhMstn64tZ_2W-5JsGY4Hc5n9yBXArwl93lqt7_RN5w6Cf0h4QyQ5v-65YGjQR0_FDW2QvzqY368QQMicAtaSqzs8KJZgnYb9c7d0zgdAZHzu6qMQvRL5hajrn1n91CbOpbISD08qNLyrdkt-bFTWhAI4vMQFh6WeZu0fM4lFd2NcRwr3XPksINHaQ-G_xBniIqbw0Ls1jF44-csFCur-kEgU8awapJzKnqDKgw";

    #[test]
    fn test_key_set_error_display() {
        let err = KeySetError::FetchError("timeout".to_string());
        assert_eq!(err.to_string(), "Failed to fetch JWKS: timeout");

        let err = KeySetError::KeyNotFound("key123".to_string());
        assert_eq!(err.to_string(), "Key not found: key123");

        let err = KeySetError::NoKeysAvailable;
        assert_eq!(err.to_string(), "No keys available in cache");
    }

    #[test]
    fn test_jwk_deserialization() {
        let json = format!(
            r#"{{
                "kty": "RSA",
                "kid": "test-key-1",
                "alg": "RS256",
                "use": "sig",
                "n": "{}",
                "e": "AQAB"
            }}"#,
            TEST_MODULUS
        );

        let jwk: Jwk = serde_json::from_str(&json).unwrap();
        assert_eq!(jwk.kty, "RSA");
        assert_eq!(jwk.kid, Some("test-key-1".to_string()));
        assert_eq!(jwk.alg, Some("RS256".to_string()));
        assert_eq!(jwk.key_use, Some("sig".to_string()));
        assert!(jwk.n.is_some());
        assert!(jwk.e.is_some());
    }

    #[test]
    fn test_jwk_to_decoding_key_from_components() {
        let jwk = Jwk {
            kty: "RSA".to_string(),
            kid: Some("key1".to_string()),
            alg: Some("RS256".to_string()),
            key_use: Some("sig".to_string()),
            n: Some(TEST_MODULUS.to_string()),
            e: Some("AQAB".to_string()),
            x5c: None,
        };

        assert!(KeySetCache::jwk_to_decoding_key(&jwk).is_ok());
    }

    #[test]
    fn test_jwk_to_decoding_key_without_material() {
        let jwk = Jwk {
            kty: "RSA".to_string(),
            kid: Some("key1".to_string()),
            alg: None,
            key_use: None,
            n: None,
            e: None,
            x5c: None,
        };

        let err = KeySetCache::jwk_to_decoding_key(&jwk).unwrap_err();
        assert!(matches!(err, KeySetError::ParseError(_)));
    }

    #[test]
    fn test_jwks_document_deserialization() {
        let json = format!(
            r#"{{
                "keys": [
                    {{ "kty": "RSA", "kid": "key1", "n": "{m}", "e": "AQAB" }},
                    {{ "kty": "RSA", "kid": "key2", "n": "{m}", "e": "AQAB" }},
                    {{ "kty": "EC", "kid": "key3" }}
                ]
            }}"#,
            m = TEST_MODULUS
        );

        let doc: JwksDocument = serde_json::from_str(&json).unwrap();
        assert_eq!(doc.keys.len(), 3);
        assert_eq!(doc.keys[0].kid, Some("key1".to_string()));
        assert_eq!(doc.keys[2].kty, "EC");
    }

    #[tokio::test]
    async fn test_cache_starts_empty() {
        let cache = KeySetCache::new("https://example.com/sso/jwks/client_abc".to_string());
        assert!(!cache.has_keys().await);
        assert_eq!(cache.key_count().await, 0);
    }
}
