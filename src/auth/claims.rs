//! Decoded token claims.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::types::SubjectId;

/// The raw decoded payload of a verified credential.
///
/// Claims are an open mapping from claim name to arbitrary JSON value: the
/// standard registered claims (`sub`, `iat`, `exp`, ...) plus whatever custom
/// claims the identity provider adds. They are decoded once during
/// verification and never re-verified within a request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Claims(serde_json::Map<String, Value>);

impl Claims {
    /// Wrap a decoded claim map.
    pub fn new(map: serde_json::Map<String, Value>) -> Self {
        Self(map)
    }

    /// Look up a claim by name.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    /// The subject identifier, if the token carries a non-empty `sub` claim.
    pub fn subject(&self) -> Option<SubjectId> {
        match self.0.get("sub") {
            Some(Value::String(sub)) if !sub.is_empty() => Some(SubjectId::new(sub)),
            _ => None,
        }
    }

    /// Expiry time as a Unix timestamp, if present.
    pub fn expires_at(&self) -> Option<u64> {
        self.0.get("exp").and_then(Value::as_u64)
    }

    /// Number of claims in the payload.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// `true` if the payload carries no claims.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn claims_from(value: Value) -> Claims {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_subject_present() {
        let claims = claims_from(json!({"sub": "user_123", "exp": 1735689600}));
        assert_eq!(claims.subject(), Some(SubjectId::new("user_123")));
        assert_eq!(claims.expires_at(), Some(1735689600));
    }

    #[test]
    fn test_subject_missing() {
        let claims = claims_from(json!({"exp": 1735689600}));
        assert_eq!(claims.subject(), None);
    }

    #[test]
    fn test_subject_empty_string_is_unusable() {
        let claims = claims_from(json!({"sub": ""}));
        assert_eq!(claims.subject(), None);
    }

    #[test]
    fn test_subject_non_string_is_unusable() {
        let claims = claims_from(json!({"sub": 42}));
        assert_eq!(claims.subject(), None);
    }

    #[test]
    fn test_custom_claims_preserved() {
        let claims = claims_from(json!({
            "sub": "user_123",
            "org_id": "org_456",
            "permissions": ["read", "write"]
        }));
        assert_eq!(claims.get("org_id"), Some(&json!("org_456")));
        assert_eq!(claims.get("permissions"), Some(&json!(["read", "write"])));
        assert_eq!(claims.len(), 3);
    }

    #[test]
    fn test_claims_roundtrip_transparent() {
        let claims = claims_from(json!({"sub": "user_123"}));
        let back = serde_json::to_value(&claims).unwrap();
        assert_eq!(back, json!({"sub": "user_123"}));
    }
}
