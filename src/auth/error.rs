//! Authentication error taxonomy.

use std::fmt;

/// The closed set of authentication failures.
///
/// The first four variants are produced by the verifier and resolver and are
/// intercepted by the gate before tool dispatch; `AuthenticationRequired` is
/// raised inside tool code by [`require_identity`](crate::auth::require_identity)
/// and surfaces as that tool's invocation error.
#[derive(Debug, Clone)]
pub enum AuthError {
    /// Token could not be parsed or failed non-signature validation
    /// (structure, expiry).
    MalformedToken(String),
    /// Signature verification failed, or no usable signing key was available.
    InvalidSignature,
    /// Verified token lacks a usable `sub` claim.
    MissingSubject,
    /// Identity provider unreachable or returned an error during resolution.
    IdentityLookupFailed(String),
    /// A tool demanding identity was invoked without one.
    AuthenticationRequired,
}

impl AuthError {
    /// Short stable name for logs and diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MalformedToken(_) => "malformed_token",
            Self::InvalidSignature => "invalid_signature",
            Self::MissingSubject => "missing_subject",
            Self::IdentityLookupFailed(_) => "identity_lookup_failed",
            Self::AuthenticationRequired => "authentication_required",
        }
    }
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MalformedToken(msg) => write!(f, "Malformed token: {}", msg),
            Self::InvalidSignature => write!(f, "Invalid token signature"),
            Self::MissingSubject => write!(f, "Invalid token: missing sub claim"),
            Self::IdentityLookupFailed(msg) => write!(f, "Identity lookup failed: {}", msg),
            // Stable contract string: clients and tests branch on this exact
            // message for per-tool auth failures.
            Self::AuthenticationRequired => write!(f, "Authentication required for this tool"),
        }
    }
}

impl std::error::Error for AuthError {}
