//! Request-level authentication gate.
//!
//! The gate wraps tool dispatch: it extracts a bearer token from the
//! authorization header if one is present, runs verification and identity
//! resolution, and hands an optional [`AuthContext`] to the next stage.
//! Absence of a token is a non-failure path — whether anonymous access is
//! acceptable is decided per tool, not at the transport layer.

use tracing::{debug, info, warn};

use crate::auth::context::AuthContext;
use crate::auth::error::AuthError;
use crate::auth::resolver::IdentityResolver;
use crate::auth::verifier::TokenVerifier;

/// Gate configuration.
#[derive(Debug, Clone, Default)]
pub struct GatePolicy {
    /// Require a valid credential at the transport layer.
    ///
    /// This deployment leaves it `false`: one server process hosts both
    /// public and private tools, and enforcement is delegated to each tool
    /// via the per-tool helpers.
    pub require_auth: bool,
}

/// The auth gate: verifier + resolver + policy, constructed once at startup.
pub struct AuthGate {
    verifier: TokenVerifier,
    resolver: IdentityResolver,
    policy: GatePolicy,
}

impl AuthGate {
    /// Create a gate from its constructed-once dependencies.
    pub fn new(verifier: TokenVerifier, resolver: IdentityResolver, policy: GatePolicy) -> Self {
        Self {
            verifier,
            resolver,
            policy,
        }
    }

    /// Authenticate one inbound request from its authorization header.
    ///
    /// Returns `Ok(None)` when no bearer token was supplied (valid for
    /// requests destined for public tools), `Ok(Some(..))` when a supplied
    /// token verified and resolved, and `Err` when a supplied token failed
    /// at any stage — in which case the request must be rejected before any
    /// tool executes.
    pub async fn authenticate(
        &self,
        authorization: Option<&str>,
    ) -> Result<Option<AuthContext>, AuthError> {
        let token = authorization.and_then(|h| h.strip_prefix("Bearer "));

        let Some(token) = token else {
            if self.policy.require_auth {
                warn!("Request rejected: transport-level authentication required");
                return Err(AuthError::AuthenticationRequired);
            }
            debug!("No bearer token supplied; request proceeds without auth context");
            return Ok(None);
        };

        let claims = self.verifier.verify(token).await.inspect_err(|e| {
            warn!(kind = e.kind(), "Token verification failed");
        })?;

        // verify() guarantees a subject; the re-check keeps this path total.
        let subject = claims.subject().ok_or(AuthError::MissingSubject)?;

        let user = self.resolver.resolve(&subject).await.inspect_err(|e| {
            warn!(kind = e.kind(), subject = %subject, "Identity resolution failed");
        })?;

        info!(subject = %subject, email = %user.email, "Request authenticated");
        Ok(Some(AuthContext::new(user, claims)))
    }

    /// Caller-facing message for a gate failure.
    ///
    /// Distinct verifier/resolver failures collapse into two messages:
    /// signature-related failures tell the caller to sign in again with a
    /// specific hint, everything else gets the generic phrasing. The precise
    /// kind is already logged where the failure happened.
    pub fn rejection_message(error: &AuthError) -> &'static str {
        match error {
            AuthError::InvalidSignature | AuthError::MissingSubject => {
                "Invalid token signature. Please sign in again."
            }
            AuthError::MalformedToken(_) | AuthError::IdentityLookupFailed(_) => {
                "Authentication failed. Please sign in again."
            }
            AuthError::AuthenticationRequired => "Authentication required",
        }
    }
}
