//! Request-scoped authentication context and per-tool helpers.
//!
//! [`AuthContext`] is the single agreed shape for "who is calling": it exists
//! if and only if a credential was supplied, verified, and resolved to an
//! identity. Tools receive it as `Option<AuthContext>` and use the two helper
//! functions below to enforce (or merely observe) authentication.

use serde::{Deserialize, Serialize};

use crate::auth::claims::Claims;
use crate::auth::error::AuthError;

/// A verified end user, copied verbatim from the identity provider record.
///
/// Nullable name fields stay null; they are never coerced to empty strings.
/// Immutable once constructed and discarded with the request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    /// Opaque stable identifier.
    pub id: String,
    /// Email address.
    pub email: String,
    /// Given name, if the provider has one on record.
    pub first_name: Option<String>,
    /// Family name, if the provider has one on record.
    pub last_name: Option<String>,
    /// Profile image URL, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_picture_url: Option<String>,
}

/// The per-request authentication result: a resolved identity plus the raw
/// claims it was resolved from.
///
/// Constructed once per request by the auth gate after verification and
/// resolution have both succeeded; read-only afterwards. There is no
/// representation of "credential present but invalid" — invalid credentials
/// short-circuit the request before this type is built. A partially-built
/// payload (e.g. `{}` crossing a serialization boundary) fails to
/// deserialize and therefore collapses to absence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthContext {
    /// The resolved end user.
    pub user: Identity,
    /// Decoded claims of the verified credential.
    pub claims: Claims,
}

impl AuthContext {
    /// Combine a resolved identity and its claims.
    ///
    /// This is the only constructor; it is reachable only after the verifier
    /// and resolver have both succeeded, so it has no failure modes.
    pub fn new(user: Identity, claims: Claims) -> Self {
        Self { user, claims }
    }
}

/// Extract the caller's identity, or fail with `AuthenticationRequired`.
///
/// For tools that must not run for anonymous callers. Pure: calling it any
/// number of times on the same context yields the same result.
pub fn require_identity(context: Option<&AuthContext>) -> Result<&Identity, AuthError> {
    match context {
        Some(ctx) => Ok(&ctx.user),
        None => Err(AuthError::AuthenticationRequired),
    }
}

/// Check whether the caller is authenticated, without failing.
///
/// For tools that behave differently for signed-in callers but still run
/// anonymously.
pub fn is_authenticated(context: Option<&AuthContext>) -> bool {
    context.is_some()
}
