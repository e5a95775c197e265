//! Optional-auth request pipeline.
//!
//! One request-authentication hook that never fails a request merely for
//! lacking a credential, but cryptographically verifies any credential that
//! is supplied and resolves it to a concrete identity:
//!
//! - **Verifier**: validates a bearer token's RS256 signature and expiry
//!   against the provider's published key set, cached by key id.
//! - **Resolver**: fetches the full identity record for the verified subject
//!   from the provider's management API, fresh on every request.
//! - **Context**: the single agreed shape ([`AuthContext`]) attached to tool
//!   invocations, plus the per-tool helpers [`require_identity`] and
//!   [`is_authenticated`] that let each tool decide its own policy.
//! - **Gate**: the request wrapper tying the stages together.
//!
//! Verifier and resolver failures never reach tool code — the gate converts
//! them into a single request-level rejection. `AuthenticationRequired` is
//! the one failure raised inside tool code, and it is reported as that
//! tool's error, leaving sibling tools callable.

mod claims;
mod context;
mod error;
mod gate;
pub mod jwks;
mod resolver;
mod verifier;

pub use claims::Claims;
pub use context::{AuthContext, Identity, is_authenticated, require_identity};
pub use error::AuthError;
pub use gate::{AuthGate, GatePolicy};
pub use jwks::{KeySetCache, KeySetError};
pub use resolver::IdentityResolver;
pub use verifier::TokenVerifier;
