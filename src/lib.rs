// Core modules
pub mod auth;
mod config;
mod store;
mod types;

pub mod server;
mod tools;

// Re-export key types and functions
pub use auth::{
    AuthContext, AuthError, AuthGate, Claims, GatePolicy, Identity, IdentityResolver, KeySetCache,
    TokenVerifier, is_authenticated, require_identity,
};
pub use config::{DEFAULT_PROVIDER_BASE_URL, ProviderConfig};
pub use server::McpServer;
pub use store::{ExampleItem, ExampleStore, StoreError};
pub use tools::{ToolContext, ToolHandler, ToolRegistry};
pub use types::{ItemId, SubjectId};

use std::sync::Arc;

use tools::{
    CreateExampleDataHandler, GetUserProfileHandler, ListExampleDataHandler, PingHandler,
    UpdateExampleDataHandler,
};

/// Build the auth gate from provider configuration.
///
/// Constructs the verifier (backed by a process-wide key-set cache) and the
/// identity resolver once; both live for the process lifetime.
pub fn create_gate(config: ProviderConfig, policy: GatePolicy) -> Arc<AuthGate> {
    let key_set = Arc::new(KeySetCache::new(config.jwks_url()));
    let verifier = TokenVerifier::new(key_set);
    let resolver = IdentityResolver::new(config);
    Arc::new(AuthGate::new(verifier, resolver, policy))
}

/// Build the default tool registry: the public health check plus the
/// authenticated example-data and profile tools.
pub fn create_registry() -> Arc<ToolRegistry> {
    let store = Arc::new(ExampleStore::new());

    let registry = ToolRegistry::new()
        .register_handler(PingHandler::new())
        .register_handler(GetUserProfileHandler::new())
        .register_handler(ListExampleDataHandler::new(store.clone()))
        .register_handler(CreateExampleDataHandler::new(store.clone()))
        .register_handler(UpdateExampleDataHandler::new(store));

    Arc::new(registry)
}
