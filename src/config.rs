//! Identity provider configuration.
//!
//! Everything the auth pipeline needs to talk to the provider: the API base
//! URL, the client id that parameterizes the JWKS endpoint, and the API key
//! used for management-API calls. Constructed once at startup; a missing
//! client id is a fatal startup condition, never a per-request error.

use std::env;

use serde::Deserialize;

use crate::types::SubjectId;

/// Default identity provider API base URL.
pub const DEFAULT_PROVIDER_BASE_URL: &str = "https://api.workos.com";

/// Environment variable holding the provider client id.
pub const CLIENT_ID_ENV: &str = "TOOLGATE_CLIENT_ID";

/// Environment variable holding the provider API key.
pub const API_KEY_ENV: &str = "TOOLGATE_API_KEY";

/// Environment variable overriding the provider base URL.
pub const BASE_URL_ENV: &str = "TOOLGATE_PROVIDER_URL";

/// Connection settings for the identity provider.
#[derive(Debug, Clone, Deserialize)]
pub struct ProviderConfig {
    /// API base URL, without a trailing slash.
    pub base_url: String,
    /// Client id; parameterizes the JWKS endpoint.
    pub client_id: String,
    /// API key for authenticated management-API calls.
    pub api_key: String,
}

impl ProviderConfig {
    /// Create a provider config, validating the required fields.
    pub fn new(
        base_url: impl Into<String>,
        client_id: impl Into<String>,
        api_key: impl Into<String>,
    ) -> anyhow::Result<Self> {
        let base_url: String = base_url.into();
        let client_id: String = client_id.into();
        let api_key: String = api_key.into();

        if client_id.is_empty() {
            anyhow::bail!("Provider client id must not be empty (set {})", CLIENT_ID_ENV);
        }
        if api_key.is_empty() {
            anyhow::bail!("Provider API key must not be empty (set {})", API_KEY_ENV);
        }

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client_id,
            api_key,
        })
    }

    /// Load the provider config from the environment.
    pub fn from_env() -> anyhow::Result<Self> {
        let base_url =
            env::var(BASE_URL_ENV).unwrap_or_else(|_| DEFAULT_PROVIDER_BASE_URL.to_string());
        let client_id = env::var(CLIENT_ID_ENV)
            .map_err(|_| anyhow::anyhow!("{} environment variable not set", CLIENT_ID_ENV))?;
        let api_key = env::var(API_KEY_ENV)
            .map_err(|_| anyhow::anyhow!("{} environment variable not set", API_KEY_ENV))?;

        Self::new(base_url, client_id, api_key)
    }

    /// The JWKS endpoint publishing this client's signing keys.
    pub fn jwks_url(&self) -> String {
        format!("{}/sso/jwks/{}", self.base_url, self.client_id)
    }

    /// The management-API endpoint for a single user record.
    pub fn user_endpoint(&self, subject: &SubjectId) -> String {
        format!("{}/user_management/users/{}", self.base_url, subject)
    }
}
