//! Identity resolution against the provider management API.
//!
//! Given a verified subject id, fetch the full user record. Every request
//! performs a fresh lookup: identity attributes like name and email can
//! change, and staleness is judged worse than the added latency here. No
//! retries — a transient provider failure fails only the current request.

use std::time::Duration;

use serde::Deserialize;
use tracing::debug;

use crate::auth::context::Identity;
use crate::auth::error::AuthError;
use crate::config::ProviderConfig;
use crate::types::SubjectId;

/// User record as returned by the provider management API.
///
/// Separate from [`Identity`] so provider wire-format quirks stay here; the
/// provider serves snake_case fields.
#[derive(Debug, Deserialize)]
struct ProviderUserRecord {
    id: String,
    email: String,
    #[serde(default)]
    first_name: Option<String>,
    #[serde(default)]
    last_name: Option<String>,
    #[serde(default)]
    profile_picture_url: Option<String>,
}

impl From<ProviderUserRecord> for Identity {
    fn from(record: ProviderUserRecord) -> Self {
        Identity {
            id: record.id,
            email: record.email,
            first_name: record.first_name,
            last_name: record.last_name,
            profile_picture_url: record.profile_picture_url,
        }
    }
}

/// Resolves verified subject ids to full identity records.
pub struct IdentityResolver {
    config: ProviderConfig,
    client: reqwest::Client,
}

impl IdentityResolver {
    /// Create a resolver for the configured provider.
    pub fn new(config: ProviderConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::builder()
                .timeout(Duration::from_secs(10))
                .build()
                .unwrap_or_default(),
        }
    }

    /// Fetch the identity record for a verified subject.
    ///
    /// Fields are copied verbatim from the provider record; null name fields
    /// stay null.
    pub async fn resolve(&self, subject: &SubjectId) -> Result<Identity, AuthError> {
        let url = self.config.user_endpoint(subject);

        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.config.api_key)
            .send()
            .await
            .map_err(|e| AuthError::IdentityLookupFailed(e.to_string()))?;

        if !response.status().is_success() {
            return Err(AuthError::IdentityLookupFailed(format!(
                "HTTP {} from provider for subject {}",
                response.status(),
                subject
            )));
        }

        let record: ProviderUserRecord = response
            .json()
            .await
            .map_err(|e| AuthError::IdentityLookupFailed(format!("Invalid user record: {}", e)))?;

        debug!(subject = %subject, "Resolved identity");
        Ok(record.into())
    }
}
