//! Handler for the `get_user_profile` tool.
//!
//! Private: returns the authenticated caller's resolved identity verbatim,
//! as fetched from the provider's management API for this request.

use std::future::Future;
use std::pin::Pin;

use rmcp::model::{CallToolResult, JsonObject};
use serde_json::json;

use crate::auth::require_identity;
use crate::tools::registry::{error_result, json_result};
use crate::tools::{ToolContext, ToolHandler};

/// Handler for the `get_user_profile` tool.
#[derive(Default)]
pub struct GetUserProfileHandler;

impl GetUserProfileHandler {
    pub fn new() -> Self {
        Self
    }
}

impl ToolHandler for GetUserProfileHandler {
    fn name(&self) -> &str {
        "get_user_profile"
    }

    fn title(&self) -> Option<&str> {
        Some("Get User Profile")
    }

    fn description(&self) -> &str {
        "Returns the authenticated user's profile information from the \
         identity provider. Demonstrates access to user identity attributes."
    }

    fn input_schema(&self) -> JsonObject {
        let mut schema = JsonObject::new();
        schema.insert("type".to_string(), json!("object"));
        schema.insert("properties".to_string(), json!({}));
        schema
    }

    fn execute(
        &self,
        _args: JsonObject,
        ctx: &ToolContext,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<CallToolResult>> + Send + '_>> {
        let auth = ctx.auth.clone();

        Box::pin(async move {
            let user = match require_identity(auth.as_ref()) {
                Ok(user) => user,
                Err(e) => return Ok(error_result(e.to_string())),
            };

            let payload = json!({
                "profile": user,
                "source": "identity provider user management API",
                "message": "Successfully retrieved authenticated user profile",
            });

            Ok(json_result(&payload))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{AuthContext, Claims, Identity};

    fn authenticated_context() -> ToolContext {
        let claims: Claims =
            serde_json::from_value(json!({"sub": "user_123"})).unwrap();
        ToolContext::authenticated(AuthContext::new(
            Identity {
                id: "user_123".to_string(),
                email: "t@example.com".to_string(),
                first_name: Some("Test".to_string()),
                last_name: None,
                profile_picture_url: None,
            },
            claims,
        ))
    }

    #[tokio::test]
    async fn test_profile_requires_auth() {
        let handler = GetUserProfileHandler::new();
        let result = handler
            .execute(JsonObject::new(), &ToolContext::anonymous())
            .await
            .unwrap();

        assert_eq!(result.is_error, Some(true));
        let text = result.content[0].as_text().unwrap();
        assert_eq!(text.text, "Authentication required for this tool");
    }

    #[tokio::test]
    async fn test_profile_returns_identity_verbatim() {
        let handler = GetUserProfileHandler::new();
        let result = handler
            .execute(JsonObject::new(), &authenticated_context())
            .await
            .unwrap();

        assert_eq!(result.is_error, Some(false));
        let text = result.content[0].as_text().unwrap();
        let payload: serde_json::Value = serde_json::from_str(&text.text).unwrap();
        assert_eq!(payload["profile"]["id"], "user_123");
        assert_eq!(payload["profile"]["email"], "t@example.com");
        assert_eq!(payload["profile"]["firstName"], "Test");
        // Null name fields stay null in the output.
        assert_eq!(payload["profile"]["lastName"], serde_json::Value::Null);
    }
}
