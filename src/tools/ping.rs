//! Handler for the `ping` tool.
//!
//! Public health check: always succeeds, with or without a credential, and
//! reports whether the caller happened to be authenticated.

use std::future::Future;
use std::pin::Pin;

use rmcp::model::{CallToolResult, JsonObject};
use serde_json::json;

use crate::auth::is_authenticated;
use crate::tools::registry::json_result;
use crate::tools::{ToolContext, ToolHandler};

/// Handler for the `ping` tool.
#[derive(Default)]
pub struct PingHandler;

impl PingHandler {
    pub fn new() -> Self {
        Self
    }
}

impl ToolHandler for PingHandler {
    fn name(&self) -> &str {
        "ping"
    }

    fn title(&self) -> Option<&str> {
        Some("Health Check")
    }

    fn description(&self) -> &str {
        "Health check endpoint that works without authentication. \
         Useful for testing MCP server connectivity."
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
        let authenticated = is_authenticated(ctx.auth.as_ref());

        Box::pin(async move {
            let payload = json!({
                "result": "pong",
                "timestamp": chrono::Utc::now().to_rfc3339(),
                "authenticated": authenticated,
                "message": if authenticated {
                    "MCP server is healthy and user is authenticated"
                } else {
                    "MCP server is healthy (public endpoint)"
                },
            });

            Ok(json_result(&payload))
        })
    }
}
