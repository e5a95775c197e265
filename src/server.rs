//! MCP server implementation using rmcp.
//!
//! Wires the auth gate in front of tool dispatch: every inbound HTTP request
//! has its authorization header run through the gate, and the resulting
//! optional [`AuthContext`](crate::auth::AuthContext) is attached to the
//! tool invocation. Gate failures become request-level protocol errors; no
//! tool executes for a request carrying an invalid credential.

use std::sync::Arc;

use anyhow::Result;
use axum::Router;
use rmcp::transport::streamable_http_server::{
    StreamableHttpService, session::local::LocalSessionManager,
};
use rmcp::{
    ErrorData as McpError,
    handler::server::ServerHandler,
    model::*,
    service::{NotificationContext, RequestContext, RoleServer},
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::auth::{AuthError, AuthGate};
use crate::tools::{ToolContext, ToolRegistry};

/// Type alias for HTTP request parts stored in rmcp extensions.
type HttpParts = http::request::Parts;

/// JSON-RPC error code for authentication failures.
const AUTH_ERROR_CODE: ErrorCode = ErrorCode(-32001);

/// MCP server that gates requests through the auth pipeline and delegates
/// to tool handlers.
#[derive(Clone)]
pub struct McpServer {
    tool_registry: Arc<ToolRegistry>,
    /// Auth gate for HTTP mode. None in stdio mode, where requests carry no
    /// HTTP headers and every tool sees an anonymous context.
    gate: Option<Arc<AuthGate>>,
}

impl McpServer {
    /// Create a server without an auth gate (stdio/anonymous mode).
    pub fn new(tool_registry: Arc<ToolRegistry>) -> Self {
        Self {
            tool_registry,
            gate: None,
        }
    }

    /// Create a server that authenticates HTTP requests through the gate.
    pub fn new_with_gate(tool_registry: Arc<ToolRegistry>, gate: Arc<AuthGate>) -> Self {
        Self {
            tool_registry,
            gate: Some(gate),
        }
    }

    /// Get the tool registry.
    pub fn tool_registry(&self) -> &Arc<ToolRegistry> {
        &self.tool_registry
    }

    fn capabilities() -> ServerCapabilities {
        ServerCapabilities::builder().enable_tools().build()
    }

    fn instructions() -> String {
        "Tool server with optional end-user authentication. Public tools \
         (ping) work anonymously; private tools require a bearer token from \
         the identity provider and report an authentication error otherwise."
            .to_string()
    }
}

/// Pull the authorization header out of the HTTP request parts that rmcp
/// stores in request extensions for HTTP transports.
fn authorization_header(parts: Option<&HttpParts>) -> Option<String> {
    parts.and_then(|parts| {
        parts
            .headers
            .get(http::header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string())
    })
}

/// Convert a gate failure into the request-level protocol error.
fn auth_rejection(error: &AuthError) -> McpError {
    McpError::new(
        AUTH_ERROR_CODE,
        AuthGate::rejection_message(error).to_string(),
        None,
    )
}

impl ServerHandler for McpServer {
    fn ping(
        &self,
        _context: RequestContext<RoleServer>,
    ) -> impl Future<Output = Result<(), McpError>> + Send + '_ {
        std::future::ready(Ok(()))
    }

    fn initialize(
        &self,
        _request: InitializeRequestParams,
        context: RequestContext<RoleServer>,
    ) -> impl Future<Output = Result<InitializeResult, McpError>> + Send + '_ {
        let gate = self.gate.clone();
        let extensions = context.extensions.clone();

        async move {
            // Run the gate at session start so a session opened with an
            // invalid credential fails fast. A tokenless initialize is fine
            // unless the transport-level policy says otherwise; the context
            // itself is rebuilt per request in call_tool.
            if let Some(gate) = gate {
                let authorization = authorization_header(extensions.get::<HttpParts>());
                match gate.authenticate(authorization.as_deref()).await {
                    Ok(Some(ctx)) => {
                        tracing::info!(user_id = %ctx.user.id, "MCP session authenticated");
                    }
                    Ok(None) => {
                        tracing::debug!("MCP session started without credentials");
                    }
                    Err(e) => {
                        tracing::warn!(kind = e.kind(), "MCP session rejected");
                        return Err(auth_rejection(&e));
                    }
                }
            }

            Ok(InitializeResult {
                protocol_version: ProtocolVersion::V_2025_06_18,
                capabilities: Self::capabilities(),
                server_info: Implementation::from_build_env(),
                instructions: Some(Self::instructions()),
            })
        }
    }

    fn list_tools(
        &self,
        _request: Option<PaginatedRequestParams>,
        _context: RequestContext<RoleServer>,
    ) -> impl Future<Output = Result<ListToolsResult, McpError>> + Send + '_ {
        let result = ListToolsResult {
            tools: self.tool_registry.list_tools(),
            next_cursor: None,
            ..Default::default()
        };
        std::future::ready(Ok(result))
    }

    fn call_tool(
        &self,
        request: CallToolRequestParams,
        context: RequestContext<RoleServer>,
    ) -> impl Future<Output = Result<CallToolResult, McpError>> + Send + '_ {
        let tool_name = request.name.to_string();
        let args = request.arguments.unwrap_or_default();
        let registry = self.tool_registry.clone();
        let gate = self.gate.clone();
        let extensions = context.extensions.clone();

        async move {
            // Fresh verification and identity lookup on every request:
            // identity attributes can change between calls, and a revoked
            // or expired token must stop working immediately.
            let auth = match gate {
                Some(gate) => {
                    let authorization = authorization_header(extensions.get::<HttpParts>());
                    gate.authenticate(authorization.as_deref())
                        .await
                        .map_err(|e| auth_rejection(&e))?
                }
                None => None,
            };

            let ctx = ToolContext { auth };
            match registry.call_tool(&tool_name, args, &ctx).await {
                Ok(result) => Ok(result),
                Err(e) => Err(McpError::internal_error(
                    format!("Tool execution failed: {}", e),
                    None,
                )),
            }
        }
    }

    fn on_initialized(
        &self,
        _context: NotificationContext<RoleServer>,
    ) -> impl Future<Output = ()> + Send + '_ {
        std::future::ready(())
    }

    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2025_06_18,
            capabilities: Self::capabilities(),
            server_info: Implementation::from_build_env(),
            instructions: Some(Self::instructions()),
        }
    }
}

/// Start the MCP Streamable HTTP server.
///
/// Exposes the MCP endpoint at `/mcp` on the given bind address. When a gate
/// is provided, every HTTP request is authenticated through it; without one
/// the server runs in anonymous mode and private tools always report that
/// authentication is required.
pub async fn start_http(
    tool_registry: Arc<ToolRegistry>,
    gate: Option<Arc<AuthGate>>,
    bind: &str,
) -> Result<()> {
    let service = StreamableHttpService::new(
        {
            let tool_registry = tool_registry.clone();
            let gate = gate.clone();
            move || {
                let server = match &gate {
                    Some(gate) => McpServer::new_with_gate(tool_registry.clone(), gate.clone()),
                    None => McpServer::new(tool_registry.clone()),
                };
                Ok(server)
            }
        },
        LocalSessionManager::default().into(),
        Default::default(),
    );

    let router = Router::new()
        .nest_service("/mcp", service)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());
    let listener = tokio::net::TcpListener::bind(bind).await?;

    if gate.is_some() {
        tracing::info!("MCP HTTP server listening on http://{} (auth enabled)", bind);
    } else {
        tracing::info!(
            "MCP HTTP server listening on http://{} (anonymous mode)",
            bind
        );
    }

    axum::serve(listener, router).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_authorization_header_extraction() {
        let (parts, _) = http::Request::builder()
            .uri("http://localhost/mcp")
            .header(http::header::AUTHORIZATION, "Bearer abc123")
            .body(())
            .unwrap()
            .into_parts();

        assert_eq!(
            authorization_header(Some(&parts)),
            Some("Bearer abc123".to_string())
        );
        assert_eq!(authorization_header(None), None);
    }

    #[test]
    fn test_authorization_header_absent() {
        let (parts, _) = http::Request::builder()
            .uri("http://localhost/mcp")
            .body(())
            .unwrap()
            .into_parts();

        assert_eq!(authorization_header(Some(&parts)), None);
    }

    #[test]
    fn test_auth_rejection_messages() {
        let err = auth_rejection(&AuthError::InvalidSignature);
        assert_eq!(err.code, AUTH_ERROR_CODE);
        assert_eq!(err.message, "Invalid token signature. Please sign in again.");

        let err = auth_rejection(&AuthError::IdentityLookupFailed("down".to_string()));
        assert_eq!(err.message, "Authentication failed. Please sign in again.");

        let err = auth_rejection(&AuthError::AuthenticationRequired);
        assert_eq!(err.message, "Authentication required");
    }
}
