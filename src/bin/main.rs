use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use toolgate::{GatePolicy, ProviderConfig, create_gate, create_registry};

// rmcp imports for MCP stdio server mode
use rmcp::service::ServiceExt;
use rmcp::transport::stdio;

#[derive(Parser)]
#[command(name = "toolgate")]
#[command(about = "MCP tool server with optional end-user authentication")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run as an MCP HTTP server with the auth gate in front of tool dispatch
    Serve {
        /// Bind address, e.g. 0.0.0.0:3000
        #[arg(long, default_value = "0.0.0.0:3000")]
        bind: String,
        /// Identity provider API base URL
        #[arg(long, env = "TOOLGATE_PROVIDER_URL", default_value = toolgate::DEFAULT_PROVIDER_BASE_URL)]
        provider_url: String,
        /// Client id parameterizing the provider's JWKS endpoint
        #[arg(long, env = "TOOLGATE_CLIENT_ID")]
        client_id: String,
        /// Provider API key for management-API calls
        #[arg(long, env = "TOOLGATE_API_KEY")]
        api_key: String,
        /// Reject requests that carry no credential at all.
        /// Off by default: public tools accept anonymous callers and private
        /// tools enforce authentication themselves.
        #[arg(long, default_value_t = false)]
        require_auth: bool,
    },
    /// Run as an MCP stdio server (no HTTP headers, so no authentication;
    /// private tools will report that authentication is required)
    Stdio,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive("toolgate=info".parse()?)
                .add_directive("rmcp=warn".parse()?),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve {
            bind,
            provider_url,
            client_id,
            api_key,
            require_auth,
        } => {
            // Missing or empty provider settings are fatal here, at startup.
            let config = ProviderConfig::new(provider_url, client_id, api_key)?;
            info!(jwks_url = %config.jwks_url(), "Configured identity provider");

            let gate = create_gate(config, GatePolicy { require_auth });
            let registry = create_registry();

            toolgate::server::start_http(registry, Some(gate), &bind).await?;
        }
        Commands::Stdio => {
            info!("Starting MCP stdio server (anonymous mode)");

            let registry = create_registry();
            let server = toolgate::McpServer::new(registry);

            let service = server
                .serve(stdio())
                .await
                .inspect_err(|e| tracing::error!("serving error: {:?}", e))?;

            // Block until the MCP session ends.
            service.waiting().await?;
            info!("MCP stdio server session ended");
        }
    }

    Ok(())
}
