//! VexMCP Server — entry point.

use std::sync::Arc;

use anyhow::Context;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;

use vex_mcp::client::VexClient;
use vex_mcp::config::resolve_default_author;
use vex_mcp::protocol::ProtocolHandler;
use vex_mcp::tools::ToolRegistry;
use vex_mcp::transport::StdioTransport;

#[derive(Parser)]
#[command(
    name = "vex-mcp",
    about = "MCP server for OpenVEX — create and merge vulnerability exploitability statements",
    version
)]
struct Cli {
    /// Default author for generated documents.
    /// Also reads from VEX_AUTHOR env var.
    #[arg(short, long, global = true)]
    author: Option<String>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, default_value = "info", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start MCP server over stdio (default).
    Serve,

    /// Start MCP server over HTTP.
    #[cfg(feature = "http")]
    ServeHttp {
        /// Listen address (host:port).
        #[arg(long, default_value = "127.0.0.1:3100")]
        addr: String,
    },

    /// Validate an OpenVEX document file.
    Validate {
        /// Path to the JSON document.
        path: String,
    },

    /// Print server capabilities as JSON.
    Info,

    /// Generate shell completion scripts.
    ///
    /// Examples:
    ///   vex-mcp completions bash > ~/.local/share/bash-completion/completions/vex-mcp
    ///   vex-mcp completions zsh > ~/.zfunc/_vex-mcp
    Completions {
        /// Shell type (bash, zsh, fish, powershell, elvish).
        shell: Shell,
    },
}

fn build_handler(author: &str) -> anyhow::Result<ProtocolHandler> {
    let client = Arc::new(VexClient::new(author));
    let registry = ToolRegistry::with_vex_tools(client)?;
    Ok(ProtocolHandler::new(Arc::new(registry)))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cli.log_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let author = resolve_default_author(cli.author.as_deref());

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => {
            tracing::info!("VexMCP server (stdio), default author: {author}");
            let transport = StdioTransport::new(build_handler(&author)?);
            transport.run().await?;
        }

        #[cfg(feature = "http")]
        Commands::ServeHttp { addr } => {
            use vex_mcp::transport::HttpTransport;

            tracing::info!("VexMCP server (http), default author: {author}");
            let transport = HttpTransport::new(build_handler(&author)?);
            transport.run(&addr).await?;
        }

        Commands::Validate { path } => {
            let data = std::fs::read(&path).with_context(|| format!("failed to read {path}"))?;
            let doc = match vex_core::Document::parse(&data) {
                Ok(doc) => doc,
                Err(e) => {
                    eprintln!("Invalid VEX document: {e}");
                    std::process::exit(1);
                }
            };

            let mut failures = 0;
            for (i, statement) in doc.statements.iter().enumerate() {
                if let Err(e) = statement.validate() {
                    eprintln!("  statement {}: {e}", i + 1);
                    failures += 1;
                }
            }
            if failures > 0 {
                eprintln!("Invalid VEX document: {failures} invalid statement(s)");
                std::process::exit(1);
            }

            println!("Valid VEX document: {path}");
            println!("  Id: {}", doc.id);
            println!("  Author: {}", doc.author);
            println!("  Version: {}", doc.version);
            println!("  Statements: {}", doc.statements.len());
        }

        Commands::Info => {
            let capabilities = vex_mcp::types::InitializeResult::default_result();
            let tools = build_handler(&author)?.tools().list_tools();
            let info = serde_json::json!({
                "server": capabilities.server_info,
                "protocol_version": capabilities.protocol_version,
                "capabilities": capabilities.capabilities,
                "default_author": author,
                "tools": tools.iter().map(|t| &t.name).collect::<Vec<_>>(),
                "tool_count": tools.len(),
            });
            println!("{}", serde_json::to_string_pretty(&info)?);
        }

        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "vex-mcp", &mut std::io::stdout());
        }
    }

    Ok(())
}
