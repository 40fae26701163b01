//! VexMCP Server — create and merge OpenVEX documents over the Model Context Protocol.

pub mod client;
pub mod config;
pub mod protocol;
pub mod tools;
pub mod transport;
pub mod types;
pub mod validation;

pub use client::VexClient;
pub use config::resolve_default_author;
pub use protocol::ProtocolHandler;
pub use tools::ToolRegistry;
pub use transport::StdioTransport;
