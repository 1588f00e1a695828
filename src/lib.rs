//! MCP server exposing a toolset-gated capability catalog.
//!
//! ## Modules
//!
//! - [`config`]: CLI flags and YAML configuration
//! - [`observability`]: Logging setup
//! - [`server`]: rmcp server handler over the toolset registry
//! - [`upstream_http`]: HTTP client for the upstream REST API

pub mod config;
pub mod observability;
pub mod server;
pub mod upstream_http;

pub use config::{Args, ConfigError, LogConfig, ServerConfig};
pub use server::ToolsetServer;
pub use upstream_http::HttpUpstream;
