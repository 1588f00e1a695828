//! Toolset catalog and runtime registry for MCP servers.
//!
//! ## Modules
//!
//! - [`catalog`]: Static capability declarations grouped into toolsets
//! - [`scope`]: Token-scope visibility filter
//! - [`inventory`]: Per-session enabled toolsets and available capabilities
//! - [`dynamic`]: Meta-tools that let the agent discover and enable toolsets
//! - [`host`]: Live registration surface of the hosting server
//!
//! ## Shared Types
//!
//! - [`ToolAnnotations`]: Capability behavior hints (read_only, destructive, etc.)
//! - [`ToolDeps`] / [`RegistryDeps`]: Dependency carriers handed to handlers
//! - [`SessionContext`]: Per-request session identity for log correlation

// Shared types (used across modules)
pub mod annotations;
pub mod deps;
pub mod error;
pub mod session;
pub mod translation;
pub mod upstream;

// Subsystems
pub mod catalog;
pub mod dynamic;
pub mod host;
pub mod inventory;
pub mod scope;

pub use annotations::ToolAnnotations;
// Re-export from catalog
pub use catalog::{
    default_catalog, Capability, CapabilityBody, CapabilityKind, Catalog, CatalogBuilder,
    ParamType, PromptHandler, RegistryToolHandler, ResourceHandler, RestTool, ToolHandler,
    ToolHandlerKind, ToolsetMetadata,
};
pub use deps::{FeatureFlags, RegistryDeps, ToolDeps};
pub use dynamic::META_TOOLSET_ID;
pub use error::{ToolsetError, ToolsetResult, UpstreamError};
pub use host::{
    ListChanges, RegisteredPrompt, RegisteredResource, RegisteredTool, ToolHost, ToolTable,
};
// Re-export from inventory
pub use inventory::{EnableOutcome, Inventory, InventoryBuilder, ALL_TOOLSETS, DEFAULT_TOOLSETS};
pub use scope::{ScopeDecision, ScopeFilter};
pub use session::{SessionContext, SessionId};
pub use translation::Translator;
pub use upstream::{UpstreamClient, UpstreamRequest};
