//! Handler traits, one per dependency-carrier kind.

use std::{fmt, sync::Arc};

use async_trait::async_trait;
use rmcp::model::{CallToolResult, GetPromptResult, JsonObject, ReadResourceResult};

use crate::{
    deps::{RegistryDeps, ToolDeps},
    error::ToolsetResult,
};

/// Handler for an ordinary tool backed by the upstream API.
#[async_trait]
pub trait ToolHandler: Send + Sync {
    async fn call(&self, deps: &ToolDeps, args: JsonObject) -> ToolsetResult<CallToolResult>;
}

/// Handler for a meta-tool operating on the session's registry.
#[async_trait]
pub trait RegistryToolHandler: Send + Sync {
    async fn call(&self, deps: &RegistryDeps, args: JsonObject)
        -> ToolsetResult<CallToolResult>;
}

#[async_trait]
pub trait PromptHandler: Send + Sync {
    async fn get(&self, deps: &ToolDeps, args: JsonObject) -> ToolsetResult<GetPromptResult>;
}

#[async_trait]
pub trait ResourceHandler: Send + Sync {
    async fn read(&self, deps: &ToolDeps, uri: &str) -> ToolsetResult<ReadResourceResult>;
}

/// Tool handler tagged with the carrier it expects.
#[derive(Clone)]
pub enum ToolHandlerKind {
    Standard(Arc<dyn ToolHandler>),
    Registry(Arc<dyn RegistryToolHandler>),
}

impl ToolHandlerKind {
    pub fn standard(handler: impl ToolHandler + 'static) -> Self {
        Self::Standard(Arc::new(handler))
    }

    pub fn registry(handler: impl RegistryToolHandler + 'static) -> Self {
        Self::Registry(Arc::new(handler))
    }

    pub fn needs_registry(&self) -> bool {
        matches!(self, Self::Registry(_))
    }
}

impl fmt::Debug for ToolHandlerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Standard(_) => f.write_str("Standard"),
            Self::Registry(_) => f.write_str("Registry"),
        }
    }
}
