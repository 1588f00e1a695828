//! Core catalog types.

use std::{fmt, sync::Arc};

use rmcp::model::{Prompt, RawResource, Tool};
use serde::{Deserialize, Serialize};

use super::handler::{PromptHandler, ResourceHandler, ToolHandlerKind};
use crate::{
    annotations::ToolAnnotations,
    deps::ToolDeps,
    error::ToolsetResult,
    host::{RegisteredPrompt, RegisteredResource, RegisteredTool, ToolHost},
};

/// Stored registration callback: binds a capability to a live host.
///
/// Returns `true` when the host did not already have the capability.
pub type RegisterFn = Arc<dyn Fn(&dyn ToolHost, &ToolDeps) -> ToolsetResult<bool> + Send + Sync>;

/// Toolset declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolsetMetadata {
    pub id: String,
    pub description: String,
    /// Enabled by the `default` keyword.
    #[serde(default)]
    pub default: bool,
    /// Registry-internal toolset; never user-selectable.
    #[serde(default)]
    pub meta: bool,
}

impl ToolsetMetadata {
    pub fn new(id: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            description: description.into(),
            default: false,
            meta: false,
        }
    }

    #[must_use]
    pub fn with_default(mut self, v: bool) -> Self {
        self.default = v;
        self
    }

    #[must_use]
    pub fn with_meta(mut self, v: bool) -> Self {
        self.meta = v;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CapabilityKind {
    Tool,
    Prompt,
    Resource,
}

/// Protocol definition plus handler, per capability kind.
#[derive(Clone)]
pub enum CapabilityBody {
    Tool {
        tool: Tool,
        handler: ToolHandlerKind,
    },
    Prompt {
        prompt: Prompt,
        handler: Arc<dyn PromptHandler>,
    },
    Resource {
        resource: RawResource,
        handler: Arc<dyn ResourceHandler>,
    },
}

/// One catalog entry.
///
/// `accepted_scopes` empty means unrestricted. Scope hierarchy is not
/// computed: an entry lists every scope that satisfies it.
#[derive(Clone)]
pub struct Capability {
    name: String,
    description: String,
    toolset: String,
    accepted_scopes: Vec<String>,
    annotations: ToolAnnotations,
    body: CapabilityBody,
    register_fn: RegisterFn,
}

impl Capability {
    /// Declare a tool. The tool's name, description, and annotations come
    /// from `tool`; `annotations` overrides whatever `tool` carried.
    pub fn tool(
        toolset: impl Into<String>,
        mut tool: Tool,
        annotations: ToolAnnotations,
        handler: ToolHandlerKind,
    ) -> Self {
        let toolset = toolset.into();
        let title = tool
            .annotations
            .as_ref()
            .and_then(|a| a.title.clone())
            .unwrap_or_else(|| tool.name.to_string());
        tool.annotations = Some(annotations.to_rmcp(title));

        let registered_tool = tool.clone();
        let registered_handler = handler.clone();
        let registered_toolset = toolset.clone();
        let register_fn: RegisterFn = Arc::new(move |host, deps| {
            Ok(host.add_tool(RegisteredTool {
                tool: registered_tool.clone(),
                toolset: registered_toolset.clone(),
                handler: registered_handler.clone(),
                deps: deps.clone(),
            }))
        });

        Self {
            name: tool.name.to_string(),
            description: tool
                .description
                .as_deref()
                .unwrap_or_default()
                .to_string(),
            toolset,
            accepted_scopes: Vec::new(),
            annotations,
            body: CapabilityBody::Tool { tool, handler },
            register_fn,
        }
    }

    /// Declare a prompt. Prompts only render text and count as read-only.
    pub fn prompt(
        toolset: impl Into<String>,
        prompt: Prompt,
        handler: Arc<dyn PromptHandler>,
    ) -> Self {
        let toolset = toolset.into();
        let registered_prompt = prompt.clone();
        let registered_handler = Arc::clone(&handler);
        let registered_toolset = toolset.clone();
        let register_fn: RegisterFn = Arc::new(move |host, deps| {
            Ok(host.add_prompt(RegisteredPrompt {
                prompt: registered_prompt.clone(),
                toolset: registered_toolset.clone(),
                handler: Arc::clone(&registered_handler),
                deps: deps.clone(),
            }))
        });

        Self {
            name: prompt.name.clone(),
            description: prompt.description.clone().unwrap_or_default(),
            toolset,
            accepted_scopes: Vec::new(),
            annotations: ToolAnnotations::read_only(),
            body: CapabilityBody::Prompt { prompt, handler },
            register_fn,
        }
    }

    /// Declare a static resource, keyed by URI. Resources count as read-only.
    pub fn resource(
        toolset: impl Into<String>,
        resource: RawResource,
        handler: Arc<dyn ResourceHandler>,
    ) -> Self {
        let toolset = toolset.into();
        let registered_resource = resource.clone();
        let registered_handler = Arc::clone(&handler);
        let registered_toolset = toolset.clone();
        let register_fn: RegisterFn = Arc::new(move |host, deps| {
            Ok(host.add_resource(RegisteredResource {
                resource: registered_resource.clone(),
                toolset: registered_toolset.clone(),
                handler: Arc::clone(&registered_handler),
                deps: deps.clone(),
            }))
        });

        Self {
            name: resource.uri.clone(),
            description: resource.description.clone().unwrap_or_default(),
            toolset,
            accepted_scopes: Vec::new(),
            annotations: ToolAnnotations::read_only(),
            body: CapabilityBody::Resource { resource, handler },
            register_fn,
        }
    }

    /// Scopes that grant visibility. Duplicates are dropped.
    #[must_use]
    pub fn with_scopes<I, S>(mut self, scopes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for scope in scopes {
            let scope = scope.into();
            if !self.accepted_scopes.contains(&scope) {
                self.accepted_scopes.push(scope);
            }
        }
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn toolset(&self) -> &str {
        &self.toolset
    }

    pub fn accepted_scopes(&self) -> &[String] {
        &self.accepted_scopes
    }

    pub fn annotations(&self) -> &ToolAnnotations {
        &self.annotations
    }

    pub fn is_read_only(&self) -> bool {
        self.annotations.read_only
    }

    pub fn kind(&self) -> CapabilityKind {
        match self.body {
            CapabilityBody::Tool { .. } => CapabilityKind::Tool,
            CapabilityBody::Prompt { .. } => CapabilityKind::Prompt,
            CapabilityBody::Resource { .. } => CapabilityKind::Resource,
        }
    }

    pub fn body(&self) -> &CapabilityBody {
        &self.body
    }

    /// Protocol definition, when this capability is a tool.
    pub fn as_tool(&self) -> Option<&Tool> {
        match &self.body {
            CapabilityBody::Tool { tool, .. } => Some(tool),
            _ => None,
        }
    }

    pub fn as_prompt(&self) -> Option<&Prompt> {
        match &self.body {
            CapabilityBody::Prompt { prompt, .. } => Some(prompt),
            _ => None,
        }
    }

    pub fn as_resource(&self) -> Option<&RawResource> {
        match &self.body {
            CapabilityBody::Resource { resource, .. } => Some(resource),
            _ => None,
        }
    }

    /// Run the stored registration callback against `host`.
    pub fn register(&self, host: &dyn ToolHost, deps: &ToolDeps) -> ToolsetResult<bool> {
        (self.register_fn)(host, deps)
    }
}

impl fmt::Debug for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Capability")
            .field("name", &self.name)
            .field("kind", &self.kind())
            .field("toolset", &self.toolset)
            .field("accepted_scopes", &self.accepted_scopes)
            .field("annotations", &self.annotations)
            .finish()
    }
}
