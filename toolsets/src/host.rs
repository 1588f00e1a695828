//! Live registration surface of the hosting server.
//!
//! [`ToolHost`] is what a capability's `register_fn` drives. [`ToolTable`] is
//! the in-process implementation the MCP server dispatches calls from: a
//! thread-safe table of registered tools, prompts, and resources that also
//! remembers which lists changed since the last time the server announced
//! them to the client.

use std::{
    fmt,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
};

use dashmap::{mapref::entry::Entry, DashMap};
use rmcp::model::{Prompt, RawResource, Tool};
use tracing::{debug, warn};

use crate::{
    catalog::{PromptHandler, ResourceHandler, ToolHandlerKind},
    deps::ToolDeps,
};

/// A tool bound to the dependencies it was registered with.
#[derive(Clone)]
pub struct RegisteredTool {
    pub tool: Tool,
    pub toolset: String,
    pub handler: ToolHandlerKind,
    pub deps: ToolDeps,
}

impl RegisteredTool {
    pub fn name(&self) -> &str {
        &self.tool.name
    }
}

impl fmt::Debug for RegisteredTool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegisteredTool")
            .field("name", &self.tool.name)
            .field("toolset", &self.toolset)
            .field("handler", &self.handler)
            .finish()
    }
}

#[derive(Clone)]
pub struct RegisteredPrompt {
    pub prompt: Prompt,
    pub toolset: String,
    pub handler: Arc<dyn PromptHandler>,
    pub deps: ToolDeps,
}

#[derive(Clone)]
pub struct RegisteredResource {
    pub resource: RawResource,
    pub toolset: String,
    pub handler: Arc<dyn ResourceHandler>,
    pub deps: ToolDeps,
}

/// Registration surface of a running server.
///
/// Each method returns `true` when the entry was newly added and `false`
/// when an entry with the same key was already present.
pub trait ToolHost: Send + Sync {
    fn add_tool(&self, tool: RegisteredTool) -> bool;

    fn add_prompt(&self, prompt: RegisteredPrompt) -> bool;

    fn add_resource(&self, resource: RegisteredResource) -> bool;
}

/// Lists that changed since the previous [`ToolTable::take_changes`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ListChanges {
    pub tools: bool,
    pub prompts: bool,
    pub resources: bool,
}

impl ListChanges {
    pub fn any(&self) -> bool {
        self.tools || self.prompts || self.resources
    }
}

#[derive(Default)]
pub struct ToolTable {
    tools: DashMap<String, RegisteredTool>,
    prompts: DashMap<String, RegisteredPrompt>,
    resources: DashMap<String, RegisteredResource>,
    tools_changed: AtomicBool,
    prompts_changed: AtomicBool,
    resources_changed: AtomicBool,
}

impl ToolTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_tool(&self, name: &str) -> Option<RegisteredTool> {
        self.tools.get(name).map(|e| e.clone())
    }

    pub fn has_tool(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    /// Registered tool names, sorted.
    pub fn tool_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.tools.iter().map(|e| e.key().clone()).collect();
        names.sort();
        names
    }

    pub fn get_prompt(&self, name: &str) -> Option<RegisteredPrompt> {
        self.prompts.get(name).map(|e| e.clone())
    }

    pub fn get_resource(&self, uri: &str) -> Option<RegisteredResource> {
        self.resources.get(uri).map(|e| e.clone())
    }

    /// Returns (tools, prompts, resources).
    pub fn counts(&self) -> (usize, usize, usize) {
        (self.tools.len(), self.prompts.len(), self.resources.len())
    }

    /// Returns and resets the pending list-changed flags.
    pub fn take_changes(&self) -> ListChanges {
        ListChanges {
            tools: self.tools_changed.swap(false, Ordering::AcqRel),
            prompts: self.prompts_changed.swap(false, Ordering::AcqRel),
            resources: self.resources_changed.swap(false, Ordering::AcqRel),
        }
    }
}

impl ToolHost for ToolTable {
    fn add_tool(&self, tool: RegisteredTool) -> bool {
        match self.tools.entry(tool.name().to_string()) {
            Entry::Occupied(existing) => {
                if existing.get().toolset != tool.toolset {
                    warn!(
                        "Tool name collision: '{}' already registered by toolset '{}', ignoring '{}'",
                        tool.name(),
                        existing.get().toolset,
                        tool.toolset
                    );
                }
                false
            }
            Entry::Vacant(slot) => {
                debug!(tool = %tool.name(), toolset = %tool.toolset, "Registered tool");
                slot.insert(tool);
                self.tools_changed.store(true, Ordering::Release);
                true
            }
        }
    }

    fn add_prompt(&self, prompt: RegisteredPrompt) -> bool {
        match self.prompts.entry(prompt.prompt.name.clone()) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(prompt);
                self.prompts_changed.store(true, Ordering::Release);
                true
            }
        }
    }

    fn add_resource(&self, resource: RegisteredResource) -> bool {
        match self.resources.entry(resource.resource.uri.clone()) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(resource);
                self.resources_changed.store(true, Ordering::Release);
                true
            }
        }
    }
}
