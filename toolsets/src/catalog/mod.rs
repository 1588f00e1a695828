//! Capability catalog.
//!
//! Static declarations of every tool, prompt, and resource, grouped into
//! toolsets. A [`Catalog`] is built once per process and shared (behind an
//! `Arc`) by every session's [`crate::inventory::Inventory`]; building it
//! performs no I/O and reads no configuration.

pub mod builtin;
pub mod handler;
pub mod params;
pub mod rest;
pub mod types;

use std::{
    collections::{HashMap, HashSet},
    sync::Arc,
};

pub use builtin::default_catalog;
pub use handler::{
    PromptHandler, RegistryToolHandler, ResourceHandler, ToolHandler, ToolHandlerKind,
};
pub use rest::{ParamLocation, ParamType, RestTool};
pub use types::{Capability, CapabilityBody, CapabilityKind, RegisterFn, ToolsetMetadata};

use crate::{
    dynamic,
    error::{ToolsetError, ToolsetResult},
    translation::Translator,
};

/// Immutable, validated set of toolsets and their members.
pub struct Catalog {
    toolsets: HashMap<String, ToolsetMetadata>,
    /// Toolset ids, sorted.
    order: Vec<String>,
    members: HashMap<String, Vec<Arc<Capability>>>,
    tools: HashMap<String, Arc<Capability>>,
    prompts: HashMap<String, Arc<Capability>>,
    resources: HashMap<String, Arc<Capability>>,
}

impl Catalog {
    pub fn builder() -> CatalogBuilder {
        CatalogBuilder::default()
    }

    pub fn toolset(&self, id: &str) -> Option<&ToolsetMetadata> {
        self.toolsets.get(id)
    }

    /// All toolsets in id order, including meta toolsets.
    pub fn toolsets(&self) -> impl Iterator<Item = &ToolsetMetadata> {
        self.order.iter().filter_map(|id| self.toolsets.get(id))
    }

    /// Members of a toolset in declaration order; empty for unknown ids.
    pub fn members(&self, id: &str) -> &[Arc<Capability>] {
        self.members.get(id).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn tool(&self, name: &str) -> Option<&Arc<Capability>> {
        self.tools.get(name)
    }

    pub fn prompt(&self, name: &str) -> Option<&Arc<Capability>> {
        self.prompts.get(name)
    }

    pub fn resource(&self, uri: &str) -> Option<&Arc<Capability>> {
        self.resources.get(uri)
    }

    /// Returns (toolsets, tools, prompts, resources).
    pub fn counts(&self) -> (usize, usize, usize, usize) {
        (
            self.toolsets.len(),
            self.tools.len(),
            self.prompts.len(),
            self.resources.len(),
        )
    }
}

/// Collects declarations and validates them into a [`Catalog`].
#[derive(Default)]
pub struct CatalogBuilder {
    toolsets: Vec<ToolsetMetadata>,
    capabilities: Vec<Capability>,
    dynamic_tools: Option<Translator>,
}

impl CatalogBuilder {
    #[must_use]
    pub fn toolset(mut self, metadata: ToolsetMetadata) -> Self {
        self.toolsets.push(metadata);
        self
    }

    #[must_use]
    pub fn capability(mut self, capability: Capability) -> Self {
        self.capabilities.push(capability);
        self
    }

    #[must_use]
    pub fn capabilities(mut self, capabilities: impl IntoIterator<Item = Capability>) -> Self {
        self.capabilities.extend(capabilities);
        self
    }

    /// Add the registry meta-tools. Their `toolset` parameter enum is
    /// generated from the user-selectable toolsets at build time.
    #[must_use]
    pub fn with_dynamic_tools(mut self, translator: Translator) -> Self {
        self.dynamic_tools = Some(translator);
        self
    }

    pub fn build(mut self) -> ToolsetResult<Catalog> {
        if let Some(t) = self.dynamic_tools.take() {
            let mut ids: Vec<String> = self
                .toolsets
                .iter()
                .filter(|ts| !ts.meta)
                .map(|ts| ts.id.clone())
                .collect();
            ids.sort();
            self.toolsets.push(dynamic::meta_toolset(&t));
            self.capabilities.extend(dynamic::meta_capabilities(&t, &ids));
        }

        let mut toolsets = HashMap::with_capacity(self.toolsets.len());
        for ts in self.toolsets {
            if ts.id.is_empty() {
                return Err(ToolsetError::Catalog("toolset id must not be empty".into()));
            }
            if let Some(dup) = toolsets.insert(ts.id.clone(), ts) {
                return Err(ToolsetError::Catalog(format!(
                    "duplicate toolset '{}'",
                    dup.id
                )));
            }
        }

        let mut order: Vec<String> = toolsets.keys().cloned().collect();
        order.sort();

        let mut members: HashMap<String, Vec<Arc<Capability>>> = HashMap::new();
        let mut tools = HashMap::new();
        let mut prompts = HashMap::new();
        let mut resources = HashMap::new();
        let mut seen = HashSet::new();

        for capability in self.capabilities {
            if !toolsets.contains_key(capability.toolset()) {
                return Err(ToolsetError::Catalog(format!(
                    "'{}' references undeclared toolset '{}'",
                    capability.name(),
                    capability.toolset()
                )));
            }
            if !seen.insert((capability.kind(), capability.name().to_string())) {
                return Err(ToolsetError::Catalog(format!(
                    "duplicate {:?} '{}'",
                    capability.kind(),
                    capability.name()
                )));
            }

            let capability = Arc::new(capability);
            let index = match capability.kind() {
                CapabilityKind::Tool => &mut tools,
                CapabilityKind::Prompt => &mut prompts,
                CapabilityKind::Resource => &mut resources,
            };
            index.insert(capability.name().to_string(), Arc::clone(&capability));
            members
                .entry(capability.toolset().to_string())
                .or_default()
                .push(capability);
        }

        Ok(Catalog {
            toolsets,
            order,
            members,
            tools,
            prompts,
            resources,
        })
    }
}


#[cfg(test)]
mod tests {
    use super::{test_support::test_tool, *};

    #[test]
    fn test_build_indexes_members() {
        let catalog = Catalog::builder()
            .toolset(ToolsetMetadata::new("repos", "Repositories"))
            .toolset(ToolsetMetadata::new("gists", "Gists"))
            .capability(test_tool("repos", "get_commit", true, &["repo"]))
            .capability(test_tool("repos", "create_branch", false, &["repo"]))
            .capability(test_tool("gists", "create_gist", false, &["gist"]))
            .build()
            .unwrap();

        assert_eq!(catalog.counts(), (2, 3, 0, 0));
        let names: Vec<&str> = catalog.members("repos").iter().map(|c| c.name()).collect();
        assert_eq!(names, vec!["get_commit", "create_branch"]);
        assert!(catalog.members("unknown").is_empty());
        assert_eq!(catalog.tool("create_gist").unwrap().toolset(), "gists");

        let ids: Vec<&str> = catalog.toolsets().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["gists", "repos"]);
    }

    #[test]
    fn test_rejects_undeclared_toolset() {
        let err = Catalog::builder()
            .toolset(ToolsetMetadata::new("repos", "Repositories"))
            .capability(test_tool("nope", "x", true, &[]))
            .build()
            .err()
            .unwrap();
        assert!(err.to_string().contains("undeclared toolset 'nope'"));
    }

    #[test]
    fn test_rejects_duplicates() {
        assert!(Catalog::builder()
            .toolset(ToolsetMetadata::new("repos", "a"))
            .toolset(ToolsetMetadata::new("repos", "b"))
            .build()
            .is_err());

        assert!(Catalog::builder()
            .toolset(ToolsetMetadata::new("repos", "a"))
            .capability(test_tool("repos", "x", true, &[]))
            .capability(test_tool("repos", "x", false, &[]))
            .build()
            .is_err());
    }

    #[test]
    fn test_dynamic_tools_added_under_meta_toolset() {
        let catalog = Catalog::builder()
            .toolset(ToolsetMetadata::new("repos", "Repositories"))
            .with_dynamic_tools(Translator::identity())
            .build()
            .unwrap();

        let meta = catalog.toolset(dynamic::META_TOOLSET_ID).unwrap();
        assert!(meta.meta);
        let names: Vec<&str> = catalog
            .members(dynamic::META_TOOLSET_ID)
            .iter()
            .map(|c| c.name())
            .collect();
        assert_eq!(
            names,
            vec!["list_available_toolsets", "get_toolset_tools", "enable_toolset"]
        );
    }

    #[test]
    fn test_with_scopes_dedupes() {
        let tool = test_tool("repos", "x", false, &["repo", "repo", "public_repo"]);
        assert_eq!(tool.accepted_scopes(), ["repo", "public_repo"]);
    }
}
