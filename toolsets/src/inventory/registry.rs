//! Per-session toolset registry.

use std::{
    collections::{BTreeMap, HashSet},
    sync::Arc,
};

use parking_lot::RwLock;
use tracing::{debug, info};

use super::builder::InventoryBuilder;
use crate::{
    catalog::{Capability, CapabilityKind, Catalog},
    deps::ToolDeps,
    error::{ToolsetError, ToolsetResult},
    host::ToolHost,
    scope::ScopeFilter,
    session::SessionContext,
};

/// Result of enabling a toolset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnableOutcome {
    /// Newly enabled; `registered` tools were added to the host.
    Enabled { registered: usize },
    AlreadyEnabled,
}

/// Which capabilities a session may currently see and call.
///
/// A capability is available iff its toolset is enabled, the scope filter
/// admits it, and (in read-only mode) it is read-only. The enabled set only
/// grows. Enabling takes the write lock for the whole of "register members,
/// mark enabled", so a concurrent `available_tools` observes either none or
/// all of a toolset.
pub struct Inventory {
    catalog: Arc<Catalog>,
    filter: ScopeFilter,
    read_only: bool,
    enabled: RwLock<HashSet<String>>,
}

impl Inventory {
    pub(crate) fn new(
        catalog: Arc<Catalog>,
        filter: ScopeFilter,
        read_only: bool,
        enabled: HashSet<String>,
    ) -> Self {
        Self {
            catalog,
            filter,
            read_only,
            enabled: RwLock::new(enabled),
        }
    }

    pub fn builder(catalog: Arc<Catalog>) -> InventoryBuilder {
        InventoryBuilder::new(catalog)
    }

    pub fn catalog(&self) -> &Arc<Catalog> {
        &self.catalog
    }

    pub fn scope_filter(&self) -> &ScopeFilter {
        &self.filter
    }

    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    /// True for user-selectable toolsets. Meta toolsets are not selectable.
    pub fn has_toolset(&self, id: &str) -> bool {
        self.catalog.toolset(id).is_some_and(|ts| !ts.meta)
    }

    /// Unknown ids are reported as not enabled.
    pub fn is_enabled(&self, id: &str) -> bool {
        self.enabled.read().contains(id)
    }

    /// Enabled toolset ids, sorted.
    pub fn enabled_toolsets(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.enabled.read().iter().cloned().collect();
        ids.sort();
        ids
    }

    /// Enable a toolset and register its members against a live host.
    ///
    /// The write lock is held across registration, so the host's table and
    /// the enabled set change together. A toolset is only marked enabled
    /// once every member registered.
    pub fn enable(
        &self,
        id: &str,
        host: &dyn ToolHost,
        deps: &ToolDeps,
    ) -> ToolsetResult<EnableOutcome> {
        if !self.has_toolset(id) {
            return Err(ToolsetError::ToolsetNotFound(id.to_string()));
        }

        let mut enabled = self.enabled.write();
        if enabled.contains(id) {
            return Ok(EnableOutcome::AlreadyEnabled);
        }

        let registered = self.register_members(id, host, deps)?;
        enabled.insert(id.to_string());
        info!(toolset = %id, registered, "Enabled toolset");
        Ok(EnableOutcome::Enabled { registered })
    }

    /// Register every member of every enabled toolset. Used once at startup.
    pub fn register_enabled(&self, host: &dyn ToolHost, deps: &ToolDeps) -> ToolsetResult<usize> {
        let enabled = self.enabled.read();
        let mut ids: Vec<&String> = enabled.iter().collect();
        ids.sort();

        let mut registered = 0;
        for id in ids {
            registered += self.register_members(id, host, deps)?;
        }
        Ok(registered)
    }

    /// Returns the number of tools newly added to `host`.
    fn register_members(
        &self,
        id: &str,
        host: &dyn ToolHost,
        deps: &ToolDeps,
    ) -> ToolsetResult<usize> {
        let mut registered = 0;
        for member in self.catalog.members(id) {
            if member.register(host, deps)? && member.kind() == CapabilityKind::Tool {
                registered += 1;
            }
        }
        Ok(registered)
    }

    /// User-selectable toolset ids, sorted.
    pub fn toolset_ids(&self) -> Vec<String> {
        self.catalog
            .toolsets()
            .filter(|ts| !ts.meta)
            .map(|ts| ts.id.clone())
            .collect()
    }

    pub fn toolset_descriptions(&self) -> BTreeMap<String, String> {
        self.catalog
            .toolsets()
            .filter(|ts| !ts.meta)
            .map(|ts| (ts.id.clone(), ts.description.clone()))
            .collect()
    }

    /// Every tool in a toolset, regardless of scope or read-only filtering.
    pub fn tools_for_toolset(&self, id: &str) -> Vec<Arc<Capability>> {
        self.catalog
            .members(id)
            .iter()
            .filter(|c| c.kind() == CapabilityKind::Tool)
            .cloned()
            .collect()
    }

    pub fn is_tool_available(&self, name: &str) -> bool {
        match self.catalog.tool(name) {
            Some(capability) => self.is_enabled(capability.toolset()) && self.passes(capability),
            None => false,
        }
    }

    /// Tools in enabled toolsets that pass the filters, in toolset id order.
    pub fn available_tools(&self, ctx: &SessionContext) -> Vec<Arc<Capability>> {
        let tools = self.available(CapabilityKind::Tool);
        debug!(
            session = %ctx.session_id,
            request = ?ctx.request_id,
            count = tools.len(),
            "Computed available tools"
        );
        tools
    }

    pub fn available_prompts(&self, ctx: &SessionContext) -> Vec<Arc<Capability>> {
        let prompts = self.available(CapabilityKind::Prompt);
        debug!(session = %ctx.session_id, count = prompts.len(), "Computed available prompts");
        prompts
    }

    pub fn available_resources(&self, ctx: &SessionContext) -> Vec<Arc<Capability>> {
        let resources = self.available(CapabilityKind::Resource);
        debug!(session = %ctx.session_id, count = resources.len(), "Computed available resources");
        resources
    }

    fn available(&self, kind: CapabilityKind) -> Vec<Arc<Capability>> {
        let enabled = self.enabled.read();
        let mut ids: Vec<&String> = enabled.iter().collect();
        ids.sort();

        ids.into_iter()
            .flat_map(|id| self.catalog.members(id))
            .filter(|c| c.kind() == kind && self.passes(c))
            .cloned()
            .collect()
    }

    fn passes(&self, capability: &Capability) -> bool {
        (!self.read_only || capability.is_read_only()) && self.filter.allows(capability)
    }
}
