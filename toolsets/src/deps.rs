//! Dependency carriers handed to capability handlers at call time.
//!
//! Ordinary handlers receive [`ToolDeps`]. Meta-tools that operate on the
//! registry receive [`RegistryDeps`], which adds the live host and the
//! session's [`Inventory`]. Which carrier a handler gets is decided by the
//! handler variant it was declared with, see
//! [`crate::catalog::ToolHandlerKind`].

use std::{fmt, sync::Arc};

use crate::{
    host::ToolHost, inventory::Inventory, translation::Translator, upstream::UpstreamClient,
};

/// Runtime switches visible to handlers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FeatureFlags {
    /// Handlers refuse upstream writes when set.
    pub read_only: bool,
}

/// Per-session resources for ordinary handlers.
#[derive(Clone)]
pub struct ToolDeps {
    pub client: Arc<dyn UpstreamClient>,
    pub flags: FeatureFlags,
    pub translator: Translator,
}

impl ToolDeps {
    pub fn new(client: Arc<dyn UpstreamClient>) -> Self {
        Self {
            client,
            flags: FeatureFlags::default(),
            translator: Translator::identity(),
        }
    }

    #[must_use]
    pub fn with_flags(mut self, flags: FeatureFlags) -> Self {
        self.flags = flags;
        self
    }

    #[must_use]
    pub fn with_translator(mut self, translator: Translator) -> Self {
        self.translator = translator;
        self
    }
}

impl fmt::Debug for ToolDeps {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToolDeps")
            .field("flags", &self.flags)
            .finish_non_exhaustive()
    }
}

/// Carrier for handlers that mutate the registry.
#[derive(Clone)]
pub struct RegistryDeps {
    pub deps: ToolDeps,
    pub host: Arc<dyn ToolHost>,
    pub inventory: Arc<Inventory>,
}

impl RegistryDeps {
    pub fn new(deps: ToolDeps, host: Arc<dyn ToolHost>, inventory: Arc<Inventory>) -> Self {
        Self {
            deps,
            host,
            inventory,
        }
    }
}
