//! Inventory construction and toolset id validation.

use std::{collections::HashSet, sync::Arc};

use tracing::{info, warn};

use super::registry::Inventory;
use crate::{
    catalog::Catalog,
    dynamic::META_TOOLSET_ID,
    error::{ToolsetError, ToolsetResult},
    scope::ScopeFilter,
};

/// Keyword expanding to every user-selectable toolset.
pub const ALL_TOOLSETS: &str = "all";
/// Keyword expanding to the toolsets flagged `default` in the catalog.
pub const DEFAULT_TOOLSETS: &str = "default";

pub struct InventoryBuilder {
    catalog: Arc<Catalog>,
    toolsets: Vec<String>,
    dynamic: bool,
    read_only: bool,
    filter: ScopeFilter,
}

impl InventoryBuilder {
    pub fn new(catalog: Arc<Catalog>) -> Self {
        Self {
            catalog,
            toolsets: Vec::new(),
            dynamic: false,
            read_only: false,
            filter: ScopeFilter::default(),
        }
    }

    /// Toolsets enabled at start. Accepts ids plus the `all` and `default`
    /// keywords.
    #[must_use]
    pub fn with_toolsets<I, S>(mut self, toolsets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.toolsets = toolsets.into_iter().map(Into::into).collect();
        self
    }

    /// Start with the meta-tools enabled and let the agent enable the rest.
    /// The `all` and `default` keywords are ignored in this mode.
    #[must_use]
    pub fn with_dynamic(mut self, dynamic: bool) -> Self {
        self.dynamic = dynamic;
        self
    }

    #[must_use]
    pub fn with_read_only(mut self, read_only: bool) -> Self {
        self.read_only = read_only;
        self
    }

    #[must_use]
    pub fn with_scope_filter(mut self, filter: ScopeFilter) -> Self {
        self.filter = filter;
        self
    }

    pub fn build(self) -> ToolsetResult<Inventory> {
        let mut enabled = HashSet::new();
        let mut unknown = Vec::new();

        for raw in &self.toolsets {
            let id = raw.trim();
            match id {
                "" => {}
                ALL_TOOLSETS | DEFAULT_TOOLSETS if self.dynamic => {
                    warn!("Ignoring '{}' toolset keyword in dynamic mode", id);
                }
                ALL_TOOLSETS => {
                    enabled.extend(
                        self.catalog
                            .toolsets()
                            .filter(|ts| !ts.meta)
                            .map(|ts| ts.id.clone()),
                    );
                }
                DEFAULT_TOOLSETS => {
                    enabled.extend(
                        self.catalog
                            .toolsets()
                            .filter(|ts| ts.default && !ts.meta)
                            .map(|ts| ts.id.clone()),
                    );
                }
                _ => match self.catalog.toolset(id) {
                    Some(ts) if !ts.meta => {
                        enabled.insert(id.to_string());
                    }
                    _ => unknown.push(id.to_string()),
                },
            }
        }

        if !unknown.is_empty() {
            return Err(ToolsetError::UnknownToolsets(unknown));
        }

        if self.dynamic {
            if self.catalog.toolset(META_TOOLSET_ID).is_none() {
                return Err(ToolsetError::Catalog(
                    "dynamic mode requires a catalog built with dynamic tools".to_string(),
                ));
            }
            enabled.insert(META_TOOLSET_ID.to_string());
        }

        let mut ids: Vec<&String> = enabled.iter().collect();
        ids.sort();
        info!(
            toolsets = ?ids,
            dynamic = self.dynamic,
            read_only = self.read_only,
            "Built toolset inventory"
        );

        Ok(Inventory::new(
            self.catalog,
            self.filter,
            self.read_only,
            enabled,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        catalog::{test_support::test_tool, ToolsetMetadata},
        session::SessionContext,
        translation::Translator,
    };

    fn catalog(dynamic: bool) -> Arc<Catalog> {
        let mut builder = Catalog::builder()
            .toolset(ToolsetMetadata::new("context", "Context").with_default(true))
            .toolset(ToolsetMetadata::new("repos", "Repositories").with_default(true))
            .toolset(ToolsetMetadata::new("gists", "Gists"))
            .capability(test_tool("context", "get_me", true, &[]))
            .capability(test_tool("repos", "get_commit", true, &["repo"]))
            .capability(test_tool("gists", "list_gists", true, &[]));
        if dynamic {
            builder = builder.with_dynamic_tools(Translator::identity());
        }
        Arc::new(builder.build().unwrap())
    }

    #[test]
    fn test_default_keyword() {
        let inv = InventoryBuilder::new(catalog(false))
            .with_toolsets(["default"])
            .build()
            .unwrap();
        assert_eq!(inv.enabled_toolsets(), vec!["context", "repos"]);
    }

    #[test]
    fn test_all_keyword_excludes_meta() {
        let inv = InventoryBuilder::new(catalog(true))
            .with_toolsets(["all"])
            .build()
            .unwrap();
        assert_eq!(inv.enabled_toolsets(), vec!["context", "gists", "repos"]);
    }

    #[test]
    fn test_unknown_toolsets_rejected() {
        let err = InventoryBuilder::new(catalog(false))
            .with_toolsets(["repos", "nope", "dynamic", " "])
            .build()
            .err()
            .unwrap();
        match err {
            ToolsetError::UnknownToolsets(ids) => assert_eq!(ids, vec!["nope", "dynamic"]),
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_dynamic_mode_starts_with_meta_tools_only() {
        let inv = InventoryBuilder::new(catalog(true))
            .with_toolsets(["default"])
            .with_dynamic(true)
            .build()
            .unwrap();
        assert_eq!(inv.enabled_toolsets(), vec![META_TOOLSET_ID]);

        let names: Vec<String> = inv
            .available_tools(&SessionContext::default())
            .iter()
            .map(|c| c.name().to_string())
            .collect();
        assert_eq!(
            names,
            vec!["list_available_toolsets", "get_toolset_tools", "enable_toolset"]
        );
    }

    #[test]
    fn test_dynamic_mode_keeps_explicit_toolsets() {
        let inv = InventoryBuilder::new(catalog(true))
            .with_toolsets(["gists", "all"])
            .with_dynamic(true)
            .build()
            .unwrap();
        assert_eq!(inv.enabled_toolsets(), vec![META_TOOLSET_ID, "gists"]);
    }

    #[test]
    fn test_dynamic_mode_requires_meta_tools() {
        assert!(InventoryBuilder::new(catalog(false))
            .with_dynamic(true)
            .build()
            .is_err());
    }
}
