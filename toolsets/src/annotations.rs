//! Capability behavior annotations.
//!
//! We keep [`ToolAnnotations`] separate from [`rmcp::model::ToolAnnotations`] because:
//! - rmcp uses `Option<bool>` requiring unwrapping everywhere
//! - catalog entries declare hints as plain `bool` and the scope filter reads
//!   `read_only` directly

use rmcp::model::ToolAnnotations as RmcpToolAnnotations;
use serde::{Deserialize, Serialize};

/// Behavior hints attached to every catalog capability.
///
/// Defaults are conservative: not read-only, so a capability only gets the
/// read-only visibility exception when its author opts in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolAnnotations {
    pub read_only: bool,
    pub destructive: bool,
    pub idempotent: bool,
    pub open_world: bool,
}

impl ToolAnnotations {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hints for a tool that only reads upstream data.
    pub fn read_only() -> Self {
        Self {
            read_only: true,
            destructive: false,
            idempotent: true,
            open_world: true,
        }
    }

    /// Hints for a tool that writes upstream data without deleting it.
    pub fn write() -> Self {
        Self {
            read_only: false,
            destructive: false,
            idempotent: false,
            open_world: true,
        }
    }

    pub fn from_rmcp(rmcp: &RmcpToolAnnotations) -> Self {
        Self {
            read_only: rmcp.read_only_hint.unwrap_or(false),
            destructive: rmcp.destructive_hint.unwrap_or(true),
            idempotent: rmcp.idempotent_hint.unwrap_or(false),
            open_world: rmcp.open_world_hint.unwrap_or(true),
        }
    }

    /// Convert to rmcp's wire form, attaching a display title.
    pub fn to_rmcp(self, title: impl Into<String>) -> RmcpToolAnnotations {
        RmcpToolAnnotations {
            title: Some(title.into()),
            read_only_hint: Some(self.read_only),
            destructive_hint: Some(self.destructive),
            idempotent_hint: Some(self.idempotent),
            open_world_hint: Some(self.open_world),
        }
    }

    #[must_use]
    pub fn with_read_only(mut self, v: bool) -> Self {
        self.read_only = v;
        self
    }

    #[must_use]
    pub fn with_destructive(mut self, v: bool) -> Self {
        self.destructive = v;
        self
    }

    #[must_use]
    pub fn with_idempotent(mut self, v: bool) -> Self {
        self.idempotent = v;
        self
    }

    #[must_use]
    pub fn with_open_world(mut self, v: bool) -> Self {
        self.open_world = v;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rmcp_round_trip_keeps_hints() {
        let ann = ToolAnnotations::write().with_destructive(true);
        let rmcp = ann.to_rmcp("Delete file");
        assert_eq!(rmcp.title.as_deref(), Some("Delete file"));
        assert_eq!(rmcp.read_only_hint, Some(false));
        assert_eq!(ToolAnnotations::from_rmcp(&rmcp), ann);
    }

    #[test]
    fn test_conservative_defaults() {
        let rmcp = RmcpToolAnnotations {
            read_only_hint: None,
            destructive_hint: None,
            idempotent_hint: None,
            open_world_hint: None,
            title: None,
        };
        let ann = ToolAnnotations::from_rmcp(&rmcp);
        assert!(!ann.read_only);
        assert!(ann.destructive);
        assert!(!ann.idempotent);
        assert!(ann.open_world);
    }

    #[test]
    fn test_presets() {
        assert!(ToolAnnotations::read_only().read_only);
        assert!(!ToolAnnotations::write().read_only);
        assert!(!ToolAnnotations::new().read_only);
    }
}
