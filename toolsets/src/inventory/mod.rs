//! Toolset registry.
//!
//! This module tracks which toolsets a session has enabled and computes the
//! capabilities it can currently see:
//! - Toolset enablement (monotonic, idempotent)
//! - Scope filtering against the session token
//! - Read-only mode
//! - Live registration of newly enabled toolsets

pub mod builder;
pub mod registry;

pub use builder::{InventoryBuilder, ALL_TOOLSETS, DEFAULT_TOOLSETS};
pub use registry::{EnableOutcome, Inventory};
