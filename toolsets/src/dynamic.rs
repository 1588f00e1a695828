//! Registry meta-tools for dynamic toolset discovery.
//!
//! - `list_available_toolsets`: every toolset with its enabled status
//! - `get_toolset_tools`: preview a toolset's tools without enabling it
//! - `enable_toolset`: enable a toolset and register its tools on the live host
//!
//! Bad toolset names are tool-level error results so the agent can recover by
//! listing toolsets again.

use std::sync::Arc;

use async_trait::async_trait;
use rmcp::model::{CallToolResult, Content, JsonObject, Tool};
use serde::Serialize;
use serde_json::{json, Value};

use crate::{
    annotations::ToolAnnotations,
    catalog::{params::required_str, Capability, RegistryToolHandler, ToolHandlerKind, ToolsetMetadata},
    deps::RegistryDeps,
    error::{ToolsetError, ToolsetResult},
    inventory::EnableOutcome,
    translation::Translator,
};

pub const META_TOOLSET_ID: &str = "dynamic";

pub const LIST_AVAILABLE_TOOLSETS: &str = "list_available_toolsets";
pub const GET_TOOLSET_TOOLS: &str = "get_toolset_tools";
pub const ENABLE_TOOLSET: &str = "enable_toolset";

pub fn meta_toolset(t: &Translator) -> ToolsetMetadata {
    ToolsetMetadata::new(
        META_TOOLSET_ID,
        t.translate(
            "TOOLSET_DYNAMIC_DESCRIPTION",
            "Discover GitHub MCP tools that can help achieve tasks by enabling additional sets of tools, you can control the enablement of any toolset to access its tools when this toolset is enabled.",
        ),
    )
    .with_meta(true)
}

/// The three meta-tools. `toolset_ids` becomes the `enum` of their
/// `toolset` parameter.
pub fn meta_capabilities(t: &Translator, toolset_ids: &[String]) -> Vec<Capability> {
    vec![
        Capability::tool(
            META_TOOLSET_ID,
            Tool::new(
                LIST_AVAILABLE_TOOLSETS,
                t.translate(
                    "TOOL_LIST_AVAILABLE_TOOLSETS_DESCRIPTION",
                    "List all available toolsets this GitHub MCP server can offer, providing the enabled status of each. Use this when a task could be achieved with a GitHub tool and the currently available tools aren't enough. Call get_toolset_tools with these toolset names to discover specific tools you can call",
                ),
                Arc::new(empty_schema()),
            ),
            ToolAnnotations::read_only().with_open_world(false),
            ToolHandlerKind::registry(ListAvailableToolsets),
        ),
        Capability::tool(
            META_TOOLSET_ID,
            Tool::new(
                GET_TOOLSET_TOOLS,
                t.translate(
                    "TOOL_GET_TOOLSET_TOOLS_DESCRIPTION",
                    "Lists all the capabilities that are enabled with the specified toolset, use this to get clarity on whether enabling a toolset would help you to complete a task",
                ),
                Arc::new(toolset_schema(
                    toolset_ids,
                    "The name of the toolset you want to get the tools for",
                )),
            ),
            ToolAnnotations::read_only().with_open_world(false),
            ToolHandlerKind::registry(GetToolsetTools),
        ),
        Capability::tool(
            META_TOOLSET_ID,
            Tool::new(
                ENABLE_TOOLSET,
                t.translate(
                    "TOOL_ENABLE_TOOLSET_DESCRIPTION",
                    "Enable one of the sets of tools the GitHub MCP server provides, use get_toolset_tools and list_available_toolsets first to see what this will enable",
                ),
                Arc::new(toolset_schema(toolset_ids, "The name of the toolset to enable")),
            ),
            ToolAnnotations::write().with_idempotent(true).with_open_world(false),
            ToolHandlerKind::registry(EnableToolset),
        ),
    ]
}

fn empty_schema() -> JsonObject {
    let mut schema = JsonObject::new();
    schema.insert("type".to_string(), json!("object"));
    schema.insert("properties".to_string(), json!({}));
    schema
}

fn toolset_schema(toolset_ids: &[String], description: &str) -> JsonObject {
    let mut schema = JsonObject::new();
    schema.insert("type".to_string(), json!("object"));
    schema.insert(
        "properties".to_string(),
        json!({
            "toolset": {
                "type": "string",
                "description": description,
                "enum": toolset_ids,
            }
        }),
    );
    schema.insert("required".to_string(), json!(["toolset"]));
    schema
}

#[derive(Debug, Serialize)]
struct ToolsetSummary {
    name: String,
    description: String,
    can_enable: &'static str,
    currently_enabled: &'static str,
}

#[derive(Debug, Serialize)]
struct ToolsetMember {
    name: String,
    description: String,
    can_enable: &'static str,
    toolset: String,
}

fn flag(v: bool) -> &'static str {
    if v {
        "true"
    } else {
        "false"
    }
}

fn json_result<T: Serialize>(payload: &T) -> ToolsetResult<CallToolResult> {
    let text = serde_json::to_string(payload)?;
    Ok(CallToolResult::success(vec![Content::text(text)]))
}

fn error_result(message: impl Into<String>) -> CallToolResult {
    CallToolResult::error(vec![Content::text(message.into())])
}

/// Extract the `toolset` argument, or the tool-level error to return.
fn toolset_arg(args: &JsonObject) -> Result<String, CallToolResult> {
    required_str(args, "toolset").map_err(|e| match e {
        ToolsetError::InvalidArguments(msg) => error_result(msg),
        other => error_result(other.to_string()),
    })
}

fn not_found(id: &str) -> CallToolResult {
    error_result(format!("Toolset {} not found", id))
}

struct ListAvailableToolsets;

#[async_trait]
impl RegistryToolHandler for ListAvailableToolsets {
    async fn call(&self, deps: &RegistryDeps, _args: JsonObject) -> ToolsetResult<CallToolResult> {
        let inventory = &deps.inventory;
        let summaries: Vec<ToolsetSummary> = inventory
            .toolset_descriptions()
            .into_iter()
            .map(|(id, description)| ToolsetSummary {
                currently_enabled: flag(inventory.is_enabled(&id)),
                name: id,
                description,
                can_enable: "true",
            })
            .collect();
        json_result(&summaries)
    }
}

struct GetToolsetTools;

#[async_trait]
impl RegistryToolHandler for GetToolsetTools {
    async fn call(&self, deps: &RegistryDeps, args: JsonObject) -> ToolsetResult<CallToolResult> {
        let id = match toolset_arg(&args) {
            Ok(id) => id,
            Err(result) => return Ok(result),
        };
        if !deps.inventory.has_toolset(&id) {
            return Ok(not_found(&id));
        }

        let members: Vec<ToolsetMember> = deps
            .inventory
            .tools_for_toolset(&id)
            .iter()
            .map(|c| ToolsetMember {
                name: c.name().to_string(),
                description: c.description().to_string(),
                can_enable: "true",
                toolset: id.clone(),
            })
            .collect();
        json_result(&members)
    }
}

struct EnableToolset;

#[async_trait]
impl RegistryToolHandler for EnableToolset {
    async fn call(&self, deps: &RegistryDeps, args: JsonObject) -> ToolsetResult<CallToolResult> {
        let id = match toolset_arg(&args) {
            Ok(id) => id,
            Err(result) => return Ok(result),
        };

        match deps.inventory.enable(&id, deps.host.as_ref(), &deps.deps) {
            Ok(EnableOutcome::Enabled { registered }) => Ok(CallToolResult::success(vec![
                Content::text(format!("Toolset {} enabled with {} tools", id, registered)),
            ])),
            Ok(EnableOutcome::AlreadyEnabled) => Ok(CallToolResult::success(vec![Content::text(
                format!("Toolset {} is already enabled", id),
            )])),
            Err(ToolsetError::ToolsetNotFound(_)) => Ok(not_found(&id)),
            Err(e) => Err(e),
        }
    }
}

/// Parse a discovery payload back into JSON. Used by callers that want to
/// inspect a meta-tool result.
pub fn result_json(result: &CallToolResult) -> Option<Value> {
    let text = result.content.first()?.as_text()?;
    serde_json::from_str(&text.text).ok()
}
