//! MCP server over the toolset registry.
//!
//! Listing reads the session's [`Inventory`]; dispatch goes through the
//! [`ToolTable`] the inventory registers into. A tool is callable only when it
//! is registered on the table *and* currently available (enabled toolset,
//! admitted by the scope filter, allowed by read-only mode).

use std::sync::Arc;

use rmcp::{
    model::{
        AnnotateAble, CallToolRequestParam, CallToolResult, Content, GetPromptRequestParam,
        GetPromptResult, Implementation, JsonObject, ListPromptsResult, ListResourcesResult,
        ListToolsResult, PaginatedRequestParam, ProtocolVersion, ReadResourceRequestParam,
        ReadResourceResult, RequestId, ServerCapabilities, ServerInfo, Tool,
    },
    service::{Peer, RequestContext},
    ErrorData, RoleServer, ServerHandler,
};
use toolgate_toolsets::{
    Inventory, RegistryDeps, SessionContext, SessionId, ToolDeps, ToolHandlerKind, ToolTable,
    ToolsetError, ToolsetResult,
};
use tracing::{debug, info, warn};

#[derive(Clone)]
pub struct ToolsetServer {
    inventory: Arc<Inventory>,
    host: Arc<ToolTable>,
    session_id: SessionId,
}

impl ToolsetServer {
    /// Register every initially enabled toolset and wrap the result.
    pub fn new(inventory: Arc<Inventory>, deps: ToolDeps) -> ToolsetResult<Self> {
        let host = Arc::new(ToolTable::new());
        let registered = inventory.register_enabled(host.as_ref(), &deps)?;
        // Nothing has been announced yet; the client lists on connect.
        host.take_changes();

        let session_id = SessionId::default();
        info!(
            session = %session_id,
            toolsets = ?inventory.enabled_toolsets(),
            registered,
            "Toolset server ready"
        );
        Ok(Self {
            inventory,
            host,
            session_id,
        })
    }

    pub fn inventory(&self) -> &Arc<Inventory> {
        &self.inventory
    }

    pub fn host(&self) -> &Arc<ToolTable> {
        &self.host
    }

    pub fn session(&self, request_id: Option<&RequestId>) -> SessionContext {
        let ctx = SessionContext::new(self.session_id.clone());
        match request_id {
            Some(RequestId::String(s)) => ctx.with_request(s.to_string()),
            Some(RequestId::Number(n)) => ctx.with_request(n.to_string()),
            None => ctx,
        }
    }

    /// Tools the client may see right now.
    pub fn tools(&self, ctx: &SessionContext) -> Vec<Tool> {
        self.inventory
            .available_tools(ctx)
            .iter()
            .filter_map(|c| self.host.get_tool(c.name()))
            .map(|registered| registered.tool)
            .collect()
    }

    /// Dispatch a tool call, picking the dependency carrier from the handler
    /// variant.
    pub async fn call(
        &self,
        name: &str,
        args: JsonObject,
        ctx: &SessionContext,
    ) -> Result<CallToolResult, ErrorData> {
        let registered = match self.host.get_tool(name) {
            Some(tool) if self.inventory.is_tool_available(name) => tool,
            _ => {
                return Err(to_error_data(ToolsetError::ToolNotFound(
                    name.to_string(),
                )))
            }
        };

        debug!(
            session = %ctx.session_id,
            request = ?ctx.request_id,
            tool = %name,
            toolset = %registered.toolset,
            "Calling tool"
        );

        let result = match &registered.handler {
            ToolHandlerKind::Standard(handler) => handler.call(&registered.deps, args).await,
            ToolHandlerKind::Registry(handler) => {
                let deps = RegistryDeps::new(
                    registered.deps.clone(),
                    self.host.clone(),
                    self.inventory.clone(),
                );
                handler.call(&deps, args).await
            }
        };

        match result {
            Ok(result) => Ok(result),
            Err(ToolsetError::Serialization(e)) => {
                Err(ErrorData::internal_error(e.to_string(), None))
            }
            Err(e) => Ok(CallToolResult::error(vec![Content::text(e.to_string())])),
        }
    }

    pub async fn prompt(
        &self,
        name: &str,
        args: JsonObject,
        ctx: &SessionContext,
    ) -> Result<GetPromptResult, ErrorData> {
        let available = self
            .inventory
            .catalog()
            .prompt(name)
            .is_some_and(|c| self.inventory.is_enabled(c.toolset()));
        let registered = match self.host.get_prompt(name) {
            Some(prompt) if available => prompt,
            _ => {
                return Err(to_error_data(ToolsetError::PromptNotFound(
                    name.to_string(),
                )))
            }
        };
        debug!(session = %ctx.session_id, prompt = %name, "Rendering prompt");
        registered
            .handler
            .get(&registered.deps, args)
            .await
            .map_err(to_error_data)
    }

    pub async fn resource(
        &self,
        uri: &str,
        ctx: &SessionContext,
    ) -> Result<ReadResourceResult, ErrorData> {
        let available = self
            .inventory
            .catalog()
            .resource(uri)
            .is_some_and(|c| self.inventory.is_enabled(c.toolset()));
        let registered = match self.host.get_resource(uri) {
            Some(resource) if available => resource,
            _ => {
                return Err(to_error_data(ToolsetError::ResourceNotFound(
                    uri.to_string(),
                )))
            }
        };
        debug!(session = %ctx.session_id, uri = %uri, "Reading resource");
        registered
            .handler
            .read(&registered.deps, uri)
            .await
            .map_err(to_error_data)
    }

    /// Tell the client about lists that changed since the last announcement.
    async fn announce_changes(&self, peer: &Peer<RoleServer>) {
        let changes = self.host.take_changes();
        if changes.tools {
            if let Err(e) = peer.notify_tool_list_changed().await {
                warn!("Failed to send tool list change notification: {}", e);
            }
        }
        if changes.prompts {
            if let Err(e) = peer.notify_prompt_list_changed().await {
                warn!("Failed to send prompt list change notification: {}", e);
            }
        }
        if changes.resources {
            if let Err(e) = peer.notify_resource_list_changed().await {
                warn!("Failed to send resource list change notification: {}", e);
            }
        }
    }
}

fn to_error_data(e: ToolsetError) -> ErrorData {
    match e {
        ToolsetError::InvalidArguments(msg) => ErrorData::invalid_params(msg, None),
        ToolsetError::ResourceNotFound(_) => ErrorData::resource_not_found(e.to_string(), None),
        ToolsetError::ToolsetNotFound(_)
        | ToolsetError::ToolNotFound(_)
        | ToolsetError::PromptNotFound(_) => ErrorData::invalid_params(e.to_string(), None),
        other => ErrorData::internal_error(other.to_string(), None),
    }
}

impl ServerHandler for ToolsetServer {
    async fn list_tools(
        &self,
        _request: Option<PaginatedRequestParam>,
        context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, ErrorData> {
        let ctx = self.session(Some(&context.id));
        Ok(ListToolsResult::with_all_items(self.tools(&ctx)))
    }

    async fn call_tool(
        &self,
        request: CallToolRequestParam,
        context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, ErrorData> {
        let ctx = self.session(Some(&context.id));
        let result = self
            .call(&request.name, request.arguments.unwrap_or_default(), &ctx)
            .await;
        self.announce_changes(&context.peer).await;
        result
    }

    async fn list_prompts(
        &self,
        _request: Option<PaginatedRequestParam>,
        context: RequestContext<RoleServer>,
    ) -> Result<ListPromptsResult, ErrorData> {
        let ctx = self.session(Some(&context.id));
        let prompts = self
            .inventory
            .available_prompts(&ctx)
            .iter()
            .filter_map(|c| self.host.get_prompt(c.name()))
            .map(|registered| registered.prompt)
            .collect();
        Ok(ListPromptsResult::with_all_items(prompts))
    }

    async fn get_prompt(
        &self,
        request: GetPromptRequestParam,
        context: RequestContext<RoleServer>,
    ) -> Result<GetPromptResult, ErrorData> {
        let ctx = self.session(Some(&context.id));
        self.prompt(&request.name, request.arguments.unwrap_or_default(), &ctx)
            .await
    }

    async fn list_resources(
        &self,
        _request: Option<PaginatedRequestParam>,
        context: RequestContext<RoleServer>,
    ) -> Result<ListResourcesResult, ErrorData> {
        let ctx = self.session(Some(&context.id));
        let resources = self
            .inventory
            .available_resources(&ctx)
            .iter()
            .filter_map(|c| self.host.get_resource(c.name()))
            .map(|registered| registered.resource.no_annotation())
            .collect();
        Ok(ListResourcesResult::with_all_items(resources))
    }

    async fn read_resource(
        &self,
        request: ReadResourceRequestParam,
        context: RequestContext<RoleServer>,
    ) -> Result<ReadResourceResult, ErrorData> {
        let ctx = self.session(Some(&context.id));
        self.resource(&request.uri, &ctx).await
    }

    fn get_info(&self) -> ServerInfo {
        let instructions = if self.inventory.is_enabled(toolgate_toolsets::META_TOOLSET_ID) {
            "Call list_available_toolsets to see which toolsets exist, get_toolset_tools to \
             preview one, and enable_toolset to make its tools available."
        } else {
            "Tools are grouped into toolsets enabled at startup."
        };
        ServerInfo {
            protocol_version: ProtocolVersion::default(),
            capabilities: ServerCapabilities::builder()
                .enable_prompts()
                .enable_prompts_list_changed()
                .enable_resources()
                .enable_resources_list_changed()
                .enable_tools()
                .enable_tool_list_changed()
                .build(),
            server_info: Implementation::from_build_env(),
            instructions: Some(instructions.to_string()),
        }
    }
}
