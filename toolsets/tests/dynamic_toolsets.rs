//! End-to-end toolset discovery and enablement over the built-in catalog.

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use rmcp::model::{CallToolResult, JsonObject};
use serde_json::{json, Value};
use toolgate_toolsets::{
    default_catalog, FeatureFlags, Inventory, RegistryDeps, ScopeFilter, SessionContext,
    ToolDeps, ToolHandlerKind, ToolTable, ToolsetResult, Translator, UpstreamClient,
    UpstreamError, UpstreamRequest, META_TOOLSET_ID,
};

#[derive(Default)]
struct RecordingClient {
    requests: Mutex<Vec<UpstreamRequest>>,
}

#[async_trait]
impl UpstreamClient for RecordingClient {
    async fn send(&self, request: UpstreamRequest) -> Result<Value, UpstreamError> {
        self.requests.lock().push(request);
        Ok(json!({"ok": true}))
    }
}

struct Session {
    inventory: Arc<Inventory>,
    host: Arc<ToolTable>,
    deps: ToolDeps,
    client: Arc<RecordingClient>,
}

impl Session {
    fn new(toolsets: &[&str], dynamic: bool, filter: ScopeFilter) -> Self {
        let catalog = Arc::new(default_catalog(&Translator::identity()).unwrap());
        let inventory = Arc::new(
            Inventory::builder(catalog)
                .with_toolsets(toolsets.iter().copied())
                .with_dynamic(dynamic)
                .with_scope_filter(filter)
                .build()
                .unwrap(),
        );
        let client = Arc::new(RecordingClient::default());
        let deps = ToolDeps::new(client.clone());
        let host = Arc::new(ToolTable::new());
        inventory.register_enabled(host.as_ref(), &deps).unwrap();
        Self {
            inventory,
            host,
            deps,
            client,
        }
    }

    /// Dispatch a call the way the server does: registered and available.
    async fn call(&self, name: &str, args: Value) -> ToolsetResult<CallToolResult> {
        let registered = self.host.get_tool(name).expect("tool not registered");
        assert!(self.inventory.is_tool_available(name));
        let args = match args {
            Value::Object(m) => m,
            _ => JsonObject::new(),
        };
        match &registered.handler {
            ToolHandlerKind::Standard(handler) => handler.call(&registered.deps, args).await,
            ToolHandlerKind::Registry(handler) => {
                let deps = RegistryDeps::new(
                    registered.deps.clone(),
                    self.host.clone(),
                    self.inventory.clone(),
                );
                handler.call(&deps, args).await
            }
        }
    }

    fn available_names(&self) -> Vec<String> {
        self.inventory
            .available_tools(&SessionContext::default())
            .iter()
            .map(|c| c.name().to_string())
            .collect()
    }
}

fn text_of(result: &CallToolResult) -> String {
    result.content[0]
        .as_text()
        .map(|t| t.text.clone())
        .unwrap_or_default()
}

#[tokio::test]
async fn test_dynamic_session_starts_with_meta_tools() {
    let session = Session::new(&[], true, ScopeFilter::new(Vec::<String>::new()));
    assert_eq!(session.inventory.enabled_toolsets(), vec![META_TOOLSET_ID]);
    assert_eq!(
        session.available_names(),
        vec!["list_available_toolsets", "get_toolset_tools", "enable_toolset"]
    );
    assert_eq!(session.host.counts(), (3, 0, 0));
}

#[tokio::test]
async fn test_discover_then_enable_repos() {
    let session = Session::new(&[], true, ScopeFilter::new(Vec::<String>::new()));

    let listed = session
        .call("list_available_toolsets", json!({}))
        .await
        .unwrap();
    let listed: Value = serde_json::from_str(&text_of(&listed)).unwrap();
    let repos = listed
        .as_array()
        .unwrap()
        .iter()
        .find(|e| e["name"] == "repos")
        .unwrap();
    assert_eq!(repos["currently_enabled"], "false");
    assert_eq!(repos["can_enable"], "true");
    assert!(listed
        .as_array()
        .unwrap()
        .iter()
        .all(|e| e["name"] != META_TOOLSET_ID));

    session.host.take_changes();
    let enabled = session
        .call("enable_toolset", json!({"toolset": "repos"}))
        .await
        .unwrap();
    assert!(text_of(&enabled).contains("enabled"));
    assert!(session.inventory.is_enabled("repos"));
    assert!(session.host.take_changes().tools);

    let preview = session
        .call("get_toolset_tools", json!({"toolset": "repos"}))
        .await
        .unwrap();
    let preview: Value = serde_json::from_str(&text_of(&preview)).unwrap();
    assert!(preview
        .as_array()
        .unwrap()
        .iter()
        .any(|e| e["name"] == "get_commit"));

    // Empty scopes: read-only tools appear, writes stay hidden
    let names = session.available_names();
    assert!(names.contains(&"get_commit".to_string()));
    assert!(!names.contains(&"create_branch".to_string()));
    // Registered on the host but not callable
    assert!(session.host.has_tool("create_branch"));
    assert!(!session.inventory.is_tool_available("create_branch"));
}

#[tokio::test]
async fn test_enable_twice_registers_once() {
    let session = Session::new(&[], true, ScopeFilter::new(["repo"]));
    let expected = session.inventory.tools_for_toolset("issues").len();

    let first = session
        .call("enable_toolset", json!({"toolset": "issues"}))
        .await
        .unwrap();
    assert_eq!(
        text_of(&first),
        format!("Toolset issues enabled with {} tools", expected)
    );
    let registered = session.host.counts();
    // Prompts ride along with their toolset
    assert_eq!(registered.1, 1);

    let second = session
        .call("enable_toolset", json!({"toolset": "issues"}))
        .await
        .unwrap();
    assert_eq!(text_of(&second), "Toolset issues is already enabled");
    assert_eq!(session.host.counts(), registered);
}

#[tokio::test]
async fn test_enable_unknown_toolset_is_tool_error() {
    let session = Session::new(&[], true, ScopeFilter::default());
    let before = session.inventory.enabled_toolsets();

    let result = session
        .call("enable_toolset", json!({"toolset": "nope"}))
        .await
        .unwrap();
    assert_eq!(result.is_error, Some(true));
    assert_eq!(session.inventory.enabled_toolsets(), before);

    let result = session
        .call("enable_toolset", json!({"toolset": 7}))
        .await
        .unwrap();
    assert_eq!(result.is_error, Some(true));
}

#[tokio::test]
async fn test_enabled_tool_reaches_upstream() {
    let session = Session::new(&[], true, ScopeFilter::new(["repo"]));
    session
        .call("enable_toolset", json!({"toolset": "issues"}))
        .await
        .unwrap();

    let result = session
        .call(
            "get_issue",
            json!({"owner": "octo", "repo": "hello", "issue_number": 42}),
        )
        .await
        .unwrap();
    assert_ne!(result.is_error, Some(true));

    let requests = session.client.requests.lock();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].path, "/repos/octo/hello/issues/42");
}

#[tokio::test]
async fn test_static_default_toolsets() {
    let session = Session::new(&["default"], false, ScopeFilter::new(["repo", "gist"]));
    assert_eq!(
        session.inventory.enabled_toolsets(),
        vec!["context", "issues", "repos", "users"]
    );
    assert!(!session.host.has_tool("enable_toolset"));
    assert!(!session.host.has_tool("list_gists"));
    assert!(session.available_names().contains(&"create_branch".to_string()));
}

#[tokio::test]
async fn test_read_only_flag_blocks_writes_in_handler() {
    let session = Session::new(&["repos"], false, ScopeFilter::unrestricted());
    let registered = session.host.get_tool("create_branch").unwrap();
    let ToolHandlerKind::Standard(handler) = &registered.handler else {
        panic!("create_branch should be a standard tool");
    };

    let deps = session
        .deps
        .clone()
        .with_flags(FeatureFlags { read_only: true });
    let args = match json!({"owner": "o", "repo": "r", "ref": "refs/heads/x", "sha": "abc"}) {
        Value::Object(m) => m,
        _ => JsonObject::new(),
    };
    let result = handler.call(&deps, args).await.unwrap();
    assert_eq!(result.is_error, Some(true));
    assert!(session.client.requests.lock().is_empty());
}
