//! Built-in catalog: GitHub-style toolsets backed by REST passthrough tools.
//!
//! Write tools accept both `repo` and `public_repo` where either grant would
//! let the upstream call succeed. Read-only tools still list their scopes so
//! the scope filter can report why they are visible.

use std::sync::Arc;

use async_trait::async_trait;
use rmcp::model::{
    GetPromptResult, JsonObject, Prompt, PromptArgument, PromptMessage, PromptMessageRole,
    RawResource, ReadResourceResult, ResourceContents, Tool,
};

use super::{
    handler::{PromptHandler, ResourceHandler},
    params::{optional_str, required_str},
    Capability, Catalog, ParamType, RestTool, ToolHandlerKind, ToolsetMetadata,
};
use crate::{
    annotations::ToolAnnotations,
    deps::ToolDeps,
    error::ToolsetResult,
    translation::Translator,
    upstream::UpstreamRequest,
};

const REPO_SCOPES: [&str; 2] = ["repo", "public_repo"];

/// Build the default catalog, meta-tools included.
pub fn default_catalog(t: &Translator) -> ToolsetResult<Catalog> {
    Catalog::builder()
        .toolset(
            ToolsetMetadata::new(
                "context",
                t.translate(
                    "TOOLSET_CONTEXT_DESCRIPTION",
                    "Tools that provide context about the current user and GitHub context you are operating in",
                ),
            )
            .with_default(true),
        )
        .toolset(
            ToolsetMetadata::new(
                "repos",
                t.translate("TOOLSET_REPOS_DESCRIPTION", "GitHub Repository related tools"),
            )
            .with_default(true),
        )
        .toolset(
            ToolsetMetadata::new(
                "issues",
                t.translate("TOOLSET_ISSUES_DESCRIPTION", "GitHub Issues related tools"),
            )
            .with_default(true),
        )
        .toolset(
            ToolsetMetadata::new(
                "users",
                t.translate("TOOLSET_USERS_DESCRIPTION", "GitHub User related tools"),
            )
            .with_default(true),
        )
        .toolset(ToolsetMetadata::new(
            "gists",
            t.translate("TOOLSET_GISTS_DESCRIPTION", "GitHub Gist related tools"),
        ))
        .toolset(ToolsetMetadata::new(
            "notifications",
            t.translate(
                "TOOLSET_NOTIFICATIONS_DESCRIPTION",
                "GitHub Notifications related tools",
            ),
        ))
        .capabilities(context_capabilities(t))
        .capabilities(repos_capabilities(t))
        .capabilities(issues_capabilities(t))
        .capabilities(users_capabilities(t))
        .capabilities(gists_capabilities(t))
        .capabilities(notifications_capabilities(t))
        .with_dynamic_tools(t.clone())
        .build()
}

/// Declare a REST passthrough tool with translated title and description.
fn rest_tool(
    t: &Translator,
    toolset: &str,
    name: &'static str,
    title: &str,
    description: &str,
    annotations: ToolAnnotations,
    rest: RestTool,
) -> Capability {
    let key = name.to_uppercase();
    let title = t.translate(&format!("TOOL_{}_USER_TITLE", key), title);
    let description = t.translate(&format!("TOOL_{}_DESCRIPTION", key), description);

    let mut tool = Tool::new(name, description, Arc::new(rest.input_schema()));
    tool.title = Some(title.clone());
    tool.annotations = Some(annotations.to_rmcp(title));
    Capability::tool(toolset, tool, annotations, ToolHandlerKind::standard(rest))
}

fn owner_repo(rest: RestTool) -> RestTool {
    rest.path_param("owner", "Repository owner")
        .path_param("repo", "Repository name")
}

fn context_capabilities(t: &Translator) -> Vec<Capability> {
    vec![
        rest_tool(
            t,
            "context",
            "get_me",
            "Get my user profile",
            "Get details of the authenticated GitHub user. Use this when a request is about the user's own profile for GitHub.",
            ToolAnnotations::read_only(),
            RestTool::get("/user"),
        ),
        Capability::resource(
            "context",
            RawResource {
                uri: CURRENT_USER_URI.to_string(),
                name: "current_user".to_string(),
                title: Some("Current user".to_string()),
                description: Some(t.translate(
                    "RESOURCE_CURRENT_USER_DESCRIPTION",
                    "Profile of the authenticated GitHub user",
                )),
                mime_type: Some("application/json".to_string()),
                size: None,
                icons: None,
            },
            Arc::new(CurrentUserResource),
        ),
    ]
}

fn repos_capabilities(t: &Translator) -> Vec<Capability> {
    vec![
        rest_tool(
            t,
            "repos",
            "get_commit",
            "Get commit details",
            "Get details for a commit from a GitHub repository",
            ToolAnnotations::read_only(),
            owner_repo(RestTool::get("/repos/{owner}/{repo}/commits/{sha}"))
                .path_param("sha", "Commit SHA, branch name, or tag name")
                .paginated(),
        )
        .with_scopes(REPO_SCOPES),
        rest_tool(
            t,
            "repos",
            "list_commits",
            "List commits",
            "Get list of commits of a branch in a GitHub repository. Returns at least 30 results per page by default.",
            ToolAnnotations::read_only(),
            owner_repo(RestTool::get("/repos/{owner}/{repo}/commits"))
                .query("sha", ParamType::String, "Commit SHA, branch or tag name to list commits of")
                .query("author", ParamType::String, "Author username or email address to filter commits by")
                .paginated(),
        )
        .with_scopes(REPO_SCOPES),
        rest_tool(
            t,
            "repos",
            "get_file_contents",
            "Get file or directory contents",
            "Get the contents of a file or directory from a GitHub repository",
            ToolAnnotations::read_only(),
            owner_repo(RestTool::get("/repos/{owner}/{repo}/contents/{path}"))
                .file_path_param("path", "Path to file/directory")
                .query("ref", ParamType::String, "Git ref such as a branch, tag, or commit SHA"),
        )
        .with_scopes(REPO_SCOPES),
        rest_tool(
            t,
            "repos",
            "create_branch",
            "Create branch",
            "Create a new branch in a GitHub repository",
            ToolAnnotations::write(),
            owner_repo(RestTool::post("/repos/{owner}/{repo}/git/refs"))
                .body("ref", ParamType::String, true, "Fully qualified ref, e.g. refs/heads/feature")
                .body("sha", ParamType::String, true, "SHA the new branch points at"),
        )
        .with_scopes(REPO_SCOPES),
        rest_tool(
            t,
            "repos",
            "create_or_update_file",
            "Create or update file",
            "Create or update a single file in a GitHub repository. If updating, you must provide the SHA of the file you want to update.",
            ToolAnnotations::write().with_destructive(true),
            owner_repo(RestTool::put("/repos/{owner}/{repo}/contents/{path}"))
                .file_path_param("path", "Path where to create/update the file")
                .body("message", ParamType::String, true, "Commit message")
                .body("content", ParamType::String, true, "Base64 encoded file content")
                .body("branch", ParamType::String, false, "Branch to create/update the file in")
                .body("sha", ParamType::String, false, "Blob SHA of the file being replaced"),
        )
        .with_scopes(REPO_SCOPES),
    ]
}

fn issues_capabilities(t: &Translator) -> Vec<Capability> {
    vec![
        rest_tool(
            t,
            "issues",
            "get_issue",
            "Get issue details",
            "Get details of a specific issue in a GitHub repository.",
            ToolAnnotations::read_only(),
            owner_repo(RestTool::get("/repos/{owner}/{repo}/issues/{issue_number}"))
                .typed_path_param("issue_number", ParamType::Integer, "The number of the issue"),
        )
        .with_scopes(REPO_SCOPES),
        rest_tool(
            t,
            "issues",
            "list_issues",
            "List issues",
            "List issues in a GitHub repository. For pagination, use the 'page' and 'perPage' parameters.",
            ToolAnnotations::read_only(),
            owner_repo(RestTool::get("/repos/{owner}/{repo}/issues"))
                .query("state", ParamType::String, "Filter by state: open, closed, or all")
                .query("labels", ParamType::String, "Comma separated label names to filter by")
                .paginated(),
        )
        .with_scopes(REPO_SCOPES),
        rest_tool(
            t,
            "issues",
            "create_issue",
            "Open new issue",
            "Create a new issue in a GitHub repository.",
            ToolAnnotations::write(),
            owner_repo(RestTool::post("/repos/{owner}/{repo}/issues"))
                .body("title", ParamType::String, true, "Issue title")
                .body("body", ParamType::String, false, "Issue body content"),
        )
        .with_scopes(REPO_SCOPES),
        rest_tool(
            t,
            "issues",
            "add_issue_comment",
            "Add comment to issue",
            "Add a comment to a specific issue in a GitHub repository.",
            ToolAnnotations::write(),
            owner_repo(RestTool::post("/repos/{owner}/{repo}/issues/{issue_number}/comments"))
                .typed_path_param("issue_number", ParamType::Integer, "Issue number to comment on")
                .body("body", ParamType::String, true, "Comment content"),
        )
        .with_scopes(REPO_SCOPES),
        Capability::prompt(
            "issues",
            Prompt::new(
                ISSUE_TO_FIX_WORKFLOW,
                Some(t.translate(
                    "PROMPT_ISSUE_TO_FIX_WORKFLOW_DESCRIPTION",
                    "Create an issue for a problem and then work towards a fix for it",
                )),
                Some(vec![
                    prompt_arg("owner", "Repository owner", true),
                    prompt_arg("repo", "Repository name", true),
                    prompt_arg("title", "Issue title", true),
                    prompt_arg("description", "Issue description", false),
                ]),
            ),
            Arc::new(IssueToFixWorkflow),
        ),
    ]
}

fn users_capabilities(t: &Translator) -> Vec<Capability> {
    vec![rest_tool(
        t,
        "users",
        "search_users",
        "Search users",
        "Find GitHub users by username, real name, or other profile information.",
        ToolAnnotations::read_only(),
        RestTool::get("/search/users")
            .required_query("q", ParamType::String, "User search query")
            .query("sort", ParamType::String, "Sort by followers, repositories, or joined")
            .query("order", ParamType::String, "Sort order: asc or desc")
            .paginated(),
    )]
}

fn gists_capabilities(t: &Translator) -> Vec<Capability> {
    vec![
        rest_tool(
            t,
            "gists",
            "list_gists",
            "List gists",
            "List gists for a user",
            ToolAnnotations::read_only(),
            RestTool::get("/gists")
                .query("since", ParamType::String, "Only gists updated after this time (ISO 8601)")
                .paginated(),
        ),
        rest_tool(
            t,
            "gists",
            "get_gist",
            "Get gist content",
            "Get gist content of a particular gist, by gist ID",
            ToolAnnotations::read_only(),
            RestTool::get("/gists/{gist_id}").path_param("gist_id", "The ID of the gist"),
        ),
        rest_tool(
            t,
            "gists",
            "create_gist",
            "Create Gist",
            "Create a new gist",
            ToolAnnotations::write(),
            RestTool::post("/gists")
                .body("description", ParamType::String, false, "Description of the gist")
                .body("files", ParamType::Object, true, "Map of filenames to {\"content\": ...} objects")
                .body("public", ParamType::Boolean, false, "Whether the gist is public"),
        )
        .with_scopes(["gist"]),
        rest_tool(
            t,
            "gists",
            "update_gist",
            "Update Gist",
            "Update an existing gist",
            ToolAnnotations::write(),
            RestTool::patch("/gists/{gist_id}")
                .path_param("gist_id", "ID of the gist to update")
                .body("description", ParamType::String, false, "Updated description of the gist")
                .body("files", ParamType::Object, true, "Map of filenames to {\"content\": ...} objects"),
        )
        .with_scopes(["gist"]),
    ]
}

fn notifications_capabilities(t: &Translator) -> Vec<Capability> {
    vec![
        rest_tool(
            t,
            "notifications",
            "list_notifications",
            "List notifications",
            "Lists all GitHub notifications for the authenticated user.",
            ToolAnnotations::read_only(),
            RestTool::get("/notifications")
                .query("all", ParamType::Boolean, "Include notifications marked as read")
                .query("participating", ParamType::Boolean, "Only notifications the user participates in")
                .paginated(),
        )
        .with_scopes(["notifications", "repo"]),
        rest_tool(
            t,
            "notifications",
            "mark_all_notifications_read",
            "Mark all notifications as read",
            "Mark all notifications as read",
            ToolAnnotations::write().with_idempotent(true),
            RestTool::put("/notifications")
                .body("last_read_at", ParamType::String, false, "Mark notifications updated before this time (ISO 8601)"),
        )
        .with_scopes(["notifications", "repo"]),
    ]
}

pub const CURRENT_USER_URI: &str = "context://me";
pub const ISSUE_TO_FIX_WORKFLOW: &str = "issue_to_fix_workflow";

fn prompt_arg(name: &str, description: &str, required: bool) -> PromptArgument {
    PromptArgument {
        name: name.to_string(),
        title: None,
        description: Some(description.to_string()),
        required: Some(required),
    }
}

struct CurrentUserResource;

#[async_trait]
impl ResourceHandler for CurrentUserResource {
    async fn read(&self, deps: &ToolDeps, uri: &str) -> ToolsetResult<ReadResourceResult> {
        let user = deps.client.send(UpstreamRequest::get("/user")).await?;
        Ok(ReadResourceResult {
            contents: vec![ResourceContents::text(serde_json::to_string(&user)?, uri)],
        })
    }
}

struct IssueToFixWorkflow;

#[async_trait]
impl PromptHandler for IssueToFixWorkflow {
    async fn get(&self, deps: &ToolDeps, args: JsonObject) -> ToolsetResult<GetPromptResult> {
        let owner = required_str(&args, "owner")?;
        let repo = required_str(&args, "repo")?;
        let title = required_str(&args, "title")?;
        let description = optional_str(&args, "description")?.unwrap_or_default();

        let text = deps.translator.translate(
            "PROMPT_ISSUE_TO_FIX_WORKFLOW_TEXT",
            "Create an issue in {owner}/{repo} titled \"{title}\" describing: {description}\n\
             Then investigate the repository, propose a fix on a new branch, and \
             comment on the issue with what you changed.",
        );
        let text = text
            .replace("{owner}", &owner)
            .replace("{repo}", &repo)
            .replace("{title}", &title)
            .replace("{description}", &description);

        Ok(GetPromptResult {
            description: Some(format!("Issue to fix workflow for {}/{}", owner, repo)),
            messages: vec![PromptMessage::new_text(PromptMessageRole::User, text)],
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use parking_lot::Mutex;
    use serde_json::{json, Value};

    use super::*;
    use crate::{
        catalog::CapabilityKind,
        dynamic::META_TOOLSET_ID,
        error::UpstreamError,
        upstream::UpstreamClient,
    };

    #[derive(Default)]
    struct RecordingClient {
        paths: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl UpstreamClient for RecordingClient {
        async fn send(&self, request: UpstreamRequest) -> Result<Value, UpstreamError> {
            self.paths.lock().push(request.path);
            Ok(json!({"login": "octocat"}))
        }
    }

    fn args(value: Value) -> JsonObject {
        match value {
            Value::Object(m) => m,
            _ => JsonObject::new(),
        }
    }

    #[test]
    fn test_default_catalog_builds() {
        let catalog = default_catalog(&Translator::identity()).unwrap();
        let ids: Vec<&str> = catalog.toolsets().map(|t| t.id.as_str()).collect();
        assert_eq!(
            ids,
            vec!["context", "dynamic", "gists", "issues", "notifications", "repos", "users"]
        );

        let defaults: Vec<&str> = catalog
            .toolsets()
            .filter(|t| t.default)
            .map(|t| t.id.as_str())
            .collect();
        assert_eq!(defaults, vec!["context", "issues", "repos", "users"]);
        assert!(catalog.toolset(META_TOOLSET_ID).unwrap().meta);

        let (_, _, prompts, resources) = catalog.counts();
        assert_eq!(prompts, 1);
        assert_eq!(resources, 1);
    }

    #[test]
    fn test_tool_annotations_and_scopes() {
        let catalog = default_catalog(&Translator::identity()).unwrap();

        let get_commit = catalog.tool("get_commit").unwrap();
        assert!(get_commit.is_read_only());
        assert_eq!(get_commit.accepted_scopes(), ["repo", "public_repo"]);
        let tool = get_commit.as_tool().unwrap();
        assert_eq!(tool.title.as_deref(), Some("Get commit details"));
        assert_eq!(
            tool.annotations.as_ref().and_then(|a| a.read_only_hint),
            Some(true)
        );

        let create_gist = catalog.tool("create_gist").unwrap();
        assert!(!create_gist.is_read_only());
        assert_eq!(create_gist.accepted_scopes(), ["gist"]);

        assert!(catalog.tool("get_me").unwrap().accepted_scopes().is_empty());
    }

    #[test]
    fn test_translation_overrides_apply() {
        let t = Translator::with_overrides(
            [(
                "TOOL_GET_ME_DESCRIPTION".to_string(),
                "Who am I".to_string(),
            )]
            .into_iter()
            .collect(),
        );
        let catalog = default_catalog(&t).unwrap();
        assert_eq!(catalog.tool("get_me").unwrap().description(), "Who am I");
    }

    #[test]
    fn test_member_kinds() {
        let catalog = default_catalog(&Translator::identity()).unwrap();
        let kinds: Vec<CapabilityKind> = catalog
            .members("context")
            .iter()
            .map(|c| c.kind())
            .collect();
        assert_eq!(kinds, vec![CapabilityKind::Tool, CapabilityKind::Resource]);
    }

    #[tokio::test]
    async fn test_current_user_resource() {
        let client = Arc::new(RecordingClient::default());
        let deps = ToolDeps::new(client.clone());
        let result = CurrentUserResource
            .read(&deps, CURRENT_USER_URI)
            .await
            .unwrap();
        assert_eq!(result.contents.len(), 1);
        assert_eq!(client.paths.lock().as_slice(), ["/user"]);
    }

    #[tokio::test]
    async fn test_issue_prompt_renders_arguments() {
        let deps = ToolDeps::new(Arc::new(RecordingClient::default()));
        let result = IssueToFixWorkflow
            .get(
                &deps,
                args(json!({"owner": "octo", "repo": "hello", "title": "Crash"})),
            )
            .await
            .unwrap();
        assert_eq!(result.messages.len(), 1);
        assert_eq!(
            result.description.as_deref(),
            Some("Issue to fix workflow for octo/hello")
        );

        let missing = IssueToFixWorkflow
            .get(&deps, args(json!({"owner": "octo"})))
            .await;
        assert!(missing.is_err());
    }
}
