//! Declarative REST passthrough handler.
//!
//! Most catalog tools are "extract parameters, call one upstream endpoint,
//! return the JSON". [`RestTool`] captures that as data: an HTTP method, a
//! path template with `{param}` placeholders, and a parameter list that also
//! produces the tool's input schema.

use async_trait::async_trait;
use http::Method;
use rmcp::model::{CallToolResult, Content, JsonObject};
use serde_json::{json, Map, Value};
use tracing::debug;
use url::Url;

use super::{
    handler::ToolHandler,
    params::{optional_bool, optional_int, optional_object, optional_str, required_str},
};
use crate::{
    deps::ToolDeps,
    error::{ToolsetError, ToolsetResult},
    upstream::UpstreamRequest,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamType {
    String,
    Integer,
    Boolean,
    Object,
}

impl ParamType {
    fn json_type(self) -> &'static str {
        match self {
            ParamType::String => "string",
            ParamType::Integer => "number",
            ParamType::Boolean => "boolean",
            ParamType::Object => "object",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamLocation {
    /// One path segment; `/`, `?` and `#` in the value are escaped.
    Path,
    /// A `/`-separated file path spanning several segments.
    FilePath,
    Query,
    Body,
}

#[derive(Debug, Clone)]
pub struct RestParam {
    pub name: &'static str,
    pub description: &'static str,
    pub ty: ParamType,
    pub location: ParamLocation,
    pub required: bool,
}

#[derive(Debug, Clone)]
pub struct RestTool {
    method: Method,
    path: &'static str,
    params: Vec<RestParam>,
}

impl RestTool {
    pub fn new(method: Method, path: &'static str) -> Self {
        Self {
            method,
            path,
            params: Vec::new(),
        }
    }

    pub fn get(path: &'static str) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: &'static str) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn patch(path: &'static str) -> Self {
        Self::new(Method::PATCH, path)
    }

    pub fn put(path: &'static str) -> Self {
        Self::new(Method::PUT, path)
    }

    /// Required string substituted into `{name}` in the path.
    #[must_use]
    pub fn path_param(self, name: &'static str, description: &'static str) -> Self {
        self.param(name, description, ParamType::String, ParamLocation::Path, true)
    }

    /// Required repository file path substituted into `{name}`, kept as
    /// separate segments. `.` and `..` segments are rejected.
    #[must_use]
    pub fn file_path_param(self, name: &'static str, description: &'static str) -> Self {
        self.param(name, description, ParamType::String, ParamLocation::FilePath, true)
    }

    /// Required path parameter of a non-string type, e.g. an issue number.
    #[must_use]
    pub fn typed_path_param(
        self,
        name: &'static str,
        ty: ParamType,
        description: &'static str,
    ) -> Self {
        self.param(name, description, ty, ParamLocation::Path, true)
    }

    #[must_use]
    pub fn query(self, name: &'static str, ty: ParamType, description: &'static str) -> Self {
        self.param(name, description, ty, ParamLocation::Query, false)
    }

    #[must_use]
    pub fn required_query(
        self,
        name: &'static str,
        ty: ParamType,
        description: &'static str,
    ) -> Self {
        self.param(name, description, ty, ParamLocation::Query, true)
    }

    #[must_use]
    pub fn body(
        self,
        name: &'static str,
        ty: ParamType,
        required: bool,
        description: &'static str,
    ) -> Self {
        self.param(name, description, ty, ParamLocation::Body, required)
    }

    /// Standard `page` / `perPage` query parameters.
    #[must_use]
    pub fn paginated(self) -> Self {
        self.query(
            "page",
            ParamType::Integer,
            "Page number for pagination (min 1)",
        )
        .query(
            "perPage",
            ParamType::Integer,
            "Results per page for pagination (min 1, max 100)",
        )
    }

    fn param(
        mut self,
        name: &'static str,
        description: &'static str,
        ty: ParamType,
        location: ParamLocation,
        required: bool,
    ) -> Self {
        self.params.push(RestParam {
            name,
            description,
            ty,
            location,
            required,
        });
        self
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn is_write(&self) -> bool {
        self.method != Method::GET
    }

    pub fn input_schema(&self) -> JsonObject {
        let mut properties = Map::new();
        let mut required = Vec::new();
        for p in &self.params {
            properties.insert(
                p.name.to_string(),
                json!({"type": p.ty.json_type(), "description": p.description}),
            );
            if p.required {
                required.push(Value::String(p.name.to_string()));
            }
        }

        let mut schema = Map::new();
        schema.insert("type".to_string(), json!("object"));
        schema.insert("properties".to_string(), Value::Object(properties));
        if !required.is_empty() {
            schema.insert("required".to_string(), Value::Array(required));
        }
        schema
    }

    /// Assemble the upstream request from tool arguments.
    pub fn build_request(&self, args: &JsonObject) -> ToolsetResult<UpstreamRequest> {
        let mut path = self.path.to_string();
        let mut request = UpstreamRequest::new(self.method.clone(), String::new());
        let mut body = Map::new();

        for p in &self.params {
            let Some(value) = extract(args, p)? else {
                continue;
            };
            match p.location {
                ParamLocation::Path => {
                    let text = scalar_text(&value);
                    let encoded = encode_segments(p.name, [text.as_str()])?;
                    path = path.replace(&format!("{{{}}}", p.name), &encoded);
                }
                ParamLocation::FilePath => {
                    let text = scalar_text(&value);
                    let segments = text.split('/').filter(|s| !s.is_empty());
                    let encoded = encode_segments(p.name, segments)?;
                    path = path.replace(&format!("{{{}}}", p.name), &encoded);
                }
                ParamLocation::Query => {
                    let key = if p.name == "perPage" { "per_page" } else { p.name };
                    request = request.with_query(key, scalar_text(&value));
                }
                ParamLocation::Body => {
                    body.insert(p.name.to_string(), value);
                }
            }
        }

        request.path = path;
        if !body.is_empty() {
            request = request.with_body(Value::Object(body));
        }
        Ok(request)
    }
}

fn extract(args: &JsonObject, p: &RestParam) -> ToolsetResult<Option<Value>> {
    let value = match (p.ty, p.required) {
        (ParamType::String, true) => Some(Value::String(required_str(args, p.name)?)),
        (ParamType::String, false) => optional_str(args, p.name)?.map(Value::String),
        (ParamType::Integer, required) => {
            let v = optional_int(args, p.name)?;
            if required && v.is_none() {
                return Err(ToolsetError::InvalidArguments(format!(
                    "missing required parameter: {}",
                    p.name
                )));
            }
            v.map(Value::from)
        }
        (ParamType::Boolean, required) => {
            let v = optional_bool(args, p.name)?;
            if required && v.is_none() {
                return Err(ToolsetError::InvalidArguments(format!(
                    "missing required parameter: {}",
                    p.name
                )));
            }
            v.map(Value::Bool)
        }
        (ParamType::Object, required) => {
            let v = optional_object(args, p.name)?;
            if required && v.is_none() {
                return Err(ToolsetError::InvalidArguments(format!(
                    "missing required parameter: {}",
                    p.name
                )));
            }
            v.map(Value::Object)
        }
    };
    Ok(value)
}

/// Percent-encode `segments` as URL path segments joined by `/`.
fn encode_segments<'a>(
    name: &str,
    segments: impl IntoIterator<Item = &'a str>,
) -> ToolsetResult<String> {
    let mut url = Url::parse("http://upstream/")
        .map_err(|e| ToolsetError::InvalidArguments(e.to_string()))?;
    {
        let mut path = url
            .path_segments_mut()
            .map_err(|_| ToolsetError::InvalidArguments(format!("invalid path for {}", name)))?;
        path.clear();
        let mut pushed = 0;
        for segment in segments {
            if segment.is_empty() || segment == "." || segment == ".." {
                return Err(ToolsetError::InvalidArguments(format!(
                    "invalid path segment in parameter {}: '{}'",
                    name, segment
                )));
            }
            path.push(segment);
            pushed += 1;
        }
        if pushed == 0 {
            return Err(ToolsetError::InvalidArguments(format!(
                "missing required parameter: {}",
                name
            )));
        }
    }
    Ok(url.path().trim_start_matches('/').to_string())
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[async_trait]
impl ToolHandler for RestTool {
    async fn call(&self, deps: &ToolDeps, args: JsonObject) -> ToolsetResult<CallToolResult> {
        if deps.flags.read_only && self.is_write() {
            return Ok(CallToolResult::error(vec![Content::text(
                "this tool modifies data and the server is in read-only mode",
            )]));
        }

        let request = match self.build_request(&args) {
            Ok(request) => request,
            Err(ToolsetError::InvalidArguments(msg)) => {
                return Ok(CallToolResult::error(vec![Content::text(msg)]));
            }
            Err(e) => return Err(e),
        };

        debug!(method = %request.method, path = %request.path, "Calling upstream");
        match deps.client.send(request).await {
            Ok(value) => Ok(CallToolResult::success(vec![Content::text(
                serde_json::to_string(&value)?,
            )])),
            Err(e) => Ok(CallToolResult::error(vec![Content::text(format!(
                "{} {} failed: {}",
                self.method, self.path, e
            ))])),
        }
    }
}
