//! Operation model: schema, annotations, handler, and result types.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use serde::Serialize;
use serde_json::{Map, Value, json};

use crate::error::ToolError;
use crate::resource::ResourceContents;

pub type JsonObject = Map<String, Value>;

pub type ToolFuture = Pin<Box<dyn Future<Output = Result<ToolResult, ToolError>> + Send + 'static>>;
pub type ToolHandler = Arc<dyn Fn(ToolRequest) -> ToolFuture + Send + Sync + 'static>;

/// Whether an operation only observes platform state or mutates it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationKind {
    Read,
    Write,
}

/// Exposure filter shared by listing and dispatch.
///
/// An operation is exposed only when its toolset is enabled and, for write
/// operations, the group is not read-only.
#[must_use]
pub const fn is_exposed(enabled: bool, read_only: bool, kind: OperationKind) -> bool {
    match kind {
        OperationKind::Read => enabled,
        OperationKind::Write => enabled && !read_only,
    }
}

/// Per-call context forwarded to handlers and capability providers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallContext {
    /// Credential override for this call; falls back to the provider default when absent.
    pub auth_token: Option<String>,
}

impl CallContext {
    #[must_use]
    pub fn with_auth_token(token: impl Into<String>) -> Self {
        Self {
            auth_token: Some(token.into()),
        }
    }
}

/// Arguments and context for one tool invocation.
#[derive(Debug, Clone, Default)]
pub struct ToolRequest {
    pub arguments: JsonObject,
    pub context: CallContext,
}

impl ToolRequest {
    #[must_use]
    pub const fn new(arguments: JsonObject, context: CallContext) -> Self {
        Self { arguments, context }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamType {
    String,
    Number,
    Boolean,
    StringArray,
    ObjectArray,
    Object,
}

/// One named argument in a tool's input schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamSpec {
    pub name: String,
    pub param_type: ParamType,
    pub description: String,
    pub required: bool,
    pub enum_values: Vec<String>,
    pub minimum: Option<i64>,
    pub maximum: Option<i64>,
}

impl ParamSpec {
    fn new(name: impl Into<String>, param_type: ParamType, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            param_type,
            description: description.into(),
            required: false,
            enum_values: Vec::new(),
            minimum: None,
            maximum: None,
        }
    }

    pub fn string(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self::new(name, ParamType::String, description)
    }

    pub fn number(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self::new(name, ParamType::Number, description)
    }

    pub fn boolean(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self::new(name, ParamType::Boolean, description)
    }

    pub fn string_array(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self::new(name, ParamType::StringArray, description)
    }

    pub fn object_array(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self::new(name, ParamType::ObjectArray, description)
    }

    pub fn object(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self::new(name, ParamType::Object, description)
    }

    #[must_use]
    pub const fn required(mut self) -> Self {
        self.required = true;
        self
    }

    #[must_use]
    pub fn one_of<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.enum_values = values.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub const fn range(mut self, minimum: i64, maximum: i64) -> Self {
        self.minimum = Some(minimum);
        self.maximum = Some(maximum);
        self
    }

    fn schema(&self) -> Value {
        let mut schema = match self.param_type {
            ParamType::String => json!({ "type": "string" }),
            ParamType::Number => json!({ "type": "number" }),
            ParamType::Boolean => json!({ "type": "boolean" }),
            ParamType::StringArray => json!({ "type": "array", "items": { "type": "string" } }),
            ParamType::ObjectArray => json!({ "type": "array", "items": { "type": "object" } }),
            ParamType::Object => json!({ "type": "object" }),
        };
        if let Value::Object(map) = &mut schema {
            map.insert("description".to_string(), Value::String(self.description.clone()));
            if !self.enum_values.is_empty() {
                map.insert("enum".to_string(), json!(self.enum_values));
            }
            if let Some(minimum) = self.minimum {
                map.insert("minimum".to_string(), json!(minimum));
            }
            if let Some(maximum) = self.maximum {
                map.insert("maximum".to_string(), json!(maximum));
            }
        }
        schema
    }
}

/// Static description of a tool: name, human text, and argument schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolSpec {
    pub name: String,
    pub description: String,
    pub title: Option<String>,
    pub destructive: bool,
    pub params: Vec<ParamSpec>,
}

impl ToolSpec {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            title: None,
            destructive: false,
            params: Vec::new(),
        }
    }

    #[must_use]
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    #[must_use]
    pub const fn destructive(mut self) -> Self {
        self.destructive = true;
        self
    }

    #[must_use]
    pub fn param(mut self, param: ParamSpec) -> Self {
        self.params.push(param);
        self
    }

    /// Appends the standard `page`/`perPage` pagination arguments.
    #[must_use]
    pub fn paginated(self) -> Self {
        self.param(
            ParamSpec::number("page", "Page number for pagination (min 1)").range(1, i64::MAX),
        )
        .param(
            ParamSpec::number("perPage", "Results per page for pagination (min 1, max 100)")
                .range(1, 100),
        )
    }

    /// JSON schema object describing the tool's arguments.
    #[must_use]
    pub fn input_schema(&self) -> JsonObject {
        let properties: JsonObject = self
            .params
            .iter()
            .map(|param| (param.name.clone(), param.schema()))
            .collect();
        let required: Vec<&str> = self
            .params
            .iter()
            .filter(|param| param.required)
            .map(|param| param.name.as_str())
            .collect();

        let mut schema = JsonObject::new();
        schema.insert("type".to_string(), Value::String("object".to_string()));
        schema.insert("properties".to_string(), Value::Object(properties));
        if !required.is_empty() {
            schema.insert("required".to_string(), json!(required));
        }
        schema
    }
}

/// Hints attached to an exposed tool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolAnnotations {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub read_only_hint: bool,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub destructive_hint: bool,
}

/// A tool before registration: its spec and handler.
#[derive(Clone)]
pub struct Tool {
    pub spec: ToolSpec,
    pub handler: ToolHandler,
}

impl Tool {
    pub fn new<F, Fut>(spec: ToolSpec, handler: F) -> Self
    where
        F: Fn(ToolRequest) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<ToolResult, ToolError>> + Send + 'static,
    {
        let handler: ToolHandler =
            Arc::new(move |request: ToolRequest| -> ToolFuture { Box::pin(handler(request)) });
        Self { spec, handler }
    }
}

/// A registered tool tagged with its operation kind.
#[derive(Clone)]
pub struct ServerTool {
    pub spec: ToolSpec,
    pub kind: OperationKind,
    pub handler: ToolHandler,
}

impl ServerTool {
    #[must_use]
    pub fn from_tool(tool: Tool, kind: OperationKind) -> Self {
        Self {
            spec: tool.spec,
            kind,
            handler: tool.handler,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.spec.name
    }

    #[must_use]
    pub fn annotations(&self) -> ToolAnnotations {
        ToolAnnotations {
            title: self.spec.title.clone(),
            read_only_hint: self.kind == OperationKind::Read,
            destructive_hint: self.spec.destructive,
        }
    }

    /// Runs the handler.
    ///
    /// # Errors
    /// Returns whatever the handler returns.
    pub async fn call(&self, request: ToolRequest) -> Result<ToolResult, ToolError> {
        (self.handler)(request).await
    }
}

impl std::fmt::Debug for ServerTool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerTool")
            .field("name", &self.spec.name)
            .field("kind", &self.kind)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolContent {
    Text(String),
    Resource(ResourceContents),
}

/// Output of a tool handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolResult {
    pub content: Vec<ToolContent>,
    pub is_error: bool,
}

impl ToolResult {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            content: vec![ToolContent::Text(text.into())],
            is_error: false,
        }
    }

    /// Tool-level failure the caller can read and act on.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            content: vec![ToolContent::Text(message.into())],
            is_error: true,
        }
    }

    #[must_use]
    pub fn resource(contents: ResourceContents) -> Self {
        Self {
            content: vec![ToolContent::Resource(contents)],
            is_error: false,
        }
    }

    /// Serializes `value` as the text payload.
    ///
    /// # Errors
    /// Returns [`ToolError::Failed`] if serialization fails.
    pub fn json<T: Serialize>(value: &T) -> Result<Self, ToolError> {
        let text = serde_json::to_string(value)
            .map_err(|err| ToolError::failed("failed to marshal response", err))?;
        Ok(Self::text(text))
    }

    /// First text item, if any.
    #[must_use]
    pub fn first_text(&self) -> Option<&str> {
        self.content.iter().find_map(|item| match item {
            ToolContent::Text(text) => Some(text.as_str()),
            ToolContent::Resource(_) => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exposure_filter_table() {
        use OperationKind::{Read, Write};

        assert!(is_exposed(true, false, Read));
        assert!(is_exposed(true, true, Read));
        assert!(is_exposed(true, false, Write));
        assert!(!is_exposed(true, true, Write));
        assert!(!is_exposed(false, false, Read));
        assert!(!is_exposed(false, false, Write));
        assert!(!is_exposed(false, true, Read));
        assert!(!is_exposed(false, true, Write));
    }

    #[test]
    fn input_schema_lists_required_and_enums() {
        let spec = ToolSpec::new("list_workflow_runs", "List runs")
            .param(ParamSpec::string("owner", "Repository owner").required())
            .param(ParamSpec::string("status", "Run status").one_of(["queued", "completed"]))
            .paginated();

        let schema = spec.input_schema();

        assert_eq!(schema["type"], "object");
        assert_eq!(schema["required"], json!(["owner"]));
        assert_eq!(schema["properties"]["status"]["enum"], json!(["queued", "completed"]));
        assert_eq!(schema["properties"]["perPage"]["maximum"], json!(100));
        assert_eq!(schema["properties"]["owner"]["type"], "string");
    }

    #[test]
    fn schema_without_required_params_omits_required_key() {
        let schema = ToolSpec::new("get_me", "Current user").input_schema();
        assert!(!schema.contains_key("required"));
    }

    #[test]
    fn annotations_follow_operation_kind() {
        let tool = Tool::new(
            ToolSpec::new("delete_file", "Delete a file").title("Delete file").destructive(),
            |_request| async { Ok::<_, ToolError>(ToolResult::text("ok")) },
        );
        let write = ServerTool::from_tool(tool.clone(), OperationKind::Write);
        let read = ServerTool::from_tool(tool, OperationKind::Read);

        assert!(!write.annotations().read_only_hint);
        assert!(write.annotations().destructive_hint);
        assert!(read.annotations().read_only_hint);
        assert_eq!(read.annotations().title.as_deref(), Some("Delete file"));
    }

    #[tokio::test]
    async fn server_tool_runs_handler() {
        let tool = Tool::new(ToolSpec::new("echo", "Echo"), |request: ToolRequest| async move {
            Ok::<_, ToolError>(ToolResult::text(request.context.auth_token.unwrap_or_default()))
        });
        let tool = ServerTool::from_tool(tool, OperationKind::Read);

        let result = tool
            .call(ToolRequest::new(JsonObject::new(), CallContext::with_auth_token("abc")))
            .await
            .unwrap();

        assert_eq!(result.first_text(), Some("abc"));
        assert!(!result.is_error);
    }
}
