//! MCP server implementation for octo-mcp.
//!
//! This crate binds the platform operation handlers into toolsets, exposes the
//! repository content resource templates, and adapts the toolset group to the
//! rmcp `ServerHandler` surface for stdio and streamable HTTP.

mod helpers;
pub mod resources;
pub mod server;
pub mod tools;
pub mod toolsets;

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use octo_core::{SharedProvider, Translator};
use octo_toolsets::{CallContext, ToolRequest, ToolsetGroup};
use rmcp::model::{
    CallToolRequestParams,
    CallToolResult,
    ErrorCode,
    ListResourceTemplatesResult,
    ListToolsResult,
    PaginatedRequestParams,
    ReadResourceRequestParams,
    ReadResourceResult,
    ServerCapabilities,
    ServerInfo,
};
use rmcp::service::RequestContext;
use rmcp::{ErrorData, RoleServer, ServerHandler};
use tokio::sync::OnceCell;
use tracing::{debug, warn};

pub use helpers::mcp_err;
pub use toolsets::{ToolsetSelection, build_toolset_group, dynamic_toolset, platform_toolsets};

const SERVER_INSTRUCTIONS: &str = r"octo-mcp exposes GitHub platform operations as MCP tools, grouped into toolsets.

Workflow:
1. Call `get_me` first when the task depends on who you are acting as.
2. Repository files: `get_file_contents` for a file or directory, or read a `repo://` resource:
   - `repo://{owner}/{repo}/contents{/path*}` for the default branch.
   - `repo://{owner}/{repo}/refs/heads/{branch}/contents{/path*}`
   - `repo://{owner}/{repo}/sha/{sha}/contents{/path*}`
   - `repo://{owner}/{repo}/refs/tags/{tag}/contents{/path*}`
   - `repo://{owner}/{repo}/refs/pull/{prNumber}/head/contents{/path*}`
3. Issues, pull requests, Actions, projects, code scanning, secret scanning and
   notifications each live in their own toolset.

Notes:
- When the server runs with dynamic toolsets, only a few tools are visible at first. Call
  `list_available_toolsets`, inspect one with `get_toolset_tools`, then `enable_toolset`.
  The tool list changes after enabling.
- In read-only mode tools that modify state are neither listed nor callable.
- Paginated tools accept `page` and `perPage` (max 100).
- Prefer `list_workflow_jobs` and `get_job_logs` with `failed_only` over full run logs.";

/// Everything a session needs to assemble its own toolset group.
#[derive(Clone)]
pub struct ServerSettings {
    pub selection: ToolsetSelection,
    pub provider: SharedProvider,
    pub translator: Translator,
    pub request_timeout: Option<Duration>,
}

impl ServerSettings {
    #[must_use]
    pub fn new(selection: ToolsetSelection, provider: SharedProvider, translator: Translator) -> Self {
        Self {
            selection,
            provider,
            translator,
            request_timeout: None,
        }
    }

    #[must_use]
    pub const fn with_request_timeout(mut self, request_timeout: Option<Duration>) -> Self {
        self.request_timeout = request_timeout;
        self
    }
}

impl std::fmt::Debug for ServerSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerSettings")
            .field("selection", &self.selection)
            .field("request_timeout", &self.request_timeout)
            .finish_non_exhaustive()
    }
}

/// MCP server wrapper around one session's toolset group.
///
/// Clones share the session. The group is built on first use unless one was
/// supplied up front.
#[derive(Clone)]
pub struct OctoMcp {
    settings: Arc<ServerSettings>,
    group: Arc<OnceCell<ToolsetGroup>>,
}

impl OctoMcp {
    /// Creates a session that assembles its group lazily from `settings`.
    #[must_use]
    pub fn new(settings: Arc<ServerSettings>) -> Self {
        Self {
            settings,
            group: Arc::new(OnceCell::new()),
        }
    }

    /// Creates a session around an already assembled group.
    #[must_use]
    pub fn with_group(settings: Arc<ServerSettings>, group: ToolsetGroup) -> Self {
        Self {
            settings,
            group: Arc::new(OnceCell::new_with(Some(group))),
        }
    }

    /// The session's toolset group, assembling it if needed.
    ///
    /// # Errors
    /// Returns an internal MCP error if the configured selection names an
    /// unknown toolset.
    pub async fn group(&self) -> Result<&ToolsetGroup, ErrorData> {
        self.group
            .get_or_try_init(|| {
                build_toolset_group(
                    &self.settings.selection,
                    &self.settings.provider,
                    &self.settings.translator,
                )
            })
            .await
            .map_err(|err| mcp_err(ErrorCode::INTERNAL_ERROR, err.to_string()))
    }

    async fn call(
        &self,
        request: CallToolRequestParams,
        context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, ErrorData> {
        let group = self.group().await?;
        let tool = group.authorize(&request.name).await.map_err(|err| {
            warn!(tool = %request.name, error = %err, "tool call rejected");
            helpers::dispatch_err(&err)
        })?;

        let revision = group.revision();
        let call_context = call_context(&context);
        let arguments = request.arguments.unwrap_or_default();
        debug!(tool = %request.name, "dispatching tool call");

        let invocation = tool.call(ToolRequest::new(arguments, call_context));
        let outcome = tokio::select! {
            () = context.ct.cancelled() => {
                return Err(mcp_err(ErrorCode::INTERNAL_ERROR, "request cancelled"));
            }
            outcome = with_timeout(self.settings.request_timeout, invocation) => outcome,
        };
        let result = match outcome {
            Some(Ok(result)) => Ok(helpers::to_call_result(result)),
            Some(Err(err)) => helpers::tool_err(err),
            None => Err(mcp_err(
                ErrorCode::INTERNAL_ERROR,
                format!("tool {} timed out", request.name),
            )),
        };

        if group.revision() != revision
            && let Err(err) = context.peer.notify_tool_list_changed().await
        {
            warn!(error = %err, "failed to send tool list changed notification");
        }
        result
    }
}

/// Runs `future` under an optional deadline; `None` means it timed out.
async fn with_timeout<F: Future>(timeout: Option<Duration>, future: F) -> Option<F::Output> {
    match timeout {
        Some(limit) => tokio::time::timeout(limit, future).await.ok(),
        None => Some(future.await),
    }
}

/// Per-call credentials from the HTTP `Authorization: Bearer` header, if any.
fn call_context(context: &RequestContext<RoleServer>) -> CallContext {
    context
        .extensions
        .get::<axum::http::request::Parts>()
        .and_then(|parts| parts.headers.get(axum::http::header::AUTHORIZATION))
        .and_then(|value| value.to_str().ok())
        .and_then(bearer_token)
        .map_or_else(CallContext::default, CallContext::with_auth_token)
}

fn bearer_token(header: &str) -> Option<&str> {
    let (scheme, token) = header.trim().split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

impl ServerHandler for OctoMcp {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(SERVER_INSTRUCTIONS.to_string()),
            capabilities: ServerCapabilities::builder()
                .enable_tools()
                .enable_tool_list_changed()
                .enable_resources()
                .build(),
            ..Default::default()
        }
    }

    fn list_tools(
        &self,
        _request: Option<PaginatedRequestParams>,
        _context: RequestContext<RoleServer>,
    ) -> impl Future<Output = Result<ListToolsResult, ErrorData>> + Send + '_ {
        async move {
            let group = self.group().await?;
            let tools = group
                .exposed_tools()
                .await
                .iter()
                .map(helpers::to_mcp_tool)
                .collect();
            Ok(ListToolsResult::with_all_items(tools))
        }
    }

    fn call_tool(
        &self,
        request: CallToolRequestParams,
        context: RequestContext<RoleServer>,
    ) -> impl Future<Output = Result<CallToolResult, ErrorData>> + Send + '_ {
        self.call(request, context)
    }

    fn list_resource_templates(
        &self,
        _request: Option<PaginatedRequestParams>,
        _context: RequestContext<RoleServer>,
    ) -> impl Future<Output = Result<ListResourceTemplatesResult, ErrorData>> + Send + '_ {
        async move {
            let group = self.group().await?;
            let templates = group
                .exposed_resource_templates()
                .await
                .into_iter()
                .map(helpers::to_mcp_resource_template)
                .collect();
            Ok(ListResourceTemplatesResult::with_all_items(templates))
        }
    }

    fn read_resource(
        &self,
        request: ReadResourceRequestParams,
        context: RequestContext<RoleServer>,
    ) -> impl Future<Output = Result<ReadResourceResult, ErrorData>> + Send + '_ {
        async move {
            let group = self.group().await?;
            let template = group
                .resource_template_for(&request.uri)
                .await
                .map_err(|err| helpers::dispatch_err(&err))?;
            debug!(uri = %request.uri, template = %template.spec.uri_template, "reading resource");

            let read = template.read(&request.uri, call_context(&context));
            let outcome = tokio::select! {
                () = context.ct.cancelled() => {
                    return Err(mcp_err(ErrorCode::INTERNAL_ERROR, "request cancelled"));
                }
                outcome = with_timeout(self.settings.request_timeout, read) => outcome,
            };
            let contents = match outcome {
                Some(Ok(contents)) => contents,
                Some(Err(err)) => return Err(helpers::resource_err(err)),
                None => {
                    return Err(mcp_err(
                        ErrorCode::INTERNAL_ERROR,
                        format!("reading {} timed out", request.uri),
                    ));
                }
            };
            Ok(ReadResourceResult {
                contents: contents.into_iter().map(helpers::to_mcp_contents).collect(),
            })
        }
    }
}
