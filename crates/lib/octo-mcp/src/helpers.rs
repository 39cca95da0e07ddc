use std::borrow::Cow;
use std::sync::Arc;

use octo_toolsets::{
    DispatchError,
    ResourceContents,
    ServerResourceTemplate,
    ServerTool,
    ToolContent,
    ToolError,
    ToolResult,
};
use rmcp::ErrorData;
use rmcp::model::{self, AnnotateAble, CallToolResult, Content, ErrorCode, RawResourceTemplate};

/// Builds an MCP error with no attached data.
pub fn mcp_err(code: ErrorCode, message: impl Into<Cow<'static, str>>) -> ErrorData {
    ErrorData::new(code, message, None)
}

pub(crate) fn dispatch_err(err: &DispatchError) -> ErrorData {
    let code = match err {
        DispatchError::UnknownTool(_) => ErrorCode::METHOD_NOT_FOUND,
        DispatchError::ToolsetDisabled { .. } | DispatchError::ReadOnly(_) => {
            ErrorCode::INVALID_PARAMS
        }
        DispatchError::UnknownResource(_) => ErrorCode::RESOURCE_NOT_FOUND,
    };
    mcp_err(code, err.to_string())
}

/// Maps a handler error onto the protocol.
///
/// Parameter problems stay inside the tool result so the caller can correct
/// them; everything else fails the request.
pub(crate) fn tool_err(err: ToolError) -> Result<CallToolResult, ErrorData> {
    match err {
        ToolError::InvalidParams(message) => {
            Ok(CallToolResult::error(vec![Content::text(message)]))
        }
        ToolError::NotFound(message) => Err(mcp_err(ErrorCode::RESOURCE_NOT_FOUND, message)),
        err @ ToolError::Failed { .. } => Err(mcp_err(ErrorCode::INTERNAL_ERROR, err.to_string())),
    }
}

/// Maps a resource read error; parameter problems are request errors here.
pub(crate) fn resource_err(err: ToolError) -> ErrorData {
    match err {
        ToolError::InvalidParams(message) => mcp_err(ErrorCode::INVALID_PARAMS, message),
        ToolError::NotFound(message) => mcp_err(ErrorCode::RESOURCE_NOT_FOUND, message),
        err @ ToolError::Failed { .. } => mcp_err(ErrorCode::INTERNAL_ERROR, err.to_string()),
    }
}

pub(crate) fn to_mcp_tool(tool: &ServerTool) -> model::Tool {
    let hints = tool.annotations();
    let mut annotations = model::ToolAnnotations::new();
    annotations.title = hints.title;
    annotations.read_only_hint = Some(hints.read_only_hint);
    if hints.destructive_hint {
        annotations.destructive_hint = Some(true);
    }
    model::Tool::new(
        tool.spec.name.clone(),
        tool.spec.description.clone(),
        Arc::new(tool.spec.input_schema()),
    )
    .annotate(annotations)
}

pub(crate) fn to_mcp_resource_template(template: ServerResourceTemplate) -> model::ResourceTemplate {
    RawResourceTemplate {
        uri_template: template.spec.uri_template,
        name: template.spec.name,
        title: None,
        description: template.spec.description,
        mime_type: template.spec.mime_type,
        icons: None,
    }
    .no_annotation()
}

pub(crate) fn to_mcp_contents(contents: ResourceContents) -> model::ResourceContents {
    match contents {
        ResourceContents::Text {
            uri,
            mime_type,
            text,
        } => model::ResourceContents::TextResourceContents {
            uri,
            mime_type,
            text,
            meta: None,
        },
        ResourceContents::Blob {
            uri,
            mime_type,
            blob,
        } => model::ResourceContents::BlobResourceContents {
            uri,
            mime_type,
            blob,
            meta: None,
        },
    }
}

pub(crate) fn to_call_result(result: ToolResult) -> CallToolResult {
    let content: Vec<Content> = result
        .content
        .into_iter()
        .map(|item| match item {
            ToolContent::Text(text) => Content::text(text),
            ToolContent::Resource(contents) => Content::resource(to_mcp_contents(contents)),
        })
        .collect();
    if result.is_error {
        CallToolResult::error(content)
    } else {
        CallToolResult::success(content)
    }
}
