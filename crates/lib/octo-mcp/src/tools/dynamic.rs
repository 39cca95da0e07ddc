//! Discovery tools that let a caller inspect and enable toolsets at run time.
//!
//! The handlers hold a [`WeakToolsetGroup`] because they are registered inside
//! the very group they operate on.

use std::future::Future;

use octo_core::{Params, Translator};
use octo_toolsets::{
    ParamSpec,
    Tool,
    ToolError,
    ToolRequest,
    ToolResult,
    ToolSpec,
    ToolsetError,
    ToolsetGroup,
    WeakToolsetGroup,
};
use serde::Serialize;

use super::json_result;

/// Name of the toolset holding these tools; it never lists itself.
pub const DYNAMIC_TOOLSET: &str = "dynamic";

#[derive(Debug, Serialize)]
struct AvailableToolset {
    name: String,
    description: String,
    can_enable: bool,
    currently_enabled: bool,
}

#[derive(Debug, Serialize)]
struct ToolsetTool {
    name: String,
    description: String,
    can_enable: bool,
    toolset: String,
}

fn upgrade(group: &WeakToolsetGroup) -> Result<ToolsetGroup, ToolError> {
    group
        .upgrade()
        .ok_or_else(|| ToolError::invalid_params("toolset group is no longer available"))
}

fn with_group<F, Fut>(
    group: &ToolsetGroup,
    handler: F,
) -> impl Fn(ToolRequest) -> Fut + Send + Sync + 'static
where
    F: Fn(WeakToolsetGroup, ToolRequest) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<ToolResult, ToolError>> + Send + 'static,
{
    let group = group.downgrade();
    move |request: ToolRequest| handler(group.clone(), request)
}

fn toolset_param() -> ParamSpec {
    ParamSpec::string(
        "toolset",
        "The name of the toolset you want to get the tools for",
    )
    .required()
}

pub fn list_available_toolsets(group: &ToolsetGroup, t: &Translator) -> Tool {
    let spec = ToolSpec::new(
        "list_available_toolsets",
        t.translate(
            "TOOL_LIST_AVAILABLE_TOOLSETS_DESCRIPTION",
            "List available toolsets this GitHub MCP server can offer, providing the enabled status of each. Use this when a task could be achieved with a GitHub tool and the currently available tools aren't enough. Call get_toolset_tools with these toolset names to discover specific tools you can call",
        ),
    )
    .title(t.translate("TOOL_LIST_AVAILABLE_TOOLSETS_USER_TITLE", "List available toolsets"));
    Tool::new(spec, with_group(group, handle_list_available_toolsets))
}

async fn handle_list_available_toolsets(
    group: WeakToolsetGroup,
    _request: ToolRequest,
) -> Result<ToolResult, ToolError> {
    let group = upgrade(&group)?;
    let toolsets: Vec<AvailableToolset> = group
        .list_toolsets()
        .await
        .into_iter()
        .filter(|summary| summary.name != DYNAMIC_TOOLSET)
        .map(|summary| AvailableToolset {
            name: summary.name,
            description: summary.description,
            can_enable: true,
            currently_enabled: summary.currently_enabled,
        })
        .collect();
    json_result(&toolsets)
}

pub fn get_toolset_tools(group: &ToolsetGroup, t: &Translator) -> Tool {
    let spec = ToolSpec::new(
        "get_toolset_tools",
        t.translate(
            "TOOL_GET_TOOLSET_TOOLS_DESCRIPTION",
            "Lists all the capabilities that are enabled with the specified toolset, use this to get clarity on whether enabling a toolset would help you to complete a task",
        ),
    )
    .title(t.translate("TOOL_GET_TOOLSET_TOOLS_USER_TITLE", "List all tools in a toolset"))
    .param(toolset_param());
    Tool::new(spec, with_group(group, handle_get_toolset_tools))
}

async fn handle_get_toolset_tools(
    group: WeakToolsetGroup,
    request: ToolRequest,
) -> Result<ToolResult, ToolError> {
    let name = Params::new(&request.arguments).required_str("toolset")?;
    let group = upgrade(&group)?;
    let tools = match group.toolset_tools(&name).await {
        Ok(tools) => tools,
        Err(ToolsetError::UnknownToolset(_)) => {
            return Ok(ToolResult::error(format!("Toolset {name} not found")));
        }
        Err(err) => return Ok(ToolResult::error(err.to_string())),
    };
    let tools: Vec<ToolsetTool> = tools
        .into_iter()
        .map(|tool| ToolsetTool {
            name: tool.spec.name,
            description: tool.spec.description,
            can_enable: true,
            toolset: name.clone(),
        })
        .collect();
    json_result(&tools)
}

pub fn enable_toolset(group: &ToolsetGroup, t: &Translator) -> Tool {
    let spec = ToolSpec::new(
        "enable_toolset",
        t.translate(
            "TOOL_ENABLE_TOOLSET_DESCRIPTION",
            "Enable one of the sets of tools the GitHub MCP server provides, use get_toolset_tools and list_available_toolsets first to see what this will enable",
        ),
    )
    .title(t.translate("TOOL_ENABLE_TOOLSET_USER_TITLE", "Enable a toolset"))
    .param(ParamSpec::string("toolset", "The name of the toolset to enable").required());
    Tool::new(spec, with_group(group, handle_enable_toolset))
}

async fn handle_enable_toolset(
    group: WeakToolsetGroup,
    request: ToolRequest,
) -> Result<ToolResult, ToolError> {
    let name = Params::new(&request.arguments).required_str("toolset")?;
    let group = upgrade(&group)?;
    match group.enable_toolset(&name).await {
        Ok(true) => {
            tracing::info!(toolset = %name, "toolset enabled at run time");
            Ok(ToolResult::text(format!("Toolset {name} enabled")))
        }
        Ok(false) => Ok(ToolResult::text(format!("Toolset {name} is already enabled"))),
        Err(ToolsetError::UnknownToolset(_)) => {
            Ok(ToolResult::error(format!("Toolset {name} not found")))
        }
        Err(err) => Ok(ToolResult::error(err.to_string())),
    }
}
