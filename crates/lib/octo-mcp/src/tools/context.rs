use octo_core::{QueryParams, SharedProvider, Translator};
use octo_toolsets::{ErrorContext, ParamSpec, Tool, ToolError, ToolRequest, ToolResult, ToolSpec};

use super::{json_result, rest, with_provider};

/// Profile of the authenticated user.
pub fn get_me(provider: &SharedProvider, t: &Translator) -> Tool {
    let spec = ToolSpec::new(
        "get_me",
        t.translate(
            "TOOL_GET_ME_DESCRIPTION",
            "Get details of the authenticated GitHub user. Use this when a request includes \"me\", \"my\". The output will not change unless the user changes their profile, so only call this once.",
        ),
    )
    .title(t.translate("TOOL_GET_ME_USER_TITLE", "Get my user profile"))
    .param(ParamSpec::string(
        "reason",
        "Optional: the reason for requesting the user information",
    ));
    Tool::new(spec, with_provider(provider, handle_get_me))
}

async fn handle_get_me(
    provider: SharedProvider,
    request: ToolRequest,
) -> Result<ToolResult, ToolError> {
    let client = rest(&provider, &request.context)?;
    let user = client
        .get(&["user"], &QueryParams::new())
        .await
        .context("failed to get user")?;
    json_result(&user)
}
