use octo_core::{Params, QueryParams, SharedProvider, Translator};
use octo_toolsets::{ErrorContext, ParamSpec, Tool, ToolError, ToolRequest, ToolResult, ToolSpec};

use super::{json_result, rest, with_provider};

pub fn search_users(provider: &SharedProvider, t: &Translator) -> Tool {
    let spec = ToolSpec::new(
        "search_users",
        t.translate("TOOL_SEARCH_USERS_DESCRIPTION", "Search for GitHub users"),
    )
    .title(t.translate("TOOL_SEARCH_USERS_USER_TITLE", "Search users"))
    .param(ParamSpec::string("q", "Search query using GitHub users search syntax").required())
    .param(ParamSpec::string("sort", "Sort field by category").one_of([
        "followers",
        "repositories",
        "joined",
    ]))
    .param(ParamSpec::string("order", "Sort order").one_of(["asc", "desc"]))
    .paginated();
    Tool::new(spec, with_provider(provider, handle_search_users))
}

async fn handle_search_users(
    provider: SharedProvider,
    request: ToolRequest,
) -> Result<ToolResult, ToolError> {
    let params = Params::new(&request.arguments);
    let query = QueryParams::new()
        .push("q", params.required_str("q")?)
        .push_opt("sort", params.optional_str("sort")?)
        .push_opt("order", params.optional_str("order")?)
        .paginate(params.pagination()?);

    let client = rest(&provider, &request.context)?;
    let result = client
        .get(&["search", "users"], &query)
        .await
        .context("failed to search users")?;
    json_result(&result)
}
