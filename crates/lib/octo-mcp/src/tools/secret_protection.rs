use octo_core::{Params, QueryParams, SharedProvider, Translator};
use octo_toolsets::{ErrorContext, ParamSpec, Tool, ToolError, ToolRequest, ToolResult, ToolSpec};

use super::{json_result, owner_repo, repo_segments, rest, with_provider};

pub fn get_secret_scanning_alert(provider: &SharedProvider, t: &Translator) -> Tool {
    let spec = ToolSpec::new(
        "get_secret_scanning_alert",
        t.translate(
            "TOOL_GET_SECRET_SCANNING_ALERT_DESCRIPTION",
            "Get details of a specific secret scanning alert in a GitHub repository.",
        ),
    )
    .title(t.translate("TOOL_GET_SECRET_SCANNING_ALERT_USER_TITLE", "Get secret scanning alert"))
    .param(ParamSpec::string("owner", "The owner of the repository.").required())
    .param(ParamSpec::string("repo", "The name of the repository.").required())
    .param(ParamSpec::number("alertNumber", "The number of the alert.").required());
    Tool::new(spec, with_provider(provider, handle_get_secret_scanning_alert))
}

async fn handle_get_secret_scanning_alert(
    provider: SharedProvider,
    request: ToolRequest,
) -> Result<ToolResult, ToolError> {
    let params = Params::new(&request.arguments);
    let (owner, repo) = owner_repo(&params)?;
    let number = params.required_int("alertNumber")?.to_string();

    let client = rest(&provider, &request.context)?;
    let alert = client
        .get(
            &repo_segments(&owner, &repo, &["secret-scanning", "alerts", &number]),
            &QueryParams::new(),
        )
        .await
        .context("failed to get alert")?;
    json_result(&alert)
}

pub fn list_secret_scanning_alerts(provider: &SharedProvider, t: &Translator) -> Tool {
    let spec = ToolSpec::new(
        "list_secret_scanning_alerts",
        t.translate(
            "TOOL_LIST_SECRET_SCANNING_ALERTS_DESCRIPTION",
            "List secret scanning alerts in a GitHub repository.",
        ),
    )
    .title(t.translate("TOOL_LIST_SECRET_SCANNING_ALERTS_USER_TITLE", "List secret scanning alerts"))
    .param(ParamSpec::string("owner", "The owner of the repository.").required())
    .param(ParamSpec::string("repo", "The name of the repository.").required())
    .param(ParamSpec::string("state", "Filter by state").one_of(["open", "resolved"]))
    .param(ParamSpec::string(
        "secret_type",
        "A comma-separated list of secret types to return. All default secret patterns are returned.",
    ))
    .param(ParamSpec::string("resolution", "Filter by resolution").one_of([
        "false_positive",
        "wont_fix",
        "revoked",
        "pattern_edited",
        "pattern_deleted",
        "used_in_tests",
    ]));
    Tool::new(spec, with_provider(provider, handle_list_secret_scanning_alerts))
}

async fn handle_list_secret_scanning_alerts(
    provider: SharedProvider,
    request: ToolRequest,
) -> Result<ToolResult, ToolError> {
    let params = Params::new(&request.arguments);
    let (owner, repo) = owner_repo(&params)?;
    let query = QueryParams::new()
        .push_opt("state", params.optional_str("state")?)
        .push_opt("secret_type", params.optional_str("secret_type")?)
        .push_opt("resolution", params.optional_str("resolution")?);

    let client = rest(&provider, &request.context)?;
    let alerts = client
        .get(&repo_segments(&owner, &repo, &["secret-scanning", "alerts"]), &query)
        .await
        .context("failed to list alerts")?;
    json_result(&alerts)
}
