use octo_core::{Params, QueryParams, SharedProvider, Translator};
use octo_toolsets::{ErrorContext, ParamSpec, Tool, ToolError, ToolRequest, ToolResult, ToolSpec};

use super::{json_result, owner_repo, repo_segments, rest, with_provider};

pub fn get_code_scanning_alert(provider: &SharedProvider, t: &Translator) -> Tool {
    let spec = ToolSpec::new(
        "get_code_scanning_alert",
        t.translate(
            "TOOL_GET_CODE_SCANNING_ALERT_DESCRIPTION",
            "Get details of a specific code scanning alert in a GitHub repository.",
        ),
    )
    .title(t.translate("TOOL_GET_CODE_SCANNING_ALERT_USER_TITLE", "Get code scanning alert"))
    .param(ParamSpec::string("owner", "The owner of the repository.").required())
    .param(ParamSpec::string("repo", "The name of the repository.").required())
    .param(ParamSpec::number("alertNumber", "The number of the alert.").required());
    Tool::new(spec, with_provider(provider, handle_get_code_scanning_alert))
}

async fn handle_get_code_scanning_alert(
    provider: SharedProvider,
    request: ToolRequest,
) -> Result<ToolResult, ToolError> {
    let params = Params::new(&request.arguments);
    let (owner, repo) = owner_repo(&params)?;
    let number = params.required_int("alertNumber")?.to_string();

    let client = rest(&provider, &request.context)?;
    let alert = client
        .get(
            &repo_segments(&owner, &repo, &["code-scanning", "alerts", &number]),
            &QueryParams::new(),
        )
        .await
        .context("failed to get alert")?;
    json_result(&alert)
}

pub fn list_code_scanning_alerts(provider: &SharedProvider, t: &Translator) -> Tool {
    let spec = ToolSpec::new(
        "list_code_scanning_alerts",
        t.translate(
            "TOOL_LIST_CODE_SCANNING_ALERTS_DESCRIPTION",
            "List code scanning alerts in a GitHub repository.",
        ),
    )
    .title(t.translate("TOOL_LIST_CODE_SCANNING_ALERTS_USER_TITLE", "List code scanning alerts"))
    .param(ParamSpec::string("owner", "The owner of the repository.").required())
    .param(ParamSpec::string("repo", "The name of the repository.").required())
    .param(ParamSpec::string(
        "ref",
        "The Git reference for the results you want to list.",
    ))
    .param(
        ParamSpec::string("state", "Filter code scanning alerts by state. Defaults to open")
            .one_of(["open", "closed", "dismissed", "fixed"]),
    )
    .param(
        ParamSpec::string("severity", "Filter code scanning alerts by severity").one_of([
            "critical",
            "high",
            "medium",
            "low",
            "warning",
            "note",
            "error",
        ]),
    )
    .param(ParamSpec::string(
        "tool_name",
        "The name of the tool used for code scanning.",
    ));
    Tool::new(spec, with_provider(provider, handle_list_code_scanning_alerts))
}

async fn handle_list_code_scanning_alerts(
    provider: SharedProvider,
    request: ToolRequest,
) -> Result<ToolResult, ToolError> {
    let params = Params::new(&request.arguments);
    let (owner, repo) = owner_repo(&params)?;
    let query = QueryParams::new()
        .push_opt("ref", params.optional_str("ref")?)
        .push("state", params.optional_str("state")?.unwrap_or_else(|| "open".to_string()))
        .push_opt("severity", params.optional_str("severity")?)
        .push_opt("tool_name", params.optional_str("tool_name")?);

    let client = rest(&provider, &request.context)?;
    let alerts = client
        .get(&repo_segments(&owner, &repo, &["code-scanning", "alerts"]), &query)
        .await
        .context("failed to list alerts")?;
    json_result(&alerts)
}
