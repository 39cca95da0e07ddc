use octo_core::{Params, QueryParams, SharedProvider, Translator};
use octo_toolsets::{ErrorContext, ParamSpec, Tool, ToolError, ToolRequest, ToolResult, ToolSpec};
use reqwest::Method;
use serde_json::{Map, Value, json};

use super::{json_result, owner_param, owner_repo, repo_param, repo_segments, rest, with_provider};

pub fn get_issue(provider: &SharedProvider, t: &Translator) -> Tool {
    let spec = ToolSpec::new(
        "get_issue",
        t.translate(
            "TOOL_GET_ISSUE_DESCRIPTION",
            "Get details of a specific issue in a GitHub repository.",
        ),
    )
    .title(t.translate("TOOL_GET_ISSUE_USER_TITLE", "Get issue details"))
    .param(ParamSpec::string("owner", "The owner of the repository").required())
    .param(ParamSpec::string("repo", "The name of the repository").required())
    .param(ParamSpec::number("issue_number", "The number of the issue").required());
    Tool::new(spec, with_provider(provider, handle_get_issue))
}

async fn handle_get_issue(
    provider: SharedProvider,
    request: ToolRequest,
) -> Result<ToolResult, ToolError> {
    let params = Params::new(&request.arguments);
    let (owner, repo) = owner_repo(&params)?;
    let number = params.required_int("issue_number")?.to_string();

    let client = rest(&provider, &request.context)?;
    let issue = client
        .get(&repo_segments(&owner, &repo, &["issues", &number]), &QueryParams::new())
        .await
        .context("failed to get issue")?;
    json_result(&issue)
}

pub fn search_issues(provider: &SharedProvider, t: &Translator) -> Tool {
    let spec = ToolSpec::new(
        "search_issues",
        t.translate(
            "TOOL_SEARCH_ISSUES_DESCRIPTION",
            "Search for issues in GitHub repositories.",
        ),
    )
    .title(t.translate("TOOL_SEARCH_ISSUES_USER_TITLE", "Search issues"))
    .param(ParamSpec::string("q", "Search query using GitHub issues search syntax").required())
    .param(ParamSpec::string("sort", "Sort field by number of matches of categories, defaults to best match").one_of([
        "comments",
        "reactions",
        "reactions-+1",
        "reactions--1",
        "reactions-smile",
        "reactions-thinking_face",
        "reactions-heart",
        "reactions-tada",
        "interactions",
        "created",
        "updated",
    ]))
    .param(ParamSpec::string("order", "Sort order").one_of(["asc", "desc"]))
    .paginated();
    Tool::new(spec, with_provider(provider, handle_search_issues))
}

async fn handle_search_issues(
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
        .get(&["search", "issues"], &query)
        .await
        .context("failed to search issues")?;
    json_result(&result)
}

pub fn list_issues(provider: &SharedProvider, t: &Translator) -> Tool {
    let spec = ToolSpec::new(
        "list_issues",
        t.translate(
            "TOOL_LIST_ISSUES_DESCRIPTION",
            "List issues in a GitHub repository.",
        ),
    )
    .title(t.translate("TOOL_LIST_ISSUES_USER_TITLE", "List issues"))
    .param(owner_param())
    .param(repo_param())
    .param(ParamSpec::string("state", "Filter by state").one_of(["open", "closed", "all"]))
    .param(ParamSpec::string_array("labels", "Filter by labels"))
    .param(ParamSpec::string("sort", "Sort order").one_of(["created", "updated", "comments"]))
    .param(ParamSpec::string("direction", "Sort direction").one_of(["asc", "desc"]))
    .param(ParamSpec::string("since", "Filter by date (ISO 8601 timestamp)"))
    .paginated();
    Tool::new(spec, with_provider(provider, handle_list_issues))
}

async fn handle_list_issues(
    provider: SharedProvider,
    request: ToolRequest,
) -> Result<ToolResult, ToolError> {
    let params = Params::new(&request.arguments);
    let (owner, repo) = owner_repo(&params)?;
    let labels = params.optional_string_array("labels")?;
    let query = QueryParams::new()
        .push_opt("state", params.optional_str("state")?)
        .push_opt(
            "labels",
            (!labels.is_empty()).then(|| labels.join(",")),
        )
        .push_opt("sort", params.optional_str("sort")?)
        .push_opt("direction", params.optional_str("direction")?)
        .push_opt("since", params.optional_str("since")?)
        .paginate(params.pagination()?);

    let client = rest(&provider, &request.context)?;
    let issues = client
        .get(&repo_segments(&owner, &repo, &["issues"]), &query)
        .await
        .context("failed to list issues")?;
    json_result(&issues)
}

pub fn get_issue_comments(provider: &SharedProvider, t: &Translator) -> Tool {
    let spec = ToolSpec::new(
        "get_issue_comments",
        t.translate(
            "TOOL_GET_ISSUE_COMMENTS_DESCRIPTION",
            "Get comments for a specific issue in a GitHub repository.",
        ),
    )
    .title(t.translate("TOOL_GET_ISSUE_COMMENTS_USER_TITLE", "Get issue comments"))
    .param(owner_param())
    .param(repo_param())
    .param(ParamSpec::number("issue_number", "Issue number").required())
    .paginated();
    Tool::new(spec, with_provider(provider, handle_get_issue_comments))
}

async fn handle_get_issue_comments(
    provider: SharedProvider,
    request: ToolRequest,
) -> Result<ToolResult, ToolError> {
    let params = Params::new(&request.arguments);
    let (owner, repo) = owner_repo(&params)?;
    let number = params.required_int("issue_number")?.to_string();
    let query = QueryParams::new().paginate(params.pagination()?);

    let client = rest(&provider, &request.context)?;
    let comments = client
        .get(
            &repo_segments(&owner, &repo, &["issues", &number, "comments"]),
            &query,
        )
        .await
        .context("failed to get issue comments")?;
    json_result(&comments)
}

pub fn create_issue(provider: &SharedProvider, t: &Translator) -> Tool {
    let spec = ToolSpec::new(
        "create_issue",
        t.translate(
            "TOOL_CREATE_ISSUE_DESCRIPTION",
            "Create a new issue in a GitHub repository.",
        ),
    )
    .title(t.translate("TOOL_CREATE_ISSUE_USER_TITLE", "Open new issue"))
    .param(owner_param())
    .param(repo_param())
    .param(ParamSpec::string("title", "Issue title").required())
    .param(ParamSpec::string("body", "Issue body content"))
    .param(ParamSpec::string_array("assignees", "Usernames to assign to this issue"))
    .param(ParamSpec::string_array("labels", "Labels to apply to this issue"))
    .param(ParamSpec::number("milestone", "Milestone number"));
    Tool::new(spec, with_provider(provider, handle_create_issue))
}

async fn handle_create_issue(
    provider: SharedProvider,
    request: ToolRequest,
) -> Result<ToolResult, ToolError> {
    let params = Params::new(&request.arguments);
    let (owner, repo) = owner_repo(&params)?;
    let mut body = Map::new();
    body.insert("title".to_string(), Value::String(params.required_str("title")?));
    if let Some(text) = params.optional_str("body")? {
        body.insert("body".to_string(), Value::String(text));
    }
    body.insert("assignees".to_string(), json!(params.optional_string_array("assignees")?));
    body.insert("labels".to_string(), json!(params.optional_string_array("labels")?));
    if let Some(milestone) = params.optional_int("milestone")? {
        body.insert("milestone".to_string(), json!(milestone));
    }

    let client = rest(&provider, &request.context)?;
    let issue = client
        .send(
            Method::POST,
            &repo_segments(&owner, &repo, &["issues"]),
            Some(&Value::Object(body)),
        )
        .await
        .context("failed to create issue")?;
    json_result(&issue)
}

pub fn add_issue_comment(provider: &SharedProvider, t: &Translator) -> Tool {
    let spec = ToolSpec::new(
        "add_issue_comment",
        t.translate(
            "TOOL_ADD_ISSUE_COMMENT_DESCRIPTION",
            "Add a comment to a specific issue in a GitHub repository.",
        ),
    )
    .title(t.translate("TOOL_ADD_ISSUE_COMMENT_USER_TITLE", "Add comment to issue"))
    .param(owner_param())
    .param(repo_param())
    .param(ParamSpec::number("issue_number", "Issue number to comment on").required())
    .param(ParamSpec::string("body", "Comment content").required());
    Tool::new(spec, with_provider(provider, handle_add_issue_comment))
}

async fn handle_add_issue_comment(
    provider: SharedProvider,
    request: ToolRequest,
) -> Result<ToolResult, ToolError> {
    let params = Params::new(&request.arguments);
    let (owner, repo) = owner_repo(&params)?;
    let number = params.required_int("issue_number")?.to_string();
    let body = params.required_str("body")?;

    let client = rest(&provider, &request.context)?;
    let comment = client
        .send(
            Method::POST,
            &repo_segments(&owner, &repo, &["issues", &number, "comments"]),
            Some(&json!({ "body": body })),
        )
        .await
        .context("failed to create comment")?;
    json_result(&comment)
}

pub fn update_issue(provider: &SharedProvider, t: &Translator) -> Tool {
    let spec = ToolSpec::new(
        "update_issue",
        t.translate(
            "TOOL_UPDATE_ISSUE_DESCRIPTION",
            "Update an existing issue in a GitHub repository.",
        ),
    )
    .title(t.translate("TOOL_UPDATE_ISSUE_USER_TITLE", "Edit issue"))
    .param(owner_param())
    .param(repo_param())
    .param(ParamSpec::number("issue_number", "Issue number to update").required())
    .param(ParamSpec::string("title", "New title"))
    .param(ParamSpec::string("body", "New description"))
    .param(ParamSpec::string("state", "New state").one_of(["open", "closed"]))
    .param(ParamSpec::string_array("labels", "New labels"))
    .param(ParamSpec::string_array("assignees", "New assignees"))
    .param(ParamSpec::number("milestone", "New milestone number"));
    Tool::new(spec, with_provider(provider, handle_update_issue))
}

async fn handle_update_issue(
    provider: SharedProvider,
    request: ToolRequest,
) -> Result<ToolResult, ToolError> {
    let params = Params::new(&request.arguments);
    let (owner, repo) = owner_repo(&params)?;
    let number = params.required_int("issue_number")?.to_string();

    let mut body = Map::new();
    for field in ["title", "body", "state"] {
        if let Some(value) = params.optional_str(field)? {
            body.insert(field.to_string(), Value::String(value));
        }
    }
    for field in ["labels", "assignees"] {
        let values = params.optional_string_array(field)?;
        if !values.is_empty() {
            body.insert(field.to_string(), json!(values));
        }
    }
    if let Some(milestone) = params.optional_int("milestone")? {
        body.insert("milestone".to_string(), json!(milestone));
    }

    let client = rest(&provider, &request.context)?;
    let issue = client
        .send(
            Method::PATCH,
            &repo_segments(&owner, &repo, &["issues", &number]),
            Some(&Value::Object(body)),
        )
        .await
        .context("failed to update issue")?;
    json_result(&issue)
}
