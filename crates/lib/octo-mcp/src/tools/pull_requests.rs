use octo_core::client::DIFF_MEDIA_TYPE;
use octo_core::{Params, QueryParams, SharedProvider, Translator};
use octo_toolsets::{ErrorContext, ParamSpec, Tool, ToolError, ToolRequest, ToolResult, ToolSpec};
use reqwest::Method;
use serde_json::{Map, Value, json};

use super::{json_result, owner_param, owner_repo, repo_param, repo_segments, rest, with_provider};

fn pull_number_param() -> ParamSpec {
    ParamSpec::number("pullNumber", "Pull request number").required()
}

fn pull_segments(params: &Params<'_>, rest: &[&str]) -> Result<Vec<String>, ToolError> {
    let (owner, repo) = owner_repo(params)?;
    let number = params.required_int("pullNumber")?.to_string();
    let mut segments = repo_segments(&owner, &repo, &["pulls", &number]);
    segments.extend(rest.iter().map(|segment| (*segment).to_string()));
    Ok(segments)
}

pub fn get_pull_request(provider: &SharedProvider, t: &Translator) -> Tool {
    let spec = ToolSpec::new(
        "get_pull_request",
        t.translate(
            "TOOL_GET_PULL_REQUEST_DESCRIPTION",
            "Get details of a specific pull request in a GitHub repository.",
        ),
    )
    .title(t.translate("TOOL_GET_PULL_REQUEST_USER_TITLE", "Get pull request details"))
    .param(owner_param())
    .param(repo_param())
    .param(pull_number_param());
    Tool::new(spec, with_provider(provider, handle_get_pull_request))
}

async fn handle_get_pull_request(
    provider: SharedProvider,
    request: ToolRequest,
) -> Result<ToolResult, ToolError> {
    let params = Params::new(&request.arguments);
    let segments = pull_segments(&params, &[])?;

    let client = rest(&provider, &request.context)?;
    let pull = client
        .get(&segments, &QueryParams::new())
        .await
        .context("failed to get pull request")?;
    json_result(&pull)
}

pub fn list_pull_requests(provider: &SharedProvider, t: &Translator) -> Tool {
    let spec = ToolSpec::new(
        "list_pull_requests",
        t.translate(
            "TOOL_LIST_PULL_REQUESTS_DESCRIPTION",
            "List pull requests in a GitHub repository.",
        ),
    )
    .title(t.translate("TOOL_LIST_PULL_REQUESTS_USER_TITLE", "List pull requests"))
    .param(owner_param())
    .param(repo_param())
    .param(ParamSpec::string("state", "Filter by state").one_of(["open", "closed", "all"]))
    .param(ParamSpec::string("head", "Filter by head user/org and branch"))
    .param(ParamSpec::string("base", "Filter by base branch"))
    .param(ParamSpec::string("sort", "Sort by").one_of([
        "created",
        "updated",
        "popularity",
        "long-running",
    ]))
    .param(ParamSpec::string("direction", "Sort direction").one_of(["asc", "desc"]))
    .paginated();
    Tool::new(spec, with_provider(provider, handle_list_pull_requests))
}

async fn handle_list_pull_requests(
    provider: SharedProvider,
    request: ToolRequest,
) -> Result<ToolResult, ToolError> {
    let params = Params::new(&request.arguments);
    let (owner, repo) = owner_repo(&params)?;
    let mut query = QueryParams::new();
    for field in ["state", "head", "base", "sort", "direction"] {
        query = query.push_opt(field, params.optional_str(field)?);
    }
    let query = query.paginate(params.pagination()?);

    let client = rest(&provider, &request.context)?;
    let pulls = client
        .get(&repo_segments(&owner, &repo, &["pulls"]), &query)
        .await
        .context("failed to list pull requests")?;
    json_result(&pulls)
}

pub fn get_pull_request_files(provider: &SharedProvider, t: &Translator) -> Tool {
    let spec = ToolSpec::new(
        "get_pull_request_files",
        t.translate(
            "TOOL_GET_PULL_REQUEST_FILES_DESCRIPTION",
            "Get the files changed in a specific pull request.",
        ),
    )
    .title(t.translate("TOOL_GET_PULL_REQUEST_FILES_USER_TITLE", "Get pull request files"))
    .param(owner_param())
    .param(repo_param())
    .param(pull_number_param())
    .paginated();
    Tool::new(spec, with_provider(provider, handle_get_pull_request_files))
}

async fn handle_get_pull_request_files(
    provider: SharedProvider,
    request: ToolRequest,
) -> Result<ToolResult, ToolError> {
    let params = Params::new(&request.arguments);
    let segments = pull_segments(&params, &["files"])?;
    let query = QueryParams::new().paginate(params.pagination()?);

    let client = rest(&provider, &request.context)?;
    let files = client
        .get(&segments, &query)
        .await
        .context("failed to get pull request files")?;
    json_result(&files)
}

/// Combined commit status of the pull request's head commit.
pub fn get_pull_request_status(provider: &SharedProvider, t: &Translator) -> Tool {
    let spec = ToolSpec::new(
        "get_pull_request_status",
        t.translate(
            "TOOL_GET_PULL_REQUEST_STATUS_DESCRIPTION",
            "Get the status of a specific pull request.",
        ),
    )
    .title(t.translate("TOOL_GET_PULL_REQUEST_STATUS_USER_TITLE", "Get pull request status checks"))
    .param(owner_param())
    .param(repo_param())
    .param(pull_number_param());
    Tool::new(spec, with_provider(provider, handle_get_pull_request_status))
}

async fn handle_get_pull_request_status(
    provider: SharedProvider,
    request: ToolRequest,
) -> Result<ToolResult, ToolError> {
    let params = Params::new(&request.arguments);
    let (owner, repo) = owner_repo(&params)?;
    let segments = pull_segments(&params, &[])?;

    let client = rest(&provider, &request.context)?;
    let pull = client
        .get(&segments, &QueryParams::new())
        .await
        .context("failed to get pull request")?;
    let sha = pull
        .pointer("/head/sha")
        .and_then(Value::as_str)
        .ok_or_else(|| ToolError::invalid_params("pull request has no head commit"))?;

    let status = client
        .get(
            &repo_segments(&owner, &repo, &["commits", sha, "status"]),
            &QueryParams::new(),
        )
        .await
        .context("failed to get combined status")?;
    json_result(&status)
}

pub fn get_pull_request_comments(provider: &SharedProvider, t: &Translator) -> Tool {
    let spec = ToolSpec::new(
        "get_pull_request_comments",
        t.translate(
            "TOOL_GET_PULL_REQUEST_COMMENTS_DESCRIPTION",
            "Get comments for a specific pull request.",
        ),
    )
    .title(t.translate("TOOL_GET_PULL_REQUEST_COMMENTS_USER_TITLE", "Get pull request comments"))
    .param(owner_param())
    .param(repo_param())
    .param(pull_number_param());
    Tool::new(spec, with_provider(provider, handle_get_pull_request_comments))
}

async fn handle_get_pull_request_comments(
    provider: SharedProvider,
    request: ToolRequest,
) -> Result<ToolResult, ToolError> {
    let params = Params::new(&request.arguments);
    let segments = pull_segments(&params, &["comments"])?;

    let client = rest(&provider, &request.context)?;
    let comments = client
        .get(&segments, &QueryParams::new().push("per_page", 100))
        .await
        .context("failed to get pull request comments")?;
    json_result(&comments)
}

pub fn get_pull_request_reviews(provider: &SharedProvider, t: &Translator) -> Tool {
    let spec = ToolSpec::new(
        "get_pull_request_reviews",
        t.translate(
            "TOOL_GET_PULL_REQUEST_REVIEWS_DESCRIPTION",
            "Get reviews for a specific pull request.",
        ),
    )
    .title(t.translate("TOOL_GET_PULL_REQUEST_REVIEWS_USER_TITLE", "Get pull request reviews"))
    .param(owner_param())
    .param(repo_param())
    .param(pull_number_param());
    Tool::new(spec, with_provider(provider, handle_get_pull_request_reviews))
}

async fn handle_get_pull_request_reviews(
    provider: SharedProvider,
    request: ToolRequest,
) -> Result<ToolResult, ToolError> {
    let params = Params::new(&request.arguments);
    let segments = pull_segments(&params, &["reviews"])?;

    let client = rest(&provider, &request.context)?;
    let reviews = client
        .get(&segments, &QueryParams::new())
        .await
        .context("failed to get pull request reviews")?;
    json_result(&reviews)
}

/// Unified diff, returned verbatim rather than as JSON.
pub fn get_pull_request_diff(provider: &SharedProvider, t: &Translator) -> Tool {
    let spec = ToolSpec::new(
        "get_pull_request_diff",
        t.translate(
            "TOOL_GET_PULL_REQUEST_DIFF_DESCRIPTION",
            "Get the diff of a pull request.",
        ),
    )
    .title(t.translate("TOOL_GET_PULL_REQUEST_DIFF_USER_TITLE", "Get pull request diff"))
    .param(owner_param())
    .param(repo_param())
    .param(pull_number_param());
    Tool::new(spec, with_provider(provider, handle_get_pull_request_diff))
}

async fn handle_get_pull_request_diff(
    provider: SharedProvider,
    request: ToolRequest,
) -> Result<ToolResult, ToolError> {
    let params = Params::new(&request.arguments);
    let segments = pull_segments(&params, &[])?;

    let client = rest(&provider, &request.context)?;
    let diff = client
        .get_text(&segments, DIFF_MEDIA_TYPE)
        .await
        .context("failed to get pull request diff")?;
    Ok(ToolResult::text(diff))
}

pub fn merge_pull_request(provider: &SharedProvider, t: &Translator) -> Tool {
    let spec = ToolSpec::new(
        "merge_pull_request",
        t.translate(
            "TOOL_MERGE_PULL_REQUEST_DESCRIPTION",
            "Merge a pull request in a GitHub repository.",
        ),
    )
    .title(t.translate("TOOL_MERGE_PULL_REQUEST_USER_TITLE", "Merge pull request"))
    .param(owner_param())
    .param(repo_param())
    .param(pull_number_param())
    .param(ParamSpec::string("commit_title", "Title for merge commit"))
    .param(ParamSpec::string("commit_message", "Extra detail for merge commit"))
    .param(ParamSpec::string("merge_method", "Merge method").one_of(["merge", "squash", "rebase"]));
    Tool::new(spec, with_provider(provider, handle_merge_pull_request))
}

async fn handle_merge_pull_request(
    provider: SharedProvider,
    request: ToolRequest,
) -> Result<ToolResult, ToolError> {
    let params = Params::new(&request.arguments);
    let segments = pull_segments(&params, &["merge"])?;
    let mut body = Map::new();
    for field in ["commit_title", "commit_message", "merge_method"] {
        if let Some(value) = params.optional_str(field)? {
            body.insert(field.to_string(), Value::String(value));
        }
    }

    let client = rest(&provider, &request.context)?;
    let result = client
        .send(Method::PUT, &segments, Some(&Value::Object(body)))
        .await
        .context("failed to merge pull request")?;
    json_result(&result)
}

pub fn update_pull_request_branch(provider: &SharedProvider, t: &Translator) -> Tool {
    let spec = ToolSpec::new(
        "update_pull_request_branch",
        t.translate(
            "TOOL_UPDATE_PULL_REQUEST_BRANCH_DESCRIPTION",
            "Update the branch of a pull request with the latest changes from the base branch.",
        ),
    )
    .title(t.translate("TOOL_UPDATE_PULL_REQUEST_BRANCH_USER_TITLE", "Update pull request branch"))
    .param(owner_param())
    .param(repo_param())
    .param(pull_number_param())
    .param(ParamSpec::string(
        "expectedHeadSha",
        "The expected SHA of the pull request's HEAD ref",
    ));
    Tool::new(spec, with_provider(provider, handle_update_pull_request_branch))
}

async fn handle_update_pull_request_branch(
    provider: SharedProvider,
    request: ToolRequest,
) -> Result<ToolResult, ToolError> {
    let params = Params::new(&request.arguments);
    let segments = pull_segments(&params, &["update-branch"])?;
    let mut body = Map::new();
    if let Some(sha) = params.optional_str("expectedHeadSha")? {
        body.insert("expected_head_sha".to_string(), Value::String(sha));
    }

    let client = rest(&provider, &request.context)?;
    let result = client
        .send(Method::PUT, &segments, Some(&Value::Object(body)))
        .await
        .context("failed to update pull request branch")?;
    json_result(&result)
}

pub fn create_pull_request(provider: &SharedProvider, t: &Translator) -> Tool {
    let spec = ToolSpec::new(
        "create_pull_request",
        t.translate(
            "TOOL_CREATE_PULL_REQUEST_DESCRIPTION",
            "Create a new pull request in a GitHub repository.",
        ),
    )
    .title(t.translate("TOOL_CREATE_PULL_REQUEST_USER_TITLE", "Open new pull request"))
    .param(owner_param())
    .param(repo_param())
    .param(ParamSpec::string("title", "PR title").required())
    .param(ParamSpec::string("body", "PR description"))
    .param(ParamSpec::string("head", "Branch containing changes").required())
    .param(ParamSpec::string("base", "Branch to merge into").required())
    .param(ParamSpec::boolean("draft", "Create as draft PR"))
    .param(ParamSpec::boolean(
        "maintainer_can_modify",
        "Allow maintainer edits",
    ));
    Tool::new(spec, with_provider(provider, handle_create_pull_request))
}

async fn handle_create_pull_request(
    provider: SharedProvider,
    request: ToolRequest,
) -> Result<ToolResult, ToolError> {
    let params = Params::new(&request.arguments);
    let (owner, repo) = owner_repo(&params)?;
    let body = json!({
        "title": params.required_str("title")?,
        "body": params.optional_str("body")?.unwrap_or_default(),
        "head": params.required_str("head")?,
        "base": params.required_str("base")?,
        "draft": params.optional_bool("draft")?,
        "maintainer_can_modify": params.optional_bool("maintainer_can_modify")?,
    });

    let client = rest(&provider, &request.context)?;
    let pull = client
        .send(
            Method::POST,
            &repo_segments(&owner, &repo, &["pulls"]),
            Some(&body),
        )
        .await
        .context("failed to create pull request")?;
    json_result(&pull)
}

pub fn update_pull_request(provider: &SharedProvider, t: &Translator) -> Tool {
    let spec = ToolSpec::new(
        "update_pull_request",
        t.translate(
            "TOOL_UPDATE_PULL_REQUEST_DESCRIPTION",
            "Update an existing pull request in a GitHub repository.",
        ),
    )
    .title(t.translate("TOOL_UPDATE_PULL_REQUEST_USER_TITLE", "Edit pull request"))
    .param(owner_param())
    .param(repo_param())
    .param(pull_number_param())
    .param(ParamSpec::string("title", "New title"))
    .param(ParamSpec::string("body", "New description"))
    .param(ParamSpec::string("state", "New state").one_of(["open", "closed"]))
    .param(ParamSpec::string("base", "New base branch name"))
    .param(ParamSpec::boolean(
        "maintainer_can_modify",
        "Allow maintainer edits",
    ));
    Tool::new(spec, with_provider(provider, handle_update_pull_request))
}

async fn handle_update_pull_request(
    provider: SharedProvider,
    request: ToolRequest,
) -> Result<ToolResult, ToolError> {
    let params = Params::new(&request.arguments);
    let segments = pull_segments(&params, &[])?;

    let mut body = Map::new();
    for field in ["title", "body", "state", "base"] {
        if let Some(value) = params.optional_str(field)? {
            body.insert(field.to_string(), Value::String(value));
        }
    }
    if params.raw("maintainer_can_modify").is_some() {
        body.insert(
            "maintainer_can_modify".to_string(),
            Value::Bool(params.optional_bool("maintainer_can_modify")?),
        );
    }
    if body.is_empty() {
        return Ok(ToolResult::error("No update parameters provided."));
    }

    let client = rest(&provider, &request.context)?;
    let pull = client
        .send(Method::PATCH, &segments, Some(&Value::Object(body)))
        .await
        .context("failed to update pull request")?;
    json_result(&pull)
}
