use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use octo_core::{
    FileLocation,
    Params,
    QueryParams,
    RawContentOpts,
    RawError,
    SharedProvider,
    Translator,
    fetch_raw_file,
};
use octo_toolsets::{
    ErrorContext,
    ParamSpec,
    ResourceContents,
    Tool,
    ToolContent,
    ToolError,
    ToolRequest,
    ToolResult,
    ToolSpec,
};
use reqwest::Method;
use serde_json::{Map, Value, json};

use super::{
    json_result,
    owner_param,
    owner_repo,
    path_segments,
    repo_param,
    repo_segments,
    rest,
    with_provider,
};

const FILE_NOT_FOUND: &str = "Failed to get file contents. The path does not point to a file or directory, or the file does not exist in the repository.";

pub fn search_repositories(provider: &SharedProvider, t: &Translator) -> Tool {
    let spec = ToolSpec::new(
        "search_repositories",
        t.translate("TOOL_SEARCH_REPOSITORIES_DESCRIPTION", "Search for GitHub repositories"),
    )
    .title(t.translate("TOOL_SEARCH_REPOSITORIES_USER_TITLE", "Search repositories"))
    .param(ParamSpec::string("query", "Search query").required())
    .paginated();
    Tool::new(spec, with_provider(provider, handle_search_repositories))
}

async fn handle_search_repositories(
    provider: SharedProvider,
    request: ToolRequest,
) -> Result<ToolResult, ToolError> {
    let params = Params::new(&request.arguments);
    let query = params.required_str("query")?;
    let pagination = params.pagination()?;

    let client = rest(&provider, &request.context)?;
    let result = client
        .get(
            &["search", "repositories"],
            &QueryParams::new().push("q", query).paginate(pagination),
        )
        .await
        .context("failed to search repositories")?;
    json_result(&result)
}

/// Reads a file through the raw content path, falling back to the contents
/// API for directories and paths the raw endpoint does not know.
pub fn get_file_contents(provider: &SharedProvider, t: &Translator) -> Tool {
    let spec = ToolSpec::new(
        "get_file_contents",
        t.translate(
            "TOOL_GET_FILE_CONTENTS_DESCRIPTION",
            "Get the contents of a file or directory from a GitHub repository",
        ),
    )
    .title(t.translate("TOOL_GET_FILE_CONTENTS_USER_TITLE", "Get file or directory contents"))
    .param(ParamSpec::string("owner", "Repository owner (username or organization)").required())
    .param(repo_param())
    .param(ParamSpec::string(
        "path",
        "Path to file/directory (directories must end with a slash '/')",
    ))
    .param(ParamSpec::string(
        "ref",
        "Accepts optional git refs such as `refs/tags/{tag}`, `refs/heads/{branch}` or `refs/pull/{pr_number}/head`",
    ))
    .param(ParamSpec::string(
        "sha",
        "Accepts optional git sha, if sha is specified it will be used instead of ref",
    ));
    Tool::new(spec, with_provider(provider, handle_get_file_contents))
}

async fn handle_get_file_contents(
    provider: SharedProvider,
    request: ToolRequest,
) -> Result<ToolResult, ToolError> {
    let params = Params::new(&request.arguments);
    let (owner, repo) = owner_repo(&params)?;
    let path = params
        .optional_str("path")?
        .unwrap_or_else(|| "/".to_string());
    let opts = RawContentOpts {
        git_ref: params.optional_str("ref")?,
        sha: params.optional_str("sha")?,
    };

    if !path.is_empty() && !path.ends_with('/') {
        let uri = resource_uri(&owner, &repo, &opts, &path);
        let location = FileLocation {
            owner: &owner,
            repo: &repo,
            path: &path,
        };
        match fetch_raw_file(provider.as_ref(), &request.context, &uri, location, &opts).await {
            Ok(contents) => {
                let message = if matches!(contents, ResourceContents::Text { .. }) {
                    "successfully downloaded text file"
                } else {
                    "successfully downloaded binary file"
                };
                return Ok(ToolResult {
                    content: vec![
                        ToolContent::Text(message.to_string()),
                        ToolContent::Resource(contents),
                    ],
                    is_error: false,
                });
            }
            Err(RawError::NotFound) => {}
            Err(err) => return Err(err.into()),
        }
    }

    let client = rest(&provider, &request.context)?;
    let mut segments = repo_segments(&owner, &repo, &["contents"]);
    segments.extend(path_segments(&path));
    let revision = non_empty(opts.sha.as_deref())
        .or_else(|| non_empty(opts.git_ref.as_deref()))
        .map(ToString::to_string);
    match client
        .get(&segments, &QueryParams::new().push_opt("ref", revision))
        .await
    {
        Ok(listing) => json_result(&listing),
        Err(err) if err.is_not_found() => Ok(ToolResult::error(FILE_NOT_FOUND)),
        Err(err) => Err(ToolError::failed("failed to get file contents", err)),
    }
}

/// Empty `sha` and `ref` count as absent, as in [`RawContentOpts::revision`].
fn resource_uri(owner: &str, repo: &str, opts: &RawContentOpts, path: &str) -> String {
    let path = path.trim_start_matches('/');
    if let Some(sha) = non_empty(opts.sha.as_deref()) {
        return format!("repo://{owner}/{repo}/sha/{sha}/contents/{path}");
    }
    if let Some(git_ref) = non_empty(opts.git_ref.as_deref()) {
        return format!("repo://{owner}/{repo}/{git_ref}/contents/{path}");
    }
    format!("repo://{owner}/{repo}/contents/{path}")
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|value| !value.is_empty())
}

pub fn list_commits(provider: &SharedProvider, t: &Translator) -> Tool {
    let spec = ToolSpec::new(
        "list_commits",
        t.translate(
            "TOOL_LIST_COMMITS_DESCRIPTION",
            "Get list of commits of a branch in a GitHub repository",
        ),
    )
    .title(t.translate("TOOL_LIST_COMMITS_USER_TITLE", "List commits"))
    .param(owner_param())
    .param(repo_param())
    .param(ParamSpec::string("sha", "SHA or Branch name"))
    .param(ParamSpec::string("author", "Author username or email address"))
    .paginated();
    Tool::new(spec, with_provider(provider, handle_list_commits))
}

async fn handle_list_commits(
    provider: SharedProvider,
    request: ToolRequest,
) -> Result<ToolResult, ToolError> {
    let params = Params::new(&request.arguments);
    let (owner, repo) = owner_repo(&params)?;
    let query = QueryParams::new()
        .push_opt("sha", params.optional_str("sha")?)
        .push_opt("author", params.optional_str("author")?)
        .paginate(params.pagination()?);

    let client = rest(&provider, &request.context)?;
    let commits = client
        .get(&repo_segments(&owner, &repo, &["commits"]), &query)
        .await
        .context("failed to list commits")?;
    json_result(&commits)
}

pub fn get_commit(provider: &SharedProvider, t: &Translator) -> Tool {
    let spec = ToolSpec::new(
        "get_commit",
        t.translate(
            "TOOL_GET_COMMITS_DESCRIPTION",
            "Get details for a commit from a GitHub repository",
        ),
    )
    .title(t.translate("TOOL_GET_COMMITS_USER_TITLE", "Get commit details"))
    .param(owner_param())
    .param(repo_param())
    .param(ParamSpec::string("sha", "Commit SHA, branch name, or tag name").required())
    .paginated();
    Tool::new(spec, with_provider(provider, handle_get_commit))
}

async fn handle_get_commit(
    provider: SharedProvider,
    request: ToolRequest,
) -> Result<ToolResult, ToolError> {
    let params = Params::new(&request.arguments);
    let (owner, repo) = owner_repo(&params)?;
    let sha = params.required_str("sha")?;
    let query = QueryParams::new().paginate(params.pagination()?);

    let client = rest(&provider, &request.context)?;
    let commit = client
        .get(&repo_segments(&owner, &repo, &["commits", &sha]), &query)
        .await
        .context(format!("failed to get commit: {sha}"))?;
    json_result(&commit)
}

pub fn list_branches(provider: &SharedProvider, t: &Translator) -> Tool {
    let spec = ToolSpec::new(
        "list_branches",
        t.translate(
            "TOOL_LIST_BRANCHES_DESCRIPTION",
            "List branches in a GitHub repository",
        ),
    )
    .title(t.translate("TOOL_LIST_BRANCHES_USER_TITLE", "List branches"))
    .param(owner_param())
    .param(repo_param())
    .paginated();
    Tool::new(spec, with_provider(provider, handle_list_branches))
}

async fn handle_list_branches(
    provider: SharedProvider,
    request: ToolRequest,
) -> Result<ToolResult, ToolError> {
    let params = Params::new(&request.arguments);
    let (owner, repo) = owner_repo(&params)?;
    let query = QueryParams::new().paginate(params.pagination()?);

    let client = rest(&provider, &request.context)?;
    let branches = client
        .get(&repo_segments(&owner, &repo, &["branches"]), &query)
        .await
        .context("failed to list branches")?;
    json_result(&branches)
}

pub fn list_tags(provider: &SharedProvider, t: &Translator) -> Tool {
    let spec = ToolSpec::new(
        "list_tags",
        t.translate("TOOL_LIST_TAGS_DESCRIPTION", "List git tags in a GitHub repository"),
    )
    .title(t.translate("TOOL_LIST_TAGS_USER_TITLE", "List tags"))
    .param(owner_param())
    .param(repo_param())
    .paginated();
    Tool::new(spec, with_provider(provider, handle_list_tags))
}

async fn handle_list_tags(
    provider: SharedProvider,
    request: ToolRequest,
) -> Result<ToolResult, ToolError> {
    let params = Params::new(&request.arguments);
    let (owner, repo) = owner_repo(&params)?;
    let query = QueryParams::new().paginate(params.pagination()?);

    let client = rest(&provider, &request.context)?;
    let tags = client
        .get(&repo_segments(&owner, &repo, &["tags"]), &query)
        .await
        .context("failed to list tags")?;
    json_result(&tags)
}

pub fn get_tag(provider: &SharedProvider, t: &Translator) -> Tool {
    let spec = ToolSpec::new(
        "get_tag",
        t.translate(
            "TOOL_GET_TAG_DESCRIPTION",
            "Get details about a specific git tag in a GitHub repository",
        ),
    )
    .title(t.translate("TOOL_GET_TAG_USER_TITLE", "Get tag details"))
    .param(owner_param())
    .param(repo_param())
    .param(ParamSpec::string("tag", "Tag name").required());
    Tool::new(spec, with_provider(provider, handle_get_tag))
}

async fn handle_get_tag(
    provider: SharedProvider,
    request: ToolRequest,
) -> Result<ToolResult, ToolError> {
    let params = Params::new(&request.arguments);
    let (owner, repo) = owner_repo(&params)?;
    let tag = params.required_str("tag")?;

    let client = rest(&provider, &request.context)?;
    let mut ref_segments = repo_segments(&owner, &repo, &["git", "ref", "tags"]);
    ref_segments.extend(path_segments(&tag));
    let tag_ref = client
        .get(&ref_segments, &QueryParams::new())
        .await
        .context("failed to get tag reference")?;
    let sha = tag_ref
        .pointer("/object/sha")
        .and_then(Value::as_str)
        .ok_or_else(|| ToolError::invalid_params(format!("tag {tag} has no target object")))?;

    let tag_object = client
        .get(
            &repo_segments(&owner, &repo, &["git", "tags", sha]),
            &QueryParams::new(),
        )
        .await
        .context("failed to get tag object")?;
    json_result(&tag_object)
}

pub fn search_code(provider: &SharedProvider, t: &Translator) -> Tool {
    let spec = ToolSpec::new(
        "search_code",
        t.translate(
            "TOOL_SEARCH_CODE_DESCRIPTION",
            "Search for code across GitHub repositories",
        ),
    )
    .title(t.translate("TOOL_SEARCH_CODE_USER_TITLE", "Search code"))
    .param(ParamSpec::string("q", "Search query using GitHub code search syntax").required())
    .param(ParamSpec::string("sort", "Sort field ('indexed' only)"))
    .param(ParamSpec::string("order", "Sort order").one_of(["asc", "desc"]))
    .paginated();
    Tool::new(spec, with_provider(provider, handle_search_code))
}

async fn handle_search_code(
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
        .get(&["search", "code"], &query)
        .await
        .context("failed to search code")?;
    json_result(&result)
}

pub fn create_or_update_file(provider: &SharedProvider, t: &Translator) -> Tool {
    let spec = ToolSpec::new(
        "create_or_update_file",
        t.translate(
            "TOOL_CREATE_OR_UPDATE_FILE_DESCRIPTION",
            "Create or update a single file in a GitHub repository. If updating, you must provide the SHA of the file you want to update.",
        ),
    )
    .title(t.translate("TOOL_CREATE_OR_UPDATE_FILE_USER_TITLE", "Create or update file"))
    .param(ParamSpec::string("owner", "Repository owner (username or organization)").required())
    .param(repo_param())
    .param(ParamSpec::string("path", "Path where to create/update the file").required())
    .param(ParamSpec::string("content", "Content of the file").required())
    .param(ParamSpec::string("message", "Commit message").required())
    .param(ParamSpec::string("branch", "Branch to create/update the file in").required())
    .param(ParamSpec::string(
        "sha",
        "SHA of file being replaced (for updates)",
    ));
    Tool::new(spec, with_provider(provider, handle_create_or_update_file))
}

async fn handle_create_or_update_file(
    provider: SharedProvider,
    request: ToolRequest,
) -> Result<ToolResult, ToolError> {
    let params = Params::new(&request.arguments);
    let (owner, repo) = owner_repo(&params)?;
    let path = params.required_str("path")?;
    let content = params.required_str("content")?;
    let message = params.required_str("message")?;
    let branch = params.required_str("branch")?;
    let sha = params.optional_str("sha")?;

    let mut body = json!({
        "message": message,
        "content": STANDARD.encode(content.as_bytes()),
        "branch": branch,
    });
    if let (Some(sha), Value::Object(map)) = (sha, &mut body) {
        map.insert("sha".to_string(), Value::String(sha));
    }

    let client = rest(&provider, &request.context)?;
    let mut segments = repo_segments(&owner, &repo, &["contents"]);
    segments.extend(path_segments(&path));
    let result = client
        .send(Method::PUT, &segments, Some(&body))
        .await
        .context("failed to create/update file")?;
    json_result(&result)
}

pub fn create_repository(provider: &SharedProvider, t: &Translator) -> Tool {
    let spec = ToolSpec::new(
        "create_repository",
        t.translate(
            "TOOL_CREATE_REPOSITORY_DESCRIPTION",
            "Create a new GitHub repository in your account",
        ),
    )
    .title(t.translate("TOOL_CREATE_REPOSITORY_USER_TITLE", "Create repository"))
    .param(ParamSpec::string("name", "Repository name").required())
    .param(ParamSpec::string("description", "Repository description"))
    .param(ParamSpec::boolean("private", "Whether repo should be private"))
    .param(ParamSpec::boolean("autoInit", "Initialize with README"));
    Tool::new(spec, with_provider(provider, handle_create_repository))
}

async fn handle_create_repository(
    provider: SharedProvider,
    request: ToolRequest,
) -> Result<ToolResult, ToolError> {
    let params = Params::new(&request.arguments);
    let body = json!({
        "name": params.required_str("name")?,
        "description": params.optional_str("description")?.unwrap_or_default(),
        "private": params.optional_bool("private")?,
        "auto_init": params.optional_bool("autoInit")?,
    });

    let client = rest(&provider, &request.context)?;
    let repository = client
        .send(Method::POST, &["user", "repos"], Some(&body))
        .await
        .context("failed to create repository")?;
    json_result(&repository)
}

pub fn fork_repository(provider: &SharedProvider, t: &Translator) -> Tool {
    let spec = ToolSpec::new(
        "fork_repository",
        t.translate(
            "TOOL_FORK_REPOSITORY_DESCRIPTION",
            "Fork a GitHub repository to your account or specified organization",
        ),
    )
    .title(t.translate("TOOL_FORK_REPOSITORY_USER_TITLE", "Fork repository"))
    .param(owner_param())
    .param(repo_param())
    .param(ParamSpec::string("organization", "Organization to fork to"));
    Tool::new(spec, with_provider(provider, handle_fork_repository))
}

async fn handle_fork_repository(
    provider: SharedProvider,
    request: ToolRequest,
) -> Result<ToolResult, ToolError> {
    let params = Params::new(&request.arguments);
    let (owner, repo) = owner_repo(&params)?;
    let mut body = Map::new();
    if let Some(organization) = params.optional_str("organization")? {
        body.insert("organization".to_string(), Value::String(organization));
    }

    let client = rest(&provider, &request.context)?;
    let fork = client
        .send(
            Method::POST,
            &repo_segments(&owner, &repo, &["forks"]),
            Some(&Value::Object(body)),
        )
        .await
        .context("failed to fork repository")?;
    json_result(&fork)
}

pub fn create_branch(provider: &SharedProvider, t: &Translator) -> Tool {
    let spec = ToolSpec::new(
        "create_branch",
        t.translate(
            "TOOL_CREATE_BRANCH_DESCRIPTION",
            "Create a new branch in a GitHub repository",
        ),
    )
    .title(t.translate("TOOL_CREATE_BRANCH_USER_TITLE", "Create branch"))
    .param(owner_param())
    .param(repo_param())
    .param(ParamSpec::string("branch", "Name for new branch").required())
    .param(ParamSpec::string(
        "from_branch",
        "Source branch (defaults to repo default)",
    ));
    Tool::new(spec, with_provider(provider, handle_create_branch))
}

async fn handle_create_branch(
    provider: SharedProvider,
    request: ToolRequest,
) -> Result<ToolResult, ToolError> {
    let params = Params::new(&request.arguments);
    let (owner, repo) = owner_repo(&params)?;
    let branch = params.required_str("branch")?;
    let from_branch = params.optional_str("from_branch")?;

    let client = rest(&provider, &request.context)?;
    let from_branch = match from_branch {
        Some(from_branch) => from_branch,
        None => {
            let repository = client
                .get(&repo_segments(&owner, &repo, &[]), &QueryParams::new())
                .await
                .context("failed to get repository")?;
            repository
                .get("default_branch")
                .and_then(Value::as_str)
                .map(str::to_string)
                .ok_or_else(|| {
                    ToolError::invalid_params("repository has no default branch; pass from_branch")
                })?
        }
    };

    let mut ref_segments = repo_segments(&owner, &repo, &["git", "ref", "heads"]);
    ref_segments.extend(path_segments(&from_branch));
    let source = client
        .get(&ref_segments, &QueryParams::new())
        .await
        .context("failed to get reference")?;
    let sha = source
        .pointer("/object/sha")
        .and_then(Value::as_str)
        .ok_or_else(|| ToolError::invalid_params(format!("branch {from_branch} has no commit")))?;

    let created = client
        .send(
            Method::POST,
            &repo_segments(&owner, &repo, &["git", "refs"]),
            Some(&json!({ "ref": format!("refs/heads/{branch}"), "sha": sha })),
        )
        .await
        .context("failed to create branch")?;
    json_result(&created)
}

pub fn delete_file(provider: &SharedProvider, t: &Translator) -> Tool {
    let spec = ToolSpec::new(
        "delete_file",
        t.translate(
            "TOOL_DELETE_FILE_DESCRIPTION",
            "Delete a file from a GitHub repository",
        ),
    )
    .title(t.translate("TOOL_DELETE_FILE_USER_TITLE", "Delete file"))
    .destructive()
    .param(ParamSpec::string("owner", "Repository owner (username or organization)").required())
    .param(repo_param())
    .param(ParamSpec::string("path", "Path to the file to delete").required())
    .param(ParamSpec::string("message", "Commit message").required())
    .param(ParamSpec::string("branch", "Branch to delete the file from").required());
    Tool::new(spec, with_provider(provider, handle_delete_file))
}

async fn handle_delete_file(
    provider: SharedProvider,
    request: ToolRequest,
) -> Result<ToolResult, ToolError> {
    let params = Params::new(&request.arguments);
    let (owner, repo) = owner_repo(&params)?;
    let path = params.required_str("path")?;
    let message = params.required_str("message")?;
    let branch = params.required_str("branch")?;

    let client = rest(&provider, &request.context)?;
    let mut segments = repo_segments(&owner, &repo, &["contents"]);
    segments.extend(path_segments(&path));
    let existing = client
        .get(&segments, &QueryParams::new().push("ref", &branch))
        .await
        .context("failed to get file")?;
    let sha = existing
        .get("sha")
        .and_then(Value::as_str)
        .ok_or_else(|| ToolError::invalid_params(format!("{path} is not a file")))?;

    let result = client
        .send(
            Method::DELETE,
            &segments,
            Some(&json!({ "message": message, "sha": sha, "branch": branch })),
        )
        .await
        .context("failed to delete file")?;
    json_result(&result)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resource_uri_prefers_sha() {
        let both = RawContentOpts {
            git_ref: Some("refs/heads/main".to_string()),
            sha: Some("abc123".to_string()),
        };
        assert_eq!(
            resource_uri("o", "r", &both, "src/lib.rs"),
            "repo://o/r/sha/abc123/contents/src/lib.rs"
        );
        assert_eq!(
            resource_uri("o", "r", &RawContentOpts::git_ref("refs/heads/main"), "/a.md"),
            "repo://o/r/refs/heads/main/contents/a.md"
        );
        assert_eq!(
            resource_uri("o", "r", &RawContentOpts::default(), "a.md"),
            "repo://o/r/contents/a.md"
        );
    }

    #[test]
    fn resource_uri_ignores_empty_revisions() {
        let empty = RawContentOpts {
            git_ref: Some(String::new()),
            sha: Some(String::new()),
        };
        assert_eq!(empty.revision(), "HEAD");
        assert_eq!(
            resource_uri("o", "r", &empty, "a.md"),
            "repo://o/r/contents/a.md"
        );

        let empty_sha = RawContentOpts {
            git_ref: Some("refs/tags/v1".to_string()),
            sha: Some(String::new()),
        };
        assert_eq!(empty_sha.revision(), "refs/tags/v1");
        assert_eq!(
            resource_uri("o", "r", &empty_sha, "a.md"),
            "repo://o/r/refs/tags/v1/contents/a.md"
        );
    }
}
