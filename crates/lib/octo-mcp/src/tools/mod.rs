//! Tool handlers grouped by toolset.
//!
//! Each module exposes constructors returning [`Tool`] values bound to a
//! shared capability provider. Handlers read arguments through
//! [`Params`](octo_core::Params), call one or more platform endpoints, and
//! return the upstream JSON as text.

pub mod actions;
pub mod code_security;
pub mod context;
pub mod dynamic;
pub mod issues;
pub mod notifications;
pub mod projects;
pub mod pull_requests;
pub mod repos;
pub mod secret_protection;
pub mod users;

use std::future::Future;
use std::sync::Arc;

use octo_core::{GraphQlClient, ParamError, Params, RestClient, SharedProvider};
use octo_toolsets::{CallContext, ErrorContext, ParamSpec, ToolError, ToolRequest, ToolResult};
use serde::Serialize;

pub(crate) const DESCRIPTION_OWNER: &str = "Repository owner";
pub(crate) const DESCRIPTION_REPO: &str = "Repository name";

/// Binds an async handler to a provider, producing the closure shape
/// [`Tool::new`](octo_toolsets::Tool::new) expects.
pub(crate) fn with_provider<F, Fut>(
    provider: &SharedProvider,
    handler: F,
) -> impl Fn(ToolRequest) -> Fut + Send + Sync + 'static
where
    F: Fn(SharedProvider, ToolRequest) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<ToolResult, ToolError>> + Send + 'static,
{
    let provider = Arc::clone(provider);
    move |request: ToolRequest| handler(Arc::clone(&provider), request)
}

pub(crate) fn rest(provider: &SharedProvider, ctx: &CallContext) -> Result<RestClient, ToolError> {
    provider
        .rest_client(ctx)
        .context("failed to get GitHub client")
}

pub(crate) fn graphql(
    provider: &SharedProvider,
    ctx: &CallContext,
) -> Result<GraphQlClient, ToolError> {
    provider
        .graphql_client(ctx)
        .context("failed to get GitHub GraphQL client")
}

pub(crate) fn owner_param() -> ParamSpec {
    ParamSpec::string("owner", DESCRIPTION_OWNER).required()
}

pub(crate) fn repo_param() -> ParamSpec {
    ParamSpec::string("repo", DESCRIPTION_REPO).required()
}

pub(crate) fn owner_repo(params: &Params<'_>) -> Result<(String, String), ParamError> {
    Ok((params.required_str("owner")?, params.required_str("repo")?))
}

/// `repos/{owner}/{repo}/` followed by `rest`.
pub(crate) fn repo_segments(owner: &str, repo: &str, rest: &[&str]) -> Vec<String> {
    ["repos", owner, repo]
        .iter()
        .chain(rest)
        .map(|segment| (*segment).to_string())
        .collect()
}

/// Splits a slash-separated repository path into URL segments, dropping
/// empty components.
pub(crate) fn path_segments(path: &str) -> impl Iterator<Item = String> + '_ {
    path.split('/')
        .filter(|segment| !segment.is_empty())
        .map(str::to_string)
}

/// Serializes any value as the text payload of a successful result.
pub(crate) fn json_result<T: Serialize>(value: &T) -> Result<ToolResult, ToolError> {
    ToolResult::json(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repo_segments_prefix() {
        assert_eq!(
            repo_segments("octo", "hello", &["issues", "7"]),
            vec!["repos", "octo", "hello", "issues", "7"]
        );
    }

    #[test]
    fn path_segments_drop_empty_parts() {
        let segments: Vec<String> = path_segments("/docs//guide/intro.md").collect();
        assert_eq!(segments, vec!["docs", "guide", "intro.md"]);
    }
}
