//! `repo://` resource templates serving repository files through the raw
//! content resolver.

use octo_core::{FileLocation, RefSelector, SharedProvider, Translator, fetch_repository_file};
use octo_toolsets::{ResourceContents, ResourceRequest, ServerResourceTemplate, ToolError};

pub const CONTENT_TEMPLATE: &str = "repo://{owner}/{repo}/contents{/path*}";
pub const BRANCH_TEMPLATE: &str = "repo://{owner}/{repo}/refs/heads/{branch}/contents{/path*}";
pub const COMMIT_TEMPLATE: &str = "repo://{owner}/{repo}/sha/{sha}/contents{/path*}";
pub const TAG_TEMPLATE: &str = "repo://{owner}/{repo}/refs/tags/{tag}/contents{/path*}";
pub const PULL_REQUEST_TEMPLATE: &str =
    "repo://{owner}/{repo}/refs/pull/{prNumber}/head/contents{/path*}";

/// The five repository content templates, default branch first.
pub fn repository_resource_templates(
    provider: &SharedProvider,
    t: &Translator,
) -> Vec<ServerResourceTemplate> {
    [
        (
            CONTENT_TEMPLATE,
            "RESOURCE_REPOSITORY_CONTENT_DESCRIPTION",
            "Repository Content",
        ),
        (
            BRANCH_TEMPLATE,
            "RESOURCE_REPOSITORY_CONTENT_BRANCH_DESCRIPTION",
            "Repository Content for specific branch",
        ),
        (
            COMMIT_TEMPLATE,
            "RESOURCE_REPOSITORY_CONTENT_COMMIT_DESCRIPTION",
            "Repository Content for specific commit",
        ),
        (
            TAG_TEMPLATE,
            "RESOURCE_REPOSITORY_CONTENT_TAG_DESCRIPTION",
            "Repository Content for specific tag",
        ),
        (
            PULL_REQUEST_TEMPLATE,
            "RESOURCE_REPOSITORY_CONTENT_PR_DESCRIPTION",
            "Repository Content for specific pull request",
        ),
    ]
    .into_iter()
    .map(|(template, key, default)| {
        let provider = SharedProvider::clone(provider);
        ServerResourceTemplate::new(template, t.translate(key, default), move |request| {
            read_repository_content(SharedProvider::clone(&provider), request)
        })
    })
    .collect()
}

async fn read_repository_content(
    provider: SharedProvider,
    request: ResourceRequest,
) -> Result<Vec<ResourceContents>, ToolError> {
    let owner = request
        .first("owner")
        .ok_or_else(|| ToolError::invalid_params("owner is required"))?;
    let repo = request
        .first("repo")
        .ok_or_else(|| ToolError::invalid_params("repo is required"))?;
    let path = request.joined("path").unwrap_or_default();
    let selector = RefSelector::from_parts(
        request.first("sha"),
        request.first("branch"),
        request.first("tag"),
        request.first("prNumber"),
    )?;

    let location = FileLocation {
        owner,
        repo,
        path: &path,
    };
    let contents = fetch_repository_file(
        provider.as_ref(),
        &request.context,
        &request.uri,
        location,
        &selector,
    )
    .await?;
    Ok(vec![contents])
}

#[cfg(test)]
mod tests {
    use octo_toolsets::UriTemplate;

    use super::*;

    #[test]
    fn every_selector_has_its_own_template() {
        let cases = [
            ("repo://o/r/contents/README.md", CONTENT_TEMPLATE),
            ("repo://o/r/refs/heads/main/contents/README.md", BRANCH_TEMPLATE),
            ("repo://o/r/sha/abc123/contents/README.md", COMMIT_TEMPLATE),
            ("repo://o/r/refs/tags/v1.0/contents/README.md", TAG_TEMPLATE),
            ("repo://o/r/refs/pull/42/head/contents/README.md", PULL_REQUEST_TEMPLATE),
        ];
        let all = [
            CONTENT_TEMPLATE,
            BRANCH_TEMPLATE,
            COMMIT_TEMPLATE,
            TAG_TEMPLATE,
            PULL_REQUEST_TEMPLATE,
        ];

        for (uri, expected) in cases {
            let matching: Vec<&str> = all
                .iter()
                .copied()
                .filter(|template| UriTemplate::parse(template).matches(uri).is_some())
                .collect();
            assert_eq!(matching, vec![expected], "{uri}");
        }
    }
}
