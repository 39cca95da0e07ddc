//! Raw content resolution: reference selectors, fetching, and text/blob classification.

use std::error::Error;
use std::fmt;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use octo_toolsets::{CallContext, ResourceContents, ToolError};
use reqwest::StatusCode;
use reqwest::header::CONTENT_TYPE;

use crate::client::{ApiError, QueryParams, RawContentOpts};
use crate::provider::{CapabilityProvider, ProviderError};

const MARKDOWN_MIME: &str = "text/markdown";

/// Revision a repository file is read at.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum RefSelector {
    /// The repository's default branch.
    #[default]
    Head,
    Branch(String),
    Tag(String),
    Sha(String),
    PullRequest(u64),
}

impl RefSelector {
    /// Builds a selector from at most one of the optional inputs. Empty strings
    /// count as absent.
    ///
    /// # Errors
    /// Returns [`RawError::InvalidSelector`] when more than one selector is set
    /// or the pull request number is not a positive integer.
    pub fn from_parts(
        sha: Option<&str>,
        branch: Option<&str>,
        tag: Option<&str>,
        pr_number: Option<&str>,
    ) -> Result<Self, RawError> {
        let mut selected = Vec::with_capacity(1);
        if let Some(sha) = present(sha) {
            selected.push(Self::Sha(sha.to_string()));
        }
        if let Some(branch) = present(branch) {
            selected.push(Self::Branch(branch.to_string()));
        }
        if let Some(tag) = present(tag) {
            selected.push(Self::Tag(tag.to_string()));
        }
        if let Some(number) = present(pr_number) {
            let parsed = number
                .parse::<u64>()
                .ok()
                .filter(|number| *number > 0)
                .ok_or_else(|| {
                    RawError::InvalidSelector(format!("invalid pull request number: {number}"))
                })?;
            selected.push(Self::PullRequest(parsed));
        }

        match selected.len() {
            0 => Ok(Self::Head),
            1 => Ok(selected.remove(0)),
            _ => Err(RawError::InvalidSelector(
                "only one of sha, branch, tag, or pull request may be given".to_string(),
            )),
        }
    }

    /// Collapses the selector into the `sha`/`ref` pair used by the raw URL
    /// builder. A pull request is looked up to find its head commit.
    ///
    /// # Errors
    /// Returns [`RawError::Provider`] or [`RawError::PullRequestLookup`] when
    /// the pull request cannot be read.
    pub async fn resolve(
        &self,
        provider: &dyn CapabilityProvider,
        ctx: &CallContext,
        owner: &str,
        repo: &str,
    ) -> Result<RawContentOpts, RawError> {
        match self {
            Self::Head => Ok(RawContentOpts::default()),
            Self::Branch(branch) => Ok(RawContentOpts::git_ref(format!("refs/heads/{branch}"))),
            Self::Tag(tag) => Ok(RawContentOpts::git_ref(format!("refs/tags/{tag}"))),
            Self::Sha(sha) => Ok(RawContentOpts::sha(sha.clone())),
            Self::PullRequest(number) => {
                let client = provider.rest_client(ctx).map_err(RawError::Provider)?;
                let segment = number.to_string();
                let pull = client
                    .get(
                        &["repos", owner, repo, "pulls", segment.as_str()],
                        &QueryParams::new(),
                    )
                    .await
                    .map_err(RawError::PullRequestLookup)?;
                let sha = pull
                    .pointer("/head/sha")
                    .and_then(serde_json::Value::as_str)
                    .filter(|sha| !sha.is_empty())
                    .ok_or(RawError::MissingHead(*number))?;
                Ok(RawContentOpts::sha(sha))
            }
        }
    }
}

fn present(value: Option<&str>) -> Option<&str> {
    value.filter(|value| !value.is_empty())
}

#[derive(Debug)]
pub enum RawError {
    Directory(String),
    InvalidSelector(String),
    Provider(ProviderError),
    PullRequestLookup(ApiError),
    MissingHead(u64),
    NotFound,
    Upstream { status: u16, body: String },
    Api(ApiError),
}

impl fmt::Display for RawError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Directory(path) => write!(f, "directories are not supported: {path}"),
            Self::InvalidSelector(message) => write!(f, "{message}"),
            Self::Provider(err) => write!(f, "failed to get client: {err}"),
            Self::PullRequestLookup(err) => write!(f, "failed to get pull request: {err}"),
            Self::MissingHead(number) => write!(f, "pull request {number} has no head commit"),
            Self::NotFound => write!(f, "404 Not Found"),
            Self::Upstream { body, .. } => write!(f, "failed to fetch raw content: {body}"),
            Self::Api(err) => write!(f, "failed to get raw content: {err}"),
        }
    }
}

impl Error for RawError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Provider(err) => Some(err),
            Self::PullRequestLookup(err) | Self::Api(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RawError> for ToolError {
    fn from(err: RawError) -> Self {
        match err {
            RawError::Directory(_) | RawError::InvalidSelector(_) => {
                Self::InvalidParams(err.to_string())
            }
            RawError::NotFound => Self::NotFound(err.to_string()),
            RawError::Provider(err) => Self::failed("failed to get client", err),
            RawError::PullRequestLookup(err) => Self::failed("failed to get pull request", err),
            RawError::MissingHead(number) => Self::failed(
                "failed to get pull request",
                format!("pull request {number} has no head commit"),
            ),
            RawError::Upstream { body, .. } => Self::failed("failed to fetch raw content", body),
            RawError::Api(err) => Self::failed("failed to get raw content", err),
        }
    }
}

/// Picks the MIME type for a fetched file.
///
/// `.md` always maps to `text/markdown`; otherwise a non-empty `Content-Type`
/// wins, then an extension lookup. The `.md` check is case-sensitive, so
/// `README.MD` is typed by its header like any other file.
#[must_use]
pub fn resolve_mime_type(path: &str, content_type: Option<&str>) -> Option<String> {
    if extension(path) == Some("md") {
        return Some(MARKDOWN_MIME.to_string());
    }
    content_type
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
        .or_else(|| {
            mime_guess::from_path(path)
                .first_raw()
                .map(str::to_string)
        })
}

/// Text after the last `.` of the final path segment, case preserved.
fn extension(path: &str) -> Option<&str> {
    let file = path.rsplit('/').next().unwrap_or(path);
    file.rfind('.').map(|idx| &file[idx + 1..])
}

/// `text/*` and `application/*` are served as text, everything else as base64.
#[must_use]
pub fn is_textual(mime_type: Option<&str>) -> bool {
    mime_type.is_some_and(|mime| mime.starts_with("text") || mime.starts_with("application"))
}

#[must_use]
pub fn classify(uri: &str, mime_type: Option<String>, bytes: &[u8]) -> ResourceContents {
    if is_textual(mime_type.as_deref()) {
        ResourceContents::Text {
            uri: uri.to_string(),
            mime_type,
            text: String::from_utf8_lossy(bytes).into_owned(),
        }
    } else {
        ResourceContents::Blob {
            uri: uri.to_string(),
            mime_type,
            blob: STANDARD.encode(bytes),
        }
    }
}

/// Location of a single repository file.
#[derive(Debug, Clone, Copy)]
pub struct FileLocation<'a> {
    pub owner: &'a str,
    pub repo: &'a str,
    pub path: &'a str,
}

/// Fetches one repository file at the revision chosen by `selector`.
///
/// Paths that are empty or end in `/` are rejected before any request is made.
///
/// # Errors
/// Returns [`RawError::NotFound`] on a 404, [`RawError::Upstream`] carrying the
/// body for any other non-200 status, and [`RawError::Directory`] for
/// directory paths.
pub async fn fetch_repository_file(
    provider: &dyn CapabilityProvider,
    ctx: &CallContext,
    uri: &str,
    location: FileLocation<'_>,
    selector: &RefSelector,
) -> Result<ResourceContents, RawError> {
    ensure_file_path(location.path)?;
    let opts = selector
        .resolve(provider, ctx, location.owner, location.repo)
        .await?;
    fetch_raw_file(provider, ctx, uri, location, &opts).await
}

/// Fetches one repository file at an already resolved revision and classifies it.
///
/// # Errors
/// Same as [`fetch_repository_file`], minus selector resolution.
pub async fn fetch_raw_file(
    provider: &dyn CapabilityProvider,
    ctx: &CallContext,
    uri: &str,
    location: FileLocation<'_>,
    opts: &RawContentOpts,
) -> Result<ResourceContents, RawError> {
    let FileLocation { owner, repo, path } = location;
    ensure_file_path(path)?;

    let client = provider.raw_client(ctx).map_err(RawError::Provider)?;
    let response = client
        .get_raw_content(owner, repo, path, opts)
        .await
        .map_err(RawError::Api)?;

    let status = response.status();
    if status == StatusCode::OK {
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        let bytes = response
            .bytes()
            .await
            .map_err(|err| RawError::Api(err.into()))?;
        let mime_type = resolve_mime_type(path, content_type.as_deref());
        tracing::debug!(owner, repo, path, mime = ?mime_type, size = bytes.len(), "fetched raw content");
        return Ok(classify(uri, mime_type, &bytes));
    }
    if status == StatusCode::NOT_FOUND {
        return Err(RawError::NotFound);
    }
    let body = response
        .text()
        .await
        .map_err(|err| RawError::Api(err.into()))?;
    Err(RawError::Upstream {
        status: status.as_u16(),
        body,
    })
}

fn ensure_file_path(path: &str) -> Result<(), RawError> {
    if path.is_empty() || path.ends_with('/') {
        return Err(RawError::Directory(path.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::ApiHost;
    use crate::provider::GitHubProvider;

    #[test]
    fn markdown_extension_overrides_header() {
        assert_eq!(
            resolve_mime_type("docs/README.md", Some("text/plain")).as_deref(),
            Some("text/markdown")
        );
        assert_eq!(
            resolve_mime_type("data.png", Some("image/png")).as_deref(),
            Some("image/png")
        );
        assert_eq!(
            resolve_mime_type("notes.txt", Some("")).as_deref(),
            Some("text/plain")
        );
        assert_eq!(resolve_mime_type("logo.png", None).as_deref(), Some("image/png"));
        assert_eq!(resolve_mime_type("Makefile", None), None);
    }

    #[test]
    fn markdown_check_is_case_sensitive() {
        assert_eq!(
            resolve_mime_type("README.MD", Some("text/plain; charset=utf-8")).as_deref(),
            Some("text/plain; charset=utf-8")
        );
        assert_eq!(
            resolve_mime_type("notes.Md", Some("text/plain")).as_deref(),
            Some("text/plain")
        );
    }

    #[test]
    fn classification_splits_text_and_blob() {
        let text = classify("repo://o/r/contents/a.json", Some("application/json".into()), b"{}");
        assert_eq!(
            text,
            ResourceContents::Text {
                uri: "repo://o/r/contents/a.json".to_string(),
                mime_type: Some("application/json".to_string()),
                text: "{}".to_string(),
            }
        );

        let blob = classify("repo://o/r/contents/a.png", Some("image/png".into()), &[0x89, 0x50]);
        assert_eq!(
            blob,
            ResourceContents::Blob {
                uri: "repo://o/r/contents/a.png".to_string(),
                mime_type: Some("image/png".to_string()),
                blob: "iVA=".to_string(),
            }
        );

        assert!(matches!(
            classify("repo://o/r/contents/x", None, b"abc"),
            ResourceContents::Blob { .. }
        ));
    }

    #[test]
    fn selector_from_parts() {
        assert_eq!(
            RefSelector::from_parts(None, None, None, None).unwrap(),
            RefSelector::Head
        );
        assert_eq!(
            RefSelector::from_parts(Some(""), Some("main"), None, None).unwrap(),
            RefSelector::Branch("main".to_string())
        );
        assert_eq!(
            RefSelector::from_parts(None, None, None, Some("42")).unwrap(),
            RefSelector::PullRequest(42)
        );
        assert!(matches!(
            RefSelector::from_parts(None, None, None, Some("forty")),
            Err(RawError::InvalidSelector(message)) if message == "invalid pull request number: forty"
        ));
        assert!(matches!(
            RefSelector::from_parts(Some("abc"), Some("main"), None, None),
            Err(RawError::InvalidSelector(_))
        ));
    }

    #[tokio::test]
    async fn simple_selectors_resolve_without_lookup() {
        let provider = GitHubProvider::new(
            ApiHost::from_urls("http://127.0.0.1:9/", "http://127.0.0.1:9/graphql", "http://127.0.0.1:9/raw/")
                .unwrap(),
            Some("token".to_string()),
        )
        .unwrap();
        let ctx = CallContext::default();

        let branch = RefSelector::Branch("main".to_string())
            .resolve(&provider, &ctx, "o", "r")
            .await
            .unwrap();
        assert_eq!(branch, RawContentOpts::git_ref("refs/heads/main"));

        let tag = RefSelector::Tag("v1".to_string())
            .resolve(&provider, &ctx, "o", "r")
            .await
            .unwrap();
        assert_eq!(tag, RawContentOpts::git_ref("refs/tags/v1"));
    }

    #[tokio::test]
    async fn directories_are_rejected_up_front() {
        let provider = GitHubProvider::new(
            ApiHost::from_urls("http://127.0.0.1:9/", "http://127.0.0.1:9/graphql", "http://127.0.0.1:9/raw/")
                .unwrap(),
            Some("token".to_string()),
        )
        .unwrap();
        let location = FileLocation {
            owner: "o",
            repo: "r",
            path: "src/",
        };
        let err = fetch_repository_file(
            &provider,
            &CallContext::default(),
            "repo://o/r/contents/src/",
            location,
            &RefSelector::PullRequest(7),
        )
        .await
        .unwrap_err();
        assert_eq!(err.to_string(), "directories are not supported: src/");
        assert!(matches!(ToolError::from(err), ToolError::InvalidParams(_)));
    }
}
