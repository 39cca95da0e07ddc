use reqwest::{Client, Response, Url};

use super::{ApiError, authorize};

const HEAD_REF: &str = "HEAD";

/// Revision selector handed to the raw URL builder.
///
/// A non-empty `sha` always wins over `git_ref`; with neither set the
/// default branch (`HEAD`) is used. `git_ref` already carries its
/// `refs/heads/` or `refs/tags/` prefix.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawContentOpts {
    pub git_ref: Option<String>,
    pub sha: Option<String>,
}

impl RawContentOpts {
    #[must_use]
    pub fn sha(sha: impl Into<String>) -> Self {
        Self {
            git_ref: None,
            sha: Some(sha.into()),
        }
    }

    #[must_use]
    pub fn git_ref(git_ref: impl Into<String>) -> Self {
        Self {
            git_ref: Some(git_ref.into()),
            sha: None,
        }
    }

    /// The single path segment sequence used between `repo` and the file path.
    #[must_use]
    pub fn revision(&self) -> &str {
        non_empty(self.sha.as_deref())
            .or_else(|| non_empty(self.git_ref.as_deref()))
            .unwrap_or(HEAD_REF)
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|value| !value.is_empty())
}

/// Client for raw file bytes served from content-addressed paths.
#[derive(Clone)]
pub struct RawClient {
    http: Client,
    base: Url,
    token: Option<String>,
}

impl RawClient {
    #[must_use]
    pub const fn new(http: Client, base: Url, token: Option<String>) -> Self {
        Self { http, base, token }
    }

    /// Builds `base/owner/repo/<sha | ref | HEAD>/path`.
    ///
    /// # Errors
    /// Returns [`ApiError::InvalidUrl`] if the base cannot carry a path.
    pub fn url_from_opts(
        &self,
        opts: &RawContentOpts,
        owner: &str,
        repo: &str,
        path: &str,
    ) -> Result<Url, ApiError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|()| ApiError::InvalidUrl(self.base.to_string()))?
            .pop_if_empty()
            .push(owner)
            .push(repo)
            .extend(opts.revision().split('/'))
            .extend(path.trim_start_matches('/').split('/'));
        Ok(url)
    }

    /// Issues the GET and hands back the unread response.
    ///
    /// # Errors
    /// Returns [`ApiError`] only for URL or transport failures; statuses are
    /// left for the caller to interpret.
    pub async fn get_raw_content(
        &self,
        owner: &str,
        repo: &str,
        path: &str,
        opts: &RawContentOpts,
    ) -> Result<Response, ApiError> {
        let url = self.url_from_opts(opts, owner, repo, path)?;
        let response = authorize(self.http.get(url), self.token.as_deref())
            .send()
            .await?;
        Ok(response)
    }
}

impl std::fmt::Debug for RawClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RawClient")
            .field("base", &self.base.as_str())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> RawClient {
        RawClient::new(
            Client::new(),
            Url::parse("https://raw.githubusercontent.com/").unwrap(),
            None,
        )
    }

    #[test]
    fn url_from_opts_precedence() {
        let cases = [
            (
                "no selector",
                RawContentOpts::default(),
                "https://raw.githubusercontent.com/owner/repo/HEAD/path/to/file.txt",
            ),
            (
                "branch ref",
                RawContentOpts::git_ref("refs/heads/main"),
                "https://raw.githubusercontent.com/owner/repo/refs/heads/main/path/to/file.txt",
            ),
            (
                "tag ref",
                RawContentOpts::git_ref("refs/tags/v1.0.0"),
                "https://raw.githubusercontent.com/owner/repo/refs/tags/v1.0.0/path/to/file.txt",
            ),
            (
                "sha",
                RawContentOpts::sha("abc123"),
                "https://raw.githubusercontent.com/owner/repo/abc123/path/to/file.txt",
            ),
            (
                "sha wins over ref",
                RawContentOpts {
                    git_ref: Some("refs/heads/main".to_string()),
                    sha: Some("abc123".to_string()),
                },
                "https://raw.githubusercontent.com/owner/repo/abc123/path/to/file.txt",
            ),
            (
                "empty strings fall back to HEAD",
                RawContentOpts {
                    git_ref: Some(String::new()),
                    sha: Some(String::new()),
                },
                "https://raw.githubusercontent.com/owner/repo/HEAD/path/to/file.txt",
            ),
        ];

        let client = client();
        for (name, opts, expected) in cases {
            let url = client
                .url_from_opts(&opts, "owner", "repo", "path/to/file.txt")
                .unwrap();
            assert_eq!(url.as_str(), expected, "{name}");
        }
    }

    #[test]
    fn url_from_opts_keeps_enterprise_prefix_and_encodes() {
        let client = RawClient::new(
            Client::new(),
            Url::parse("https://ghes.example.com/raw/").unwrap(),
            None,
        );
        let url = client
            .url_from_opts(&RawContentOpts::default(), "owner", "repo", "docs/read me.md")
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://ghes.example.com/raw/owner/repo/HEAD/docs/read%20me.md"
        );
    }
}
