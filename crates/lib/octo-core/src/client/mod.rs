//! Authenticated clients for the platform's REST, GraphQL, and raw content endpoints.

mod graphql;
mod raw;
mod rest;

use std::error::Error;
use std::fmt;

use reqwest::header::{ACCEPT, HeaderMap, HeaderValue, USER_AGENT};
use reqwest::{RequestBuilder, Response};
use serde_json::Value;

use crate::params::Pagination;

pub use graphql::GraphQlClient;
pub use raw::{RawClient, RawContentOpts};
pub use rest::RestClient;

pub const API_VERSION: &str = "2022-11-28";
pub const JSON_MEDIA_TYPE: &str = "application/vnd.github+json";
pub const DIFF_MEDIA_TYPE: &str = "application/vnd.github.v3.diff";

const API_VERSION_HEADER: &str = "x-github-api-version";

#[derive(Debug)]
pub enum ApiError {
    Transport(reqwest::Error),
    Status { status: u16, body: String },
    Decode(serde_json::Error),
    GraphQl(Vec<String>),
    InvalidUrl(String),
    MissingRedirect(String),
}

impl ApiError {
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::Status { status: 404, .. })
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transport(err) => write!(f, "request failed: {err}"),
            Self::Status { status, body } => write!(f, "unexpected status {status}: {body}"),
            Self::Decode(err) => write!(f, "failed to decode response: {err}"),
            Self::GraphQl(messages) => write!(f, "graphql error: {}", messages.join("; ")),
            Self::InvalidUrl(message) => write!(f, "invalid url: {message}"),
            Self::MissingRedirect(url) => write!(f, "expected a redirect from {url}"),
        }
    }
}

impl Error for ApiError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Transport(err) => Some(err),
            Self::Decode(err) => Some(err),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        Self::Transport(err)
    }
}

/// Ordered query string pairs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams(Vec<(String, String)>);

impl QueryParams {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn push(mut self, key: &str, value: impl ToString) -> Self {
        self.0.push((key.to_string(), value.to_string()));
        self
    }

    #[must_use]
    pub fn push_opt<T: ToString>(self, key: &str, value: Option<T>) -> Self {
        match value {
            Some(value) => self.push(key, value),
            None => self,
        }
    }

    #[must_use]
    pub fn paginate(self, pagination: Pagination) -> Self {
        self.push("page", pagination.page)
            .push("per_page", pagination.per_page)
    }

    #[must_use]
    pub fn pairs(&self) -> &[(String, String)] {
        &self.0
    }
}

pub(crate) fn default_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static(JSON_MEDIA_TYPE));
    headers.insert(API_VERSION_HEADER, HeaderValue::from_static(API_VERSION));
    headers.insert(
        USER_AGENT,
        HeaderValue::from_static(concat!("octo-mcp/", env!("CARGO_PKG_VERSION"))),
    );
    headers
}

pub(crate) fn authorize(builder: RequestBuilder, token: Option<&str>) -> RequestBuilder {
    match token {
        Some(token) => builder.bearer_auth(token),
        None => builder,
    }
}

/// Reads a JSON body, mapping non-2xx statuses to [`ApiError::Status`].
/// Empty bodies (e.g. `204 No Content`) read as `null`.
pub(crate) async fn read_json(response: Response) -> Result<Value, ApiError> {
    let status = response.status();
    let body = response.text().await?;
    if !status.is_success() {
        return Err(ApiError::Status {
            status: status.as_u16(),
            body,
        });
    }
    if body.trim().is_empty() {
        return Ok(Value::Null);
    }
    serde_json::from_str(&body).map_err(ApiError::Decode)
}

pub(crate) async fn read_text(response: Response) -> Result<String, ApiError> {
    let status = response.status();
    let body = response.text().await?;
    if status.is_success() {
        Ok(body)
    } else {
        Err(ApiError::Status {
            status: status.as_u16(),
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_params_keep_order_and_skip_none() {
        let query = QueryParams::new()
            .push("state", "open")
            .push_opt::<&str>("sort", None)
            .push_opt("direction", Some("desc"))
            .paginate(Pagination {
                page: 2,
                per_page: 50,
            });

        assert_eq!(
            query.pairs(),
            &[
                ("state".to_string(), "open".to_string()),
                ("direction".to_string(), "desc".to_string()),
                ("page".to_string(), "2".to_string()),
                ("per_page".to_string(), "50".to_string()),
            ]
        );
    }

    #[test]
    fn status_errors_expose_code() {
        let err = ApiError::Status {
            status: 404,
            body: "Not Found".to_string(),
        };
        assert!(err.is_not_found());
        assert_eq!(err.status(), Some(404));
        assert_eq!(err.to_string(), "unexpected status 404: Not Found");
    }
}
