use reqwest::{Client, Url};
use serde::Deserialize;
use serde_json::{Value, json};

use super::{ApiError, authorize, read_json};

#[derive(Debug, Deserialize)]
struct GraphQlResponse {
    #[serde(default)]
    data: Value,
    #[serde(default)]
    errors: Vec<GraphQlErrorMessage>,
}

#[derive(Debug, Deserialize)]
struct GraphQlErrorMessage {
    message: String,
}

/// GraphQL client scoped to one credential.
#[derive(Clone)]
pub struct GraphQlClient {
    http: Client,
    url: Url,
    token: Option<String>,
}

impl GraphQlClient {
    #[must_use]
    pub const fn new(http: Client, url: Url, token: Option<String>) -> Self {
        Self { http, url, token }
    }

    /// Runs a query or mutation and returns its `data` object.
    ///
    /// # Errors
    /// Returns [`ApiError::GraphQl`] when the response carries errors, or the
    /// usual transport and status errors.
    pub async fn query(&self, query: &str, variables: Value) -> Result<Value, ApiError> {
        let body = json!({ "query": query, "variables": variables });
        let response = authorize(self.http.post(self.url.clone()), self.token.as_deref())
            .json(&body)
            .send()
            .await?;
        let value = read_json(response).await?;
        let parsed: GraphQlResponse = serde_json::from_value(value).map_err(ApiError::Decode)?;
        if !parsed.errors.is_empty() {
            return Err(ApiError::GraphQl(
                parsed.errors.into_iter().map(|err| err.message).collect(),
            ));
        }
        Ok(parsed.data)
    }
}

impl std::fmt::Debug for GraphQlClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GraphQlClient")
            .field("url", &self.url.as_str())
            .finish_non_exhaustive()
    }
}
