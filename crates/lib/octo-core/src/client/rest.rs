use reqwest::header::{ACCEPT, LOCATION};
use reqwest::{Client, Method, StatusCode, Url};
use serde_json::Value;

use super::{ApiError, QueryParams, authorize, read_json, read_text};

/// REST client scoped to one credential.
#[derive(Clone)]
pub struct RestClient {
    http: Client,
    no_redirect: Client,
    base: Url,
    token: Option<String>,
}

impl RestClient {
    /// `no_redirect` must be built with redirects disabled; it is used to read
    /// download locations.
    #[must_use]
    pub const fn new(http: Client, no_redirect: Client, base: Url, token: Option<String>) -> Self {
        Self {
            http,
            no_redirect,
            base,
            token,
        }
    }

    #[must_use]
    pub const fn base(&self) -> &Url {
        &self.base
    }

    /// Appends percent-encoded path segments to the base URL.
    ///
    /// # Errors
    /// Returns [`ApiError::InvalidUrl`] if the base cannot carry a path.
    pub fn endpoint<S: AsRef<str>>(&self, segments: &[S]) -> Result<Url, ApiError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|()| ApiError::InvalidUrl(self.base.to_string()))?
            .pop_if_empty()
            .extend(segments.iter());
        Ok(url)
    }

    fn request(&self, client: &Client, method: Method, url: Url) -> reqwest::RequestBuilder {
        authorize(client.request(method, url), self.token.as_deref())
    }

    /// GET returning the decoded JSON body.
    ///
    /// # Errors
    /// Returns [`ApiError`] on transport failure, non-2xx status, or bad JSON.
    pub async fn get<S: AsRef<str>>(
        &self,
        segments: &[S],
        query: &QueryParams,
    ) -> Result<Value, ApiError> {
        let url = self.endpoint(segments)?;
        let response = self
            .request(&self.http, Method::GET, url)
            .query(query.pairs())
            .send()
            .await?;
        read_json(response).await
    }

    /// Sends a request with an optional JSON body.
    ///
    /// # Errors
    /// Returns [`ApiError`] on transport failure, non-2xx status, or bad JSON.
    pub async fn send<S: AsRef<str>>(
        &self,
        method: Method,
        segments: &[S],
        body: Option<&Value>,
    ) -> Result<Value, ApiError> {
        let url = self.endpoint(segments)?;
        let mut builder = self.request(&self.http, method, url);
        if let Some(body) = body {
            builder = builder.json(body);
        }
        read_json(builder.send().await?).await
    }

    /// Sends a request whose response body is ignored and returns the status.
    ///
    /// # Errors
    /// Returns [`ApiError`] on transport failure or non-2xx status.
    pub async fn send_for_status<S: AsRef<str>>(
        &self,
        method: Method,
        segments: &[S],
        body: Option<&Value>,
    ) -> Result<StatusCode, ApiError> {
        let url = self.endpoint(segments)?;
        let mut builder = self.request(&self.http, method, url);
        if let Some(body) = body {
            builder = builder.json(body);
        }
        let response = builder.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Status {
                status: status.as_u16(),
                body: response.text().await?,
            });
        }
        Ok(status)
    }

    /// GET with a custom media type, returning the body as text.
    ///
    /// # Errors
    /// Returns [`ApiError`] on transport failure or non-2xx status.
    pub async fn get_text<S: AsRef<str>>(
        &self,
        segments: &[S],
        accept: &str,
    ) -> Result<String, ApiError> {
        let url = self.endpoint(segments)?;
        let response = self
            .request(&self.http, Method::GET, url)
            .header(ACCEPT, accept)
            .send()
            .await?;
        read_text(response).await
    }

    /// Reads the `Location` of a redirecting download endpoint without following it.
    ///
    /// # Errors
    /// Returns [`ApiError::MissingRedirect`] if the endpoint answers without a
    /// redirect, or [`ApiError::Status`] for error statuses.
    pub async fn redirect_location<S: AsRef<str>>(
        &self,
        segments: &[S],
        query: &QueryParams,
    ) -> Result<Url, ApiError> {
        let url = self.endpoint(segments)?;
        let response = self
            .request(&self.no_redirect, Method::GET, url.clone())
            .query(query.pairs())
            .send()
            .await?;

        let status = response.status();
        if status.is_redirection() {
            let location = response
                .headers()
                .get(LOCATION)
                .and_then(|value| value.to_str().ok())
                .ok_or_else(|| ApiError::MissingRedirect(url.to_string()))?;
            return url
                .join(location)
                .map_err(|err| ApiError::InvalidUrl(err.to_string()));
        }
        if !status.is_success() {
            return Err(ApiError::Status {
                status: status.as_u16(),
                body: response.text().await?,
            });
        }
        Err(ApiError::MissingRedirect(url.to_string()))
    }

    /// Downloads a pre-signed URL as text. No credentials are attached.
    ///
    /// # Errors
    /// Returns [`ApiError`] on transport failure or non-2xx status.
    pub async fn download_text(&self, url: Url) -> Result<String, ApiError> {
        let response = self.http.get(url).send().await?;
        read_text(response).await
    }
}

impl std::fmt::Debug for RestClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RestClient")
            .field("base", &self.base.as_str())
            .finish_non_exhaustive()
    }
}
