//! Capability provider: hands out authenticated clients scoped to a call.

use std::error::Error;
use std::fmt;
use std::sync::Arc;

use octo_toolsets::CallContext;
use reqwest::{Client, redirect};

use crate::client::{GraphQlClient, RawClient, RestClient, default_headers};
use crate::host::{ApiHost, HostError};

#[derive(Debug)]
pub enum ProviderError {
    MissingToken,
    InvalidHost(String),
    Build(reqwest::Error),
}

impl fmt::Display for ProviderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingToken => write!(f, "no access token available for this call"),
            Self::InvalidHost(message) => write!(f, "invalid host: {message}"),
            Self::Build(err) => write!(f, "failed to build http client: {err}"),
        }
    }
}

impl Error for ProviderError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Build(err) => Some(err),
            _ => None,
        }
    }
}

impl From<HostError> for ProviderError {
    fn from(err: HostError) -> Self {
        Self::InvalidHost(err.to_string())
    }
}

/// Source of platform clients, resolved per call so credentials can vary.
pub trait CapabilityProvider: Send + Sync {
    /// # Errors
    /// Returns [`ProviderError`] when no credential is available.
    fn rest_client(&self, ctx: &CallContext) -> Result<RestClient, ProviderError>;

    /// # Errors
    /// Returns [`ProviderError`] when no credential is available.
    fn graphql_client(&self, ctx: &CallContext) -> Result<GraphQlClient, ProviderError>;

    /// # Errors
    /// Returns [`ProviderError`] when no credential is available.
    fn raw_client(&self, ctx: &CallContext) -> Result<RawClient, ProviderError>;
}

pub type SharedProvider = Arc<dyn CapabilityProvider>;

/// Provider backed by one host and a default token.
#[derive(Clone)]
pub struct GitHubProvider {
    host: ApiHost,
    token: Option<String>,
    http: Client,
    no_redirect: Client,
}

impl GitHubProvider {
    /// Builds the shared HTTP clients.
    ///
    /// # Errors
    /// Returns [`ProviderError::Build`] if the TLS backend cannot be initialised.
    pub fn new(host: ApiHost, token: Option<String>) -> Result<Self, ProviderError> {
        let http = Client::builder()
            .default_headers(default_headers())
            .build()
            .map_err(ProviderError::Build)?;
        let no_redirect = Client::builder()
            .default_headers(default_headers())
            .redirect(redirect::Policy::none())
            .build()
            .map_err(ProviderError::Build)?;
        Ok(Self {
            host,
            token: token.filter(|token| !token.trim().is_empty()),
            http,
            no_redirect,
        })
    }

    #[must_use]
    pub const fn host(&self) -> &ApiHost {
        &self.host
    }

    #[must_use]
    pub fn into_shared(self) -> SharedProvider {
        Arc::new(self)
    }

    fn token_for(&self, ctx: &CallContext) -> Result<String, ProviderError> {
        ctx.auth_token
            .as_deref()
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .or_else(|| self.token.as_deref())
            .map(str::to_string)
            .ok_or(ProviderError::MissingToken)
    }
}

impl CapabilityProvider for GitHubProvider {
    fn rest_client(&self, ctx: &CallContext) -> Result<RestClient, ProviderError> {
        Ok(RestClient::new(
            self.http.clone(),
            self.no_redirect.clone(),
            self.host.rest_base.clone(),
            Some(self.token_for(ctx)?),
        ))
    }

    fn graphql_client(&self, ctx: &CallContext) -> Result<GraphQlClient, ProviderError> {
        Ok(GraphQlClient::new(
            self.http.clone(),
            self.host.graphql_url.clone(),
            Some(self.token_for(ctx)?),
        ))
    }

    fn raw_client(&self, ctx: &CallContext) -> Result<RawClient, ProviderError> {
        Ok(RawClient::new(
            self.http.clone(),
            self.host.raw_base.clone(),
            Some(self.token_for(ctx)?),
        ))
    }
}

impl fmt::Debug for GitHubProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GitHubProvider")
            .field("host", &self.host)
            .field("has_token", &self.token.is_some())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn call_token_overrides_default() {
        let provider =
            GitHubProvider::new(ApiHost::dotcom().unwrap(), Some("default".to_string())).unwrap();
        assert_eq!(provider.token_for(&CallContext::default()).unwrap(), "default");
        assert_eq!(
            provider
                .token_for(&CallContext::with_auth_token("per-call"))
                .unwrap(),
            "per-call"
        );
        assert_eq!(
            provider.token_for(&CallContext::with_auth_token("  ")).unwrap(),
            "default"
        );
    }

    #[test]
    fn blank_default_token_is_missing() {
        let provider =
            GitHubProvider::new(ApiHost::dotcom().unwrap(), Some(" ".to_string())).unwrap();
        assert!(matches!(
            provider.rest_client(&CallContext::default()),
            Err(ProviderError::MissingToken)
        ));
        assert!(provider
            .raw_client(&CallContext::with_auth_token("abc"))
            .is_ok());
    }
}
