//! Resolution of REST, GraphQL, and raw content endpoints for a platform host.

use std::error::Error;
use std::fmt;

use reqwest::Url;

const DOTCOM_HOST: &str = "github.com";
const GHEC_SUFFIX: &str = ".ghe.com";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostError {
    Invalid { host: String, reason: String },
}

impl fmt::Display for HostError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Invalid { host, reason } => write!(f, "invalid host {host}: {reason}"),
        }
    }
}

impl Error for HostError {}

/// Base URLs for one deployment: github.com, GHEC (`*.ghe.com`), or GHES.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiHost {
    pub rest_base: Url,
    pub graphql_url: Url,
    pub raw_base: Url,
}

impl ApiHost {
    /// Resolves endpoints for `host`; `None` or an empty string means github.com.
    ///
    /// # Errors
    /// Returns [`HostError`] if the host cannot be parsed into URLs.
    pub fn parse(host: Option<&str>) -> Result<Self, HostError> {
        let Some(host) = host.map(str::trim).filter(|host| !host.is_empty()) else {
            return Self::dotcom();
        };

        let with_scheme = if host.contains("://") {
            host.to_string()
        } else {
            format!("https://{host}")
        };
        let parsed = Url::parse(&with_scheme).map_err(|err| invalid(host, err))?;
        let scheme = parsed.scheme();
        if scheme != "https" && scheme != "http" {
            return Err(invalid(host, "scheme must be http or https"));
        }
        let hostname = parsed
            .host_str()
            .ok_or_else(|| invalid(host, "missing hostname"))?;
        let authority = parsed
            .port()
            .map_or_else(|| hostname.to_string(), |port| format!("{hostname}:{port}"));

        if hostname == DOTCOM_HOST {
            return Self::dotcom();
        }
        if hostname.ends_with(GHEC_SUFFIX) {
            return Self::from_strs(
                host,
                &format!("{scheme}://api.{authority}/"),
                &format!("{scheme}://api.{authority}/graphql"),
                &format!("{scheme}://raw.{authority}/"),
            );
        }
        Self::from_strs(
            host,
            &format!("{scheme}://{authority}/api/v3/"),
            &format!("{scheme}://{authority}/api/graphql"),
            &format!("{scheme}://{authority}/raw/"),
        )
    }

    /// Endpoints for github.com.
    ///
    /// # Errors
    /// Never fails in practice; the URLs are constants.
    pub fn dotcom() -> Result<Self, HostError> {
        Self::from_strs(
            DOTCOM_HOST,
            "https://api.github.com/",
            "https://api.github.com/graphql",
            "https://raw.githubusercontent.com/",
        )
    }

    /// Explicit endpoints, used for test servers and custom proxies.
    ///
    /// # Errors
    /// Returns [`HostError`] if any URL is invalid.
    pub fn from_urls(rest: &str, graphql: &str, raw: &str) -> Result<Self, HostError> {
        Self::from_strs(rest, rest, graphql, raw)
    }

    fn from_strs(host: &str, rest: &str, graphql: &str, raw: &str) -> Result<Self, HostError> {
        let parse = |value: &str| -> Result<Url, HostError> {
            let url = Url::parse(value).map_err(|err| invalid(host, err))?;
            if url.cannot_be_a_base() {
                return Err(invalid(host, format!("{value} cannot be a base URL")));
            }
            Ok(url)
        };
        Ok(Self {
            rest_base: parse(rest)?,
            graphql_url: parse(graphql)?,
            raw_base: parse(raw)?,
        })
    }
}

fn invalid(host: &str, reason: impl fmt::Display) -> HostError {
    HostError::Invalid {
        host: host.to_string(),
        reason: reason.to_string(),
    }
}
