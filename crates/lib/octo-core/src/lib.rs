//! Platform plumbing for octo-mcp.
//!
//! This crate resolves API endpoints for a host, hands out authenticated REST,
//! GraphQL, and raw content clients per call, extracts typed tool arguments,
//! and implements raw repository content resolution with text/blob
//! classification.

pub mod client;
pub mod content;
pub mod host;
pub mod params;
pub mod provider;
pub mod translations;

pub use client::{ApiError, GraphQlClient, QueryParams, RawClient, RawContentOpts, RestClient};
pub use content::{
    FileLocation,
    RawError,
    RefSelector,
    classify,
    fetch_raw_file,
    fetch_repository_file,
};
pub use host::{ApiHost, HostError};
pub use params::{Pagination, ParamError, Params};
pub use provider::{CapabilityProvider, GitHubProvider, ProviderError, SharedProvider};
pub use translations::{TranslationError, Translator};
