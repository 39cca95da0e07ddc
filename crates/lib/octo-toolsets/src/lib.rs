//! Toolset policy engine for octo-mcp.
//!
//! Tools are registered into named toolsets as read or write operations. A
//! [`ToolsetGroup`] owns the toolsets, applies the group-wide read-only policy,
//! and lets callers enable toolsets at run time. Listing and dispatch share the
//! same exposure filter, [`is_exposed`].

mod error;
mod group;
mod resource;
mod tool;
mod toolset;

pub use error::{BoxError, DispatchError, ErrorContext, ToolError, ToolsetError};
pub use group::{ALL_TOOLSETS, ToolsetGroup, ToolsetSummary, WeakToolsetGroup};
pub use resource::{
    ResourceContents,
    ResourceFuture,
    ResourceHandler,
    ResourceRequest,
    ResourceTemplateSpec,
    ServerResourceTemplate,
    UriTemplate,
};
pub use tool::{
    CallContext,
    JsonObject,
    OperationKind,
    ParamSpec,
    ParamType,
    ServerTool,
    Tool,
    ToolAnnotations,
    ToolContent,
    ToolFuture,
    ToolHandler,
    ToolRequest,
    ToolResult,
    ToolSpec,
    is_exposed,
};
pub use toolset::Toolset;
