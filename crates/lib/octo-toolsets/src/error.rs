use std::error::Error;
use std::fmt;

/// Boxed error carried by failed tool and resource handlers.
pub type BoxError = Box<dyn Error + Send + Sync + 'static>;

/// Error returned by a tool handler.
///
/// `InvalidParams` is a caller mistake and is reported back as a tool-level
/// failure. `NotFound` marks content that does not exist at the requested
/// location. `Failed` covers client construction and upstream API failures and
/// is reported as a hard call failure.
#[derive(Debug)]
pub enum ToolError {
    InvalidParams(String),
    NotFound(String),
    Failed { context: String, source: BoxError },
}

impl ToolError {
    pub fn invalid_params(message: impl Into<String>) -> Self {
        Self::InvalidParams(message.into())
    }

    pub fn failed(context: impl Into<String>, source: impl Into<BoxError>) -> Self {
        Self::Failed {
            context: context.into(),
            source: source.into(),
        }
    }
}

impl fmt::Display for ToolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidParams(message) | Self::NotFound(message) => write!(f, "{message}"),
            Self::Failed { context, source } => write!(f, "{context}: {source}"),
        }
    }
}

impl Error for ToolError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidParams(_) | Self::NotFound(_) => None,
            Self::Failed { source, .. } => Some(source.as_ref()),
        }
    }
}

/// Attaches a context message to a fallible result, producing [`ToolError::Failed`].
pub trait ErrorContext<T> {
    /// # Errors
    /// Returns [`ToolError::Failed`] wrapping the original error.
    fn context(self, context: impl Into<String>) -> Result<T, ToolError>;
}

impl<T, E> ErrorContext<T> for Result<T, E>
where
    E: Error + Send + Sync + 'static,
{
    fn context(self, context: impl Into<String>) -> Result<T, ToolError> {
        self.map_err(|err| ToolError::failed(context, err))
    }
}

/// Errors raised while assembling or mutating a toolset group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolsetError {
    UnknownToolset(String),
    DuplicateToolset(String),
    DuplicateTool { tool: String, toolset: String },
}

impl fmt::Display for ToolsetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownToolset(name) => write!(f, "toolset {name} does not exist"),
            Self::DuplicateToolset(name) => write!(f, "toolset {name} is already registered"),
            Self::DuplicateTool { tool, toolset } => {
                write!(f, "tool {tool} is already registered by toolset {toolset}")
            }
        }
    }
}

impl Error for ToolsetError {}

/// Policy rejections raised when a caller invokes a tool or reads a resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchError {
    UnknownTool(String),
    ToolsetDisabled { tool: String, toolset: String },
    ReadOnly(String),
    UnknownResource(String),
}

impl fmt::Display for DispatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownTool(name) => write!(f, "unknown tool: {name}"),
            Self::ToolsetDisabled { tool, toolset } => {
                write!(f, "tool {tool} belongs to toolset {toolset}, which is not enabled")
            }
            Self::ReadOnly(name) => {
                write!(f, "tool {name} modifies state and the server is in read-only mode")
            }
            Self::UnknownResource(uri) => write!(f, "no enabled resource template matches {uri}"),
        }
    }
}

impl Error for DispatchError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Upstream;

    impl fmt::Display for Upstream {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "502 bad gateway")
        }
    }

    impl Error for Upstream {}

    #[test]
    fn context_prefixes_failed_errors() {
        let result: Result<(), Upstream> = Err(Upstream);
        let err = result.context("failed to list workflows").unwrap_err();

        assert_eq!(err.to_string(), "failed to list workflows: 502 bad gateway");
        assert!(err.source().is_some());
    }

    #[test]
    fn invalid_params_display_is_bare_message() {
        let err = ToolError::invalid_params("missing required parameter: owner");
        assert_eq!(err.to_string(), "missing required parameter: owner");
        assert!(err.source().is_none());
    }
}
