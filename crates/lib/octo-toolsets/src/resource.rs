//! Resource templates: URI patterns bound to content handlers.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use serde::Serialize;

use crate::error::ToolError;
use crate::tool::CallContext;

pub type ResourceFuture =
    Pin<Box<dyn Future<Output = Result<Vec<ResourceContents>, ToolError>> + Send + 'static>>;
pub type ResourceHandler = Arc<dyn Fn(ResourceRequest) -> ResourceFuture + Send + Sync + 'static>;

/// Content returned from a resource read, either decoded text or a base64 blob.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ResourceContents {
    #[serde(rename_all = "camelCase")]
    Text {
        uri: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        mime_type: Option<String>,
        text: String,
    },
    #[serde(rename_all = "camelCase")]
    Blob {
        uri: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        mime_type: Option<String>,
        blob: String,
    },
}

impl ResourceContents {
    #[must_use]
    pub fn uri(&self) -> &str {
        match self {
            Self::Text { uri, .. } | Self::Blob { uri, .. } => uri,
        }
    }

    #[must_use]
    pub fn mime_type(&self) -> Option<&str> {
        match self {
            Self::Text { mime_type, .. } | Self::Blob { mime_type, .. } => mime_type.as_deref(),
        }
    }
}

/// A matched resource read: the original URI plus extracted template variables.
///
/// Every variable maps to a list of values; exploded path variables carry one
/// entry per segment, simple variables carry exactly one.
#[derive(Debug, Clone, Default)]
pub struct ResourceRequest {
    pub uri: String,
    pub arguments: HashMap<String, Vec<String>>,
    pub context: CallContext,
}

impl ResourceRequest {
    /// First value bound to `name`.
    #[must_use]
    pub fn first(&self, name: &str) -> Option<&str> {
        self.arguments
            .get(name)
            .and_then(|values| values.first())
            .map(String::as_str)
    }

    /// All values bound to `name`, joined with `/`.
    #[must_use]
    pub fn joined(&self, name: &str) -> Option<String> {
        self.arguments.get(name).map(|values| values.join("/"))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Variable(String),
    PathExplode(String),
}

/// Parsed URI template supporting `{var}` and a trailing `{/var*}` path expansion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UriTemplate {
    raw: String,
    segments: Vec<Segment>,
}

impl UriTemplate {
    /// Parses a template string.
    ///
    /// Unterminated expressions are kept as literal text.
    #[must_use]
    pub fn parse(template: &str) -> Self {
        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut rest = template;

        while let Some(open) = rest.find('{') {
            let Some(close) = rest[open..].find('}').map(|offset| open + offset) else {
                break;
            };
            literal.push_str(&rest[..open]);
            if !literal.is_empty() {
                segments.push(Segment::Literal(std::mem::take(&mut literal)));
            }
            let expression = &rest[open + 1..close];
            let segment = expression
                .strip_prefix('/')
                .and_then(|name| name.strip_suffix('*'))
                .map_or_else(
                    || Segment::Variable(expression.to_string()),
                    |name| Segment::PathExplode(name.to_string()),
                );
            segments.push(segment);
            rest = &rest[close + 1..];
        }
        literal.push_str(rest);
        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }

        Self {
            raw: template.to_string(),
            segments,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Matches `uri` against the template, returning the bound variables.
    ///
    /// Bound values are percent-decoded. A value with a malformed escape or
    /// one that decodes to invalid UTF-8 fails the match.
    #[must_use]
    pub fn matches(&self, uri: &str) -> Option<HashMap<String, Vec<String>>> {
        let mut bindings = HashMap::new();
        let mut rest = uri;

        for (index, segment) in self.segments.iter().enumerate() {
            match segment {
                Segment::Literal(text) => {
                    rest = rest.strip_prefix(text.as_str())?;
                }
                Segment::Variable(name) => {
                    let stop = match self.segments.get(index + 1) {
                        Some(Segment::Literal(next)) => next.chars().next(),
                        _ => Some('/'),
                    };
                    let end = stop
                        .and_then(|stop| rest.find(stop))
                        .unwrap_or(rest.len());
                    if end == 0 {
                        return None;
                    }
                    bindings.insert(name.clone(), vec![percent_decode(&rest[..end])?]);
                    rest = &rest[end..];
                }
                Segment::PathExplode(name) => {
                    if index + 1 != self.segments.len() {
                        return None;
                    }
                    let values = if rest.is_empty() {
                        Vec::new()
                    } else {
                        rest.strip_prefix('/')?
                            .split('/')
                            .map(percent_decode)
                            .collect::<Option<Vec<_>>>()?
                    };
                    bindings.insert(name.clone(), values);
                    rest = "";
                }
            }
        }

        rest.is_empty().then_some(bindings)
    }
}

fn percent_decode(input: &str) -> Option<String> {
    if !input.contains('%') {
        return Some(input.to_string());
    }
    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut index = 0;
    while let Some(&byte) = bytes.get(index) {
        if byte == b'%' {
            let hex = input.get(index + 1..index + 3)?;
            if !hex.bytes().all(|digit| digit.is_ascii_hexdigit()) {
                return None;
            }
            out.push(u8::from_str_radix(hex, 16).ok()?);
            index += 3;
        } else {
            out.push(byte);
            index += 1;
        }
    }
    String::from_utf8(out).ok()
}

/// Public description of a resource template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceTemplateSpec {
    pub uri_template: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
}

/// A resource template bound to its read handler.
#[derive(Clone)]
pub struct ServerResourceTemplate {
    pub spec: ResourceTemplateSpec,
    template: UriTemplate,
    handler: ResourceHandler,
}

impl ServerResourceTemplate {
    pub fn new<F, Fut>(uri_template: &str, name: impl Into<String>, handler: F) -> Self
    where
        F: Fn(ResourceRequest) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Vec<ResourceContents>, ToolError>> + Send + 'static,
    {
        let handler: ResourceHandler = Arc::new(move |request: ResourceRequest| -> ResourceFuture {
            Box::pin(handler(request))
        });
        Self {
            spec: ResourceTemplateSpec {
                uri_template: uri_template.to_string(),
                name: name.into(),
                description: None,
                mime_type: None,
            },
            template: UriTemplate::parse(uri_template),
            handler,
        }
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.spec.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn matches(&self, uri: &str) -> Option<HashMap<String, Vec<String>>> {
        self.template.matches(uri)
    }

    /// Reads `uri` through the handler.
    ///
    /// # Errors
    /// Returns [`ToolError::InvalidParams`] if `uri` does not match the template,
    /// otherwise whatever the handler returns.
    pub async fn read(
        &self,
        uri: &str,
        context: CallContext,
    ) -> Result<Vec<ResourceContents>, ToolError> {
        let arguments = self.matches(uri).ok_or_else(|| {
            ToolError::invalid_params(format!(
                "{uri} does not match {}",
                self.template.as_str()
            ))
        })?;
        (self.handler)(ResourceRequest {
            uri: uri.to_string(),
            arguments,
            context,
        })
        .await
    }
}

impl std::fmt::Debug for ServerResourceTemplate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerResourceTemplate")
            .field("spec", &self.spec)
            .finish_non_exhaustive()
    }
}
