//! Type-checked accessors for tool call arguments.

use std::error::Error;
use std::fmt;

use octo_toolsets::{JsonObject, ToolError};
use serde_json::Value;

const DEFAULT_PAGE: u32 = 1;
const DEFAULT_PER_PAGE: u32 = 30;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamError {
    Missing(String),
    WrongType { name: String, expected: &'static str },
    Invalid { name: String, message: String },
}

impl fmt::Display for ParamError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Missing(name) => write!(f, "missing required parameter: {name}"),
            Self::WrongType { name, expected } => {
                write!(f, "parameter {name} is not of type {expected}")
            }
            Self::Invalid { name, message } => write!(f, "invalid parameter {name}: {message}"),
        }
    }
}

impl Error for ParamError {}

impl From<ParamError> for ToolError {
    fn from(err: ParamError) -> Self {
        Self::InvalidParams(err.to_string())
    }
}

/// Page and page size for list endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: u32,
    pub per_page: u32,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            per_page: DEFAULT_PER_PAGE,
        }
    }
}

/// Borrowed view over a call's arguments.
#[derive(Debug, Clone, Copy)]
pub struct Params<'a> {
    arguments: &'a JsonObject,
}

impl<'a> Params<'a> {
    #[must_use]
    pub const fn new(arguments: &'a JsonObject) -> Self {
        Self { arguments }
    }

    fn value(&self, name: &str) -> Option<&'a Value> {
        self.arguments.get(name).filter(|value| !value.is_null())
    }

    /// Required, non-empty string.
    ///
    /// # Errors
    /// Returns [`ParamError`] if absent, empty, or not a string.
    pub fn required_str(&self, name: &str) -> Result<String, ParamError> {
        match self.value(name) {
            None => Err(ParamError::Missing(name.to_string())),
            Some(Value::String(value)) if value.is_empty() => {
                Err(ParamError::Missing(name.to_string()))
            }
            Some(Value::String(value)) => Ok(value.clone()),
            Some(_) => Err(wrong_type(name, "string")),
        }
    }

    /// Optional string; empty strings read as absent.
    ///
    /// # Errors
    /// Returns [`ParamError::WrongType`] if present and not a string.
    pub fn optional_str(&self, name: &str) -> Result<Option<String>, ParamError> {
        match self.value(name) {
            None => Ok(None),
            Some(Value::String(value)) if value.is_empty() => Ok(None),
            Some(Value::String(value)) => Ok(Some(value.clone())),
            Some(_) => Err(wrong_type(name, "string")),
        }
    }

    /// Required, non-zero integer.
    ///
    /// # Errors
    /// Returns [`ParamError`] if absent, zero, or not a number.
    pub fn required_int(&self, name: &str) -> Result<i64, ParamError> {
        match self.optional_int(name)? {
            None | Some(0) => Err(ParamError::Missing(name.to_string())),
            Some(value) => Ok(value),
        }
    }

    /// Optional integer. Fractional numbers are truncated.
    ///
    /// # Errors
    /// Returns [`ParamError::WrongType`] if present and not a number.
    pub fn optional_int(&self, name: &str) -> Result<Option<i64>, ParamError> {
        match self.value(name) {
            None => Ok(None),
            Some(Value::Number(number)) => number
                .as_i64()
                .or_else(|| number.as_f64().map(truncate))
                .map(Some)
                .ok_or_else(|| wrong_type(name, "number")),
            Some(_) => Err(wrong_type(name, "number")),
        }
    }

    /// Optional integer with a fallback for absent or zero values.
    ///
    /// # Errors
    /// Returns [`ParamError::WrongType`] if present and not a number.
    pub fn optional_int_or(&self, name: &str, default: i64) -> Result<i64, ParamError> {
        Ok(self
            .optional_int(name)?
            .filter(|value| *value != 0)
            .unwrap_or(default))
    }

    /// Optional boolean, `false` when absent.
    ///
    /// # Errors
    /// Returns [`ParamError::WrongType`] if present and not a boolean.
    pub fn optional_bool(&self, name: &str) -> Result<bool, ParamError> {
        match self.value(name) {
            None => Ok(false),
            Some(Value::Bool(value)) => Ok(*value),
            Some(_) => Err(wrong_type(name, "boolean")),
        }
    }

    /// Optional list of strings, empty when absent.
    ///
    /// # Errors
    /// Returns [`ParamError::WrongType`] if present and not an array of strings.
    pub fn optional_string_array(&self, name: &str) -> Result<Vec<String>, ParamError> {
        match self.value(name) {
            None => Ok(Vec::new()),
            Some(Value::Array(items)) => items
                .iter()
                .map(|item| {
                    item.as_str()
                        .map(ToString::to_string)
                        .ok_or_else(|| wrong_type(name, "string array"))
                })
                .collect(),
            Some(_) => Err(wrong_type(name, "string array")),
        }
    }

    /// Optional JSON object.
    ///
    /// # Errors
    /// Returns [`ParamError::WrongType`] if present and not an object.
    pub fn optional_object(&self, name: &str) -> Result<Option<JsonObject>, ParamError> {
        match self.value(name) {
            None => Ok(None),
            Some(Value::Object(map)) => Ok(Some(map.clone())),
            Some(_) => Err(wrong_type(name, "object")),
        }
    }

    /// Raw value, if present.
    #[must_use]
    pub fn raw(&self, name: &str) -> Option<&'a Value> {
        self.value(name)
    }

    /// `page`/`perPage` arguments with defaults 1 and 30.
    ///
    /// # Errors
    /// Returns [`ParamError`] if either is not a positive number.
    pub fn pagination(&self) -> Result<Pagination, ParamError> {
        self.pagination_named("page", "perPage")
    }

    /// Pagination read from custom argument names.
    ///
    /// # Errors
    /// Returns [`ParamError`] if either is not a positive number.
    pub fn pagination_named(&self, page: &str, per_page: &str) -> Result<Pagination, ParamError> {
        Ok(Pagination {
            page: positive(page, self.optional_int_or(page, i64::from(DEFAULT_PAGE))?)?,
            per_page: positive(
                per_page,
                self.optional_int_or(per_page, i64::from(DEFAULT_PER_PAGE))?,
            )?,
        })
    }
}

fn wrong_type(name: &str, expected: &'static str) -> ParamError {
    ParamError::WrongType {
        name: name.to_string(),
        expected,
    }
}

#[allow(clippy::cast_possible_truncation)]
fn truncate(value: f64) -> i64 {
    value.trunc() as i64
}

fn positive(name: &str, value: i64) -> Result<u32, ParamError> {
    u32::try_from(value)
        .ok()
        .filter(|value| *value > 0)
        .ok_or_else(|| ParamError::Invalid {
            name: name.to_string(),
            message: format!("must be a positive integer, got {value}"),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn args(value: Value) -> JsonObject {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn required_string_rules() {
        let arguments = args(json!({ "owner": "octo", "repo": "", "count": 3 }));
        let params = Params::new(&arguments);

        assert_eq!(params.required_str("owner").unwrap(), "octo");
        assert_eq!(
            params.required_str("repo").unwrap_err().to_string(),
            "missing required parameter: repo"
        );
        assert_eq!(
            params.required_str("missing").unwrap_err(),
            ParamError::Missing("missing".to_string())
        );
        assert_eq!(
            params.required_str("count").unwrap_err().to_string(),
            "parameter count is not of type string"
        );
    }

    #[test]
    fn numbers_accept_floats_and_reject_strings() {
        let arguments = args(json!({ "run_id": 42.0, "job_id": "7", "zero": 0 }));
        let params = Params::new(&arguments);

        assert_eq!(params.required_int("run_id").unwrap(), 42);
        assert!(matches!(
            params.optional_int("job_id"),
            Err(ParamError::WrongType { .. })
        ));
        assert_eq!(
            params.required_int("zero").unwrap_err(),
            ParamError::Missing("zero".to_string())
        );
        assert_eq!(params.optional_int("absent").unwrap(), None);
        assert_eq!(params.optional_int_or("zero", 5).unwrap(), 5);
    }

    #[test]
    fn optional_values_default_when_absent_or_null() {
        let arguments = args(json!({ "branch": null, "failed_only": true, "labels": ["bug"] }));
        let params = Params::new(&arguments);

        assert_eq!(params.optional_str("branch").unwrap(), None);
        assert!(params.optional_bool("failed_only").unwrap());
        assert!(!params.optional_bool("return_content").unwrap());
        assert_eq!(params.optional_string_array("labels").unwrap(), vec!["bug"]);
        assert!(params.optional_string_array("assignees").unwrap().is_empty());
    }

    #[test]
    fn string_array_rejects_mixed_items() {
        let arguments = args(json!({ "labels": ["bug", 1] }));
        let params = Params::new(&arguments);
        assert!(params.optional_string_array("labels").is_err());
    }

    #[test]
    fn pagination_defaults_and_validation() {
        let arguments = args(json!({}));
        assert_eq!(Params::new(&arguments).pagination().unwrap(), Pagination::default());

        let arguments = args(json!({ "page": 3, "perPage": 100 }));
        assert_eq!(
            Params::new(&arguments).pagination().unwrap(),
            Pagination {
                page: 3,
                per_page: 100
            }
        );

        let arguments = args(json!({ "page": -1 }));
        assert!(Params::new(&arguments).pagination().is_err());
    }

    #[test]
    fn param_errors_become_invalid_params() {
        let err: ToolError = ParamError::Missing("owner".to_string()).into();
        assert!(matches!(err, ToolError::InvalidParams(message) if message == "missing required parameter: owner"));
    }
}
