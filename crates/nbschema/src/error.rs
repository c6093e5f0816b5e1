//! Error types for notebook validation

use std::fmt;

use serde_json::Value;
use thiserror::Error;

use crate::path::FieldPath;

/// A single schema violation, annotated with where it occurred
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    /// A required field is absent
    #[error("{path}: missing required field")]
    MissingField {
        /// Location of the absent field
        path: FieldPath,
    },

    /// A field is present but holds the wrong kind of value
    #[error("{path}: expected {expected}, found {actual}")]
    TypeMismatch {
        /// Location of the offending value
        path: FieldPath,
        /// What the schema requires here
        expected: &'static str,
        /// What the input actually holds
        actual: JsonKind,
    },

    /// A discriminant tag holds a value with no matching variant
    #[error("{path}: unknown discriminant '{value}'")]
    UnknownDiscriminant {
        /// Location of the tag field
        path: FieldPath,
        /// The tag value found
        value: String,
    },

    /// A container field does not have the shape the schema requires
    #[error("{path}: malformed container, expected {expected}, found {actual}")]
    MalformedContainer {
        /// Location of the container
        path: FieldPath,
        /// Required container shape
        expected: &'static str,
        /// What the input actually holds
        actual: JsonKind,
    },
}

impl SchemaError {
    /// Location the error refers to
    #[inline]
    #[must_use]
    pub const fn path(&self) -> &FieldPath {
        match self {
            Self::MissingField { path }
            | Self::TypeMismatch { path, .. }
            | Self::UnknownDiscriminant { path, .. }
            | Self::MalformedContainer { path, .. } => path,
        }
    }
}

/// Kind of a JSON value, used in error reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JsonKind {
    /// `null`
    Null,
    /// `true` / `false`
    Bool,
    /// Any number
    Number,
    /// A string
    String,
    /// An array
    Array,
    /// An object
    Object,
}

impl JsonKind {
    /// Kind of the given value
    #[inline]
    #[must_use]
    pub const fn of(value: &Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(_) => Self::Bool,
            Value::Number(_) => Self::Number,
            Value::String(_) => Self::String,
            Value::Array(_) => Self::Array,
            Value::Object(_) => Self::Object,
        }
    }
}

impl fmt::Display for JsonKind {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Null => "null",
            Self::Bool => "boolean",
            Self::Number => "number",
            Self::String => "string",
            Self::Array => "array",
            Self::Object => "object",
        };
        write!(f, "{s}")
    }
}

/// Every schema violation found in one validation pass
///
/// Never empty when returned from the validator.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub struct ValidationErrors {
    errors: Vec<SchemaError>,
}

impl ValidationErrors {
    pub(crate) fn new(errors: Vec<SchemaError>) -> Self {
        Self { errors }
    }

    /// The individual violations, in document order
    #[inline]
    #[must_use]
    pub fn errors(&self) -> &[SchemaError] {
        &self.errors
    }

    /// Number of violations
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Whether the report is empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// First violation of the report
    #[inline]
    #[must_use]
    pub fn first(&self) -> Option<&SchemaError> {
        self.errors.first()
    }

    /// Consume the report, yielding the violations
    #[inline]
    #[must_use]
    pub fn into_errors(self) -> Vec<SchemaError> {
        self.errors
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "notebook failed validation with {} error(s)", self.errors.len())?;
        for error in &self.errors {
            write!(f, "\n  - {error}")?;
        }
        Ok(())
    }
}

impl IntoIterator for ValidationErrors {
    type Item = SchemaError;
    type IntoIter = std::vec::IntoIter<SchemaError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.into_iter()
    }
}

/// Error type for text-level notebook operations
#[derive(Error, Debug)]
pub enum NotebookError {
    /// JSON parsing error
    #[error("Failed to parse notebook JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Document does not conform to the notebook schema
    #[error("Invalid notebook: {0}")]
    Schema(#[from] ValidationErrors),
}

/// Result type alias for notebook operations
pub type Result<T> = std::result::Result<T, NotebookError>;

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_schema_error_display() {
        let err = SchemaError::TypeMismatch {
            path: FieldPath::root().key("cells").index(2).key("source"),
            expected: "string or array of strings",
            actual: JsonKind::Number,
        };
        assert_eq!(
            err.to_string(),
            "cells[2].source: expected string or array of strings, found number"
        );

        let err = SchemaError::UnknownDiscriminant {
            path: FieldPath::root().key("outputs").key("output_type"),
            value: "bogus".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "outputs.output_type: unknown discriminant 'bogus'"
        );
    }

    #[test]
    fn test_json_kind_of() {
        assert_eq!(JsonKind::of(&json!(null)), JsonKind::Null);
        assert_eq!(JsonKind::of(&json!(true)), JsonKind::Bool);
        assert_eq!(JsonKind::of(&json!(1.5)), JsonKind::Number);
        assert_eq!(JsonKind::of(&json!("x")), JsonKind::String);
        assert_eq!(JsonKind::of(&json!([])), JsonKind::Array);
        assert_eq!(JsonKind::of(&json!({})), JsonKind::Object);
    }

    #[test]
    fn test_report_lists_every_error() {
        let report = ValidationErrors::new(vec![
            SchemaError::MissingField {
                path: FieldPath::root().key("nbformat"),
            },
            SchemaError::MissingField {
                path: FieldPath::root().key("cells"),
            },
        ]);
        let text = report.to_string();
        assert!(text.contains("2 error(s)"));
        assert!(text.contains("nbformat: missing required field"));
        assert!(text.contains("cells: missing required field"));
        assert_eq!(report.len(), 2);
        assert_eq!(
            report.first().map(|e| e.path().to_string()),
            Some("nbformat".to_string())
        );
    }

    #[test]
    fn test_notebook_error_from_json() {
        let json_err = serde_json::from_str::<Value>("{").unwrap_err();
        let err = NotebookError::from(json_err);
        assert!(err.to_string().starts_with("Failed to parse notebook JSON"));
    }
}
