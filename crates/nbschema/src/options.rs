//! Options controlling validation and serialization

use serde::{Deserialize, Serialize};

/// How many problems to report before giving up
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorMode {
    /// Walk the whole document and report every violation
    #[default]
    CollectAll,
    /// Stop at the first violation
    FailFast,
}

/// Accepted wire shapes for a code cell's `outputs` field
///
/// The schema binds `outputs` to one output object while real notebooks
/// carry an array; both readings are available and the shape that was read
/// is kept in [`crate::Outputs`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputsMode {
    /// Only a single output object
    Single,
    /// Only an array of output objects
    Sequence,
    /// Either shape
    #[default]
    Either,
}

impl OutputsMode {
    pub(crate) const fn accepts_single(self) -> bool {
        matches!(self, Self::Single | Self::Either)
    }

    pub(crate) const fn accepts_sequence(self) -> bool {
        matches!(self, Self::Sequence | Self::Either)
    }

    pub(crate) const fn expected(self) -> &'static str {
        match self {
            Self::Single => "output object",
            Self::Sequence => "array of output objects",
            Self::Either => "output object or array of output objects",
        }
    }
}

/// Options for [`crate::Validator`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidateOptions {
    /// Collect every error or stop at the first (default: collect all)
    pub error_mode: ErrorMode,
    /// Accepted `outputs` shapes (default: either)
    pub outputs_mode: OutputsMode,
}

impl ValidateOptions {
    /// Set the error mode
    #[inline]
    #[must_use]
    pub const fn with_error_mode(mut self, error_mode: ErrorMode) -> Self {
        self.error_mode = error_mode;
        self
    }

    /// Set the outputs mode
    #[inline]
    #[must_use]
    pub const fn with_outputs_mode(mut self, outputs_mode: OutputsMode) -> Self {
        self.outputs_mode = outputs_mode;
        self
    }
}

/// Wire form used for cell `source` fields
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceStyle {
    /// Array of lines, each keeping its trailing newline
    #[default]
    Lines,
    /// One joined string
    Joined,
}

/// Options for [`crate::Serializer`]
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct SerializeOptions {
    /// How `source` is written (default: lines)
    pub source_style: SourceStyle,
    /// Pretty-print JSON text (default: true)
    pub pretty: bool,
}

impl Default for SerializeOptions {
    #[inline]
    fn default() -> Self {
        Self {
            source_style: SourceStyle::Lines,
            pretty: true,
        }
    }
}
