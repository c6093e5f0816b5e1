//! # nbschema
//!
//! Schema validation, normalization and serialization for Jupyter-style
//! notebook documents (the `.ipynb` JSON format).
//!
//! This crate checks an arbitrary JSON value against the notebook shape and
//! builds a strongly-typed model from it:
//! - Cells: raw, markdown, code, plus a fallback for unknown `cell_type`s
//! - Outputs: execute results, display data, streams, errors
//! - Notebook metadata: kernel spec, language info, format versions
//! - Unknown fields anywhere in the document are kept and written back
//!
//! Violations are reported with the path of the offending field
//! (`cells[2].source`), and by default every violation in the document is
//! collected before failing.
//!
//! ## Example
//!
//! ```
//! use nbschema::{serialize, validate};
//! use serde_json::json;
//!
//! let input = json!({
//!     "metadata": {
//!         "kernelspec": {"name": "python3", "display_name": "Python 3"},
//!         "language_info": {"name": "python"}
//!     },
//!     "nbformat": 4,
//!     "nbformat_minor": 5,
//!     "cells": [{
//!         "cell_type": "markdown",
//!         "metadata": {"name": "intro", "tags": []},
//!         "source": "# Hello\nWorld"
//!     }]
//! });
//!
//! let notebook = validate(&input)?;
//! assert_eq!(notebook.cells[0].source().lines(), ["# Hello\n", "World"]);
//!
//! let output = serialize(&notebook);
//! assert_eq!(output["cells"][0]["source"], json!(["# Hello\n", "World"]));
//! # Ok::<(), nbschema::ValidationErrors>(())
//! ```

/// Notebook cells and source text
pub mod cell;
/// Error types for notebook validation
pub mod error;
/// Notebook documents and storage envelope
pub mod notebook;
/// Validation and serialization options
pub mod options;
/// Code cell outputs and mime bundles
pub mod output;
/// Field paths for error reports
pub mod path;
/// Typed model to JSON
pub mod serialize;
/// JSON to typed model
pub mod validate;

pub use cell::{
    Cell, CellMetadata, CellType, CodeCell, CodeCellMetadata, MarkdownCell, RawCell,
    RawCellMetadata, Scrolled, Source, UnrecognizedCell,
};
pub use error::{JsonKind, NotebookError, Result, SchemaError, ValidationErrors};
pub use notebook::{KernelSpec, LanguageInfo, NbData, Notebook, NotebookMetadata};
pub use options::{ErrorMode, OutputsMode, SerializeOptions, SourceStyle, ValidateOptions};
pub use output::{
    DisplayData, ExecuteResult, JupyterError, MimeBundle, Output, OutputType, Outputs, Stream,
};
pub use path::{FieldPath, PathSegment};
pub use serialize::{serialize, JsonSerializer};
pub use validate::{
    normalize, parse_notebook_from_str, validate, validate_cell, validate_nbdata,
    validate_output, Validator,
};
