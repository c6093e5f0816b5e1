//! Schema validation and normalization of notebook JSON
//!
//! The validator walks an arbitrary [`serde_json::Value`] and either builds
//! the typed model or returns every violation it found, each with the path
//! of the offending field. The input is never modified and no partial
//! result is returned.

use serde_json::{Map, Value};

use crate::cell::{
    Cell, CellMetadata, CellType, CodeCell, CodeCellMetadata, MarkdownCell, RawCell,
    RawCellMetadata, Scrolled, Source, UnrecognizedCell,
};
use crate::error::{JsonKind, NotebookError, SchemaError, ValidationErrors};
use crate::notebook::{KernelSpec, LanguageInfo, NbData, Notebook, NotebookMetadata};
use crate::options::{ErrorMode, ValidateOptions};
use crate::output::{
    DisplayData, ExecuteResult, JupyterError, MimeBundle, Output, OutputType, Outputs, Stream,
};
use crate::path::FieldPath;
use crate::serialize::JsonSerializer;

const NOTEBOOK_FIELDS: &[&str] = &["metadata", "nbformat", "nbformat_minor", "cells"];
const NOTEBOOK_METADATA_FIELDS: &[&str] = &["kernelspec", "language_info", "orig_nbformat"];
const KERNELSPEC_FIELDS: &[&str] = &["name", "display_name"];
const LANGUAGE_INFO_FIELDS: &[&str] = &[
    "name",
    "codemirror_mode",
    "file_extension",
    "mimetype",
    "pygments_lexer",
];
const CELL_METADATA_FIELDS: &[&str] = &["name", "tags"];
const RAW_METADATA_FIELDS: &[&str] = &["name", "tags", "format"];
const CODE_METADATA_FIELDS: &[&str] = &["name", "tags", "collapsed", "scrolled"];
const CELL_FIELDS: &[&str] = &["cell_type", "metadata", "source"];
const CODE_CELL_FIELDS: &[&str] = &[
    "cell_type",
    "metadata",
    "source",
    "outputs",
    "execution_count",
];
const EXECUTE_RESULT_FIELDS: &[&str] = &["output_type", "execution_count", "data", "metadata"];
const DISPLAY_DATA_FIELDS: &[&str] = &["output_type", "data", "metadata"];
const STREAM_FIELDS: &[&str] = &["output_type", "name", "text"];
const ERROR_FIELDS: &[&str] = &["output_type", "ename", "evalue", "traceback"];

/// Validate a notebook with default options
///
/// # Errors
///
/// Returns every schema violation found in `input`.
pub fn validate(input: &Value) -> Result<Notebook, ValidationErrors> {
    Validator::default().validate(input)
}

/// Validate a single cell with default options
///
/// # Errors
///
/// Returns every schema violation found in `input`; paths are relative to
/// the cell.
pub fn validate_cell(input: &Value) -> Result<Cell, ValidationErrors> {
    Validator::default().validate_cell(input)
}

/// Validate a single output with default options
///
/// # Errors
///
/// Returns every schema violation found in `input`; paths are relative to
/// the output.
pub fn validate_output(input: &Value) -> Result<Output, ValidationErrors> {
    Validator::default().validate_output(input)
}

/// Validate a notebook storage envelope with default options
///
/// # Errors
///
/// Returns every schema violation found in `input`; notebook paths are
/// prefixed with `content`.
pub fn validate_nbdata(input: &Value) -> Result<NbData, ValidationErrors> {
    Validator::default().validate_nbdata(input)
}

/// Validate, then write back in canonical form with default options
///
/// Applying this to its own output yields the same value.
///
/// # Errors
///
/// Returns every schema violation found in `input`.
pub fn normalize(input: &Value) -> Result<Value, ValidationErrors> {
    let notebook = validate(input)?;
    Ok(JsonSerializer::new().to_value(&notebook))
}

/// Parse and validate a notebook from JSON text
///
/// # Errors
///
/// Returns an error if the text is not JSON or the document does not
/// conform to the notebook schema.
pub fn parse_notebook_from_str(content: &str) -> Result<Notebook, NotebookError> {
    let value: Value = serde_json::from_str(content)?;
    Ok(validate(&value)?)
}

/// Schema validator configured with [`ValidateOptions`]
///
/// Stateless between calls; one validator can be shared across threads.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Validator {
    options: ValidateOptions,
}

impl Validator {
    /// Create a validator with the given options
    #[inline]
    #[must_use]
    pub const fn new(options: ValidateOptions) -> Self {
        Self { options }
    }

    /// Options in effect
    #[inline]
    #[must_use]
    pub const fn options(&self) -> &ValidateOptions {
        &self.options
    }

    /// Validate a notebook document
    ///
    /// # Errors
    ///
    /// Returns the violations found, all of them or only the first
    /// depending on [`ErrorMode`].
    pub fn validate(&self, input: &Value) -> Result<Notebook, ValidationErrors> {
        self.run(input, Checker::notebook)
    }

    /// Validate a single cell
    ///
    /// # Errors
    ///
    /// Returns the violations found in the cell.
    pub fn validate_cell(&self, input: &Value) -> Result<Cell, ValidationErrors> {
        self.run(input, Checker::cell)
    }

    /// Validate a single output
    ///
    /// # Errors
    ///
    /// Returns the violations found in the output.
    pub fn validate_output(&self, input: &Value) -> Result<Output, ValidationErrors> {
        self.run(input, Checker::output)
    }

    /// Validate a notebook storage envelope
    ///
    /// # Errors
    ///
    /// Returns the violations found in the envelope or its notebook.
    pub fn validate_nbdata(&self, input: &Value) -> Result<NbData, ValidationErrors> {
        self.run(input, Checker::nbdata)
    }

    fn run<T>(
        &self,
        input: &Value,
        check: impl FnOnce(&mut Checker, &Value, &FieldPath) -> Option<T>,
    ) -> Result<T, ValidationErrors> {
        let mut checker = Checker::new(self.options);
        let checked = check(&mut checker, input, &FieldPath::root());
        log::debug!(
            "validation finished with {} error(s) ({:?})",
            checker.errors.len(),
            self.options.error_mode
        );
        match checked {
            Some(value) if checker.errors.is_empty() => Ok(value),
            _ => {
                debug_assert!(!checker.errors.is_empty(), "rejected input without an error");
                Err(ValidationErrors::new(checker.errors))
            }
        }
    }
}

/// Error sink plus the shape checks for every entity
///
/// Each check returns `None` when its subtree is invalid, after reporting at
/// least one error. Optional fields with a bad value are reported but do not
/// stop their parent from being built; the caller discards the result
/// whenever the error list is non-empty.
struct Checker {
    options: ValidateOptions,
    errors: Vec<SchemaError>,
}

impl Checker {
    const fn new(options: ValidateOptions) -> Self {
        Self {
            options,
            errors: Vec::new(),
        }
    }

    fn report(&mut self, error: SchemaError) {
        if self.halted() {
            return;
        }
        self.errors.push(error);
    }

    fn halted(&self) -> bool {
        self.options.error_mode == ErrorMode::FailFast && !self.errors.is_empty()
    }

    fn mismatch(&mut self, path: &FieldPath, expected: &'static str, actual: &Value) {
        self.report(SchemaError::TypeMismatch {
            path: path.clone(),
            expected,
            actual: JsonKind::of(actual),
        });
    }

    fn malformed(&mut self, path: &FieldPath, expected: &'static str, actual: &Value) {
        self.report(SchemaError::MalformedContainer {
            path: path.clone(),
            expected,
            actual: JsonKind::of(actual),
        });
    }

    // Primitive field readers

    fn object<'v>(&mut self, value: &'v Value, path: &FieldPath) -> Option<&'v Map<String, Value>> {
        if let Value::Object(map) = value {
            Some(map)
        } else {
            self.mismatch(path, "object", value);
            None
        }
    }

    fn required<'v>(
        &mut self,
        map: &'v Map<String, Value>,
        path: &FieldPath,
        key: &str,
    ) -> Option<&'v Value> {
        let value = map.get(key);
        if value.is_none() {
            self.report(SchemaError::MissingField {
                path: path.key(key),
            });
        }
        value
    }

    fn nested<T>(
        &mut self,
        map: &Map<String, Value>,
        path: &FieldPath,
        key: &str,
        check: impl FnOnce(&mut Self, &Value, &FieldPath) -> Option<T>,
    ) -> Option<T> {
        let value = self.required(map, path, key)?;
        check(self, value, &path.key(key))
    }

    fn as_string(&mut self, value: &Value, path: &FieldPath) -> Option<String> {
        if let Value::String(s) = value {
            Some(s.clone())
        } else {
            self.mismatch(path, "string", value);
            None
        }
    }

    fn string(&mut self, map: &Map<String, Value>, path: &FieldPath, key: &str) -> Option<String> {
        let value = self.required(map, path, key)?;
        self.as_string(value, &path.key(key))
    }

    fn optional_string(
        &mut self,
        map: &Map<String, Value>,
        path: &FieldPath,
        key: &str,
    ) -> Option<String> {
        let value = present(map, key)?;
        self.as_string(value, &path.key(key))
    }

    fn as_count(&mut self, value: &Value, path: &FieldPath) -> Option<u32> {
        let count = value.as_u64().and_then(|n| u32::try_from(n).ok());
        if count.is_none() {
            self.mismatch(path, "non-negative integer", value);
        }
        count
    }

    fn count(&mut self, map: &Map<String, Value>, path: &FieldPath, key: &str) -> Option<u32> {
        let value = self.required(map, path, key)?;
        self.as_count(value, &path.key(key))
    }

    fn optional_count(
        &mut self,
        map: &Map<String, Value>,
        path: &FieldPath,
        key: &str,
    ) -> Option<u32> {
        let value = present(map, key)?;
        self.as_count(value, &path.key(key))
    }

    fn optional_bool(
        &mut self,
        map: &Map<String, Value>,
        path: &FieldPath,
        key: &str,
    ) -> Option<bool> {
        let value = present(map, key)?;
        if let Value::Bool(flag) = value {
            Some(*flag)
        } else {
            self.mismatch(&path.key(key), "boolean", value);
            None
        }
    }

    fn strings(&mut self, items: &[Value], path: &FieldPath) -> Option<Vec<String>> {
        let mut strings = Vec::with_capacity(items.len());
        let mut complete = true;
        for (i, item) in items.iter().enumerate() {
            if self.halted() {
                return None;
            }
            match self.as_string(item, &path.index(i)) {
                Some(s) => strings.push(s),
                None => complete = false,
            }
        }
        complete.then_some(strings)
    }

    fn string_list(
        &mut self,
        map: &Map<String, Value>,
        path: &FieldPath,
        key: &str,
    ) -> Option<Vec<String>> {
        let value = self.required(map, path, key)?;
        let path = path.key(key);
        if let Value::Array(items) = value {
            self.strings(items, &path)
        } else {
            self.malformed(&path, "array of strings", value);
            None
        }
    }

    /// A string or an array of strings, as used by `source` and stream `text`
    fn multiline(
        &mut self,
        map: &Map<String, Value>,
        path: &FieldPath,
        key: &str,
    ) -> Option<Vec<String>> {
        let value = self.required(map, path, key)?;
        let path = path.key(key);
        match value {
            Value::String(text) => Some(vec![text.clone()]),
            Value::Array(items) => self.strings(items, &path),
            other => {
                self.mismatch(&path, "string or array of strings", other);
                None
            }
        }
    }

    fn opaque_object(
        &mut self,
        map: &Map<String, Value>,
        path: &FieldPath,
        key: &str,
    ) -> Option<Map<String, Value>> {
        let value = self.required(map, path, key)?;
        self.object(value, &path.key(key)).cloned()
    }

    // Notebook

    fn notebook(&mut self, value: &Value, path: &FieldPath) -> Option<Notebook> {
        let map = self.object(value, path)?;
        let metadata = self.nested(map, path, "metadata", Self::notebook_metadata);
        let nbformat = self.count(map, path, "nbformat");
        let nbformat_minor = self.count(map, path, "nbformat_minor");
        let cells = self.cells(map, path);
        Some(Notebook {
            metadata: metadata?,
            nbformat: nbformat?,
            nbformat_minor: nbformat_minor?,
            cells: cells?,
            extra: extra_fields(map, NOTEBOOK_FIELDS),
        })
    }

    fn notebook_metadata(&mut self, value: &Value, path: &FieldPath) -> Option<NotebookMetadata> {
        let map = self.object(value, path)?;
        let kernelspec = self.nested(map, path, "kernelspec", Self::kernelspec);
        let language_info = self.nested(map, path, "language_info", Self::language_info);
        let orig_nbformat = self.optional_count(map, path, "orig_nbformat");
        Some(NotebookMetadata {
            kernelspec: kernelspec?,
            language_info: language_info?,
            orig_nbformat,
            extra: extra_fields(map, NOTEBOOK_METADATA_FIELDS),
        })
    }

    fn kernelspec(&mut self, value: &Value, path: &FieldPath) -> Option<KernelSpec> {
        let map = self.object(value, path)?;
        let name = self.string(map, path, "name");
        let display_name = self.string(map, path, "display_name");
        Some(KernelSpec {
            name: name?,
            display_name: display_name?,
            extra: extra_fields(map, KERNELSPEC_FIELDS),
        })
    }

    fn language_info(&mut self, value: &Value, path: &FieldPath) -> Option<LanguageInfo> {
        let map = self.object(value, path)?;
        let name = self.string(map, path, "name");
        let file_extension = self.optional_string(map, path, "file_extension");
        let mimetype = self.optional_string(map, path, "mimetype");
        let pygments_lexer = self.optional_string(map, path, "pygments_lexer");
        Some(LanguageInfo {
            name: name?,
            codemirror_mode: present(map, "codemirror_mode").cloned(),
            file_extension,
            mimetype,
            pygments_lexer,
            extra: extra_fields(map, LANGUAGE_INFO_FIELDS),
        })
    }

    fn cells(&mut self, map: &Map<String, Value>, path: &FieldPath) -> Option<Vec<Cell>> {
        let value = self.required(map, path, "cells")?;
        let path = path.key("cells");
        let Value::Array(items) = value else {
            self.malformed(&path, "array of cells", value);
            return None;
        };
        log::debug!("validating {} cell(s)", items.len());

        let mut cells = Vec::with_capacity(items.len());
        let mut complete = true;
        for (i, item) in items.iter().enumerate() {
            if self.halted() {
                return None;
            }
            match self.cell(item, &path.index(i)) {
                Some(cell) => cells.push(cell),
                None => complete = false,
            }
        }
        complete.then_some(cells)
    }

    fn nbdata(&mut self, value: &Value, path: &FieldPath) -> Option<NbData> {
        let map = self.object(value, path)?;
        let content = self.nested(map, path, "content", Self::notebook);
        let name = self.string(map, path, "name");
        let storage_path = self.string(map, path, "path");
        Some(NbData {
            content: content?,
            name: name?,
            path: storage_path?,
        })
    }

    // Cells

    fn cell(&mut self, value: &Value, path: &FieldPath) -> Option<Cell> {
        let map = self.object(value, path)?;
        let tag = self.string(map, path, "cell_type")?;
        match tag.parse::<CellType>() {
            Ok(CellType::Raw) => self.raw_cell(map, path).map(Cell::Raw),
            Ok(CellType::Markdown) => self.markdown_cell(map, path).map(Cell::Markdown),
            Ok(CellType::Code) => self.code_cell(map, path).map(Cell::Code),
            Err(_) => {
                log::warn!("{path}: unrecognized cell_type '{tag}', keeping cell as-is");
                self.unrecognized_cell(tag, map, path)
                    .map(Cell::Unrecognized)
            }
        }
    }

    fn common_metadata(
        &mut self,
        map: &Map<String, Value>,
        path: &FieldPath,
        known: &[&str],
    ) -> Option<CellMetadata> {
        let name = self.string(map, path, "name");
        let tags = self.string_list(map, path, "tags");
        Some(CellMetadata {
            name: name?,
            tags: tags?,
            extra: extra_fields(map, known),
        })
    }

    fn cell_metadata(&mut self, value: &Value, path: &FieldPath) -> Option<CellMetadata> {
        let map = self.object(value, path)?;
        self.common_metadata(map, path, CELL_METADATA_FIELDS)
    }

    fn raw_metadata(&mut self, value: &Value, path: &FieldPath) -> Option<RawCellMetadata> {
        let map = self.object(value, path)?;
        let common = self.common_metadata(map, path, RAW_METADATA_FIELDS);
        let format = self.string(map, path, "format");
        Some(RawCellMetadata {
            common: common?,
            format: format?,
        })
    }

    fn code_metadata(&mut self, value: &Value, path: &FieldPath) -> Option<CodeCellMetadata> {
        let map = self.object(value, path)?;
        let common = self.common_metadata(map, path, CODE_METADATA_FIELDS);
        let collapsed = self.optional_bool(map, path, "collapsed");
        let scrolled = self.scrolled(map, path);
        Some(CodeCellMetadata {
            common: common?,
            collapsed,
            scrolled,
        })
    }

    fn scrolled(&mut self, map: &Map<String, Value>, path: &FieldPath) -> Option<Scrolled> {
        let value = present(map, "scrolled")?;
        match value {
            Value::Bool(flag) => Some(Scrolled::Flag(*flag)),
            Value::String(s) if s == "auto" => Some(Scrolled::Auto),
            other => {
                self.mismatch(&path.key("scrolled"), "boolean or \"auto\"", other);
                None
            }
        }
    }

    fn source(&mut self, map: &Map<String, Value>, path: &FieldPath) -> Option<Source> {
        self.multiline(map, path, "source")
            .map(Source::from_fragments)
    }

    fn raw_cell(&mut self, map: &Map<String, Value>, path: &FieldPath) -> Option<RawCell> {
        let metadata = self.nested(map, path, "metadata", Self::raw_metadata);
        let source = self.source(map, path);
        Some(RawCell {
            metadata: metadata?,
            source: source?,
            extra: extra_fields(map, CELL_FIELDS),
        })
    }

    fn markdown_cell(&mut self, map: &Map<String, Value>, path: &FieldPath) -> Option<MarkdownCell> {
        let metadata = self.nested(map, path, "metadata", Self::cell_metadata);
        let source = self.source(map, path);
        Some(MarkdownCell {
            metadata: metadata?,
            source: source?,
            extra: extra_fields(map, CELL_FIELDS),
        })
    }

    fn code_cell(&mut self, map: &Map<String, Value>, path: &FieldPath) -> Option<CodeCell> {
        let metadata = self.nested(map, path, "metadata", Self::code_metadata);
        let source = self.source(map, path);
        let outputs = self.outputs(map, path);
        let execution_count = self.optional_count(map, path, "execution_count");
        Some(CodeCell {
            metadata: metadata?,
            source: source?,
            outputs: outputs?,
            execution_count,
            extra: extra_fields(map, CODE_CELL_FIELDS),
        })
    }

    fn unrecognized_cell(
        &mut self,
        cell_type: String,
        map: &Map<String, Value>,
        path: &FieldPath,
    ) -> Option<UnrecognizedCell> {
        let metadata = self.nested(map, path, "metadata", Self::cell_metadata);
        let source = self.source(map, path);
        Some(UnrecognizedCell {
            cell_type,
            metadata: metadata?,
            source: source?,
            extra: extra_fields(map, CELL_FIELDS),
        })
    }

    // Outputs

    fn outputs(&mut self, map: &Map<String, Value>, path: &FieldPath) -> Option<Outputs> {
        let value = self.required(map, path, "outputs")?;
        let path = path.key("outputs");
        let mode = self.options.outputs_mode;
        match value {
            Value::Object(_) if mode.accepts_single() => {
                self.output(value, &path).map(Outputs::Single)
            }
            Value::Array(items) if mode.accepts_sequence() => {
                let mut outputs = Vec::with_capacity(items.len());
                let mut complete = true;
                for (i, item) in items.iter().enumerate() {
                    if self.halted() {
                        return None;
                    }
                    match self.output(item, &path.index(i)) {
                        Some(output) => outputs.push(output),
                        None => complete = false,
                    }
                }
                complete.then_some(Outputs::Sequence(outputs))
            }
            other => {
                self.malformed(&path, mode.expected(), other);
                None
            }
        }
    }

    fn output(&mut self, value: &Value, path: &FieldPath) -> Option<Output> {
        let map = self.object(value, path)?;
        let tag = self.string(map, path, "output_type")?;
        let Ok(output_type) = tag.parse::<OutputType>() else {
            self.report(SchemaError::UnknownDiscriminant {
                path: path.key("output_type"),
                value: tag,
            });
            return None;
        };
        match output_type {
            OutputType::ExecuteResult => self.execute_result(map, path).map(Output::ExecuteResult),
            OutputType::DisplayData => self.display_data(map, path).map(Output::DisplayData),
            OutputType::Stream => self.stream(map, path).map(Output::Stream),
            OutputType::Error => self.error_output(map, path).map(Output::Error),
        }
    }

    fn mime_bundle(&mut self, map: &Map<String, Value>, path: &FieldPath) -> Option<MimeBundle> {
        self.opaque_object(map, path, "data").map(MimeBundle::from)
    }

    fn execute_result(&mut self, map: &Map<String, Value>, path: &FieldPath) -> Option<ExecuteResult> {
        let execution_count = self.count(map, path, "execution_count");
        let data = self.mime_bundle(map, path);
        let metadata = self.opaque_object(map, path, "metadata");
        Some(ExecuteResult {
            execution_count: execution_count?,
            data: data?,
            metadata: metadata?,
            extra: extra_fields(map, EXECUTE_RESULT_FIELDS),
        })
    }

    fn display_data(&mut self, map: &Map<String, Value>, path: &FieldPath) -> Option<DisplayData> {
        let data = self.mime_bundle(map, path);
        let metadata = self.opaque_object(map, path, "metadata");
        Some(DisplayData {
            data: data?,
            metadata: metadata?,
            extra: extra_fields(map, DISPLAY_DATA_FIELDS),
        })
    }

    fn stream(&mut self, map: &Map<String, Value>, path: &FieldPath) -> Option<Stream> {
        let name = self.string(map, path, "name");
        let text = self.multiline(map, path, "text");
        Some(Stream {
            name: name?,
            text: text?,
            extra: extra_fields(map, STREAM_FIELDS),
        })
    }

    fn error_output(&mut self, map: &Map<String, Value>, path: &FieldPath) -> Option<JupyterError> {
        let ename = self.string(map, path, "ename");
        let evalue = self.string(map, path, "evalue");
        let traceback = self.string_list(map, path, "traceback");
        Some(JupyterError {
            ename: ename?,
            evalue: evalue?,
            traceback: traceback?,
            extra: extra_fields(map, ERROR_FIELDS),
        })
    }
}

/// Value of an optional field; `null` counts as absent
fn present<'v>(map: &'v Map<String, Value>, key: &str) -> Option<&'v Value> {
    map.get(key).filter(|value| !value.is_null())
}

/// Members of `map` not named in `known`
fn extra_fields(map: &Map<String, Value>, known: &[&str]) -> Map<String, Value> {
    map.iter()
        .filter(|(key, _)| !known.contains(&key.as_str()))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}
