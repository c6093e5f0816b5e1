//! Serialization of the notebook model back to JSON
//!
//! Field names and tag literals are written exactly as the wire format
//! spells them. Unknown fields captured during validation are merged back
//! into the object they came from.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{json, Map, Value};

use crate::cell::{Cell, CellMetadata, Scrolled, Source};
use crate::notebook::{KernelSpec, LanguageInfo, NbData, Notebook, NotebookMetadata};
use crate::options::{SerializeOptions, SourceStyle};
use crate::output::{Output, Outputs};

/// Serialize a notebook with default options
#[must_use]
pub fn serialize(notebook: &Notebook) -> Value {
    JsonSerializer::new().to_value(notebook)
}

/// JSON serializer for notebooks, cells and outputs
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct JsonSerializer {
    options: SerializeOptions,
}

impl JsonSerializer {
    /// Create a new JSON serializer with default options
    #[inline]
    #[must_use = "creates serializer with default options"]
    pub fn new() -> Self {
        Self {
            options: SerializeOptions::default(),
        }
    }

    /// Create a new JSON serializer with custom options
    #[inline]
    #[must_use = "creates serializer with custom options"]
    pub const fn with_options(options: SerializeOptions) -> Self {
        Self { options }
    }

    /// Notebook as a JSON value
    #[must_use]
    pub fn to_value(&self, notebook: &Notebook) -> Value {
        let mut object = notebook.extra.clone();
        object.insert("metadata".into(), notebook_metadata(&notebook.metadata));
        object.insert("nbformat".into(), json!(notebook.nbformat));
        object.insert("nbformat_minor".into(), json!(notebook.nbformat_minor));
        object.insert(
            "cells".into(),
            Value::Array(notebook.cells.iter().map(|cell| self.cell_to_value(cell)).collect()),
        );
        Value::Object(object)
    }

    /// Notebook as JSON text, pretty-printed if configured
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_string(&self, notebook: &Notebook) -> Result<String, serde_json::Error> {
        self.value_to_string(&self.to_value(notebook))
    }

    /// Storage envelope as a JSON value
    #[must_use]
    pub fn nbdata_to_value(&self, data: &NbData) -> Value {
        json!({
            "content": self.to_value(&data.content),
            "name": data.name,
            "path": data.path,
        })
    }

    /// Storage envelope as JSON text
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn nbdata_to_string(&self, data: &NbData) -> Result<String, serde_json::Error> {
        self.value_to_string(&self.nbdata_to_value(data))
    }

    /// One cell as a JSON value
    #[must_use]
    pub fn cell_to_value(&self, cell: &Cell) -> Value {
        let mut object = match cell {
            Cell::Raw(raw) => {
                let mut metadata = cell_metadata(&raw.metadata.common);
                metadata.insert("format".into(), json!(raw.metadata.format));
                let mut object = raw.extra.clone();
                object.insert("metadata".into(), Value::Object(metadata));
                object.insert("source".into(), self.source(&raw.source));
                object
            }
            Cell::Markdown(markdown) => {
                let mut object = markdown.extra.clone();
                object.insert(
                    "metadata".into(),
                    Value::Object(cell_metadata(&markdown.metadata)),
                );
                object.insert("source".into(), self.source(&markdown.source));
                object
            }
            Cell::Code(code) => {
                let mut metadata = cell_metadata(&code.metadata.common);
                if let Some(collapsed) = code.metadata.collapsed {
                    metadata.insert("collapsed".into(), json!(collapsed));
                }
                if let Some(scrolled) = code.metadata.scrolled {
                    metadata.insert("scrolled".into(), scrolled_to_value(scrolled));
                }
                let mut object = code.extra.clone();
                object.insert("metadata".into(), Value::Object(metadata));
                object.insert("source".into(), self.source(&code.source));
                object.insert("outputs".into(), self.outputs(&code.outputs));
                object.insert("execution_count".into(), json!(code.execution_count));
                object
            }
            Cell::Unrecognized(other) => {
                let mut object = other.extra.clone();
                object.insert(
                    "metadata".into(),
                    Value::Object(cell_metadata(&other.metadata)),
                );
                object.insert("source".into(), self.source(&other.source));
                object
            }
        };
        object.insert("cell_type".into(), json!(cell.tag()));
        Value::Object(object)
    }

    /// One output as a JSON value
    #[must_use]
    pub fn output_to_value(&self, output: &Output) -> Value {
        let mut object = match output {
            Output::ExecuteResult(result) => {
                let mut object = result.extra.clone();
                object.insert("execution_count".into(), json!(result.execution_count));
                object.insert("data".into(), Value::Object(result.data.as_map().clone()));
                object.insert("metadata".into(), Value::Object(result.metadata.clone()));
                object
            }
            Output::DisplayData(display) => {
                let mut object = display.extra.clone();
                object.insert("data".into(), Value::Object(display.data.as_map().clone()));
                object.insert("metadata".into(), Value::Object(display.metadata.clone()));
                object
            }
            Output::Stream(stream) => {
                let mut object = stream.extra.clone();
                object.insert("name".into(), json!(stream.name));
                object.insert("text".into(), json!(stream.text));
                object
            }
            Output::Error(error) => {
                let mut object = error.extra.clone();
                object.insert("ename".into(), json!(error.ename));
                object.insert("evalue".into(), json!(error.evalue));
                object.insert("traceback".into(), json!(error.traceback));
                object
            }
        };
        object.insert("output_type".into(), json!(output.output_type().to_string()));
        Value::Object(object)
    }

    fn source(&self, source: &Source) -> Value {
        match self.options.source_style {
            SourceStyle::Lines => json!(source.lines()),
            SourceStyle::Joined => Value::String(source.text()),
        }
    }

    fn outputs(&self, outputs: &Outputs) -> Value {
        match outputs {
            Outputs::Single(output) => self.output_to_value(output),
            Outputs::Sequence(outputs) => Value::Array(
                outputs
                    .iter()
                    .map(|output| self.output_to_value(output))
                    .collect(),
            ),
        }
    }

    fn value_to_string(&self, value: &Value) -> Result<String, serde_json::Error> {
        if self.options.pretty {
            serde_json::to_string_pretty(value)
        } else {
            serde_json::to_string(value)
        }
    }
}

fn notebook_metadata(metadata: &NotebookMetadata) -> Value {
    let mut object = metadata.extra.clone();
    object.insert("kernelspec".into(), kernelspec(&metadata.kernelspec));
    object.insert("language_info".into(), language_info(&metadata.language_info));
    if let Some(orig_nbformat) = metadata.orig_nbformat {
        object.insert("orig_nbformat".into(), json!(orig_nbformat));
    }
    Value::Object(object)
}

fn kernelspec(spec: &KernelSpec) -> Value {
    let mut object = spec.extra.clone();
    object.insert("name".into(), json!(spec.name));
    object.insert("display_name".into(), json!(spec.display_name));
    Value::Object(object)
}

fn language_info(info: &LanguageInfo) -> Value {
    let mut object = info.extra.clone();
    object.insert("name".into(), json!(info.name));
    if let Some(mode) = &info.codemirror_mode {
        object.insert("codemirror_mode".into(), mode.clone());
    }
    let optional = [
        ("file_extension", &info.file_extension),
        ("mimetype", &info.mimetype),
        ("pygments_lexer", &info.pygments_lexer),
    ];
    for (key, value) in optional {
        if let Some(value) = value {
            object.insert(key.into(), json!(value));
        }
    }
    Value::Object(object)
}

fn cell_metadata(metadata: &CellMetadata) -> Map<String, Value> {
    let mut object = metadata.extra.clone();
    object.insert("name".into(), json!(metadata.name));
    object.insert("tags".into(), json!(metadata.tags));
    object
}

fn scrolled_to_value(scrolled: Scrolled) -> Value {
    match scrolled {
        Scrolled::Flag(flag) => Value::Bool(flag),
        Scrolled::Auto => Value::String("auto".to_string()),
    }
}

impl Serialize for Notebook {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        JsonSerializer::new().to_value(self).serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Notebook {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        crate::validate::validate(&value).map_err(serde::de::Error::custom)
    }
}
