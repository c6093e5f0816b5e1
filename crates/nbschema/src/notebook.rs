//! Notebook documents and their storage envelope

use serde_json::{Map, Value};

use crate::cell::Cell;

/// Kernel the notebook was written for
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KernelSpec {
    /// Kernel name (e.g., "python3", "ir")
    pub name: String,
    /// Human-readable kernel name
    pub display_name: String,
    /// Unknown keys, kept verbatim
    pub extra: Map<String, Value>,
}

/// Programming language of the notebook
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LanguageInfo {
    /// Language name (e.g., "python", "R")
    pub name: String,
    /// Editor mode; a string or an object, kept opaque
    pub codemirror_mode: Option<Value>,
    /// Source file extension, e.g. ".py"
    pub file_extension: Option<String>,
    /// Source mime type
    pub mimetype: Option<String>,
    /// Lexer name used for highlighting
    pub pygments_lexer: Option<String>,
    /// Unknown keys, kept verbatim
    pub extra: Map<String, Value>,
}

/// Notebook-level metadata
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NotebookMetadata {
    /// Kernel specification
    pub kernelspec: KernelSpec,
    /// Language information
    pub language_info: LanguageInfo,
    /// Format major version the notebook was originally written in
    pub orig_nbformat: Option<u32>,
    /// Unknown keys, kept verbatim
    pub extra: Map<String, Value>,
}

/// A validated notebook document
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Notebook {
    /// Notebook-level metadata
    pub metadata: NotebookMetadata,
    /// Format major version
    pub nbformat: u32,
    /// Format minor version
    pub nbformat_minor: u32,
    /// Cells in display order
    pub cells: Vec<Cell>,
    /// Unknown top-level fields, kept verbatim
    pub extra: Map<String, Value>,
}

impl Notebook {
    /// Code cells in display order
    pub fn code_cells(&self) -> impl Iterator<Item = &crate::CodeCell> {
        self.cells.iter().filter_map(Cell::as_code)
    }

    /// First cell whose metadata name matches
    #[must_use]
    pub fn cell_by_name(&self, name: &str) -> Option<&Cell> {
        self.cells.iter().find(|cell| cell.name() == name)
    }
}

/// A notebook together with where it is stored
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NbData {
    /// The notebook
    pub content: Notebook,
    /// Display or file name
    pub name: String,
    /// Storage location
    pub path: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::{CellMetadata, CodeCell, CodeCellMetadata, MarkdownCell};

    fn sample() -> Notebook {
        Notebook {
            nbformat: 4,
            nbformat_minor: 5,
            cells: vec![
                Cell::Markdown(MarkdownCell {
                    metadata: CellMetadata::new("intro"),
                    ..MarkdownCell::default()
                }),
                Cell::Code(CodeCell {
                    metadata: CodeCellMetadata {
                        common: CellMetadata::new("c1"),
                        ..CodeCellMetadata::default()
                    },
                    execution_count: Some(1),
                    ..CodeCell::default()
                }),
            ],
            ..Notebook::default()
        }
    }

    #[test]
    fn test_code_cells() {
        let notebook = sample();
        let code: Vec<_> = notebook.code_cells().collect();
        assert_eq!(code.len(), 1);
        assert_eq!(code[0].execution_count, Some(1));
    }

    #[test]
    fn test_cell_by_name() {
        let notebook = sample();
        assert_eq!(notebook.cell_by_name("intro").map(Cell::tag), Some("markdown"));
        assert!(notebook.cell_by_name("missing").is_none());
    }
}
