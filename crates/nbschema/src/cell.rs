//! Notebook cells and their source text

use serde_json::{Map, Value};

use crate::output::Outputs;

/// Type of a known notebook cell, as written in `cell_type`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CellType {
    /// Raw passthrough cell
    Raw,
    /// Markdown documentation cell
    Markdown,
    /// Executable code cell
    Code,
}

impl std::fmt::Display for CellType {
    #[inline]
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Raw => "raw",
            Self::Markdown => "markdown",
            Self::Code => "code",
        };
        write!(f, "{s}")
    }
}

impl std::str::FromStr for CellType {
    type Err = String;

    /// Parse a wire tag; tags are matched exactly
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "raw" => Ok(Self::Raw),
            "markdown" => Ok(Self::Markdown),
            "code" => Ok(Self::Code),
            _ => Err(format!(
                "Unknown cell type '{s}'. Expected: raw, markdown, code"
            )),
        }
    }
}

/// Cell source text in canonical line form
///
/// Lines are the source split after every `\n`, each keeping its
/// terminator; only the last line may lack one. Building a `Source` from a
/// joined string or from any list of fragments yields the same lines for the
/// same text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Source {
    lines: Vec<String>,
}

impl Source {
    /// Build from one joined string
    #[must_use]
    pub fn from_text(text: &str) -> Self {
        Self {
            lines: text.split_inclusive('\n').map(String::from).collect(),
        }
    }

    /// Build from fragments, re-splitting them on line boundaries
    #[must_use]
    pub fn from_fragments<I, S>(fragments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let text: String = fragments
            .into_iter()
            .map(|fragment| fragment.as_ref().to_owned())
            .collect();
        Self::from_text(&text)
    }

    /// Canonical lines
    #[inline]
    #[must_use]
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Joined source text
    #[inline]
    #[must_use]
    pub fn text(&self) -> String {
        self.lines.concat()
    }

    /// Whether the source is empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

impl From<&str> for Source {
    #[inline]
    fn from(text: &str) -> Self {
        Self::from_text(text)
    }
}

impl From<String> for Source {
    #[inline]
    fn from(text: String) -> Self {
        Self::from_text(&text)
    }
}

/// `metadata.scrolled` of a code cell: a flag or the literal `"auto"`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scrolled {
    /// `true` or `false`
    Flag(bool),
    /// `"auto"`
    Auto,
}

/// Metadata shared by every cell type
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CellMetadata {
    /// Cell name
    pub name: String,
    /// Tags, in input order
    pub tags: Vec<String>,
    /// Unknown metadata keys, kept verbatim
    pub extra: Map<String, Value>,
}

impl CellMetadata {
    /// Metadata with the given name and no tags
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Add a tag
    #[must_use]
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }
}

/// Metadata of a raw cell
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawCellMetadata {
    /// Name, tags and unknown keys
    pub common: CellMetadata,
    /// Target format of the raw content, e.g. a mime type
    pub format: String,
}

/// Metadata of a code cell
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CodeCellMetadata {
    /// Name, tags and unknown keys
    pub common: CellMetadata,
    /// Whether the output area is collapsed
    pub collapsed: Option<bool>,
    /// Output area scrolling
    pub scrolled: Option<Scrolled>,
}

/// Raw passthrough cell
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawCell {
    /// Cell metadata
    pub metadata: RawCellMetadata,
    /// Cell source
    pub source: Source,
    /// Unknown cell fields, kept verbatim
    pub extra: Map<String, Value>,
}

/// Markdown cell
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MarkdownCell {
    /// Cell metadata
    pub metadata: CellMetadata,
    /// Cell source
    pub source: Source,
    /// Unknown cell fields, kept verbatim
    pub extra: Map<String, Value>,
}

/// Code cell
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CodeCell {
    /// Cell metadata
    pub metadata: CodeCellMetadata,
    /// Cell source
    pub source: Source,
    /// Outputs produced by the last execution
    pub outputs: Outputs,
    /// Execution counter; `None` if the cell has not been run
    pub execution_count: Option<u32>,
    /// Unknown cell fields, kept verbatim
    pub extra: Map<String, Value>,
}

impl CodeCell {
    /// Whether the cell carries an execution count
    #[inline]
    #[must_use]
    pub const fn is_executed(&self) -> bool {
        self.execution_count.is_some()
    }
}

/// Cell whose `cell_type` is not a known tag
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UnrecognizedCell {
    /// The `cell_type` as found in the input
    pub cell_type: String,
    /// Cell metadata
    pub metadata: CellMetadata,
    /// Cell source
    pub source: Source,
    /// All other cell fields, kept verbatim
    pub extra: Map<String, Value>,
}

/// One notebook cell
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cell {
    /// `cell_type: "raw"`
    Raw(RawCell),
    /// `cell_type: "markdown"`
    Markdown(MarkdownCell),
    /// `cell_type: "code"`
    Code(CodeCell),
    /// Any other `cell_type`
    Unrecognized(UnrecognizedCell),
}

impl Cell {
    /// Known cell type, or `None` for unrecognized cells
    #[must_use]
    pub const fn cell_type(&self) -> Option<CellType> {
        match self {
            Self::Raw(_) => Some(CellType::Raw),
            Self::Markdown(_) => Some(CellType::Markdown),
            Self::Code(_) => Some(CellType::Code),
            Self::Unrecognized(_) => None,
        }
    }

    /// The `cell_type` tag as written on the wire
    #[must_use]
    pub fn tag(&self) -> &str {
        match self {
            Self::Raw(_) => "raw",
            Self::Markdown(_) => "markdown",
            Self::Code(_) => "code",
            Self::Unrecognized(cell) => &cell.cell_type,
        }
    }

    /// Metadata common to all cell types
    #[must_use]
    pub const fn common_metadata(&self) -> &CellMetadata {
        match self {
            Self::Raw(cell) => &cell.metadata.common,
            Self::Markdown(cell) => &cell.metadata,
            Self::Code(cell) => &cell.metadata.common,
            Self::Unrecognized(cell) => &cell.metadata,
        }
    }

    /// Cell name from metadata
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.common_metadata().name
    }

    /// Cell tags from metadata
    #[inline]
    #[must_use]
    pub fn tags(&self) -> &[String] {
        &self.common_metadata().tags
    }

    /// Cell source
    #[must_use]
    pub const fn source(&self) -> &Source {
        match self {
            Self::Raw(cell) => &cell.source,
            Self::Markdown(cell) => &cell.source,
            Self::Code(cell) => &cell.source,
            Self::Unrecognized(cell) => &cell.source,
        }
    }

    /// The code cell, if this is one
    #[inline]
    #[must_use]
    pub const fn as_code(&self) -> Option<&CodeCell> {
        match self {
            Self::Code(cell) => Some(cell),
            _ => None,
        }
    }
}

impl From<RawCell> for Cell {
    #[inline]
    fn from(cell: RawCell) -> Self {
        Self::Raw(cell)
    }
}

impl From<MarkdownCell> for Cell {
    #[inline]
    fn from(cell: MarkdownCell) -> Self {
        Self::Markdown(cell)
    }
}

impl From<CodeCell> for Cell {
    #[inline]
    fn from(cell: CodeCell) -> Self {
        Self::Code(cell)
    }
}

impl From<UnrecognizedCell> for Cell {
    #[inline]
    fn from(cell: UnrecognizedCell) -> Self {
        Self::Unrecognized(cell)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_from_text_keeps_terminators() {
        let source = Source::from_text("line1\nline2");
        assert_eq!(source.lines(), ["line1\n", "line2"]);

        let source = Source::from_text("a\n\nb\n");
        assert_eq!(source.lines(), ["a\n", "\n", "b\n"]);
    }

    #[test]
    fn test_source_empty() {
        assert!(Source::from_text("").is_empty());
        assert!(Source::from_fragments(Vec::<String>::new()).is_empty());
        assert!(Source::from_fragments([""]).is_empty());
    }

    #[test]
    fn test_source_fragments_resplit() {
        let joined = Source::from_text("line1\nline2");
        let lines = Source::from_fragments(["line1\n", "line2"]);
        let lumped = Source::from_fragments(["line1\nline2"]);
        let split_mid_line = Source::from_fragments(["li", "ne1\nli", "ne2"]);
        assert_eq!(joined, lines);
        assert_eq!(joined, lumped);
        assert_eq!(joined, split_mid_line);
        assert_eq!(joined.text(), "line1\nline2");
    }

    #[test]
    fn test_cell_type_display() {
        assert_eq!(format!("{}", CellType::Raw), "raw");
        assert_eq!(format!("{}", CellType::Markdown), "markdown");
        assert_eq!(format!("{}", CellType::Code), "code");
    }

    #[test]
    fn test_cell_type_from_str_is_exact() {
        assert_eq!("raw".parse::<CellType>().unwrap(), CellType::Raw);
        assert_eq!("markdown".parse::<CellType>().unwrap(), CellType::Markdown);
        assert_eq!("code".parse::<CellType>().unwrap(), CellType::Code);

        assert!("Code".parse::<CellType>().is_err());
        assert!("md".parse::<CellType>().is_err());
        assert!("heading".parse::<CellType>().is_err());
    }

    #[test]
    fn test_cell_accessors() {
        let cell = Cell::from(CodeCell {
            metadata: CodeCellMetadata {
                common: CellMetadata::new("c1").with_tag("slow"),
                ..CodeCellMetadata::default()
            },
            source: Source::from("x = 1"),
            ..CodeCell::default()
        });
        assert_eq!(cell.cell_type(), Some(CellType::Code));
        assert_eq!(cell.tag(), "code");
        assert_eq!(cell.name(), "c1");
        assert_eq!(cell.tags(), ["slow"]);
        assert_eq!(cell.source().text(), "x = 1");
        assert!(!cell.as_code().unwrap().is_executed());
    }

    #[test]
    fn test_unrecognized_tag() {
        let cell = Cell::from(UnrecognizedCell {
            cell_type: "heading".to_string(),
            ..UnrecognizedCell::default()
        });
        assert_eq!(cell.cell_type(), None);
        assert_eq!(cell.tag(), "heading");
        assert!(cell.as_code().is_none());
    }
}
