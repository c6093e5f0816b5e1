//! Code cell outputs and mime bundles

use serde_json::{Map, Value};

/// Type of cell output, as written in `output_type`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutputType {
    /// Result of code execution
    ExecuteResult,
    /// Rich display data (images, HTML, etc.)
    DisplayData,
    /// Stream output (stdout/stderr)
    Stream,
    /// Error traceback
    Error,
}

impl std::fmt::Display for OutputType {
    #[inline]
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::ExecuteResult => "execute_result",
            Self::DisplayData => "display_data",
            Self::Stream => "stream",
            Self::Error => "error",
        };
        write!(f, "{s}")
    }
}

impl std::str::FromStr for OutputType {
    type Err = String;

    /// Parse a wire tag; tags are matched exactly
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "execute_result" => Ok(Self::ExecuteResult),
            "display_data" => Ok(Self::DisplayData),
            "stream" => Ok(Self::Stream),
            "error" => Ok(Self::Error),
            _ => Err(format!(
                "Unknown output type '{s}'. Expected: execute_result, display_data, stream, error"
            )),
        }
    }
}

/// Alternative representations of one value, keyed by mime type
///
/// Values are opaque JSON in whatever shape the mime type uses.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MimeBundle(Map<String, Value>);

impl MimeBundle {
    /// Mime key for JSON payloads
    pub const APPLICATION_JSON: &'static str = "application/json";
    /// Mime key for plain text payloads
    pub const TEXT_PLAIN: &'static str = "text/plain";

    /// Empty bundle
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace one representation
    #[must_use]
    pub fn with(mut self, mime: impl Into<String>, value: Value) -> Self {
        self.0.insert(mime.into(), value);
        self
    }

    /// Representation for `mime`, if present
    #[inline]
    #[must_use]
    pub fn get(&self, mime: &str) -> Option<&Value> {
        self.0.get(mime)
    }

    /// The `application/json` representation
    #[inline]
    #[must_use]
    pub fn application_json(&self) -> Option<&Value> {
        self.get(Self::APPLICATION_JSON)
    }

    /// The `text/plain` representation, joined if stored as lines
    #[must_use]
    pub fn text_plain(&self) -> Option<String> {
        match self.get(Self::TEXT_PLAIN)? {
            Value::String(text) => Some(text.clone()),
            Value::Array(lines) => lines
                .iter()
                .map(Value::as_str)
                .collect::<Option<String>>(),
            _ => None,
        }
    }

    /// Mime types present, in key order
    pub fn mime_types(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Number of representations
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the bundle is empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Underlying map
    #[inline]
    #[must_use]
    pub const fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }
}

impl From<Map<String, Value>> for MimeBundle {
    #[inline]
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl From<MimeBundle> for Map<String, Value> {
    #[inline]
    fn from(bundle: MimeBundle) -> Self {
        bundle.0
    }
}

/// `output_type: "execute_result"`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecuteResult {
    /// Execution counter of the producing run
    pub execution_count: u32,
    /// Result representations
    pub data: MimeBundle,
    /// Output metadata, opaque
    pub metadata: Map<String, Value>,
    /// Unknown output fields, kept verbatim
    pub extra: Map<String, Value>,
}

/// `output_type: "display_data"`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DisplayData {
    /// Display representations
    pub data: MimeBundle,
    /// Output metadata, opaque
    pub metadata: Map<String, Value>,
    /// Unknown output fields, kept verbatim
    pub extra: Map<String, Value>,
}

/// `output_type: "stream"`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Stream {
    /// Stream name, e.g. `stdout` or `stderr`
    pub name: String,
    /// Text fragments in arrival order
    pub text: Vec<String>,
    /// Unknown output fields, kept verbatim
    pub extra: Map<String, Value>,
}

impl Stream {
    /// Full stream text
    #[inline]
    #[must_use]
    pub fn joined_text(&self) -> String {
        self.text.concat()
    }
}

/// `output_type: "error"`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JupyterError {
    /// Error type name
    pub ename: String,
    /// Error message
    pub evalue: String,
    /// Traceback, one entry per frame or line
    pub traceback: Vec<String>,
    /// Unknown output fields, kept verbatim
    pub extra: Map<String, Value>,
}

/// One output of a code cell
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Output {
    /// Value of the last expression
    ExecuteResult(ExecuteResult),
    /// Explicitly displayed value
    DisplayData(DisplayData),
    /// Streamed text
    Stream(Stream),
    /// Error report
    Error(JupyterError),
}

impl Output {
    /// Discriminant of this output
    #[must_use]
    pub const fn output_type(&self) -> OutputType {
        match self {
            Self::ExecuteResult(_) => OutputType::ExecuteResult,
            Self::DisplayData(_) => OutputType::DisplayData,
            Self::Stream(_) => OutputType::Stream,
            Self::Error(_) => OutputType::Error,
        }
    }
}

impl From<ExecuteResult> for Output {
    #[inline]
    fn from(output: ExecuteResult) -> Self {
        Self::ExecuteResult(output)
    }
}

impl From<DisplayData> for Output {
    #[inline]
    fn from(output: DisplayData) -> Self {
        Self::DisplayData(output)
    }
}

impl From<Stream> for Output {
    #[inline]
    fn from(output: Stream) -> Self {
        Self::Stream(output)
    }
}

impl From<JupyterError> for Output {
    #[inline]
    fn from(output: JupyterError) -> Self {
        Self::Error(output)
    }
}

/// The `outputs` field of a code cell, in the wire shape it was read in
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outputs {
    /// A single output object
    Single(Output),
    /// An array of outputs
    Sequence(Vec<Output>),
}

impl Default for Outputs {
    #[inline]
    fn default() -> Self {
        Self::Sequence(Vec::new())
    }
}

impl Outputs {
    /// Outputs as a slice, whatever the wire shape
    #[must_use]
    pub fn as_slice(&self) -> &[Output] {
        match self {
            Self::Single(output) => std::slice::from_ref(output),
            Self::Sequence(outputs) => outputs,
        }
    }

    /// Iterate over the outputs in order
    #[inline]
    pub fn iter(&self) -> std::slice::Iter<'_, Output> {
        self.as_slice().iter()
    }

    /// Number of outputs
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.as_slice().len()
    }

    /// Whether there are no outputs
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.as_slice().is_empty()
    }
}

impl<'a> IntoIterator for &'a Outputs {
    type Item = &'a Output;
    type IntoIter = std::slice::Iter<'a, Output>;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_output_type_display() {
        assert_eq!(format!("{}", OutputType::Stream), "stream");
        assert_eq!(format!("{}", OutputType::DisplayData), "display_data");
        assert_eq!(format!("{}", OutputType::ExecuteResult), "execute_result");
        assert_eq!(format!("{}", OutputType::Error), "error");
    }

    #[test]
    fn test_output_type_roundtrip() {
        for output_type in [
            OutputType::Stream,
            OutputType::DisplayData,
            OutputType::ExecuteResult,
            OutputType::Error,
        ] {
            let s = output_type.to_string();
            let parsed: OutputType = s.parse().unwrap();
            assert_eq!(parsed, output_type);
        }
    }

    #[test]
    fn test_output_type_from_str_is_exact() {
        assert!("bogus".parse::<OutputType>().is_err());
        assert!("display-data".parse::<OutputType>().is_err());
        assert!("STREAM".parse::<OutputType>().is_err());
    }

    #[test]
    fn test_mime_bundle_accessors() {
        let bundle = MimeBundle::new()
            .with("application/json", json!({"a": [1, 2]}))
            .with("text/plain", json!(["4", "2"]))
            .with("application/x-custom", json!(7));

        assert_eq!(bundle.len(), 3);
        assert_eq!(bundle.application_json(), Some(&json!({"a": [1, 2]})));
        assert_eq!(bundle.text_plain(), Some("42".to_string()));
        assert_eq!(bundle.get("application/x-custom"), Some(&json!(7)));
        assert!(bundle.mime_types().any(|mime| mime == "application/x-custom"));
    }

    #[test]
    fn test_text_plain_rejects_non_text() {
        let bundle = MimeBundle::new().with("text/plain", json!([1]));
        assert_eq!(bundle.text_plain(), None);
        assert_eq!(MimeBundle::new().text_plain(), None);
    }

    #[test]
    fn test_outputs_as_slice() {
        let stream = Output::from(Stream {
            name: "stdout".to_string(),
            text: vec!["1\n".to_string()],
            ..Stream::default()
        });

        let single = Outputs::Single(stream.clone());
        assert_eq!(single.len(), 1);
        assert_eq!(single.as_slice()[0].output_type(), OutputType::Stream);

        let sequence = Outputs::Sequence(vec![stream.clone(), stream]);
        assert_eq!(sequence.iter().count(), 2);

        assert!(Outputs::default().is_empty());
    }

    #[test]
    fn test_stream_joined_text() {
        let stream = Stream {
            name: "stdout".to_string(),
            text: vec!["hello ".to_string(), "world\n".to_string()],
            ..Stream::default()
        };
        assert_eq!(stream.joined_text(), "hello world\n");
    }
}
