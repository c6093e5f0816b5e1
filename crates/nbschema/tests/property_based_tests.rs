//! Property-Based Tests
//!
//! Tests using property-based testing (proptest) to verify invariants:
//! - Serializing a notebook and validating the result gives it back
//! - Normalization is idempotent
//! - Source text normalizes the same whether joined or split into lines
//! - Output discriminants outside the known set always fail

use nbschema::{
    normalize, serialize, validate, validate_output, Cell, CellMetadata, CodeCell,
    CodeCellMetadata, ExecuteResult, JsonSerializer, JupyterError, MarkdownCell, MimeBundle,
    Notebook, Output, OutputType, Outputs, RawCell, RawCellMetadata, SchemaError, Scrolled,
    SerializeOptions, Source, SourceStyle, Stream, UnrecognizedCell,
};
use proptest::prelude::*;
use serde_json::{json, Map, Value};

// ============================================================================
// Strategies
// ============================================================================

fn text() -> impl Strategy<Value = String> {
    "[a-z0-9 =()\n]{0,40}"
}

fn source() -> impl Strategy<Value = Source> {
    text().prop_map(|t| Source::from_text(&t))
}

fn extra() -> impl Strategy<Value = Map<String, Value>> {
    prop::collection::btree_map("x_[a-z]{1,6}", "[a-z]{0,6}", 0..3).prop_map(|entries| {
        entries
            .into_iter()
            .map(|(key, value)| (key, Value::String(value)))
            .collect()
    })
}

fn common_metadata() -> impl Strategy<Value = CellMetadata> {
    (
        "[a-z]{1,8}",
        prop::collection::vec("[a-z]{1,8}", 0..4),
        extra(),
    )
        .prop_map(|(name, tags, extra)| CellMetadata { name, tags, extra })
}

fn output() -> impl Strategy<Value = Output> {
    prop_oneof![
        ("stdout|stderr", prop::collection::vec(text(), 0..3), extra()).prop_map(
            |(name, text, extra)| Output::Stream(Stream { name, text, extra })
        ),
        (0u32..1000, text()).prop_map(|(execution_count, plain)| {
            Output::ExecuteResult(ExecuteResult {
                execution_count,
                data: MimeBundle::new()
                    .with("text/plain", json!(plain))
                    .with("application/json", json!({"v": execution_count})),
                ..ExecuteResult::default()
            })
        }),
        ("[A-Z][a-z]{0,10}Error", text(), prop::collection::vec(text(), 0..4)).prop_map(
            |(ename, evalue, traceback)| Output::Error(JupyterError {
                ename,
                evalue,
                traceback,
                ..JupyterError::default()
            })
        ),
    ]
}

fn outputs() -> impl Strategy<Value = Outputs> {
    prop_oneof![
        output().prop_map(Outputs::Single),
        prop::collection::vec(output(), 0..4).prop_map(Outputs::Sequence),
    ]
}

fn scrolled() -> impl Strategy<Value = Option<Scrolled>> {
    prop_oneof![
        Just(None::<Scrolled>),
        Just(Some(Scrolled::Auto)),
        any::<bool>().prop_map(|flag| Some(Scrolled::Flag(flag))),
    ]
}

fn cell() -> impl Strategy<Value = Cell> {
    prop_oneof![
        (common_metadata(), source(), extra()).prop_map(|(metadata, source, extra)| {
            Cell::Markdown(MarkdownCell {
                metadata,
                source,
                extra,
            })
        }),
        (common_metadata(), "text/[a-z]{1,6}", source()).prop_map(|(common, format, source)| {
            Cell::Raw(RawCell {
                metadata: RawCellMetadata { common, format },
                source,
                ..RawCell::default()
            })
        }),
        (
            common_metadata(),
            proptest::option::of(any::<bool>()),
            scrolled(),
            source(),
            outputs(),
            proptest::option::of(0u32..500),
        )
            .prop_map(
                |(common, collapsed, scrolled, source, outputs, execution_count)| {
                    Cell::Code(CodeCell {
                        metadata: CodeCellMetadata {
                            common,
                            collapsed,
                            scrolled,
                        },
                        source,
                        outputs,
                        execution_count,
                        ..CodeCell::default()
                    })
                }
            ),
        ("[a-z]{3,10}", common_metadata(), source(), extra())
            .prop_filter("tag must be unknown", |(tag, ..)| {
                !matches!(tag.as_str(), "raw" | "markdown" | "code")
            })
            .prop_map(|(cell_type, metadata, source, extra)| {
                Cell::Unrecognized(UnrecognizedCell {
                    cell_type,
                    metadata,
                    source,
                    extra,
                })
            }),
    ]
}

fn notebook() -> impl Strategy<Value = Notebook> {
    (
        0u32..10,
        0u32..10,
        prop::collection::vec(cell(), 0..6),
        extra(),
    )
        .prop_map(|(nbformat, nbformat_minor, cells, extra)| Notebook {
            nbformat,
            nbformat_minor,
            cells,
            extra,
            ..Notebook::default()
        })
}

// ============================================================================
// Round trip & idempotence
// ============================================================================

/// Property: validate(serialize(N)) == N
#[test]
fn proptest_round_trip() {
    proptest!(|(nb in notebook())| {
        let value = serialize(&nb);
        let back = validate(&value);
        prop_assert!(back.is_ok(), "serialized notebook should validate: {:?}", back.err());
        prop_assert_eq!(back.unwrap(), nb);
    });
}

/// Property: round trip holds with joined source strings too
#[test]
fn proptest_round_trip_joined_source() {
    let serializer = JsonSerializer::with_options(SerializeOptions {
        source_style: SourceStyle::Joined,
        pretty: false,
    });
    proptest!(|(nb in notebook())| {
        let value = serializer.to_value(&nb);
        prop_assert_eq!(validate(&value).unwrap(), nb);
    });
}

/// Property: normalize(normalize(x)) == normalize(x)
#[test]
fn proptest_normalize_idempotent() {
    proptest!(|(nb in notebook())| {
        let once = normalize(&serialize(&nb)).unwrap();
        let twice = normalize(&once).unwrap();
        prop_assert_eq!(once, twice);
    });
}

// ============================================================================
// Source normalization
// ============================================================================

/// Property: any split of the same text normalizes identically
#[test]
fn proptest_source_split_invariant() {
    proptest!(|(text in "[a-z\n]{0,60}", cut in 0usize..60)| {
        let cut = cut.min(text.len());
        let (head, tail) = text.split_at(cut);
        let joined = Source::from_text(&text);
        let fragments = Source::from_fragments([head, tail]);
        prop_assert_eq!(&joined, &fragments);
        prop_assert_eq!(joined.text(), text);
    });
}

/// Property: every canonical line but the last ends with a newline
#[test]
fn proptest_source_lines_terminated() {
    proptest!(|(text in "[a-z\n]{0,60}")| {
        let source = Source::from_text(&text);
        if let Some((_last, init)) = source.lines().split_last() {
            prop_assert!(init.iter().all(|line| line.ends_with('\n')));
        }
        prop_assert!(source.lines().iter().all(|line| !line.is_empty()));
    });
}

// ============================================================================
// Output discriminants
// ============================================================================

/// Property: unknown output_type values always fail with UnknownDiscriminant
#[test]
fn proptest_unknown_output_type_fails() {
    proptest!(|(tag in "[a-z_]{1,16}")| {
        prop_assume!(tag.parse::<OutputType>().is_err());
        let errors = validate_output(&json!({"output_type": tag})).unwrap_err();
        let is_unknown = matches!(
            errors.first(),
            Some(SchemaError::UnknownDiscriminant { value, .. }) if *value == tag
        );
        prop_assert!(is_unknown);
    });
}
