use miette::{Diagnostic, NamedSource, SourceSpan};
use pdbx_cif::CifError;

/// A diagnostic wrapping a `CifError` for rich miette rendering.
///
/// The module-level `#[allow(unused_assignments)]` in main.rs is required
/// because miette's derive macro generates assignment patterns that rustc
/// flags as unused.
#[derive(Debug, thiserror::Error, Diagnostic)]
#[error("{message}")]
pub struct CifDiagnostic {
    #[source_code]
    src: NamedSource<String>,

    #[label("{label}")]
    span: SourceSpan,

    message: String,
    label: String,

    #[help]
    suggestion: Option<String>,
}

/// Convert a `CifError` into a miette `CifDiagnostic`.
pub fn cif_error_to_diagnostic(error: &CifError, source: &str, filename: &str) -> CifDiagnostic {
    let (label, suggestion) = describe(error);
    let span = match error.position() {
        Some(position) => {
            let span = position.span;
            (span.start, span.end.saturating_sub(span.start)).into()
        }
        None => (0, 0).into(),
    };

    CifDiagnostic {
        src: NamedSource::new(filename, source.to_string()),
        span,
        message: error.to_string(),
        label,
        suggestion,
    }
}

fn describe(error: &CifError) -> (String, Option<String>) {
    match error {
        CifError::UnterminatedQuote { quote, .. } => (
            "quote opened here".to_string(),
            Some(format!(
                "Close the value with {quote} followed by whitespace, or use a ';' text field."
            )),
        ),
        CifError::UnterminatedTextField { .. } => (
            "text field opened here".to_string(),
            Some("End the text field with a line starting with ';'.".to_string()),
        ),
        CifError::InvalidItemName { .. } => (
            "not a _category.attribute name".to_string(),
            Some("Item names need a category and an attribute separated by '.'.".to_string()),
        ),
        CifError::InvalidCharacter { .. } => ("unrecognized input".to_string(), None),
        CifError::UnexpectedToken { expected, .. } => (format!("expected {expected}"), None),
        CifError::MissingValue { item, .. } => (
            format!("{item} needs a value"),
            Some("Write '?' for an unknown value or '.' for an inapplicable one.".to_string()),
        ),
        CifError::DuplicateCategory { category, .. } => (
            format!("'{category}' already defined in this block"),
            None,
        ),
        CifError::DuplicateAttribute { attribute, .. } => {
            (format!("'{attribute}' already defined"), None)
        }
        CifError::LoopCategoryChanged { expected, .. } => (
            format!("loop columns must all belong to '{expected}'"),
            Some("Start a new loop_ for the other category.".to_string()),
        ),
        CifError::LoopValueCount { columns, .. } => (
            format!("values do not fill rows of {columns} columns"),
            Some("Check for an unquoted value containing whitespace.".to_string()),
        ),
        CifError::EmptyLoop { .. } => ("loop has no values".to_string(), None),
        CifError::UnterminatedSaveFrame { name, .. } => (
            format!("save_{name} is still open"),
            Some("Close the frame with a bare 'save_'.".to_string()),
        ),
        CifError::NestedSaveFrame { outer, .. } => {
            (format!("inside save_{outer}"), None)
        }
        CifError::StraySaveTerminator { .. } => ("no save frame is open".to_string(), None),
        CifError::OutsideDataBlock { .. } => (
            "outside any data block".to_string(),
            Some("Add a data_ header before the first item.".to_string()),
        ),
        CifError::Model { .. } => ("rejected here".to_string(), None),
        CifError::UnexpectedEndOfInput { expected, .. } => (
            "input ended here".to_string(),
            Some(format!("The file may be truncated; expected {expected}.")),
        ),
        _ => ("here".to_string(), None),
    }
}

/// Render a parse error as a miette report.
pub fn render_diagnostic(error: &CifError, source: &str, filename: &str) -> miette::Report {
    miette::Report::new(cif_error_to_diagnostic(error, source, filename))
}
