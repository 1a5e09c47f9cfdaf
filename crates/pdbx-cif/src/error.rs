use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

use pdbx_core::ModelError;

/// A byte-offset span in the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    /// Inclusive start byte offset.
    pub start: usize,
    /// Exclusive end byte offset.
    pub end: usize,
}

impl Span {
    /// Creates a new span from start (inclusive) to end (exclusive).
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

/// Where a token or error sits in the source: 1-based line and column
/// (columns count characters) plus the byte span.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    pub line: usize,
    pub column: usize,
    pub span: Span,
}

impl Position {
    pub fn new(line: usize, column: usize, span: Span) -> Self {
        Self { line, column, span }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}, column {}", self.line, self.column)
    }
}

/// Coarse classification of a [`CifError`].
///
/// `EndOfStream` is kept apart from `Structural` so callers can tell a
/// truncated transfer from a corrupt one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorClass {
    /// Bad quoting, text fields, or item names.
    Lexical,
    /// Grammar violations in otherwise well-formed tokens.
    Structural,
    /// Input ended in the middle of a construct.
    EndOfStream,
    /// Reading the input failed.
    Io,
}

/// Errors raised while reading CIF text.
#[derive(Debug)]
#[non_exhaustive]
pub enum CifError {
    /// A quoted value has no closing quote on its line.
    UnterminatedQuote { quote: char, position: Position },

    /// A `;` text field is never closed.
    UnterminatedTextField { position: Position },

    /// A tag is not of the form `_category.attribute`.
    InvalidItemName { text: String, position: Position },

    /// The lexer could not match the input at all.
    InvalidCharacter { position: Position },

    /// A token that cannot appear here.
    UnexpectedToken {
        expected: String,
        found: String,
        position: Position,
    },

    /// A tag outside a loop is not followed by a value.
    MissingValue {
        item: String,
        found: String,
        position: Position,
    },

    /// A category appears in both key-value and loop form, or is looped twice.
    DuplicateCategory { category: String, position: Position },

    /// An attribute is declared twice for the same category.
    DuplicateAttribute {
        category: String,
        attribute: String,
        position: Position,
    },

    /// A loop header mixes tags from two categories.
    LoopCategoryChanged {
        expected: String,
        found: String,
        position: Position,
    },

    /// The loop body does not divide evenly into rows.
    LoopValueCount {
        category: String,
        columns: usize,
        values: usize,
        position: Position,
    },

    /// A loop header is followed by no values.
    EmptyLoop { category: String, position: Position },

    /// A save frame is still open at `data_` or end of input.
    UnterminatedSaveFrame { name: String, position: Position },

    /// A save frame opened inside another one.
    NestedSaveFrame {
        name: String,
        outer: String,
        position: Position,
    },

    /// A bare `save_` with no open frame.
    StraySaveTerminator { position: Position },

    /// Content before the first `data_` block.
    OutsideDataBlock { found: String, position: Position },

    /// The model rejected a name or value taken from the input.
    Model { source: ModelError, position: Position },

    /// Input ended where more tokens were required.
    UnexpectedEndOfInput { expected: String, position: Position },

    /// The input could not be read.
    Io {
        path: Option<PathBuf>,
        source: io::Error,
    },
}

impl CifError {
    /// Returns the error class.
    pub fn class(&self) -> ErrorClass {
        match self {
            Self::UnterminatedQuote { .. }
            | Self::UnterminatedTextField { .. }
            | Self::InvalidItemName { .. }
            | Self::InvalidCharacter { .. } => ErrorClass::Lexical,
            Self::UnexpectedEndOfInput { .. } => ErrorClass::EndOfStream,
            Self::Io { .. } => ErrorClass::Io,
            _ => ErrorClass::Structural,
        }
    }

    /// Source position of the error, if it came from parsing.
    pub fn position(&self) -> Option<&Position> {
        match self {
            Self::UnterminatedQuote { position, .. }
            | Self::UnterminatedTextField { position }
            | Self::InvalidItemName { position, .. }
            | Self::InvalidCharacter { position }
            | Self::UnexpectedToken { position, .. }
            | Self::MissingValue { position, .. }
            | Self::DuplicateCategory { position, .. }
            | Self::DuplicateAttribute { position, .. }
            | Self::LoopCategoryChanged { position, .. }
            | Self::LoopValueCount { position, .. }
            | Self::EmptyLoop { position, .. }
            | Self::UnterminatedSaveFrame { position, .. }
            | Self::NestedSaveFrame { position, .. }
            | Self::StraySaveTerminator { position }
            | Self::OutsideDataBlock { position, .. }
            | Self::Model { position, .. }
            | Self::UnexpectedEndOfInput { position, .. } => Some(position),
            Self::Io { .. } => None,
        }
    }

    pub(crate) fn io(source: io::Error, path: Option<&Path>) -> Self {
        Self::Io {
            path: path.map(Path::to_path_buf),
            source,
        }
    }
}

impl fmt::Display for CifError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnterminatedQuote { quote, position } => {
                write!(
                    f,
                    "unterminated quoted value at {position}: no closing {quote} followed by whitespace on this line"
                )
            }
            Self::UnterminatedTextField { position } => {
                write!(
                    f,
                    "unterminated text field at {position}: expected a line starting with ';'"
                )
            }
            Self::InvalidItemName { text, position } => {
                write!(
                    f,
                    "invalid item name '{text}' at {position}: expected _category.attribute"
                )
            }
            Self::InvalidCharacter { position } => {
                write!(f, "invalid character at {position}")
            }
            Self::UnexpectedToken {
                expected,
                found,
                position,
            } => {
                write!(
                    f,
                    "unexpected token at {position}: expected {expected}, found {found}"
                )
            }
            Self::MissingValue {
                item,
                found,
                position,
            } => {
                write!(f, "missing value for {item} at {position}: found {found}")
            }
            Self::DuplicateCategory { category, position } => {
                write!(
                    f,
                    "duplicate category '{category}' at {position}: already defined in this block"
                )
            }
            Self::DuplicateAttribute {
                category,
                attribute,
                position,
            } => {
                write!(
                    f,
                    "duplicate attribute '_{category}.{attribute}' at {position}"
                )
            }
            Self::LoopCategoryChanged {
                expected,
                found,
                position,
            } => {
                write!(
                    f,
                    "loop header changes category at {position}: expected '{expected}', found '{found}'"
                )
            }
            Self::LoopValueCount {
                category,
                columns,
                values,
                position,
            } => {
                write!(
                    f,
                    "loop for '{category}' at {position} has {values} values, not a multiple of {columns} columns"
                )
            }
            Self::EmptyLoop { category, position } => {
                write!(f, "loop for '{category}' at {position} has no values")
            }
            Self::UnterminatedSaveFrame { name, position } => {
                write!(
                    f,
                    "save frame '{name}' opened at {position} is never closed with save_"
                )
            }
            Self::NestedSaveFrame {
                name,
                outer,
                position,
            } => {
                write!(
                    f,
                    "save frame '{name}' at {position} is nested inside '{outer}'"
                )
            }
            Self::StraySaveTerminator { position } => {
                write!(f, "save_ at {position} closes no open save frame")
            }
            Self::OutsideDataBlock { found, position } => {
                write!(
                    f,
                    "{found} at {position} appears before the first data_ block"
                )
            }
            Self::Model { source, position } => {
                write!(f, "invalid content at {position}: {source}")
            }
            Self::UnexpectedEndOfInput { expected, position } => {
                write!(
                    f,
                    "unexpected end of input at {position}: expected {expected}"
                )
            }
            Self::Io {
                path: Some(path),
                source,
            } => {
                write!(f, "failed to read '{}': {source}", path.display())
            }
            Self::Io { path: None, source } => {
                write!(f, "failed to read input: {source}")
            }
        }
    }
}

impl std::error::Error for CifError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Model { source, .. } => Some(source),
            Self::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Errors raised while writing CIF text.
#[derive(Debug)]
#[non_exhaustive]
pub enum WriteError {
    /// A value that needs a text field has a line starting with `;` or a
    /// line ending in a carriage return, so it would not read back intact.
    UnrepresentableValue {
        category: String,
        attribute: String,
        row: usize,
    },

    /// The output could not be written.
    Io {
        path: Option<PathBuf>,
        source: io::Error,
    },
}

impl WriteError {
    /// Attaches a file path to an I/O error.
    pub fn with_path(self, path: &Path) -> Self {
        match self {
            Self::Io { source, .. } => Self::Io {
                path: Some(path.to_path_buf()),
                source,
            },
            other => other,
        }
    }
}

impl From<io::Error> for WriteError {
    fn from(source: io::Error) -> Self {
        Self::Io { path: None, source }
    }
}

impl fmt::Display for WriteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnrepresentableValue {
                category,
                attribute,
                row,
            } => {
                write!(
                    f,
                    "value of '_{category}.{attribute}' in row {row} cannot be written as a text field: a line starts with ';' or ends with a carriage return"
                )
            }
            Self::Io {
                path: Some(path),
                source,
            } => {
                write!(f, "failed to write '{}': {source}", path.display())
            }
            Self::Io { path: None, source } => {
                write!(f, "failed to write output: {source}")
            }
        }
    }
}

impl std::error::Error for WriteError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::UnrepresentableValue { .. } => None,
        }
    }
}
