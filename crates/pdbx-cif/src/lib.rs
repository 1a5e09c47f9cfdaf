//! # pdbx-cif
//!
//! Reader and writer for PDBx/mmCIF text.
//!
//! This crate provides:
//! - A lazy tokenizer built on logos that handles quoting, `;` text fields,
//!   and comments
//! - A recursive descent parser that yields one `DataContainer` per
//!   `data_` block and reports errors with line and column
//! - A writer that quotes each value just enough to read back unchanged
//! - File, reader, and string wrappers around both
//!
//! # Example
//!
//! ```
//! let source = "data_1ABC\n_cell.length_a 50.840\nloop_\n_atom.id\n_atom.name\n1 N\n2 CA\n";
//!
//! let containers = pdbx_cif::parse(source).expect("parse failed");
//! assert_eq!(containers[0].name(), "1ABC");
//! assert_eq!(containers[0].value("atom", "name", 1).unwrap(), "CA");
//!
//! let text = pdbx_cif::to_string(&containers).expect("write failed");
//! assert_eq!(pdbx_cif::parse(&text).unwrap(), containers);
//! ```

use std::fs::File;
use std::io::{BufWriter, Read};
use std::path::Path;

use pdbx_core::DataContainer;

pub mod error;
mod lexer;
pub mod parser;
pub mod token;
pub mod writer;

pub use error::{CifError, ErrorClass, Position, Span, WriteError};
pub use lexer::{tokenize, SpannedToken, Tokenizer};
pub use parser::{containers, parse, Parser};
pub use token::Token;
pub use writer::{to_string, write, ValueStyle, Writer, WriterOptions};

/// Reads all of `reader` and parses it.
///
/// # Errors
///
/// Read failures and invalid UTF-8 are [`ErrorClass::Io`]; everything else
/// is as for [`parse`].
pub fn parse_reader<R: Read>(mut reader: R) -> Result<Vec<DataContainer>, CifError> {
    let mut source = String::new();
    reader
        .read_to_string(&mut source)
        .map_err(|e| CifError::io(e, None))?;
    parse(&source)
}

/// Opens and parses a file. The file is closed before returning.
pub fn parse_file(path: impl AsRef<Path>) -> Result<Vec<DataContainer>, CifError> {
    let path = path.as_ref();
    let mut file = File::open(path).map_err(|e| CifError::io(e, Some(path)))?;
    let mut source = String::new();
    file.read_to_string(&mut source)
        .map_err(|e| CifError::io(e, Some(path)))?;
    tracing::debug!(path = %path.display(), bytes = source.len(), "read CIF file");
    parse(&source)
}

/// Creates or truncates a file and writes the containers to it.
pub fn write_file(path: impl AsRef<Path>, containers: &[DataContainer]) -> Result<(), WriteError> {
    let path = path.as_ref();
    let file = File::create(path).map_err(|e| WriteError::from(e).with_path(path))?;
    write(containers, BufWriter::new(file)).map_err(|e| e.with_path(path))
}
