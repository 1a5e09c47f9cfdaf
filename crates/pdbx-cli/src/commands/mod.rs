pub mod completions;
pub mod format;
pub mod inspect;
pub mod parse;

use std::path::Path;

use pdbx_core::DataContainer;

use crate::error::CliError;

/// Read a file and parse it, keeping the text for diagnostics.
pub fn read_and_parse(path: &Path) -> Result<Vec<DataContainer>, CliError> {
    let source_text = std::fs::read_to_string(path).map_err(|e| CliError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    tracing::debug!(path = %path.display(), bytes = source_text.len(), "read input");

    pdbx_cif::parse(&source_text).map_err(|error| CliError::Parse {
        error,
        source_text,
        file: path.to_path_buf(),
    })
}
