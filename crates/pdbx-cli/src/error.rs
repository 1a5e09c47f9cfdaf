use std::path::PathBuf;

use pdbx_cif::{CifError, ErrorClass, WriteError};

/// Exit codes for the CLI process.
///
/// - 0: success
/// - 1: general error
/// - 2: invalid arguments / configuration
/// - 3: malformed input (lexical or structural)
/// - 4: truncated input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(dead_code)]
pub enum ExitCode {
    Success = 0,
    GeneralError = 1,
    InvalidArguments = 2,
    MalformedInput = 3,
    TruncatedInput = 4,
}

/// Errors returned by CLI command handlers.
///
/// Each variant maps to an `ExitCode` and can produce structured
/// output in JSON mode.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// A file could not be parsed.
    #[error("failed to parse {file}: {error}")]
    Parse {
        error: CifError,
        source_text: String,
        file: PathBuf,
    },

    /// Several files failed; each was already reported.
    #[error("{failed} of {total} files failed to parse")]
    ParseFailures {
        failed: usize,
        total: usize,
        class: ErrorClass,
    },

    /// Parsed data could not be written back.
    #[error("{0}")]
    Write(#[from] WriteError),

    /// IO errors (file not found, permission denied).
    #[error("IO error for {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Configuration errors.
    #[error("configuration error: {message}")]
    Config { message: String },

    /// No mmCIF files under the given path.
    #[error("no mmCIF files found in {path}")]
    NoCifFiles { path: PathBuf },

    /// A requested category is absent from every data block.
    #[error("category '{name}' not found in {file}")]
    CategoryNotFound { name: String, file: PathBuf },

    /// Generic error with message.
    #[error("{0}")]
    Other(String),
}

impl CliError {
    /// Maps this error to the appropriate exit code.
    pub fn exit_code(&self) -> ExitCode {
        match self {
            Self::Parse { error, .. } => class_exit_code(error.class()),
            Self::ParseFailures { class, .. } => class_exit_code(*class),
            Self::Config { .. } | Self::NoCifFiles { .. } => ExitCode::InvalidArguments,
            Self::Write(_)
            | Self::Io { .. }
            | Self::CategoryNotFound { .. }
            | Self::Other(_) => ExitCode::GeneralError,
        }
    }

    /// Serializes this error as a JSON value for `--format json` output.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Self::Parse { error, file, .. } => {
                let mut json = serde_json::json!({
                    "error": "parse_error",
                    "file": file.display().to_string(),
                    "class": class_name(error.class()),
                    "message": error.to_string(),
                });
                if let Some(position) = error.position() {
                    json["line"] = position.line.into();
                    json["column"] = position.column.into();
                }
                json
            }
            Self::ParseFailures {
                failed,
                total,
                class,
            } => serde_json::json!({
                "error": "parse_error",
                "class": class_name(*class),
                "failed": failed,
                "files": total,
            }),
            Self::Write(e) => serde_json::json!({
                "error": "write_error",
                "message": e.to_string(),
            }),
            Self::Io { path, source } => serde_json::json!({
                "error": "io_error",
                "path": path.display().to_string(),
                "message": source.to_string(),
            }),
            Self::Config { message } => serde_json::json!({
                "error": "config_error",
                "message": message,
            }),
            Self::NoCifFiles { path } => serde_json::json!({
                "error": "no_cif_files",
                "path": path.display().to_string(),
            }),
            Self::CategoryNotFound { name, file } => serde_json::json!({
                "error": "category_not_found",
                "category": name,
                "file": file.display().to_string(),
            }),
            Self::Other(msg) => serde_json::json!({
                "error": "error",
                "message": msg,
            }),
        }
    }
}

/// Truncated input gets its own exit code; every other read failure is
/// malformed input, except I/O which is a general error.
pub fn class_exit_code(class: ErrorClass) -> ExitCode {
    match class {
        ErrorClass::Lexical | ErrorClass::Structural => ExitCode::MalformedInput,
        ErrorClass::EndOfStream => ExitCode::TruncatedInput,
        ErrorClass::Io => ExitCode::GeneralError,
    }
}

pub fn class_name(class: ErrorClass) -> &'static str {
    match class {
        ErrorClass::Lexical => "lexical",
        ErrorClass::Structural => "structural",
        ErrorClass::EndOfStream => "end_of_stream",
        ErrorClass::Io => "io",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_error(source: &str) -> CliError {
        CliError::Parse {
            error: pdbx_cif::parse(source).unwrap_err(),
            source_text: source.to_string(),
            file: PathBuf::from("bad.cif"),
        }
    }

    #[test]
    fn exit_code_values() {
        assert_eq!(ExitCode::Success as i32, 0);
        assert_eq!(ExitCode::GeneralError as i32, 1);
        assert_eq!(ExitCode::InvalidArguments as i32, 2);
        assert_eq!(ExitCode::MalformedInput as i32, 3);
        assert_eq!(ExitCode::TruncatedInput as i32, 4);
    }

    #[test]
    fn malformed_input_maps_to_three() {
        let err = parse_error("data_x\n_a.b 'open\n");
        assert_eq!(err.exit_code(), ExitCode::MalformedInput);
        let err = parse_error("data_x\n_a.b 1\n_a.b 2\n");
        assert_eq!(err.exit_code(), ExitCode::MalformedInput);
    }

    #[test]
    fn truncated_input_maps_to_four() {
        let err = parse_error("data_x\n_a.b");
        assert_eq!(err.exit_code(), ExitCode::TruncatedInput);
    }

    #[test]
    fn io_class_is_general_error() {
        let err = CliError::ParseFailures {
            failed: 1,
            total: 2,
            class: ErrorClass::Io,
        };
        assert_eq!(err.exit_code(), ExitCode::GeneralError);
    }

    #[test]
    fn config_error_exit_code() {
        let err = CliError::Config {
            message: "bad".into(),
        };
        assert_eq!(err.exit_code(), ExitCode::InvalidArguments);
    }

    #[test]
    fn no_cif_files_exit_code() {
        let err = CliError::NoCifFiles {
            path: PathBuf::from("structures/"),
        };
        assert_eq!(err.exit_code(), ExitCode::InvalidArguments);
    }

    #[test]
    fn parse_error_json_has_position() {
        let json = parse_error("data_x\n_a.b 'open\n").to_json();
        assert_eq!(json["error"], "parse_error");
        assert_eq!(json["file"], "bad.cif");
        assert_eq!(json["class"], "lexical");
        assert_eq!(json["line"], 2);
        assert_eq!(json["column"], 6);
    }

    #[test]
    fn io_error_json() {
        let err = CliError::Io {
            path: PathBuf::from("/tmp/test.cif"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "not found"),
        };
        let json = err.to_json();
        assert_eq!(json["error"], "io_error");
        assert_eq!(json["path"], "/tmp/test.cif");
    }

    #[test]
    fn category_not_found_json() {
        let err = CliError::CategoryNotFound {
            name: "atom_site".into(),
            file: PathBuf::from("1abc.cif"),
        };
        assert_eq!(err.to_string(), "category 'atom_site' not found in 1abc.cif");
        assert_eq!(err.to_json()["category"], "atom_site");
    }

    #[test]
    fn other_error_json() {
        let err = CliError::Other("something failed".into());
        let json = err.to_json();
        assert_eq!(json["error"], "error");
        assert_eq!(json["message"], "something failed");
    }
}
