use std::path::{Path, PathBuf};

use pdbx_cif::WriterOptions;
use serde::{Deserialize, Serialize};

use crate::error::CliError;

/// CLI configuration loaded from pdbx.toml.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PdbxConfig {
    #[serde(default)]
    pub writer: WriterConfig,
    #[serde(default)]
    pub cli: CliSettings,
}

/// Layout used by `format` and `parse --print`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WriterConfig {
    #[serde(default = "default_spacing")]
    pub spacing: usize,
    #[serde(default = "default_true")]
    pub align_columns: bool,
    #[serde(default = "default_max_line_length")]
    pub max_line_length: usize,
    #[serde(default = "default_true")]
    pub category_separators: bool,
}

impl Default for WriterConfig {
    fn default() -> Self {
        Self {
            spacing: default_spacing(),
            align_columns: true,
            max_line_length: default_max_line_length(),
            category_separators: true,
        }
    }
}

impl WriterConfig {
    /// Converts to writer options, rejecting layouts that cannot hold a value.
    pub fn to_options(&self) -> Result<WriterOptions, CliError> {
        if self.spacing == 0 {
            return Err(CliError::Config {
                message: "writer.spacing must be at least 1".to_string(),
            });
        }
        if self.max_line_length == 0 {
            return Err(CliError::Config {
                message: "writer.max_line_length must be at least 1".to_string(),
            });
        }
        Ok(WriterOptions {
            spacing: self.spacing,
            align_columns: self.align_columns,
            max_line_length: self.max_line_length,
            category_separators: self.category_separators,
        })
    }
}

/// CLI-specific settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CliSettings {
    /// File extensions searched for when `parse` is given a directory.
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,
}

impl Default for CliSettings {
    fn default() -> Self {
        Self {
            extensions: default_extensions(),
        }
    }
}

fn default_spacing() -> usize {
    WriterOptions::default().spacing
}

fn default_max_line_length() -> usize {
    WriterOptions::default().max_line_length
}

fn default_true() -> bool {
    true
}

fn default_extensions() -> Vec<String> {
    vec!["cif".to_string(), "mmcif".to_string()]
}

/// Discovery order for config file:
/// 1. `--config <path>` or `PDBX_CONFIG` (explicit)
/// 2. `./pdbx.toml` (project-local)
/// 3. `$XDG_CONFIG_HOME/pdbx/pdbx.toml`
/// 4. `~/.config/pdbx/pdbx.toml`
pub fn load_config(explicit_path: Option<&Path>) -> Result<PdbxConfig, CliError> {
    if let Some(path) = explicit_path {
        return load_config_from_path(path);
    }

    let local = PathBuf::from("pdbx.toml");
    if local.exists() {
        return load_config_from_path(&local);
    }

    if let Some(xdg) = std::env::var_os("XDG_CONFIG_HOME") {
        let path = PathBuf::from(xdg).join("pdbx/pdbx.toml");
        if path.exists() {
            return load_config_from_path(&path);
        }
    }

    if let Some(home) = std::env::var_os("HOME") {
        let path = PathBuf::from(home).join(".config/pdbx/pdbx.toml");
        if path.exists() {
            return load_config_from_path(&path);
        }
    }

    tracing::debug!("no config file found, using defaults");
    Ok(PdbxConfig::default())
}

fn load_config_from_path(path: &Path) -> Result<PdbxConfig, CliError> {
    let contents = std::fs::read_to_string(path).map_err(|e| CliError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    tracing::debug!(path = %path.display(), "loaded config");

    toml::from_str(&contents).map_err(|e| CliError::Config {
        message: format!("failed to parse {}: {}", path.display(), e),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_matches_writer_defaults() {
        let config = PdbxConfig::default();
        assert_eq!(config.writer.to_options().unwrap(), WriterOptions::default());
        assert_eq!(config.cli.extensions, vec!["cif", "mmcif"]);
    }

    #[test]
    fn parse_minimal_toml() {
        let toml_str = r#"
[writer]
spacing = 4
"#;
        let config: PdbxConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.writer.spacing, 4);
        assert!(config.writer.align_columns);
        assert_eq!(config.writer.max_line_length, 2048);
        assert_eq!(config.cli.extensions, vec!["cif", "mmcif"]);
    }

    #[test]
    fn parse_full_toml() {
        let toml_str = r#"
[writer]
spacing = 1
align_columns = false
max_line_length = 80
category_separators = false

[cli]
extensions = ["cif", "txt"]
"#;
        let config: PdbxConfig = toml::from_str(toml_str).unwrap();
        let options = config.writer.to_options().unwrap();
        assert_eq!(
            options,
            WriterOptions {
                spacing: 1,
                align_columns: false,
                max_line_length: 80,
                category_separators: false,
            }
        );
        assert_eq!(config.cli.extensions, vec!["cif", "txt"]);
    }

    #[test]
    fn zero_spacing_is_rejected() {
        let config: PdbxConfig = toml::from_str("[writer]\nspacing = 0\n").unwrap();
        assert!(matches!(
            config.writer.to_options(),
            Err(CliError::Config { .. })
        ));
    }

    #[test]
    fn explicit_path_is_loaded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.toml");
        std::fs::write(&path, "[writer]\nmax_line_length = 100\n").unwrap();
        let config = load_config(Some(&path)).unwrap();
        assert_eq!(config.writer.max_line_length, 100);
    }

    #[test]
    fn missing_explicit_path_is_io_error() {
        let err = load_config(Some(Path::new("/nonexistent/pdbx.toml"))).unwrap_err();
        assert!(matches!(err, CliError::Io { .. }));
    }

    #[test]
    fn invalid_toml_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "[writer\nspacing = ").unwrap();
        let err = load_config(Some(&path)).unwrap_err();
        assert!(matches!(err, CliError::Config { .. }));
    }
}
