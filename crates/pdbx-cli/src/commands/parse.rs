use std::path::{Path, PathBuf};

use pdbx_cif::{ErrorClass, Writer};

use crate::cli::{GlobalOpts, ParseArgs};
use crate::config::load_config;
use crate::error::{class_name, CliError};
use crate::output::{OutputContext, OutputMode};

/// Run the `parse` command: validate mmCIF files and render diagnostics.
pub fn run(args: ParseArgs, global: &GlobalOpts, output: &OutputContext) -> Result<(), CliError> {
    let config = load_config(global.config.as_deref())?;
    let files = discover_cif_files(&args.paths, &config.cli.extensions)?;
    let writer = Writer::new(config.writer.to_options()?);

    let mut total_containers = 0usize;
    let mut total_categories = 0usize;
    let mut first_failure: Option<ErrorClass> = None;
    let mut failed = 0usize;
    let mut all_file_results: Vec<serde_json::Value> = Vec::new();

    for file in &files {
        let filename = file.display().to_string();

        match super::read_and_parse(file) {
            Ok(containers) => {
                let categories: usize = containers.iter().map(|c| c.len()).sum();
                total_containers += containers.len();
                total_categories += categories;

                let printed = if args.print {
                    Some(writer.to_string(&containers)?)
                } else {
                    None
                };

                match output.mode {
                    OutputMode::Human => {
                        if let Some(text) = &printed {
                            print!("{text}");
                        }
                        output.status(&format!(
                            "  {filename} .... {} blocks, {categories} categories",
                            containers.len()
                        ));
                    }
                    // Reformatted text travels inside the JSON so stdout stays one document.
                    OutputMode::Json => {
                        let mut result = serde_json::json!({
                            "file": filename,
                            "containers": containers.len(),
                            "categories": categories,
                            "error": null,
                        });
                        if let Some(text) = printed {
                            result["text"] = text.into();
                        }
                        all_file_results.push(result);
                    }
                    OutputMode::Plain => {
                        if let Some(text) = &printed {
                            print!("{text}");
                        }
                        println!("{filename}\t{}\t{categories}", containers.len());
                    }
                }
            }
            Err(CliError::Parse {
                error, source_text, ..
            }) => {
                failed += 1;
                first_failure = first_failure.or(Some(error.class()));

                match output.mode {
                    OutputMode::Human => {
                        output.parse_diagnostic(&error, &source_text, &filename);
                    }
                    OutputMode::Json => {
                        let position = error.position();
                        all_file_results.push(serde_json::json!({
                            "file": filename,
                            "containers": 0,
                            "categories": 0,
                            "error": {
                                "class": class_name(error.class()),
                                "message": error.to_string(),
                                "line": position.map(|p| p.line),
                                "column": position.map(|p| p.column),
                            },
                        }));
                    }
                    OutputMode::Plain => {
                        eprintln!("{filename}\terror\t{error}");
                    }
                }
            }
            Err(other) => return Err(other),
        }
    }

    // Summary
    match output.mode {
        OutputMode::Human => {
            let summary = format!(
                "{total_containers} blocks, {total_categories} categories parsed from {} files, {failed} failed",
                files.len()
            );
            if failed > 0 {
                output.warn(&summary);
            } else {
                output.success(&summary);
            }
        }
        OutputMode::Json => {
            let summary = serde_json::json!({
                "files": files.len(),
                "containers": total_containers,
                "categories": total_categories,
                "failed": failed,
                "results": all_file_results,
            });
            output.print_json(&summary);
        }
        OutputMode::Plain => {}
    }

    match first_failure {
        Some(class) => Err(CliError::ParseFailures {
            failed,
            total: files.len(),
            class,
        }),
        None => Ok(()),
    }
}

/// Discover mmCIF files from a list of paths.
///
/// Paths can be files (used directly) or directories (searched recursively
/// for files with one of `extensions`).
fn discover_cif_files(paths: &[PathBuf], extensions: &[String]) -> Result<Vec<PathBuf>, CliError> {
    let mut files = Vec::new();

    for path in paths {
        if path.is_file() {
            files.push(path.clone());
        } else if path.is_dir() {
            for extension in extensions {
                files.extend(glob_extension(path, extension)?);
            }
        } else {
            return Err(CliError::NoCifFiles { path: path.clone() });
        }
    }

    if files.is_empty() {
        let display_path = paths.first().cloned().unwrap_or_else(|| PathBuf::from("."));
        return Err(CliError::NoCifFiles { path: display_path });
    }

    files.sort();
    files.dedup();
    Ok(files)
}

fn glob_extension(dir: &Path, extension: &str) -> Result<Vec<PathBuf>, CliError> {
    let pattern = format!("{}/**/*.{extension}", glob::Pattern::escape(&dir.display().to_string()));
    let entries = glob::glob(&pattern).map_err(|e| CliError::Other(e.to_string()))?;
    entries
        .map(|entry| entry.map_err(|e| CliError::Other(e.to_string())))
        .collect()
}
