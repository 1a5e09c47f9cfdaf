use std::fs::File;
use std::io::BufWriter;

use pdbx_cif::Writer;

use crate::cli::{FormatArgs, GlobalOpts};
use crate::config::load_config;
use crate::error::CliError;
use crate::output::OutputContext;

/// Run the `format` command: parse a file and write it back in canonical layout.
pub fn run(args: FormatArgs, global: &GlobalOpts, output: &OutputContext) -> Result<(), CliError> {
    let config = load_config(global.config.as_deref())?;
    let writer = Writer::new(config.writer.to_options()?);
    let containers = super::read_and_parse(&args.file)?;

    if args.in_place {
        // Render fully before touching the input so a failure leaves it intact.
        let text = writer.to_string(&containers)?;
        std::fs::write(&args.file, text).map_err(|e| CliError::Io {
            path: args.file.clone(),
            source: e,
        })?;
        output.success(&format!("formatted {}", args.file.display()));
    } else if let Some(path) = &args.output {
        let file = File::create(path).map_err(|e| CliError::Io {
            path: path.clone(),
            source: e,
        })?;
        writer
            .write(&containers, BufWriter::new(file))
            .map_err(|e| e.with_path(path))?;
        output.success(&format!(
            "formatted {} -> {}",
            args.file.display(),
            path.display()
        ));
    } else {
        writer.write(&containers, std::io::stdout().lock())?;
    }

    tracing::info!(
        file = %args.file.display(),
        containers = containers.len(),
        "formatted"
    );
    Ok(())
}
