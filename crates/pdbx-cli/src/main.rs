mod cli;
mod commands;
mod config;
#[allow(unused_assignments)]
mod diagnostic;
mod error;
mod output;

use clap::Parser;
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = cli::Cli::parse();
    let output = output::OutputContext::from_global(&cli.global);
    init_tracing(&output);

    let result = match cli.command {
        cli::Commands::Parse(args) => commands::parse::run(args, &cli.global, &output),
        cli::Commands::Format(args) => commands::format::run(args, &cli.global, &output),
        cli::Commands::Inspect(args) => commands::inspect::run(args, &cli.global, &output),
        cli::Commands::Completions(args) => commands::completions::run(args),
    };

    match result {
        Ok(()) => std::process::exit(0),
        Err(e) => {
            output.print_error(&e);
            std::process::exit(e.exit_code() as i32);
        }
    }
}

/// Log to stderr; `RUST_LOG` overrides the level chosen by `-v` / `-q`.
fn init_tracing(output: &output::OutputContext) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(output.log_level()));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(output.use_color)
        .with_target(false)
        .try_init();
}
