use console::{Style, Term};
use pdbx_cif::CifError;

use crate::cli::GlobalOpts;
use crate::error::CliError;

/// Output format mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    Human,
    Json,
    Plain,
}

impl OutputMode {
    /// Maps the `--format` value; clap restricts it to the three names.
    fn from_flag(format: &str) -> Self {
        match format {
            "json" => Self::Json,
            "plain" => Self::Plain,
            _ => Self::Human,
        }
    }
}

/// Severity of a one-line notice on stderr.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tone {
    Ok,
    Warning,
    Error,
}

impl Tone {
    fn label(self) -> &'static str {
        match self {
            Self::Ok => "ok",
            Self::Warning => "warning",
            Self::Error => "error",
        }
    }

    fn style(self) -> Style {
        let style = Style::new().bold();
        match self {
            Self::Ok => style.green(),
            Self::Warning => style.yellow(),
            Self::Error => style.red(),
        }
    }
}

/// Where command results and notices go. Data goes to stdout, everything
/// about the run (notices, diagnostics, logs) to stderr.
pub struct OutputContext {
    pub mode: OutputMode,
    pub use_color: bool,
    verbose: u8,
    quiet: bool,
}

impl OutputContext {
    pub fn from_global(global: &GlobalOpts) -> Self {
        let use_color = !global.no_color
            && std::env::var("TERM").map_or(true, |t| t != "dumb")
            && Term::stderr().is_term();

        Self {
            mode: OutputMode::from_flag(&global.format),
            use_color,
            verbose: global.verbose,
            quiet: global.quiet,
        }
    }

    /// Tracing filter directive implied by `-v` / `-q`.
    pub fn log_level(&self) -> &'static str {
        if self.quiet {
            return "error";
        }
        match self.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }

    /// Human mode only; silenced by `-q`.
    pub fn success(&self, msg: &str) {
        if self.mode == OutputMode::Human {
            self.notice(Tone::Ok, msg);
        }
    }

    /// Silenced by `-q`.
    pub fn warn(&self, msg: &str) {
        self.notice(Tone::Warning, msg);
    }

    /// Progress line for human readers; silenced by `-q`.
    pub fn status(&self, msg: &str) {
        if !self.quiet && self.mode == OutputMode::Human {
            eprintln!("{msg}");
        }
    }

    /// Reports a failed command. Never silenced.
    pub fn print_error(&self, err: &CliError) {
        match (self.mode, err) {
            (
                OutputMode::Human,
                CliError::Parse {
                    error,
                    source_text,
                    file,
                },
            ) => self.parse_diagnostic(error, source_text, &file.display().to_string()),
            (OutputMode::Json, _) => eprintln!("{}", err.to_json()),
            _ => self.emit(Tone::Error, &err.to_string()),
        }
    }

    /// Renders a parse error against its source with miette.
    pub fn parse_diagnostic(&self, error: &CifError, source: &str, filename: &str) {
        let report = crate::diagnostic::render_diagnostic(error, source, filename);
        eprintln!("{report:?}");
    }

    pub fn print_json(&self, value: &serde_json::Value) {
        if let Ok(s) = serde_json::to_string_pretty(value) {
            println!("{s}");
        }
    }

    fn notice(&self, tone: Tone, msg: &str) {
        if !self.quiet {
            self.emit(tone, msg);
        }
    }

    fn emit(&self, tone: Tone, msg: &str) {
        match self.mode {
            OutputMode::Human if self.use_color => {
                eprintln!("{} {msg}", tone.style().apply_to(format!("{}:", tone.label())));
            }
            OutputMode::Human => eprintln!("{}: {msg}", tone.label()),
            OutputMode::Json => eprintln!("{}", serde_json::json!({ tone.label(): msg })),
            OutputMode::Plain => eprintln!("{}\t{msg}", tone.label()),
        }
    }
}
