use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand};

/// Reader, validator, and formatter for PDBx/mmCIF files.
///
/// Parses mmCIF data blocks into categories and rows, reports malformed
/// input with line and column, and rewrites files in a canonical layout.
#[derive(Parser)]
#[command(
    name = "pdbx",
    version,
    about = "Reader, validator, and formatter for PDBx/mmCIF files",
    after_help = "Use 'pdbx <command> --help' for more information about a command.",
    propagate_version = true
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalOpts,
}

/// Global options available to all subcommands.
#[derive(Args, Debug)]
pub struct GlobalOpts {
    /// Configuration file path [env: PDBX_CONFIG]
    #[arg(short = 'c', long = "config", global = true, env = "PDBX_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output format: human (default), json, plain
    #[arg(
        long,
        global = true,
        default_value = "human",
        value_parser = ["human", "json", "plain"]
    )]
    pub format: String,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short = 'v', long = "verbose", global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Suppress all non-error output
    #[arg(short = 'q', long = "quiet", global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output [env: NO_COLOR]
    #[arg(long = "no-color", global = true, env = "NO_COLOR")]
    pub no_color: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Parse and validate mmCIF files
    Parse(ParseArgs),

    /// Rewrite an mmCIF file in canonical layout
    Format(FormatArgs),

    /// Inspect the data blocks and categories of an mmCIF file
    Inspect(InspectArgs),

    /// Generate shell completion scripts
    Completions(CompletionsArgs),
}

/// Arguments for `pdbx parse`.
#[derive(Args, Debug)]
pub struct ParseArgs {
    /// Files or directories to parse (directories are searched recursively)
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,

    /// Print the parsed data back through the writer (as a "text" field in JSON output)
    #[arg(long)]
    pub print: bool,
}

/// Arguments for `pdbx format`.
#[derive(Args, Debug)]
pub struct FormatArgs {
    /// File to format
    pub file: PathBuf,

    /// Write the result here instead of stdout
    #[arg(short = 'o', long = "output", conflicts_with = "in_place")]
    pub output: Option<PathBuf>,

    /// Overwrite the input file
    #[arg(long = "in-place")]
    pub in_place: bool,
}

/// Arguments for `pdbx inspect`.
#[derive(Args, Debug)]
pub struct InspectArgs {
    /// File to inspect
    pub file: PathBuf,

    /// Show the rows of one category
    #[arg(long)]
    pub category: Option<String>,
}

/// Arguments for `pdbx completions`.
#[derive(Args, Debug)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_parser = ["bash", "zsh", "fish", "powershell", "elvish"])]
    pub shell: String,
}
