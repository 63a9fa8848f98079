use clap::{Args, Parser, Subcommand, ValueEnum};
use std::net::SocketAddr;
use std::path::PathBuf;

/// Verbosity level for output control.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verbosity {
    Quiet,
    Normal,
    Verbose,
}

impl Verbosity {
    /// Log level used when `RUST_LOG` is not set.
    pub fn to_log_level(self) -> String {
        match self {
            Verbosity::Quiet => "error".to_string(),
            Verbosity::Normal => "warn".to_string(),
            Verbosity::Verbose => "debug".to_string(),
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "replay-debug")]
#[command(version, about = "Resolve, run and step through one program operation", long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Only print errors and command output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Configuration file (defaults to ./replay-debugger.toml, then the user config dir)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    pub fn verbosity(&self) -> Verbosity {
        if self.quiet {
            Verbosity::Quiet
        } else if self.verbose {
            Verbosity::Verbose
        } else {
            Verbosity::Normal
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Serve the control API over HTTP
    Serve(ServeArgs),

    /// Start one debug session and print its steps
    Run(RunArgs),

    /// Show an operation's descriptor and module closure without running it
    Inspect(InspectArgs),
}

#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Listen address (overrides [server] bind)
    #[arg(long, value_name = "ADDR")]
    pub bind: Option<SocketAddr>,
}

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Target specifier, e.g. demo.util.Sample#echo(long)
    #[arg(value_name = "SPECIFIER")]
    pub target: String,

    /// Input value as JSON
    #[arg(short, long, value_name = "JSON")]
    pub input: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Pretty)]
    pub output: OutputFormat,

    /// Keep the root call's own intercepted record on the container path
    #[arg(long)]
    pub keep_root_record: bool,
}

#[derive(Args, Debug)]
pub struct InspectArgs {
    /// Target specifier; omit to list every type of the program
    #[arg(value_name = "SPECIFIER")]
    pub target: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Pretty)]
    pub output: OutputFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Pretty,
    Json,
}
