// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// Command-line arguments for `pixrun`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "pixrun",
    version,
    about = "Run PIX robot scripts and report success or failure.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the config file (TOML).
    ///
    /// Default: `Pixrun.toml` in the current working directory. A missing
    /// default file is not an error; built-in defaults are used instead.
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `PIXRUN_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL", global = true)]
    pub log_level: Option<LogLevel>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Run a robot script in this process.
    Run(RunArgs),

    /// Start the runner flow as a named child run and wait for it.
    Trigger(TriggerArgs),

    /// Print the resolved robot executable.
    Locate,

    /// Print the flow definition, task resource tags and deploy settings.
    Describe,
}

/// Flow parameters shared by `run` and `trigger`.
#[derive(Debug, Clone, Args)]
pub struct RequestArgs {
    /// Path to the `.pix` script.
    #[arg(long, value_name = "PATH", required_unless_present = "request")]
    pub script: Option<String>,

    /// Script parameters passed verbatim (quoted) to the robot.
    #[arg(long, value_name = "STRING", conflicts_with = "params_json")]
    pub params: Option<String>,

    /// Script parameters as a JSON object, passed to the robot as JSON.
    #[arg(long, value_name = "JSON")]
    pub params_json: Option<String>,

    /// Explicit robot executable; skips discovery.
    #[arg(long, value_name = "PATH")]
    pub robot_path: Option<PathBuf>,

    /// Whether the robot GUI is shown (yes/y/true/1 mean yes).
    #[arg(long, value_name = "VALUE")]
    pub need_gui: Option<String>,

    /// JSON file holding the whole parameter bundle
    /// (`script_path`, `script_parameters`, `robot_path`, `need_gui`).
    /// Flags given on the command line override its entries.
    #[arg(long, value_name = "FILE")]
    pub request: Option<PathBuf>,
}

#[derive(Debug, Clone, Args)]
pub struct RunArgs {
    #[command(flatten)]
    pub request: RequestArgs,

    /// Build and print the command without executing it.
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Debug, Clone, Args)]
pub struct TriggerArgs {
    /// Task name; the child run is called `RUNNER_<name>`.
    #[arg(long, value_name = "NAME")]
    pub name: String,

    #[command(flatten)]
    pub request: RequestArgs,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
