use auxsort::engine::config::SortStrategy;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    version,
    about = "AuxSort CLI - Sorts CRT auxiliary detector modules and their sensitive strips into the standard numbering order.",
    help_template = HELP_TEMPLATE,
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output except for errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to a specified file in addition to the console output
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Set the number of threads used to sort modules in parallel.
    /// Defaults to the number of available logical cores.
    #[arg(short = 'j', long, global = true, value_name = "NUM")]
    pub threads: Option<usize>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Sort a geometry given as module and strip tables and write the numbered result.
    Sort(SortArgs),
    /// Print the default sort configuration as TOML.
    Config(ConfigArgs),
}

/// Arguments for the `sort` subcommand.
#[derive(Args, Debug)]
pub struct SortArgs {
    // --- Input / Output ---
    /// Module table (CSV with header `name,x,y,z`, world coordinates in cm).
    #[arg(short, long, required = true, value_name = "PATH")]
    pub modules: PathBuf,

    /// Strip table (CSV with header `module,name,x,y,z`, module-local coordinates in cm).
    #[arg(short, long, value_name = "PATH")]
    pub sensitive: Option<PathBuf>,

    /// Directory receiving `modules.sorted.csv` and `sensitive.sorted.csv`.
    #[arg(short, long, required = true, value_name = "DIR")]
    pub output_dir: PathBuf,

    /// Path to a sort configuration file in TOML format.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    // --- Overrides ---
    /// Override the sort strategy from the config file.
    #[arg(long, value_name = "spatial|volume-name")]
    pub strategy: Option<SortStrategy>,

    /// Override the number given to the first module and strip.
    #[arg(long, value_name = "INT")]
    pub first_index: Option<usize>,

    /// Set a specific configuration value, overriding the config file.
    /// Can be used multiple times. Example: -S modules.tolerance=0.5
    #[arg(short = 'S', long = "set", value_name = "KEY=VALUE", num_args(0..))]
    pub set_values: Vec<String>,
}

/// Arguments for the `config` subcommand.
#[derive(Args, Debug)]
pub struct ConfigArgs {
    /// Write the configuration to a file instead of standard output.
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,
}
