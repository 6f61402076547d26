use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    author = "Marvin Poul",
    version,
    about = "ASSYST CLI - generate, filter and perturb atomic structures for machine learning training sets.",
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
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Apply the configured perturbations to a set of structures.
    Perturb(PerturbArgs),
    /// Keep only the structures that pass the configured filters.
    Filter(FilterArgs),
    /// Print the stoichiometries described by the configuration.
    Formulas(FormulasArgs),
}

#[derive(Args, Debug)]
pub struct PerturbArgs {
    /// JSON file with the input structures.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub input: PathBuf,

    /// JSON file the perturbed structures are written to.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub output: PathBuf,

    /// Pipeline configuration in TOML format.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub config: PathBuf,

    /// Perturbation state file. Resumed from when it exists, rewritten after the run.
    #[arg(long, value_name = "PATH")]
    pub state: Option<PathBuf>,

    /// Override the number of attempts per structure and perturbation.
    #[arg(short, long, value_name = "INT")]
    pub retries: Option<usize>,

    /// Base seed for perturbations that do not set their own.
    #[arg(long, value_name = "INT")]
    pub seed: Option<u64>,

    /// Set a specific configuration value, overriding the config file.
    /// Can be used multiple times. Example: -S retries=20
    #[arg(short = 'S', long = "set", value_name = "KEY=VALUE", num_args(0..))]
    pub set_values: Vec<String>,
}

#[derive(Args, Debug)]
pub struct FilterArgs {
    /// JSON file with the input structures.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub input: PathBuf,

    /// JSON file the accepted structures are written to.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub output: PathBuf,

    /// Pipeline configuration in TOML format; its `filters` are applied.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub config: PathBuf,
}

#[derive(Args, Debug)]
pub struct FormulasArgs {
    /// Pipeline configuration in TOML format; its `formulas` section is used.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub config: PathBuf,

    /// Set a specific configuration value, overriding the config file.
    /// Example: -S formulas.max-atoms=6
    #[arg(short = 'S', long = "set", value_name = "KEY=VALUE", num_args(0..))]
    pub set_values: Vec<String>,
}
