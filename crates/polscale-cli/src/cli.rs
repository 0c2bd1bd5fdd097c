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
    author,
    version,
    about = "polscale - scales Lennard-Jones parameters of polarizable force fields to remove double-counted induction.",
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

    /// Set the number of threads for the scaling pass.
    /// Defaults to the number of available logical cores.
    #[arg(short = 'j', long, global = true, value_name = "NUM")]
    pub threads: Option<usize>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Scale the Lennard-Jones parameters of a force field and write the result.
    Scale(ScaleArgs),
    /// Run the whole scaling pass and report coverage without writing any output.
    Check(CheckArgs),
}

/// Inputs shared by every command.
#[derive(Args, Debug, Clone, Default)]
pub struct InputArgs {
    /// Force field XML file to scale.
    #[arg(short = 'x', long, value_name = "PATH")]
    pub forcefield: Option<PathBuf>,

    /// Atomic polarizability table [default: alpha.ff].
    #[arg(short = 'a', long = "alpha", value_name = "PATH")]
    pub polarizability: Option<PathBuf>,

    /// Monomer and dimer table [default: fragment.inp].
    #[arg(short, long, value_name = "PATH")]
    pub monomers: Option<PathBuf>,

    /// Fragment membership table [default: fragment.ff].
    #[arg(short, long, value_name = "PATH")]
    pub fragments: Option<PathBuf>,

    /// Directory holding one structure file per fragment [default: .].
    #[arg(long, value_name = "DIR")]
    pub structures_dir: Option<PathBuf>,

    /// Use the reference factors of the dimer table instead of predicted ones.
    #[arg(short, long)]
    pub reference: bool,

    /// Scale sigma too: an optional factor [default: 0.985] followed by optional
    /// fragment names (all non-polarizable fragments when none are given).
    #[arg(
        short = 's',
        long = "scale-sigma",
        num_args = 0..,
        value_name = "FACTOR|FRAGMENT"
    )]
    pub scale_sigma: Option<Vec<String>>,

    /// Monomers whose polarization is already modelled explicitly.
    #[arg(short, long, num_args = 1.., value_name = "NAME")]
    pub polarizable: Vec<String>,

    /// Path to a configuration file in TOML format.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

/// Arguments for the `scale` subcommand.
#[derive(Args, Debug)]
pub struct ScaleArgs {
    #[command(flatten)]
    pub inputs: InputArgs,

    /// Path for the scaled force field [default: <forcefield>-sc.xml].
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Also export the fragment pair table as CSV.
    #[arg(long, value_name = "PATH")]
    pub pairs_csv: Option<PathBuf>,
}

/// Arguments for the `check` subcommand.
#[derive(Args, Debug)]
pub struct CheckArgs {
    #[command(flatten)]
    pub inputs: InputArgs,
}
