use atoll::engine::domain::NumberingMode;
use atoll::engine::scoring::SubstitutionMatrix;
use clap::{Args, Parser};
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    name = "atoll",
    author = "Célien Jacquemard, Guillaume Bret",
    version,
    about = "ATOLL CLI - Maps reference helix and alignment selections onto a set of related protein structures through their sequence alignment.",
    help_template = HELP_TEMPLATE,
)]
pub struct Cli {
    #[command(flatten)]
    pub run: RunArgs,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output except for errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to a specified file in addition to the console output
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Set the number of threads for parallel computation.
    /// Defaults to the number of available logical cores.
    #[arg(short = 'j', long, global = true, value_name = "NUM")]
    pub threads: Option<usize>,
}

/// Arguments of a comparison run.
#[derive(Args, Debug)]
pub struct RunArgs {
    // --- Input ---
    /// Reference structure file (PDB), or an ensemble directory holding one topology file.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub reference: PathBuf,

    /// Information file (CSV) listing the structures to analyze.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub info: PathBuf,

    /// Sequence file (FASTA) of the studied proteins.
    #[arg(short, long, value_name = "PATH")]
    pub sequence: Option<PathBuf>,

    // --- Selection ---
    /// Residue numbering to report selections in [default: position]
    #[arg(long, value_name = "MODE")]
    pub resnum: Option<NumberingMode>,

    /// Selection of residues involved in structure alignment (reference numbering).
    #[arg(long, value_name = "SELECTION")]
    pub resalign: Option<String>,

    /// Selection of transmembrane helix ends to analyze (reference numbering).
    #[arg(long, required = true, value_name = "SELECTION")]
    pub reshelix: String,

    /// Prefix of the generated selection labels [default: TM]
    #[arg(long, value_name = "PREFIX")]
    pub prefix: Option<String>,

    // --- Alignment Overrides ---
    /// Substitution matrix: blosum62, blosum45 or identity.
    #[arg(long, value_name = "NAME")]
    pub matrix: Option<SubstitutionMatrix>,

    /// Gap opening penalty (negative).
    #[arg(long, value_name = "INT", allow_negative_numbers = true)]
    pub gap_open: Option<i32>,

    /// Gap extension penalty (negative).
    #[arg(long, value_name = "INT", allow_negative_numbers = true)]
    pub gap_extend: Option<i32>,

    /// Identity fraction under which an alignment is reported as unreliable.
    #[arg(long, value_name = "FLOAT")]
    pub min_identity: Option<f64>,

    // --- Output ---
    /// Output directory where results will be stored.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub output: PathBuf,

    /// Replace the output directory if it already exists.
    #[arg(long)]
    pub overwrite: bool,

    /// Path to an optional configuration file in TOML format.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Set a specific configuration value, overriding the config file and flags.
    /// Can be used multiple times. Example: -S alignment.gap-open=-10
    #[arg(short = 'S', long = "set", value_name = "KEY=VALUE", num_args(0..))]
    pub set_values: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn command_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_full_argument_set() {
        let cli = Cli::parse_from([
            "atoll",
            "-r",
            "ref.pdb",
            "-i",
            "info.csv",
            "-s",
            "seq.fasta",
            "--resnum",
            "resid",
            "--resalign",
            "1-300",
            "--reshelix",
            "33-60,68-95",
            "--gap-open",
            "-10",
            "--matrix",
            "blosum45",
            "-o",
            "out",
            "--overwrite",
            "-vv",
            "-j",
            "4",
        ]);
        assert_eq!(cli.run.resnum, Some(NumberingMode::Resid));
        assert_eq!(cli.run.gap_open, Some(-10));
        assert_eq!(cli.run.matrix, Some(SubstitutionMatrix::Blosum45));
        assert_eq!(cli.run.reshelix, "33-60,68-95");
        assert!(cli.run.overwrite);
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.threads, Some(4));
    }

    #[test]
    fn helix_selection_is_required() {
        let result =
            Cli::try_parse_from(["atoll", "-r", "ref.pdb", "-i", "info.csv", "-o", "out"]);
        assert!(result.is_err());
    }

    #[test]
    fn unknown_numbering_mode_is_rejected() {
        let result = Cli::try_parse_from([
            "atoll", "-r", "ref.pdb", "-i", "info.csv", "-o", "out", "--reshelix", "1-5",
            "--resnum", "index",
        ]);
        assert!(result.is_err());
    }
}
