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
    author = "Tony Kan",
    version,
    about = "foamify CLI - Builds periodic foam geometry from placed bubbles.",
    long_about = "foamify CLI - Builds periodic foam geometry from placed bubbles: \
                  contact search, periodic replication and strut meshes.",
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

    /// Set the number of threads for parallel computation.
    /// Defaults to the number of available logical cores.
    #[arg(short = 'j', long, global = true, value_name = "NUM")]
    pub threads: Option<usize>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Replicate bubbles, find contacts and write the bubbles and their strut mesh.
    Export(ExportArgs),
    /// Print summary statistics of a bubble file.
    Stats(StatsArgs),
}

/// Arguments for the `export` subcommand.
#[derive(Args, Debug)]
pub struct ExportArgs {
    /// Path to the input bubble file (.csv or .pdb).
    #[arg(short, long, required = true, value_name = "PATH")]
    pub input: PathBuf,

    /// Path for the output bubble file (.pdb or .csv). Periodic images are included.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub output: PathBuf,

    /// Also write the strut mesh as a Wavefront OBJ file.
    #[arg(short, long, value_name = "PATH")]
    pub mesh: Option<PathBuf>,

    /// Snap every radius to the nearest tabulated element radius before processing.
    #[arg(long)]
    pub standardize_radii: bool,

    #[command(flatten)]
    pub foam: FoamArgs,
}

/// Arguments for the `stats` subcommand.
#[derive(Args, Debug)]
pub struct StatsArgs {
    /// Path to the input bubble file (.csv or .pdb).
    #[arg(short, long, required = true, value_name = "PATH")]
    pub input: PathBuf,

    #[command(flatten)]
    pub foam: FoamArgs,
}

/// Geometry settings shared by every command that runs the export workflow.
#[derive(Args, Debug, Default)]
pub struct FoamArgs {
    /// Path to a configuration file in TOML format.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Override the number of grid cells along each axis.
    #[arg(long, value_name = "INT")]
    pub cells: Option<usize>,

    /// Override `boundary.periodic` from the config file.
    #[command(flatten)]
    pub periodic: PeriodicBoundary,

    /// Surround the bubbles with their 26 periodic images ('wrap' or 'mirror').
    #[arg(short, long = "replicate", value_name = "MODE")]
    pub replicate: Option<String>,

    /// Side of the cubic periodic box. Defaults to the largest span of the bubble domain.
    #[arg(long, value_name = "FLOAT")]
    pub box_side: Option<f64>,

    /// Override the radius of the strut tubes.
    #[arg(long, value_name = "FLOAT")]
    pub strut_radius: Option<f64>,

    /// Override the contact threshold multiplier applied to the sum of radii.
    #[arg(long, value_name = "FLOAT")]
    pub contact_scale: Option<f64>,

    /// Set a specific configuration value, overriding the config file.
    /// Can be used multiple times. Example: -S grid.cells-per-axis=12
    #[arg(short = 'S', long = "set", value_name = "KEY=VALUE", num_args(0..))]
    pub set_values: Vec<String>,
}

/// A group to handle mutually exclusive boolean flags for minimum-image boundaries.
#[derive(Args, Debug, Clone, Copy, Default)]
#[group(required = false, multiple = false)]
pub struct PeriodicBoundary {
    /// Evaluate distances with the minimum-image convention on a cubic box.
    #[arg(long)]
    pub periodic: bool,
    /// Force open boundaries.
    #[arg(long)]
    pub open: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn export_arguments_parse_with_overrides() {
        let cli = Cli::parse_from([
            "foamify",
            "-vv",
            "export",
            "-i",
            "in.csv",
            "-o",
            "out.pdb",
            "--mesh",
            "out.obj",
            "--periodic",
            "--box-side",
            "6.5",
            "-S",
            "struts.radius=0.2",
        ]);
        assert_eq!(cli.verbose, 2);
        let Commands::Export(args) = cli.command else {
            panic!("Expected 'export' subcommand");
        };
        assert_eq!(args.input, PathBuf::from("in.csv"));
        assert_eq!(args.mesh, Some(PathBuf::from("out.obj")));
        assert!(args.foam.periodic.periodic);
        assert_eq!(args.foam.box_side, Some(6.5));
        assert_eq!(args.foam.set_values, vec!["struts.radius=0.2".to_string()]);
    }

    #[test]
    fn periodic_and_open_flags_conflict() {
        let result = Cli::try_parse_from([
            "foamify", "stats", "-i", "in.csv", "--periodic", "--open",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn quiet_conflicts_with_verbose() {
        let result = Cli::try_parse_from(["foamify", "-q", "-v", "stats", "-i", "in.csv"]);
        assert!(result.is_err());
    }
}
