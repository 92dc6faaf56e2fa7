use crate::plot::{FigureType, ImageType};
use crate::utils::parser::{at_least_one, at_least_one_f64, dpi, non_negative};
use clap::{Args, Parser, Subcommand, ValueEnum};
use mdsetup::core::models::trajectory::FrameSlice;
use mdsetup::core::selection::AtomMask;
use mdsetup::workflows::simfiles::OutputKind;
use std::path::{Path, PathBuf};

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    author = "Timothy H. Click",
    version,
    about = "mdsetup - Prepare AMBER molecular-dynamics simulations and analyze their trajectories.",
    help_template = HELP_TEMPLATE,
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all console log output except for errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Configuration file in TOML format
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create subdirectories for AMBER simulations.
    Setup(SetupArgs),
    /// Prepare AMBER input files and run scripts for a simulation.
    Simfiles(SimfilesArgs),
    /// Neutralize and solvate a system with tleap.
    Solvate(SolvateArgs),
    /// Calculate root mean square fluctuations by residue.
    Rmsf(RmsfArgs),
    /// Calculate fluctuations from the leading eigenmodes of the covariance matrix.
    Rmsf10(Rmsf10Args),
    /// Calculate the 2-D r.m.s.d. between all frames.
    Rms2d(Rms2dArgs),
}

impl Commands {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Setup(_) => "setup",
            Self::Simfiles(_) => "simfiles",
            Self::Solvate(_) => "solvate",
            Self::Rmsf(_) => "rmsf",
            Self::Rmsf10(_) => "rmsf10",
            Self::Rms2d(_) => "rms2d",
        }
    }

    /// The per-command log file; `<command>.log` in the working directory unless given.
    pub fn logfile(&self) -> PathBuf {
        let explicit = match self {
            Self::Setup(args) => args.logfile.as_deref(),
            Self::Simfiles(args) => args.logfile.as_deref(),
            Self::Solvate(args) => args.logfile.as_deref(),
            Self::Rmsf(args) => args.logfile.as_deref(),
            Self::Rmsf10(args) => args.logfile.as_deref(),
            Self::Rms2d(args) => args.logfile.as_deref(),
        };
        explicit
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from(format!("{}.log", self.name())))
    }
}

#[derive(Args, Debug)]
pub struct SetupArgs {
    /// Parent directory of the simulation tree
    #[arg(short = 'd', long, value_name = "DIR", default_value = "amber")]
    pub outdir: PathBuf,

    /// Log file
    #[arg(short, long, value_name = "LOG")]
    pub logfile: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct SimfilesArgs {
    /// Topology file
    #[arg(short = 's', long, value_name = "FILE", default_value = "amber.prmtop")]
    pub topology: PathBuf,

    /// Simulation directory
    #[arg(short = 'd', long, value_name = "DIR", default_value = ".")]
    pub outdir: PathBuf,

    /// Prefix for various output files [default: name of the current directory]
    #[arg(short, long, value_name = "PREFIX")]
    pub prefix: Option<String>,

    /// Initial temperature (K)
    #[arg(long, value_name = "TEMP", value_parser = at_least_one_f64, allow_hyphen_values = true)]
    pub temp1: Option<f64>,

    /// Final temperature (K)
    #[arg(long, value_name = "TEMP", value_parser = at_least_one_f64, allow_hyphen_values = true)]
    pub temp2: Option<f64>,

    /// Restraint force (kcal/mol/A^2)
    #[arg(long, value_name = "FORCE", value_parser = at_least_one_f64, allow_hyphen_values = true)]
    pub force: Option<f64>,

    /// Location of the AMBER installation
    #[arg(long, value_name = "DIR")]
    pub home: Option<PathBuf>,

    /// Which output files to create
    #[arg(long = "type", value_enum, default_value = "all")]
    pub kind: OutputChoice,

    /// Log file
    #[arg(short, long, value_name = "LOG")]
    pub logfile: Option<PathBuf>,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputChoice {
    Equil,
    Prod,
    Scripts,
    All,
}

impl From<OutputChoice> for OutputKind {
    fn from(choice: OutputChoice) -> Self {
        match choice {
            OutputChoice::Equil => OutputKind::Equil,
            OutputChoice::Prod => OutputKind::Prod,
            OutputChoice::Scripts => OutputKind::Scripts,
            OutputChoice::All => OutputKind::All,
        }
    }
}

#[derive(Args, Debug)]
pub struct SolvateArgs {
    /// Input PDB file
    #[arg(short, long, value_name = "FILE", default_value = "input.pdb")]
    pub infile: PathBuf,

    /// Prefix for output files
    #[arg(short, long, value_name = "PREFIX", default_value = "solvated")]
    pub prefix: PathBuf,

    /// Leap template to use
    #[arg(long, value_enum)]
    pub template: Option<LeapChoice>,

    /// Log file
    #[arg(short, long, value_name = "LOG")]
    pub logfile: Option<PathBuf>,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeapChoice {
    Solvate,
    Fixed,
    Tleap,
}

impl LeapChoice {
    pub fn name(self) -> &'static str {
        match self {
            Self::Solvate => "solvate",
            Self::Fixed => "fixed",
            Self::Tleap => "tleap",
        }
    }
}

/// Topology, trajectory and frame range shared by the analysis commands.
#[derive(Args, Debug, Clone)]
pub struct TrajectoryArgs {
    /// Topology
    #[arg(short = 's', long = "top", value_name = "FILE", default_value = "input.parm7")]
    pub top: PathBuf,

    /// Trajectory
    #[arg(short = 'f', long = "traj", value_name = "FILE", default_value = "input.trj")]
    pub traj: PathBuf,

    /// Starting trajectory frame
    #[arg(short = 'b', value_name = "START", default_value = "1", value_parser = at_least_one, allow_hyphen_values = true)]
    pub start: usize,

    /// Final trajectory frame (0 = last frame)
    #[arg(short = 'e', value_name = "STOP", default_value = "0", value_parser = non_negative, allow_hyphen_values = true)]
    pub stop: usize,

    /// Trajectory output offset
    #[arg(long = "dt", value_name = "OFFSET", default_value = "1", value_parser = at_least_one, allow_hyphen_values = true)]
    pub offset: usize,
}

impl TrajectoryArgs {
    pub fn slice(&self) -> FrameSlice {
        FrameSlice::new(self.start, self.stop as isize, self.offset)
    }
}

/// Figure options shared by the analysis commands.
#[derive(Args, Debug, Clone)]
pub struct ImageArgs {
    /// Save a figure of the results
    #[arg(long)]
    pub image: bool,

    /// Output type for the figure
    #[arg(long = "it", value_enum, value_name = "TYPE")]
    pub image_type: Option<ImageType>,

    /// Resolution of the figure
    #[arg(long, value_name = "DPI", value_parser = dpi, allow_hyphen_values = true)]
    pub dpi: Option<f64>,
}

#[derive(Args, Debug)]
pub struct RmsfArgs {
    #[command(flatten)]
    pub input: TrajectoryArgs,

    /// Data directory
    #[arg(short = 'd', long = "data", value_name = "DIR", default_value = ".")]
    pub datadir: PathBuf,

    /// Image file
    #[arg(short, long, value_name = "FILE", default_value = "rmsf.png")]
    pub outfile: PathBuf,

    /// Log file
    #[arg(short, long, value_name = "LOG")]
    pub logfile: Option<PathBuf>,

    /// Atom selection (repeatable)
    #[arg(short = 't', long = "type", value_enum, value_name = "TYPE", default_value = "ca")]
    pub types: Vec<RmsfSelection>,

    /// Spacing for tick labels
    #[arg(long, value_name = "LABEL", default_value = "10", value_parser = at_least_one, allow_hyphen_values = true)]
    pub label: usize,

    /// Graph type to draw
    #[arg(long = "ft", value_enum, value_name = "TYPE")]
    pub figure_type: Option<FigureType>,

    #[command(flatten)]
    pub image: ImageArgs,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RmsfSelection {
    Ca,
    Cab,
    Heavy,
    All,
}

impl From<RmsfSelection> for AtomMask {
    fn from(selection: RmsfSelection) -> Self {
        match selection {
            RmsfSelection::Ca => AtomMask::CAlpha,
            RmsfSelection::Cab => AtomMask::CAlphaBeta,
            RmsfSelection::Heavy => AtomMask::Heavy,
            RmsfSelection::All => AtomMask::All,
        }
    }
}

#[derive(Args, Debug)]
pub struct Rmsf10Args {
    #[command(flatten)]
    pub input: TrajectoryArgs,

    /// PDB file with the fluctuations as temperature factors
    #[arg(short, long, value_name = "FILE", default_value = "rmsf10.pdb")]
    pub outfile: PathBuf,

    /// Data directory
    #[arg(short = 'd', long = "data", value_name = "DIR", default_value = ".")]
    pub datadir: PathBuf,

    /// Log file
    #[arg(short, long, value_name = "LOG")]
    pub logfile: Option<PathBuf>,

    /// Number of eigenmodes
    #[arg(short, long, value_name = "NMODES", default_value = "10")]
    pub nmodes: usize,

    /// Graph type to draw
    #[arg(long = "ft", value_enum, value_name = "TYPE")]
    pub figure_type: Option<FigureType>,

    /// Width of the x-labels
    #[arg(long, value_name = "WIDTH", default_value = "10", value_parser = at_least_one, allow_hyphen_values = true)]
    pub width: usize,

    #[command(flatten)]
    pub image: ImageArgs,
}

#[derive(Args, Debug)]
pub struct Rms2dArgs {
    #[command(flatten)]
    pub input: TrajectoryArgs,

    /// Comma-separated output file
    #[arg(short, long, value_name = "FILE", default_value = "rms2d.csv")]
    pub outfile: PathBuf,

    /// Log file
    #[arg(short, long, value_name = "LOG")]
    pub logfile: Option<PathBuf>,

    /// Atom selection
    #[arg(short = 't', long = "type", value_enum, value_name = "TYPE", default_value = "ca")]
    pub selection: Rms2dSelection,

    /// Width of the x-labels
    #[arg(long, value_name = "WIDTH", default_value = "10", value_parser = at_least_one, allow_hyphen_values = true)]
    pub width: usize,

    #[command(flatten)]
    pub image: ImageArgs,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rms2dSelection {
    Ca,
    Cab,
    Noh,
    All,
}

impl From<Rms2dSelection> for AtomMask {
    fn from(selection: Rms2dSelection) -> Self {
        match selection {
            Rms2dSelection::Ca => AtomMask::CAlpha,
            Rms2dSelection::Cab => AtomMask::CAlphaBeta,
            Rms2dSelection::Noh => AtomMask::Heavy,
            Rms2dSelection::All => AtomMask::All,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn frame_options_are_clamped() {
        let cli = Cli::try_parse_from([
            "mdsetup", "rmsf", "-b", "-3", "-e", "-1", "--dt", "0", "-t", "ca", "-t", "heavy",
        ])
        .unwrap();
        let Commands::Rmsf(args) = cli.command else {
            panic!("expected rmsf");
        };
        assert_eq!(args.input.start, 1);
        assert_eq!(args.input.stop, 0);
        assert_eq!(args.input.offset, 1);
        assert!(args.input.slice().is_full());
        assert_eq!(args.types, vec![RmsfSelection::Ca, RmsfSelection::Heavy]);
    }

    #[test]
    fn frame_range_excludes_the_stop_position() {
        let cli = Cli::try_parse_from(["mdsetup", "rmsf", "-b", "1", "-e", "10"]).unwrap();
        let Commands::Rmsf(args) = cli.command else {
            panic!("expected rmsf");
        };
        let slice = args.input.slice();
        let selected: Vec<usize> = (0..20).filter(|&i| slice.contains(i)).collect();
        assert_eq!(selected, (1..10).collect::<Vec<_>>());
    }

    #[test]
    fn dpi_is_clamped_and_image_options_parse() {
        let cli = Cli::try_parse_from([
            "mdsetup", "rms2d", "--image", "--it", "svg", "--dpi", "50", "-t", "noh",
        ])
        .unwrap();
        let Commands::Rms2d(args) = cli.command else {
            panic!("expected rms2d");
        };
        assert!(args.image.image);
        assert_eq!(args.image.image_type, Some(ImageType::Svg));
        assert_eq!(args.image.dpi, Some(100.0));
        assert_eq!(AtomMask::from(args.selection), AtomMask::Heavy);
    }

    #[test]
    fn logfile_defaults_to_the_command_name() {
        let cli = Cli::try_parse_from(["mdsetup", "setup"]).unwrap();
        assert_eq!(cli.command.logfile(), PathBuf::from("setup.log"));
        let cli = Cli::try_parse_from(["mdsetup", "-v", "rmsf10", "-l", "x.log", "-n", "5"]).unwrap();
        assert_eq!(cli.command.logfile(), PathBuf::from("x.log"));
        assert_eq!(cli.verbose, 1);
    }

    #[test]
    fn unknown_selection_is_rejected() {
        assert!(Cli::try_parse_from(["mdsetup", "rmsf", "-t", "noh"]).is_err());
        assert!(Cli::try_parse_from(["mdsetup", "rms2d", "-t", "heavy"]).is_err());
    }

    #[test]
    fn simfiles_temperatures_are_clamped() {
        let cli =
            Cli::try_parse_from(["mdsetup", "simfiles", "--temp1", "0.5", "--type", "prod"]).unwrap();
        let Commands::Simfiles(args) = cli.command else {
            panic!("expected simfiles");
        };
        assert_eq!(args.temp1, Some(1.0));
        assert_eq!(OutputKind::from(args.kind), OutputKind::Prod);
    }
}
