use super::error::WorkflowError;
use super::scaffold::{DIR_MODE, ensure_dir};
use super::templates::{TemplateGroup, TemplateLibrary};
use crate::analysis::loader::load_topology;
use crate::core::models::residue::ResidueKind;
use crate::core::models::topology::Topology;
use minijinja::context;
use serde::Serialize;
use std::ffi::OsString;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;
use tracing::{debug, error, info, instrument, warn};

pub const AMBERHOME_VAR: &str = "AMBERHOME";

/// Which family of simulation files to write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputKind {
    Equil,
    Prod,
    Scripts,
    #[default]
    All,
}

impl OutputKind {
    pub fn groups(self) -> &'static [TemplateGroup] {
        match self {
            Self::Equil => &[TemplateGroup::Equil],
            Self::Prod => &[TemplateGroup::Prod],
            Self::Scripts => &[TemplateGroup::Scripts],
            Self::All => &[
                TemplateGroup::Equil,
                TemplateGroup::Prod,
                TemplateGroup::Scripts,
            ],
        }
    }
}

#[derive(Debug, Error)]
#[error("Unknown output type '{0}' (expected equil, prod, scripts or all)")]
pub struct UnknownOutputKindError(String);

impl FromStr for OutputKind {
    type Err = UnknownOutputKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "equil" => Ok(Self::Equil),
            "prod" => Ok(Self::Prod),
            "scripts" => Ok(Self::Scripts),
            "all" => Ok(Self::All),
            _ => Err(UnknownOutputKindError(s.to_string())),
        }
    }
}

impl fmt::Display for OutputKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Equil => "equil",
            Self::Prod => "prod",
            Self::Scripts => "scripts",
            Self::All => "all",
        };
        f.write_str(name)
    }
}

/// Values substituted into the simulation templates as `data`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulationData {
    pub temp1: f64,
    pub temp2: f64,
    pub res0: isize,
    pub res1: isize,
    pub ions0: isize,
    pub ions1: isize,
    pub solvent0: isize,
    pub solvent1: isize,
    pub force: f64,
    pub simdir: PathBuf,
    pub prefix: String,
    pub amberhome: PathBuf,
    pub pmemd: String,
}

#[derive(Debug, Clone)]
pub struct SimfilesConfig {
    pub topology: PathBuf,
    pub outdir: PathBuf,
    pub prefix: String,
    pub temp1: f64,
    pub temp2: f64,
    pub force: f64,
    /// AMBER installation given on the command line.
    pub amber_home: Option<PathBuf>,
    /// AMBER installation from the configuration file.
    pub configured_amber_home: Option<PathBuf>,
    pub kind: OutputKind,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SimfilesOutcome {
    Written(Vec<PathBuf>),
    /// No AMBER installation could be located; nothing was written.
    MissingAmberHome,
}

/// Picks the AMBER installation: explicit flag, then configuration, then `$AMBERHOME`.
pub fn resolve_amber_home(flag: Option<&Path>, configured: Option<&Path>) -> Option<PathBuf> {
    amber_home_from(flag, configured, std::env::var_os(AMBERHOME_VAR))
}

fn amber_home_from(
    flag: Option<&Path>,
    configured: Option<&Path>,
    environment: Option<OsString>,
) -> Option<PathBuf> {
    flag.or(configured)
        .map(Path::to_path_buf)
        .or_else(|| environment.filter(|v| !v.is_empty()).map(PathBuf::from))
}

/// `pmemd.MPI` when the installation ships it, plain `pmemd` otherwise.
pub fn select_pmemd(amber_home: &Path) -> &'static str {
    if amber_home.join("bin").join("pmemd.MPI").is_file() {
        "pmemd.MPI"
    } else {
        "pmemd"
    }
}

fn span_or_zero(topology: &Topology, kind: ResidueKind) -> (isize, isize) {
    topology.residue_span(kind).unwrap_or_else(|| {
        debug!(?kind, "No residues of this kind; using 0 for its range");
        (0, 0)
    })
}

impl SimulationData {
    pub fn from_topology(topology: &Topology, config: &SimfilesConfig, amber_home: &Path) -> Self {
        if topology.residue_span(ResidueKind::Solute).is_none() {
            warn!("Topology contains no solute residues");
        }
        let (res0, res1) = span_or_zero(topology, ResidueKind::Solute);
        let (ions0, ions1) = span_or_zero(topology, ResidueKind::Ion);
        let (solvent0, solvent1) = span_or_zero(topology, ResidueKind::Solvent);
        Self {
            temp1: config.temp1,
            temp2: config.temp2,
            res0,
            res1,
            ions0,
            ions1,
            solvent0,
            solvent1,
            force: config.force,
            simdir: config.outdir.clone(),
            prefix: config.prefix.clone(),
            amberhome: amber_home.to_path_buf(),
            pmemd: select_pmemd(amber_home).to_string(),
        }
    }
}

/// Destination of a rendered template below the simulation directory.
///
/// `equil`/`prod` templates go to `<Group>/<name>/<name>.in`; scripts to `Scripts/<name>.sh`.
pub fn output_path(outdir: &Path, group: TemplateGroup, name: &str) -> PathBuf {
    match group {
        TemplateGroup::Scripts => outdir.join("Scripts").join(format!("{name}.sh")),
        _ => outdir
            .join(title_case(group.dir_name()))
            .join(name)
            .join(format!("{name}.in")),
    }
}

fn title_case(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Writes the AMBER input files and run scripts for a simulation.
///
/// A missing AMBER installation is logged and reported as [`SimfilesOutcome::MissingAmberHome`]
/// without touching the output directory.
#[instrument(skip_all, name = "simfiles_workflow")]
pub fn run(
    config: &SimfilesConfig,
    library: &TemplateLibrary,
) -> Result<SimfilesOutcome, WorkflowError> {
    let amber_home = resolve_amber_home(
        config.amber_home.as_deref(),
        config.configured_amber_home.as_deref(),
    );
    execute(config, library, amber_home)
}

fn execute(
    config: &SimfilesConfig,
    library: &TemplateLibrary,
    amber_home: Option<PathBuf>,
) -> Result<SimfilesOutcome, WorkflowError> {
    let topology = load_topology(&config.topology)?;
    let Some(amber_home) = amber_home else {
        error!("{AMBERHOME_VAR} environment variable not defined.");
        return Ok(SimfilesOutcome::MissingAmberHome);
    };
    write_files(&topology, config, &amber_home, library).map(SimfilesOutcome::Written)
}

/// Renders every template selected by `config.kind` with data derived from `topology`.
pub fn write_files(
    topology: &Topology,
    config: &SimfilesConfig,
    amber_home: &Path,
    library: &TemplateLibrary,
) -> Result<Vec<PathBuf>, WorkflowError> {
    let data = SimulationData::from_topology(topology, config, amber_home);
    let year = chrono::Local::now().format("%Y").to_string();
    debug!(?data, "Rendering simulation templates");

    let mut written = Vec::new();
    for &group in config.kind.groups() {
        for name in group.names() {
            let path = output_path(&config.outdir, group, name);
            let Some(text) = library.render(group, name, context! { data => &data, year => &year })?
            else {
                continue;
            };
            if let Some(parent) = path.parent() {
                ensure_dir(parent)?;
            }
            info!("Writing script to {}", path.display());
            fs::write(&path, text).map_err(WorkflowError::io(&path))?;
            if group == TemplateGroup::Scripts {
                make_executable(&path)?;
            }
            written.push(path);
        }
    }
    Ok(written)
}

#[cfg(unix)]
fn make_executable(path: &Path) -> Result<(), WorkflowError> {
    use std::os::unix::fs::PermissionsExt;
    debug!("Changing file permissions of {} to {:o}", path.display(), DIR_MODE);
    fs::set_permissions(path, fs::Permissions::from_mode(DIR_MODE)).map_err(WorkflowError::io(path))
}

#[cfg(not(unix))]
fn make_executable(_path: &Path) -> Result<(), WorkflowError> {
    Ok(())
}
