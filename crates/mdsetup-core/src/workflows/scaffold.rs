use super::error::WorkflowError;
use std::fs::DirBuilder;
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument};

pub const TOP_LEVEL_DIRS: [&str; 4] = ["Prep", "Equil", "Prod", "Analysis"];
pub const PRODUCTION_DIRS: [&str; 2] = ["mdst", "mdprod"];

const EQUILIBRATION_STAGES: [&str; 2] = ["min", "md"];
const EQUILIBRATION_STEPS: [u32; 8] = [1, 2, 11, 12, 13, 14, 15, 16];

pub(crate) const DIR_MODE: u32 = 0o755;

/// Every directory of a simulation project rooted at `root`, parents before children.
///
/// The equilibration directories are `{min,md}{1,2,11..16}` except `min16`.
pub fn directory_tree(root: &Path) -> Vec<PathBuf> {
    let top = TOP_LEVEL_DIRS.iter().map(|name| root.join(name));
    let equilibration = EQUILIBRATION_STAGES
        .iter()
        .flat_map(|stage| EQUILIBRATION_STEPS.iter().map(move |step| format!("{stage}{step}")))
        .filter(|name| name != "min16")
        .map(|name| root.join("Equil").join(name));
    let production = PRODUCTION_DIRS
        .iter()
        .map(|name| root.join("Prod").join(name));
    top.chain(equilibration).chain(production).collect()
}

/// Creates the simulation directory tree under `root`.
///
/// Existing directories are left untouched, so running this twice is harmless. Returns the
/// full list of directories in the tree.
#[instrument(skip_all, name = "scaffold_workflow")]
pub fn create_directory_tree(root: &Path) -> Result<Vec<PathBuf>, WorkflowError> {
    let tree = directory_tree(root);
    for directory in &tree {
        if directory.is_dir() {
            debug!("Directory {} already exists", directory.display());
            continue;
        }
        info!("Creating {}", directory.display());
        ensure_dir(directory)?;
    }
    Ok(tree)
}

/// Creates `path` and any missing parents with mode `0o755` on Unix.
pub(crate) fn ensure_dir(path: &Path) -> Result<(), WorkflowError> {
    let mut builder = DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(DIR_MODE);
    }
    builder.create(path).map_err(WorkflowError::io(path))
}
