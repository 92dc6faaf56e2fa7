use crate::core::io::mdcrd::TrajectoryError;
use crate::core::io::parm7::TopologyError;
use crate::core::io::pdb::PdbError;
use crate::core::models::table::TableError;
use crate::core::models::trajectory::TrajectoryShapeError;
use crate::core::selection::AtomMask;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("Failed to read topology '{path}': {source}")]
    Topology {
        path: PathBuf,
        source: TopologyError,
    },

    #[error("Failed to read PDB file '{path}': {source}")]
    Pdb { path: PathBuf, source: PdbError },

    #[error("Failed to read trajectory '{path}': {source}")]
    Trajectory {
        path: PathBuf,
        source: TrajectoryError,
    },

    #[error("Unsupported topology format: '{0}' (expected .parm7, .prmtop, .top, .pdb or .ent)")]
    UnsupportedTopologyFormat(PathBuf),

    #[error("Unsupported trajectory format: '{0}' (expected .crd, .mdcrd, .trj, .x or .pdb)")]
    UnsupportedTrajectoryFormat(PathBuf),

    #[error("Trajectory '{0}' has no frames in the selected range")]
    EmptyTrajectory(PathBuf),

    #[error("Trajectory does not match its topology: {0}")]
    Shape(#[from] TrajectoryShapeError),

    #[error("At least one trajectory frame is required")]
    NoFrames,

    #[error("The number of eigenmodes must be at least 1")]
    InvalidModeCount,

    #[error("Selection '{0}' matches no atoms")]
    EmptySelection(AtomMask),

    #[error("Superposition of frame {frame} onto the reference failed")]
    Superposition { frame: usize },

    #[error("Failed to assemble result table: {0}")]
    Table(#[from] TableError),
}
