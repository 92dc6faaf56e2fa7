use super::error::AnalysisError;
use crate::core::io::mdcrd::MdcrdReader;
use crate::core::io::parm7::Parm7File;
use crate::core::io::pdb::{PdbFile, PdbFrameReader};
use crate::core::io::traits::{FrameSource, TopologyFile};
use crate::core::models::topology::Topology;
use crate::core::models::trajectory::{Frame, FrameSlice, Trajectory};
use std::path::Path;
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TopologyFormat {
    Parm7,
    Pdb,
}

impl TopologyFormat {
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_lowercase();
        match ext.as_str() {
            "parm7" | "prmtop" | "top" => Some(Self::Parm7),
            "pdb" | "ent" => Some(Self::Pdb),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrajectoryFormat {
    Mdcrd,
    Pdb,
}

impl TrajectoryFormat {
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_lowercase();
        match ext.as_str() {
            "crd" | "mdcrd" | "trj" | "x" => Some(Self::Mdcrd),
            "pdb" => Some(Self::Pdb),
            _ => None,
        }
    }
}

pub fn load_topology(path: &Path) -> Result<Topology, AnalysisError> {
    let format = TopologyFormat::from_path(path)
        .ok_or_else(|| AnalysisError::UnsupportedTopologyFormat(path.to_path_buf()))?;
    debug!(path = %path.display(), ?format, "Loading topology");

    let topology = match format {
        TopologyFormat::Parm7 => {
            Parm7File::read_from_path(path).map_err(|source| AnalysisError::Topology {
                path: path.to_path_buf(),
                source,
            })?
        }
        TopologyFormat::Pdb => {
            PdbFile::read_from_path(path).map_err(|source| AnalysisError::Pdb {
                path: path.to_path_buf(),
                source,
            })?
        }
    };
    debug!(
        atoms = topology.n_atoms(),
        residues = topology.n_residues(),
        "Topology loaded"
    );
    Ok(topology)
}

/// Pulls frames from `source`, keeping only those selected by `slice`.
///
/// Reading stops as soon as no later frame can be selected.
fn collect_frames<S: FrameSource>(
    source: &mut S,
    slice: FrameSlice,
) -> Result<Vec<Frame>, S::Error> {
    let mut frames = Vec::new();
    let mut index = 0;
    while !slice.is_past_end(index) {
        if slice.contains(index) {
            match source.next_frame()? {
                Some(frame) => frames.push(frame),
                None => break,
            }
        } else if !source.skip_frame()? {
            break;
        }
        index += 1;
    }
    Ok(frames)
}

/// Loads a topology and the frames of a trajectory selected by `slice`.
///
/// # Errors
///
/// Returns an error if either format cannot be inferred from its extension, if a file cannot be
/// read or parsed, if no frame falls inside the slice, or if the frames do not match the
/// topology's atom count.
pub fn load_trajectory(
    topology_path: &Path,
    trajectory_path: &Path,
    slice: FrameSlice,
) -> Result<Trajectory, AnalysisError> {
    let topology = load_topology(topology_path)?;
    let format = TrajectoryFormat::from_path(trajectory_path)
        .ok_or_else(|| AnalysisError::UnsupportedTrajectoryFormat(trajectory_path.to_path_buf()))?;
    debug!(path = %trajectory_path.display(), ?format, ?slice, "Loading trajectory");

    let frames = match format {
        TrajectoryFormat::Mdcrd => {
            let trajectory_err = |source| AnalysisError::Trajectory {
                path: trajectory_path.to_path_buf(),
                source,
            };
            let mut reader =
                MdcrdReader::open(trajectory_path, topology.n_atoms()).map_err(trajectory_err)?;
            collect_frames(&mut reader, slice).map_err(trajectory_err)?
        }
        TrajectoryFormat::Pdb => {
            let pdb_err = |source| AnalysisError::Pdb {
                path: trajectory_path.to_path_buf(),
                source,
            };
            let mut reader = PdbFrameReader::open(trajectory_path).map_err(pdb_err)?;
            collect_frames(&mut reader, slice).map_err(pdb_err)?
        }
    };

    if frames.is_empty() {
        return Err(AnalysisError::EmptyTrajectory(trajectory_path.to_path_buf()));
    }
    info!(
        frames = frames.len(),
        atoms = topology.n_atoms(),
        "Loaded {}",
        trajectory_path.display()
    );
    Ok(Trajectory::new(topology, frames)?)
}
