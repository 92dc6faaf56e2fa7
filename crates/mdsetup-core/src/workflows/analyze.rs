use super::error::WorkflowError;
use crate::analysis::atomic_fluct::{ResidueFluctuationSet, calculate_residue_fluctuations};
use crate::analysis::error::AnalysisError;
use crate::analysis::fluctuation::{FluctuationResult, calculate_rmsf};
use crate::analysis::loader::load_trajectory;
use crate::analysis::progress::{Progress, ProgressReporter};
use crate::analysis::rms2d::pairwise_rmsd;
use crate::core::io::pdb::write_structure_to_path;
use crate::core::io::results::{save_data, write_matrix};
use crate::core::models::table::Table;
use crate::core::models::trajectory::{FrameSlice, Trajectory};
use crate::core::selection::AtomMask;
use nalgebra::DMatrix;
use std::path::{Path, PathBuf};
use tracing::{info, instrument};

/// A topology/trajectory pair and the frames to read from it.
#[derive(Debug, Clone)]
pub struct TrajectoryInput {
    pub topology: PathBuf,
    pub trajectory: PathBuf,
    pub slice: FrameSlice,
}

impl TrajectoryInput {
    pub fn load(&self, reporter: &ProgressReporter) -> Result<Trajectory, WorkflowError> {
        info!(
            "Loading {} with {}",
            self.trajectory.display(),
            self.topology.display()
        );
        let trajectory = reporter.phase("Loading", || {
            load_trajectory(&self.topology, &self.trajectory, self.slice)
        })?;
        Ok(trajectory)
    }
}

#[derive(Debug, Clone)]
pub struct ResidueFluctuationReport {
    pub fluctuations: ResidueFluctuationSet,
    pub files: Vec<PathBuf>,
}

/// Per-residue RMSF for each selection, saved as `<key>.csv` in `data_dir`.
#[instrument(skip_all, name = "rmsf_workflow")]
pub fn residue_fluctuations(
    input: &TrajectoryInput,
    masks: &[AtomMask],
    data_dir: &Path,
    reporter: &ProgressReporter,
) -> Result<ResidueFluctuationReport, WorkflowError> {
    let trajectory = input.load(reporter)?;
    info!("Calculating the r.m.s.f. for the selected atoms");
    let fluctuations = reporter.phase("Residue fluctuations", || {
        calculate_residue_fluctuations(&trajectory, masks, reporter)
    })?;
    let files = save_data(data_dir, &fluctuations)?;
    Ok(ResidueFluctuationReport {
        fluctuations,
        files,
    })
}

#[derive(Debug, Clone)]
pub struct ModeFluctuationReport {
    pub result: FluctuationResult,
    pub files: Vec<PathBuf>,
    pub n_residues: usize,
}

/// Mode-projected RMSF: saves every result field in `data_dir` and writes `structure_path`,
/// a PDB of the first frame with the fluctuations in the B-factor column.
#[instrument(skip_all, name = "rmsf10_workflow")]
pub fn mode_fluctuations(
    input: &TrajectoryInput,
    n_modes: usize,
    data_dir: &Path,
    structure_path: &Path,
    reporter: &ProgressReporter,
) -> Result<ModeFluctuationReport, WorkflowError> {
    let trajectory = input.load(reporter)?;
    let result = calculate_rmsf(&trajectory, n_modes, reporter)?;

    info!("Saving all data into {}", data_dir.display());
    let files = save_data(data_dir, &result)?;

    info!("Writing rmsf{} to {}", n_modes, structure_path.display());
    annotate_structure(structure_path, &trajectory, &result.fluctuations)?;

    Ok(ModeFluctuationReport {
        result,
        files,
        n_residues: trajectory.topology().n_residues(),
    })
}

/// Writes the first frame of `trajectory` as PDB with the last column of `table` as B-factors.
///
/// `table` must have one row per atom.
pub fn annotate_structure(
    path: &Path,
    trajectory: &Trajectory,
    table: &Table,
) -> Result<(), WorkflowError> {
    let atoms = trajectory.n_atoms();
    if table.n_rows() != atoms {
        return Err(WorkflowError::AnnotationMismatch {
            rows: table.n_rows(),
            atoms,
        });
    }
    let b_factors = table.last_column().unwrap_or_else(|| vec![0.0; atoms]);
    let frame = trajectory
        .frames()
        .first()
        .ok_or(AnalysisError::NoFrames)?;
    write_structure_to_path(path, trajectory.topology(), frame, Some(&b_factors)).map_err(
        |source| WorkflowError::Structure {
            path: path.to_path_buf(),
            source,
        },
    )
}

#[derive(Debug, Clone)]
pub struct PairwiseRmsdReport {
    pub matrix: DMatrix<f64>,
    pub file: PathBuf,
}

/// The 2-D RMSD matrix of the selected atoms, written to `outfile` as comma-separated rows.
#[instrument(skip_all, name = "rms2d_workflow")]
pub fn pairwise_rmsd_matrix(
    input: &TrajectoryInput,
    mask: AtomMask,
    outfile: &Path,
    reporter: &ProgressReporter,
) -> Result<PairwiseRmsdReport, WorkflowError> {
    let trajectory = input.load(reporter)?;
    info!("Calculating the 2D root mean square deviation");
    let matrix = reporter.phase("2-D r.m.s.d.", || pairwise_rmsd(&trajectory, mask, reporter))?;

    info!("Saving 2D r.m.s.d. data to {}", outfile.display());
    write_matrix(outfile, &matrix)?;
    reporter.report(Progress::Message(format!(
        "{} x {} matrix written",
        matrix.nrows(),
        matrix.ncols()
    )));
    Ok(PairwiseRmsdReport {
        matrix,
        file: outfile.to_path_buf(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::fluctuation::{FLUCTUATION_COLUMNS, RESIDUE_INDEX_NAME};
    use crate::core::io::mdcrd::write_frames;
    use crate::core::io::pdb::{PdbFile, PdbFrameReader};
    use crate::core::io::results::read_table;
    use crate::core::io::traits::{FrameSource, TopologyFile};
    use crate::core::models::topology::{Topology, TopologyBuilder};
    use crate::core::models::trajectory::Frame;
    use nalgebra::{Point3, Vector3};
    use std::fs::{self, File};
    use tempfile::tempdir;

    const N_RESIDUES: usize = 20;
    const ATOMS_PER_RESIDUE: usize = 5;
    const N_FRAMES: usize = 50;

    /// 20 alanine-like residues numbered from 101 with 5 atoms each.
    fn topology() -> Topology {
        let mut builder = TopologyBuilder::new();
        for r in 0..N_RESIDUES {
            builder.start_residue("ALA", 101 + r as isize, 'A');
            for name in ["N", "CA", "CB", "C", "O"] {
                builder.add_atom(name, None, None, 0.0, None);
            }
        }
        builder.build()
    }

    fn frames() -> Vec<Frame> {
        let n_atoms = N_RESIDUES * ATOMS_PER_RESIDUE;
        (0..N_FRAMES)
            .map(|f| {
                let t = f as f64;
                Frame::new(
                    (0..n_atoms)
                        .map(|i| {
                            let a = i as f64;
                            let wobble = 0.3 * (0.7 * t + 0.37 * a).sin();
                            Point3::new(1.5 * a, 2.0 * (0.4 * a).sin(), 2.0 * (0.4 * a).cos())
                                + Vector3::new(wobble, 0.5 * wobble, -0.2 * wobble)
                        })
                        .collect(),
                )
            })
            .collect()
    }

    fn write_inputs(dir: &Path) -> TrajectoryInput {
        let topology = topology();
        let frames = frames();
        let top = dir.join("system.pdb");
        write_structure_to_path(&top, &topology, &frames[0], None).unwrap();
        let traj = dir.join("system.mdcrd");
        write_frames(&mut File::create(&traj).unwrap(), "synthetic", &frames).unwrap();
        TrajectoryInput {
            topology: top,
            trajectory: traj,
            slice: FrameSlice::full(),
        }
    }

    fn csv_shape(path: &Path) -> (usize, usize) {
        let text = fs::read_to_string(path).unwrap();
        let rows: Vec<&str> = text.lines().collect();
        (rows.len(), rows[0].split(',').count())
    }

    #[test]
    fn mode_fluctuations_write_every_field_and_the_structure() {
        let dir = tempdir().unwrap();
        let input = write_inputs(dir.path());
        let pdb = dir.path().join("rmsf10.pdb");

        let report =
            mode_fluctuations(&input, 10, dir.path(), &pdb, &ProgressReporter::new()).unwrap();
        assert_eq!(report.files.len(), 6);
        assert_eq!(report.n_residues, N_RESIDUES);

        // header + one row per atom, index + 4 columns
        assert_eq!(
            csv_shape(&dir.path().join("fluctuations.csv")),
            (N_RESIDUES * ATOMS_PER_RESIDUE + 1, 1 + FLUCTUATION_COLUMNS.len())
        );
        let eigenvectors = csv_shape(&dir.path().join("eigenvectors.csv"));
        assert_eq!(eigenvectors, (3 * N_RESIDUES * ATOMS_PER_RESIDUE, 10));
        assert_eq!(csv_shape(&dir.path().join("rmsd.csv")), (N_FRAMES, 1));

        let calpha = read_table(&dir.path().join("calpha.csv")).unwrap();
        assert_eq!(calpha.index_name, RESIDUE_INDEX_NAME);
        assert_eq!(calpha.n_rows(), N_RESIDUES);
        assert_eq!(calpha.index, (101..=120).collect::<Vec<i64>>());

        let annotated = PdbFile::read_from_path(&pdb).unwrap();
        assert_eq!(annotated.n_atoms(), N_RESIDUES * ATOMS_PER_RESIDUE);
        let text = fs::read_to_string(&pdb).unwrap();
        let rms = report.result.fluctuations.last_column().unwrap();
        let first_atom = text.lines().find(|l| l.starts_with("ATOM")).unwrap();
        let b_factor: f64 = first_atom[60..66].trim().parse().unwrap();
        assert!((b_factor - rms[0]).abs() < 0.01);
    }

    #[test]
    fn annotation_rejects_a_table_of_the_wrong_size() {
        let trajectory = Trajectory::new(topology(), frames()).unwrap();
        let table = Table::new(
            "#Atom_no.",
            vec!["rms".to_string()],
            vec![1, 2],
            DMatrix::zeros(2, 1),
        )
        .unwrap();
        let dir = tempdir().unwrap();
        assert!(matches!(
            annotate_structure(&dir.path().join("x.pdb"), &trajectory, &table),
            Err(WorkflowError::AnnotationMismatch { rows: 2, atoms: 100 })
        ));
    }

    #[test]
    fn residue_fluctuations_are_saved_per_selection() {
        let dir = tempdir().unwrap();
        let input = write_inputs(dir.path());
        let report = residue_fluctuations(
            &input,
            &[AtomMask::CAlpha, AtomMask::All],
            dir.path(),
            &ProgressReporter::new(),
        )
        .unwrap();
        assert_eq!(report.files.len(), 2);
        let ca = read_table(&dir.path().join("ca.csv")).unwrap();
        assert_eq!(ca.n_rows(), N_RESIDUES);
        assert_eq!(ca.index[0], 101);
        assert!(dir.path().join("all.csv").is_file());
    }

    #[test]
    fn pairwise_matrix_is_written_as_csv() {
        let dir = tempdir().unwrap();
        let mut input = write_inputs(dir.path());
        input.slice = FrameSlice::new(1, 10, 1);
        let outfile = dir.path().join("rms2d.csv");
        let report =
            pairwise_rmsd_matrix(&input, AtomMask::CAlpha, &outfile, &ProgressReporter::new())
                .unwrap();
        assert_eq!(report.matrix.shape(), (9, 9));
        assert_eq!(csv_shape(&outfile), (9, 9));
    }

    #[test]
    fn missing_data_directory_surfaces_as_an_error() {
        let dir = tempdir().unwrap();
        let input = write_inputs(dir.path());
        let result = mode_fluctuations(
            &input,
            3,
            &dir.path().join("absent"),
            &dir.path().join("out.pdb"),
            &ProgressReporter::new(),
        );
        assert!(matches!(result, Err(WorkflowError::Results(_))));
    }

    #[test]
    fn pdb_trajectory_frames_are_readable_after_annotation() {
        let dir = tempdir().unwrap();
        let trajectory = Trajectory::new(topology(), frames()).unwrap();
        let n_atoms = trajectory.n_atoms();
        let table = Table::new(
            "#Atom_no.",
            vec!["rms".to_string()],
            (1..=n_atoms as i64).collect(),
            DMatrix::from_element(n_atoms, 1, 1.25),
        )
        .unwrap();
        let path = dir.path().join("annotated.pdb");
        annotate_structure(&path, &trajectory, &table).unwrap();

        let mut reader = PdbFrameReader::open(&path).unwrap();
        let frame = reader.next_frame().unwrap().unwrap();
        assert_eq!(frame.n_atoms(), n_atoms);
        assert!(fs::read_to_string(&path).unwrap().contains("  1.25"));
    }
}
