use super::align::{AlignedFrames, align_to_first};
use super::error::AnalysisError;
use super::progress::{Progress, ProgressReporter};
use crate::core::io::results::{DataField, NamedFields};
use crate::core::models::table::Table;
use crate::core::models::topology::Topology;
use crate::core::models::trajectory::Trajectory;
use crate::core::selection::AtomMask;
use nalgebra::{DMatrix, DVector, SymmetricEigen};
use std::cmp::Ordering;
use tracing::{debug, instrument, warn};

pub const ATOM_INDEX_NAME: &str = "#Atom_no.";
pub const RESIDUE_INDEX_NAME: &str = "#Residue_no.";
pub const FLUCTUATION_COLUMNS: [&str; 4] = ["rmsX", "rmsY", "rmsZ", "rms"];

/// Covariance dimensions above which diagonalization is noticeably slow.
const LARGE_COVARIANCE_DIM: usize = 6_000;

/// Everything produced by a mode-projected fluctuation analysis.
#[derive(Debug, Clone)]
pub struct FluctuationResult {
    /// Mass-weighted RMSD of each fitted frame to the first frame.
    pub rmsd: DVector<f64>,
    /// Mass-weighted covariance of the Cartesian displacements (3N x 3N).
    pub covariance: DMatrix<f64>,
    /// Retained eigenvalues, largest first.
    pub eigenvalues: DVector<f64>,
    /// Retained eigenvectors as columns (3N x K), in the order of `eigenvalues`.
    pub eigenvectors: DMatrix<f64>,
    /// Per-atom fluctuations indexed from 1, columns `rmsX rmsY rmsZ rms`.
    pub fluctuations: Table,
    /// The alpha-carbon rows of `fluctuations`, indexed by residue number.
    pub calpha: Table,
}

impl NamedFields for FluctuationResult {
    fn fields(&self) -> Vec<(&str, DataField<'_>)> {
        vec![
            ("rmsd", DataField::Vector(&self.rmsd)),
            ("covariance", DataField::Matrix(&self.covariance)),
            ("eigenvalues", DataField::Vector(&self.eigenvalues)),
            ("eigenvectors", DataField::Matrix(&self.eigenvectors)),
            ("fluctuations", DataField::Table(&self.fluctuations)),
            ("calpha", DataField::Table(&self.calpha)),
        ]
    }
}

/// Computes atomic fluctuations from the leading eigenmodes of the mass-weighted covariance
/// matrix.
///
/// Frames are fitted onto the first frame by mass-weighted superposition, the covariance
/// `C[a][b] = sqrt(m_a m_b) <dx_a dx_b>` is accumulated over the fitted frames, and the `n_modes`
/// largest eigenpairs are projected back onto each atom:
/// `rmsX_i = sqrt(sum_k lambda_k v_k[3i]^2 / m_i)`, likewise for Y and Z, and
/// `rms_i = sqrt(rmsX_i^2 + rmsY_i^2 + rmsZ_i^2)`.
///
/// A mode count larger than `3N` is clamped to `3N`. Atoms with zero mass report zero
/// fluctuation.
///
/// # Errors
///
/// Returns [`AnalysisError::InvalidModeCount`] for `n_modes == 0`, [`AnalysisError::NoFrames`]
/// for an empty trajectory, and [`AnalysisError::Superposition`] if a frame cannot be fitted.
#[instrument(skip(trajectory, reporter), name = "mode_fluctuations")]
pub fn calculate_rmsf(
    trajectory: &Trajectory,
    n_modes: usize,
    reporter: &ProgressReporter,
) -> Result<FluctuationResult, AnalysisError> {
    if n_modes == 0 {
        return Err(AnalysisError::InvalidModeCount);
    }
    if trajectory.is_empty() {
        return Err(AnalysisError::NoFrames);
    }
    let topology = trajectory.topology();
    let masses = topology.masses();
    let dim = 3 * topology.n_atoms();

    debug!("Aligning trajectory by mass-weighted r.m.s.d.");
    let all_atoms: Vec<usize> = (0..topology.n_atoms()).collect();
    let aligned = reporter.phase("Alignment", || {
        align_to_first(trajectory.frames(), &all_atoms, &masses)
    })?;

    debug!("Calculating the mass-weighted covariance matrix");
    if dim > LARGE_COVARIANCE_DIM {
        warn!(
            dimension = dim,
            "Depending upon the trajectory size, this could take a while."
        );
    }
    if aligned.n_frames() < dim {
        debug!(
            frames = aligned.n_frames(),
            dimension = dim,
            "Fewer frames than degrees of freedom; the covariance matrix is rank deficient"
        );
    }
    let covariance = reporter.phase("Covariance", || {
        mass_weighted_covariance(&aligned, &masses, reporter)
    });

    let n_retained = if n_modes > dim {
        warn!(
            requested = n_modes,
            available = dim,
            "Requested more eigenmodes than degrees of freedom; using all of them"
        );
        dim
    } else {
        n_modes
    };

    debug!("Performing eigendecomposition of the mass-weighted covariance matrix");
    let (eigenvalues, eigenvectors) = reporter.phase("Diagonalization", || {
        leading_eigenpairs(&covariance, n_retained)
    });

    debug!("Analyzing mode fluctuations from eigendecomposition");
    let fluctuations = mode_fluctuations(&eigenvalues, &eigenvectors, &masses)?;
    debug!("Collecting r.m.s.f. for CA only");
    let calpha = calpha_table(topology, &fluctuations)?;

    Ok(FluctuationResult {
        rmsd: DVector::from_vec(aligned.rmsd),
        covariance,
        eigenvalues,
        eigenvectors,
        fluctuations,
        calpha,
    })
}

fn mass_weighted_covariance(
    aligned: &AlignedFrames,
    masses: &[f64],
    reporter: &ProgressReporter,
) -> DMatrix<f64> {
    let mean = aligned.average();
    let n_frames = aligned.n_frames();
    let sqrt_masses: Vec<f64> = masses.iter().map(|m| m.max(0.0).sqrt()).collect();

    let mut displacements = DMatrix::zeros(n_frames, 3 * masses.len());
    reporter.report(Progress::TaskStart {
        total_steps: n_frames as u64,
    });
    for (f, frame) in aligned.positions.iter().enumerate() {
        for (i, (position, center)) in frame.iter().zip(&mean).enumerate() {
            let delta = (position - center) * sqrt_masses[i];
            displacements[(f, 3 * i)] = delta.x;
            displacements[(f, 3 * i + 1)] = delta.y;
            displacements[(f, 3 * i + 2)] = delta.z;
        }
        reporter.report(Progress::TaskIncrement);
    }
    reporter.report(Progress::TaskFinish);

    displacements.tr_mul(&displacements) / n_frames as f64
}

/// Returns the `k` largest eigenvalues (descending) and their eigenvectors as columns.
fn leading_eigenpairs(matrix: &DMatrix<f64>, k: usize) -> (DVector<f64>, DMatrix<f64>) {
    let eigen = SymmetricEigen::new(matrix.clone());
    let mut order: Vec<usize> = (0..eigen.eigenvalues.len()).collect();
    order.sort_by(|&a, &b| {
        eigen.eigenvalues[b]
            .partial_cmp(&eigen.eigenvalues[a])
            .unwrap_or(Ordering::Equal)
    });
    order.truncate(k);

    let values = DVector::from_iterator(order.len(), order.iter().map(|&i| eigen.eigenvalues[i]));
    let vectors = eigen.eigenvectors.select_columns(&order);
    (values, vectors)
}

fn mode_fluctuations(
    eigenvalues: &DVector<f64>,
    eigenvectors: &DMatrix<f64>,
    masses: &[f64],
) -> Result<Table, AnalysisError> {
    let n_atoms = masses.len();
    let mut cells = DMatrix::zeros(n_atoms, FLUCTUATION_COLUMNS.len());

    for (i, &mass) in masses.iter().enumerate() {
        let mut total = 0.0;
        for axis in 0..3 {
            let row = 3 * i + axis;
            // Negative eigenvalues are round-off of a positive semi-definite matrix.
            let projected: f64 = eigenvalues
                .iter()
                .enumerate()
                .map(|(k, &lambda)| lambda.max(0.0) * eigenvectors[(row, k)].powi(2))
                .sum();
            let mean_square = if mass > 0.0 { projected / mass } else { 0.0 };
            cells[(i, axis)] = mean_square.sqrt();
            total += mean_square;
        }
        cells[(i, 3)] = total.sqrt();
    }

    Ok(Table::new(
        ATOM_INDEX_NAME,
        FLUCTUATION_COLUMNS.iter().map(|c| c.to_string()).collect(),
        (1..=n_atoms as i64).collect(),
        cells,
    )?)
}

fn calpha_table(topology: &Topology, fluctuations: &Table) -> Result<Table, AnalysisError> {
    let rows = topology.select(AtomMask::CAlpha);
    let residue_ids = rows
        .iter()
        .map(|&i| topology.residues()[topology.atoms()[i].residue_index].original_id as i64)
        .collect();
    Ok(fluctuations
        .select_rows(&rows)
        .with_index(RESIDUE_INDEX_NAME, residue_ids)?)
}
