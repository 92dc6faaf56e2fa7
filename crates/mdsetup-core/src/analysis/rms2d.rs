use super::error::AnalysisError;
use super::progress::{Progress, ProgressReporter};
use crate::core::models::trajectory::Trajectory;
use crate::core::selection::AtomMask;
use crate::core::utils::geometry::fitted_rmsd;
use nalgebra::DMatrix;
use tracing::{debug, instrument, warn};

const SLOW_FRAME_COUNT: usize = 2_000;

/// Best-fit RMSD between every pair of frames for the atoms selected by `mask`.
///
/// The result is a symmetric `F x F` matrix with a zero diagonal. Superposition is unweighted.
#[instrument(skip(trajectory, reporter), name = "rms2d")]
pub fn pairwise_rmsd(
    trajectory: &Trajectory,
    mask: AtomMask,
    reporter: &ProgressReporter,
) -> Result<DMatrix<f64>, AnalysisError> {
    if trajectory.is_empty() {
        return Err(AnalysisError::NoFrames);
    }
    let atoms = trajectory.topology().select(mask);
    if atoms.is_empty() {
        return Err(AnalysisError::EmptySelection(mask));
    }

    let n_frames = trajectory.n_frames();
    if n_frames > SLOW_FRAME_COUNT {
        warn!(
            frames = n_frames,
            "Depending upon the trajectory size, this could take a while."
        );
    }
    debug!(
        frames = n_frames,
        atoms = atoms.len(),
        selection = mask.expression(),
        "Calculating 2-D r.m.s.d."
    );

    let coordinates: Vec<_> = trajectory
        .frames()
        .iter()
        .map(|frame| frame.subset(&atoms))
        .collect();
    let weights = vec![1.0; atoms.len()];

    let mut matrix = DMatrix::zeros(n_frames, n_frames);
    reporter.report(Progress::TaskStart {
        total_steps: (n_frames * n_frames.saturating_sub(1) / 2) as u64,
    });
    for i in 0..n_frames {
        for j in (i + 1)..n_frames {
            let rmsd = fitted_rmsd(&coordinates[j], &coordinates[i], &weights)
                .ok_or(AnalysisError::Superposition { frame: j + 1 })?;
            matrix[(i, j)] = rmsd;
            matrix[(j, i)] = rmsd;
            reporter.report(Progress::TaskIncrement);
        }
    }
    reporter.report(Progress::TaskFinish);
    Ok(matrix)
}
