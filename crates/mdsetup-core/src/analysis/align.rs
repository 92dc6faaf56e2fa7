use super::error::AnalysisError;
use crate::core::models::trajectory::Frame;
use crate::core::utils::geometry::{calculate_weighted_rmsd, superpose};
use nalgebra::Point3;

/// Coordinates of a set of atoms after fitting every frame onto the first one.
#[derive(Debug, Clone)]
pub struct AlignedFrames {
    /// Fitted coordinates, one vector per frame, in the order of the requested atoms.
    pub positions: Vec<Vec<Point3<f64>>>,
    /// Weighted RMSD of each fitted frame to the reference.
    pub rmsd: Vec<f64>,
}

impl AlignedFrames {
    pub fn n_frames(&self) -> usize {
        self.positions.len()
    }

    /// Per-atom average position across all frames.
    pub fn average(&self) -> Vec<Point3<f64>> {
        let n_atoms = self.positions.first().map_or(0, Vec::len);
        let n_frames = self.n_frames() as f64;
        (0..n_atoms)
            .map(|i| {
                let sum = self
                    .positions
                    .iter()
                    .fold(nalgebra::Vector3::zeros(), |acc, frame| acc + frame[i].coords);
                Point3::from(sum / n_frames)
            })
            .collect()
    }
}

/// Fits the `atoms` of every frame onto the same atoms of the first frame using weighted
/// least-squares superposition.
///
/// `weights` holds one weight per entry of `atoms`.
pub fn align_to_first(
    frames: &[Frame],
    atoms: &[usize],
    weights: &[f64],
) -> Result<AlignedFrames, AnalysisError> {
    let first = frames.first().ok_or(AnalysisError::NoFrames)?;
    let reference = first.subset(atoms);

    let mut positions = Vec::with_capacity(frames.len());
    let mut rmsd = Vec::with_capacity(frames.len());
    for (index, frame) in frames.iter().enumerate() {
        let superposition_err = || AnalysisError::Superposition { frame: index + 1 };
        let mut mobile = frame.subset(atoms);
        let transform = superpose(&mobile, &reference, weights).ok_or_else(superposition_err)?;
        transform.apply_all(&mut mobile);
        rmsd.push(
            calculate_weighted_rmsd(&mobile, &reference, weights).ok_or_else(superposition_err)?,
        );
        positions.push(mobile);
    }
    Ok(AlignedFrames { positions, rmsd })
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::{Rotation3, Vector3};

    fn base() -> Vec<Point3<f64>> {
        vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.5, 0.0, 0.0),
            Point3::new(1.5, 1.4, 0.0),
            Point3::new(0.2, 1.1, 1.3),
        ]
    }

    #[test]
    fn rigid_copies_align_with_zero_rmsd() {
        let rotation = Rotation3::from_euler_angles(0.4, -0.2, 1.3);
        let moved: Vec<_> = base()
            .iter()
            .map(|p| rotation * p + Vector3::new(5.0, 1.0, -2.0))
            .collect();
        let frames = vec![Frame::new(base()), Frame::new(moved)];
        let aligned = align_to_first(&frames, &[0, 1, 2, 3], &[14.0, 12.0, 12.0, 16.0]).unwrap();

        assert_eq!(aligned.n_frames(), 2);
        assert!(aligned.rmsd.iter().all(|&r| r < 1e-9));
        for (a, b) in aligned.positions[1].iter().zip(&base()) {
            assert!((a - b).norm() < 1e-9);
        }
    }

    #[test]
    fn subset_alignment_returns_only_selected_atoms() {
        let frames = vec![Frame::new(base()), Frame::new(base())];
        let aligned = align_to_first(&frames, &[1, 3, 2], &[1.0; 3]).unwrap();
        assert_eq!(aligned.positions[0].len(), 3);
        assert!((aligned.positions[0][1] - base()[3]).norm() < 1e-9);
    }

    #[test]
    fn average_is_taken_per_atom() {
        let shifted: Vec<_> = base().iter().map(|p| p + Vector3::new(0.0, 0.0, 2.0)).collect();
        let aligned = AlignedFrames {
            positions: vec![base(), shifted],
            rmsd: vec![0.0, 0.0],
        };
        for (mean, p) in aligned.average().iter().zip(&base()) {
            assert!((mean - (p + Vector3::new(0.0, 0.0, 1.0))).norm() < 1e-12);
        }
    }

    #[test]
    fn empty_input_and_zero_weights_are_errors() {
        assert!(matches!(
            align_to_first(&[], &[0], &[1.0]),
            Err(AnalysisError::NoFrames)
        ));
        let frames = vec![Frame::new(base())];
        assert!(matches!(
            align_to_first(&frames, &[0, 1], &[0.0, 0.0]),
            Err(AnalysisError::Superposition { frame: 1 })
        ));
    }
}
