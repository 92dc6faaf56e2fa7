use super::topology::Topology;
use nalgebra::{Point3, Vector3};
use thiserror::Error;

/// Coordinates of every atom at one instant, in Ångström.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub positions: Vec<Point3<f64>>,
    /// Orthorhombic box lengths when the source records them.
    pub unit_cell: Option<Vector3<f64>>,
}

impl Frame {
    pub fn new(positions: Vec<Point3<f64>>) -> Self {
        Self {
            positions,
            unit_cell: None,
        }
    }

    pub fn n_atoms(&self) -> usize {
        self.positions.len()
    }

    pub fn subset(&self, indices: &[usize]) -> Vec<Point3<f64>> {
        indices.iter().map(|&i| self.positions[i]).collect()
    }
}

/// A range of zero-based frame positions `start..stop` taken every `stride` frames.
///
/// A non-positive `stop` selects the whole trajectory and ignores `start` and `stride`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameSlice {
    pub start: usize,
    pub stop: isize,
    pub stride: usize,
}

impl Default for FrameSlice {
    fn default() -> Self {
        Self::full()
    }
}

impl FrameSlice {
    pub fn full() -> Self {
        Self {
            start: 0,
            stop: 0,
            stride: 1,
        }
    }

    pub fn new(start: usize, stop: isize, stride: usize) -> Self {
        Self {
            start,
            stop,
            stride: stride.max(1),
        }
    }

    pub fn is_full(&self) -> bool {
        self.stop <= 0
    }

    /// Whether the frame at zero-based position `index` is part of the slice.
    pub fn contains(&self, index: usize) -> bool {
        if self.is_full() {
            return true;
        }
        index >= self.start
            && (index as isize) < self.stop
            && (index - self.start) % self.stride == 0
    }

    /// Whether no frame at or after zero-based position `index` can be selected.
    pub fn is_past_end(&self, index: usize) -> bool {
        !self.is_full() && index as isize >= self.stop
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TrajectoryShapeError {
    #[error("frame {frame} has {found} atoms but the topology has {expected}")]
    AtomCountMismatch {
        frame: usize,
        expected: usize,
        found: usize,
    },
}

/// A topology with an ordered sequence of frames that all match its atom count.
#[derive(Debug, Clone, PartialEq)]
pub struct Trajectory {
    topology: Topology,
    frames: Vec<Frame>,
}

impl Trajectory {
    pub fn new(topology: Topology, frames: Vec<Frame>) -> Result<Self, TrajectoryShapeError> {
        let expected = topology.n_atoms();
        if let Some((frame, f)) = frames
            .iter()
            .enumerate()
            .find(|(_, f)| f.n_atoms() != expected)
        {
            return Err(TrajectoryShapeError::AtomCountMismatch {
                frame: frame + 1,
                expected,
                found: f.n_atoms(),
            });
        }
        Ok(Self { topology, frames })
    }

    pub fn topology(&self) -> &Topology {
        &self.topology
    }

    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    pub fn n_frames(&self) -> usize {
        self.frames.len()
    }

    pub fn n_atoms(&self) -> usize {
        self.topology.n_atoms()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::topology::TopologyBuilder;

    fn two_atom_topology() -> Topology {
        let mut builder = TopologyBuilder::new();
        builder.start_residue("GLY", 1, 'A');
        builder.add_atom("N", None, None, 0.0, None);
        builder.add_atom("CA", None, None, 0.0, None);
        builder.build()
    }

    #[test]
    fn full_slice_contains_everything() {
        let slice = FrameSlice::full();
        assert!(slice.is_full());
        assert!((0..100).all(|i| slice.contains(i)));
        assert!(!slice.is_past_end(1_000));
    }

    #[test]
    fn bounded_slice_applies_start_stop_and_stride() {
        let slice = FrameSlice::new(2, 9, 3);
        let selected: Vec<usize> = (0..20).filter(|&i| slice.contains(i)).collect();
        assert_eq!(selected, vec![2, 5, 8]);
        assert!(!slice.is_past_end(8));
        assert!(slice.is_past_end(9));
    }

    #[test]
    fn stop_is_exclusive_and_positions_start_at_zero() {
        let slice = FrameSlice::new(1, 10, 1);
        let selected: Vec<usize> = (0..10).filter(|&i| slice.contains(i)).collect();
        assert_eq!(selected, (1..10).collect::<Vec<_>>());
        assert!(!slice.contains(0));
        assert!(!slice.contains(10));
    }

    #[test]
    fn non_positive_stop_ignores_start_and_stride() {
        let slice = FrameSlice::new(5, -1, 4);
        assert!(slice.contains(0));
        assert!(slice.contains(3));
    }

    #[test]
    fn new_clamps_stride_to_one() {
        let slice = FrameSlice::new(0, 10, 0);
        assert_eq!(slice.start, 0);
        assert_eq!(slice.stride, 1);
        assert!(slice.contains(0));
    }

    #[test]
    fn trajectory_rejects_frames_with_wrong_atom_count() {
        let frames = vec![
            Frame::new(vec![Point3::origin(); 2]),
            Frame::new(vec![Point3::origin(); 3]),
        ];
        let err = Trajectory::new(two_atom_topology(), frames).unwrap_err();
        assert_eq!(
            err,
            TrajectoryShapeError::AtomCountMismatch {
                frame: 2,
                expected: 2,
                found: 3
            }
        );
    }

    #[test]
    fn frame_subset_picks_requested_atoms() {
        let frame = Frame::new(vec![Point3::new(1.0, 0.0, 0.0), Point3::new(0.0, 2.0, 0.0)]);
        assert_eq!(frame.subset(&[1]), vec![Point3::new(0.0, 2.0, 0.0)]);
        let trajectory = Trajectory::new(two_atom_topology(), vec![frame]).unwrap();
        assert_eq!(trajectory.n_frames(), 1);
        assert_eq!(trajectory.n_atoms(), 2);
    }
}
