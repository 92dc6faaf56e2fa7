use nalgebra::{Matrix3, Point3, Vector3};

/// A proper rotation about the mobile centroid followed by a translation onto the reference
/// centroid, as produced by [`superpose`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RigidTransform {
    pub rotation: Matrix3<f64>,
    pub mobile_center: Vector3<f64>,
    pub reference_center: Vector3<f64>,
}

impl RigidTransform {
    pub fn identity() -> Self {
        Self {
            rotation: Matrix3::identity(),
            mobile_center: Vector3::zeros(),
            reference_center: Vector3::zeros(),
        }
    }

    #[inline]
    pub fn apply(&self, point: &Point3<f64>) -> Point3<f64> {
        Point3::from(self.rotation * (point.coords - self.mobile_center) + self.reference_center)
    }

    pub fn apply_all(&self, points: &mut [Point3<f64>]) {
        for point in points.iter_mut() {
            *point = self.apply(point);
        }
    }
}

pub fn weighted_centroid(points: &[Point3<f64>], weights: &[f64]) -> Option<Vector3<f64>> {
    if points.len() != weights.len() || points.is_empty() {
        return None;
    }
    let total: f64 = weights.iter().sum();
    if total <= 0.0 {
        return None;
    }
    let sum = points
        .iter()
        .zip(weights)
        .fold(Vector3::zeros(), |acc, (p, &w)| acc + p.coords * w);
    Some(sum / total)
}

/// Computes the weighted least-squares superposition of `mobile` onto `reference`.
///
/// Uses the Kabsch construction: the SVD of the weighted cross-covariance of the centered
/// coordinates gives the optimal rotation, with the sign of the last singular vector flipped
/// when needed so that the result is never a reflection.
///
/// # Return
///
/// Returns `None` when the inputs differ in length, are empty, carry no positive total
/// weight, or the SVD fails to produce both factors.
pub fn superpose(
    mobile: &[Point3<f64>],
    reference: &[Point3<f64>],
    weights: &[f64],
) -> Option<RigidTransform> {
    if mobile.len() != reference.len() {
        return None;
    }
    let mobile_center = weighted_centroid(mobile, weights)?;
    let reference_center = weighted_centroid(reference, weights)?;

    let mut h: Matrix3<f64> = Matrix3::zeros();
    for ((m, r), &w) in mobile.iter().zip(reference).zip(weights) {
        let mr = m.coords - mobile_center;
        let rr = r.coords - reference_center;
        h += w * mr * rr.transpose();
    }

    let svd = h.svd(true, true);
    let (u, v_t) = match (svd.u, svd.v_t) {
        (Some(u), Some(v_t)) => (u, v_t),
        _ => return None,
    };
    let mut rotation = v_t.transpose() * u.transpose();
    if rotation.determinant() < 0.0 {
        let mut v_t_adj = v_t;
        v_t_adj.row_mut(2).neg_mut();
        rotation = v_t_adj.transpose() * u.transpose();
    }

    Some(RigidTransform {
        rotation,
        mobile_center,
        reference_center,
    })
}

pub fn calculate_rmsd(coords1: &[Point3<f64>], coords2: &[Point3<f64>]) -> Option<f64> {
    if coords1.len() != coords2.len() || coords1.is_empty() {
        return None;
    }
    let n = coords1.len() as f64;
    let squared_dist_sum: f64 = coords1
        .iter()
        .zip(coords2.iter())
        .map(|(p1, p2)| (p1 - p2).norm_squared())
        .sum();
    Some((squared_dist_sum / n).sqrt())
}

pub fn calculate_weighted_rmsd(
    coords1: &[Point3<f64>],
    coords2: &[Point3<f64>],
    weights: &[f64],
) -> Option<f64> {
    if coords1.len() != coords2.len() || coords1.len() != weights.len() || coords1.is_empty() {
        return None;
    }
    let total: f64 = weights.iter().sum();
    if total <= 0.0 {
        return None;
    }
    let weighted_sum: f64 = coords1
        .iter()
        .zip(coords2)
        .zip(weights)
        .map(|((p1, p2), &w)| w * (p1 - p2).norm_squared())
        .sum();
    Some((weighted_sum / total).sqrt())
}

/// RMSD between two coordinate sets after optimal weighted superposition.
pub fn fitted_rmsd(
    mobile: &[Point3<f64>],
    reference: &[Point3<f64>],
    weights: &[f64],
) -> Option<f64> {
    let transform = superpose(mobile, reference, weights)?;
    let fitted: Vec<Point3<f64>> = mobile.iter().map(|p| transform.apply(p)).collect();
    calculate_weighted_rmsd(&fitted, reference, weights)
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::{Rotation3, Unit};

    fn sample_points() -> Vec<Point3<f64>> {
        vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.5, 0.0, 0.0),
            Point3::new(1.5, 1.2, 0.3),
            Point3::new(-0.4, 2.1, 1.1),
            Point3::new(0.7, -1.3, 2.4),
        ]
    }

    fn rotate_and_shift(points: &[Point3<f64>]) -> Vec<Point3<f64>> {
        let rotation = Rotation3::from_axis_angle(
            &Unit::new_normalize(Vector3::new(0.3, -1.0, 0.5)),
            1.1,
        );
        let shift = Vector3::new(4.0, -2.5, 7.25);
        points.iter().map(|p| rotation * p + shift).collect()
    }

    #[test]
    fn rmsd_of_identical_sets_is_zero() {
        let points = sample_points();
        assert_eq!(calculate_rmsd(&points, &points), Some(0.0));
    }

    #[test]
    fn rmsd_rejects_mismatched_or_empty_inputs() {
        let points = sample_points();
        assert!(calculate_rmsd(&points, &points[..2]).is_none());
        assert!(calculate_rmsd(&[], &[]).is_none());
    }

    #[test]
    fn weighted_rmsd_reduces_to_plain_rmsd_for_equal_weights() {
        let a = sample_points();
        let b: Vec<_> = a.iter().map(|p| p + Vector3::new(0.1, -0.2, 0.3)).collect();
        let weights = vec![2.0; a.len()];
        let plain = calculate_rmsd(&a, &b).unwrap();
        let weighted = calculate_weighted_rmsd(&a, &b, &weights).unwrap();
        assert!((plain - weighted).abs() < 1e-12);
    }

    #[test]
    fn weighted_centroid_respects_weights() {
        let points = vec![Point3::new(0.0, 0.0, 0.0), Point3::new(3.0, 0.0, 0.0)];
        let center = weighted_centroid(&points, &[1.0, 2.0]).unwrap();
        assert!((center.x - 2.0).abs() < 1e-12);
        assert!(weighted_centroid(&points, &[0.0, 0.0]).is_none());
    }

    #[test]
    fn superpose_recovers_rigid_motion() {
        let reference = sample_points();
        let mobile = rotate_and_shift(&reference);
        let weights = vec![12.011, 14.007, 15.999, 1.008, 32.06];

        let transform = superpose(&mobile, &reference, &weights).unwrap();
        for (m, r) in mobile.iter().zip(&reference) {
            assert!((transform.apply(m) - r).norm() < 1e-9);
        }
        assert!((transform.rotation.determinant() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn fitted_rmsd_is_zero_for_rigid_copies() {
        let reference = sample_points();
        let mobile = rotate_and_shift(&reference);
        let weights = vec![1.0; reference.len()];
        assert!(fitted_rmsd(&mobile, &reference, &weights).unwrap() < 1e-9);
    }

    #[test]
    fn superpose_never_returns_a_reflection() {
        let reference = sample_points();
        let mirrored: Vec<_> = reference
            .iter()
            .map(|p| Point3::new(-p.x, p.y, p.z))
            .collect();
        let weights = vec![1.0; reference.len()];
        let transform = superpose(&mirrored, &reference, &weights).unwrap();
        assert!((transform.rotation.determinant() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn identity_transform_leaves_points_unchanged() {
        let mut points = sample_points();
        let original = points.clone();
        RigidTransform::identity().apply_all(&mut points);
        assert_eq!(points, original);
    }
}
