use super::GeometryError;
use nalgebra::{Unit, Vector3};

/// Below this sine of the angle between direction and reference the two are treated as
/// parallel.
pub const PARALLEL_TOLERANCE: f64 = 1e-6;

/// Size of the nudge applied to a reference vector that is parallel to the direction.
pub const REFERENCE_PERTURBATION: f64 = 1e-3;

/// An orthonormal frame `(direction, u, v)` with `u` and `v` spanning the plane perpendicular to
/// `direction`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frame {
    pub direction: Unit<Vector3<f64>>,
    pub u: Unit<Vector3<f64>>,
    pub v: Unit<Vector3<f64>>,
}

impl Frame {
    /// Point on the unit circle of this frame at `angle` radians, measured from `u` toward `v`.
    #[inline]
    pub fn circle_offset(&self, angle: f64) -> Vector3<f64> {
        self.u.into_inner() * angle.cos() + self.v.into_inner() * angle.sin()
    }
}

/// The coordinate axis with the smallest absolute component along `direction`.
pub fn least_aligned_axis(direction: &Vector3<f64>) -> Vector3<f64> {
    let abs = direction.abs();
    if abs.x <= abs.y && abs.x <= abs.z {
        Vector3::x()
    } else if abs.y <= abs.z {
        Vector3::y()
    } else {
        Vector3::z()
    }
}

fn is_parallel(direction: &Unit<Vector3<f64>>, reference: &Vector3<f64>) -> bool {
    let norm = reference.norm();
    norm == 0.0 || direction.cross(reference).norm() <= PARALLEL_TOLERANCE * norm
}

/// Builds an orthonormal frame around `direction`, oriented by `reference`.
///
/// `u` is `direction × reference` normalized and `v` completes the right-handed frame. When
/// `reference` is zero or parallel to `direction` the cross product vanishes; the reference is
/// then nudged by [`REFERENCE_PERTURBATION`] along the axis least aligned with `direction`
/// before the cross product is taken. The nudge only picks an orientation for `u`; it never
/// changes the lengths of `u` or `v`.
///
/// # Errors
///
/// Returns [`GeometryError::InvalidInput`] if `direction` is zero or not finite.
pub fn perpendicular_frame(
    direction: &Vector3<f64>,
    reference: &Vector3<f64>,
) -> Result<Frame, GeometryError> {
    let direction = Unit::try_new(*direction, f64::EPSILON)
        .filter(|d| d.iter().all(|c| c.is_finite()))
        .ok_or_else(|| {
            GeometryError::InvalidInput(format!(
                "cannot build a frame around direction {:?}",
                direction
            ))
        })?;

    let reference = if is_parallel(&direction, reference) {
        reference + least_aligned_axis(&direction) * REFERENCE_PERTURBATION
    } else {
        *reference
    };

    let u = Unit::new_normalize(direction.cross(&reference));
    let v = Unit::new_normalize(direction.cross(&*u));
    Ok(Frame { direction, u, v })
}
