use super::GeometryError;
use crate::core::models::bubble::Location;
use nalgebra::Vector3;

/// A cubic periodic cell of edge length `side`.
///
/// Construction validates the edge length once so the distance kernel can run in a tight loop
/// without re-checking its inputs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CubicBox {
    side: f64,
    half_side: f64,
}

impl CubicBox {
    pub fn new(side: f64) -> Result<Self, GeometryError> {
        if !side.is_finite() || side <= 0.0 {
            return Err(GeometryError::InvalidInput(format!(
                "periodic box side must be positive and finite, got {}",
                side
            )));
        }
        Ok(Self {
            side,
            half_side: 0.5 * side,
        })
    }

    #[inline]
    pub fn side(&self) -> f64 {
        self.side
    }

    #[inline]
    fn wrap_component(&self, raw: f64) -> f64 {
        if raw.abs() > self.half_side {
            raw - raw.signum() * self.side
        } else {
            raw
        }
    }
}

/// Displacement from `a` to the nearest periodic image of `b`.
///
/// With `periodic == None` this is the plain difference `b - a`.
#[inline]
pub fn minimum_image(a: &Location, b: &Location, periodic: Option<&CubicBox>) -> Vector3<f64> {
    let raw = b - a;
    match periodic {
        None => raw,
        Some(cell) => Vector3::new(
            cell.wrap_component(raw.x),
            cell.wrap_component(raw.y),
            cell.wrap_component(raw.z),
        ),
    }
}

/// Distance between two locations, optionally under the minimum-image convention.
///
/// This is the innermost kernel of every neighbor query.
#[inline]
pub fn distance(a: &Location, b: &Location, periodic: Option<&CubicBox>) -> f64 {
    minimum_image(a, b, periodic).norm()
}

/// Squared distance, for comparisons that can skip the square root.
#[inline]
pub fn distance_squared(a: &Location, b: &Location, periodic: Option<&CubicBox>) -> f64 {
    minimum_image(a, b, periodic).norm_squared()
}

/// Distance with the periodic flag and box side passed separately.
///
/// # Errors
///
/// Returns [`GeometryError::InvalidInput`] if `periodic` is set and `box_side` is missing or
/// not strictly positive. `box_side` is ignored when `periodic` is false.
pub fn checked_distance(
    a: &Location,
    b: &Location,
    box_side: Option<f64>,
    periodic: bool,
) -> Result<f64, GeometryError> {
    if !periodic {
        return Ok(distance(a, b, None));
    }
    let side = box_side.ok_or_else(|| {
        GeometryError::InvalidInput("periodic distance requires a box side".to_string())
    })?;
    let cell = CubicBox::new(side)?;
    Ok(distance(a, b, Some(&cell)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Point3;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    const TOLERANCE: f64 = 1e-9;

    fn random_point(rng: &mut StdRng, extent: f64) -> Location {
        Point3::new(
            rng.random_range(-extent..extent),
            rng.random_range(-extent..extent),
            rng.random_range(-extent..extent),
        )
    }

    #[test]
    fn euclidean_distance_matches_pythagoras() {
        let a = Point3::new(0.0, 0.0, 0.0);
        let b = Point3::new(3.0, 4.0, 0.0);
        assert!((distance(&a, &b, None) - 5.0).abs() < TOLERANCE);

        let c = Point3::new(1.0, 2.0, 2.0);
        assert!((distance(&a, &c, None) - 3.0).abs() < TOLERANCE);
    }

    #[test]
    fn periodic_distance_wraps_across_the_boundary() {
        let cell = CubicBox::new(10.0).unwrap();
        let a = Point3::new(0.0, 0.0, 0.0);
        let b = Point3::new(9.0, 0.0, 0.0);
        assert!((distance(&a, &b, Some(&cell)) - 1.0).abs() < TOLERANCE);
    }

    #[test]
    fn periodic_distance_keeps_separations_below_half_the_side() {
        let cell = CubicBox::new(10.0).unwrap();
        let a = Point3::new(1.0, 1.0, 1.0);
        let b = Point3::new(4.0, 5.0, 1.0);
        assert!((distance(&a, &b, Some(&cell)) - 5.0).abs() < TOLERANCE);
    }

    #[test]
    fn shifting_by_one_box_side_along_any_axis_gives_zero_distance() {
        let side = 7.5;
        let cell = CubicBox::new(side).unwrap();
        let p = Point3::new(1.25, -3.0, 2.0);
        for axis in [Vector3::x(), Vector3::y(), Vector3::z()] {
            let shifted = p + axis * side;
            assert!(distance(&p, &shifted, Some(&cell)).abs() < TOLERANCE);
            let shifted_back = p - axis * side;
            assert!(distance(&p, &shifted_back, Some(&cell)).abs() < TOLERANCE);
        }
    }

    #[test]
    fn distance_is_symmetric_in_both_modes() {
        let mut rng = StdRng::seed_from_u64(42);
        let cell = CubicBox::new(6.0).unwrap();
        for _ in 0..200 {
            let a = random_point(&mut rng, 5.0);
            let b = random_point(&mut rng, 5.0);
            assert!((distance(&a, &b, None) - distance(&b, &a, None)).abs() < TOLERANCE);
            assert!(
                (distance(&a, &b, Some(&cell)) - distance(&b, &a, Some(&cell))).abs() < TOLERANCE
            );
        }
    }

    #[test]
    fn periodic_distance_never_exceeds_euclidean_distance() {
        let mut rng = StdRng::seed_from_u64(7);
        let cell = CubicBox::new(4.0).unwrap();
        for _ in 0..200 {
            let a = random_point(&mut rng, 2.0);
            let b = random_point(&mut rng, 2.0);
            assert!(distance(&a, &b, Some(&cell)) <= distance(&a, &b, None) + TOLERANCE);
        }
    }

    #[test]
    fn minimum_image_points_to_the_nearest_copy() {
        let cell = CubicBox::new(10.0).unwrap();
        let a = Point3::new(9.5, 5.0, 0.5);
        let b = Point3::new(0.5, 5.0, 9.5);
        let d = minimum_image(&a, &b, Some(&cell));
        assert!((d - Vector3::new(1.0, 0.0, -1.0)).norm() < TOLERANCE);
    }

    #[test]
    fn distance_squared_matches_distance() {
        let a = Point3::new(1.0, 2.0, 3.0);
        let b = Point3::new(-2.0, 6.0, 3.0);
        assert!((distance_squared(&a, &b, None) - 25.0).abs() < TOLERANCE);
    }

    #[test]
    fn cubic_box_rejects_non_positive_sides() {
        assert!(matches!(
            CubicBox::new(0.0),
            Err(GeometryError::InvalidInput(_))
        ));
        assert!(matches!(
            CubicBox::new(-3.0),
            Err(GeometryError::InvalidInput(_))
        ));
        assert!(matches!(
            CubicBox::new(f64::NAN),
            Err(GeometryError::InvalidInput(_))
        ));
    }

    #[test]
    fn checked_distance_ignores_box_side_when_not_periodic() {
        let a = Point3::new(0.0, 0.0, 0.0);
        let b = Point3::new(9.0, 0.0, 0.0);
        assert!((checked_distance(&a, &b, None, false).unwrap() - 9.0).abs() < TOLERANCE);
        assert!((checked_distance(&a, &b, Some(-1.0), false).unwrap() - 9.0).abs() < TOLERANCE);
    }

    #[test]
    fn checked_distance_requires_a_valid_side_when_periodic() {
        let a = Point3::new(0.0, 0.0, 0.0);
        let b = Point3::new(9.0, 0.0, 0.0);
        assert!((checked_distance(&a, &b, Some(10.0), true).unwrap() - 1.0).abs() < TOLERANCE);
        assert!(checked_distance(&a, &b, None, true).is_err());
        assert!(checked_distance(&a, &b, Some(0.0), true).is_err());
    }
}
