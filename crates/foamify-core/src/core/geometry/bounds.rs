use super::GeometryError;
use crate::core::models::bubble::Location;
use nalgebra::Vector3;

const BOX_DECIMALS: i32 = 3;
const PADDING_FACTOR: f64 = 2.0;

/// An axis-aligned box with `min_corner[i] <= max_corner[i]` on every axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min_corner: Location,
    pub max_corner: Location,
}

impl BoundingBox {
    /// Creates a box from two corners, ordering each axis so the invariant holds.
    pub fn new(a: Location, b: Location) -> Self {
        Self {
            min_corner: a.inf(&b),
            max_corner: a.sup(&b),
        }
    }

    /// Smallest box containing every point, or `None` for an empty iterator.
    pub fn from_points<'a, I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = &'a Location>,
    {
        let mut iter = points.into_iter();
        let first = *iter.next()?;
        Some(iter.fold(
            Self {
                min_corner: first,
                max_corner: first,
            },
            |acc, p| Self {
                min_corner: acc.min_corner.inf(p),
                max_corner: acc.max_corner.sup(p),
            },
        ))
    }

    #[inline]
    pub fn span(&self) -> Vector3<f64> {
        self.max_corner - self.min_corner
    }

    /// The largest per-axis span. Grids use this single span so their cells stay cubic.
    #[inline]
    pub fn dominant_span(&self) -> f64 {
        self.span().max()
    }

    #[inline]
    pub fn contains(&self, p: &Location) -> bool {
        (0..3).all(|i| p[i] >= self.min_corner[i] && p[i] <= self.max_corner[i])
    }

    pub fn contains_box(&self, other: &BoundingBox) -> bool {
        self.contains(&other.min_corner) && self.contains(&other.max_corner)
    }

    pub fn union(&self, other: &BoundingBox) -> Self {
        Self {
            min_corner: self.min_corner.inf(&other.min_corner),
            max_corner: self.max_corner.sup(&other.max_corner),
        }
    }

    /// Grows the box by `margin` on every side.
    pub fn expanded(&self, margin: f64) -> Self {
        let pad = Vector3::repeat(margin);
        Self::new(self.min_corner - pad, self.max_corner + pad)
    }

    /// Distance from `p` to the box surface along the nearest axis, zero or negative inside.
    pub(crate) fn outside_distance(&self, p: &Location) -> f64 {
        (0..3)
            .map(|i| (self.min_corner[i] - p[i]).max(p[i] - self.max_corner[i]))
            .fold(f64::NEG_INFINITY, f64::max)
    }
}

/// The pair of boxes derived from a bubble set.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimulationBoxes {
    /// Tight box around the bubble centers, without radius padding.
    pub atoms: BoundingBox,
    /// Radius-padded box built with the cross-over corner formula.
    pub padded: BoundingBox,
}

impl SimulationBoxes {
    /// Region used for periodic replication: the union of both boxes.
    pub fn domain(&self) -> BoundingBox {
        self.atoms.union(&self.padded)
    }
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let scale = 10f64.powi(decimals);
    (value * scale).round() / scale
}

fn round_point(p: Location) -> Location {
    p.map(|c| round_to(c, BOX_DECIMALS))
}

/// Computes the tight atoms box and the padded simulation box.
///
/// The padding vector is `2 * max(radii)` on every axis. The padded minimum is taken from the
/// atoms' *maximum* corner and the padded maximum from the atoms' *minimum* corner:
///
/// ```text
/// padded_min = atoms_max - 0.5 * r_pad
/// padded_max = atoms_min + 0.5 * r_pad
/// ```
///
/// Both corners are rounded to three decimals and then ordered per axis. When the atoms span
/// on an axis does not exceed `r_pad`, the result contains the atoms box on that axis.
///
/// # Errors
///
/// Returns [`GeometryError::InvalidInput`] if `locations` is empty, if the two slices differ in
/// length, or if any radius is not strictly positive and finite.
pub fn compute_box(
    locations: &[Location],
    radii: &[f64],
) -> Result<SimulationBoxes, GeometryError> {
    if locations.is_empty() {
        return Err(GeometryError::InvalidInput(
            "cannot compute a bounding box without locations".to_string(),
        ));
    }
    if locations.len() != radii.len() {
        return Err(GeometryError::InvalidInput(format!(
            "got {} locations but {} radii",
            locations.len(),
            radii.len()
        )));
    }
    if let Some(bad) = radii.iter().find(|r| !r.is_finite() || **r <= 0.0) {
        return Err(GeometryError::InvalidInput(format!(
            "bubble radii must be positive, got {}",
            bad
        )));
    }

    let atoms = BoundingBox::from_points(locations).ok_or_else(|| {
        GeometryError::InvalidInput("cannot compute a bounding box without locations".to_string())
    })?;

    let max_radius = radii.iter().copied().fold(f64::MIN, f64::max);
    let r_pad = Vector3::repeat(PADDING_FACTOR * max_radius);

    let padded_min = round_point(atoms.max_corner - 0.5 * r_pad);
    let padded_max = round_point(atoms.min_corner + 0.5 * r_pad);

    Ok(SimulationBoxes {
        atoms,
        padded: BoundingBox::new(padded_min, padded_max),
    })
}

/// Convenience wrapper returning the raw cross-over corners without per-axis ordering.
pub fn crossover_corners(atoms: &BoundingBox, max_radius: f64) -> (Location, Location) {
    let r_pad = Vector3::repeat(PADDING_FACTOR * max_radius);
    (
        round_point(atoms.max_corner - 0.5 * r_pad),
        round_point(atoms.min_corner + 0.5 * r_pad),
    )
}
