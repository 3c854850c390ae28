use super::Mesh;
use crate::core::geometry::GeometryError;
use crate::core::geometry::frame::{Frame, least_aligned_axis, perpendicular_frame};
use crate::core::models::bubble::Location;
use nalgebra::Vector3;
use std::f64::consts::PI;

/// Vertices emitted around each polyline point.
pub const RING_SIZE: usize = 3;

const RING_ANGLES: [f64; RING_SIZE] = [0.0, 2.0 * PI / 3.0, 4.0 * PI / 3.0];

fn validate(points: &[Location], radius: f64) -> Result<(), GeometryError> {
    if points.len() < 2 {
        return Err(GeometryError::InvalidInput(format!(
            "a tube needs at least 2 points, got {}",
            points.len()
        )));
    }
    if !radius.is_finite() || radius <= 0.0 {
        return Err(GeometryError::InvalidInput(format!(
            "tube radius must be positive, got {}",
            radius
        )));
    }
    if let Some(p) = points.iter().find(|p| p.iter().any(|c| !c.is_finite())) {
        return Err(GeometryError::InvalidInput(format!(
            "tube point {:?} is not finite",
            p
        )));
    }
    if let Some(i) = points
        .windows(2)
        .position(|w| (w[1] - w[0]).norm() <= f64::EPSILON)
    {
        return Err(GeometryError::InvalidInput(format!(
            "tube segment {} between {:?} and {:?} has zero length",
            i,
            points[i],
            points[i + 1]
        )));
    }
    Ok(())
}

/// Tangent at point `i`: the adjacent segment at either end, the bisector of both segments
/// in between.
fn tangent(points: &[Location], i: usize) -> Vector3<f64> {
    let last = points.len() - 1;
    if i == 0 {
        return points[1] - points[0];
    }
    let incoming = (points[i] - points[i - 1]).normalize();
    if i == last {
        return incoming;
    }
    let outgoing = (points[i + 1] - points[i]).normalize();
    let bisector = incoming + outgoing;
    if bisector.norm() <= f64::EPSILON {
        incoming
    } else {
        bisector
    }
}

/// Builds a triangular-section tube along a polyline.
///
/// Each point gets a ring of [`RING_SIZE`] vertices at distance `radius`, placed at angles
/// `0`, `2π/3` and `4π/3` in the plane perpendicular to the local tangent. Consecutive rings are
/// joined by two triangles per side, so `n` points yield `3n` vertices and `6(n - 1)`
/// triangles.
///
/// `edge_origin` orients the first ring; when it is `None` the axis least aligned with the
/// first segment is used. Every later ring is oriented by the previous one to keep the tube
/// from twisting. A reference that is zero or parallel to the tangent is handled by
/// [`perpendicular_frame`].
///
/// Triangle indices are offset by `base_index * 3` so tubes can be concatenated into a shared
/// vertex buffer.
///
/// # Errors
///
/// Returns [`GeometryError::InvalidInput`] for fewer than two points, a non-positive radius,
/// non-finite coordinates or a zero-length segment.
pub fn build_tube(
    points: &[Location],
    radius: f64,
    edge_origin: Option<Vector3<f64>>,
    base_index: usize,
) -> Result<Mesh, GeometryError> {
    validate(points, radius)?;

    let n = points.len();
    let mut vertices = Vec::with_capacity(n * RING_SIZE);
    let mut reference = edge_origin.unwrap_or_else(|| least_aligned_axis(&tangent(points, 0)));

    for (i, point) in points.iter().enumerate() {
        let frame: Frame = perpendicular_frame(&tangent(points, i), &reference)?;
        vertices.extend(
            RING_ANGLES
                .iter()
                .map(|&angle| point + frame.circle_offset(angle) * radius),
        );
        // -v is the reference projected onto this ring's plane
        reference = -frame.v.into_inner();
    }

    let offset = base_index * RING_SIZE;
    let mut triangles = Vec::with_capacity((n - 1) * RING_SIZE * 2);
    for segment in 0..n - 1 {
        let a = offset + segment * RING_SIZE;
        let b = a + RING_SIZE;
        for k in 0..RING_SIZE {
            let next = (k + 1) % RING_SIZE;
            triangles.push([a + k, a + next, b + k]);
            triangles.push([a + next, b + next, b + k]);
        }
    }

    Ok(Mesh {
        vertices,
        triangles,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Point3;

    const TOLERANCE: f64 = 1e-9;

    fn zigzag() -> Vec<Location> {
        vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.5, 1.0, 0.0),
            Point3::new(1.5, 1.0, 2.0),
        ]
    }

    fn assert_ring_radius(points: &[Location], mesh: &Mesh, radius: f64) {
        for (i, point) in points.iter().enumerate() {
            for vertex in &mesh.vertices[i * RING_SIZE..(i + 1) * RING_SIZE] {
                assert!(((vertex - point).norm() - radius).abs() < TOLERANCE);
            }
        }
    }

    #[test]
    fn tube_has_three_vertices_per_point_and_six_triangles_per_segment() {
        let points = zigzag();
        let mesh = build_tube(&points, 0.2, None, 0).unwrap();
        assert_eq!(mesh.vertex_count(), 3 * points.len());
        assert_eq!(mesh.triangle_count(), 6 * (points.len() - 1));
        assert!(mesh.indices_in_bounds());
    }

    #[test]
    fn every_vertex_lies_at_the_tube_radius() {
        let points = zigzag();
        let mesh = build_tube(&points, 0.35, Some(Vector3::new(0.0, 0.0, 1.0)), 0).unwrap();
        assert_ring_radius(&points, &mesh, 0.35);
    }

    #[test]
    fn vertical_segment_does_not_divide_by_zero() {
        let points = vec![Point3::new(0.0, 0.0, 0.0), Point3::new(0.0, 0.0, 3.0)];
        let mesh = build_tube(&points, 0.5, Some(Vector3::z()), 0).unwrap();
        assert!(mesh.vertices.iter().flat_map(|v| v.iter()).all(|c| c.is_finite()));
        assert_ring_radius(&points, &mesh, 0.5);
    }

    #[test]
    fn degenerate_edge_origin_still_gives_a_valid_ring() {
        let points = vec![Point3::new(1.0, 1.0, 1.0), Point3::new(2.0, 2.0, 2.0)];
        for origin in [Vector3::zeros(), Vector3::new(1.0, 1.0, 1.0)] {
            let mesh = build_tube(&points, 0.1, Some(origin), 0).unwrap();
            assert_ring_radius(&points, &mesh, 0.1);
        }
    }

    #[test]
    fn ring_vertices_are_evenly_spaced() {
        let points = vec![Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 2.0, 3.0)];
        let mesh = build_tube(&points, 1.0, None, 0).unwrap();
        let side = 3f64.sqrt();
        let ring = &mesh.vertices[0..3];
        assert!(((ring[0] - ring[1]).norm() - side).abs() < TOLERANCE);
        assert!(((ring[1] - ring[2]).norm() - side).abs() < TOLERANCE);
        assert!(((ring[2] - ring[0]).norm() - side).abs() < TOLERANCE);
    }

    #[test]
    fn straight_tube_does_not_twist() {
        let points: Vec<Location> = (0..5).map(|i| Point3::new(i as f64, 0.0, 0.0)).collect();
        let mesh = build_tube(&points, 0.2, None, 0).unwrap();
        for i in 1..points.len() {
            let first = mesh.vertices[0] - points[0];
            let current = mesh.vertices[i * RING_SIZE] - points[i];
            assert!((first - current).norm() < TOLERANCE);
        }
    }

    #[test]
    fn base_index_shifts_every_triangle_index() {
        let points = zigzag();
        let local = build_tube(&points, 0.2, None, 0).unwrap();
        let shifted = build_tube(&points, 0.2, None, 4).unwrap();

        assert_eq!(local.vertices, shifted.vertices);
        for (l, s) in local.triangles.iter().zip(&shifted.triangles) {
            assert_eq!([l[0] + 12, l[1] + 12, l[2] + 12], *s);
        }
    }

    #[test]
    fn first_segment_triangles_join_the_first_two_rings() {
        let points = vec![Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 0.0, 0.0)];
        let mesh = build_tube(&points, 0.1, None, 0).unwrap();
        assert_eq!(
            mesh.triangles,
            vec![
                [0, 1, 3],
                [1, 4, 3],
                [1, 2, 4],
                [2, 5, 4],
                [2, 0, 5],
                [0, 3, 5],
            ]
        );
    }

    #[test]
    fn invalid_inputs_are_rejected() {
        let single = vec![Point3::new(0.0, 0.0, 0.0)];
        assert!(matches!(
            build_tube(&single, 0.1, None, 0),
            Err(GeometryError::InvalidInput(_))
        ));

        let pair = vec![Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 0.0, 0.0)];
        assert!(build_tube(&pair, 0.0, None, 0).is_err());
        assert!(build_tube(&pair, -1.0, None, 0).is_err());

        let repeated = vec![Point3::new(0.0, 0.0, 0.0), Point3::new(0.0, 0.0, 0.0)];
        assert!(build_tube(&repeated, 0.1, None, 0).is_err());
    }

    #[test]
    fn hairpin_polyline_falls_back_to_the_incoming_direction() {
        let points = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 0.0, 0.0),
        ];
        let mesh = build_tube(&points, 0.1, None, 0).unwrap();
        assert_ring_radius(&points, &mesh, 0.1);
    }
}
