use super::contact_search::Contact;
use crate::core::geometry::distance::{CubicBox, minimum_image};
use crate::core::mesh::Mesh;
use crate::core::mesh::tube::build_tube;
use crate::core::models::bubble::{Bubble, Location};
use crate::engine::error::EngineError;
use crate::engine::progress::{Progress, ProgressReporter};
use tracing::{info, instrument, warn};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Closest the neck point may sit to either end of a strut, as a fraction of its length.
const NECK_CLEARANCE: f64 = 0.05;

/// The wireframe edge joining two bubbles in contact.
#[derive(Debug, Clone, PartialEq)]
pub struct Strut {
    pub from: usize,
    pub to: usize,
    /// `[center of from, neck, nearest image of the center of to]`.
    pub path: [Location; 3],
    /// Radius of the circle where the two spheres intersect, zero when they do not overlap.
    pub neck_radius: f64,
}

impl Strut {
    /// Builds the strut for a contact, or `None` when both centers coincide.
    ///
    /// The neck lies on the plane of the sphere-sphere intersection, at distance
    /// `t = (d² + r_a² - r_b²) / (2d)` from the first center. The path point is kept inside the
    /// segment so the strut never folds back on itself.
    pub fn between(
        bubbles: &[Bubble],
        contact: &Contact,
        periodic_box: Option<&CubicBox>,
    ) -> Option<Self> {
        let a = &bubbles[contact.a];
        let b = &bubbles[contact.b];
        let delta = minimum_image(&a.location, &b.location, periodic_box);
        let d = delta.norm();
        if d <= f64::EPSILON {
            return None;
        }

        let t = (d * d + a.radius * a.radius - b.radius * b.radius) / (2.0 * d);
        let neck_radius = (a.radius * a.radius - t * t).max(0.0).sqrt();
        let fraction = (t / d).clamp(NECK_CLEARANCE, 1.0 - NECK_CLEARANCE);

        Some(Self {
            from: contact.a,
            to: contact.b,
            path: [a.location, a.location + delta * fraction, a.location + delta],
            neck_radius,
        })
    }
}

/// Turns contacts into struts and meshes every strut as a tube of `strut_radius`.
///
/// Tubes are built independently and concatenated in contact order, so the mesh is the same
/// with or without parallelism. Contacts between coincident centers are skipped and counted in a
/// [`Progress::Message`].
#[instrument(skip_all, name = "strut_mesh_task")]
pub fn run(
    bubbles: &[Bubble],
    contacts: &[Contact],
    periodic_box: Option<&CubicBox>,
    strut_radius: f64,
    reporter: &ProgressReporter,
) -> Result<(Vec<Strut>, Mesh), EngineError> {
    info!(num_contacts = contacts.len(), strut_radius, "Building strut meshes.");

    let struts: Vec<Strut> = contacts
        .iter()
        .filter_map(|contact| {
            let strut = Strut::between(bubbles, contact, periodic_box);
            if strut.is_none() {
                warn!(
                    from = contact.a,
                    to = contact.b,
                    "Skipping strut between coincident bubble centers."
                );
            }
            strut
        })
        .collect();

    let skipped = contacts.len() - struts.len();
    if skipped > 0 {
        reporter.message(format!(
            "Skipped {} strut(s) between coincident bubble centers.",
            skipped
        ));
    }

    reporter.report(Progress::TaskStart {
        total_steps: struts.len() as u64,
    });

    #[cfg(not(feature = "parallel"))]
    let iterator = struts.iter();

    #[cfg(feature = "parallel")]
    let iterator = struts.par_iter();

    let tubes: Vec<Mesh> = iterator
        .map(|strut| {
            let tube = build_tube(&strut.path, strut_radius, None, 0);
            reporter.report(Progress::TaskIncrement);
            tube
        })
        .collect::<Result<_, _>>()?;

    reporter.report(Progress::TaskFinish);

    let mesh = tubes.into_iter().fold(Mesh::new(), |mut acc, tube| {
        acc.extend(tube);
        acc
    });
    info!(
        num_struts = struts.len(),
        vertices = mesh.vertex_count(),
        triangles = mesh.triangle_count(),
        "Strut meshes built."
    );
    Ok((struts, mesh))
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Point3;
    use std::sync::Mutex;

    const TOLERANCE: f64 = 1e-9;

    fn contact(a: usize, b: usize) -> Contact {
        Contact {
            a,
            b,
            distance: 0.0,
        }
    }

    #[test]
    fn equal_spheres_meet_halfway() {
        let bubbles = vec![
            Bubble::new(Point3::new(0.0, 0.0, 0.0), 1.0),
            Bubble::new(Point3::new(1.2, 0.0, 0.0), 1.0),
        ];
        let strut = Strut::between(&bubbles, &contact(0, 1), None).unwrap();
        assert!((strut.path[1] - Point3::new(0.6, 0.0, 0.0)).norm() < TOLERANCE);
        assert!((strut.neck_radius - 0.8).abs() < TOLERANCE);
    }

    #[test]
    fn neck_moves_toward_the_smaller_sphere() {
        let bubbles = vec![
            Bubble::new(Point3::new(0.0, 0.0, 0.0), 2.0),
            Bubble::new(Point3::new(2.5, 0.0, 0.0), 1.0),
        ];
        let strut = Strut::between(&bubbles, &contact(0, 1), None).unwrap();
        // t = (6.25 + 4 - 1) / 5
        assert!((strut.path[1].x - 1.85).abs() < TOLERANCE);
        assert!((strut.neck_radius - (4.0f64 - 1.85 * 1.85).sqrt()).abs() < TOLERANCE);
    }

    #[test]
    fn separated_spheres_have_zero_neck_radius() {
        let bubbles = vec![
            Bubble::new(Point3::new(0.0, 0.0, 0.0), 1.0),
            Bubble::new(Point3::new(3.0, 0.0, 0.0), 1.0),
        ];
        let strut = Strut::between(&bubbles, &contact(0, 1), None).unwrap();
        assert_eq!(strut.neck_radius, 0.0);
    }

    #[test]
    fn periodic_struts_end_at_the_nearest_image() {
        let bubbles = vec![
            Bubble::new(Point3::new(1.0, 5.0, 5.0), 1.0),
            Bubble::new(Point3::new(9.0, 5.0, 5.0), 1.0),
        ];
        let side = CubicBox::new(10.0).unwrap();
        let strut = Strut::between(&bubbles, &contact(0, 1), Some(&side)).unwrap();
        assert!((strut.path[2] - Point3::new(-1.0, 5.0, 5.0)).norm() < TOLERANCE);
        assert!((strut.path[1] - Point3::new(0.0, 5.0, 5.0)).norm() < TOLERANCE);
    }

    #[test]
    fn neck_point_stays_inside_the_segment() {
        let bubbles = vec![
            Bubble::new(Point3::new(0.0, 0.0, 0.0), 0.2),
            Bubble::new(Point3::new(1.0, 0.0, 0.0), 3.0),
        ];
        let strut = Strut::between(&bubbles, &contact(0, 1), None).unwrap();
        assert!(strut.path[1].x > 0.0 && strut.path[1].x < 1.0);
    }

    #[test]
    fn coincident_centers_are_skipped() {
        let bubbles = vec![
            Bubble::new(Point3::new(1.0, 1.0, 1.0), 1.0),
            Bubble::new(Point3::new(1.0, 1.0, 1.0), 1.0),
            Bubble::new(Point3::new(2.0, 1.0, 1.0), 1.0),
        ];
        assert!(Strut::between(&bubbles, &contact(0, 1), None).is_none());

        let messages = Mutex::new(Vec::new());
        let reporter = ProgressReporter::with_callback(Box::new(|event: Progress| {
            if let Progress::Message(text) = event {
                messages.lock().unwrap().push(text);
            }
        }));
        let (struts, mesh) =
            run(&bubbles, &[contact(0, 1), contact(0, 2)], None, 0.1, &reporter).unwrap();
        drop(reporter);

        assert_eq!(struts.len(), 1);
        assert_eq!(mesh.vertex_count(), 9);
        let messages = messages.into_inner().unwrap();
        assert_eq!(messages.len(), 1);
        assert!(messages[0].starts_with("Skipped 1 strut(s)"));
    }

    #[test]
    fn no_message_when_nothing_is_skipped() {
        let bubbles = vec![
            Bubble::new(Point3::new(0.0, 0.0, 0.0), 1.0),
            Bubble::new(Point3::new(1.5, 0.0, 0.0), 1.0),
        ];
        let messages = Mutex::new(0usize);
        let reporter = ProgressReporter::with_callback(Box::new(|event: Progress| {
            if matches!(event, Progress::Message(_)) {
                *messages.lock().unwrap() += 1;
            }
        }));
        run(&bubbles, &[contact(0, 1)], None, 0.1, &reporter).unwrap();
        drop(reporter);
        assert_eq!(messages.into_inner().unwrap(), 0);
    }

    #[test]
    fn mesh_concatenates_one_tube_per_strut_in_order() {
        let bubbles = vec![
            Bubble::new(Point3::new(0.0, 0.0, 0.0), 1.0),
            Bubble::new(Point3::new(1.5, 0.0, 0.0), 1.0),
            Bubble::new(Point3::new(1.5, 1.5, 0.0), 1.0),
        ];
        let contacts = [contact(0, 1), contact(1, 2)];
        let (struts, mesh) =
            run(&bubbles, &contacts, None, 0.05, &ProgressReporter::new()).unwrap();

        assert_eq!(struts.len(), 2);
        assert_eq!(mesh.vertex_count(), 18);
        assert_eq!(mesh.triangle_count(), 24);
        assert!(mesh.indices_in_bounds());

        let mut expected = Mesh::new();
        for strut in &struts {
            expected.append_tube(&strut.path, 0.05, None).unwrap();
        }
        assert_eq!(mesh, expected);
    }
}
