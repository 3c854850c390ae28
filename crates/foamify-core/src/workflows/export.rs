use crate::core::geometry::bounds::{BoundingBox, SimulationBoxes, compute_box};
use crate::core::geometry::distance::CubicBox;
use crate::core::geometry::periodic::periodicize;
use crate::core::mesh::Mesh;
use crate::core::models::bubble::{Bubble, Location, total_volume};
use crate::engine::config::FoamConfig;
use crate::engine::error::EngineError;
use crate::engine::grid::SpatialGrid;
use crate::engine::progress::{Progress, ProgressReporter};
use crate::engine::tasks::contact_search::{self, Contact};
use crate::engine::tasks::strut_mesh::{self, Strut};
use nalgebra::Vector3;
use tracing::{info, instrument};

/// Summary numbers for a foam.
#[derive(Debug, Clone, PartialEq)]
pub struct FoamStats {
    /// Number of original bubbles.
    pub bubble_count: usize,
    /// Number of periodic images added by replication.
    pub image_count: usize,
    pub min_radius: f64,
    pub max_radius: f64,
    /// Summed sphere volume of the original bubbles.
    pub total_volume: f64,
    pub contact_count: usize,
    /// Average number of contacts per original bubble.
    pub mean_coordination: f64,
}

impl FoamStats {
    /// Statistics of `bubbles` (originals and images) and the contacts found among them.
    pub fn of(bubbles: &[Bubble], contact_count: usize) -> Self {
        let originals: Vec<Bubble> = bubbles.iter().filter(|b| !b.is_image()).cloned().collect();
        let bubble_count = originals.len();
        let (min_radius, max_radius) = originals
            .iter()
            .map(|b| b.radius)
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), r| {
                (lo.min(r), hi.max(r))
            });
        Self {
            bubble_count,
            image_count: bubbles.len() - bubble_count,
            min_radius: if bubble_count == 0 { 0.0 } else { min_radius },
            max_radius: if bubble_count == 0 { 0.0 } else { max_radius },
            total_volume: total_volume(&originals),
            contact_count,
            mean_coordination: if bubble_count == 0 {
                0.0
            } else {
                2.0 * contact_count as f64 / bubble_count as f64
            },
        }
    }
}

/// Everything the export step writes out.
#[derive(Debug, Clone)]
pub struct FoamExport {
    /// Original bubbles followed by their periodic images when replication is enabled.
    pub bubbles: Vec<Bubble>,
    pub boxes: SimulationBoxes,
    pub contacts: Vec<Contact>,
    pub struts: Vec<Strut>,
    pub mesh: Mesh,
    pub stats: FoamStats,
}

fn cube_at(origin: Location, side: f64) -> BoundingBox {
    BoundingBox::new(origin, origin + Vector3::repeat(side))
}

/// Runs the export pipeline on placed bubbles.
///
/// 1. Validates the bubbles and computes the simulation boxes.
/// 2. With replication enabled, surrounds the bubbles with their 26 images over the
///    replication box (a cube of `box_side` when given, the boxes' domain otherwise).
/// 3. Finds contacts: on a periodic grid with minimum-image distances when `periodic` is
///    set, on an open grid otherwise.
/// 4. Builds one strut per contact and meshes the struts into a single buffer.
#[instrument(skip_all, name = "export_workflow")]
pub fn run(
    bubbles: &[Bubble],
    config: &FoamConfig,
    reporter: &ProgressReporter,
) -> Result<FoamExport, EngineError> {
    // === Phase 1: Validation and bounding boxes ===
    reporter.report(Progress::PhaseStart { name: "Validation" });
    let locations: Vec<Location> = bubbles.iter().map(|b| b.location).collect();
    let radii: Vec<f64> = bubbles.iter().map(|b| b.radius).collect();
    let boxes = compute_box(&locations, &radii)?;
    let domain = boxes.domain();
    let max_radius = radii.iter().copied().fold(0.0, f64::max);
    info!(
        num_bubbles = bubbles.len(),
        min = ?domain.min_corner,
        max = ?domain.max_corner,
        "Simulation boxes computed."
    );
    reporter.report(Progress::PhaseFinish);

    // === Phase 2: Periodic replication (optional) ===
    let all: Vec<Bubble> = match config.boundary.replication {
        Some(mode) => {
            reporter.report(Progress::PhaseStart {
                name: "Replication",
            });
            let replication_box = config
                .boundary
                .box_side
                .map_or(domain, |side| cube_at(domain.min_corner, side));
            let replicated = periodicize(bubbles, &replication_box, mode)?;
            info!(?mode, total = replicated.len(), "Bubbles replicated.");
            reporter.report(Progress::PhaseFinish);
            replicated
        }
        None => bubbles.to_vec(),
    };

    // === Phase 3: Contact search ===
    reporter.report(Progress::PhaseStart {
        name: "Contact Search",
    });
    let periodic_box = if config.boundary.periodic {
        Some(CubicBox::new(
            config.boundary.box_side.unwrap_or(domain.dominant_span()),
        )?)
    } else {
        None
    };
    let contacts = {
        let grid = match &periodic_box {
            Some(cubic) => SpatialGrid::build(
                &all,
                config.grid.cells_per_axis,
                &cube_at(domain.min_corner, cubic.side()),
                true,
            )?,
            None => {
                let extent = BoundingBox::from_points(all.iter().map(|b| &b.location))
                    .unwrap_or(domain)
                    .expanded(max_radius);
                SpatialGrid::build(&all, config.grid.cells_per_axis, &extent, false)?
            }
        };
        contact_search::run(
            &grid,
            bubbles.len(),
            periodic_box.as_ref(),
            config.struts.contact_scale,
            reporter,
        )?
    };
    reporter.report(Progress::PhaseFinish);

    // === Phase 4: Strut meshing ===
    reporter.report(Progress::PhaseStart {
        name: "Strut Meshing",
    });
    let (struts, mesh) = strut_mesh::run(
        &all,
        &contacts,
        periodic_box.as_ref(),
        config.struts.radius,
        reporter,
    )?;
    reporter.report(Progress::PhaseFinish);

    let stats = FoamStats::of(&all, contacts.len());
    info!(
        bubbles = stats.bubble_count,
        images = stats.image_count,
        contacts = stats.contact_count,
        "Export workflow complete."
    );

    Ok(FoamExport {
        bubbles: all,
        boxes,
        contacts,
        struts,
        mesh,
        stats,
    })
}
