use crate::core::geometry::distance::{CubicBox, distance};
use crate::core::models::bubble::Bubble;
use crate::engine::error::EngineError;
use crate::engine::grid::SpatialGrid;
use crate::engine::progress::{Progress, ProgressReporter};
use tracing::{info, instrument};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// A pair of bubbles whose spheres touch or overlap.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contact {
    /// Index of an original bubble.
    pub a: usize,
    /// Index of the partner, which may be a periodic image.
    pub b: usize,
    /// Center distance, under the minimum image when searched periodically.
    pub distance: f64,
}

/// Index of the original bubble `idx` stands for.
#[inline]
fn source_of(bubbles: &[Bubble], idx: usize) -> usize {
    bubbles[idx].image_of.unwrap_or(idx)
}

fn contacts_of(
    grid: &SpatialGrid,
    a: usize,
    max_radius: f64,
    periodic_box: Option<&CubicBox>,
    contact_scale: f64,
) -> Result<Vec<Contact>, EngineError> {
    let bubbles = grid.bubbles();
    let bubble = &bubbles[a];
    let cell = grid.locate(&bubble.location)?;
    let reach = contact_scale * (bubble.radius + max_radius);

    let mut candidates = grid.neighbor_indices_within(cell, reach, grid.is_periodic())?;
    candidates.sort_unstable();
    candidates.dedup();

    Ok(candidates
        .into_iter()
        .filter(|&b| source_of(bubbles, b) > a)
        .filter_map(|b| {
            let other = &bubbles[b];
            let d = distance(&bubble.location, &other.location, periodic_box);
            (d <= contact_scale * (bubble.radius + other.radius)).then_some(Contact {
                a,
                b,
                distance: d,
            })
        })
        .collect())
}

/// Finds every pair of bubbles in contact.
///
/// Only the first `original_count` bubbles of the grid are queried; later entries are treated
/// as periodic images and only ever appear as the `b` side of a contact. Each pair is reported
/// once: a partner is kept when the original it stands for has a larger index than `a`, so a
/// bubble never pairs with its own images and a wrapped pair is not found from both ends.
///
/// Contacts come out sorted by `a` and then by `b`.
#[instrument(skip_all, name = "contact_search_task")]
pub fn run(
    grid: &SpatialGrid,
    original_count: usize,
    periodic_box: Option<&CubicBox>,
    contact_scale: f64,
    reporter: &ProgressReporter,
) -> Result<Vec<Contact>, EngineError> {
    let bubbles = grid.bubbles();
    let original_count = original_count.min(bubbles.len());
    info!(
        originals = original_count,
        total = bubbles.len(),
        contact_scale,
        "Searching for bubble contacts."
    );

    if original_count == 0 {
        return Ok(Vec::new());
    }
    let max_radius = bubbles.iter().map(|b| b.radius).fold(0.0, f64::max);

    reporter.report(Progress::TaskStart {
        total_steps: original_count as u64,
    });

    #[cfg(not(feature = "parallel"))]
    let iterator = 0..original_count;

    #[cfg(feature = "parallel")]
    let iterator = (0..original_count).into_par_iter();

    let per_bubble: Vec<Vec<Contact>> = iterator
        .map(|a| {
            let found = contacts_of(grid, a, max_radius, periodic_box, contact_scale);
            reporter.report(Progress::TaskIncrement);
            found
        })
        .collect::<Result<_, _>>()?;

    reporter.report(Progress::TaskFinish);

    let contacts: Vec<Contact> = per_bubble.into_iter().flatten().collect();
    info!(num_contacts = contacts.len(), "Contact search complete.");
    Ok(contacts)
}
