use super::GeometryError;
use super::bounds::BoundingBox;
use crate::core::models::bubble::{Bubble, Location};
use itertools::iproduct;
use nalgebra::Point3;
use serde::Deserialize;
use std::str::FromStr;
use tracing::debug;

/// How periodic images are generated around a finite box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReplicationMode {
    /// Translate copies by whole box spans, tiling space.
    Wrap,
    /// Reflect copies across box faces, edges and corners.
    Mirror,
}

impl FromStr for ReplicationMode {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "wrap" | "translate" => Ok(ReplicationMode::Wrap),
            "mirror" | "reflect" => Ok(ReplicationMode::Mirror),
            _ => Err(()),
        }
    }
}

/// The 26 neighbor offsets of a cell in `{-1, 0, 1}^3`, in lexicographic order.
pub(crate) fn image_offsets() -> impl Iterator<Item = [i8; 3]> {
    iproduct!(-1i8..=1, -1i8..=1, -1i8..=1)
        .filter(|&(i, j, k)| (i, j, k) != (0, 0, 0))
        .map(|(i, j, k)| [i, j, k])
}

fn mirror_component(x: f64, offset: i8, min: f64, max: f64) -> f64 {
    match offset {
        -1 if min == 0.0 => -x,
        -1 => 2.0 * min - x,
        1 => 2.0 * max - x,
        _ => x,
    }
}

fn image_location(
    loc: &Location,
    offset: [i8; 3],
    bbox: &BoundingBox,
    mode: ReplicationMode,
) -> Location {
    match mode {
        ReplicationMode::Wrap => {
            let span = bbox.span();
            Point3::new(
                loc.x + f64::from(offset[0]) * span.x,
                loc.y + f64::from(offset[1]) * span.y,
                loc.z + f64::from(offset[2]) * span.z,
            )
        }
        ReplicationMode::Mirror => Point3::new(
            mirror_component(loc.x, offset[0], bbox.min_corner.x, bbox.max_corner.x),
            mirror_component(loc.y, offset[1], bbox.min_corner.y, bbox.max_corner.y),
            mirror_component(loc.z, offset[2], bbox.min_corner.z, bbox.max_corner.z),
        ),
    }
}

fn validate(bbox: &BoundingBox, mode: ReplicationMode) -> Result<(), GeometryError> {
    if mode == ReplicationMode::Wrap && bbox.span().min() <= 0.0 {
        return Err(GeometryError::InvalidInput(format!(
            "wrap replication needs a box with positive span on every axis, got {:?}",
            bbox.span()
        )));
    }
    Ok(())
}

/// Surrounds every bubble with its 26 periodic images.
///
/// The result holds the input bubbles first, in order, followed by the images of each bubble
/// in turn. Every image carries a copy of its original's label and `image_of` pointing at the
/// original's index, so `N` inputs always produce `27 * N` bubbles.
///
/// # Errors
///
/// Returns [`GeometryError::InvalidInput`] in [`ReplicationMode::Wrap`] if the box has zero
/// span on any axis, since every image would coincide with its original.
pub fn periodicize(
    bubbles: &[Bubble],
    bbox: &BoundingBox,
    mode: ReplicationMode,
) -> Result<Vec<Bubble>, GeometryError> {
    validate(bbox, mode)?;

    let mut out = Vec::with_capacity(bubbles.len() * 27);
    out.extend(bubbles.iter().cloned());
    for (idx, bubble) in bubbles.iter().enumerate() {
        let source = bubble.image_of.unwrap_or(idx);
        out.extend(image_offsets().map(|offset| {
            bubble.image_at(image_location(&bubble.location, offset, bbox, mode), source)
        }));
    }
    debug!(
        originals = bubbles.len(),
        total = out.len(),
        ?mode,
        "Periodic images generated."
    );
    Ok(out)
}

/// Like [`periodicize`], but drops images whose centers lie farther than `margin` outside the
/// box. Originals are always kept.
pub fn periodicize_near_boundary(
    bubbles: &[Bubble],
    bbox: &BoundingBox,
    mode: ReplicationMode,
    margin: f64,
) -> Result<Vec<Bubble>, GeometryError> {
    validate(bbox, mode)?;

    let mut out: Vec<Bubble> = bubbles.to_vec();
    for (idx, bubble) in bubbles.iter().enumerate() {
        let source = bubble.image_of.unwrap_or(idx);
        out.extend(image_offsets().filter_map(|offset| {
            let location = image_location(&bubble.location, offset, bbox, mode);
            (bbox.outside_distance(&location) <= margin).then(|| bubble.image_at(location, source))
        }));
    }
    Ok(out)
}
