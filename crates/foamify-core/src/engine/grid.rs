use crate::core::geometry::GeometryError;
use crate::core::geometry::bounds::BoundingBox;
use crate::core::geometry::distance::{CubicBox, distance};
use crate::core::models::bubble::{Bubble, Location};
use crate::engine::error::EngineError;
use itertools::iproduct;
use tracing::debug;

/// Largest grid resolution accepted; keeps `cells_per_axis³` well inside `usize`.
pub const MAX_CELLS_PER_AXIS: usize = 256;

/// Integer coordinates of a grid cell, each in `[0, cells_per_axis)`.
pub type CellIndex = [usize; 3];

/// Shape of a uniform grid: `cells_per_axis` cubic cells of side `cell_size` per axis,
/// starting at `origin`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridMetadata {
    cells_per_axis: usize,
    cell_size: f64,
    origin: Location,
}

impl GridMetadata {
    /// Lays a grid over `bbox`. The cell side is the box's dominant span divided by
    /// `cells_per_axis`, so shorter axes are covered by cubic cells too.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Geometry`] if `cells_per_axis` is zero or above
    /// [`MAX_CELLS_PER_AXIS`], or the box has no extent.
    pub fn new(cells_per_axis: usize, bbox: &BoundingBox) -> Result<Self, EngineError> {
        if cells_per_axis == 0 {
            return Err(GeometryError::InvalidInput(
                "a grid needs at least one cell per axis".to_string(),
            )
            .into());
        }
        if cells_per_axis > MAX_CELLS_PER_AXIS {
            return Err(GeometryError::InvalidInput(format!(
                "a grid of {} cells per axis exceeds the limit of {}",
                cells_per_axis, MAX_CELLS_PER_AXIS
            ))
            .into());
        }
        let span = bbox.dominant_span();
        if !span.is_finite() || span <= 0.0 {
            return Err(GeometryError::InvalidInput(format!(
                "cannot lay a grid over a box with span {}",
                span
            ))
            .into());
        }
        Ok(Self {
            cells_per_axis,
            cell_size: span / cells_per_axis as f64,
            origin: bbox.min_corner,
        })
    }

    #[inline]
    pub fn cells_per_axis(&self) -> usize {
        self.cells_per_axis
    }

    #[inline]
    pub fn cell_size(&self) -> f64 {
        self.cell_size
    }

    #[inline]
    pub fn origin(&self) -> Location {
        self.origin
    }

    pub fn cell_count(&self) -> usize {
        self.cells_per_axis.pow(3)
    }

    fn raw_index(&self, location: &Location) -> Result<[isize; 3], EngineError> {
        if location.iter().any(|c| !c.is_finite()) {
            return Err(GeometryError::InvalidInput(format!(
                "cannot locate non-finite location {:?}",
                location
            ))
            .into());
        }
        let rel = (location - self.origin) / self.cell_size;
        Ok([
            rel.x.floor() as isize,
            rel.y.floor() as isize,
            rel.z.floor() as isize,
        ])
    }

    fn checked(&self, index: [isize; 3]) -> Result<CellIndex, EngineError> {
        let n = self.cells_per_axis as isize;
        if index.iter().all(|&c| (0..n).contains(&c)) {
            Ok([index[0] as usize, index[1] as usize, index[2] as usize])
        } else {
            Err(EngineError::OutOfBounds {
                index,
                cells_per_axis: self.cells_per_axis,
            })
        }
    }

    fn wrapped(&self, index: [isize; 3]) -> CellIndex {
        let n = self.cells_per_axis as isize;
        index.map(|c| c.rem_euclid(n) as usize)
    }

    /// Cell containing `location`.
    ///
    /// With `periodic` the index wraps around the grid; otherwise a location outside
    /// `[origin, origin + cells_per_axis * cell_size)` on any axis is
    /// [`EngineError::OutOfBounds`].
    pub fn locate(&self, location: &Location, periodic: bool) -> Result<CellIndex, EngineError> {
        let raw = self.raw_index(location)?;
        if periodic {
            Ok(self.wrapped(raw))
        } else {
            self.checked(raw)
        }
    }

    /// Number of cells to scan on each side of a cell so every point within `threshold` is
    /// covered. Never less than one, and never more than `cells_per_axis`, which already spans
    /// the whole grid (infinite and NaN thresholds included).
    pub fn reach(&self, threshold: f64) -> usize {
        if threshold <= 0.0 {
            return 1;
        }
        let cells = (threshold / self.cell_size).ceil();
        if cells.is_finite() && cells < self.cells_per_axis as f64 {
            (cells as usize).max(1)
        } else {
            self.cells_per_axis.max(1)
        }
    }

    #[inline]
    fn linear(&self, cell: CellIndex) -> usize {
        (cell[0] * self.cells_per_axis + cell[1]) * self.cells_per_axis + cell[2]
    }
}

/// Index of the cell holding `location` in a grid of `cells_per_axis` cells over `bbox`.
///
/// # Errors
///
/// Returns [`EngineError::OutOfBounds`] for locations outside the grid (including the far
/// face of the dominant axis) and [`EngineError::Geometry`] for an empty grid or a flat box.
pub fn cell_of(
    location: &Location,
    cells_per_axis: usize,
    bbox: &BoundingBox,
) -> Result<CellIndex, EngineError> {
    GridMetadata::new(cells_per_axis, bbox)?.locate(location, false)
}

/// A cell list over a borrowed bubble slice.
///
/// Every bubble index is stored in exactly one cell, in input order. The grid is read-only
/// once built and can be queried from many threads.
#[derive(Debug, Clone)]
pub struct SpatialGrid<'a> {
    bubbles: &'a [Bubble],
    metadata: GridMetadata,
    periodic: bool,
    cells: Vec<Vec<usize>>,
}

impl<'a> SpatialGrid<'a> {
    /// Distributes `bubbles` into a grid of `cells_per_axis`³ cells over `bbox`.
    ///
    /// With `periodic` every location is wrapped into the grid; otherwise a bubble outside the
    /// grid fails the build with [`EngineError::OutOfBounds`].
    pub fn build(
        bubbles: &'a [Bubble],
        cells_per_axis: usize,
        bbox: &BoundingBox,
        periodic: bool,
    ) -> Result<Self, EngineError> {
        let metadata = GridMetadata::new(cells_per_axis, bbox)?;
        let mut cells = vec![Vec::new(); metadata.cell_count()];
        for (idx, bubble) in bubbles.iter().enumerate() {
            let cell = metadata.locate(&bubble.location, periodic)?;
            cells[metadata.linear(cell)].push(idx);
        }
        debug!(
            bubbles = bubbles.len(),
            cells_per_axis,
            cell_size = metadata.cell_size,
            periodic,
            "Spatial grid built."
        );
        Ok(Self {
            bubbles,
            metadata,
            periodic,
            cells,
        })
    }

    pub fn metadata(&self) -> &GridMetadata {
        &self.metadata
    }

    pub fn bubbles(&self) -> &'a [Bubble] {
        self.bubbles
    }

    pub fn is_periodic(&self) -> bool {
        self.periodic
    }

    /// Bubble indices stored in `cell`.
    pub fn cell_bubbles(&self, cell: CellIndex) -> Result<&[usize], EngineError> {
        let cell = self.validate(cell)?;
        Ok(&self.cells[self.metadata.linear(cell)])
    }

    /// Cell holding `location`, wrapped when the grid was built periodic.
    pub fn locate(&self, location: &Location) -> Result<CellIndex, EngineError> {
        self.metadata.locate(location, self.periodic)
    }

    fn validate(&self, cell: CellIndex) -> Result<CellIndex, EngineError> {
        self.metadata
            .checked(cell.map(|c| isize::try_from(c).unwrap_or(isize::MAX)))
    }

    /// Indices of the bubbles in the cells around `cell`.
    ///
    /// The scanned block extends [`GridMetadata::reach`] cells in each direction, visited with
    /// the first axis outermost and the last innermost; each cell contributes its bubbles in
    /// insertion order. With `periodic` the block wraps around the grid, otherwise cells past
    /// the edge are skipped. The result is a candidate set: it is not filtered by distance and
    /// on a grid narrower than the block the same bubble appears once per visit.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::OutOfBounds`] if `cell` is not a cell of this grid.
    pub fn neighbor_indices_within(
        &self,
        cell: CellIndex,
        distance_threshold: f64,
        periodic: bool,
    ) -> Result<Vec<usize>, EngineError> {
        let cell = self.validate(cell)?;
        let reach = self.metadata.reach(distance_threshold) as isize;
        let n = self.metadata.cells_per_axis as isize;
        let center = cell.map(|c| c as isize);

        let mut out = Vec::new();
        for (di, dj, dk) in iproduct!(-reach..=reach, -reach..=reach, -reach..=reach) {
            let target = [center[0] + di, center[1] + dj, center[2] + dk];
            let target = if periodic {
                self.metadata.wrapped(target)
            } else if target.iter().all(|&c| (0..n).contains(&c)) {
                target.map(|c| c as usize)
            } else {
                continue;
            };
            out.extend_from_slice(&self.cells[self.metadata.linear(target)]);
        }
        Ok(out)
    }

    /// Like [`neighbor_indices_within`](Self::neighbor_indices_within), resolved to bubbles.
    pub fn neighbors_within(
        &self,
        cell: CellIndex,
        distance_threshold: f64,
        periodic: bool,
    ) -> Result<Vec<&'a Bubble>, EngineError> {
        let bubbles = self.bubbles;
        Ok(self
            .neighbor_indices_within(cell, distance_threshold, periodic)?
            .into_iter()
            .map(|idx| &bubbles[idx])
            .collect())
    }

    /// Indices of all bubbles whose centers lie within `radius` of `location`, ascending and
    /// without duplicates.
    ///
    /// Distances use the minimum-image convention when `periodic_box` is given.
    pub fn within_distance(
        &self,
        location: &Location,
        radius: f64,
        periodic_box: Option<&CubicBox>,
    ) -> Result<Vec<usize>, EngineError> {
        let cell = self.locate(location)?;
        let mut found: Vec<usize> = self
            .neighbor_indices_within(cell, radius, self.periodic)?
            .into_iter()
            .filter(|&idx| distance(location, &self.bubbles[idx].location, periodic_box) <= radius)
            .collect();
        found.sort_unstable();
        found.dedup();
        Ok(found)
    }
}
