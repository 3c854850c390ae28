//! Triangle meshes for strut geometry.
//!
//! A [`Mesh`] is a flat vertex buffer plus triangles indexing into it. Tubes produced by
//! [`tube::build_tube`] can be concatenated into one buffer, either by passing an increasing
//! `base_index` or through [`Mesh::append_tube`] and [`Mesh::extend`].

pub mod tube;

use crate::core::geometry::GeometryError;
use crate::core::models::bubble::Location;
use nalgebra::Vector3;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mesh {
    pub vertices: Vec<Location>,
    pub triangles: Vec<[usize; 3]>,
}

impl Mesh {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Whether every triangle index points at a vertex of this buffer.
    pub fn indices_in_bounds(&self) -> bool {
        let n = self.vertices.len();
        self.triangles.iter().flatten().all(|&idx| idx < n)
    }

    /// Appends a tube built along `points` to this buffer.
    ///
    /// Tubes emit three vertices per point, so the current vertex count divided by three is the
    /// base index of the new tube.
    pub fn append_tube(
        &mut self,
        points: &[Location],
        radius: f64,
        edge_origin: Option<Vector3<f64>>,
    ) -> Result<(), GeometryError> {
        let tube = tube::build_tube(points, radius, edge_origin, self.vertices.len() / 3)?;
        self.vertices.extend(tube.vertices);
        self.triangles.extend(tube.triangles);
        Ok(())
    }

    /// Concatenates a mesh whose indices are local to itself, shifting them past this buffer.
    pub fn extend(&mut self, other: Mesh) {
        let offset = self.vertices.len();
        self.vertices.extend(other.vertices);
        self.triangles.extend(
            other
                .triangles
                .into_iter()
                .map(|[a, b, c]| [a + offset, b + offset, c + offset]),
        );
    }
}
