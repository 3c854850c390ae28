//! # Core Module
//!
//! Stateless building blocks shared by the engine and the workflows.
//!
//! ## Architecture
//!
//! - **Bubble Representation** ([`models`]) - Bubbles, their labels and periodic image links
//! - **Geometry** ([`geometry`]) - Distance kernel, bounding boxes, periodic replication and
//!   perpendicular frames
//! - **Meshes** ([`mesh`]) - Tube generation along polylines and composed triangle buffers
//! - **Element Radii** ([`elements`]) - Reference radius per element symbol and
//!   nearest-radius lookup
//! - **File I/O** ([`io`]) - PDB and CSV bubble formats, OBJ mesh output
//!
//! Nothing in this module holds state between calls; every function is a transformation of
//! its inputs.

pub mod elements;
pub mod geometry;
pub mod io;
pub mod mesh;
pub mod models;
