//! # Geometry Module
//!
//! Stateless numeric primitives shared by the spatial index, the periodic replication step and
//! the mesh generator.
//!
//! ## Components
//!
//! - [`distance`] - Euclidean and minimum-image distance kernel
//! - [`bounds`] - Axis-aligned boxes and the padded simulation box
//! - [`periodic`] - Wrap and mirror replication of bubbles around a box
//! - [`frame`] - Perpendicular frame construction with a degenerate-direction fallback
//!
//! All functions are pure. Invalid inputs (empty collections, non-positive radii or box
//! sides, zero directions) are reported as [`GeometryError::InvalidInput`].

use thiserror::Error;

pub mod bounds;
pub mod distance;
pub mod frame;
pub mod periodic;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum GeometryError {
    #[error("Invalid geometry input: {0}")]
    InvalidInput(String),
}
