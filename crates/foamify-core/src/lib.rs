//! # foamify Core Library
//!
//! Spatial geometry for packed spherical bubbles: distance evaluation under periodic
//! boundaries, a uniform cell-list index, periodic replication of a finite box, and conversion
//! of strut polylines into triangle meshes for export.
//!
//! ## Architectural Philosophy
//!
//! The library keeps the same three layers throughout:
//!
//! - **[`core`]: The Foundation.** Stateless data models (`Bubble`), pure geometry (distance
//!   kernel, bounding boxes, replication, perpendicular frames), the tube mesh generator and
//!   file I/O.
//!
//! - **[`engine`]: The Logic Core.** The spatial grid index, configuration, progress reporting
//!   and the tasks built on top of the grid (contact search, strut meshing).
//!
//! - **[`workflows`]: The Public API.** End-to-end pipelines that take placed bubbles and a
//!   configuration and return everything needed for export.

pub mod core;
pub mod engine;
pub mod workflows;
