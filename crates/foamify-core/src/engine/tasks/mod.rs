//! Computational units built on the spatial grid.
//!
//! Each task takes borrowed inputs, reports progress through a
//! [`ProgressReporter`](crate::engine::progress::ProgressReporter) and returns plain data.
//! With the `parallel` feature the per-bubble and per-strut loops run on rayon; results are
//! collected in input order either way.

pub mod contact_search;
pub mod strut_mesh;
