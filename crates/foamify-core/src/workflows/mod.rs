//! # Workflows Module
//!
//! High-level entry points that tie the [`crate::core`] and [`crate::engine`] layers together.
//!
//! - **Export Workflow** ([`export`]) - Bounding boxes, optional periodic replication, contact
//!   search and strut meshing for a set of placed bubbles, with summary statistics.
//!
//! Workflows validate their inputs, report phases through a
//! [`ProgressReporter`](crate::engine::progress::ProgressReporter) and return plain data for
//! the caller to write out.

pub mod export;
