//! # Engine Module
//!
//! The stateful layer between the pure geometry in [`crate::core`] and the end-to-end
//! [`crate::workflows`].
//!
//! ## Architecture
//!
//! - **Spatial Index** ([`grid`]) - Uniform cell list with neighbor queries in open and
//!   periodic modes
//! - **Configuration** ([`config`]) - Grid, boundary and strut settings with a validating builder
//! - **Progress Monitoring** ([`progress`]) - Progress events and the reporter callback
//! - **Error Handling** ([`error`]) - Engine-specific error types
//! - **Tasks** ([`tasks`]) - Contact search and strut meshing on top of the grid
//!
//! A grid borrows the bubble slice it indexes and stores only indices, so it is rebuilt
//! whenever the bubble set changes and never outlives it.

pub mod config;
pub mod error;
pub mod grid;
pub mod progress;
pub mod tasks;
