//! Reads and writes bubble collections and strut meshes.
//!
//! Bubble formats share the [`traits::BubbleFile`] interface so callers can pick a format at
//! runtime and still use the same read and write calls. Meshes only have an output format.

pub mod csv;
pub mod obj;
pub mod pdb;
pub mod traits;
