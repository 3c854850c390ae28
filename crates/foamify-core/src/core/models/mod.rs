//! # Core Models Module
//!
//! Data structures representing the foam handed to the geometry engine.
//!
//! - [`bubble`] - Bubble spheres, their identity labels, and the `Location` point type
//!
//! Bubbles are plain values: the engine reads `location` and `radius`, and carries `label`
//! through every operation untouched.

pub mod bubble;
