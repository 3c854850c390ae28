use thiserror::Error;

use super::config::ConfigError;
use crate::core::geometry::GeometryError;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Cell {index:?} is outside a grid of {cells_per_axis} cells per axis")]
    OutOfBounds {
        index: [isize; 3],
        cells_per_axis: usize,
    },

    #[error("Geometry error: {source}")]
    Geometry {
        #[from]
        source: GeometryError,
    },

    #[error("Configuration error: {source}")]
    Config {
        #[from]
        source: ConfigError,
    },
}
