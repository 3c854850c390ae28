use crate::core::geometry::periodic::ReplicationMode;
use crate::engine::grid::MAX_CELLS_PER_AXIS;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Clone)]
pub enum ConfigError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),
    #[error("Invalid value for parameter '{name}': {reason}")]
    InvalidParameter { name: &'static str, reason: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct GridConfig {
    pub cells_per_axis: usize,
}

/// How the edges of the simulation box are treated.
///
/// At most one of `periodic` and `replication` is active: `periodic` evaluates distances with
/// the minimum-image convention on a cubic box, `replication` materializes the 26 surrounding
/// images and searches them with open boundaries.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundaryConfig {
    pub periodic: bool,
    pub replication: Option<ReplicationMode>,
    /// Side of the cubic periodic box. Defaults to the dominant span of the bubble domain.
    pub box_side: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StrutConfig {
    pub radius: f64,
    /// Two bubbles are in contact when their centers are at most
    /// `contact_scale * (r_a + r_b)` apart.
    pub contact_scale: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FoamConfig {
    pub grid: GridConfig,
    pub boundary: BoundaryConfig,
    pub struts: StrutConfig,
}

#[derive(Default)]
pub struct FoamConfigBuilder {
    cells_per_axis: Option<usize>,
    periodic: Option<bool>,
    replication: Option<ReplicationMode>,
    box_side: Option<f64>,
    strut_radius: Option<f64>,
    contact_scale: Option<f64>,
}

fn require_positive(name: &'static str, value: f64) -> Result<f64, ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(ConfigError::InvalidParameter {
            name,
            reason: format!("must be a positive number, got {}", value),
        })
    }
}

impl FoamConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cells_per_axis(mut self, cells: usize) -> Self {
        self.cells_per_axis = Some(cells);
        self
    }
    pub fn periodic(mut self, periodic: bool) -> Self {
        self.periodic = Some(periodic);
        self
    }
    pub fn replication(mut self, mode: Option<ReplicationMode>) -> Self {
        self.replication = mode;
        self
    }
    pub fn box_side(mut self, side: Option<f64>) -> Self {
        self.box_side = side;
        self
    }
    pub fn strut_radius(mut self, radius: f64) -> Self {
        self.strut_radius = Some(radius);
        self
    }
    pub fn contact_scale(mut self, scale: f64) -> Self {
        self.contact_scale = Some(scale);
        self
    }

    pub fn build(self) -> Result<FoamConfig, ConfigError> {
        let cells_per_axis = self
            .cells_per_axis
            .ok_or(ConfigError::MissingParameter("cells_per_axis"))?;
        if cells_per_axis == 0 {
            return Err(ConfigError::InvalidParameter {
                name: "cells_per_axis",
                reason: "a grid needs at least one cell per axis".to_string(),
            });
        }
        if cells_per_axis > MAX_CELLS_PER_AXIS {
            return Err(ConfigError::InvalidParameter {
                name: "cells_per_axis",
                reason: format!("must not exceed {}", MAX_CELLS_PER_AXIS),
            });
        }

        let periodic = self.periodic.unwrap_or(false);
        if periodic && self.replication.is_some() {
            return Err(ConfigError::InvalidParameter {
                name: "replication",
                reason: "cannot be combined with minimum-image periodic boundaries".to_string(),
            });
        }
        let box_side = self
            .box_side
            .map(|side| require_positive("box_side", side))
            .transpose()?;

        let radius = require_positive(
            "strut_radius",
            self.strut_radius
                .ok_or(ConfigError::MissingParameter("strut_radius"))?,
        )?;
        let contact_scale = require_positive(
            "contact_scale",
            self.contact_scale
                .ok_or(ConfigError::MissingParameter("contact_scale"))?,
        )?;

        Ok(FoamConfig {
            grid: GridConfig { cells_per_axis },
            boundary: BoundaryConfig {
                periodic,
                replication: self.replication,
                box_side,
            },
            struts: StrutConfig {
                radius,
                contact_scale,
            },
        })
    }
}
