mod defaults;

use crate::cli::{FoamArgs, PeriodicBoundary};
use crate::error::{CliError, Result};
use defaults::DefaultsConfig;
use foamify::core::geometry::periodic::ReplicationMode;
use foamify::engine::config as core_config;
use serde::Deserialize;
use std::path::Path;
use std::str::FromStr;
use tracing::debug;

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
struct PartialGridConfig {
    #[serde(rename = "cells-per-axis")]
    cells_per_axis: Option<usize>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
struct PartialBoundaryConfig {
    periodic: Option<bool>,
    replication: Option<ReplicationMode>,
    #[serde(rename = "box-side")]
    box_side: Option<f64>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
struct PartialStrutConfig {
    radius: Option<f64>,
    #[serde(rename = "contact-scale")]
    contact_scale: Option<f64>,
}

/// Foam settings as read from a TOML file, every field optional.
#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
pub struct PartialFoamConfig {
    grid: Option<PartialGridConfig>,
    boundary: Option<PartialBoundaryConfig>,
    struts: Option<PartialStrutConfig>,
}

fn parse_value<T: FromStr>(key: &str, value: &str, kind: &str) -> Result<T> {
    value.parse().map_err(|_| {
        CliError::Config(format!("Invalid {} value for {}: {}", kind, key, value))
    })
}

fn parse_replication(value: &str) -> Option<ReplicationMode> {
    ReplicationMode::from_str(value).ok()
}

impl PartialFoamConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Loading configuration from file: {:?}", path);
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| CliError::FileParsing {
            path: path.to_path_buf(),
            source: e.into(),
        })
    }

    /// Loads the file named by `--config`, or an empty configuration without one.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }

    /// Resolves the final configuration with precedence `-S` > CLI flags > file > defaults.
    pub fn merge_with_cli(mut self, args: &FoamArgs) -> Result<core_config::FoamConfig> {
        self.apply_set_values(&args.set_values)?;

        let defaults = DefaultsConfig::default();
        let grid = self.grid.take().unwrap_or_default();
        let boundary = self.boundary.take().unwrap_or_default();
        let struts = self.struts.take().unwrap_or_default();

        let replication = match args.replicate.as_deref() {
            Some(value) => Some(parse_replication(value).ok_or_else(|| {
                CliError::Argument(format!(
                    "Unknown replication mode '{}'. Expected 'wrap' or 'mirror'.",
                    value
                ))
            })?),
            None => boundary.replication,
        };

        let builder = core_config::FoamConfigBuilder::new()
            .cells_per_axis(
                args.cells
                    .or(grid.cells_per_axis)
                    .unwrap_or(defaults.cells_per_axis),
            )
            .periodic(Self::merge_periodic(
                args.periodic,
                boundary.periodic,
                defaults.periodic,
            ))
            .replication(replication)
            .box_side(args.box_side.or(boundary.box_side))
            .strut_radius(
                args.strut_radius
                    .or(struts.radius)
                    .unwrap_or(defaults.strut_radius),
            )
            .contact_scale(
                args.contact_scale
                    .or(struts.contact_scale)
                    .unwrap_or(defaults.contact_scale),
            );

        builder.build().map_err(|e| CliError::Config(e.to_string()))
    }

    fn merge_periodic(cli_flags: PeriodicBoundary, file_val: Option<bool>, default: bool) -> bool {
        if cli_flags.periodic {
            true
        } else if cli_flags.open {
            false
        } else {
            file_val.unwrap_or(default)
        }
    }

    fn apply_set_values(&mut self, set_values: &[String]) -> Result<()> {
        for kv_pair in set_values {
            let Some((key, value_str)) = kv_pair.split_once('=') else {
                return Err(CliError::Config(format!(
                    "Invalid --set format: '{}'. Expected KEY=VALUE.",
                    kv_pair
                )));
            };

            match key {
                "grid.cells-per-axis" => {
                    self.grid.get_or_insert_with(Default::default).cells_per_axis =
                        Some(parse_value(key, value_str, "integer")?);
                }
                "boundary.periodic" => {
                    self.boundary.get_or_insert_with(Default::default).periodic =
                        Some(parse_value(key, value_str, "boolean")?);
                }
                "boundary.replication" => {
                    self.boundary.get_or_insert_with(Default::default).replication =
                        Some(parse_replication(value_str).ok_or_else(|| {
                            CliError::Config(format!(
                                "Invalid replication mode for {}: {}",
                                key, value_str
                            ))
                        })?);
                }
                "boundary.box-side" => {
                    self.boundary.get_or_insert_with(Default::default).box_side =
                        Some(parse_value(key, value_str, "float")?);
                }
                "struts.radius" => {
                    self.struts.get_or_insert_with(Default::default).radius =
                        Some(parse_value(key, value_str, "float")?);
                }
                "struts.contact-scale" => {
                    self.struts.get_or_insert_with(Default::default).contact_scale =
                        Some(parse_value(key, value_str, "float")?);
                }
                _ => {
                    return Err(CliError::Config(format!(
                        "Unsupported configuration key for --set: '{}'",
                        key
                    )));
                }
            }
        }
        Ok(())
    }
}
