use crate::error::{CliError, Result};
use foamify::core::io::{csv::CsvFile, pdb::PdbFile, traits::BubbleFile};
use foamify::core::models::bubble::Bubble;
use std::path::Path;
use tracing::debug;

/// Bubble file formats recognized by extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BubbleFormat {
    Csv,
    Pdb,
}

impl BubbleFormat {
    pub fn from_path(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase);
        match extension.as_deref() {
            Some("csv") => Ok(Self::Csv),
            Some("pdb") | Some("ent") => Ok(Self::Pdb),
            _ => Err(CliError::Argument(format!(
                "Cannot infer the bubble format of '{}'. Use a .csv or .pdb extension.",
                path.display()
            ))),
        }
    }
}

pub fn read_bubbles(path: &Path) -> Result<Vec<Bubble>> {
    let format = BubbleFormat::from_path(path)?;
    debug!(?format, "Reading bubbles from {:?}", path);
    let parse_error = |source: anyhow::Error| CliError::FileParsing {
        path: path.to_path_buf(),
        source,
    };
    match format {
        BubbleFormat::Csv => CsvFile::read_from_path(path)
            .map(|(bubbles, _)| bubbles)
            .map_err(|e| parse_error(e.into())),
        BubbleFormat::Pdb => PdbFile::read_from_path(path)
            .map(|(bubbles, _)| bubbles)
            .map_err(|e| parse_error(e.into())),
    }
}

pub fn write_bubbles(path: &Path, bubbles: &[Bubble]) -> Result<()> {
    let format = BubbleFormat::from_path(path)?;
    debug!(?format, count = bubbles.len(), "Writing bubbles to {:?}", path);
    let write_error = |source: anyhow::Error| CliError::FileWriting {
        path: path.to_path_buf(),
        source,
    };
    match format {
        BubbleFormat::Csv => {
            CsvFile::write_bubbles_to_path(bubbles, path).map_err(|e| write_error(e.into()))
        }
        BubbleFormat::Pdb => {
            PdbFile::write_bubbles_to_path(bubbles, path).map_err(|e| write_error(e.into()))
        }
    }
}
