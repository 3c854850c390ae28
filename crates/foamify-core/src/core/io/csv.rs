use crate::core::io::traits::BubbleFile;
use crate::core::models::bubble::{Bubble, BubbleLabel};
use nalgebra::Point3;
use serde::{Deserialize, Serialize};
use std::io::{self, BufRead, Write};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CsvError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("Invalid record on line {line}: {message}")]
    InvalidRecord { line: usize, message: String },
    #[error("No bubble records found")]
    Empty,
}

/// One row of a bubble table. Label columns are optional.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BubbleRecord {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub radius: f64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub residue: String,
    #[serde(default)]
    pub chain: String,
    #[serde(default)]
    pub sequence: isize,
    #[serde(default)]
    pub element: String,
}

impl From<&Bubble> for BubbleRecord {
    fn from(bubble: &Bubble) -> Self {
        let label = &bubble.label;
        Self {
            x: bubble.location.x,
            y: bubble.location.y,
            z: bubble.location.z,
            radius: bubble.radius,
            name: label.name.clone(),
            residue: label.residue_name.clone(),
            chain: if label.chain_id == '\0' {
                String::new()
            } else {
                label.chain_id.to_string()
            },
            sequence: label.residue_seq,
            element: label.element.clone(),
        }
    }
}

impl BubbleRecord {
    fn into_bubble(self) -> Bubble {
        let label = BubbleLabel {
            name: self.name,
            residue_name: self.residue,
            chain_id: self.chain.chars().next().unwrap_or('\0'),
            residue_seq: self.sequence,
            element: self.element,
        };
        Bubble::new(Point3::new(self.x, self.y, self.z), self.radius).with_label(label)
    }
}

/// Bubbles as a headed CSV table: `x,y,z,radius[,name,residue,chain,sequence,element]`.
pub struct CsvFile;

impl BubbleFile for CsvFile {
    type Metadata = ();
    type Error = CsvError;

    fn read_from(reader: &mut impl BufRead) -> Result<(Vec<Bubble>, Self::Metadata), Self::Error> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(reader);

        let mut bubbles = Vec::new();
        for (idx, result) in csv_reader.deserialize::<BubbleRecord>().enumerate() {
            let record = result?;
            // header is line 1
            let line = idx + 2;
            if !record.radius.is_finite() || record.radius <= 0.0 {
                return Err(CsvError::InvalidRecord {
                    line,
                    message: format!("radius must be positive, got {}", record.radius),
                });
            }
            if ![record.x, record.y, record.z].iter().all(|c| c.is_finite()) {
                return Err(CsvError::InvalidRecord {
                    line,
                    message: "coordinates must be finite".to_string(),
                });
            }
            bubbles.push(record.into_bubble());
        }

        if bubbles.is_empty() {
            return Err(CsvError::Empty);
        }
        Ok((bubbles, ()))
    }

    fn write_to(
        bubbles: &[Bubble],
        _metadata: &Self::Metadata,
        writer: &mut impl Write,
    ) -> Result<(), Self::Error> {
        let mut csv_writer = csv::Writer::from_writer(writer);
        for bubble in bubbles {
            csv_writer.serialize(BubbleRecord::from(bubble))?;
        }
        csv_writer.flush()?;
        Ok(())
    }
}
