use crate::core::elements::{element_radius, find_closest_key, sorted_radii};
use crate::core::io::traits::BubbleFile;
use crate::core::models::bubble::{Bubble, BubbleLabel, Location};
use nalgebra::Point3;
use std::io::{self, BufRead, Write};
use thiserror::Error;

const SEGMENT_ID: &str = "FOAM";
const MAX_SERIAL: usize = 100_000;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PdbMetadata {
    /// Non-coordinate records (HEADER, REMARK, CRYST1, ...) in file order.
    pub header_lines: Vec<String>,
}

#[derive(Debug, Error)]
pub enum PdbError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Parse error on line {line}: {kind}")]
    Parse { line: usize, kind: PdbParseErrorKind },
    #[error("Missing required record: {0}")]
    MissingRecord(String),
    #[error("Value {value} does not fit the {width}-column {field} field")]
    FieldOverflow {
        field: &'static str,
        value: f64,
        width: usize,
    },
}

#[derive(Debug, Error)]
pub enum PdbParseErrorKind {
    #[error("Invalid integer format in columns {columns} (value: '{value}')")]
    InvalidInt { columns: String, value: String },
    #[error("Invalid float format in columns {columns} (value: '{value}')")]
    InvalidFloat { columns: String, value: String },
    #[error("Line is too short for ATOM/HETATM record (must be at least 54 chars)")]
    LineTooShort,
    #[error("No radius in columns 61-66 and no known element to take one from")]
    MissingRadius,
}

/// One fixed-column ATOM/HETATM record.
#[derive(Debug, Clone, PartialEq)]
pub struct PdbRecord<'a> {
    pub record_type: &'a str,
    pub serial: usize,
    pub name: &'a str,
    pub alt_loc: char,
    pub residue_name: &'a str,
    pub chain_id: char,
    pub residue_seq: isize,
    pub insertion_code: char,
    pub location: Location,
    pub occupancy: f64,
    /// The bubble radius is stored in this column.
    pub temp_factor: f64,
    pub segment_id: &'a str,
    pub element: &'a str,
    pub charge: &'a str,
}

impl<'a> PdbRecord<'a> {
    fn from_bubble(serial: usize, bubble: &'a Bubble, fallback_symbol: &'a str) -> Self {
        let label = &bubble.label;
        let name = if label.name.is_empty() {
            fallback_symbol
        } else {
            label.name.as_str()
        };
        let element = if label.element.is_empty() {
            fallback_symbol
        } else {
            label.element.as_str()
        };
        let residue_name = if label.residue_name.is_empty() {
            "FOA"
        } else {
            label.residue_name.as_str()
        };
        Self {
            record_type: "ATOM",
            serial,
            name,
            alt_loc: ' ',
            residue_name,
            chain_id: if label.chain_id == '\0' { 'A' } else { label.chain_id },
            residue_seq: label.residue_seq,
            insertion_code: ' ',
            location: bubble.location,
            occupancy: 1.0,
            temp_factor: bubble.radius,
            segment_id: SEGMENT_ID,
            element,
            charge: "",
        }
    }
}

/// Right-aligns `value` in `width` columns with at most `decimals` digits after the point,
/// dropping digits until it fits.
fn fit_float(
    field: &'static str,
    value: f64,
    width: usize,
    decimals: usize,
) -> Result<String, PdbError> {
    (0..=decimals)
        .rev()
        .map(|d| format!("{:>width$.d$}", value, width = width, d = d))
        .find(|text| text.len() <= width)
        .ok_or(PdbError::FieldOverflow {
            field,
            value,
            width,
        })
}

/// Formats a record into its 80-column text line, without a trailing newline.
///
/// Coordinates use three decimals. Names shorter than four characters start in column 14,
/// following the usual alignment for single-letter elements. Wide values lose decimals to stay
/// inside their columns.
///
/// # Errors
///
/// Returns [`PdbError::FieldOverflow`] if a number does not fit its columns even without
/// decimals.
pub fn format_atom_line(record: &PdbRecord) -> Result<String, PdbError> {
    let name = if record.name.len() < 4 {
        format!(" {}", record.name)
    } else {
        record.name.to_string()
    };
    Ok(format!(
        "{:<6}{:>5} {:<4}{}{:>3} {}{:>4}{}   {}{}{}{}{}      {:<4}{:>2}{:>2}",
        record.record_type,
        record.serial % MAX_SERIAL,
        name,
        record.alt_loc,
        record.residue_name,
        record.chain_id,
        record.residue_seq,
        record.insertion_code,
        fit_float("x", record.location.x, 8, 3)?,
        fit_float("y", record.location.y, 8, 3)?,
        fit_float("z", record.location.z, 8, 3)?,
        fit_float("occupancy", record.occupancy, 6, 2)?,
        fit_float("radius", record.temp_factor, 6, 3)?,
        record.segment_id,
        record.element,
        record.charge,
    ))
}

fn slice_and_trim(line: &str, start: usize, end: usize) -> &str {
    line.get(start..end.min(line.len())).unwrap_or("").trim()
}

fn parse_float(line_num: usize, value: &str, columns: &str) -> Result<f64, PdbError> {
    value.parse().map_err(|_| PdbError::Parse {
        line: line_num,
        kind: PdbParseErrorKind::InvalidFloat {
            columns: columns.into(),
            value: value.into(),
        },
    })
}

fn parse_atom_line(line_num: usize, line: &str) -> Result<Bubble, PdbError> {
    if line.len() < 54 {
        return Err(PdbError::Parse {
            line: line_num,
            kind: PdbParseErrorKind::LineTooShort,
        });
    }

    let name = slice_and_trim(line, 12, 16);
    let residue_name = slice_and_trim(line, 17, 20);
    let chain_id = slice_and_trim(line, 21, 22).chars().next().unwrap_or('A');
    let res_seq_str = slice_and_trim(line, 22, 26);
    let residue_seq: isize = if res_seq_str.is_empty() {
        0
    } else {
        res_seq_str.parse().map_err(|_| PdbError::Parse {
            line: line_num,
            kind: PdbParseErrorKind::InvalidInt {
                columns: "23-26".into(),
                value: res_seq_str.into(),
            },
        })?
    };
    let x = parse_float(line_num, slice_and_trim(line, 30, 38), "31-38")?;
    let y = parse_float(line_num, slice_and_trim(line, 38, 46), "39-46")?;
    let z = parse_float(line_num, slice_and_trim(line, 46, 54), "47-54")?;
    let element = slice_and_trim(line, 76, 78);

    let temp_str = slice_and_trim(line, 60, 66);
    let temp_factor = if temp_str.is_empty() {
        0.0
    } else {
        parse_float(line_num, temp_str, "61-66")?
    };
    let radius = if temp_factor > 0.0 {
        temp_factor
    } else {
        let symbol = if element.is_empty() { name } else { element };
        element_radius(symbol).ok_or(PdbError::Parse {
            line: line_num,
            kind: PdbParseErrorKind::MissingRadius,
        })?
    };

    let label = BubbleLabel {
        name: name.to_string(),
        residue_name: residue_name.to_string(),
        chain_id,
        residue_seq,
        element: element.to_string(),
    };
    Ok(Bubble::new(Point3::new(x, y, z), radius).with_label(label))
}

/// Bubbles as PDB atom records, with the radius in the temperature-factor column.
pub struct PdbFile;

impl BubbleFile for PdbFile {
    type Metadata = PdbMetadata;
    type Error = PdbError;

    fn read_from(reader: &mut impl BufRead) -> Result<(Vec<Bubble>, Self::Metadata), Self::Error> {
        let mut bubbles = Vec::new();
        let mut metadata = PdbMetadata::default();

        for (line_num, line_res) in reader.lines().enumerate() {
            let line = line_res?;
            let line_num = line_num + 1;

            match slice_and_trim(&line, 0, 6) {
                "ATOM" | "HETATM" => bubbles.push(parse_atom_line(line_num, &line)?),
                "END" | "ENDMDL" => break,
                "" => continue,
                _ => metadata.header_lines.push(line.clone()),
            }
        }

        if bubbles.is_empty() {
            return Err(PdbError::MissingRecord("ATOM/HETATM records".into()));
        }
        Ok((bubbles, metadata))
    }

    fn write_to(
        bubbles: &[Bubble],
        metadata: &Self::Metadata,
        writer: &mut impl Write,
    ) -> Result<(), Self::Error> {
        for line in &metadata.header_lines {
            writeln!(writer, "{}", line)?;
        }

        let table = sorted_radii();
        for (idx, bubble) in bubbles.iter().enumerate() {
            let symbol = find_closest_key(bubble.radius, &table).map_or("X", |(_, s)| *s);
            let record = PdbRecord::from_bubble(idx + 1, bubble, symbol);
            writeln!(writer, "{}", format_atom_line(&record)?)?;
        }

        writeln!(writer, "END")?;
        Ok(())
    }

    fn write_bubbles_to(bubbles: &[Bubble], writer: &mut impl Write) -> Result<(), Self::Error> {
        let metadata = PdbMetadata {
            header_lines: vec!["REMARK   1 Generated by foamify".to_string()],
        };
        Self::write_to(bubbles, &metadata, writer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use tempfile::tempdir;

    fn sample_record() -> PdbRecord<'static> {
        PdbRecord {
            record_type: "ATOM",
            serial: 1,
            name: "C",
            alt_loc: ' ',
            residue_name: "FOA",
            chain_id: 'A',
            residue_seq: 1,
            insertion_code: ' ',
            location: Point3::new(1.2345, 2.3456, 3.4567),
            occupancy: 1.0,
            temp_factor: 0.0,
            segment_id: "FOAM",
            element: "C",
            charge: "",
        }
    }

    #[test]
    fn atom_line_places_fields_in_fixed_columns() {
        let line = format_atom_line(&sample_record()).unwrap();
        assert_eq!(line.len(), 80);
        assert!(line.starts_with("ATOM      1  C   FOA A   1"));
        assert_eq!(&line[30..38], "   1.234");
        assert_eq!(&line[38..46], "   2.346");
        assert_eq!(&line[46..54], "   3.457");
        assert_eq!(&line[54..60], "  1.00");
        assert_eq!(&line[72..76], "FOAM");
        assert_eq!(&line[76..78], " C");
    }

    #[test]
    fn radius_is_written_to_the_temperature_factor_column() {
        let record = PdbRecord {
            temp_factor: 1.75,
            ..sample_record()
        };
        let line = format_atom_line(&record).unwrap();
        assert_eq!(&line[60..66], " 1.750");
    }

    #[test]
    fn wide_values_drop_decimals_to_keep_their_columns() {
        let record = PdbRecord {
            location: Point3::new(12345.6789, -1234.5, 0.0),
            temp_factor: 123.456,
            ..sample_record()
        };
        let line = format_atom_line(&record).unwrap();
        assert_eq!(line.len(), 80);
        assert_eq!(&line[30..38], "12345.68");
        assert_eq!(&line[38..46], "-1234.50");
        assert_eq!(&line[60..66], "123.46");
        assert_eq!(&line[72..76], "FOAM");

        let bubble = parse_atom_line(1, &line).unwrap();
        assert!((bubble.radius - 123.456).abs() < 0.005);
        assert!((bubble.location.x - 12345.6789).abs() < 0.005);
    }

    #[test]
    fn values_too_wide_for_their_columns_are_rejected() {
        let record = PdbRecord {
            location: Point3::new(1.0e9, 0.0, 0.0),
            ..sample_record()
        };
        assert!(matches!(
            format_atom_line(&record),
            Err(PdbError::FieldOverflow { field: "x", width: 8, .. })
        ));

        let bubbles = vec![Bubble::new(Point3::origin(), 1.0e7)];
        let mut out = Vec::new();
        assert!(matches!(
            PdbFile::write_bubbles_to(&bubbles, &mut out),
            Err(PdbError::FieldOverflow { field: "radius", .. })
        ));
    }

    #[test]
    fn reads_bubbles_and_keeps_header_lines() {
        let text = "\
REMARK   1 test foam
ATOM      1  C   FOA A   1       0.000   1.000   2.000  1.00 1.500      FOAM C
HETATM    2  O   FOA B   7      -1.500   0.250   3.000  1.00 0.750      FOAM O
END
ATOM      3  C   FOA A   1       9.000   9.000   9.000  1.00 1.500      FOAM C
";
        let (bubbles, metadata) = PdbFile::read_from(&mut Cursor::new(text)).unwrap();

        assert_eq!(metadata.header_lines, vec!["REMARK   1 test foam".to_string()]);
        assert_eq!(bubbles.len(), 2);
        assert_eq!(bubbles[0].location, Point3::new(0.0, 1.0, 2.0));
        assert_eq!(bubbles[0].radius, 1.5);
        assert_eq!(bubbles[1].label.chain_id, 'B');
        assert_eq!(bubbles[1].label.residue_seq, 7);
        assert_eq!(bubbles[1].label.element, "O");
        assert_eq!(bubbles[1].radius, 0.75);
    }

    #[test]
    fn missing_radius_falls_back_to_the_element_table() {
        let text = "ATOM      1  O   FOA A   1       0.000   0.000   0.000  1.00  0.00      FOAM O\n";
        let (bubbles, _) = PdbFile::read_from(&mut Cursor::new(text)).unwrap();
        assert_eq!(bubbles[0].radius, 1.50);
    }

    #[test]
    fn parse_errors_report_line_numbers() {
        let text = "REMARK\nATOM      1  C   FOA A   1       abc     1.000   2.000  1.00 1.500\n";
        let err = PdbFile::read_from(&mut Cursor::new(text)).unwrap_err();
        match err {
            PdbError::Parse { line, kind } => {
                assert_eq!(line, 2);
                assert!(matches!(kind, PdbParseErrorKind::InvalidFloat { .. }));
            }
            other => panic!("unexpected error: {other}"),
        }

        let short = "ATOM      1  C   FOA A   1\n";
        assert!(matches!(
            PdbFile::read_from(&mut Cursor::new(short)),
            Err(PdbError::Parse {
                kind: PdbParseErrorKind::LineTooShort,
                ..
            })
        ));
    }

    #[test]
    fn file_without_atoms_is_rejected() {
        let text = "REMARK nothing here\nEND\n";
        assert!(matches!(
            PdbFile::read_from(&mut Cursor::new(text)),
            Err(PdbError::MissingRecord(_))
        ));
    }

    #[test]
    fn unlabelled_bubbles_are_named_after_the_nearest_element() {
        let bubbles = vec![Bubble::new(Point3::new(1.0, 2.0, 3.0), 1.31)];
        let mut out = Vec::new();
        PdbFile::write_bubbles_to(&bubbles, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();

        let lines: Vec<&str> = text.lines().collect();
        assert!(lines[0].starts_with("REMARK"));
        assert!(lines[1].starts_with("ATOM      1  H   FOA A   0"));
        assert_eq!(&lines[1][76..78], " H");
        assert_eq!(lines.last(), Some(&"END"));
    }

    #[test]
    fn written_file_reads_back_through_the_path_helpers() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("foam.pdb");
        let bubbles = vec![
            Bubble::new(Point3::new(0.5, -1.25, 3.0), 0.8).with_label(BubbleLabel::new("BUB", 1)),
            Bubble::new(Point3::new(4.0, 4.0, 4.0), 1.2).with_label(BubbleLabel::new("BUB", 2)),
        ];
        PdbFile::write_bubbles_to_path(&bubbles, &path).unwrap();

        let (read, metadata) = PdbFile::read_from_path(&path).unwrap();
        assert_eq!(metadata.header_lines.len(), 1);
        assert_eq!(read.len(), 2);
        for (a, b) in bubbles.iter().zip(&read) {
            assert!((a.location - b.location).norm() < 1e-3);
            assert!((a.radius - b.radius).abs() < 1e-3);
            assert_eq!(a.label.name, b.label.name);
            assert_eq!(a.label.residue_seq, b.label.residue_seq);
        }
    }
}
