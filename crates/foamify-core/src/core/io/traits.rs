use crate::core::models::bubble::Bubble;
use std::error::Error;
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::Path;

/// Defines the interface for reading and writing bubble file formats.
///
/// Implementors handle format-specific parsing and serialization; the path helpers take care
/// of opening and buffering files.
pub trait BubbleFile {
    /// Format-specific data that is not part of the bubbles themselves (headers, remarks).
    type Metadata: Default;

    /// The error type for I/O operations.
    type Error: Error + From<io::Error>;

    /// Reads bubbles and metadata from a buffered reader.
    ///
    /// # Errors
    ///
    /// Returns an error if parsing fails or I/O operations encounter issues.
    fn read_from(reader: &mut impl BufRead) -> Result<(Vec<Bubble>, Self::Metadata), Self::Error>;

    /// Writes bubbles and metadata to a writer.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    fn write_to(
        bubbles: &[Bubble],
        metadata: &Self::Metadata,
        writer: &mut impl Write,
    ) -> Result<(), Self::Error>;

    /// Writes bubbles with default metadata.
    fn write_bubbles_to(bubbles: &[Bubble], writer: &mut impl Write) -> Result<(), Self::Error> {
        Self::write_to(bubbles, &Self::Metadata::default(), writer)
    }

    /// Reads bubbles and metadata from a file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or parsing fails.
    fn read_from_path<P: AsRef<Path>>(
        path: P,
    ) -> Result<(Vec<Bubble>, Self::Metadata), Self::Error> {
        let file = File::open(path)?;
        let mut reader = BufReader::new(file);
        Self::read_from(&mut reader)
    }

    /// Writes bubbles and metadata to a file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be created or writing fails.
    fn write_to_path<P: AsRef<Path>>(
        bubbles: &[Bubble],
        metadata: &Self::Metadata,
        path: P,
    ) -> Result<(), Self::Error> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        Self::write_to(bubbles, metadata, &mut writer)?;
        writer.flush()?;
        Ok(())
    }

    /// Writes bubbles with default metadata to a file path.
    fn write_bubbles_to_path<P: AsRef<Path>>(
        bubbles: &[Bubble],
        path: P,
    ) -> Result<(), Self::Error> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        Self::write_bubbles_to(bubbles, &mut writer)?;
        writer.flush()?;
        Ok(())
    }
}
