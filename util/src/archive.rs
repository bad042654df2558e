//! CSV archiving functionality
//!
//! An `Archiver` writes a stream of serialisable records into a CSV file in
//! the session's archive directory, one row per record.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External imports
use csv::WriterBuilder;
pub use csv::Writer;
use serde::Serialize;
use std::fs::File;
use std::io;
use std::path::Path;
use thiserror::Error;

// Internal imports
use crate::session::Session;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// An object used to write CSV archive files.
pub struct Archiver<W: io::Write = File> {
    writer: Writer<W>,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Errors that can occur while archiving.
#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("Cannot create the archive file: {0}")]
    CreateError(io::Error),

    #[error("Cannot write the archive record: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Cannot flush the archive: {0}")]
    FlushError(io::Error),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Archiver<File> {
    /// Create a new archiver from a paricular path relative to the session's
    /// archive root.
    ///
    /// An existing archive at the same path is truncated.
    pub fn from_path<P: AsRef<Path>>(session: &Session, path: P) -> Result<Self, ArchiveError> {
        let file = File::create(session.arch_root.join(path)).map_err(ArchiveError::CreateError)?;

        Ok(Self::from_writer(file))
    }
}

impl<W: io::Write> Archiver<W> {
    /// Create an archiver writing into any `io::Write` sink.
    pub fn from_writer(sink: W) -> Self {
        Self {
            writer: WriterBuilder::new().has_headers(true).from_writer(sink),
        }
    }

    /// Serialise a record into the archive.
    ///
    /// The header row is taken from the field names of the first record.
    pub fn serialise<T: Serialize>(&mut self, record: &T) -> Result<(), ArchiveError> {
        self.writer.serialize(record)?;
        Ok(())
    }

    /// Flush any buffered records to the underlying sink.
    pub fn flush(&mut self) -> Result<(), ArchiveError> {
        self.writer.flush().map_err(ArchiveError::FlushError)
    }

    /// Flush and return the underlying sink.
    pub fn into_inner(self) -> Result<W, ArchiveError> {
        self.writer
            .into_inner()
            .map_err(|e| ArchiveError::FlushError(io::Error::new(io::ErrorKind::Other, e.to_string())))
    }
}
