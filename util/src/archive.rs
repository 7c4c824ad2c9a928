//! Struct archiving functionality
//!
//! Records are written as csv rows with a header taken from the first
//! record's field names.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External imports
use csv::WriterBuilder;
pub use csv::Writer;
use serde::Serialize;
use std::fs::{File, OpenOptions};
use std::path::Path;
use thiserror::Error;

// Internal imports
use crate::session::Session;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// An object used to write CSV archive files.
#[derive(Default)]
pub struct Archiver {
    writer: Option<Writer<File>>
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Errors which can occur while archiving.
#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("Cannot open the archive file: {0}")]
    FileOpenError(std::io::Error),

    #[error("Cannot write the archive record: {0}")]
    WriteError(csv::Error),

    #[error("Cannot flush the archive file: {0}")]
    FlushError(std::io::Error),

    #[error("The archiver has not been initialised")]
    NotInitialised,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Archiver {
    /// Create a new archiver from a paricular path relative to the session's
    /// archive root.
    pub fn from_path<P: AsRef<Path>>(
        session: &Session, path: P
    ) -> Result<Self, ArchiveError> {
        let mut session_path = session.arch_root.clone();
        session_path.push(path);

        Self::from_file_path(session_path)
    }

    /// Create a new archiver writing to the given file, truncating it if it
    /// already exists.
    pub fn from_file_path<P: AsRef<Path>>(path: P) -> Result<Self, ArchiveError> {
        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)
            .map_err(ArchiveError::FileOpenError)?;

        let w = WriterBuilder::new()
            .has_headers(true)
            .from_writer(file);

        Ok(Self {
            writer: Some(w)
        })
    }

    /// Serialise a record into the archive.
    ///
    /// Records must be flat structs, csv can't write nested sequences under a
    /// header row.
    pub fn serialise<T: Serialize>(&mut self, record: T) -> Result<(), ArchiveError> {
        match self.writer {
            Some(ref mut w) => {
                w.serialize(record).map_err(ArchiveError::WriteError)?;
                w.flush().map_err(ArchiveError::FlushError)
            },
            None => Err(ArchiveError::NotInitialised)
        }
    }
}
