//! Archive packaging for multi-file exports.

use snapedit_core::ArchiveError;
use std::io::{Cursor, Write};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Incrementally builds an in-memory archive.
pub trait ArchiveBuilder {
    fn add_entry(&mut self, name: &str, bytes: &[u8]) -> Result<(), ArchiveError>;

    /// Closes the archive and returns its bytes.
    fn finalize(self) -> Result<Vec<u8>, ArchiveError>
    where
        Self: Sized;
}

/// ZIP archive written to memory.
pub struct ZipArchiveBuilder {
    writer: ZipWriter<Cursor<Vec<u8>>>,
    options: SimpleFileOptions,
    entries: usize,
}

impl ZipArchiveBuilder {
    pub fn new() -> Self {
        Self {
            writer: ZipWriter::new(Cursor::new(Vec::new())),
            // PNG payloads are already compressed.
            options: SimpleFileOptions::default().compression_method(CompressionMethod::Stored),
            entries: 0,
        }
    }

    pub fn deflated() -> Self {
        Self {
            options: SimpleFileOptions::default().compression_method(CompressionMethod::Deflated),
            ..Self::new()
        }
    }

    pub fn entry_count(&self) -> usize {
        self.entries
    }
}

impl Default for ZipArchiveBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ArchiveBuilder for ZipArchiveBuilder {
    fn add_entry(&mut self, name: &str, bytes: &[u8]) -> Result<(), ArchiveError> {
        let entry_error = |e: &dyn std::fmt::Display| ArchiveError::Entry {
            name: name.to_string(),
            reason: e.to_string(),
        };
        self.writer
            .start_file(name, self.options)
            .map_err(|e| entry_error(&e))?;
        self.writer.write_all(bytes).map_err(|e| entry_error(&e))?;
        self.entries += 1;
        Ok(())
    }

    fn finalize(self) -> Result<Vec<u8>, ArchiveError> {
        let cursor = self.writer.finish().map_err(|e| ArchiveError::Finalize {
            reason: e.to_string(),
        })?;
        Ok(cursor.into_inner())
    }
}

/// Writes every `(name, bytes)` entry with `builder` and finalizes it.
pub fn build_archive<B, I>(mut builder: B, entries: I) -> Result<Vec<u8>, ArchiveError>
where
    B: ArchiveBuilder,
    I: IntoIterator<Item = (String, Vec<u8>)>,
{
    for (name, bytes) in entries {
        builder.add_entry(&name, &bytes)?;
    }
    builder.finalize()
}
