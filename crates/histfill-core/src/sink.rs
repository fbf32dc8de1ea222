//! CSV output.
//!
//! The file is staged next to its destination and renamed into place, so a
//! reader never observes a half-written file and a failed run leaves any
//! previous file untouched.

use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use thiserror::Error;

use crate::{Bar, ResultTable};

#[derive(Debug, Error)]
pub enum SinkError {
    #[error("cannot stage output in {dir}: {source}")]
    Stage {
        dir: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to encode csv: {0}")]
    Csv(#[from] csv::Error),
    #[error("failed to write output: {0}")]
    Io(#[from] std::io::Error),
    #[error("cannot move output into {path}: {source}")]
    Persist {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Writes a [`ResultTable`] to one CSV file.
///
/// Columns are [`Bar::COLUMNS`]; the header is written even when there are no
/// rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvSink {
    path: PathBuf,
}

impl CsvSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Replaces the destination with the table's rows. Returns the row count.
    pub fn write(&self, table: &ResultTable) -> Result<usize, SinkError> {
        self.write_rows(table.iter())
    }

    pub fn write_rows<'a, I>(&self, rows: I) -> Result<usize, SinkError>
    where
        I: IntoIterator<Item = &'a Bar>,
    {
        let dir = self.staging_dir();
        let mut staged = NamedTempFile::new_in(&dir).map_err(|source| SinkError::Stage {
            dir: dir.clone(),
            source,
        })?;

        let mut written = 0;
        {
            let mut writer = csv::WriterBuilder::new()
                .has_headers(false)
                .from_writer(&mut staged);
            writer.write_record(Bar::COLUMNS)?;
            for bar in rows {
                writer.serialize(bar)?;
                written += 1;
            }
            writer.flush()?;
        }
        staged.as_file().sync_all()?;

        staged
            .persist(&self.path)
            .map_err(|error| SinkError::Persist {
                path: self.path.clone(),
                source: error.error,
            })?;

        tracing::info!(rows = written, path = %self.path.display(), "wrote csv");
        Ok(written)
    }

    fn staging_dir(&self) -> PathBuf {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        }
    }
}

/// Reads a file previously produced by [`CsvSink`].
pub fn read_csv(path: impl AsRef<Path>) -> Result<Vec<Bar>, SinkError> {
    let mut reader = csv::Reader::from_path(path)?;
    let mut bars = Vec::new();
    for row in reader.deserialize::<Bar>() {
        bars.push(row?);
    }
    Ok(bars)
}
