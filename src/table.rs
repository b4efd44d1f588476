use std::fs::{self, File, OpenOptions};
use std::io::{self, ErrorKind, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use csv::{ReaderBuilder, Terminator, WriterBuilder};

use crate::error::ExtractError;
use crate::formatter::NormalizedRecord;
use crate::types::StoredRow;

/// Column header written at the top of every table.
pub const HEADER: [&str; 4] = ["S.No.", "name", "founding_date", "founders"];

/// Handle to one append-only CSV table.
///
/// The handle holds no cached state: every [`append`](Self::append) counts
/// the rows already on disk and numbers the new row `count + 1`. A single
/// writer per file is assumed.
#[derive(Debug, Clone)]
pub struct CompanyTable {
    path: PathBuf,
}

impl CompanyTable {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of data rows currently stored. A missing file holds zero rows.
    pub fn row_count(&self) -> Result<u64, ExtractError> {
        if self.is_empty_on_disk()? {
            return Ok(0);
        }
        let mut reader = ReaderBuilder::new().has_headers(true).from_path(&self.path)?;
        let mut count = 0;
        for record in reader.byte_records() {
            record?;
            count += 1;
        }
        Ok(count)
    }

    /// All stored rows in append order.
    pub fn rows(&self) -> Result<Vec<StoredRow>, ExtractError> {
        if self.is_empty_on_disk()? {
            return Ok(Vec::new());
        }
        let mut reader = ReaderBuilder::new().has_headers(true).from_path(&self.path)?;
        reader
            .deserialize()
            .map(|row| row.map_err(ExtractError::from))
            .collect()
    }

    /// Numbers `record` and appends it as one complete line.
    ///
    /// The row is serialized in memory and written with a single call; if
    /// that write fails the file is truncated back to its previous length.
    /// A file whose last line lacks its newline gets one first.
    pub fn append(&self, record: &NormalizedRecord) -> Result<StoredRow, ExtractError> {
        let needs_header = self.is_empty_on_disk()?;
        let serial_number = self.row_count()? + 1;

        let row = StoredRow {
            serial_number,
            name:          record.name.clone(),
            founding_date: record.founding_date.to_string(),
            founders:      record.founders.clone(),
        };

        let mut writer = WriterBuilder::new()
            .has_headers(false)
            .terminator(Terminator::Any(b'\n'))
            .from_writer(Vec::new());
        if needs_header {
            writer.write_record(HEADER)?;
        }
        writer.serialize(&row)?;
        let bytes = writer.into_inner().map_err(|e| ExtractError::Io(e.into_error()))?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let mut file = OpenOptions::new().create(true).read(true).append(true).open(&self.path)?;
        let prior_len = file.metadata()?.len();

        let mut line = Vec::with_capacity(bytes.len() + 1);
        if prior_len > 0 && !ends_with_newline(&mut file)? {
            line.push(b'\n');
        }
        line.extend_from_slice(&bytes);

        if let Err(e) = write_or_rollback(&mut file, prior_len, &line) {
            tracing::error!(path = %self.path.display(), error = %e, "append failed, rolled back");
            return Err(e.into());
        }

        tracing::debug!(
            path   = %self.path.display(),
            serial = row.serial_number,
            name   = %row.name,
            "row appended"
        );
        Ok(row)
    }

    fn is_empty_on_disk(&self) -> Result<bool, ExtractError> {
        match fs::metadata(&self.path) {
            Ok(meta) => Ok(meta.len() == 0),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(true),
            Err(e) => Err(e.into()),
        }
    }
}

fn ends_with_newline(file: &mut File) -> io::Result<bool> {
    let mut last = [0u8; 1];
    file.seek(SeekFrom::End(-1))?;
    file.read_exact(&mut last)?;
    Ok(last[0] == b'\n')
}

/// A byte sink that can be cut back to an earlier length.
trait Truncate: Write {
    fn truncate_to(&mut self, len: u64) -> io::Result<()>;
}

impl Truncate for File {
    fn truncate_to(&mut self, len: u64) -> io::Result<()> {
        self.set_len(len)
    }
}

/// Writes `bytes` in full or, on failure, restores the sink to `prior_len`.
fn write_or_rollback<W: Truncate>(sink: &mut W, prior_len: u64, bytes: &[u8]) -> io::Result<()> {
    match sink.write_all(bytes).and_then(|_| sink.flush()) {
        Ok(()) => Ok(()),
        Err(e) => {
            sink.truncate_to(prior_len)?;
            Err(e)
        }
    }
}
