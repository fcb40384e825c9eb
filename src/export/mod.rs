//! Writing raw and GLM data to disk.
//!
//! Every output goes through a temporary file created next to its destination
//! and is renamed into place only once it is complete. On failure the temporary
//! file is dropped and removed, so a partially written archive never appears
//! under its final name.

use crate::error::{GlmMetError, Result};
use crate::types::glm_table::{GlmTable, ModelTables};
use crate::types::raw_met::RawMet;
use log::{debug, info};
use polars::prelude::{CsvWriter, DataFrame, SerWriter};
use serde::Serialize;
use std::fmt;
use std::fs;
use std::io::Write;
use std::path::{Component, Path, PathBuf};
use tempfile::NamedTempFile;
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

pub const RAW_ARCHIVE: &str = "met_raw.zip";
pub const RAW_CSV: &str = "met_raw.csv";
pub const RAW_METADATA: &str = "met_raw_metadata.json";
pub const GLM_ARCHIVE: &str = "met_glm.zip";
pub const GLM_CSV: &str = "met.csv";
pub const GLM_METADATA: &str = "met_glm_metadata.json";

/// Compression used for entries of the zip archives.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ArchiveCompression {
    #[default]
    Deflated,
    Stored,
}

impl ArchiveCompression {
    fn method(self) -> CompressionMethod {
        match self {
            ArchiveCompression::Deflated => CompressionMethod::Deflated,
            ArchiveCompression::Stored => CompressionMethod::Stored,
        }
    }
}

/// How GLM output is laid out on disk.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum GlmOutput {
    /// `met_glm.zip` holding the CSV(s) and, for single-table providers, the
    /// metadata JSON.
    #[default]
    Archive,
    /// A bare CSV with the given file name, no metadata.
    Csv(String),
}

impl fmt::Display for GlmOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GlmOutput::Archive => write!(f, "archive '{GLM_ARCHIVE}'"),
            GlmOutput::Csv(name) => write!(f, "single csv '{name}'"),
        }
    }
}

/// A named in-memory file waiting to be written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedBuffer {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl NamedBuffer {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            bytes,
        }
    }
}

/// Encodes a frame as CSV with a header row and no index.
pub fn frame_to_csv(frame: &DataFrame) -> Result<Vec<u8>> {
    let mut frame = frame.clone();
    let mut buffer = Vec::new();
    CsvWriter::new(&mut buffer)
        .include_header(true)
        .finish(&mut frame)?;
    Ok(buffer)
}

pub fn to_json_bytes<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>> {
    Ok(serde_json::to_vec_pretty(value)?)
}

/// Bundles `entries` into `dir/archive_name`, replacing an existing archive.
pub fn write_bundle(
    dir: &Path,
    archive_name: &str,
    entries: &[NamedBuffer],
    compression: ArchiveCompression,
) -> Result<PathBuf> {
    let target = dir.join(archive_name);
    let mut temp = scoped_temp_file(dir)?;
    {
        let options = FileOptions::default().compression_method(compression.method());
        let mut zip = ZipWriter::new(temp.as_file_mut());
        for entry in entries {
            debug!(
                "Adding {} ({} bytes) to {}",
                entry.name,
                entry.bytes.len(),
                archive_name
            );
            zip.start_file(entry.name.as_str(), options)
                .map_err(|e| GlmMetError::Archive(target.clone(), e))?;
            zip.write_all(&entry.bytes)
                .map_err(|e| GlmMetError::Io(target.clone(), e))?;
        }
        zip.finish()
            .map_err(|e| GlmMetError::Archive(target.clone(), e))?;
    }
    persist(temp, &target)?;
    info!("Wrote {} entries to {:?}", entries.len(), target);
    Ok(target)
}

/// Writes one buffer as `dir/<buffer.name>`. The name must be a plain file
/// name; separators and `..` are rejected.
pub fn write_file(dir: &Path, buffer: &NamedBuffer) -> Result<PathBuf> {
    let target = dir.join(plain_file_name(&buffer.name)?);
    let mut temp = scoped_temp_file(dir)?;
    temp.write_all(&buffer.bytes)
        .map_err(|e| GlmMetError::Io(target.clone(), e))?;
    persist(temp, &target)?;
    info!("Wrote {:?}", target);
    Ok(target)
}

/// `met_raw.zip` with the raw series as CSV and the metadata as JSON.
pub(crate) fn write_raw(
    dir: &Path,
    raw: &RawMet,
    compression: ArchiveCompression,
) -> Result<PathBuf> {
    let entries = [
        NamedBuffer::new(RAW_CSV, frame_to_csv(raw.data())?),
        NamedBuffer::new(RAW_METADATA, to_json_bytes(raw.metadata())?),
    ];
    write_bundle(dir, RAW_ARCHIVE, &entries, compression)
}

/// A single GLM table, either bundled with its metadata or as a bare CSV.
pub(crate) fn write_glm_table<M: Serialize + ?Sized>(
    dir: &Path,
    table: &GlmTable,
    metadata: &M,
    output: &GlmOutput,
    compression: ArchiveCompression,
) -> Result<PathBuf> {
    let csv = frame_to_csv(table.frame())?;
    match output {
        GlmOutput::Archive => {
            let entries = [
                NamedBuffer::new(GLM_CSV, csv),
                NamedBuffer::new(GLM_METADATA, to_json_bytes(metadata)?),
            ];
            write_bundle(dir, GLM_ARCHIVE, &entries, compression)
        }
        GlmOutput::Csv(file_name) => write_file(dir, &NamedBuffer::new(file_name.as_str(), csv)),
    }
}

/// One `met_<model>.csv` per model, bundled into `met_glm.zip`.
pub(crate) fn write_model_tables(
    dir: &Path,
    tables: &ModelTables,
    compression: ArchiveCompression,
) -> Result<PathBuf> {
    let entries = tables
        .iter()
        .map(|(model, table)| {
            Ok(NamedBuffer::new(
                model_csv_name(model),
                frame_to_csv(table.frame())?,
            ))
        })
        .collect::<Result<Vec<_>>>()?;
    write_bundle(dir, GLM_ARCHIVE, &entries, compression)
}

pub fn model_csv_name(model: &str) -> String {
    format!("met_{model}.csv")
}

fn plain_file_name(name: &str) -> Result<&str> {
    let mut components = Path::new(name).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) => Ok(name),
        _ => Err(GlmMetError::InvalidOutputName(name.to_string())),
    }
}

fn scoped_temp_file(dir: &Path) -> Result<NamedTempFile> {
    fs::create_dir_all(dir).map_err(|e| GlmMetError::Io(dir.to_path_buf(), e))?;
    NamedTempFile::new_in(dir).map_err(|e| GlmMetError::Io(dir.to_path_buf(), e))
}

fn persist(temp: NamedTempFile, target: &Path) -> Result<()> {
    temp.persist(target)
        .map_err(|e| GlmMetError::Io(target.to_path_buf(), e.error))?;
    Ok(())
}
