//! Atomic persistence of rendered snapshots.
//!
//! Every snapshot is first written to a hidden temp file in the target
//! directory and then renamed into place, so readers never observe a
//! partially written file under its final name.
//!
//! # File naming
//! `bluescreen--<YYYY-MM-DD--HH-MM-SS>--<report id>.<ext>`

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::Utc;

use crate::errors::{BlueScreenError, BlueScreenResult};
use crate::report::ReportId;

pub const FILE_PREFIX: &str = "bluescreen--";

/// Writes snapshot artifacts into one directory.
#[derive(Debug, Clone)]
pub struct SnapshotWriter {
    directory: PathBuf,
    auto_create: bool,
}

impl SnapshotWriter {
    pub fn new(directory: impl Into<PathBuf>, auto_create: bool) -> Self {
        Self {
            directory: directory.into(),
            auto_create,
        }
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Make sure the directory exists (creating it when allowed) and is a
    /// directory.
    pub fn ensure_directory(&self) -> BlueScreenResult<()> {
        if self.directory.is_dir() {
            return Ok(());
        }
        if self.directory.exists() {
            return Err(BlueScreenError::config(format!(
                "log directory {} is not a directory",
                self.directory.display()
            )));
        }
        if !self.auto_create {
            return Err(BlueScreenError::config(format!(
                "log directory {} does not exist",
                self.directory.display()
            )));
        }
        fs::create_dir_all(&self.directory)
            .map_err(|e| BlueScreenError::log_directory(&self.directory, e))
    }

    /// Final file name for a snapshot.
    pub fn file_name(report_id: &ReportId, extension: &str) -> String {
        format!(
            "{FILE_PREFIX}{}--{report_id}.{extension}",
            Utc::now().format("%Y-%m-%d--%H-%M-%S")
        )
    }

    /// Persist `bytes` and return the final path.
    pub fn write(
        &self,
        report_id: &ReportId,
        extension: &str,
        bytes: &[u8],
    ) -> BlueScreenResult<PathBuf> {
        validate_extension(extension)?;
        self.ensure_directory()?;

        let file_name = Self::file_name(report_id, extension);
        let final_path = self.directory.join(&file_name);
        let temp_path = self.directory.join(format!(".{file_name}.tmp"));

        if let Err(e) = write_new(&temp_path, bytes) {
            let _ = fs::remove_file(&temp_path);
            return Err(BlueScreenError::io("writing snapshot", e));
        }

        if let Err(e) = fs::rename(&temp_path, &final_path) {
            let _ = fs::remove_file(&temp_path);
            return Err(BlueScreenError::io("moving snapshot into place", e));
        }

        Ok(final_path)
    }

    /// Snapshot files currently in the directory, sorted by name.
    pub fn list_snapshots(&self) -> BlueScreenResult<Vec<PathBuf>> {
        if !self.directory.is_dir() {
            return Ok(Vec::new());
        }

        let mut files = Vec::new();
        for entry in
            fs::read_dir(&self.directory).map_err(|e| BlueScreenError::io("reading directory", e))?
        {
            let entry = entry.map_err(|e| BlueScreenError::io("reading directory entry", e))?;
            let path = entry.path();
            let is_snapshot = path
                .file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.starts_with(FILE_PREFIX));
            if is_snapshot && path.is_file() {
                files.push(path);
            }
        }
        files.sort();
        Ok(files)
    }
}

fn write_new(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let mut file = OpenOptions::new().write(true).create_new(true).open(path)?;
    file.write_all(bytes)?;
    file.sync_all()
}

fn validate_extension(extension: &str) -> BlueScreenResult<()> {
    if extension.is_empty() || !extension.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(BlueScreenError::render(format!(
            "renderer extension '{extension}' is not a plain file extension"
        )));
    }
    Ok(())
}
