use std::{
    fs::{self, File, Metadata},
    io,
    path::{Path, PathBuf},
    time::{SystemTime, UNIX_EPOCH},
};

use chrono::{Local, TimeZone};
use serde::Serialize;

use crate::config::PDF_EXTENSION;

const KB: f64 = 1024.0;
const MB: f64 = KB * 1024.0;
const GB: f64 = MB * 1024.0;

/// Snapshot of a PDF file taken when it was found.
///
/// The path was a readable regular file at construction time; nothing is
/// guaranteed afterwards. A rename produces a new record rather than
/// mutating this one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PdfRecord {
    pub path: PathBuf,
    /// Display name, the final path component
    pub name: String,
    /// Size in bytes
    pub size: u64,
    /// Last modified time in milliseconds since the epoch, 0 if unknown
    pub modified_ms: u64,
}

impl PdfRecord {
    /// Build a record for `path`, failing unless it is a readable regular file.
    pub fn from_path(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref();
        let metadata = fs::metadata(path)?;
        if !metadata.is_file() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("{} is not a regular file", path.display()),
            ));
        }
        check_readable(path)?;

        Self::from_metadata(path.to_path_buf(), &metadata)
    }

    /// Build a record from metadata the caller already holds. Readability is
    /// the caller's responsibility.
    pub(crate) fn from_metadata(path: PathBuf, metadata: &Metadata) -> io::Result<Self> {
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .map(str::to_owned)
            .ok_or_else(|| {
                io::Error::new(
                    io::ErrorKind::InvalidData,
                    format!("{} has no UTF-8 file name", path.display()),
                )
            })?;

        Ok(Self {
            path,
            name,
            size: metadata.len(),
            modified_ms: to_unix_millis(metadata.modified().ok()),
        })
    }

    pub fn formatted_size(&self) -> String {
        let size = self.size as f64;
        if size >= GB {
            format!("{:.1} GB", size / GB)
        } else if size >= MB {
            format!("{:.1} MB", size / MB)
        } else if size >= KB {
            format!("{:.1} KB", size / KB)
        } else {
            format!("{} B", self.size)
        }
    }

    /// Modification time in local time as `dd/MM/yyyy HH:mm`.
    pub fn formatted_date(&self) -> String {
        let millis = i64::try_from(self.modified_ms).unwrap_or(i64::MAX);
        match Local.timestamp_millis_opt(millis).single() {
            Some(dt) => dt.format("%d/%m/%Y %H:%M").to_string(),
            None => String::from("-"),
        }
    }

    pub fn name_without_extension(&self) -> &str {
        match self.name.rfind('.') {
            Some(idx) => &self.name[..idx],
            None => &self.name,
        }
    }

    /// Whether the file still exists and is readable right now.
    pub fn is_valid(&self) -> bool {
        fs::metadata(&self.path).is_ok_and(|m| m.is_file()) && check_readable(&self.path).is_ok()
    }
}

/// Case-insensitive `.pdf` extension check.
pub fn is_pdf_path(path: &Path) -> bool {
    path.extension()
        .and_then(|os| os.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case(PDF_EXTENSION))
}

/// `path` with symlinks, `.` and `..` resolved, for comparing paths that
/// came from different places. Paths that cannot be resolved are returned
/// as given.
pub fn canonical_path(path: &Path) -> PathBuf {
    fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}

pub(crate) fn check_readable(path: &Path) -> io::Result<()> {
    File::open(path).map(drop)
}

pub(crate) fn to_unix_millis(t: Option<SystemTime>) -> u64 {
    t.and_then(|tt| tt.duration_since(UNIX_EPOCH).ok())
        .map(|d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
        .unwrap_or(0)
}

#[cfg(test)]
#[path = "record_tests.rs"]
mod tests;
