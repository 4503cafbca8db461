pub mod browse;
pub mod delete;
pub mod index;
pub mod info;
pub mod list;
pub mod rename;

use std::{
    fs, io,
    path::{Path, PathBuf},
    process::ExitCode,
};

use anyhow::Context;
use clap::{Args, Subcommand};
use log::debug;
use pdfshelf_access::{
    EnvRegimeProbe, FileMutator, FixedRegime, MutationError, PermissionRegime, RegimeProbe,
};
use pdfshelf_engine::{Library, Shelf, ShelfError};
use pdfshelf_fs::{JsonMediaIndex, MediaIndex, PdfRecord, ScanExcludes, ScanRequest, is_pdf_path};
use pdfshelf_runtime::{default_scan_roots, media_index_path, storage_root};

pub use browse::BrowseArgs;
pub use delete::DeleteArgs;
pub use index::IndexArgs;
pub use info::InfoArgs;
pub use list::ListArgs;
pub use rename::RenameArgs;

/// Common error type for command handlers
pub type CommandResult<T> = anyhow::Result<T>;

pub const EXIT_USER_ERROR: u8 = 1;
pub const EXIT_UNEXPECTED: u8 = 2;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Scan shared storage and list every PDF found.
    ///
    /// Example:
    ///   pdfshelf list --sort time-desc
    ///   pdfshelf list --root ~/Documents --query invoice --json
    List(ListArgs),

    /// Show name, size, date and location of one PDF.
    Info(InfoArgs),

    /// Rename a PDF in place. `.pdf` is appended when missing.
    ///
    /// Example:
    ///   pdfshelf rename ~/Download/scan0001.pdf "Lease agreement"
    Rename(RenameArgs),

    /// Delete a PDF.
    Delete(DeleteArgs),

    /// Interactive session over the scanned list, read from stdin.
    Browse(BrowseArgs),

    /// Inspect or populate the media index used for indexed access.
    Index(IndexArgs),
}

/// Where to look for PDFs.
#[derive(Debug, Args, Default)]
pub struct ScanOptions {
    /// Directory to scan; repeatable. Defaults to the storage root and its
    /// usual document folders.
    #[arg(long = "root", value_name = "DIR")]
    pub roots: Vec<PathBuf>,
}

impl ScanOptions {
    pub fn roots(&self) -> Vec<PathBuf> {
        if self.roots.is_empty() {
            default_scan_roots(&storage_root())
        } else {
            self.roots.clone()
        }
    }

    /// Build a scan over the configured roots. Indexed entries are merged in
    /// whenever direct access is not available, so files only reachable
    /// through the index still show up.
    pub fn request(&self, regime: PermissionRegime, index: Option<&dyn MediaIndex>) -> ScanRequest {
        let request = ScanRequest::new(self.roots()).with_excludes(ScanExcludes::platform());
        match index {
            Some(index) if regime != PermissionRegime::FullAccess => {
                debug!("[scan] merging media index ({regime})");
                request.with_index(index)
            }
            _ => request,
        }
    }
}

/// How mutations reach storage.
#[derive(Debug, Args, Default)]
pub struct AccessOptions {
    /// Permission regime to act under: full, indexed or legacy. Overrides
    /// PDFSHELF_ACCESS, which is otherwise re-read before every change.
    #[arg(long, value_name = "REGIME")]
    pub access: Option<PermissionRegime>,
}

impl AccessOptions {
    pub fn probe(&self) -> Box<dyn RegimeProbe> {
        match self.access {
            Some(regime) => Box::new(FixedRegime(regime)),
            None => Box::new(EnvRegimeProbe),
        }
    }

    /// A mutator wired to the configured media index, if there is one.
    pub fn build_mutator(&self) -> CommandResult<FileMutator> {
        let mutator = FileMutator::new(self.probe());
        Ok(match open_media_index()? {
            Some(index) => mutator.with_index(index),
            None => mutator,
        })
    }
}

/// Snapshot a file named on the command line. The record carries the
/// canonical path, so it matches what scans and the media index hold.
pub fn load_record(path: &Path) -> Result<PdfRecord, ShelfError> {
    if !is_pdf_path(path) {
        return Err(MutationError::InvalidName {
            reason: "not a .pdf file",
        }
        .into());
    }

    let read_error = |source: io::Error| -> ShelfError {
        let path = path.to_path_buf();
        let err = match source.kind() {
            io::ErrorKind::NotFound => MutationError::NotFound { path },
            _ => MutationError::Io {
                op: "read",
                path,
                source,
            },
        };
        err.into()
    };

    let resolved = fs::canonicalize(path).map_err(read_error)?;
    PdfRecord::from_path(&resolved).map_err(read_error)
}

/// A shelf holding just `record`, for one-off changes from the command line.
pub fn single_record_shelf(record: PdfRecord, access: &AccessOptions) -> CommandResult<Shelf> {
    let mut library = Library::default();
    library.replace_all(vec![record]);
    Ok(Shelf::new(library, access.build_mutator()?))
}

/// Open the media index at its configured location. `None` when no
/// location can be determined.
pub fn open_media_index() -> CommandResult<Option<JsonMediaIndex>> {
    let Some(path) = media_index_path() else {
        debug!("[index] no media index location available");
        return Ok(None);
    };

    let index = JsonMediaIndex::open(&path)
        .with_context(|| format!("failed to open media index at {}", path.display()))?;
    Ok(Some(index))
}

/// Print a failed change as one line and pick the exit code for it.
pub fn report_shelf_error(err: &ShelfError) -> ExitCode {
    eprintln!("{err}");
    if err.is_user_error() {
        ExitCode::from(EXIT_USER_ERROR)
    } else {
        ExitCode::from(EXIT_UNEXPECTED)
    }
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
