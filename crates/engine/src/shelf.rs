use std::path::{Path, PathBuf};

use log::debug;
use pdfshelf_access::{FileMutator, MutationError};
use pdfshelf_fs::PdfRecord;
use thiserror::Error;

use crate::library::Library;

#[derive(Debug, Error)]
pub enum ShelfError {
    #[error("{} is not in the list", path.display())]
    UnknownRecord { path: PathBuf },

    #[error(transparent)]
    Mutation(#[from] MutationError),
}

impl ShelfError {
    /// Failures caused by what the user asked for rather than by the
    /// system.
    pub fn is_user_error(&self) -> bool {
        match self {
            ShelfError::UnknownRecord { .. } => true,
            ShelfError::Mutation(e) => e.is_user_error(),
        }
    }
}

pub type ShelfResult<T> = Result<T, ShelfError>;

/// The list of PDFs a user is looking at, plus the means to change the
/// files behind it. Mutations only touch the list once the filesystem
/// change has succeeded.
pub struct Shelf {
    library: Library,
    mutator: FileMutator,
}

impl Shelf {
    pub fn new(library: Library, mutator: FileMutator) -> Self {
        Self { library, mutator }
    }

    pub fn library(&self) -> &Library {
        &self.library
    }

    pub fn library_mut(&mut self) -> &mut Library {
        &mut self.library
    }

    pub fn mutator(&self) -> &FileMutator {
        &self.mutator
    }

    /// Swap in a fresh scan result, keeping sort order and filter.
    pub fn replace_records(&mut self, records: Vec<PdfRecord>) {
        self.library.replace_all(records);
    }

    fn lookup(&self, path: &Path) -> ShelfResult<PdfRecord> {
        self.library
            .get(path)
            .cloned()
            .ok_or_else(|| ShelfError::UnknownRecord {
                path: path.to_path_buf(),
            })
    }

    pub fn rename(&mut self, path: &Path, new_name: &str) -> ShelfResult<PdfRecord> {
        let record = self.lookup(path)?;
        let renamed = self.mutator.rename(&record, new_name)?;

        self.library.replace(path, renamed.clone());
        debug!(
            "[shelf] {} now listed as {}",
            path.display(),
            renamed.path.display()
        );
        Ok(renamed)
    }

    pub fn delete(&mut self, path: &Path) -> ShelfResult<PdfRecord> {
        let record = self.lookup(path)?;
        self.mutator.delete(&record)?;

        let removed = self.library.remove(path).unwrap_or(record);
        debug!("[shelf] dropped {} from the list", path.display());
        Ok(removed)
    }
}

#[cfg(test)]
#[path = "shelf_tests.rs"]
mod tests;
