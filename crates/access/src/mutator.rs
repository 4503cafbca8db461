use std::{fs, io, path::Path};

use log::{error, info};
use pdfshelf_fs::{MediaIndex, PDF_EXTENSION, PdfRecord, is_pdf_path};

use crate::{
    error::{MutationError, MutationResult},
    regime::{PermissionRegime, RegimeProbe},
    strategy::{CopyFn, DirectAccess, IndexedAccess, LegacyAccess, StorageAccess, copy_all},
};

/// Longest file name most filesystems accept, in bytes.
const MAX_NAME_BYTES: usize = 255;

/// Renames and deletes PDFs, picking the strategy that the current
/// permission regime allows.
///
/// | regime  | rename                         | delete              |
/// |---------|--------------------------------|---------------------|
/// | full    | direct rename                  | direct delete       |
/// | indexed | index display name, then file  | remove index entry  |
/// | legacy  | copy, verify length, delete    | direct delete       |
pub struct FileMutator {
    probe: Box<dyn RegimeProbe>,
    index: Option<Box<dyn MediaIndex>>,
    copy: CopyFn,
}

impl FileMutator {
    pub fn new(probe: impl RegimeProbe + 'static) -> Self {
        Self {
            probe: Box::new(probe),
            index: None,
            copy: copy_all,
        }
    }

    pub fn with_index(mut self, index: impl MediaIndex + 'static) -> Self {
        self.index = Some(Box::new(index));
        self
    }

    /// Replace the byte copy used by legacy renames.
    pub fn with_copy(mut self, copy: CopyFn) -> Self {
        self.copy = copy;
        self
    }

    pub fn regime(&self) -> PermissionRegime {
        self.probe.current()
    }

    pub fn index(&self) -> Option<&dyn MediaIndex> {
        self.index.as_deref()
    }

    fn access(&mut self, regime: PermissionRegime) -> MutationResult<Box<dyn StorageAccess + '_>> {
        Ok(match regime {
            PermissionRegime::FullAccess => Box::new(DirectAccess),
            PermissionRegime::IndexedOnly => {
                let index = self
                    .index
                    .as_deref_mut()
                    .ok_or(MutationError::IndexUnavailable)?;
                Box::new(IndexedAccess::new(index))
            }
            PermissionRegime::Legacy => Box::new(LegacyAccess::new(self.copy)),
        })
    }

    /// Rename `record` to `new_name` in the same directory and return a
    /// record for the renamed file. `.pdf` is appended when missing.
    ///
    /// Nothing is touched when the name is invalid or a file with the new
    /// name already exists.
    pub fn rename(&mut self, record: &PdfRecord, new_name: &str) -> MutationResult<PdfRecord> {
        let file_name = normalize_new_name(record, new_name)?;
        let src = record.path.as_path();

        if !exists(src) {
            return Err(MutationError::NotFound {
                path: src.to_path_buf(),
            });
        }

        let dst = src.with_file_name(&file_name);
        if exists(&dst) {
            return Err(MutationError::NameCollision { path: dst });
        }

        let regime = self.probe.current();
        let outcome = self.access(regime)?.rename(src, &dst);

        match outcome {
            Ok(()) => {
                info!(
                    "[mutator] renamed {} -> {} ({regime})",
                    src.display(),
                    dst.display()
                );
                PdfRecord::from_path(&dst).map_err(|e| MutationError::io("read", &dst, e))
            }
            Err(e) => {
                error!("[mutator] rename of {} failed ({regime}): {e}", src.display());
                Err(e)
            }
        }
    }

    pub fn delete(&mut self, record: &PdfRecord) -> MutationResult<()> {
        let path = record.path.as_path();
        if !exists(path) {
            return Err(MutationError::NotFound {
                path: path.to_path_buf(),
            });
        }

        let regime = self.probe.current();
        let outcome = self.access(regime)?.delete(path);

        match &outcome {
            Ok(()) => info!("[mutator] deleted {} ({regime})", path.display()),
            Err(e) => error!("[mutator] delete of {} failed ({regime}): {e}", path.display()),
        }

        outcome
    }
}

/// Turn user input into the final file name: trimmed, checked, and with a
/// `.pdf` extension.
pub fn normalize_new_name(record: &PdfRecord, new_name: &str) -> MutationResult<String> {
    let trimmed = new_name.trim();

    if trimmed.is_empty() {
        return Err(MutationError::InvalidName {
            reason: "name is empty",
        });
    }
    if trimmed.contains(['/', '\\', '\0']) {
        return Err(MutationError::InvalidName {
            reason: "name contains a path separator",
        });
    }
    if trimmed == "." || trimmed == ".." {
        return Err(MutationError::InvalidName {
            reason: "name is reserved",
        });
    }

    let suffix = format!(".{PDF_EXTENSION}");
    let has_suffix = trimmed.len() >= suffix.len()
        && trimmed.is_char_boundary(trimmed.len() - suffix.len())
        && trimmed[trimmed.len() - suffix.len()..].eq_ignore_ascii_case(&suffix);

    let file_name = if has_suffix {
        trimmed.to_owned()
    } else {
        format!("{trimmed}{suffix}")
    };

    if file_name.len() > MAX_NAME_BYTES {
        return Err(MutationError::InvalidName {
            reason: "name is too long",
        });
    }
    // "foo" for "foo.PDF" asks for the name the file already has.
    let same_stem = !has_suffix
        && is_pdf_path(Path::new(&record.name))
        && trimmed == record.name_without_extension();
    if file_name == record.name || same_stem {
        return Err(MutationError::Unchanged);
    }

    Ok(file_name)
}

/// Existence without following a dangling symlink into "missing".
fn exists(path: &Path) -> bool {
    match fs::symlink_metadata(path) {
        Ok(_) => true,
        Err(e) => e.kind() != io::ErrorKind::NotFound,
    }
}

#[cfg(test)]
#[path = "mutator_tests.rs"]
mod tests;
