use std::{
    fs::{self, File, OpenOptions},
    io::{self, Read, Write},
    path::Path,
};

use log::{debug, error, warn};
use pdfshelf_fs::MediaIndex;

use crate::error::{MutationError, MutationResult};

/// Byte copy used by the copy-then-delete rename. Returns bytes written.
pub type CopyFn = fn(&mut dyn Read, &mut dyn Write) -> io::Result<u64>;

pub fn copy_all(reader: &mut dyn Read, writer: &mut dyn Write) -> io::Result<u64> {
    io::copy(reader, writer)
}

/// One way of changing files on shared storage. Callers have already checked
/// that `src` exists and `dst` does not.
pub trait StorageAccess {
    fn rename(&mut self, src: &Path, dst: &Path) -> MutationResult<()>;

    fn delete(&mut self, path: &Path) -> MutationResult<()>;
}

/// Plain filesystem calls.
#[derive(Debug, Default)]
pub struct DirectAccess;

impl StorageAccess for DirectAccess {
    fn rename(&mut self, src: &Path, dst: &Path) -> MutationResult<()> {
        fs::rename(src, dst).map_err(|e| MutationError::io("rename", src, e))
    }

    fn delete(&mut self, path: &Path) -> MutationResult<()> {
        fs::remove_file(path).map_err(|e| MutationError::io("delete", path, e))
    }
}

/// Goes through the media index: rename updates the entry's display name
/// and then renames the file, delete removes the entry.
pub struct IndexedAccess<'a> {
    index: &'a mut dyn MediaIndex,
}

impl<'a> IndexedAccess<'a> {
    pub fn new(index: &'a mut dyn MediaIndex) -> Self {
        Self { index }
    }
}

impl StorageAccess for IndexedAccess<'_> {
    fn rename(&mut self, src: &Path, dst: &Path) -> MutationResult<()> {
        let id = self
            .index
            .find_id(src)
            .ok_or_else(|| MutationError::IndexEntryMissing {
                path: src.to_path_buf(),
            })?;

        let (Some(old_name), Some(new_name)) = (file_name(src), file_name(dst)) else {
            return Err(MutationError::InvalidName {
                reason: "not valid UTF-8",
            });
        };

        if self.index.update_display_name(id, new_name)? == 0 {
            return Err(MutationError::IndexRejected {
                path: src.to_path_buf(),
            });
        }

        // Both the index update and the file rename must succeed.
        if let Err(e) = fs::rename(src, dst) {
            match self.index.update_display_name(id, old_name) {
                Ok(1) => debug!("[indexed] restored index entry {id} to {old_name}"),
                Ok(_) => warn!("[indexed] index entry {id} vanished during rollback"),
                Err(re) => error!("[indexed] failed to restore index entry {id}: {re:#}"),
            }
            return Err(MutationError::io("rename", src, e));
        }

        Ok(())
    }

    fn delete(&mut self, path: &Path) -> MutationResult<()> {
        let id = self
            .index
            .find_id(path)
            .ok_or_else(|| MutationError::IndexEntryMissing {
                path: path.to_path_buf(),
            })?;

        if self.index.delete(id)? == 0 {
            return Err(MutationError::IndexRejected {
                path: path.to_path_buf(),
            });
        }

        Ok(())
    }
}

/// For storage where an in-place rename is not allowed: rename copies the
/// bytes to the new name, checks the copy, then deletes the original.
#[derive(Debug)]
pub struct LegacyAccess {
    copy: CopyFn,
}

impl LegacyAccess {
    pub fn new(copy: CopyFn) -> Self {
        Self { copy }
    }
}

impl Default for LegacyAccess {
    fn default() -> Self {
        Self::new(copy_all)
    }
}

impl StorageAccess for LegacyAccess {
    fn rename(&mut self, src: &Path, dst: &Path) -> MutationResult<()> {
        let mut created = false;
        let result = copy_verified(src, dst, self.copy, &mut created)
            .and_then(|()| fs::remove_file(src).map_err(|e| MutationError::io("delete", src, e)));

        if result.is_err() && created {
            // Whatever made it to the destination is not a valid copy.
            if let Err(e) = fs::remove_file(dst) {
                error!("[legacy] failed to clean up partial copy {:?}: {e}", dst);
            }
        }

        result
    }

    fn delete(&mut self, path: &Path) -> MutationResult<()> {
        fs::remove_file(path).map_err(|e| MutationError::io("delete", path, e))
    }
}

fn copy_verified(
    src: &Path,
    dst: &Path,
    copy: CopyFn,
    created: &mut bool,
) -> MutationResult<()> {
    let mut input = File::open(src).map_err(|e| MutationError::io("open", src, e))?;

    // create_new: never clobber a file that appeared after the collision check.
    let mut output = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(dst)
        .map_err(|e| match e.kind() {
            io::ErrorKind::AlreadyExists => MutationError::NameCollision {
                path: dst.to_path_buf(),
            },
            _ => MutationError::io("create", dst, e),
        })?;
    *created = true;

    let written = copy(&mut input, &mut output).map_err(|e| MutationError::io("copy", src, e))?;
    output
        .sync_all()
        .map_err(|e| MutationError::io("sync", dst, e))?;
    drop(output);

    let expected = fs::metadata(src)
        .map_err(|e| MutationError::io("stat", src, e))?
        .len();
    let actual = fs::metadata(dst)
        .map_err(|e| MutationError::io("stat", dst, e))?
        .len();

    if actual != expected {
        return Err(MutationError::SizeMismatch {
            path: dst.to_path_buf(),
            expected,
            actual,
        });
    }

    debug!("[legacy] copied {written} bytes {:?} -> {:?}", src, dst);
    Ok(())
}

fn file_name(path: &Path) -> Option<&str> {
    path.file_name().and_then(|n| n.to_str())
}

#[cfg(test)]
#[path = "strategy_tests.rs"]
mod tests;
