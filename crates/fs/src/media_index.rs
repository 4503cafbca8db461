//! A small content index that mirrors the platform media store: a table of
//! file entries (id, display name, path, size, mtime, mime type) that is
//! queried and updated instead of touching files directly when broad
//! filesystem access is not available.

use std::{
    fs::{self, File},
    io::{self, BufReader, BufWriter, Write},
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;

use crate::{
    config::PDF_MIME_TYPE,
    record::{PdfRecord, canonical_path, is_pdf_path},
};

pub type EntryId = u64;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaEntry {
    pub id: EntryId,
    pub display_name: String,
    pub path: PathBuf,
    pub size: u64,
    pub modified_ms: u64,
    pub mime_type: String,
}

/// Indexed storage as seen by the scanner and the indexed access strategy.
///
/// Mutating calls report the number of affected rows, like a content
/// resolver does; 0 means nothing matched.
pub trait MediaIndex {
    fn entries(&self) -> Vec<MediaEntry>;

    fn find_id(&self, path: &Path) -> Option<EntryId>;

    /// Set the entry's display name and move its recorded path to that
    /// name within the same directory.
    fn update_display_name(&mut self, id: EntryId, new_name: &str) -> Result<usize>;

    /// Remove the entry together with the file it describes.
    fn delete(&mut self, id: EntryId) -> Result<usize>;

    /// Entries that describe PDFs.
    fn pdf_entries(&self) -> Vec<MediaEntry> {
        self.entries()
            .into_iter()
            .filter(|e| e.mime_type == PDF_MIME_TYPE)
            .collect()
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct IndexFile {
    next_id: EntryId,
    entries: Vec<MediaEntry>,
}

/// Media index persisted as JSON. Every mutation is written back atomically.
#[derive(Debug)]
pub struct JsonMediaIndex {
    path: PathBuf,
    data: IndexFile,
}

impl JsonMediaIndex {
    /// Open the index at `path`; a missing file is an empty index.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let data = match File::open(&path) {
            Ok(file) => serde_json::from_reader(BufReader::new(file))
                .with_context(|| format!("malformed media index at {}", path.display()))?,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!("[media_index] no index at {}, starting empty", path.display());
                IndexFile::default()
            }
            Err(e) => {
                return Err(e)
                    .with_context(|| format!("failed to open media index {}", path.display()));
            }
        };

        Ok(Self { path, data })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> usize {
        self.data.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.entries.is_empty()
    }

    /// Register a file on disk under its canonical path, returning its id. A
    /// path that is already indexed keeps its id and has its size and mtime
    /// refreshed.
    pub fn insert_file(&mut self, path: &Path) -> Result<EntryId> {
        let resolved = canonical_path(path);
        let path = resolved.as_path();
        let record = PdfRecord::from_path(path)
            .with_context(|| format!("cannot index {}", path.display()))?;

        if let Some(existing) = self.data.entries.iter_mut().find(|e| e.path == path) {
            existing.size = record.size;
            existing.modified_ms = record.modified_ms;
            let id = existing.id;
            self.save()?;
            return Ok(id);
        }

        let mime_type = if is_pdf_path(path) {
            PDF_MIME_TYPE
        } else {
            "application/octet-stream"
        };

        self.data.next_id += 1;
        let id = self.data.next_id;
        self.data.entries.push(MediaEntry {
            id,
            display_name: record.name,
            path: record.path,
            size: record.size,
            modified_ms: record.modified_ms,
            mime_type: mime_type.to_owned(),
        });
        self.save()?;

        Ok(id)
    }

    fn save(&self) -> Result<()> {
        write_atomic(&self.path, &self.data)
            .with_context(|| format!("failed to write media index {}", self.path.display()))
    }
}

impl MediaIndex for JsonMediaIndex {
    fn entries(&self) -> Vec<MediaEntry> {
        self.data.entries.clone()
    }

    fn find_id(&self, path: &Path) -> Option<EntryId> {
        let target = canonical_path(path);
        self.data
            .entries
            .iter()
            .find(|e| e.path == path || e.path == target || canonical_path(&e.path) == target)
            .map(|e| e.id)
    }

    fn update_display_name(&mut self, id: EntryId, new_name: &str) -> Result<usize> {
        let Some(entry) = self.data.entries.iter_mut().find(|e| e.id == id) else {
            return Ok(0);
        };

        let previous = entry.clone();
        entry.display_name = new_name.to_owned();
        entry.path.set_file_name(new_name);

        if let Err(e) = self.save() {
            if let Some(entry) = self.data.entries.iter_mut().find(|e| e.id == id) {
                *entry = previous;
            }
            return Err(e);
        }

        Ok(1)
    }

    /// The entry is written out of the index before its file is removed, so
    /// a failed save leaves both in place.
    fn delete(&mut self, id: EntryId) -> Result<usize> {
        let Some(pos) = self.data.entries.iter().position(|e| e.id == id) else {
            return Ok(0);
        };

        let entry = self.data.entries.remove(pos);
        if let Err(e) = self.save() {
            self.data.entries.insert(pos, entry);
            return Err(e);
        }

        match fs::remove_file(&entry.path) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                warn!(
                    "[media_index] entry {} pointed at missing file {}",
                    id,
                    entry.path.display()
                );
            }
            Err(e) => {
                let path = entry.path.clone();
                self.data.entries.insert(pos, entry);
                if let Err(restore) = self.save() {
                    warn!("[media_index] could not restore entry {}: {:#}", id, restore);
                }
                return Err(e).with_context(|| format!("failed to remove {}", path.display()));
            }
        }

        Ok(1)
    }
}

fn write_atomic(path: &Path, data: &IndexFile) -> io::Result<()> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent)?;

    let tmp = NamedTempFile::new_in(parent)?;
    {
        let mut writer = BufWriter::new(tmp.as_file());
        serde_json::to_writer_pretty(&mut writer, data).map_err(io::Error::other)?;
        writer.flush()?;
    }
    tmp.as_file().sync_all()?;

    tmp.persist(path).map_err(|e| e.error)?;

    Ok(())
}

/// Convert an index entry back into a record, if its file is still a
/// readable PDF.
pub fn entry_to_record(entry: &MediaEntry) -> Option<PdfRecord> {
    if !is_pdf_path(&entry.path) {
        return None;
    }
    PdfRecord::from_path(&entry.path).ok()
}

#[cfg(test)]
#[path = "media_index_tests.rs"]
mod tests;
