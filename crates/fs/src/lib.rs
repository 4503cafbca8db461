mod config;
mod excludes;
pub mod media_index;
mod record;
mod scanner;
mod walker;

pub use config::{PDF_EXTENSION, PDF_MIME_TYPE};
pub use excludes::{ExcludePrefixes, ScanExcludes, TrashRoots};
pub use media_index::{EntryId, JsonMediaIndex, MediaEntry, MediaIndex};
pub use record::{PdfRecord, canonical_path, is_pdf_path};
pub use scanner::{ScanHandle, ScanRequest, dedup_by_path, scan, spawn_scan};
pub use walker::{ScanContext, walk_parallel};
