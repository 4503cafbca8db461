use std::{env, path::PathBuf};

pub const PROGRAM_NAME: &str = "pdfshelf";
pub const PROGRAM_LOG_LEVEL: &str = "PDFSHELF_LOG_LEVEL";

/// Overrides the directory treated as the device's shared storage root.
pub const STORAGE_ROOT_ENV: &str = "PDFSHELF_STORAGE_ROOT";

/// Selects the storage permission regime: `full`, `indexed` or `legacy`.
pub const ACCESS_ENV: &str = "PDFSHELF_ACCESS";

/// Overrides the location of the media index file.
pub const MEDIA_INDEX_ENV: &str = "PDFSHELF_MEDIA_INDEX";

pub const MEDIA_INDEX_FILE_NAME: &str = "media_index.json";

/// Well-known folders under the storage root that commonly hold PDFs.
/// They are already covered by a walk of the root itself but are listed
/// separately so a root that cannot be listed still yields them.
pub const COMMON_PDF_DIRS: &[&str] = &["Download", "Downloads", "Documents", "PDF"];

/// System-ish directories to skip when the storage root is `/`.
pub const DEFAULT_SYSTEM_SKIP_PREFIXES: &[&str] = &[
    "/proc",
    "/sys",
    "/dev",
    "/run",
    "/var/run",
    "/var/tmp",
    "/private/tmp",
];

fn non_empty_var(name: &str) -> Option<PathBuf> {
    env::var_os(name)
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
}

/// Root of shared storage, the equivalent of the device's external storage
/// directory.
pub fn storage_root() -> PathBuf {
    non_empty_var(STORAGE_ROOT_ENV)
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| env::current_dir().unwrap_or_else(|_| PathBuf::from(".")))
}

/// Default scan roots derived from a storage root: the root itself followed
/// by the common document folders beneath it.
pub fn default_scan_roots(root: &std::path::Path) -> Vec<PathBuf> {
    let mut roots = Vec::with_capacity(COMMON_PDF_DIRS.len() + 1);
    roots.push(root.to_path_buf());
    roots.extend(COMMON_PDF_DIRS.iter().map(|d| root.join(d)));
    roots
}

pub fn state_dir() -> Option<PathBuf> {
    // Check XDG_STATE_HOME first (Linux)
    if let Some(xdg_state) = non_empty_var("XDG_STATE_HOME") {
        return Some(xdg_state.join(PROGRAM_NAME));
    }

    dirs::state_dir()
        .or_else(dirs::data_local_dir)
        .map(|p| p.join(PROGRAM_NAME))
}

/// Default media index location, honouring `PDFSHELF_MEDIA_INDEX`.
pub fn media_index_path() -> Option<PathBuf> {
    non_empty_var(MEDIA_INDEX_ENV).or_else(|| state_dir().map(|d| d.join(MEDIA_INDEX_FILE_NAME)))
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
