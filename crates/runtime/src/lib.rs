mod config;
pub mod logging;

pub use config::{
    ACCESS_ENV, COMMON_PDF_DIRS, DEFAULT_SYSTEM_SKIP_PREFIXES, MEDIA_INDEX_ENV, PROGRAM_NAME,
    STORAGE_ROOT_ENV, default_scan_roots, media_index_path, state_dir, storage_root,
};

pub use logging::init;
