/// Number of records a walker thread accumulates before sending them on.
pub const BATCH_SIZE: usize = 64;

/// Lowercase extension, without the dot, of the files we collect.
pub const PDF_EXTENSION: &str = "pdf";

pub const PDF_MIME_TYPE: &str = "application/pdf";
