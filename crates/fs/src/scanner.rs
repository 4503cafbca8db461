use std::{
    path::PathBuf,
    sync::Arc,
    thread::{self, JoinHandle},
    time::Instant,
};

use anyhow::{Error, Result};
use crossbeam::channel::{self, Receiver};
use hashbrown::HashSet;
use log::{debug, info, warn};

use crate::{
    excludes::ScanExcludes,
    media_index::{MediaEntry, MediaIndex, entry_to_record},
    record::{PdfRecord, canonical_path},
    walker::{ScanContext, walk_parallel},
};

/// Everything one scan needs. Owned so it can move to the scan thread.
#[derive(Debug, Clone)]
pub struct ScanRequest {
    pub roots: Vec<PathBuf>,
    pub excludes: ScanExcludes,
    /// Entries from indexed storage to merge with the walk.
    pub indexed: Vec<MediaEntry>,
    pub num_threads: usize,
}

impl ScanRequest {
    pub fn new(roots: Vec<PathBuf>) -> Self {
        let num_threads = thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(4);

        Self {
            roots,
            excludes: ScanExcludes::default(),
            indexed: Vec::new(),
            num_threads,
        }
    }

    pub fn with_excludes(mut self, excludes: ScanExcludes) -> Self {
        self.excludes = excludes;
        self
    }

    /// Merge the PDF entries of `index` into the scan result.
    pub fn with_index(mut self, index: &dyn MediaIndex) -> Self {
        self.indexed = index.pdf_entries();
        self
    }
}

/// A scan running on a background thread. The complete result is handed
/// over exactly once, by [`ScanHandle::wait`].
pub struct ScanHandle {
    result_rx: Receiver<Vec<PdfRecord>>,
    thread: JoinHandle<()>,
}

impl ScanHandle {
    /// Block until the scan finishes and take its result.
    pub fn wait(self) -> Result<Vec<PdfRecord>> {
        let received = self.result_rx.recv();
        self.thread
            .join()
            .map_err(|_| Error::msg("scan thread panicked"))?;
        received.map_err(|_| Error::msg("scan thread exited without a result"))
    }

    /// Whether the result is ready, without blocking.
    pub fn is_finished(&self) -> bool {
        self.thread.is_finished()
    }
}

/// Start a scan off the calling thread.
pub fn spawn_scan(request: ScanRequest) -> ScanHandle {
    let (result_tx, result_rx) = channel::bounded(1);

    let thread = thread::spawn(move || {
        let records = scan(request);
        let _ = result_tx.send(records);
    });

    ScanHandle { result_rx, thread }
}

/// Run a scan on the calling thread: walk every root, merge indexed entries,
/// and drop duplicate paths keeping the first occurrence.
pub fn scan(request: ScanRequest) -> Vec<PdfRecord> {
    let started = Instant::now();
    let ScanRequest {
        roots,
        excludes,
        indexed,
        num_threads,
    } = request;

    let ctx = Arc::new(ScanContext { excludes });
    let (file_tx, file_rx) = channel::unbounded::<Vec<PdfRecord>>();

    let walker = {
        let ctx = Arc::clone(&ctx);
        thread::spawn(move || walk_parallel(roots, file_tx, ctx, num_threads))
    };

    let mut records: Vec<PdfRecord> = indexed.iter().filter_map(entry_to_record).collect();
    let from_index = records.len();

    while let Ok(batch) = file_rx.recv() {
        records.extend(batch);
    }

    if walker.join().is_err() {
        // Partial results are still worth returning.
        warn!("[scan] walker thread panicked, result may be incomplete");
    }

    let found = records.len();
    let records = dedup_by_path(records);

    debug!(
        "[scan] {} candidates ({} from index), {} unique",
        found,
        from_index,
        records.len()
    );
    info!(
        "[scan] found {} pdf files in {:.2}ms",
        records.len(),
        started.elapsed().as_secs_f64() * 1000.0
    );

    records
}

/// Keep the first record for each file, comparing paths in canonical form.
pub fn dedup_by_path(records: Vec<PdfRecord>) -> Vec<PdfRecord> {
    let mut seen = HashSet::with_capacity(records.len());
    records
        .into_iter()
        .filter(|r| seen.insert(canonical_path(&r.path)))
        .collect()
}

#[cfg(test)]
#[path = "scanner_tests.rs"]
mod tests;
