use std::{
    fs::{self, read_dir},
    path::{Path, PathBuf},
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
    thread,
    time::Duration,
};

use crossbeam::channel::{self, RecvTimeoutError, Sender};
use log::{debug, trace};

use crate::{
    config::BATCH_SIZE,
    excludes::ScanExcludes,
    record::{PdfRecord, check_readable, is_pdf_path},
};

#[derive(Debug, Clone, Default)]
pub struct ScanContext {
    pub excludes: ScanExcludes,
}

/// What a single directory entry turned out to be.
#[derive(Debug)]
enum EntryOutcome {
    /// Directory to descend into.
    Descend(PathBuf),
    /// Readable PDF.
    Pdf(PdfRecord),
}

/// Walk `roots` with `num_threads` workers, sending every readable PDF found
/// on `file_tx` in batches.
///
/// Workers share one directory queue. A directory that cannot be listed is
/// skipped; the rest of the tree is still walked. Roots are resolved to
/// canonical paths first, so every record carries an absolute path. Overlapping
/// roots still yield duplicate records, which the caller removes.
pub fn walk_parallel(
    roots: Vec<PathBuf>,
    file_tx: Sender<Vec<PdfRecord>>,
    ctx: Arc<ScanContext>,
    num_threads: usize,
) {
    let roots: Vec<PathBuf> = roots
        .into_iter()
        .filter_map(|root| match fs::canonicalize(&root) {
            Ok(abs) if abs.is_dir() => Some(abs),
            Ok(_) => {
                debug!("[walk] skipping root {:?}: not a directory", root);
                None
            }
            Err(e) => {
                debug!("[walk] skipping root {:?}: {}", root, e);
                None
            }
        })
        .collect();

    if roots.is_empty() {
        return;
    }

    let (work_tx, work_rx) = channel::unbounded::<PathBuf>();

    // Directories queued or in flight. The walk is over when it reaches 0.
    let pending = Arc::new(AtomicUsize::new(roots.len()));

    for root in roots {
        let _ = work_tx.send(root);
    }

    let num_threads = num_threads.max(1);
    debug!("[walk_parallel] starting with {} threads", num_threads);

    thread::scope(|s| {
        for _ in 0..num_threads {
            let work_rx = work_rx.clone();
            let work_tx = work_tx.clone();
            let file_tx = file_tx.clone();
            let ctx = Arc::clone(&ctx);
            let pending = Arc::clone(&pending);

            s.spawn(move || {
                worker_loop(work_rx, work_tx, file_tx, &ctx, &pending);
            });
        }
    });
}

fn worker_loop(
    work_rx: channel::Receiver<PathBuf>,
    work_tx: channel::Sender<PathBuf>,
    file_tx: Sender<Vec<PdfRecord>>,
    ctx: &ScanContext,
    pending: &AtomicUsize,
) {
    let mut batch = Vec::with_capacity(BATCH_SIZE);

    loop {
        match work_rx.recv_timeout(Duration::from_millis(50)) {
            Ok(dir) => {
                scan_dir(&dir, &work_tx, &mut batch, ctx, pending);

                if batch.len() >= BATCH_SIZE {
                    let to_send = std::mem::take(&mut batch);
                    if file_tx.send(to_send).is_err() {
                        return;
                    }
                }

                if pending.fetch_sub(1, Ordering::AcqRel) == 1 {
                    break;
                }
            }
            Err(RecvTimeoutError::Timeout) => {
                if pending.load(Ordering::Acquire) == 0 {
                    break;
                }
            }
            Err(RecvTimeoutError::Disconnected) => {
                break;
            }
        }
    }

    if !batch.is_empty() {
        let _ = file_tx.send(batch);
    }
}

/// List one directory, queueing subdirectories and collecting PDFs.
fn scan_dir(
    dir: &Path,
    work_tx: &channel::Sender<PathBuf>,
    batch: &mut Vec<PdfRecord>,
    ctx: &ScanContext,
    pending: &AtomicUsize,
) {
    let rd = match read_dir(dir) {
        Ok(rd) => rd,
        Err(e) => {
            // Access denied is routine on shared storage.
            debug!("[walk] skipping {:?}: {e}", dir);
            return;
        }
    };

    for entry_res in rd {
        let entry = match entry_res {
            Ok(e) => e,
            Err(e) => {
                debug!("[walk] error reading entry in {:?}: {e}", dir);
                continue;
            }
        };

        match inspect_entry(&entry, ctx) {
            Some(EntryOutcome::Descend(sub)) => {
                pending.fetch_add(1, Ordering::AcqRel);
                let _ = work_tx.send(sub);
            }
            Some(EntryOutcome::Pdf(record)) => batch.push(record),
            None => {}
        }
    }
}

fn inspect_entry(entry: &fs::DirEntry, ctx: &ScanContext) -> Option<EntryOutcome> {
    let path = entry.path();
    // file_type() does not follow symlinks, so linked directories are never
    // descended into.
    let file_type = match entry.file_type() {
        Ok(ft) => ft,
        Err(e) => {
            debug!("[walk] cannot stat {:?}: {e}", path);
            return None;
        }
    };

    if file_type.is_dir() {
        if ctx.excludes.skips_dir(&path) {
            trace!("[walk] excluded {:?}", path);
            return None;
        }
        return Some(EntryOutcome::Descend(path));
    }

    if !is_pdf_path(&path) {
        return None;
    }

    // Follows symlinks: a link to a readable PDF counts as that PDF.
    let metadata = match fs::metadata(&path) {
        Ok(m) if m.is_file() => m,
        Ok(_) => return None,
        Err(e) => {
            debug!("[walk] cannot stat {:?}: {e}", path);
            return None;
        }
    };

    if let Err(e) = check_readable(&path) {
        debug!("[walk] unreadable {:?}: {e}", path);
        return None;
    }

    match PdfRecord::from_metadata(path, &metadata) {
        Ok(record) => Some(EntryOutcome::Pdf(record)),
        Err(e) => {
            debug!("[walk] skipping entry: {e}");
            None
        }
    }
}

#[cfg(test)]
#[path = "walker_tests.rs"]
mod tests;
