use std::{fs, path::PathBuf, process::ExitCode};

use anyhow::{Context, Result, anyhow};
use clap::{Args, Subcommand};
use log::{error, warn};
use pdfshelf_access::PermissionRegime;
use pdfshelf_fs::{JsonMediaIndex, MediaIndex, scan};

use crate::commands::{EXIT_UNEXPECTED, EXIT_USER_ERROR, ScanOptions, open_media_index};

#[derive(Debug, Args)]
pub struct IndexArgs {
    #[command(subcommand)]
    pub action: IndexAction,
}

#[derive(Debug, Subcommand)]
pub enum IndexAction {
    /// Show where the media index lives and what it holds.
    Info,

    /// Register files in the media index.
    Add {
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },

    /// Scan the roots and register every PDF found.
    Build {
        #[command(flatten)]
        scan: ScanOptions,
    },
}

pub fn run(args: IndexArgs) -> ExitCode {
    match execute(args) {
        Ok(code) => code,
        Err(e) => {
            error!("[error] {e:#}");
            eprintln!("[index] {e:#}");
            ExitCode::from(EXIT_UNEXPECTED)
        }
    }
}

fn execute(args: IndexArgs) -> Result<ExitCode> {
    match args.action {
        IndexAction::Info => show_info(),
        IndexAction::Add { paths } => add_files(&paths),
        IndexAction::Build { scan } => build_index(&scan),
    }
}

fn require_index() -> Result<JsonMediaIndex> {
    open_media_index()?
        .ok_or_else(|| anyhow!("no location for the media index; set PDFSHELF_MEDIA_INDEX"))
}

fn add_files(paths: &[PathBuf]) -> Result<ExitCode> {
    let mut index = require_index()?;
    let mut failed = 0usize;

    for path in paths {
        let added = fs::canonicalize(path)
            .with_context(|| format!("cannot resolve {}", path.display()))
            .and_then(|abs| index.insert_file(&abs).map(|id| (abs, id)));

        match added {
            Ok((abs, id)) => println!("{id}\t{}", abs.display()),
            Err(e) => {
                failed += 1;
                eprintln!("[index] {e:#}");
            }
        }
    }

    if failed > 0 {
        return Ok(ExitCode::from(EXIT_USER_ERROR));
    }
    Ok(ExitCode::SUCCESS)
}

fn build_index(opts: &ScanOptions) -> Result<ExitCode> {
    let mut index = require_index()?;
    let records = scan(opts.request(PermissionRegime::FullAccess, None));

    let mut added = 0usize;
    for record in &records {
        match index.insert_file(&record.path) {
            Ok(_) => added += 1,
            Err(e) => warn!("[index] skipping {}: {e:#}", record.path.display()),
        }
    }

    eprintln!("[index] registered {added} of {} files", records.len());
    Ok(ExitCode::SUCCESS)
}

fn show_info() -> Result<ExitCode> {
    let index = require_index()?;

    if !index.path().exists() {
        eprintln!("[index] no media index found at {}", index.path().display());
        // Treat absence as a "soft" failure with non-zero exit
        return Ok(ExitCode::from(EXIT_USER_ERROR));
    }

    let total = index.len();
    let pdfs = index.pdf_entries().len();
    let size_bytes = fs::metadata(index.path())?.len();

    eprintln!("[index] location: {}", index.path().display());
    eprintln!("[index] entries:  {}", total);
    eprintln!("[index] pdfs:     {}", pdfs);
    eprintln!("[index] size:     {} bytes", size_bytes);

    Ok(ExitCode::SUCCESS)
}
