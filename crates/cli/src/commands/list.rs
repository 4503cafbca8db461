use std::{
    io::{Stderr, Stdout},
    process::ExitCode,
};

use clap::Args;
use log::{debug, error};
use pdfshelf_access::{EnvRegimeProbe, PermissionRegime, RegimeProbe};
use pdfshelf_engine::{Library, SortOrder};
use pdfshelf_fs::{MediaIndex, spawn_scan};

use crate::commands::{CommandResult, EXIT_UNEXPECTED, ScanOptions, open_media_index};
use crate::printer::{
    ColorChoice, HumanPrinter, JsonPrinter, ListPrintContext, ListPrinter, OutputFormat,
    PrinterConfig, print_records,
};

#[derive(Debug, Args)]
pub struct OutputOptions {
    /// Output results as NDJSON (one JSON object per line)
    #[arg(long)]
    pub json: bool,

    /// When to use colors: auto, always, never
    #[arg(long, value_name = "WHEN", default_value = "auto")]
    pub color: String,

    /// Suppress the file count footer
    #[arg(long, short = 'q')]
    pub quiet: bool,
}

impl OutputOptions {
    /// Create a printer based on the output options.
    pub fn make_printer(&self, limit: usize) -> Box<dyn ListPrinter> {
        let format = if self.json {
            OutputFormat::Json
        } else {
            OutputFormat::Human
        };

        let cfg = PrinterConfig {
            format,
            color: ColorChoice::parse(&self.color),
            limit,
            show_summary: !self.quiet,
        };

        match format {
            OutputFormat::Human => Box::new(HumanPrinter::<Stdout, Stderr>::stdout(cfg)),
            OutputFormat::Json => Box::new(JsonPrinter::<Stdout, Stderr>::stdout(cfg)),
        }
    }
}

#[derive(Debug, Args)]
pub struct ListArgs {
    #[command(flatten)]
    pub scan: ScanOptions,

    /// Sort order: name-asc, name-desc, time-asc, time-desc, size-asc, size-desc
    #[arg(long, short = 's', value_name = "ORDER", default_value_t = SortOrder::NameAsc)]
    pub sort: SortOrder,

    /// Only show files whose name contains TEXT (case-insensitive)
    #[arg(long, value_name = "TEXT")]
    pub query: Option<String>,

    /// Maximum number of files to display
    #[arg(long, short = 'n')]
    pub limit: Option<usize>,

    /// Output formatting options
    #[command(flatten)]
    pub output: OutputOptions,
}

pub fn run(args: ListArgs) -> ExitCode {
    match execute(args) {
        Ok(code) => code,
        Err(e) => {
            error!("[list] {e:#}");
            eprintln!("[error] {e:#}");
            ExitCode::from(EXIT_UNEXPECTED)
        }
    }
}

fn execute(args: ListArgs) -> CommandResult<ExitCode> {
    let regime = EnvRegimeProbe.current();
    let index = if regime == PermissionRegime::FullAccess {
        None
    } else {
        open_media_index()?
    };

    let request = args
        .scan
        .request(regime, index.as_ref().map(|i| i as &dyn MediaIndex));
    debug!("[list] scanning {} roots", request.roots.len());

    let handle = spawn_scan(request);
    let records = handle.wait()?;

    let mut library = Library::new(args.sort);
    library.replace_all(records);
    if let Some(query) = &args.query {
        library.set_query(query.as_str());
    }

    let visible = library.visible();
    let limit = args.limit.unwrap_or(usize::MAX);
    let query = library.query();
    let ctx = ListPrintContext {
        kind: "list",
        query: (!query.is_empty()).then_some(query),
        sort: library.sort_order().as_str(),
        total: visible.len(),
        truncated: visible.len() > limit,
    };

    let mut printer = args.output.make_printer(limit);
    print_records(printer.as_mut(), &visible, &ctx, limit)?;

    Ok(ExitCode::SUCCESS)
}
