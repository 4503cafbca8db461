use std::io::{self, Write};

use pdfshelf_fs::PdfRecord;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable output with optional colors.
    #[default]
    Human,
    /// NDJSON (newline-delimited JSON) for machine consumption.
    Json,
}

/// Color handling strategy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ColorChoice {
    /// Automatically detect TTY and enable colors if appropriate.
    #[default]
    Auto,
    /// Always use colors.
    Always,
    /// Never use colors.
    Never,
}

impl ColorChoice {
    pub fn parse(s: &str) -> Self {
        match s {
            "always" => ColorChoice::Always,
            "never" => ColorChoice::Never,
            _ => ColorChoice::Auto,
        }
    }
}

/// Configuration for printing a file list.
#[derive(Debug, Clone)]
pub struct PrinterConfig {
    pub format: OutputFormat,
    pub color: ColorChoice,
    /// Maximum number of rows to print.
    pub limit: usize,
    /// Whether to write the file count footer.
    pub show_summary: bool,
}

impl Default for PrinterConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::Human,
            color: ColorChoice::Auto,
            limit: usize::MAX,
            show_summary: true,
        }
    }
}

/// Static context about a print run.
#[derive(Debug)]
pub struct ListPrintContext<'a> {
    /// Label for this listing
    pub kind: &'a str,
    /// Active name filter, if any.
    pub query: Option<&'a str>,
    /// Machine name of the sort order.
    pub sort: &'a str,
    /// Number of records in the filtered view, before limit.
    pub total: usize,
    /// Whether output was truncated due to limit.
    pub truncated: bool,
}

/// One row in the listing.
#[derive(Debug)]
pub struct ListRow<'a> {
    /// 1-based position in the filtered view.
    pub rank: usize,
    pub record: &'a PdfRecord,
}

/// Trait for printing file listings.
///
/// Implementations receive a stream of rows and context, and are responsible
/// for formatting and outputting them appropriately.
pub trait ListPrinter {
    /// Called once before any rows are printed.
    fn begin(&mut self, ctx: &ListPrintContext) -> io::Result<()>;

    fn print_row(&mut self, row: &ListRow<'_>, ctx: &ListPrintContext) -> io::Result<()>;

    /// Called once after all rows are printed.
    ///
    /// Use this for footers and summaries.
    fn finish(&mut self, ctx: &ListPrintContext) -> io::Result<()>;
}

/// Human-readable printer with optional color support.
pub struct HumanPrinter<W: Write, E: Write> {
    out: W,
    err: E,
    cfg: PrinterConfig,
    use_color: bool,
}

impl<W: Write, E: Write> HumanPrinter<W, E> {
    pub fn new(out: W, err: E, cfg: PrinterConfig) -> Self {
        // Generic writers can't be checked for a TTY; Auto means no color.
        let use_color = cfg.color == ColorChoice::Always;

        Self {
            out,
            err,
            cfg,
            use_color,
        }
    }

    /// Create a printer that writes to stdout and stderr with TTY detection.
    pub fn stdout(cfg: PrinterConfig) -> HumanPrinter<io::Stdout, io::Stderr> {
        use std::io::IsTerminal;

        let use_color = match cfg.color {
            ColorChoice::Always => true,
            ColorChoice::Never => false,
            ColorChoice::Auto => io::stdout().is_terminal(),
        };

        HumanPrinter {
            out: io::stdout(),
            err: io::stderr(),
            cfg,
            use_color,
        }
    }

    #[cfg(test)]
    pub fn into_inner(self) -> (W, E) {
        (self.out, self.err)
    }

    #[inline]
    fn format_name(&self, name: &str) -> String {
        if self.use_color {
            format!("\x1b[32m{}\x1b[0m", name)
        } else {
            name.to_owned()
        }
    }
}

pub struct JsonPrinter<W: Write, E: Write> {
    out: W,
    err: E,
    cfg: PrinterConfig,
}

impl<W: Write, E: Write> JsonPrinter<W, E> {
    pub fn new(out: W, err: E, cfg: PrinterConfig) -> Self {
        Self { out, err, cfg }
    }

    /// Create a printer that writes to stdout and stderr.
    pub fn stdout(cfg: PrinterConfig) -> JsonPrinter<io::Stdout, io::Stderr> {
        JsonPrinter {
            out: io::stdout(),
            err: io::stderr(),
            cfg,
        }
    }

    #[cfg(test)]
    pub fn into_inner(self) -> (W, E) {
        (self.out, self.err)
    }
}

impl<W: Write, E: Write> ListPrinter for HumanPrinter<W, E> {
    fn begin(&mut self, _ctx: &ListPrintContext) -> io::Result<()> {
        Ok(())
    }

    fn print_row(&mut self, row: &ListRow<'_>, _ctx: &ListPrintContext) -> io::Result<()> {
        let r = row.record;
        writeln!(
            self.out,
            "{:>4}  {}  {:>9}  {}  {}",
            row.rank,
            self.format_name(&r.name),
            r.formatted_size(),
            r.formatted_date(),
            r.path.display()
        )
    }

    fn finish(&mut self, ctx: &ListPrintContext) -> io::Result<()> {
        if ctx.truncated {
            let remaining = ctx.total.saturating_sub(self.cfg.limit);
            writeln!(self.out, "... and {} more files", remaining)?;
        }

        if self.cfg.show_summary {
            if ctx.total == 0 {
                writeln!(self.err, "No PDF files found")?;
            } else {
                writeln!(self.err, "{} Files", ctx.total)?;
            }
        }

        Ok(())
    }
}

impl<W: Write, E: Write> ListPrinter for JsonPrinter<W, E> {
    fn begin(&mut self, _ctx: &ListPrintContext) -> io::Result<()> {
        Ok(())
    }

    fn print_row(&mut self, row: &ListRow<'_>, ctx: &ListPrintContext) -> io::Result<()> {
        let r = row.record;
        let obj = serde_json::json!({
            "kind": ctx.kind,
            "rank": row.rank,
            "name": r.name,
            "path": r.path,
            "size": r.size,
            "modified_ms": r.modified_ms,
            "date": r.formatted_date(),
        });
        writeln!(self.out, "{}", obj)
    }

    fn finish(&mut self, ctx: &ListPrintContext) -> io::Result<()> {
        if self.cfg.show_summary {
            let obj = serde_json::json!({
                "type": "summary",
                "kind": ctx.kind,
                "query": ctx.query,
                "sort": ctx.sort,
                "total": ctx.total,
                "truncated": ctx.truncated,
            });
            writeln!(self.err, "{}", obj)?;
        }

        Ok(())
    }
}

/// Print `records` as one run: begin, at most `limit` rows, finish.
pub fn print_records(
    printer: &mut dyn ListPrinter,
    records: &[&PdfRecord],
    ctx: &ListPrintContext,
    limit: usize,
) -> io::Result<()> {
    printer.begin(ctx)?;
    for (i, record) in records.iter().take(limit).enumerate() {
        let row = ListRow {
            rank: i + 1,
            record,
        };
        printer.print_row(&row, ctx)?;
    }
    printer.finish(ctx)
}

#[cfg(test)]
#[path = "printer_tests.rs"]
mod tests;
