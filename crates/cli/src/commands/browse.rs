use std::{
    io::{self, BufRead, Write},
    path::PathBuf,
    process::ExitCode,
};

use clap::Args;
use log::{error, info};
use pdfshelf_engine::{Library, Shelf, SortOrder};
use pdfshelf_fs::{PdfRecord, spawn_scan};

use crate::commands::{AccessOptions, CommandResult, EXIT_UNEXPECTED, ScanOptions};

const HELP: &str = "\
commands:
  ls               show the current list
  sort ORDER       name-asc, name-desc, time-asc, time-desc, size-asc, size-desc
  find [TEXT]      filter by name; no TEXT clears the filter
  info N           details of row N
  rename N NAME    rename the file in row N
  delete N         delete the file in row N
  rescan           scan storage again
  help             show this text
  quit             leave";

#[derive(Debug, Args)]
pub struct BrowseArgs {
    #[command(flatten)]
    pub scan: ScanOptions,

    #[command(flatten)]
    pub access: AccessOptions,

    /// Initial sort order
    #[arg(long, short = 's', value_name = "ORDER", default_value_t = SortOrder::NameAsc)]
    pub sort: SortOrder,
}

pub fn run(args: BrowseArgs) -> ExitCode {
    match execute(args) {
        Ok(code) => code,
        Err(e) => {
            error!("[browse] {e:#}");
            eprintln!("[error] {e:#}");
            ExitCode::from(EXIT_UNEXPECTED)
        }
    }
}

fn execute(args: BrowseArgs) -> CommandResult<ExitCode> {
    let mutator = args.access.build_mutator()?;
    let mut shelf = Shelf::new(Library::new(args.sort), mutator);

    let scan_opts = &args.scan;
    let rescan = |shelf: &Shelf| {
        let mutator = shelf.mutator();
        spawn_scan(scan_opts.request(mutator.regime(), mutator.index())).wait()
    };

    let stdin = io::stdin().lock();
    let mut stdout = io::stdout().lock();
    Session::new(&mut shelf, rescan).run(stdin, &mut stdout)?;

    Ok(ExitCode::SUCCESS)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionCommand {
    List,
    Sort(SortOrder),
    Find(String),
    Info(usize),
    Rename(usize, String),
    Delete(usize),
    Rescan,
    Help,
    Quit,
}

/// Parse one input line. Blank lines give `Ok(None)`; the error is the
/// message to show the user.
pub fn parse_line(line: &str) -> Result<Option<SessionCommand>, String> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }

    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };

    let cmd = match word.to_ascii_lowercase().as_str() {
        "ls" | "list" => SessionCommand::List,
        "sort" => SessionCommand::Sort(rest.parse().map_err(|e| format!("{e}"))?),
        "find" => SessionCommand::Find(rest.to_owned()),
        "info" => SessionCommand::Info(parse_row(rest, "info N")?),
        "rename" => {
            let (row, name) = rest
                .split_once(char::is_whitespace)
                .ok_or("usage: rename N NAME")?;
            let name = name.trim();
            if name.is_empty() {
                return Err("usage: rename N NAME".into());
            }
            SessionCommand::Rename(parse_row(row, "rename N NAME")?, name.to_owned())
        }
        "delete" | "rm" => SessionCommand::Delete(parse_row(rest, "delete N")?),
        "rescan" => SessionCommand::Rescan,
        "help" | "?" => SessionCommand::Help,
        "quit" | "exit" | "q" => SessionCommand::Quit,
        other => return Err(format!("unknown command {other:?}; try help")),
    };

    Ok(Some(cmd))
}

fn parse_row(s: &str, usage: &str) -> Result<usize, String> {
    match s.parse::<usize>() {
        Ok(n) if n >= 1 => Ok(n),
        _ => Err(format!("usage: {usage} (N is a row number from ls)")),
    }
}

/// A line-oriented session over a shelf. Every failed change is reported as
/// one line and the session carries on.
pub struct Session<'a, F> {
    shelf: &'a mut Shelf,
    rescan: F,
}

impl<'a, F> Session<'a, F>
where
    F: FnMut(&Shelf) -> anyhow::Result<Vec<PdfRecord>>,
{
    pub fn new(shelf: &'a mut Shelf, rescan: F) -> Self {
        Self { shelf, rescan }
    }

    /// Scan once, then apply commands from `input` until it ends or the
    /// user quits.
    pub fn run<R: BufRead, W: Write>(&mut self, input: R, out: &mut W) -> io::Result<()> {
        self.refresh(out)?;

        for line in input.lines() {
            let line = line?;
            match parse_line(&line) {
                Ok(None) => continue,
                Ok(Some(SessionCommand::Quit)) => break,
                Ok(Some(cmd)) => self.apply(cmd, out)?,
                Err(msg) => writeln!(out, "{msg}")?,
            }
            out.flush()?;
        }

        Ok(())
    }

    pub fn apply<W: Write>(&mut self, cmd: SessionCommand, out: &mut W) -> io::Result<()> {
        match cmd {
            SessionCommand::List => self.list(out),
            SessionCommand::Sort(order) => {
                self.shelf.library_mut().set_sort(order);
                writeln!(out, "Sorted by {}", order.label())?;
                self.list(out)
            }
            SessionCommand::Find(query) => {
                self.shelf.library_mut().set_query(query);
                self.list(out)
            }
            SessionCommand::Info(row) => self.info(row, out),
            SessionCommand::Rename(row, name) => self.rename(row, &name, out),
            SessionCommand::Delete(row) => self.delete(row, out),
            SessionCommand::Rescan => self.refresh(out),
            SessionCommand::Help => writeln!(out, "{HELP}"),
            SessionCommand::Quit => Ok(()),
        }
    }

    fn refresh<W: Write>(&mut self, out: &mut W) -> io::Result<()> {
        match (self.rescan)(&*self.shelf) {
            Ok(records) => {
                info!("[browse] scan returned {} files", records.len());
                self.shelf.replace_records(records);
                self.summary(out)
            }
            Err(e) => writeln!(out, "Scan failed: {e:#}"),
        }
    }

    fn summary<W: Write>(&self, out: &mut W) -> io::Result<()> {
        let library = self.shelf.library();
        let shown = library.visible().len();
        if shown > 0 {
            writeln!(out, "{shown} Files")
        } else if library.query().is_empty() {
            writeln!(out, "No PDF files found")
        } else {
            writeln!(out, "No PDF files match {:?}", library.query())
        }
    }

    fn list<W: Write>(&self, out: &mut W) -> io::Result<()> {
        for (i, r) in self.shelf.library().visible().iter().enumerate() {
            writeln!(
                out,
                "{:>4}  {}  {}  {}",
                i + 1,
                r.name,
                r.formatted_size(),
                r.formatted_date()
            )?;
        }
        self.summary(out)
    }

    /// Path of the record at 1-based `row` in the filtered view.
    fn row_path<W: Write>(&self, row: usize, out: &mut W) -> io::Result<Option<PathBuf>> {
        let visible = self.shelf.library().visible();
        match visible.get(row - 1) {
            Some(r) => Ok(Some(r.path.clone())),
            None => {
                writeln!(out, "No file at row {row}; the list has {} rows", visible.len())?;
                Ok(None)
            }
        }
    }

    fn info<W: Write>(&self, row: usize, out: &mut W) -> io::Result<()> {
        let Some(path) = self.row_path(row, out)? else {
            return Ok(());
        };
        let Some(r) = self.shelf.library().get(&path) else {
            return Ok(());
        };

        writeln!(out, "Name:     {}", r.name_without_extension())?;
        writeln!(out, "Size:     {}", r.formatted_size())?;
        writeln!(out, "Modified: {}", r.formatted_date())?;
        writeln!(out, "Path:     {}", r.path.display())
    }

    fn rename<W: Write>(&mut self, row: usize, name: &str, out: &mut W) -> io::Result<()> {
        let Some(path) = self.row_path(row, out)? else {
            return Ok(());
        };

        match self.shelf.rename(&path, name) {
            Ok(renamed) => writeln!(out, "Renamed to {}", renamed.name),
            Err(e) => writeln!(out, "Rename failed: {e}"),
        }
    }

    fn delete<W: Write>(&mut self, row: usize, out: &mut W) -> io::Result<()> {
        let Some(path) = self.row_path(row, out)? else {
            return Ok(());
        };

        match self.shelf.delete(&path) {
            Ok(removed) => writeln!(out, "Deleted {}", removed.name),
            Err(e) => writeln!(out, "Delete failed: {e}"),
        }
    }
}

#[cfg(test)]
#[path = "browse_tests.rs"]
mod tests;
