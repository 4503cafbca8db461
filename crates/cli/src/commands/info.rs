use std::{path::PathBuf, process::ExitCode};

use clap::Args;
use log::error;

use crate::commands::{CommandResult, EXIT_UNEXPECTED, load_record, report_shelf_error};

#[derive(Debug, Args)]
pub struct InfoArgs {
    /// The PDF to describe
    pub path: PathBuf,

    /// Output as a single JSON object
    #[arg(long)]
    pub json: bool,
}

pub fn run(args: InfoArgs) -> ExitCode {
    match execute(args) {
        Ok(code) => code,
        Err(e) => {
            error!("[info] {e:#}");
            eprintln!("[error] {e:#}");
            ExitCode::from(EXIT_UNEXPECTED)
        }
    }
}

fn execute(args: InfoArgs) -> CommandResult<ExitCode> {
    let record = match load_record(&args.path) {
        Ok(record) => record,
        Err(e) => return Ok(report_shelf_error(&e)),
    };

    if args.json {
        let obj = serde_json::json!({
            "name": record.name_without_extension(),
            "file_name": record.name,
            "path": record.path,
            "size": record.size,
            "modified_ms": record.modified_ms,
            "date": record.formatted_date(),
        });
        println!("{obj}");
    } else {
        println!("Name:     {}", record.name_without_extension());
        println!("Size:     {}", record.formatted_size());
        println!("Modified: {}", record.formatted_date());
        println!("Path:     {}", record.path.display());
    }

    Ok(ExitCode::SUCCESS)
}
