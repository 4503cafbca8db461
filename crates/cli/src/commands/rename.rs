use std::{path::PathBuf, process::ExitCode};

use clap::Args;
use log::error;

use crate::commands::{
    AccessOptions, CommandResult, EXIT_UNEXPECTED, load_record, report_shelf_error,
    single_record_shelf,
};

#[derive(Debug, Args)]
pub struct RenameArgs {
    /// The PDF to rename
    pub path: PathBuf,

    /// New file name, with or without the .pdf extension
    pub new_name: String,

    #[command(flatten)]
    pub access: AccessOptions,
}

pub fn run(args: RenameArgs) -> ExitCode {
    match execute(args) {
        Ok(code) => code,
        Err(e) => {
            error!("[rename] {e:#}");
            eprintln!("[error] {e:#}");
            ExitCode::from(EXIT_UNEXPECTED)
        }
    }
}

fn execute(args: RenameArgs) -> CommandResult<ExitCode> {
    let record = match load_record(&args.path) {
        Ok(record) => record,
        Err(e) => return Ok(report_shelf_error(&e)),
    };

    let path = record.path.clone();
    let mut shelf = single_record_shelf(record, &args.access)?;
    match shelf.rename(&path, &args.new_name) {
        Ok(renamed) => {
            println!("Renamed to {}", renamed.name);
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => Ok(report_shelf_error(&e)),
    }
}
