use std::{path::PathBuf, process::ExitCode};

use clap::Args;
use log::error;

use crate::commands::{
    AccessOptions, CommandResult, EXIT_UNEXPECTED, load_record, report_shelf_error,
    single_record_shelf,
};

#[derive(Debug, Args)]
pub struct DeleteArgs {
    /// The PDF to delete
    pub path: PathBuf,

    #[command(flatten)]
    pub access: AccessOptions,
}

pub fn run(args: DeleteArgs) -> ExitCode {
    match execute(args) {
        Ok(code) => code,
        Err(e) => {
            error!("[delete] {e:#}");
            eprintln!("[error] {e:#}");
            ExitCode::from(EXIT_UNEXPECTED)
        }
    }
}

fn execute(args: DeleteArgs) -> CommandResult<ExitCode> {
    let record = match load_record(&args.path) {
        Ok(record) => record,
        Err(e) => return Ok(report_shelf_error(&e)),
    };

    let path = record.path.clone();
    let mut shelf = single_record_shelf(record, &args.access)?;
    match shelf.delete(&path) {
        Ok(removed) => {
            println!("Deleted {}", removed.name);
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => Ok(report_shelf_error(&e)),
    }
}
