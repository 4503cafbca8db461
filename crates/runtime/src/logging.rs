use std::{
    io::{self, Write},
    sync::OnceLock,
};

use chrono::Local;
use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError};

use crate::config::{PROGRAM_LOG_LEVEL, PROGRAM_NAME};

enum LogSink {
    Stderr,
    #[cfg(test)]
    Memory(std::sync::Mutex<Vec<String>>),
}

pub struct Logger {
    level: Level,
    sink: LogSink,
}

impl Logger {
    fn format(record: &Record<'_>) -> String {
        let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S%.3f");
        format!(
            "{} {} [{}] {}",
            timestamp,
            record.level(),
            short_target(record.target()),
            record.args()
        )
    }
}

/// Drop the crate prefix from a module path so `pdfshelf_fs::walker`
/// logs as `fs::walker`.
fn short_target(target: &str) -> &str {
    target
        .strip_prefix(PROGRAM_NAME)
        .and_then(|rest| rest.strip_prefix('_'))
        .unwrap_or(target)
}

impl Log for Logger {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record<'_>) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let msg = Self::format(record);
        match &self.sink {
            LogSink::Stderr => {
                // A closed stderr is not worth failing over.
                let _ = writeln!(io::stderr().lock(), "{msg}");
            }
            #[cfg(test)]
            LogSink::Memory(lines) => {
                if let Ok(mut lines) = lines.lock() {
                    lines.push(msg);
                }
            }
        }
    }

    fn flush(&self) {
        if let LogSink::Stderr = self.sink {
            let _ = io::stderr().flush();
        }
    }
}

fn get_level_from_env() -> Level {
    std::env::var(PROGRAM_LOG_LEVEL)
        .ok()
        .and_then(|s| s.parse::<LevelFilter>().ok())
        .and_then(|filter| filter.to_level())
        .unwrap_or(Level::Warn)
}

/// Install the stderr logger at the level named by `PDFSHELF_LOG_LEVEL`.
pub fn init() -> Result<(), SetLoggerError> {
    init_with_level(get_level_from_env())
}

/// Install the stderr logger at an explicit level. Only the first call
/// installs; later calls are no-ops.
pub fn init_with_level(level: Level) -> Result<(), SetLoggerError> {
    static LOGGER: OnceLock<Logger> = OnceLock::new();

    let init_call = LOGGER.get().is_none();

    let logger = LOGGER.get_or_init(|| Logger {
        level,
        sink: LogSink::Stderr,
    });

    if init_call {
        log::set_logger(logger)?;
        log::set_max_level(logger.level.to_level_filter());
    }

    Ok(())
}

#[cfg(test)]
#[path = "logging_tests.rs"]
mod tests;
