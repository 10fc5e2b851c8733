//! The build log.
//!
//! Records go to two sinks: an append-only log file, where each record is
//! stamped with the local time and its level, and the console (stderr), where
//! only the message is shown.
//!
//! ```text
//! 2024-05-01 10:12:03,117 - board - WARNING
//!     /site/input/draft.md contains no title. Skipping build!
//! ```

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;

use chrono::Local;
use log::{Level, LevelFilter, Log, Metadata, Record};
use parking_lot::Mutex;

use crate::error::{Chainable, Result};

/// The logger name written into every file record.
pub const NAME: &str = "board";

pub struct Logger {
    level: LevelFilter,
    file: Option<Mutex<File>>,
    console: bool,
}

impl Logger {
    pub fn new(level: LevelFilter) -> Self {
        Logger { level, file: None, console: true }
    }

    /// Appends records to the file at `path`, creating it if needed.
    pub fn with_file(mut self, path: &Path) -> Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .chain_with(|| error!("failed to open the build log", "log path" => path.display()))?;

        self.file = Some(Mutex::new(file));
        Ok(self)
    }

    pub fn with_console(mut self, console: bool) -> Self {
        self.console = console;
        self
    }

    /// Installs `self` as the global logger.
    pub fn install(self) -> Result<()> {
        let level = self.level;
        log::set_boxed_logger(Box::new(self))
            .map_err(|e| error!("failed to install the build logger", e))?;

        log::set_max_level(level);
        Ok(())
    }

    /// Formats `record` the way it appears in the log file.
    pub fn file_record(&self, record: &Record<'_>) -> String {
        let time = Local::now().format("%Y-%m-%d %H:%M:%S,%3f");
        format!("{time} - {NAME} - {}\n    {}\n", level_name(record.level()), record.args())
    }
}

fn level_name(level: Level) -> &'static str {
    match level {
        Level::Error => "ERROR",
        Level::Warn => "WARNING",
        Level::Info => "INFO",
        Level::Debug => "DEBUG",
        Level::Trace => "TRACE",
    }
}

impl Log for Logger {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record<'_>) {
        if !self.enabled(record.metadata()) {
            return;
        }

        if let Some(file) = &self.file {
            let _ = file.lock().write_all(self.file_record(record).as_bytes());
        }

        if self.console {
            eprintln!("{}", record.args());
        }
    }

    fn flush(&self) {
        if let Some(file) = &self.file {
            let _ = file.lock().flush();
        }
    }
}

/// Installs the build logger at `level`, writing to `log_file` and stderr.
pub fn init(level: LevelFilter, log_file: &Path) -> Result<()> {
    Logger::new(level).with_file(log_file)?.install()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record_with<F: FnOnce(&Record<'_>)>(level: Level, f: F) {
        f(&Record::builder()
            .level(level)
            .target("board")
            .args(format_args!("{} contains no title", "a.md"))
            .build())
    }

    #[test]
    fn file_records() {
        let logger = Logger::new(LevelFilter::Info);
        record_with(Level::Warn, |record| {
            let line = logger.file_record(record);
            assert!(line.contains(" - board - WARNING\n    a.md contains no title\n"));
        });
    }

    #[test]
    fn level_filtering_and_file_sink() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("build.log");
        let logger = Logger::new(LevelFilter::Info)
            .with_console(false)
            .with_file(&path)
            .unwrap();

        record_with(Level::Debug, |record| logger.log(record));
        record_with(Level::Info, |record| logger.log(record));
        logger.flush();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents.matches("a.md contains no title").count(), 1);
        assert!(contents.contains(" - board - INFO"));
        assert!(!contents.contains("DEBUG"));
    }
}
