//! File backend for the `log` facade. The terminal belongs to the UI, so
//! nothing is ever written to stdout or stderr while the editor runs.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;
use std::sync::Mutex;

use chrono::Local;
use log::{LevelFilter, Log, Metadata, Record};

struct FileLogger {
    level: LevelFilter,
    file: Mutex<File>,
}

impl FileLogger {
    fn open(path: &Path, level: LevelFilter) -> io::Result<Self> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)?;
        writeln!(file, "=== mxedit log start ===")?;
        Ok(Self {
            level,
            file: Mutex::new(file),
        })
    }
}

fn format_line(record: &Record) -> String {
    format!(
        "[{}] {:<5} {}: {}",
        Local::now().format("%H:%M:%S%.3f"),
        record.level(),
        record.target(),
        record.args()
    )
}

impl Log for FileLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        if let Ok(mut file) = self.file.lock() {
            let _ = writeln!(file, "{}", format_line(record));
        }
    }

    fn flush(&self) {
        if let Ok(mut file) = self.file.lock() {
            let _ = file.flush();
        }
    }
}

/// Installs the file logger. Only the first call in a process takes effect.
pub fn init(path: &Path, level: LevelFilter) -> io::Result<()> {
    let logger = FileLogger::open(path, level)?;
    log::set_boxed_logger(Box::new(logger))
        .map_err(|e| io::Error::other(format!("install logger: {e}")))?;
    log::set_max_level(level);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use log::Level;
    use tempfile::tempdir;

    fn emit(logger: &FileLogger, level: Level, message: &str) {
        logger.log(
            &Record::builder()
                .level(level)
                .target("mxedit::session")
                .args(format_args!("{message}"))
                .build(),
        );
    }

    #[test]
    fn writes_filtered_timestamped_lines() {
        let tmp = tempdir().expect("tempdir");
        let path = tmp.path().join("logs/mxedit.log");
        let logger = FileLogger::open(&path, LevelFilter::Info).expect("open");
        emit(&logger, Level::Debug, "hidden");
        emit(&logger, Level::Warn, "save failed");
        logger.flush();

        let raw = fs::read_to_string(&path).expect("read");
        let lines: Vec<_> = raw.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[1].contains("WARN  mxedit::session: save failed"));
        assert!(!raw.contains("hidden"));
    }

    #[test]
    fn reopening_truncates() {
        let tmp = tempdir().expect("tempdir");
        let path = tmp.path().join("mxedit.log");
        let first = FileLogger::open(&path, LevelFilter::Debug).expect("open");
        emit(&first, Level::Info, "old run");
        drop(first);
        let _second = FileLogger::open(&path, LevelFilter::Debug).expect("reopen");
        assert!(!fs::read_to_string(&path).expect("read").contains("old run"));
    }
}
