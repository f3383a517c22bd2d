// Copyright 2025 N. Dornseif
//
// Dual-licensed under Apache 2.0 and MIT terms.

//! Misc utility functions and the result logger.

use std::{
    fs::{File, OpenOptions},
    io::Write,
    path::Path,
    sync::Mutex,
    time::Duration,
};

/// Format a number of samples into a pretty String.
/// e.g. 1048576 is 1.05 M
pub fn format_count(count: usize) -> String {
    if count >= 1_000_000_000 {
        format!("{:.2} G", count as f64 / 1e9)
    } else if count >= 1_000_000 {
        format!("{:.2} M", count as f64 / 1e6)
    } else if count >= 1_000 {
        format!("{:.2} K", count as f64 / 1e3)
    } else {
        format!("{}", count)
    }
}

/// Format a duration with a unit that keeps three significant decimals readable.
pub fn format_elapsed_time(elapsed: Duration) -> String {
    let secs = elapsed.as_secs_f64();
    if secs >= 60.0 {
        format!("{}m {:06.3}s", elapsed.as_secs() / 60, secs % 60.0)
    } else if secs >= 1.0 {
        format!("{:.3} s", secs)
    } else if secs >= 1e-3 {
        format!("{:.3} ms", secs * 1e3)
    } else {
        format!("{:.3} µs", secs * 1e6)
    }
}

/// Prefix a log record with the local time and its level.
fn format_record(record: &log::Record) -> String {
    format!(
        "{} {:<5} {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f"),
        record.level(),
        record.args()
    )
}

/// Prints every record to stdout and appends it to a result file.
pub struct ResultLogger {
    level: log::LevelFilter,
    file: Option<Mutex<File>>,
}

impl ResultLogger {
    /// Log records up to `level`, appending them to `file_path`.
    pub fn new(file_path: &str, level: log::LevelFilter) -> std::io::Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(Path::new(file_path))?;
        Ok(ResultLogger {
            level,
            file: Some(Mutex::new(file)),
        })
    }

    pub fn stdout_only(level: log::LevelFilter) -> Self {
        ResultLogger { level, file: None }
    }

    /// Make this the global logger. Fails if one is already installed.
    pub fn install(self) -> Result<(), log::SetLoggerError> {
        let level = self.level;
        log::set_boxed_logger(Box::new(self))?;
        log::set_max_level(level);
        Ok(())
    }

    fn append(&self, line: &str) -> std::io::Result<()> {
        let Some(file) = &self.file else {
            return Ok(());
        };
        let mut file = file.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        writeln!(file, "{}", line)
    }
}

impl log::Log for ResultLogger {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &log::Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let line = format_record(record);
        println!("{}", line);
        if let Err(e) = self.append(&line) {
            eprintln!("Could not write to result file: {}", e);
        }
    }

    fn flush(&self) {
        let _ = std::io::stdout().flush();
        if let Some(file) = &self.file {
            let mut file = file.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
            let _ = file.flush();
        }
    }
}
