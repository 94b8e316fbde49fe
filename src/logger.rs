//! Логгер для фасада `log`, пишущий в stderr
//!
//! stdout занят приглашениями и результатом, поэтому диагностика идёт в stderr.

use log::{LevelFilter, Log, Metadata, Record};
use std::io::Write;

pub struct StderrLogger {
    level: LevelFilter,
}

impl StderrLogger {
    pub fn new(level: LevelFilter) -> Self {
        Self { level }
    }

    fn format(record: &Record) -> String {
        format!("[{} {}] {}", record.level(), record.target(), record.args())
    }
}

impl Log for StderrLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let _ = writeln!(std::io::stderr().lock(), "{}", Self::format(record));
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

/// Устанавливает глобальный логгер; повторная установка игнорируется
pub fn init(level: LevelFilter) {
    if log::set_boxed_logger(Box::new(StderrLogger::new(level))).is_ok() {
        log::set_max_level(level);
    }
}
