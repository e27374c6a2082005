use chrono::{DateTime, Local};
use log::{Level, LevelFilter, Metadata, Record};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

#[derive(Debug, Clone)]
pub struct LogEntry {
    pub timestamp: DateTime<Local>,
    pub level: Level,
    pub target: String,
    pub message: String,
}

impl std::fmt::Display for LogEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} {:<5} [{}] {}",
            self.timestamp.format("%H:%M:%S%.3f"),
            self.level,
            self.target,
            self.message
        )
    }
}

/// Bounded in-memory log. The desktop viewer shows the latest entry in its
/// status line; the CLI also echoes entries to stderr.
#[derive(Clone)]
pub struct AppLogger {
    entries: Arc<Mutex<VecDeque<LogEntry>>>,
    max_entries: usize,
    level: LevelFilter,
    echo: bool,
}

impl AppLogger {
    pub fn new(max_entries: usize) -> Self {
        Self {
            entries: Arc::new(Mutex::new(VecDeque::with_capacity(max_entries))),
            max_entries,
            level: LevelFilter::Info,
            echo: false,
        }
    }

    pub fn with_level(mut self, level: LevelFilter) -> Self {
        self.level = level;
        self
    }

    /// Also print every entry to stderr
    pub fn with_echo(mut self, echo: bool) -> Self {
        self.echo = echo;
        self
    }

    pub fn init(self) -> Result<(), log::SetLoggerError> {
        let level = self.level;
        log::set_boxed_logger(Box::new(self))?;
        log::set_max_level(level);
        Ok(())
    }

    pub fn get_entries(&self) -> Vec<LogEntry> {
        self.lock().iter().cloned().collect()
    }

    pub fn latest_message(&self) -> Option<String> {
        self.lock().back().map(|entry| entry.message.clone())
    }

    /// Most recent entry at `level` or more severe
    pub fn latest_at(&self, level: Level) -> Option<LogEntry> {
        self.lock().iter().rev().find(|e| e.level <= level).cloned()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    fn lock(&self) -> MutexGuard<'_, VecDeque<LogEntry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl log::Log for AppLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let entry = LogEntry {
            timestamp: Local::now(),
            level: record.level(),
            target: record.target().to_string(),
            message: format!("{}", record.args()),
        };
        if self.echo {
            eprintln!("{}", entry);
        }

        let mut entries = self.lock();
        entries.push_back(entry);
        while entries.len() > self.max_entries {
            entries.pop_front();
        }
    }

    fn flush(&self) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use log::Log;

    fn record(logger: &AppLogger, level: Level, message: &str) {
        logger.log(
            &Record::builder()
                .level(level)
                .target("flipbook")
                .args(format_args!("{}", message))
                .build(),
        );
    }

    #[test]
    fn keeps_only_recent_entries() {
        let logger = AppLogger::new(2);
        record(&logger, Level::Info, "one");
        record(&logger, Level::Info, "two");
        record(&logger, Level::Warn, "three");

        let messages: Vec<_> = logger.get_entries().into_iter().map(|e| e.message).collect();
        assert_eq!(messages, vec!["two", "three"]);
        assert_eq!(logger.latest_message().as_deref(), Some("three"));
    }

    #[test]
    fn filters_below_level() {
        let logger = AppLogger::new(8);
        record(&logger, Level::Debug, "noise");
        assert!(logger.get_entries().is_empty());

        let verbose = AppLogger::new(8).with_level(LevelFilter::Debug);
        record(&verbose, Level::Debug, "detail");
        record(&verbose, Level::Info, "opened");
        assert_eq!(
            verbose.latest_at(Level::Debug).map(|e| e.message).as_deref(),
            Some("opened")
        );
        assert!(verbose.latest_at(Level::Warn).is_none());
    }

    #[test]
    fn display_names_the_source_module() {
        let logger = AppLogger::new(4);
        record(&logger, Level::Warn, "page 3 failed");

        let line = logger.get_entries()[0].to_string();
        assert!(line.contains("WARN"));
        assert!(line.ends_with("[flipbook] page 3 failed"));
    }

    #[test]
    fn clear_empties_the_log() {
        let logger = AppLogger::new(4);
        record(&logger, Level::Info, "opened");
        logger.clear();
        assert!(logger.get_entries().is_empty());
        assert!(logger.latest_message().is_none());
    }
}
