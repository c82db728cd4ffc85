use std::collections::VecDeque;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsoleEntry {
    pub level: LogLevel,
    pub message: String,
}

/// Console channel of a page. Entries are buffered (bounded, oldest
/// dropped first) and forwarded to the `log` facade.
#[derive(Debug, Clone)]
pub struct Console {
    pub(crate) enabled: bool,
    pub(crate) entries: VecDeque<ConsoleEntry>,
    pub(crate) log_limit: usize,
    pub(crate) to_stderr: bool,
}

impl Default for Console {
    fn default() -> Self {
        Self {
            enabled: true,
            entries: VecDeque::new(),
            log_limit: 10_000,
            to_stderr: false,
        }
    }
}

impl Console {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn debug(&mut self, message: impl Into<String>) {
        self.push(LogLevel::Debug, message.into());
    }

    pub fn info(&mut self, message: impl Into<String>) {
        self.push(LogLevel::Info, message.into());
    }

    pub fn warn(&mut self, message: impl Into<String>) {
        self.push(LogLevel::Warn, message.into());
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.push(LogLevel::Error, message.into());
    }

    pub fn entries(&self) -> impl Iterator<Item = &ConsoleEntry> {
        self.entries.iter()
    }

    pub fn messages_at(&self, level: LogLevel) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|entry| entry.level == level)
            .map(|entry| entry.message.as_str())
            .collect()
    }

    pub fn take_entries(&mut self) -> Vec<ConsoleEntry> {
        self.entries.drain(..).collect()
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn set_stderr(&mut self, enabled: bool) {
        self.to_stderr = enabled;
    }

    pub fn set_log_limit(&mut self, max_entries: usize) {
        self.log_limit = max_entries.max(1);
        while self.entries.len() > self.log_limit {
            self.entries.pop_front();
        }
    }

    fn push(&mut self, level: LogLevel, message: String) {
        match level {
            LogLevel::Debug => log::debug!("{message}"),
            LogLevel::Info => log::info!("{message}"),
            LogLevel::Warn => log::warn!("{message}"),
            LogLevel::Error => log::error!("{message}"),
        }
        if !self.enabled {
            return;
        }
        if self.to_stderr {
            eprintln!("[{level}] {message}");
        }
        if self.entries.len() >= self.log_limit {
            self.entries.pop_front();
        }
        self.entries.push_back(ConsoleEntry { level, message });
    }
}
