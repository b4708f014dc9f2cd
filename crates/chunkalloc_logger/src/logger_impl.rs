use std::{fs::OpenOptions, io::Write};

use anyhow::Result;

use crate::{log_errors::LogError, log_level::LogLevel, TerminalEscapeSequence, RESET};

pub const CORE_LOGGER_NAME: &str = "core";
pub const APP_LOGGER_NAME: &str = "app";

const DEFAULT_FORMAT: &str = "{c_start}{time} - {tag} [{level}]: {message}{c_stop}";
const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogTarget {
    Stdout,
    Stderr,
    File(String),
}

/// A message travelling from a logging macro to the logging thread.
#[derive(Debug, Clone)]
pub struct LogMessage {
    pub logger_name: &'static str,
    pub level: LogLevel,
    pub msg: String,
    pub shutdown: bool,
}

#[derive(Debug, Clone)]
pub struct Logger {
    name: &'static str,
    min_level: LogLevel,
    tag: String,
    format: String,
    targets: Vec<LogTarget>,
}

#[derive(Debug)]
pub struct LoggerBuilder {
    name: &'static str,
    min_level: LogLevel,
    tag: String,
    format: String,
    targets: Vec<LogTarget>,
}

impl LoggerBuilder {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            min_level: LogLevel::Debug,
            tag: String::new(),
            format: String::from(DEFAULT_FORMAT),
            targets: vec![LogTarget::Stdout, LogTarget::Stderr],
        }
    }

    pub fn min_level(mut self, min_level: LogLevel) -> Self {
        self.min_level = min_level;
        self
    }

    pub fn tag(mut self, tag: &str) -> Self {
        self.tag = tag.to_string();
        self
    }

    pub fn format(mut self, format: &str) -> Self {
        self.format = format.to_string();
        self
    }

    pub fn targets(mut self, targets: Vec<LogTarget>) -> Self {
        self.targets = targets;
        self
    }

    pub fn build(self) -> Logger {
        Logger {
            name: self.name,
            min_level: self.min_level,
            tag: self.tag,
            format: self.format,
            targets: self.targets,
        }
    }
}

impl Logger {
    pub fn default_core() -> Self {
        LoggerBuilder::new(CORE_LOGGER_NAME).tag("Allocator").build()
    }

    pub fn default_app() -> Self {
        LoggerBuilder::new(APP_LOGGER_NAME).tag("App").build()
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn min_level(&self) -> LogLevel {
        self.min_level
    }

    pub fn log(&self, level: LogLevel, msg: String) {
        if level < self.min_level {
            return;
        }

        for target in self.targets.iter() {
            if let Err(e) = self.log_to_target(target, level, &msg) {
                eprintln!("{e}");
            }
        }
    }

    /// Renders `msg` with this logger's format string. Color placeholders
    /// expand to nothing when `colored` is false.
    ///
    /// Only the format string is scanned for placeholders, so braces inside
    /// the tag or the message are printed as they are.
    pub fn format_message(&self, level: LogLevel, msg: &str, colored: bool) -> String {
        let mut line = String::with_capacity(self.format.len() + msg.len());
        let mut rest = self.format.as_str();

        while let Some(open) = rest.find('{') {
            line.push_str(&rest[..open]);
            let placeholder = &rest[open..];
            let Some(close) = placeholder.find('}') else {
                rest = placeholder;
                break;
            };

            match &placeholder[1..close] {
                "time" => line.push_str(&chrono::Local::now().format(TIME_FORMAT).to_string()),
                "tag" => line.push_str(&self.tag),
                "level" => line.push_str(&level.to_string()),
                "message" => line.push_str(msg),
                "c_start" if colored => {
                    line.push_str(&TerminalEscapeSequence::from(level).to_string())
                }
                "c_stop" if colored => {
                    line.push_str(&TerminalEscapeSequence::from(RESET).to_string())
                }
                "c_start" | "c_stop" => {}
                _ => {
                    line.push('{');
                    rest = &placeholder[1..];
                    continue;
                }
            }
            rest = &placeholder[close + 1..];
        }

        line.push_str(rest);
        line
    }

    fn log_to_target(&self, target: &LogTarget, level: LogLevel, msg: &str) -> Result<()> {
        if (target == &LogTarget::Stdout && level >= LogLevel::Error)
            || (target == &LogTarget::Stderr && level < LogLevel::Error)
        {
            return Ok(());
        }
        match target {
            LogTarget::Stdout => {
                println!("{}", self.format_message(level, msg, true));
                Ok(())
            }
            LogTarget::Stderr => {
                eprintln!("{}", self.format_message(level, msg, true));
                Ok(())
            }
            LogTarget::File(path) => {
                let mut file = OpenOptions::new()
                    .append(true)
                    .create(true)
                    .open(path)
                    .map_err(|e| LogError::CouldNotOpenFile {
                        path: path.clone(),
                        source: e,
                    })?;

                let line = format!("{}\n", self.format_message(level, msg, false));
                file.write_all(line.as_bytes())
                    .map_err(|e| LogError::CouldNotPrintToFile {
                        path: path.clone(),
                        source: e,
                    })?;
                Ok(())
            }
        }
    }
}
