pub mod global_loggers;
pub mod log_errors;
pub mod log_level;
pub mod logger_impl;
pub mod terminal_escape_code;
pub mod terminal_macros;

pub use global_loggers::{logging_thread_join, logging_thread_running, logging_thread_start};
pub use log_errors::LogError;
pub use log_level::*;
pub use logger_impl::{LogTarget, Logger, LoggerBuilder};
pub use terminal_escape_code::*;
