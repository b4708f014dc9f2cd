use thiserror::Error;

#[derive(Debug, Error)]
pub enum LogError {
    #[error("logging thread is already running")]
    AlreadyInitialized,
    #[error("logging thread is not running")]
    NotStarted,
    #[error("logging thread panicked")]
    ThreadPanicked,
    #[error("unknown log level '{0}'")]
    UnknownLevel(String),
    #[error("could not open file '{path}': {source}")]
    CouldNotOpenFile {
        path: String,
        source: std::io::Error,
    },
    #[error("could not write to file '{path}': {source}")]
    CouldNotPrintToFile {
        path: String,
        source: std::io::Error,
    },
}
