#[macro_export]
macro_rules! escape_sequence {
    ($($code:expr),*) => {
        $crate::terminal_escape_code::TerminalEscapeSequence(vec![$($code),*])
    };
}

/// Sends a message to the named logger on the logging thread.
///
/// The arguments are only formatted when the logging thread is running, so
/// library code may log unconditionally.
#[macro_export]
macro_rules! log_to_global {
    ($logger_name: expr, $log_level: expr, $($args: tt)+) => {{
        if $crate::global_loggers::logging_thread_running() {
            $crate::global_loggers::send_log_message($crate::logger_impl::LogMessage {
                logger_name: $logger_name,
                level: $log_level,
                msg: format!($($args)+),
                shutdown: false,
            });
        }
    }};
}

#[macro_export]
macro_rules! core_debug {
    ($($args: tt)+) => {
        $crate::log_to_global!($crate::logger_impl::CORE_LOGGER_NAME, $crate::LogLevel::Debug, $($args)+)
    };
}

#[macro_export]
macro_rules! core_info {
    ($($args: tt)+) => {
        $crate::log_to_global!($crate::logger_impl::CORE_LOGGER_NAME, $crate::LogLevel::Info, $($args)+)
    };
}

#[macro_export]
macro_rules! core_warn {
    ($($args: tt)+) => {
        $crate::log_to_global!($crate::logger_impl::CORE_LOGGER_NAME, $crate::LogLevel::Warn, $($args)+)
    };
}

#[macro_export]
macro_rules! core_error {
    ($($args: tt)+) => {
        $crate::log_to_global!($crate::logger_impl::CORE_LOGGER_NAME, $crate::LogLevel::Error, $($args)+)
    };
}

#[macro_export]
macro_rules! core_critical {
    ($($args: tt)+) => {
        $crate::log_to_global!($crate::logger_impl::CORE_LOGGER_NAME, $crate::LogLevel::Critical, $($args)+)
    };
}

#[macro_export]
macro_rules! debug {
    ($($args: tt)+) => {
        $crate::log_to_global!($crate::logger_impl::APP_LOGGER_NAME, $crate::LogLevel::Debug, $($args)+)
    };
}

#[macro_export]
macro_rules! info {
    ($($args: tt)+) => {
        $crate::log_to_global!($crate::logger_impl::APP_LOGGER_NAME, $crate::LogLevel::Info, $($args)+)
    };
}

#[macro_export]
macro_rules! warn {
    ($($args: tt)+) => {
        $crate::log_to_global!($crate::logger_impl::APP_LOGGER_NAME, $crate::LogLevel::Warn, $($args)+)
    };
}

#[macro_export]
macro_rules! error {
    ($($args: tt)+) => {
        $crate::log_to_global!($crate::logger_impl::APP_LOGGER_NAME, $crate::LogLevel::Error, $($args)+)
    };
}

#[macro_export]
macro_rules! critical {
    ($($args: tt)+) => {
        $crate::log_to_global!($crate::logger_impl::APP_LOGGER_NAME, $crate::LogLevel::Critical, $($args)+)
    };
}
