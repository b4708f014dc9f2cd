use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicBool, Ordering},
        mpsc::{channel, Sender},
        Mutex,
    },
    thread::JoinHandle,
};

use cfg_if::cfg_if;

use crate::{
    log_errors::LogError,
    logger_impl::{LogMessage, Logger, APP_LOGGER_NAME, CORE_LOGGER_NAME},
    LogLevel,
};

static LOGGER_THREAD_RUNNING: AtomicBool = AtomicBool::new(false);
static LOGGER_THREAD_SENDER: Mutex<Option<Sender<LogMessage>>> = Mutex::new(None);
static LOGGER_THREAD_HANDLE: Mutex<Option<JoinHandle<()>>> = Mutex::new(None);

pub fn logging_thread_running() -> bool {
    LOGGER_THREAD_RUNNING.load(Ordering::Acquire)
}

/// Starts the logging thread with the given loggers. The `core` and `app`
/// loggers are added with their defaults unless provided.
pub fn logging_thread_start(loggers: Option<Vec<Logger>>) -> Result<(), LogError> {
    let mut sender_slot = LOGGER_THREAD_SENDER
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner());

    if sender_slot.is_some() {
        return Err(LogError::AlreadyInitialized);
    }

    let mut logger_map = HashMap::new();
    for logger in loggers.unwrap_or_default() {
        cfg_if! {
            if #[cfg(debug_assertions)] {
                if logger_map.contains_key(logger.name()) {
                    eprintln!("Logger with name \"{}\" is given twice, keeping the last one", logger.name());
                }
            }
        }
        logger_map.insert(logger.name(), logger);
    }

    logger_map
        .entry(CORE_LOGGER_NAME)
        .or_insert_with(Logger::default_core);
    logger_map
        .entry(APP_LOGGER_NAME)
        .or_insert_with(Logger::default_app);

    let (sender, receiver) = channel::<LogMessage>();

    let handle = std::thread::spawn(move || {
        while let Ok(msg) = receiver.recv() {
            if msg.shutdown {
                break;
            }

            match logger_map.get(msg.logger_name) {
                Some(logger) => logger.log(msg.level, msg.msg),
                None => eprintln!("Logger with name \"{}\" does not exist", msg.logger_name),
            }
        }
    });

    *sender_slot = Some(sender);
    *LOGGER_THREAD_HANDLE
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(handle);
    LOGGER_THREAD_RUNNING.store(true, Ordering::Release);

    Ok(())
}

/// Flushes every queued message and stops the logging thread.
pub fn logging_thread_join() -> Result<(), LogError> {
    let sender = LOGGER_THREAD_SENDER
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
        .take()
        .ok_or(LogError::NotStarted)?;
    LOGGER_THREAD_RUNNING.store(false, Ordering::Release);

    // The thread may already be gone if it panicked; joining reports that.
    let _ = sender.send(LogMessage {
        logger_name: CORE_LOGGER_NAME,
        level: LogLevel::Debug,
        msg: String::new(),
        shutdown: true,
    });

    let handle = LOGGER_THREAD_HANDLE
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
        .take();

    match handle {
        Some(handle) => handle.join().map_err(|_| LogError::ThreadPanicked),
        None => Ok(()),
    }
}

/// Queues a message for the logging thread. Returns `false` when the
/// message was dropped because no logging thread is running.
pub fn send_log_message(msg: LogMessage) -> bool {
    let sender = LOGGER_THREAD_SENDER
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner());

    match sender.as_ref() {
        Some(sender) => sender.send(msg).is_ok(),
        None => false,
    }
}
