use crate::domains::logger::{DomainLogger, DynLogger};
use log::Level;
use std::sync::Arc;

struct ConsoleLogger;

impl DomainLogger for ConsoleLogger {
    fn log(&self, level: Level, msg: &str) {
        match level {
            Level::Error | Level::Warn => eprintln!("{:<5} {}", level, msg),
            _ => println!("{:<5} {}", level, msg),
        }
    }
}

/// Console-backed logger, also the fallback when the log file is unavailable.
pub fn init_console_logger() -> DynLogger {
    Arc::new(ConsoleLogger)
}
