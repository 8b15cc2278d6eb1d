use crate::domains::logger::{DomainLogger, DynLogger};
use log::Level;
use std::sync::Arc;

/// Fans every record out to each sink, in order.
pub struct MultiLogger {
    sinks: Vec<DynLogger>,
}

impl MultiLogger {
    pub fn new(sinks: Vec<DynLogger>) -> Self {
        Self { sinks }
    }
}

impl DomainLogger for MultiLogger {
    fn log(&self, level: Level, msg: &str) {
        for sink in &self.sinks {
            sink.log(level, msg);
        }
    }
}

/// File logger mirrored to the console; console only when no file is
/// configured or the file backend cannot be installed.
pub fn init_combined_logger(path: Option<&str>) -> DynLogger {
    let console = super::init_console_logger();
    let Some(path) = path else {
        return console;
    };
    match super::init_file_logger(path) {
        Ok(file_logger) => Arc::new(MultiLogger::new(vec![file_logger, console])),
        Err(e) => {
            console.warn(&e);
            console
        }
    }
}
