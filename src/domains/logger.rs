use chrono::Utc;
use log::Level;
use std::sync::Arc;

/// Logging port used by the engine and the scheduler.
/// Non-fallible: a logging problem must never interrupt a cycle.
pub trait DomainLogger: Send + Sync + 'static {
    fn log(&self, level: Level, msg: &str);

    fn info(&self, msg: &str) {
        self.log(Level::Info, msg);
    }

    fn warn(&self, msg: &str) {
        self.log(Level::Warn, msg);
    }

    fn error(&self, msg: &str) {
        self.log(Level::Error, msg);
    }
}

pub type DynLogger = Arc<dyn DomainLogger>;

/// Target under which domain records reach the `log` backend.
pub const LOG_TARGET: &str = "awacs";

/// File sink backed by `fast_log`, reached through the `log` facade.
pub struct FileLogger;

impl FileLogger {
    /// Install `fast_log` as the global `log` backend writing to `path`.
    /// Console output stays with the `tracing` subscriber.
    pub fn init(path: &str) -> Result<(), Box<dyn std::error::Error>> {
        fast_log::init(
            fast_log::config::Config::new()
                .file(path)
                .level(log::LevelFilter::Info),
        )?;
        Ok(())
    }

    pub fn flush() {
        log::logger().flush();
    }
}

impl DomainLogger for FileLogger {
    fn log(&self, level: Level, msg: &str) {
        log::log!(target: LOG_TARGET, level, "{} - {}", Utc::now().to_rfc3339(), msg);
    }
}
