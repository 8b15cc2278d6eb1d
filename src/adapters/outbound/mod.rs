pub mod console_logger;
pub mod file_logger;
pub mod kafka;
pub mod light_controller;
pub mod multi_logger;

pub use console_logger::*;
pub use file_logger::*;
pub use kafka::*;
pub use light_controller::*;
pub use multi_logger::*;
