pub mod message;
pub mod ports;
pub mod publisher;

pub use message::*;
pub use ports::*;
pub use publisher::*;
