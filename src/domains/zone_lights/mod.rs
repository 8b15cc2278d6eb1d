pub mod controller;
pub mod ports;

pub use controller::*;
pub use ports::*;
