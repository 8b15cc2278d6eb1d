pub mod aggregate;
pub mod geometry;
pub mod ports;
pub mod snapshot;
pub mod update;
pub mod vectors;

pub use aggregate::*;
pub use ports::*;
pub use snapshot::*;
pub use update::*;
pub use vectors::*;
