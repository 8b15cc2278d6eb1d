pub mod logger;
pub mod telemetry;
pub mod tracking;
pub mod zone_lights;

pub use logger::*;
pub use telemetry::*;
pub use tracking::*;
pub use zone_lights::*;
