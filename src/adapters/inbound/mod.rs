pub mod locating_service;

pub use locating_service::*;
