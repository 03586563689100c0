pub mod calculations;
pub mod config;
pub mod error;
pub mod telemetry;
