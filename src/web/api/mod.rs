pub mod collector;
pub mod error;
pub mod telemetry;
