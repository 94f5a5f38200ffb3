pub mod config;
pub mod error;
pub mod questions;
pub mod telemetry;
