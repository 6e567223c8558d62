pub mod aws;
pub mod config;
pub mod error;
pub mod solutions;
pub mod telemetry;
