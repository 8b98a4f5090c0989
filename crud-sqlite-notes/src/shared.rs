pub mod tracing;
pub mod views;
