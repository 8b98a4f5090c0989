pub mod app;
pub mod config;
pub mod errors;
pub mod state;

pub use app::create_app;
