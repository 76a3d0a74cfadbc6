pub mod api;
pub mod cli;
pub mod config;
pub mod db;
pub mod error;
pub mod media;
pub mod utils;

// Re-exports
pub use config::Settings;
pub use error::{Error, Result};
pub use media::ImageResolver;
