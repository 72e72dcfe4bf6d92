//! Server configuration
//!
//! Loaded once at startup from a TOML file. Falls back to built-in defaults
//! if the file does not exist.

pub mod loader;
pub mod types;

pub use loader::{config_path, load};
pub use types::{HttpConfig, ServerConfig};
