//! Configuration types
//!
//! Board-agnostic configuration structures. With the `serde` feature they
//! deserialize from the arm section of the server's TOML file.

pub mod types;

pub use types::*;
