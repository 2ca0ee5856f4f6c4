//! veriframe-core: shared error taxonomy and configuration.
//!
//! This crate is the foundational dependency for all other veriframe
//! crates, providing a unified error type with HTTP status mapping and
//! the immutable process-wide configuration struct.

pub mod config;
pub mod error;

// Re-export the most commonly used items at the crate root.
pub use config::Config;
pub use error::{Error, Result};
