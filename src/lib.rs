//! veriframe: media manipulation detection service.
//!
//! Compares two media artifacts (image or video) fetched from URLs and
//! reports whether the suspect appears manipulated relative to the
//! original, along with a structural-similarity score. This crate ties the
//! workspace together: the reqwest content fetcher, the detection
//! orchestrator, and the axum HTTP server.

pub mod detector;
pub mod fetch;
pub mod server;

pub use detector::{Detection, Detector};
pub use fetch::Fetcher;
