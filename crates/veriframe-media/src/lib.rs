//! # veriframe-media
//!
//! In-memory media analysis for the veriframe pipeline.
//!
//! This crate provides:
//!
//! - **Content classification** ([`sniff`]) -- decide image vs. video from
//!   byte signatures alone, never trusting URL extensions or headers.
//! - **Similarity engine** ([`ssim`]) -- structural similarity between two
//!   decoded images with deterministic normalization.
//! - **Diagnostics** ([`diff`]) -- difference-map rendering and basic image
//!   property statistics.

pub mod diff;
pub mod sniff;
pub mod ssim;

// ---- Re-exports for convenience ----

pub use diff::{analyze_properties, difference_image, ImageProperties};
pub use sniff::{classify, MediaKind};
pub use ssim::compare;
