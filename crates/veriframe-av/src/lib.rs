//! # veriframe-av
//!
//! External tool plumbing for video handling.
//!
//! This crate provides:
//!
//! - **Tool discovery** ([`Tools`]) -- find ffmpeg and ffprobe on `PATH`
//!   (or via env override) and report their availability.
//! - **Command execution** ([`ToolCommand`]) -- async builder with timeout
//!   support for running external processes.
//! - **Probing** ([`ffprobe`]) -- duration and native dimensions of a
//!   video file via ffprobe's JSON output.
//! - **Frame extraction** ([`FrameExtractor`]) -- sample decoded frames
//!   from a video blob at a fixed temporal rate.

pub mod command;
pub mod ffprobe;
pub mod frames;
pub mod tools;

// ---- Re-exports for convenience ----

pub use command::{ToolCommand, ToolOutput};
pub use ffprobe::VideoProbe;
pub use frames::{FrameExtractor, FrameSequence};
pub use tools::{ToolInfo, Tools};
