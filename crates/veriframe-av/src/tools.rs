//! External tool discovery.
//!
//! Frame extraction shells out to ffmpeg and ffprobe. [`Tools`] resolves
//! their locations once at startup, preferring the `VERIFRAME_FFMPEG` /
//! `VERIFRAME_FFPROBE` environment overrides and falling back to `PATH`
//! lookup.

use std::path::PathBuf;

use serde::Serialize;

/// Tool names this crate depends on.
const REQUIRED_TOOLS: &[&str] = &["ffmpeg", "ffprobe"];

/// Resolved paths to the external tools.
#[derive(Debug, Clone)]
pub struct Tools {
    pub ffmpeg: PathBuf,
    pub ffprobe: PathBuf,
}

impl Tools {
    /// Discover ffmpeg and ffprobe.
    ///
    /// # Errors
    ///
    /// Returns [`veriframe_core::Error::Tool`] naming the first tool that
    /// could not be found.
    pub fn discover() -> veriframe_core::Result<Self> {
        Ok(Self {
            ffmpeg: resolve("ffmpeg", "VERIFRAME_FFMPEG")?,
            ffprobe: resolve("ffprobe", "VERIFRAME_FFPROBE")?,
        })
    }

    /// Report availability and version of every required tool, for the
    /// `check-tools` CLI command.
    pub fn check() -> Vec<ToolInfo> {
        REQUIRED_TOOLS
            .iter()
            .map(|name| {
                let env_key = format!("VERIFRAME_{}", name.to_uppercase());
                match resolve(name, &env_key) {
                    Ok(path) => ToolInfo {
                        name: name.to_string(),
                        available: true,
                        version: query_version(&path),
                        path: Some(path),
                    },
                    Err(_) => ToolInfo {
                        name: name.to_string(),
                        available: false,
                        version: None,
                        path: None,
                    },
                }
            })
            .collect()
    }
}

/// Availability information for a tool, returned by [`Tools::check`].
#[derive(Debug, Clone, Serialize)]
pub struct ToolInfo {
    /// Tool name.
    pub name: String,
    /// Whether the tool was found.
    pub available: bool,
    /// Version string (first line of `-version` output), if available.
    pub version: Option<String>,
    /// Resolved path to the executable.
    pub path: Option<PathBuf>,
}

fn resolve(name: &str, env_key: &str) -> veriframe_core::Result<PathBuf> {
    if let Ok(path) = std::env::var(env_key) {
        if !path.is_empty() {
            return Ok(PathBuf::from(path));
        }
    }
    which::which(name).map_err(|e| veriframe_core::Error::Tool {
        tool: name.to_string(),
        message: format!("not found on PATH: {e}"),
    })
}

fn query_version(path: &PathBuf) -> Option<String> {
    let output = std::process::Command::new(path).arg("-version").output().ok()?;
    let stdout = String::from_utf8_lossy(&output.stdout);
    stdout.lines().next().map(|l| l.to_string())
}
