//! Application configuration.
//!
//! [`Config`] carries every tunable the pipeline consumes: fetch timeout,
//! similarity threshold, frame sampling rate, size limits, and the server
//! bind address. It is built once at startup (defaults overridden by
//! `VERIFRAME_*` environment variables) and passed into the detector as an
//! immutable value, never read as ambient global state.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Default fetch timeout in seconds.
const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 15;

/// Default maximum download size: 50 MiB.
const DEFAULT_MAX_DOWNLOAD_BYTES: u64 = 50 * 1024 * 1024;

/// Default similarity threshold below which a suspect is flagged.
const DEFAULT_SSIM_THRESHOLD: f64 = 0.98;

/// Default frame sampling rate: one frame per second.
const DEFAULT_FRAME_SAMPLE_FPS: f64 = 1.0;

/// Default external tool timeout in seconds.
const DEFAULT_TOOL_TIMEOUT_SECS: u64 = 120;

/// HTTP server bind settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

/// Root application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    /// Connection/read timeout for content fetches, in seconds.
    pub fetch_timeout_secs: u64,
    /// Maximum accepted download size in bytes.
    pub max_download_bytes: u64,
    /// Similarity score below which the suspect is considered manipulated.
    pub ssim_threshold: f64,
    /// Frames sampled per second of video duration.
    pub frame_sample_fps: f64,
    /// Maximum execution time for ffmpeg/ffprobe invocations, in seconds.
    pub tool_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            fetch_timeout_secs: DEFAULT_FETCH_TIMEOUT_SECS,
            max_download_bytes: DEFAULT_MAX_DOWNLOAD_BYTES,
            ssim_threshold: DEFAULT_SSIM_THRESHOLD,
            frame_sample_fps: DEFAULT_FRAME_SAMPLE_FPS,
            tool_timeout_secs: DEFAULT_TOOL_TIMEOUT_SECS,
        }
    }
}

impl Config {
    /// Build a configuration from defaults overridden by environment
    /// variables:
    ///
    /// - `VERIFRAME_HOST`, `VERIFRAME_PORT`
    /// - `VERIFRAME_FETCH_TIMEOUT_SECS`
    /// - `VERIFRAME_MAX_DOWNLOAD_BYTES`
    /// - `VERIFRAME_SSIM_THRESHOLD`
    /// - `VERIFRAME_FRAME_SAMPLE_FPS`
    /// - `VERIFRAME_TOOL_TIMEOUT_SECS`
    ///
    /// Unparseable values are logged and ignored.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(host) = env_var("VERIFRAME_HOST") {
            config.server.host = host;
        }
        if let Some(port) = env_parse("VERIFRAME_PORT") {
            config.server.port = port;
        }
        if let Some(secs) = env_parse("VERIFRAME_FETCH_TIMEOUT_SECS") {
            config.fetch_timeout_secs = secs;
        }
        if let Some(bytes) = env_parse("VERIFRAME_MAX_DOWNLOAD_BYTES") {
            config.max_download_bytes = bytes;
        }
        if let Some(threshold) = env_parse("VERIFRAME_SSIM_THRESHOLD") {
            config.ssim_threshold = threshold;
        }
        if let Some(fps) = env_parse("VERIFRAME_FRAME_SAMPLE_FPS") {
            config.frame_sample_fps = fps;
        }
        if let Some(secs) = env_parse("VERIFRAME_TOOL_TIMEOUT_SECS") {
            config.tool_timeout_secs = secs;
        }

        config
    }

    /// Fetch timeout as a [`Duration`].
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    /// External tool timeout as a [`Duration`].
    pub fn tool_timeout(&self) -> Duration {
        Duration::from_secs(self.tool_timeout_secs)
    }

    /// Return a list of validation warnings (non-fatal issues).
    pub fn validate(&self) -> Vec<String> {
        let mut warnings = Vec::new();

        if self.server.port == 0 {
            warnings.push("server port is 0; a random port will be assigned".into());
        }
        if !(0.0..=1.0).contains(&self.ssim_threshold) {
            warnings.push(format!(
                "ssim_threshold {} is outside [0, 1]; every request will produce the same verdict",
                self.ssim_threshold
            ));
        }
        if self.frame_sample_fps <= 0.0 {
            warnings.push(format!(
                "frame_sample_fps {} is not positive; video comparison will fail",
                self.frame_sample_fps
            ));
        }
        if self.fetch_timeout_secs == 0 {
            warnings.push("fetch_timeout_secs is 0; every fetch will time out".into());
        }
        if self.max_download_bytes == 0 {
            warnings.push("max_download_bytes is 0; every fetch will be rejected".into());
        }

        warnings
    }
}

fn env_var(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    let raw = env_var(key)?;
    match raw.parse() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!("Ignoring unparseable {key}={raw}");
            None
        }
    }
}
