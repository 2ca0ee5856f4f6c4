//! Video probing via ffprobe's JSON output.
//!
//! Runs `ffprobe -v error -print_format json -show_format -show_streams`
//! and extracts the pieces the frame extractor needs: duration and the
//! native dimensions of the primary video stream.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use veriframe_core::{Error, Result};

use crate::command::ToolCommand;

/// Probe results for a video file.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VideoProbe {
    /// Total duration in seconds.
    pub duration_secs: f64,
    /// Native width of the primary video stream.
    pub width: u32,
    /// Native height of the primary video stream.
    pub height: u32,
}

/// Probe a video file on disk.
pub async fn probe(ffprobe: &PathBuf, path: &Path, timeout: Duration) -> Result<VideoProbe> {
    let output = ToolCommand::new(ffprobe.clone())
        .args(["-v", "error", "-print_format", "json", "-show_format", "-show_streams"])
        .arg(path.to_string_lossy())
        .timeout(timeout)
        .execute()
        .await?;

    parse_probe_output(&output.stdout)
}

/// Parse ffprobe JSON into a [`VideoProbe`]. Split out for testability.
pub fn parse_probe_output(json: &str) -> Result<VideoProbe> {
    let ff: FfprobeOutput = serde_json::from_str(json)
        .map_err(|e| Error::FrameExtraction(format!("ffprobe JSON parse error: {e}")))?;

    let video = ff
        .streams
        .iter()
        .find(|s| s.codec_type.as_deref() == Some("video"))
        .ok_or_else(|| Error::FrameExtraction("no video stream found".into()))?;

    let (Some(width), Some(height)) = (video.width, video.height) else {
        return Err(Error::FrameExtraction(
            "video stream is missing dimensions".into(),
        ));
    };
    if width == 0 || height == 0 {
        return Err(Error::FrameExtraction(format!(
            "video stream has zero area: {width}x{height}"
        )));
    }

    // Container-level duration is the most reliable; fall back to the
    // stream's own duration field.
    let duration_secs = ff
        .format
        .as_ref()
        .and_then(|f| f.duration.as_deref())
        .or(video.duration.as_deref())
        .and_then(|d| d.parse::<f64>().ok())
        .unwrap_or(0.0);

    Ok(VideoProbe {
        duration_secs,
        width,
        height,
    })
}

// ---------------------------------------------------------------------------
// JSON structures
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct FfprobeOutput {
    format: Option<FfprobeFormat>,
    #[serde(default)]
    streams: Vec<FfprobeStream>,
}

#[derive(Debug, Deserialize)]
struct FfprobeFormat {
    duration: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FfprobeStream {
    codec_type: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
    duration: Option<String>,
}
