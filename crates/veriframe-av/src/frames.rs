//! Frame extraction from video blobs.
//!
//! The blob is written to a temporary workspace, probed with ffprobe for
//! duration and native dimensions, then ffmpeg's `fps` filter dumps one
//! frame per sampling interval (starting at t=0, presentation order) as
//! PNGs which are decoded back into memory. A video shorter than one
//! sampling interval still yields its first decodable frame; a video with
//! no decodable frames at all is an error.

use std::path::{Path, PathBuf};
use std::time::Duration;

use image::DynamicImage;
use tempfile::TempDir;
use veriframe_core::{Error, Result};

use crate::command::ToolCommand;
use crate::ffprobe;
use crate::tools::Tools;

/// An ordered sequence of frames sampled from one video.
#[derive(Debug)]
pub struct FrameSequence {
    /// Decoded frames in presentation order.
    pub frames: Vec<DynamicImage>,
    /// Source duration in seconds.
    pub duration_secs: f64,
    /// Native width of the video stream (pre-normalization).
    pub width: u32,
    /// Native height of the video stream (pre-normalization).
    pub height: u32,
}

impl FrameSequence {
    /// Number of sampled frames.
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// A sequence is never legitimately empty; this exists for symmetry.
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

/// Extracts frames from in-memory video blobs via ffmpeg.
#[derive(Debug, Clone)]
pub struct FrameExtractor {
    tools: Tools,
    sample_fps: f64,
    tool_timeout: Duration,
}

impl FrameExtractor {
    pub fn new(tools: Tools, sample_fps: f64, tool_timeout: Duration) -> Self {
        Self {
            tools,
            sample_fps,
            tool_timeout,
        }
    }

    /// Extract the sampled frame sequence from a video blob.
    ///
    /// # Errors
    ///
    /// Returns [`Error::FrameExtraction`] for empty blobs, corrupt
    /// containers, codec failures, or zero decodable frames. The ffmpeg /
    /// ffprobe stderr detail is preserved in the message.
    pub async fn extract(&self, data: &[u8]) -> Result<FrameSequence> {
        if data.is_empty() {
            return Err(Error::FrameExtraction("video blob is empty".into()));
        }
        if self.sample_fps <= 0.0 {
            return Err(Error::FrameExtraction(format!(
                "frame sample rate must be positive, got {}",
                self.sample_fps
            )));
        }

        let workspace = TempDir::new()?;
        let input_path = workspace.path().join("input.bin");
        tokio::fs::write(&input_path, data).await?;

        let probe = ffprobe::probe(&self.tools.ffprobe, &input_path, self.tool_timeout)
            .await
            .map_err(as_extraction_error)?;

        tracing::debug!(
            duration = probe.duration_secs,
            width = probe.width,
            height = probe.height,
            "probed video blob"
        );

        let frame_pattern = workspace.path().join("frame_%05d.png");
        let fps_filter = format!("fps={}", self.sample_fps);
        ToolCommand::new(self.tools.ffmpeg.clone())
            .args(["-v", "error"])
            .arg("-i")
            .arg(input_path.to_string_lossy())
            .args(["-vf", fps_filter.as_str(), "-start_number", "0"])
            .arg(frame_pattern.to_string_lossy())
            .timeout(self.tool_timeout)
            .execute()
            .await
            .map_err(as_extraction_error)?;

        // Listing and decoding both touch the filesystem, so they share the
        // blocking task. The tempdir outlives the await below.
        let frames_dir = workspace.path().to_path_buf();
        let expected = expected_frame_count(probe.duration_secs, self.sample_fps);
        let frames = tokio::task::spawn_blocking(move || -> Result<Vec<DynamicImage>> {
            let frame_paths = collect_frame_paths(&frames_dir, expected)?;
            frame_paths
                .iter()
                .map(|p| {
                    image::open(p).map_err(|e| {
                        Error::FrameExtraction(format!("failed to decode extracted frame: {e}"))
                    })
                })
                .collect()
        })
        .await
        .map_err(|e| Error::Internal(format!("frame decode task panicked: {e}")))??;

        tracing::info!(frames = frames.len(), "extracted frame sequence");

        Ok(FrameSequence {
            frames,
            duration_secs: probe.duration_secs,
            width: probe.width,
            height: probe.height,
        })
    }
}

/// List the dumped frame files in presentation order, capped at the
/// expected count. Called from a blocking task.
fn collect_frame_paths(dir: &Path, expected: usize) -> Result<Vec<PathBuf>> {
    let mut frame_paths: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| {
            p.file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.starts_with("frame_") && n.ends_with(".png"))
        })
        .collect();
    // Zero-padded names, so lexicographic order is presentation order.
    frame_paths.sort();

    if frame_paths.is_empty() {
        return Err(Error::FrameExtraction(
            "no decodable frames in video".into(),
        ));
    }
    frame_paths.truncate(expected);
    Ok(frame_paths)
}

/// Number of frames a well-formed extraction should produce: one per full
/// sampling interval of duration, but never fewer than one.
fn expected_frame_count(duration_secs: f64, sample_fps: f64) -> usize {
    let count = (duration_secs * sample_fps).floor() as usize;
    count.max(1)
}

/// Collapse tool failures from ffmpeg/ffprobe into the frame-extraction
/// taxonomy while keeping the descriptive message intact.
fn as_extraction_error(err: Error) -> Error {
    match err {
        Error::FrameExtraction(_) => err,
        other => Error::FrameExtraction(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn five_second_video_yields_five_frames() {
        assert_eq!(expected_frame_count(5.0, 1.0), 5);
    }

    #[test]
    fn partial_seconds_are_floored() {
        assert_eq!(expected_frame_count(4.999, 1.0), 4);
        assert_eq!(expected_frame_count(5.001, 1.0), 5);
    }

    #[test]
    fn sub_second_video_yields_one_frame() {
        assert_eq!(expected_frame_count(0.4, 1.0), 1);
        assert_eq!(expected_frame_count(0.0, 1.0), 1);
    }

    #[test]
    fn rate_scales_the_count() {
        assert_eq!(expected_frame_count(4.0, 2.0), 8);
        assert_eq!(expected_frame_count(10.0, 0.5), 5);
    }

    #[test]
    fn frame_listing_sorts_filters_and_truncates() {
        let dir = tempfile::TempDir::new().unwrap();
        // Written out of order; only frame_*.png files count.
        for name in ["frame_00002.png", "frame_00000.png", "frame_00001.png", "input.bin"] {
            std::fs::write(dir.path().join(name), b"x").unwrap();
        }

        let paths = collect_frame_paths(dir.path(), 2).unwrap();
        let names: Vec<_> = paths
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap().to_string())
            .collect();
        assert_eq!(names, ["frame_00000.png", "frame_00001.png"]);
    }

    #[test]
    fn empty_frame_listing_is_an_extraction_error() {
        let dir = tempfile::TempDir::new().unwrap();
        std::fs::write(dir.path().join("input.bin"), b"x").unwrap();
        let err = collect_frame_paths(dir.path(), 3).unwrap_err();
        assert!(matches!(err, Error::FrameExtraction(_)));
        assert!(err.to_string().contains("no decodable frames"));
    }

    #[tokio::test]
    async fn empty_blob_is_rejected_without_running_tools() {
        // Paths never executed for an empty blob, so fakes are fine.
        let tools = Tools {
            ffmpeg: PathBuf::from("/nonexistent/ffmpeg"),
            ffprobe: PathBuf::from("/nonexistent/ffprobe"),
        };
        let extractor = FrameExtractor::new(tools, 1.0, Duration::from_secs(5));
        let err = extractor.extract(&[]).await.unwrap_err();
        assert!(matches!(err, Error::FrameExtraction(_)));
        assert!(err.to_string().contains("empty"));
    }

    #[tokio::test]
    async fn corrupt_blob_surfaces_probe_detail() {
        // A garbage blob reaches ffprobe (if installed) and must come back
        // as a frame-extraction error either way.
        let Ok(tools) = Tools::discover() else {
            return;
        };
        let extractor = FrameExtractor::new(tools, 1.0, Duration::from_secs(10));
        let err = extractor.extract(b"definitely not a video").await.unwrap_err();
        assert!(matches!(err, Error::FrameExtraction(_)));
    }
}
