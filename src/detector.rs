//! Detection orchestrator.
//!
//! Sequences the pipeline for one request: validate URLs, fetch both
//! blobs concurrently, classify each, extract frames for video, run the
//! similarity engine over aligned pairs, aggregate, and apply the
//! manipulation threshold. Every stage's error kind and detail survive to
//! the caller unflattened.

use bytes::Bytes;
use image::DynamicImage;
use rayon::prelude::*;
use reqwest::Url;
use serde::Serialize;
use veriframe_av::{FrameExtractor, Tools};
use veriframe_core::{Config, Error, Result};
use veriframe_media::{classify, ssim, MediaKind};

use crate::fetch::Fetcher;

/// Final verdict for one detection request.
#[derive(Debug, Clone, Serialize)]
pub struct Detection {
    /// Whether the suspect is flagged as manipulated.
    pub manipulated: bool,
    /// Aggregate similarity score in [0, 1], rounded to 4 decimals.
    pub score: f64,
    /// Plain-language description of the verdict.
    pub message: String,
    /// Kind both inputs resolved to.
    pub media_type: MediaKind,
    /// Native (pre-normalization) dimensions of the original's first
    /// image/frame, as [width, height].
    pub original_dimensions: (u32, u32),
    /// Native dimensions of the suspect's first image/frame.
    pub suspect_dimensions: (u32, u32),
}

/// Stateless per-request pipeline orchestrator.
///
/// Holds only immutable configuration and infrastructure; concurrent
/// requests are fully independent.
pub struct Detector {
    config: Config,
    fetcher: Fetcher,
    extractor: Option<FrameExtractor>,
}

impl Detector {
    /// Construct a detector from the process configuration.
    ///
    /// Tool discovery happens here; when ffmpeg/ffprobe are missing the
    /// detector still serves image comparisons and reports video requests
    /// as frame-extraction failures.
    pub fn new(config: Config) -> Self {
        let fetcher = Fetcher::new(&config);
        let extractor = match Tools::discover() {
            Ok(tools) => Some(FrameExtractor::new(
                tools,
                config.frame_sample_fps,
                config.tool_timeout(),
            )),
            Err(e) => {
                tracing::warn!("video comparison disabled: {e}");
                None
            }
        };

        Self {
            config,
            fetcher,
            extractor,
        }
    }

    /// Compare the artifact behind `url_suspect` against `url_original`.
    pub async fn detect(
        &self,
        url_original: Option<&str>,
        url_suspect: Option<&str>,
    ) -> Result<Detection> {
        let original_url = validate_url("url_original", url_original)?;
        let suspect_url = validate_url("url_suspect", url_suspect)?;

        tracing::info!(original = %original_url, suspect = %suspect_url, "processing detection request");

        // Independent fetches; either failure short-circuits the join.
        let (original, suspect) = tokio::try_join!(
            self.fetcher.fetch(&original_url),
            self.fetcher.fetch(&suspect_url)
        )?;

        let original_kind = classify(&original);
        let suspect_kind = classify(&suspect);

        match (original_kind, suspect_kind) {
            (MediaKind::Image, MediaKind::Image) => self.compare_images(original, suspect).await,
            (MediaKind::Video, MediaKind::Video) => self.compare_videos(original, suspect).await,
            (MediaKind::Unsupported, _) => Err(Error::UnsupportedMedia(
                "original content has no recognized image or video signature".into(),
            )),
            (_, MediaKind::Unsupported) => Err(Error::UnsupportedMedia(
                "suspect content has no recognized image or video signature".into(),
            )),
            (o, s) => Err(Error::mismatch(o.to_string(), s.to_string())),
        }
    }

    async fn compare_images(&self, original: Bytes, suspect: Bytes) -> Result<Detection> {
        let outcome = tokio::task::spawn_blocking(move || -> Result<((u32, u32), (u32, u32), f64)> {
            let original = decode_image("original", &original)?;
            let suspect = decode_image("suspect", &suspect)?;
            let original_dims = (original.width(), original.height());
            let suspect_dims = (suspect.width(), suspect.height());
            let score = ssim::compare(&original, &suspect)?;
            Ok((original_dims, suspect_dims, score))
        })
        .await
        .map_err(|e| Error::Internal(format!("comparison task panicked: {e}")))?;

        let (original_dims, suspect_dims, score) = outcome?;
        Ok(self.build_detection(MediaKind::Image, score, original_dims, suspect_dims))
    }

    async fn compare_videos(&self, original: Bytes, suspect: Bytes) -> Result<Detection> {
        let extractor = self.extractor.as_ref().ok_or_else(|| {
            Error::FrameExtraction("ffmpeg/ffprobe not available on this host".into())
        })?;

        let (seq_original, seq_suspect) = tokio::try_join!(
            extractor.extract(&original),
            extractor.extract(&suspect)
        )?;

        let original_dims = (seq_original.width, seq_original.height);
        let suspect_dims = (seq_suspect.width, seq_suspect.height);

        let score = tokio::task::spawn_blocking(move || {
            aggregate_pairs(seq_original.frames, seq_suspect.frames)
        })
        .await
        .map_err(|e| Error::Internal(format!("comparison task panicked: {e}")))??;

        Ok(self.build_detection(MediaKind::Video, score, original_dims, suspect_dims))
    }

    fn build_detection(
        &self,
        media_type: MediaKind,
        score: f64,
        original_dimensions: (u32, u32),
        suspect_dimensions: (u32, u32),
    ) -> Detection {
        // The verdict and message use the raw clamped score; rounding is
        // presentation only, so a score just under the threshold cannot
        // round its way past it.
        let raw = score.clamp(0.0, 1.0);
        let threshold = self.config.ssim_threshold;
        let manipulated = raw < threshold;

        let message = if manipulated {
            let confidence = (threshold - raw) / threshold * 100.0;
            format!("Manipulation detected (confidence: {confidence:.1}%)")
        } else {
            format!("No manipulation detected (similarity: {:.1}%)", raw * 100.0)
        };

        let score = round4(raw);
        tracing::info!(manipulated, score, %media_type, "detection completed");

        Detection {
            manipulated,
            score,
            message,
            media_type,
            original_dimensions,
            suspect_dimensions,
        }
    }
}

/// Score aligned frame pairs and average them.
///
/// Frames are paired by index; a length mismatch is tolerated by
/// truncating to the shorter sequence. Any pair that cannot be compared
/// fails the whole aggregation.
fn aggregate_pairs(mut originals: Vec<DynamicImage>, mut suspects: Vec<DynamicImage>) -> Result<f64> {
    let pair_count = originals.len().min(suspects.len());
    if pair_count == 0 {
        return Err(Error::Comparison("no frame pairs to compare".into()));
    }
    tracing::debug!(
        original_frames = originals.len(),
        suspect_frames = suspects.len(),
        pair_count,
        "aligned frame sequences"
    );
    originals.truncate(pair_count);
    suspects.truncate(pair_count);

    let scores: Vec<f64> = originals
        .par_iter()
        .zip(suspects.par_iter())
        .map(|(a, b)| ssim::compare(a, b))
        .collect::<Result<Vec<_>>>()?;
    Ok(scores.iter().sum::<f64>() / scores.len() as f64)
}

fn decode_image(which: &str, data: &[u8]) -> Result<DynamicImage> {
    image::load_from_memory(data)
        .map_err(|e| Error::Decode(format!("failed to decode {which} image: {e}")))
}

fn validate_url(field: &str, value: Option<&str>) -> Result<Url> {
    let value = value.ok_or_else(|| Error::Validation(format!("{field} is required")))?;
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(Error::Validation(format!(
            "{field} must be a non-empty string"
        )));
    }

    let url = Url::parse(trimmed)
        .map_err(|e| Error::Validation(format!("{field} is not a valid URL: {e}")))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(Error::Validation(format!(
            "{field} must use http or https, got {}",
            url.scheme()
        )));
    }
    Ok(url)
}

fn round4(score: f64) -> f64 {
    (score * 10_000.0).round() / 10_000.0
}
