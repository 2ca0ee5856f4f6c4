//! Content classification from byte signatures.
//!
//! URLs and `Content-Type` headers lie often enough that the pipeline
//! classifies blobs purely from magic bytes. A blob is exactly one of
//! image, video, or unsupported.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Inferred content kind of a fetched blob.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Image,
    Video,
    Unsupported,
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Image => write!(f, "image"),
            Self::Video => write!(f, "video"),
            Self::Unsupported => write!(f, "unsupported"),
        }
    }
}

/// PNG signature.
const PNG_MAGIC: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

/// Matroska/WebM EBML header.
const EBML_MAGIC: [u8; 4] = [0x1A, 0x45, 0xDF, 0xA3];

/// MP4-family box types that may appear first in the file. The box size
/// occupies bytes 0..4, so the type sits at offset 4.
const MP4_BOXES: [&[u8; 4]; 4] = [b"ftyp", b"moov", b"mdat", b"free"];

/// Classify a blob from its magic bytes.
pub fn classify(data: &[u8]) -> MediaKind {
    if is_image(data) {
        MediaKind::Image
    } else if is_video(data) {
        MediaKind::Video
    } else {
        MediaKind::Unsupported
    }
}

fn is_image(data: &[u8]) -> bool {
    if data.starts_with(&PNG_MAGIC) {
        return true;
    }
    // JPEG: SOI marker followed by another marker byte.
    if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
        return true;
    }
    if data.starts_with(b"GIF87a") || data.starts_with(b"GIF89a") {
        return true;
    }
    // BMP
    if data.starts_with(b"BM") {
        return true;
    }
    // TIFF, little- or big-endian.
    if data.starts_with(&[0x49, 0x49, 0x2A, 0x00]) || data.starts_with(&[0x4D, 0x4D, 0x00, 0x2A]) {
        return true;
    }
    // WebP lives in a RIFF container; the form type disambiguates it from AVI.
    if data.starts_with(b"RIFF") && data.len() >= 12 && &data[8..12] == b"WEBP" {
        return true;
    }
    false
}

fn is_video(data: &[u8]) -> bool {
    if data.starts_with(&EBML_MAGIC) {
        return true;
    }
    if data.len() >= 8 {
        let box_type = &data[4..8];
        if MP4_BOXES.iter().any(|b| box_type == *b) {
            return true;
        }
    }
    if data.starts_with(b"RIFF") && data.len() >= 12 && &data[8..12] == b"AVI " {
        return true;
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mp4_header() -> Vec<u8> {
        let mut data = vec![0x00, 0x00, 0x00, 0x20];
        data.extend_from_slice(b"ftypisom");
        data.extend_from_slice(&[0u8; 24]);
        data
    }

    #[test]
    fn png_is_image() {
        let mut data = PNG_MAGIC.to_vec();
        data.extend_from_slice(&[0u8; 16]);
        assert_eq!(classify(&data), MediaKind::Image);
    }

    #[test]
    fn jpeg_is_image() {
        assert_eq!(classify(&[0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10]), MediaKind::Image);
    }

    #[test]
    fn gif_and_bmp_are_images() {
        assert_eq!(classify(b"GIF89a\x01\x00"), MediaKind::Image);
        assert_eq!(classify(b"BM\x36\x00\x00\x00"), MediaKind::Image);
    }

    #[test]
    fn tiff_is_image() {
        assert_eq!(classify(&[0x49, 0x49, 0x2A, 0x00, 0x08]), MediaKind::Image);
        assert_eq!(classify(&[0x4D, 0x4D, 0x00, 0x2A, 0x00]), MediaKind::Image);
    }

    #[test]
    fn webp_riff_is_image() {
        let mut data = b"RIFF".to_vec();
        data.extend_from_slice(&[0x24, 0x00, 0x00, 0x00]);
        data.extend_from_slice(b"WEBPVP8 ");
        assert_eq!(classify(&data), MediaKind::Image);
    }

    #[test]
    fn mp4_is_video() {
        assert_eq!(classify(&mp4_header()), MediaKind::Video);
    }

    #[test]
    fn mp4_with_leading_moov_is_video() {
        let mut data = vec![0x00, 0x00, 0x01, 0x00];
        data.extend_from_slice(b"moov");
        assert_eq!(classify(&data), MediaKind::Video);
    }

    #[test]
    fn matroska_is_video() {
        let mut data = EBML_MAGIC.to_vec();
        data.extend_from_slice(&[0xA3, 0x42, 0x86, 0x81]);
        assert_eq!(classify(&data), MediaKind::Video);
    }

    #[test]
    fn avi_riff_is_video() {
        let mut data = b"RIFF".to_vec();
        data.extend_from_slice(&[0x24, 0x00, 0x00, 0x00]);
        data.extend_from_slice(b"AVI LIST");
        assert_eq!(classify(&data), MediaKind::Video);
    }

    #[test]
    fn bare_riff_is_unsupported() {
        let mut data = b"RIFF".to_vec();
        data.extend_from_slice(&[0x24, 0x00, 0x00, 0x00]);
        data.extend_from_slice(b"WAVEfmt ");
        assert_eq!(classify(&data), MediaKind::Unsupported);
    }

    #[test]
    fn random_bytes_are_unsupported() {
        assert_eq!(classify(&[0x13, 0x37, 0xDE, 0xAD, 0xBE, 0xEF]), MediaKind::Unsupported);
        assert_eq!(classify(b"hello world, definitely not media"), MediaKind::Unsupported);
    }

    #[test]
    fn empty_and_short_blobs_are_unsupported() {
        assert_eq!(classify(&[]), MediaKind::Unsupported);
        assert_eq!(classify(&[0x00, 0x00]), MediaKind::Unsupported);
    }

    #[test]
    fn kind_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&MediaKind::Image).unwrap(), "\"image\"");
        assert_eq!(serde_json::to_string(&MediaKind::Video).unwrap(), "\"video\"");
        assert_eq!(MediaKind::Video.to_string(), "video");
    }
}
