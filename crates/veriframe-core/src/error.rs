//! Unified error type for the veriframe application.
//!
//! Every pipeline stage surfaces a specific variant rather than a generic
//! failure, and detail strings from the originating stage are carried
//! verbatim so the root cause stays diagnosable end-to-end. API handlers
//! derive an HTTP status code via [`Error::http_status`].

use std::fmt;

/// Unified error type covering all failure modes in veriframe.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Request data failed validation (missing fields, malformed URLs).
    #[error("Validation error: {0}")]
    Validation(String),

    /// Fetched bytes are not a recognized image or video format.
    #[error("Unsupported media: {0}")]
    UnsupportedMedia(String),

    /// The two inputs resolved to different media kinds.
    #[error("Media type mismatch: original is {original}, suspect is {suspect}")]
    MediaTypeMismatch {
        /// Kind of the original artifact (e.g. "image").
        original: String,
        /// Kind of the suspect artifact (e.g. "video").
        suspect: String,
    },

    /// Fetching content from a URL failed (network, timeout, HTTP status,
    /// content-type, or size limit).
    #[error("Download failed for {url}: {message}")]
    Download {
        /// The URL that could not be fetched.
        url: String,
        /// The underlying transport failure detail.
        message: String,
    },

    /// Decoding an image blob into pixels failed.
    #[error("Decode error: {0}")]
    Decode(String),

    /// Extracting frames from a video failed (corrupt container, codec
    /// failure, or zero decodable frames).
    #[error("Frame extraction error: {0}")]
    FrameExtraction(String),

    /// The similarity engine could not compare the inputs (zero area or a
    /// shape mismatch normalization cannot resolve).
    #[error("Comparison error: {0}")]
    Comparison(String),

    /// An external tool (ffmpeg, ffprobe) failed.
    #[error("Tool error [{tool}]: {message}")]
    Tool {
        /// Name of the tool that failed.
        tool: String,
        /// Human-readable error description.
        message: String,
    },

    /// An I/O operation failed.
    #[error("IO error: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Catch-all for unexpected internal errors.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Map this error to an appropriate HTTP status code.
    ///
    /// Input and classification problems are the caller's fault (400);
    /// download, decode, and internal failures are reported as 500.
    pub fn http_status(&self) -> u16 {
        match self {
            Error::Validation(_) => 400,
            Error::UnsupportedMedia(_) => 400,
            Error::MediaTypeMismatch { .. } => 400,
            Error::Download { .. } => 500,
            Error::Decode(_) => 500,
            Error::FrameExtraction(_) => 500,
            Error::Comparison(_) => 500,
            Error::Tool { .. } => 500,
            Error::Io { .. } => 500,
            Error::Internal(_) => 500,
        }
    }

    /// Convenience constructor for [`Error::Download`].
    pub fn download(url: impl Into<String>, message: impl fmt::Display) -> Self {
        Error::Download {
            url: url.into(),
            message: message.to_string(),
        }
    }

    /// Convenience constructor for [`Error::MediaTypeMismatch`].
    pub fn mismatch(original: impl Into<String>, suspect: impl Into<String>) -> Self {
        Error::MediaTypeMismatch {
            original: original.into(),
            suspect: suspect.into(),
        }
    }

    /// Convenience constructor for [`Error::Tool`].
    pub fn tool(tool: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Tool {
            tool: tool.into(),
            message: message.into(),
        }
    }
}

/// Result alias using the crate-level [`Error`].
pub type Result<T> = std::result::Result<T, Error>;
