//! Error-to-HTTP response conversion.
//!
//! Implements `IntoResponse` for [`veriframe_core::Error`] so that route
//! handlers can return `Result<T, AppError>` directly.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

/// Wrapper so we can implement `IntoResponse` for an external type.
pub struct AppError {
    inner: veriframe_core::Error,
}

impl AppError {
    pub fn new(inner: veriframe_core::Error) -> Self {
        Self { inner }
    }
}

impl From<veriframe_core::Error> for AppError {
    fn from(e: veriframe_core::Error) -> Self {
        Self::new(e)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.inner.http_status())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        if status.is_server_error() {
            tracing::error!(
                status = %status,
                error = %self.inner,
                "Server error in detection handler"
            );
        } else {
            tracing::warn!(status = %status, error = %self.inner, "Request rejected");
        }

        let code = match &self.inner {
            veriframe_core::Error::Validation(_) => "validation_error",
            veriframe_core::Error::UnsupportedMedia(_) => "unsupported_media",
            veriframe_core::Error::MediaTypeMismatch { .. } => "media_type_mismatch",
            veriframe_core::Error::Download { .. } => "download_error",
            veriframe_core::Error::Decode(_) => "decode_error",
            veriframe_core::Error::FrameExtraction(_) => "frame_extraction_error",
            veriframe_core::Error::Comparison(_) => "comparison_error",
            veriframe_core::Error::Tool { .. } => "tool_error",
            veriframe_core::Error::Io { .. } => "io_error",
            veriframe_core::Error::Internal(_) => "internal_error",
        };

        let body = json!({
            "error": self.inner.to_string(),
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}
