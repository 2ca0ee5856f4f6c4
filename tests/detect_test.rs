//! End-to-end detection tests.
//!
//! Serves fixture media from a wiremock stub server and exercises the full
//! pipeline through the HTTP router: fetch, classify, compare, verdict,
//! and error mapping. No test here requires ffmpeg.

use std::io::Cursor;

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use http_body_util::BodyExt;
use image::{DynamicImage, ImageBuffer, ImageFormat, Rgb};
use tower::ServiceExt;
use veriframe::server::{build_router, AppContext};
use veriframe_core::Config;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn png_bytes(w: u32, h: u32, rgb: [u8; 3]) -> Vec<u8> {
    let img = DynamicImage::ImageRgb8(ImageBuffer::from_fn(w, h, |_, _| Rgb(rgb)));
    let mut buf = Cursor::new(Vec::new());
    img.write_to(&mut buf, ImageFormat::Png).unwrap();
    buf.into_inner()
}

fn mp4_header_bytes() -> Vec<u8> {
    let mut data = vec![0x00, 0x00, 0x00, 0x20];
    data.extend_from_slice(b"ftypisom");
    data.extend_from_slice(&[0u8; 64]);
    data
}

async fn serve_bytes(server: &MockServer, route: &str, content_type: &str, bytes: Vec<u8>) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", content_type)
                .set_body_bytes(bytes),
        )
        .mount(server)
        .await;
}

async fn run_detect(server: &MockServer, route_original: &str, route_suspect: &str) -> (StatusCode, serde_json::Value) {
    let app = build_router(AppContext::new(Config::default()));
    let body = serde_json::json!({
        "url_original": format!("{}{route_original}", server.uri()),
        "url_suspect": format!("{}{route_suspect}", server.uri()),
    });

    let response = app
        .oneshot(
            Request::post("/detect")
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn identical_images_are_not_manipulated() {
    let server = MockServer::start().await;
    serve_bytes(&server, "/a.png", "image/png", png_bytes(64, 48, [10, 200, 40])).await;

    let (status, json) = run_detect(&server, "/a.png", "/a.png").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["manipulated"], false);
    assert!((json["score"].as_f64().unwrap() - 1.0).abs() < 1e-6);
    assert_eq!(json["media_type"], "image");
    assert_eq!(json["original_dimensions"], serde_json::json!([64, 48]));
    assert_eq!(json["suspect_dimensions"], serde_json::json!([64, 48]));
    assert!(json["message"].as_str().unwrap().contains("No manipulation"));
}

#[tokio::test]
async fn dissimilar_images_are_flagged() {
    let server = MockServer::start().await;
    serve_bytes(&server, "/red.png", "image/png", png_bytes(64, 64, [255, 0, 0])).await;
    serve_bytes(&server, "/green.png", "image/png", png_bytes(64, 64, [0, 255, 0])).await;

    let (status, json) = run_detect(&server, "/red.png", "/green.png").await;

    assert_eq!(status, StatusCode::OK);
    let score = json["score"].as_f64().unwrap();
    assert!(score < 0.98, "score was {score}");
    assert_eq!(json["manipulated"], true);
    assert!(json["message"].as_str().unwrap().contains("Manipulation detected"));
}

#[tokio::test]
async fn dimensions_reported_are_native_not_normalized() {
    let server = MockServer::start().await;
    serve_bytes(&server, "/big.png", "image/png", png_bytes(128, 96, [80, 80, 80])).await;
    serve_bytes(&server, "/small.png", "image/png", png_bytes(64, 48, [80, 80, 80])).await;

    let (status, json) = run_detect(&server, "/big.png", "/small.png").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["original_dimensions"], serde_json::json!([128, 96]));
    assert_eq!(json["suspect_dimensions"], serde_json::json!([64, 48]));
}

#[tokio::test]
async fn mixed_kinds_are_a_mismatch() {
    let server = MockServer::start().await;
    serve_bytes(&server, "/a.png", "image/png", png_bytes(64, 64, [1, 2, 3])).await;
    serve_bytes(&server, "/b.mp4", "video/mp4", mp4_header_bytes()).await;

    let (status, json) = run_detect(&server, "/a.png", "/b.mp4").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "media_type_mismatch");
    let text = json["error"].as_str().unwrap();
    assert!(text.contains("image"));
    assert!(text.contains("video"));
}

#[tokio::test]
async fn unrecognized_bytes_are_unsupported_media() {
    let server = MockServer::start().await;
    serve_bytes(&server, "/a.png", "image/png", png_bytes(64, 64, [1, 2, 3])).await;
    serve_bytes(
        &server,
        "/junk.bin",
        "application/octet-stream",
        b"certainly not media content".to_vec(),
    )
    .await;

    let (status, json) = run_detect(&server, "/a.png", "/junk.bin").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "unsupported_media");
    assert!(json["error"].as_str().unwrap().contains("suspect"));
}

#[tokio::test]
async fn http_error_on_either_side_is_a_download_failure() {
    let server = MockServer::start().await;
    serve_bytes(&server, "/a.png", "image/png", png_bytes(64, 64, [1, 2, 3])).await;
    Mock::given(method("GET"))
        .and(path("/gone.png"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let (status, json) = run_detect(&server, "/a.png", "/gone.png").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["code"], "download_error");
    assert!(json["error"].as_str().unwrap().contains("404"));
}

#[tokio::test]
async fn unreachable_host_reports_transport_detail() {
    let app = build_router(AppContext::new(Config::default()));
    let body = serde_json::json!({
        "url_original": "http://veriframe-nowhere.invalid/a.png",
        "url_suspect": "http://veriframe-nowhere.invalid/b.png",
    });

    let response = app
        .oneshot(
            Request::post("/detect")
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(json["code"], "download_error");
    assert!(json["error"]
        .as_str()
        .unwrap()
        .contains("veriframe-nowhere.invalid"));
}

#[tokio::test]
async fn corrupt_image_bytes_with_valid_signature_is_decode_error() {
    let server = MockServer::start().await;
    // A real PNG magic followed by garbage: classifies as image, fails decode.
    let mut corrupt = vec![0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];
    corrupt.extend_from_slice(&[0xAB; 32]);

    serve_bytes(&server, "/a.png", "image/png", png_bytes(64, 64, [9, 9, 9])).await;
    serve_bytes(&server, "/corrupt.png", "image/png", corrupt).await;

    let (status, json) = run_detect(&server, "/a.png", "/corrupt.png").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["code"], "decode_error");
    assert!(json["error"].as_str().unwrap().contains("suspect"));
}

#[tokio::test]
async fn tiny_images_are_a_comparison_error() {
    let server = MockServer::start().await;
    serve_bytes(&server, "/tiny.png", "image/png", png_bytes(8, 8, [1, 1, 1])).await;
    serve_bytes(&server, "/a.png", "image/png", png_bytes(64, 64, [1, 1, 1])).await;

    let (status, json) = run_detect(&server, "/tiny.png", "/a.png").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["code"], "comparison_error");
    assert!(json["error"].as_str().unwrap().contains("too small"));
}
