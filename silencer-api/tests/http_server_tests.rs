//! HTTP Server & Routing Integration Tests
//!
//! Exercise the router end to end with `tower::ServiceExt::oneshot`.

mod helpers;

use std::io::{Cursor, Read};

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use helpers::{
    generate_test_flac, generate_test_wav, test_config, wav_duration_seconds, AudioConfig,
    MultipartBuilder,
};
use http_body_util::BodyExt;
use serde_json::Value;
use silencer_api::{build_router, AppState};
use silencer_common::config::ServiceConfig;
use tempfile::TempDir;
use tower::ServiceExt;

fn app_with(config: ServiceConfig) -> Router {
    build_router(AppState::new(config))
}

fn test_app(work_dir: &TempDir) -> Router {
    app_with(test_config(work_dir.path()))
}

fn upload(body: Vec<u8>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/process-audio")
        .header(header::CONTENT_TYPE, MultipartBuilder::content_type())
        .body(Body::from(body))
        .unwrap()
}

async fn body_bytes(response: axum::response::Response) -> Vec<u8> {
    response.into_body().collect().await.unwrap().to_bytes().to_vec()
}

async fn body_json(response: axum::response::Response) -> Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

fn header_str<'a>(response: &'a axum::response::Response, name: &str) -> &'a str {
    response.headers().get(name).unwrap().to_str().unwrap()
}

#[tokio::test]
async fn test_root_reports_service_and_parameters() {
    let work_dir = TempDir::new().unwrap();
    let app = test_app(&work_dir);

    let response = app
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;

    assert_eq!(json["status"], "running");
    assert_eq!(json["service"], "Audio Silence Cutter");
    assert_eq!(json["version"], env!("CARGO_PKG_VERSION"));
    assert_eq!(json["parameters"]["min_silence_len_ms"], 45);
    assert_eq!(json["parameters"]["silence_thresh_db"], -45.0);
    assert_eq!(json["parameters"]["keep_silence_ms"], 30);
    assert_eq!(json["accepted_formats"].as_array().unwrap().len(), 6);

    // Build identification is always present, "unknown" outside a checkout
    assert!(!json["build"]["git_hash"].as_str().unwrap().is_empty());
    assert!(json["build"]["timestamp"].as_str().unwrap().ends_with('Z'));
    let profile = json["build"]["profile"].as_str().unwrap();
    assert!(profile == "debug" || profile == "release", "profile {}", profile);
}

#[tokio::test]
async fn test_health_check() {
    let work_dir = TempDir::new().unwrap();
    let app = test_app(&work_dir);

    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;

    assert_eq!(json["status"], "healthy");
    assert_eq!(json["module"], "silencer-api");
    assert!(json["timestamp"].is_string());
    assert!(json["uptime_seconds"].is_u64());
}

#[tokio::test]
async fn test_request_without_files_is_rejected() {
    let work_dir = TempDir::new().unwrap();
    let app = test_app(&work_dir);

    let body = MultipartBuilder::new().text("format", "wav").build();
    let response = app.oneshot(upload(body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["code"], "NO_FILES_PROVIDED");
    assert!(json["error"].is_string());
}

#[tokio::test]
async fn test_non_multipart_body_is_bad_request() {
    let work_dir = TempDir::new().unwrap();
    let app = test_app(&work_dir);

    let request = Request::builder()
        .method("POST")
        .uri("/process-audio")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{}"))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn test_single_file_returns_trimmed_wav() {
    let work_dir = TempDir::new().unwrap();
    let app = test_app(&work_dir);

    let wav = generate_test_wav(&AudioConfig::trailing_silence(1.0, 1.0));
    let body = MultipartBuilder::new().file("file", "take one.wav", &wav).build();
    let response = app.oneshot(upload(body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(header_str(&response, "content-type"), "audio/wav");
    assert_eq!(
        header_str(&response, "content-disposition"),
        "attachment; filename=\"take one_processed.wav\""
    );
    assert!(response.headers().contains_key("x-request-id"));

    let output = body_bytes(response).await;
    let seconds = wav_duration_seconds(&output);
    assert!((seconds - 1.03).abs() < 0.005, "output lasted {}s", seconds);
}

#[tokio::test]
async fn test_single_flac_returns_trimmed_wav() {
    let work_dir = TempDir::new().unwrap();
    let app = test_app(&work_dir);

    let flac = generate_test_flac(&AudioConfig::trailing_silence(1.0, 1.0));
    let body = MultipartBuilder::new().file("file", "take.flac", &flac).build();
    let response = app.oneshot(upload(body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        header_str(&response, "content-disposition"),
        "attachment; filename=\"take_processed.wav\""
    );

    let output = body_bytes(response).await;
    let reader = hound::WavReader::new(Cursor::new(&output)).unwrap();
    assert_eq!(reader.spec().channels, 2);
    assert_eq!(reader.spec().sample_rate, 44100);
    let seconds = wav_duration_seconds(&output);
    assert!((seconds - 1.03).abs() < 0.005, "output lasted {}s", seconds);
}

#[tokio::test]
async fn test_single_file_parameter_overrides() {
    let work_dir = TempDir::new().unwrap();
    let app = test_app(&work_dir);

    let wav = generate_test_wav(&AudioConfig::trailing_silence(1.0, 1.0));
    let body = MultipartBuilder::new()
        .file("file", "take.wav", &wav)
        .text("keep_silence", "0")
        .text("format", "wav_f32")
        .build();
    let response = app.oneshot(upload(body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let output = body_bytes(response).await;

    let reader = hound::WavReader::new(Cursor::new(&output)).unwrap();
    assert_eq!(reader.spec().sample_format, hound::SampleFormat::Float);
    let seconds = wav_duration_seconds(&output);
    assert!((seconds - 1.0).abs() < 0.005, "output lasted {}s", seconds);
}

#[tokio::test]
async fn test_unknown_format_falls_back_to_pcm16() {
    let work_dir = TempDir::new().unwrap();
    let app = test_app(&work_dir);

    let wav = generate_test_wav(&AudioConfig::tone(0.5));
    let body = MultipartBuilder::new()
        .file("file", "take.wav", &wav)
        .text("format", "mp3")
        .build();
    let response = app.oneshot(upload(body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let output = body_bytes(response).await;
    let reader = hound::WavReader::new(Cursor::new(&output)).unwrap();
    assert_eq!(reader.spec().bits_per_sample, 16);
}

#[tokio::test]
async fn test_invalid_parameter_value_is_bad_request() {
    let work_dir = TempDir::new().unwrap();
    let app = test_app(&work_dir);

    let wav = generate_test_wav(&AudioConfig::tone(0.5));
    let body = MultipartBuilder::new()
        .file("file", "take.wav", &wav)
        .text("min_silence_len", "long")
        .build();
    let response = app.oneshot(upload(body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert!(json["error"].as_str().unwrap().contains("min_silence_len"));
}

#[tokio::test]
async fn test_single_unsupported_file_is_400() {
    let work_dir = TempDir::new().unwrap();
    let app = test_app(&work_dir);

    let body = MultipartBuilder::new().file("file", "setup.exe", b"MZ\x90\x00").build();
    let response = app.oneshot(upload(body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["code"], "UNSUPPORTED_FORMAT");
    assert!(json["error"].as_str().unwrap().contains("setup.exe"));
}

#[tokio::test]
async fn test_single_corrupt_file_is_422() {
    let work_dir = TempDir::new().unwrap();
    let app = test_app(&work_dir);

    let body = MultipartBuilder::new()
        .file("file", "broken.wav", b"this is not audio data")
        .build();
    let response = app.oneshot(upload(body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body_json(response).await["code"], "DECODE_ERROR");
}

#[tokio::test]
async fn test_single_file_over_file_limit_is_413() {
    let work_dir = TempDir::new().unwrap();
    let mut config = test_config(work_dir.path());
    config.limits.max_file_size_bytes = 1_000;
    let app = app_with(config);

    let wav = generate_test_wav(&AudioConfig::tone(0.5));
    let body = MultipartBuilder::new().file("file", "take.wav", &wav).build();
    let response = app.oneshot(upload(body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(body_json(response).await["code"], "FILE_TOO_LARGE");
}

#[tokio::test]
async fn test_body_over_request_limit_is_413() {
    let work_dir = TempDir::new().unwrap();
    let mut config = test_config(work_dir.path());
    config.limits.max_request_size_bytes = 4_096;
    let app = app_with(config);

    let wav = generate_test_wav(&AudioConfig::tone(0.5));
    let body = MultipartBuilder::new().file("file", "take.wav", &wav).build();
    let response = app.oneshot(upload(body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
}

#[tokio::test]
async fn test_batch_returns_archive_with_summary() {
    let work_dir = TempDir::new().unwrap();
    let app = test_app(&work_dir);

    let body = MultipartBuilder::new()
        .file("files", "a.wav", &generate_test_wav(&AudioConfig::trailing_silence(1.0, 2.0)))
        .file("files", "b.wav", b"corrupt bytes, no RIFF header")
        .file("files", "c.wav", &generate_test_wav(&AudioConfig::tone(1.0)))
        .build();
    let response = app.oneshot(upload(body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(header_str(&response, "content-type"), "application/zip");
    assert_eq!(header_str(&response, "x-files-total"), "3");
    assert_eq!(header_str(&response, "x-files-succeeded"), "2");
    assert_eq!(header_str(&response, "x-files-failed"), "1");

    let archive = body_bytes(response).await;
    let mut zip = zip::ZipArchive::new(Cursor::new(archive)).unwrap();
    assert_eq!(zip.len(), 3);

    let mut summary = String::new();
    zip.by_name("processing_summary.json")
        .unwrap()
        .read_to_string(&mut summary)
        .unwrap();
    let summary: Value = serde_json::from_str(&summary).unwrap();

    assert_eq!(summary["counts"]["total"], 3);
    assert_eq!(summary["files"][0]["filename"], "a.wav");
    assert_eq!(summary["files"][0]["status"], "success");
    assert_eq!(summary["files"][1]["status"], "failure");
    assert_eq!(summary["files"][1]["error_code"], "DECODE_ERROR");
    assert_eq!(summary["files"][2]["output_filename"], "c.wav");
}

#[tokio::test]
async fn test_batch_with_only_failures_is_still_ok() {
    let work_dir = TempDir::new().unwrap();
    let app = test_app(&work_dir);

    let body = MultipartBuilder::new()
        .file("files", "x.exe", b"MZ")
        .file("files", "y.doc", b"nope")
        .build();
    let response = app.oneshot(upload(body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(header_str(&response, "x-files-failed"), "2");

    let archive = body_bytes(response).await;
    let zip = zip::ZipArchive::new(Cursor::new(archive)).unwrap();
    assert_eq!(zip.len(), 1);
}
