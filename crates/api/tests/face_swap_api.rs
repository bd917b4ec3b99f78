//! HTTP-level integration tests for the synchronous `POST /api/v1/face-swap`.
//!
//! The router talks to an in-process mock compute service. The handler does
//! not touch the database, so these tests run against a lazy pool.

mod common;

use std::time::Duration;

use axum::http::StatusCode;
use common::{
    body_bytes, body_json, closed_addr, face_swap_parts, get, lazy_pool, post_multipart, TestApp,
};

const FACE_SWAP: &str = "/api/v1/face-swap";

// ---------------------------------------------------------------------------
// Success
// ---------------------------------------------------------------------------

#[tokio::test]
async fn completed_video_is_stored_as_mp4() {
    let test = TestApp::spawn(lazy_pool()).await;
    test.upstream.respond(200, "video/mp4", b"swapped-video");

    let response = post_multipart(test.app(), FACE_SWAP, &face_swap_parts()).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["message"], "Face swap completed");
    let filename = json["filename"].as_str().unwrap().to_string();
    assert!(filename.starts_with("faceswap_"), "got {filename}");
    assert!(filename.ends_with(".mp4"), "got {filename}");

    let stored = std::fs::read(test.output_dir.path().join(&filename)).unwrap();
    assert_eq!(stored, b"swapped-video");
    assert_eq!(test.upstream.create_calls(), 1);
    assert_eq!(test.upstream.query_calls(), 1);
}

#[tokio::test]
async fn stored_artifact_is_served_under_outputs() {
    let test = TestApp::spawn(lazy_pool()).await;
    test.upstream.respond(200, "image/png", b"\x89PNG-bytes");

    let response = post_multipart(test.app(), FACE_SWAP, &face_swap_parts()).await;
    let filename = body_json(response).await["filename"]
        .as_str()
        .unwrap()
        .to_string();
    assert!(filename.ends_with(".png"), "got {filename}");

    let response = get(test.app(), &format!("/outputs/{filename}")).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_bytes(response).await, b"\x89PNG-bytes");
}

#[tokio::test]
async fn content_type_parameters_are_ignored_for_extension() {
    let test = TestApp::spawn(lazy_pool()).await;
    test.upstream.respond(200, "image/jpeg; charset=binary", b"jpeg-out");

    let response = post_multipart(test.app(), FACE_SWAP, &face_swap_parts()).await;
    assert_eq!(response.status(), StatusCode::OK);

    let filename = body_json(response).await["filename"]
        .as_str()
        .unwrap()
        .to_string();
    assert!(filename.ends_with(".jpeg"), "got {filename}");
}

#[tokio::test]
async fn pending_statuses_keep_polling_until_success() {
    let test = TestApp::spawn(lazy_pool()).await;
    test.upstream
        .pending(3)
        .respond(200, "video/mp4", b"swapped-video");

    let response = post_multipart(test.app(), FACE_SWAP, &face_swap_parts()).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(test.upstream.query_calls(), 4);
}

#[tokio::test]
async fn unrecognized_statuses_are_treated_as_pending() {
    let test = TestApp::spawn(lazy_pool()).await;
    test.upstream
        .respond(503, "text/plain", b"busy")
        .respond(401, "text/plain", b"nope")
        .respond(200, "video/mp4", b"swapped-video");

    let response = post_multipart(test.app(), FACE_SWAP, &face_swap_parts()).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(test.upstream.query_calls(), 3);
}

// ---------------------------------------------------------------------------
// Terminal upstream failures
// ---------------------------------------------------------------------------

#[tokio::test]
async fn terminal_failures_pass_through_and_stop_polling() {
    for code in [400u16, 404, 500] {
        let test = TestApp::spawn(lazy_pool()).await;
        test.upstream.respond(code, "application/json", br#"{"detail":"no face detected"}"#);

        let response = post_multipart(test.app(), FACE_SWAP, &face_swap_parts()).await;

        assert_eq!(response.status().as_u16(), code);
        let json = body_json(response).await;
        assert_eq!(json["error"]["detail"], "no face detected");

        // No poll after a terminal status.
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(test.upstream.query_calls(), 1, "status {code}");
        assert_eq!(
            std::fs::read_dir(test.output_dir.path()).unwrap().count(),
            0,
            "nothing stored for status {code}"
        );
    }
}

// ---------------------------------------------------------------------------
// Input validation
// ---------------------------------------------------------------------------

#[tokio::test]
async fn missing_source_returns_400_without_calling_upstream() {
    let test = TestApp::spawn(lazy_pool()).await;
    let parts = [("target", "clip.mp4", "video/mp4", b"mp4-bytes".as_slice())];

    let response = post_multipart(test.app(), FACE_SWAP, &parts).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["error"], "Missing required 'source' file");
    assert_eq!(test.upstream.create_calls(), 0);
}

#[tokio::test]
async fn missing_target_returns_400_without_calling_upstream() {
    let test = TestApp::spawn(lazy_pool()).await;
    let parts = [("source", "face.jpg", "image/jpeg", b"jpeg-bytes".as_slice())];

    let response = post_multipart(test.app(), FACE_SWAP, &parts).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["error"], "Missing required 'target' file");
    assert_eq!(test.upstream.create_calls(), 0);
}

#[tokio::test]
async fn empty_file_counts_as_missing() {
    let test = TestApp::spawn(lazy_pool()).await;
    let parts = [
        ("source", "face.jpg", "image/jpeg", b"".as_slice()),
        ("target", "clip.mp4", "video/mp4", b"mp4-bytes".as_slice()),
    ];

    let response = post_multipart(test.app(), FACE_SWAP, &parts).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(test.upstream.create_calls(), 0);
}

#[tokio::test]
async fn oversized_upload_returns_413() {
    let test = TestApp::spawn_with(lazy_pool(), |config| config.max_upload_bytes = 1024).await;
    let big = vec![0u8; 4096];
    let parts = [
        ("source", "face.jpg", "image/jpeg", big.as_slice()),
        ("target", "clip.mp4", "video/mp4", b"mp4-bytes".as_slice()),
    ];

    let response = post_multipart(test.app(), FACE_SWAP, &parts).await;

    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(test.upstream.create_calls(), 0);
}

// ---------------------------------------------------------------------------
// Transport and limits
// ---------------------------------------------------------------------------

#[tokio::test]
async fn query_transport_error_returns_500_with_message() {
    let dead = closed_addr().await;
    let test = TestApp::spawn_with(lazy_pool(), |config| {
        config.fusion.query_url = format!("http://{dead}/query_task");
    })
    .await;

    let response = post_multipart(test.app(), FACE_SWAP, &face_swap_parts()).await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let json = body_json(response).await;
    assert_eq!(json["code"], "FUSION_FAILED");
    assert!(!json["error"].as_str().unwrap().is_empty());
    assert_eq!(test.upstream.create_calls(), 1);
}

#[tokio::test]
async fn create_failure_returns_sanitized_500() {
    let test = TestApp::spawn(lazy_pool()).await;
    test.upstream.fail_create(503);

    let response = post_multipart(test.app(), FACE_SWAP, &face_swap_parts()).await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let json = body_json(response).await;
    assert_eq!(json["code"], "INTERNAL_ERROR");
    assert_eq!(test.upstream.query_calls(), 0);
}

#[tokio::test]
async fn exhausted_attempts_return_504() {
    let test = TestApp::spawn_with(lazy_pool(), |config| {
        config.fusion.max_poll_attempts = Some(2);
    })
    .await;

    let response = post_multipart(test.app(), FACE_SWAP, &face_swap_parts()).await;

    assert_eq!(response.status(), StatusCode::GATEWAY_TIMEOUT);
    assert_eq!(test.upstream.query_calls(), 2);
}

#[tokio::test]
async fn shutdown_interrupts_a_running_face_swap() {
    let test = TestApp::spawn_with(lazy_pool(), |config| {
        config.fusion.max_poll_attempts = None;
    })
    .await;

    let shutdown = test.state.shutdown.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        shutdown.cancel();
    });

    let response = post_multipart(test.app(), FACE_SWAP, &face_swap_parts()).await;

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}
