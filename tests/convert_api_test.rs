//! API integration tests for the convert endpoint and the read-only
//! surfaces (health, formats, tools).
//!
//! Runs a [`TestHarness`] server on a random port. Conversions are limited
//! to engines that need no external binaries (the in-process image and zip
//! engines), so the suite passes on a machine with none of the CLI tools
//! installed.

mod common;

use common::{batch_form, png_bytes, TestHarness};
use serde_json::json;

// ---------------------------------------------------------------------------
// Health, formats, tools
// ---------------------------------------------------------------------------

#[tokio::test]
async fn health_reports_uptime_and_memory() {
    let (_harness, addr) = TestHarness::with_server().await;

    let resp = reqwest::get(format!("http://{addr}/health")).await.unwrap();
    assert_eq!(resp.status(), 200);

    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["status"], "ok");
    assert!(body["uptime_secs"].is_u64());
    assert!(body["memory_bytes"].as_u64().unwrap() > 0);
}

#[tokio::test]
async fn formats_endpoint_lists_the_registry() {
    let (_harness, addr) = TestHarness::with_server().await;

    let resp = reqwest::get(format!("http://{addr}/api/formats"))
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let body: serde_json::Value = resp.json().await.unwrap();
    let conversions = body["conversions"].as_array().unwrap();

    let archive = conversions
        .iter()
        .find(|c| c["category"] == "archive")
        .expect("archive row present");
    let targets = archive["targets"].as_array().unwrap();
    assert_eq!(targets.len(), 2);
    assert!(targets.contains(&json!("zip")));
    assert!(targets.contains(&json!("7z")));

    // Preset-keyed rows list preset names, with the generic default
    // included.
    let device = conversions
        .iter()
        .find(|c| c["category"] == "video" && c["subcategory"] == "device")
        .expect("video/device row present");
    assert!(device["targets"].as_array().unwrap().contains(&json!("generic")));
}

#[tokio::test]
async fn tools_endpoint_reports_every_engine() {
    let (_harness, addr) = TestHarness::with_server().await;

    let resp = reqwest::get(format!("http://{addr}/api/tools"))
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let body: serde_json::Value = resp.json().await.unwrap();
    let names: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["name"].as_str().unwrap())
        .collect();
    for expected in ["ffmpeg", "soffice", "ebook-convert", "magick", "7z", "gs"] {
        assert!(names.contains(&expected), "{expected} missing from {names:?}");
    }
}

// ---------------------------------------------------------------------------
// Conversion happy paths
// ---------------------------------------------------------------------------

#[tokio::test]
async fn compress_png_to_jpeg_end_to_end() {
    let (harness, addr) = TestHarness::with_server().await;
    let client = reqwest::Client::new();

    let form = batch_form(
        vec![("photo.png", png_bytes())],
        json!([{"target": "jpg", "type": "image", "subSection": "compressor", "id": "c1"}]),
    );

    let resp = client
        .post(format!("http://{addr}/api/convert"))
        .multipart(form)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let results: serde_json::Value = resp.json().await.unwrap();
    let results = results.as_array().unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0]["id"], "c1");

    let name = results[0]["name"].as_str().unwrap();
    assert!(name.ends_with(".jpg"));
    assert_eq!(
        results[0]["path"].as_str().unwrap(),
        format!("/api/files/{name}")
    );

    // Staged input is gone; exactly one artifact remains until retrieved.
    assert_eq!(harness.upload_count(), 0);
    assert_eq!(harness.output_count(), 1);

    // The artifact must be a decodable JPEG.
    let artifact = harness.ctx.outputs.dir().join(name);
    let img = image::open(&artifact).unwrap();
    assert_eq!(img.width(), 16);
}

#[tokio::test]
async fn archive_batch_packs_a_zip() {
    let (harness, addr) = TestHarness::with_server().await;
    let client = reqwest::Client::new();

    let form = batch_form(
        vec![("notes.txt", b"some notes".to_vec())],
        json!([{"target": "zip", "type": "archive"}]),
    );

    let resp = client
        .post(format!("http://{addr}/api/convert"))
        .multipart(form)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let results: serde_json::Value = resp.json().await.unwrap();
    let name = results[0]["name"].as_str().unwrap();
    assert!(name.ends_with(".zip"));

    let artifact = harness.ctx.outputs.dir().join(name);
    let mut archive =
        zip::ZipArchive::new(std::fs::File::open(&artifact).unwrap()).unwrap();
    assert_eq!(archive.len(), 1);
    // The entry carries the client's original name, not the staged name.
    assert_eq!(archive.by_index(0).unwrap().name(), "notes.txt");
}

#[tokio::test]
async fn mixed_batch_converts_both_files() {
    let (harness, addr) = TestHarness::with_server().await;
    let client = reqwest::Client::new();

    let form = batch_form(
        vec![
            ("a.png", png_bytes()),
            ("b.txt", b"plain text".to_vec()),
        ],
        json!([
            {"target": "bmp", "type": "image", "id": "first"},
            {"target": "zip", "type": "archive", "id": "second"},
        ]),
    );

    let resp = client
        .post(format!("http://{addr}/api/convert"))
        .multipart(form)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let results: serde_json::Value = resp.json().await.unwrap();
    let results = results.as_array().unwrap();
    assert_eq!(results.len(), 2);
    assert_eq!(results[0]["id"], "first");
    assert_eq!(results[1]["id"], "second");

    assert_eq!(harness.upload_count(), 0);
    assert_eq!(harness.output_count(), 2);
}
