//! Batch validation semantics over HTTP.
//!
//! Every rejection path must leave the upload scratch area exactly as it
//! found it and must never invoke the dispatcher.

mod common;

use common::{batch_form, png_bytes, TestHarness};
use serde_json::json;

async fn post_batch(
    addr: std::net::SocketAddr,
    files: Vec<(&str, Vec<u8>)>,
    formats: serde_json::Value,
) -> reqwest::Response {
    reqwest::Client::new()
        .post(format!("http://{addr}/api/convert"))
        .multipart(batch_form(files, formats))
        .send()
        .await
        .unwrap()
}

#[tokio::test]
async fn length_mismatch_is_rejected_before_dispatch() {
    let (harness, addr) = TestHarness::with_server().await;

    let resp = post_batch(
        addr,
        vec![("a.png", png_bytes()), ("b.png", png_bytes())],
        json!([{"target": "jpg", "type": "image", "subSection": "compressor"}]),
    )
    .await;

    assert_eq!(resp.status(), 400);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["code"], "validation_error");
    assert!(body["error"].as_str().unwrap().contains("descriptors"));

    assert_eq!(harness.ctx.dispatcher.invocations(), 0);
    assert_eq!(harness.upload_count(), 0);
    assert_eq!(harness.output_count(), 0);
}

#[tokio::test]
async fn batch_of_six_is_rejected_regardless_of_content() {
    let (harness, addr) = TestHarness::with_server().await;

    let files: Vec<(&str, Vec<u8>)> = vec![
        ("f0.png", png_bytes()),
        ("f1.png", png_bytes()),
        ("f2.png", png_bytes()),
        ("f3.png", png_bytes()),
        ("f4.png", png_bytes()),
        ("f5.png", png_bytes()),
    ];
    let descriptors: Vec<serde_json::Value> = (0..6)
        .map(|_| json!({"target": "jpg", "type": "image", "subSection": "compressor"}))
        .collect();

    let resp = post_batch(addr, files, json!(descriptors)).await;

    assert_eq!(resp.status(), 400);
    assert_eq!(harness.ctx.dispatcher.invocations(), 0);
    assert_eq!(harness.upload_count(), 0);
}

#[tokio::test]
async fn invalid_combination_fails_the_whole_batch() {
    let (harness, addr) = TestHarness::with_server().await;

    // Second descriptor requests rar, which the archive engine never
    // produces; the whole call must fail and the first file must not have
    // been converted.
    let resp = post_batch(
        addr,
        vec![("good.png", png_bytes()), ("bad.txt", b"text".to_vec())],
        json!([
            {"target": "jpg", "type": "image", "subSection": "compressor"},
            {"target": "rar", "type": "archive"},
        ]),
    )
    .await;

    assert_eq!(resp.status(), 400);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert!(
        body["error"].as_str().unwrap().contains("bad.txt"),
        "error must name the offending file: {body}"
    );

    assert_eq!(harness.ctx.dispatcher.invocations(), 0);
    assert_eq!(harness.upload_count(), 0);
    assert_eq!(harness.output_count(), 0);
}

#[tokio::test]
async fn unknown_category_is_rejected() {
    let (harness, addr) = TestHarness::with_server().await;

    let resp = post_batch(
        addr,
        vec![("a.png", png_bytes())],
        json!([{"target": "xlsx", "type": "spreadsheet"}]),
    )
    .await;

    assert_eq!(resp.status(), 400);
    assert_eq!(harness.upload_count(), 0);
}

#[tokio::test]
async fn unknown_subcategory_is_rejected() {
    let (harness, addr) = TestHarness::with_server().await;

    let resp = post_batch(
        addr,
        vec![("a.png", png_bytes())],
        json!([{"target": "jpg", "type": "image", "subSection": "rotate"}]),
    )
    .await;

    assert_eq!(resp.status(), 400);
    assert_eq!(harness.upload_count(), 0);
}

#[tokio::test]
async fn missing_formats_field_is_rejected() {
    let (harness, addr) = TestHarness::with_server().await;

    let form = reqwest::multipart::Form::new().part(
        "files",
        reqwest::multipart::Part::bytes(png_bytes()).file_name("a.png"),
    );
    let resp = reqwest::Client::new()
        .post(format!("http://{addr}/api/convert"))
        .multipart(form)
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 400);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert!(body["error"].as_str().unwrap().contains("formats"));
    assert_eq!(harness.upload_count(), 0);
}

#[tokio::test]
async fn malformed_formats_json_is_rejected() {
    let (harness, addr) = TestHarness::with_server().await;

    let form = reqwest::multipart::Form::new()
        .part(
            "files",
            reqwest::multipart::Part::bytes(png_bytes()).file_name("a.png"),
        )
        .text("formats", "{not json");
    let resp = reqwest::Client::new()
        .post(format!("http://{addr}/api/convert"))
        .multipart(form)
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 400);
    assert_eq!(harness.upload_count(), 0);
}

#[tokio::test]
async fn engine_failure_surfaces_as_bad_gateway_and_cleans_up() {
    let (harness, addr) = TestHarness::with_server().await;

    // This test asserts the failure path when ebook-convert is absent;
    // skip on machines that actually have Calibre installed.
    if calibre_installed() {
        return;
    }

    let resp = post_batch(
        addr,
        vec![("book.epub", b"not an epub".to_vec())],
        json!([{"target": "mobi", "type": "ebook"}]),
    )
    .await;

    assert_eq!(resp.status(), 502);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["code"], "tool_error");

    assert_eq!(harness.upload_count(), 0);
    assert_eq!(harness.output_count(), 0);
}

/// Whether Calibre's converter exists on this machine.
fn calibre_installed() -> bool {
    std::process::Command::new("ebook-convert")
        .arg("--version")
        .output()
        .is_ok()
}
