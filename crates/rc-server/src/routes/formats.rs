//! Format matrix for clients building conversion menus.

use axum::Json;
use serde_json::json;

use rc_core::formats::{self, ConversionKind, VideoMode, REGISTRY};
use rc_engines::{DevicePreset, ServicePreset};

/// GET /api/formats
///
/// Serializes the registry: one row per legal (category, subcategory)
/// pair. The preset-keyed video rows list preset names instead of target
/// extensions.
pub async fn list_formats() -> Json<serde_json::Value> {
    let conversions: Vec<serde_json::Value> = REGISTRY
        .iter()
        .map(|entry| {
            let targets: Vec<&'static str> = match entry.targets {
                Some(targets) => targets.to_vec(),
                None => match entry.kind {
                    ConversionKind::Video(VideoMode::Device) => DevicePreset::names(),
                    ConversionKind::Video(VideoMode::WebService) => ServicePreset::names(),
                    _ => Vec::new(),
                },
            };
            json!({
                "category": entry.kind.category().as_str(),
                "subcategory": entry.kind.subcategory(),
                "targets": targets,
            })
        })
        .collect();

    Json(json!({
        "accepted_inputs": formats::ACCEPTED_INPUTS,
        "conversions": conversions,
    }))
}
