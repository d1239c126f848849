//! Audio and video transcoding through ffmpeg.
//!
//! All four video behaviors and the direct audio transcode converge on the
//! same invocation contract: input path, output path, codec arguments,
//! container inferred from the output extension.

use std::path::Path;
use std::time::Duration;

use rc_core::Result;

use crate::command::ToolCommand;
use crate::presets::EncodeSettings;
use crate::tools::ToolRegistry;

/// Direct audio transcode; ffmpeg picks the codec from the output
/// extension.
pub async fn transcode_audio(
    tools: &ToolRegistry,
    input: &Path,
    output: &Path,
    timeout: Duration,
) -> Result<()> {
    let ffmpeg = tools.require("ffmpeg")?;
    ToolCommand::new(ffmpeg.path.clone())
        .args(["-y", "-i"])
        .arg(input.to_string_lossy())
        .arg(output.to_string_lossy())
        .timeout(timeout)
        .execute()
        .await?;
    Ok(())
}

/// Fixed-quality re-encode into mp4.
pub async fn compress_video(
    tools: &ToolRegistry,
    input: &Path,
    output: &Path,
    crf: u32,
    preset: &str,
    timeout: Duration,
) -> Result<()> {
    let ffmpeg = tools.require("ffmpeg")?;
    ToolCommand::new(ffmpeg.path.clone())
        .args(["-y", "-i"])
        .arg(input.to_string_lossy())
        .args(["-c:v", "libx264", "-crf"])
        .arg(crf.to_string())
        .arg("-preset")
        .arg(preset)
        .args(["-c:a", "aac", "-movflags", "+faststart"])
        .arg(output.to_string_lossy())
        .timeout(timeout)
        .execute()
        .await?;
    Ok(())
}

/// Strip the video track and transcode the remaining audio to the target
/// extension.
pub async fn extract_audio(
    tools: &ToolRegistry,
    input: &Path,
    output: &Path,
    timeout: Duration,
) -> Result<()> {
    let ffmpeg = tools.require("ffmpeg")?;
    ToolCommand::new(ffmpeg.path.clone())
        .args(["-y", "-i"])
        .arg(input.to_string_lossy())
        .arg("-vn")
        .arg(output.to_string_lossy())
        .timeout(timeout)
        .execute()
        .await?;
    Ok(())
}

/// Scale and re-encode with a device or web-service preset.
pub async fn encode_with_preset(
    tools: &ToolRegistry,
    input: &Path,
    output: &Path,
    settings: &EncodeSettings,
    timeout: Duration,
) -> Result<()> {
    let ffmpeg = tools.require("ffmpeg")?;
    ToolCommand::new(ffmpeg.path.clone())
        .args(["-y", "-i"])
        .arg(input.to_string_lossy())
        .arg("-vf")
        .arg(format!(
            "scale={}:{}:force_original_aspect_ratio=decrease",
            settings.width, settings.height
        ))
        .args(["-c:v", "libx264", "-b:v"])
        .arg(settings.video_bitrate)
        .args(["-c:a", "aac", "-movflags", "+faststart"])
        .arg(output.to_string_lossy())
        .timeout(timeout)
        .execute()
        .await?;
    Ok(())
}
