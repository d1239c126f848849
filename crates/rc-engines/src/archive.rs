//! Archive re-packing.
//!
//! zip output is produced in-process with the `zip` crate; 7z output goes
//! through the `7z` CLI. Only those two containers are supported -- the
//! registry rejects everything else up front and the engine re-checks.

use std::fs::File;
use std::io::{self, BufWriter};
use std::path::Path;
use std::time::Duration;

use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use rc_core::{Error, Result};

use crate::command::ToolCommand;
use crate::tools::ToolRegistry;

/// Re-pack a single staged file into the requested container.
///
/// `entry_name` is the name the file carries inside the archive (the
/// client's original upload name, not the staged scratch name).
pub async fn pack(
    tools: &ToolRegistry,
    input: &Path,
    output: &Path,
    target: &str,
    entry_name: &str,
    timeout: Duration,
) -> Result<()> {
    match target {
        "zip" => pack_zip(input, output, entry_name).await,
        "7z" => pack_7z(tools, input, output, timeout).await,
        other => Err(Error::validation(format!(
            "archive packing cannot target '{other}'; only zip and 7z are supported"
        ))),
    }
}

async fn pack_zip(input: &Path, output: &Path, entry_name: &str) -> Result<()> {
    let owned_in = input.to_path_buf();
    let owned_out = output.to_path_buf();
    let entry = entry_name.to_string();
    tokio::task::spawn_blocking(move || write_zip(&owned_in, &owned_out, &entry))
        .await
        .map_err(|e| Error::Internal(format!("zip task failed: {e}")))?
}

fn write_zip(input: &Path, output: &Path, entry_name: &str) -> Result<()> {
    let file = File::create(output)?;
    let mut writer = ZipWriter::new(BufWriter::new(file));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    writer
        .start_file(entry_name, options)
        .map_err(|e| Error::engine("zip", e.to_string()))?;
    io::copy(&mut File::open(input)?, &mut writer)?;
    writer
        .finish()
        .map_err(|e| Error::engine("zip", e.to_string()))?;
    Ok(())
}

async fn pack_7z(
    tools: &ToolRegistry,
    input: &Path,
    output: &Path,
    timeout: Duration,
) -> Result<()> {
    let seven_zip = tools.require("7z")?;
    ToolCommand::new(seven_zip.path.clone())
        .arg("a")
        .arg(output.to_string_lossy())
        .arg(input.to_string_lossy())
        .timeout(timeout)
        .execute()
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const TIMEOUT: Duration = Duration::from_secs(30);

    #[tokio::test]
    async fn zip_round_trip() {
        let tmp = TempDir::new().unwrap();
        let input = tmp.path().join("staged_notes.txt");
        std::fs::write(&input, b"some notes").unwrap();
        let output = tmp.path().join("notes.zip");

        pack(
            &ToolRegistry::empty(),
            &input,
            &output,
            "zip",
            "notes.txt",
            TIMEOUT,
        )
        .await
        .unwrap();

        let mut archive = zip::ZipArchive::new(File::open(&output).unwrap()).unwrap();
        assert_eq!(archive.len(), 1);
        let entry = archive.by_index(0).unwrap();
        assert_eq!(entry.name(), "notes.txt");
    }

    #[tokio::test]
    async fn rar_target_rejected() {
        let tmp = TempDir::new().unwrap();
        let input = tmp.path().join("a.txt");
        std::fs::write(&input, b"x").unwrap();

        let err = pack(
            &ToolRegistry::empty(),
            &input,
            &tmp.path().join("a.rar"),
            "rar",
            "a.txt",
            TIMEOUT,
        )
        .await
        .unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[tokio::test]
    async fn missing_7z_is_a_tool_error() {
        let tmp = TempDir::new().unwrap();
        let input = tmp.path().join("a.txt");
        std::fs::write(&input, b"x").unwrap();

        let err = pack(
            &ToolRegistry::empty(),
            &input,
            &tmp.path().join("a.7z"),
            "7z",
            "a.txt",
            TIMEOUT,
        )
        .await
        .unwrap_err();
        assert!(matches!(err, Error::Tool { .. }));
    }
}
