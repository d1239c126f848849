//! Document and PDF conversion through LibreOffice and Ghostscript.
//!
//! LibreOffice runs headless with a scoped temporary working directory as
//! its `--outdir`; the directory is removed when the [`TempDir`] drops, so
//! intermediate files never outlive the call whether it succeeds or fails.

use std::path::Path;
use std::time::Duration;

use tempfile::TempDir;

use rc_core::{Error, Result};

use crate::command::ToolCommand;
use crate::tools::ToolRegistry;

/// Targets the standalone document category accepts. This list is checked
/// by the engine itself, independent of the format registry.
pub const DOCUMENT_ALLOWED: &[&str] = &["pdf", "docx", "odt", "rtf", "txt", "html"];

/// One office-document conversion for the document category.
///
/// Re-validates the target against [`DOCUMENT_ALLOWED`] before invoking
/// LibreOffice.
pub async fn convert_document(
    tools: &ToolRegistry,
    input: &Path,
    output: &Path,
    target: &str,
    timeout: Duration,
) -> Result<()> {
    if !DOCUMENT_ALLOWED.contains(&target) {
        return Err(Error::validation(format!(
            "document conversion cannot target '{target}'"
        )));
    }
    office_convert(tools, input, output, target, timeout).await
}

/// Round-trip a file through LibreOffice into the target extension.
///
/// LibreOffice writes `{input_stem}.{target}` into the scoped outdir; the
/// produced file is copied to `output` and the outdir is removed in every
/// exit path.
pub async fn office_convert(
    tools: &ToolRegistry,
    input: &Path,
    output: &Path,
    target: &str,
    timeout: Duration,
) -> Result<()> {
    let soffice = tools.require("soffice")?;
    let workdir = TempDir::new().map_err(Error::from)?;

    ToolCommand::new(soffice.path.clone())
        .args(["--headless", "--norestore", "--convert-to"])
        .arg(target)
        .arg("--outdir")
        .arg(workdir.path().to_string_lossy())
        .arg(input.to_string_lossy())
        .timeout(timeout)
        .execute()
        .await?;

    let stem = input
        .file_stem()
        .ok_or_else(|| Error::validation(format!("input has no file stem: {}", input.display())))?
        .to_string_lossy();
    let produced = workdir.path().join(format!("{stem}.{target}"));

    if !produced.exists() {
        // soffice exits zero on some unconvertible inputs and simply writes
        // nothing; surface that as a tool failure.
        return Err(Error::tool(
            "soffice",
            format!("produced no {target} output for {}", input.display()),
        ));
    }

    std::fs::copy(&produced, output)?;
    Ok(())
}

/// Apply the fixed Ghostscript document-optimization profile to a PDF.
pub async fn compress_pdf(
    tools: &ToolRegistry,
    input: &Path,
    output: &Path,
    timeout: Duration,
) -> Result<()> {
    let gs = tools.require("gs")?;
    ToolCommand::new(gs.path.clone())
        .args([
            "-sDEVICE=pdfwrite",
            "-dCompatibilityLevel=1.4",
            "-dPDFSETTINGS=/ebook",
            "-dNOPAUSE",
            "-dBATCH",
            "-dQUIET",
        ])
        .arg(format!("-sOutputFile={}", output.display()))
        .arg(input.to_string_lossy())
        .timeout(timeout)
        .execute()
        .await?;
    Ok(())
}

/// Rasterize only the first page of a PDF at the given resolution.
pub async fn pdf_first_page(
    tools: &ToolRegistry,
    input: &Path,
    output: &Path,
    target: &str,
    dpi: u32,
    timeout: Duration,
) -> Result<()> {
    let device = match target {
        "png" => "png16m",
        "jpg" | "jpeg" => "jpeg",
        other => {
            return Err(Error::validation(format!(
                "pdf rasterization cannot target '{other}'"
            )))
        }
    };

    let gs = tools.require("gs")?;
    ToolCommand::new(gs.path.clone())
        .arg(format!("-sDEVICE={device}"))
        .arg(format!("-r{dpi}"))
        .args([
            "-dFirstPage=1",
            "-dLastPage=1",
            "-dNOPAUSE",
            "-dBATCH",
            "-dQUIET",
        ])
        .arg(format!("-sOutputFile={}", output.display()))
        .arg(input.to_string_lossy())
        .timeout(timeout)
        .execute()
        .await?;
    Ok(())
}
