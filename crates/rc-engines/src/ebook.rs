//! E-book conversion through Calibre's `ebook-convert`.

use std::path::Path;
use std::time::Duration;

use rc_core::formats::EBOOK_TARGETS;
use rc_core::{Error, Result};

use crate::command::ToolCommand;
use crate::tools::ToolRegistry;

/// Convert an e-book to the target extension.
///
/// The target is checked against the fixed supported set before the tool is
/// invoked; `ebook-convert` infers both formats from the file extensions.
pub async fn convert_ebook(
    tools: &ToolRegistry,
    input: &Path,
    output: &Path,
    target: &str,
    timeout: Duration,
) -> Result<()> {
    if !EBOOK_TARGETS.contains(&target) {
        return Err(Error::validation(format!(
            "ebook conversion cannot target '{target}'"
        )));
    }

    let converter = tools.require("ebook-convert")?;
    ToolCommand::new(converter.path.clone())
        .arg(input.to_string_lossy())
        .arg(output.to_string_lossy())
        .timeout(timeout)
        .execute()
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const TIMEOUT: Duration = Duration::from_secs(30);

    #[tokio::test]
    async fn unsupported_target_rejected_before_tool_lookup() {
        // The registry would have caught this too; the engine must reject
        // it on its own even with no tools discovered.
        let err = convert_ebook(
            &ToolRegistry::empty(),
            Path::new("/tmp/in.epub"),
            Path::new("/tmp/out.docx"),
            "docx",
            TIMEOUT,
        )
        .await
        .unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[tokio::test]
    async fn missing_calibre_is_a_tool_error() {
        let err = convert_ebook(
            &ToolRegistry::empty(),
            Path::new("/tmp/in.epub"),
            Path::new("/tmp/out.mobi"),
            "mobi",
            TIMEOUT,
        )
        .await
        .unwrap_err();
        assert!(matches!(err, Error::Tool { .. }));
    }
}
