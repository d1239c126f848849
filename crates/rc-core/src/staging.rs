//! Scratch-area lifecycle for transient files.
//!
//! A [`Staging`] owns one scratch directory (uploads or produced outputs),
//! hands out collision-free paths inside it, and performs best-effort
//! deletion with a bounded retry for the transient-lock class of filesystem
//! errors. Cleanup failure is logged and swallowed: it must never fail a
//! conversion response that already succeeded.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{Error, Result};
use crate::ids::RequestId;

/// How many times a failed delete is attempted before giving up.
const RELEASE_ATTEMPTS: u32 = 3;

/// Delay between delete attempts.
const RELEASE_RETRY_DELAY: Duration = Duration::from_millis(150);

/// Manager for one scratch directory.
#[derive(Debug, Clone)]
pub struct Staging {
    dir: PathBuf,
}

impl Staging {
    /// Create a manager rooted at `dir`, creating the directory if needed.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    /// The scratch directory root.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Build a unique path for a file with the given original name.
    ///
    /// The name is sanitized and prefixed with a random identifier so that
    /// concurrent requests staging identically-named files never collide.
    /// The file itself is not created.
    pub fn stage(&self, original_name: &str) -> PathBuf {
        let name = sanitize_name(original_name);
        self.dir
            .join(format!("{}_{name}", RequestId::new().short()))
    }

    /// Resolve a bare artifact name to a path inside the scratch area.
    ///
    /// Rejects names with path separators or parent-directory components so
    /// callers cannot escape the scratch directory.
    pub fn resolve(&self, name: &str) -> Result<PathBuf> {
        if name.is_empty()
            || name.contains('/')
            || name.contains('\\')
            || name == "."
            || name == ".."
        {
            return Err(Error::validation(format!("invalid artifact name '{name}'")));
        }
        Ok(self.dir.join(name))
    }

    /// Best-effort delete of a transient file.
    ///
    /// Transient-lock errors (`ResourceBusy`, `PermissionDenied`) are
    /// retried up to [`RELEASE_ATTEMPTS`] times; any other error is logged
    /// and abandoned immediately. Releasing an already-absent path is not
    /// an error.
    pub async fn release(&self, path: &Path) {
        for attempt in 1..=RELEASE_ATTEMPTS {
            match tokio::fs::remove_file(path).await {
                Ok(()) => {
                    tracing::debug!("released {}", path.display());
                    return;
                }
                Err(e) if e.kind() == ErrorKind::NotFound => return,
                Err(e) if is_transient_lock(&e) && attempt < RELEASE_ATTEMPTS => {
                    tracing::debug!(
                        "transient error releasing {} (attempt {attempt}): {e}",
                        path.display()
                    );
                    tokio::time::sleep(RELEASE_RETRY_DELAY).await;
                }
                Err(e) => {
                    tracing::warn!("giving up on releasing {}: {e}", path.display());
                    return;
                }
            }
        }
    }

    /// Delete leftover files from a previous process.
    ///
    /// Returns the number of entries removed. Subdirectories are left
    /// alone; the scratch areas are flat by construction.
    pub fn sweep(&self) -> usize {
        let entries = match std::fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!("cannot sweep {}: {e}", self.dir.display());
                return 0;
            }
        };

        let mut removed = 0;
        for entry in entries.flatten() {
            let path = entry.path();
            if path.is_file() && std::fs::remove_file(&path).is_ok() {
                removed += 1;
            }
        }
        if removed > 0 {
            tracing::info!("swept {removed} leftover files from {}", self.dir.display());
        }
        removed
    }
}

/// Whether an I/O error belongs to the transient-lock class worth retrying.
///
/// Covers the "resource busy" family on Unix and the sharing-violation
/// surface on Windows (reported as `PermissionDenied`).
fn is_transient_lock(e: &std::io::Error) -> bool {
    matches!(
        e.kind(),
        ErrorKind::ResourceBusy | ErrorKind::PermissionDenied
    )
}

/// Reduce an arbitrary client-supplied filename to a safe flat name.
pub fn sanitize_name(original: &str) -> String {
    // Drop any directory components the client sent along.
    let base = original
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(original);

    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();

    if cleaned.trim_matches(['.', '_']).is_empty() {
        "upload".to_string()
    } else {
        cleaned
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn staging() -> (TempDir, Staging) {
        let tmp = TempDir::new().unwrap();
        let staging = Staging::new(tmp.path().join("scratch")).unwrap();
        (tmp, staging)
    }

    #[test]
    fn stage_paths_are_unique() {
        let (_tmp, staging) = staging();
        let a = staging.stage("photo.png");
        let b = staging.stage("photo.png");
        assert_ne!(a, b);
        assert!(a.starts_with(staging.dir()));
        assert!(a.to_string_lossy().ends_with("photo.png"));
    }

    #[test]
    fn stage_sanitizes_hostile_names() {
        let (_tmp, staging) = staging();
        let path = staging.stage("../../etc/passwd");
        assert!(path.starts_with(staging.dir()));
        assert!(!path.to_string_lossy().contains(".."));

        let path = staging.stage("week report?.pdf");
        assert!(path.to_string_lossy().ends_with("week_report_.pdf"));
    }

    #[test]
    fn stage_empty_name_falls_back() {
        let (_tmp, staging) = staging();
        let path = staging.stage("");
        assert!(path.file_name().unwrap().to_string_lossy().ends_with("upload"));
    }

    #[test]
    fn resolve_rejects_traversal() {
        let (_tmp, staging) = staging();
        assert!(staging.resolve("ok_name.pdf").is_ok());
        assert!(staging.resolve("../escape.pdf").is_err());
        assert!(staging.resolve("a/b.pdf").is_err());
        assert!(staging.resolve("a\\b.pdf").is_err());
        assert!(staging.resolve("").is_err());
    }

    #[tokio::test]
    async fn release_deletes_file() {
        let (_tmp, staging) = staging();
        let path = staging.stage("note.txt");
        std::fs::write(&path, b"hello").unwrap();
        staging.release(&path).await;
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn release_missing_path_is_not_an_error() {
        let (_tmp, staging) = staging();
        let path = staging.dir().join("never_created.bin");
        // Must not panic and must return promptly.
        staging.release(&path).await;
        staging.release(&path).await;
    }

    #[test]
    fn sweep_removes_leftovers() {
        let (_tmp, staging) = staging();
        std::fs::write(staging.dir().join("a.tmp"), b"x").unwrap();
        std::fs::write(staging.dir().join("b.tmp"), b"y").unwrap();
        assert_eq!(staging.sweep(), 2);
        assert_eq!(staging.sweep(), 0);
    }
}
