//! Version control inspection
//!
//! Used to warn when the credentials file could end up committed.

use std::{io, path::Path, process::Stdio};

use async_trait::async_trait;
use thiserror::Error;
use tokio::process::Command;
use tracing::trace;

/// Port for asking the version control system about a file
///
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait VersionControl: Send + Sync {
    /// Whether `path` is ignored by the repository it lives in
    ///
    /// Returns `Ok(None)` when `path` is not inside a repository at all.
    ///
    /// # Errors
    ///
    /// Returns [`VcsError`] if the version control tool could not be run or answered
    /// unexpectedly.
    async fn is_ignored(&self, path: &Path) -> Result<Option<bool>, VcsError>;
}

#[derive(Error, Debug)]
pub enum VcsError {
    #[error("Unable to run git: {0}")]
    Io(#[from] io::Error),

    #[error("git check-ignore exited unexpectedly (status {0:?})")]
    UnexpectedStatus(Option<i32>),
}

/// [`VersionControl`] backed by the `git` executable
#[derive(Debug, Clone, Copy, Default)]
pub struct GitCli;

#[async_trait]
impl VersionControl for GitCli {
    async fn is_ignored(&self, path: &Path) -> Result<Option<bool>, VcsError> {
        let (Some(dir), Some(file_name)) = (
            path.parent().filter(|p| !p.as_os_str().is_empty()),
            path.file_name(),
        ) else {
            return Ok(None);
        };

        let inside = Command::new("git")
            .arg("-C")
            .arg(dir)
            .args(["rev-parse", "--is-inside-work-tree"])
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await?;

        if !inside.success() {
            trace!(dir = %dir.display(), "not inside a git work tree");
            return Ok(None);
        }

        let status = Command::new("git")
            .arg("-C")
            .arg(dir)
            .args(["check-ignore", "-q"])
            .arg(file_name)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await?;

        // check-ignore: 0 = ignored, 1 = not ignored, anything else is a failure
        match status.code() {
            Some(0) => Ok(Some(true)),
            Some(1) => Ok(Some(false)),
            other => Err(VcsError::UnexpectedStatus(other)),
        }
    }
}
