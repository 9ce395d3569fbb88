//! Remote platform ports
//!
//! Commands talk to the platform only through [`PortalApi`], and `init` obtains OAuth
//! credentials only through [`OAuthExchange`]. [`http`] holds the reqwest-backed adapters.

pub mod http;

use std::{io, path::PathBuf};

use async_trait::async_trait;
use thiserror::Error;

use crate::{config::PortalEntry, prompt::PromptError};

/// Overrides the platform's API base URL
pub const API_BASE_URL_ENV: &str = "PORTAL_API_BASE_URL";

pub const DEFAULT_API_BASE_URL: &str = "https://api.hubapi.com";

/// Flags accepted by `filemanager fetch`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FetchOptions {
    pub include_archived: bool,
}

/// What a download wrote to disk
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DownloadSummary {
    /// Top-level file or folder that was written
    ///
    pub destination: PathBuf,

    pub files_written: usize,

    /// Archived files left out because `--include-archived` was not given
    ///
    pub archived_skipped: usize,
}

/// Port for the remote platform
///
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PortalApi: Send + Sync {
    /// Check that `entry`'s credentials are accepted by the platform
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] if the platform cannot be reached or rejects the credentials.
    async fn check_reachable(&self, entry: &PortalEntry) -> Result<(), ApiError>;

    /// Download the file or folder at `src` in the file manager into `dest`
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] on request failures, when `src` does not exist, or when local
    /// files cannot be written.
    async fn download_resource(
        &self,
        entry: &PortalEntry,
        src: &str,
        dest: &std::path::Path,
        options: &FetchOptions,
    ) -> Result<DownloadSummary, ApiError>;

    /// Delete a HubDB table
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] if the request fails or the platform refuses it.
    async fn delete_table(&self, entry: &PortalEntry, table_id: &str) -> Result<(), ApiError>;
}

/// Port for the interactive OAuth authorization flow
///
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait OAuthExchange: Send + Sync {
    /// Run the authorization flow and return the fully populated entry
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] if the user backs out or the token exchange fails.
    async fn exchange(&self) -> Result<PortalEntry, ApiError>;
}

#[derive(Error, Debug)]
pub enum ApiError {
    /// Carries no URL; query strings may hold an API key
    #[error("Request failed: {0}")]
    Http(#[source] reqwest::Error),

    #[error("{url} responded with {status}: {body}")]
    Status {
        status: u16,
        /// Request URL with the query string removed
        url: String,
        body: String,
    },

    #[error("{portal} is missing credentials: {}", missing.join(", "))]
    MissingCredentials {
        portal: String,
        missing: Vec<&'static str>,
    },

    #[error("'{0}' was not found in the file manager")]
    NotFound(String),

    #[error("Unable to write '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Invalid API base URL: {0}")]
    BaseUrl(String),

    /// A remote file or folder name that is not a single path component
    #[error("Refusing to write '{0}': not a plain file or folder name")]
    UnsafeName(String),

    #[error("The token response did not include a refresh token")]
    MissingRefreshToken,

    #[error(transparent)]
    Prompt(#[from] PromptError),

    #[error("Prompt task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl ApiError {
    pub(crate) fn http(source: reqwest::Error) -> Self {
        Self::Http(source.without_url())
    }

    /// Whether the platform answered and said no, as opposed to being unreachable
    #[must_use]
    pub fn is_rejection(&self) -> bool {
        matches!(self, Self::Status { status, .. } if (400..500).contains(status))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_credentials_message_lists_fields() {
        let err = ApiError::MissingCredentials {
            portal: "portal 'prod' (1, oauth)".to_string(),
            missing: vec!["auth.clientId", "auth.clientSecret"],
        };

        assert_eq!(
            err.to_string(),
            "portal 'prod' (1, oauth) is missing credentials: auth.clientId, auth.clientSecret"
        );
    }

    #[test]
    fn test_is_rejection() {
        let status = |status| ApiError::Status {
            status,
            url: "https://example.test".to_string(),
            body: String::new(),
        };

        assert!(status(401).is_rejection());
        assert!(status(404).is_rejection());
        assert!(!status(503).is_rejection());
        assert!(!ApiError::NotFound("x".to_string()).is_rejection());
    }
}
