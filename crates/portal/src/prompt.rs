//! Interactive prompt port
//!
//! The core asks questions through [`Prompter`]; the CLI answers them with a terminal
//! implementation and tests answer them with mocks.

use std::fmt;

use thiserror::Error;

use crate::config::AuthMethod;

/// Answers collected for an API-key portal
#[derive(Clone, PartialEq)]
pub struct ApiKeyAnswers {
    pub name: String,
    pub portal_id: u64,
    pub api_key: String,
}

impl fmt::Debug for ApiKeyAnswers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiKeyAnswers")
            .field("name", &self.name)
            .field("portal_id", &self.portal_id)
            .finish_non_exhaustive()
    }
}

/// Answers collected before the OAuth authorization step
#[derive(Clone, PartialEq)]
pub struct OAuthAnswers {
    pub name: String,
    pub portal_id: u64,
    pub client_id: String,
    pub client_secret: String,
    pub scopes: Vec<String>,
}

impl fmt::Debug for OAuthAnswers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OAuthAnswers")
            .field("name", &self.name)
            .field("portal_id", &self.portal_id)
            .field("client_id", &self.client_id)
            .field("scopes", &self.scopes)
            .finish_non_exhaustive()
    }
}

/// Port for asking the user questions
///
#[cfg_attr(test, mockall::automock)]
pub trait Prompter: Send + Sync {
    /// Ask which authentication method to set up; `None` when the user backs out
    ///
    /// # Errors
    ///
    /// Returns [`PromptError`] if the terminal cannot be read.
    fn choose_auth_method(&self) -> Result<Option<AuthMethod>, PromptError>;

    /// Ask for portal name, portal id and API key
    ///
    /// # Errors
    ///
    /// Returns [`PromptError`] if the terminal cannot be read.
    fn api_key_answers(&self) -> Result<ApiKeyAnswers, PromptError>;

    /// Ask for portal name, portal id and OAuth app credentials
    ///
    /// # Errors
    ///
    /// Returns [`PromptError`] if the terminal cannot be read.
    fn oauth_answers(&self) -> Result<OAuthAnswers, PromptError>;

    /// Show `authorize_url` and ask for the authorization code it hands back
    ///
    /// # Errors
    ///
    /// Returns [`PromptError`] if the terminal cannot be read.
    fn authorization_code(&self, authorize_url: &str) -> Result<String, PromptError>;
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PromptError {
    #[error("Failed to read user input: {0}")]
    Input(String),

    #[error("Input was cancelled")]
    Cancelled,
}
