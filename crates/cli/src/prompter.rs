use dialoguer::{Input, Password, Select, theme::SimpleTheme};
use portal::{
    config::AuthMethod,
    prompt::{ApiKeyAnswers, OAuthAnswers, PromptError, Prompter},
};

use crate::terminal_progress_reporter::TerminalProgressReporter;

const DEFAULT_SCOPES: &str = "content";

fn prompt_error(e: dialoguer::Error) -> PromptError {
    match e {
        dialoguer::Error::IO(io) if io.kind() == std::io::ErrorKind::Interrupted => {
            PromptError::Cancelled
        }
        dialoguer::Error::IO(io) => PromptError::Input(io.to_string()),
    }
}

fn not_blank(input: &String) -> Result<(), &'static str> {
    if input.trim().is_empty() {
        Err("A value is required")
    } else {
        Ok(())
    }
}

/// [`Prompter`] that asks on the terminal
#[derive(Debug, Clone, Copy)]
pub(crate) struct DialoguerPrompter {
    reporter: TerminalProgressReporter,
}

impl DialoguerPrompter {
    pub(crate) fn new(reporter: TerminalProgressReporter) -> Self {
        Self { reporter }
    }

    fn portal_name(&self) -> Result<String, PromptError> {
        Input::<String>::with_theme(&SimpleTheme)
            .with_prompt("Enter a unique name to reference your portal")
            .validate_with(not_blank)
            .interact_text()
            .map(|s| s.trim().to_string())
            .map_err(prompt_error)
    }

    fn portal_id(&self) -> Result<u64, PromptError> {
        Input::<u64>::with_theme(&SimpleTheme)
            .with_prompt("Enter the portal ID")
            .interact_text()
            .map_err(prompt_error)
    }

    fn secret(&self, prompt: &str) -> Result<String, PromptError> {
        Password::with_theme(&SimpleTheme)
            .with_prompt(prompt)
            .allow_empty_password(false)
            .interact()
            .map(|s| s.trim().to_string())
            .map_err(prompt_error)
    }
}

impl Prompter for DialoguerPrompter {
    fn choose_auth_method(&self) -> Result<Option<AuthMethod>, PromptError> {
        let methods = [AuthMethod::ApiKey, AuthMethod::OAuth];
        let labels = ["API key", "OAuth2"];

        let selection = Select::with_theme(&SimpleTheme)
            .with_prompt("Choose authentication method")
            .items(&labels)
            .default(0)
            .interact_opt()
            .map_err(prompt_error)?;

        Ok(selection.and_then(|i| methods.get(i).copied()))
    }

    fn api_key_answers(&self) -> Result<ApiKeyAnswers, PromptError> {
        Ok(ApiKeyAnswers {
            name: self.portal_name()?,
            portal_id: self.portal_id()?,
            api_key: self.secret("Enter the API key for your portal")?,
        })
    }

    fn oauth_answers(&self) -> Result<OAuthAnswers, PromptError> {
        let name = self.portal_name()?;
        let portal_id = self.portal_id()?;
        let client_id = Input::<String>::with_theme(&SimpleTheme)
            .with_prompt("Enter your OAuth2 client ID")
            .validate_with(not_blank)
            .interact_text()
            .map_err(prompt_error)?;
        let client_secret = self.secret("Enter your OAuth2 client secret")?;
        let scopes = Input::<String>::with_theme(&SimpleTheme)
            .with_prompt("Scopes (space separated)")
            .default(DEFAULT_SCOPES.to_string())
            .interact_text()
            .map_err(prompt_error)?;

        Ok(OAuthAnswers {
            name,
            portal_id,
            client_id: client_id.trim().to_string(),
            client_secret,
            scopes: scopes.split_whitespace().map(ToString::to_string).collect(),
        })
    }

    fn authorization_code(&self, authorize_url: &str) -> Result<String, PromptError> {
        self.reporter
            .report_info("Open this URL in your browser and approve access:");
        TerminalProgressReporter::report(2, authorize_url);

        Input::<String>::with_theme(&SimpleTheme)
            .with_prompt("Paste the authorization code from the redirect URL")
            .validate_with(not_blank)
            .interact_text()
            .map(|s| s.trim().to_string())
            .map_err(prompt_error)
    }
}
