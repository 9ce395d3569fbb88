//! Credential bootstrap (`init`)
//!
//! Creates the config file with a first portal, either from an API key or through the OAuth
//! flow. The OAuth branch reserves the config path with an empty placeholder before the
//! exchange starts. A [`PlaceholderGuard`](crate::config::store::PlaceholderGuard) removes that
//! placeholder again on every path out of the branch that leaves it empty, including Ctrl-C
//! while the exchange waits on the user.

use std::{future::Future, path::PathBuf, sync::Arc};

use thiserror::Error;
use tracing::{debug, error};

use crate::{
    api::{ApiError, OAuthExchange},
    commands::INIT,
    config::{
        AuthMethod, PortalEntry,
        store::{ConfigStore, ConfigStoreError},
    },
    fs::FileSystem,
    prompt::{PromptError, Prompter},
    usage::{UsageTracker, metadata},
};

/// Exit status for a run ended by Ctrl-C
pub const INTERRUPTED_EXIT_CODE: i32 = 130;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InitOptions {
    /// `--api` / `--oauth`; prompt when `None`
    ///
    pub method: Option<AuthMethod>,
}

/// A successfully written config file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InitReport {
    pub path: PathBuf,
    pub method: AuthMethod,
    pub portal_id: Option<u64>,
}

#[derive(Error, Debug)]
pub enum InitError {
    #[error("The config file '{}' already exists.", .0.display())]
    AlreadyExists(PathBuf),

    #[error("No authentication method was selected")]
    NoAuthMethodSelected,

    #[error(transparent)]
    Prompt(#[from] PromptError),

    #[error(transparent)]
    Store(#[from] ConfigStoreError),

    #[error("OAuth setup failed: {0}")]
    OAuth(#[source] ApiError),

    #[error("OAuth setup was interrupted")]
    Interrupted,
}

impl InitError {
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Interrupted => INTERRUPTED_EXIT_CODE,
            _ => 1,
        }
    }
}

/// Resolves on Ctrl-C; never resolves if the handler cannot be installed
pub async fn ctrl_c() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        debug!("Unable to listen for Ctrl-C: {e}");
        std::future::pending::<()>().await;
    }
}

/// Runs `init`
pub struct AuthBootstrap<F: FileSystem, P: Prompter, O: OAuthExchange> {
    store: ConfigStore<F>,
    prompter: Arc<P>,
    exchange: O,
    tracker: UsageTracker,
}

impl<F, P, O> AuthBootstrap<F, P, O>
where
    F: FileSystem,
    P: Prompter + 'static,
    O: OAuthExchange,
{
    pub fn new(store: ConfigStore<F>, prompter: Arc<P>, exchange: O, tracker: UsageTracker) -> Self {
        Self {
            store,
            prompter,
            exchange,
            tracker,
        }
    }

    #[must_use]
    pub fn tracker(&self) -> &UsageTracker {
        &self.tracker
    }

    /// Run `init`, treating Ctrl-C as an interrupt
    ///
    /// # Errors
    ///
    /// See [`InitError`].
    pub async fn run(&self, options: &InitOptions) -> Result<InitReport, InitError> {
        self.run_with_interrupt(options, ctrl_c()).await
    }

    /// Run `init`, abandoning the OAuth exchange when `interrupt` resolves first
    ///
    /// # Errors
    ///
    /// See [`InitError`].
    pub async fn run_with_interrupt<I>(
        &self,
        options: &InitOptions,
        interrupt: I,
    ) -> Result<InitReport, InitError>
    where
        I: Future<Output = ()>,
    {
        if let Some(existing) = self.store.locate() {
            return Err(InitError::AlreadyExists(existing));
        }

        let method = match options.method {
            Some(method) => method,
            None => self
                .ask(|p| p.choose_auth_method())
                .await?
                .ok_or(InitError::NoAuthMethodSelected)?,
        };
        debug!(%method, "setting up credentials");

        match method {
            AuthMethod::ApiKey => self.api_key_setup().await,
            AuthMethod::OAuth => self.oauth_setup(interrupt).await,
        }
    }

    async fn api_key_setup(&self) -> Result<InitReport, InitError> {
        let answers = self.ask(|p| p.api_key_answers()).await?;
        let path = self.store.default_path();

        let result = self.store.write_new_api_key_entry(&path, &answers);
        if let Err(e) = &result {
            error!(path = %path.display(), name = %answers.name, portal_id = answers.portal_id, "{e}");
        }

        self.tracker.track(
            INIT.usage_name,
            metadata([("authType", AuthMethod::ApiKey.as_str())]),
            None,
        );

        let entry = result?;
        Ok(report(path, &entry))
    }

    async fn oauth_setup<I>(&self, interrupt: I) -> Result<InitReport, InitError>
    where
        I: Future<Output = ()>,
    {
        let result = self.oauth_exchange(interrupt).await;

        if let Err(e) = &result {
            error!(auth_type = AuthMethod::OAuth.as_str(), "{e}");
        }

        self.tracker.track(
            INIT.usage_name,
            metadata([("authType", AuthMethod::OAuth.as_str())]),
            None,
        );

        result
    }

    async fn oauth_exchange<I>(&self, interrupt: I) -> Result<InitReport, InitError>
    where
        I: Future<Output = ()>,
    {
        let guard = self.store.reserve_placeholder()?;

        let exchanged = tokio::select! {
            result = self.exchange.exchange() => result.map_err(InitError::OAuth),
            () = interrupt => Err(InitError::Interrupted),
        };

        let stored = exchanged.and_then(|entry| {
            self.store.write_oauth_entry(guard.path(), &entry)?;
            Ok(report(guard.path().to_path_buf(), &entry))
        });

        if stored.is_err() {
            guard.cleanup_now();
        }

        stored
    }

    async fn ask<T, Q>(&self, question: Q) -> Result<T, InitError>
    where
        T: Send + 'static,
        Q: FnOnce(&P) -> Result<T, PromptError> + Send + 'static,
    {
        let prompter = Arc::clone(&self.prompter);

        let answer = tokio::task::spawn_blocking(move || question(prompter.as_ref()))
            .await
            .map_err(|e| PromptError::Input(e.to_string()))??;

        Ok(answer)
    }
}

fn report(path: PathBuf, entry: &PortalEntry) -> InitReport {
    InitReport {
        path,
        method: entry.auth_method(),
        portal_id: entry.portal_id(),
    }
}
