//! The pre-flight sequence every portal command runs
//!
//! Load config, warn about version control, validate config, validate the selected portal,
//! resolve its id, track usage, then hand over to the command's [`DomainAction`]. Any
//! pre-flight failure short-circuits before the action runs.

use std::{collections::BTreeMap, path::PathBuf};

use async_trait::async_trait;
use thiserror::Error;
use tracing::debug;

use crate::{
    api::{ApiError, PortalApi},
    commands::CommandSpec,
    config::{
        PortalConfig, PortalEntry,
        store::{ConfigStore, ConfigStoreError},
    },
    fs::FileSystem,
    resolver::{self, PortalSelection, ResolveError},
    usage::UsageTracker,
    vcs::VersionControl,
};

/// Options shared by every portal command
///
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CommandOptions {
    /// `--config`
    ///
    pub config_path: Option<PathBuf>,

    pub portal: PortalSelection,

    /// `--use-env`
    ///
    pub use_env: bool,

    /// `--debug`
    ///
    pub debug: bool,
}

/// What a domain action gets to work with
#[derive(Debug, Clone)]
pub struct CommandContext {
    pub options: CommandOptions,
    /// `None` when credentials came from the environment
    pub config_path: Option<PathBuf>,
    pub portal_id: u64,
    pub entry: PortalEntry,
}

#[cfg(test)]
impl CommandContext {
    pub(crate) fn for_test(portal_id: u64) -> Self {
        Self {
            options: CommandOptions::default(),
            config_path: None,
            portal_id,
            entry: PortalEntry::api_key("test", portal_id, "test-api-key"),
        }
    }
}

/// The real work of a command, run once pre-flight has passed
#[async_trait]
pub trait DomainAction: Send + Sync {
    fn spec(&self) -> &'static CommandSpec;

    /// Extra fields for the usage event
    fn usage_metadata(&self) -> BTreeMap<String, String> {
        BTreeMap::new()
    }

    /// Run the action; the returned string is shown to the user
    ///
    /// # Errors
    ///
    /// Returns [`DomainActionError`], which the pipeline catches and reports.
    async fn run(
        &self,
        ctx: &CommandContext,
        api: &dyn PortalApi,
    ) -> Result<String, DomainActionError>;
}

/// A failed domain action
#[derive(Error, Debug)]
#[error("{message}")]
pub struct DomainActionError {
    message: String,
    #[source]
    source: ApiError,
    fatal: bool,
}

impl DomainActionError {
    pub fn new(message: impl Into<String>, source: ApiError) -> Self {
        Self {
            message: message.into(),
            source,
            fatal: false,
        }
    }

    /// Make the process exit nonzero
    #[must_use]
    pub fn fatal(mut self) -> Self {
        self.fatal = true;
        self
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    #[must_use]
    pub fn api_error(&self) -> &ApiError {
        &self.source
    }

    #[must_use]
    pub fn is_fatal(&self) -> bool {
        self.fatal
    }
}

#[derive(Error, Debug)]
pub enum PreflightError {
    #[error(transparent)]
    Config(#[from] ConfigStoreError),

    /// Causes were already logged by the config store
    #[error("The config file is invalid")]
    InvalidConfig { path: Option<PathBuf> },

    #[error(transparent)]
    Resolve(#[from] ResolveError),

    #[error("{portal} is missing credentials: {}", missing.join(", "))]
    IncompleteCredentials {
        portal: String,
        missing: Vec<&'static str>,
    },

    #[error("Unable to reach {portal}: {source}")]
    Unreachable {
        portal: String,
        #[source]
        source: ApiError,
    },
}

/// How a pipeline run ended
#[derive(Debug)]
pub enum PipelineOutcome {
    /// The action completed; carries its message
    Success(String),
    PreflightRejected(PreflightError),
    DomainFailure(DomainActionError),
}

impl PipelineOutcome {
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Success(_) => 0,
            Self::PreflightRejected(_) => 1,
            Self::DomainFailure(e) => i32::from(e.is_fatal()),
        }
    }
}

/// Runs portal commands through the shared pre-flight sequence
pub struct CommandPipeline<F: FileSystem, V: VersionControl, A: PortalApi> {
    store: ConfigStore<F>,
    vcs: V,
    api: A,
    tracker: UsageTracker,
}

impl<F: FileSystem, V: VersionControl, A: PortalApi> CommandPipeline<F, V, A> {
    pub fn new(store: ConfigStore<F>, vcs: V, api: A, tracker: UsageTracker) -> Self {
        Self {
            store,
            vcs,
            api,
            tracker,
        }
    }

    #[must_use]
    pub fn tracker(&self) -> &UsageTracker {
        &self.tracker
    }

    /// Run `action` for `options`
    pub async fn run(&self, options: &CommandOptions, action: &dyn DomainAction) -> PipelineOutcome {
        let spec = action.spec();
        debug!(command = spec.usage_name, ?options, "starting pipeline");

        let (config_path, config) = match self.load_config(options) {
            Ok(loaded) => loaded,
            Err(e) => return reject(e.into()),
        };

        if let Some(path) = &config_path {
            self.store
                .warn_if_tracked_by_version_control(path, &self.vcs)
                .await;
        }

        if !self.store.validate(&config) {
            return reject(PreflightError::InvalidConfig { path: config_path });
        }

        let entry = match self.validate_portal(&options.portal, &config).await {
            Ok(entry) => entry.clone(),
            Err(e) => return reject(e),
        };

        let portal_id = match resolver::resolve(&options.portal, &config) {
            Ok(id) => id,
            Err(e) => return reject(e.into()),
        };
        debug!(portal_id, "resolved portal");

        if config.allow_usage_tracking() {
            self.tracker
                .track(spec.usage_name, action.usage_metadata(), Some(portal_id));
        }

        let ctx = CommandContext {
            options: options.clone(),
            config_path,
            portal_id,
            entry,
        };

        match action.run(&ctx, &self.api).await {
            Ok(message) => {
                debug!(command = spec.usage_name, "domain action succeeded");
                PipelineOutcome::Success(message)
            }
            Err(e) => {
                debug!(command = spec.usage_name, error = ?e, "domain action failed");
                PipelineOutcome::DomainFailure(e)
            }
        }
    }

    fn load_config(
        &self,
        options: &CommandOptions,
    ) -> Result<(Option<PathBuf>, PortalConfig), ConfigStoreError> {
        if options.use_env {
            return Ok((None, self.store.load_from_env()?));
        }

        let (path, config) = self.store.load_located()?;
        debug!(path = %path.display(), "loaded config");

        Ok((Some(path), config))
    }

    async fn validate_portal<'c>(
        &self,
        selection: &PortalSelection,
        config: &'c PortalConfig,
    ) -> Result<&'c PortalEntry, PreflightError> {
        let entry = resolver::resolve_entry(selection, config)?;

        let missing = entry.missing_credentials();
        if !missing.is_empty() {
            return Err(PreflightError::IncompleteCredentials {
                portal: entry.to_string(),
                missing,
            });
        }

        self.api
            .check_reachable(entry)
            .await
            .map_err(|source| PreflightError::Unreachable {
                portal: entry.to_string(),
                source,
            })?;

        Ok(entry)
    }
}

fn reject(error: PreflightError) -> PipelineOutcome {
    debug!(error = ?error, "pre-flight rejected");
    PipelineOutcome::PreflightRejected(error)
}
