use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, error, trace, warn};

use crate::{
    fs::{FileSystem, FileSystemError},
    prompt::ApiKeyAnswers,
    vcs::VersionControl,
};

use super::{
    ALT_CONFIG_FILE_NAME, CONFIG_FILE_NAME, ConfigSearch, EnvConfigError, PortalConfig,
    PortalEntry,
};

/// Sole owner of the on-disk config document
///
/// Every read and write of the config file goes through here.
pub struct ConfigStore<F: FileSystem> {
    fs: F,
    search: ConfigSearch,
}

#[derive(Error, Debug)]
pub enum ConfigStoreError {
    #[error("The config file '{}' already exists", .0.display())]
    AlreadyExists(PathBuf),

    #[error("No config file found. Looked for portal.config.yml in: {searched}")]
    NotFound { searched: String },

    #[error("Unable to parse config file '{}': {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Unable to write {entry} to '{}': {source}", path.display())]
    Write {
        path: PathBuf,
        /// Redacted rendering of the entry being written
        entry: String,
        #[source]
        source: FileSystemError,
    },

    #[error("Unable to serialize the config: {0}")]
    Serialize(#[source] serde_yaml::Error),

    #[error(transparent)]
    Env(#[from] EnvConfigError),

    #[error(transparent)]
    FileSystem(#[from] FileSystemError),
}

impl<F: FileSystem> ConfigStore<F> {
    pub fn new(fs: F, search: ConfigSearch) -> Self {
        Self { fs, search }
    }

    #[must_use]
    pub fn search(&self) -> &ConfigSearch {
        &self.search
    }

    /// Path of the existing config file, if there is one
    ///
    #[must_use]
    pub fn locate(&self) -> Option<PathBuf> {
        if let Some(explicit) = self.search.explicit() {
            return self.fs.path_exists(explicit).then(|| explicit.clone());
        }

        for dir in self.search.directories() {
            let yml = dir.join(CONFIG_FILE_NAME);
            let yaml = dir.join(ALT_CONFIG_FILE_NAME);

            match (self.fs.path_exists(&yml), self.fs.path_exists(&yaml)) {
                (true, true) => {
                    warn!(
                        "Both {} and {} exist; using {}",
                        yml.display(),
                        yaml.display(),
                        yml.display()
                    );
                    return Some(yml);
                }
                (true, false) => return Some(yml),
                (false, true) => return Some(yaml),
                (false, false) => trace!(dir = %dir.display(), "no config file"),
            }
        }

        None
    }

    /// Where `init` writes a new config file
    #[must_use]
    pub fn default_path(&self) -> PathBuf {
        self.search.default_path()
    }

    /// Locate and load the config file
    ///
    /// # Errors
    ///
    /// Returns [`ConfigStoreError::NotFound`] when no file exists, otherwise see [`Self::load`].
    pub fn load_located(&self) -> Result<(PathBuf, PortalConfig), ConfigStoreError> {
        let path = self.locate().ok_or_else(|| ConfigStoreError::NotFound {
            searched: self.searched_locations(),
        })?;
        let config = self.load(&path)?;

        Ok((path, config))
    }

    /// Parse the config file at `path`
    ///
    /// # Errors
    ///
    /// Returns [`ConfigStoreError::Parse`] on malformed content, or a file system error if the
    /// file cannot be read.
    pub fn load(&self, path: &Path) -> Result<PortalConfig, ConfigStoreError> {
        let contents = self.fs.read_file(path)?;

        if contents.trim().is_empty() {
            return Ok(PortalConfig::default());
        }

        serde_yaml::from_str(&contents).map_err(|source| ConfigStoreError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Build the config from environment variables instead of a file
    ///
    /// # Errors
    ///
    /// Returns [`ConfigStoreError::Env`] when required variables are missing.
    pub fn load_from_env(&self) -> Result<PortalConfig, ConfigStoreError> {
        Ok(PortalConfig::from_env_lookup(|name| std::env::var(name).ok())?)
    }

    /// Validate `config`, logging each problem; `false` if any error was found
    pub fn validate(&self, config: &PortalConfig) -> bool {
        let result = config.validate();

        for issue in result.issues().errors() {
            error!(field = issue.field(), "{}", issue.message());
        }
        for issue in result.issues().warnings() {
            warn!(field = issue.field(), "{}", issue.message());
        }

        result.is_valid()
    }

    /// Create a config file with no portals at [`Self::default_path`]
    ///
    /// # Errors
    ///
    /// Returns a file system error if the path is occupied or unwritable.
    pub fn create_empty_placeholder(&self) -> Result<PathBuf, ConfigStoreError> {
        let path = self.default_path();
        let yaml =
            serde_yaml::to_string(&PortalConfig::default()).map_err(ConfigStoreError::Serialize)?;

        self.fs.create_new_file(&path, yaml.as_bytes())?;
        debug!(path = %path.display(), "created placeholder config file");

        Ok(path)
    }

    /// Create the placeholder and tie its removal to the returned guard
    ///
    /// # Errors
    ///
    /// See [`Self::create_empty_placeholder`].
    pub fn reserve_placeholder(&self) -> Result<PlaceholderGuard<'_, F>, ConfigStoreError> {
        let path = self.create_empty_placeholder()?;

        Ok(PlaceholderGuard { store: self, path })
    }

    /// Remove the config file at `path` if it still holds no portals
    ///
    /// Safe to call any number of times. Failures are logged, never returned.
    pub fn delete_empty_placeholder(&self, path: &Path) {
        if !self.fs.path_exists(path) {
            trace!(path = %path.display(), "placeholder already gone");
            return;
        }

        match self.load(path) {
            Ok(config) if config.portals.is_empty() => match self.fs.remove_file(path) {
                Ok(()) => debug!(path = %path.display(), "removed empty placeholder"),
                Err(e) => warn!("Unable to remove the empty config file '{}': {e}", path.display()),
            },
            Ok(_) => trace!(path = %path.display(), "config holds portals; keeping it"),
            Err(e) => warn!("Leaving '{}' in place: {e}", path.display()),
        }
    }

    /// Append a new API-key portal built from `answers` to the config at `path`
    ///
    /// # Errors
    ///
    /// Returns [`ConfigStoreError::Write`], carrying the path and the redacted entry, if the
    /// file cannot be written.
    pub fn write_new_api_key_entry(
        &self,
        path: &Path,
        answers: &ApiKeyAnswers,
    ) -> Result<PortalEntry, ConfigStoreError> {
        let entry = PortalEntry::api_key(&answers.name, answers.portal_id, &answers.api_key);
        self.append_entry(path, &entry)?;

        Ok(entry)
    }

    /// Store an OAuth portal in the config at `path`
    ///
    /// # Errors
    ///
    /// See [`Self::write_new_api_key_entry`].
    pub fn write_oauth_entry(&self, path: &Path, entry: &PortalEntry) -> Result<(), ConfigStoreError> {
        self.append_entry(path, entry)
    }

    /// Log a warning when the config file could be committed to git
    pub async fn warn_if_tracked_by_version_control<V: VersionControl>(&self, path: &Path, vcs: &V) {
        match vcs.is_ignored(path).await {
            Ok(Some(false)) => warn!(
                "The config file '{}' is inside a git repository and is not ignored. \
                 It holds credentials; add it to your .gitignore",
                path.display()
            ),
            Ok(_) => trace!(path = %path.display(), "config file is not tracked"),
            Err(e) => debug!("Skipping version control check: {e}"),
        }
    }

    fn append_entry(&self, path: &Path, entry: &PortalEntry) -> Result<(), ConfigStoreError> {
        let mut config = if self.fs.path_exists(path) {
            self.load(path)?
        } else {
            PortalConfig::default()
        };
        config.push_portal(entry.clone());

        let yaml = serde_yaml::to_string(&config).map_err(ConfigStoreError::Serialize)?;

        self.fs
            .write_file(path, yaml.as_bytes())
            .map_err(|source| ConfigStoreError::Write {
                path: path.to_path_buf(),
                entry: entry.to_string(),
                source,
            })?;
        debug!(path = %path.display(), ?entry, "wrote portal entry");

        Ok(())
    }

    fn searched_locations(&self) -> String {
        match self.search.explicit() {
            Some(explicit) => explicit.display().to_string(),
            None => self
                .search
                .directories()
                .iter()
                .map(|d| d.display().to_string())
                .collect::<Vec<_>>()
                .join(", "),
        }
    }
}

/// Scoped ownership of the placeholder config file
///
/// Dropping the guard removes the placeholder unless it has been populated, so every exit
/// path out of the OAuth setup (errors, early returns, unwinding) cleans up after itself.
#[must_use = "dropping the guard removes the placeholder immediately"]
pub struct PlaceholderGuard<'a, F: FileSystem> {
    store: &'a ConfigStore<F>,
    path: PathBuf,
}

impl<F: FileSystem> PlaceholderGuard<'_, F> {
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Remove the placeholder now instead of waiting for the drop
    pub fn cleanup_now(&self) {
        self.store.delete_empty_placeholder(&self.path);
    }
}

impl<F: FileSystem> Drop for PlaceholderGuard<'_, F> {
    fn drop(&mut self) {
        self.store.delete_empty_placeholder(&self.path);
    }
}
