//! Config files on disk for integration tests

use std::{
    fs,
    path::{Path, PathBuf},
};

use tempfile::TempDir;

use crate::constants::{
    ALT_PORTAL_ID, ALT_PORTAL_NAME, CONFIG_FILE_NAME, TEST_API_KEY, TEST_PORTAL_ID,
    TEST_PORTAL_NAME,
};

#[must_use]
pub fn single_portal_config_yaml() -> String {
    format!(
        "portals:
  - name: {TEST_PORTAL_NAME}
    portalId: {TEST_PORTAL_ID}
    authType: api-key
    apiKey: {TEST_API_KEY}
"
    )
}

#[must_use]
pub fn two_portal_config_yaml() -> String {
    format!(
        "portals:
  - name: {TEST_PORTAL_NAME}
    portalId: {TEST_PORTAL_ID}
    authType: api-key
    apiKey: {TEST_API_KEY}
  - name: {ALT_PORTAL_NAME}
    portalId: {ALT_PORTAL_ID}
    authType: api-key
    apiKey: {TEST_API_KEY}
"
    )
}

/// Two entries sharing one portal id; fails validation
#[must_use]
pub fn duplicate_id_config_yaml() -> String {
    format!(
        "portals:
  - name: {TEST_PORTAL_NAME}
    portalId: {TEST_PORTAL_ID}
    authType: api-key
    apiKey: {TEST_API_KEY}
  - name: {ALT_PORTAL_NAME}
    portalId: {TEST_PORTAL_ID}
    authType: api-key
    apiKey: {TEST_API_KEY}
"
    )
}

/// A temp directory used both as working directory and config directory
pub struct TestWorkspace {
    dir: TempDir,
}

impl TestWorkspace {
    /// An empty workspace with no config file
    ///
    /// # Panics
    ///
    /// Panics if the temp directory cannot be created.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            dir: tempfile::tempdir().expect("create temp dir"),
        }
    }

    /// A workspace whose `portal.config.yml` holds `yaml`
    ///
    /// # Panics
    ///
    /// Panics if the file cannot be written.
    #[must_use]
    pub fn with_config(yaml: &str) -> Self {
        let workspace = Self::empty();
        fs::write(workspace.config_path(), yaml).expect("write config");
        workspace
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    #[must_use]
    pub fn config_path(&self) -> PathBuf {
        self.dir.path().join(CONFIG_FILE_NAME)
    }

    /// Contents of the config file, if it exists
    #[must_use]
    pub fn read_config(&self) -> Option<String> {
        fs::read_to_string(self.config_path()).ok()
    }
}
