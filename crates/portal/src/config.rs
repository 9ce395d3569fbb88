pub mod store;
pub mod validate;

use std::{convert::Infallible, fmt, path::PathBuf, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::fs::FileSystem;

/// Name `init` gives the config file, and the first name searched for
pub const CONFIG_FILE_NAME: &str = "portal.config.yml";

/// Alternate spelling that is also picked up when searching
pub const ALT_CONFIG_FILE_NAME: &str = "portal.config.yaml";

/// Directory holding the config file; takes precedence over the directory walk
pub const CONFIG_DIR_ENV: &str = "PORTAL_CONFIG_DIR";

pub const PORTAL_ID_ENV: &str = "PORTAL_ID";
pub const API_KEY_ENV: &str = "PORTAL_API_KEY";
pub const CLIENT_ID_ENV: &str = "PORTAL_CLIENT_ID";
pub const CLIENT_SECRET_ENV: &str = "PORTAL_CLIENT_SECRET";
pub const REFRESH_TOKEN_ENV: &str = "PORTAL_REFRESH_TOKEN";

/// The local config document: every portal the user has credentials for
///
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortalConfig {
    /// Portal used when none is selected explicitly
    ///
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) default_portal: Option<PortalRef>,

    /// Opt-out switch for usage tracking
    ///
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) allow_usage_tracking: Option<bool>,

    #[serde(default)]
    pub(crate) portals: Vec<PortalEntry>,
}

impl PortalConfig {
    #[must_use]
    pub fn default_portal(&self) -> Option<&PortalRef> {
        self.default_portal.as_ref()
    }

    #[must_use]
    pub fn portals(&self) -> &[PortalEntry] {
        &self.portals
    }

    #[must_use]
    pub fn allow_usage_tracking(&self) -> bool {
        self.allow_usage_tracking.unwrap_or(true)
    }

    /// Entry with the given portal id
    #[must_use]
    pub fn portal(&self, portal_id: u64) -> Option<&PortalEntry> {
        self.portals
            .iter()
            .find(|p| p.portal_id == Some(portal_id))
    }

    /// Every entry `portal_ref` refers to, in document order
    pub fn matching<'a, 'r>(
        &'a self,
        portal_ref: &'r PortalRef,
    ) -> impl Iterator<Item = &'a PortalEntry> + use<'a, 'r> {
        self.portals.iter().filter(move |p| portal_ref.matches(p))
    }

    /// The entry `portal_ref` points at
    ///
    /// A numeric reference prefers the entry with that `portalId` over an entry merely named
    /// after the number.
    #[must_use]
    pub fn find(&self, portal_ref: &PortalRef) -> Option<&PortalEntry> {
        let by_id = match portal_ref {
            PortalRef::Id(id) => self.portal(*id),
            PortalRef::Name(_) => None,
        };

        by_id.or_else(|| self.matching(portal_ref).next())
    }

    /// Build a single-portal config from environment variables (`--use-env`)
    ///
    /// `PORTAL_ID` is required, plus either `PORTAL_API_KEY` or the three OAuth variables.
    ///
    /// # Errors
    ///
    /// Returns [`EnvConfigError`] when a variable is missing or `PORTAL_ID` is not numeric.
    pub fn from_env_lookup<L>(lookup: L) -> Result<Self, EnvConfigError>
    where
        L: Fn(&str) -> Option<String>,
    {
        let raw_id = lookup(PORTAL_ID_ENV).ok_or(EnvConfigError::Missing(PORTAL_ID_ENV))?;
        let portal_id = raw_id
            .trim()
            .parse::<u64>()
            .map_err(|_| EnvConfigError::InvalidPortalId(raw_id.clone()))?;

        let auth = if let Some(api_key) = lookup(API_KEY_ENV) {
            PortalAuth::ApiKey { api_key }
        } else {
            let require = |name: &'static str| lookup(name).ok_or(EnvConfigError::Missing(name));

            PortalAuth::OAuth {
                auth: OAuthCredentials {
                    client_id: require(CLIENT_ID_ENV)?,
                    client_secret: require(CLIENT_SECRET_ENV)?,
                    scopes: Vec::new(),
                    token_info: TokenInfo {
                        refresh_token: require(REFRESH_TOKEN_ENV)?,
                    },
                },
            }
        };

        Ok(Self {
            default_portal: Some(PortalRef::Id(portal_id)),
            allow_usage_tracking: None,
            portals: vec![PortalEntry {
                name: None,
                portal_id: Some(portal_id),
                auth,
            }],
        })
    }

    pub(crate) fn push_portal(&mut self, entry: PortalEntry) {
        if self.portals.is_empty() && self.default_portal.is_none() {
            self.default_portal = entry.reference();
        }
        self.portals.push(entry);
    }
}

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum EnvConfigError {
    #[error("Environment variable `{0}` is required when using --use-env")]
    Missing(&'static str),

    #[error("`PORTAL_ID` must be a numeric portal id, got `{0}`")]
    InvalidPortalId(String),
}

/// A reference to a portal by name or numeric id, as used by `defaultPortal` and `--portal`
///
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PortalRef {
    Id(u64),
    Name(String),
}

impl PortalRef {
    /// Whether `entry` is the portal this reference points at
    #[must_use]
    pub fn matches(&self, entry: &PortalEntry) -> bool {
        match self {
            Self::Id(id) => {
                entry.portal_id == Some(*id) || entry.name.as_deref() == Some(&id.to_string())
            }
            Self::Name(name) => {
                entry.name.as_deref() == Some(name.as_str())
                    || (entry.name.is_none()
                        && name.parse::<u64>().ok().is_some_and(|id| entry.portal_id == Some(id)))
            }
        }
    }
}

impl FromStr for PortalRef {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();

        Ok(match s.parse::<u64>() {
            Ok(id) => Self::Id(id),
            Err(_) => Self::Name(s.to_string()),
        })
    }
}

impl fmt::Display for PortalRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Id(id) => write!(f, "{id}"),
            Self::Name(name) => f.write_str(name),
        }
    }
}

/// One portal's credentials
///
#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortalEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) portal_id: Option<u64>,

    #[serde(flatten)]
    pub(crate) auth: PortalAuth,
}

impl PortalEntry {
    #[must_use]
    pub fn api_key(name: &str, portal_id: u64, api_key: &str) -> Self {
        Self {
            name: Some(name.to_string()),
            portal_id: Some(portal_id),
            auth: PortalAuth::ApiKey {
                api_key: api_key.to_string(),
            },
        }
    }

    #[must_use]
    pub fn oauth(name: &str, portal_id: u64, credentials: OAuthCredentials) -> Self {
        Self {
            name: Some(name.to_string()),
            portal_id: Some(portal_id),
            auth: PortalAuth::OAuth { auth: credentials },
        }
    }

    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    #[must_use]
    pub fn portal_id(&self) -> Option<u64> {
        self.portal_id
    }

    #[must_use]
    pub fn auth(&self) -> &PortalAuth {
        &self.auth
    }

    #[must_use]
    pub fn auth_method(&self) -> AuthMethod {
        match self.auth {
            PortalAuth::ApiKey { .. } => AuthMethod::ApiKey,
            PortalAuth::OAuth { .. } => AuthMethod::OAuth,
        }
    }

    /// How other parts of the document should refer to this entry
    #[must_use]
    pub fn reference(&self) -> Option<PortalRef> {
        self.name
            .clone()
            .map(PortalRef::Name)
            .or(self.portal_id.map(PortalRef::Id))
    }

    /// Names of the credential fields that are empty
    #[must_use]
    pub fn missing_credentials(&self) -> Vec<&'static str> {
        match &self.auth {
            PortalAuth::ApiKey { api_key } => {
                if api_key.trim().is_empty() {
                    vec!["apiKey"]
                } else {
                    Vec::new()
                }
            }
            PortalAuth::OAuth { auth } => [
                ("auth.clientId", &auth.client_id),
                ("auth.clientSecret", &auth.client_secret),
                ("auth.tokenInfo.refreshToken", &auth.token_info.refresh_token),
            ]
            .into_iter()
            .filter(|(_, value)| value.trim().is_empty())
            .map(|(field, _)| field)
            .collect(),
        }
    }
}

// Credentials are left out on purpose; entries end up in logs and error messages.
impl fmt::Debug for PortalEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PortalEntry")
            .field("name", &self.name)
            .field("portal_id", &self.portal_id)
            .field("auth_type", &self.auth_method())
            .finish_non_exhaustive()
    }
}

impl fmt::Display for PortalEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let id = self
            .portal_id
            .map_or_else(|| "<no id>".to_string(), |id| id.to_string());

        match &self.name {
            Some(name) => write!(f, "portal '{name}' ({id}, {})", self.auth_method()),
            None => write!(f, "portal {id} ({})", self.auth_method()),
        }
    }
}

#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "authType")]
pub enum PortalAuth {
    #[serde(rename = "api-key", alias = "apikey")]
    ApiKey {
        #[serde(rename = "apiKey", default)]
        api_key: String,
    },

    #[serde(rename = "oauth", alias = "oauth2")]
    OAuth {
        #[serde(default)]
        auth: OAuthCredentials,
    },
}

impl fmt::Debug for PortalAuth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ApiKey { .. } => f.write_str("ApiKey { api_key: <redacted> }"),
            Self::OAuth { auth } => f
                .debug_struct("OAuth")
                .field("client_id", &auth.client_id)
                .field("scopes", &auth.scopes)
                .finish_non_exhaustive(),
        }
    }
}

#[derive(Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OAuthCredentials {
    #[serde(default)]
    pub client_id: String,

    #[serde(default)]
    pub client_secret: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub scopes: Vec<String>,

    #[serde(default)]
    pub token_info: TokenInfo,
}

#[derive(Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenInfo {
    #[serde(default)]
    pub refresh_token: String,
}

/// The two ways `init` can set up credentials
///
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AuthMethod {
    ApiKey,
    OAuth,
}

impl AuthMethod {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ApiKey => "api-key",
            Self::OAuth => "oauth",
        }
    }
}

impl fmt::Display for AuthMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where to look for the config file, in order
///
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigSearch {
    /// `--config` override
    ///
    pub(crate) explicit: Option<PathBuf>,

    /// Directory from `PORTAL_CONFIG_DIR`
    ///
    pub(crate) override_dir: Option<PathBuf>,

    /// Directory the upward walk starts from
    ///
    pub(crate) start_dir: PathBuf,

    /// Per-user config directory
    ///
    pub(crate) user_dir: Option<PathBuf>,
}

impl ConfigSearch {
    /// Build the search from the process environment
    pub fn discover<F: FileSystem>(fs: &F, explicit: Option<PathBuf>) -> Self {
        let explicit = explicit.map(|p| fs.expand_path(&p));
        let override_dir = std::env::var_os(CONFIG_DIR_ENV)
            .filter(|v| !v.is_empty())
            .map(PathBuf::from);
        let start_dir = fs.current_dir().unwrap_or_else(|_| PathBuf::from("."));

        Self {
            explicit,
            override_dir,
            start_dir,
            user_dir: fs.config_dir().ok(),
        }
    }

    /// A search rooted in `start_dir` with nothing else configured
    #[must_use]
    pub fn in_dir(start_dir: impl Into<PathBuf>) -> Self {
        Self {
            start_dir: start_dir.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_explicit(mut self, path: impl Into<PathBuf>) -> Self {
        self.explicit = Some(path.into());
        self
    }

    #[must_use]
    pub fn with_override_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.override_dir = Some(dir.into());
        self
    }

    #[must_use]
    pub fn with_user_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.user_dir = Some(dir.into());
        self
    }

    #[must_use]
    pub fn explicit(&self) -> Option<&PathBuf> {
        self.explicit.as_ref()
    }

    /// Directories searched, in precedence order
    pub(crate) fn directories(&self) -> Vec<PathBuf> {
        let mut dirs = Vec::new();

        if let Some(dir) = &self.override_dir {
            dirs.push(dir.clone());
        }
        dirs.extend(self.start_dir.ancestors().map(PathBuf::from));
        if let Some(dir) = &self.user_dir {
            dirs.push(dir.clone());
        }

        dirs
    }

    /// Where a new config file goes
    #[must_use]
    pub fn default_path(&self) -> PathBuf {
        if let Some(path) = &self.explicit {
            return path.clone();
        }

        self.override_dir
            .as_ref()
            .unwrap_or(&self.start_dir)
            .join(CONFIG_FILE_NAME)
    }
}

/// Builder pattern for `PortalConfig` testing
///
#[derive(Default, Debug)]
pub struct PortalConfigBuilder {
    default_portal: Option<PortalRef>,
    allow_usage_tracking: Option<bool>,
    portals: Vec<PortalEntry>,
}

impl PortalConfigBuilder {
    #[must_use]
    pub fn portal(mut self, entry: PortalEntry) -> Self {
        self.portals.push(entry);
        self
    }

    #[must_use]
    pub fn api_key_portal(self, name: &str, portal_id: u64) -> Self {
        self.portal(PortalEntry::api_key(name, portal_id, "test-api-key"))
    }

    #[must_use]
    pub fn default_portal(mut self, portal_ref: PortalRef) -> Self {
        self.default_portal = Some(portal_ref);
        self
    }

    #[must_use]
    pub fn allow_usage_tracking(mut self, allow: bool) -> Self {
        self.allow_usage_tracking = Some(allow);
        self
    }

    #[must_use]
    pub fn build(self) -> PortalConfig {
        PortalConfig {
            default_portal: self.default_portal,
            allow_usage_tracking: self.allow_usage_tracking,
            portals: self.portals,
        }
    }
}
