//! Active portal selection

use thiserror::Error;
use tracing::trace;

use crate::config::{PORTAL_ID_ENV, PortalConfig, PortalEntry, PortalRef};

/// Portal requested by the user, before it is checked against the config
///
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PortalSelection {
    /// `--portal` / `--account`
    ///
    pub explicit: Option<PortalRef>,

    /// `PORTAL_ID`
    ///
    pub env: Option<PortalRef>,
}

impl PortalSelection {
    /// Combine the `--portal` flag with the `PORTAL_ID` environment override
    #[must_use]
    pub fn from_env(explicit: Option<PortalRef>) -> Self {
        let env = std::env::var(PORTAL_ID_ENV)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .and_then(|v| v.parse().ok());

        Self { explicit, env }
    }

    /// The reference that wins, if the user asked for one
    #[must_use]
    pub fn requested(&self) -> Option<&PortalRef> {
        self.explicit.as_ref().or(self.env.as_ref())
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    #[error(
        "{count} portals are configured and none is the default. \
         Pass --portal <name|id> or set defaultPortal in the config file"
    )]
    Ambiguous { count: usize },

    #[error("No configured portal matches '{0}'")]
    NotFound(PortalRef),

    #[error("The selected portal '{0}' has no portalId")]
    MissingPortalId(String),

    #[error("No portals are configured. Run `portal-cli init` first")]
    NoPortals,
}

/// Pick the entry a command should run against
///
/// Precedence is explicit selection, then `PORTAL_ID`, then the sole entry, then the default
/// marker. The config is never modified.
///
/// # Errors
///
/// See [`ResolveError`].
pub fn resolve_entry<'a>(
    selection: &PortalSelection,
    config: &'a PortalConfig,
) -> Result<&'a PortalEntry, ResolveError> {
    if let Some(requested) = selection.requested() {
        trace!(%requested, "resolving requested portal");
        return config
            .find(requested)
            .ok_or_else(|| ResolveError::NotFound(requested.clone()));
    }

    match config.portals() {
        [] => Err(ResolveError::NoPortals),
        [sole] => Ok(sole),
        many => match config.default_portal() {
            Some(default) => config
                .find(default)
                .ok_or_else(|| ResolveError::NotFound(default.clone())),
            None => Err(ResolveError::Ambiguous { count: many.len() }),
        },
    }
}

/// Numeric id of the portal a command should run against
///
/// # Errors
///
/// See [`resolve_entry`]; additionally [`ResolveError::MissingPortalId`] when the chosen entry
/// carries no id.
pub fn resolve(selection: &PortalSelection, config: &PortalConfig) -> Result<u64, ResolveError> {
    let entry = resolve_entry(selection, config)?;

    entry
        .portal_id()
        .ok_or_else(|| ResolveError::MissingPortalId(entry.to_string()))
}
