//! In-memory `PortalConfig` builders

use portal::config::{PortalConfig, PortalConfigBuilder, PortalEntry, PortalRef};

use crate::constants::{
    ALT_PORTAL_ID, ALT_PORTAL_NAME, TEST_API_KEY, TEST_PORTAL_ID, TEST_PORTAL_NAME,
};

#[must_use]
pub fn single_portal_config() -> PortalConfig {
    PortalConfigBuilder::default()
        .portal(PortalEntry::api_key(
            TEST_PORTAL_NAME,
            TEST_PORTAL_ID,
            TEST_API_KEY,
        ))
        .build()
}

/// Two portals and no default, so resolution needs an explicit selection
#[must_use]
pub fn two_portal_config() -> PortalConfig {
    PortalConfigBuilder::default()
        .portal(PortalEntry::api_key(
            TEST_PORTAL_NAME,
            TEST_PORTAL_ID,
            TEST_API_KEY,
        ))
        .portal(PortalEntry::api_key(ALT_PORTAL_NAME, ALT_PORTAL_ID, TEST_API_KEY))
        .build()
}

#[must_use]
pub fn two_portal_config_with_default(default: PortalRef) -> PortalConfig {
    PortalConfigBuilder::default()
        .portal(PortalEntry::api_key(
            TEST_PORTAL_NAME,
            TEST_PORTAL_ID,
            TEST_API_KEY,
        ))
        .portal(PortalEntry::api_key(ALT_PORTAL_NAME, ALT_PORTAL_ID, TEST_API_KEY))
        .default_portal(default)
        .build()
}
