//! Common test constants used across multiple test files.

/// Portal id of the primary fixture portal
pub const TEST_PORTAL_ID: u64 = 123;

/// Name of the primary fixture portal
pub const TEST_PORTAL_NAME: &str = "prod";

/// Portal id of the second fixture portal
pub const ALT_PORTAL_ID: u64 = 456;

/// Name of the second fixture portal
pub const ALT_PORTAL_NAME: &str = "dev";

/// API key written into fixture configs
pub const TEST_API_KEY: &str = "test-api-key";

/// File name the config store looks for first
pub const CONFIG_FILE_NAME: &str = portal::config::CONFIG_FILE_NAME;
