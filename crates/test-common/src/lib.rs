//! Common test utilities shared across the portal crates.
//!
//! Config fixtures, temp-dir workspaces and portal builders used by the integration tests.

pub mod config;
pub mod constants;
pub mod fixtures;

pub use config::{single_portal_config, two_portal_config, two_portal_config_with_default};
pub use constants::*;
pub use fixtures::{
    TestWorkspace, duplicate_id_config_yaml, single_portal_config_yaml, two_portal_config_yaml,
};
