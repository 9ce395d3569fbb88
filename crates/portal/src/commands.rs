//! Command declarations and the domain actions behind them
//!
//! Each command is described once by a [`CommandSpec`]. The CLI front end reads names and
//! descriptions from it, and usage tracking reads the event name from it.

pub mod filemanager;
pub mod hubdb;

/// Declarative description of a command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandSpec {
    /// Name the command is invoked by, within its group
    ///
    pub name: &'static str,

    /// Name reported to usage tracking
    ///
    pub usage_name: &'static str,

    pub description: &'static str,
}

pub const INIT: CommandSpec = CommandSpec {
    name: "init",
    usage_name: "init",
    description: "Initialize portal.config.yml for a portal",
};

pub const FILEMANAGER_FETCH: CommandSpec = CommandSpec {
    name: "fetch",
    usage_name: "filemanager-fetch",
    description: "Download a folder or file from the File Manager to your computer",
};

pub const HUBDB_DELETE: CommandSpec = CommandSpec {
    name: "delete",
    usage_name: "hubdb-delete",
    description: "Delete a HubDB table",
};

pub const CONFIG_VALIDATE: CommandSpec = CommandSpec {
    name: "validate",
    usage_name: "config-validate",
    description: "Check the config file for problems",
};

/// Every command, for help output and tests
pub const ALL: [&CommandSpec; 4] = [&INIT, &FILEMANAGER_FETCH, &HUBDB_DELETE, &CONFIG_VALIDATE];
