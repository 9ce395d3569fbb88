// src/cli.rs
use std::path::PathBuf;

use clap::{ArgGroup, Args, Parser, Subcommand};
use portal::commands::{CONFIG_VALIDATE, FILEMANAGER_FETCH, HUBDB_DELETE, INIT};

/// portal-cli - Manage files, tables and credentials for your portals
///
#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
pub struct ClapCli {
    /// Path to the config file to use instead of searching for one
    ///
    #[clap(long, short = 'c', global = true)]
    pub(crate) config: Option<PathBuf>,

    /// Portal to run against, by name or id
    ///
    #[clap(long, visible_alias = "account", global = true)]
    pub(crate) portal: Option<String>,

    /// Read credentials from PORTAL_* environment variables instead of the config file
    ///
    #[clap(long, global = true, default_value_t = false)]
    pub(crate) use_env: bool,

    /// Show debug output
    ///
    #[clap(long, short = 'd', global = true, default_value_t = false)]
    pub(crate) debug: bool,

    /// Disable colored output
    ///
    #[clap(long, global = true, default_value_t = false)]
    pub(crate) no_color: bool,

    /// Subcommand to execute
    ///
    #[clap(subcommand)]
    pub(crate) command: ClapCommands,
}

#[derive(Subcommand, Debug, Clone)]
pub(crate) enum ClapCommands {
    #[clap(name = INIT.name, about = INIT.description)]
    Init(InitArgs),

    /// File manager commands
    ///
    Filemanager(FilemanagerCommands),

    /// HubDB commands
    ///
    Hubdb(HubdbCommands),

    /// Config file commands
    ///
    Config(ConfigCommands),
}

#[derive(Args, Debug, Clone)]
#[clap(group(ArgGroup::new("auth_method").args(["api", "oauth"])))]
pub(crate) struct InitArgs {
    /// Set up the portal with an API key
    #[clap(long)]
    pub(crate) api: bool,

    /// Set up the portal with OAuth
    #[clap(long)]
    pub(crate) oauth: bool,
}

#[derive(Args, Debug, Clone)]
pub(crate) struct FilemanagerCommands {
    #[clap(subcommand)]
    pub(crate) command: FilemanagerSubcommands,
}

#[derive(Subcommand, Debug, Clone)]
pub(crate) enum FilemanagerSubcommands {
    #[clap(name = FILEMANAGER_FETCH.name, about = FILEMANAGER_FETCH.description)]
    Fetch {
        /// Path in the file manager
        src: String,

        /// Local directory to place the files in, relative to the current directory
        dest: Option<String>,

        /// Include files that have been marked as archived
        #[clap(long, short = 'i')]
        include_archived: bool,
    },
}

#[derive(Args, Debug, Clone)]
pub(crate) struct HubdbCommands {
    #[clap(subcommand)]
    pub(crate) command: HubdbSubcommands,
}

#[derive(Subcommand, Debug, Clone)]
pub(crate) enum HubdbSubcommands {
    #[clap(name = HUBDB_DELETE.name, about = HUBDB_DELETE.description)]
    Delete {
        /// HubDB table id
        table_id: String,
    },
}

#[derive(Args, Debug, Clone)]
pub(crate) struct ConfigCommands {
    #[clap(subcommand)]
    pub(crate) command: ConfigSubcommands,
}

#[derive(Subcommand, Debug, Clone)]
pub(crate) enum ConfigSubcommands {
    #[clap(name = CONFIG_VALIDATE.name, about = CONFIG_VALIDATE.description)]
    Validate,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_and_oauth_conflict() {
        let result = ClapCli::try_parse_from(["portal-cli", "init", "--api", "--oauth"]);

        assert!(result.is_err());
    }

    #[test]
    fn test_account_alias() {
        let cli = ClapCli::try_parse_from(["portal-cli", "--account", "prod", "hubdb", "delete", "7"])
            .unwrap();

        assert_eq!(cli.portal.as_deref(), Some("prod"));
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = ClapCli::try_parse_from([
            "portal-cli",
            "filemanager",
            "fetch",
            "images",
            "out",
            "--include-archived",
            "--portal",
            "123",
            "--debug",
        ])
        .unwrap();

        assert!(cli.debug);
        assert_eq!(cli.portal.as_deref(), Some("123"));
        match cli.command {
            ClapCommands::Filemanager(FilemanagerCommands {
                command:
                    FilemanagerSubcommands::Fetch {
                        src,
                        dest,
                        include_archived,
                    },
            }) => {
                assert_eq!(src, "images");
                assert_eq!(dest.as_deref(), Some("out"));
                assert!(include_archived);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_command_names_come_from_specs() {
        let cli = ClapCli::try_parse_from(["portal-cli", "config", "validate"]).unwrap();

        assert!(matches!(
            cli.command,
            ClapCommands::Config(ConfigCommands {
                command: ConfigSubcommands::Validate
            })
        ));
    }
}
