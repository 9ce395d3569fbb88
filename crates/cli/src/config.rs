use portal::{
    config::AuthMethod, init::InitOptions, pipeline::CommandOptions, resolver::PortalSelection,
};

use crate::cli::{ClapCli, InitArgs};

impl From<&ClapCli> for CommandOptions {
    fn from(args: &ClapCli) -> Self {
        let explicit = args.portal.as_deref().and_then(|p| p.parse().ok());

        Self {
            config_path: args.config.clone(),
            portal: PortalSelection::from_env(explicit),
            use_env: args.use_env,
            debug: args.debug,
        }
    }
}

impl From<&InitArgs> for InitOptions {
    fn from(args: &InitArgs) -> Self {
        let method = if args.api {
            Some(AuthMethod::ApiKey)
        } else if args.oauth {
            Some(AuthMethod::OAuth)
        } else {
            None
        };

        Self { method }
    }
}
