//! Log setup and the per-command debug banner

use tracing::debug;
use tracing_subscriber::EnvFilter;

use crate::cli::ClapCli;

/// Install the subscriber: `--debug` shows debug output, otherwise warnings and errors only.
/// `RUST_LOG` overrides both.
pub(crate) fn set_log_level(debug: bool) {
    let default_level = if debug { "debug" } else { "warn" };

    // stdout is reserved for command output
    let result = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .try_init();

    if let Err(e) = result {
        eprintln!("Unable to set up logging: {e}");
    }
}

pub(crate) fn log_debug_info(args: &ClapCli) {
    debug!("portal-cli version: {}", env!("CARGO_PKG_VERSION"));
    if let Ok(cwd) = std::env::current_dir() {
        debug!("Current directory: {}", cwd.display());
    }
    debug!("CLI arguments: {:#?}", args);
}
