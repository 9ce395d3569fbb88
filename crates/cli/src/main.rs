mod cli;
mod commands;
mod config;
mod logging;
mod prompter;
mod terminal_progress_reporter;

use std::process;

use clap::Parser;
use terminal_progress_reporter::TerminalProgressReporter;

use crate::{
    cli::ClapCli,
    commands::dispatch_command,
    logging::{log_debug_info, set_log_level},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = ClapCli::parse();

    set_log_level(args.debug);
    log_debug_info(&args);

    let reporter = TerminalProgressReporter::new(!args.no_color);

    let exit_code = dispatch_command(&args, reporter).await;

    process::exit(exit_code)
}
