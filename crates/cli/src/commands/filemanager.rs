use std::path::PathBuf;

use portal::{
    api::{FetchOptions, http::resolve_local_path},
    commands::filemanager::FetchAction,
};

use crate::{
    cli::ClapCli, commands::run_pipeline, terminal_progress_reporter::TerminalProgressReporter,
};

pub(crate) async fn handle_fetch(
    args: &ClapCli,
    src: &str,
    dest: Option<&str>,
    include_archived: bool,
    reporter: TerminalProgressReporter,
) -> i32 {
    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let action = FetchAction {
        src: src.to_string(),
        dest: resolve_local_path(dest, &cwd),
        options: FetchOptions { include_archived },
    };

    reporter.report_progress(format!(
        "Fetching '{}' into {}",
        action.src,
        action.dest.display()
    ));

    run_pipeline(args, &action, reporter).await
}
