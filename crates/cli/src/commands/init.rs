use std::sync::Arc;

use portal::{
    api::http::{HttpOAuthExchange, base_url_from_env},
    init::{AuthBootstrap, InitError, InitOptions},
};
use tracing::info;

use crate::{
    cli::{ClapCli, InitArgs},
    commands::{config_store, flush_usage, report_failure, usage_tracker},
    prompter::DialoguerPrompter,
    terminal_progress_reporter::TerminalProgressReporter,
};

pub(crate) async fn handle_init(
    args: &ClapCli,
    init_args: &InitArgs,
    reporter: TerminalProgressReporter,
) -> i32 {
    let prompter = Arc::new(DialoguerPrompter::new(reporter));
    let bootstrap = AuthBootstrap::new(
        config_store(args),
        Arc::clone(&prompter),
        HttpOAuthExchange::from_env(prompter),
        usage_tracker(&base_url_from_env()),
    );

    let result = bootstrap.run(&InitOptions::from(init_args)).await;
    flush_usage(bootstrap.tracker()).await;

    match result {
        Ok(report) => {
            info!(path = %report.path.display(), method = %report.method, "config written");
            let portal = report
                .portal_id
                .map(|id| format!(" for portal {id}"))
                .unwrap_or_default();
            reporter.report_success(format!(
                "{} created with {} authentication{portal}",
                report.path.display(),
                report.method
            ));
            0
        }
        Err(InitError::NoAuthMethodSelected) => {
            reporter.report_error(InitError::NoAuthMethodSelected);
            reporter.report_suggestion("Pass --api or --oauth to skip the prompt");
            1
        }
        Err(e) => {
            report_failure(&e, args.debug, reporter);
            e.exit_code()
        }
    }
}
