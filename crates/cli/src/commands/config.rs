use tracing::info;

use crate::{
    cli::ClapCli,
    commands::{TableReporter, config_store, report_failure},
    terminal_progress_reporter::TerminalProgressReporter,
};

pub(crate) fn handle_validate(args: &ClapCli, reporter: TerminalProgressReporter) -> i32 {
    info!("Validating configuration");

    let store = config_store(args);
    let (path, config) = match store.load_located() {
        Ok(loaded) => loaded,
        Err(e) => {
            report_failure(&e, args.debug, reporter);
            return 1;
        }
    };

    let result = config.validate().with_config_file_path(Some(path));
    let issues = result.issues();

    if issues.has_errors() || issues.has_warnings() {
        TableReporter::new()
            .setup(vec!["Category", "Field", "Message", "Suggestion"])
            .add_issues(&issues.errors(), |c| reporter.format_error(c))
            .add_issues(&issues.warnings(), |c| reporter.format_warning(c))
            .print();
    }

    let display_path = result
        .config_file_path()
        .map(|p| p.display().to_string())
        .unwrap_or_default();

    if result.is_valid() {
        reporter.report_success(format!("{display_path} is valid."));
        0
    } else {
        reporter.report_error(format!("{display_path} is invalid."));
        1
    }
}
