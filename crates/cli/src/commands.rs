pub(crate) mod config;
pub(crate) mod filemanager;
pub(crate) mod hubdb;
pub(crate) mod init;

use std::{error::Error, sync::Arc, time::Duration};

use comfy_table::Table;
use portal::{
    api::http::HttpPortalApi,
    config::{
        ConfigSearch,
        store::{ConfigStore, ConfigStoreError},
    },
    fs::real::RealFileSystem,
    pipeline::{CommandOptions, CommandPipeline, DomainAction, PipelineOutcome, PreflightError},
    usage::{UsageTracker, http::HttpUsageTransport},
    validation::ValidationIssue,
    vcs::GitCli,
};
use reqwest::Client;
use tracing::debug;

use crate::{
    cli::{ClapCli, ClapCommands, ConfigSubcommands, FilemanagerSubcommands, HubdbSubcommands},
    terminal_progress_reporter::TerminalProgressReporter,
};

/// How long in-flight usage events may delay exit
const FLUSH_TIMEOUT: Duration = Duration::from_secs(2);

/// Primary command dispatcher that routes to the appropriate command handler
pub(crate) async fn dispatch_command(args: &ClapCli, reporter: TerminalProgressReporter) -> i32 {
    debug!("Dispatching command: {:?}", args.command);

    match &args.command {
        ClapCommands::Init(init_args) => init::handle_init(args, init_args, reporter).await,
        ClapCommands::Filemanager(cmd) => match &cmd.command {
            FilemanagerSubcommands::Fetch {
                src,
                dest,
                include_archived,
            } => {
                filemanager::handle_fetch(args, src, dest.as_deref(), *include_archived, reporter)
                    .await
            }
        },
        ClapCommands::Hubdb(cmd) => match &cmd.command {
            HubdbSubcommands::Delete { table_id } => {
                hubdb::handle_delete(args, table_id, reporter).await
            }
        },
        ClapCommands::Config(cmd) => match cmd.command {
            ConfigSubcommands::Validate => config::handle_validate(args, reporter),
        },
    }
}

pub(crate) fn config_store(args: &ClapCli) -> ConfigStore<RealFileSystem> {
    ConfigStore::new(
        RealFileSystem,
        ConfigSearch::discover(&RealFileSystem, args.config.clone()),
    )
}

pub(crate) fn usage_tracker(base_url: &str) -> UsageTracker {
    UsageTracker::new(Arc::new(HttpUsageTransport::new(Client::new(), base_url)))
}

pub(crate) async fn flush_usage(tracker: &UsageTracker) {
    tracker.flush(FLUSH_TIMEOUT).await;
}

/// Run `action` through the pre-flight pipeline and report how it ended
pub(crate) async fn run_pipeline(
    args: &ClapCli,
    action: &dyn DomainAction,
    reporter: TerminalProgressReporter,
) -> i32 {
    let api = HttpPortalApi::from_env();
    let tracker = usage_tracker(api.base_url());
    let pipeline = CommandPipeline::new(config_store(args), GitCli, api, tracker);

    let outcome = pipeline.run(&CommandOptions::from(args), action).await;
    report_outcome(&outcome, args.debug, reporter);

    flush_usage(pipeline.tracker()).await;
    outcome.exit_code()
}

fn report_outcome(outcome: &PipelineOutcome, debug: bool, reporter: TerminalProgressReporter) {
    match outcome {
        PipelineOutcome::Success(message) => reporter.report_success(message),
        // each issue was already logged
        PipelineOutcome::PreflightRejected(PreflightError::InvalidConfig { .. }) => {}
        PipelineOutcome::PreflightRejected(e) => {
            report_failure(e, debug, reporter);
            if let PreflightError::Config(ConfigStoreError::NotFound { .. }) = e {
                reporter.report_suggestion("Run `portal-cli init` to create a config file");
            }
        }
        PipelineOutcome::DomainFailure(e) => report_failure(e, debug, reporter),
    }
}

/// One error line, plus the full source chain under `--debug`
pub(crate) fn report_failure(
    error: &(dyn Error + 'static),
    debug: bool,
    reporter: TerminalProgressReporter,
) {
    reporter.report_error(error);

    if debug {
        let mut source = error.source();
        while let Some(cause) = source {
            eprintln!("{}", TerminalProgressReporter::format(2, format!("caused by: {cause}")));
            source = cause.source();
        }
        eprintln!("{}", TerminalProgressReporter::format(2, format!("{error:?}")));
    }
}

pub(crate) struct TableReporter {
    table: Table,
}

impl TableReporter {
    pub(crate) fn new() -> Self {
        Self {
            table: Table::new(),
        }
    }

    pub(crate) fn setup(&mut self, header: Vec<&'static str>) -> &mut Self {
        use comfy_table::{
            ContentArrangement,
            modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS},
            presets::UTF8_FULL,
        };
        self.table
            .load_preset(UTF8_FULL)
            .apply_modifier(UTF8_ROUND_CORNERS)
            .apply_modifier(UTF8_SOLID_INNER_BORDERS)
            .set_content_arrangement(ContentArrangement::Dynamic)
            .set_header(header);

        self
    }

    pub(crate) fn add_issues(
        &mut self,
        issues: &[&ValidationIssue],
        format_category: impl Fn(String) -> String,
    ) -> &mut Self {
        for issue in issues {
            self.table.add_row(vec![
                format_category(issue.category().to_string()),
                issue.field().to_string(),
                issue.message().to_string(),
                issue.suggestion().cloned().unwrap_or_default(),
            ]);
        }

        self
    }

    pub(crate) fn print(&self) {
        eprintln!("{}", &self.table);
    }
}
