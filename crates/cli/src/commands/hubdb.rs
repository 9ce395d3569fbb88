use portal::commands::hubdb::DeleteTableAction;

use crate::{
    cli::ClapCli, commands::run_pipeline, terminal_progress_reporter::TerminalProgressReporter,
};

pub(crate) async fn handle_delete(
    args: &ClapCli,
    table_id: &str,
    reporter: TerminalProgressReporter,
) -> i32 {
    run_pipeline(args, &DeleteTableAction::new(table_id), reporter).await
}
