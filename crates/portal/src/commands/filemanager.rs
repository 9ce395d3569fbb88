use std::path::PathBuf;

use async_trait::async_trait;

use crate::{
    api::{ApiError, FetchOptions, PortalApi},
    pipeline::{CommandContext, DomainAction, DomainActionError},
};

use super::{CommandSpec, FILEMANAGER_FETCH};

/// `filemanager fetch <src> [dest]`
#[derive(Debug, Clone)]
pub struct FetchAction {
    pub src: String,
    /// Already resolved against the working directory
    pub dest: PathBuf,
    pub options: FetchOptions,
}

#[async_trait]
impl DomainAction for FetchAction {
    fn spec(&self) -> &'static CommandSpec {
        &FILEMANAGER_FETCH
    }

    async fn run(
        &self,
        ctx: &CommandContext,
        api: &dyn PortalApi,
    ) -> Result<String, DomainActionError> {
        match api
            .download_resource(&ctx.entry, &self.src, &self.dest, &self.options)
            .await
        {
            Ok(summary) => {
                let mut message = format!(
                    "Downloaded {} file(s) from '{}' to {}",
                    summary.files_written,
                    self.src,
                    summary.destination.display()
                );
                if summary.archived_skipped > 0 {
                    message.push_str(&format!(
                        " ({} archived file(s) skipped; pass --include-archived to fetch them)",
                        summary.archived_skipped
                    ));
                }
                Ok(message)
            }
            Err(e) => {
                // local write failures exit nonzero
                let fatal = matches!(e, ApiError::Io { .. } | ApiError::UnsafeName(_));
                let error = DomainActionError::new(
                    format!("Fetching '{}' from {} failed", self.src, ctx.portal_id),
                    e,
                );
                Err(if fatal { error.fatal() } else { error })
            }
        }
    }
}
