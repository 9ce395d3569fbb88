use async_trait::async_trait;

use crate::{
    api::PortalApi,
    pipeline::{CommandContext, DomainAction, DomainActionError},
};

use super::{CommandSpec, HUBDB_DELETE};

/// `hubdb delete <table-id>`
#[derive(Debug, Clone)]
pub struct DeleteTableAction {
    pub table_id: String,
}

impl DeleteTableAction {
    pub fn new(table_id: impl Into<String>) -> Self {
        Self {
            table_id: table_id.into(),
        }
    }
}

#[async_trait]
impl DomainAction for DeleteTableAction {
    fn spec(&self) -> &'static CommandSpec {
        &HUBDB_DELETE
    }

    async fn run(
        &self,
        ctx: &CommandContext,
        api: &dyn PortalApi,
    ) -> Result<String, DomainActionError> {
        match api.delete_table(&ctx.entry, &self.table_id).await {
            Ok(()) => Ok(format!(
                "The table {} was deleted from {}",
                self.table_id, ctx.portal_id
            )),
            Err(e) => Err(DomainActionError::new(
                format!("Deleting the table {} failed", self.table_id),
                e,
            )),
        }
    }
}
