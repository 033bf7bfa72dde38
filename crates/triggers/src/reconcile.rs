//! The reconciliation pipeline: list → find → upsert → join all.

use std::sync::Arc;

use tracing::{info, warn};

use crate::{
    error::{Error, Result},
    matcher,
    membership::join_all,
    repository::{ChannelMembership, ListFilter, TriggerRepository},
    template::TriggerTemplate,
    types::{ReconcileRequest, ReconcileResult, TriggerRecord, WorkflowRef},
    upsert::upsert,
};

/// Brings the managed trigger and the bot's channel memberships in line with
/// a requested channel set.
///
/// Reconciliation only happens when invoked; nothing repeats on its own.
/// There is no rollback: if the trigger is written but a join fails, the
/// trigger keeps its new scope and the join error is returned.
pub struct Reconciler {
    repository: Arc<dyn TriggerRepository>,
    membership: Arc<dyn ChannelMembership>,
    template: TriggerTemplate,
}

impl Reconciler {
    pub fn new(
        repository: Arc<dyn TriggerRepository>,
        membership: Arc<dyn ChannelMembership>,
        template: TriggerTemplate,
    ) -> Self {
        Self {
            repository,
            membership,
            template,
        }
    }

    pub fn template(&self) -> &TriggerTemplate {
        &self.template
    }

    async fn list_owned(&self) -> Result<Vec<TriggerRecord>> {
        self.repository
            .list(ListFilter::OWNED)
            .await
            .map_err(Error::List)
    }

    /// The trigger currently managed for `workflow`, if any.
    ///
    /// Duplicates are logged and the first one in list order is returned.
    pub async fn current_trigger(&self, workflow: &WorkflowRef) -> Result<Option<TriggerRecord>> {
        let records = self.list_owned().await?;
        let event_kind = &self.template.event_kind;
        let matches = matcher::find_all(&records, workflow, event_kind);
        if matches.len() > 1 {
            warn!(
                workflow = %workflow,
                count = matches.len(),
                "multiple triggers match workflow, using the first"
            );
        }
        Ok(matcher::find(&records, workflow, event_kind).cloned())
    }

    /// Like [`Self::current_trigger`], but duplicates are an error.
    pub async fn current_trigger_strict(
        &self,
        workflow: &WorkflowRef,
    ) -> Result<Option<TriggerRecord>> {
        let records = self.list_owned().await?;
        Ok(matcher::find_unique(&records, workflow, &self.template.event_kind)?.cloned())
    }

    pub async fn reconcile(&self, request: &ReconcileRequest) -> Result<ReconcileResult> {
        let existing = self.current_trigger(&request.workflow).await?;
        let desired = self.template.spec_for(&request.workflow, &request.channels);

        let (action, trigger) =
            upsert(self.repository.as_ref(), existing.as_ref(), &desired).await?;

        let joins = join_all(self.membership.as_ref(), &request.channels)
            .await
            .into_result()?;

        info!(
            workflow = %request.workflow,
            trigger_id = %trigger.id,
            %action,
            channels = joins.len(),
            "reconciliation complete"
        );
        Ok(ReconcileResult {
            trigger,
            action,
            joins,
        })
    }
}
