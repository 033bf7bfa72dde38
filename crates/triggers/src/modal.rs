//! Two-phase, modal-driven configuration.
//!
//! Phase one opens a channel picker and returns without waiting. Phase two is
//! a separate entry point, invoked when the form is submitted, that runs the
//! same reconciliation as the direct path. Closing the form without
//! submitting leaves nothing to clean up.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::{
    error::{Error, Result},
    reconcile::Reconciler,
    types::{ChannelScope, ReconcileRequest, ReconcileResult, WorkflowRef},
    view::{CONFIGURE_CALLBACK_ID, InteractivityPointer, ModalView, ViewSurface},
};

/// Where a modal interaction stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModalState {
    /// Form shown, awaiting submission.
    Opened,
    Reconciled,
    Failed,
}

/// Values carried by a submitted form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewSubmission {
    pub callback_id: String,
    pub private_metadata: Option<String>,
    pub selected_channels: ChannelScope,
}

/// What to answer the platform with after a submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionResponse {
    /// Replace the open modal with this view.
    Update(ModalView),
    /// End the interaction with this message.
    Error(String),
}

impl SubmissionResponse {
    pub fn state(&self) -> ModalState {
        match self {
            Self::Update(_) => ModalState::Reconciled,
            Self::Error(_) => ModalState::Failed,
        }
    }
}

pub struct ModalConfigurator {
    reconciler: Arc<Reconciler>,
    views: Arc<dyn ViewSurface>,
    default_workflow: WorkflowRef,
    title: String,
}

impl ModalConfigurator {
    pub fn new(
        reconciler: Arc<Reconciler>,
        views: Arc<dyn ViewSurface>,
        default_workflow: WorkflowRef,
    ) -> Self {
        Self {
            reconciler,
            views,
            default_workflow,
            title: "My App".into(),
        }
    }

    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Phase one: show the picker pre-filled with the current channel scope.
    pub async fn open(
        &self,
        pointer: &InteractivityPointer,
        workflow: Option<&WorkflowRef>,
    ) -> Result<ModalState> {
        let workflow = workflow.unwrap_or(&self.default_workflow);
        let initial = self
            .reconciler
            .current_trigger(workflow)
            .await?
            .map(|record| record.spec.channel_scope)
            .unwrap_or_default();

        let view = ModalView::channel_picker(&self.title, workflow, &initial);
        self.views
            .open(pointer, &view)
            .await
            .map_err(Error::View)?;

        debug!(workflow = %workflow, channels = initial.len(), "configuration modal opened");
        Ok(ModalState::Opened)
    }

    /// Phase two: reconcile with the submitted channels.
    pub async fn submit(&self, submission: &ViewSubmission) -> SubmissionResponse {
        match self.resume(submission).await {
            Ok(result) => {
                info!(
                    trigger_id = %result.trigger.id,
                    channels = result.joins.len(),
                    "modal configuration applied"
                );
                SubmissionResponse::Update(ModalView::completion(&self.title))
            },
            Err(e) => {
                warn!(error = %e, "modal configuration failed");
                SubmissionResponse::Error(e.user_message())
            },
        }
    }

    async fn resume(&self, submission: &ViewSubmission) -> Result<ReconcileResult> {
        if submission.callback_id != CONFIGURE_CALLBACK_ID {
            return Err(Error::invalid_submission(format!(
                "unexpected callback id '{}'",
                submission.callback_id
            )));
        }

        let workflow = submission
            .private_metadata
            .as_deref()
            .filter(|m| !m.trim().is_empty())
            .map(WorkflowRef::new)
            .unwrap_or_else(|| self.default_workflow.clone());

        let request = ReconcileRequest::new(workflow, submission.selected_channels.clone());
        self.reconciler.reconcile(&request).await
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use {
        super::*,
        crate::{
            error::ApiFailure,
            repository::{ChannelMembership, TriggerRepository},
            store_memory::{InMemoryMembership, InMemoryTriggerStore, InMemoryViews},
            template::TriggerTemplate,
            types::{TriggerId, TriggerRecord},
            view::{COMPLETION_CALLBACK_ID, ViewBody},
        },
    };

    struct Harness {
        store: Arc<InMemoryTriggerStore>,
        membership: Arc<InMemoryMembership>,
        views: Arc<InMemoryViews>,
        modal: ModalConfigurator,
    }

    fn harness(membership: InMemoryMembership) -> Harness {
        let store = Arc::new(InMemoryTriggerStore::new());
        let membership = Arc::new(membership);
        let views = Arc::new(InMemoryViews::new());
        let reconciler = Arc::new(Reconciler::new(
            Arc::clone(&store) as Arc<dyn TriggerRepository>,
            Arc::clone(&membership) as Arc<dyn ChannelMembership>,
            TriggerTemplate::default(),
        ));
        let modal = ModalConfigurator::new(
            reconciler,
            Arc::clone(&views) as Arc<dyn ViewSurface>,
            WorkflowRef::new("main_event_workflow"),
        );
        Harness {
            store,
            membership,
            views,
            modal,
        }
    }

    fn submission(metadata: Option<&str>, channels: &[&str]) -> ViewSubmission {
        ViewSubmission {
            callback_id: CONFIGURE_CALLBACK_ID.into(),
            private_metadata: metadata.map(str::to_string),
            selected_channels: channels.iter().copied().collect(),
        }
    }

    #[tokio::test]
    async fn open_prefills_current_scope() {
        let h = harness(InMemoryMembership::new());
        h.store.insert(TriggerRecord {
            id: TriggerId::new("T1"),
            spec: TriggerTemplate::default().spec_for(
                &"main_event_workflow".into(),
                &["C1", "C2"].into_iter().collect(),
            ),
        });

        let state = h
            .modal
            .open(&InteractivityPointer::new("ptr-1"), None)
            .await
            .unwrap();
        assert_eq!(state, ModalState::Opened);

        let opened = h.views.opened();
        assert_eq!(opened.len(), 1);
        let (pointer, view) = &opened[0];
        assert_eq!(pointer.as_str(), "ptr-1");
        assert_eq!(view.callback_id, CONFIGURE_CALLBACK_ID);
        assert_eq!(view.private_metadata.as_deref(), Some("main_event_workflow"));
        match &view.body {
            ViewBody::ChannelPicker {
                initial_channels, ..
            } => {
                assert_eq!(
                    initial_channels,
                    &["C1", "C2"].into_iter().collect::<ChannelScope>()
                );
            },
            other => panic!("unexpected body {other:?}"),
        }
    }

    #[tokio::test]
    async fn open_without_trigger_starts_empty() {
        let h = harness(InMemoryMembership::new());
        h.modal
            .open(&InteractivityPointer::new("ptr"), Some(&"wf-other".into()))
            .await
            .unwrap();
        let (_, view) = &h.views.opened()[0];
        assert_eq!(view.private_metadata.as_deref(), Some("wf-other"));
        assert!(matches!(
            &view.body,
            ViewBody::ChannelPicker { initial_channels, .. } if initial_channels.is_empty()
        ));
    }

    #[tokio::test]
    async fn open_failure_is_view_error() {
        let h = harness(InMemoryMembership::new());
        h.views.fail_next_open(ApiFailure::new("expired_trigger_id"));
        let err = h
            .modal
            .open(&InteractivityPointer::new("ptr"), None)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::View(_)));
        assert!(err.user_message().contains("(error: expired_trigger_id)"));
    }

    #[tokio::test]
    async fn submit_reconciles_and_completes() {
        let h = harness(InMemoryMembership::new());
        let response = h
            .modal
            .submit(&submission(Some("wf-main"), &["C1", "C2"]))
            .await;

        assert_eq!(response.state(), ModalState::Reconciled);
        match response {
            SubmissionResponse::Update(view) => {
                assert_eq!(view.callback_id, COMPLETION_CALLBACK_ID);
                assert!(view.submit.is_none());
            },
            SubmissionResponse::Error(e) => panic!("unexpected error {e}"),
        }
        let records = h.store.records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].spec.workflow.callback_id(), "wf-main");
        assert_eq!(h.membership.attempts().len(), 2);
    }

    #[tokio::test]
    async fn submit_falls_back_to_default_workflow() {
        let h = harness(InMemoryMembership::new());
        h.modal.submit(&submission(None, &["C1"])).await;
        assert_eq!(
            h.store.records()[0].spec.workflow.callback_id(),
            "main_event_workflow"
        );
    }

    #[tokio::test]
    async fn submit_join_failure_renders_error() {
        let h = harness(
            InMemoryMembership::new().with_failure("C9", ApiFailure::new("channel_not_found")),
        );
        let response = h.modal.submit(&submission(None, &["C1", "C9"])).await;
        assert_eq!(response.state(), ModalState::Failed);
        assert_eq!(
            response,
            SubmissionResponse::Error(
                "Failed to join channels due to failed to join <#C9>: channel_not_found.".into()
            )
        );
    }

    #[tokio::test]
    async fn submit_rejects_foreign_callback() {
        let h = harness(InMemoryMembership::new());
        let mut foreign = submission(None, &["C1"]);
        foreign.callback_id = "something-else".into();
        let response = h.modal.submit(&foreign).await;
        assert_eq!(response.state(), ModalState::Failed);
        assert!(h.store.calls().is_empty());
    }
}
