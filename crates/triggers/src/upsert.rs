//! Create-or-update of the managed trigger.

use tracing::{debug, info};

use crate::{
    error::{Error, Result},
    repository::TriggerRepository,
    types::{TriggerRecord, TriggerSpec, UpsertAction},
};

/// Create `desired` when nothing exists yet, otherwise replace the existing
/// record's whole definition. Not retried.
///
/// Two callers racing through list → find → upsert can both take the create
/// branch; nothing here prevents the resulting duplicate.
pub async fn upsert(
    repository: &dyn TriggerRepository,
    existing: Option<&TriggerRecord>,
    desired: &TriggerSpec,
) -> Result<(UpsertAction, TriggerRecord)> {
    match existing {
        None => {
            debug!(workflow = %desired.workflow, "creating trigger");
            let record = repository
                .create(desired)
                .await
                .map_err(|failure| Error::Upsert {
                    action: UpsertAction::Create,
                    failure,
                })?;
            info!(
                workflow = %desired.workflow,
                trigger_id = %record.id,
                channels = desired.channel_scope.len(),
                "trigger created"
            );
            Ok((UpsertAction::Create, record))
        },
        Some(current) => {
            debug!(workflow = %desired.workflow, trigger_id = %current.id, "updating trigger");
            let record = repository
                .update(&current.id, desired)
                .await
                .map_err(|failure| Error::Upsert {
                    action: UpsertAction::Update,
                    failure,
                })?;
            info!(
                workflow = %desired.workflow,
                trigger_id = %record.id,
                channels = desired.channel_scope.len(),
                "trigger updated"
            );
            Ok((UpsertAction::Update, record))
        },
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use {
        super::*,
        crate::{
            error::ApiFailure,
            repository::ListFilter,
            store_memory::{InMemoryTriggerStore, StoreCall},
            template::TriggerTemplate,
            types::ChannelScope,
        },
    };

    fn spec(channels: &[&str]) -> TriggerSpec {
        TriggerTemplate::default().spec_for(
            &"wf-main".into(),
            &channels.iter().copied().collect::<ChannelScope>(),
        )
    }

    #[tokio::test]
    async fn creates_when_absent() {
        let store = InMemoryTriggerStore::new();
        let (action, record) = upsert(&store, None, &spec(&["C1"])).await.unwrap();
        assert_eq!(action, UpsertAction::Create);
        assert_eq!(record.spec, spec(&["C1"]));
        assert_eq!(store.calls(), vec![StoreCall::Create]);
    }

    #[tokio::test]
    async fn update_replaces_whole_spec() {
        let store = InMemoryTriggerStore::new();
        let (_, first) = upsert(&store, None, &spec(&["A", "B"])).await.unwrap();

        let mut desired = spec(&["C"]);
        desired.inputs.insert("extra", "{{data.extra}}");
        let (action, updated) = upsert(&store, Some(&first), &desired).await.unwrap();

        assert_eq!(action, UpsertAction::Update);
        assert_eq!(updated.id, first.id);
        let stored = store.list(ListFilter::OWNED).await.unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].spec, desired);
    }

    #[tokio::test]
    async fn create_failure_carries_store_payload() {
        let store = InMemoryTriggerStore::new();
        store.fail_next_create(ApiFailure::new("invalid_auth"));
        let err = upsert(&store, None, &spec(&["C1"])).await.unwrap_err();
        assert!(matches!(
            err,
            Error::Upsert {
                action: UpsertAction::Create,
                ref failure,
            } if failure.code == "invalid_auth"
        ));
        assert!(store.list(ListFilter::OWNED).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn update_of_missing_record_fails() {
        let store = InMemoryTriggerStore::new();
        let ghost = TriggerRecord {
            id: "Ft404".into(),
            spec: spec(&["C1"]),
        };
        let err = upsert(&store, Some(&ghost), &spec(&["C2"])).await.unwrap_err();
        assert_eq!(err.to_string(), "failed to update trigger: trigger_not_found");
    }
}
