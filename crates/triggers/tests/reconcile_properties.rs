#![allow(clippy::unwrap_used, clippy::expect_used)]
use std::sync::Arc;

use configurator_triggers::{
    ApiFailure, ChannelMembership, ChannelScope, Error, JoinOutcome, ReconcileRequest, Reconciler,
    TriggerId, TriggerRecord, TriggerRepository, TriggerTemplate, UpsertAction, WorkflowRef,
    store_memory::{InMemoryMembership, InMemoryTriggerStore, StoreCall},
    upsert::upsert,
};

fn scope(ids: &[&str]) -> ChannelScope {
    ids.iter().copied().collect()
}

fn setup(
    membership: InMemoryMembership,
) -> (Arc<InMemoryTriggerStore>, Arc<InMemoryMembership>, Reconciler) {
    let store = Arc::new(InMemoryTriggerStore::new());
    let membership = Arc::new(membership);
    let reconciler = Reconciler::new(
        Arc::clone(&store) as Arc<dyn TriggerRepository>,
        Arc::clone(&membership) as Arc<dyn ChannelMembership>,
        TriggerTemplate::reaction_added(),
    );
    (store, membership, reconciler)
}

fn existing(id: &str, workflow: &str, channels: &[&str]) -> TriggerRecord {
    TriggerRecord {
        id: TriggerId::new(id),
        spec: TriggerTemplate::reaction_added()
            .spec_for(&WorkflowRef::new(workflow), &scope(channels)),
    }
}

#[tokio::test]
async fn reconciling_twice_keeps_one_trigger() {
    let (store, _, reconciler) = setup(InMemoryMembership::new());
    let request = ReconcileRequest::new("wf-main", scope(&["C1", "C2"]));

    let first = reconciler.reconcile(&request).await.unwrap();
    let second = reconciler.reconcile(&request).await.unwrap();

    assert_eq!(first.action, UpsertAction::Create);
    assert_eq!(second.action, UpsertAction::Update);
    assert_eq!(first.trigger.id, second.trigger.id);

    let records = store.records();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].spec.channel_scope, scope(&["C1", "C2"]));
    assert!(
        second
            .joins
            .iter()
            .all(|j| j.outcome == JoinOutcome::AlreadyMember)
    );
}

#[tokio::test]
async fn update_overwrites_instead_of_merging() {
    let (store, _, reconciler) = setup(InMemoryMembership::new());

    reconciler
        .reconcile(&ReconcileRequest::new("W", scope(&["A", "B"])))
        .await
        .unwrap();
    reconciler
        .reconcile(&ReconcileRequest::new("W", scope(&["C"])))
        .await
        .unwrap();

    let records = store.records();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].spec.channel_scope, scope(&["C"]));
}

#[tokio::test]
async fn only_the_requested_workflow_is_touched() {
    let (store, _, reconciler) = setup(InMemoryMembership::new());
    store.insert(existing("T-W1", "W1", &["C1"]));
    store.insert(existing("T-W2", "W2", &["C7"]));

    reconciler
        .reconcile(&ReconcileRequest::new("W1", scope(&["C2"])))
        .await
        .unwrap();

    assert_eq!(store.calls(), vec![
        StoreCall::List,
        StoreCall::Update(TriggerId::new("T-W1"))
    ]);
    let records = store.records();
    assert_eq!(records[0].spec.channel_scope, scope(&["C2"]));
    assert_eq!(records[1], existing("T-W2", "W2", &["C7"]));
}

#[tokio::test]
async fn failed_join_does_not_stop_the_others() {
    let (_, membership, reconciler) = setup(
        InMemoryMembership::new()
            .with_latency(std::time::Duration::from_millis(5))
            .with_failure("Y", ApiFailure::new("is_archived")),
    );

    let err = reconciler
        .reconcile(&ReconcileRequest::new("wf-main", scope(&["X", "Y", "Z"])))
        .await
        .unwrap_err();

    assert!(membership.is_member(&"X".into()));
    assert!(membership.is_member(&"Z".into()));
    assert_eq!(membership.attempts().len(), 3);
    match err {
        Error::Join { channel, failure } => {
            assert_eq!(channel.as_str(), "Y");
            assert_eq!(failure.code, "is_archived");
        },
        other => panic!("expected join failure, got {other:?}"),
    }
}

#[tokio::test]
async fn existing_membership_is_not_an_error() {
    let (_, _, reconciler) = setup(InMemoryMembership::new().with_member("C1"));
    let result = reconciler
        .reconcile(&ReconcileRequest::new("wf-main", scope(&["C1"])))
        .await
        .unwrap();
    assert_eq!(result.joins[0].outcome, JoinOutcome::AlreadyMember);
}

#[tokio::test]
async fn empty_store_creates_then_joins_both_channels() {
    let (store, membership, reconciler) = setup(InMemoryMembership::new());

    let result = reconciler
        .reconcile(&ReconcileRequest::new("wf-main", scope(&["C1", "C2"])))
        .await
        .unwrap();

    assert_eq!(store.calls(), vec![StoreCall::List, StoreCall::Create]);
    assert_eq!(result.trigger.spec.channel_scope, scope(&["C1", "C2"]));
    assert_eq!(result.trigger.spec.workflow.path(), "#/workflows/wf-main");
    let mut joined: Vec<String> = membership
        .attempts()
        .iter()
        .map(|c| c.to_string())
        .collect();
    joined.sort();
    assert_eq!(joined, ["C1", "C2"]);
}

#[tokio::test]
async fn existing_trigger_is_updated_not_recreated() {
    let (store, membership, reconciler) = setup(InMemoryMembership::new());
    store.insert(existing("T1", "wf-main", &["C1"]));

    let result = reconciler
        .reconcile(&ReconcileRequest::new("wf-main", scope(&["C1", "C2"])))
        .await
        .unwrap();

    assert_eq!(result.action, UpsertAction::Update);
    assert_eq!(store.calls(), vec![
        StoreCall::List,
        StoreCall::Update(TriggerId::new("T1"))
    ]);
    assert_eq!(membership.attempts().len(), 2);
    assert!(membership.is_member(&"C1".into()));
    assert!(membership.is_member(&"C2".into()));
}

#[tokio::test]
async fn channel_not_found_is_the_aggregate_error() {
    let (_, _, reconciler) = setup(
        InMemoryMembership::new()
            .with_latency(std::time::Duration::from_millis(1))
            .with_failure("C9", ApiFailure::new("channel_not_found")),
    );

    let err = reconciler
        .reconcile(&ReconcileRequest::new("wf-main", scope(&["C1", "C9", "C3"])))
        .await
        .unwrap_err();

    assert_eq!(err.failure(), Some(&ApiFailure::new("channel_not_found")));
    assert_eq!(err.to_string(), "failed to join <#C9>: channel_not_found");
}

/// List → find → upsert is not atomic. Two callers that both list before
/// either writes will both create.
#[tokio::test]
async fn interleaved_reconciliations_can_duplicate() {
    let (store, _, reconciler) = setup(InMemoryMembership::new());
    let workflow = WorkflowRef::new("wf-main");

    let seen_by_a = reconciler.current_trigger(&workflow).await.unwrap();
    let seen_by_b = reconciler.current_trigger(&workflow).await.unwrap();
    assert!(seen_by_a.is_none() && seen_by_b.is_none());

    let spec = reconciler.template().spec_for(&workflow, &scope(&["C1"]));
    upsert(&*store, seen_by_a.as_ref(), &spec).await.unwrap();
    upsert(&*store, seen_by_b.as_ref(), &spec).await.unwrap();

    assert_eq!(store.records().len(), 2);
    let err = reconciler
        .current_trigger_strict(&workflow)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::MatchAmbiguous { count: 2, .. }));

    // Later reconciliations keep updating the first one.
    let result = reconciler
        .reconcile(&ReconcileRequest::new("wf-main", scope(&["C2"])))
        .await
        .unwrap();
    assert_eq!(result.trigger.id, store.records()[0].id);
}
