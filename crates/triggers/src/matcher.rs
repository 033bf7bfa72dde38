//! Resolve the trigger this app manages for a workflow.
//!
//! Uniqueness is only as good as the lookup-before-write discipline: if the
//! store holds duplicates, [`find`] returns the first in list order and
//! callers must not rely on which one that is.

use crate::{
    error::{Error, Result},
    types::{EventKind, TriggerRecord, WorkflowRef},
};

fn matches(record: &TriggerRecord, workflow: &WorkflowRef, event_kind: &EventKind) -> bool {
    record.spec.workflow == *workflow && record.spec.event_kind == *event_kind
}

/// First record for `workflow` listening on `event_kind`.
pub fn find<'a>(
    records: &'a [TriggerRecord],
    workflow: &WorkflowRef,
    event_kind: &EventKind,
) -> Option<&'a TriggerRecord> {
    records.iter().find(|r| matches(r, workflow, event_kind))
}

/// Every matching record, in list order.
pub fn find_all<'a>(
    records: &'a [TriggerRecord],
    workflow: &WorkflowRef,
    event_kind: &EventKind,
) -> Vec<&'a TriggerRecord> {
    records
        .iter()
        .filter(|r| matches(r, workflow, event_kind))
        .collect()
}

/// Like [`find`], but reports duplicates as [`Error::MatchAmbiguous`].
pub fn find_unique<'a>(
    records: &'a [TriggerRecord],
    workflow: &WorkflowRef,
    event_kind: &EventKind,
) -> Result<Option<&'a TriggerRecord>> {
    match find_all(records, workflow, event_kind).as_slice() {
        [] => Ok(None),
        [only] => Ok(Some(*only)),
        many => Err(Error::MatchAmbiguous {
            workflow: workflow.clone(),
            count: many.len(),
        }),
    }
}
