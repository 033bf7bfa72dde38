//! In-memory collaborators for tests and dry runs.

use std::{
    collections::{HashMap, HashSet, VecDeque},
    sync::{
        Mutex,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

use async_trait::async_trait;

use crate::{
    error::ApiFailure,
    repository::{ChannelMembership, JoinStatus, ListFilter, TriggerRepository},
    types::{ChannelId, TriggerId, TriggerRecord, TriggerSpec},
    view::{InteractivityPointer, ModalView, ViewSurface},
};

/// A call observed by [`InMemoryTriggerStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreCall {
    List,
    Create,
    Update(TriggerId),
}

/// Trigger store backed by a `Vec`, in insertion order. No persistence.
#[derive(Default)]
pub struct InMemoryTriggerStore {
    records: Mutex<Vec<TriggerRecord>>,
    calls: Mutex<Vec<StoreCall>>,
    next_id: AtomicUsize,
    list_failure: Mutex<Option<ApiFailure>>,
    create_failure: Mutex<Option<ApiFailure>>,
}

impl InMemoryTriggerStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate the store, e.g. with a trigger from an earlier run.
    pub fn insert(&self, record: TriggerRecord) {
        let mut records = self.records.lock().unwrap_or_else(|e| e.into_inner());
        records.push(record);
    }

    pub fn records(&self) -> Vec<TriggerRecord> {
        self.records
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub fn calls(&self) -> Vec<StoreCall> {
        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub fn fail_next_list(&self, failure: ApiFailure) {
        *self.list_failure.lock().unwrap_or_else(|e| e.into_inner()) = Some(failure);
    }

    pub fn fail_next_create(&self, failure: ApiFailure) {
        *self.create_failure.lock().unwrap_or_else(|e| e.into_inner()) = Some(failure);
    }

    fn record_call(&self, call: StoreCall) {
        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(call);
    }
}

#[async_trait]
impl TriggerRepository for InMemoryTriggerStore {
    async fn list(&self, _filter: ListFilter) -> Result<Vec<TriggerRecord>, ApiFailure> {
        self.record_call(StoreCall::List);
        if let Some(failure) = self
            .list_failure
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take()
        {
            return Err(failure);
        }
        // Everything in this store is owned by the caller.
        Ok(self.records())
    }

    async fn create(&self, spec: &TriggerSpec) -> Result<TriggerRecord, ApiFailure> {
        self.record_call(StoreCall::Create);
        if let Some(failure) = self
            .create_failure
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take()
        {
            return Err(failure);
        }
        let n = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        let record = TriggerRecord {
            id: TriggerId::new(format!("Ft{n:04}")),
            spec: spec.clone(),
        };
        self.insert(record.clone());
        Ok(record)
    }

    async fn update(&self, id: &TriggerId, spec: &TriggerSpec) -> Result<TriggerRecord, ApiFailure> {
        self.record_call(StoreCall::Update(id.clone()));
        let mut records = self.records.lock().unwrap_or_else(|e| e.into_inner());
        let record = records
            .iter_mut()
            .find(|r| r.id == *id)
            .ok_or_else(|| ApiFailure::new("trigger_not_found"))?;
        record.spec = spec.clone();
        Ok(record.clone())
    }
}

/// Channel membership double.
///
/// Channels in `members` answer `AlreadyMember`, channels with a scripted
/// failure answer with it, everything else joins. Each join sleeps for
/// `latency` so concurrent fan-out can be observed via [`Self::max_in_flight`].
#[derive(Default)]
pub struct InMemoryMembership {
    members: Mutex<HashSet<ChannelId>>,
    failures: Mutex<HashMap<ChannelId, ApiFailure>>,
    attempts: Mutex<Vec<ChannelId>>,
    latency: Duration,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl InMemoryMembership {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    #[must_use]
    pub fn with_member(self, channel: impl Into<ChannelId>) -> Self {
        self.members
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(channel.into());
        self
    }

    #[must_use]
    pub fn with_failure(self, channel: impl Into<ChannelId>, failure: ApiFailure) -> Self {
        self.failures
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(channel.into(), failure);
        self
    }

    /// Channels a join was attempted for, in call order.
    pub fn attempts(&self) -> Vec<ChannelId> {
        self.attempts
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub fn is_member(&self, channel: &ChannelId) -> bool {
        self.members
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .contains(channel)
    }

    /// Highest number of joins observed in flight at once.
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ChannelMembership for InMemoryMembership {
    async fn join(&self, channel: &ChannelId) -> Result<JoinStatus, ApiFailure> {
        self.attempts
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(channel.clone());

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if let Some(failure) = self
            .failures
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(channel)
        {
            return Err(failure.clone());
        }

        let mut members = self.members.lock().unwrap_or_else(|e| e.into_inner());
        if members.insert(channel.clone()) {
            Ok(JoinStatus::Joined)
        } else {
            Ok(JoinStatus::AlreadyMember)
        }
    }
}

/// View surface that records every opened view.
#[derive(Default)]
pub struct InMemoryViews {
    opened: Mutex<VecDeque<(InteractivityPointer, ModalView)>>,
    failure: Mutex<Option<ApiFailure>>,
}

impl InMemoryViews {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_next_open(&self, failure: ApiFailure) {
        *self.failure.lock().unwrap_or_else(|e| e.into_inner()) = Some(failure);
    }

    pub fn opened(&self) -> Vec<(InteractivityPointer, ModalView)> {
        self.opened
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .cloned()
            .collect()
    }
}

#[async_trait]
impl ViewSurface for InMemoryViews {
    async fn open(&self, pointer: &InteractivityPointer, view: &ModalView) -> Result<(), ApiFailure> {
        if let Some(failure) = self.failure.lock().unwrap_or_else(|e| e.into_inner()).take() {
            return Err(failure);
        }
        self.opened
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push_back((pointer.clone(), view.clone()));
        Ok(())
    }
}
