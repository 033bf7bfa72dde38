//! Core data types for trigger reconciliation.

use std::{collections::BTreeMap, fmt, str::FromStr};

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::ApiFailure;

const WORKFLOW_PATH_PREFIX: &str = "#/workflows/";

/// Identifies the workflow a trigger invokes, by its callback id.
///
/// Accepts either the bare callback id or the `#/workflows/<id>` reference
/// form used on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct WorkflowRef(String);

impl WorkflowRef {
    pub fn new(reference: impl Into<String>) -> Self {
        let reference = reference.into();
        match reference.strip_prefix(WORKFLOW_PATH_PREFIX) {
            Some(callback_id) => Self(callback_id.to_string()),
            None => Self(reference),
        }
    }

    pub fn callback_id(&self) -> &str {
        &self.0
    }

    /// Path-like reference, e.g. `#/workflows/main_event_workflow`.
    pub fn path(&self) -> String {
        format!("{WORKFLOW_PATH_PREFIX}{}", self.0)
    }
}

impl fmt::Display for WorkflowRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for WorkflowRef {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl From<&str> for WorkflowRef {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<WorkflowRef> for String {
    fn from(value: WorkflowRef) -> Self {
        value.0
    }
}

/// Event type a trigger listens for.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum EventKind {
    ReactionAdded,
    ChannelCreated,
    MessagePosted,
    /// A tag this engine does not model. Preserved verbatim.
    Other(String),
}

impl EventKind {
    pub fn as_str(&self) -> &str {
        match self {
            Self::ReactionAdded => "slack#/events/reaction_added",
            Self::ChannelCreated => "slack#/events/channel_created",
            Self::MessagePosted => "slack#/events/message_posted",
            Self::Other(tag) => tag,
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventKind {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "slack#/events/reaction_added" => Self::ReactionAdded,
            "slack#/events/channel_created" => Self::ChannelCreated,
            "slack#/events/message_posted" => Self::MessagePosted,
            other => Self::Other(other.to_string()),
        })
    }
}

impl From<String> for EventKind {
    fn from(value: String) -> Self {
        match value.parse() {
            Ok(kind) => kind,
            Err(never) => match never {},
        }
    }
}

impl From<EventKind> for String {
    fn from(value: EventKind) -> Self {
        match value {
            EventKind::Other(tag) => tag,
            known => known.as_str().to_string(),
        }
    }
}

/// A channel (conversation) identifier, e.g. `C0123ABCD`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChannelId(String);

impl ChannelId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ChannelId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for ChannelId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// The set of channels a trigger is restricted to.
///
/// Keeps first-insertion order and drops duplicates. Order matters: join
/// failures are reported by position in this list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ChannelScope(Vec<ChannelId>);

impl ChannelScope {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a channel. Returns `false` when it was already present.
    pub fn insert(&mut self, channel: impl Into<ChannelId>) -> bool {
        let channel = channel.into();
        if self.0.contains(&channel) {
            return false;
        }
        self.0.push(channel);
        true
    }

    pub fn contains(&self, channel: &ChannelId) -> bool {
        self.0.contains(channel)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ChannelId> {
        self.0.iter()
    }

    pub fn as_slice(&self) -> &[ChannelId] {
        &self.0
    }
}

impl<T: Into<ChannelId>> FromIterator<T> for ChannelScope {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut scope = Self::new();
        for channel in iter {
            scope.insert(channel);
        }
        scope
    }
}

impl<'a> IntoIterator for &'a ChannelScope {
    type IntoIter = std::slice::Iter<'a, ChannelId>;
    type Item = &'a ChannelId;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl<'de> Deserialize<'de> for ChannelScope {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let channels = Vec::<ChannelId>::deserialize(deserializer)?;
        Ok(channels.into_iter().collect())
    }
}

/// A single static input binding, e.g. `{ "value": "{{data.user_id}}" }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputBinding {
    pub value: String,
}

/// Workflow input parameter name → templated event field reference.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InputBindings(BTreeMap<String, InputBinding>);

impl InputBindings {
    pub fn insert(&mut self, parameter: impl Into<String>, template: impl Into<String>) {
        self.0.insert(parameter.into(), InputBinding {
            value: template.into(),
        });
    }

    pub fn get(&self, parameter: &str) -> Option<&str> {
        self.0.get(parameter).map(|b| b.value.as_str())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.value.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for InputBindings {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut bindings = Self::default();
        for (parameter, template) in iter {
            bindings.insert(parameter, template);
        }
        bindings
    }
}

/// Desired state of one event trigger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TriggerSpec {
    pub name: String,
    pub workflow: WorkflowRef,
    pub event_kind: EventKind,
    pub channel_scope: ChannelScope,
    pub inputs: InputBindings,
}

/// Identifier assigned to a trigger by the remote store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TriggerId(String);

impl TriggerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TriggerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TriggerId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Actual state of a trigger owned by this app.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TriggerRecord {
    pub id: TriggerId,
    pub spec: TriggerSpec,
}

/// Caller-supplied desired state for one reconciliation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconcileRequest {
    pub workflow: WorkflowRef,
    pub channels: ChannelScope,
}

impl ReconcileRequest {
    pub fn new(workflow: impl Into<WorkflowRef>, channels: ChannelScope) -> Self {
        Self {
            workflow: workflow.into(),
            channels,
        }
    }
}

/// Which write the upsert issued.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertAction {
    Create,
    Update,
}

impl fmt::Display for UpsertAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Create => f.write_str("create"),
            Self::Update => f.write_str("update"),
        }
    }
}

/// Result of asking the bot user to join one channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JoinOutcome {
    Joined,
    AlreadyMember,
    Failed(ApiFailure),
}

impl JoinOutcome {
    pub fn is_success(&self) -> bool {
        !matches!(self, Self::Failed(_))
    }
}

/// Join outcome for a specific channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelJoin {
    pub channel: ChannelId,
    pub outcome: JoinOutcome,
}

/// Outcome of a successful reconciliation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconcileResult {
    pub trigger: TriggerRecord,
    pub action: UpsertAction,
    /// One entry per requested channel, in request order. All successful.
    pub joins: Vec<ChannelJoin>,
}
