//! `workflows.triggers.*` as a [`TriggerRepository`].

use std::collections::BTreeMap;

use {
    async_trait::async_trait,
    configurator_triggers::{
        ApiFailure, ChannelScope, EventKind, InputBindings, ListFilter, TriggerId, TriggerRecord,
        TriggerRepository, TriggerSpec, WorkflowRef,
    },
    serde::{Deserialize, Serialize},
    serde_json::Value,
    tracing::{debug, warn},
};

use crate::client::{ResponseMetadata, SlackClient};

const EVENT_TRIGGER_TYPE: &str = "event";

#[derive(Debug, Serialize)]
struct ListRequest {
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    is_owner: bool,
}

#[derive(Debug, Deserialize)]
struct ListResponse {
    #[serde(default)]
    triggers: Vec<WireTrigger>,
    #[serde(default)]
    response_metadata: Option<ResponseMetadata>,
}

#[derive(Debug, Deserialize)]
struct WireWorkflow {
    callback_id: String,
}

#[derive(Debug, Default, Deserialize)]
struct WireEvent {
    #[serde(default)]
    event_type: Option<String>,
    #[serde(default)]
    channel_ids: Option<ChannelScope>,
}

/// A trigger as Slack reports it. Event filters show up either flattened
/// onto the trigger or nested under `event`.
#[derive(Debug, Deserialize)]
struct WireTrigger {
    id: String,
    #[serde(rename = "type", default)]
    trigger_type: String,
    #[serde(default)]
    name: String,
    workflow: WireWorkflow,
    #[serde(default)]
    event_type: Option<String>,
    #[serde(default)]
    channel_ids: Option<ChannelScope>,
    #[serde(default)]
    event: Option<WireEvent>,
    /// Read loosely: triggers this app does not manage may bind static
    /// non-string values, which must not fail the whole list.
    #[serde(default)]
    inputs: Option<BTreeMap<String, Value>>,
}

/// Keep the inputs whose `value` is a string; anything else cannot be one of
/// our `{{data.…}}` bindings.
fn string_inputs(raw: Option<BTreeMap<String, Value>>) -> InputBindings {
    raw.unwrap_or_default()
        .into_iter()
        .filter_map(|(param, binding)| match binding.get("value") {
            Some(Value::String(value)) => Some((param, value.clone())),
            _ => None,
        })
        .collect()
}

impl From<WireTrigger> for TriggerRecord {
    fn from(wire: WireTrigger) -> Self {
        let event = wire.event.unwrap_or_default();
        let event_kind = match wire.event_type.or(event.event_type) {
            Some(tag) => EventKind::from(tag),
            None => EventKind::Other(wire.trigger_type),
        };
        Self {
            id: TriggerId::new(wire.id),
            spec: TriggerSpec {
                name: wire.name,
                workflow: WorkflowRef::new(wire.workflow.callback_id),
                event_kind,
                channel_scope: wire.channel_ids.or(event.channel_ids).unwrap_or_default(),
                inputs: string_inputs(wire.inputs),
            },
        }
    }
}

#[derive(Debug, Serialize)]
struct EventFilter<'a> {
    event_type: &'a EventKind,
    channel_ids: &'a ChannelScope,
}

/// Body of `workflows.triggers.create` and `workflows.triggers.update`.
#[derive(Debug, Serialize)]
struct TriggerDefinition<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    trigger_id: Option<&'a TriggerId>,
    #[serde(rename = "type")]
    trigger_type: &'static str,
    name: &'a str,
    workflow: String,
    event: EventFilter<'a>,
    inputs: &'a InputBindings,
}

impl<'a> TriggerDefinition<'a> {
    fn new(trigger_id: Option<&'a TriggerId>, spec: &'a TriggerSpec) -> Self {
        Self {
            trigger_id,
            trigger_type: EVENT_TRIGGER_TYPE,
            name: &spec.name,
            workflow: spec.workflow.path(),
            event: EventFilter {
                event_type: &spec.event_kind,
                channel_ids: &spec.channel_scope,
            },
            inputs: &spec.inputs,
        }
    }
}

#[derive(Debug, Deserialize)]
struct WrittenTrigger {
    id: String,
}

#[derive(Debug, Deserialize)]
struct WriteResponse {
    trigger: WrittenTrigger,
}

impl SlackClient {
    async fn write_trigger(
        &self,
        method: &str,
        trigger_id: Option<&TriggerId>,
        spec: &TriggerSpec,
    ) -> Result<TriggerRecord, ApiFailure> {
        let body = TriggerDefinition::new(trigger_id, spec);
        let resp: WriteResponse = self.call(method, &body).await?;
        Ok(TriggerRecord {
            id: TriggerId::new(resp.trigger.id),
            spec: spec.clone(),
        })
    }
}

#[async_trait]
impl TriggerRepository for SlackClient {
    async fn list(&self, filter: ListFilter) -> Result<Vec<TriggerRecord>, ApiFailure> {
        let request = ListRequest {
            is_owner: filter.owned_only,
        };
        let resp: ListResponse = self.call("workflows.triggers.list", &request).await?;

        // Only the first page is read.
        if resp.response_metadata.as_ref().is_some_and(ResponseMetadata::has_more) {
            warn!("trigger list is paginated; only the first page was read");
        }
        debug!(count = resp.triggers.len(), "listed triggers");
        Ok(resp.triggers.into_iter().map(TriggerRecord::from).collect())
    }

    async fn create(&self, spec: &TriggerSpec) -> Result<TriggerRecord, ApiFailure> {
        self.write_trigger("workflows.triggers.create", None, spec)
            .await
    }

    async fn update(&self, id: &TriggerId, spec: &TriggerSpec) -> Result<TriggerRecord, ApiFailure> {
        self.write_trigger("workflows.triggers.update", Some(id), spec)
            .await
    }
}
