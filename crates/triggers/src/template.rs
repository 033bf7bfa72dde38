//! The fixed trigger definition every reconciliation writes.

use configurator_config::TriggerConfig;

use crate::types::{ChannelScope, EventKind, InputBindings, TriggerSpec, WorkflowRef};

/// Static part of a trigger definition: name, event kind and input bindings.
///
/// Only the workflow and channel scope vary between reconciliations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TriggerTemplate {
    pub name: String,
    pub event_kind: EventKind,
    pub inputs: InputBindings,
}

impl TriggerTemplate {
    /// `reaction_added` trigger feeding user, channel, message timestamp and
    /// reaction into the workflow.
    pub fn reaction_added() -> Self {
        Self::from(&TriggerConfig::default())
    }

    pub fn spec_for(&self, workflow: &WorkflowRef, channels: &ChannelScope) -> TriggerSpec {
        TriggerSpec {
            name: self.name.clone(),
            workflow: workflow.clone(),
            event_kind: self.event_kind.clone(),
            channel_scope: channels.clone(),
            inputs: self.inputs.clone(),
        }
    }
}

impl Default for TriggerTemplate {
    fn default() -> Self {
        Self::reaction_added()
    }
}

impl From<&TriggerConfig> for TriggerTemplate {
    fn from(config: &TriggerConfig) -> Self {
        Self {
            name: config.name.clone(),
            event_kind: EventKind::from(config.event_type.clone()),
            inputs: config.inputs.iter().collect(),
        }
    }
}
