//! Platform-neutral modal descriptors and the surface that renders them.

use async_trait::async_trait;

use crate::{
    error::ApiFailure,
    types::{ChannelScope, WorkflowRef},
};

/// Callback id of the channel-picker modal; submissions are routed by it.
pub const CONFIGURE_CALLBACK_ID: &str = "configure-workflow";
/// Callback id of the completion modal.
pub const COMPLETION_CALLBACK_ID: &str = "completion";
/// Block holding the channel picker.
pub const CHANNELS_BLOCK_ID: &str = "channels";
/// Action id of the multi-channel select inside [`CHANNELS_BLOCK_ID`].
pub const CHANNELS_ACTION_ID: &str = "action";

/// Opaque token that lets an app open a view in response to a user action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InteractivityPointer(String);

impl InteractivityPointer {
    pub fn new(pointer: impl Into<String>) -> Self {
        Self(pointer.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewBody {
    /// One multi-select channel input.
    ChannelPicker {
        block_id: String,
        action_id: String,
        label: String,
        initial_channels: ChannelScope,
    },
    /// A markdown notice with no inputs.
    Notice { markdown: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModalView {
    pub callback_id: String,
    pub title: String,
    pub submit: Option<String>,
    pub close: String,
    /// Round-trips through the platform untouched; carries resumption context.
    pub private_metadata: Option<String>,
    pub body: ViewBody,
}

impl ModalView {
    /// Phase-one form, pre-filled with the trigger's current channels.
    ///
    /// The workflow reference rides along in `private_metadata` so the
    /// submission can be handled without any in-process state.
    pub fn channel_picker(title: &str, workflow: &WorkflowRef, initial: &ChannelScope) -> Self {
        Self {
            callback_id: CONFIGURE_CALLBACK_ID.into(),
            title: title.into(),
            submit: Some("Confirm".into()),
            close: "Close".into(),
            private_metadata: Some(workflow.callback_id().to_string()),
            body: ViewBody::ChannelPicker {
                block_id: CHANNELS_BLOCK_ID.into(),
                action_id: CHANNELS_ACTION_ID.into(),
                label: "Channels to enable the main workflow".into(),
                initial_channels: initial.clone(),
            },
        }
    }

    pub fn completion(title: &str) -> Self {
        Self {
            callback_id: COMPLETION_CALLBACK_ID.into(),
            title: title.into(),
            submit: None,
            close: "Close".into(),
            private_metadata: None,
            body: ViewBody::Notice {
                markdown: "*You're all set!*\n\nThe main workflow is now available for the \
                           channels :white_check_mark:"
                    .into(),
            },
        }
    }
}

/// Where modals are shown to a human.
#[async_trait]
pub trait ViewSurface: Send + Sync {
    async fn open(&self, pointer: &InteractivityPointer, view: &ModalView) -> Result<(), ApiFailure>;
}
