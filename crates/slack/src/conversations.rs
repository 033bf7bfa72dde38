//! `conversations.join` as a [`ChannelMembership`].

use {
    async_trait::async_trait,
    configurator_triggers::{
        ApiFailure, ChannelId, ChannelMembership, JoinStatus, membership::ALREADY_IN_CHANNEL,
    },
    serde::{Deserialize, Serialize},
};

use crate::client::SlackClient;

#[derive(Debug, Serialize)]
struct JoinRequest<'a> {
    channel: &'a ChannelId,
}

#[derive(Debug, Deserialize)]
struct JoinResponse {
    #[serde(default)]
    already_in_channel: bool,
    #[serde(default)]
    warning: Option<String>,
}

impl JoinResponse {
    fn status(&self) -> JoinStatus {
        let warned = self
            .warning
            .as_deref()
            .is_some_and(|w| w.split(',').any(|w| w.trim() == ALREADY_IN_CHANNEL));
        if self.already_in_channel || warned {
            JoinStatus::AlreadyMember
        } else {
            JoinStatus::Joined
        }
    }
}

#[async_trait]
impl ChannelMembership for SlackClient {
    async fn join(&self, channel: &ChannelId) -> Result<JoinStatus, ApiFailure> {
        let resp: JoinResponse = self
            .call("conversations.join", &JoinRequest { channel })
            .await?;
        Ok(resp.status())
    }
}
