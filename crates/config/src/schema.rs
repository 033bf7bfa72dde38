//! Configuration schema types.

use std::collections::BTreeMap;

use {
    secrecy::{ExposeSecret, Secret},
    serde::{Deserialize, Serialize},
};

/// Root configuration (`configurator.toml`).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfiguratorConfig {
    pub slack: SlackConfig,
    pub trigger: TriggerConfig,
}

/// Slack Web API access for the app's bot user.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SlackConfig {
    /// Bot token (`xoxb-…`). Usually `"${SLACK_BOT_TOKEN}"`.
    #[serde(serialize_with = "serialize_secret")]
    pub bot_token: Secret<String>,

    /// Base URL for Web API methods, without a trailing method name.
    pub api_base_url: String,

    /// Per-request timeout applied by the HTTP client.
    pub timeout_secs: u64,
}

impl std::fmt::Debug for SlackConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SlackConfig")
            .field("bot_token", &"[REDACTED]")
            .field("api_base_url", &self.api_base_url)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

fn serialize_secret<S: serde::Serializer>(
    secret: &Secret<String>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(secret.expose_secret())
}

impl Default for SlackConfig {
    fn default() -> Self {
        Self {
            bot_token: Secret::new(String::new()),
            api_base_url: DEFAULT_API_BASE_URL.into(),
            timeout_secs: 30,
        }
    }
}

pub const DEFAULT_API_BASE_URL: &str = "https://slack.com/api";

/// The trigger this app manages on behalf of its main workflow.
///
/// Every field except `workflow` must stay consistent with the workflow's
/// declared input parameters; the template never depends on the channels.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct TriggerConfig {
    /// Callback id of the workflow the trigger invokes.
    pub workflow: String,

    /// Display name given to the trigger.
    pub name: String,

    /// Event type tag, e.g. `slack#/events/reaction_added`.
    pub event_type: String,

    /// Workflow input parameter → `{{data.…}}` template.
    pub inputs: BTreeMap<String, String>,
}

impl Default for TriggerConfig {
    fn default() -> Self {
        let inputs = [
            ("userId", "{{data.user_id}}"),
            ("channelId", "{{data.channel_id}}"),
            ("messageTs", "{{data.message_ts}}"),
            ("reaction", "{{data.reaction}}"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        Self {
            workflow: "main_event_workflow".into(),
            name: "reaction_added event trigger".into(),
            event_type: "slack#/events/reaction_added".into(),
            inputs,
        }
    }
}
