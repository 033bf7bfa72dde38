use std::time::Duration;

use {
    configurator_config::SlackConfig,
    configurator_triggers::ApiFailure,
    secrecy::{ExposeSecret, Secret},
    serde::{Deserialize, Serialize, de::DeserializeOwned},
    tracing::{debug, warn},
};

use crate::error::{Context, Result};

/// Fields every Web API response carries.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct Envelope {
    #[serde(default)]
    pub ok: bool,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub warning: Option<String>,
    #[serde(default)]
    pub response_metadata: Option<ResponseMetadata>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ResponseMetadata {
    #[serde(default)]
    pub messages: Vec<String>,
    #[serde(default)]
    pub next_cursor: Option<String>,
}

impl ResponseMetadata {
    pub(crate) fn has_more(&self) -> bool {
        self.next_cursor.as_deref().is_some_and(|c| !c.is_empty())
    }
}

fn invalid_response(e: serde_json::Error) -> ApiFailure {
    ApiFailure::with_detail("invalid_response", e.to_string())
}

/// Bot-token client for the Slack Web API.
#[derive(Clone)]
pub struct SlackClient {
    http: reqwest::Client,
    base_url: String,
    token: Secret<String>,
}

impl std::fmt::Debug for SlackClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SlackClient")
            .field("base_url", &self.base_url)
            .field("token", &"[REDACTED]")
            .finish_non_exhaustive()
    }
}

impl SlackClient {
    pub fn new(http: reqwest::Client, base_url: impl Into<String>, token: Secret<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            http,
            base_url,
            token,
        }
    }

    pub fn from_config(config: &SlackConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("failed to build Slack HTTP client")?;
        Ok(Self::new(
            http,
            config.api_base_url.clone(),
            config.bot_token.clone(),
        ))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// POST `body` to `method` and decode the `ok: true` response as `T`.
    ///
    /// Every failure mode collapses into an [`ApiFailure`]: transport errors
    /// are `request_failed`, non-2xx statuses are `http_<status>`, and an
    /// undecodable body is `invalid_response`. An `ok: false` envelope keeps
    /// Slack's own error code.
    pub(crate) async fn call<B, T>(
        &self,
        method: &str,
        body: &B,
    ) -> std::result::Result<T, ApiFailure>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = format!("{}/{method}", self.base_url);
        debug!(method, "calling Slack API");

        let resp = self
            .http
            .post(&url)
            .bearer_auth(self.token.expose_secret())
            .json(body)
            .send()
            .await
            .map_err(|e| ApiFailure::with_detail("request_failed", e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            warn!(method, status = status.as_u16(), "Slack API returned an HTTP error");
            let code = format!("http_{}", status.as_u16());
            return Err(if body.is_empty() {
                ApiFailure::new(code)
            } else {
                ApiFailure::with_detail(code, body)
            });
        }

        let text = resp
            .text()
            .await
            .map_err(|e| ApiFailure::with_detail("request_failed", e.to_string()))?;
        let envelope: Envelope = serde_json::from_str(&text).map_err(invalid_response)?;

        if !envelope.ok {
            let code = envelope.error.unwrap_or_else(|| "unknown_error".into());
            let messages = envelope
                .response_metadata
                .map(|m| m.messages)
                .unwrap_or_default();
            debug!(method, error = %code, "Slack API call rejected");
            return Err(if messages.is_empty() {
                ApiFailure::new(code)
            } else {
                ApiFailure::with_detail(code, messages.join("; "))
            });
        }
        if let Some(warning) = envelope.warning.as_deref() {
            debug!(method, warning, "Slack API warning");
        }

        serde_json::from_str(&text).map_err(invalid_response)
    }
}
