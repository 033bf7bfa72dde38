//! Block Kit rendering of modal views and view-submission handling.

use std::collections::HashMap;

use {
    async_trait::async_trait,
    configurator_triggers::{
        ApiFailure, ChannelScope, SubmissionResponse, ViewSubmission,
        view::{
            CHANNELS_ACTION_ID, CHANNELS_BLOCK_ID, InteractivityPointer, ModalView, ViewBody,
            ViewSurface,
        },
    },
    serde::{Deserialize, Serialize},
    serde_json::{Value, json},
    tracing::debug,
};

use crate::{
    client::SlackClient,
    error::{Context, Result},
};

fn plain_text(text: &str) -> Value {
    json!({ "type": "plain_text", "text": text })
}

fn render_blocks(body: &ViewBody) -> Vec<Value> {
    match body {
        ViewBody::ChannelPicker {
            block_id,
            action_id,
            label,
            initial_channels,
        } => vec![json!({
            "type": "input",
            "block_id": block_id,
            "element": {
                "type": "multi_channels_select",
                "initial_channels": initial_channels,
                "action_id": action_id,
            },
            "label": plain_text(label),
        })],
        ViewBody::Notice { markdown } => vec![json!({
            "type": "section",
            "text": { "type": "mrkdwn", "text": markdown },
        })],
    }
}

/// Render a [`ModalView`] as a Block Kit `modal` view object.
pub fn render_view(view: &ModalView) -> Value {
    let mut rendered = json!({
        "type": "modal",
        "callback_id": view.callback_id,
        "title": plain_text(&view.title),
        "close": plain_text(&view.close),
        "blocks": render_blocks(&view.body),
    });
    if let Some(submit) = &view.submit {
        rendered["submit"] = plain_text(submit);
    }
    if let Some(metadata) = &view.private_metadata {
        rendered["private_metadata"] = Value::String(metadata.clone());
    }
    rendered
}

/// The JSON to answer a `view_submission` request with.
pub fn render_submission_response(response: &SubmissionResponse) -> Value {
    match response {
        SubmissionResponse::Update(view) => json!({
            "response_action": "update",
            "view": render_view(view),
        }),
        SubmissionResponse::Error(message) => json!({ "error": message }),
    }
}

#[derive(Debug, Deserialize)]
struct ActionState {
    #[serde(default)]
    selected_channels: Option<ChannelScope>,
}

#[derive(Debug, Default, Deserialize)]
struct ViewState {
    #[serde(default)]
    values: HashMap<String, HashMap<String, ActionState>>,
}

#[derive(Debug, Deserialize)]
struct SubmittedView {
    callback_id: String,
    #[serde(default)]
    private_metadata: Option<String>,
    #[serde(default)]
    state: ViewState,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SubmissionPayload {
    /// The full interaction payload, `{"type": "view_submission", "view": ...}`.
    Interaction { view: SubmittedView },
    /// Just the `view` object.
    View(SubmittedView),
}

/// Parse a `view_submission` payload (or its bare `view` object) into a
/// [`ViewSubmission`].
///
/// The selected channels are read from the channel-picker block. A missing
/// selection is an empty scope.
pub fn parse_view_submission(payload: &str) -> Result<ViewSubmission> {
    let payload: SubmissionPayload =
        serde_json::from_str(payload).context("invalid view_submission payload")?;
    let view = match payload {
        SubmissionPayload::Interaction { view } | SubmissionPayload::View(view) => view,
    };

    let selected_channels = view
        .state
        .values
        .get(CHANNELS_BLOCK_ID)
        .and_then(|block| block.get(CHANNELS_ACTION_ID))
        .and_then(|action| action.selected_channels.clone())
        .unwrap_or_default();

    Ok(ViewSubmission {
        callback_id: view.callback_id,
        private_metadata: view.private_metadata,
        selected_channels,
    })
}

#[derive(Debug, Serialize)]
struct OpenRequest<'a> {
    interactivity_pointer: &'a str,
    view: Value,
}

#[async_trait]
impl ViewSurface for SlackClient {
    async fn open(
        &self,
        pointer: &InteractivityPointer,
        view: &ModalView,
    ) -> std::result::Result<(), ApiFailure> {
        let request = OpenRequest {
            interactivity_pointer: pointer.as_str(),
            view: render_view(view),
        };
        let _: Value = self.call("views.open", &request).await?;
        debug!(callback_id = %view.callback_id, "view opened");
        Ok(())
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use {
        super::*,
        crate::client::tests::client,
        configurator_triggers::{WorkflowRef, view::CONFIGURE_CALLBACK_ID},
        mockito::Matcher,
    };

    fn picker() -> ModalView {
        ModalView::channel_picker(
            "My App",
            &WorkflowRef::new("main_event_workflow"),
            &["C1", "C2"].into_iter().collect(),
        )
    }

    #[test]
    fn channel_picker_block_kit() {
        assert_eq!(
            render_view(&picker()),
            json!({
                "type": "modal",
                "callback_id": "configure-workflow",
                "title": {"type": "plain_text", "text": "My App"},
                "submit": {"type": "plain_text", "text": "Confirm"},
                "close": {"type": "plain_text", "text": "Close"},
                "private_metadata": "main_event_workflow",
                "blocks": [{
                    "type": "input",
                    "block_id": "channels",
                    "element": {
                        "type": "multi_channels_select",
                        "initial_channels": ["C1", "C2"],
                        "action_id": "action"
                    },
                    "label": {"type": "plain_text", "text": "Channels to enable the main workflow"}
                }]
            })
        );
    }

    #[test]
    fn completion_has_no_submit() {
        let rendered = render_view(&ModalView::completion("My App"));
        assert_eq!(rendered["callback_id"], "completion");
        assert!(rendered.get("submit").is_none());
        assert_eq!(rendered["blocks"][0]["type"], "section");
        assert!(
            rendered["blocks"][0]["text"]["text"]
                .as_str()
                .unwrap()
                .starts_with("*You're all set!*")
        );
    }

    #[test]
    fn submission_response_shapes() {
        let update = render_submission_response(&SubmissionResponse::Update(ModalView::completion(
            "My App",
        )));
        assert_eq!(update["response_action"], "update");
        assert_eq!(update["view"]["callback_id"], "completion");

        let error = render_submission_response(&SubmissionResponse::Error("nope".into()));
        assert_eq!(error, json!({"error": "nope"}));
    }

    #[test]
    fn parses_full_interaction_payload() {
        let payload = json!({
            "type": "view_submission",
            "view": {
                "callback_id": "configure-workflow",
                "private_metadata": "wf-main",
                "state": {"values": {
                    "channels": {"action": {
                        "type": "multi_channels_select",
                        "selected_channels": ["C1", "C2", "C1"]
                    }}
                }}
            }
        })
        .to_string();

        let submission = parse_view_submission(&payload).unwrap();
        assert_eq!(submission.callback_id, CONFIGURE_CALLBACK_ID);
        assert_eq!(submission.private_metadata.as_deref(), Some("wf-main"));
        assert_eq!(
            submission.selected_channels,
            ["C1", "C2"].into_iter().collect::<ChannelScope>()
        );
    }

    #[test]
    fn parses_bare_view_without_selection() {
        let payload = r#"{"callback_id":"configure-workflow","state":{"values":{}}}"#;
        let submission = parse_view_submission(payload).unwrap();
        assert!(submission.selected_channels.is_empty());
        assert!(submission.private_metadata.is_none());
    }

    #[test]
    fn rejects_garbage() {
        let err = parse_view_submission("{\"hello\": 1}").unwrap_err();
        assert!(err.to_string().starts_with("invalid view_submission payload"));
    }

    #[tokio::test]
    async fn open_posts_pointer_and_view() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/views.open")
            .match_body(Matcher::PartialJson(json!({
                "interactivity_pointer": "ptr-1",
                "view": {"callback_id": "configure-workflow", "private_metadata": "main_event_workflow"}
            })))
            .with_status(200)
            .with_body(r#"{"ok":true,"view":{"id":"V1"}}"#)
            .create_async()
            .await;

        client(&server)
            .open(&InteractivityPointer::new("ptr-1"), &picker())
            .await
            .unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn open_failure_keeps_code() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/views.open")
            .with_status(200)
            .with_body(r#"{"ok":false,"error":"expired_trigger_id"}"#)
            .create_async()
            .await;

        let err = client(&server)
            .open(&InteractivityPointer::new("stale"), &picker())
            .await
            .unwrap_err();
        assert_eq!(err.code, "expired_trigger_id");
    }
}
