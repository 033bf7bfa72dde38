use std::{
    io::Read,
    path::{Path, PathBuf},
};

use {
    anyhow::{Context, Result},
    clap::Subcommand,
    configurator_slack::{parse_view_submission, render_submission_response},
    configurator_triggers::{ModalState, SubmissionResponse, view::InteractivityPointer},
    tracing::info,
};

use crate::app::App;

#[derive(Subcommand)]
pub enum ModalAction {
    /// Open the channel picker (phase one).
    Open {
        /// Interactivity pointer from the triggering user action.
        #[arg(long)]
        interactivity_pointer: String,
        /// Workflow callback id (defaults to `trigger.workflow`).
        #[arg(long)]
        workflow: Option<String>,
    },
    /// Handle a submitted picker (phase two) and print the response JSON.
    Submit {
        /// Path to the `view_submission` payload, or `-` for stdin.
        #[arg(long)]
        payload: PathBuf,
    },
}

pub async fn handle_modal(action: ModalAction, app: &App) -> Result<()> {
    match action {
        ModalAction::Open {
            interactivity_pointer,
            workflow,
        } => {
            let workflow = app.workflow(workflow);
            let state = app
                .modal
                .open(
                    &InteractivityPointer::new(interactivity_pointer),
                    Some(&workflow),
                )
                .await
                .map_err(|e| anyhow::anyhow!(e.user_message()))?;
            info!(workflow = %workflow, ?state, "modal opened");
            println!("Opened configuration modal for {}", workflow.path());
            Ok(())
        },
        ModalAction::Submit { payload } => {
            let raw = read_payload(&payload)?;
            let submission = parse_view_submission(&raw)?;
            let response = app.modal.submit(&submission).await;
            println!(
                "{}",
                serde_json::to_string_pretty(&render_submission_response(&response))?
            );
            ensure_reconciled(&response)
        },
    }
}

/// The response JSON is already on stdout; a failed submission still has to
/// end with a non-zero status.
fn ensure_reconciled(response: &SubmissionResponse) -> Result<()> {
    match response.state() {
        ModalState::Failed => anyhow::bail!("view submission was answered with an error"),
        ModalState::Opened | ModalState::Reconciled => Ok(()),
    }
}

pub(crate) fn read_payload(path: &Path) -> Result<String> {
    if path == Path::new("-") {
        let mut raw = String::new();
        std::io::stdin()
            .read_to_string(&mut raw)
            .context("failed to read payload from stdin")?;
        return Ok(raw);
    }
    std::fs::read_to_string(path)
        .with_context(|| format!("failed to read payload from {}", path.display()))
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use {
        super::*,
        configurator_triggers::view::ModalView,
        std::io::Write,
    };

    #[test]
    fn failed_submission_is_an_error() {
        let failed = SubmissionResponse::Error("Failed to join channels due to x.".into());
        let err = ensure_reconciled(&failed).unwrap_err();
        assert!(err.to_string().contains("answered with an error"));

        let done = SubmissionResponse::Update(ModalView::completion("My App"));
        assert!(ensure_reconciled(&done).is_ok());
    }

    #[test]
    fn reads_payload_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"callback_id":"configure-workflow"}}"#).unwrap();
        let raw = read_payload(file.path()).unwrap();
        assert!(raw.contains("configure-workflow"));
    }

    #[test]
    fn missing_payload_file_names_path() {
        let err = read_payload(Path::new("/nonexistent/payload.json")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/payload.json"));
    }
}
