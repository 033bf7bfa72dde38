use crate::types::{ChannelId, UpsertAction, WorkflowRef};

/// Opaque failure payload returned by the remote store.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{code}{}", detail_suffix(.detail))]
pub struct ApiFailure {
    /// Machine-readable code, e.g. `channel_not_found`.
    pub code: String,
    /// Optional extra context (HTTP body, transport error, warnings).
    pub detail: Option<String>,
}

impl ApiFailure {
    #[must_use]
    pub fn new(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            detail: None,
        }
    }

    #[must_use]
    pub fn with_detail(code: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            detail: Some(detail.into()),
        }
    }
}

fn detail_suffix(detail: &Option<String>) -> String {
    detail
        .as_deref()
        .map(|detail| format!(" ({detail})"))
        .unwrap_or_default()
}

/// Reconciliation failures. Each variant is surfaced as a single terminating
/// message; nothing is retried.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to list triggers: {0}")]
    List(#[source] ApiFailure),

    /// Only produced by [`crate::matcher::find_unique`].
    #[error("{count} triggers match workflow {workflow}")]
    MatchAmbiguous { workflow: WorkflowRef, count: usize },

    #[error("failed to {action} trigger: {failure}")]
    Upsert {
        action: UpsertAction,
        #[source]
        failure: ApiFailure,
    },

    /// First failed join in channel order; later failures are dropped.
    #[error("failed to join <#{channel}>: {failure}")]
    Join {
        channel: ChannelId,
        #[source]
        failure: ApiFailure,
    },

    #[error("failed to open view: {0}")]
    View(#[source] ApiFailure),

    #[error("invalid view submission: {message}")]
    InvalidSubmission { message: String },
}

impl Error {
    #[must_use]
    pub fn invalid_submission(message: impl Into<String>) -> Self {
        Self::InvalidSubmission {
            message: message.into(),
        }
    }

    /// The store payload behind this error, when there is one.
    #[must_use]
    pub fn failure(&self) -> Option<&ApiFailure> {
        match self {
            Self::List(failure) | Self::View(failure) => Some(failure),
            Self::Upsert { failure, .. } | Self::Join { failure, .. } => Some(failure),
            Self::MatchAmbiguous { .. } | Self::InvalidSubmission { .. } => None,
        }
    }

    /// Message shown to the person who invoked the workflow.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::List(_) | Self::MatchAmbiguous { .. } | Self::Upsert { .. } => {
                format!("Failed to create/update a trigger due to {self}.")
            },
            Self::Join { .. } => format!("Failed to join channels due to {self}."),
            Self::View(failure) => format!(
                "Failed to open a modal in the configurator workflow. Contact the app \
                 maintainers with the following information - (error: {failure})"
            ),
            Self::InvalidSubmission { .. } => format!("{self}."),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
