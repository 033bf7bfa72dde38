//! Slack Web API adapter for the trigger configurator.
//!
//! Implements the engine's collaborator traits over plain HTTPS calls:
//! `workflows.triggers.*` for [`TriggerRepository`], `conversations.join`
//! for [`ChannelMembership`], and `views.open` for [`ViewSurface`]. Also
//! parses view-submission payloads and renders the responses Slack expects.
//!
//! [`TriggerRepository`]: configurator_triggers::TriggerRepository
//! [`ChannelMembership`]: configurator_triggers::ChannelMembership
//! [`ViewSurface`]: configurator_triggers::view::ViewSurface

pub mod client;
pub mod conversations;
pub mod error;
pub mod triggers;
pub mod views;

pub use {
    client::SlackClient,
    error::{Error, Result},
    views::{parse_view_submission, render_submission_response, render_view},
};
