//! Trigger reconciliation and channel-membership fan-out.
//!
//! Brings the one event trigger this app manages for a workflow in line with
//! a requested channel set (create if absent, otherwise replace), then makes
//! sure the bot user is a member of every channel. Driven either directly or
//! through a two-phase modal interaction.
//!
//! Remote collaborators are traits ([`TriggerRepository`],
//! [`ChannelMembership`], [`view::ViewSurface`]); `configurator-slack`
//! implements them against the Slack Web API and [`store_memory`] provides
//! in-process doubles.

pub mod error;
pub mod matcher;
pub mod membership;
pub mod modal;
pub mod reconcile;
pub mod repository;
pub mod store_memory;
pub mod template;
pub mod types;
pub mod upsert;
pub mod view;

pub use {
    error::{ApiFailure, Error, Result},
    modal::{ModalConfigurator, ModalState, SubmissionResponse, ViewSubmission},
    reconcile::Reconciler,
    repository::{ChannelMembership, JoinStatus, ListFilter, TriggerRepository},
    template::TriggerTemplate,
    types::{
        ChannelId, ChannelJoin, ChannelScope, EventKind, InputBindings, JoinOutcome,
        ReconcileRequest, ReconcileResult, TriggerId, TriggerRecord, TriggerSpec, UpsertAction,
        WorkflowRef,
    },
};
