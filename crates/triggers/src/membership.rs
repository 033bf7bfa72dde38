//! Concurrent channel-join fan-out.

use tracing::{debug, warn};

use crate::{
    error::{ApiFailure, Error, Result},
    repository::{ChannelMembership, JoinStatus},
    types::{ChannelId, ChannelJoin, ChannelScope, JoinOutcome},
};

/// Error code some platforms use for "already a member" instead of a
/// success-shaped response.
pub const ALREADY_IN_CHANNEL: &str = "already_in_channel";

fn classify(result: std::result::Result<JoinStatus, ApiFailure>) -> JoinOutcome {
    match result {
        Ok(JoinStatus::Joined) => JoinOutcome::Joined,
        Ok(JoinStatus::AlreadyMember) => JoinOutcome::AlreadyMember,
        Err(failure) if failure.code == ALREADY_IN_CHANNEL => JoinOutcome::AlreadyMember,
        Err(failure) => JoinOutcome::Failed(failure),
    }
}

/// Per-channel outcomes of one fan-out, in channel-scope order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FanOutReport {
    pub joins: Vec<ChannelJoin>,
}

impl FanOutReport {
    pub fn failures(&self) -> impl Iterator<Item = (&ChannelId, &ApiFailure)> {
        self.joins.iter().filter_map(|join| match &join.outcome {
            JoinOutcome::Failed(failure) => Some((&join.channel, failure)),
            JoinOutcome::Joined | JoinOutcome::AlreadyMember => None,
        })
    }

    /// Collapse into a single outcome: the first failure in channel order
    /// wins, every other failure is discarded.
    pub fn into_result(self) -> Result<Vec<ChannelJoin>> {
        let first = self.joins.iter().find_map(|join| match &join.outcome {
            JoinOutcome::Failed(failure) => Some((join.channel.clone(), failure.clone())),
            JoinOutcome::Joined | JoinOutcome::AlreadyMember => None,
        });
        match first {
            Some((channel, failure)) => Err(Error::Join { channel, failure }),
            None => Ok(self.joins),
        }
    }
}

/// Ask the bot user to join every channel in `channels` at once.
///
/// All requests run to completion before this returns; a failure does not
/// cancel the others. Joining a channel the bot is already in succeeds, so
/// this is safe to repeat on every reconciliation.
pub async fn join_all(membership: &dyn ChannelMembership, channels: &ChannelScope) -> FanOutReport {
    let futures = channels.iter().map(|channel| async move {
        let outcome = classify(membership.join(channel).await);
        match &outcome {
            JoinOutcome::Failed(failure) => {
                warn!(channel = %channel, error = %failure, "failed to join channel");
            },
            JoinOutcome::Joined => debug!(channel = %channel, "joined channel"),
            JoinOutcome::AlreadyMember => debug!(channel = %channel, "already a member"),
        }
        ChannelJoin {
            channel: channel.clone(),
            outcome,
        }
    });

    // join_all preserves input order regardless of completion order.
    let joins = futures::future::join_all(futures).await;
    FanOutReport { joins }
}
