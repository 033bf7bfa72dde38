use {
    anyhow::Result,
    configurator_triggers::{ChannelScope, JoinOutcome, ReconcileRequest, UpsertAction},
    tracing::info,
};

use crate::app::App;

pub async fn configure(app: &App, channels: Vec<String>, workflow: Option<String>) -> Result<()> {
    let workflow = app.workflow(workflow);
    let channels: ChannelScope = channels.into_iter().collect();
    info!(workflow = %workflow, channels = channels.len(), "configuring trigger");

    let result = app
        .reconciler
        .reconcile(&ReconcileRequest::new(workflow, channels))
        .await?;

    println!(
        "{} trigger {} for {}",
        match result.action {
            UpsertAction::Create => "Created",
            UpsertAction::Update => "Updated",
        },
        result.trigger.id,
        result.trigger.spec.workflow.path()
    );
    for join in &result.joins {
        println!("  <#{}> {}", join.channel, join_note(&join.outcome));
    }
    Ok(())
}

/// `ReconcileResult::joins` only ever holds successful joins.
fn join_note(outcome: &JoinOutcome) -> &'static str {
    if *outcome == JoinOutcome::AlreadyMember {
        "already a member"
    } else {
        "joined"
    }
}

pub async fn status(app: &App, workflow: Option<String>) -> Result<()> {
    let workflow = app.workflow(workflow);
    match app.reconciler.current_trigger_strict(&workflow).await? {
        Some(record) => {
            println!("Trigger:  {}", record.id);
            println!("Name:     {}", record.spec.name);
            println!("Workflow: {}", record.spec.workflow.path());
            println!("Event:    {}", record.spec.event_kind);
            let channels: Vec<&str> = record
                .spec
                .channel_scope
                .iter()
                .map(|c| c.as_str())
                .collect();
            if channels.is_empty() {
                println!("Channels: (none)");
            } else {
                println!("Channels: {}", channels.join(", "));
            }
        },
        None => println!("No trigger configured for {}", workflow.path()),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn join_notes() {
        assert_eq!(join_note(&JoinOutcome::Joined), "joined");
        assert_eq!(join_note(&JoinOutcome::AlreadyMember), "already a member");
    }
}
