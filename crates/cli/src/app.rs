use std::sync::Arc;

use {
    anyhow::Result,
    configurator_config::ConfiguratorConfig,
    configurator_slack::SlackClient,
    configurator_triggers::{
        ChannelMembership, ModalConfigurator, Reconciler, TriggerRepository, TriggerTemplate,
        WorkflowRef, view::ViewSurface,
    },
};

/// Engine wired to the Slack Web API.
pub struct App {
    pub reconciler: Arc<Reconciler>,
    pub modal: ModalConfigurator,
    pub default_workflow: WorkflowRef,
}

impl App {
    pub fn from_config(config: &ConfiguratorConfig) -> Result<Self> {
        let client = Arc::new(SlackClient::from_config(&config.slack)?);
        let default_workflow = WorkflowRef::new(config.trigger.workflow.clone());

        let reconciler = Arc::new(Reconciler::new(
            Arc::clone(&client) as Arc<dyn TriggerRepository>,
            Arc::clone(&client) as Arc<dyn ChannelMembership>,
            TriggerTemplate::from(&config.trigger),
        ));
        let modal = ModalConfigurator::new(
            Arc::clone(&reconciler),
            client as Arc<dyn ViewSurface>,
            default_workflow.clone(),
        );

        Ok(Self {
            reconciler,
            modal,
            default_workflow,
        })
    }

    pub fn workflow(&self, requested: Option<String>) -> WorkflowRef {
        requested
            .map(WorkflowRef::new)
            .unwrap_or_else(|| self.default_workflow.clone())
    }
}
