//! Semantic checks on a loaded configuration.

use secrecy::ExposeSecret;

use crate::schema::ConfiguratorConfig;

/// Severity level for a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Error,
    Warning,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Error => write!(f, "error"),
            Self::Warning => write!(f, "warning"),
        }
    }
}

/// A single validation diagnostic.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub severity: Severity,
    /// Dotted path, e.g. "slack.bot_token"
    pub path: String,
    pub message: String,
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} [{}]: {}", self.severity, self.path, self.message)
    }
}

/// Result of validating a configuration.
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    pub diagnostics: Vec<Diagnostic>,
}

impl ValidationResult {
    /// Returns `true` if any diagnostic is an error.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|d| d.severity == Severity::Error)
    }

    #[must_use]
    pub fn count(&self, severity: Severity) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == severity)
            .count()
    }

    fn push(&mut self, severity: Severity, path: &str, message: impl Into<String>) {
        self.diagnostics.push(Diagnostic {
            severity,
            path: path.to_string(),
            message: message.into(),
        });
    }
}

/// Validate a loaded configuration.
#[must_use]
pub fn validate(config: &ConfiguratorConfig) -> ValidationResult {
    let mut result = ValidationResult::default();

    let token = config.slack.bot_token.expose_secret();
    if token.trim().is_empty() {
        result.push(
            Severity::Error,
            "slack.bot_token",
            "bot token is empty; set SLACK_BOT_TOKEN or slack.bot_token",
        );
    } else if token.starts_with("${") {
        result.push(
            Severity::Error,
            "slack.bot_token",
            format!("unresolved placeholder {token}"),
        );
    } else if !token.starts_with("xoxb-") {
        result.push(
            Severity::Warning,
            "slack.bot_token",
            "token does not look like a bot token (expected xoxb-…)",
        );
    }

    let base = &config.slack.api_base_url;
    if !(base.starts_with("https://") || base.starts_with("http://")) {
        result.push(
            Severity::Error,
            "slack.api_base_url",
            format!("'{base}' is not an http(s) URL"),
        );
    }

    if config.slack.timeout_secs == 0 {
        result.push(
            Severity::Error,
            "slack.timeout_secs",
            "timeout must be greater than zero",
        );
    }

    let trigger = &config.trigger;
    if trigger.workflow.trim().is_empty() {
        result.push(Severity::Error, "trigger.workflow", "workflow is empty");
    } else if trigger.workflow.contains('/') {
        result.push(
            Severity::Error,
            "trigger.workflow",
            "expected a bare callback id, not a `#/workflows/…` reference",
        );
    }
    if trigger.name.trim().is_empty() {
        result.push(Severity::Error, "trigger.name", "trigger name is empty");
    }
    if !trigger.event_type.contains("#/events/") {
        result.push(
            Severity::Warning,
            "trigger.event_type",
            format!("'{}' is not a `…#/events/…` tag", trigger.event_type),
        );
    }
    if trigger.inputs.is_empty() {
        result.push(
            Severity::Warning,
            "trigger.inputs",
            "no input bindings; the workflow receives no event data",
        );
    }
    for (param, template) in &trigger.inputs {
        if !(template.starts_with("{{data.") && template.ends_with("}}")) {
            result.push(
                Severity::Error,
                &format!("trigger.inputs.{param}"),
                format!("'{template}' is not a {{{{data.…}}}} template"),
            );
        }
    }

    result
}
