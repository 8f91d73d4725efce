//! Scenario execution inside the running container.
//!
//! The in-container runner prints free-form text followed by sentinel-marked
//! JSON segments:
//!
//! ```text
//! launching browser...
//! =====TIMELINES=====
//! [{"title": "home", ...}]
//! =====MILESTONES=====
//! [{"title": "loaded", ...}]
//! ```
//!
//! The timelines segment is required, the milestones segment is optional.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};

use crate::client::RuntimeClient;
use crate::config::ContainerSettings;
use crate::error::{ContainerError, ContainerResult};

/// Marks the start of the timelines segment.
pub const TIMELINES_SENTINEL: &str = "=====TIMELINES=====";

/// Marks the start of the milestones segment.
pub const MILESTONES_SENTINEL: &str = "=====MILESTONES=====";

/// Browser options forwarded to the scenario runner.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ScenarioOptions {
    pub use_adblock: bool,
    #[serde(rename = "ignoreHTTPSErrors")]
    pub ignore_https_errors: bool,
    pub locale: Option<String>,
    pub timezone_id: Option<String>,
}

impl ScenarioOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn use_adblock(mut self, enabled: bool) -> Self {
        self.use_adblock = enabled;
        self
    }

    pub fn ignore_https_errors(mut self, enabled: bool) -> Self {
        self.ignore_https_errors = enabled;
        self
    }

    pub fn locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = Some(locale.into());
        self
    }

    pub fn timezone_id(mut self, timezone_id: impl Into<String>) -> Self {
        self.timezone_id = Some(timezone_id.into());
        self
    }

    /// Flags for the runner; options that are unset emit nothing.
    pub fn to_args(&self) -> Vec<String> {
        let mut args = Vec::new();

        if self.use_adblock {
            args.push("--useAdblock".to_string());
        }

        if self.ignore_https_errors {
            args.push("--ignoreHTTPSErrors".to_string());
        }

        if let Some(locale) = self.locale.as_deref().filter(|v| !v.is_empty()) {
            args.push(format!("--locale={}", locale));
        }

        if let Some(timezone_id) = self.timezone_id.as_deref().filter(|v| !v.is_empty()) {
            args.push(format!("--timezoneId={}", timezone_id));
        }

        args
    }
}

/// One scenario run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioRequest {
    /// Scenario reference (path or inline source)
    pub scenario: String,
    /// Target URL
    pub url: String,
    #[serde(default)]
    pub options: ScenarioOptions,
}

impl ScenarioRequest {
    pub fn new(scenario: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            scenario: scenario.into(),
            url: url.into(),
            options: ScenarioOptions::default(),
        }
    }

    pub fn options(mut self, options: ScenarioOptions) -> Self {
        self.options = options;
        self
    }
}

/// Structured output of a scenario run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScenarioResult {
    pub timelines: Vec<Value>,
    pub milestones: Vec<Value>,
}

/// Build the in-container command for a scenario run.
///
/// The scenario and URL are percent-encoded so they survive any quoting the
/// runner applies; the runner decodes them.
pub fn build_scenario_command(settings: &ContainerSettings, request: &ScenarioRequest) -> Vec<String> {
    let mut command = vec![
        settings.interpreter.clone(),
        settings.runner_entry(),
        format!("--scenario={}", urlencoding::encode(&request.scenario)),
        format!("--url={}", urlencoding::encode(&request.url)),
    ];
    command.extend(request.options.to_args());
    command
}

/// Text following `sentinel` up to the next sentinel of either kind.
fn segment<'a>(stdout: &'a str, sentinel: &str) -> Option<&'a str> {
    let start = stdout.find(sentinel)? + sentinel.len();
    let rest = &stdout[start..];
    let end = [TIMELINES_SENTINEL, MILESTONES_SENTINEL]
        .iter()
        .filter_map(|s| rest.find(s))
        .min()
        .unwrap_or(rest.len());
    Some(&rest[..end])
}

fn decode_segment(name: &str, raw: &str) -> ContainerResult<Vec<Value>> {
    serde_json::from_str(raw.trim())
        .map_err(|e| ContainerError::Scenario(format!("Invalid {} output: {}", name, e)))
}

/// Extract timelines and milestones from the runner's stdout.
pub fn parse_scenario_output(stdout: &str) -> ContainerResult<ScenarioResult> {
    let timelines = segment(stdout, TIMELINES_SENTINEL).ok_or_else(|| {
        ContainerError::Scenario(format!("Missing {} in scenario output", TIMELINES_SENTINEL))
    })?;

    let milestones = match segment(stdout, MILESTONES_SENTINEL) {
        Some(raw) => decode_segment("milestones", raw)?,
        None => Vec::new(),
    };

    Ok(ScenarioResult {
        timelines: decode_segment("timelines", timelines)?,
        milestones,
    })
}

/// Runs scenarios inside an already running container.
pub struct ScenarioExecutor {
    client: Arc<dyn RuntimeClient>,
    settings: ContainerSettings,
}

impl ScenarioExecutor {
    pub fn new(client: Arc<dyn RuntimeClient>, settings: ContainerSettings) -> Self {
        Self { client, settings }
    }

    /// Execute a scenario and decode its structured output.
    pub async fn run(&self, request: &ScenarioRequest) -> ContainerResult<ScenarioResult> {
        let command = build_scenario_command(&self.settings, request);
        info!("Running scenario against {}", request.url);

        let output = self
            .client
            .exec(&self.settings.name, &command)
            .await
            .map_err(|e| ContainerError::Scenario(e.to_string()))?;

        if output.has_diagnostics() {
            return Err(ContainerError::Scenario(output.stderr));
        }

        if !output.success() {
            return Err(ContainerError::Scenario(output.failure_message()));
        }

        let result = parse_scenario_output(&output.stdout)?;
        debug!(
            "Scenario produced {} timeline(s) and {} milestone(s) in {}ms",
            result.timelines.len(),
            result.milestones.len(),
            output.duration_ms
        );
        Ok(result)
    }
}
