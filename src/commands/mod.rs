pub mod ai_commands;
pub mod analytics;

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Map as JsonMap, Value as JsonValue};
use tracing::{debug, error, warn};

use crate::config::AnalyticsThresholds;
use crate::error::{AppError, AppResult};
use crate::models::analytics::AnalyticsQueryParams;
use crate::models::metrics::AnalyticsDataset;
use crate::models::raw::RawWorkspace;
use crate::services::ai_service::OracleConfig;
use crate::services::data_normalizer::{normalize, NormalizeOptions};
use crate::services::insight_orchestrator::InsightOrchestrator;
use crate::services::risk_service::RiskAssessor;

pub type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

/// Shared, immutable wiring for the command surface. Nothing in here changes
/// between requests.
#[derive(Clone)]
pub struct AppState {
    orchestrator: Arc<InsightOrchestrator>,
    risk_assessor: Arc<RiskAssessor>,
    clock: Clock,
}

impl AppState {
    pub fn new(config: &OracleConfig, thresholds: AnalyticsThresholds) -> AppResult<Self> {
        let orchestrator = InsightOrchestrator::from_config(config, thresholds)?;
        Ok(Self::with_orchestrator(orchestrator))
    }

    pub fn from_env() -> AppResult<Self> {
        Self::new(&OracleConfig::from_env(), AnalyticsThresholds::default())
    }

    pub fn with_orchestrator(orchestrator: InsightOrchestrator) -> Self {
        let risk_assessor = Arc::new(RiskAssessor::new(*orchestrator.thresholds()));
        Self {
            orchestrator: Arc::new(orchestrator),
            risk_assessor,
            clock: Arc::new(Utc::now),
        }
    }

    /// Replaces the wall clock, mainly so fixtures stay deterministic.
    pub fn with_clock<F>(mut self, clock: F) -> Self
    where
        F: Fn() -> DateTime<Utc> + Send + Sync + 'static,
    {
        self.clock = Arc::new(clock);
        self
    }

    pub fn now(&self) -> DateTime<Utc> {
        (self.clock)()
    }

    pub fn orchestrator(&self) -> Arc<InsightOrchestrator> {
        Arc::clone(&self.orchestrator)
    }

    pub fn risk(&self) -> Arc<RiskAssessor> {
        Arc::clone(&self.risk_assessor)
    }

    /// Normalizes the workspace for one request. An empty selection is a
    /// `NoData` error rather than an all-zero result.
    pub fn load_dataset(
        &self,
        workspace: &RawWorkspace,
        params: &AnalyticsQueryParams,
        now: DateTime<Utc>,
    ) -> AppResult<AnalyticsDataset> {
        let options = NormalizeOptions::new(now)
            .with_project_ids(params.project_ids.clone())
            .with_workload_profile(params.workload_profile.unwrap_or_default());
        let dataset = normalize(workspace, &options);

        if dataset.is_empty() {
            return Err(AppError::no_data());
        }

        debug!(
            target: "app::command",
            projects = dataset.projects.len(),
            tasks = dataset.tasks.len(),
            "dataset loaded"
        );
        Ok(dataset)
    }
}

pub type CommandResult<T> = Result<T, CommandError>;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandError {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<JsonValue>,
}

impl CommandError {
    pub fn new(
        code: impl Into<String>,
        message: impl Into<String>,
        details: Option<JsonValue>,
    ) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details,
        }
    }
}

impl From<AppError> for CommandError {
    fn from(error: AppError) -> Self {
        match error {
            AppError::Validation { message, details } => {
                CommandError::new("VALIDATION_ERROR", message, details)
            }
            AppError::NoData => CommandError::new(
                "NO_DATA",
                "no analytics data available for the requested selection",
                None,
            ),
            AppError::Ai {
                code,
                message,
                correlation_id,
                details,
            } => {
                let mut merged = JsonMap::new();
                if let Some(existing) = details {
                    match existing {
                        JsonValue::Object(map) => {
                            for (key, value) in map {
                                merged.insert(key, value);
                            }
                        }
                        value => {
                            merged.insert("info".to_string(), value);
                        }
                    }
                }
                if let Some(id) = correlation_id {
                    merged.insert("correlationId".to_string(), JsonValue::String(id));
                }
                let detail_value = if merged.is_empty() {
                    None
                } else {
                    Some(JsonValue::Object(merged))
                };
                warn!(target: "app::command", code = %code, "oracle error reached command boundary");
                CommandError::new(code.as_str(), message, detail_value)
            }
            AppError::Serialization(error) => {
                error!(target: "app::command", error = %error, "serialization error in command");
                CommandError::new("UNKNOWN", "serialization failed", None)
            }
            AppError::Io(error) => {
                error!(target: "app::command", error = %error, "io error in command");
                CommandError::new("UNKNOWN", "filesystem access failed", None)
            }
            AppError::Other(message) => {
                error!(target: "app::command", %message, "unexpected error in command");
                CommandError::new("UNKNOWN", message, None)
            }
        }
    }
}
