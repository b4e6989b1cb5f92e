use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::config::WorkloadProfile;
use crate::error::{AppError, AppResult};
use crate::models::metrics::{DataPoints, TaskPriority, TaskStatus};
use crate::models::risk::RiskAssessment;
use crate::utils::lenient::parse_datetime;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
pub enum AnalyticsRangeKey {
    #[serde(rename = "7d")]
    SevenDays,
    #[default]
    #[serde(rename = "30d")]
    ThirtyDays,
    #[serde(rename = "90d")]
    NinetyDays,
}

impl AnalyticsRangeKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnalyticsRangeKey::SevenDays => "7d",
            AnalyticsRangeKey::ThirtyDays => "30d",
            AnalyticsRangeKey::NinetyDays => "90d",
        }
    }

    pub fn duration(&self) -> Duration {
        match self {
            AnalyticsRangeKey::SevenDays => Duration::days(7),
            AnalyticsRangeKey::ThirtyDays => Duration::days(30),
            AnalyticsRangeKey::NinetyDays => Duration::days(90),
        }
    }
}

/// Query surface passed down from the HTTP boundary.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct AnalyticsQueryParams {
    pub range: AnalyticsRangeKey,
    pub from: Option<String>,
    pub to: Option<String>,
    pub project_ids: Option<Vec<String>>,
    pub category: Option<String>,
    pub priority: Option<String>,
    /// Workload unit for this call path; the dashboard unit when absent.
    pub workload_profile: Option<WorkloadProfile>,
}

/// Closed UTC interval used for KPI windows and chart bucketing.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DateRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl DateRange {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> AppResult<Self> {
        if start > end {
            return Err(AppError::validation("range start is after range end"));
        }
        Ok(Self { start, end })
    }

    pub fn trailing(range: AnalyticsRangeKey, now: DateTime<Utc>) -> Self {
        Self {
            start: now - range.duration(),
            end: now,
        }
    }

    /// Explicit `from`/`to` win over the range key; a missing `to` is `now`.
    pub fn resolve(params: &AnalyticsQueryParams, now: DateTime<Utc>) -> AppResult<Self> {
        let end = match params.to.as_deref() {
            Some(value) => parse_query_datetime(value)?,
            None => now,
        };
        let start = match params.from.as_deref() {
            Some(value) => parse_query_datetime(value)?,
            None => end - params.range.duration(),
        };
        Self::new(start, end)
    }

    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        instant >= self.start && instant <= self.end
    }
}

fn parse_query_datetime(value: &str) -> AppResult<DateTime<Utc>> {
    parse_datetime(value).ok_or_else(|| {
        AppError::validation_with_details(
            "malformed range boundary",
            serde_json::json!({ "value": value }),
        )
    })
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum VelocityTrend {
    Increasing,
    Decreasing,
    #[default]
    Stable,
}

impl VelocityTrend {
    pub fn as_str(&self) -> &'static str {
        match self {
            VelocityTrend::Increasing => "increasing",
            VelocityTrend::Decreasing => "decreasing",
            VelocityTrend::Stable => "stable",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct VelocityMetrics {
    pub average_completion_time: f64,
    pub tasks_per_week: f64,
    pub trend: VelocityTrend,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StatusCount {
    pub status: TaskStatus,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PriorityCount {
    pub priority: TaskPriority,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct KpiSummary {
    pub total_projects: usize,
    pub completed_projects: usize,
    pub project_completion_rate: f64,
    pub total_tasks: usize,
    pub completed_tasks: usize,
    pub task_completion_rate: f64,
    pub total_hours_logged: f64,
    pub average_project_duration: f64,
    pub active_users: usize,
    pub total_users: usize,
    pub team_utilization: f64,
    pub status_distribution: Vec<StatusCount>,
    pub priority_distribution: Vec<PriorityCount>,
}

/// One 7-day chart window: `[week_start, week_end]`, both inclusive.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyBucket {
    pub week_start: NaiveDate,
    pub week_end: NaiveDate,
    pub created: usize,
    pub completed: usize,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardResponse {
    pub range: DateRange,
    pub kpis: KpiSummary,
    pub weekly: Vec<WeeklyBucket>,
    pub risk_assessment: RiskAssessment,
    pub velocity: VelocityMetrics,
    pub generated_at: String,
    pub data_points: DataPoints,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskResponse {
    pub risk_assessment: RiskAssessment,
    pub generated_at: String,
    pub data_points: DataPoints,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VelocityResponse {
    pub velocity: VelocityMetrics,
    pub generated_at: String,
    pub data_points: DataPoints,
}
