use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProjectStatus {
    Planning,
    Active,
    OnHold,
    Completed,
    Cancelled,
}

impl ProjectStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectStatus::Planning => "PLANNING",
            ProjectStatus::Active => "ACTIVE",
            ProjectStatus::OnHold => "ON_HOLD",
            ProjectStatus::Completed => "COMPLETED",
            ProjectStatus::Cancelled => "CANCELLED",
        }
    }

    /// Unknown values fall back to `Active`.
    pub fn from_raw(value: Option<&str>) -> Self {
        match normalize_token(value).as_deref() {
            Some("planning") | Some("draft") => ProjectStatus::Planning,
            Some("on_hold") | Some("paused") => ProjectStatus::OnHold,
            Some("completed") | Some("done") | Some("closed") => ProjectStatus::Completed,
            Some("cancelled") | Some("canceled") | Some("archived") => ProjectStatus::Cancelled,
            _ => ProjectStatus::Active,
        }
    }
}

impl fmt::Display for ProjectStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskStatus {
    Todo,
    InProgress,
    Review,
    Done,
    Cancelled,
}

impl TaskStatus {
    pub const ALL: [TaskStatus; 5] = [
        TaskStatus::Todo,
        TaskStatus::InProgress,
        TaskStatus::Review,
        TaskStatus::Done,
        TaskStatus::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Todo => "TODO",
            TaskStatus::InProgress => "IN_PROGRESS",
            TaskStatus::Review => "REVIEW",
            TaskStatus::Done => "DONE",
            TaskStatus::Cancelled => "CANCELLED",
        }
    }

    /// Unknown values fall back to `Todo`.
    pub fn from_raw(value: Option<&str>) -> Self {
        match normalize_token(value).as_deref() {
            Some("in_progress") | Some("doing") | Some("started") => TaskStatus::InProgress,
            Some("review") | Some("in_review") => TaskStatus::Review,
            Some("done") | Some("completed") | Some("closed") => TaskStatus::Done,
            Some("cancelled") | Some("canceled") => TaskStatus::Cancelled,
            _ => TaskStatus::Todo,
        }
    }

    /// Counts toward a member's active workload.
    pub fn is_active(&self) -> bool {
        matches!(
            self,
            TaskStatus::Todo | TaskStatus::InProgress | TaskStatus::Review
        )
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskPriority {
    Low,
    Medium,
    High,
    Urgent,
}

impl TaskPriority {
    pub const ALL: [TaskPriority; 4] = [
        TaskPriority::Low,
        TaskPriority::Medium,
        TaskPriority::High,
        TaskPriority::Urgent,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskPriority::Low => "LOW",
            TaskPriority::Medium => "MEDIUM",
            TaskPriority::High => "HIGH",
            TaskPriority::Urgent => "URGENT",
        }
    }

    /// Unknown values fall back to `Medium`.
    pub fn from_raw(value: Option<&str>) -> Self {
        match normalize_token(value).as_deref() {
            Some("low") => TaskPriority::Low,
            Some("high") => TaskPriority::High,
            Some("urgent") | Some("critical") => TaskPriority::Urgent,
            _ => TaskPriority::Medium,
        }
    }
}

impl fmt::Display for TaskPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn normalize_token(value: Option<&str>) -> Option<String> {
    value.map(|raw| raw.trim().to_lowercase().replace(['-', ' '], "_"))
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProjectMetric {
    pub id: String,
    pub name: String,
    pub status: ProjectStatus,
    pub progress: f64,
    pub budget: f64,
    pub spent: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deadline: Option<DateTime<Utc>>,
    pub tasks_completed: u32,
    pub total_tasks: u32,
    pub team_size: u32,
    pub start_date: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TaskMetric {
    pub id: String,
    pub title: String,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    pub estimated_hours: f64,
    pub actual_hours: f64,
    pub assigned_to: String,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TeamMemberMetric {
    pub id: String,
    pub name: String,
    pub role: String,
    pub tasks_completed: u32,
    pub hours_logged: f64,
    pub efficiency: f64,
    pub workload: f64,
}

/// Normalized view of one request's data. Every pipeline reads from this.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsDataset {
    pub projects: Vec<ProjectMetric>,
    pub tasks: Vec<TaskMetric>,
    pub team: Vec<TeamMemberMetric>,
}

impl AnalyticsDataset {
    pub fn is_empty(&self) -> bool {
        self.projects.is_empty() && self.tasks.is_empty()
    }

    pub fn data_points(&self) -> DataPoints {
        DataPoints {
            projects: self.projects.len(),
            tasks: self.tasks.len(),
            team_members: self.team.len(),
        }
    }
}

/// How many normalized records an output was derived from.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct DataPoints {
    pub projects: usize,
    pub tasks: usize,
    pub team_members: usize,
}
