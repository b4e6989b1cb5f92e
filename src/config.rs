//! Heuristic thresholds shared by the derivation pipelines and the fallback
//! generators. Every magic number used by risk, velocity, workload and the
//! deterministic fallbacks lives here.

use serde::{Deserialize, Serialize};

/// A project is over budget pressure once `spent > budget * BUDGET_SPEND_RATIO`.
pub const BUDGET_SPEND_RATIO: f64 = 0.8;
pub const BUDGET_RISK_TRIGGER: f64 = 0.3;
pub const BUDGET_RISK_HIGH: f64 = 0.6;

/// Open tasks older than this many days count against the timeline.
pub const STALE_TASK_DAYS: i64 = 7;
pub const TIMELINE_RISK_TRIGGER: f64 = 0.2;
pub const TIMELINE_RISK_HIGH: f64 = 0.4;

/// Workload percentage above which a member is considered overloaded.
pub const WORKLOAD_OVERLOAD_PERCENT: f64 = 80.0;
pub const WORKLOAD_RISK_TRIGGER: f64 = 0.3;
pub const WORKLOAD_RISK_HIGH: f64 = 0.5;

pub const RISK_SCORE_WEIGHT: f64 = 33.33;
pub const RISK_SCORE_MAX: f64 = 100.0;

pub const VELOCITY_WINDOW_DAYS: i64 = 28;
pub const VELOCITY_WINDOW_WEEKS: f64 = 4.0;
pub const TREND_INCREASE_FACTOR: f64 = 1.2;
pub const TREND_DECREASE_FACTOR: f64 = 0.8;

/// Workload points per active task on the dashboard team view.
pub const WORKLOAD_UNIT_DASHBOARD: f64 = 10.0;
/// Workload points per active task on the per-project team view.
///
/// The two call paths historically disagree (10 vs 15). Both are kept until
/// product confirms which one is intended.
pub const WORKLOAD_UNIT_PROJECT_TEAM: f64 = 15.0;

pub const FALLBACK_COMPLETION_HORIZON_DAYS: i64 = 30;
pub const FALLBACK_COMPLETION_CONFIDENCE: f64 = 0.70;
pub const FALLBACK_BUDGET_OVERRUN_RISK: f64 = 0.25;
pub const FALLBACK_BURNOUT_RISK: f64 = 0.30;
pub const FALLBACK_BUDGET_ALERT_CONFIDENCE: f64 = 0.95;
pub const FALLBACK_WORKLOAD_ALERT_CONFIDENCE: f64 = 0.90;
pub const FALLBACK_HEALTHY_CONFIDENCE: f64 = 0.90;

pub const DEFAULT_ORACLE_TIMEOUT_SECS: u64 = 20;
pub const MAX_ORACLE_TIMEOUT_SECS: u64 = 120;

/// Selects which workload unit a normalization pass applies.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub enum WorkloadProfile {
    #[default]
    Dashboard,
    ProjectTeam,
}

impl WorkloadProfile {
    pub fn unit(self) -> f64 {
        match self {
            WorkloadProfile::Dashboard => WORKLOAD_UNIT_DASHBOARD,
            WorkloadProfile::ProjectTeam => WORKLOAD_UNIT_PROJECT_TEAM,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            WorkloadProfile::Dashboard => "dashboard",
            WorkloadProfile::ProjectTeam => "projectTeam",
        }
    }
}

/// Trigger/high pair for one risk dimension.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RiskBand {
    pub trigger: f64,
    pub high: f64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct AnalyticsThresholds {
    pub budget_spend_ratio: f64,
    pub budget: RiskBand,
    pub stale_task_days: i64,
    pub timeline: RiskBand,
    pub workload_overload_percent: f64,
    pub workload: RiskBand,
    pub risk_score_weight: f64,
}

impl Default for AnalyticsThresholds {
    fn default() -> Self {
        Self {
            budget_spend_ratio: BUDGET_SPEND_RATIO,
            budget: RiskBand {
                trigger: BUDGET_RISK_TRIGGER,
                high: BUDGET_RISK_HIGH,
            },
            stale_task_days: STALE_TASK_DAYS,
            timeline: RiskBand {
                trigger: TIMELINE_RISK_TRIGGER,
                high: TIMELINE_RISK_HIGH,
            },
            workload_overload_percent: WORKLOAD_OVERLOAD_PERCENT,
            workload: RiskBand {
                trigger: WORKLOAD_RISK_TRIGGER,
                high: WORKLOAD_RISK_HIGH,
            },
            risk_score_weight: RISK_SCORE_WEIGHT,
        }
    }
}
