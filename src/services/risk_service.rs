use chrono::{DateTime, Duration, Utc};
use tracing::debug;

use crate::config::{AnalyticsThresholds, RiskBand, RISK_SCORE_MAX};
use crate::models::metrics::{ProjectMetric, TaskMetric, TaskStatus, TeamMemberMetric};
use crate::models::risk::{RiskAssessment, RiskFinding, RiskLevel, RiskRatios, RiskType};
use crate::utils::numeric::{round_to, safe_ratio};

/// Budget, timeline and workload risk over one normalized dataset.
#[derive(Debug, Clone, Default)]
pub struct RiskAssessor {
    thresholds: AnalyticsThresholds,
}

impl RiskAssessor {
    pub fn new(thresholds: AnalyticsThresholds) -> Self {
        Self { thresholds }
    }

    pub fn thresholds(&self) -> &AnalyticsThresholds {
        &self.thresholds
    }

    pub fn ratios(
        &self,
        projects: &[ProjectMetric],
        tasks: &[TaskMetric],
        team: &[TeamMemberMetric],
        now: DateTime<Utc>,
    ) -> RiskRatios {
        let over_budget = projects
            .iter()
            .filter(|project| project.spent > project.budget * self.thresholds.budget_spend_ratio)
            .count();

        let stale_after = Duration::days(self.thresholds.stale_task_days);
        let stale = tasks
            .iter()
            .filter(|task| {
                task.status != TaskStatus::Done
                    && task.completed_at.is_none()
                    && now - task.created_at > stale_after
            })
            .count();

        let overloaded = team
            .iter()
            .filter(|member| member.workload > self.thresholds.workload_overload_percent)
            .count();

        RiskRatios {
            budget: safe_ratio(over_budget as f64, projects.len() as f64),
            timeline: safe_ratio(stale as f64, tasks.len() as f64),
            workload: safe_ratio(overloaded as f64, team.len() as f64),
        }
    }

    pub fn assess(
        &self,
        projects: &[ProjectMetric],
        tasks: &[TaskMetric],
        team: &[TeamMemberMetric],
        now: DateTime<Utc>,
    ) -> RiskAssessment {
        let ratios = self.ratios(projects, tasks, team, now);

        let findings: Vec<RiskFinding> = [
            (RiskType::Budget, ratios.budget, self.thresholds.budget),
            (RiskType::Timeline, ratios.timeline, self.thresholds.timeline),
            (RiskType::Workload, ratios.workload, self.thresholds.workload),
        ]
        .into_iter()
        .filter_map(|(kind, ratio, band)| finding_for(kind, ratio, band))
        .collect();

        let overall_risk = overall_level(&findings);
        let risk_score = round_to(
            ((ratios.budget + ratios.timeline + ratios.workload)
                * self.thresholds.risk_score_weight)
                .min(RISK_SCORE_MAX),
            2,
        );

        debug!(
            target: "app::risk",
            budget = ratios.budget,
            timeline = ratios.timeline,
            workload = ratios.workload,
            findings = findings.len(),
            overall = %overall_risk,
            "risk assessed"
        );

        RiskAssessment {
            overall_risk,
            risk_score,
            ratios,
            findings,
        }
    }
}

fn finding_for(kind: RiskType, ratio: f64, band: RiskBand) -> Option<RiskFinding> {
    if ratio <= band.trigger {
        return None;
    }
    let level = if ratio > band.high {
        RiskLevel::High
    } else {
        RiskLevel::Medium
    };
    let percent = (ratio * 100.0).round();

    let (description, mitigation) = match kind {
        RiskType::Budget => (
            format!("{percent}% of projects have consumed most of their budget"),
            "Review spending on the affected projects and re-baseline budgets where scope changed",
        ),
        RiskType::Timeline => (
            format!("{percent}% of open tasks have been waiting for more than a week"),
            "Triage stale tasks, re-prioritize the backlog and unblock dependencies",
        ),
        RiskType::Workload => (
            format!("{percent}% of team members are above their workload limit"),
            "Redistribute assignments and defer non-critical work for overloaded members",
        ),
    };

    Some(RiskFinding {
        kind,
        level,
        description,
        mitigation: mitigation.to_string(),
    })
}

/// `high` if any finding is high, `medium` if any finding exists.
pub fn overall_level(findings: &[RiskFinding]) -> RiskLevel {
    findings
        .iter()
        .map(|finding| finding.level)
        .max()
        .unwrap_or(RiskLevel::Low)
}
