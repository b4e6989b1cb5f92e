//! Deterministic stand-ins for the oracle. Each generator mirrors the shape
//! of the matching oracle result and depends only on its inputs.

use chrono::{DateTime, Duration, Utc};

use crate::config::{
    AnalyticsThresholds, FALLBACK_BUDGET_ALERT_CONFIDENCE, FALLBACK_BUDGET_OVERRUN_RISK,
    FALLBACK_BURNOUT_RISK, FALLBACK_COMPLETION_CONFIDENCE, FALLBACK_COMPLETION_HORIZON_DAYS,
    FALLBACK_HEALTHY_CONFIDENCE, FALLBACK_WORKLOAD_ALERT_CONFIDENCE,
};
use crate::models::ai_types::{
    BudgetForecast, CompletionForecast, Impact, Insight, InsightType, PredictiveAnalysis,
    Recommendation, RecommendationCategory, RecommendationPriority, TeamPerformanceForecast,
};
use crate::models::analytics::VelocityTrend;
use crate::models::metrics::AnalyticsDataset;
use crate::services::risk_service::RiskAssessor;

/// Budget and workload alerts driven by the same ratios as the risk
/// assessment. A dataset without alerts gets a single healthy summary.
pub fn fallback_insights(
    dataset: &AnalyticsDataset,
    thresholds: &AnalyticsThresholds,
    now: DateTime<Utc>,
) -> Vec<Insight> {
    let ratios = RiskAssessor::new(*thresholds).ratios(
        &dataset.projects,
        &dataset.tasks,
        &dataset.team,
        now,
    );

    let mut insights = Vec::new();

    if ratios.budget > thresholds.budget.trigger {
        insights.push(Insight {
            kind: InsightType::Warning,
            title: "Budget alert".to_string(),
            description: format!(
                "{:.0}% of projects have spent more than {:.0}% of their budget.",
                ratios.budget * 100.0,
                thresholds.budget_spend_ratio * 100.0
            ),
            confidence: FALLBACK_BUDGET_ALERT_CONFIDENCE,
            action_items: vec![
                "Review spending on the affected projects".to_string(),
                "Re-forecast remaining budget against open scope".to_string(),
                "Escalate projects that will exceed their budget".to_string(),
            ],
            impact: Impact::High,
        });
    }

    if ratios.workload > thresholds.workload.trigger {
        insights.push(Insight {
            kind: InsightType::Warning,
            title: "Team workload alert".to_string(),
            description: format!(
                "{:.0}% of team members are above {:.0}% workload.",
                ratios.workload * 100.0,
                thresholds.workload_overload_percent
            ),
            confidence: FALLBACK_WORKLOAD_ALERT_CONFIDENCE,
            action_items: vec![
                "Rebalance task assignments across the team".to_string(),
                "Postpone non-critical work for overloaded members".to_string(),
            ],
            impact: Impact::Medium,
        });
    }

    if insights.is_empty() {
        insights.push(Insight {
            kind: InsightType::Success,
            title: "Projects on track".to_string(),
            description: "No budget or workload alerts were detected.".to_string(),
            confidence: FALLBACK_HEALTHY_CONFIDENCE,
            action_items: vec!["Keep monitoring weekly progress".to_string()],
            impact: Impact::Low,
        });
    }

    insights
}

/// Fixed catalog of general improvements.
pub fn fallback_recommendations() -> Vec<Recommendation> {
    vec![
        Recommendation {
            category: RecommendationCategory::Team,
            title: "Improve team communication".to_string(),
            description: "Hold short daily stand-ups to surface blockers early.".to_string(),
            priority: RecommendationPriority::Medium,
            estimated_impact: "Fewer stalled tasks and faster hand-offs".to_string(),
            implementation: vec![
                "Schedule a 15-minute daily stand-up".to_string(),
                "Track blockers on the shared board".to_string(),
                "Review open blockers at the end of each week".to_string(),
            ],
        },
        Recommendation {
            category: RecommendationCategory::Timeline,
            title: "Break down large tasks".to_string(),
            description: "Split work estimated above one day into smaller deliverables."
                .to_string(),
            priority: RecommendationPriority::Medium,
            estimated_impact: "More predictable delivery dates".to_string(),
            implementation: vec![
                "Flag tasks estimated above eight hours".to_string(),
                "Split them into reviewable increments".to_string(),
            ],
        },
        Recommendation {
            category: RecommendationCategory::Budget,
            title: "Review budget burn monthly".to_string(),
            description: "Compare spend against progress for every active project.".to_string(),
            priority: RecommendationPriority::Low,
            estimated_impact: "Earlier detection of overruns".to_string(),
            implementation: vec![
                "Export spend per project at month end".to_string(),
                "Compare against completed scope".to_string(),
            ],
        },
    ]
}

/// Generic forecast: completion `now + 30d`, budget equal to the sum of
/// project budgets, fixed risks and a stable trend.
pub fn fallback_predictions(dataset: &AnalyticsDataset, now: DateTime<Utc>) -> PredictiveAnalysis {
    let projected_total = dataset.projects.iter().map(|project| project.budget).sum();

    PredictiveAnalysis {
        project_completion: CompletionForecast {
            estimated_date: now + Duration::days(FALLBACK_COMPLETION_HORIZON_DAYS),
            confidence: FALLBACK_COMPLETION_CONFIDENCE,
            factors: vec![
                "Current task completion rate".to_string(),
                "Open task backlog".to_string(),
                "Team capacity".to_string(),
            ],
        },
        budget_forecast: BudgetForecast {
            projected_total,
            overrun_risk: FALLBACK_BUDGET_OVERRUN_RISK,
            factors: vec!["Planned budgets of the selected projects".to_string()],
        },
        team_performance: TeamPerformanceForecast {
            burnout_risk: FALLBACK_BURNOUT_RISK,
            trend: VelocityTrend::Stable,
            factors: vec!["Recent workload distribution".to_string()],
        },
    }
}
