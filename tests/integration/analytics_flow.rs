#[path = "../common/mod.rs"]
mod common;

use common::{fixed_now, sample_workspace};
use pulse_insights_lib::commands::analytics::{
    analytics_dashboard_fetch, analytics_risk_fetch, analytics_velocity_fetch,
};
use pulse_insights_lib::commands::AppState;
use pulse_insights_lib::config::{AnalyticsThresholds, WorkloadProfile};
use pulse_insights_lib::models::analytics::{AnalyticsQueryParams, DateRange, VelocityTrend};
use pulse_insights_lib::models::metrics::{TaskPriority, TaskStatus};
use pulse_insights_lib::models::risk::{RiskLevel, RiskType};
use pulse_insights_lib::services::data_normalizer::{normalize, NormalizeOptions};
use pulse_insights_lib::services::insight_orchestrator::InsightOrchestrator;
use pulse_insights_lib::services::kpi_service::{compute_kpis, weekly_buckets};
use pulse_insights_lib::services::risk_service::RiskAssessor;
use pulse_insights_lib::services::velocity_service::calculate_velocity;

fn offline_state() -> AppState {
    AppState::with_orchestrator(InsightOrchestrator::offline(AnalyticsThresholds::default()))
        .with_clock(fixed_now)
}

#[test]
fn normalization_handles_loose_source_records() {
    let dataset = normalize(&sample_workspace(), &NormalizeOptions::new(fixed_now()));

    assert_eq!(dataset.projects.len(), 2);
    assert_eq!(dataset.tasks.len(), 3);

    let website = &dataset.projects[0];
    assert_eq!(website.budget, 1000.0);
    assert_eq!(website.total_tasks, 3);
    assert_eq!(website.tasks_completed, 1);
    assert_eq!(website.progress, 33.0);
    assert_eq!(website.team_size, 2);

    let untitled = &dataset.tasks[2];
    assert_eq!(untitled.title, "Untitled task");
    assert_eq!(untitled.priority, TaskPriority::Medium);
    assert_eq!(dataset.tasks[1].status, TaskStatus::InProgress);
    assert_eq!(dataset.tasks[0].actual_hours, 6.0);

    let ids: Vec<&str> = dataset.team.iter().map(|member| member.id.as_str()).collect();
    assert_eq!(ids, vec!["u1", "u2", "u3"]);
    assert_eq!(dataset.team[0].hours_logged, 6.0);
    assert_eq!(dataset.team[0].efficiency, 100.0);
    assert_eq!(dataset.team[1].workload, 10.0);
    assert_eq!(dataset.team[2].role, "member");
}

#[test]
fn project_team_profile_uses_larger_workload_unit() {
    let options =
        NormalizeOptions::new(fixed_now()).with_workload_profile(WorkloadProfile::ProjectTeam);
    let dataset = normalize(&sample_workspace(), &options);
    assert_eq!(dataset.team[1].workload, 15.0);
}

#[test]
fn project_selection_restricts_every_pipeline() {
    let options =
        NormalizeOptions::new(fixed_now()).with_project_ids(Some(vec!["p2".to_string()]));
    let dataset = normalize(&sample_workspace(), &options);
    assert_eq!(dataset.projects.len(), 1);
    assert!(dataset.tasks.is_empty());
    assert!(dataset.team.is_empty());

    let everything = normalize(
        &sample_workspace(),
        &NormalizeOptions::new(fixed_now()).with_project_ids(Some(Vec::new())),
    );
    assert_eq!(everything.projects.len(), 2);
}

#[test]
fn kpis_and_weekly_buckets_cover_the_fixture() {
    let now = fixed_now();
    let dataset = normalize(&sample_workspace(), &NormalizeOptions::new(now));
    let range = DateRange::resolve(&AnalyticsQueryParams::default(), now).unwrap();

    let kpis = compute_kpis(&dataset, &range);
    assert_eq!(kpis.total_projects, 2);
    assert_eq!(kpis.completed_projects, 1);
    assert_eq!(kpis.project_completion_rate, 50.0);
    assert_eq!(kpis.task_completion_rate, 33.3);
    assert_eq!(kpis.total_hours_logged, 6.0);
    assert_eq!(kpis.average_project_duration, 20.0);
    assert_eq!(kpis.active_users, 3);
    assert_eq!(kpis.team_utilization, 100.0);
    let distributed: usize = kpis.status_distribution.iter().map(|entry| entry.count).sum();
    assert_eq!(distributed, kpis.total_tasks);

    let weeks = weekly_buckets(&dataset.tasks, &range);
    assert_eq!(weeks.len(), 5);
    let created: Vec<usize> = weeks.iter().map(|week| week.created).collect();
    assert_eq!(created, vec![1, 1, 0, 0, 1]);
    let completed: Vec<usize> = weeks.iter().map(|week| week.completed).collect();
    assert_eq!(completed, vec![0, 0, 1, 0, 0]);
}

#[test]
fn risk_and_velocity_follow_the_fixture() {
    let now = fixed_now();
    let dataset = normalize(&sample_workspace(), &NormalizeOptions::new(now));

    let risk = RiskAssessor::default().assess(&dataset.projects, &dataset.tasks, &dataset.team, now);
    assert_eq!(risk.overall_risk, RiskLevel::Medium);
    let kinds: Vec<RiskType> = risk.findings.iter().map(|finding| finding.kind).collect();
    assert_eq!(kinds, vec![RiskType::Budget, RiskType::Timeline]);
    assert!((risk.risk_score - 27.78).abs() < 0.011);

    let velocity = calculate_velocity(&dataset.tasks, now);
    assert_eq!(velocity.average_completion_time, 10.0);
    assert_eq!(velocity.tasks_per_week, 0.3);
    assert_eq!(velocity.trend, VelocityTrend::Stable);
}

#[tokio::test]
async fn dashboard_command_assembles_all_sections() {
    let state = offline_state();
    let response = analytics_dashboard_fetch(&state, sample_workspace(), None)
        .await
        .expect("dashboard");

    assert_eq!(response.kpis.total_tasks, 3);
    assert_eq!(response.weekly.len(), 5);
    assert_eq!(response.risk_assessment.overall_risk, RiskLevel::Medium);
    assert_eq!(response.data_points.team_members, 3);
    assert_eq!(response.generated_at, fixed_now().to_rfc3339());

    let body = serde_json::to_value(&response).expect("serializes");
    assert!(body["kpis"]["taskCompletionRate"].is_number());
    assert!(body["riskAssessment"]["overallRisk"].is_string());
    assert_eq!(body["velocity"]["trend"], "stable");
}

#[tokio::test]
async fn dashboard_rejects_inverted_explicit_range() {
    let state = offline_state();
    let params = AnalyticsQueryParams {
        from: Some("2024-06-30".to_string()),
        to: Some("2024-06-01".to_string()),
        ..AnalyticsQueryParams::default()
    };
    let error = analytics_dashboard_fetch(&state, sample_workspace(), Some(params))
        .await
        .unwrap_err();
    assert_eq!(error.code, "VALIDATION_ERROR");
}

#[tokio::test]
async fn risk_and_velocity_commands_match_direct_services() {
    let state = offline_state();
    let now = fixed_now();
    let dataset = normalize(&sample_workspace(), &NormalizeOptions::new(now));

    let risk = analytics_risk_fetch(&state, sample_workspace(), None)
        .await
        .expect("risk");
    assert_eq!(
        risk.risk_assessment,
        RiskAssessor::default().assess(&dataset.projects, &dataset.tasks, &dataset.team, now)
    );

    let velocity = analytics_velocity_fetch(&state, sample_workspace(), None)
        .await
        .expect("velocity");
    assert_eq!(velocity.velocity, calculate_velocity(&dataset.tasks, now));
    assert_eq!(velocity.data_points.tasks, 3);
}
