use tracing::debug;

use crate::models::analytics::{
    AnalyticsQueryParams, DashboardResponse, DateRange, RiskResponse, VelocityResponse,
};
use crate::models::raw::RawWorkspace;
use crate::services::kpi_service::{compute_kpis, weekly_buckets};
use crate::services::velocity_service::calculate_velocity;

use super::{AppState, CommandResult};

/// KPIs, weekly chart buckets, risk and velocity for one selection.
pub async fn analytics_dashboard_fetch(
    state: &AppState,
    workspace: RawWorkspace,
    params: Option<AnalyticsQueryParams>,
) -> CommandResult<DashboardResponse> {
    let params = params.unwrap_or_default();
    let now = state.now();
    let range = DateRange::resolve(&params, now)?;
    let dataset = state.load_dataset(&workspace, &params, now)?;

    let kpis = compute_kpis(&dataset, &range);
    let weekly = weekly_buckets(&dataset.tasks, &range);
    let risk_assessment =
        state
            .risk()
            .assess(&dataset.projects, &dataset.tasks, &dataset.team, now);
    let velocity = calculate_velocity(&dataset.tasks, now);

    debug!(
        target: "app::command",
        range = %params.range.as_str(),
        weeks = weekly.len(),
        "analytics_dashboard_fetch completed"
    );

    Ok(DashboardResponse {
        range,
        kpis,
        weekly,
        risk_assessment,
        velocity,
        generated_at: now.to_rfc3339(),
        data_points: dataset.data_points(),
    })
}

pub async fn analytics_risk_fetch(
    state: &AppState,
    workspace: RawWorkspace,
    params: Option<AnalyticsQueryParams>,
) -> CommandResult<RiskResponse> {
    let params = params.unwrap_or_default();
    let now = state.now();
    let dataset = state.load_dataset(&workspace, &params, now)?;

    let risk_assessment =
        state
            .risk()
            .assess(&dataset.projects, &dataset.tasks, &dataset.team, now);

    Ok(RiskResponse {
        risk_assessment,
        generated_at: now.to_rfc3339(),
        data_points: dataset.data_points(),
    })
}

pub async fn analytics_velocity_fetch(
    state: &AppState,
    workspace: RawWorkspace,
    params: Option<AnalyticsQueryParams>,
) -> CommandResult<VelocityResponse> {
    let params = params.unwrap_or_default();
    let now = state.now();
    let dataset = state.load_dataset(&workspace, &params, now)?;

    Ok(VelocityResponse {
        velocity: calculate_velocity(&dataset.tasks, now),
        generated_at: now.to_rfc3339(),
        data_points: dataset.data_points(),
    })
}
