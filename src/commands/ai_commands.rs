use tracing::{debug, warn};

use crate::models::ai_types::{
    AiResponseSource, InsightsResponse, OracleStatusDto, PredictionsResponse,
    RecommendationsResponse,
};
use crate::models::analytics::AnalyticsQueryParams;
use crate::models::raw::RawWorkspace;
use crate::services::recommendation_filter::{RecommendationFilter, RecommendationQuery};
use crate::services::velocity_service::calculate_velocity;

use super::{AppState, CommandResult};

fn log_source(command: &str, source: AiResponseSource, reason: Option<&str>) {
    match source {
        AiResponseSource::Online => {
            debug!(target: "app::command", command, "served from oracle");
        }
        AiResponseSource::Fallback => {
            warn!(
                target: "app::command",
                command,
                reason = reason.unwrap_or("unknown"),
                "served from fallback"
            );
        }
    }
}

pub async fn analytics_insights_fetch(
    state: &AppState,
    workspace: RawWorkspace,
    params: Option<AnalyticsQueryParams>,
) -> CommandResult<InsightsResponse> {
    let params = params.unwrap_or_default();
    let now = state.now();
    let dataset = state.load_dataset(&workspace, &params, now)?;

    let result = state.orchestrator().generate_insights(&dataset, now).await;
    log_source(
        "analytics_insights_fetch",
        result.source,
        result.provider.fallback_reason.as_deref(),
    );

    Ok(InsightsResponse {
        insights: result.value,
        source: result.source,
        generated_at: now.to_rfc3339(),
        data_points: dataset.data_points(),
        provider: result.provider,
    })
}

/// Category and priority filters are validated before the oracle is
/// consulted, so a bad filter never costs a round trip.
pub async fn analytics_recommendations_fetch(
    state: &AppState,
    workspace: RawWorkspace,
    params: Option<AnalyticsQueryParams>,
) -> CommandResult<RecommendationsResponse> {
    let params = params.unwrap_or_default();
    let filter = RecommendationFilter::parse(&RecommendationQuery {
        category: params.category.clone(),
        priority: params.priority.clone(),
    })?;
    let now = state.now();
    let dataset = state.load_dataset(&workspace, &params, now)?;

    let result = state
        .orchestrator()
        .generate_recommendations(&dataset, now)
        .await;
    log_source(
        "analytics_recommendations_fetch",
        result.source,
        result.provider.fallback_reason.as_deref(),
    );

    let filtered = filter.apply(result.value);
    Ok(RecommendationsResponse {
        recommendations: filtered.recommendations,
        total_recommendations: filtered.total_recommendations,
        filtered_count: filtered.filtered_count,
        source: result.source,
        generated_at: now.to_rfc3339(),
        data_analysis: dataset.data_points(),
        provider: result.provider,
    })
}

pub async fn analytics_predictions_fetch(
    state: &AppState,
    workspace: RawWorkspace,
    params: Option<AnalyticsQueryParams>,
) -> CommandResult<PredictionsResponse> {
    let params = params.unwrap_or_default();
    let now = state.now();
    let dataset = state.load_dataset(&workspace, &params, now)?;

    let velocity = calculate_velocity(&dataset.tasks, now);
    let risk_assessment =
        state
            .risk()
            .assess(&dataset.projects, &dataset.tasks, &dataset.team, now);

    let result = state.orchestrator().generate_predictions(&dataset, now).await;
    log_source(
        "analytics_predictions_fetch",
        result.source,
        result.provider.fallback_reason.as_deref(),
    );

    Ok(PredictionsResponse {
        predictions: result.value,
        velocity,
        risk_assessment,
        source: result.source,
        generated_at: now.to_rfc3339(),
        data_points: dataset.data_points(),
        provider: result.provider,
    })
}

pub async fn ai_oracle_status(state: &AppState) -> CommandResult<OracleStatusDto> {
    let status = state.orchestrator().oracle_status(state.now());
    debug!(
        target: "app::command",
        configured = status.configured,
        "ai_oracle_status completed"
    );
    Ok(status)
}
