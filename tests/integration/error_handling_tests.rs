// Error mapping at the command boundary and edge cases around it

#[path = "../common/mod.rs"]
mod common;

use common::{fixed_now, sample_workspace};
use pulse_insights_lib::commands::ai_commands::analytics_recommendations_fetch;
use pulse_insights_lib::commands::analytics::analytics_dashboard_fetch;
use pulse_insights_lib::commands::{AppState, CommandError};
use pulse_insights_lib::config::AnalyticsThresholds;
use pulse_insights_lib::error::{AiErrorCode, AppError};
use pulse_insights_lib::models::analytics::AnalyticsQueryParams;
use pulse_insights_lib::models::raw::RawWorkspace;
use pulse_insights_lib::services::insight_orchestrator::{parse_predictions, InsightOrchestrator};
use pulse_insights_lib::utils::logger::init_logging;
use serde_json::json;
use tempfile::tempdir;

fn offline_state() -> AppState {
    AppState::with_orchestrator(InsightOrchestrator::offline(AnalyticsThresholds::default()))
        .with_clock(fixed_now)
}

#[test]
fn logging_initialises_once_per_process() {
    let dir = tempdir().expect("temp dir");
    let log_dir = dir.path().join("logs");

    init_logging(&log_dir).expect("first init");
    init_logging(&log_dir).expect("second init is a no-op");
    assert!(log_dir.is_dir());
}

#[test]
fn command_errors_serialize_in_camel_case() {
    let error = CommandError::from(AppError::ai_with_details(
        AiErrorCode::HttpTimeout,
        "oracle did not answer",
        Some("corr-42"),
        None,
    ));
    let body = serde_json::to_value(&error).expect("serializes");
    assert_eq!(body["code"], "HTTP_TIMEOUT");
    assert_eq!(body["details"]["correlationId"], "corr-42");

    let plain = serde_json::to_value(CommandError::from(AppError::other("boom"))).unwrap();
    assert_eq!(plain["code"], "UNKNOWN");
    assert!(plain.get("details").is_none());
}

#[test]
fn serde_failures_map_to_unknown() {
    let source = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
    let error = CommandError::from(AppError::from(source));
    assert_eq!(error.code, "UNKNOWN");
}

#[test]
fn out_of_range_prediction_probability_is_rejected() {
    let raw = json!({
        "projectCompletion": {"estimatedDate": "2024-08-01", "confidence": 0.5},
        "budgetForecast": {"projectedTotal": -10, "overrunRisk": 0.5},
        "teamPerformance": {"burnoutRisk": 0.2, "trend": "stable"}
    })
    .to_string();
    let error = parse_predictions(&raw).unwrap_err();
    assert_eq!(error.ai_code(), Some(AiErrorCode::SchemaMismatch));
}

#[tokio::test]
async fn malformed_range_boundary_is_a_validation_error() {
    let params = AnalyticsQueryParams {
        from: Some("last tuesday".to_string()),
        ..AnalyticsQueryParams::default()
    };
    let error = analytics_dashboard_fetch(&offline_state(), sample_workspace(), Some(params))
        .await
        .unwrap_err();
    assert_eq!(error.code, "VALIDATION_ERROR");
    assert_eq!(error.details.expect("details")["value"], "last tuesday");
}

#[tokio::test]
async fn filter_errors_win_over_missing_data() {
    let params = AnalyticsQueryParams {
        category: Some("marketing".to_string()),
        ..AnalyticsQueryParams::default()
    };
    let error =
        analytics_recommendations_fetch(&offline_state(), RawWorkspace::default(), Some(params))
            .await
            .unwrap_err();
    assert_eq!(error.code, "VALIDATION_ERROR");

    let error = analytics_recommendations_fetch(&offline_state(), RawWorkspace::default(), None)
        .await
        .unwrap_err();
    assert_eq!(error.code, "NO_DATA");
}

#[tokio::test]
async fn blank_filters_are_ignored() {
    let params = AnalyticsQueryParams {
        category: Some("   ".to_string()),
        priority: Some(String::new()),
        ..AnalyticsQueryParams::default()
    };
    let response =
        analytics_recommendations_fetch(&offline_state(), sample_workspace(), Some(params))
            .await
            .expect("recommendations");
    assert_eq!(response.filtered_count, response.total_recommendations);
}
