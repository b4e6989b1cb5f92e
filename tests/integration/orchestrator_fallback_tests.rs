#[path = "../common/mod.rs"]
mod common;

use std::sync::Arc;
use std::time::Duration as StdDuration;

use common::{chat_body, fixed_now, sample_workspace, VALID_INSIGHTS};
use futures::future::join_all;
use httpmock::prelude::*;
use pulse_insights_lib::config::AnalyticsThresholds;
use pulse_insights_lib::models::ai_types::AiResponseSource;
use pulse_insights_lib::models::metrics::AnalyticsDataset;
use pulse_insights_lib::services::ai_service::testing::oracle_for;
use pulse_insights_lib::services::data_normalizer::{normalize, NormalizeOptions};
use pulse_insights_lib::services::fallback::{
    fallback_insights, fallback_predictions, fallback_recommendations,
};
use pulse_insights_lib::services::insight_orchestrator::InsightOrchestrator;

const VALID_PREDICTIONS: &str = r#"{
    "projectCompletion": {"estimatedDate": "2024-08-15T00:00:00Z", "confidence": 0.6, "factors": ["Backlog size"]},
    "budgetForecast": {"projectedTotal": 1650, "overrunRisk": 0.45},
    "teamPerformance": {"burnoutRisk": 0.2, "trend": "decreasing"}
}"#;

fn orchestrator_for(server: &MockServer, timeout: StdDuration) -> InsightOrchestrator {
    let oracle = oracle_for(
        &server.base_url(),
        timeout,
        vec![StdDuration::from_millis(0)],
    )
    .expect("oracle");
    InsightOrchestrator::new(Some(Arc::new(oracle)), timeout, AnalyticsThresholds::default())
}

fn dataset() -> AnalyticsDataset {
    normalize(&sample_workspace(), &NormalizeOptions::new(fixed_now()))
}

async fn server_answering(status: u16, content: Option<&str>) -> MockServer {
    let server = MockServer::start_async().await;
    let body = content.map(chat_body);
    server
        .mock_async(|when, then| {
            when.method(POST).path("/v1/chat/completions");
            let then = then.status(status);
            if let Some(body) = body {
                then.header("content-type", "application/json").json_body(body);
            }
        })
        .await;
    server
}

#[tokio::test]
async fn server_error_yields_exact_fallback() {
    let server = server_answering(500, None).await;
    let orchestrator = orchestrator_for(&server, StdDuration::from_secs(5));
    let dataset = dataset();

    let insights = orchestrator.generate_insights(&dataset, fixed_now()).await;
    assert_eq!(insights.source, AiResponseSource::Fallback);
    assert_eq!(
        insights.value,
        fallback_insights(&dataset, &AnalyticsThresholds::default(), fixed_now())
    );
    assert_eq!(
        insights.provider.fallback_reason.as_deref(),
        Some("ORACLE_UNAVAILABLE")
    );
    assert!(insights.provider.correlation_id.is_some());

    let predictions = orchestrator.generate_predictions(&dataset, fixed_now()).await;
    assert_eq!(predictions.value, fallback_predictions(&dataset, fixed_now()));
}

#[tokio::test]
async fn prose_answer_yields_fallback() {
    let server = server_answering(200, Some("I think the projects look fine overall.")).await;
    let orchestrator = orchestrator_for(&server, StdDuration::from_secs(5));

    let recommendations = orchestrator
        .generate_recommendations(&dataset(), fixed_now())
        .await;
    assert_eq!(recommendations.source, AiResponseSource::Fallback);
    assert_eq!(recommendations.value, fallback_recommendations());
    assert_eq!(
        recommendations.provider.fallback_reason.as_deref(),
        Some("INVALID_RESPONSE")
    );
}

#[tokio::test]
async fn empty_collection_is_treated_as_schema_mismatch() {
    let server = server_answering(200, Some(r#"{"insights": []}"#)).await;
    let orchestrator = orchestrator_for(&server, StdDuration::from_secs(5));
    let dataset = dataset();

    let insights = orchestrator.generate_insights(&dataset, fixed_now()).await;
    assert_eq!(insights.source, AiResponseSource::Fallback);
    assert_eq!(
        insights.provider.fallback_reason.as_deref(),
        Some("SCHEMA_MISMATCH")
    );
    assert!(!insights.value.is_empty());
}

#[tokio::test]
async fn slow_oracle_is_bounded_by_timeout() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/v1/chat/completions");
            then.status(200)
                .delay(StdDuration::from_secs(3))
                .json_body(chat_body(VALID_INSIGHTS));
        })
        .await;
    let orchestrator = orchestrator_for(&server, StdDuration::from_millis(200));

    let result = orchestrator.generate_insights(&dataset(), fixed_now()).await;
    assert_eq!(result.source, AiResponseSource::Fallback);
    assert_eq!(result.provider.fallback_reason.as_deref(), Some("HTTP_TIMEOUT"));
}

#[tokio::test]
async fn dropped_request_does_not_leak_into_the_next_one() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/v1/chat/completions")
                .body_contains(r#"\"operation\":\"insights\""#);
            then.status(200)
                .delay(StdDuration::from_secs(2))
                .json_body(chat_body(VALID_INSIGHTS));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/v1/chat/completions")
                .body_contains(r#"\"operation\":\"predictions\""#);
            then.status(200)
                .header("content-type", "application/json")
                .json_body(chat_body(VALID_PREDICTIONS));
        })
        .await;

    let orchestrator = orchestrator_for(&server, StdDuration::from_secs(5));
    let dataset = dataset();

    let abandoned = tokio::time::timeout(
        StdDuration::from_millis(100),
        orchestrator.generate_insights(&dataset, fixed_now()),
    )
    .await;
    assert!(abandoned.is_err());

    let predictions = orchestrator.generate_predictions(&dataset, fixed_now()).await;
    assert_eq!(predictions.source, AiResponseSource::Online);
    assert_eq!(predictions.value.budget_forecast.projected_total, 1650.0);
}

#[tokio::test]
async fn concurrent_requests_each_get_their_own_fallback() {
    let server = server_answering(500, None).await;
    let orchestrator = orchestrator_for(&server, StdDuration::from_secs(5));

    let selections: Vec<Option<Vec<String>>> = vec![
        None,
        Some(vec!["p1".to_string()]),
        Some(vec!["p2".to_string()]),
    ];
    let datasets: Vec<AnalyticsDataset> = selections
        .into_iter()
        .map(|ids| {
            normalize(
                &sample_workspace(),
                &NormalizeOptions::new(fixed_now()).with_project_ids(ids),
            )
        })
        .collect();

    let results = join_all(
        datasets
            .iter()
            .map(|dataset| orchestrator.generate_predictions(dataset, fixed_now())),
    )
    .await;

    for (dataset, result) in datasets.iter().zip(results) {
        assert_eq!(result.source, AiResponseSource::Fallback);
        assert_eq!(result.value, fallback_predictions(dataset, fixed_now()));
    }
    let totals: Vec<f64> = datasets
        .iter()
        .map(|dataset| fallback_predictions(dataset, fixed_now()).budget_forecast.projected_total)
        .collect();
    assert_eq!(totals, vec![1500.0, 1000.0, 500.0]);
}
