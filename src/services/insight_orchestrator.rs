use std::sync::Arc;
use std::time::{Duration as StdDuration, Instant};

use chrono::{DateTime, Utc};
use jsonschema::JSONSchema;
use once_cell::sync::Lazy;
use serde::de::DeserializeOwned;
use serde_json::{json, Value as JsonValue};
use tracing::{debug, info, warn};

use crate::config::AnalyticsThresholds;
use crate::error::{AiErrorCode, AppError, AppResult};
use crate::models::ai_types::{
    AiProviderMetadata, AiResponseSource, Insight, InsightOracle, InsightsPayload, OracleCompletion,
    OracleKind, OraclePrompt, OracleStatusDto, Orchestrated, PredictiveAnalysis, Recommendation,
    RecommendationsPayload,
};
use crate::models::metrics::AnalyticsDataset;
use crate::services::ai_service::OracleConfig;
use crate::services::fallback::{fallback_insights, fallback_predictions, fallback_recommendations};
use crate::services::prompt_templates::{build_analytics_payload, system_prompt, PromptContext};
use crate::services::risk_service::RiskAssessor;
use crate::services::velocity_service::calculate_velocity;
use crate::utils::semantic::prompt_fingerprint;

static INSIGHTS_SCHEMA: Lazy<JsonValue> = Lazy::new(|| {
    json!({
        "type": "object",
        "required": ["insights"],
        "properties": {
            "insights": {
                "type": "array",
                "minItems": 1,
                "items": {
                    "type": "object",
                    "required": ["type", "title", "description", "confidence", "impact"],
                    "properties": {
                        "type": { "enum": ["warning", "success", "info", "prediction"] },
                        "title": { "type": "string", "minLength": 1 },
                        "description": { "type": "string" },
                        "confidence": { "type": "number", "minimum": 0, "maximum": 1 },
                        "actionItems": { "type": "array", "items": { "type": "string" } },
                        "impact": { "enum": ["low", "medium", "high"] }
                    }
                }
            }
        }
    })
});

static RECOMMENDATIONS_SCHEMA: Lazy<JsonValue> = Lazy::new(|| {
    json!({
        "type": "object",
        "required": ["recommendations"],
        "properties": {
            "recommendations": {
                "type": "array",
                "minItems": 1,
                "items": {
                    "type": "object",
                    "required": ["category", "title", "description", "priority", "estimatedImpact"],
                    "properties": {
                        "category": { "enum": ["budget", "timeline", "team", "quality", "risk"] },
                        "title": { "type": "string", "minLength": 1 },
                        "description": { "type": "string" },
                        "priority": { "enum": ["low", "medium", "high"] },
                        "estimatedImpact": { "type": "string" },
                        "implementation": { "type": "array", "items": { "type": "string" } }
                    }
                }
            }
        }
    })
});

static PREDICTIONS_SCHEMA: Lazy<JsonValue> = Lazy::new(|| {
    let probability = json!({ "type": "number", "minimum": 0, "maximum": 1 });
    let factors = json!({ "type": "array", "items": { "type": "string" } });
    json!({
        "type": "object",
        "required": ["projectCompletion", "budgetForecast", "teamPerformance"],
        "properties": {
            "projectCompletion": {
                "type": "object",
                "required": ["estimatedDate", "confidence"],
                "properties": {
                    "estimatedDate": { "type": "string" },
                    "confidence": probability,
                    "factors": factors
                }
            },
            "budgetForecast": {
                "type": "object",
                "required": ["projectedTotal", "overrunRisk"],
                "properties": {
                    "projectedTotal": { "type": "number", "minimum": 0 },
                    "overrunRisk": probability,
                    "factors": factors
                }
            },
            "teamPerformance": {
                "type": "object",
                "required": ["burnoutRisk", "trend"],
                "properties": {
                    "burnoutRisk": probability,
                    "trend": { "enum": ["increasing", "decreasing", "stable"] },
                    "factors": factors
                }
            }
        }
    })
});

type CompiledSchema = Result<JSONSchema, String>;

fn compile(schema: &'static JsonValue) -> CompiledSchema {
    JSONSchema::compile(schema).map_err(|err| err.to_string())
}

static COMPILED_INSIGHTS: Lazy<CompiledSchema> = Lazy::new(|| compile(&INSIGHTS_SCHEMA));
static COMPILED_RECOMMENDATIONS: Lazy<CompiledSchema> =
    Lazy::new(|| compile(&RECOMMENDATIONS_SCHEMA));
static COMPILED_PREDICTIONS: Lazy<CompiledSchema> = Lazy::new(|| compile(&PREDICTIONS_SCHEMA));

fn compiled_schema_for(kind: OracleKind) -> AppResult<&'static JSONSchema> {
    let compiled = match kind {
        OracleKind::Insights => &*COMPILED_INSIGHTS,
        OracleKind::Recommendations => &*COMPILED_RECOMMENDATIONS,
        OracleKind::Predictions => &*COMPILED_PREDICTIONS,
    };
    compiled
        .as_ref()
        .map_err(|err| AppError::other(format!("invalid {kind} response schema: {err}")))
}

/// Produces insights, recommendations and predictions through the external
/// oracle, substituting the deterministic fallback on any failure.
///
/// Holds no per-request state: every call builds its own prompt and owns its
/// in-flight future, so dropping a call discards its response.
#[derive(Clone)]
pub struct InsightOrchestrator {
    oracle: Option<Arc<dyn InsightOracle>>,
    timeout: StdDuration,
    thresholds: AnalyticsThresholds,
}

impl InsightOrchestrator {
    pub fn new(
        oracle: Option<Arc<dyn InsightOracle>>,
        timeout: StdDuration,
        thresholds: AnalyticsThresholds,
    ) -> Self {
        Self {
            oracle,
            timeout,
            thresholds,
        }
    }

    /// Wires the HTTP oracle described by `config`, or none when no API key
    /// is configured.
    pub fn from_config(config: &OracleConfig, thresholds: AnalyticsThresholds) -> AppResult<Self> {
        let oracle = config
            .build_oracle()?
            .map(|oracle| Arc::new(oracle) as Arc<dyn InsightOracle>);
        if oracle.is_none() {
            info!(
                target: "app::ai",
                "no oracle API key configured; deterministic fallback will be used"
            );
        }
        Ok(Self::new(oracle, config.timeout, thresholds))
    }

    /// Orchestrator that always answers from the fallback generators.
    pub fn offline(thresholds: AnalyticsThresholds) -> Self {
        Self::new(None, StdDuration::from_secs(0), thresholds)
    }

    pub fn thresholds(&self) -> &AnalyticsThresholds {
        &self.thresholds
    }

    pub fn build_prompt(
        &self,
        kind: OracleKind,
        dataset: &AnalyticsDataset,
        now: DateTime<Utc>,
    ) -> OraclePrompt {
        let velocity = calculate_velocity(&dataset.tasks, now);
        let risk = RiskAssessor::new(self.thresholds).assess(
            &dataset.projects,
            &dataset.tasks,
            &dataset.team,
            now,
        );
        let generated_at = now.to_rfc3339();
        let user = build_analytics_payload(
            kind,
            &PromptContext {
                dataset,
                velocity: &velocity,
                risk: &risk,
                generated_at: &generated_at,
            },
        );
        let fingerprint = prompt_fingerprint(kind.as_str(), &user);

        OraclePrompt {
            kind,
            system: system_prompt(kind),
            user,
            fingerprint,
        }
    }

    async fn invoke_external(
        &self,
        oracle: &dyn InsightOracle,
        prompt: &OraclePrompt,
    ) -> AppResult<OracleCompletion> {
        match tokio::time::timeout(self.timeout, oracle.complete(prompt)).await {
            Ok(result) => result,
            Err(_) => Err(AppError::ai_with_details(
                AiErrorCode::HttpTimeout,
                format!("oracle did not answer within {:?}", self.timeout),
                None,
                Some(json!({ "operation": prompt.kind.as_str() })),
            )),
        }
    }

    async fn orchestrate<T, V, F>(
        &self,
        kind: OracleKind,
        dataset: &AnalyticsDataset,
        now: DateTime<Utc>,
        validate: V,
        fallback: F,
    ) -> Orchestrated<T>
    where
        V: FnOnce(&str) -> AppResult<T>,
        F: FnOnce() -> T,
    {
        let prompt = self.build_prompt(kind, dataset, now);

        let Some(oracle) = self.oracle.as_deref() else {
            debug!(
                target: "app::ai",
                operation = kind.as_str(),
                "oracle not configured; using deterministic fallback"
            );
            return Orchestrated {
                value: fallback(),
                source: AiResponseSource::Fallback,
                provider: AiProviderMetadata {
                    prompt_hash: Some(prompt.fingerprint),
                    fallback_reason: Some(AiErrorCode::MissingApiKey.as_str().to_string()),
                    ..AiProviderMetadata::default()
                },
            };
        };

        let started = Instant::now();
        let attempt = match self.invoke_external(oracle, &prompt).await {
            Ok(completion) => {
                validate(&completion.content).map(|value| (value, completion.metadata))
            }
            Err(error) => Err(error),
        };

        match attempt {
            Ok((value, mut metadata)) => {
                if metadata.prompt_hash.is_none() {
                    metadata.prompt_hash = Some(prompt.fingerprint.clone());
                }
                debug!(
                    target: "app::ai",
                    operation = kind.as_str(),
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "oracle answer accepted"
                );
                Orchestrated {
                    value,
                    source: AiResponseSource::Online,
                    provider: metadata,
                }
            }
            Err(error) => {
                let reason = error
                    .ai_code()
                    .map(|code| code.as_str().to_string())
                    .unwrap_or_else(|| "UNKNOWN_AI_ERROR".to_string());
                warn!(
                    target: "app::ai",
                    operation = kind.as_str(),
                    reason = %reason,
                    error = %error,
                    "oracle failed; using deterministic fallback"
                );

                Orchestrated {
                    value: fallback(),
                    source: AiResponseSource::Fallback,
                    provider: AiProviderMetadata {
                        provider_id: Some(oracle.provider_id().to_string()),
                        model: oracle.model().map(str::to_string),
                        correlation_id: error.ai_correlation_id().map(str::to_string),
                        prompt_hash: Some(prompt.fingerprint.clone()),
                        fallback_reason: Some(reason),
                        ..AiProviderMetadata::default()
                    },
                }
            }
        }
    }

    pub async fn generate_insights(
        &self,
        dataset: &AnalyticsDataset,
        now: DateTime<Utc>,
    ) -> Orchestrated<Vec<Insight>> {
        self.orchestrate(
            OracleKind::Insights,
            dataset,
            now,
            parse_insights,
            || fallback_insights(dataset, &self.thresholds, now),
        )
        .await
    }

    pub async fn generate_recommendations(
        &self,
        dataset: &AnalyticsDataset,
        now: DateTime<Utc>,
    ) -> Orchestrated<Vec<Recommendation>> {
        self.orchestrate(
            OracleKind::Recommendations,
            dataset,
            now,
            parse_recommendations,
            fallback_recommendations,
        )
        .await
    }

    pub async fn generate_predictions(
        &self,
        dataset: &AnalyticsDataset,
        now: DateTime<Utc>,
    ) -> Orchestrated<PredictiveAnalysis> {
        self.orchestrate(
            OracleKind::Predictions,
            dataset,
            now,
            parse_predictions,
            || fallback_predictions(dataset, now),
        )
        .await
    }

    pub fn oracle_status(&self, now: DateTime<Utc>) -> OracleStatusDto {
        match &self.oracle {
            Some(oracle) => OracleStatusDto {
                configured: true,
                provider: Some(oracle.provider_id().to_string()),
                model: oracle.model().map(str::to_string),
                timeout_secs: self.timeout.as_secs(),
                checked_at: now.to_rfc3339(),
                message: None,
            },
            None => OracleStatusDto {
                configured: false,
                provider: None,
                model: None,
                timeout_secs: self.timeout.as_secs(),
                checked_at: now.to_rfc3339(),
                message: Some(
                    "oracle API key not configured; fallback heuristics in use".to_string(),
                ),
            },
        }
    }
}

pub fn parse_insights(raw: &str) -> AppResult<Vec<Insight>> {
    let payload: InsightsPayload = parse_and_validate(raw, OracleKind::Insights)?;
    for insight in &payload.insights {
        ensure_probability("insights.confidence", insight.confidence)?;
    }
    Ok(payload.insights)
}

pub fn parse_recommendations(raw: &str) -> AppResult<Vec<Recommendation>> {
    let payload: RecommendationsPayload = parse_and_validate(raw, OracleKind::Recommendations)?;
    if payload.recommendations.iter().any(|rec| rec.title.trim().is_empty()) {
        return Err(schema_mismatch(
            OracleKind::Recommendations,
            vec!["recommendation title is blank".to_string()],
        ));
    }
    Ok(payload.recommendations)
}

pub fn parse_predictions(raw: &str) -> AppResult<PredictiveAnalysis> {
    let analysis: PredictiveAnalysis = parse_and_validate(raw, OracleKind::Predictions)?;
    ensure_probability(
        "projectCompletion.confidence",
        analysis.project_completion.confidence,
    )?;
    ensure_probability("budgetForecast.overrunRisk", analysis.budget_forecast.overrun_risk)?;
    ensure_probability(
        "teamPerformance.burnoutRisk",
        analysis.team_performance.burnout_risk,
    )?;
    if !analysis.budget_forecast.projected_total.is_finite()
        || analysis.budget_forecast.projected_total < 0.0
    {
        return Err(schema_mismatch(
            OracleKind::Predictions,
            vec!["budgetForecast.projectedTotal must be a non-negative number".to_string()],
        ));
    }
    Ok(analysis)
}

/// Strips Markdown fences, checks the JSON against the schema for `kind`,
/// then deserializes into `T`.
pub fn parse_and_validate<T: DeserializeOwned>(raw: &str, kind: OracleKind) -> AppResult<T> {
    let cleaned = strip_code_fences(raw);
    let value: JsonValue = serde_json::from_str(cleaned).map_err(|err| {
        AppError::ai_with_details(
            AiErrorCode::InvalidResponse,
            format!("oracle content is not JSON: {err}"),
            None,
            Some(json!({ "operation": kind.as_str(), "reason": "invalid_json" })),
        )
    })?;

    let schema = compiled_schema_for(kind)?;

    if let Err(validation_errors) = schema.validate(&value) {
        let messages: Vec<String> = validation_errors
            .map(|e| {
                let path = e.instance_path.to_string();
                let path_display = if path.is_empty() {
                    "root".to_string()
                } else {
                    path
                };
                format!("{path_display}: {e}")
            })
            .collect();
        return Err(schema_mismatch(kind, messages));
    }

    serde_json::from_value(value).map_err(|err| schema_mismatch(kind, vec![err.to_string()]))
}

fn strip_code_fences(raw: &str) -> &str {
    let trimmed = raw.trim();
    if !trimmed.starts_with("```") {
        return trimmed;
    }
    trimmed
        .trim_start_matches("```json")
        .trim_start_matches("```JSON")
        .trim_start_matches("```")
        .trim_end_matches("```")
        .trim()
}

fn ensure_probability(field: &str, value: f64) -> AppResult<()> {
    if value.is_finite() && (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(AppError::ai_with_details(
            AiErrorCode::SchemaMismatch,
            format!("{field} must be within [0, 1]"),
            None,
            Some(json!({ "field": field, "value": value })),
        ))
    }
}

fn schema_mismatch(kind: OracleKind, errors: Vec<String>) -> AppError {
    AppError::ai_with_details(
        AiErrorCode::SchemaMismatch,
        format!("oracle {kind} response does not match the expected shape"),
        None,
        Some(json!({ "operation": kind.as_str(), "errors": errors })),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ai_types::{InsightType, RecommendationCategory};
    use crate::models::analytics::VelocityTrend;
    use chrono::TimeZone;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use tracing::{Event, Level, Subscriber};
    use tracing_subscriber::layer::{Context, SubscriberExt};
    use tracing_subscriber::Layer;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 30, 12, 0, 0).unwrap()
    }

    struct ScriptedOracle {
        reply: AppResult<String>,
        delay: StdDuration,
        calls: AtomicUsize,
    }

    impl ScriptedOracle {
        fn replying(content: &str) -> Self {
            Self {
                reply: Ok(content.to_string()),
                delay: StdDuration::from_millis(0),
                calls: AtomicUsize::new(0),
            }
        }

        fn failing(code: AiErrorCode) -> Self {
            Self {
                reply: Err(AppError::ai(code, "scripted failure")),
                delay: StdDuration::from_millis(0),
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait::async_trait]
    impl InsightOracle for ScriptedOracle {
        async fn complete(&self, _prompt: &OraclePrompt) -> AppResult<OracleCompletion> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(self.delay).await;
            match &self.reply {
                Ok(content) => Ok(OracleCompletion {
                    content: content.clone(),
                    metadata: AiProviderMetadata {
                        provider_id: Some("scripted".to_string()),
                        ..AiProviderMetadata::default()
                    },
                }),
                Err(error) => Err(AppError::ai(
                    error.ai_code().unwrap_or(AiErrorCode::Unknown),
                    error.to_string(),
                )),
            }
        }

        fn provider_id(&self) -> &str {
            "scripted"
        }
    }

    /// Records the target of every WARN event seen on the current thread.
    #[derive(Clone, Default)]
    struct WarnRecorder(Arc<Mutex<Vec<String>>>);

    impl WarnRecorder {
        fn targets(&self) -> Vec<String> {
            self.0.lock().map(|seen| seen.clone()).unwrap_or_default()
        }
    }

    impl<S: Subscriber> Layer<S> for WarnRecorder {
        fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
            if *event.metadata().level() == Level::WARN {
                if let Ok(mut seen) = self.0.lock() {
                    seen.push(event.metadata().target().to_string());
                }
            }
        }
    }

    fn orchestrator(oracle: ScriptedOracle) -> InsightOrchestrator {
        InsightOrchestrator::new(
            Some(Arc::new(oracle)),
            StdDuration::from_millis(200),
            AnalyticsThresholds::default(),
        )
    }

    #[test]
    fn fenced_json_is_accepted() {
        let raw = "```json\n{\"insights\":[{\"type\":\"info\",\"title\":\"Velocity\",\"description\":\"Steady\",\"confidence\":0.6,\"impact\":\"low\"}]}\n```";
        let insights = parse_insights(raw).unwrap();
        assert_eq!(insights.len(), 1);
        assert_eq!(insights[0].kind, InsightType::Info);
        assert!(insights[0].action_items.is_empty());
    }

    #[test]
    fn schema_violations_are_reported_as_mismatch() {
        let out_of_range = r#"{"insights":[{"type":"info","title":"x","description":"y","confidence":1.4,"impact":"low"}]}"#;
        let error = parse_insights(out_of_range).unwrap_err();
        assert_eq!(error.ai_code(), Some(AiErrorCode::SchemaMismatch));

        let empty = r#"{"recommendations":[]}"#;
        assert_eq!(
            parse_recommendations(empty).unwrap_err().ai_code(),
            Some(AiErrorCode::SchemaMismatch)
        );

        let prose = "Here are some thoughts about your projects.";
        assert_eq!(
            parse_predictions(prose).unwrap_err().ai_code(),
            Some(AiErrorCode::InvalidResponse)
        );
    }

    #[test]
    fn predictions_parse_with_plain_date() {
        let raw = r#"{
            "projectCompletion": {"estimatedDate": "2024-08-15", "confidence": 0.55},
            "budgetForecast": {"projectedTotal": 12000, "overrunRisk": 0.4},
            "teamPerformance": {"burnoutRisk": 0.2, "trend": "increasing"}
        }"#;
        let analysis = parse_predictions(raw).unwrap();
        assert_eq!(analysis.team_performance.trend, VelocityTrend::Increasing);
        assert_eq!(analysis.budget_forecast.projected_total, 12000.0);

        let bad_date = raw.replace("2024-08-15", "next month");
        assert!(parse_predictions(&bad_date).is_err());
    }

    #[tokio::test]
    async fn valid_oracle_answer_is_used_online() {
        let content = r#"{"recommendations":[{"category":"quality","title":"Add reviews","description":"Peer review","priority":"high","estimatedImpact":"Fewer defects","implementation":["Enable required reviews"]}]}"#;
        let result = orchestrator(ScriptedOracle::replying(content))
            .generate_recommendations(&AnalyticsDataset::default(), now())
            .await;
        assert_eq!(result.source, AiResponseSource::Online);
        assert_eq!(result.value[0].category, RecommendationCategory::Quality);
        assert!(result.provider.prompt_hash.is_some());
    }

    #[tokio::test]
    async fn oracle_failure_matches_direct_fallback() {
        let dataset = AnalyticsDataset::default();
        let result = orchestrator(ScriptedOracle::failing(AiErrorCode::RateLimited))
            .generate_predictions(&dataset, now())
            .await;
        assert_eq!(result.source, AiResponseSource::Fallback);
        assert_eq!(result.value, fallback_predictions(&dataset, now()));
        assert_eq!(result.provider.fallback_reason.as_deref(), Some("RATE_LIMITED"));
    }

    #[tokio::test]
    async fn slow_oracle_times_out_into_fallback() {
        let mut oracle = ScriptedOracle::replying(r#"{"insights":[]}"#);
        oracle.delay = StdDuration::from_secs(5);
        let dataset = AnalyticsDataset::default();
        let result = orchestrator(oracle).generate_insights(&dataset, now()).await;
        assert_eq!(result.source, AiResponseSource::Fallback);
        assert_eq!(result.provider.fallback_reason.as_deref(), Some("HTTP_TIMEOUT"));
        assert_eq!(
            result.value,
            fallback_insights(&dataset, &AnalyticsThresholds::default(), now())
        );
    }

    #[tokio::test]
    async fn missing_oracle_goes_straight_to_fallback() {
        let orchestrator = InsightOrchestrator::offline(AnalyticsThresholds::default());
        let result = orchestrator
            .generate_recommendations(&AnalyticsDataset::default(), now())
            .await;
        assert_eq!(result.source, AiResponseSource::Fallback);
        assert_eq!(result.value, fallback_recommendations());
        assert_eq!(result.provider.fallback_reason.as_deref(), Some("MISSING_API_KEY"));

        let status = orchestrator.oracle_status(now());
        assert!(!status.configured);
        assert!(status.message.is_some());
    }

    #[tokio::test]
    async fn offline_fallback_is_quiet_but_oracle_failure_warns() {
        let recorder = WarnRecorder::default();
        let _guard = tracing::subscriber::set_default(
            tracing_subscriber::registry().with(recorder.clone()),
        );

        let offline = InsightOrchestrator::offline(AnalyticsThresholds::default())
            .generate_insights(&AnalyticsDataset::default(), now())
            .await;
        assert_eq!(offline.provider.fallback_reason.as_deref(), Some("MISSING_API_KEY"));
        assert!(offline.provider.correlation_id.is_none());
        assert!(offline.provider.provider_id.is_none());
        assert!(offline.provider.prompt_hash.is_some());
        assert!(recorder.targets().is_empty());

        let failed = orchestrator(ScriptedOracle::failing(AiErrorCode::Forbidden))
            .generate_insights(&AnalyticsDataset::default(), now())
            .await;
        assert_eq!(failed.provider.fallback_reason.as_deref(), Some("FORBIDDEN"));
        assert_eq!(failed.provider.provider_id.as_deref(), Some("scripted"));
        assert!(recorder.targets().iter().any(|target| target == "app::ai"));
    }

    #[test]
    fn response_schemas_compile_once_and_validate_repeatedly() {
        for kind in [
            OracleKind::Insights,
            OracleKind::Recommendations,
            OracleKind::Predictions,
        ] {
            let first = compiled_schema_for(kind).expect("schema compiles");
            let second = compiled_schema_for(kind).expect("schema compiles");
            assert!(std::ptr::eq(first, second));
        }

        let raw = r#"{"insights":[{"type":"success","title":"On track","description":"All good","confidence":0.9,"impact":"low"}]}"#;
        for _ in 0..3 {
            assert_eq!(parse_insights(raw).unwrap().len(), 1);
        }
        assert!(!compiled_schema_for(OracleKind::Insights)
            .unwrap()
            .is_valid(&json!({ "insights": [] })));
    }

    #[test]
    fn prompt_fingerprint_tracks_kind_and_data() {
        let orchestrator = InsightOrchestrator::offline(AnalyticsThresholds::default());
        let dataset = AnalyticsDataset::default();
        let insights = orchestrator.build_prompt(OracleKind::Insights, &dataset, now());
        let again = orchestrator.build_prompt(OracleKind::Insights, &dataset, now());
        let recs = orchestrator.build_prompt(OracleKind::Recommendations, &dataset, now());
        assert_eq!(insights.fingerprint, again.fingerprint);
        assert_ne!(insights.fingerprint, recs.fingerprint);
        assert!(insights.system.contains("actionItems"));
    }
}
