use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::error::AppResult;
use crate::models::analytics::{VelocityMetrics, VelocityTrend};
use crate::models::metrics::DataPoints;
use crate::models::risk::RiskAssessment;
use crate::utils::lenient::flexible_datetime;

/// The three qualitative outputs the oracle can be asked for.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum OracleKind {
    Insights,
    Recommendations,
    Predictions,
}

impl OracleKind {
    pub fn as_str(self) -> &'static str {
        match self {
            OracleKind::Insights => "insights",
            OracleKind::Recommendations => "recommendations",
            OracleKind::Predictions => "predictions",
        }
    }
}

impl fmt::Display for OracleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where an orchestrator result came from.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum AiResponseSource {
    Online,
    #[default]
    Fallback,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum InsightType {
    Warning,
    Success,
    Info,
    Prediction,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Impact {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Insight {
    #[serde(rename = "type")]
    pub kind: InsightType,
    pub title: String,
    pub description: String,
    pub confidence: f64,
    #[serde(default)]
    pub action_items: Vec<String>,
    pub impact: Impact,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum RecommendationCategory {
    Budget,
    Timeline,
    Team,
    Quality,
    Risk,
}

impl RecommendationCategory {
    pub const ALL: [RecommendationCategory; 5] = [
        RecommendationCategory::Budget,
        RecommendationCategory::Timeline,
        RecommendationCategory::Team,
        RecommendationCategory::Quality,
        RecommendationCategory::Risk,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RecommendationCategory::Budget => "budget",
            RecommendationCategory::Timeline => "timeline",
            RecommendationCategory::Team => "team",
            RecommendationCategory::Quality => "quality",
            RecommendationCategory::Risk => "risk",
        }
    }
}

impl TryFrom<&str> for RecommendationCategory {
    type Error = String;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_lowercase();
        RecommendationCategory::ALL
            .into_iter()
            .find(|category| category.as_str() == normalized)
            .ok_or_else(|| format!("unsupported recommendation category: {value}"))
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum RecommendationPriority {
    Low,
    Medium,
    High,
}

impl RecommendationPriority {
    pub const ALL: [RecommendationPriority; 3] = [
        RecommendationPriority::Low,
        RecommendationPriority::Medium,
        RecommendationPriority::High,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RecommendationPriority::Low => "low",
            RecommendationPriority::Medium => "medium",
            RecommendationPriority::High => "high",
        }
    }
}

impl TryFrom<&str> for RecommendationPriority {
    type Error = String;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_lowercase();
        RecommendationPriority::ALL
            .into_iter()
            .find(|priority| priority.as_str() == normalized)
            .ok_or_else(|| format!("unsupported recommendation priority: {value}"))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    pub category: RecommendationCategory,
    pub title: String,
    pub description: String,
    pub priority: RecommendationPriority,
    pub estimated_impact: String,
    #[serde(default)]
    pub implementation: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CompletionForecast {
    #[serde(deserialize_with = "flexible_datetime")]
    pub estimated_date: DateTime<Utc>,
    pub confidence: f64,
    #[serde(default)]
    pub factors: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BudgetForecast {
    pub projected_total: f64,
    pub overrun_risk: f64,
    #[serde(default)]
    pub factors: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TeamPerformanceForecast {
    pub burnout_risk: f64,
    pub trend: VelocityTrend,
    #[serde(default)]
    pub factors: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PredictiveAnalysis {
    pub project_completion: CompletionForecast,
    pub budget_forecast: BudgetForecast,
    pub team_performance: TeamPerformanceForecast,
}

/// Wire shape expected from the oracle for insight requests.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct InsightsPayload {
    pub insights: Vec<Insight>,
}

/// Wire shape expected from the oracle for recommendation requests.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationsPayload {
    pub recommendations: Vec<Recommendation>,
}

/// Metadata describing the provider that produced a response.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct AiProviderMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latency_ms: Option<u128>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tokens_used: Option<HashMap<String, u64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correlation_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompt_hash: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback_reason: Option<String>,
}

/// A fully built oracle request: strict-JSON system instruction plus the
/// serialized, normalized data.
#[derive(Debug, Clone, PartialEq)]
pub struct OraclePrompt {
    pub kind: OracleKind,
    pub system: &'static str,
    pub user: JsonValue,
    pub fingerprint: String,
}

/// Raw text returned by the oracle, before any validation.
#[derive(Debug, Clone, Default)]
pub struct OracleCompletion {
    pub content: String,
    pub metadata: AiProviderMetadata,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct OracleStatusDto {
    pub configured: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    pub timeout_secs: u64,
    pub checked_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// The external generative oracle. Transport and auth are the implementor's
/// concern; the engine only sees text or an error.
#[async_trait::async_trait]
pub trait InsightOracle: Send + Sync {
    async fn complete(&self, prompt: &OraclePrompt) -> AppResult<OracleCompletion>;

    fn provider_id(&self) -> &str;

    fn model(&self) -> Option<&str> {
        None
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InsightsResponse {
    pub insights: Vec<Insight>,
    pub source: AiResponseSource,
    pub generated_at: String,
    pub data_points: DataPoints,
    pub provider: AiProviderMetadata,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationsResponse {
    pub recommendations: Vec<Recommendation>,
    pub total_recommendations: usize,
    pub filtered_count: usize,
    pub source: AiResponseSource,
    pub generated_at: String,
    pub data_analysis: DataPoints,
    pub provider: AiProviderMetadata,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictionsResponse {
    pub predictions: PredictiveAnalysis,
    pub velocity: VelocityMetrics,
    pub risk_assessment: RiskAssessment,
    pub source: AiResponseSource,
    pub generated_at: String,
    pub data_points: DataPoints,
    pub provider: AiProviderMetadata,
}

/// Result of one orchestrated call, whichever path produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct Orchestrated<T> {
    pub value: T,
    pub source: AiResponseSource,
    pub provider: AiProviderMetadata,
}
