use serde_json::{json, Value as JsonValue};

use crate::models::ai_types::OracleKind;
use crate::models::analytics::VelocityMetrics;
use crate::models::metrics::AnalyticsDataset;
use crate::models::risk::RiskAssessment;

/// System prompt for project health insights.
pub fn insights_system_prompt() -> &'static str {
    r#"You are Pulse's project analytics advisor. Read the normalized project, task and team
metrics in the user message and return valid UTF-8 JSON only. Do not wrap the response in
markdown code blocks. The schema is:
{
  "insights": [{
     "type": "warning" | "success" | "info" | "prediction",
     "title": string,
     "description": string,
     "confidence": number between 0 and 1,
     "actionItems": string[],
     "impact": "low" | "medium" | "high"
  }]
}
Return between one and five insights, most important first. Base every insight on the data."#
}

/// System prompt for improvement recommendations.
pub fn recommendations_system_prompt() -> &'static str {
    r#"You are Pulse's delivery coach. Based on the normalized metrics in the user message,
return valid UTF-8 JSON only, without markdown fences, matching:
{
  "recommendations": [{
     "category": "budget" | "timeline" | "team" | "quality" | "risk",
     "title": string,
     "description": string,
     "priority": "low" | "medium" | "high",
     "estimatedImpact": string,
     "implementation": string[]
  }]
}
Keep the list under six items and make every implementation step actionable."#
}

/// System prompt for delivery forecasts.
pub fn predictions_system_prompt() -> &'static str {
    r#"You are Pulse's forecasting analyst. Using the normalized metrics, velocity and risk
figures in the user message, return valid UTF-8 JSON only, without markdown fences, matching:
{
  "projectCompletion": {
     "estimatedDate": ISO-8601 UTC timestamp,
     "confidence": number between 0 and 1,
     "factors": string[]
  },
  "budgetForecast": {
     "projectedTotal": number,
     "overrunRisk": number between 0 and 1,
     "factors": string[]
  },
  "teamPerformance": {
     "burnoutRisk": number between 0 and 1,
     "trend": "increasing" | "decreasing" | "stable",
     "factors": string[]
  }
}"#
}

pub fn system_prompt(kind: OracleKind) -> &'static str {
    match kind {
        OracleKind::Insights => insights_system_prompt(),
        OracleKind::Recommendations => recommendations_system_prompt(),
        OracleKind::Predictions => predictions_system_prompt(),
    }
}

pub fn temperature(kind: OracleKind) -> f32 {
    match kind {
        OracleKind::Insights => 0.3,
        OracleKind::Recommendations => 0.4,
        OracleKind::Predictions => 0.2,
    }
}

/// Derived figures handed to the oracle next to the raw metrics.
pub struct PromptContext<'a> {
    pub dataset: &'a AnalyticsDataset,
    pub velocity: &'a VelocityMetrics,
    pub risk: &'a RiskAssessment,
    pub generated_at: &'a str,
}

/// Build the user payload for one oracle request.
pub fn build_analytics_payload(kind: OracleKind, context: &PromptContext<'_>) -> JsonValue {
    let expectations = match kind {
        OracleKind::Insights => json!({
            "maxInsights": 5,
            "confidenceRange": [0.0, 1.0]
        }),
        OracleKind::Recommendations => json!({
            "maxRecommendations": 5,
            "categories": ["budget", "timeline", "team", "quality", "risk"]
        }),
        OracleKind::Predictions => json!({
            "timezone": "UTC",
            "referenceTime": context.generated_at
        }),
    };

    json!({
        "operation": kind.as_str(),
        "context": {
            "projects": context.dataset.projects,
            "tasks": context.dataset.tasks,
            "team": context.dataset.team,
            "velocity": context.velocity,
            "riskAssessment": context.risk,
            "dataPoints": context.dataset.data_points()
        },
        "expectations": expectations
    })
}
