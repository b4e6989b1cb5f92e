use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::models::ai_types::{Recommendation, RecommendationCategory, RecommendationPriority};

/// Filter query as received from the boundary, before validation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RecommendationQuery {
    pub category: Option<String>,
    pub priority: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RecommendationFilter {
    pub category: Option<RecommendationCategory>,
    pub priority: Option<RecommendationPriority>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FilteredRecommendations {
    pub recommendations: Vec<Recommendation>,
    pub total_recommendations: usize,
    pub filtered_count: usize,
}

impl RecommendationFilter {
    /// Blank values are treated as absent; anything else must name a known
    /// category or priority.
    pub fn parse(query: &RecommendationQuery) -> AppResult<Self> {
        let category = match non_blank(query.category.as_deref()) {
            Some(raw) => Some(RecommendationCategory::try_from(raw).map_err(|_| {
                AppError::invalid_filter("category", raw, &category_names())
            })?),
            None => None,
        };
        let priority = match non_blank(query.priority.as_deref()) {
            Some(raw) => Some(RecommendationPriority::try_from(raw).map_err(|_| {
                AppError::invalid_filter("priority", raw, &priority_names())
            })?),
            None => None,
        };
        Ok(Self { category, priority })
    }

    pub fn matches(&self, recommendation: &Recommendation) -> bool {
        self.category
            .map_or(true, |category| recommendation.category == category)
            && self
                .priority
                .map_or(true, |priority| recommendation.priority == priority)
    }

    /// Stable filter: survivors keep their relative order.
    pub fn apply(&self, recommendations: Vec<Recommendation>) -> FilteredRecommendations {
        let total_recommendations = recommendations.len();
        let recommendations: Vec<Recommendation> = recommendations
            .into_iter()
            .filter(|recommendation| self.matches(recommendation))
            .collect();

        FilteredRecommendations {
            filtered_count: recommendations.len(),
            recommendations,
            total_recommendations,
        }
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}

fn category_names() -> Vec<&'static str> {
    RecommendationCategory::ALL
        .iter()
        .map(|category| category.as_str())
        .collect()
}

fn priority_names() -> Vec<&'static str> {
    RecommendationPriority::ALL
        .iter()
        .map(|priority| priority.as_str())
        .collect()
}
