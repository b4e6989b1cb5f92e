use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum RiskType {
    Budget,
    Timeline,
    Workload,
}

impl RiskType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskType::Budget => "budget",
            RiskType::Timeline => "timeline",
            RiskType::Workload => "workload",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RiskFinding {
    #[serde(rename = "type")]
    pub kind: RiskType,
    pub level: RiskLevel,
    pub description: String,
    pub mitigation: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct RiskRatios {
    pub budget: f64,
    pub timeline: f64,
    pub workload: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RiskAssessment {
    pub overall_risk: RiskLevel,
    pub risk_score: f64,
    pub ratios: RiskRatios,
    pub findings: Vec<RiskFinding>,
}
