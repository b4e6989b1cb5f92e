pub mod ai_service;
pub mod data_normalizer;
pub mod fallback;
pub mod insight_orchestrator;
pub mod kpi_service;
pub mod prompt_templates;
pub mod recommendation_filter;
pub mod risk_service;
pub mod velocity_service;
