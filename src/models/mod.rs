pub mod ai_types;
pub mod analytics;
pub mod metrics;
pub mod raw;
pub mod risk;
