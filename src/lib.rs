//! Analytics derivation and predictive insight engine for project dashboards.
//!
//! Raw workspace records are normalized into an [`models::metrics::AnalyticsDataset`],
//! from which the services derive KPIs, velocity and risk. Narrative insights,
//! recommendations and forecasts come from an external oracle when one is
//! configured, with deterministic heuristics standing in otherwise.

pub mod commands;
pub mod config;
pub mod error;
pub mod models;
pub mod services;
pub mod utils;
