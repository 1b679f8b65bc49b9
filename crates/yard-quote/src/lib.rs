//! Multi-tenant yard service quoting: per-visit, monthly and first-visit prices derived
//! from each business's pricing configuration.

pub mod config;
pub mod error;
pub mod pricing;
pub mod telemetry;
