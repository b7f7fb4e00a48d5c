//! Webhook-driven deployment dispatcher for the BrightBudget backend.
//!
//! Receives GitHub push webhooks, validates their signature, filters for
//! pushes to the configured branch/repository, runs the deployment script
//! as a serialized bounded-time subprocess, and verifies service health
//! after a successful run. Every decision point is appended to an audit
//! log and exported as Prometheus metrics.

pub mod audit;
pub mod config;
pub mod error;
pub mod metrics;
pub mod models;
pub mod routes;
pub mod services;
