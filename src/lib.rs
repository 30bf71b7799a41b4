//! Credit Risk Scoring Library
//!
//! This library provides the scoring core for the credit risk API: feature
//! derivation for the classifier, risk bucketing, classifier loading and the
//! HTTP handlers that expose them.
//!
//! # Modules
//!
//! - `api`: API-layer components.
//! - `core`: Feature derivation, risk bucketing and shared models/errors.
//! - `integrations`: Classifier artifacts.
//! - `classifier`: Classifier trait and the JSON scorecard model.
//! - `config`: Configuration management.
//! - `docs`: OpenAPI document and Swagger UI.
//! - `errors`: Error handling types.
//! - `features`: Feature row construction.
//! - `handlers`: HTTP request handlers.
//! - `models`: Core data models.
//! - `risk`: Probability to risk bucket mapping.
//! - `services`: Scoring pipeline.

pub mod api;
pub mod core;
pub mod integrations;

// Re-export primary modules for shared use in tests and other binaries
pub mod classifier;
pub mod config;
pub mod docs;
pub mod errors;
pub mod features;
pub mod handlers;
pub mod models;
pub mod risk;
pub mod services;
