//! Symptom triage service.
//!
//! A free-text symptom is classified into the repertory's category taxonomy by
//! a schema-constrained LLM call, matched against a pre-embedded symptom corpus
//! by similarity search, and the remedies of the selected symptoms are
//! collected and aggregated into a report. [`services::TriageService`] drives
//! one session through these steps; [`api`] exposes it over HTTP.

pub mod api;
pub mod config;
pub mod db;
pub mod embeddings;
pub mod error;
pub mod llm;
pub mod models;
pub mod retry;
pub mod search;
pub mod services;
pub mod taxonomy;

pub use error::{RemediaError, Result};
