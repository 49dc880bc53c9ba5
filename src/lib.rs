//! Financial Coach
//!
//! Turns a user's transaction history into a coaching report:
//! - Auditor: spending diagnosis (burn rate, leaks, saving potential)
//! - Strategist: emergency-fund plan with a liquid/locked split
//! - Catalyst: risk-tiered portfolio proposal with scenario notes
//!
//! Chat messages go through a language model for extraction and then the
//! autonomous coach, which decides whether to intervene.
//!
//! PIPELINE:
//! VALIDATE → AGGREGATE → AUDIT → STRATEGIZE → CATALYZE → COMPOSE → VERIFY

pub mod advice;
pub mod agents;
pub mod aggregator;
pub mod api;
pub mod audit;
pub mod coach;
pub mod config;
pub mod error;
pub mod extraction;
pub mod funds;
pub mod llm;
pub mod models;
pub mod pipeline;
pub mod store;
pub mod verification;

pub use error::{CoachError, Result};

// Re-export common types
pub use config::{CoachConfig, PolicyConfig};
pub use models::*;
pub use pipeline::{compose, run_coaching_analysis, CoachingPipeline};
