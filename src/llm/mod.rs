//! Language model providers
//!
//! JSON-mode completion over Gemini (hosted) and Ollama (local). A
//! `ModelChain` tries the configured models in order and returns the first
//! reply that parses as JSON. Provider error details are logged, never
//! returned to callers.

use crate::config::ExtractionConfig;
use crate::error::CoachError;
use crate::Result;
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use tracing::{info, warn};

pub mod gemini;
pub mod ollama;

pub use gemini::GeminiClient;
pub use ollama::OllamaClient;

/// Capability interface for a model that answers with a JSON object
#[async_trait]
pub trait JsonModel: Send + Sync {
    fn name(&self) -> &'static str;

    async fn generate_json(&self, prompt: &str, temperature: f32) -> Result<Value>;
}

/// Pull the JSON object out of a model reply that may be wrapped in a
/// ```json fence or surrounded by prose.
pub fn clean_model_json(text: &str) -> Result<Value> {
    let mut body = text.trim().to_string();

    if body.starts_with("```") {
        body = body
            .lines()
            .filter(|line| !line.trim().starts_with("```"))
            .collect::<Vec<_>>()
            .join("\n");
    }

    if let (Some(start), Some(end)) = (body.find('{'), body.rfind('}')) {
        if start < end {
            body = body[start..=end].to_string();
        }
    }

    serde_json::from_str(&body).map_err(|e| {
        CoachError::Extraction(format!("Model returned invalid JSON: {}", e))
    })
}

/// Ordered list of models; the first success wins.
pub struct ModelChain {
    models: Vec<Arc<dyn JsonModel>>,
}

impl ModelChain {
    pub fn new(models: Vec<Arc<dyn JsonModel>>) -> Self {
        Self { models }
    }

    /// Gemini first when a key is configured, then Ollama.
    pub fn from_config(config: &ExtractionConfig) -> Result<Self> {
        let mut models: Vec<Arc<dyn JsonModel>> = Vec::new();

        if let Some(key) = config.gemini_api_key.as_ref().filter(|k| !k.trim().is_empty()) {
            models.push(Arc::new(GeminiClient::new(
                key.clone(),
                config.gemini_model.clone(),
                config.timeout_secs,
            )?));
        }

        models.push(Arc::new(OllamaClient::new(
            config.ollama_url.clone(),
            config.ollama_model.clone(),
            config.timeout_secs,
        )?));

        Ok(Self::new(models))
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.models.iter().map(|m| m.name()).collect()
    }

    pub async fn generate_json(&self, prompt: &str, temperature: f32) -> Result<Value> {
        for model in &self.models {
            match model.generate_json(prompt, temperature).await {
                Ok(value) => {
                    info!(provider = model.name(), "Model replied");
                    return Ok(value);
                }
                Err(e) => {
                    warn!(provider = model.name(), error = %e, "Model provider failed");
                }
            }
        }

        Err(CoachError::Extraction(format!(
            "no language model provider answered (tried: {})",
            self.names().join(", ")
        )))
    }
}
