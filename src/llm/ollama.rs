//! Ollama provider (local models)

use super::{clean_model_json, JsonModel};
use crate::error::CoachError;
use crate::Result;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

pub struct OllamaClient {
    client: Client,
    base_url: String,
    model: String,
}

impl OllamaClient {
    pub fn new(base_url: String, model: String, timeout_secs: u64) -> Result<Self> {
        let client = Client::builder()
            .pool_idle_timeout(Duration::from_secs(60))
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            model,
        })
    }
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    format: &'static str,
    options: GenerateOptions,
}

#[derive(Debug, Serialize)]
struct GenerateOptions {
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    response: String,
}

#[async_trait::async_trait]
impl JsonModel for OllamaClient {
    fn name(&self) -> &'static str {
        "ollama"
    }

    async fn generate_json(&self, prompt: &str, temperature: f32) -> Result<Value> {
        let url = format!("{}/api/generate", self.base_url);
        let request = GenerateRequest {
            model: &self.model,
            prompt,
            stream: false,
            format: "json",
            options: GenerateOptions { temperature },
        };

        debug!(model = %self.model, url = %url, "Calling Ollama API");

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_connect() {
                    CoachError::Extraction(format!(
                        "Cannot connect to Ollama API at {}. Make sure Ollama is running",
                        self.base_url
                    ))
                } else if e.is_timeout() {
                    CoachError::Extraction("Ollama API request timed out".to_string())
                } else {
                    CoachError::Extraction(format!("Failed to call Ollama API: {}", e.without_url()))
                }
            })?;

        if !response.status().is_success() {
            return Err(CoachError::Extraction(format!(
                "Ollama API returned {}",
                response.status()
            )));
        }

        let body: GenerateResponse = response.json().await.map_err(|e| {
            CoachError::Extraction(format!("Ollama parse error: {}", e.without_url()))
        })?;
        if body.response.trim().is_empty() {
            return Err(CoachError::Extraction("Empty response from Ollama API".to_string()));
        }

        clean_model_json(&body.response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_shape() {
        let request = GenerateRequest {
            model: "llama3",
            prompt: "earned 900",
            stream: false,
            format: "json",
            options: GenerateOptions { temperature: 0.7 },
        };

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["model"], "llama3");
        assert_eq!(json["stream"], false);
        assert_eq!(json["format"], "json");
        assert!(json["options"]["temperature"].is_number());
    }

    #[test]
    fn test_trailing_slash_trimmed() {
        let client = OllamaClient::new("http://localhost:11434/".into(), "llama3".into(), 5).unwrap();
        assert_eq!(client.base_url, "http://localhost:11434");
    }

    #[tokio::test]
    async fn test_unreachable_server_is_extraction_error() {
        let client = OllamaClient::new("http://127.0.0.1:9".into(), "llama3".into(), 2).unwrap();

        let err = client.generate_json("spent 10", 0.1).await.unwrap_err();
        assert!(matches!(err, CoachError::Extraction(_)));
    }
}
