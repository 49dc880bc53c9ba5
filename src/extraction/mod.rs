//! Free-text transaction extraction
//!
//! Turns a sentence like "earned 5000 today and spent 2000 on groceries" into
//! transaction drafts by asking a language model for a JSON object.

use crate::error::CoachError;
use crate::llm::ModelChain;
use crate::models::TransactionDraft;
use crate::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use uuid::Uuid;

const EXTRACTION_TEMPERATURE: f32 = 0.1;

/// Capability interface for extraction backends
#[async_trait]
pub trait TransactionExtractor: Send + Sync {
    fn name(&self) -> &'static str;

    async fn extract(&self, text: &str) -> Result<ExtractedTransaction>;
}

/// Transaction candidate as reported by a model
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ExtractedTransaction {
    pub income: Decimal,
    pub expense: Decimal,
    pub tags: Vec<String>,
    #[serde(rename = "expenseType")]
    pub expense_type: Option<String>,
    pub date: Option<String>,
}

impl ExtractedTransaction {
    /// Lenient conversion from model JSON: wrong types become defaults.
    pub fn from_value(value: &Value) -> Self {
        let amount = |key: &str| {
            value
                .get(key)
                .and_then(Value::as_f64)
                .and_then(|n| Decimal::try_from(n).ok())
                .unwrap_or(Decimal::ZERO)
        };

        let tags = value
            .get("tags")
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(Value::as_str)
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        let text = |key: &str| {
            value
                .get(key)
                .and_then(Value::as_str)
                .map(str::trim)
                .filter(|s| !s.is_empty() && !s.eq_ignore_ascii_case("null"))
                .map(str::to_string)
        };

        Self {
            income: amount("income"),
            expense: amount("expense"),
            tags,
            expense_type: text("expenseType"),
            date: text("date"),
        }
    }

    /// Tag the expense draft is stored under: tags joined by ", ", or
    /// "expense" when the model found none.
    pub fn expense_tag(&self) -> String {
        if self.tags.is_empty() {
            "expense".to_string()
        } else {
            self.tags.join(", ")
        }
    }

    /// Income and expense drafts for the extracted amounts. Unparseable dates
    /// fall back to `today`.
    pub fn into_drafts(self, user_id: Uuid, today: NaiveDate) -> Vec<TransactionDraft> {
        let date = self
            .date
            .as_deref()
            .and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok())
            .unwrap_or(today);

        let mut drafts = Vec::with_capacity(2);

        if self.income > Decimal::ZERO {
            drafts.push(TransactionDraft {
                user_id,
                amount: self.income,
                kind: "income".to_string(),
                tag: Some("income".to_string()),
                category: None,
                date,
            });
        }

        if self.expense > Decimal::ZERO {
            drafts.push(TransactionDraft {
                user_id,
                amount: self.expense,
                kind: "expense".to_string(),
                tag: Some(self.expense_tag()),
                category: self.expense_type,
                date,
            });
        }

        drafts
    }
}

/// Extraction prompt
pub fn build_extraction_prompt(text: &str) -> String {
    format!(
        r#"Extract financial transaction information from the following text and return ONLY a valid JSON object with no additional text.

Text: {text}

Return a JSON object with the following structure:
{{
    "income": <number or 0 if no income mentioned>,
    "expense": <number or 0 if no expense mentioned>,
    "tags": [<list of expense tags/descriptions>],
    "expenseType": "<needs|wants|null>",
    "date": "<YYYY-MM-DD or null if not mentioned>"
}}

Example:
Text: "I earned 5000 rupees today and spent 2000 on groceries"
Response: {{"income": 5000, "expense": 2000, "tags": ["groceries"], "expenseType": "needs", "date": null}}

Now extract from the given text:"#
    )
}

/// Extractor backed by the configured model chain
pub struct ModelExtractor {
    models: Arc<ModelChain>,
}

impl ModelExtractor {
    pub fn new(models: Arc<ModelChain>) -> Self {
        Self { models }
    }
}

#[async_trait]
impl TransactionExtractor for ModelExtractor {
    fn name(&self) -> &'static str {
        "model"
    }

    async fn extract(&self, text: &str) -> Result<ExtractedTransaction> {
        if text.trim().is_empty() {
            return Err(CoachError::validation("text", "no text content found in input"));
        }

        let value = self
            .models
            .generate_json(&build_extraction_prompt(text), EXTRACTION_TEMPERATURE)
            .await?;

        Ok(ExtractedTransaction::from_value(&value))
    }
}
