//! Autonomous coach
//!
//! Runs after every chat message. The coach stays silent unless a model sees
//! a clear pattern of wasteful, repeated spending; then it answers with a
//! short regret message in the user's own language and, when there is money
//! to redirect, a couple of fund suggestions. A model failure is treated as
//! "no intervention".

use crate::extraction::ExtractedTransaction;
use crate::funds::{suggest_funds, Fund};
use crate::llm::ModelChain;
use crate::models::{Transaction, TransactionKind, User};
use crate::Result;
use async_trait::async_trait;
use chrono::{Days, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Newest transactions the coach looks at
pub const RECENT_WINDOW: usize = 20;
/// Days that count as "this week" for same-tag spend
pub const TAG_LOOKBACK_DAYS: u64 = 7;
/// Funds shown next to a regret message
pub const FUND_SUGGESTION_LIMIT: usize = 2;
/// Smallest redirectable amount worth a fund suggestion
pub const MIN_SUGGESTION_AMOUNT: Decimal = Decimal::ONE_THOUSAND;

const PROMPT_SAMPLE: usize = 5;
const COACHING_TEMPERATURE: f32 = 0.7;
const UNAVAILABLE_REASONING: &str = "Coaching analysis unavailable";

const HINGLISH_MARKERS: &[&str] = &[
    "maine", "kamaye", "kharch", "diye", "liye", "kar", "tune", "tera", "tu",
];

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Hinglish,
    Hindi,
    English,
}

impl Language {
    fn instruction(self) -> &'static str {
        match self {
            Language::Hinglish => "Reply in Hinglish (Hindi words in Latin script), casual and friendly.",
            Language::Hindi => "Reply in Hindi (Devanagari script), casual and friendly.",
            Language::English => "Reply in simple English, casual and friendly.",
        }
    }
}

/// Guess the reply language from the user's message. Hinglish marker words
/// are matched as whole words; blank input defaults to Hinglish.
pub fn detect_language(text: &str) -> Language {
    if text.trim().is_empty() {
        return Language::Hinglish;
    }

    let lower = text.to_lowercase();
    if lower
        .split(|c: char| !c.is_alphanumeric())
        .any(|word| HINGLISH_MARKERS.contains(&word))
    {
        return Language::Hinglish;
    }

    if text.chars().any(|c| ('\u{0900}'..='\u{097F}').contains(&c)) {
        return Language::Hindi;
    }

    Language::English
}

/// Spending facts the coach reasons about
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpendingSnapshot {
    /// Expense totals by tag over the recent window
    pub expense_by_tag: BTreeMap<String, Decimal>,
    pub total_expenses: Decimal,
    /// Tag of the message being coached
    pub current_tag: String,
    /// Expenses with `current_tag` in the last week
    pub week_tag_spend: Decimal,
    pub week_tag_count: usize,
}

impl SpendingSnapshot {
    /// `history` must be newest first.
    pub fn from_history(current_tag: &str, history: &[Transaction], today: NaiveDate) -> Self {
        let week_start = today
            .checked_sub_days(Days::new(TAG_LOOKBACK_DAYS))
            .unwrap_or(NaiveDate::MIN);

        let mut expense_by_tag: BTreeMap<String, Decimal> = BTreeMap::new();
        let mut total_expenses = Decimal::ZERO;
        let mut week_tag_spend = Decimal::ZERO;
        let mut week_tag_count = 0;

        for tx in history
            .iter()
            .take(RECENT_WINDOW)
            .filter(|t| t.kind == TransactionKind::Expense)
        {
            let tag = tx.tag_bucket();
            *expense_by_tag.entry(tag.to_string()).or_default() += tx.amount;
            total_expenses += tx.amount;

            if tag == current_tag && tx.date > week_start {
                week_tag_spend += tx.amount;
                week_tag_count += 1;
            }
        }

        Self {
            expense_by_tag,
            total_expenses,
            current_tag: current_tag.to_string(),
            week_tag_spend,
            week_tag_count,
        }
    }
}

/// Everything an advisor sees for one message
#[derive(Debug, Clone)]
pub struct CoachingContext {
    pub user: User,
    pub extracted: ExtractedTransaction,
    pub language: Language,
    pub snapshot: SpendingSnapshot,
    /// Newest few transactions, quoted in the prompt
    pub recent: Vec<Transaction>,
}

impl CoachingContext {
    /// `history` must be newest first and already include the message's own
    /// transactions.
    pub fn new(
        user: User,
        extracted: ExtractedTransaction,
        text: &str,
        history: &[Transaction],
        today: NaiveDate,
    ) -> Self {
        let snapshot = SpendingSnapshot::from_history(&extracted.expense_tag(), history, today);

        Self {
            user,
            extracted,
            language: detect_language(text),
            snapshot,
            recent: history.iter().take(PROMPT_SAMPLE).cloned().collect(),
        }
    }

    /// Money that could go into funds instead: this message's surplus, or the
    /// week's spend on the same tag when that is larger.
    pub fn redirectable_amount(&self) -> Decimal {
        let extracted = &self.extracted;
        let mut amount = if extracted.income > Decimal::ZERO {
            (extracted.income - extracted.expense).max(Decimal::ZERO)
        } else {
            Decimal::ZERO
        };

        let snapshot = &self.snapshot;
        if snapshot.week_tag_spend > Decimal::ZERO
            && snapshot.expense_by_tag.contains_key(&snapshot.current_tag)
        {
            amount = amount.max(snapshot.week_tag_spend);
        }

        amount
    }
}

/// What an advisor decided about one message
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InterventionDecision {
    pub should_intervene: bool,
    pub regret_message: Option<String>,
    pub reasoning: String,
    pub spending_insight: String,
}

impl InterventionDecision {
    pub fn silent(reasoning: impl Into<String>) -> Self {
        Self {
            reasoning: reasoning.into(),
            ..Self::default()
        }
    }

    /// Lenient conversion from model JSON. A decision to intervene without a
    /// message is downgraded to silence.
    pub fn from_value(value: &Value) -> Self {
        let text = |key: &str| {
            value
                .get(key)
                .and_then(Value::as_str)
                .map(str::trim)
                .filter(|s| !s.is_empty() && !s.eq_ignore_ascii_case("null"))
                .map(str::to_string)
        };

        let should_intervene = match value.get("should_intervene") {
            Some(Value::Bool(b)) => *b,
            Some(Value::String(s)) => s.trim().eq_ignore_ascii_case("true"),
            _ => false,
        };
        let regret_message = text("regret_message");

        Self {
            should_intervene: should_intervene && regret_message.is_some(),
            regret_message: if should_intervene { regret_message } else { None },
            reasoning: text("reasoning").unwrap_or_default(),
            spending_insight: text("spending_insight").unwrap_or_default(),
        }
    }
}

/// Capability interface for intervention backends
#[async_trait]
pub trait InterventionAdvisor: Send + Sync {
    fn name(&self) -> &'static str;

    async fn decide(&self, context: &CoachingContext) -> Result<InterventionDecision>;
}

/// Advisor backed by the configured language models
pub struct ModelAdvisor {
    models: Arc<ModelChain>,
}

impl ModelAdvisor {
    pub fn new(models: Arc<ModelChain>) -> Self {
        Self { models }
    }
}

#[async_trait]
impl InterventionAdvisor for ModelAdvisor {
    fn name(&self) -> &'static str {
        "model"
    }

    async fn decide(&self, context: &CoachingContext) -> Result<InterventionDecision> {
        let prompt = build_coaching_prompt(context)?;
        let value = self.models.generate_json(&prompt, COACHING_TEMPERATURE).await?;
        Ok(InterventionDecision::from_value(&value))
    }
}

pub fn build_coaching_prompt(context: &CoachingContext) -> Result<String> {
    let snapshot = &context.snapshot;
    let recent: Vec<Value> = context
        .recent
        .iter()
        .map(|t| {
            json!({
                "type": t.kind,
                "amount": t.amount,
                "tag": t.tag_bucket(),
                "date": t.date,
            })
        })
        .collect();

    let facts = json!({
        "user": {
            "name": context.user.name,
            "risk_profile": context.user.risk_profile,
            "goals": context.user.goals,
        },
        "current_message": {
            "income": context.extracted.income,
            "expense": context.extracted.expense,
            "tag": snapshot.current_tag,
        },
        "recent_spending_by_tag": snapshot.expense_by_tag,
        "recent_total_expenses": snapshot.total_expenses,
        "this_week_same_tag": {
            "amount": snapshot.week_tag_spend,
            "count": snapshot.week_tag_count,
        },
        "latest_transactions": recent,
    });

    Ok(format!(
        r#"You are a strict but caring personal finance coach for an Indian user.
Decide whether this spending needs an intervention. Stay silent for normal,
essential or one-off spending. Intervene only for repeated or clearly wasteful
spending, and then write one or two short sentences of regret that mention the
amount and what it could have become if invested.

{}

Facts:
{}

Return ONLY a JSON object:
{{
  "should_intervene": true or false,
  "regret_message": "message, or null when not intervening",
  "reasoning": "one line on why",
  "spending_insight": "one line about the pattern"
}}"#,
        context.language.instruction(),
        serde_json::to_string_pretty(&facts)?
    ))
}

/// Reply to a chat message
#[derive(Debug, Clone, Serialize)]
pub struct CoachResponse {
    pub should_intervene: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub regret_message: Option<String>,
    pub reasoning: String,
    pub spending_insight: String,
    pub fund_suggestions: Vec<Fund>,
    pub language: Language,
}

/// Ask the advisor and attach fund suggestions. Never fails.
pub async fn coach(advisor: &dyn InterventionAdvisor, context: &CoachingContext) -> CoachResponse {
    let decision = match advisor.decide(context).await {
        Ok(decision) => decision,
        Err(e) => {
            warn!(advisor = advisor.name(), error = %e, "Coaching analysis failed, staying silent");
            InterventionDecision::silent(UNAVAILABLE_REASONING)
        }
    };

    let fund_suggestions = if decision.should_intervene {
        let amount = context.redirectable_amount();
        debug!(%amount, "Redirectable amount");
        if amount >= MIN_SUGGESTION_AMOUNT {
            suggest_funds(context.user.risk_profile, amount)
                .into_iter()
                .take(FUND_SUGGESTION_LIMIT)
                .collect()
        } else {
            Vec::new()
        }
    } else {
        Vec::new()
    };

    info!(
        user_id = %context.user.id,
        intervene = decision.should_intervene,
        language = ?context.language,
        funds = fund_suggestions.len(),
        "Coaching decision"
    );

    CoachResponse {
        should_intervene: decision.should_intervene,
        regret_message: decision.regret_message,
        reasoning: decision.reasoning,
        spending_insight: decision.spending_insight,
        fund_suggestions,
        language: context.language,
    }
}
