//! Configuration for the financial coach
//!
//! Policy tables are loaded once per process (TOML file, then environment
//! overrides) and passed into the pipeline. Agents never read the
//! environment themselves.

use crate::audit::DEFAULT_AUDIT_CAPACITY;
use crate::error::CoachError;
use crate::models::{Allocation, Portfolio, RiskProfile};
use crate::Result;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;

/// One value per risk profile
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct RiskTable<T> {
    pub low: T,
    pub medium: T,
    pub high: T,
}

impl<T: Copy> RiskTable<T> {
    pub fn get(&self, risk: RiskProfile) -> T {
        match risk {
            RiskProfile::Low => self.low,
            RiskProfile::Medium => self.medium,
            RiskProfile::High => self.high,
        }
    }
}

/// Longest emergency-fund horizon a policy may configure (ten years)
pub const MAX_HORIZON_MONTHS: u32 = 120;

/// Domain policy used by the analysis agents
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PolicyConfig {
    /// Share of monthly expenses a single tag must exceed to count as a leak
    #[serde(default = "default_leak_threshold")]
    pub leak_threshold: Decimal,

    /// Emergency fund size in months of expenses
    #[serde(default = "default_horizon_months")]
    pub horizon_months: RiskTable<u32>,

    #[serde(default = "default_liquidity_split")]
    pub liquidity_split: RiskTable<Allocation>,

    #[serde(default = "default_portfolio")]
    pub portfolio: RiskTable<Portfolio>,
}

fn default_leak_threshold() -> Decimal {
    Decimal::new(15, 2)
}

fn default_horizon_months() -> RiskTable<u32> {
    RiskTable {
        low: 6,
        medium: 4,
        high: 3,
    }
}

fn default_liquidity_split() -> RiskTable<Allocation> {
    RiskTable {
        low: Allocation { liquid_pct: 70, locked_pct: 30 },
        medium: Allocation { liquid_pct: 50, locked_pct: 50 },
        high: Allocation { liquid_pct: 30, locked_pct: 70 },
    }
}

fn default_portfolio() -> RiskTable<Portfolio> {
    RiskTable {
        low: Portfolio { equity_pct: 30, debt_pct: 50, gold_pct: 15, cash_pct: 5 },
        medium: Portfolio { equity_pct: 55, debt_pct: 30, gold_pct: 10, cash_pct: 5 },
        high: Portfolio { equity_pct: 75, debt_pct: 15, gold_pct: 5, cash_pct: 5 },
    }
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            leak_threshold: default_leak_threshold(),
            horizon_months: default_horizon_months(),
            liquidity_split: default_liquidity_split(),
            portfolio: default_portfolio(),
        }
    }
}

impl PolicyConfig {
    /// Reject tables the agents cannot honour.
    pub fn validate(&self) -> Result<()> {
        if self.leak_threshold <= Decimal::ZERO || self.leak_threshold > Decimal::ONE {
            return Err(CoachError::Config(format!(
                "leak_threshold must be in (0, 1], got {}",
                self.leak_threshold
            )));
        }

        for risk in RiskProfile::ALL {
            let horizon = self.horizon_months.get(risk);
            if horizon == 0 || horizon > MAX_HORIZON_MONTHS {
                return Err(CoachError::Config(format!(
                    "horizon_months.{} must be between 1 and {}, got {}",
                    risk, MAX_HORIZON_MONTHS, horizon
                )));
            }

            let split = self.liquidity_split.get(risk);
            if split.total() != 100 {
                return Err(CoachError::Config(format!(
                    "liquidity_split.{} sums to {}, expected 100",
                    risk,
                    split.total()
                )));
            }

            let portfolio = self.portfolio.get(risk);
            if portfolio.total() != 100 {
                return Err(CoachError::Config(format!(
                    "portfolio.{} sums to {}, expected 100",
                    risk,
                    portfolio.total()
                )));
            }
        }

        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ServerConfig {
    #[serde(default = "default_port")]
    pub port: u16,

    /// Coaching runs kept in the audit log
    #[serde(default = "default_audit_capacity")]
    pub audit_capacity: usize,
}

fn default_port() -> u16 {
    8080
}

fn default_audit_capacity() -> usize {
    DEFAULT_AUDIT_CAPACITY
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            audit_capacity: default_audit_capacity(),
        }
    }
}

/// Providers for free-text transaction extraction
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExtractionConfig {
    /// Gemini is skipped when no key is configured
    #[serde(default)]
    pub gemini_api_key: Option<String>,

    #[serde(default = "default_gemini_model")]
    pub gemini_model: String,

    #[serde(default = "default_ollama_url")]
    pub ollama_url: String,

    #[serde(default = "default_ollama_model")]
    pub ollama_model: String,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_gemini_model() -> String {
    "gemini-2.5-flash".to_string()
}

fn default_ollama_url() -> String {
    "http://localhost:11434".to_string()
}

fn default_ollama_model() -> String {
    "llama3".to_string()
}

fn default_timeout_secs() -> u64 {
    60
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            gemini_api_key: None,
            gemini_model: default_gemini_model(),
            ollama_url: default_ollama_url(),
            ollama_model: default_ollama_model(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CoachConfig {
    #[serde(default)]
    pub policy: PolicyConfig,

    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub extraction: ExtractionConfig,
}

impl CoachConfig {
    /// Parse and validate a TOML document
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: CoachConfig = toml::from_str(content)?;
        config.policy.validate()?;
        Ok(config)
    }

    /// Load config from file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Load configuration from environment variables
    ///
    /// Environment variables:
    /// - `COACH_CONFIG` path to a TOML file (default: built-in policy)
    /// - `PORT` or `API_PORT` (default: 8080)
    /// - `GEMINI_API_KEY`, `GEMINI_MODEL`
    /// - `OLLAMA_URL`, `OLLAMA_MODEL`
    pub fn from_env() -> Result<Self> {
        let mut config = match env::var("COACH_CONFIG") {
            Ok(path) if !path.trim().is_empty() => Self::load(path)?,
            _ => Self::default(),
        };

        if let Ok(port) = env::var("PORT").or_else(|_| env::var("API_PORT")) {
            config.server.port = port
                .parse()
                .map_err(|_| CoachError::Config(format!("invalid port '{}'", port)))?;
        }

        if let Ok(key) = env::var("GEMINI_API_KEY") {
            if !key.trim().is_empty() {
                config.extraction.gemini_api_key = Some(key);
            }
        }
        if let Ok(model) = env::var("GEMINI_MODEL") {
            config.extraction.gemini_model = model;
        }
        if let Ok(url) = env::var("OLLAMA_URL") {
            config.extraction.ollama_url = url;
        }
        if let Ok(model) = env::var("OLLAMA_MODEL") {
            config.extraction.ollama_model = model;
        }

        Ok(config)
    }
}
