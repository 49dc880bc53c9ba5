//! Core data models for the financial coach

use crate::error::CoachError;
use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Bucket for expenses without a tag or category
pub const UNCATEGORIZED: &str = "uncategorized";

//
// ================= Enums =================
//

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum RiskProfile {
    Low,
    Medium,
    High,
}

impl RiskProfile {
    pub const ALL: [RiskProfile; 3] = [RiskProfile::Low, RiskProfile::Medium, RiskProfile::High];
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Income,
    Expense,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum SpendCategory {
    Needs,
    Wants,
}

impl FromStr for RiskProfile {
    type Err = CoachError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "low" => Ok(RiskProfile::Low),
            "medium" => Ok(RiskProfile::Medium),
            "high" => Ok(RiskProfile::High),
            other => Err(CoachError::validation(
                "risk_profile",
                format!("'{}' is not one of: low, medium, high", other),
            )),
        }
    }
}

impl FromStr for TransactionKind {
    type Err = CoachError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "income" => Ok(TransactionKind::Income),
            "expense" => Ok(TransactionKind::Expense),
            other => Err(CoachError::validation(
                "kind",
                format!("'{}' is not one of: income, expense", other),
            )),
        }
    }
}

impl FromStr for SpendCategory {
    type Err = CoachError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "needs" => Ok(SpendCategory::Needs),
            "wants" => Ok(SpendCategory::Wants),
            other => Err(CoachError::validation(
                "category",
                format!("'{}' is not one of: needs, wants", other),
            )),
        }
    }
}

impl fmt::Display for RiskProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RiskProfile::Low => "low",
            RiskProfile::Medium => "medium",
            RiskProfile::High => "high",
        };
        write!(f, "{}", s)
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TransactionKind::Income => "income",
            TransactionKind::Expense => "expense",
        };
        write!(f, "{}", s)
    }
}

impl fmt::Display for SpendCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SpendCategory::Needs => "needs",
            SpendCategory::Wants => "wants",
        };
        write!(f, "{}", s)
    }
}

//
// ================= Ledger Records =================
//

/// Smallest accepted amount (one paisa)
pub const MIN_TRANSACTION_AMOUNT: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

/// Largest accepted amount, 10^12 (one lakh crore). Keeps every derived
/// figure well inside `Decimal` range.
pub const MAX_TRANSACTION_AMOUNT: Decimal = Decimal::from_parts(3_567_587_328, 232, 0, false, 0);

/// A recorded income or expense. Immutable once stored.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Transaction {
    pub id: Uuid,
    pub user_id: Uuid,
    pub amount: Decimal,
    pub kind: TransactionKind,
    #[serde(default)]
    pub tag: Option<String>,
    #[serde(default)]
    pub category: Option<SpendCategory>,
    pub date: NaiveDate,
}

impl Transaction {
    /// Checks value ranges that the type system does not.
    pub fn validate(&self) -> crate::Result<()> {
        if self.amount <= Decimal::ZERO {
            return Err(CoachError::validation(
                "amount",
                format!("transaction {} has non-positive amount {}", self.id, self.amount),
            ));
        }
        if self.amount < MIN_TRANSACTION_AMOUNT {
            return Err(CoachError::validation(
                "amount",
                format!(
                    "transaction {} amount {} is below the minimum of {}",
                    self.id, self.amount, MIN_TRANSACTION_AMOUNT
                ),
            ));
        }
        if self.amount > MAX_TRANSACTION_AMOUNT {
            return Err(CoachError::validation(
                "amount",
                format!(
                    "transaction {} amount {} exceeds the maximum of {}",
                    self.id, self.amount, MAX_TRANSACTION_AMOUNT
                ),
            ));
        }
        Ok(())
    }

    /// Tag used for aggregation; blank tags count as uncategorized.
    pub fn tag_bucket(&self) -> &str {
        match self.tag.as_deref().map(str::trim) {
            Some(tag) if !tag.is_empty() => tag,
            _ => UNCATEGORIZED,
        }
    }

    pub fn category_bucket(&self) -> String {
        self.category
            .map(|c| c.to_string())
            .unwrap_or_else(|| UNCATEGORIZED.to_string())
    }
}

/// Unvalidated transaction as received from a caller or extractor
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionDraft {
    pub user_id: Uuid,
    pub amount: Decimal,
    pub kind: String,
    #[serde(default)]
    pub tag: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    pub date: NaiveDate,
}

impl TransactionDraft {
    /// Validate field ranges and enum values, producing a stored transaction.
    pub fn into_transaction(self) -> crate::Result<Transaction> {
        let kind = self.kind.parse::<TransactionKind>()?;

        let category = match self.category.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => Some(raw.parse::<SpendCategory>()?),
        };

        let tag = self
            .tag
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty());

        let transaction = Transaction {
            id: Uuid::new_v4(),
            user_id: self.user_id,
            amount: self.amount,
            kind,
            tag,
            category,
            date: self.date,
        };
        transaction.validate()?;

        Ok(transaction)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub risk_profile: RiskProfile,
    #[serde(default)]
    pub goals: Option<String>,
    #[serde(default)]
    pub age_range: Option<String>,
    #[serde(default)]
    pub income_range: Option<String>,
    #[serde(default)]
    pub debt: Option<Decimal>,
    #[serde(default)]
    pub emi: Option<Decimal>,
    #[serde(default)]
    pub existing_savings: Option<Decimal>,
}

/// Onboarding payload for a new user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewUser {
    pub name: String,
    pub risk_profile: String,
    #[serde(default)]
    pub goals: Option<String>,
    #[serde(default)]
    pub age_range: Option<String>,
    #[serde(default)]
    pub income_range: Option<String>,
    #[serde(default)]
    pub debt: Option<Decimal>,
    #[serde(default)]
    pub emi: Option<Decimal>,
    #[serde(default)]
    pub existing_savings: Option<Decimal>,
}

impl NewUser {
    pub fn into_user(self) -> crate::Result<User> {
        if self.name.trim().is_empty() {
            return Err(CoachError::validation("name", "must not be empty"));
        }
        let risk_profile = self.risk_profile.parse::<RiskProfile>()?;

        for (field, value) in [
            ("debt", self.debt),
            ("emi", self.emi),
            ("existing_savings", self.existing_savings),
        ] {
            if matches!(value, Some(v) if v < Decimal::ZERO) {
                return Err(CoachError::validation(field, "must not be negative"));
            }
        }

        Ok(User {
            id: Uuid::new_v4(),
            name: self.name.trim().to_string(),
            risk_profile,
            goals: self.goals,
            age_range: self.age_range,
            income_range: self.income_range,
            debt: self.debt,
            emi: self.emi,
            existing_savings: self.existing_savings,
        })
    }
}

//
// ================= Reporting Period =================
//

/// Window of transactions an analysis covers
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "scope", rename_all = "snake_case")]
pub enum ReportingPeriod {
    /// Calendar month containing the reference date
    CurrentMonth { reference: NaiveDate },
    Month { year: i32, month: u32 },
    AllTime,
}

impl ReportingPeriod {
    pub fn current_month(reference: NaiveDate) -> Self {
        ReportingPeriod::CurrentMonth { reference }
    }

    /// Replace a relative period with its concrete calendar month.
    pub fn resolve(self) -> Self {
        match self {
            ReportingPeriod::CurrentMonth { reference } => ReportingPeriod::Month {
                year: reference.year(),
                month: reference.month(),
            },
            other => other,
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        match self.resolve() {
            ReportingPeriod::Month { year, month } => {
                date.year() == year && date.month() == month
            }
            _ => true,
        }
    }
}

impl fmt::Display for ReportingPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.resolve() {
            ReportingPeriod::Month { year, month } => write!(f, "{:04}-{:02}", year, month),
            _ => write!(f, "all-time"),
        }
    }
}

//
// ================= Pipeline Outputs =================
//

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AggregatedTotals {
    pub period: ReportingPeriod,
    pub monthly_income: Decimal,
    pub monthly_expenses: Decimal,
    pub expense_by_tag: BTreeMap<String, Decimal>,
    pub expense_by_category: BTreeMap<String, Decimal>,
}

impl AggregatedTotals {
    pub fn empty(period: ReportingPeriod) -> Self {
        Self {
            period,
            monthly_income: Decimal::ZERO,
            monthly_expenses: Decimal::ZERO,
            expense_by_tag: BTreeMap::new(),
            expense_by_category: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AuditReport {
    pub monthly_income: Decimal,
    pub monthly_expenses: Decimal,
    /// Expense to income percentage. `None` when there is spending but no income.
    pub burn_rate: Option<Decimal>,
    pub leaks: Vec<String>,
    pub saving_potential: Decimal,
}

/// Liquid vs locked split of the emergency fund
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Allocation {
    pub liquid_pct: u8,
    pub locked_pct: u8,
}

impl Allocation {
    pub fn total(&self) -> u32 {
        u32::from(self.liquid_pct) + u32::from(self.locked_pct)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SafetyNetPlan {
    pub emergency_fund_goal: Decimal,
    /// `None` when the goal cannot be reached at the current savings rate.
    pub months_to_reach_goal: Option<u32>,
    pub monthly_savings_target: Decimal,
    pub allocation: Allocation,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Portfolio {
    pub equity_pct: u8,
    pub debt_pct: u8,
    pub gold_pct: u8,
    pub cash_pct: u8,
}

impl Portfolio {
    pub fn total(&self) -> u32 {
        [self.equity_pct, self.debt_pct, self.gold_pct, self.cash_pct]
            .iter()
            .map(|p| u32::from(*p))
            .sum()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InvestmentProposal {
    pub investable_amount: Decimal,
    pub portfolio: Portfolio,
    pub scenario_notes: Vec<String>,
}

/// Full coaching response consumed by the message layer
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CoachingReport {
    pub totals: AggregatedTotals,
    pub report: AuditReport,
    pub plan: SafetyNetPlan,
    pub proposal: InvestmentProposal,
}
