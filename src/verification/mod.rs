//! Verification engine for output invariants
//!
//! Rules-based checks run on every composed report before it leaves the
//! pipeline. Deterministic enforcement.

use crate::config::PolicyConfig;
use crate::models::CoachingReport;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Trait for verification rules
pub trait VerificationRule: Send + Sync {
    fn name(&self) -> &'static str;

    fn verify(&self, report: &CoachingReport, policy: &PolicyConfig) -> VerificationCheckResult;
}

pub struct VerificationCheckResult {
    pub passed: bool,
    pub details: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleCheck {
    pub rule_name: String,
    pub passed: bool,
    pub details: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationResult {
    pub verified: bool,
    pub checks: Vec<RuleCheck>,
    pub issues: Vec<String>,
}

/// Verification engine that enforces rules
pub struct VerificationEngine {
    rules: Vec<Box<dyn VerificationRule>>,
}

impl VerificationEngine {
    pub fn new() -> Self {
        Self { rules: Vec::new() }
    }

    pub fn add_rule(&mut self, rule: Box<dyn VerificationRule>) {
        self.rules.push(rule);
    }

    pub fn verify(&self, report: &CoachingReport, policy: &PolicyConfig) -> VerificationResult {
        let mut checks = Vec::with_capacity(self.rules.len());
        let mut issues = Vec::new();

        for rule in &self.rules {
            let result = rule.verify(report, policy);

            if !result.passed {
                warn!(rule = rule.name(), details = %result.details, "Invariant check failed");
                issues.push(format!("{}: {}", rule.name(), result.details));
            }

            checks.push(RuleCheck {
                rule_name: rule.name().to_string(),
                passed: result.passed,
                details: result.details,
            });
        }

        let verified = issues.is_empty();

        info!(
            rule_count = self.rules.len(),
            verified = verified,
            "Verification completed"
        );

        VerificationResult {
            verified,
            checks,
            issues,
        }
    }
}

impl Default for VerificationEngine {
    fn default() -> Self {
        Self::new()
    }
}

//
// ========== Invariant Rules ==========
//

/// Rule: every percentage mapping sums to 100
pub struct PercentagesSumRule;

impl VerificationRule for PercentagesSumRule {
    fn name(&self) -> &'static str {
        "percentages_sum_to_100"
    }

    fn verify(&self, report: &CoachingReport, _policy: &PolicyConfig) -> VerificationCheckResult {
        let allocation = report.plan.allocation.total();
        let portfolio = report.proposal.portfolio.total();

        VerificationCheckResult {
            passed: allocation == 100 && portfolio == 100,
            details: format!("allocation={} portfolio={}", allocation, portfolio),
        }
    }
}

/// Rule: no monetary figure is negative
pub struct NonNegativeMoneyRule;

impl VerificationRule for NonNegativeMoneyRule {
    fn name(&self) -> &'static str {
        "non_negative_money"
    }

    fn verify(&self, report: &CoachingReport, _policy: &PolicyConfig) -> VerificationCheckResult {
        let figures = [
            ("monthly_income", report.report.monthly_income),
            ("monthly_expenses", report.report.monthly_expenses),
            ("saving_potential", report.report.saving_potential),
            ("emergency_fund_goal", report.plan.emergency_fund_goal),
            ("monthly_savings_target", report.plan.monthly_savings_target),
            ("investable_amount", report.proposal.investable_amount),
        ];

        let negative: Vec<&str> = figures
            .iter()
            .filter(|(_, value)| *value < Decimal::ZERO)
            .map(|(name, _)| *name)
            .collect();

        VerificationCheckResult {
            passed: negative.is_empty(),
            details: if negative.is_empty() {
                "All monetary figures non-negative".to_string()
            } else {
                format!("Negative figures: {}", negative.join(", "))
            },
        }
    }
}

/// Rule: every reported leak is above the configured threshold
pub struct LeakThresholdRule;

impl VerificationRule for LeakThresholdRule {
    fn name(&self) -> &'static str {
        "leaks_above_threshold"
    }

    fn verify(&self, report: &CoachingReport, policy: &PolicyConfig) -> VerificationCheckResult {
        let limit = report.totals.monthly_expenses * policy.leak_threshold;

        let below: Vec<&str> = report
            .report
            .leaks
            .iter()
            .filter(|tag| {
                report
                    .totals
                    .expense_by_tag
                    .get(tag.as_str())
                    .map_or(true, |total| *total <= limit)
            })
            .map(String::as_str)
            .collect();

        VerificationCheckResult {
            passed: below.is_empty(),
            details: format!("{} leak(s), {} below threshold", report.report.leaks.len(), below.len()),
        }
    }
}

/// Create a default verification engine with the output invariants
pub fn create_default_verification_engine() -> VerificationEngine {
    let mut engine = VerificationEngine::new();
    engine.add_rule(Box::new(PercentagesSumRule));
    engine.add_rule(Box::new(NonNegativeMoneyRule));
    engine.add_rule(Box::new(LeakThresholdRule));
    engine
}

//
// ================= Tests =================
//

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        AggregatedTotals, Allocation, AuditReport, InvestmentProposal, Portfolio,
        ReportingPeriod, SafetyNetPlan,
    };
    use rust_decimal_macros::dec;

    fn sample_report() -> CoachingReport {
        let mut totals = AggregatedTotals::empty(ReportingPeriod::AllTime);
        totals.monthly_income = dec!(5000);
        totals.monthly_expenses = dec!(2000);
        totals.expense_by_tag.insert("groceries".to_string(), dec!(1800));
        totals.expense_by_tag.insert("other".to_string(), dec!(200));

        CoachingReport {
            totals,
            report: AuditReport {
                monthly_income: dec!(5000),
                monthly_expenses: dec!(2000),
                burn_rate: Some(dec!(40)),
                leaks: vec!["groceries".to_string()],
                saving_potential: dec!(3000),
            },
            plan: SafetyNetPlan {
                emergency_fund_goal: dec!(8000),
                months_to_reach_goal: Some(3),
                monthly_savings_target: dec!(3000),
                allocation: Allocation { liquid_pct: 50, locked_pct: 50 },
            },
            proposal: InvestmentProposal {
                investable_amount: dec!(333.33),
                portfolio: Portfolio { equity_pct: 55, debt_pct: 30, gold_pct: 10, cash_pct: 5 },
                scenario_notes: vec![],
            },
        }
    }

    #[test]
    fn test_verification() {
        let engine = create_default_verification_engine();
        let result = engine.verify(&sample_report(), &PolicyConfig::default());

        assert!(result.verified);
        assert_eq!(result.checks.len(), 3);
        assert!(result.issues.is_empty());
    }

    #[test]
    fn test_broken_invariants_reported() {
        let mut report = sample_report();
        report.proposal.portfolio.cash_pct = 10;
        report.proposal.investable_amount = dec!(-1);
        report.report.leaks.push("other".to_string());

        let engine = create_default_verification_engine();
        let result = engine.verify(&report, &PolicyConfig::default());

        assert!(!result.verified);
        assert_eq!(result.issues.len(), 3);
        assert!(result.issues[1].contains("investable_amount"));
    }
}
