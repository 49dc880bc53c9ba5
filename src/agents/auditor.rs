//! Auditor: spending diagnosis
//!
//! Computes burn rate, leak tags and saving potential from aggregated totals.

use super::round_money;
use crate::config::PolicyConfig;
use crate::models::{AggregatedTotals, AuditReport, UNCATEGORIZED};
use rust_decimal::Decimal;
use tracing::debug;

pub fn analyze(totals: &AggregatedTotals, policy: &PolicyConfig) -> AuditReport {
    let income = totals.monthly_income;
    let expenses = totals.monthly_expenses;

    let burn_rate = burn_rate(income, expenses);
    let leaks = find_leaks(totals, policy.leak_threshold);
    let saving_potential = round_money((income - expenses).max(Decimal::ZERO));

    debug!(
        burn_rate = ?burn_rate,
        leak_count = leaks.len(),
        saving_potential = %saving_potential,
        "Audit completed"
    );

    AuditReport {
        monthly_income: round_money(income),
        monthly_expenses: round_money(expenses),
        burn_rate,
        leaks,
        saving_potential,
    }
}

/// Expense to income percentage. Spending with no income has no defined
/// rate and yields `None`.
fn burn_rate(income: Decimal, expenses: Decimal) -> Option<Decimal> {
    if income > Decimal::ZERO {
        Some(round_money(expenses / income * Decimal::ONE_HUNDRED))
    } else if expenses > Decimal::ZERO {
        None
    } else {
        Some(Decimal::ZERO)
    }
}

/// Tags whose spend strictly exceeds `threshold` of total expenses, largest
/// first, ties by name.
fn find_leaks(totals: &AggregatedTotals, threshold: Decimal) -> Vec<String> {
    if totals.monthly_expenses <= Decimal::ZERO {
        return Vec::new();
    }

    let limit = totals.monthly_expenses * threshold;

    let mut leaks: Vec<(&String, Decimal)> = totals
        .expense_by_tag
        .iter()
        .filter(|(tag, _)| tag.as_str() != UNCATEGORIZED)
        .filter(|(_, total)| **total > limit)
        .map(|(tag, total)| (tag, *total))
        .collect();

    leaks.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));

    leaks.into_iter().map(|(tag, _)| tag.clone()).collect()
}
