//! Advice message templating
//!
//! Pure rendering of a coaching report into a short conversational summary.

use crate::models::{
    AuditReport, CoachingReport, InvestmentProposal, SafetyNetPlan, Transaction, TransactionKind,
};
use rust_decimal::{Decimal, RoundingStrategy};

const CURRENCY: &str = "₹";

fn whole(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
}

/// Summary anchored on the user's latest transaction.
pub fn summarize(
    latest: &Transaction,
    report: &AuditReport,
    plan: &SafetyNetPlan,
    proposal: &InvestmentProposal,
) -> String {
    let mut parts = Vec::with_capacity(4);

    match latest.kind {
        TransactionKind::Income => parts.push(format!(
            "Great job earning {}{} today!",
            CURRENCY,
            whole(latest.amount)
        )),
        TransactionKind::Expense => parts.push(format!(
            "You spent {}{} on {}.",
            CURRENCY,
            whole(latest.amount),
            latest.tag.as_deref().unwrap_or("transaction")
        )),
    }

    parts.extend(analysis_sentences(report, plan, proposal));

    parts.join(" ")
}

/// Summary used when there is no latest transaction to anchor on.
pub fn fallback_summary(report: &AuditReport) -> String {
    format!(
        "Your financial analysis is ready. Monthly income: {}{}, Expenses: {}{}.",
        CURRENCY,
        whole(report.monthly_income),
        CURRENCY,
        whole(report.monthly_expenses)
    )
}

/// Message for a full coaching report, newest transaction first.
pub fn message_for(latest: Option<&Transaction>, coaching: &CoachingReport) -> String {
    match latest {
        Some(tx) => summarize(tx, &coaching.report, &coaching.plan, &coaching.proposal),
        None => fallback_summary(&coaching.report),
    }
}

fn analysis_sentences(
    report: &AuditReport,
    plan: &SafetyNetPlan,
    proposal: &InvestmentProposal,
) -> Vec<String> {
    let mut sentences = Vec::new();

    match report.burn_rate {
        Some(rate) => sentences.push(format!("Your burn rate this month is {}%.", whole(rate))),
        None => sentences.push("You are spending with no income recorded this month.".to_string()),
    }

    if let Some(months) = plan.months_to_reach_goal {
        if plan.monthly_savings_target > Decimal::ZERO && months > 0 {
            sentences.push(format!(
                "If you save {}{}/month, you'll complete your emergency fund in {} months.",
                CURRENCY,
                whole(plan.monthly_savings_target),
                months
            ));
        }
    }

    let p = proposal.portfolio;
    sentences.push(format!(
        "Suggested portfolio: {}% equity, {}% debt, {}% gold, {}% cash.",
        p.equity_pct, p.debt_pct, p.gold_pct, p.cash_pct
    ));

    sentences
}
