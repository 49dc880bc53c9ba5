//! Transaction aggregation
//!
//! Reduces a user's transaction history into per-period totals. This is the
//! only stage whose cost grows with input size (one linear scan).

use crate::models::{AggregatedTotals, ReportingPeriod, Transaction, TransactionKind};
use tracing::debug;

/// Sum the transactions that fall inside `period`.
///
/// A current-month period with no matching transactions falls back to the
/// whole history; the returned `period` records which window was used.
pub fn aggregate(transactions: &[Transaction], period: ReportingPeriod) -> AggregatedTotals {
    let mut effective = period.resolve();

    if matches!(period, ReportingPeriod::CurrentMonth { .. })
        && !transactions.iter().any(|t| effective.contains(t.date))
    {
        debug!(requested = %period, "No transactions in current month, using full history");
        effective = ReportingPeriod::AllTime;
    }

    let mut totals = AggregatedTotals::empty(effective);

    for tx in transactions.iter().filter(|t| effective.contains(t.date)) {
        match tx.kind {
            TransactionKind::Income => {
                totals.monthly_income += tx.amount;
            }
            TransactionKind::Expense => {
                totals.monthly_expenses += tx.amount;
                *totals
                    .expense_by_tag
                    .entry(tx.tag_bucket().to_string())
                    .or_default() += tx.amount;
                *totals
                    .expense_by_category
                    .entry(tx.category_bucket())
                    .or_default() += tx.amount;
            }
        }
    }

    debug!(
        period = %effective,
        income = %totals.monthly_income,
        expenses = %totals.monthly_expenses,
        tags = totals.expense_by_tag.len(),
        "Aggregated transactions"
    );

    totals
}
