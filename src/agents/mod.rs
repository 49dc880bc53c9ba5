//! Analysis agents
//!
//! Auditor → Strategist → Catalyst. Each agent is a pure function of its
//! inputs and the policy tables; none of them can fail on zero or empty
//! input.

pub mod auditor;
pub mod catalyst;
pub mod strategist;

pub use auditor::analyze;
pub use catalyst::propose;
pub use strategist::plan;

use rust_decimal::{Decimal, RoundingStrategy};

/// Round a monetary figure to 2 decimal places
pub(crate) fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}
