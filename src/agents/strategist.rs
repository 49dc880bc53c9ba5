//! Strategist: safety-net planning

use super::round_money;
use crate::config::PolicyConfig;
use crate::models::{AuditReport, RiskProfile, SafetyNetPlan};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use tracing::debug;

pub fn plan(report: &AuditReport, risk: RiskProfile, policy: &PolicyConfig) -> SafetyNetPlan {
    let horizon = Decimal::from(policy.horizon_months.get(risk));
    let emergency_fund_goal = round_money(report.monthly_expenses * horizon);
    let monthly_savings_target = report.saving_potential.max(Decimal::ZERO);

    let months_to_reach_goal = months_to_goal(emergency_fund_goal, monthly_savings_target);

    debug!(
        risk = %risk,
        goal = %emergency_fund_goal,
        months = ?months_to_reach_goal,
        "Safety net planned"
    );

    SafetyNetPlan {
        emergency_fund_goal,
        months_to_reach_goal,
        monthly_savings_target,
        allocation: policy.liquidity_split.get(risk),
    }
}

/// `None` means the goal is unreachable with no monthly savings.
fn months_to_goal(goal: Decimal, monthly_target: Decimal) -> Option<u32> {
    if goal <= Decimal::ZERO {
        return Some(0);
    }
    if monthly_target <= Decimal::ZERO {
        return None;
    }

    let months = (goal / monthly_target).ceil();
    Some(months.to_u32().unwrap_or(u32::MAX))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn report(income: Decimal, expenses: Decimal) -> AuditReport {
        AuditReport {
            monthly_income: income,
            monthly_expenses: expenses,
            burn_rate: None,
            leaks: vec![],
            saving_potential: (income - expenses).max(Decimal::ZERO),
        }
    }

    #[test]
    fn test_medium_profile_scenario() {
        let plan = plan(&report(dec!(5000), dec!(2000)), RiskProfile::Medium, &PolicyConfig::default());

        assert_eq!(plan.emergency_fund_goal, dec!(8000));
        assert_eq!(plan.monthly_savings_target, dec!(3000));
        assert_eq!(plan.months_to_reach_goal, Some(3));
        assert_eq!(plan.allocation.liquid_pct, 50);
        assert_eq!(plan.allocation.locked_pct, 50);
    }

    #[test]
    fn test_horizon_by_risk() {
        let policy = PolicyConfig::default();
        let r = report(dec!(3000), dec!(1000));

        assert_eq!(plan(&r, RiskProfile::Low, &policy).emergency_fund_goal, dec!(6000));
        assert_eq!(plan(&r, RiskProfile::Medium, &policy).emergency_fund_goal, dec!(4000));
        assert_eq!(plan(&r, RiskProfile::High, &policy).emergency_fund_goal, dec!(3000));
    }

    #[test]
    fn test_allocations_sum_to_100() {
        let policy = PolicyConfig::default();
        for risk in RiskProfile::ALL {
            let plan = plan(&report(dec!(100), dec!(50)), risk, &policy);
            assert_eq!(plan.allocation.total(), 100, "risk {}", risk);
        }
    }

    #[test]
    fn test_zero_savings_is_unreachable() {
        let plan = plan(&report(Decimal::ZERO, dec!(1000)), RiskProfile::Medium, &PolicyConfig::default());

        assert_eq!(plan.emergency_fund_goal, dec!(4000));
        assert_eq!(plan.monthly_savings_target, Decimal::ZERO);
        assert_eq!(plan.months_to_reach_goal, None);

        let json = serde_json::to_value(&plan).unwrap();
        assert!(json["months_to_reach_goal"].is_null());
    }

    #[test]
    fn test_no_expenses_needs_no_months() {
        let plan = plan(&report(Decimal::ZERO, Decimal::ZERO), RiskProfile::High, &PolicyConfig::default());

        assert_eq!(plan.emergency_fund_goal, Decimal::ZERO);
        assert_eq!(plan.months_to_reach_goal, Some(0));
    }

    #[test]
    fn test_months_round_up() {
        assert_eq!(months_to_goal(dec!(6000), dec!(3000)), Some(2));
        assert_eq!(months_to_goal(dec!(6000.01), dec!(3000)), Some(3));
        assert_eq!(months_to_goal(dec!(100), dec!(3000)), Some(1));
    }
}
