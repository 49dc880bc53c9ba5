//! Catalyst: investment proposal
//!
//! Surplus left after the safety-net contribution is split according to the
//! risk-tiered portfolio table. Scenario notes come from fixed rule checks in
//! a fixed order, so identical inputs give identical notes.

use super::round_money;
use crate::config::PolicyConfig;
use crate::models::{AuditReport, InvestmentProposal, RiskProfile, SafetyNetPlan};
use rust_decimal::Decimal;
use tracing::debug;

pub fn propose(
    plan: &SafetyNetPlan,
    report: &AuditReport,
    risk: RiskProfile,
    policy: &PolicyConfig,
) -> InvestmentProposal {
    let committed = committed_monthly(plan);
    let investable_amount =
        round_money((report.saving_potential - committed).max(Decimal::ZERO));

    let scenario_notes = scenario_notes(plan, report, risk, investable_amount);

    debug!(
        risk = %risk,
        committed = %committed,
        investable = %investable_amount,
        notes = scenario_notes.len(),
        "Portfolio proposed"
    );

    InvestmentProposal {
        investable_amount,
        portfolio: policy.portfolio.get(risk),
        scenario_notes,
    }
}

/// Monthly contribution the safety net needs to hit its goal on schedule
fn committed_monthly(plan: &SafetyNetPlan) -> Decimal {
    match plan.months_to_reach_goal {
        Some(months) if months > 0 && plan.emergency_fund_goal > Decimal::ZERO => {
            plan.emergency_fund_goal / Decimal::from(months)
        }
        _ => Decimal::ZERO,
    }
}

fn scenario_notes(
    plan: &SafetyNetPlan,
    report: &AuditReport,
    risk: RiskProfile,
    investable: Decimal,
) -> Vec<String> {
    let mut notes = Vec::new();

    let overspending = match report.burn_rate {
        None => true,
        Some(rate) => rate > Decimal::ONE_HUNDRED,
    };
    if overspending {
        notes.push(
            "Spending exceeds income; hold off on new investments until the burn rate is below 100%"
                .to_string(),
        );
    }

    if plan.emergency_fund_goal > Decimal::ZERO {
        match plan.months_to_reach_goal {
            None => notes.push(format!(
                "Emergency fund goal of {} is unreachable at the current savings rate",
                plan.emergency_fund_goal
            )),
            Some(months) => notes.push(format!(
                "Emergency fund not yet fully funded; saving {} per month completes it in {} month(s)",
                plan.monthly_savings_target, months
            )),
        }
    }

    if !report.leaks.is_empty() {
        notes.push(format!(
            "Cutting back on {} would free up more money to invest",
            report.leaks.join(", ")
        ));
    }

    if investable <= Decimal::ZERO {
        notes.push("No investable surplus this month after the safety-net contribution".to_string());
    }

    notes.extend(profile_notes(risk).iter().map(|n| n.to_string()));

    notes
}

fn profile_notes(risk: RiskProfile) -> &'static [&'static str] {
    match risk {
        RiskProfile::Low => &[
            "Conservative portfolio focused on capital preservation",
            "Higher allocation to debt instruments for stability",
        ],
        RiskProfile::Medium => &[
            "Balanced portfolio diversified across asset classes",
            "Growth and stability weighted evenly",
        ],
        RiskProfile::High => &[
            "Aggressive portfolio with higher equity exposure for long-term growth",
            "Expect larger short-term swings in portfolio value",
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Allocation;
    use rust_decimal_macros::dec;

    fn report(income: Decimal, expenses: Decimal, leaks: &[&str]) -> AuditReport {
        AuditReport {
            monthly_income: income,
            monthly_expenses: expenses,
            burn_rate: if income > Decimal::ZERO {
                Some(expenses / income * Decimal::ONE_HUNDRED)
            } else if expenses > Decimal::ZERO {
                None
            } else {
                Some(Decimal::ZERO)
            },
            leaks: leaks.iter().map(|s| s.to_string()).collect(),
            saving_potential: (income - expenses).max(Decimal::ZERO),
        }
    }

    fn safety_plan(goal: Decimal, months: Option<u32>, target: Decimal) -> SafetyNetPlan {
        SafetyNetPlan {
            emergency_fund_goal: goal,
            months_to_reach_goal: months,
            monthly_savings_target: target,
            allocation: Allocation { liquid_pct: 50, locked_pct: 50 },
        }
    }

    #[test]
    fn test_investable_after_safety_net_contribution() {
        let report = report(dec!(5000), dec!(2000), &["groceries"]);
        let plan = safety_plan(dec!(8000), Some(3), dec!(3000));

        let proposal = propose(&plan, &report, RiskProfile::Medium, &PolicyConfig::default());

        // 3000 - 8000 / 3
        assert_eq!(proposal.investable_amount, dec!(333.33));
        assert_eq!(proposal.portfolio.equity_pct, 55);
        assert_eq!(proposal.portfolio.total(), 100);
        assert_eq!(
            proposal.scenario_notes,
            vec![
                "Emergency fund not yet fully funded; saving 3000 per month completes it in 3 month(s)",
                "Cutting back on groceries would free up more money to invest",
                "Balanced portfolio diversified across asset classes",
                "Growth and stability weighted evenly",
            ]
        );
    }

    #[test]
    fn test_zero_income_proposal() {
        let report = report(Decimal::ZERO, dec!(1000), &[]);
        let plan = safety_plan(dec!(4000), None, Decimal::ZERO);

        let proposal = propose(&plan, &report, RiskProfile::Medium, &PolicyConfig::default());

        assert_eq!(proposal.investable_amount, Decimal::ZERO);
        assert!(proposal.scenario_notes[0].starts_with("Spending exceeds income"));
        assert!(proposal.scenario_notes[1].contains("unreachable"));
        assert!(proposal.scenario_notes[2].starts_with("No investable surplus"));
    }

    #[test]
    fn test_no_expenses_makes_all_savings_investable() {
        let report = report(dec!(1000), Decimal::ZERO, &[]);
        let plan = safety_plan(Decimal::ZERO, Some(0), dec!(1000));

        let proposal = propose(&plan, &report, RiskProfile::High, &PolicyConfig::default());

        assert_eq!(proposal.investable_amount, dec!(1000));
        assert_eq!(proposal.scenario_notes.len(), 2);
    }

    #[test]
    fn test_portfolios_sum_to_100() {
        let policy = PolicyConfig::default();
        let report = report(dec!(100), dec!(10), &[]);
        let plan = safety_plan(dec!(40), Some(1), dec!(90));

        for risk in RiskProfile::ALL {
            assert_eq!(propose(&plan, &report, risk, &policy).portfolio.total(), 100);
        }
    }

    #[test]
    fn test_notes_are_deterministic() {
        let report = report(dec!(900), dec!(1200), &["rent", "fuel"]);
        let plan = safety_plan(dec!(3600), None, Decimal::ZERO);
        let policy = PolicyConfig::default();

        let first = propose(&plan, &report, RiskProfile::Low, &policy);
        let second = propose(&plan, &report, RiskProfile::Low, &policy);

        assert_eq!(first, second);
        assert!(first.scenario_notes.iter().any(|n| n.contains("rent, fuel")));
    }
}
