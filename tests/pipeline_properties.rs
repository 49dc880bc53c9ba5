use chrono::NaiveDate;
use financial_coach::{
    audit::compute_hash, config::MAX_HORIZON_MONTHS, CoachingPipeline, PolicyConfig,
    ReportingPeriod, RiskProfile, SpendCategory, Transaction, TransactionKind, User,
    MAX_TRANSACTION_AMOUNT, MIN_TRANSACTION_AMOUNT,
};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use uuid::Uuid;

fn user(risk: RiskProfile) -> User {
    User {
        id: Uuid::new_v4(),
        name: "Ravi".to_string(),
        risk_profile: risk,
        goals: Some("Buy a laptop".to_string()),
        age_range: None,
        income_range: None,
        debt: None,
        emi: None,
        existing_savings: None,
    }
}

fn tx(user: &User, amount: Decimal, kind: TransactionKind, tag: Option<&str>, day: u32) -> Transaction {
    Transaction {
        id: Uuid::new_v4(),
        user_id: user.id,
        amount,
        kind,
        tag: tag.map(str::to_string),
        category: match kind {
            TransactionKind::Expense => Some(SpendCategory::Needs),
            TransactionKind::Income => None,
        },
        date: NaiveDate::from_ymd_opt(2024, 6, day).unwrap(),
    }
}

fn june() -> ReportingPeriod {
    ReportingPeriod::current_month(NaiveDate::from_ymd_opt(2024, 6, 28).unwrap())
}

fn pipeline() -> CoachingPipeline {
    CoachingPipeline::new(PolicyConfig::default()).unwrap()
}

#[test]
fn groceries_scenario_end_to_end() {
    let user = user(RiskProfile::Medium);
    let history = vec![
        tx(&user, dec!(5000), TransactionKind::Income, Some("salary"), 1),
        tx(&user, dec!(1800), TransactionKind::Expense, Some("groceries"), 3),
        tx(&user, dec!(200), TransactionKind::Expense, Some("other"), 4),
    ];

    let coaching = pipeline().run_for_period(&user, &history, june()).unwrap();

    assert_eq!(coaching.report.leaks, vec!["groceries"]);
    assert_eq!(coaching.report.saving_potential, dec!(3000));
    assert_eq!(coaching.report.burn_rate, Some(dec!(40)));
    assert_eq!(coaching.plan.emergency_fund_goal, dec!(8000));
    assert_eq!(coaching.plan.allocation.liquid_pct, 50);
    assert_eq!(coaching.plan.allocation.locked_pct, 50);
    assert_eq!(coaching.plan.months_to_reach_goal, Some(3));
    assert_eq!(coaching.proposal.investable_amount, dec!(333.33));
    assert_eq!(coaching.proposal.portfolio.total(), 100);
}

#[test]
fn zero_income_reports_sentinels() {
    let user = user(RiskProfile::Medium);
    let history = vec![tx(&user, dec!(1000), TransactionKind::Expense, Some("rent"), 5)];

    let coaching = pipeline().run_for_period(&user, &history, june()).unwrap();

    assert_eq!(coaching.report.burn_rate, None);
    assert_eq!(coaching.plan.months_to_reach_goal, None);
    assert_eq!(coaching.report.saving_potential, Decimal::ZERO);
    assert_eq!(coaching.proposal.investable_amount, Decimal::ZERO);

    let json = serde_json::to_value(&coaching).unwrap();
    assert!(json["report"]["burn_rate"].is_null());
    assert!(json["plan"]["months_to_reach_goal"].is_null());
}

#[test]
fn empty_history_is_all_zero() {
    for risk in RiskProfile::ALL {
        let user = user(risk);
        let coaching = pipeline().run_for_period(&user, &[], june()).unwrap();

        assert_eq!(coaching.totals.monthly_income, Decimal::ZERO);
        assert_eq!(coaching.totals.monthly_expenses, Decimal::ZERO);
        assert_eq!(coaching.report.burn_rate, Some(Decimal::ZERO));
        assert!(coaching.report.leaks.is_empty());
        assert_eq!(coaching.report.saving_potential, Decimal::ZERO);
        assert_eq!(coaching.plan.emergency_fund_goal, Decimal::ZERO);
        assert_eq!(coaching.plan.monthly_savings_target, Decimal::ZERO);
        assert_eq!(coaching.plan.months_to_reach_goal, Some(0));
        assert_eq!(coaching.proposal.investable_amount, Decimal::ZERO);
    }
}

#[test]
fn percentages_sum_to_100_for_every_profile() {
    for risk in RiskProfile::ALL {
        let user = user(risk);
        let history = vec![
            tx(&user, dec!(4200), TransactionKind::Income, None, 1),
            tx(&user, dec!(1300), TransactionKind::Expense, Some("rent"), 2),
        ];

        let coaching = pipeline().run_for_period(&user, &history, june()).unwrap();

        assert_eq!(coaching.plan.allocation.total(), 100);
        assert_eq!(coaching.proposal.portfolio.total(), 100);
    }
}

#[test]
fn tag_totals_match_expenses_and_money_is_non_negative() {
    let user = user(RiskProfile::High);
    let history = vec![
        tx(&user, dec!(700), TransactionKind::Income, None, 1),
        tx(&user, dec!(333.33), TransactionKind::Expense, Some("fuel"), 2),
        tx(&user, dec!(120.01), TransactionKind::Expense, None, 3),
        tx(&user, dec!(650.66), TransactionKind::Expense, Some("rent"), 4),
        tx(&user, dec!(0.01), TransactionKind::Expense, Some("fuel"), 5),
    ];

    let coaching = pipeline().run_for_period(&user, &history, june()).unwrap();

    let by_tag: Decimal = coaching.totals.expense_by_tag.values().copied().sum();
    assert_eq!(by_tag, coaching.totals.monthly_expenses);
    assert!(coaching.report.saving_potential >= Decimal::ZERO);
    assert!(coaching.plan.monthly_savings_target >= Decimal::ZERO);
    assert!(coaching.proposal.investable_amount >= Decimal::ZERO);
    // overspend
    assert!(coaching.report.burn_rate.unwrap() > dec!(100));
}

#[test]
fn equal_leaks_ordered_by_name() {
    let user = user(RiskProfile::Low);
    let history = vec![
        tx(&user, dec!(3000), TransactionKind::Income, None, 1),
        tx(&user, dec!(500), TransactionKind::Expense, Some("travel"), 2),
        tx(&user, dec!(500), TransactionKind::Expense, Some("dining"), 3),
        tx(&user, dec!(500), TransactionKind::Expense, Some("bills"), 4),
    ];

    let coaching = pipeline().run_for_period(&user, &history, june()).unwrap();

    assert_eq!(coaching.report.leaks, vec!["bills", "dining", "travel"]);
}

#[test]
fn identical_input_gives_identical_output() {
    let user = user(RiskProfile::Medium);
    let history = vec![
        tx(&user, dec!(2500), TransactionKind::Income, None, 1),
        tx(&user, dec!(900), TransactionKind::Expense, Some("rent"), 2),
        tx(&user, dec!(450), TransactionKind::Expense, Some("food"), 3),
    ];

    let first = pipeline().run_for_period(&user, &history, june()).unwrap();
    let second = pipeline().run_for_period(&user, &history, june()).unwrap();

    assert_eq!(
        serde_json::to_vec(&first).unwrap(),
        serde_json::to_vec(&second).unwrap()
    );
    assert_eq!(compute_hash(&first), compute_hash(&second));
}

#[test]
fn policy_overrides_flow_through() {
    let mut policy = PolicyConfig::default();
    policy.horizon_months.medium = 10;
    policy.leak_threshold = dec!(0.9);
    let pipeline = CoachingPipeline::new(policy).unwrap();

    let user = user(RiskProfile::Medium);
    let history = vec![
        tx(&user, dec!(5000), TransactionKind::Income, None, 1),
        tx(&user, dec!(1800), TransactionKind::Expense, Some("groceries"), 3),
        tx(&user, dec!(200), TransactionKind::Expense, Some("other"), 4),
    ];

    let coaching = pipeline.run_for_period(&user, &history, june()).unwrap();

    assert!(coaching.report.leaks.is_empty());
    assert_eq!(coaching.plan.emergency_fund_goal, dec!(20000));
    assert_eq!(coaching.plan.months_to_reach_goal, Some(7));
}

#[test]
fn oversized_amount_is_rejected_before_analysis() {
    let user = user(RiskProfile::Low);
    let history = vec![
        tx(&user, dec!(0.01), TransactionKind::Income, None, 1),
        tx(&user, Decimal::from_scientific("1e27").unwrap(), TransactionKind::Expense, None, 2),
    ];

    let err = pipeline()
        .run_for_period(&user, &history, ReportingPeriod::AllTime)
        .unwrap_err();

    assert_eq!(err.field(), Some("amount"));
}

#[test]
fn extreme_valid_amounts_stay_in_range() {
    let mut policy = PolicyConfig::default();
    policy.horizon_months.low = MAX_HORIZON_MONTHS;
    let pipeline = CoachingPipeline::new(policy).unwrap();

    let user = user(RiskProfile::Low);
    let mut history = vec![tx(&user, MIN_TRANSACTION_AMOUNT, TransactionKind::Income, None, 1)];
    for day in 2..=28 {
        history.push(tx(&user, MAX_TRANSACTION_AMOUNT, TransactionKind::Expense, Some("rent"), day));
    }

    let coaching = pipeline.run_for_period(&user, &history, june()).unwrap();

    assert_eq!(coaching.totals.monthly_expenses, MAX_TRANSACTION_AMOUNT * dec!(27));
    assert!(coaching.report.burn_rate.unwrap() > dec!(100));
    assert_eq!(
        coaching.plan.emergency_fund_goal,
        MAX_TRANSACTION_AMOUNT * dec!(27) * Decimal::from(MAX_HORIZON_MONTHS)
    );
    assert_eq!(coaching.plan.months_to_reach_goal, None);
}

#[test]
fn small_surplus_against_large_goal_does_not_overflow() {
    let user = user(RiskProfile::Low);
    let history = vec![
        tx(&user, MAX_TRANSACTION_AMOUNT, TransactionKind::Income, None, 1),
        tx(&user, MAX_TRANSACTION_AMOUNT - dec!(0.01), TransactionKind::Expense, Some("rent"), 2),
    ];

    let coaching = pipeline().run_for_period(&user, &history, june()).unwrap();

    assert_eq!(coaching.report.saving_potential, dec!(0.01));
    assert!(coaching.plan.months_to_reach_goal.is_some());
    assert_eq!(coaching.proposal.portfolio.total(), 100);
}
