//! Coaching pipeline
//!
//! VALIDATE → AGGREGATE → AUDIT → STRATEGIZE → CATALYZE → COMPOSE → VERIFY
//!
//! Validation happens before any stage runs, so a bad record aborts the whole
//! run and no partial report is produced. Every stage after it is pure.

use crate::agents;
use crate::aggregator::aggregate;
use crate::config::PolicyConfig;
use crate::error::CoachError;
use crate::models::{
    AggregatedTotals, AuditReport, CoachingReport, InvestmentProposal, ReportingPeriod,
    SafetyNetPlan, Transaction, User,
};
use crate::verification::{create_default_verification_engine, VerificationEngine};
use crate::Result;
use chrono::Utc;
use tracing::{debug, info};

/// Assemble the stage outputs into one response. No computation.
pub fn compose(
    totals: AggregatedTotals,
    report: AuditReport,
    plan: SafetyNetPlan,
    proposal: InvestmentProposal,
) -> CoachingReport {
    CoachingReport {
        totals,
        report,
        plan,
        proposal,
    }
}

/// Reject records the pipeline must never see.
pub fn validate_input(user: &User, transactions: &[Transaction]) -> Result<()> {
    for tx in transactions {
        if tx.user_id != user.id {
            return Err(CoachError::validation(
                "user_id",
                format!("transaction {} belongs to user {}, not {}", tx.id, tx.user_id, user.id),
            ));
        }
        tx.validate()?;
    }
    Ok(())
}

/// Runs the analysis stages with an immutable policy. Safe to share across
/// requests behind an `Arc`.
pub struct CoachingPipeline {
    policy: PolicyConfig,
    verification: VerificationEngine,
}

impl CoachingPipeline {
    pub fn new(policy: PolicyConfig) -> Result<Self> {
        policy.validate()?;
        Ok(Self {
            policy,
            verification: create_default_verification_engine(),
        })
    }

    pub fn policy(&self) -> &PolicyConfig {
        &self.policy
    }

    /// Analyse the calendar month containing today's date.
    pub fn run(&self, user: &User, transactions: &[Transaction]) -> Result<CoachingReport> {
        let today = Utc::now().date_naive();
        self.run_for_period(user, transactions, ReportingPeriod::current_month(today))
    }

    pub fn run_for_period(
        &self,
        user: &User,
        transactions: &[Transaction],
        period: ReportingPeriod,
    ) -> Result<CoachingReport> {
        validate_input(user, transactions)?;

        debug!(
            user_id = %user.id,
            transaction_count = transactions.len(),
            period = %period,
            "Starting coaching analysis"
        );

        let totals = aggregate(transactions, period);
        let report = agents::analyze(&totals, &self.policy);
        let plan = agents::plan(&report, user.risk_profile, &self.policy);
        let proposal = agents::propose(&plan, &report, user.risk_profile, &self.policy);

        let composed = compose(totals, report, plan, proposal);

        let verification = self.verification.verify(&composed, &self.policy);
        if !verification.verified {
            return Err(CoachError::Invariant(verification.issues.join("; ")));
        }

        info!(
            user_id = %user.id,
            period = %composed.totals.period,
            leaks = composed.report.leaks.len(),
            "Coaching analysis completed"
        );

        Ok(composed)
    }
}

/// Single-call entry point for callers that do not keep a pipeline around.
pub fn run_coaching_analysis(
    policy: &PolicyConfig,
    user: &User,
    transactions: &[Transaction],
) -> Result<CoachingReport> {
    CoachingPipeline::new(policy.clone())?.run(user, transactions)
}
