use chrono::{NaiveDate, Utc};
use financial_coach::{
    advice,
    config::CoachConfig,
    models::{NewUser, ReportingPeriod, TransactionDraft},
    pipeline::CoachingPipeline,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Ledger file accepted by the CLI
#[derive(Debug, Deserialize)]
struct LedgerFile {
    #[serde(default = "default_name")]
    name: String,
    risk_profile: String,
    #[serde(default)]
    goals: Option<String>,
    transactions: Vec<LedgerEntry>,
}

#[derive(Debug, Deserialize)]
struct LedgerEntry {
    amount: Decimal,
    kind: String,
    #[serde(default)]
    tag: Option<String>,
    #[serde(default)]
    category: Option<String>,
    date: NaiveDate,
}

fn default_name() -> String {
    "cli-user".to_string()
}

const USAGE: &str = "usage: coach <ledger.json> [--all-time | --month YYYY-MM]";

fn parse_period(args: &[String]) -> Result<ReportingPeriod, Box<dyn std::error::Error>> {
    match args.first().map(String::as_str) {
        None => Ok(ReportingPeriod::current_month(Utc::now().date_naive())),
        Some("--all-time") => Ok(ReportingPeriod::AllTime),
        Some("--month") => {
            let raw = args.get(1).ok_or(USAGE)?;
            let first_day = NaiveDate::parse_from_str(&format!("{}-01", raw), "%Y-%m-%d")?;
            Ok(ReportingPeriod::current_month(first_day).resolve())
        }
        Some(_) => Err(USAGE.into()),
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let path = args.first().ok_or(USAGE)?;
    let period = parse_period(&args[1..])?;

    let config = CoachConfig::from_env()?;
    let pipeline = CoachingPipeline::new(config.policy)?;

    let ledger: LedgerFile = serde_json::from_str(&std::fs::read_to_string(path)?)?;

    let user = NewUser {
        name: ledger.name,
        risk_profile: ledger.risk_profile,
        goals: ledger.goals,
        age_range: None,
        income_range: None,
        debt: None,
        emi: None,
        existing_savings: None,
    }
    .into_user()?;

    let mut transactions = ledger
        .transactions
        .into_iter()
        .map(|entry| {
            TransactionDraft {
                user_id: user.id,
                amount: entry.amount,
                kind: entry.kind,
                tag: entry.tag,
                category: entry.category,
                date: entry.date,
            }
            .into_transaction()
        })
        .collect::<financial_coach::Result<Vec<_>>>()?;

    // Newest first, as the storage layer returns them
    transactions.reverse();
    transactions.sort_by(|a, b| b.date.cmp(&a.date));

    info!(
        transactions = transactions.len(),
        period = %period,
        "Running coaching analysis"
    );

    let coaching = pipeline.run_for_period(&user, &transactions, period)?;

    println!("{}", serde_json::to_string_pretty(&coaching)?);
    println!();
    println!("{}", advice::message_for(transactions.first(), &coaching));

    Ok(())
}
