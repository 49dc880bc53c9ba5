//! Fund suggestions
//!
//! A small static catalogue of mutual funds and the selection rules that map
//! a risk profile and investable amount to a short list.

use crate::models::RiskProfile;
use rust_decimal::Decimal;
use serde::Serialize;

const MAX_SUGGESTIONS: usize = 6;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FundType {
    Equity,
    Debt,
    Hybrid,
    Gold,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct Fund {
    pub name: &'static str,
    #[serde(rename = "type")]
    pub fund_type: FundType,
    pub category: &'static str,
    pub risk_level: RiskProfile,
    pub min_investment: u32,
    pub description: &'static str,
}

const fn fund(
    name: &'static str,
    fund_type: FundType,
    category: &'static str,
    risk_level: RiskProfile,
    description: &'static str,
) -> Fund {
    Fund {
        name,
        fund_type,
        category,
        risk_level,
        min_investment: 5000,
        description,
    }
}

pub const FUND_CATALOGUE: &[Fund] = &[
    // Equity
    fund("SBI Bluechip Fund", FundType::Equity, "Large Cap", RiskProfile::High, "Large cap equity fund with consistent returns"),
    fund("HDFC Equity Fund", FundType::Equity, "Multi Cap", RiskProfile::High, "Multi cap fund for diversified equity exposure"),
    fund("ICICI Prudential Bluechip Fund", FundType::Equity, "Large Cap", RiskProfile::High, "Large cap fund with strong track record"),
    fund("Axis Bluechip Fund", FundType::Equity, "Large Cap", RiskProfile::High, "Large cap equity fund"),
    fund("Mirae Asset Large Cap Fund", FundType::Equity, "Large Cap", RiskProfile::High, "Large cap fund with good returns"),
    // Debt
    fund("HDFC Debt Fund", FundType::Debt, "Corporate Bond", RiskProfile::Low, "Low risk debt fund for stable returns"),
    fund("ICICI Prudential Corporate Bond Fund", FundType::Debt, "Corporate Bond", RiskProfile::Low, "Corporate bond fund with low risk"),
    fund("SBI Magnum Gilt Fund", FundType::Debt, "Gilt", RiskProfile::Low, "Government securities fund"),
    // Hybrid
    fund("HDFC Balanced Advantage Fund", FundType::Hybrid, "Balanced", RiskProfile::Medium, "Balanced fund with equity and debt mix"),
    fund("ICICI Prudential Balanced Advantage Fund", FundType::Hybrid, "Balanced", RiskProfile::Medium, "Dynamic asset allocation fund"),
    // Gold
    fund("SBI Gold Fund", FundType::Gold, "Gold ETF", RiskProfile::Medium, "Gold ETF for portfolio diversification"),
    fund("HDFC Gold Fund", FundType::Gold, "Gold ETF", RiskProfile::Medium, "Gold investment fund"),
];

/// Funds suited to a risk profile. An investable amount of zero skips the
/// minimum-investment filter.
pub fn suggest_funds(risk: RiskProfile, investable_amount: Decimal) -> Vec<Fund> {
    let available: Vec<Fund> = FUND_CATALOGUE
        .iter()
        .copied()
        .filter(|f| {
            investable_amount <= Decimal::ZERO
                || Decimal::from(f.min_investment) <= investable_amount
        })
        .collect();

    let mut suggested: Vec<Fund> = match risk {
        RiskProfile::Low => {
            let mut picks: Vec<Fund> = available
                .iter()
                .copied()
                .filter(|f| {
                    matches!(f.fund_type, FundType::Debt | FundType::Hybrid)
                        || f.risk_level == RiskProfile::Low
                })
                .collect();
            picks.extend(available.iter().copied().filter(|f| f.fund_type == FundType::Equity).take(1));
            picks
        }
        RiskProfile::High => {
            let mut picks: Vec<Fund> = available
                .iter()
                .copied()
                .filter(|f| f.fund_type == FundType::Equity || f.risk_level == RiskProfile::High)
                .collect();
            picks.extend(available.iter().copied().filter(|f| f.fund_type == FundType::Debt).take(1));
            picks
        }
        RiskProfile::Medium => available,
    };

    suggested.truncate(MAX_SUGGESTIONS);
    suggested
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_low_risk_prefers_debt_and_hybrid() {
        let funds = suggest_funds(RiskProfile::Low, Decimal::ZERO);

        assert_eq!(funds.len(), 6);
        assert!(funds[..5]
            .iter()
            .all(|f| matches!(f.fund_type, FundType::Debt | FundType::Hybrid)));
        assert_eq!(funds[5].name, "SBI Bluechip Fund");
    }

    #[test]
    fn test_high_risk_caps_at_six() {
        let funds = suggest_funds(RiskProfile::High, dec!(10000));

        assert_eq!(funds.len(), 6);
        assert!(funds[..5].iter().all(|f| f.fund_type == FundType::Equity));
        assert_eq!(funds[5].fund_type, FundType::Debt);
    }

    #[test]
    fn test_small_amount_filters_everything() {
        assert!(suggest_funds(RiskProfile::Medium, dec!(1000)).is_empty());
    }

    #[test]
    fn test_serializes_type_field() {
        let json = serde_json::to_value(FUND_CATALOGUE[0]).unwrap();
        assert_eq!(json["type"], "equity");
        assert_eq!(json["risk_level"], "high");
    }
}
