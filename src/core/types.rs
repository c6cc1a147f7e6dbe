use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DownPaymentType {
    Percentage,
    Amount,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum Recommendation {
    Buy,
    Rent,
}

impl fmt::Display for Recommendation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Recommendation::Buy => f.write_str("Buy"),
            Recommendation::Rent => f.write_str("Rent"),
        }
    }
}

/// Assumptions for one projection. All rates and cost fields are percentages
/// (6.5 means 6.5%), not fractions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculatorInputs {
    pub home_price: f64,
    pub down_payment_type: DownPaymentType,
    pub down_payment_percentage: f64,
    pub down_payment_amount: f64,
    pub mortgage_interest_rate: f64,
    pub time_horizon: u32,
    pub closing_costs: f64,
    pub annual_maintenance_costs: f64,
    pub annual_ownership_costs: f64,
    pub monthly_rent: f64,
    pub home_appreciation_rate: f64,
    pub rent_increase_rate: f64,
    pub investment_return_rate: f64,
}

impl Default for CalculatorInputs {
    fn default() -> Self {
        Self {
            home_price: 400_000.0,
            down_payment_type: DownPaymentType::Percentage,
            down_payment_percentage: 20.0,
            down_payment_amount: 80_000.0,
            mortgage_interest_rate: 6.5,
            time_horizon: 10,
            closing_costs: 2.5,
            annual_maintenance_costs: 1.0,
            annual_ownership_costs: 2.5,
            monthly_rent: 2_500.0,
            home_appreciation_rate: 3.0,
            rent_increase_rate: 2.5,
            investment_return_rate: 7.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct YearlyDataPoint {
    pub year: u32,
    pub property_value: f64,
    pub homeowner_equity: f64,
    pub down_payment_investment: f64,
    pub accumulated_savings: f64,
    pub total_renter_investment: f64,
    pub monthly_rent: f64,
    pub owner_monthly_payment: f64,
    /// Owner payment minus rent; negative when rent is the larger outlay.
    pub monthly_difference: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculationResult {
    pub monthly_mortgage_payment: f64,
    pub owner_monthly_payment: f64,
    pub final_property_value: f64,
    pub final_down_payment_investment: f64,
    pub final_accumulated_savings: f64,
    pub total_renter_investment: f64,
    pub recommendation: Recommendation,
    pub difference: f64,
    pub yearly_data: Vec<YearlyDataPoint>,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum InputField {
    HomePrice,
    DownPaymentPercentage,
    DownPaymentAmount,
    MortgageInterestRate,
    TimeHorizon,
    ClosingCosts,
    AnnualMaintenanceCosts,
    AnnualOwnershipCosts,
    MonthlyRent,
    HomeAppreciationRate,
    RentIncreaseRate,
    InvestmentReturnRate,
}

impl InputField {
    pub const ALL: [InputField; 12] = [
        InputField::HomePrice,
        InputField::DownPaymentPercentage,
        InputField::DownPaymentAmount,
        InputField::MortgageInterestRate,
        InputField::TimeHorizon,
        InputField::ClosingCosts,
        InputField::AnnualMaintenanceCosts,
        InputField::AnnualOwnershipCosts,
        InputField::MonthlyRent,
        InputField::HomeAppreciationRate,
        InputField::RentIncreaseRate,
        InputField::InvestmentReturnRate,
    ];

    pub fn name(self) -> &'static str {
        match self {
            InputField::HomePrice => "homePrice",
            InputField::DownPaymentPercentage => "downPaymentPercentage",
            InputField::DownPaymentAmount => "downPaymentAmount",
            InputField::MortgageInterestRate => "mortgageInterestRate",
            InputField::TimeHorizon => "timeHorizon",
            InputField::ClosingCosts => "closingCosts",
            InputField::AnnualMaintenanceCosts => "annualMaintenanceCosts",
            InputField::AnnualOwnershipCosts => "annualOwnershipCosts",
            InputField::MonthlyRent => "monthlyRent",
            InputField::HomeAppreciationRate => "homeAppreciationRate",
            InputField::RentIncreaseRate => "rentIncreaseRate",
            InputField::InvestmentReturnRate => "investmentReturnRate",
        }
    }

    pub fn is_rate(self) -> bool {
        matches!(
            self,
            InputField::MortgageInterestRate
                | InputField::InvestmentReturnRate
                | InputField::HomeAppreciationRate
                | InputField::RentIncreaseRate
        )
    }

    pub fn value(self, inputs: &CalculatorInputs) -> f64 {
        match self {
            InputField::HomePrice => inputs.home_price,
            InputField::DownPaymentPercentage => inputs.down_payment_percentage,
            InputField::DownPaymentAmount => inputs.down_payment_amount,
            InputField::MortgageInterestRate => inputs.mortgage_interest_rate,
            InputField::TimeHorizon => inputs.time_horizon as f64,
            InputField::ClosingCosts => inputs.closing_costs,
            InputField::AnnualMaintenanceCosts => inputs.annual_maintenance_costs,
            InputField::AnnualOwnershipCosts => inputs.annual_ownership_costs,
            InputField::MonthlyRent => inputs.monthly_rent,
            InputField::HomeAppreciationRate => inputs.home_appreciation_rate,
            InputField::RentIncreaseRate => inputs.rent_increase_rate,
            InputField::InvestmentReturnRate => inputs.investment_return_rate,
        }
    }

    /// Copy of `inputs` with this field replaced. A fractional horizon is
    /// floored, matching a year loop that only runs whole years.
    pub fn with_value(self, inputs: &CalculatorInputs, value: f64) -> CalculatorInputs {
        let mut next = inputs.clone();
        match self {
            InputField::HomePrice => next.home_price = value,
            InputField::DownPaymentPercentage => next.down_payment_percentage = value,
            InputField::DownPaymentAmount => next.down_payment_amount = value,
            InputField::MortgageInterestRate => next.mortgage_interest_rate = value,
            InputField::TimeHorizon => {
                next.time_horizon = if value.is_finite() {
                    value.floor().clamp(0.0, u32::MAX as f64) as u32
                } else {
                    0
                };
            }
            InputField::ClosingCosts => next.closing_costs = value,
            InputField::AnnualMaintenanceCosts => next.annual_maintenance_costs = value,
            InputField::AnnualOwnershipCosts => next.annual_ownership_costs = value,
            InputField::MonthlyRent => next.monthly_rent = value,
            InputField::HomeAppreciationRate => next.home_appreciation_rate = value,
            InputField::RentIncreaseRate => next.rent_increase_rate = value,
            InputField::InvestmentReturnRate => next.investment_return_rate = value,
        }
        next
    }
}

impl fmt::Display for InputField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for InputField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .chars()
            .filter(|c| *c != '_' && *c != '-')
            .map(|c| c.to_ascii_lowercase())
            .collect();
        InputField::ALL
            .into_iter()
            .find(|field| field.name().to_ascii_lowercase() == normalized)
            .ok_or_else(|| format!("unknown input field: {s}"))
    }
}
