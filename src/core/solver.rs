use thiserror::Error;

use super::engine::project;
use super::types::{CalculatorInputs, DownPaymentType, InputField, Recommendation};

pub const MAX_ITERATIONS: u32 = 100;
pub const TOLERANCE: f64 = 1e-4;
pub const RATE_SEARCH_MAX: f64 = 30.0;

/// Whether increasing a field makes buying more attractive. Asserted from the
/// model's behaviour, not checked at runtime.
const BUY_DIRECTIONS: [(InputField, bool); 11] = [
    (InputField::HomePrice, false),
    (InputField::MortgageInterestRate, false),
    (InputField::ClosingCosts, false),
    (InputField::AnnualMaintenanceCosts, false),
    (InputField::AnnualOwnershipCosts, false),
    (InputField::MonthlyRent, true),
    (InputField::InvestmentReturnRate, false),
    (InputField::HomeAppreciationRate, true),
    (InputField::RentIncreaseRate, true),
    (InputField::TimeHorizon, true),
    (InputField::DownPaymentPercentage, false),
];

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SolveError {
    #[error("solver has no search direction for {0}")]
    UnsupportedField(InputField),
    #[error("{field} cannot be solved: {reason}")]
    IneffectiveField {
        field: InputField,
        reason: &'static str,
    },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BreakevenIteration {
    pub iteration: u32,
    pub lower_bound: f64,
    pub upper_bound: f64,
    pub candidate_value: f64,
    pub recommendation: Recommendation,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BreakevenSolveResult {
    pub field: InputField,
    pub target: Recommendation,
    pub search_min: f64,
    pub search_max: f64,
    pub increasing_favors_target: bool,
    pub solved_value: Option<f64>,
    pub iterations: Vec<BreakevenIteration>,
    pub converged: bool,
}

pub fn increasing_favors_buy(field: InputField) -> Option<bool> {
    BUY_DIRECTIONS
        .iter()
        .find(|(candidate, _)| *candidate == field)
        .map(|(_, favors_buy)| *favors_buy)
}

pub fn search_upper_bound(base: &CalculatorInputs, field: InputField) -> f64 {
    if field.is_rate() {
        return RATE_SEARCH_MAX;
    }
    if field == InputField::HomePrice {
        return base.home_price * 3.0;
    }

    let scaled = field.value(base) * 5.0;
    if scaled == 0.0 || !scaled.is_finite() {
        100.0
    } else {
        scaled
    }
}

/// Finds a value of `field` for which the recommendation equals `target`,
/// holding every other input at `base`. `Ok(None)` means no candidate inside
/// the search bracket reached the target.
pub fn solve(
    base: &CalculatorInputs,
    field: InputField,
    target: Recommendation,
) -> Result<Option<f64>, SolveError> {
    solve_with_trace(base, field, target).map(|result| result.solved_value)
}

pub fn solve_with_trace(
    base: &CalculatorInputs,
    field: InputField,
    target: Recommendation,
) -> Result<BreakevenSolveResult, SolveError> {
    let favors_buy = increasing_favors_buy(field).ok_or(SolveError::UnsupportedField(field))?;
    if field == InputField::DownPaymentPercentage
        && base.down_payment_type == DownPaymentType::Amount
    {
        return Err(SolveError::IneffectiveField {
            field,
            reason: "down payment is given as an amount",
        });
    }

    let increasing_favors_target = match target {
        Recommendation::Buy => favors_buy,
        Recommendation::Rent => !favors_buy,
    };
    let search_min = 0.0;
    let search_max = search_upper_bound(base, field);

    let mut lo = search_min;
    let mut hi = search_max;
    let mut solved_value = None;
    let mut converged = false;
    let mut iterations = Vec::new();

    for it in 1..=MAX_ITERATIONS {
        let mid = lo + (hi - lo) / 2.0;
        if hi - lo < TOLERANCE {
            converged = true;
            break;
        }

        let recommendation = project(&field.with_value(base, mid)).recommendation;
        tracing::trace!(
            field = %field,
            iteration = it,
            lower_bound = lo,
            upper_bound = hi,
            candidate = mid,
            %recommendation,
            "breakeven step"
        );
        iterations.push(BreakevenIteration {
            iteration: it,
            lower_bound: lo,
            upper_bound: hi,
            candidate_value: mid,
            recommendation,
        });

        if recommendation == target {
            solved_value = Some(mid);
            if increasing_favors_target {
                hi = mid;
            } else {
                lo = mid;
            }
        } else if increasing_favors_target {
            lo = mid;
        } else {
            hi = mid;
        }
    }

    tracing::debug!(
        field = %field,
        %target,
        search_max,
        iterations = iterations.len(),
        converged,
        solved = ?solved_value,
        "breakeven search finished"
    );

    Ok(BreakevenSolveResult {
        field,
        target,
        search_min,
        search_max,
        increasing_favors_target,
        solved_value,
        iterations,
        converged,
    })
}
