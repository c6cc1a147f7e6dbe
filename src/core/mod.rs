mod engine;
mod solver;
mod types;

pub use engine::{
    MORTGAGE_TERM_YEARS, SELLING_COST_RATE, down_payment_amount, monthly_mortgage_payment,
    project, remaining_loan_balance, rent_at,
};
pub use solver::{
    BreakevenIteration, BreakevenSolveResult, MAX_ITERATIONS, SolveError, TOLERANCE,
    increasing_favors_buy, search_upper_bound, solve, solve_with_trace,
};
pub use types::{
    CalculationResult, CalculatorInputs, DownPaymentType, InputField, Recommendation,
    YearlyDataPoint,
};
