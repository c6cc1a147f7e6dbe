use super::types::{
    CalculationResult, CalculatorInputs, DownPaymentType, Recommendation, YearlyDataPoint,
};

pub const MORTGAGE_TERM_YEARS: u32 = 30;
pub const SELLING_COST_RATE: f64 = 0.06;

#[derive(Debug, Clone, Copy)]
struct PurchaseTerms {
    down_payment: f64,
    loan_amount: f64,
    closing_costs: f64,
    monthly_mortgage_payment: f64,
    owner_monthly_payment: f64,
}

#[derive(Debug, Clone, Copy)]
struct RenterLedger {
    down_payment_investment: f64,
    accumulated_savings: f64,
}

impl RenterLedger {
    fn total(self) -> f64 {
        self.down_payment_investment + self.accumulated_savings
    }
}

pub fn project(inputs: &CalculatorInputs) -> CalculationResult {
    let inputs = sanitize_inputs(inputs);
    let terms = purchase_terms(&inputs);

    let mut yearly_data = Vec::with_capacity(inputs.time_horizon as usize + 1);
    let mut renter = RenterLedger {
        down_payment_investment: terms.down_payment,
        accumulated_savings: terms.closing_costs,
    };
    yearly_data.push(initial_year(&inputs, &terms, renter));

    for year in 1..=inputs.time_horizon {
        renter = advance_renter_ledger(&inputs, &terms, renter, year);
        yearly_data.push(project_year(&inputs, &terms, renter, year));
    }

    let last = yearly_data[yearly_data.len() - 1];
    let final_equity = decision_equity(last.property_value, terms.closing_costs);
    let total_renter_investment = last.total_renter_investment;
    let recommendation = if final_equity > total_renter_investment {
        Recommendation::Buy
    } else {
        Recommendation::Rent
    };

    tracing::debug!(
        time_horizon = inputs.time_horizon,
        monthly_mortgage_payment = terms.monthly_mortgage_payment,
        final_equity,
        total_renter_investment,
        %recommendation,
        "projection complete"
    );

    CalculationResult {
        monthly_mortgage_payment: terms.monthly_mortgage_payment,
        owner_monthly_payment: terms.owner_monthly_payment,
        final_property_value: last.property_value,
        final_down_payment_investment: last.down_payment_investment,
        final_accumulated_savings: last.accumulated_savings,
        total_renter_investment,
        recommendation,
        difference: (final_equity - total_renter_investment).abs(),
        yearly_data,
    }
}

pub fn monthly_mortgage_payment(loan_amount: f64, annual_rate: f64, term_years: u32) -> f64 {
    let monthly_rate = annual_rate / 100.0 / 12.0;
    let payments = term_years.saturating_mul(12) as f64;
    if payments <= 0.0 {
        return 0.0;
    }
    if monthly_rate == 0.0 {
        return loan_amount / payments;
    }

    let growth = (1.0 + monthly_rate).powf(payments);
    if !growth.is_finite() {
        // Interest-only limit of an unbounded term.
        return loan_amount * monthly_rate;
    }
    loan_amount * (monthly_rate * growth) / (growth - 1.0)
}

/// Outstanding principal after `months_elapsed` payments on the fixed
/// 30-year schedule. A zero-rate loan reports no balance.
pub fn remaining_loan_balance(loan_amount: f64, annual_rate: f64, months_elapsed: u32) -> f64 {
    let total_payments = MORTGAGE_TERM_YEARS * 12;
    if months_elapsed >= total_payments || annual_rate <= 0.0 {
        return 0.0;
    }

    let monthly_rate = annual_rate / 100.0 / 12.0;
    let full_growth = (1.0 + monthly_rate).powf(total_payments as f64);
    let elapsed_growth = (1.0 + monthly_rate).powf(months_elapsed as f64);
    loan_amount * (full_growth - elapsed_growth) / (full_growth - 1.0)
}

pub fn down_payment_amount(inputs: &CalculatorInputs) -> f64 {
    match inputs.down_payment_type {
        DownPaymentType::Percentage => inputs.home_price * inputs.down_payment_percentage / 100.0,
        DownPaymentType::Amount => inputs.down_payment_amount,
    }
}

/// Monthly rent `years` years after the start, compounding annually.
pub fn rent_at(inputs: &CalculatorInputs, years: u32) -> f64 {
    inputs.monthly_rent * (1.0 + inputs.rent_increase_rate / 100.0).powi(years as i32)
}

fn sanitize_inputs(inputs: &CalculatorInputs) -> CalculatorInputs {
    let non_negative = |v: f64| finite_or_zero(v).max(0.0);
    CalculatorInputs {
        home_price: non_negative(inputs.home_price),
        down_payment_type: inputs.down_payment_type,
        down_payment_percentage: non_negative(inputs.down_payment_percentage).min(100.0),
        down_payment_amount: non_negative(inputs.down_payment_amount),
        mortgage_interest_rate: non_negative(inputs.mortgage_interest_rate),
        time_horizon: inputs.time_horizon,
        closing_costs: non_negative(inputs.closing_costs),
        annual_maintenance_costs: non_negative(inputs.annual_maintenance_costs),
        annual_ownership_costs: non_negative(inputs.annual_ownership_costs),
        monthly_rent: non_negative(inputs.monthly_rent),
        home_appreciation_rate: growth_rate(inputs.home_appreciation_rate),
        rent_increase_rate: growth_rate(inputs.rent_increase_rate),
        investment_return_rate: growth_rate(inputs.investment_return_rate),
    }
}

/// Growth below -100% would flip the sign of a compounding factor.
fn growth_rate(value: f64) -> f64 {
    finite_or_zero(value).max(-100.0)
}

fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() { value } else { 0.0 }
}

fn purchase_terms(inputs: &CalculatorInputs) -> PurchaseTerms {
    let down_payment = down_payment_amount(inputs);
    // Not clamped: a down payment above the price yields a negative loan.
    let loan_amount = inputs.home_price - down_payment;
    let closing_costs = inputs.home_price * inputs.closing_costs / 100.0;
    let monthly_mortgage_payment = monthly_mortgage_payment(
        loan_amount,
        inputs.mortgage_interest_rate,
        MORTGAGE_TERM_YEARS,
    );
    let monthly_maintenance = inputs.home_price * inputs.annual_maintenance_costs / 100.0 / 12.0;
    let monthly_ownership = inputs.home_price * inputs.annual_ownership_costs / 100.0 / 12.0;

    PurchaseTerms {
        down_payment,
        loan_amount,
        closing_costs,
        monthly_mortgage_payment,
        owner_monthly_payment: monthly_mortgage_payment + monthly_maintenance + monthly_ownership,
    }
}

fn initial_year(
    inputs: &CalculatorInputs,
    terms: &PurchaseTerms,
    renter: RenterLedger,
) -> YearlyDataPoint {
    // At t=0 the closing costs still count toward the owner's position; the
    // renter holds the same cash as seed savings.
    YearlyDataPoint {
        year: 0,
        property_value: inputs.home_price,
        homeowner_equity: terms.down_payment + terms.closing_costs,
        down_payment_investment: renter.down_payment_investment,
        accumulated_savings: renter.accumulated_savings,
        total_renter_investment: renter.total(),
        monthly_rent: inputs.monthly_rent,
        owner_monthly_payment: terms.owner_monthly_payment,
        monthly_difference: terms.owner_monthly_payment - inputs.monthly_rent,
    }
}

fn advance_renter_ledger(
    inputs: &CalculatorInputs,
    terms: &PurchaseTerms,
    previous: RenterLedger,
    year: u32,
) -> RenterLedger {
    let growth = 1.0 + inputs.investment_return_rate / 100.0;
    let average_rent = (rent_at(inputs, year - 1) + rent_at(inputs, year)) / 2.0;
    let monthly_saving = (terms.owner_monthly_payment - average_rent).max(0.0);

    RenterLedger {
        down_payment_investment: terms.down_payment * growth.powi(year as i32),
        accumulated_savings: previous.accumulated_savings * growth + monthly_saving * 12.0,
    }
}

fn project_year(
    inputs: &CalculatorInputs,
    terms: &PurchaseTerms,
    renter: RenterLedger,
    year: u32,
) -> YearlyDataPoint {
    let property_value =
        inputs.home_price * (1.0 + inputs.home_appreciation_rate / 100.0).powi(year as i32);
    let balance = remaining_loan_balance(
        terms.loan_amount,
        inputs.mortgage_interest_rate,
        year.saturating_mul(12),
    );
    let monthly_rent = rent_at(inputs, year);

    YearlyDataPoint {
        year,
        property_value,
        homeowner_equity: (property_value - balance - terms.closing_costs).max(0.0),
        down_payment_investment: renter.down_payment_investment,
        accumulated_savings: renter.accumulated_savings,
        total_renter_investment: renter.total(),
        monthly_rent,
        owner_monthly_payment: terms.owner_monthly_payment,
        monthly_difference: terms.owner_monthly_payment - monthly_rent,
    }
}

/// Equity used for the headline recommendation: selling friction and the
/// sunk closing costs come off the final property value. The yearly table
/// never applies the selling cost.
fn decision_equity(final_property_value: f64, closing_costs: f64) -> f64 {
    (final_property_value - final_property_value * SELLING_COST_RATE - closing_costs).max(0.0)
}
