use std::fmt::Write as _;

use crate::core::{BreakevenSolveResult, CalculationResult, CalculatorInputs, Recommendation};

pub fn format_currency(amount: f64) -> String {
    if !amount.is_finite() {
        return "-".to_string();
    }
    let rounded = amount.round() as i64;
    let digits = rounded.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if rounded < 0 {
        grouped.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}

pub fn format_percent(value: f64) -> String {
    format!("{value:.1}%")
}

pub fn render_calculation(inputs: &CalculatorInputs, result: &CalculationResult) -> String {
    let mut out = String::new();
    let rows = [
        (
            "Monthly mortgage payment",
            format_currency(result.monthly_mortgage_payment),
        ),
        (
            "Owner monthly cost",
            format_currency(result.owner_monthly_payment),
        ),
        (
            "Final property value",
            format_currency(result.final_property_value),
        ),
        (
            "Invested down payment",
            format_currency(result.final_down_payment_investment),
        ),
        (
            "Invested savings",
            format_currency(result.final_accumulated_savings),
        ),
        (
            "Renter total",
            format_currency(result.total_renter_investment),
        ),
    ];
    for (label, value) in rows {
        let _ = writeln!(out, "{label:<26}{value:>14}");
    }
    let _ = writeln!(
        out,
        "{:<26}{:>14}",
        "Growth (home/rent/invest)",
        format!(
            "{} / {} / {}",
            format_percent(inputs.home_appreciation_rate),
            format_percent(inputs.rent_increase_rate),
            format_percent(inputs.investment_return_rate)
        )
    );
    let _ = writeln!(
        out,
        "{:<26}{:>14}",
        "Recommendation",
        format!(
            "{} by {}",
            result.recommendation,
            format_currency(result.difference)
        )
    );
    out.push('\n');

    let _ = writeln!(
        out,
        "{:>4} {:>13} {:>13} {:>13} {:>9} {:>10} {:>9}",
        "Year", "Property", "Equity", "Renter Total", "Rent", "Owner Pay", "Diff"
    );
    for point in &result.yearly_data {
        let _ = writeln!(
            out,
            "{:>4} {:>13} {:>13} {:>13} {:>9} {:>10} {:>9}",
            point.year,
            format_currency(point.property_value),
            format_currency(point.homeowner_equity),
            format_currency(point.total_renter_investment),
            format_currency(point.monthly_rent),
            format_currency(point.owner_monthly_payment),
            format_currency(point.monthly_difference),
        );
    }
    out
}

pub fn solve_message(solve: &BreakevenSolveResult) -> String {
    let outcome = match solve.target {
        Recommendation::Buy => "buying",
        Recommendation::Rent => "renting",
    };
    match solve.solved_value {
        Some(value) => format!(
            "Setting {} to {value:.2} makes {outcome} preferable.",
            solve.field
        ),
        None => format!(
            "Could not find a value for {} that makes {outcome} preferable with current inputs.",
            solve.field
        ),
    }
}

pub fn render_solve(
    solve: &BreakevenSolveResult,
    inputs_at_solution: Option<(&CalculatorInputs, &CalculationResult)>,
) -> String {
    let mut out = solve_message(solve);
    out.push('\n');
    let _ = writeln!(
        out,
        "Searched {} in [{}, {}] over {} steps{}",
        solve.field,
        solve.search_min,
        solve.search_max,
        solve.iterations.len(),
        if solve.converged { "" } else { " (iteration cap reached)" }
    );
    if let Some((inputs, result)) = inputs_at_solution {
        out.push('\n');
        out.push_str(&render_calculation(inputs, result));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{InputField, project, solve_with_trace};

    #[test]
    fn currency_rounds_and_groups_thousands() {
        assert_eq!(format_currency(0.0), "0");
        assert_eq!(format_currency(999.4), "999");
        assert_eq!(format_currency(1_000.0), "1,000");
        assert_eq!(format_currency(1_234_567.6), "1,234,568");
        assert_eq!(format_currency(-1_234.4), "-1,234");
        assert_eq!(format_currency(f64::NAN), "-");
    }

    #[test]
    fn percent_uses_one_decimal() {
        assert_eq!(format_percent(6.5), "6.5%");
        assert_eq!(format_percent(3.0), "3.0%");
        assert_eq!(format_percent(-1.26), "-1.3%");
    }

    #[test]
    fn calculation_table_has_one_row_per_year() {
        let inputs = CalculatorInputs::default();
        let result = project(&inputs);
        let rendered = render_calculation(&inputs, &result);

        assert!(rendered.contains("Recommendation"));
        assert!(rendered.contains("Buy by 253,264"));
        let year_rows = rendered
            .lines()
            .skip_while(|line| !line.trim_start().starts_with("Year"))
            .skip(1)
            .count();
        assert_eq!(year_rows, result.yearly_data.len());
    }

    #[test]
    fn not_found_message_names_field_and_target() {
        let inputs = CalculatorInputs::default();
        let solve = solve_with_trace(&inputs, InputField::RentIncreaseRate, Recommendation::Rent)
            .expect("rent increase is solvable");
        assert_eq!(
            solve_message(&solve),
            "Could not find a value for rentIncreaseRate that makes renting preferable with current inputs."
        );
    }
}
