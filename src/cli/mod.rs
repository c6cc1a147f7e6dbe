mod report;

use std::fs;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::{
    CalculationResult, CalculatorInputs, DownPaymentType, InputField, Recommendation, SolveError,
    project, solve_with_trace,
};

pub use report::{format_currency, format_percent, render_calculation, render_solve, solve_message};

#[derive(Debug, Error)]
pub enum CliError {
    #[error("failed to read scenario file {}: {}", .path.display(), .source)]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid scenario JSON in {}: {}", .path.display(), .source)]
    Scenario {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("{0}")]
    InvalidInput(String),
    #[error(transparent)]
    Solve(#[from] SolveError),
    #[error("failed to encode output: {0}")]
    Encode(#[from] serde_json::Error),
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum CliDownPaymentType {
    Percentage,
    Amount,
}

impl From<CliDownPaymentType> for DownPaymentType {
    fn from(value: CliDownPaymentType) -> Self {
        match value {
            CliDownPaymentType::Percentage => DownPaymentType::Percentage,
            CliDownPaymentType::Amount => DownPaymentType::Amount,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum CliTarget {
    Buy,
    Rent,
}

impl From<CliTarget> for Recommendation {
    fn from(value: CliTarget) -> Self {
        match value {
            CliTarget::Buy => Recommendation::Buy,
            CliTarget::Rent => Recommendation::Rent,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
}

#[derive(Parser, Debug)]
#[command(
    name = "buyrent",
    about = "Buy versus rent projection: homeowner equity against an invested renter"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Project owner equity and renter investment year by year.
    Calculate {
        #[command(flatten)]
        inputs: InputArgs,
        #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
        format: OutputFormat,
    },
    /// Find the value of one input at which the recommendation becomes the target.
    Solve {
        #[arg(long, help = "Input to vary, e.g. mortgage-interest-rate or monthlyRent")]
        variable: InputField,
        #[arg(long, value_enum)]
        target: CliTarget,
        #[command(flatten)]
        inputs: InputArgs,
        #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
        format: OutputFormat,
    },
}

#[derive(Args, Debug, Clone)]
struct InputArgs {
    #[arg(
        long = "inputs",
        value_name = "PATH",
        help = "JSON scenario with camelCase keys; every key is optional"
    )]
    scenario_file: Option<PathBuf>,
    #[arg(long)]
    home_price: Option<f64>,
    #[arg(long, value_enum)]
    down_payment_type: Option<CliDownPaymentType>,
    #[arg(long, help = "Down payment in percent of home price")]
    down_payment_percentage: Option<f64>,
    #[arg(long, help = "Down payment as a cash amount, used with --down-payment-type=amount")]
    down_payment_amount: Option<f64>,
    #[arg(long, help = "Annual mortgage rate in percent, e.g. 6.5")]
    mortgage_interest_rate: Option<f64>,
    #[arg(long, help = "Years to project")]
    time_horizon: Option<u32>,
    #[arg(long, help = "Closing costs in percent of home price")]
    closing_costs: Option<f64>,
    #[arg(long, help = "Annual maintenance in percent of home price")]
    annual_maintenance_costs: Option<f64>,
    #[arg(long, help = "Annual taxes and insurance in percent of home price")]
    annual_ownership_costs: Option<f64>,
    #[arg(long)]
    monthly_rent: Option<f64>,
    #[arg(long, allow_hyphen_values = true, help = "Annual home appreciation in percent")]
    home_appreciation_rate: Option<f64>,
    #[arg(long, allow_hyphen_values = true, help = "Annual rent increase in percent")]
    rent_increase_rate: Option<f64>,
    #[arg(long, allow_hyphen_values = true, help = "Annual investment return in percent")]
    investment_return_rate: Option<f64>,
}

/// A numeric scenario value as stored by form-driven clients: either a JSON
/// number or the raw text of an input box.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
enum FieldValue {
    Number(f64),
    Text(String),
}

impl FieldValue {
    fn to_f64(&self) -> f64 {
        match self {
            FieldValue::Number(v) => *v,
            FieldValue::Text(text) => text.trim().parse::<f64>().unwrap_or(0.0),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct ScenarioPayload {
    home_price: Option<FieldValue>,
    down_payment_type: Option<DownPaymentType>,
    down_payment_percentage: Option<FieldValue>,
    down_payment_amount: Option<FieldValue>,
    mortgage_interest_rate: Option<FieldValue>,
    time_horizon: Option<FieldValue>,
    closing_costs: Option<FieldValue>,
    annual_maintenance_costs: Option<FieldValue>,
    annual_ownership_costs: Option<FieldValue>,
    monthly_rent: Option<FieldValue>,
    home_appreciation_rate: Option<FieldValue>,
    rent_increase_rate: Option<FieldValue>,
    investment_return_rate: Option<FieldValue>,
}

impl ScenarioPayload {
    fn numeric_fields(&self) -> [(InputField, Option<&FieldValue>); 12] {
        [
            (InputField::HomePrice, self.home_price.as_ref()),
            (
                InputField::DownPaymentPercentage,
                self.down_payment_percentage.as_ref(),
            ),
            (
                InputField::DownPaymentAmount,
                self.down_payment_amount.as_ref(),
            ),
            (
                InputField::MortgageInterestRate,
                self.mortgage_interest_rate.as_ref(),
            ),
            (InputField::TimeHorizon, self.time_horizon.as_ref()),
            (InputField::ClosingCosts, self.closing_costs.as_ref()),
            (
                InputField::AnnualMaintenanceCosts,
                self.annual_maintenance_costs.as_ref(),
            ),
            (
                InputField::AnnualOwnershipCosts,
                self.annual_ownership_costs.as_ref(),
            ),
            (InputField::MonthlyRent, self.monthly_rent.as_ref()),
            (
                InputField::HomeAppreciationRate,
                self.home_appreciation_rate.as_ref(),
            ),
            (InputField::RentIncreaseRate, self.rent_increase_rate.as_ref()),
            (
                InputField::InvestmentReturnRate,
                self.investment_return_rate.as_ref(),
            ),
        ]
    }

    fn apply_to(&self, base: CalculatorInputs) -> CalculatorInputs {
        let mut inputs = base;
        if let Some(v) = self.down_payment_type {
            inputs.down_payment_type = v;
        }
        for (field, value) in self.numeric_fields() {
            if let Some(value) = value {
                inputs = field.with_value(&inputs, value.to_f64());
            }
        }
        inputs
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SolveResponse {
    variable: InputField,
    target: Recommendation,
    solved_value: Option<f64>,
    display_value: Option<String>,
    search_max: f64,
    converged: bool,
    iterations: usize,
    message: String,
    result: Option<CalculationResult>,
}

pub fn run(cli: Cli) -> Result<String, CliError> {
    match cli.command {
        Command::Calculate { inputs, format } => {
            let inputs = resolve_inputs(&inputs)?;
            tracing::info!(time_horizon = inputs.time_horizon, "running projection");
            let result = project(&inputs);
            match format {
                OutputFormat::Json => Ok(serde_json::to_string_pretty(&result)?),
                OutputFormat::Table => Ok(render_calculation(&inputs, &result)),
            }
        }
        Command::Solve {
            variable,
            target,
            inputs,
            format,
        } => {
            let inputs = resolve_inputs(&inputs)?;
            let target = Recommendation::from(target);
            tracing::info!(%variable, %target, "solving for breakeven");
            let solve = solve_with_trace(&inputs, variable, target)?;
            let solved_inputs = solve
                .solved_value
                .map(|value| variable.with_value(&inputs, value));
            let solved_result = solved_inputs.as_ref().map(project);

            match format {
                OutputFormat::Json => {
                    let response = SolveResponse {
                        variable,
                        target,
                        solved_value: solve.solved_value,
                        display_value: solve.solved_value.map(|v| format!("{v:.2}")),
                        search_max: solve.search_max,
                        converged: solve.converged,
                        iterations: solve.iterations.len(),
                        message: solve_message(&solve),
                        result: solved_result,
                    };
                    Ok(serde_json::to_string_pretty(&response)?)
                }
                OutputFormat::Table => Ok(render_solve(
                    &solve,
                    solved_inputs.as_ref().zip(solved_result.as_ref()),
                )),
            }
        }
    }
}

fn resolve_inputs(args: &InputArgs) -> Result<CalculatorInputs, CliError> {
    let mut inputs = CalculatorInputs::default();
    if let Some(path) = &args.scenario_file {
        let raw = fs::read_to_string(path).map_err(|source| CliError::Io {
            path: path.clone(),
            source,
        })?;
        let payload = scenario_from_json(&raw).map_err(|source| CliError::Scenario {
            path: path.clone(),
            source,
        })?;
        inputs = payload.apply_to(inputs);
    }

    if let Some(v) = args.home_price {
        inputs.home_price = v;
    }
    if let Some(v) = args.down_payment_type {
        inputs.down_payment_type = v.into();
    }
    if let Some(v) = args.down_payment_percentage {
        inputs.down_payment_percentage = v;
    }
    if let Some(v) = args.down_payment_amount {
        inputs.down_payment_amount = v;
    }
    if let Some(v) = args.mortgage_interest_rate {
        inputs.mortgage_interest_rate = v;
    }
    if let Some(v) = args.time_horizon {
        inputs.time_horizon = v;
    }
    if let Some(v) = args.closing_costs {
        inputs.closing_costs = v;
    }
    if let Some(v) = args.annual_maintenance_costs {
        inputs.annual_maintenance_costs = v;
    }
    if let Some(v) = args.annual_ownership_costs {
        inputs.annual_ownership_costs = v;
    }
    if let Some(v) = args.monthly_rent {
        inputs.monthly_rent = v;
    }
    if let Some(v) = args.home_appreciation_rate {
        inputs.home_appreciation_rate = v;
    }
    if let Some(v) = args.rent_increase_rate {
        inputs.rent_increase_rate = v;
    }
    if let Some(v) = args.investment_return_rate {
        inputs.investment_return_rate = v;
    }

    build_inputs(inputs).map_err(CliError::InvalidInput)
}

fn scenario_from_json(json: &str) -> Result<ScenarioPayload, serde_json::Error> {
    serde_json::from_str::<ScenarioPayload>(json)
}

fn build_inputs(inputs: CalculatorInputs) -> Result<CalculatorInputs, String> {
    for field in InputField::ALL {
        if !field.value(&inputs).is_finite() {
            return Err(format!("{field} must be a finite number"));
        }
    }

    if inputs.home_price <= 0.0 {
        return Err("homePrice must be > 0".to_string());
    }

    // Only the field selected by downPaymentType reaches the engine. An amount
    // above the price is a negative loan, not an error.
    match inputs.down_payment_type {
        DownPaymentType::Percentage => {
            if !(0.0..=100.0).contains(&inputs.down_payment_percentage) {
                return Err("downPaymentPercentage must be between 0 and 100".to_string());
            }
        }
        DownPaymentType::Amount => {
            if inputs.down_payment_amount < 0.0 {
                return Err("downPaymentAmount must be >= 0".to_string());
            }
        }
    }

    if !(1..=100).contains(&inputs.time_horizon) {
        return Err("timeHorizon must be between 1 and 100".to_string());
    }

    for field in [
        InputField::MortgageInterestRate,
        InputField::ClosingCosts,
        InputField::AnnualMaintenanceCosts,
        InputField::AnnualOwnershipCosts,
        InputField::MonthlyRent,
    ] {
        if field.value(&inputs) < 0.0 {
            return Err(format!("{field} must be >= 0"));
        }
    }

    for field in [
        InputField::HomeAppreciationRate,
        InputField::RentIncreaseRate,
        InputField::InvestmentReturnRate,
    ] {
        if field.value(&inputs) <= -100.0 {
            return Err(format!("{field} must be > -100"));
        }
    }

    Ok(inputs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write as _;

    const EPS: f64 = 1e-6;

    fn assert_approx(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() <= EPS,
            "expected {expected}, got {actual}"
        );
    }

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("buyrent").chain(args.iter().copied()))
            .expect("valid command line")
    }

    fn write_scenario(name: &str, json: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("buyrent-{}-{name}.json", std::process::id()));
        let mut file = fs::File::create(&path).expect("create scenario file");
        file.write_all(json.as_bytes()).expect("write scenario file");
        path
    }

    #[test]
    fn build_inputs_accepts_defaults() {
        let inputs = build_inputs(CalculatorInputs::default()).expect("defaults are valid");
        assert_eq!(inputs, CalculatorInputs::default());
    }

    #[test]
    fn build_inputs_rejects_non_positive_home_price() {
        let inputs = CalculatorInputs {
            home_price: 0.0,
            ..CalculatorInputs::default()
        };
        let err = build_inputs(inputs).expect_err("must reject zero price");
        assert!(err.contains("homePrice"));
    }

    #[test]
    fn build_inputs_rejects_out_of_range_down_payment() {
        let inputs = CalculatorInputs {
            down_payment_percentage: 120.0,
            ..CalculatorInputs::default()
        };
        let err = build_inputs(inputs).expect_err("must reject >100%");
        assert!(err.contains("downPaymentPercentage"));

        let inputs = CalculatorInputs {
            down_payment_type: DownPaymentType::Amount,
            down_payment_amount: -1.0,
            ..CalculatorInputs::default()
        };
        let err = build_inputs(inputs).expect_err("must reject negative amount");
        assert!(err.contains("downPaymentAmount"));
    }

    #[test]
    fn build_inputs_checks_only_the_selected_down_payment_field() {
        let inputs = CalculatorInputs {
            down_payment_type: DownPaymentType::Amount,
            down_payment_percentage: 120.0,
            down_payment_amount: 500_000.0,
            ..CalculatorInputs::default()
        };
        build_inputs(inputs).expect("amount above price is a negative loan");

        let inputs = CalculatorInputs {
            down_payment_type: DownPaymentType::Percentage,
            down_payment_amount: -5.0,
            ..CalculatorInputs::default()
        };
        build_inputs(inputs).expect("amount is ignored for percentage inputs");
    }

    #[test]
    fn build_inputs_rejects_zero_horizon_and_negative_costs() {
        let inputs = CalculatorInputs {
            time_horizon: 0,
            ..CalculatorInputs::default()
        };
        assert!(build_inputs(inputs).expect_err("zero horizon").contains("timeHorizon"));

        let inputs = CalculatorInputs {
            annual_ownership_costs: -1.0,
            ..CalculatorInputs::default()
        };
        assert!(
            build_inputs(inputs)
                .expect_err("negative cost")
                .contains("annualOwnershipCosts")
        );
    }

    #[test]
    fn build_inputs_allows_negative_growth_rates_above_minus_100() {
        let inputs = CalculatorInputs {
            home_appreciation_rate: -4.0,
            rent_increase_rate: -1.0,
            ..CalculatorInputs::default()
        };
        assert!(build_inputs(inputs).is_ok());

        let inputs = CalculatorInputs {
            investment_return_rate: -100.0,
            ..CalculatorInputs::default()
        };
        assert!(
            build_inputs(inputs)
                .expect_err("total loss rate")
                .contains("investmentReturnRate")
        );
    }

    #[test]
    fn build_inputs_rejects_non_finite_values() {
        let inputs = CalculatorInputs {
            monthly_rent: f64::NAN,
            ..CalculatorInputs::default()
        };
        let err = build_inputs(inputs).expect_err("must reject NaN");
        assert_eq!(err, "monthlyRent must be a finite number");
    }

    #[test]
    fn scenario_payload_merges_numbers_and_form_text_over_defaults() {
        let payload = scenario_from_json(
            r#"{
                "homePrice": "550000",
                "downPaymentType": "amount",
                "downPaymentAmount": 110000,
                "mortgageInterestRate": " 7.1 ",
                "monthlyRent": "",
                "timeHorizon": "12.7"
            }"#,
        )
        .expect("valid scenario json");
        let inputs = payload.apply_to(CalculatorInputs::default());

        assert_approx(inputs.home_price, 550_000.0);
        assert_eq!(inputs.down_payment_type, DownPaymentType::Amount);
        assert_approx(inputs.down_payment_amount, 110_000.0);
        assert_approx(inputs.mortgage_interest_rate, 7.1);
        assert_approx(inputs.monthly_rent, 0.0);
        assert_eq!(inputs.time_horizon, 12);
        assert_approx(inputs.investment_return_rate, 7.0);
    }

    #[test]
    fn scenario_payload_rejects_unknown_down_payment_type() {
        let err = scenario_from_json(r#"{"downPaymentType": "loan"}"#)
            .expect_err("unknown enum value");
        assert!(err.to_string().contains("loan"));
    }

    #[test]
    fn command_line_overrides_take_precedence_over_scenario_file() {
        let path = write_scenario(
            "overrides",
            r#"{"homePrice": 300000, "monthlyRent": 1900, "timeHorizon": 20}"#,
        );
        let path_arg = path.to_string_lossy().into_owned();
        let cli = parse(&[
            "calculate",
            "--inputs",
            &path_arg,
            "--monthly-rent",
            "2100",
            "--home-appreciation-rate",
            "-1.5",
        ]);
        let Command::Calculate { inputs, .. } = cli.command else {
            panic!("expected calculate command");
        };
        let resolved = resolve_inputs(&inputs).expect("valid inputs");
        let _ = fs::remove_file(&path);

        assert_approx(resolved.home_price, 300_000.0);
        assert_approx(resolved.monthly_rent, 2_100.0);
        assert_eq!(resolved.time_horizon, 20);
        assert_approx(resolved.home_appreciation_rate, -1.5);
    }

    #[test]
    fn missing_scenario_file_reports_path() {
        let cli = parse(&["calculate", "--inputs", "/nonexistent/buyrent-scenario.json"]);
        let err = run(cli).expect_err("file does not exist");
        assert!(matches!(err, CliError::Io { .. }));
        assert!(err.to_string().contains("buyrent-scenario.json"));
    }

    #[test]
    fn calculate_json_output_contains_expected_fields() {
        let output = run(parse(&["calculate"])).expect("calculate succeeds");
        let value: serde_json::Value = serde_json::from_str(&output).expect("valid json output");

        for key in [
            "monthlyMortgagePayment",
            "ownerMonthlyPayment",
            "finalPropertyValue",
            "finalDownPaymentInvestment",
            "finalAccumulatedSavings",
            "totalRenterInvestment",
            "recommendation",
            "difference",
            "yearlyData",
        ] {
            assert!(value.get(key).is_some(), "missing key {key}");
        }
        assert_eq!(value["recommendation"], "Buy");
        let years = value["yearlyData"].as_array().expect("yearly array");
        assert_eq!(years.len(), 11);
        assert_eq!(years[3]["year"], 3);
        assert!(years[0].get("monthlyDifference").is_some());
    }

    #[test]
    fn calculate_table_output_renders_summary() {
        let output = run(parse(&["calculate", "--format", "table", "--time-horizon", "3"]))
            .expect("calculate succeeds");
        assert!(output.contains("Monthly mortgage payment"));
        assert!(output.contains("Renter Total"));
    }

    #[test]
    fn calculate_accepts_home_cheaper_than_default_down_payment_amount() {
        let output = run(parse(&[
            "calculate",
            "--home-price",
            "60000",
            "--monthly-rent",
            "500",
        ]))
        .expect("percentage down payment ignores the amount field");
        let value: serde_json::Value = serde_json::from_str(&output).expect("valid json output");
        assert_eq!(value["yearlyData"][0]["propertyValue"], 60_000.0);
    }

    #[test]
    fn invalid_override_is_reported_as_input_error() {
        let err = run(parse(&["calculate", "--home-price", "0"])).expect_err("invalid price");
        assert!(matches!(err, CliError::InvalidInput(_)));
    }

    #[test]
    fn solve_json_output_reports_breakeven_and_result() {
        let output = run(parse(&[
            "solve",
            "--variable",
            "mortgage-interest-rate",
            "--target",
            "rent",
        ]))
        .expect("solve succeeds");
        let value: serde_json::Value = serde_json::from_str(&output).expect("valid json output");

        assert_eq!(value["variable"], "mortgageInterestRate");
        assert_eq!(value["target"], "Rent");
        assert_eq!(value["displayValue"], "13.04");
        let solved = value["solvedValue"].as_f64().expect("solved value");
        assert!(solved > 6.5);
        assert_eq!(value["result"]["recommendation"], "Rent");
        assert_eq!(value["converged"], true);
    }

    #[test]
    fn solve_not_found_is_informational() {
        let output = run(parse(&[
            "solve",
            "--variable",
            "homeAppreciationRate",
            "--target",
            "rent",
        ]))
        .expect("not found is not an error");
        let value: serde_json::Value = serde_json::from_str(&output).expect("valid json output");

        assert!(value["solvedValue"].is_null());
        assert!(value["result"].is_null());
        assert_eq!(
            value["message"],
            "Could not find a value for homeAppreciationRate that makes renting preferable with current inputs."
        );
    }

    #[test]
    fn solve_rejects_field_without_direction() {
        let err = run(parse(&[
            "solve",
            "--variable",
            "down_payment_amount",
            "--target",
            "buy",
        ]))
        .expect_err("amount has no direction");
        assert!(matches!(
            err,
            CliError::Solve(SolveError::UnsupportedField(InputField::DownPaymentAmount))
        ));
    }

    #[test]
    fn unknown_solve_variable_fails_to_parse() {
        let parsed = Cli::try_parse_from(["buyrent", "solve", "--variable", "loanTerm", "--target", "buy"]);
        assert!(parsed.is_err());
    }
}
