use axum::{
    Router,
    extract::{Json, Query},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use tokio::net::TcpListener;

use crate::core::{InflationScenario, PlanReport, ProjectionInput, recompute};

const MIN_AGE: u32 = 18;
const MAX_AGE: u32 = 120;
const MIN_CUSTOM_INFLATION: f64 = -20.0;
const MAX_CUSTOM_INFLATION: f64 = 50.0;

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum CliInflationScenario {
    Low,
    Moderate,
    High,
    Custom,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
enum ApiInflationScenario {
    #[serde(alias = "optimistic")]
    Low,
    #[serde(alias = "base")]
    Moderate,
    #[serde(alias = "conservative")]
    High,
    Custom,
}

impl From<ApiInflationScenario> for CliInflationScenario {
    fn from(value: ApiInflationScenario) -> Self {
        match value {
            ApiInflationScenario::Low => CliInflationScenario::Low,
            ApiInflationScenario::Moderate => CliInflationScenario::Moderate,
            ApiInflationScenario::High => CliInflationScenario::High,
            ApiInflationScenario::Custom => CliInflationScenario::Custom,
        }
    }
}

impl From<CliInflationScenario> for ApiInflationScenario {
    fn from(value: CliInflationScenario) -> Self {
        match value {
            CliInflationScenario::Low => ApiInflationScenario::Low,
            CliInflationScenario::Moderate => ApiInflationScenario::Moderate,
            CliInflationScenario::High => ApiInflationScenario::High,
            CliInflationScenario::Custom => ApiInflationScenario::Custom,
        }
    }
}

fn resolve_inflation(scenario: CliInflationScenario, custom_rate: f64) -> InflationScenario {
    match scenario {
        CliInflationScenario::Low => InflationScenario::Low,
        CliInflationScenario::Moderate => InflationScenario::Moderate,
        CliInflationScenario::High => InflationScenario::High,
        CliInflationScenario::Custom => InflationScenario::Custom(custom_rate),
    }
}

#[derive(Parser, Debug)]
#[command(
    name = "retire",
    about = "Retirement savings projector: required portfolio, savings gap and drawdown longevity"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve the JSON planning API over HTTP
    Serve {
        #[arg(long, default_value_t = 8080)]
        port: u16,
    },
    /// Evaluate one plan and print the report as JSON
    Plan(PlanArgs),
}

#[derive(Args, Debug, Clone)]
struct PlanArgs {
    #[arg(long, default_value_t = 29)]
    current_age: u32,
    #[arg(long, default_value_t = 50)]
    retirement_age: u32,
    #[arg(long, default_value_t = 90)]
    life_expectancy: u32,
    #[arg(
        long,
        default_value_t = 100_000.0,
        help = "After-tax annual income needed, in today's money"
    )]
    desired_income: f64,
    #[arg(long, value_enum, default_value_t = CliInflationScenario::Moderate)]
    inflation_scenario: CliInflationScenario,
    #[arg(
        long,
        default_value_t = 2.7,
        help = "Inflation rate in percent, used when --inflation-scenario=custom"
    )]
    custom_inflation: f64,
    #[arg(
        long,
        default_value_t = 9.6,
        help = "Expected annual return before retirement in percent"
    )]
    expected_return: f64,
    #[arg(
        long,
        default_value_t = 5.0,
        help = "Expected annual return during retirement in percent"
    )]
    return_during_retirement: f64,
    #[arg(long, default_value_t = 50_000.0)]
    initial_investment: f64,
    #[arg(long, default_value_t = 10_000.0)]
    annual_contribution: f64,
    #[arg(long, default_value_t = 22.0, help = "Flat income tax rate in percent")]
    tax_rate: f64,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct PlanPayload {
    current_age: Option<u32>,
    retirement_age: Option<u32>,
    life_expectancy: Option<u32>,
    desired_income: Option<f64>,
    inflation_scenario: Option<ApiInflationScenario>,
    custom_inflation: Option<f64>,
    expected_return: Option<f64>,
    return_during_retirement: Option<f64>,
    initial_investment: Option<f64>,
    annual_contribution: Option<f64>,
    tax_rate: Option<f64>,
}

#[derive(Debug)]
struct ApiRequest {
    inputs: ProjectionInput,
    scenario: CliInflationScenario,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PlanResponse {
    inflation_scenario: ApiInflationScenario,
    inflation_rate: f64,
    #[serde(flatten)]
    report: PlanReport,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

pub async fn run(cli: Cli) -> Result<(), String> {
    match cli.command {
        Command::Serve { port } => run_http_server(port)
            .await
            .map_err(|e| format!("Server error: {e}")),
        Command::Plan(args) => {
            let scenario = args.inflation_scenario;
            let inputs = build_inputs(args)?;
            let report = recompute(&inputs).map_err(|e| e.to_string())?;
            let response = build_plan_response(scenario, &inputs, report);
            let json = serde_json::to_string_pretty(&response)
                .map_err(|e| format!("Failed to encode report: {e}"))?;
            println!("{json}");
            Ok(())
        }
    }
}

fn build_inputs(args: PlanArgs) -> Result<ProjectionInput, String> {
    for (name, age) in [
        ("--current-age", args.current_age),
        ("--retirement-age", args.retirement_age),
        ("--life-expectancy", args.life_expectancy),
    ] {
        if !(MIN_AGE..=MAX_AGE).contains(&age) {
            return Err(format!("{name} must be between {MIN_AGE} and {MAX_AGE}"));
        }
    }

    if args.retirement_age <= args.current_age {
        return Err("--retirement-age must be after --current-age".to_string());
    }

    if args.life_expectancy <= args.retirement_age {
        return Err("--life-expectancy must be after --retirement-age".to_string());
    }

    if args.inflation_scenario == CliInflationScenario::Custom
        && !(MIN_CUSTOM_INFLATION..=MAX_CUSTOM_INFLATION).contains(&args.custom_inflation)
    {
        return Err(format!(
            "--custom-inflation must be between {MIN_CUSTOM_INFLATION} and {MAX_CUSTOM_INFLATION}"
        ));
    }

    if !(0.0..100.0).contains(&args.tax_rate) {
        return Err("--tax-rate must be >= 0 and < 100".to_string());
    }

    for (name, amount) in [
        ("--desired-income", args.desired_income),
        ("--initial-investment", args.initial_investment),
        ("--annual-contribution", args.annual_contribution),
    ] {
        if !amount.is_finite() || amount < 0.0 {
            return Err(format!("{name} must be >= 0"));
        }
    }

    for (name, rate) in [
        ("--expected-return", args.expected_return),
        ("--return-during-retirement", args.return_during_retirement),
    ] {
        if !rate.is_finite() || rate <= -100.0 {
            return Err(format!("{name} must be > -100"));
        }
    }

    let inputs = ProjectionInput {
        current_age: args.current_age,
        retirement_age: args.retirement_age,
        life_expectancy: args.life_expectancy,
        desired_annual_income: args.desired_income,
        tax_rate: args.tax_rate,
        inflation_rate: resolve_inflation(args.inflation_scenario, args.custom_inflation).rate(),
        pre_retirement_return: args.expected_return,
        post_retirement_return: args.return_during_retirement,
        initial_investment: args.initial_investment,
        annual_contribution: args.annual_contribution,
    };
    inputs.validate().map_err(|e| e.to_string())?;
    Ok(inputs)
}

pub async fn run_http_server(port: u16) -> std::io::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let app = Router::new()
        .route("/api/plan", get(plan_get_handler).post(plan_post_handler))
        .fallback(not_found_handler);

    let listener = TcpListener::bind(addr).await?;
    log::info!("retirement planning API listening on http://{addr}");
    log::info!("local access: http://127.0.0.1:{port}/api/plan");

    axum::serve(listener, app).await
}

async fn not_found_handler() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found")
}

async fn plan_get_handler(Query(payload): Query<PlanPayload>) -> Response {
    plan_handler_impl(payload).await
}

async fn plan_post_handler(Json(payload): Json<PlanPayload>) -> Response {
    plan_handler_impl(payload).await
}

async fn plan_handler_impl(payload: PlanPayload) -> Response {
    let request = match api_request_from_payload(payload) {
        Ok(request) => request,
        Err(msg) => return error_response(StatusCode::BAD_REQUEST, &msg),
    };

    match recompute(&request.inputs) {
        Ok(report) => json_response(
            StatusCode::OK,
            build_plan_response(request.scenario, &request.inputs, report),
        ),
        Err(err) => {
            log::warn!("rejected plan inputs: {err}");
            error_response(StatusCode::BAD_REQUEST, &err.to_string())
        }
    }
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    let mut response = (status, Json(body)).into_response();
    response.headers_mut().insert(
        header::CACHE_CONTROL,
        header::HeaderValue::from_static("no-store"),
    );
    response
}

fn error_response(status: StatusCode, msg: &str) -> Response {
    json_response(
        status,
        ErrorResponse {
            error: msg.to_string(),
        },
    )
}

#[cfg(test)]
fn api_request_from_json(json: &str) -> Result<ApiRequest, String> {
    let payload = serde_json::from_str::<PlanPayload>(json)
        .map_err(|e| format!("Invalid API JSON payload: {e}"))?;
    api_request_from_payload(payload)
}

fn api_request_from_payload(payload: PlanPayload) -> Result<ApiRequest, String> {
    let mut args = default_args_for_api();

    if let Some(v) = payload.current_age {
        args.current_age = v;
    }
    if let Some(v) = payload.retirement_age {
        args.retirement_age = v;
    }
    if let Some(v) = payload.life_expectancy {
        args.life_expectancy = v;
    }
    if let Some(v) = payload.desired_income {
        args.desired_income = v;
    }
    if let Some(v) = payload.inflation_scenario {
        args.inflation_scenario = v.into();
    }
    if let Some(v) = payload.custom_inflation {
        args.custom_inflation = v;
    }
    if let Some(v) = payload.expected_return {
        args.expected_return = v;
    }
    if let Some(v) = payload.return_during_retirement {
        args.return_during_retirement = v;
    }
    if let Some(v) = payload.initial_investment {
        args.initial_investment = v;
    }
    if let Some(v) = payload.annual_contribution {
        args.annual_contribution = v;
    }
    if let Some(v) = payload.tax_rate {
        args.tax_rate = v;
    }

    let scenario = args.inflation_scenario;
    let inputs = build_inputs(args)?;
    Ok(ApiRequest { inputs, scenario })
}

fn default_args_for_api() -> PlanArgs {
    PlanArgs {
        current_age: 29,
        retirement_age: 50,
        life_expectancy: 90,
        desired_income: 100_000.0,
        inflation_scenario: CliInflationScenario::Moderate,
        custom_inflation: 2.7,
        expected_return: 9.6,
        return_during_retirement: 5.0,
        initial_investment: 50_000.0,
        annual_contribution: 10_000.0,
        tax_rate: 22.0,
    }
}

fn build_plan_response(
    scenario: CliInflationScenario,
    inputs: &ProjectionInput,
    report: PlanReport,
) -> PlanResponse {
    PlanResponse {
        inflation_scenario: scenario.into(),
        inflation_rate: inputs.inflation_rate,
        report,
    }
}
