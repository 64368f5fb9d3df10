use axum::{
    Router,
    extract::{Json, Path, Query},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use clap::{Args, Parser, Subcommand};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use thiserror::Error;
use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::core::{
    GoalBook, GoalPriority, Loan, LoanKind, MonteCarloResult, NewGoal, PlanError, PlanReport,
    PlanningInputs, ProtectionAssumptions, ProtectionGap, ReadinessResult, TrajectoryPoint,
    build_plan_report, compute_protection_gap, compute_readiness, compute_trajectory,
    run_monte_carlo_seeded,
};

pub const MIN_TRIALS: u32 = 100;
pub const MAX_TRIALS: u32 = 3_000;

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Plan(#[from] PlanError),
    #[error("failed to encode report: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[derive(Parser, Debug)]
#[command(
    name = "retire",
    about = "Retirement readiness, protection gap and Monte Carlo success estimator"
)]
pub struct App {
    #[arg(long, global = true, default_value = "info", help = "Log level for stderr output")]
    pub log_level: String,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the full projection report as JSON
    Plan(PlanArgs),
    /// Serve the projection API over HTTP
    Serve {
        #[arg(long, default_value_t = 8080)]
        port: u16,
    },
}

#[derive(Args, Debug, Clone)]
struct PlanArgs {
    #[arg(long, help = "Calendar year goals are measured from; defaults to this year")]
    current_year: Option<i32>,
    #[arg(long, default_value_t = 36)]
    current_age: u32,
    #[arg(long, default_value_t = 60)]
    retirement_age: u32,
    #[arg(long, default_value_t = 90)]
    life_expectancy: u32,
    #[arg(long, default_value_t = 3.0, help = "Expected annual inflation in percent")]
    inflation_rate: f64,
    #[arg(
        long,
        default_value_t = 6.0,
        help = "Expected annual return before retirement in percent"
    )]
    pre_retirement_return: f64,
    #[arg(
        long,
        default_value_t = 3.5,
        help = "Expected annual return during retirement in percent"
    )]
    post_retirement_return: f64,
    #[arg(long, default_value_t = 70_000.0)]
    monthly_primary_income: f64,
    #[arg(long, default_value_t = 0.0)]
    monthly_secondary_income: f64,
    #[arg(long, default_value_t = 30_000.0)]
    monthly_basic_expense: f64,
    #[arg(long, default_value_t = 4_000.0)]
    monthly_health_expense: f64,
    #[arg(long, default_value_t = 8_000.0)]
    monthly_lifestyle_expense: f64,
    #[arg(long, default_value_t = 0.0)]
    current_assets: f64,
    #[arg(long, default_value_t = 0.0)]
    current_debt: f64,
    #[arg(long, default_value_t = 0.0)]
    current_monthly_savings: f64,
    #[arg(
        long,
        default_value_t = 5.0,
        help = "Share of annual income routed to a retirement account in percent"
    )]
    contribution_rate: f64,
    #[arg(long, default_value_t = 0.0)]
    mortgage_principal: f64,
    #[arg(long, default_value_t = 8.5, help = "Mortgage annual rate in percent")]
    mortgage_rate: f64,
    #[arg(long, default_value_t = 20)]
    mortgage_years: u32,
    #[arg(long, default_value_t = 0.0)]
    vehicle_principal: f64,
    #[arg(long, default_value_t = 9.0, help = "Vehicle loan annual rate in percent")]
    vehicle_rate: f64,
    #[arg(long, default_value_t = 5)]
    vehicle_years: u32,
    #[arg(
        long = "goal",
        value_parser = parse_goal,
        help = "Goal as label:amount:year[:high|medium|low]; repeatable"
    )]
    goals: Vec<NewGoal>,
    #[arg(long, default_value_t = 0.0)]
    existing_life_cover: f64,
    #[arg(long, default_value_t = 0.0)]
    existing_critical_illness_cover: f64,
    #[arg(
        long,
        default_value_t = 0.0,
        allow_hyphen_values = true,
        help = "One-time return shock in the first year in percent, e.g. -20"
    )]
    first_year_shock: f64,
    #[arg(long, default_value_t = 12.0, help = "Pre-retirement return volatility in percent")]
    pre_retirement_volatility: f64,
    #[arg(long, default_value_t = 6.0, help = "Post-retirement return volatility in percent")]
    post_retirement_volatility: f64,
    #[arg(long, default_value_t = 1_000, help = "Monte Carlo trials, clamped to 100..=3000")]
    trials: u32,
    #[arg(long, default_value_t = 42)]
    seed: u64,
    #[arg(
        long,
        default_value_t = 40_000.0,
        help = "Monthly expense above which dependent children are assumed"
    )]
    children_expense_threshold: f64,
    #[arg(long, default_value_t = 2_000_000.0)]
    education_reserve: f64,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case")]
enum Projection {
    Plan,
    Readiness,
    Protection,
    Trajectory,
    #[serde(alias = "montecarlo", alias = "monteCarlo")]
    MonteCarlo,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct PlanPayload {
    current_year: Option<i32>,
    current_age: Option<u32>,
    retirement_age: Option<u32>,
    life_expectancy: Option<u32>,
    inflation_rate: Option<f64>,
    pre_retirement_return: Option<f64>,
    post_retirement_return: Option<f64>,

    monthly_primary_income: Option<f64>,
    monthly_secondary_income: Option<f64>,
    monthly_basic_expense: Option<f64>,
    monthly_health_expense: Option<f64>,
    monthly_lifestyle_expense: Option<f64>,

    current_assets: Option<f64>,
    current_debt: Option<f64>,
    current_monthly_savings: Option<f64>,
    contribution_rate: Option<f64>,

    mortgage_principal: Option<f64>,
    mortgage_rate: Option<f64>,
    mortgage_years: Option<u32>,
    vehicle_principal: Option<f64>,
    vehicle_rate: Option<f64>,
    vehicle_years: Option<u32>,
    goals: Option<Vec<NewGoal>>,

    existing_life_cover: Option<f64>,
    existing_critical_illness_cover: Option<f64>,

    first_year_shock: Option<f64>,
    pre_retirement_volatility: Option<f64>,
    post_retirement_volatility: Option<f64>,
    trials: Option<u32>,
    seed: Option<u64>,

    children_expense_threshold: Option<f64>,
    education_reserve: Option<f64>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum ProjectionBody {
    Plan(Box<PlanReport>),
    Readiness(ReadinessResult),
    Protection(ProtectionGap),
    Trajectory { trajectory: Vec<TrajectoryPoint> },
    MonteCarlo(MonteCarloResult),
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

pub async fn run(app: App) -> Result<(), AppError> {
    match app.command {
        Command::Plan(args) => {
            let inputs = build_inputs(args)?;
            let report = build_plan_report(&inputs);
            println!("{}", serde_json::to_string_pretty(&report)?);
            Ok(())
        }
        Command::Serve { port } => run_http_server(port).await.map_err(AppError::from),
    }
}

fn parse_goal(raw: &str) -> Result<NewGoal, String> {
    let parts = raw.split(':').map(str::trim).collect::<Vec<_>>();
    if !(3..=4).contains(&parts.len()) || parts[0].is_empty() {
        return Err(format!("expected label:amount:year[:priority], got '{raw}'"));
    }

    let target_amount = parts[1]
        .parse::<f64>()
        .map_err(|e| format!("invalid goal amount '{}': {e}", parts[1]))?;
    let target_year = parts[2]
        .parse::<i32>()
        .map_err(|e| format!("invalid goal year '{}': {e}", parts[2]))?;
    let priority = match parts.get(3).map(|p| p.to_ascii_lowercase()) {
        None => GoalPriority::Medium,
        Some(p) if p == "high" => GoalPriority::High,
        Some(p) if p == "medium" => GoalPriority::Medium,
        Some(p) if p == "low" => GoalPriority::Low,
        Some(p) => return Err(format!("invalid goal priority '{p}'")),
    };

    Ok(NewGoal {
        label: parts[0].to_string(),
        target_amount,
        target_year,
        priority,
    })
}

fn current_calendar_year() -> i32 {
    i32::from(
        jiff::Timestamp::now()
            .to_zoned(jiff::tz::TimeZone::UTC)
            .year(),
    )
}

fn build_inputs(args: PlanArgs) -> Result<PlanningInputs, PlanError> {
    for (field, percent) in [
        ("contributionRate", args.contribution_rate),
        ("mortgageRate", args.mortgage_rate),
        ("vehicleRate", args.vehicle_rate),
    ] {
        if !(0.0..=100.0).contains(&percent) {
            return Err(PlanError::invalid(field, "must be between 0 and 100"));
        }
    }

    let trial_count = args.trials.clamp(MIN_TRIALS, MAX_TRIALS);
    if trial_count != args.trials {
        warn!(requested = args.trials, used = trial_count, "trial count clamped");
    }

    let mut loans = Vec::new();
    for (kind, principal, rate, years) in [
        (
            LoanKind::Mortgage,
            args.mortgage_principal,
            args.mortgage_rate,
            args.mortgage_years,
        ),
        (
            LoanKind::Vehicle,
            args.vehicle_principal,
            args.vehicle_rate,
            args.vehicle_years,
        ),
    ] {
        if principal > 0.0 {
            loans.push(Loan {
                kind,
                principal,
                annual_rate: rate / 100.0,
                term_years: years,
            });
        }
    }

    let goals = args.goals.into_iter().collect::<GoalBook>().to_vec();

    let inputs = PlanningInputs {
        current_year: args.current_year.unwrap_or_else(current_calendar_year),
        current_age: args.current_age,
        retirement_age: args.retirement_age,
        life_expectancy: args.life_expectancy,
        inflation_rate: args.inflation_rate / 100.0,
        pre_retirement_return: args.pre_retirement_return / 100.0,
        post_retirement_return: args.post_retirement_return / 100.0,
        monthly_primary_income: args.monthly_primary_income,
        monthly_secondary_income: args.monthly_secondary_income,
        monthly_basic_expense: args.monthly_basic_expense,
        monthly_health_expense: args.monthly_health_expense,
        monthly_lifestyle_expense: args.monthly_lifestyle_expense,
        current_assets: args.current_assets,
        current_debt: args.current_debt,
        current_monthly_savings: args.current_monthly_savings,
        contribution_rate: args.contribution_rate / 100.0,
        loans,
        goals,
        existing_life_cover: args.existing_life_cover,
        existing_critical_illness_cover: args.existing_critical_illness_cover,
        first_year_shock: args.first_year_shock / 100.0,
        pre_retirement_volatility: args.pre_retirement_volatility / 100.0,
        post_retirement_volatility: args.post_retirement_volatility / 100.0,
        trial_count,
        seed: args.seed,
        protection: ProtectionAssumptions {
            children_expense_threshold: args.children_expense_threshold,
            education_reserve: args.education_reserve,
            ..ProtectionAssumptions::default()
        },
    };
    inputs.validate()?;
    Ok(inputs)
}

pub async fn run_http_server(port: u16) -> std::io::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let app = Router::new()
        .route(
            "/api/:projection",
            get(projection_get_handler).post(projection_post_handler),
        )
        .fallback(not_found_handler);

    let listener = TcpListener::bind(addr).await?;
    info!(%addr, "retirement planning API listening");

    axum::serve(listener, app).await
}

async fn not_found_handler() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found")
}

async fn projection_get_handler(
    Path(projection): Path<Projection>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Response {
    match payload_from_query(pairs) {
        Ok(payload) => projection_handler_impl(projection, payload).await,
        Err(err) => error_response(StatusCode::BAD_REQUEST, &err),
    }
}

async fn projection_post_handler(
    Path(projection): Path<Projection>,
    Json(payload): Json<PlanPayload>,
) -> Response {
    projection_handler_impl(projection, payload).await
}

async fn projection_handler_impl(projection: Projection, payload: PlanPayload) -> Response {
    let inputs = match inputs_from_payload(payload) {
        Ok(inputs) => inputs,
        Err(err) => return error_response(StatusCode::BAD_REQUEST, &err.to_string()),
    };

    match tokio::task::spawn_blocking(move || projection_body(projection, &inputs)).await {
        Ok(body) => json_response(StatusCode::OK, body),
        Err(err) => {
            warn!(error = %err, "projection task failed");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "projection failed")
        }
    }
}

fn projection_body(projection: Projection, inputs: &PlanningInputs) -> ProjectionBody {
    match projection {
        Projection::Plan => ProjectionBody::Plan(Box::new(build_plan_report(inputs))),
        Projection::Readiness => ProjectionBody::Readiness(compute_readiness(inputs)),
        Projection::Protection => ProjectionBody::Protection(compute_protection_gap(inputs)),
        Projection::Trajectory => ProjectionBody::Trajectory {
            trajectory: compute_trajectory(inputs),
        },
        Projection::MonteCarlo => ProjectionBody::MonteCarlo(run_monte_carlo_seeded(inputs)),
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
fn inputs_from_json(json: &str) -> Result<PlanningInputs, String> {
    let payload = serde_json::from_str::<PlanPayload>(json)
        .map_err(|e| format!("Invalid API JSON payload: {e}"))?;
    inputs_from_payload(payload).map_err(|e| e.to_string())
}

// Goals come as repeated `goal=label:amount:year[:priority]` pairs in a query
// string; the other keys map onto the JSON payload fields.
fn payload_from_query(pairs: Vec<(String, String)>) -> Result<PlanPayload, String> {
    let mut fields = serde_json::Map::new();
    let mut goals = Vec::new();
    for (key, value) in pairs {
        match key.as_str() {
            "goal" => goals.push(parse_goal(&value)?),
            "goals" => return Err("query goals use goal=label:amount:year[:priority]".to_string()),
            _ => {
                let value = match serde_json::from_str::<serde_json::Value>(&value) {
                    Ok(parsed) => parsed,
                    Err(_) => serde_json::Value::String(value),
                };
                fields.insert(key, value);
            }
        }
    }

    let mut payload = serde_json::from_value::<PlanPayload>(serde_json::Value::Object(fields))
        .map_err(|e| format!("Invalid API query: {e}"))?;
    if !goals.is_empty() {
        payload.goals = Some(goals);
    }
    Ok(payload)
}

fn inputs_from_payload(payload: PlanPayload) -> Result<PlanningInputs, PlanError> {
    let mut args = default_args_for_api();

    macro_rules! overlay {
        ($($field:ident),* $(,)?) => {
            $(
                if let Some(v) = payload.$field {
                    args.$field = v;
                }
            )*
        };
    }

    overlay!(
        current_age,
        retirement_age,
        life_expectancy,
        inflation_rate,
        pre_retirement_return,
        post_retirement_return,
        monthly_primary_income,
        monthly_secondary_income,
        monthly_basic_expense,
        monthly_health_expense,
        monthly_lifestyle_expense,
        current_assets,
        current_debt,
        current_monthly_savings,
        contribution_rate,
        mortgage_principal,
        mortgage_rate,
        mortgage_years,
        vehicle_principal,
        vehicle_rate,
        vehicle_years,
        goals,
        existing_life_cover,
        existing_critical_illness_cover,
        first_year_shock,
        pre_retirement_volatility,
        post_retirement_volatility,
        trials,
        seed,
        children_expense_threshold,
        education_reserve,
    );
    if payload.current_year.is_some() {
        args.current_year = payload.current_year;
    }

    build_inputs(args)
}

fn default_args_for_api() -> PlanArgs {
    PlanArgs {
        current_year: None,
        current_age: 36,
        retirement_age: 60,
        life_expectancy: 90,
        inflation_rate: 3.0,
        pre_retirement_return: 6.0,
        post_retirement_return: 3.5,
        monthly_primary_income: 70_000.0,
        monthly_secondary_income: 0.0,
        monthly_basic_expense: 30_000.0,
        monthly_health_expense: 4_000.0,
        monthly_lifestyle_expense: 8_000.0,
        current_assets: 0.0,
        current_debt: 0.0,
        current_monthly_savings: 0.0,
        contribution_rate: 5.0,
        mortgage_principal: 0.0,
        mortgage_rate: 8.5,
        mortgage_years: 20,
        vehicle_principal: 0.0,
        vehicle_rate: 9.0,
        vehicle_years: 5,
        goals: Vec::new(),
        existing_life_cover: 0.0,
        existing_critical_illness_cover: 0.0,
        first_year_shock: 0.0,
        pre_retirement_volatility: 12.0,
        post_retirement_volatility: 6.0,
        trials: 1_000,
        seed: 42,
        children_expense_threshold: 40_000.0,
        education_reserve: 2_000_000.0,
    }
}
