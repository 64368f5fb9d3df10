mod error;
mod goals;
mod monte_carlo;
mod protection;
mod readiness;
mod trajectory;
mod tvm;
mod types;
mod validation;

pub use error::{PlanError, Result};
pub use goals::{GoalBook, GoalUpdate, NewGoal};
pub use monte_carlo::{NormalSampler, run_monte_carlo, run_monte_carlo_seeded};
pub use protection::compute_protection_gap;
pub use readiness::{compute_readiness, loan_payments};
pub use trajectory::compute_trajectory;
pub use tvm::{
    future_value, future_value_of_series, monthly_payment, present_value_of_annuity,
    required_level_contribution,
};
pub use types::{
    Goal, GoalId, GoalPriority, Loan, LoanKind, LoanPayment, MonteCarloResult, PlanReport,
    PlanningInputs, ProtectionAssumptions, ProtectionGap, ReadinessResult, TrajectoryPoint,
};
pub use validation::{MAX_AGE, MAX_LOAN_TERM_YEARS};

pub fn build_plan_report(inputs: &PlanningInputs) -> PlanReport {
    PlanReport {
        readiness: compute_readiness(inputs),
        protection: compute_protection_gap(inputs),
        loan_payments: loan_payments(inputs),
        trajectory: compute_trajectory(inputs),
        monte_carlo: run_monte_carlo_seeded(inputs),
    }
}
