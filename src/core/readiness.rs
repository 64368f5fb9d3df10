use tracing::debug;

use super::tvm::{
    future_value, future_value_of_series, monthly_payment, present_value_of_annuity,
    required_level_contribution,
};
use super::types::{LoanPayment, PlanningInputs, ReadinessResult};

pub fn compute_readiness(inputs: &PlanningInputs) -> ReadinessResult {
    let years_to_retire = inputs.years_to_retire();
    let years_in_retirement = inputs.years_in_retirement();
    let annual_expense_at_retirement = inputs.annual_expense_at_retirement();

    let target_corpus = present_value_of_annuity(
        annual_expense_at_retirement,
        inputs.post_retirement_return,
        years_in_retirement,
    );

    let net_assets = inputs.net_current_assets();
    let grown_assets = future_value(net_assets, inputs.pre_retirement_return, years_to_retire);
    let grown_savings = future_value_of_series(
        inputs.annual_savings(),
        inputs.pre_retirement_return,
        years_to_retire,
    );
    let projected_corpus =
        (grown_assets + grown_savings - goal_cost_before_retirement(inputs)).max(0.0);

    let readiness_ratio = if target_corpus > 0.0 {
        projected_corpus / target_corpus
    } else {
        1.0
    };

    let required_monthly_savings = if years_to_retire == 0 {
        0.0
    } else {
        required_level_contribution(
            target_corpus,
            net_assets,
            inputs.pre_retirement_return,
            years_to_retire,
        ) / 12.0
    };

    let result = ReadinessResult {
        years_to_retire,
        years_in_retirement,
        annual_expense_at_retirement,
        target_corpus,
        projected_corpus,
        readiness_ratio,
        shortfall: (target_corpus - projected_corpus).max(0.0),
        required_monthly_savings,
    };
    debug!(
        target_corpus,
        projected_corpus,
        readiness_ratio,
        required_monthly_savings,
        "readiness computed"
    );
    result
}

fn goal_cost_before_retirement(inputs: &PlanningInputs) -> f64 {
    let retirement_year = inputs.current_year + inputs.years_to_retire() as i32;
    inputs
        .goals
        .iter()
        .filter(|goal| goal.target_year <= retirement_year)
        .map(|goal| {
            let years_out = goal.target_year - inputs.current_year;
            goal.target_amount * (1.0 + inputs.inflation_rate).powi(years_out)
        })
        .sum()
}

pub fn loan_payments(inputs: &PlanningInputs) -> Vec<LoanPayment> {
    inputs
        .loans
        .iter()
        .map(|loan| LoanPayment {
            kind: loan.kind,
            principal: loan.principal,
            monthly_payment: monthly_payment(loan.principal, loan.annual_rate, loan.term_years),
        })
        .collect()
}
