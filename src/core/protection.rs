use tracing::debug;

use super::types::{PlanningInputs, ProtectionGap};

pub fn compute_protection_gap(inputs: &PlanningInputs) -> ProtectionGap {
    let assumptions = &inputs.protection;
    let annual_income = inputs.annual_income();

    let children_assumed = inputs.monthly_expense() > assumptions.children_expense_threshold;
    let (replacement_years, education_reserve) = if children_assumed {
        (
            assumptions.replacement_years_with_children,
            assumptions.education_reserve,
        )
    } else {
        (assumptions.replacement_years_without_children, 0.0)
    };
    let replacement_years = replacement_years.clamp(
        assumptions.min_replacement_years,
        assumptions.max_replacement_years.max(assumptions.min_replacement_years),
    );

    let outstanding_loans: f64 = inputs.loans.iter().map(|loan| loan.principal).sum();
    let recommended_life_cover = (annual_income * replacement_years as f64
        + outstanding_loans
        + education_reserve
        - inputs.net_current_assets()
        - inputs.existing_life_cover)
        .max(0.0);

    let recommended_critical_illness_cover = (annual_income
        * assumptions.critical_illness_income_multiple
        - inputs.existing_critical_illness_cover)
        .max(0.0);

    debug!(
        children_assumed,
        replacement_years,
        recommended_life_cover,
        recommended_critical_illness_cover,
        "protection gap computed"
    );
    ProtectionGap {
        children_assumed,
        replacement_years,
        recommended_life_cover,
        recommended_critical_illness_cover,
    }
}
