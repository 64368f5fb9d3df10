use tracing::debug;

use super::types::{PlanningInputs, TrajectoryPoint};

pub fn compute_trajectory(inputs: &PlanningInputs) -> Vec<TrajectoryPoint> {
    let horizon = inputs.life_expectancy.saturating_sub(inputs.current_age);
    let annual_savings = inputs.annual_savings();
    let expense_at_retirement = inputs.annual_expense_at_retirement();

    let mut wealth = inputs.net_current_assets();
    let mut points = Vec::with_capacity(horizon as usize + 1);

    for age in inputs.current_age..=inputs.current_age + horizon {
        if age < inputs.retirement_age {
            wealth = wealth * (1.0 + inputs.pre_retirement_return) + annual_savings;
            points.push(TrajectoryPoint {
                age,
                wealth: wealth.max(0.0),
                withdrawal: None,
            });
        } else {
            let withdrawal = retirement_withdrawal(inputs, expense_at_retirement, age);
            wealth = (wealth * (1.0 + inputs.post_retirement_return) - withdrawal).max(0.0);
            points.push(TrajectoryPoint {
                age,
                wealth,
                withdrawal: Some(withdrawal),
            });
        }
    }

    debug!(
        years = points.len(),
        terminal_wealth = points.last().map(|p| p.wealth).unwrap_or(0.0),
        "trajectory computed"
    );
    points
}

pub(crate) fn retirement_withdrawal(
    inputs: &PlanningInputs,
    expense_at_retirement: f64,
    age: u32,
) -> f64 {
    let years_retired = age.saturating_sub(inputs.retirement_age);
    expense_at_retirement * (1.0 + inputs.inflation_rate).powi(years_retired as i32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::test_support::{golden_inputs, sample_inputs};
    use proptest::prelude::{prop_assert, prop_assert_eq, proptest};

    fn assert_approx(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() <= 1e-6,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn covers_every_year_with_regime_switch_at_retirement() {
        let inputs = golden_inputs();
        let points = compute_trajectory(&inputs);

        assert_eq!(points.len(), (90 - 36 + 1) as usize);
        assert_eq!(points.first().map(|p| p.age), Some(36));
        assert_eq!(points.last().map(|p| p.age), Some(90));
        for pair in points.windows(2) {
            assert_eq!(pair[1].age, pair[0].age + 1);
        }

        let first_withdrawal = points
            .iter()
            .position(|p| p.withdrawal.is_some())
            .expect("retirement years present");
        assert_eq!(points[first_withdrawal].age, 60);
        assert!(points[first_withdrawal..].iter().all(|p| p.withdrawal.is_some()));
    }

    #[test]
    fn accumulation_path_matches_hand_calculation() {
        let mut inputs = sample_inputs();
        inputs.current_age = 40;
        inputs.retirement_age = 42;
        inputs.life_expectancy = 43;
        inputs.current_assets = 100_000.0;
        inputs.current_debt = 0.0;
        inputs.pre_retirement_return = 0.10;
        inputs.post_retirement_return = 0.0;
        inputs.inflation_rate = 0.05;
        inputs.monthly_primary_income = 0.0;
        inputs.monthly_secondary_income = 0.0;
        inputs.current_monthly_savings = 1_000.0;
        inputs.monthly_basic_expense = 1_000.0;
        inputs.monthly_health_expense = 0.0;
        inputs.monthly_lifestyle_expense = 0.0;

        let points = compute_trajectory(&inputs);
        assert_eq!(points.len(), 4);

        assert_approx(points[0].wealth, 122_000.0);
        assert_approx(points[1].wealth, 146_200.0);
        assert_eq!(points[1].withdrawal, None);

        let expense_at_retirement = 12_000.0 * 1.05_f64.powi(2);
        assert_approx(points[2].withdrawal.unwrap_or_default(), expense_at_retirement);
        assert_approx(points[2].wealth, 146_200.0 - expense_at_retirement);
        assert_approx(
            points[3].withdrawal.unwrap_or_default(),
            expense_at_retirement * 1.05,
        );
    }

    #[test]
    fn exhausted_wealth_is_reported_as_zero() {
        let mut inputs = golden_inputs();
        inputs.current_age = 60;
        inputs.current_assets = 1_000_000.0;

        let points = compute_trajectory(&inputs);
        assert!(points.iter().all(|p| p.wealth >= 0.0));
        assert_eq!(points.last().map(|p| p.wealth), Some(0.0));
    }

    #[test]
    fn identical_inputs_produce_identical_trajectories() {
        let inputs = golden_inputs();
        assert_eq!(compute_trajectory(&inputs), compute_trajectory(&inputs));
    }

    proptest! {
        #[test]
        fn prop_length_and_ordering_hold_for_any_ages(
            current_age in 0u32..80,
            work_years in 0u32..40,
            retired_years in 0u32..40,
        ) {
            let mut inputs = sample_inputs();
            inputs.current_age = current_age;
            inputs.retirement_age = current_age + work_years;
            inputs.life_expectancy = current_age + work_years + retired_years;

            let points = compute_trajectory(&inputs);
            prop_assert_eq!(points.len() as u32, work_years + retired_years + 1);
            for (offset, point) in points.iter().enumerate() {
                prop_assert_eq!(point.age, current_age + offset as u32);
                prop_assert!(point.wealth >= 0.0 && point.wealth.is_finite());
                prop_assert_eq!(point.withdrawal.is_some(), point.age >= inputs.retirement_age);
            }
        }
    }
}
