use super::error::{PlanError, Result};
use super::types::PlanningInputs;

pub const MAX_AGE: u32 = 120;
pub const MAX_LOAN_TERM_YEARS: u32 = 120;

impl PlanningInputs {
    pub fn validate(&self) -> Result<()> {
        if self.retirement_age < self.current_age {
            return Err(PlanError::invalid("retirementAge", "must be >= currentAge"));
        }
        if self.life_expectancy < self.retirement_age {
            return Err(PlanError::invalid("lifeExpectancy", "must be >= retirementAge"));
        }
        if self.life_expectancy > MAX_AGE {
            return Err(PlanError::invalid("lifeExpectancy", "must be <= 120"));
        }

        for (field, rate) in [
            ("inflationRate", self.inflation_rate),
            ("preRetirementReturn", self.pre_retirement_return),
            ("postRetirementReturn", self.post_retirement_return),
            ("firstYearShock", self.first_year_shock),
        ] {
            if !rate.is_finite() || rate <= -1.0 {
                return Err(PlanError::invalid(field, "must be a finite rate > -100%"));
            }
        }

        for (field, amount) in [
            ("monthlyPrimaryIncome", self.monthly_primary_income),
            ("monthlySecondaryIncome", self.monthly_secondary_income),
            ("monthlyBasicExpense", self.monthly_basic_expense),
            ("monthlyHealthExpense", self.monthly_health_expense),
            ("monthlyLifestyleExpense", self.monthly_lifestyle_expense),
            ("currentAssets", self.current_assets),
            ("currentDebt", self.current_debt),
            ("currentMonthlySavings", self.current_monthly_savings),
            ("contributionRate", self.contribution_rate),
            ("existingLifeCover", self.existing_life_cover),
            ("existingCriticalIllnessCover", self.existing_critical_illness_cover),
            ("preRetirementVolatility", self.pre_retirement_volatility),
            ("postRetirementVolatility", self.post_retirement_volatility),
        ] {
            check_non_negative(field, amount)?;
        }

        for loan in &self.loans {
            check_non_negative("loan.principal", loan.principal)?;
            if !loan.annual_rate.is_finite() || loan.annual_rate < 0.0 {
                return Err(PlanError::invalid("loan.annualRate", "must be >= 0"));
            }
            if loan.term_years == 0 && loan.principal > 0.0 {
                return Err(PlanError::invalid(
                    "loan.termYears",
                    "must be > 0 for an outstanding loan",
                ));
            }
            if loan.term_years > MAX_LOAN_TERM_YEARS {
                return Err(PlanError::invalid("loan.termYears", "must be <= 120"));
            }
        }

        for goal in &self.goals {
            check_non_negative("goal.targetAmount", goal.target_amount)?;
        }

        Ok(())
    }
}

fn check_non_negative(field: &'static str, value: f64) -> Result<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(PlanError::invalid(field, "must be a finite value >= 0"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{MAX_AGE, MAX_LOAN_TERM_YEARS};
    use crate::core::error::PlanError;
    use crate::core::readiness::loan_payments;
    use crate::core::test_support::sample_inputs;

    #[test]
    fn sample_inputs_are_valid() {
        assert_eq!(sample_inputs().validate(), Ok(()));
    }

    #[test]
    fn rejects_retirement_before_current_age() {
        let mut inputs = sample_inputs();
        inputs.retirement_age = inputs.current_age - 1;
        let err = inputs.validate().expect_err("ages out of order");
        assert!(matches!(err, PlanError::InvalidInput { field: "retirementAge", .. }));
    }

    #[test]
    fn rejects_life_expectancy_before_retirement() {
        let mut inputs = sample_inputs();
        inputs.life_expectancy = inputs.retirement_age - 1;
        let err = inputs.validate().expect_err("ages out of order");
        assert!(err.to_string().contains("lifeExpectancy"));
    }

    #[test]
    fn rejects_non_finite_and_negative_amounts() {
        let mut inputs = sample_inputs();
        inputs.current_assets = f64::NAN;
        assert!(inputs.validate().is_err());

        let mut inputs = sample_inputs();
        inputs.monthly_health_expense = -1.0;
        let err = inputs.validate().expect_err("negative expense");
        assert!(err.to_string().contains("monthlyHealthExpense"));
    }

    #[test]
    fn rejects_rate_at_or_below_total_loss() {
        let mut inputs = sample_inputs();
        inputs.pre_retirement_return = -1.0;
        assert!(inputs.validate().is_err());
    }

    #[test]
    fn rejects_outstanding_loan_without_term() {
        let mut inputs = sample_inputs();
        inputs.loans[0].term_years = 0;
        let err = inputs.validate().expect_err("loan without term");
        assert!(err.to_string().contains("loan.termYears"));
    }

    #[test]
    fn rejects_life_expectancy_past_max_age() {
        let mut inputs = sample_inputs();
        inputs.life_expectancy = MAX_AGE + 1;
        let err = inputs.validate().expect_err("too old");
        assert!(err.to_string().contains("lifeExpectancy"));

        inputs.life_expectancy = MAX_AGE;
        assert_eq!(inputs.validate(), Ok(()));
    }

    #[test]
    fn rejects_loan_term_past_limit() {
        let mut inputs = sample_inputs();
        inputs.loans[0].term_years = 400_000_000;
        let err = inputs.validate().expect_err("term too long");
        assert!(matches!(err, PlanError::InvalidInput { field: "loan.termYears", .. }));

        inputs.loans[0].term_years = MAX_LOAN_TERM_YEARS;
        assert_eq!(inputs.validate(), Ok(()));
        assert!(loan_payments(&inputs)[0].monthly_payment.is_finite());
    }
}
