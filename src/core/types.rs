use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LoanKind {
    Mortgage,
    Vehicle,
    Other,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Loan {
    pub kind: LoanKind,
    pub principal: f64,
    pub annual_rate: f64,
    pub term_years: u32,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GoalId(pub Uuid);

impl GoalId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for GoalId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for GoalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GoalPriority {
    High,
    #[default]
    Medium,
    Low,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Goal {
    pub id: GoalId,
    pub label: String,
    // today's money
    pub target_amount: f64,
    pub target_year: i32,
    pub priority: GoalPriority,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProtectionAssumptions {
    pub children_expense_threshold: f64,
    pub replacement_years_with_children: u32,
    pub replacement_years_without_children: u32,
    pub min_replacement_years: u32,
    pub max_replacement_years: u32,
    pub education_reserve: f64,
    pub critical_illness_income_multiple: f64,
}

impl Default for ProtectionAssumptions {
    fn default() -> Self {
        Self {
            children_expense_threshold: 40_000.0,
            replacement_years_with_children: 20,
            replacement_years_without_children: 10,
            min_replacement_years: 5,
            max_replacement_years: 25,
            education_reserve: 2_000_000.0,
            critical_illness_income_multiple: 3.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanningInputs {
    pub current_year: i32,
    pub current_age: u32,
    pub retirement_age: u32,
    pub life_expectancy: u32,

    pub inflation_rate: f64,
    pub pre_retirement_return: f64,
    pub post_retirement_return: f64,

    pub monthly_primary_income: f64,
    pub monthly_secondary_income: f64,
    pub monthly_basic_expense: f64,
    pub monthly_health_expense: f64,
    pub monthly_lifestyle_expense: f64,

    pub current_assets: f64,
    pub current_debt: f64,
    pub current_monthly_savings: f64,
    pub contribution_rate: f64,

    pub loans: Vec<Loan>,
    pub goals: Vec<Goal>,

    pub existing_life_cover: f64,
    pub existing_critical_illness_cover: f64,

    // return adjustment for the first accumulation year only, e.g. -0.2
    pub first_year_shock: f64,
    pub pre_retirement_volatility: f64,
    pub post_retirement_volatility: f64,
    pub trial_count: u32,
    pub seed: u64,

    #[serde(default)]
    pub protection: ProtectionAssumptions,
}

impl PlanningInputs {
    pub fn years_to_retire(&self) -> u32 {
        self.retirement_age.saturating_sub(self.current_age)
    }

    pub fn years_in_retirement(&self) -> u32 {
        self.life_expectancy.saturating_sub(self.retirement_age)
    }

    pub fn annual_income(&self) -> f64 {
        (self.monthly_primary_income + self.monthly_secondary_income) * 12.0
    }

    pub fn monthly_expense(&self) -> f64 {
        self.monthly_basic_expense + self.monthly_health_expense + self.monthly_lifestyle_expense
    }

    pub fn annual_expense(&self) -> f64 {
        self.monthly_expense() * 12.0
    }

    pub fn annual_expense_at_retirement(&self) -> f64 {
        self.annual_expense() * (1.0 + self.inflation_rate).powi(self.years_to_retire() as i32)
    }

    pub fn net_current_assets(&self) -> f64 {
        (self.current_assets - self.current_debt).max(0.0)
    }

    pub fn annual_savings(&self) -> f64 {
        self.current_monthly_savings * 12.0 + self.annual_income() * self.contribution_rate
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadinessResult {
    pub years_to_retire: u32,
    pub years_in_retirement: u32,
    pub annual_expense_at_retirement: f64,
    pub target_corpus: f64,
    pub projected_corpus: f64,
    pub readiness_ratio: f64,
    pub shortfall: f64,
    pub required_monthly_savings: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProtectionGap {
    pub children_assumed: bool,
    pub replacement_years: u32,
    pub recommended_life_cover: f64,
    pub recommended_critical_illness_cover: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrajectoryPoint {
    pub age: u32,
    pub wealth: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub withdrawal: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonteCarloResult {
    pub trials: u32,
    pub successes: u32,
    pub success_probability: f64,
    pub median_terminal_wealth: f64,
    pub p10_terminal_wealth: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoanPayment {
    pub kind: LoanKind,
    pub principal: f64,
    pub monthly_payment: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanReport {
    pub readiness: ReadinessResult,
    pub protection: ProtectionGap,
    pub loan_payments: Vec<LoanPayment>,
    pub trajectory: Vec<TrajectoryPoint>,
    pub monte_carlo: MonteCarloResult,
}
