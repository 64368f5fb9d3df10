use std::f64::consts::PI;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
#[cfg(feature = "parallel")]
use rayon::iter::{IntoParallelIterator, ParallelIterator};
use tracing::debug;

use super::trajectory::retirement_withdrawal;
use super::types::{MonteCarloResult, PlanningInputs};

pub struct NormalSampler<R> {
    rng: R,
    spare: Option<f64>,
}

impl<R: Rng> NormalSampler<R> {
    pub fn new(rng: R) -> Self {
        Self { rng, spare: None }
    }

    pub fn standard_normal(&mut self) -> f64 {
        if let Some(z) = self.spare.take() {
            return z;
        }

        let u1 = unit_open_closed(&mut self.rng);
        let u2 = unit_open_closed(&mut self.rng);
        let r = (-2.0 * u1.ln()).sqrt();
        let theta = 2.0 * PI * u2;

        self.spare = Some(r * theta.sin());
        r * theta.cos()
    }

    pub fn sample(&mut self, mean: f64, std_dev: f64) -> f64 {
        mean + std_dev * self.standard_normal()
    }
}

// (0, 1]: zero would send `ln` to -inf.
fn unit_open_closed<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    1.0 - rng.random::<f64>()
}

#[derive(Debug, Clone, Copy)]
struct TrialPlan {
    initial_wealth: f64,
    annual_savings: f64,
    expense_at_retirement: f64,
}

impl TrialPlan {
    fn from_inputs(inputs: &PlanningInputs) -> Self {
        Self {
            initial_wealth: inputs.net_current_assets(),
            annual_savings: inputs.annual_savings(),
            expense_at_retirement: inputs.annual_expense_at_retirement(),
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct TrialOutcome {
    success: bool,
    terminal_wealth: f64,
}

pub fn run_monte_carlo<R: Rng + ?Sized>(inputs: &PlanningInputs, rng: &mut R) -> MonteCarloResult {
    let plan = TrialPlan::from_inputs(inputs);
    let mut sampler = NormalSampler::new(rng);
    let outcomes = (0..inputs.trial_count)
        .map(|_| simulate_trial(inputs, &plan, &mut sampler))
        .collect::<Vec<_>>();
    summarize(outcomes)
}

pub fn run_monte_carlo_seeded(inputs: &PlanningInputs) -> MonteCarloResult {
    let plan = TrialPlan::from_inputs(inputs);
    let run_trial = |trial_id: u32| {
        let rng = StdRng::seed_from_u64(derive_seed(inputs.seed, trial_id));
        let mut sampler = NormalSampler::new(rng);
        simulate_trial(inputs, &plan, &mut sampler)
    };

    #[cfg(feature = "parallel")]
    let outcomes = (0..inputs.trial_count)
        .into_par_iter()
        .map(run_trial)
        .collect::<Vec<_>>();
    #[cfg(not(feature = "parallel"))]
    let outcomes = (0..inputs.trial_count).map(run_trial).collect::<Vec<_>>();

    summarize(outcomes)
}

fn simulate_trial<R: Rng>(
    inputs: &PlanningInputs,
    plan: &TrialPlan,
    sampler: &mut NormalSampler<R>,
) -> TrialOutcome {
    let mut wealth = plan.initial_wealth;

    for age in inputs.current_age..=inputs.life_expectancy.max(inputs.current_age) {
        if age < inputs.retirement_age {
            let r = sampler.sample(
                inputs.pre_retirement_return,
                inputs.pre_retirement_volatility,
            );
            wealth = wealth * (1.0 + r) + plan.annual_savings;
            if age == inputs.current_age {
                wealth *= 1.0 + inputs.first_year_shock;
            }
        } else {
            let r = sampler.sample(
                inputs.post_retirement_return,
                inputs.post_retirement_volatility,
            );
            let withdrawal = retirement_withdrawal(inputs, plan.expense_at_retirement, age);
            wealth = wealth * (1.0 + r) - withdrawal;
            if wealth <= 0.0 {
                return TrialOutcome {
                    success: false,
                    terminal_wealth: 0.0,
                };
            }
        }
    }

    TrialOutcome {
        success: true,
        terminal_wealth: wealth.max(0.0),
    }
}

fn summarize(outcomes: Vec<TrialOutcome>) -> MonteCarloResult {
    let trials = outcomes.len() as u32;
    let successes = outcomes.iter().filter(|o| o.success).count() as u32;
    let mut terminal = outcomes
        .iter()
        .map(|o| o.terminal_wealth)
        .collect::<Vec<_>>();
    terminal.sort_by(f64::total_cmp);

    let success_probability = if trials == 0 {
        0.0
    } else {
        successes as f64 / trials as f64
    };
    let result = MonteCarloResult {
        trials,
        successes,
        success_probability,
        median_terminal_wealth: sorted_percentile(&terminal, 50.0),
        p10_terminal_wealth: sorted_percentile(&terminal, 10.0),
    };
    debug!(trials, successes, success_probability, "monte carlo finished");
    result
}

fn derive_seed(base_seed: u64, trial_id: u32) -> u64 {
    splitmix64(base_seed ^ (((trial_id as u64) << 32) | trial_id as u64))
}

fn splitmix64(mut x: u64) -> u64 {
    x = x.wrapping_add(0x9E3779B97F4A7C15);
    let mut z = x;
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58476D1CE4E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D049BB133111EB);
    z ^ (z >> 31)
}

// Linear interpolation between closest ranks; `sorted` must be ascending.
fn sorted_percentile(sorted: &[f64], p: f64) -> f64 {
    let Some(last) = sorted.len().checked_sub(1) else {
        return 0.0;
    };
    let rank = (p / 100.0) * last as f64;
    let lower = rank.floor() as usize;
    let upper = (lower + 1).min(last);
    let weight = rank - lower as f64;
    sorted[lower] + (sorted[upper] - sorted[lower]) * weight
}
