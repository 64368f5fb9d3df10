use std::sync::Arc;

use serde::Deserialize;

use super::error::{PlanError, Result};
use super::types::{Goal, GoalId, GoalPriority};

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewGoal {
    pub label: String,
    pub target_amount: f64,
    pub target_year: i32,
    #[serde(default)]
    pub priority: GoalPriority,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GoalUpdate {
    pub label: Option<String>,
    pub target_amount: Option<f64>,
    pub target_year: Option<i32>,
    pub priority: Option<GoalPriority>,
}

#[derive(Debug, Clone)]
pub struct GoalBook {
    goals: Arc<[Goal]>,
}

impl Default for GoalBook {
    fn default() -> Self {
        Self {
            goals: Arc::from(Vec::new()),
        }
    }
}

impl GoalBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&self, goal: NewGoal) -> (Self, GoalId) {
        let id = GoalId::new();
        let mut goals = self.goals.to_vec();
        goals.push(Goal {
            id,
            label: goal.label,
            target_amount: goal.target_amount,
            target_year: goal.target_year,
            priority: goal.priority,
        });
        (Self { goals: goals.into() }, id)
    }

    pub fn update(&self, id: GoalId, update: GoalUpdate) -> Result<Self> {
        let index = self
            .goals
            .iter()
            .position(|goal| goal.id == id)
            .ok_or(PlanError::GoalNotFound(id))?;

        let mut goals = self.goals.to_vec();
        let goal = &mut goals[index];
        if let Some(label) = update.label {
            goal.label = label;
        }
        if let Some(amount) = update.target_amount {
            goal.target_amount = amount;
        }
        if let Some(year) = update.target_year {
            goal.target_year = year;
        }
        if let Some(priority) = update.priority {
            goal.priority = priority;
        }
        Ok(Self { goals: goals.into() })
    }

    pub fn remove(&self, id: GoalId) -> Self {
        let goals = self
            .goals
            .iter()
            .filter(|goal| goal.id != id)
            .cloned()
            .collect::<Vec<_>>();
        Self { goals: goals.into() }
    }

    pub fn get(&self, id: GoalId) -> Option<&Goal> {
        self.goals.iter().find(|goal| goal.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Goal> {
        self.goals.iter()
    }

    pub fn len(&self) -> usize {
        self.goals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.goals.is_empty()
    }

    pub fn to_vec(&self) -> Vec<Goal> {
        self.goals.to_vec()
    }
}

impl FromIterator<NewGoal> for GoalBook {
    fn from_iter<I: IntoIterator<Item = NewGoal>>(iter: I) -> Self {
        iter.into_iter()
            .fold(GoalBook::new(), |book, goal| book.add(goal).0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_goal(label: &str, amount: f64, year: i32) -> NewGoal {
        NewGoal {
            label: label.to_string(),
            target_amount: amount,
            target_year: year,
            priority: GoalPriority::Medium,
        }
    }

    #[test]
    fn add_appends_with_unique_ids_and_leaves_original_untouched() {
        let empty = GoalBook::new();
        let (one, first) = empty.add(new_goal("car", 800_000.0, 2029));
        let (two, second) = one.add(new_goal("wedding", 1_500_000.0, 2031));

        assert!(empty.is_empty());
        assert_eq!(one.len(), 1);
        assert_eq!(two.len(), 2);
        assert_ne!(first, second);
        let labels = two.iter().map(|g| g.label.as_str()).collect::<Vec<_>>();
        assert_eq!(labels, ["car", "wedding"]);
    }

    #[test]
    fn update_merges_only_present_fields() {
        let (book, id) = GoalBook::new().add(new_goal("car", 800_000.0, 2029));
        let updated = book
            .update(
                id,
                GoalUpdate {
                    target_amount: Some(900_000.0),
                    priority: Some(GoalPriority::High),
                    ..GoalUpdate::default()
                },
            )
            .expect("goal exists");

        let goal = updated.get(id).expect("goal kept");
        assert_eq!(goal.label, "car");
        assert_eq!(goal.target_year, 2029);
        assert_eq!(goal.target_amount, 900_000.0);
        assert_eq!(goal.priority, GoalPriority::High);
        assert_eq!(book.get(id).map(|g| g.target_amount), Some(800_000.0));
    }

    #[test]
    fn update_rejects_unknown_id() {
        let book = GoalBook::new();
        let missing = GoalId::new();
        let err = book
            .update(missing, GoalUpdate::default())
            .expect_err("unknown id");
        assert_eq!(err, PlanError::GoalNotFound(missing));
    }

    #[test]
    fn remove_filters_by_id_and_preserves_order() {
        let book: GoalBook = [
            new_goal("a", 1.0, 2030),
            new_goal("b", 2.0, 2031),
            new_goal("c", 3.0, 2032),
        ]
        .into_iter()
        .collect();
        let middle = book.to_vec()[1].id;

        let trimmed = book.remove(middle);
        let labels = trimmed.iter().map(|g| g.label.as_str()).collect::<Vec<_>>();
        assert_eq!(labels, ["a", "c"]);
        assert_eq!(book.len(), 3);
        assert_eq!(trimmed.remove(GoalId::new()).len(), 2);
    }
}
