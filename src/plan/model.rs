use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of days in every generated plan.
pub const DAYS_PER_PLAN: usize = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MealType {
    Breakfast,
    Lunch,
    Dinner,
}

impl MealType {
    pub const ALL: [MealType; 3] = [MealType::Breakfast, MealType::Lunch, MealType::Dinner];

    pub fn as_str(&self) -> &'static str {
        match self {
            MealType::Breakfast => "breakfast",
            MealType::Lunch => "lunch",
            MealType::Dinner => "dinner",
        }
    }
}

impl fmt::Display for MealType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for MealType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "breakfast" => Ok(MealType::Breakfast),
            "lunch" => Ok(MealType::Lunch),
            "dinner" => Ok(MealType::Dinner),
            other => Err(format!("unknown meal type: {other:?}")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroceryItem {
    pub item: String,
    pub quantity: String,
    #[serde(default)]
    pub estimated_cost: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Meal {
    pub title: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub instructions: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recipe_link: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayPlan {
    pub day: String,
    pub meals: Vec<Meal>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MealPlan {
    pub grocery_list: Vec<GroceryItem>,
    pub weekly_plan: Vec<DayPlan>,
    pub total_estimated_cost: f64,
}

impl MealPlan {
    /// True when the plan has seven days and each day holds exactly one meal
    /// per selected meal type.
    pub fn matches_meal_types(&self, meal_types: &[MealType]) -> bool {
        self.weekly_plan.len() == DAYS_PER_PLAN
            && self
                .weekly_plan
                .iter()
                .all(|day| day.meals.len() == meal_types.len())
    }

    pub fn meal_count(&self) -> usize {
        self.weekly_plan.iter().map(|d| d.meals.len()).sum()
    }
}

/// One stored plan, as persisted by the plans file.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanHistoryEntry {
    pub id: String,
    pub created_at: String,
    pub input: super::PlanRequest,
    pub plan: MealPlan,
}

impl PlanHistoryEntry {
    pub fn new(input: super::PlanRequest, plan: MealPlan) -> Self {
        let now = chrono::Utc::now();
        Self {
            id: now.timestamp_millis().to_string(),
            created_at: now.to_rfc3339(),
            input,
            plan,
        }
    }
}

/// Label for the zero-based day index, e.g. `Day 1`.
pub fn day_label(index: usize) -> String {
    format!("Day {}", index + 1)
}
