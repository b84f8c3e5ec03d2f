use serde::{Deserialize, Serialize};

use super::MealType;
use crate::error::PlanError;

const DEFAULT_COMPLEXITY: u8 = 3;

/// Kitchen profile as stored by the profile form. Every field is optional;
/// [`PlanRequest::from_profile`] decides what is mandatory.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Profile {
    pub location: Option<String>,
    pub grocery_store: Option<String>,
    pub weekly_budget_usd: Option<f64>,
    pub meals_requested: Option<String>,
    pub kitchen_tools: Option<String>,
    pub kitchen_appliances: Option<String>,
    pub cooking_notes: Option<String>,
    pub favorite_categories: Option<String>,
    pub complexity: Option<i64>,
    pub selected_meal_types: Option<MealTypeSelection>,
}

/// Form posts send a bare string when only one checkbox is ticked.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MealTypeSelection {
    One(String),
    Many(Vec<String>),
}

impl MealTypeSelection {
    fn names(&self) -> Vec<&str> {
        match self {
            MealTypeSelection::One(name) => vec![name.as_str()],
            MealTypeSelection::Many(names) => names.iter().map(String::as_str).collect(),
        }
    }
}

/// Normalized input for one plan generation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanRequest {
    pub location: String,
    pub grocery_store: String,
    pub weekly_budget_usd: f64,
    pub meals_requested: String,
    pub kitchen_tools: String,
    pub kitchen_appliances: String,
    pub cooking_notes: String,
    pub favorite_categories: String,
    pub complexity: u8,
    pub selected_meal_types: Vec<MealType>,
}

impl PlanRequest {
    pub fn from_profile(profile: &Profile) -> Result<Self, PlanError> {
        let location = required_text(&profile.location, "location")?;
        let grocery_store = required_text(&profile.grocery_store, "groceryStore")?;

        let weekly_budget_usd = match profile.weekly_budget_usd {
            Some(budget) if budget.is_finite() && budget > 0.0 => budget,
            Some(budget) => {
                return Err(PlanError::InvalidRequest(format!(
                    "weeklyBudgetUsd must be a positive number, got {budget}"
                )))
            }
            None => {
                return Err(PlanError::InvalidRequest(
                    "weeklyBudgetUsd is required".into(),
                ))
            }
        };

        // 0 is what an untouched form field round-trips to
        let complexity = match profile.complexity {
            None | Some(0) => DEFAULT_COMPLEXITY,
            Some(c @ 1..=5) => c as u8,
            Some(c) => {
                return Err(PlanError::InvalidRequest(format!(
                    "complexity must be between 1 and 5, got {c}"
                )))
            }
        };

        let selected_meal_types = normalize_meal_types(
            profile
                .selected_meal_types
                .as_ref()
                .map(MealTypeSelection::names)
                .unwrap_or_default(),
        )?;

        let request = Self {
            location,
            grocery_store,
            weekly_budget_usd,
            meals_requested: optional_text(&profile.meals_requested),
            kitchen_tools: optional_text(&profile.kitchen_tools),
            kitchen_appliances: optional_text(&profile.kitchen_appliances),
            cooking_notes: optional_text(&profile.cooking_notes),
            favorite_categories: optional_text(&profile.favorite_categories),
            complexity,
            selected_meal_types,
        };
        request.validate()?;
        Ok(request)
    }

    /// Check the invariants of a request built by hand rather than through
    /// [`PlanRequest::from_profile`].
    pub fn validate(&self) -> Result<(), PlanError> {
        if self.location.trim().is_empty() {
            return Err(PlanError::InvalidRequest("location is required".into()));
        }
        if self.grocery_store.trim().is_empty() {
            return Err(PlanError::InvalidRequest("groceryStore is required".into()));
        }
        if !(self.weekly_budget_usd.is_finite() && self.weekly_budget_usd > 0.0) {
            return Err(PlanError::InvalidRequest(format!(
                "weeklyBudgetUsd must be a positive number, got {}",
                self.weekly_budget_usd
            )));
        }
        if !(1..=5).contains(&self.complexity) {
            return Err(PlanError::InvalidRequest(format!(
                "complexity must be between 1 and 5, got {}",
                self.complexity
            )));
        }
        if self.selected_meal_types.is_empty() {
            return Err(PlanError::InvalidRequest(
                "selectedMealTypes must not be empty".into(),
            ));
        }
        for (i, meal_type) in self.selected_meal_types.iter().enumerate() {
            if self.selected_meal_types[..i].contains(meal_type) {
                return Err(PlanError::InvalidRequest(format!(
                    "selectedMealTypes lists {meal_type} more than once"
                )));
            }
        }
        Ok(())
    }
}

/// Parse meal type names, dropping duplicates and blanks while keeping the
/// caller's order. No names at all means every meal type.
pub fn normalize_meal_types(names: Vec<&str>) -> Result<Vec<MealType>, PlanError> {
    let mut selected = Vec::new();
    for name in names.into_iter().filter(|n| !n.trim().is_empty()) {
        let meal_type: MealType = name.parse().map_err(PlanError::InvalidRequest)?;
        if !selected.contains(&meal_type) {
            selected.push(meal_type);
        }
    }

    if selected.is_empty() {
        selected = MealType::ALL.to_vec();
    }
    Ok(selected)
}

fn required_text(value: &Option<String>, field: &str) -> Result<String, PlanError> {
    match value.as_deref().map(str::trim) {
        Some(text) if !text.is_empty() => Ok(text.to_string()),
        _ => Err(PlanError::InvalidRequest(format!("{field} is required"))),
    }
}

fn optional_text(value: &Option<String>) -> String {
    value.as_deref().map(str::trim).unwrap_or_default().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile() -> Profile {
        Profile {
            location: Some(" Austin, TX ".into()),
            grocery_store: Some("H-E-B".into()),
            weekly_budget_usd: Some(120.0),
            ..Default::default()
        }
    }

    #[test]
    fn defaults_complexity_and_meal_types() {
        let request = PlanRequest::from_profile(&profile()).unwrap();
        assert_eq!(request.location, "Austin, TX");
        assert_eq!(request.complexity, 3);
        assert_eq!(request.selected_meal_types, MealType::ALL.to_vec());
    }

    #[test]
    fn accepts_single_string_meal_type() {
        let json = r#"{"location":"Lyon","groceryStore":"Carrefour","weeklyBudgetUsd":80,"selectedMealTypes":"dinner"}"#;
        let profile: Profile = serde_json::from_str(json).unwrap();
        let request = PlanRequest::from_profile(&profile).unwrap();
        assert_eq!(request.selected_meal_types, vec![MealType::Dinner]);
    }

    #[test]
    fn keeps_order_and_drops_duplicates() {
        let types = normalize_meal_types(vec!["dinner", "breakfast", "dinner"]).unwrap();
        assert_eq!(types, vec![MealType::Dinner, MealType::Breakfast]);
    }

    #[test]
    fn empty_selection_resolves_to_all_meal_types() {
        let mut p = profile();
        p.selected_meal_types = Some(MealTypeSelection::Many(vec![]));
        let request = PlanRequest::from_profile(&p).unwrap();
        assert_eq!(request.selected_meal_types.len(), 3);
    }

    #[test]
    fn rejects_missing_store_and_bad_budget() {
        let mut p = profile();
        p.grocery_store = Some("   ".into());
        assert!(matches!(
            PlanRequest::from_profile(&p),
            Err(PlanError::InvalidRequest(_))
        ));

        let mut p = profile();
        p.weekly_budget_usd = Some(0.0);
        assert!(PlanRequest::from_profile(&p).is_err());
    }

    #[test]
    fn validate_rejects_hand_built_request_without_meal_types() {
        let mut request = PlanRequest::from_profile(&profile()).unwrap();
        assert_eq!(request.validate(), Ok(()));

        request.selected_meal_types.clear();
        assert_eq!(
            request.validate(),
            Err(PlanError::InvalidRequest(
                "selectedMealTypes must not be empty".into()
            ))
        );

        request.selected_meal_types = vec![MealType::Lunch, MealType::Lunch];
        assert!(request.validate().is_err());
    }

    #[test]
    fn rejects_unknown_meal_type_and_out_of_range_complexity() {
        let mut p = profile();
        p.selected_meal_types = Some(MealTypeSelection::Many(vec!["supper".into()]));
        assert!(PlanRequest::from_profile(&p).is_err());

        let mut p = profile();
        p.complexity = Some(9);
        assert!(PlanRequest::from_profile(&p).is_err());
    }
}
