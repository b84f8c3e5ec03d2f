use serde::Deserialize;
use thiserror::Error;

use crate::plan::{DayPlan, GroceryItem, MealPlan, DAYS_PER_PLAN};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseFailure {
    #[error("provider output is empty")]
    Empty,
    #[error("no JSON object found in provider output")]
    NoJsonObject,
    #[error("provider output is not valid plan JSON: {0}")]
    Malformed(String),
    #[error("plan is missing required field `{0}`")]
    MissingField(&'static str),
    #[error("plan has {0} days, expected 7")]
    WrongDayCount(usize),
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawPlan {
    grocery_list: Option<Vec<GroceryItem>>,
    weekly_plan: Option<Vec<DayPlan>>,
    total_estimated_cost: Option<f64>,
}

/// Turn provider text into a plan.
///
/// The whole text is tried first. Models like to wrap their JSON in a
/// sentence or a code fence, so when that fails every balanced top-level
/// `{...}` in the text is tried, last one first. Only the shape is checked:
/// costs and links are taken as given.
pub fn parse_plan(raw: &str) -> Result<MealPlan, ParseFailure> {
    let text = raw.trim();
    if text.is_empty() {
        return Err(ParseFailure::Empty);
    }

    let mut failure = match decode(text) {
        Ok(plan) => return Ok(plan),
        Err(e) => e,
    };

    let candidates = top_level_objects(text);
    if candidates.is_empty() && matches!(failure, ParseFailure::Malformed(_)) {
        return Err(ParseFailure::NoJsonObject);
    }

    for candidate in candidates.into_iter().rev() {
        if candidate.len() == text.len() {
            continue;
        }
        match decode(candidate) {
            Ok(plan) => return Ok(plan),
            // keep the most specific reason for the log line
            Err(e) if matches!(failure, ParseFailure::Malformed(_)) => failure = e,
            Err(_) => {}
        }
    }

    Err(failure)
}

fn decode(text: &str) -> Result<MealPlan, ParseFailure> {
    let raw: RawPlan =
        serde_json::from_str(text).map_err(|e| ParseFailure::Malformed(e.to_string()))?;

    let grocery_list = raw
        .grocery_list
        .ok_or(ParseFailure::MissingField("groceryList"))?;
    let mut weekly_plan = raw
        .weekly_plan
        .ok_or(ParseFailure::MissingField("weeklyPlan"))?;

    if weekly_plan.len() != DAYS_PER_PLAN {
        return Err(ParseFailure::WrongDayCount(weekly_plan.len()));
    }

    for meal in weekly_plan.iter_mut().flat_map(|day| day.meals.iter_mut()) {
        if meal.title.trim().is_empty() {
            return Err(ParseFailure::MissingField("title"));
        }
        if meal
            .recipe_link
            .as_deref()
            .is_some_and(|link| link.trim().is_empty())
        {
            meal.recipe_link = None;
        }
    }

    let total_estimated_cost = raw
        .total_estimated_cost
        .unwrap_or_else(|| grocery_list.iter().map(|g| g.estimated_cost).sum());

    Ok(MealPlan {
        grocery_list,
        weekly_plan,
        total_estimated_cost,
    })
}

/// Byte spans of balanced top-level `{...}` blocks, in order of appearance.
fn top_level_objects(text: &str) -> Vec<&str> {
    let mut found = Vec::new();
    let mut offset = 0;

    while let Some(relative) = text[offset..].find('{') {
        let start = offset + relative;
        match matching_brace_len(&text[start..]) {
            Some(len) => {
                found.push(&text[start..start + len]);
                offset = start + len;
            }
            // unclosed opener, e.g. a `:-{` in the model's chatter
            None => offset = start + 1,
        }
    }

    found
}

fn matching_brace_len(s: &str) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, c) in s.char_indices() {
        if in_string {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }

        match c {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i + 1);
                }
            }
            _ => {}
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::{day_label, Meal};
    use serde_json::json;

    fn seven_days() -> serde_json::Value {
        json!((0..7)
            .map(|i| json!({
                "day": day_label(i),
                "meals": [{ "title": format!("Meal {i}"), "category": "Thai", "instructions": "Cook." }]
            }))
            .collect::<Vec<_>>())
    }

    fn sample_plan() -> MealPlan {
        MealPlan {
            grocery_list: vec![GroceryItem {
                item: "Jasmine rice".into(),
                quantity: "2 lb".into(),
                estimated_cost: 3.49,
            }],
            weekly_plan: (0..7)
                .map(|i| DayPlan {
                    day: day_label(i),
                    meals: vec![Meal {
                        title: format!("Green curry {i}"),
                        category: "Thai".into(),
                        instructions: "Simmer curry paste with coconut milk.".into(),
                        recipe_link: (i % 2 == 0)
                            .then(|| "https://www.seriouseats.com/thai-green-curry".to_string()),
                    }],
                })
                .collect(),
            total_estimated_cost: 3.49,
        }
    }

    #[test]
    fn well_formed_json_round_trips() {
        let plan = sample_plan();
        let text = serde_json::to_string(&plan).unwrap();
        assert_eq!(parse_plan(&text).unwrap(), plan);
    }

    #[test]
    fn recovers_object_after_leading_sentence() {
        let body = json!({ "groceryList": [], "weeklyPlan": seven_days(), "totalEstimatedCost": 10 });
        let text = format!("Sure! {body}");
        let plan = parse_plan(&text).unwrap();
        assert_eq!(plan.weekly_plan.len(), 7);
        assert_eq!(plan.total_estimated_cost, 10.0);
    }

    #[test]
    fn recovers_from_code_fence_and_trailing_braces() {
        let body = json!({ "groceryList": [], "weeklyPlan": seven_days() });
        let text = format!("Here you go:\n```json\n{body}\n```\nEnjoy {{and}} happy cooking :-{{");
        let plan = parse_plan(&text).unwrap();
        assert_eq!(plan.weekly_plan[6].meals[0].title, "Meal 6");
    }

    #[test]
    fn braces_inside_strings_do_not_end_the_object() {
        let days: Vec<_> = (0..7)
            .map(|i| json!({ "day": day_label(i), "meals": [{ "title": "Tacos }{ \"al\" pastor" }] }))
            .collect();
        let body = json!({ "groceryList": [], "weeklyPlan": days });
        let plan = parse_plan(&format!("Plan: {body}")).unwrap();
        assert_eq!(plan.weekly_plan[0].meals[0].title, "Tacos }{ \"al\" pastor");
    }

    #[test]
    fn missing_total_defaults_to_grocery_sum() {
        let body = json!({
            "groceryList": [
                { "item": "Eggs", "quantity": "1 dozen", "estimatedCost": 3.5 },
                { "item": "Oats", "quantity": "1 lb", "estimatedCost": 2.0 }
            ],
            "weeklyPlan": seven_days()
        });
        let plan = parse_plan(&body.to_string()).unwrap();
        assert_eq!(plan.total_estimated_cost, 5.5);
    }

    #[test]
    fn blank_recipe_link_is_dropped() {
        let days: Vec<_> = (0..7)
            .map(|i| json!({ "day": day_label(i), "meals": [{ "title": "Dal", "recipeLink": " " }] }))
            .collect();
        let body = json!({ "groceryList": [], "weeklyPlan": days });
        let plan = parse_plan(&body.to_string()).unwrap();
        assert!(plan.weekly_plan[0].meals[0].recipe_link.is_none());
    }

    #[test]
    fn empty_text_fails() {
        assert_eq!(parse_plan(""), Err(ParseFailure::Empty));
        assert_eq!(parse_plan("  \n "), Err(ParseFailure::Empty));
    }

    #[test]
    fn truncated_json_fails() {
        let full = json!({ "groceryList": [], "weeklyPlan": seven_days() }).to_string();
        let truncated = &full[..full.len() / 2];
        assert!(parse_plan(truncated).is_err());

        let cut_before_any_day = r#"{"groceryList":[],"weeklyPlan":["#;
        assert_eq!(
            parse_plan(cut_before_any_day),
            Err(ParseFailure::NoJsonObject)
        );
    }

    #[test]
    fn recovers_object_after_unclosed_brace_in_prose() {
        let body = json!({ "groceryList": [], "weeklyPlan": seven_days(), "totalEstimatedCost": 0 });
        let text = format!("Sorry about earlier :-{{ here is the plan: {body}");
        let plan = parse_plan(&text).unwrap();
        assert_eq!(plan.weekly_plan.len(), 7);
        assert_eq!(plan.weekly_plan[0].meals[0].title, "Meal 0");
    }

    #[test]
    fn missing_weekly_plan_fails() {
        let text = r#"{"groceryList":[],"totalEstimatedCost":12}"#;
        assert_eq!(
            parse_plan(text),
            Err(ParseFailure::MissingField("weeklyPlan"))
        );
    }

    #[test]
    fn wrong_day_count_fails() {
        let days: Vec<_> = (0..5)
            .map(|i| json!({ "day": day_label(i), "meals": [] }))
            .collect();
        let text = format!("Plan below. {}", json!({ "groceryList": [], "weeklyPlan": days }));
        assert_eq!(parse_plan(&text), Err(ParseFailure::WrongDayCount(5)));
    }

    #[test]
    fn blank_title_fails() {
        let days: Vec<_> = (0..7)
            .map(|i| json!({ "day": day_label(i), "meals": [{ "title": "" }] }))
            .collect();
        let text = json!({ "groceryList": [], "weeklyPlan": days }).to_string();
        assert_eq!(parse_plan(&text), Err(ParseFailure::MissingField("title")));
    }

    #[test]
    fn prose_without_json_fails() {
        assert_eq!(
            parse_plan("I'm sorry, I can't help with that."),
            Err(ParseFailure::NoJsonObject)
        );
    }
}
