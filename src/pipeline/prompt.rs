use crate::plan::{MealType, PlanRequest, UsedTitles};

/// Recipe sites a model may link to. Anything else must be left out.
pub const ALLOWED_RECIPE_DOMAINS: [&str; 8] = [
    "allrecipes.com",
    "budgetbytes.com",
    "seriouseats.com",
    "bbcgoodfood.com",
    "simplyrecipes.com",
    "cooking.nytimes.com",
    "foodnetwork.com",
    "epicurious.com",
];

const RESPONSE_SHAPE: &str = r#"{"groceryList":[{"item":"string","quantity":"string","estimatedCost":0.0}],"weeklyPlan":[{"day":"Day 1","meals":[{"title":"string","category":"string","instructions":"string","recipeLink":"https://..."}]}],"totalEstimatedCost":0.0}"#;

/// Build the plan-generation prompt. The output depends only on the request
/// and the used titles; the avoid-list is sorted so the same history always
/// produces the same text.
pub fn build_prompt(request: &PlanRequest, used_titles: &UsedTitles) -> String {
    let meal_types = request
        .selected_meal_types
        .iter()
        .map(MealType::as_str)
        .collect::<Vec<_>>()
        .join(", ");
    let meals_per_day = request.selected_meal_types.len();

    let mut lines = vec![
        "You are an expert meal planner and budget-conscious chef.".to_string(),
        format!(
            "Create a one-week plan (7 days). Each day must contain exactly {meals_per_day} meal(s), in this order: {meal_types}."
        ),
        "Do not add meal types that are not listed and do not skip any listed meal type on any day."
            .to_string(),
    ];

    let favorites = request.favorite_categories.trim();
    if !favorites.is_empty() {
        lines.push(format!(
            "HARD CONSTRAINT: at least 70% of all meals must come from these favorite categories: {favorites}."
        ));
    }

    lines.extend([
        "Every meal must have: title, category (cuisine), instructions (brief steps), and an optional recipeLink."
            .to_string(),
        format!(
            "recipeLink rules: NEVER invent or guess a URL. Only include a link to a real recipe page you are certain exists on one of: {}. If you are not certain, omit recipeLink entirely.",
            ALLOWED_RECIPE_DOMAINS.join(", ")
        ),
        "Optimize to shop at the specified store and stay within the weekly budget.".to_string(),
        "Use ingredients across multiple meals to reduce waste.".to_string(),
        "Respect dietary notes and available tools and appliances; keep complexity within the rating."
            .to_string(),
        String::new(),
        format!("Location: {}", request.location),
        format!("Grocery store: {}", request.grocery_store),
        format!("Weekly budget (USD): {:.2}", request.weekly_budget_usd),
        format!(
            "Meals requested: {}",
            or_default(&request.meals_requested, "General balanced meals")
        ),
        format!(
            "Kitchen tools: {}",
            or_default(&request.kitchen_tools, "Standard kitchen tools")
        ),
        format!(
            "Kitchen appliances: {}",
            or_default(&request.kitchen_appliances, "Standard kitchen appliances")
        ),
        format!(
            "Dietary and cooking notes: {}",
            or_default(&request.cooking_notes, "None")
        ),
        format!(
            "Favorite categories: {}",
            or_default(&request.favorite_categories, "None specified")
        ),
        format!("Complexity rating (1-5): {}", request.complexity),
    ]);

    if !used_titles.is_empty() {
        let mut avoid: Vec<&str> = used_titles.iter().map(String::as_str).collect();
        avoid.sort_unstable();
        lines.push(String::new());
        lines.push(
            "These meals were served in previous weeks. Do NOT repeat any of them:".to_string(),
        );
        lines.extend(avoid.into_iter().map(|title| format!("- {title}")));
    }

    lines.extend([
        String::new(),
        format!("Respond with a single JSON object of exactly this shape: {RESPONSE_SHAPE}"),
        "weeklyPlan must have exactly 7 entries and totalEstimatedCost must be the sum of the grocery costs."
            .to_string(),
        "Return ONLY minified JSON. Do not include markdown, code fences, or commentary.".to_string(),
    ]);

    lines.join("\n")
}

fn or_default<'a>(value: &'a str, default: &'a str) -> &'a str {
    let value = value.trim();
    if value.is_empty() {
        default
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(meal_types: Vec<MealType>, favorites: &str) -> PlanRequest {
        PlanRequest {
            location: "Portland, OR".into(),
            grocery_store: "Trader Joe's".into(),
            weekly_budget_usd: 95.0,
            meals_requested: String::new(),
            kitchen_tools: "cast iron skillet".into(),
            kitchen_appliances: "air fryer".into(),
            cooking_notes: "no shellfish".into(),
            favorite_categories: favorites.into(),
            complexity: 2,
            selected_meal_types: meal_types,
        }
    }

    #[test]
    fn encodes_meal_types_in_order() {
        let prompt = build_prompt(
            &request(vec![MealType::Dinner, MealType::Breakfast], ""),
            &UsedTitles::new(),
        );
        assert!(prompt.contains("exactly 2 meal(s), in this order: dinner, breakfast."));
    }

    #[test]
    fn includes_constraints_and_profile_details() {
        let prompt = build_prompt(&request(MealType::ALL.to_vec(), "Italian, Thai"), &UsedTitles::new());
        assert!(prompt.contains("at least 70% of all meals must come from these favorite categories: Italian, Thai."));
        assert!(prompt.contains("Grocery store: Trader Joe's"));
        assert!(prompt.contains("Weekly budget (USD): 95.00"));
        assert!(prompt.contains("Kitchen appliances: air fryer"));
        assert!(prompt.contains("Dietary and cooking notes: no shellfish"));
        assert!(prompt.contains("Complexity rating (1-5): 2"));
        assert!(prompt.contains("Meals requested: General balanced meals"));
        assert!(prompt.contains("NEVER invent or guess a URL"));
        assert!(prompt.contains("budgetbytes.com"));
        assert!(!prompt.contains("previous weeks"));
    }

    #[test]
    fn no_favorite_constraint_without_favorites() {
        let prompt = build_prompt(&request(MealType::ALL.to_vec(), "  "), &UsedTitles::new());
        assert!(!prompt.contains("HARD CONSTRAINT"));
        assert!(prompt.contains("Favorite categories: None specified"));
    }

    #[test]
    fn avoid_list_is_sorted_and_deterministic() {
        let used: UsedTitles = ["pad thai", "chicken rice bowl", "miso soup"]
            .into_iter()
            .map(String::from)
            .collect();
        let req = request(MealType::ALL.to_vec(), "");
        let prompt = build_prompt(&req, &used);
        let first = prompt.find("- chicken rice bowl").unwrap();
        let second = prompt.find("- miso soup").unwrap();
        let third = prompt.find("- pad thai").unwrap();
        assert!(first < second && second < third);
        assert_eq!(prompt, build_prompt(&req, &used));
    }

    #[test]
    fn ends_with_json_only_instruction() {
        let prompt = build_prompt(&request(MealType::ALL.to_vec(), ""), &UsedTitles::new());
        assert!(prompt.ends_with("Return ONLY minified JSON. Do not include markdown, code fences, or commentary."));
    }
}
