//! Offline fallback plans.
//!
//! Output depends only on the catalog, the selected meal types and the used
//! titles, so the same inputs always give the same plan.

use crate::plan::history::normalize_title;
use crate::plan::{
    day_label, DayPlan, GroceryItem, Meal, MealPlan, MealType, UsedTitles, DAYS_PER_PLAN,
};

#[derive(Debug, Clone, PartialEq)]
pub struct MealTemplate {
    pub meal_type: MealType,
    pub title: String,
    pub category: String,
    pub instructions: String,
}

impl MealTemplate {
    fn new(meal_type: MealType, title: &str, category: &str, instructions: &str) -> Self {
        Self {
            meal_type,
            title: title.to_string(),
            category: category.to_string(),
            instructions: instructions.to_string(),
        }
    }

    fn to_meal(&self) -> Meal {
        Meal {
            title: self.title.clone(),
            category: self.category.clone(),
            instructions: self.instructions.clone(),
            recipe_link: None,
        }
    }
}

/// Meal templates and the grocery basket used for fallback plans.
#[derive(Debug, Clone)]
pub struct MealCatalog {
    pub templates: Vec<MealTemplate>,
    pub basket: Vec<GroceryItem>,
}

impl MealCatalog {
    pub fn templates_for(&self, meal_type: MealType) -> impl Iterator<Item = &MealTemplate> {
        self.templates
            .iter()
            .filter(move |t| t.meal_type == meal_type)
    }

    pub fn basket_total(&self) -> f64 {
        self.basket.iter().map(|g| g.estimated_cost).sum()
    }
}

impl Default for MealCatalog {
    fn default() -> Self {
        use MealType::*;

        let templates = vec![
            MealTemplate::new(
                Breakfast,
                "Overnight oats with banana",
                "American",
                "Combine oats, milk, and sliced banana; refrigerate overnight.",
            ),
            MealTemplate::new(
                Breakfast,
                "Greek yogurt parfait",
                "Mediterranean",
                "Layer yogurt with oats and sliced banana; drizzle with honey.",
            ),
            MealTemplate::new(
                Breakfast,
                "Veggie egg scramble",
                "American",
                "Scramble eggs with diced tomato and chopped broccoli.",
            ),
            MealTemplate::new(
                Breakfast,
                "Huevos rancheros",
                "Mexican",
                "Fry eggs; serve over warmed beans with tomato salsa.",
            ),
            MealTemplate::new(
                Breakfast,
                "Tamagoyaki rice bowl",
                "Japanese",
                "Roll thin omelette layers; slice over steamed rice.",
            ),
            MealTemplate::new(
                Lunch,
                "Chicken rice bowl",
                "Asian",
                "Grill chicken; serve over rice with steamed broccoli.",
            ),
            MealTemplate::new(
                Lunch,
                "Bean and tomato soup",
                "Italian",
                "Simmer beans with tomatoes and garlic; blend half for body.",
            ),
            MealTemplate::new(
                Lunch,
                "Chicken burrito bowl",
                "Mexican",
                "Layer rice, beans, shredded chicken, and tomato salsa.",
            ),
            MealTemplate::new(
                Lunch,
                "Egg fried rice",
                "Chinese",
                "Stir-fry day-old rice with egg, broccoli, and soy sauce.",
            ),
            MealTemplate::new(
                Lunch,
                "Caprese pasta salad",
                "Italian",
                "Toss cooled pasta with tomatoes, basil, and olive oil.",
            ),
            MealTemplate::new(
                Dinner,
                "Tomato pasta with beans",
                "Italian",
                "Cook pasta; simmer tomatoes and beans; combine.",
            ),
            MealTemplate::new(
                Dinner,
                "Sheet-pan chicken and broccoli",
                "American",
                "Roast chicken and broccoli on one tray at 425F for 25 minutes.",
            ),
            MealTemplate::new(
                Dinner,
                "Chicken and broccoli stir-fry",
                "Chinese",
                "Stir-fry sliced chicken and broccoli; serve over rice.",
            ),
            MealTemplate::new(
                Dinner,
                "Black bean tacos",
                "Mexican",
                "Mash seasoned beans; fill tortillas with beans and tomato.",
            ),
            MealTemplate::new(
                Dinner,
                "Chicken curry with rice",
                "Indian",
                "Simmer chicken in spiced tomato sauce; serve with rice.",
            ),
        ];

        let basket = [
            ("Chicken breast", "6 pieces", 12.0),
            ("Brown rice", "2 lb", 3.0),
            ("Broccoli", "4 heads", 6.0),
            ("Eggs", "1 dozen", 4.0),
            ("Oats", "1 lb", 2.5),
            ("Bananas", "7", 2.0),
            ("Greek yogurt", "32 oz", 5.0),
            ("Tomatoes", "6", 4.0),
            ("Pasta", "1 lb", 1.5),
            ("Canned beans", "4 cans", 4.0),
        ]
        .into_iter()
        .map(|(item, quantity, estimated_cost)| GroceryItem {
            item: item.to_string(),
            quantity: quantity.to_string(),
            estimated_cost,
        })
        .collect();

        Self { templates, basket }
    }
}

#[derive(Debug, Clone, Default)]
pub struct MockSynthesizer {
    catalog: MealCatalog,
}

impl MockSynthesizer {
    pub fn new(catalog: MealCatalog) -> Self {
        Self { catalog }
    }

    /// Build a seven-day plan with one meal per selected type per day.
    ///
    /// Templates whose titles were already used are skipped; the rest are
    /// cycled by day. When a meal type has nothing left, that slot gets a
    /// placeholder naming the meal type and day.
    pub fn synthesize(&self, meal_types: &[MealType], used_titles: &UsedTitles) -> MealPlan {
        let fresh: Vec<Vec<&MealTemplate>> = meal_types
            .iter()
            .map(|meal_type| {
                self.catalog
                    .templates_for(*meal_type)
                    .filter(|t| !used_titles.contains(&normalize_title(&t.title)))
                    .collect()
            })
            .collect();

        let weekly_plan = (0..DAYS_PER_PLAN)
            .map(|day| DayPlan {
                day: day_label(day),
                meals: meal_types
                    .iter()
                    .zip(&fresh)
                    .map(|(meal_type, available)| {
                        if available.is_empty() {
                            placeholder(*meal_type, day)
                        } else {
                            available[day % available.len()].to_meal()
                        }
                    })
                    .collect(),
            })
            .collect();

        MealPlan {
            grocery_list: self.catalog.basket.clone(),
            weekly_plan,
            total_estimated_cost: self.catalog.basket_total(),
        }
    }
}

fn placeholder(meal_type: MealType, day: usize) -> Meal {
    Meal {
        title: format!("Chef's choice {meal_type} (day {})", day + 1),
        category: "Any".to_string(),
        instructions: format!(
            "No new {meal_type} ideas left in the catalog; cook a favorite from the grocery list."
        ),
        recipe_link: None,
    }
}
