pub mod history;
pub mod model;
pub mod request;

pub use history::{read_used_titles, used_meal_titles, UsedTitles};
pub use model::{
    day_label, DayPlan, GroceryItem, Meal, MealPlan, MealType, PlanHistoryEntry, DAYS_PER_PLAN,
};
pub use request::{PlanRequest, Profile};
