pub mod config;
pub mod error;
pub mod instrumentation;
pub mod llm;
pub mod pipeline;
pub mod plan;
pub mod provider;
pub mod store;

pub use config::Config;
pub use error::PlanError;
pub use pipeline::{GeneratedPlan, PlanPipeline, PlanSource};
pub use plan::{MealPlan, PlanRequest, Profile};
