pub mod mock;
pub mod parser;
pub mod prompt;

use serde::Serialize;
use serde_json::Value;
use std::fmt;
use std::time::{Duration, Instant};

use crate::config::Config;
use crate::error::PlanError;
use crate::plan::{used_meal_titles, MealPlan, PlanRequest, Profile, UsedTitles};
use crate::provider::{self, Invocation, PlanTextProvider};

use mock::{MealCatalog, MockSynthesizer};
use parser::{parse_plan, ParseFailure};
use prompt::build_prompt;

const DEFAULT_PROVIDER_TIMEOUT: Duration = Duration::from_secs(60);

/// What happened when one provider was asked for a plan.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum AttemptOutcome {
    Unavailable,
    Empty,
    Failed { error: String },
    TimedOut,
    Succeeded,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProviderAttempt {
    pub provider: String,
    #[serde(flatten)]
    pub outcome: AttemptOutcome,
    pub latency_ms: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FallbackReason {
    /// Every provider was unavailable, empty, failed or timed out.
    NoProviderOutput,
    /// A provider answered but the text was not a usable plan.
    Unparsable(ParseFailure),
    /// The parsed plan did not have one meal per selected meal type per day.
    ShapeMismatch,
}

impl fmt::Display for FallbackReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FallbackReason::NoProviderOutput => f.write_str("no provider output"),
            FallbackReason::Unparsable(failure) => write!(f, "unparsable output: {failure}"),
            FallbackReason::ShapeMismatch => f.write_str("meals per day did not match request"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PlanSource {
    Provider { name: String },
    Mock { reason: FallbackReason },
}

impl PlanSource {
    pub fn is_mock(&self) -> bool {
        matches!(self, PlanSource::Mock { .. })
    }
}

impl fmt::Display for PlanSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlanSource::Provider { name } => write!(f, "provider:{name}"),
            PlanSource::Mock { .. } => f.write_str("mock"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct GeneratedPlan {
    pub plan: MealPlan,
    pub source: PlanSource,
    pub attempts: Vec<ProviderAttempt>,
    pub used_title_count: usize,
    pub latency_ms: u64,
}

/// Turns a plan request into a plan: prompt, providers in order, parse, and
/// a mock plan whenever no provider produced something usable.
pub struct PlanPipeline {
    providers: Vec<Box<dyn PlanTextProvider>>,
    synthesizer: MockSynthesizer,
    provider_timeout: Duration,
}

impl PlanPipeline {
    pub fn new(providers: Vec<Box<dyn PlanTextProvider>>, catalog: MealCatalog) -> Self {
        Self {
            providers,
            synthesizer: MockSynthesizer::new(catalog),
            provider_timeout: DEFAULT_PROVIDER_TIMEOUT,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(provider::from_config(config), MealCatalog::default())
            .with_provider_timeout(config.provider_timeout)
    }

    pub fn with_provider_timeout(mut self, timeout: Duration) -> Self {
        self.provider_timeout = timeout;
        self
    }

    pub fn provider_names(&self) -> Vec<&str> {
        self.providers.iter().map(|p| p.name()).collect()
    }

    /// Validate a stored profile and generate a plan for it. Only an invalid
    /// profile is an error.
    pub async fn generate_from_profile(
        &self,
        profile: &Profile,
        history: &Value,
    ) -> Result<GeneratedPlan, PlanError> {
        let request = PlanRequest::from_profile(profile)?;
        self.generate_plan(&request, history).await
    }

    pub async fn generate_plan(
        &self,
        request: &PlanRequest,
        history: &Value,
    ) -> Result<GeneratedPlan, PlanError> {
        let used_titles = used_meal_titles(history);
        self.generate_with_titles(request, &used_titles).await
    }

    /// Generate a plan avoiding `used_titles`. Provider and parse problems
    /// end in a mock plan; only a request that fails
    /// [`PlanRequest::validate`] is an error.
    pub async fn generate_with_titles(
        &self,
        request: &PlanRequest,
        used_titles: &UsedTitles,
    ) -> Result<GeneratedPlan, PlanError> {
        request.validate()?;
        let started = Instant::now();

        let prompt = build_prompt(request, used_titles);
        tracing::debug!(
            prompt_chars = prompt.len(),
            used_titles = used_titles.len(),
            "built plan prompt"
        );

        let (reply, attempts) = self.try_providers(&prompt).await;

        let source = match reply {
            None => PlanSource::Mock {
                reason: FallbackReason::NoProviderOutput,
            },
            Some((name, text)) => match parse_plan(&text) {
                Ok(plan) if plan.matches_meal_types(&request.selected_meal_types) => {
                    tracing::info!(provider = %name, meals = plan.meal_count(), "using provider plan");
                    return Ok(GeneratedPlan {
                        plan,
                        source: PlanSource::Provider { name },
                        attempts,
                        used_title_count: used_titles.len(),
                        latency_ms: started.elapsed().as_millis() as u64,
                    });
                }
                Ok(_) => {
                    tracing::warn!(
                        provider = %name,
                        expected_meals_per_day = request.selected_meal_types.len(),
                        "provider plan has the wrong meals per day"
                    );
                    PlanSource::Mock {
                        reason: FallbackReason::ShapeMismatch,
                    }
                }
                Err(failure) => {
                    tracing::warn!(provider = %name, error = %failure, "could not parse provider output");
                    PlanSource::Mock {
                        reason: FallbackReason::Unparsable(failure),
                    }
                }
            },
        };

        if let PlanSource::Mock { reason } = &source {
            tracing::info!(%reason, "falling back to mock plan");
        }

        Ok(GeneratedPlan {
            plan: self
                .synthesizer
                .synthesize(&request.selected_meal_types, used_titles),
            source,
            attempts,
            used_title_count: used_titles.len(),
            latency_ms: started.elapsed().as_millis() as u64,
        })
    }

    /// Ask each provider in order until one returns text.
    async fn try_providers(
        &self,
        prompt: &str,
    ) -> (Option<(String, String)>, Vec<ProviderAttempt>) {
        let mut attempts = Vec::new();

        for provider in &self.providers {
            let name = provider.name().to_string();
            let started = Instant::now();
            let result = tokio::time::timeout(self.provider_timeout, provider.invoke(prompt)).await;
            let latency_ms = started.elapsed().as_millis() as u64;

            let outcome = match result {
                Ok(Ok(Invocation::Text(text))) => {
                    tracing::info!(provider = %name, latency_ms, chars = text.len(), "provider returned text");
                    attempts.push(ProviderAttempt {
                        provider: name.clone(),
                        outcome: AttemptOutcome::Succeeded,
                        latency_ms,
                    });
                    return (Some((name, text)), attempts);
                }
                Ok(Ok(Invocation::Unavailable)) => {
                    tracing::debug!(provider = %name, "provider not configured, skipping");
                    AttemptOutcome::Unavailable
                }
                Ok(Ok(Invocation::Empty)) => {
                    tracing::warn!(provider = %name, latency_ms, "provider returned empty text");
                    AttemptOutcome::Empty
                }
                Ok(Err(e)) => {
                    tracing::warn!(provider = %name, latency_ms, error = %format!("{e:#}"), "provider call failed");
                    AttemptOutcome::Failed {
                        error: format!("{e:#}"),
                    }
                }
                Err(_) => {
                    tracing::warn!(
                        provider = %name,
                        timeout_secs = self.provider_timeout.as_secs_f64(),
                        "provider timed out"
                    );
                    AttemptOutcome::TimedOut
                }
            };

            attempts.push(ProviderAttempt {
                provider: name,
                outcome,
                latency_ms,
            });
        }

        (None, attempts)
    }
}
