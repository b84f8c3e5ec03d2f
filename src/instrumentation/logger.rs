use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::pipeline::{AttemptOutcome, GeneratedPlan, PlanSource};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttemptLog {
    pub provider: String,
    pub outcome: String,
    pub error: Option<String>,
    pub latency_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationLog {
    pub id: String,
    pub timestamp: String,
    pub source: String,
    pub fallback_reason: Option<String>,
    pub attempts: Vec<AttemptLog>,
    pub used_title_count: usize,
    pub meal_count: usize,
    pub total_estimated_cost: f64,
    pub total_latency_ms: u64,
}

impl GenerationLog {
    pub fn from_generated(generated: &GeneratedPlan) -> Self {
        let attempts = generated
            .attempts
            .iter()
            .map(|a| {
                let (outcome, error) = match &a.outcome {
                    AttemptOutcome::Unavailable => ("unavailable", None),
                    AttemptOutcome::Empty => ("empty", None),
                    AttemptOutcome::Failed { error } => ("failed", Some(error.clone())),
                    AttemptOutcome::TimedOut => ("timed_out", None),
                    AttemptOutcome::Succeeded => ("succeeded", None),
                };
                AttemptLog {
                    provider: a.provider.clone(),
                    outcome: outcome.to_string(),
                    error,
                    latency_ms: a.latency_ms,
                }
            })
            .collect();

        let fallback_reason = match &generated.source {
            PlanSource::Mock { reason } => Some(reason.to_string()),
            PlanSource::Provider { .. } => None,
        };

        Self {
            id: uuid::Uuid::new_v4().to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
            source: generated.source.to_string(),
            fallback_reason,
            attempts,
            used_title_count: generated.used_title_count,
            meal_count: generated.plan.meal_count(),
            total_estimated_cost: generated.plan.total_estimated_cost,
            total_latency_ms: generated.latency_ms,
        }
    }

    pub fn summary(&self) -> String {
        let tried = self
            .attempts
            .iter()
            .map(|a| format!("{}={}", a.provider, a.outcome))
            .collect::<Vec<_>>()
            .join(", ");
        format!(
            "Source: {} | Providers: [{}] | Meals: {} | Est. cost: ${:.2} | Latency: {:.1}s",
            self.source,
            tried,
            self.meal_count,
            self.total_estimated_cost,
            self.total_latency_ms as f64 / 1000.0,
        )
    }
}

pub struct RunLogger {
    dir: PathBuf,
}

impl RunLogger {
    pub fn new(dir: &Path) -> Result<Self> {
        fs::create_dir_all(dir).context("Failed to create logs directory")?;
        Ok(Self {
            dir: dir.to_path_buf(),
        })
    }

    pub fn write(&self, log: &GenerationLog) -> Result<()> {
        let path = self.dir.join("generations.jsonl");
        let mut file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .context("Failed to open log file")?;

        let json = serde_json::to_string(log).context("Failed to serialize generation log")?;
        writeln!(file, "{}", json).context("Failed to write log")?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::mock::MockSynthesizer;
    use crate::pipeline::{FallbackReason, ProviderAttempt};
    use crate::plan::{MealType, UsedTitles};

    fn generated() -> GeneratedPlan {
        GeneratedPlan {
            plan: MockSynthesizer::default().synthesize(&MealType::ALL, &UsedTitles::new()),
            source: PlanSource::Mock {
                reason: FallbackReason::NoProviderOutput,
            },
            attempts: vec![
                ProviderAttempt {
                    provider: "groq".into(),
                    outcome: AttemptOutcome::Failed {
                        error: "429 Too Many Requests".into(),
                    },
                    latency_ms: 310,
                },
                ProviderAttempt {
                    provider: "openai".into(),
                    outcome: AttemptOutcome::Unavailable,
                    latency_ms: 0,
                },
            ],
            used_title_count: 4,
            latency_ms: 320,
        }
    }

    #[test]
    fn builds_log_from_generated_plan() {
        let log = GenerationLog::from_generated(&generated());
        assert_eq!(log.source, "mock");
        assert_eq!(log.fallback_reason.as_deref(), Some("no provider output"));
        assert_eq!(log.meal_count, 21);
        assert_eq!(log.attempts[0].error.as_deref(), Some("429 Too Many Requests"));
        assert!(log.summary().contains("groq=failed, openai=unavailable"));
    }

    #[test]
    fn appends_one_line_per_generation() {
        let dir = tempfile::tempdir().unwrap();
        let logger = RunLogger::new(&dir.path().join("logs")).unwrap();
        let log = GenerationLog::from_generated(&generated());
        logger.write(&log).unwrap();
        logger.write(&log).unwrap();

        let content = fs::read_to_string(dir.path().join("logs/generations.jsonl")).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 2);
        let parsed: GenerationLog = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(parsed.used_title_count, 4);
    }
}
